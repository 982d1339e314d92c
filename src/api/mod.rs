pub mod auth;
pub mod client;
pub mod launcher;
pub mod sso;

pub use auth::*;
pub use client::*;
pub use launcher::*;
pub use sso::*;

use url::Url;

use crate::error::{Result, WebexError};

/// Public REST API (Hydra) endpoint
pub const HYDRA_ENDPOINT: &str = "https://webexapis.com/v1";

/// Default permissions requested by `auth login`
pub const DEFAULT_SCOPE: &str = "spark:all";

/// Append path segments to a base URL, tolerating a trailing slash on the base
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| WebexError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let base = Url::parse(HYDRA_ENDPOINT).unwrap();
        assert_eq!(
            endpoint(&base, &["teams", "abc"]).unwrap().as_str(),
            "https://webexapis.com/v1/teams/abc"
        );

        let slashed = Url::parse("https://example.com/v1/").unwrap();
        assert_eq!(
            endpoint(&slashed, &["authorize"]).unwrap().as_str(),
            "https://example.com/v1/authorize"
        );
    }

    #[test]
    fn endpoint_escapes_segments() {
        let base = Url::parse("https://example.com/v1").unwrap();
        assert_eq!(
            endpoint(&base, &["rooms", "a/b"]).unwrap().as_str(),
            "https://example.com/v1/rooms/a%2Fb"
        );
    }
}
