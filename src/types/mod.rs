mod conversation;
mod membership;
mod person;
mod room;
mod team;
mod webex_id;

pub use conversation::*;
pub use membership::*;
pub use person::*;
pub use room::*;
pub use team::*;
pub use webex_id::*;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn get_epoch_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Access token with expiration (epoch seconds)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    pub expires: u64,
}

impl AccessToken {
    /// Build a token that expires `expires_in` seconds from now
    pub fn expiring_in(value: impl Into<String>, expires_in: u64) -> Self {
        Self {
            value: value.into(),
            expires: get_epoch_s().saturating_add(expires_in),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires < get_epoch_s()
    }
}

/// Token storage persisted between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStore {
    #[serde(default)]
    pub access_token: Option<AccessToken>,
    #[serde(default)]
    pub refresh_token: Option<AccessToken>,
}

impl TokenStore {
    /// Access token that has not expired yet
    pub fn valid_access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref().filter(|t| !t.is_expired())
    }

    /// Refresh token that has not expired yet
    pub fn valid_refresh_token(&self) -> Option<&AccessToken> {
        self.refresh_token.as_ref().filter(|t| !t.is_expired())
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }
}

/// Response of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_in: Option<u64>,
}

impl TokenResponse {
    /// Convert into the stored form; missing lifetimes default to 14 and 90 days
    pub fn into_store(self) -> TokenStore {
        TokenStore {
            access_token: Some(AccessToken::expiring_in(
                self.access_token,
                self.expires_in.unwrap_or(14 * 24 * 3600),
            )),
            refresh_token: self.refresh_token.map(|value| {
                AccessToken::expiring_in(
                    value,
                    self.refresh_token_expires_in.unwrap_or(90 * 24 * 3600),
                )
            }),
        }
    }
}

/// Paged list envelope used by every Hydra collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
