//! Single sign-on authentication.
//!
//! The SSO strategy routes the OAuth code grant through the hosting
//! organization's identity provider. The provider validates the user's claim
//! with Webex and then redirects back into a shortened code grant with the
//! user's email already filled in, so the user is only prompted when consent
//! is required.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::auth::{Authenticator, OAuthAuthenticator};
use super::endpoint;
use super::launcher::{generate_state, AuthorizationLauncher};
use crate::config::SsoConfig;
use crate::error::Result;

/// SSO strategy wrapping an [`OAuthAuthenticator`]
pub struct SsoAuthenticator {
    authenticator: Arc<OAuthAuthenticator>,
    email: String,
    identity_provider_uri: String,
    additional_query_items: BTreeMap<String, String>,
}

impl SsoAuthenticator {
    pub fn new(
        authenticator: Arc<OAuthAuthenticator>,
        email: impl Into<String>,
        identity_provider_uri: impl Into<String>,
        additional_query_items: BTreeMap<String, String>,
    ) -> Self {
        Self {
            authenticator,
            email: email.into(),
            identity_provider_uri: identity_provider_uri.into(),
            additional_query_items,
        }
    }

    pub fn from_config(authenticator: Arc<OAuthAuthenticator>, sso: &SsoConfig) -> Self {
        Self::new(
            authenticator,
            &sso.email,
            &sso.identity_provider_uri,
            sso.query_items.clone(),
        )
    }

    /// The wrapped OAuth authenticator
    pub fn oauth(&self) -> &Arc<OAuthAuthenticator> {
        &self.authenticator
    }

    /// Build the identity-provider URL that starts the SSO code grant.
    ///
    /// The Hydra authorize URL (with `email` when known) is passed to the
    /// identity provider as `returnTo`, followed by the additional query items.
    pub fn build_code_grant_url(&self, state: &str) -> Result<Url> {
        let auth = &self.authenticator;
        let mut authorize_url = endpoint(auth.base_url(), &["authorize"])?;
        {
            let mut query = authorize_url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", auth.client_id())
                .append_pair("redirect_uri", auth.redirect_uri())
                .append_pair("scope", auth.scope())
                .append_pair("state", state);
            if !self.email.is_empty() {
                query.append_pair("email", &self.email);
            }
        }

        let mut url = Url::parse(&self.identity_provider_uri)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("returnTo", authorize_url.as_str());
            for (key, value) in &self.additional_query_items {
                query.append_pair(key, value);
            }
        }
        debug!("SSO code grant URL: {}", url);
        Ok(url)
    }

    /// Present the identity provider's page and complete the code grant
    pub async fn authorize(&self, launcher: &dyn AuthorizationLauncher) -> Result<()> {
        let state = generate_state();
        let url = self.build_code_grant_url(&state)?;
        let response = launcher
            .launch(&url, self.authenticator.redirect_uri())
            .await?;
        debug!("Authorize: code present = {}", response.code.is_some());
        let code = response.into_code(&state)?;
        self.authenticator.authorize(&code).await
    }
}

#[async_trait]
impl Authenticator for SsoAuthenticator {
    fn is_authorized(&self) -> bool {
        self.authenticator.is_authorized()
    }

    fn deauthorize(&self) -> Result<()> {
        self.authenticator.deauthorize()
    }

    async fn get_token(&self) -> Result<String> {
        self.authenticator.get_token().await
    }

    async fn refresh_token(&self) -> Result<String> {
        self.authenticator.refresh_token().await
    }
}
