use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::launcher::{generate_state, AuthorizationLauncher};
use super::{endpoint, HYDRA_ENDPOINT};
use crate::cache::{Cache, TOKENS_FILE};
use crate::config::Config;
use crate::error::{Result, WebexError};
use crate::types::{AccessToken, TokenResponse, TokenStore};

/// A strategy for obtaining access tokens for the REST API
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// True when a usable access or refresh token is held
    fn is_authorized(&self) -> bool;

    /// Forget all tokens
    fn deauthorize(&self) -> Result<()>;

    /// A valid access token, refreshed if needed
    async fn get_token(&self) -> Result<String>;

    /// Force a refresh and return the new access token
    async fn refresh_token(&self) -> Result<String>;
}

/// OAuth 2 authorization-code strategy for a Webex integration
pub struct OAuthAuthenticator {
    client_id: String,
    client_secret: String,
    scope: String,
    redirect_uri: String,
    base_url: Url,
    http: Client,
    tokens: RwLock<TokenStore>,
    refresh_lock: Mutex<()>,
    cache: Option<Cache>,
}

impl OAuthAuthenticator {
    /// Create an authenticator against the public Webex endpoint
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            redirect_uri: redirect_uri.into(),
            base_url: Url::parse(HYDRA_ENDPOINT)?,
            http: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            tokens: RwLock::new(TokenStore::default()),
            refresh_lock: Mutex::new(()),
            cache: None,
        })
    }

    /// Create an authenticator from the `[auth]` and `[api]` sections, persisting
    /// tokens in the default cache directory
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.api.timeout))
            .build()?;

        Self::new(
            &config.auth.client_id,
            &config.auth.client_secret,
            &config.auth.scope,
            &config.auth.redirect_uri,
        )?
        .with_base_url(&config.api.base_url)?
        .with_http(http)
        .with_cache(Cache::new()?)
    }

    /// Use another Hydra endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Persist tokens in `cache`, loading any tokens stored there
    pub fn with_cache(mut self, cache: Cache) -> Result<Self> {
        let stored: TokenStore = cache.load(TOKENS_FILE)?.unwrap_or_default();
        self.tokens = RwLock::new(stored);
        self.cache = Some(cache);
        Ok(self)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authorization URL of the plain code grant
    pub fn authorization_url(&self, state: &str) -> Result<Url> {
        let mut url = endpoint(&self.base_url, &["authorize"])?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        Ok(url)
    }

    /// Run the whole code grant: present the authorization page, then exchange the code
    pub async fn authorize_with(&self, launcher: &dyn AuthorizationLauncher) -> Result<()> {
        let state = generate_state();
        let url = self.authorization_url(&state)?;
        let response = launcher.launch(&url, &self.redirect_uri).await?;
        debug!("Authorize: code present = {}", response.code.is_some());
        self.authorize(&response.into_code(&state)?).await
    }

    /// Exchange an authorization code for tokens
    pub async fn authorize(&self, code: &str) -> Result<()> {
        let tokens = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;
        self.store(tokens)?;
        info!("Authorized with Webex");
        Ok(())
    }

    /// Use a pre-issued access token (for example a personal access token)
    pub fn set_access_token(&self, token: &str, expires_in: u64) -> Result<()> {
        self.store(TokenStore {
            access_token: Some(AccessToken::expiring_in(token, expires_in)),
            refresh_token: None,
        })
    }

    /// Current token state
    pub fn tokens(&self) -> TokenStore {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenStore> {
        let url = endpoint(&self.base_url, &["access_token"])?;
        debug!("POST {}", url);

        let res = self.http.post(url).form(params).send().await?;

        if res.status().is_success() {
            let token: TokenResponse = res.json().await?;
            Ok(token.into_store())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(WebexError::Api {
                operation: "exchange token".to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }

    fn valid_access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .valid_access_token()
            .map(|t| t.value.clone())
    }

    /// Post the refresh grant. Callers hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<String> {
        let refresh = {
            let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
            tokens.valid_refresh_token().map(|t| t.value.clone())
        };
        let refresh = refresh.ok_or(WebexError::NotAuthorized)?;

        debug!("Refreshing access token");
        let mut tokens = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh.as_str()),
            ])
            .await?;

        // The token endpoint may omit the refresh token when it is unchanged
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = self.tokens().refresh_token;
        }
        let access = tokens
            .access_token
            .as_ref()
            .map(|t| t.value.clone())
            .ok_or(WebexError::NotAuthorized)?;
        self.store(tokens)?;
        Ok(access)
    }

    fn store(&self, tokens: TokenStore) -> Result<()> {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = tokens;
        self.save_tokens()
    }

    fn save_tokens(&self) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.save(TOKENS_FILE, &self.tokens()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Authenticator for OAuthAuthenticator {
    fn is_authorized(&self) -> bool {
        let tokens = self.tokens.read().unwrap_or_else(PoisonError::into_inner);
        tokens.valid_access_token().is_some() || tokens.valid_refresh_token().is_some()
    }

    fn deauthorize(&self) -> Result<()> {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        match &self.cache {
            Some(cache) => cache.delete(TOKENS_FILE),
            None => Ok(()),
        }
    }

    async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.valid_access_token() {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(token) = self.valid_access_token() {
            return Ok(token);
        }
        self.refresh_locked().await
    }

    async fn refresh_token(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }
}
