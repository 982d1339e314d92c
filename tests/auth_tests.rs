//! OAuth and SSO code-grant tests against a wiremock token endpoint

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webex_cli::api::{
    Authenticator, AuthorizationLauncher, AuthorizationResponse, OAuthAuthenticator,
    SsoAuthenticator,
};
use webex_cli::cache::{Cache, TOKENS_FILE};
use webex_cli::types::{AccessToken, TokenStore};
use webex_cli::{Result, WebexError};

const REDIRECT: &str = "http://127.0.0.1:8976/callback";

fn authenticator(server: &MockServer) -> OAuthAuthenticator {
    OAuthAuthenticator::new("client", "secret", "spark:all", REDIRECT)
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

async fn mount_token_endpoint(server: &MockServer, grant: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .and(body_string_contains(format!("grant_type={}", grant)))
        .and(body_string_contains("client_id=client"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Answers with a fixed code and echoes the `state` found in the authorization URL.
/// For SSO URLs the state sits inside the `returnTo` URL.
struct EchoLauncher {
    seen: Mutex<Vec<String>>,
}

impl EchoLauncher {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }

    fn state_of(url: &Url) -> Option<String> {
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "state" => return Some(value.into_owned()),
                "returnTo" => return Url::parse(&value).ok().and_then(|u| Self::state_of(&u)),
                _ => {}
            }
        }
        None
    }
}

#[async_trait]
impl AuthorizationLauncher for EchoLauncher {
    async fn launch(&self, authorization_url: &Url, redirect_uri: &str) -> Result<AuthorizationResponse> {
        assert_eq!(redirect_uri, REDIRECT);
        self.seen.lock().unwrap().push(authorization_url.to_string());
        Ok(AuthorizationResponse {
            code: Some("the-code".to_string()),
            state: Self::state_of(authorization_url),
            error: None,
        })
    }
}

#[tokio::test]
async fn code_exchange_stores_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2F127.0.0.1%3A8976%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_in": 1209600,
            "refresh_token": "refresh-1",
            "refresh_token_expires_in": 7776000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = authenticator(&server);
    auth.authorize("the-code").await.unwrap();

    assert!(auth.is_authorized());
    assert_eq!(auth.get_token().await.unwrap(), "access-1");
    let tokens = auth.tokens();
    assert_eq!(tokens.refresh_token.map(|t| t.value).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn launcher_flow_validates_state_and_exchanges_code() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "authorization_code", json!({ "access_token": "access-1" })).await;

    let auth = authenticator(&server);
    let launcher = EchoLauncher::new();
    auth.authorize_with(&launcher).await.unwrap();

    let seen = launcher.seen.lock().unwrap()[0].clone();
    assert!(seen.starts_with(&format!("{}/authorize?response_type=code", server.uri())));
    assert_eq!(auth.get_token().await.unwrap(), "access-1");
}

#[tokio::test]
async fn rejected_code_leaves_authenticator_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&server)
        .await;

    let auth = authenticator(&server);
    let err = auth.authorize("stale").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(!auth.is_authorized());
}

#[tokio::test]
async fn expired_access_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::with_dir(dir.path()).unwrap();
    cache
        .save(
            TOKENS_FILE,
            &TokenStore {
                access_token: Some(AccessToken {
                    value: "access-1".to_string(),
                    expires: 0,
                }),
                refresh_token: Some(AccessToken::expiring_in("refresh-1", 3600)),
            },
        )
        .unwrap();

    let auth = authenticator(&server)
        .with_cache(Cache::with_dir(dir.path()).unwrap())
        .unwrap();
    assert!(auth.is_authorized());
    assert_eq!(auth.get_token().await.unwrap(), "access-2");

    // A response without a refresh token keeps the previous one
    let stored: TokenStore = cache.load(TOKENS_FILE).unwrap().unwrap();
    assert_eq!(stored.access_token.map(|t| t.value).as_deref(), Some("access-2"));
    assert_eq!(stored.refresh_token.map(|t| t.value).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn sso_flow_exchanges_code_through_wrapped_authenticator() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "authorization_code", json!({ "access_token": "sso-access" })).await;

    let mut extra = BTreeMap::new();
    extra.insert("tenant".to_string(), "acme".to_string());
    let oauth = Arc::new(authenticator(&server));
    let sso = SsoAuthenticator::new(
        oauth.clone(),
        "jane@example.com",
        "https://idp.example.com/sso",
        extra,
    );

    let launcher = EchoLauncher::new();
    sso.authorize(&launcher).await.unwrap();

    let seen = launcher.seen.lock().unwrap()[0].clone();
    assert!(seen.starts_with("https://idp.example.com/sso?returnTo="));
    assert!(seen.ends_with("&tenant=acme"));

    assert!(sso.is_authorized());
    assert_eq!(sso.get_token().await.unwrap(), "sso-access");
    assert_eq!(oauth.get_token().await.unwrap(), "sso-access");

    sso.deauthorize().unwrap();
    assert!(!oauth.is_authorized());
}

struct ErrorLauncher;

#[async_trait]
impl AuthorizationLauncher for ErrorLauncher {
    async fn launch(&self, _: &Url, _: &str) -> Result<AuthorizationResponse> {
        Ok(AuthorizationResponse::from_query(
            "error=access_denied&error_description=User+declined",
        ))
    }
}

#[tokio::test]
async fn denied_consent_is_an_authorization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = authenticator(&server);
    match auth.authorize_with(&ErrorLauncher).await {
        Err(WebexError::Authorization(message)) => assert!(message.contains("User declined")),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(!auth.is_authorized());
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 3600,
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    Cache::with_dir(dir.path())
        .unwrap()
        .save(
            TOKENS_FILE,
            &TokenStore {
                access_token: None,
                refresh_token: Some(AccessToken::expiring_in("refresh-1", 3600)),
            },
        )
        .unwrap();
    let auth = authenticator(&server)
        .with_cache(Cache::with_dir(dir.path()).unwrap())
        .unwrap();

    let (first, second) = tokio::join!(auth.get_token(), auth.get_token());
    assert_eq!(first.unwrap(), "access-2");
    assert_eq!(second.unwrap(), "access-2");
    assert_eq!(
        auth.tokens().refresh_token.map(|t| t.value).as_deref(),
        Some("refresh-2")
    );
}
