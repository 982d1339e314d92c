//! Authorization launchers.
//!
//! A launcher shows the authorization page to the user and hands back the
//! parameters of the redirect that ends the OAuth dialog. The default
//! [`BrowserLauncher`] opens the system browser and either captures the
//! redirect on a loopback listener or asks the user to paste the final URL.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, WebexError};

/// Parameters carried by the redirect back to the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl AuthorizationResponse {
    /// Parse the query string of a redirect
    pub fn from_query(query: &str) -> Self {
        let mut response = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => response.code = Some(value.into_owned()),
                "state" => response.state = Some(value.into_owned()),
                "error" => {
                    response.error.get_or_insert_with(|| value.into_owned());
                }
                "error_description" => response.error = Some(value.into_owned()),
                _ => {}
            }
        }
        response
    }

    /// Parse a full redirect URL
    pub fn from_redirect(redirect: &str) -> Result<Self> {
        let url = Url::parse(redirect.trim())?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }

    /// Extract the authorization code, checking the error and state fields
    pub fn into_code(self, expected_state: &str) -> Result<String> {
        if let Some(error) = self.error {
            return Err(WebexError::Authorization(error));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err(WebexError::Authorization(
                "state mismatch in OAuth redirect".to_string(),
            ));
        }
        match self.code {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(WebexError::Authorization(
                "authorization code missing from redirect".to_string(),
            )),
        }
    }
}

/// Generate a random `state` nonce for one authorization attempt
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// How long a single loopback connection may take to send its request
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Presents the authorization page and waits for the redirect
#[async_trait]
pub trait AuthorizationLauncher: Send + Sync {
    async fn launch(&self, authorization_url: &Url, redirect_uri: &str)
        -> Result<AuthorizationResponse>;
}

/// Launcher backed by the system browser
#[derive(Debug, Clone)]
pub struct BrowserLauncher {
    open_browser: bool,
    timeout: Duration,
}

impl Default for BrowserLauncher {
    fn default() -> Self {
        Self {
            open_browser: true,
            timeout: Duration::from_secs(300),
        }
    }
}

impl BrowserLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only print the URL instead of opening a browser
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn present(&self, authorization_url: &Url) {
        eprintln!("Open the following URL in your browser to sign in to Webex:");
        eprintln!("  {}", authorization_url);
        if self.open_browser {
            if let Err(e) = open::that(authorization_url.as_str()) {
                warn!("Could not open browser: {}", e);
            }
        }
    }

    async fn wait_for_callback(
        &self,
        listener: TcpListener,
        callback_path: &str,
    ) -> Result<AuthorizationResponse> {
        let (tx, mut rx) = mpsc::channel(1);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    debug!("OAuth callback connection from {}", peer);
                    let tx = tx.clone();
                    let callback_path = callback_path.to_string();
                    tokio::spawn(async move {
                        match timeout(CONNECTION_TIMEOUT, handle_callback(stream, &callback_path)).await {
                            Ok(Ok(Some(response))) => {
                                let _ = tx.send(response).await;
                            }
                            Ok(Ok(None)) => {}
                            Ok(Err(e)) => warn!("Ignoring bad request from {}: {}", peer, e),
                            Err(_) => debug!("Connection from {} sent no request", peer),
                        }
                    });
                }
                Some(response) = rx.recv() => return Ok(response),
            }
        }
    }

    async fn read_pasted_redirect(&self) -> Result<AuthorizationResponse> {
        eprintln!("After signing in, paste the URL you were redirected to:");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await? {
            Some(line) => AuthorizationResponse::from_redirect(&line),
            None => Err(WebexError::Authorization(
                "no redirect URL provided".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AuthorizationLauncher for BrowserLauncher {
    async fn launch(
        &self,
        authorization_url: &Url,
        redirect_uri: &str,
    ) -> Result<AuthorizationResponse> {
        let redirect = Url::parse(redirect_uri)?;

        match loopback_address(&redirect) {
            Some(addr) => {
                let listener = TcpListener::bind(addr).await?;
                debug!("Listening for OAuth redirect on {}", addr);
                self.present(authorization_url);
                timeout(
                    self.timeout,
                    self.wait_for_callback(listener, redirect.path()),
                )
                .await
                .map_err(|_| {
                    WebexError::Authorization("timed out waiting for the OAuth redirect".into())
                })?
            }
            None => {
                self.present(authorization_url);
                self.read_pasted_redirect().await
            }
        }
    }
}

/// Socket address to listen on when the redirect URI points back at this machine
pub fn loopback_address(redirect: &Url) -> Option<SocketAddr> {
    if redirect.scheme() != "http" {
        return None;
    }
    let ip: IpAddr = match redirect.host_str()? {
        "localhost" => IpAddr::from([127, 0, 0, 1]),
        "[::1]" => IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1]),
        host => host.parse::<IpAddr>().ok().filter(IpAddr::is_loopback)?,
    };
    Some(SocketAddr::new(ip, redirect.port_or_known_default()?))
}

/// Serve one request; returns the redirect parameters if it hit the callback path
async fn handle_callback(
    stream: TcpStream,
    callback_path: &str,
) -> Result<Option<AuthorizationResponse>> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let mut request_line = String::new();
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            break;
        }
        if request_line.is_empty() {
            request_line = line;
        }
    }

    // "GET /callback?code=...&state=... HTTP/1.1"
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    if path != callback_path {
        write_half
            .write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
            .await?;
        return Ok(None);
    }

    let body = "Authorization complete. You may close this tab.";
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    // Keep the redirect even if the browser already hung up
    if let Err(e) = write_half.write_all(response.as_bytes()).await {
        debug!("Could not answer OAuth callback: {}", e);
    }
    write_half.shutdown().await.ok();

    Ok(Some(AuthorizationResponse::from_query(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_redirect_with_code() {
        let response = AuthorizationResponse::from_redirect(
            "http://127.0.0.1:8976/callback?code=abc%20def&state=xyz",
        )
        .unwrap();
        assert_eq!(response.code.as_deref(), Some("abc def"));
        assert_eq!(response.state.as_deref(), Some("xyz"));
        assert_eq!(response.into_code("xyz").unwrap(), "abc def");
    }

    #[test]
    fn parses_custom_scheme_redirect() {
        let response =
            AuthorizationResponse::from_redirect("myapp://oauth?code=c1&state=s1").unwrap();
        assert_eq!(response.code.as_deref(), Some("c1"));
    }

    #[test]
    fn error_redirect_is_rejected() {
        let response = AuthorizationResponse::from_query(
            "error=access_denied&error_description=User%20declined&state=s",
        );
        match response.into_code("s") {
            Err(WebexError::Authorization(message)) => assert_eq!(message, "User declined"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn state_mismatch_and_empty_code_are_rejected() {
        assert!(AuthorizationResponse::from_query("code=c&state=other")
            .into_code("s")
            .is_err());
        assert!(AuthorizationResponse::from_query("code=&state=s")
            .into_code("s")
            .is_err());
        assert!(AuthorizationResponse::from_query("state=s").into_code("s").is_err());
    }

    #[test]
    fn detects_loopback_redirects() {
        let local = Url::parse("http://127.0.0.1:8976/callback").unwrap();
        assert_eq!(
            loopback_address(&local),
            Some("127.0.0.1:8976".parse().unwrap())
        );
        let localhost = Url::parse("http://localhost:9000/cb").unwrap();
        assert_eq!(
            loopback_address(&localhost).map(|a| a.port()),
            Some(9000)
        );
        assert!(loopback_address(&Url::parse("https://127.0.0.1/cb").unwrap()).is_none());
        assert!(loopback_address(&Url::parse("http://example.com/cb").unwrap()).is_none());
        assert!(loopback_address(&Url::parse("myapp://oauth").unwrap()).is_none());
    }

    #[test]
    fn states_are_unique() {
        assert_ne!(generate_state(), generate_state());
    }

    #[tokio::test]
    async fn captures_loopback_callback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let launcher = BrowserLauncher::new().without_browser();

        let server = tokio::spawn(async move {
            launcher.wait_for_callback(listener, "/callback").await
        });

        // A stray request first, then the real redirect
        for target in ["/favicon.ico", "/callback?code=the-code&state=st"] {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target).as_bytes())
                .await
                .unwrap();
            let mut reply = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut reply)
                .await
                .unwrap();
            assert!(reply.starts_with("HTTP/1.1"));
        }

        let response = server.await.unwrap().unwrap();
        assert_eq!(response.code.as_deref(), Some("the-code"));
        assert_eq!(response.state.as_deref(), Some("st"));
    }

    async fn send_callback(addr: SocketAddr, target: &str) -> TcpStream {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target).as_bytes())
            .await
            .unwrap();
        stream
    }

    #[tokio::test]
    async fn idle_connection_does_not_block_callback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let launcher = BrowserLauncher::new().without_browser();
        let server = tokio::spawn(async move {
            launcher.wait_for_callback(listener, "/callback").await
        });

        // Preconnect that never sends anything
        let _idle = TcpStream::connect(addr).await.unwrap();
        let _callback = send_callback(addr, "/callback?code=c&state=s").await;

        let response = timeout(Duration::from_secs(3), server)
            .await
            .expect("callback was not served while a connection sat idle")
            .unwrap()
            .unwrap();
        assert_eq!(response.code.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn garbage_request_does_not_abort_login() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let launcher = BrowserLauncher::new().without_browser();
        let server = tokio::spawn(async move {
            launcher.wait_for_callback(listener, "/callback").await
        });

        let mut garbage = TcpStream::connect(addr).await.unwrap();
        garbage.write_all(b"\xff\xfe\r\n\r\n").await.unwrap();
        drop(garbage);
        let _callback = send_callback(addr, "/callback?code=c&state=s").await;

        let response = timeout(Duration::from_secs(3), server)
            .await
            .expect("login stopped waiting after a bad request")
            .unwrap()
            .unwrap();
        assert_eq!(response.state.as_deref(), Some("s"));
    }
}
