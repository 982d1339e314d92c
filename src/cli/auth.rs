use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use webex_cli::api::{
    generate_state, Authenticator, BrowserLauncher, OAuthAuthenticator, SsoAuthenticator,
    WebexClient,
};
use webex_cli::Config;

use super::output::{print_error, print_info, print_success};

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in through the OAuth code grant
    Login {
        /// Route the sign-in through the configured SSO identity provider
        #[arg(long)]
        sso: bool,

        /// Print the URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Print the authorization URL without signing in
    Url {
        /// Build the SSO identity provider URL
        #[arg(long)]
        sso: bool,
    },

    /// Store a personal access token
    Token {
        /// Access token value
        token: String,

        /// Token lifetime in seconds
        #[arg(long, default_value = "43200")]
        expires_in: u64,
    },

    /// Check authentication status
    Status,

    /// Logout and clear tokens
    Logout,

    /// Refresh the access token
    Refresh,
}

pub async fn execute(cmd: AuthCommand, config: &Config) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login { sso, no_browser } => {
            require_client_id(config)?;
            login(config, sso, no_browser).await
        }
        AuthSubcommand::Url { sso } => {
            require_client_id(config)?;
            url(config, sso)
        }
        AuthSubcommand::Token { token, expires_in } => store_token(config, &token, expires_in),
        AuthSubcommand::Status => status(config).await,
        AuthSubcommand::Logout => logout(config),
        AuthSubcommand::Refresh => {
            require_client_id(config)?;
            refresh(config).await
        }
    }
}

fn require_client_id(config: &Config) -> Result<()> {
    if config.auth.client_id.is_empty() {
        bail!(
            "No client id configured. Set [auth] client_id in {:?} or WEBEX_CLIENT_ID.",
            Config::config_path()?
        );
    }
    Ok(())
}

fn sso_authenticator(config: &Config, oauth: Arc<OAuthAuthenticator>) -> Result<SsoAuthenticator> {
    match &config.auth.sso {
        Some(sso) => Ok(SsoAuthenticator::from_config(oauth, sso)),
        None => bail!("No [auth.sso] section in {:?}", Config::config_path()?),
    }
}

async fn login(config: &Config, sso: bool, no_browser: bool) -> Result<()> {
    let oauth = Arc::new(OAuthAuthenticator::from_config(config)?);
    let launcher = if no_browser {
        BrowserLauncher::new().without_browser()
    } else {
        BrowserLauncher::new()
    };

    if sso {
        sso_authenticator(config, oauth)?.authorize(&launcher).await?;
    } else {
        oauth.authorize_with(&launcher).await?;
    }

    print_success("Successfully authenticated!");
    print_info("You can now use webex-cli commands.");
    Ok(())
}

fn url(config: &Config, sso: bool) -> Result<()> {
    let oauth = Arc::new(OAuthAuthenticator::from_config(config)?);
    let url = if sso {
        sso_authenticator(config, oauth)?.build_code_grant_url(&generate_state())?
    } else {
        oauth.authorization_url(&generate_state())?
    };
    println!("{}", url);
    Ok(())
}

fn store_token(config: &Config, token: &str, expires_in: u64) -> Result<()> {
    OAuthAuthenticator::from_config(config)?.set_access_token(token, expires_in)?;
    print_success("Access token stored");
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let oauth = Arc::new(OAuthAuthenticator::from_config(config)?);

    if oauth.is_authorized() {
        print_success("Authenticated");

        let client = WebexClient::from_config(config, oauth)?;
        match client.get_me().await {
            Ok(person) => {
                if let Some(name) = &person.display_name {
                    println!("  User: {}", name);
                }
                if let Some(email) = person.primary_email() {
                    println!("  Email: {}", email);
                }
            }
            Err(_) => {
                print_info("Token may be expired. Run 'webex-cli auth refresh' to renew.");
            }
        }
    } else {
        print_error("Not authenticated");
        print_info("Run 'webex-cli auth login' to authenticate.");
    }

    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    OAuthAuthenticator::from_config(config)?.deauthorize()?;
    print_success("Logged out successfully");
    Ok(())
}

async fn refresh(config: &Config) -> Result<()> {
    let oauth = OAuthAuthenticator::from_config(config)?;

    if !oauth.is_authorized() {
        print_error("Not authenticated. Run 'webex-cli auth login' first.");
        return Ok(());
    }

    print_info("Refreshing tokens...");
    match oauth.refresh_token().await {
        Ok(_) => print_success("Tokens refreshed successfully"),
        Err(e) => {
            print_error(&format!("Failed to refresh tokens: {}", e));
            print_info("You may need to re-authenticate with 'webex-cli auth login'");
        }
    }

    Ok(())
}
