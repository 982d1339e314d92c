pub mod auth;
pub mod completions;
pub mod memberships;
pub mod output;
pub mod rooms;
pub mod teams;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use webex_cli::api::{OAuthAuthenticator, WebexClient};
use webex_cli::Config;

/// Cisco Webex CLI: sign in with OAuth or SSO and manage teams, rooms and memberships
#[derive(Parser, Debug)]
#[command(name = "webex-cli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// OAuth client id of the Webex integration
    #[arg(long, env = "WEBEX_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret of the Webex integration
    #[arg(long, env = "WEBEX_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Layer the credential flags (or their environment variables) over the config file
    pub fn apply_credentials(&self, config: &mut Config) {
        if let Some(client_id) = &self.client_id {
            config.auth.client_id = client_id.clone();
        }
        if let Some(client_secret) = &self.client_secret {
            config.auth.client_secret = client_secret.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands
    Auth(auth::AuthCommand),

    /// Team operations
    Teams(teams::TeamsCommand),

    /// Space membership operations
    Memberships(memberships::MembershipsCommand),

    /// Room (space) operations
    Rooms(rooms::RoomsCommand),

    /// Generate shell completions
    Completions(completions::CompletionsCommand),
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table output
    #[default]
    Table,
    /// Plain output (minimal, for scripting)
    Plain,
}

/// Build an API client using the stored tokens
pub fn connect(config: &Config) -> Result<WebexClient> {
    let authenticator = Arc::new(OAuthAuthenticator::from_config(config)?);
    Ok(WebexClient::from_config(config, authenticator)?)
}
