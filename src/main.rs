mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webex_cli::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webex_cli=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    cli.apply_credentials(&mut config);
    if !config.output.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Auth(cmd) => cli::auth::execute(cmd, &config).await,
        Commands::Teams(cmd) => cli::teams::execute(cmd, &config, cli.format).await,
        Commands::Memberships(cmd) => cli::memberships::execute(cmd, &config, cli.format).await,
        Commands::Rooms(cmd) => cli::rooms::execute(cmd, &config, cli.format).await,
        Commands::Completions(cmd) => cli::completions::execute(cmd),
    }
}
