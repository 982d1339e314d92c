use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use webex_cli::types::Team;
use webex_cli::Config;

use super::output::{print_output, print_single, print_success};
use super::{connect, OutputFormat};

#[derive(Args, Debug)]
pub struct TeamsCommand {
    #[command(subcommand)]
    pub command: TeamsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamsSubcommand {
    /// List teams you belong to
    List {
        /// Maximum number of teams to return
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Create a team
    Create {
        /// Team name
        name: String,
    },

    /// Show team details
    Show {
        /// Team ID
        team_id: String,
    },

    /// Rename a team
    Update {
        /// Team ID
        team_id: String,

        /// New team name
        name: String,
    },

    /// Delete a team
    Delete {
        /// Team ID
        team_id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<Team> for TeamRow {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name.unwrap_or_default(),
            created: team.created.map(|c| c.to_rfc3339()).unwrap_or_default(),
        }
    }
}

pub async fn execute(cmd: TeamsCommand, config: &Config, format: OutputFormat) -> Result<()> {
    let client = connect(config)?;

    match cmd.command {
        TeamsSubcommand::List { max } => {
            let rows: Vec<TeamRow> = client
                .list_teams(max)
                .await?
                .into_iter()
                .map(TeamRow::from)
                .collect();
            print_output(&rows, format)
        }
        TeamsSubcommand::Create { name } => {
            print_single(&client.create_team(&name).await?, format)
        }
        TeamsSubcommand::Show { team_id } => print_single(&client.get_team(&team_id).await?, format),
        TeamsSubcommand::Update { team_id, name } => {
            print_single(&client.update_team(&team_id, &name).await?, format)
        }
        TeamsSubcommand::Delete { team_id } => {
            client.delete_team(&team_id).await?;
            print_success(&format!("Deleted team {}", team_id));
            Ok(())
        }
    }
}
