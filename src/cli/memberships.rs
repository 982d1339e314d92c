use anyhow::{bail, Result};
use clap::{ArgAction, ArgGroup, Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use webex_cli::api::{Member, MembershipQuery};
use webex_cli::types::Membership;
use webex_cli::Config;

use super::output::{print_output, print_single, print_success};
use super::{connect, OutputFormat};

#[derive(Args, Debug)]
pub struct MembershipsCommand {
    #[command(subcommand)]
    pub command: MembershipsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum MembershipsSubcommand {
    /// List memberships, filtered by room or person
    List {
        /// Room ID
        #[arg(short, long)]
        room: Option<String>,

        /// Person ID
        #[arg(long)]
        person_id: Option<String>,

        /// Person email
        #[arg(long)]
        email: Option<String>,

        /// Maximum number of memberships to return
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Add a person to a room
    #[command(group(ArgGroup::new("member").required(true).args(["person_id", "email"])))]
    Create {
        /// Room ID
        #[arg(short, long)]
        room: String,

        /// Person ID
        #[arg(long)]
        person_id: Option<String>,

        /// Person email
        #[arg(long)]
        email: Option<String>,

        /// Make the person a moderator
        #[arg(long)]
        moderator: bool,
    },

    /// Show membership details
    Show {
        /// Membership ID
        membership_id: String,
    },

    /// Grant or revoke moderator rights
    Update {
        /// Membership ID
        membership_id: String,

        /// Whether the person moderates the room
        #[arg(long, action = ArgAction::Set)]
        moderator: bool,
    },

    /// Remove a person from a room
    Delete {
        /// Membership ID
        membership_id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct MembershipRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Moderator")]
    moderator: bool,
    #[tabled(rename = "Room")]
    room: String,
}

impl From<&Membership> for MembershipRow {
    fn from(m: &Membership) -> Self {
        Self {
            id: m.id().unwrap_or_default().to_string(),
            name: m.person_display_name().unwrap_or_default().to_string(),
            email: m.person_email().unwrap_or_default().to_string(),
            moderator: m.is_moderator(),
            room: m.space_id().to_string(),
        }
    }
}

pub async fn execute(
    cmd: MembershipsCommand,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let client = connect(config)?;

    match cmd.command {
        MembershipsSubcommand::List {
            room,
            person_id,
            email,
            max,
        } => {
            let query = MembershipQuery {
                room_id: room,
                person_id,
                person_email: email,
                max,
            };
            let memberships = client.list_memberships(&query).await?;
            let rows: Vec<MembershipRow> = memberships.iter().map(MembershipRow::from).collect();
            print_output(&rows, format)
        }
        MembershipsSubcommand::Create {
            room,
            person_id,
            email,
            moderator,
        } => {
            let member = match (person_id, email) {
                (Some(id), _) => Member::PersonId(id),
                (None, Some(email)) => Member::Email(email),
                (None, None) => bail!("Either --person-id or --email is required"),
            };
            let membership = client.create_membership(&room, &member, moderator).await?;
            print_single(&membership, format)
        }
        MembershipsSubcommand::Show { membership_id } => {
            print_single(&client.get_membership(&membership_id).await?, format)
        }
        MembershipsSubcommand::Update {
            membership_id,
            moderator,
        } => print_single(
            &client.update_membership(&membership_id, moderator).await?,
            format,
        ),
        MembershipsSubcommand::Delete { membership_id } => {
            client.delete_membership(&membership_id).await?;
            print_success(&format!("Deleted membership {}", membership_id));
            Ok(())
        }
    }
}
