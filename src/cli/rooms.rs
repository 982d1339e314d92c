use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use webex_cli::api::RoomQuery;
use webex_cli::types::{Room, RoomSortBy, RoomType};
use webex_cli::Config;

use super::output::{print_output, print_single, print_success};
use super::{connect, OutputFormat};

#[derive(Args, Debug)]
pub struct RoomsCommand {
    #[command(subcommand)]
    pub command: RoomsSubcommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoomTypeArg {
    Direct,
    Group,
}

impl From<RoomTypeArg> for RoomType {
    fn from(arg: RoomTypeArg) -> Self {
        match arg {
            RoomTypeArg::Direct => RoomType::Direct,
            RoomTypeArg::Group => RoomType::Group,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Id,
    LastActivity,
    Created,
}

impl From<SortArg> for RoomSortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => RoomSortBy::Id,
            SortArg::LastActivity => RoomSortBy::LastActivity,
            SortArg::Created => RoomSortBy::Created,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RoomsSubcommand {
    /// List rooms you are in
    List {
        /// Only rooms of this team
        #[arg(short, long)]
        team: Option<String>,

        /// Only direct or group rooms
        #[arg(long = "type", value_enum)]
        room_type: Option<RoomTypeArg>,

        /// Sort order
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Maximum number of rooms to return
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Create a room
    Create {
        /// Room title
        title: String,

        /// Create the room inside this team
        #[arg(short, long)]
        team: Option<String>,
    },

    /// Show room details
    Show {
        /// Room ID
        room_id: String,
    },

    /// Change a room's title
    Update {
        /// Room ID
        room_id: String,

        /// New title
        title: String,
    },

    /// Delete a room
    Delete {
        /// Room ID
        room_id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    room_type: String,
    #[tabled(rename = "Locked")]
    locked: bool,
    #[tabled(rename = "Last activity")]
    last_activity: String,
}

impl From<Room> for RoomRow {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            title: room.title.unwrap_or_default(),
            room_type: room.room_type.map(|t| t.to_string()).unwrap_or_default(),
            locked: room.is_locked,
            last_activity: room
                .last_activity
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

pub async fn execute(cmd: RoomsCommand, config: &Config, format: OutputFormat) -> Result<()> {
    let client = connect(config)?;

    match cmd.command {
        RoomsSubcommand::List {
            team,
            room_type,
            sort,
            max,
        } => {
            let query = RoomQuery {
                team_id: team,
                room_type: room_type.map(Into::into),
                sort_by: sort.map(Into::into),
                max,
            };
            let rows: Vec<RoomRow> = client
                .list_rooms(&query)
                .await?
                .into_iter()
                .map(RoomRow::from)
                .collect();
            print_output(&rows, format)
        }
        RoomsSubcommand::Create { title, team } => {
            print_single(&client.create_room(&title, team.as_deref()).await?, format)
        }
        RoomsSubcommand::Show { room_id } => print_single(&client.get_room(&room_id).await?, format),
        RoomsSubcommand::Update { room_id, title } => {
            print_single(&client.update_room(&room_id, &title).await?, format)
        }
        RoomsSubcommand::Delete { room_id } => {
            client.delete_room(&room_id).await?;
            print_success(&format!("Deleted room {}", room_id));
            Ok(())
        }
    }
}
