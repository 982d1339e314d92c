use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a space is a 1:1 conversation or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Direct,
    Group,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::Direct => f.write_str("direct"),
            RoomType::Group => f.write_str("group"),
        }
    }
}

/// Sort order accepted by the room listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSortBy {
    Id,
    LastActivity,
    Created,
}

impl RoomSortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomSortBy::Id => "id",
            RoomSortBy::LastActivity => "lastactivity",
            RoomSortBy::Created => "created",
        }
    }
}

/// A space (room)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    #[serde(default)]
    pub is_locked: bool,
    pub team_id: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
    pub creator_id: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub sip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_room() {
        let room: Room = serde_json::from_str(
            r#"{
                "id": "r1",
                "title": "Design",
                "type": "group",
                "isLocked": true,
                "teamId": "t1",
                "lastActivity": "2020-05-01T12:00:00.000Z",
                "created": "2020-01-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();

        assert_eq!(room.room_type, Some(RoomType::Group));
        assert!(room.is_locked);
        assert_eq!(room.team_id.as_deref(), Some("t1"));
        assert!(room.creator_id.is_none());
    }
}
