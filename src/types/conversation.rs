//! Conversation-service payloads.
//!
//! These are the shapes pushed by the conversation service (conversations,
//! participants, activities). They carry raw uuids, not encoded REST ids, and
//! are only used as input when projecting public resources such as
//! [`Membership`](super::Membership).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-space flags of a participant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomProperties {
    #[serde(default)]
    pub is_moderator: bool,
}

/// A person as seen by the conversation service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    pub org_id: Option<String>,
    pub room_properties: Option<RoomProperties>,
}

impl Participant {
    pub fn is_moderator(&self) -> bool {
        self.room_properties
            .as_ref()
            .map(|p| p.is_moderator)
            .unwrap_or(false)
    }
}

/// A conversation (space) reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub display_name: Option<String>,
}

/// Activity verbs relevant to memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Add,
    Leave,
    Assign,
    Unassign,
    Hide,
    Acknowledge,
    Update,
    #[serde(other)]
    Other,
}

/// Object or target of an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "objectType", rename_all = "lowercase")]
pub enum ActivityObject {
    Person(Participant),
    Conversation(Conversation),
    #[serde(other)]
    Unknown,
}

impl ActivityObject {
    pub fn id(&self) -> Option<&str> {
        match self {
            ActivityObject::Person(p) => Some(&p.id),
            ActivityObject::Conversation(c) => Some(&c.id),
            ActivityObject::Unknown => None,
        }
    }

    pub fn as_participant(&self) -> Option<&Participant> {
        match self {
            ActivityObject::Person(p) => Some(p),
            _ => None,
        }
    }
}

/// An event in a conversation's activity stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: Option<String>,
    pub verb: Verb,
    pub actor: Participant,
    pub object: ActivityObject,
    #[serde(default)]
    pub target: Option<ActivityObject>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}
