use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WebexError};

const ID_SCHEME: &str = "ciscospark://";
const DEFAULT_CLUSTER: &str = "us";

/// Kind of resource an encoded id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebexIdType {
    People,
    Room,
    Membership,
    Organization,
    Team,
    Message,
    TeamMembership,
}

impl WebexIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebexIdType::People => "PEOPLE",
            WebexIdType::Room => "ROOM",
            WebexIdType::Membership => "MEMBERSHIP",
            WebexIdType::Organization => "ORGANIZATION",
            WebexIdType::Team => "TEAM",
            WebexIdType::Message => "MESSAGE",
            WebexIdType::TeamMembership => "TEAM_MEMBERSHIP",
        }
    }
}

impl fmt::Display for WebexIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebexIdType {
    type Err = WebexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PEOPLE" => Ok(WebexIdType::People),
            "ROOM" => Ok(WebexIdType::Room),
            "MEMBERSHIP" => Ok(WebexIdType::Membership),
            "ORGANIZATION" => Ok(WebexIdType::Organization),
            "TEAM" => Ok(WebexIdType::Team),
            "MESSAGE" => Ok(WebexIdType::Message),
            "TEAM_MEMBERSHIP" => Ok(WebexIdType::TeamMembership),
            other => Err(WebexError::InvalidId(format!("unknown id type {}", other))),
        }
    }
}

/// A raw conversation-service id tagged with its resource type.
///
/// The public API exposes ids as unpadded base64 of
/// `ciscospark://<cluster>/<TYPE>/<uuid>`; this type converts between the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebexId {
    pub id_type: WebexIdType,
    pub cluster: String,
    pub uuid: String,
}

impl WebexId {
    pub fn new(id_type: WebexIdType, uuid: impl Into<String>) -> Self {
        Self {
            id_type,
            cluster: DEFAULT_CLUSTER.to_string(),
            uuid: uuid.into(),
        }
    }

    /// Encoded form used by the REST API
    pub fn to_hydra_id(&self) -> String {
        STANDARD_NO_PAD.encode(format!(
            "{}{}/{}/{}",
            ID_SCHEME, self.cluster, self.id_type, self.uuid
        ))
    }

    /// Decode an encoded REST id; padded and unpadded input are both accepted
    pub fn from_hydra_id(hydra_id: &str) -> Result<Self> {
        let trimmed = hydra_id.trim_end_matches('=');
        let bytes = STANDARD_NO_PAD
            .decode(trimmed)
            .or_else(|_| STANDARD.decode(hydra_id))
            .map_err(|e| WebexError::InvalidId(format!("{}: {}", hydra_id, e)))?;
        let decoded = String::from_utf8(bytes)
            .map_err(|_| WebexError::InvalidId(format!("{}: not UTF-8", hydra_id)))?;

        let rest = decoded
            .strip_prefix(ID_SCHEME)
            .ok_or_else(|| WebexError::InvalidId(format!("{}: missing scheme", hydra_id)))?;
        let mut parts = rest.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(cluster), Some(id_type), Some(uuid)) if !uuid.is_empty() => Ok(Self {
                id_type: id_type.parse()?,
                cluster: cluster.to_string(),
                uuid: uuid.to_string(),
            }),
            _ => Err(WebexError::InvalidId(format!(
                "{}: expected cluster/type/uuid",
                hydra_id
            ))),
        }
    }

    /// Recover the raw uuid from an encoded id
    pub fn translate(hydra_id: &str) -> Result<String> {
        Ok(Self::from_hydra_id(hydra_id)?.uuid)
    }
}

impl fmt::Display for WebexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hydra_id())
    }
}
