use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team groups spaces and people
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: Option<String>,
    pub creator_id: Option<String>,
    pub created: Option<DateTime<Utc>>,
}
