use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Activity, Conversation, Participant, Verb, WebexId, WebexIdType};
use crate::error::{Result, WebexError};

/// Association between a person and a space.
///
/// Built once (from the REST payload or projected from conversation data) and
/// read through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    person_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    person_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    person_org_id: Option<String>,
    #[serde(rename = "roomId", alias = "spaceId")]
    space_id: String,
    #[serde(default)]
    is_moderator: bool,
    #[serde(default)]
    is_monitor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,
}

impl Membership {
    /// Project a membership from a conversation and one of its participants.
    ///
    /// Conversation payloads carry no creation time, so `created` is unset.
    pub fn from_conversation(conversation: &Conversation, person: &Participant) -> Self {
        let is_moderator = person.is_moderator();
        Self {
            id: Some(
                WebexId::new(
                    WebexIdType::Membership,
                    format!("{}:{}", person.id, conversation.id),
                )
                .to_hydra_id(),
            ),
            space_id: WebexId::new(WebexIdType::Room, &conversation.id).to_hydra_id(),
            created: None,
            is_moderator,
            is_monitor: is_moderator,
            ..Self::person_fields(person)
        }
    }

    /// Project a membership from an activity event.
    ///
    /// `hide` activities name the space in their object, every other verb in
    /// the target. The member is the actor of an `acknowledge`, otherwise the
    /// object when it is a person; without one only the space and the
    /// timestamp are set.
    pub fn from_activity(activity: &Activity) -> Result<Self> {
        let space = if activity.verb == Verb::Hide {
            Some(&activity.object)
        } else {
            activity.target.as_ref()
        };
        let space_uuid = space.and_then(|o| o.id()).ok_or_else(|| {
            WebexError::InvalidId(format!(
                "{:?} activity without a space reference",
                activity.verb
            ))
        })?;
        let space_id = WebexId::new(WebexIdType::Room, space_uuid).to_hydra_id();

        let person = if activity.verb == Verb::Acknowledge {
            Some(&activity.actor)
        } else {
            activity.object.as_participant()
        };

        let mut membership = match person {
            Some(person) => {
                let is_moderator = person.is_moderator();
                Self {
                    id: Some(
                        WebexId::new(
                            WebexIdType::Membership,
                            format!("{}:{}", person.id, WebexId::translate(&space_id)?),
                        )
                        .to_hydra_id(),
                    ),
                    is_moderator,
                    is_monitor: is_moderator,
                    ..Self::person_fields(person)
                }
            }
            None => Self::empty(),
        };
        membership.space_id = space_id;
        membership.created = activity.published;
        Ok(membership)
    }

    fn empty() -> Self {
        Self {
            id: None,
            person_id: None,
            person_email: None,
            person_display_name: None,
            person_org_id: None,
            space_id: String::new(),
            is_moderator: false,
            is_monitor: false,
            created: None,
        }
    }

    fn person_fields(person: &Participant) -> Self {
        Self {
            person_id: Some(WebexId::new(WebexIdType::People, &person.id).to_hydra_id()),
            person_email: person.email_address.clone(),
            person_display_name: person.display_name.clone(),
            person_org_id: person
                .org_id
                .as_ref()
                .map(|org| WebexId::new(WebexIdType::Organization, org).to_hydra_id()),
            ..Self::empty()
        }
    }

    /// The id of this membership
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id of the person
    pub fn person_id(&self) -> Option<&str> {
        self.person_id.as_deref()
    }

    /// The email address of the person
    pub fn person_email(&self) -> Option<&str> {
        self.person_email.as_deref()
    }

    /// The display name of the person
    pub fn person_display_name(&self) -> Option<&str> {
        self.person_display_name.as_deref()
    }

    /// The organization id of the person
    pub fn person_org_id(&self) -> Option<&str> {
        self.person_org_id.as_deref()
    }

    /// The id of the space
    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    /// True if this member moderates the space
    pub fn is_moderator(&self) -> bool {
        self.is_moderator
    }

    #[deprecated(note = "use `is_moderator`")]
    pub fn is_monitor(&self) -> bool {
        self.is_monitor
    }

    /// When the membership was created; unknown for projected memberships
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
