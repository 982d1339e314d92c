use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::auth::Authenticator;
use super::{endpoint, HYDRA_ENDPOINT};
use crate::config::Config;
use crate::error::{Result, WebexError};
use crate::types::*;

/// Filters for listing memberships
#[derive(Debug, Clone, Default)]
pub struct MembershipQuery {
    pub room_id: Option<String>,
    pub person_id: Option<String>,
    pub person_email: Option<String>,
    pub max: Option<u32>,
}

impl MembershipQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(room_id) = &self.room_id {
            params.push(("roomId", room_id.clone()));
        }
        if let Some(person_id) = &self.person_id {
            params.push(("personId", person_id.clone()));
        }
        if let Some(email) = &self.person_email {
            params.push(("personEmail", email.clone()));
        }
        if let Some(max) = self.max {
            params.push(("max", max.to_string()));
        }
        params
    }
}

/// Filters for listing rooms
#[derive(Debug, Clone, Default)]
pub struct RoomQuery {
    pub team_id: Option<String>,
    pub room_type: Option<RoomType>,
    pub sort_by: Option<RoomSortBy>,
    pub max: Option<u32>,
}

impl RoomQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(team_id) = &self.team_id {
            params.push(("teamId", team_id.clone()));
        }
        if let Some(room_type) = self.room_type {
            params.push(("type", room_type.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            params.push(("sortBy", sort_by.as_str().to_string()));
        }
        if let Some(max) = self.max {
            params.push(("max", max.to_string()));
        }
        params
    }
}

/// Who to add to a space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    PersonId(String),
    Email(String),
}

/// Webex REST API client
pub struct WebexClient {
    http: Client,
    base_url: Url,
    authenticator: Arc<dyn Authenticator>,
}

impl WebexClient {
    /// Create a client against the public Webex endpoint
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            base_url: Url::parse(HYDRA_ENDPOINT)?,
            authenticator,
        })
    }

    /// Create a client honouring the `[api]` section
    pub fn from_config(config: &Config, authenticator: Arc<dyn Authenticator>) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .timeout(Duration::from_secs(config.api.timeout))
                .build()?,
            base_url: Url::parse(&config.api.base_url)?,
            authenticator,
        })
    }

    /// Use another Hydra endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let token = self.authenticator.get_token().await?;
        let url = endpoint(&self.base_url, segments)?;
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn check(operation: &str, res: Response) -> Result<Response> {
        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(WebexError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let res = self
            .request(Method::GET, segments)
            .await?
            .query(query)
            .send()
            .await?;
        let body = Self::check(operation, res).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        segments: &[&str],
        body: &Value,
    ) -> Result<T> {
        let res = self
            .request(method, segments)
            .await?
            .json(body)
            .send()
            .await?;
        let body = Self::check(operation, res).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete(&self, operation: &str, segments: &[&str]) -> Result<()> {
        let res = self.request(Method::DELETE, segments).await?.send().await?;
        Self::check(operation, res).await?;
        Ok(())
    }

    // Teams

    /// List teams the user belongs to
    pub async fn list_teams(&self, max: Option<u32>) -> Result<Vec<Team>> {
        let query: Vec<_> = max.map(|m| ("max", m.to_string())).into_iter().collect();
        let list: ListResponse<Team> = self.get_json("list teams", &["teams"], &query).await?;
        Ok(list.items)
    }

    pub async fn create_team(&self, name: &str) -> Result<Team> {
        self.send_json("create team", Method::POST, &["teams"], &json!({ "name": name }))
            .await
    }

    pub async fn get_team(&self, team_id: &str) -> Result<Team> {
        self.get_json("get team", &["teams", team_id], &[]).await
    }

    /// Rename a team
    pub async fn update_team(&self, team_id: &str, name: &str) -> Result<Team> {
        self.send_json(
            "update team",
            Method::PUT,
            &["teams", team_id],
            &json!({ "name": name }),
        )
        .await
    }

    pub async fn delete_team(&self, team_id: &str) -> Result<()> {
        self.delete("delete team", &["teams", team_id]).await
    }

    // Memberships

    /// List memberships, optionally filtered by space or person
    pub async fn list_memberships(&self, query: &MembershipQuery) -> Result<Vec<Membership>> {
        let list: ListResponse<Membership> = self
            .get_json("list memberships", &["memberships"], &query.params())
            .await?;
        Ok(list.items)
    }

    /// Add a person to a space
    pub async fn create_membership(
        &self,
        room_id: &str,
        member: &Member,
        is_moderator: bool,
    ) -> Result<Membership> {
        let mut body = json!({ "roomId": room_id, "isModerator": is_moderator });
        match member {
            Member::PersonId(id) => body["personId"] = json!(id),
            Member::Email(email) => body["personEmail"] = json!(email),
        }
        self.send_json("create membership", Method::POST, &["memberships"], &body)
            .await
    }

    pub async fn get_membership(&self, membership_id: &str) -> Result<Membership> {
        self.get_json("get membership", &["memberships", membership_id], &[])
            .await
    }

    /// Grant or revoke moderator rights
    pub async fn update_membership(
        &self,
        membership_id: &str,
        is_moderator: bool,
    ) -> Result<Membership> {
        self.send_json(
            "update membership",
            Method::PUT,
            &["memberships", membership_id],
            &json!({ "isModerator": is_moderator }),
        )
        .await
    }

    pub async fn delete_membership(&self, membership_id: &str) -> Result<()> {
        self.delete("delete membership", &["memberships", membership_id])
            .await
    }

    // Rooms

    pub async fn list_rooms(&self, query: &RoomQuery) -> Result<Vec<Room>> {
        let list: ListResponse<Room> = self
            .get_json("list rooms", &["rooms"], &query.params())
            .await?;
        Ok(list.items)
    }

    /// Create a space, inside a team when `team_id` is given
    pub async fn create_room(&self, title: &str, team_id: Option<&str>) -> Result<Room> {
        let mut body = json!({ "title": title });
        if let Some(team_id) = team_id {
            body["teamId"] = json!(team_id);
        }
        self.send_json("create room", Method::POST, &["rooms"], &body)
            .await
    }

    pub async fn get_room(&self, room_id: &str) -> Result<Room> {
        self.get_json("get room", &["rooms", room_id], &[]).await
    }

    pub async fn update_room(&self, room_id: &str, title: &str) -> Result<Room> {
        self.send_json(
            "update room",
            Method::PUT,
            &["rooms", room_id],
            &json!({ "title": title }),
        )
        .await
    }

    pub async fn delete_room(&self, room_id: &str) -> Result<()> {
        self.delete("delete room", &["rooms", room_id]).await
    }

    // People

    /// Details of the authenticated user
    pub async fn get_me(&self) -> Result<Person> {
        self.get_json("get profile", &["people", "me"], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_query_params() {
        let query = MembershipQuery {
            room_id: Some("r1".into()),
            person_email: Some("jane@example.com".into()),
            max: Some(10),
            ..Default::default()
        };
        assert_eq!(
            query.params(),
            vec![
                ("roomId", "r1".to_string()),
                ("personEmail", "jane@example.com".to_string()),
                ("max", "10".to_string()),
            ]
        );
        assert!(MembershipQuery::default().params().is_empty());
    }

    #[test]
    fn room_query_params() {
        let query = RoomQuery {
            team_id: Some("t1".into()),
            room_type: Some(RoomType::Group),
            sort_by: Some(RoomSortBy::LastActivity),
            max: None,
        };
        assert_eq!(
            query.params(),
            vec![
                ("teamId", "t1".to_string()),
                ("type", "group".to_string()),
                ("sortBy", "lastactivity".to_string()),
            ]
        );
    }
}
