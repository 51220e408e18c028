// src/panel.rs
//
// Client for the Pterodactyl application API (`/api/application`).
// Auth: application API key as a bearer token.

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::tiers::{FeatureLimits, ResourceLimits};

const PAGE_SIZE: &str = "100";

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("panel api error status={status} detail={detail}")]
    Api { status: u16, detail: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelUser {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub root_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLimits {
    pub memory: i64,
    pub swap: i64,
    pub disk: i64,
    pub io: i64,
    pub cpu: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub id: i64,
    pub ip: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub port: i64,
    #[serde(default)]
    pub assigned: bool,
}

impl Allocation {
    pub fn address(&self) -> String {
        format!("{}:{}", self.alias.as_deref().unwrap_or(&self.ip), self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelServer {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub limits: ServerLimits,
    pub user: i64,
    #[serde(default)]
    pub node: i64,
    #[serde(default)]
    pub allocation: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(skip_deserializing, default)]
    pub allocations: Vec<Allocation>,
}

impl PanelServer {
    /// Address of the primary allocation, when allocations were loaded.
    pub fn primary_address(&self) -> Option<String> {
        self.allocations
            .iter()
            .find(|a| a.id == self.allocation)
            .or_else(|| self.allocations.first())
            .map(Allocation::address)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPanelUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationRequest {
    pub default: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewServer {
    pub name: String,
    pub description: String,
    pub user: i64,
    pub egg: i64,
    pub docker_image: String,
    pub startup: String,
    pub environment: Map<String, Value>,
    pub limits: ResourceLimits,
    pub feature_limits: FeatureLimits,
    pub allocation: AllocationRequest,
    pub start_on_completion: bool,
}

#[derive(Deserialize)]
struct Item<T> {
    attributes: T,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct List<T> {
    #[serde(default)]
    data: Vec<Item<T>>,
}

impl<T> List<T> {
    fn into_vec(self) -> Vec<T> {
        self.data.into_iter().map(|i| i.attributes).collect()
    }
}

#[derive(Deserialize)]
struct UserWithServers {
    #[serde(flatten)]
    user: PanelUser,
    #[serde(default)]
    relationships: Option<UserRelationships>,
}

#[derive(Deserialize)]
struct UserRelationships {
    #[serde(default)]
    servers: Option<List<PanelServer>>,
}

#[derive(Deserialize)]
struct ServerWithAllocations {
    #[serde(flatten)]
    server: PanelServer,
    #[serde(default)]
    relationships: Option<ServerRelationships>,
}

#[derive(Deserialize)]
struct ServerRelationships {
    #[serde(default)]
    allocations: Option<List<Allocation>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    detail: String,
}

fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().map(|e| e.detail).find(|d| !d.is_empty()))
        .unwrap_or_else(|| body.to_string())
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, PanelError> {
    serde_json::from_str(body).map_err(|e| PanelError::InvalidResponse(format!("{e}; body={body}")))
}

#[derive(Clone)]
pub struct PanelClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PanelClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PanelError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/application{}", self.base_url, path)
    }

    /// Body of a successful response, `None` on 404.
    async fn execute(&self, req: RequestBuilder) -> Result<Option<String>, PanelError> {
        let resp = req
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PanelError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }
        Ok(Some(body))
    }

    async fn execute_found(&self, req: RequestBuilder) -> Result<String, PanelError> {
        self.execute(req)
            .await?
            .ok_or_else(|| PanelError::InvalidResponse("unexpected 404".to_string()))
    }

    /// Exact (case-insensitive) match on email, or on username when the
    /// input has no `@`.
    pub async fn find_user(&self, email_or_username: &str) -> Result<Option<PanelUser>, PanelError> {
        let needle = email_or_username.trim();
        let by_email = needle.contains('@');
        let filter = if by_email { "filter[email]" } else { "filter[username]" };

        let body = self
            .execute_found(self.http.get(self.url("/users")).query(&[(filter, needle)]))
            .await?;
        let users = decode::<List<PanelUser>>(&body)?.into_vec();

        Ok(users.into_iter().find(|u| {
            if by_email {
                u.email.eq_ignore_ascii_case(needle)
            } else {
                u.username.eq_ignore_ascii_case(needle)
            }
        }))
    }

    pub async fn create_user(&self, user: &NewPanelUser) -> Result<PanelUser, PanelError> {
        let body = self
            .execute_found(self.http.post(self.url("/users")).json(user))
            .await?;
        Ok(decode::<Item<PanelUser>>(&body)?.attributes)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<PanelUser>, PanelError> {
        match self.execute(self.http.get(self.url(&format!("/users/{id}")))).await? {
            Some(body) => Ok(Some(decode::<Item<PanelUser>>(&body)?.attributes)),
            None => Ok(None),
        }
    }

    pub async fn get_user_with_servers(
        &self,
        id: i64,
    ) -> Result<Option<(PanelUser, Vec<PanelServer>)>, PanelError> {
        let req = self
            .http
            .get(self.url(&format!("/users/{id}")))
            .query(&[("include", "servers")]);
        let Some(body) = self.execute(req).await? else {
            return Ok(None);
        };

        let attrs = decode::<Item<UserWithServers>>(&body)?.attributes;
        let servers = attrs
            .relationships
            .and_then(|r| r.servers)
            .map(List::into_vec)
            .unwrap_or_default();
        Ok(Some((attrs.user, servers)))
    }

    /// Server detail including its allocations.
    pub async fn get_server(&self, id: i64) -> Result<Option<PanelServer>, PanelError> {
        let req = self
            .http
            .get(self.url(&format!("/servers/{id}")))
            .query(&[("include", "allocations")]);
        let Some(body) = self.execute(req).await? else {
            return Ok(None);
        };

        let attrs = decode::<Item<ServerWithAllocations>>(&body)?.attributes;
        let mut server = attrs.server;
        server.allocations = attrs
            .relationships
            .and_then(|r| r.allocations)
            .map(List::into_vec)
            .unwrap_or_default();
        Ok(Some(server))
    }

    pub async fn create_server(&self, server: &NewServer) -> Result<PanelServer, PanelError> {
        let body = self
            .execute_found(self.http.post(self.url("/servers")).json(server))
            .await?;
        Ok(decode::<Item<PanelServer>>(&body)?.attributes)
    }

    /// Returns false when the server did not exist.
    pub async fn delete_server(&self, id: i64) -> Result<bool, PanelError> {
        let found = self
            .execute(self.http.delete(self.url(&format!("/servers/{id}"))))
            .await?;
        Ok(found.is_some())
    }

    pub async fn free_allocations(&self, node_id: i64) -> Result<Vec<Allocation>, PanelError> {
        let req = self
            .http
            .get(self.url(&format!("/nodes/{node_id}/allocations")))
            .query(&[("per_page", PAGE_SIZE)]);
        let body = self.execute_found(req).await?;

        Ok(decode::<List<Allocation>>(&body)?
            .into_vec()
            .into_iter()
            .filter(|a| !a.assigned)
            .collect())
    }
}
