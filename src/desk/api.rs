use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opsdesk_common::{
    Agent, Client, Package, Page, Priority, Report, Role, SiteType, Task, TaskMap, TaskStatus,
    User, UserStats, UserStatus,
};

use crate::errors::DeskError;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub email: String,
    pub role: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub category: String,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<chrono::NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<SiteType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role_id: String,
    pub status: UserStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceTaskMapRequest<'a> {
    tasks: &'a TaskMap,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentTaskStatusRequest<'a> {
    task_id: &'a str,
    status: TaskStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentReportRequest<'a> {
    task_id: &'a str,
    report: &'a Report,
}

/// One task-to-agent pairing inside a distribution batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub task_id: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBatch {
    pub assignments: Vec<DistributionEntry>,
}

impl DistributionBatch {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub distributed: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// ── Backend contract ──────────────────────────────────────────────────

/// Every call the console makes against the operations backend.
///
/// `HttpApi` is the production implementation; tests substitute an
/// in-memory backend.
#[async_trait]
pub trait DeskApi: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<Agent>, DeskError>;
    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, DeskError>;
    async fn delete_agent(&self, id: &str) -> Result<(), DeskError>;

    async fn list_clients(&self) -> Result<Vec<Client>, DeskError>;
    async fn get_client(&self, id: &str) -> Result<Client, DeskError>;
    async fn update_client(&self, client: &Client) -> Result<Client, DeskError>;
    async fn delete_client(&self, id: &str) -> Result<(), DeskError>;

    async fn get_task_map(&self, client_id: &str) -> Result<TaskMap, DeskError>;
    async fn replace_task_map(&self, client_id: &str, map: &TaskMap) -> Result<(), DeskError>;
    async fn create_task(&self, client_id: &str, task: &NewTask) -> Result<Task, DeskError>;
    async fn list_client_tasks(&self, client_id: &str) -> Result<Vec<Task>, DeskError>;

    async fn list_agent_tasks(&self, agent_id: &str) -> Result<Vec<Task>, DeskError>;
    async fn update_agent_task_status(
        &self,
        agent_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), DeskError>;
    async fn submit_report(
        &self,
        agent_id: &str,
        task_id: &str,
        report: &Report,
    ) -> Result<(), DeskError>;

    async fn list_distributable(&self) -> Result<Vec<Task>, DeskError>;
    async fn distribute(&self, batch: &DistributionBatch) -> Result<DistributionResult, DeskError>;

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Page<User>, DeskError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, DeskError>;
    async fn update_user(&self, user: &User) -> Result<User, DeskError>;
    async fn delete_user(&self, id: &str) -> Result<(), DeskError>;
    async fn user_stats(&self) -> Result<UserStats, DeskError>;
    async fn list_roles(&self) -> Result<Vec<Role>, DeskError>;
    async fn list_packages(&self) -> Result<Vec<Package>, DeskError>;
}

// ── HTTP implementation ───────────────────────────────────────────────

/// `DeskApi` over JSON/HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeskError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| DeskError::Config(format!("Invalid API URL '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DeskError::Config(format!(
                "API URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("opsdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DeskError::Transport)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DeskError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DeskError::Config(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, DeskError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        Ok(self
            .client
            .request(method, url)
            .header("Accept", "application/json"))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, DeskError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body.trim().to_string()
                }
            });
        debug!(status = status.as_u16(), %message, "api error response");
        Err(DeskError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DeskError> {
        let resp = self.execute(request).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(), DeskError> {
        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl DeskApi for HttpApi {
    async fn list_agents(&self) -> Result<Vec<Agent>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "agents"])?).await
    }

    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, DeskError> {
        self.fetch(self.request(Method::POST, &["api", "agents"])?.json(agent))
            .await
    }

    async fn delete_agent(&self, id: &str) -> Result<(), DeskError> {
        self.send(
            self.request(Method::DELETE, &["api", "agents"])?
                .query(&[("id", id)]),
        )
        .await
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "clients"])?).await
    }

    async fn get_client(&self, id: &str) -> Result<Client, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "clients", id])?)
            .await
    }

    async fn update_client(&self, client: &Client) -> Result<Client, DeskError> {
        self.fetch(
            self.request(Method::PUT, &["api", "clients", &client.id])?
                .json(client),
        )
        .await
    }

    async fn delete_client(&self, id: &str) -> Result<(), DeskError> {
        self.send(self.request(Method::DELETE, &["api", "clients", id])?)
            .await
    }

    async fn get_task_map(&self, client_id: &str) -> Result<TaskMap, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "tasks", client_id])?)
            .await
    }

    async fn replace_task_map(&self, client_id: &str, map: &TaskMap) -> Result<(), DeskError> {
        self.send(
            self.request(Method::PATCH, &["api", "tasks", client_id])?
                .json(&ReplaceTaskMapRequest { tasks: map }),
        )
        .await
    }

    async fn create_task(&self, client_id: &str, task: &NewTask) -> Result<Task, DeskError> {
        self.fetch(
            self.request(Method::POST, &["api", "tasks", client_id])?
                .json(task),
        )
        .await
    }

    async fn list_client_tasks(&self, client_id: &str) -> Result<Vec<Task>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "tasks", "client", client_id])?)
            .await
    }

    async fn list_agent_tasks(&self, agent_id: &str) -> Result<Vec<Task>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "tasks", "agents", agent_id])?)
            .await
    }

    async fn update_agent_task_status(
        &self,
        agent_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), DeskError> {
        self.send(
            self.request(Method::PATCH, &["api", "tasks", "agents", agent_id])?
                .json(&AgentTaskStatusRequest { task_id, status }),
        )
        .await
    }

    async fn submit_report(
        &self,
        agent_id: &str,
        task_id: &str,
        report: &Report,
    ) -> Result<(), DeskError> {
        self.send(
            self.request(Method::POST, &["api", "tasks", "agents", agent_id])?
                .json(&AgentReportRequest { task_id, report }),
        )
        .await
    }

    async fn list_distributable(&self) -> Result<Vec<Task>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "tasks", "distribute"])?)
            .await
    }

    async fn distribute(&self, batch: &DistributionBatch) -> Result<DistributionResult, DeskError> {
        self.fetch(
            self.request(Method::POST, &["api", "tasks", "distribute"])?
                .json(batch),
        )
        .await
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Page<User>, DeskError> {
        self.fetch(
            self.request(Method::GET, &["api", "users"])?
                .query(&[("offset", offset), ("limit", limit)]),
        )
        .await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DeskError> {
        self.fetch(self.request(Method::POST, &["api", "users"])?.json(user))
            .await
    }

    async fn update_user(&self, user: &User) -> Result<User, DeskError> {
        self.fetch(self.request(Method::PUT, &["api", "users"])?.json(user))
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<(), DeskError> {
        self.send(
            self.request(Method::DELETE, &["api", "users"])?
                .query(&[("id", id)]),
        )
        .await
    }

    async fn user_stats(&self) -> Result<UserStats, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "users", "stats"])?)
            .await
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "roles"])?).await
    }

    async fn list_packages(&self) -> Result<Vec<Package>, DeskError> {
        self.fetch(self.request(Method::GET, &["api", "packages"])?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpApi {
        HttpApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = api("http://localhost:3000");
        let url = api.endpoint(&["api", "tasks", "c1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/tasks/c1");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let api = api("https://ops.example.com/admin/");
        let url = api.endpoint(&["api", "agents"]).unwrap();
        assert_eq!(url.as_str(), "https://ops.example.com/admin/api/agents");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = api("http://localhost:3000");
        let url = api.endpoint(&["api", "clients", "acme/one"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/clients/acme%2Fone");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = HttpApi::new("ftp://example.com", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
        let err = HttpApi::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }

    #[test]
    fn test_replace_request_wraps_map() {
        let map = TaskMap::default();
        let body = serde_json::to_value(ReplaceTaskMapRequest { tasks: &map }).unwrap();
        assert!(body["tasks"]["inProgress"].is_array());
        assert!(body["tasks"]["unassigned"].is_array());
    }

    #[test]
    fn test_distribution_batch_serializes_camel_case() {
        let batch = DistributionBatch {
            assignments: vec![DistributionEntry {
                task_id: "t1".into(),
                agent_id: "a1".into(),
            }],
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["assignments"][0]["taskId"], "t1");
        assert_eq!(json["assignments"][0]["agentId"], "a1");
        assert_eq!(batch.len(), 1);
    }
}
