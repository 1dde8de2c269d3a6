//! In-memory backend for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use opsdesk_common::{
    Agent, AgentRef, Client, ClientStatus, Package, PackageRef, Page, Priority, Report, Role,
    SocialLink, Task, TaskMap, TaskStatus, User, UserStats, UserStatus,
};

use super::api::{DeskApi, DistributionBatch, DistributionResult, NewAgent, NewTask, NewUser};
use crate::errors::DeskError;

pub fn sample_task(id: &str, name: &str, category: &str, status: TaskStatus) -> Task {
    Task {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        priority: Priority::Medium,
        status,
        due_date: None,
        assigned_to: match status {
            TaskStatus::Unassigned => None,
            _ => Some(AgentRef {
                id: "a-seo".into(),
                name: "Sage Seo".into(),
            }),
        },
        site_type: None,
        client_id: None,
        comments: vec![],
        reports: vec![],
    }
}

pub fn sample_agent(id: &str, name: &str, category: &str) -> Agent {
    Agent {
        id: id.into(),
        name: name.into(),
        email: format!("{}@agency.io", id),
        role: "specialist".into(),
        category: category.into(),
        assigned_tasks: 0,
        completed_tasks: 0,
    }
}

pub fn sample_client(id: &str) -> Client {
    Client {
        id: id.into(),
        name: "Acme".into(),
        company: "Acme Inc".into(),
        email: Some("ops@acme.test".into()),
        status: ClientStatus::Active,
        package: Some(PackageRef {
            id: "p-gold".into(),
            name: "Gold".into(),
        }),
        progress: 40,
        start_date: None,
        due_date: None,
        tasks: vec![],
        team_members: vec![
            sample_agent("a-content", "Casey Content", "content"),
            sample_agent("a-seo", "Sage Seo", "seo"),
        ],
        assignments: vec![],
        social_links: vec![SocialLink {
            platform: "linkedin".into(),
            url: "https://linkedin.com/company/acme".into(),
        }],
    }
}

pub fn sample_user(id: &str) -> User {
    User {
        id: id.into(),
        email: format!("{}@agency.io", id),
        name: Some(format!("User {}", id)),
        phone: None,
        role: Role {
            id: "r-agent".into(),
            name: "agent".into(),
            description: None,
        },
        status: UserStatus::Active,
    }
}

fn unavailable() -> DeskError {
    DeskError::Http {
        status: 503,
        message: "backend unavailable".into(),
    }
}

fn rejected() -> DeskError {
    DeskError::Http {
        status: 500,
        message: "write rejected".into(),
    }
}

#[derive(Default)]
struct State {
    clients: Vec<Client>,
    maps: HashMap<String, TaskMap>,
    agents: Vec<Agent>,
    agent_tasks: HashMap<String, Vec<Task>>,
    pool: Vec<Task>,
    users: Vec<User>,
    next_id: u32,

    fail_reads: bool,
    fail_patches: bool,
    fail_task_map_reads: bool,
    fail_distribute: bool,

    patches: Vec<(String, TaskMap)>,
    created_tasks: usize,
    client_updates: usize,
    distributed: Vec<DistributionBatch>,
    status_updates: Vec<(String, String, TaskStatus)>,
    reports: Vec<(String, String, Report)>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// `DeskApi` backed by vectors, with switchable failures and a record of
/// every write.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn put_client(&self, client: Client) {
        self.with(|s| {
            s.clients.retain(|c| c.id != client.id);
            s.clients.push(client);
        });
    }

    pub fn put_task_map(&self, client_id: &str, map: TaskMap) {
        self.with(|s| s.maps.insert(client_id.to_string(), map));
    }

    pub fn put_agents(&self, agents: Vec<Agent>) {
        self.with(|s| s.agents = agents);
    }

    pub fn put_agent_tasks(&self, agent_id: &str, tasks: Vec<Task>) {
        self.with(|s| s.agent_tasks.insert(agent_id.to_string(), tasks));
    }

    pub fn put_distributable(&self, tasks: Vec<Task>) {
        self.with(|s| s.pool = tasks);
    }

    pub fn put_users(&self, users: Vec<User>) {
        self.with(|s| s.users = users);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.with(|s| s.fail_reads = fail);
    }

    pub fn fail_patches(&self, fail: bool) {
        self.with(|s| s.fail_patches = fail);
    }

    pub fn fail_task_map_reads(&self, fail: bool) {
        self.with(|s| s.fail_task_map_reads = fail);
    }

    pub fn fail_distribute(&self, fail: bool) {
        self.with(|s| s.fail_distribute = fail);
    }

    /// Every map PATCHed for `client_id`, oldest first.
    pub fn patches(&self, client_id: &str) -> Vec<TaskMap> {
        self.with(|s| {
            s.patches
                .iter()
                .filter(|(id, _)| id == client_id)
                .map(|(_, map)| map.clone())
                .collect()
        })
    }

    pub fn created_task_count(&self) -> usize {
        self.with(|s| s.created_tasks)
    }

    pub fn client_updates(&self) -> usize {
        self.with(|s| s.client_updates)
    }

    pub fn distributed(&self) -> Vec<DistributionBatch> {
        self.with(|s| s.distributed.clone())
    }

    pub fn agent_status_updates(&self) -> Vec<(String, String, TaskStatus)> {
        self.with(|s| s.status_updates.clone())
    }

    pub fn reports(&self) -> Vec<(String, String, Report)> {
        self.with(|s| s.reports.clone())
    }

    pub fn list_agents_now(&self) -> Vec<Agent> {
        self.with(|s| s.agents.clone())
    }

    pub fn user_count(&self) -> usize {
        self.with(|s| s.users.len())
    }
}

#[async_trait]
impl DeskApi for FakeApi {
    async fn list_agents(&self) -> Result<Vec<Agent>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            Ok(s.agents.clone())
        })
    }

    async fn create_agent(&self, agent: &NewAgent) -> Result<Agent, DeskError> {
        self.with(|s| {
            let created = Agent {
                id: s.next_id("agent"),
                name: agent.name.clone(),
                email: agent.email.clone(),
                role: agent.role.clone(),
                category: agent.category.clone(),
                assigned_tasks: 0,
                completed_tasks: 0,
            };
            s.agents.push(created.clone());
            Ok(created)
        })
    }

    async fn delete_agent(&self, id: &str) -> Result<(), DeskError> {
        self.with(|s| {
            let before = s.agents.len();
            s.agents.retain(|a| a.id != id);
            if s.agents.len() == before {
                return Err(DeskError::not_found("Agent", id));
            }
            Ok(())
        })
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            Ok(s.clients.clone())
        })
    }

    async fn get_client(&self, id: &str) -> Result<Client, DeskError> {
        self.with(|s| {
            s.clients
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| DeskError::not_found("Client", id))
        })
    }

    async fn update_client(&self, client: &Client) -> Result<Client, DeskError> {
        self.with(|s| {
            let slot = s
                .clients
                .iter_mut()
                .find(|c| c.id == client.id)
                .ok_or_else(|| DeskError::not_found("Client", client.id.clone()))?;
            *slot = client.clone();
            s.client_updates += 1;
            Ok(client.clone())
        })
    }

    async fn delete_client(&self, id: &str) -> Result<(), DeskError> {
        self.with(|s| {
            let before = s.clients.len();
            s.clients.retain(|c| c.id != id);
            if s.clients.len() == before {
                return Err(DeskError::not_found("Client", id));
            }
            s.maps.remove(id);
            Ok(())
        })
    }

    async fn get_task_map(&self, client_id: &str) -> Result<TaskMap, DeskError> {
        self.with(|s| {
            if s.fail_task_map_reads {
                return Err(unavailable());
            }
            s.maps
                .get(client_id)
                .cloned()
                .ok_or_else(|| DeskError::not_found("Client", client_id))
        })
    }

    async fn replace_task_map(&self, client_id: &str, map: &TaskMap) -> Result<(), DeskError> {
        self.with(|s| {
            if s.fail_patches {
                return Err(rejected());
            }
            s.patches.push((client_id.to_string(), map.clone()));
            s.maps.insert(client_id.to_string(), map.clone());
            Ok(())
        })
    }

    async fn create_task(&self, client_id: &str, task: &NewTask) -> Result<Task, DeskError> {
        self.with(|s| {
            let created = Task {
                id: s.next_id("task"),
                name: task.name.clone(),
                category: task.category.clone(),
                priority: task.priority,
                status: TaskStatus::Unassigned,
                due_date: task.due_date,
                assigned_to: None,
                site_type: task.site_type,
                client_id: Some(client_id.to_string()),
                comments: vec![],
                reports: vec![],
            };
            s.maps
                .entry(client_id.to_string())
                .or_default()
                .unassigned
                .push(created.clone());
            s.created_tasks += 1;
            Ok(created)
        })
    }

    async fn list_client_tasks(&self, client_id: &str) -> Result<Vec<Task>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            Ok(s.maps
                .get(client_id)
                .map(|m| m.iter().map(|(_, t)| t.clone()).collect())
                .unwrap_or_default())
        })
    }

    async fn list_agent_tasks(&self, agent_id: &str) -> Result<Vec<Task>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            Ok(s.agent_tasks.get(agent_id).cloned().unwrap_or_default())
        })
    }

    async fn update_agent_task_status(
        &self,
        agent_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), DeskError> {
        self.with(|s| {
            if s.fail_patches {
                return Err(rejected());
            }
            let task = s
                .agent_tasks
                .get_mut(agent_id)
                .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task_id))
                .ok_or_else(|| DeskError::not_found("Task", task_id))?;
            task.status = status;
            s.status_updates
                .push((agent_id.to_string(), task_id.to_string(), status));
            Ok(())
        })
    }

    async fn submit_report(
        &self,
        agent_id: &str,
        task_id: &str,
        report: &Report,
    ) -> Result<(), DeskError> {
        self.with(|s| {
            s.reports
                .push((agent_id.to_string(), task_id.to_string(), report.clone()));
            Ok(())
        })
    }

    async fn list_distributable(&self) -> Result<Vec<Task>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            Ok(s.pool.clone())
        })
    }

    async fn distribute(&self, batch: &DistributionBatch) -> Result<DistributionResult, DeskError> {
        self.with(|s| {
            if s.fail_distribute {
                return Err(rejected());
            }
            s.pool
                .retain(|t| !batch.assignments.iter().any(|e| e.task_id == t.id));
            s.distributed.push(batch.clone());
            Ok(DistributionResult {
                distributed: batch.len() as u32,
            })
        })
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Page<User>, DeskError> {
        self.with(|s| {
            if s.fail_reads {
                return Err(unavailable());
            }
            let items = s
                .users
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok(Page {
                items,
                total: s.users.len() as u64,
                offset,
                limit,
            })
        })
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DeskError> {
        self.with(|s| {
            let created = User {
                id: s.next_id("user"),
                email: user.email.clone(),
                name: user.name.clone(),
                phone: None,
                role: Role {
                    id: user.role_id.clone(),
                    name: user.role_id.clone(),
                    description: None,
                },
                status: user.status,
            };
            s.users.push(created.clone());
            Ok(created)
        })
    }

    async fn update_user(&self, user: &User) -> Result<User, DeskError> {
        self.with(|s| {
            let slot = s
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| DeskError::not_found("User", user.id.clone()))?;
            *slot = user.clone();
            Ok(user.clone())
        })
    }

    async fn delete_user(&self, id: &str) -> Result<(), DeskError> {
        self.with(|s| {
            let before = s.users.len();
            s.users.retain(|u| u.id != id);
            if s.users.len() == before {
                return Err(DeskError::not_found("User", id));
            }
            Ok(())
        })
    }

    async fn user_stats(&self) -> Result<UserStats, DeskError> {
        self.with(|s| {
            let mut stats = UserStats {
                total: s.users.len() as u32,
                ..Default::default()
            };
            for user in &s.users {
                match user.status {
                    UserStatus::Active => stats.active += 1,
                    UserStatus::Inactive => stats.inactive += 1,
                    UserStatus::Suspended => stats.suspended += 1,
                }
                *stats.by_role.entry(user.role.name.clone()).or_default() += 1;
            }
            Ok(stats)
        })
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DeskError> {
        Ok(vec![Role {
            id: "r-agent".into(),
            name: "agent".into(),
            description: None,
        }])
    }

    async fn list_packages(&self) -> Result<Vec<Package>, DeskError> {
        Ok(vec![Package {
            id: "p-gold".into(),
            name: "Gold".into(),
            price: Some(499.0),
            total_tasks: Some(40),
            description: None,
        }])
    }
}
