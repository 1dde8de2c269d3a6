use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{ClientStatus, Priority, SiteType, TaskStatus, UserStatus};

/// Lightweight pointer to an agent, embedded in tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub author: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Completion evidence an agent attaches to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_task_status")]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Option<AgentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<SiteType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reports: Vec<Report>,
}

fn default_task_status() -> TaskStatus {
    TaskStatus::Unassigned
}

impl Task {
    /// A task is overdue when its due date has passed and it is still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < today)
    }

    /// Tasks without a site type are grouped with other assets.
    pub fn site_type_or_default(&self) -> SiteType {
        self.site_type.unwrap_or(SiteType::OtherAsset)
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assigned_to.as_ref().map(|a| a.name.as_str())
    }
}

/// An agent (team member) who can be assigned tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub assigned_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
}

/// Team members on a client are agents.
pub type TeamMember = Agent;

impl Agent {
    pub fn to_ref(&self) -> AgentRef {
        AgentRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Share of assigned tasks completed, as a whole percentage.
    pub fn completion_rate(&self) -> u8 {
        if self.assigned_tasks == 0 {
            return 0;
        }
        let rate = (self.completed_tasks.min(self.assigned_tasks) as f64
            / self.assigned_tasks as f64)
            * 100.0;
        rate.round() as u8
    }

    /// Whether this agent works in the given task category.
    pub fn handles_category(&self, category: &str) -> bool {
        !category.is_empty() && crate::eq_ignore_case(&self.category, category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub task_id: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: Option<String>,
    pub status: ClientStatus,
    #[serde(default)]
    pub package: Option<PackageRef>,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub total_tasks: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Package {
    pub fn to_ref(&self) -> PackageRef {
        PackageRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u32,
    #[serde(default)]
    pub active: u32,
    #[serde(default)]
    pub inactive: u32,
    #[serde(default)]
    pub suspended: u32,
    #[serde(default)]
    pub by_role: BTreeMap<String, u32>,
}

/// One window of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

impl<T> Page<T> {
    /// Wrap an unpaged listing as a single page holding everything.
    pub fn whole(items: Vec<T>) -> Self {
        let len = items.len() as u64;
        Self {
            items,
            total: len,
            offset: 0,
            limit: len,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset.saturating_add(self.items.len() as u64) < self.total
    }
}

/// Per-client tasks keyed by board column, as exchanged with
/// `/api/tasks/:clientId`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMap {
    #[serde(default)]
    pub unassigned: Vec<Task>,
    #[serde(default)]
    pub pending: Vec<Task>,
    #[serde(default, alias = "in_progress")]
    pub in_progress: Vec<Task>,
    #[serde(default)]
    pub completed: Vec<Task>,
    #[serde(default)]
    pub cancelled: Vec<Task>,
}

impl TaskMap {
    pub fn column(&self, status: TaskStatus) -> &Vec<Task> {
        match status {
            TaskStatus::Unassigned => &self.unassigned,
            TaskStatus::Pending => &self.pending,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Completed => &self.completed,
            TaskStatus::Cancelled => &self.cancelled,
        }
    }

    pub fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Unassigned => &mut self.unassigned,
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Cancelled => &mut self.cancelled,
        }
    }

    /// Iterate every task together with the column that holds it.
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, &Task)> {
        TaskStatus::ALL
            .into_iter()
            .flat_map(move |status| self.column(status).iter().map(move |t| (status, t)))
    }

    pub fn len(&self) -> usize {
        TaskStatus::ALL.iter().map(|s| self.column(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a map by placing each task in the column named by its status.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut map = Self::default();
        for task in tasks {
            map.column_mut(task.status).push(task);
        }
        map
    }
}
