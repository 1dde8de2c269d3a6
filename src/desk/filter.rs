//! Pure search/filter/sort predicates behind every list view.
//!
//! A filter is a conjunction: an item is visible only if it satisfies the
//! search term and every dropdown filter that is set. Unset filters (empty
//! search, `None`) match everything.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;

use opsdesk_common::{
    Agent, Client, ClientStatus, Priority, Task, TaskStatus, User, UserStatus, eq_ignore_case,
};

pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Borrow the items that satisfy `filter`, preserving input order.
pub fn apply<'a, T, F: Filter<T>>(items: &'a [T], filter: &F) -> Vec<&'a T> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

pub trait SortKey<T>: Copy {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Stable sort of a borrowed view.
pub fn sort_view<T, K: SortKey<T>>(items: &mut [&T], key: K, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = key.compare(a, b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Case-insensitive substring match of `term` against any of `fields`.
fn search_matches<'a>(term: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    fields.into_iter().any(|f| contains_ci(f, &needle))
}

fn eq_opt_ci(filter: &Option<String>, value: &str) -> bool {
    match filter {
        Some(wanted) if !wanted.trim().is_empty() => eq_ignore_case(value, wanted.trim()),
        _ => true,
    }
}

fn cmp_ci(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

// ── Agents ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentFilter {
    pub search: String,
    pub role: Option<String>,
    pub category: Option<String>,
}

impl Filter<Agent> for AgentFilter {
    fn matches(&self, agent: &Agent) -> bool {
        search_matches(&self.search, [agent.name.as_str(), agent.email.as_str()])
            && eq_opt_ci(&self.role, &agent.role)
            && eq_opt_ci(&self.category, &agent.category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSort {
    Name,
    Category,
    Assigned,
    Completed,
}

impl SortKey<Agent> for AgentSort {
    fn compare(&self, a: &Agent, b: &Agent) -> Ordering {
        match self {
            Self::Name => cmp_ci(&a.name, &b.name),
            Self::Category => cmp_ci(&a.category, &b.category),
            Self::Assigned => a.assigned_tasks.cmp(&b.assigned_tasks),
            Self::Completed => a.completed_tasks.cmp(&b.completed_tasks),
        }
    }
}

impl FromStr for AgentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "category" => Ok(Self::Category),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid agent sort '{}'. Valid values: name, category, assigned, completed",
                s
            )),
        }
    }
}

// ── Clients ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub search: String,
    pub status: Option<ClientStatus>,
    /// Package id or name.
    pub package: Option<String>,
}

impl Filter<Client> for ClientFilter {
    fn matches(&self, client: &Client) -> bool {
        let email = client.email.as_deref().unwrap_or_default();
        let package_ok = match &self.package {
            Some(wanted) if !wanted.trim().is_empty() => client.package.as_ref().is_some_and(|p| {
                eq_ignore_case(&p.id, wanted.trim()) || eq_ignore_case(&p.name, wanted.trim())
            }),
            _ => true,
        };
        search_matches(
            &self.search,
            [client.name.as_str(), client.company.as_str(), email],
        ) && self.status.is_none_or(|s| s == client.status)
            && package_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSort {
    Name,
    Company,
    Progress,
    Status,
}

impl SortKey<Client> for ClientSort {
    fn compare(&self, a: &Client, b: &Client) -> Ordering {
        match self {
            Self::Name => cmp_ci(&a.name, &b.name),
            Self::Company => cmp_ci(&a.company, &b.company),
            Self::Progress => a.progress.cmp(&b.progress),
            Self::Status => a.status.cmp(&b.status),
        }
    }
}

impl FromStr for ClientSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "company" => Ok(Self::Company),
            "progress" => Ok(Self::Progress),
            "status" => Ok(Self::Status),
            _ => Err(format!(
                "Invalid client sort '{}'. Valid values: name, company, progress, status",
                s
            )),
        }
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// When set, only tasks overdue as of this date are shown.
    pub overdue_as_of: Option<NaiveDate>,
}

impl Filter<Task> for TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        let assignee = task.assignee_name().unwrap_or_default();
        search_matches(
            &self.search,
            [task.name.as_str(), task.category.as_str(), assignee],
        ) && self.status.is_none_or(|s| s == task.status)
            && eq_opt_ci(&self.category, &task.category)
            && self.priority.is_none_or(|p| p == task.priority)
            && self.overdue_as_of.is_none_or(|today| task.is_overdue(today))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    Name,
    Priority,
    DueDate,
    Status,
}

impl SortKey<Task> for TaskSort {
    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Name => cmp_ci(&a.name, &b.name),
            Self::Priority => a.priority.cmp(&b.priority),
            // Undated tasks sort after dated ones.
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Status => a.status.cmp(&b.status),
        }
    }
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(Self::Name),
            "priority" => Ok(Self::Priority),
            "due" | "due_date" => Ok(Self::DueDate),
            "status" => Ok(Self::Status),
            _ => Err(format!(
                "Invalid task sort '{}'. Valid values: name, priority, due_date, status",
                s
            )),
        }
    }
}

// ── Users ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    /// Role id or name.
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        let name = user.name.as_deref().unwrap_or_default();
        let role_ok = match &self.role {
            Some(wanted) if !wanted.trim().is_empty() => {
                eq_ignore_case(&user.role.id, wanted.trim())
                    || eq_ignore_case(&user.role.name, wanted.trim())
            }
            _ => true,
        };
        search_matches(&self.search, [user.email.as_str(), name])
            && role_ok
            && self.status.is_none_or(|s| s == user.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSort {
    Email,
    Name,
    Role,
    Status,
}

impl SortKey<User> for UserSort {
    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            Self::Email => cmp_ci(&a.email, &b.email),
            Self::Name => cmp_ci(a.display_name(), b.display_name()),
            Self::Role => cmp_ci(&a.role.name, &b.role.name),
            Self::Status => a.status.cmp(&b.status),
        }
    }
}

impl FromStr for UserSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "name" => Ok(Self::Name),
            "role" => Ok(Self::Role),
            "status" => Ok(Self::Status),
            _ => Err(format!(
                "Invalid user sort '{}'. Valid values: email, name, role, status",
                s
            )),
        }
    }
}
