//! Local form validation.
//!
//! Each form turns operator input into the payload the backend expects, or
//! a [`DeskError::Validation`] describing the first problem found. Nothing
//! is sent when validation fails.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;

use opsdesk_common::{
    Client, ClientStatus, PackageRef, Priority, Report, Role, SiteType, User, UserStatus,
};

use super::api::{NewAgent, NewTask, NewUser};
use crate::errors::DeskError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PROGRESS: u8 = 100;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid static regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn required(field: &str, value: &str) -> Result<String, DeskError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn email(value: &str) -> Result<String, DeskError> {
    let email = required("Email", value)?;
    if !is_valid_email(&email) {
        return Err(DeskError::validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// New-task form on the kanban board.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub name: String,
    pub category: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub site_type: Option<SiteType>,
}

impl TaskForm {
    pub fn validate(&self, today: NaiveDate) -> Result<NewTask, DeskError> {
        let name = required("Task name", &self.name)?;
        let category = required("Category", &self.category)?;
        if let Some(due) = self.due_date {
            if due < today {
                return Err(DeskError::validation(format!(
                    "Due date {} is in the past",
                    due
                )));
            }
        }
        Ok(NewTask {
            name,
            category,
            priority: self.priority,
            due_date: self.due_date,
            site_type: self.site_type,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentForm {
    pub name: String,
    pub email: String,
    pub role: String,
    pub category: String,
}

impl AgentForm {
    pub fn validate(&self) -> Result<NewAgent, DeskError> {
        Ok(NewAgent {
            name: required("Name", &self.name)?,
            email: email(&self.email)?,
            role: required("Role", &self.role)?,
            category: required("Category", &self.category)?,
        })
    }
}

/// Create-user form.
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role_id: String,
    pub status: UserStatus,
}

impl UserForm {
    pub fn validate(&self) -> Result<NewUser, DeskError> {
        let email = email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DeskError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(NewUser {
            email,
            password: self.password.clone(),
            name: optional(self.name.as_deref()),
            role_id: required("Role", &self.role_id)?,
            status: self.status,
        })
    }
}

/// Field overrides for an existing user. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserEdit {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the full replacement record for `PUT /api/users`.
    pub fn apply_to(&self, user: &User) -> Result<User, DeskError> {
        let mut updated = user.clone();
        if let Some(value) = &self.email {
            updated.email = email(value)?;
        }
        if let Some(value) = &self.name {
            updated.name = optional(Some(value.as_str()));
        }
        if let Some(value) = &self.phone {
            updated.phone = optional(Some(value.as_str()));
        }
        if let Some(role) = &self.role {
            updated.role = role.clone();
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        Ok(updated)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientEdit {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub status: Option<ClientStatus>,
    pub progress: Option<u8>,
    pub package: Option<PackageRef>,
    pub due_date: Option<NaiveDate>,
}

impl ClientEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produce the full replacement record for `PUT /api/clients/:id`.
    pub fn apply_to(&self, client: &Client) -> Result<Client, DeskError> {
        let mut updated = client.clone();
        if let Some(value) = &self.name {
            updated.name = required("Client name", value)?;
        }
        if let Some(value) = &self.company {
            updated.company = value.trim().to_string();
        }
        if let Some(value) = &self.email {
            updated.email = Some(email(value)?);
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(progress) = self.progress {
            if progress > MAX_PROGRESS {
                return Err(DeskError::validation(format!(
                    "Progress must be between 0 and {}, got {}",
                    MAX_PROGRESS, progress
                )));
            }
            updated.progress = progress;
        }
        if let Some(package) = &self.package {
            updated.package = Some(package.clone());
        }
        if let Some(due) = self.due_date {
            if let Some(start) = updated.start_date {
                if due < start {
                    return Err(DeskError::validation(format!(
                        "Due date {} is before the start date {}",
                        due, start
                    )));
                }
            }
            updated.due_date = Some(due);
        }
        Ok(updated)
    }
}

/// Completion report an agent submits for a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub title: String,
    pub url: Option<String>,
    pub note: Option<String>,
}

impl ReportForm {
    pub fn validate(&self) -> Result<Report, DeskError> {
        let title = required("Report title", &self.title)?;
        let url = optional(self.url.as_deref());
        if let Some(link) = &url {
            let parsed = reqwest::Url::parse(link)
                .map_err(|e| DeskError::validation(format!("Invalid report URL '{}': {}", link, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(DeskError::validation(format!(
                    "Report URL must use http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }
        Ok(Report {
            title,
            url,
            note: optional(self.note.as_deref()),
            submitted_at: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn task_form() -> TaskForm {
        TaskForm {
            name: "  Guest post  ".into(),
            category: "content".into(),
            priority: Priority::Medium,
            due_date: Some(today()),
            site_type: Some(SiteType::Web2Site),
        }
    }

    fn user() -> User {
        User {
            id: "u1".into(),
            email: "sam@agency.io".into(),
            name: Some("Sam".into()),
            phone: None,
            role: Role {
                id: "r-admin".into(),
                name: "admin".into(),
                description: None,
            },
            status: UserStatus::Active,
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("no at sign.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn test_task_form_trims_and_accepts_today() {
        let task = task_form().validate(today()).unwrap();
        assert_eq!(task.name, "Guest post");
        assert_eq!(task.site_type, Some(SiteType::Web2Site));
    }

    #[test]
    fn test_task_form_requires_name_and_category() {
        let mut form = task_form();
        form.name = " ".into();
        let err = form.validate(today()).unwrap_err();
        assert_eq!(err.to_string(), "Task name is required");

        let mut form = task_form();
        form.category.clear();
        assert!(form.validate(today()).unwrap_err().is_validation());
    }

    #[test]
    fn test_task_form_rejects_past_due_date() {
        let mut form = task_form();
        form.due_date = NaiveDate::from_ymd_opt(2026, 5, 31);
        let err = form.validate(today()).unwrap_err();
        assert!(err.to_string().contains("in the past"));
    }

    #[test]
    fn test_agent_form_checks_email() {
        let form = AgentForm {
            name: "Casey".into(),
            email: "casey-at-agency".into(),
            role: "writer".into(),
            category: "content".into(),
        };
        assert!(form.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_user_form_password_length() {
        let mut form = UserForm {
            email: "new@agency.io".into(),
            password: "short".into(),
            name: Some("  ".into()),
            role_id: "r-agent".into(),
            status: UserStatus::Active,
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("at least 8"));

        form.password = "longenough".into();
        let payload = form.validate().unwrap();
        assert_eq!(payload.name, None);
        assert_eq!(payload.role_id, "r-agent");
    }

    #[test]
    fn test_user_edit_keeps_unset_fields() {
        let edit = UserEdit {
            status: Some(UserStatus::Suspended),
            ..Default::default()
        };
        let updated = edit.apply_to(&user()).unwrap();
        assert_eq!(updated.status, UserStatus::Suspended);
        assert_eq!(updated.email, "sam@agency.io");
        assert_eq!(updated.name.as_deref(), Some("Sam"));
        assert!(UserEdit::default().is_empty());
    }

    #[test]
    fn test_user_edit_rejects_bad_email() {
        let edit = UserEdit {
            email: Some("broken".into()),
            ..Default::default()
        };
        assert!(edit.apply_to(&user()).is_err());
    }

    #[test]
    fn test_client_edit_progress_bound() {
        let client = Client {
            id: "c1".into(),
            name: "Acme".into(),
            company: "Acme Inc".into(),
            email: None,
            status: ClientStatus::Active,
            package: None,
            progress: 10,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            due_date: None,
            tasks: vec![],
            team_members: vec![],
            assignments: vec![],
            social_links: vec![],
        };
        let edit = ClientEdit {
            progress: Some(101),
            ..Default::default()
        };
        assert!(edit.apply_to(&client).unwrap_err().is_validation());

        let edit = ClientEdit {
            progress: Some(100),
            ..Default::default()
        };
        assert_eq!(edit.apply_to(&client).unwrap().progress, 100);

        let edit = ClientEdit {
            due_date: NaiveDate::from_ymd_opt(2025, 12, 1),
            ..Default::default()
        };
        assert!(edit.apply_to(&client).is_err());
    }

    #[test]
    fn test_report_form_url_scheme() {
        let form = ReportForm {
            title: "Backlink live".into(),
            url: Some("ftp://example.com/file".into()),
            note: None,
        };
        assert!(form.validate().is_err());

        let form = ReportForm {
            title: "Backlink live".into(),
            url: Some("https://example.com/post".into()),
            note: Some("".into()),
        };
        let report = form.validate().unwrap();
        assert_eq!(report.note, None);
        assert!(report.submitted_at.is_some());
    }
}
