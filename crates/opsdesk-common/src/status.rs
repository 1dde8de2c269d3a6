use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a task. One vocabulary is used on every screen.
///
/// Older payloads spell the in-progress state `inProgress` and carry an
/// `overdue` status; both are accepted on input. Being overdue is derived
/// from the due date (see [`crate::Task::is_overdue`]), so `overdue` is read
/// back as [`TaskStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Unassigned,
    #[serde(alias = "overdue")]
    Pending,
    #[serde(alias = "inProgress")]
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Board columns in display order. `Cancelled` is kept in a side bucket.
    pub const COLUMNS: [TaskStatus; 4] = [
        TaskStatus::Unassigned,
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Unassigned,
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unassigned => "Unassigned",
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "pending" | "overdue" => Ok(Self::Pending),
            "in_progress" | "inprogress" | "in-progress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!(
                "Invalid task status '{}'. Valid values: unassigned, pending, in_progress, completed, cancelled",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" | "urgent" => Ok(Self::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Fixed taxonomy used to group tasks in the distribution view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SiteType {
    #[serde(rename = "social_site")]
    SocialSite,
    #[serde(rename = "web2_site")]
    Web2Site,
    #[serde(rename = "other_asset")]
    OtherAsset,
}

impl SiteType {
    pub const ALL: [SiteType; 3] = [SiteType::SocialSite, SiteType::Web2Site, SiteType::OtherAsset];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SocialSite => "social_site",
            Self::Web2Site => "web2_site",
            Self::OtherAsset => "other_asset",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SocialSite => "Social Sites",
            Self::Web2Site => "Web 2.0 Sites",
            Self::OtherAsset => "Other Assets",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "social_site" | "social" => Ok(Self::SocialSite),
            "web2_site" | "web2" => Ok(Self::Web2Site),
            "other_asset" | "other" => Ok(Self::OtherAsset),
            _ => Err(format!("Invalid site type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Pending,
    Completed,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid client status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_accepts_legacy_spellings() {
        let status: TaskStatus = serde_json::from_str("\"inProgress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        let status: TaskStatus = serde_json::from_str("\"overdue\"").unwrap();
        assert_eq!(status, TaskStatus::Pending);
    }

    #[test]
    fn test_task_status_serializes_canonical_form() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_task_status_from_str_variants() {
        assert_eq!("inProgress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("canceled".parse::<TaskStatus>().unwrap(), TaskStatus::Cancelled);
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        let err = "archived".parse::<TaskStatus>().unwrap_err();
        assert!(err.contains("archived"));
    }

    #[test]
    fn test_task_status_terminal() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::COLUMNS.contains(&TaskStatus::Cancelled));
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Critical);
        assert_eq!("urgent".parse::<Priority>().unwrap(), Priority::Critical);
    }

    #[test]
    fn test_site_type_wire_names() {
        assert_eq!(serde_json::to_string(&SiteType::Web2Site).unwrap(), "\"web2_site\"");
        let site: SiteType = serde_json::from_str("\"social_site\"").unwrap();
        assert_eq!(site, SiteType::SocialSite);
        assert_eq!("other".parse::<SiteType>().unwrap(), SiteType::OtherAsset);
    }

    #[test]
    fn test_client_and_user_status_round_trip_through_str() {
        for status in [
            ClientStatus::Active,
            ClientStatus::Inactive,
            ClientStatus::Pending,
            ClientStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<ClientStatus>().unwrap(), status);
        }
        assert_eq!("SUSPENDED".parse::<UserStatus>().unwrap(), UserStatus::Suspended);
        assert!("gone".parse::<UserStatus>().is_err());
    }
}
