//! Read-only detail screens: titled, collapsible sections of label/value rows.

use opsdesk_common::{Agent, Client, User, eq_ignore_case};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub fields: Vec<DetailField>,
    pub collapsed: bool,
}

impl DetailSection {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            fields: Vec::new(),
            collapsed: false,
        }
    }

    fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(DetailField {
            label,
            value: value.into(),
        });
        self
    }

    fn optional(self, label: &'static str, value: Option<impl ToString>) -> Self {
        let value = value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        self.field(label, value)
    }
}

pub trait Detail {
    fn heading(&self) -> String;
    fn sections(&self) -> Vec<DetailSection>;
}

impl Detail for Client {
    fn heading(&self) -> String {
        if self.company.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.company)
        }
    }

    fn sections(&self) -> Vec<DetailSection> {
        let overview = DetailSection::new("Overview")
            .field("ID", self.id.clone())
            .field("Status", self.status.as_str())
            .optional("Email", self.email.as_deref())
            .optional("Package", self.package.as_ref().map(|p| p.name.as_str()))
            .field("Progress", format!("{}%", self.progress))
            .optional("Start date", self.start_date)
            .optional("Due date", self.due_date);

        let mut team = DetailSection::new("Team");
        for member in &self.team_members {
            team = team.field("Member", format!("{} ({})", member.name, member.category));
        }

        let open = self.tasks.iter().filter(|t| !t.status.is_terminal()).count();
        let tasks = DetailSection::new("Tasks")
            .field("Total", self.tasks.len().to_string())
            .field("Open", open.to_string())
            .field("Assignments", self.assignments.len().to_string());

        let mut links = DetailSection::new("Social links");
        for link in &self.social_links {
            links = links.field("Link", format!("{}: {}", link.platform, link.url));
        }

        vec![overview, team, tasks, links]
    }
}

impl Detail for Agent {
    fn heading(&self) -> String {
        self.name.clone()
    }

    fn sections(&self) -> Vec<DetailSection> {
        vec![
            DetailSection::new("Profile")
                .field("ID", self.id.clone())
                .field("Email", self.email.clone())
                .field("Role", self.role.clone())
                .field("Category", self.category.clone()),
            DetailSection::new("Workload")
                .field("Assigned", self.assigned_tasks.to_string())
                .field("Completed", self.completed_tasks.to_string())
                .field("Completion", format!("{}%", self.completion_rate())),
        ]
    }
}

impl Detail for User {
    fn heading(&self) -> String {
        self.display_name().to_string()
    }

    fn sections(&self) -> Vec<DetailSection> {
        vec![
            DetailSection::new("Account")
                .field("ID", self.id.clone())
                .field("Email", self.email.clone())
                .optional("Name", self.name.as_deref())
                .optional("Phone", self.phone.as_deref())
                .field("Status", self.status.as_str()),
            DetailSection::new("Role")
                .field("Name", self.role.name.clone())
                .optional("Description", self.role.description.as_deref()),
        ]
    }
}

/// Sections of one entity plus their collapsed state.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub heading: String,
    pub sections: Vec<DetailSection>,
}

impl DetailView {
    pub fn of(entity: &impl Detail) -> Self {
        Self {
            heading: entity.heading(),
            sections: entity.sections(),
        }
    }

    /// Force a section open or closed by title (case-insensitive). Returns
    /// `false` if no section has that title.
    pub fn set_collapsed(&mut self, title: &str, collapsed: bool) -> bool {
        match self.section_mut(title) {
            Some(section) => {
                section.collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    fn section_mut(&mut self, title: &str) -> Option<&mut DetailSection> {
        self.sections
            .iter_mut()
            .find(|s| eq_ignore_case(s.title, title))
    }
}
