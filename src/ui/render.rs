//! Text rendering for each screen. Every function returns the finished
//! string so commands decide where it goes.

use chrono::NaiveDate;
use console::style;

use opsdesk_common::{Agent, Client, Package, Role, Task, TaskStatus, User, UserStats};

use super::icons::{
    COLUMN, OVERDUE, SECTION_CLOSED, SECTION_OPEN, SELECTED, TASK, UNSELECTED,
};
use super::table::{Card, Table, render_cards};
use crate::desk::board::TaskBoard;
use crate::desk::detail::DetailView;
use crate::desk::distribute::DistributionBoard;
use crate::desk::views::ViewMode;

fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn empty(label: &str) -> String {
    format!("{}\n", style(format!("No {} found.", label)).dim())
}

pub fn agents(items: &[&Agent], mode: ViewMode, width: usize) -> String {
    if items.is_empty() {
        return empty("agents");
    }
    match mode {
        ViewMode::Table => {
            let mut table = Table::new(["ID", "Name", "Email", "Role", "Category", "Tasks", "Done"]);
            for a in items {
                table.row([
                    a.id.clone(),
                    a.name.clone(),
                    a.email.clone(),
                    a.role.clone(),
                    a.category.clone(),
                    a.assigned_tasks.to_string(),
                    format!("{}%", a.completion_rate()),
                ]);
            }
            table.render(width)
        }
        ViewMode::Cards => {
            let cards: Vec<Card> = items
                .iter()
                .map(|a| {
                    Card::new(format!("{} ({})", a.name, a.id))
                        .field("Email", a.email.clone())
                        .field("Role", a.role.clone())
                        .field("Category", a.category.clone())
                        .field(
                            "Tasks",
                            format!(
                                "{} assigned, {} completed ({}%)",
                                a.assigned_tasks,
                                a.completed_tasks,
                                a.completion_rate()
                            ),
                        )
                })
                .collect();
            render_cards(&cards, width)
        }
    }
}

pub fn clients(items: &[&Client], mode: ViewMode, width: usize) -> String {
    if items.is_empty() {
        return empty("clients");
    }
    match mode {
        ViewMode::Table => {
            let mut table = Table::new(["ID", "Name", "Company", "Status", "Package", "Progress", "Due"]);
            for c in items {
                table.row([
                    c.id.clone(),
                    c.name.clone(),
                    c.company.clone(),
                    c.status.as_str().to_string(),
                    or_dash(c.package.as_ref().map(|p| p.name.as_str())),
                    format!("{}%", c.progress),
                    or_dash(c.due_date),
                ]);
            }
            table.render(width)
        }
        ViewMode::Cards => {
            let cards: Vec<Card> = items
                .iter()
                .map(|c| {
                    Card::new(format!("{} ({})", c.name, c.id))
                        .field("Company", c.company.clone())
                        .field("Status", c.status.as_str())
                        .field("Package", or_dash(c.package.as_ref().map(|p| p.name.as_str())))
                        .field("Progress", progress_bar(c.progress))
                        .field("Team", c.team_members.len().to_string())
                })
                .collect();
            render_cards(&cards, width)
        }
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = (progress.min(100) / 10) as usize;
    format!("[{}{}] {}%", "#".repeat(filled), ".".repeat(10 - filled), progress)
}

pub fn tasks(items: &[&Task], mode: ViewMode, width: usize, today: NaiveDate) -> String {
    if items.is_empty() {
        return empty("tasks");
    }
    match mode {
        ViewMode::Table => {
            let mut table = Table::new(["ID", "Name", "Category", "Priority", "Status", "Due", "Assignee"]);
            for t in items {
                let due = match t.due_date {
                    Some(d) if t.is_overdue(today) => format!("{}{}", OVERDUE, d),
                    other => or_dash(other),
                };
                table.row([
                    t.id.clone(),
                    t.name.clone(),
                    t.category.clone(),
                    t.priority.as_str().to_string(),
                    t.status.as_str().to_string(),
                    due,
                    or_dash(t.assignee_name()),
                ]);
            }
            table.render(width)
        }
        ViewMode::Cards => {
            let cards: Vec<Card> = items.iter().map(|t| task_card(t, today)).collect();
            render_cards(&cards, width)
        }
    }
}

fn task_card(task: &Task, today: NaiveDate) -> Card {
    let mut card = Card::new(format!("{} ({})", task.name, task.id))
        .field("Status", task.status.label())
        .field("Category", task.category.clone())
        .field("Priority", task.priority.as_str())
        .field("Assignee", or_dash(task.assignee_name()))
        .field("Site type", task.site_type_or_default().label());
    if let Some(due) = task.due_date {
        let value = if task.is_overdue(today) {
            format!("{} (overdue)", due)
        } else {
            due.to_string()
        };
        card = card.field("Due", value);
    }
    if !task.reports.is_empty() {
        card = card.field("Reports", task.reports.len().to_string());
    }
    card
}

pub fn users(items: &[&User], mode: ViewMode, width: usize) -> String {
    if items.is_empty() {
        return empty("users");
    }
    match mode {
        ViewMode::Table => {
            let mut table = Table::new(["ID", "Email", "Name", "Role", "Status"]);
            for u in items {
                table.row([
                    u.id.clone(),
                    u.email.clone(),
                    or_dash(u.name.as_deref()),
                    u.role.name.clone(),
                    u.status.as_str().to_string(),
                ]);
            }
            table.render(width)
        }
        ViewMode::Cards => {
            let cards: Vec<Card> = items
                .iter()
                .map(|u| {
                    Card::new(format!("{} ({})", u.display_name(), u.id))
                        .field("Email", u.email.clone())
                        .field("Phone", or_dash(u.phone.as_deref()))
                        .field("Role", u.role.name.clone())
                        .field("Status", u.status.as_str())
                })
                .collect();
            render_cards(&cards, width)
        }
    }
}

/// Footer for a paged listing, e.g. "Showing 21-40 of 57".
pub fn page_footer(offset: u64, shown: usize, total: u64) -> String {
    if shown == 0 {
        return format!("Showing 0 of {}\n", total);
    }
    format!(
        "{}\n",
        style(format!(
            "Showing {}-{} of {}",
            offset.saturating_add(1),
            offset.saturating_add(shown as u64),
            total
        ))
        .dim()
    )
}

pub fn user_stats(stats: &UserStats) -> String {
    let mut table = Table::new(["Metric", "Count"]);
    table
        .row(["Total".to_string(), stats.total.to_string()])
        .row(["Active".to_string(), stats.active.to_string()])
        .row(["Inactive".to_string(), stats.inactive.to_string()])
        .row(["Suspended".to_string(), stats.suspended.to_string()]);
    for (role, count) in &stats.by_role {
        table.row([format!("Role: {}", role), count.to_string()]);
    }
    table.render(60)
}

pub fn roles(items: &[Role], width: usize) -> String {
    if items.is_empty() {
        return empty("roles");
    }
    let mut table = Table::new(["ID", "Name", "Description"]);
    for r in items {
        table.row([r.id.clone(), r.name.clone(), or_dash(r.description.as_deref())]);
    }
    table.render(width)
}

pub fn packages(items: &[Package], width: usize) -> String {
    if items.is_empty() {
        return empty("packages");
    }
    let mut table = Table::new(["ID", "Name", "Price", "Tasks", "Description"]);
    for p in items {
        table.row([
            p.id.clone(),
            p.name.clone(),
            or_dash(p.price.map(|v| format!("{:.2}", v))),
            or_dash(p.total_tasks),
            or_dash(p.description.as_deref()),
        ]);
    }
    table.render(width)
}

/// Kanban columns stacked vertically, followed by the cancelled bucket.
pub fn board(client: &Client, board: &TaskBoard, today: NaiveDate) -> String {
    let counts = board.counts();
    let mut out = format!(
        "{} {}\n\n",
        style(&client.name).bold(),
        style(format!("({} tasks)", counts.total())).dim()
    );
    let columns = TaskStatus::COLUMNS
        .into_iter()
        .chain(std::iter::once(TaskStatus::Cancelled));
    for status in columns {
        let tasks = board.column(status);
        if status == TaskStatus::Cancelled && tasks.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "{}{} {}\n",
            COLUMN,
            style(status.label()).bold(),
            style(format!("[{}]", counts.get(status))).dim()
        ));
        for task in tasks {
            let mut line = format!("  {}{}  {}", TASK, task.name, style(&task.id).dim());
            line.push_str(&format!("  {}", task.priority.as_str()));
            if let Some(name) = task.assignee_name() {
                line.push_str(&format!("  @{}", name));
            }
            if task.is_overdue(today) {
                line.push_str(&format!("  {}overdue", OVERDUE));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn distribution(pool: &DistributionBoard) -> String {
    let mut out = String::new();
    for group in pool.groups() {
        out.push_str(&format!(
            "{}{} {}\n",
            COLUMN,
            style(group.site_type.label()).bold(),
            style(format!("[{}]", group.tasks.len())).dim()
        ));
        for task in group.tasks {
            let mark = if pool.is_selected(&task.id) {
                &SELECTED
            } else {
                &UNSELECTED
            };
            let mut line = format!("  {}{}  {}  {}", mark, task.name, style(&task.id).dim(), task.category);
            if let Some(name) = task.assignee_name() {
                line.push_str(&format!("  -> {}", name));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn detail(view: &DetailView, width: usize) -> String {
    let mut out = format!("{}\n\n", style(&view.heading).bold());
    for section in &view.sections {
        let icon = if section.collapsed {
            &SECTION_CLOSED
        } else {
            &SECTION_OPEN
        };
        out.push_str(&format!("{}{}\n", icon, style(section.title).bold()));
        if section.collapsed {
            continue;
        }
        if section.fields.is_empty() {
            out.push_str(&format!("  {}\n", style("(none)").dim()));
        }
        let card = section
            .fields
            .iter()
            .fold(Card::new(""), |card, f| card.field(f.label, f.value.clone()));
        for line in card.render(width).lines().skip(1) {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
