use anyhow::Result;
use console::style;

use opsdesk::desk::AgentTaskList;
use opsdesk::desk::crud;
use opsdesk::desk::detail::DetailView;
use opsdesk::desk::filter::{AgentFilter, TaskFilter};
use opsdesk::desk::forms::{AgentForm, ReportForm};
use opsdesk::desk::views::agent_list;
use opsdesk::errors::DeskError;
use opsdesk::ui::render;
use opsdesk_common::Agent;

use super::super::AgentCommands;
use super::{Session, sort_order, today};

pub async fn cmd_agents(session: &Session, command: AgentCommands) -> Result<()> {
    match command {
        AgentCommands::List {
            search,
            role,
            category,
            sort,
            order,
        } => {
            let mut view = agent_list(session.ctx.clone());
            view.set_mode(session.config.view);
            view.set_filter(AgentFilter {
                search: search.unwrap_or_default(),
                role,
                category,
            });
            if let Some(key) = sort {
                view.set_sort(key, sort_order(order.desc));
            }
            session.load_list("Loading agents", &mut view).await?;
            print!("{}", render::agents(&view.visible(), view.mode(), session.width));
        }
        AgentCommands::Show { id } => {
            let agent = find_agent(session, &id).await?;
            print!("{}", render::detail(&DetailView::of(&agent), session.width));
        }
        AgentCommands::Add {
            name,
            email,
            role,
            category,
        } => {
            let form = AgentForm {
                name,
                email,
                role,
                category,
            };
            let agent = session
                .spin("Creating agent", crud::create_agent(&session.ctx, &form))
                .await?;
            println!("{}", agent.id);
        }
        AgentCommands::Delete { id } => {
            if !session.confirm(&format!("Delete agent '{}'?", id)) {
                println!("Deletion cancelled.");
                return Ok(());
            }
            session
                .spin("Deleting agent", crud::delete_agent(&session.ctx, &id))
                .await?;
        }
        AgentCommands::Tasks {
            agent_id,
            search,
            status,
            category,
            priority,
            overdue,
            sort,
            order,
        } => {
            let list = session
                .spin("Loading tasks", AgentTaskList::open(session.ctx.clone(), &agent_id))
                .await?;
            let today = today();
            let filter = TaskFilter {
                search: search.unwrap_or_default(),
                status,
                category,
                priority,
                overdue_as_of: overdue.then_some(today),
            };
            let visible = list.visible(&filter, sort.map(|key| (key, sort_order(order.desc))));
            print!(
                "{}",
                render::tasks(&visible, session.config.view, session.width, today)
            );
        }
        AgentCommands::SetStatus {
            agent_id,
            task_id,
            status,
        } => {
            let mut list = session
                .spin("Loading tasks", AgentTaskList::open(session.ctx.clone(), &agent_id))
                .await?;
            let outcome = session
                .spin("Updating status", list.set_status(&task_id, status))
                .await?;
            outcome.into_result()?;
        }
        AgentCommands::Report {
            agent_id,
            task_id,
            title,
            url,
            note,
        } => {
            let mut list = session
                .spin("Loading tasks", AgentTaskList::open(session.ctx.clone(), &agent_id))
                .await?;
            let form = ReportForm { title, url, note };
            session
                .spin("Submitting report", list.submit_report(&task_id, &form))
                .await?;
            if let Some(task) = list.find(&task_id) {
                println!(
                    "{} now has {} report(s)",
                    style(&task.name).bold(),
                    task.reports.len()
                );
            }
        }
    }
    Ok(())
}

/// The backend has no single-agent endpoint; look the agent up in the list.
async fn find_agent(session: &Session, id: &str) -> Result<Agent, DeskError> {
    let mut view = agent_list(session.ctx.clone());
    session.load_list("Loading agents", &mut view).await?;
    match view.items().iter().find(|a| a.id == id) {
        Some(agent) => Ok(agent.clone()),
        None => {
            let err = DeskError::not_found("Agent", id);
            session.ctx.report_failure("load the agent", &err);
            Err(err)
        }
    }
}
