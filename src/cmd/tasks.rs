use anyhow::Result;

use opsdesk::desk::filter::TaskFilter;
use opsdesk::desk::views::client_task_list;
use opsdesk::ui::render;

use super::super::TaskCommands;
use super::{Session, sort_order, today};

pub async fn cmd_tasks(session: &Session, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List {
            client,
            search,
            status,
            category,
            priority,
            overdue,
            sort,
            order,
        } => {
            let today = today();
            let mut view = client_task_list(session.ctx.clone(), &client);
            view.set_mode(session.config.view);
            view.set_filter(TaskFilter {
                search: search.unwrap_or_default(),
                status,
                category,
                priority,
                overdue_as_of: overdue.then_some(today),
            });
            if let Some(key) = sort {
                view.set_sort(key, sort_order(order.desc));
            }
            session.load_list("Loading tasks", &mut view).await?;
            print!(
                "{}",
                render::tasks(&view.visible(), view.mode(), session.width, today)
            );
        }
    }
    Ok(())
}
