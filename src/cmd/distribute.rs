use anyhow::Result;

use opsdesk::desk::DistributionBoard;
use opsdesk::ui::render;

use super::super::DistributeCommands;
use super::Session;

pub async fn cmd_distribute(session: &Session, command: Option<DistributeCommands>) -> Result<()> {
    let mut board = session
        .spin("Loading pool", DistributionBoard::open(session.ctx.clone()))
        .await?;

    match command.unwrap_or(DistributeCommands::List) {
        DistributeCommands::List => {
            print!("{}", render::distribution(&board));
        }
        DistributeCommands::Assign { tasks, agent } => {
            for task_id in &tasks {
                if board.is_selected(task_id) {
                    continue;
                }
                let toggled = board.toggle_select(task_id);
                session.ctx.checked("select the task", toggled)?;
            }

            let agent_id = match agent {
                Some(id) => id,
                None => {
                    let eligible = board.eligible_agents();
                    if eligible.is_empty() {
                        println!("No agent handles the first selected task's category.");
                        return Ok(());
                    }
                    let options: Vec<String> = eligible
                        .iter()
                        .map(|a| format!("{} ({}, {} open)", a.name, a.category, a.assigned_tasks))
                        .collect();
                    let ids: Vec<String> = eligible.iter().map(|a| a.id.clone()).collect();
                    let choice = session.select("Assign to", &options)?;
                    ids[choice].clone()
                }
            };

            board.assign_selected(&agent_id)?;
            let result = session.spin("Distributing", board.distribute()).await?;
            println!("{} task(s) distributed", result.distributed);
        }
    }
    Ok(())
}
