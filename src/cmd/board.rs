use anyhow::Result;
use console::style;

use opsdesk::desk::forms::TaskForm;
use opsdesk::desk::{BoardCounts, BoardSession, CommitOutcome};
use opsdesk::ui::render;
use opsdesk_common::TaskStatus;

use super::super::BoardCommands;
use super::{Session, today};

pub async fn cmd_board(session: &Session, command: BoardCommands) -> Result<()> {
    match command {
        BoardCommands::Show { client_id } => {
            let board = open(session, &client_id).await?;
            print!("{}", render::board(board.client(), board.board(), today()));
        }
        BoardCommands::Move {
            client_id,
            task_id,
            to,
        } => {
            let mut board = open(session, &client_id).await?;
            let outcome = session.spin("Saving board", board.move_task(&task_id, to)).await?;
            settle(&board, outcome)?;
        }
        BoardCommands::Status {
            client_id,
            task_id,
            status,
        } => {
            let mut board = open(session, &client_id).await?;
            let outcome = session
                .spin("Saving board", board.change_status(&task_id, status))
                .await?;
            settle(&board, outcome)?;
        }
        BoardCommands::Complete { client_id, task_id } => {
            let mut board = open(session, &client_id).await?;
            let outcome = session
                .spin("Saving board", board.mark_completed(&task_id))
                .await?;
            settle(&board, outcome)?;
        }
        BoardCommands::Cancel { client_id, task_id } => {
            let mut board = open(session, &client_id).await?;
            if !session.confirm(&format!("Cancel task '{}'?", task_id)) {
                println!("Cancellation aborted.");
                return Ok(());
            }
            let outcome = session.spin("Saving board", board.cancel(&task_id)).await?;
            settle(&board, outcome)?;
        }
        BoardCommands::Assign {
            client_id,
            task_id,
            member_id,
        } => {
            let mut board = open(session, &client_id).await?;
            let member_id = match member_id {
                Some(id) => id,
                None => {
                    let eligible = board.eligible_assignees(&task_id);
                    if eligible.is_empty() {
                        println!("No team member matches this task's category.");
                        return Ok(());
                    }
                    let options: Vec<String> = eligible
                        .iter()
                        .map(|m| format!("{} ({})", m.name, m.category))
                        .collect();
                    let ids: Vec<String> = eligible.iter().map(|m| m.id.clone()).collect();
                    let choice = session.select("Assign to", &options)?;
                    ids[choice].clone()
                }
            };
            match session
                .spin("Saving board", board.assign(&task_id, &member_id))
                .await?
            {
                Some(outcome) => settle(&board, outcome)?,
                None => println!("No team member matches this task's category."),
            }
        }
        BoardCommands::New {
            client_id,
            name,
            category,
            priority,
            due,
            site_type,
        } => {
            let mut board = open(session, &client_id).await?;
            let form = TaskForm {
                name,
                category,
                priority,
                due_date: due,
                site_type,
            };
            let task = session
                .spin("Creating task", board.create_task(&form, today()))
                .await?;
            println!("{}", task.id);
            print_counts(&board.counts());
        }
    }
    Ok(())
}

async fn open(session: &Session, client_id: &str) -> Result<BoardSession> {
    let board = session
        .spin(
            "Loading board",
            BoardSession::open(session.ctx.clone(), client_id),
        )
        .await?;
    Ok(board)
}

/// Print the column counts the board settled on, then surface any failure.
fn settle(board: &BoardSession, outcome: CommitOutcome) -> Result<()> {
    print_counts(&board.counts());
    outcome.into_result()?;
    Ok(())
}

fn print_counts(counts: &BoardCounts) {
    let parts: Vec<String> = TaskStatus::COLUMNS
        .into_iter()
        .map(|s| format!("{} {}", s.label(), counts.get(s)))
        .collect();
    let mut line = parts.join("  ");
    if counts.cancelled > 0 {
        line.push_str(&format!("  {} {}", TaskStatus::Cancelled.label(), counts.cancelled));
    }
    println!("{}", style(line).dim());
}
