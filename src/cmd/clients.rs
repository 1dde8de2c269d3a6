use anyhow::Result;

use opsdesk::desk::crud;
use opsdesk::desk::detail::DetailView;
use opsdesk::desk::filter::ClientFilter;
use opsdesk::desk::forms::ClientEdit;
use opsdesk::desk::views::client_list;
use opsdesk::desk::DeskContext;
use opsdesk::errors::DeskError;
use opsdesk::ui::render;
use opsdesk_common::{Client, PackageRef, eq_ignore_case};

use super::super::ClientCommands;
use super::{Session, sort_order};

pub async fn cmd_clients(session: &Session, command: ClientCommands) -> Result<()> {
    match command {
        ClientCommands::List {
            search,
            status,
            package,
            sort,
            order,
        } => {
            let mut view = client_list(session.ctx.clone());
            view.set_mode(session.config.view);
            view.set_filter(ClientFilter {
                search: search.unwrap_or_default(),
                status,
                package,
            });
            if let Some(key) = sort {
                view.set_sort(key, sort_order(order.desc));
            }
            session.load_list("Loading clients", &mut view).await?;
            print!("{}", render::clients(&view.visible(), view.mode(), session.width));
        }
        ClientCommands::Show { id, collapse } => {
            let client = session.spin("Loading client", load_client(&session.ctx, &id)).await?;
            let mut detail = DetailView::of(&client);
            for title in &collapse {
                if !detail.set_collapsed(title, true) {
                    session
                        .ctx
                        .info(format!("No section named '{}'", title));
                }
            }
            print!("{}", render::detail(&detail, session.width));
        }
        ClientCommands::Edit {
            id,
            name,
            company,
            email,
            status,
            progress,
            package,
            due,
        } => {
            let client = session.spin("Loading client", load_client(&session.ctx, &id)).await?;
            let package = match package {
                Some(wanted) => Some(resolve_package(&session.ctx, &wanted).await?),
                None => None,
            };
            let edit = ClientEdit {
                name,
                company,
                email,
                status,
                progress,
                package,
                due_date: due,
            };
            if edit.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            session
                .spin("Saving client", crud::save_client(&session.ctx, &client, &edit))
                .await?;
        }
        ClientCommands::Delete { id } => {
            if !session.confirm(&format!("Delete client '{}'?", id)) {
                println!("Deletion cancelled.");
                return Ok(());
            }
            session
                .spin("Deleting client", crud::delete_client(&session.ctx, &id))
                .await?;
        }
    }
    Ok(())
}

async fn load_client(ctx: &DeskContext, id: &str) -> Result<Client, DeskError> {
    ctx.checked("load the client", ctx.api.get_client(id).await)
}

/// Match a package by id or name against the catalogue.
async fn resolve_package(ctx: &DeskContext, wanted: &str) -> Result<PackageRef, DeskError> {
    let packages = ctx.checked("load packages", ctx.api.list_packages().await)?;
    let found = packages
        .iter()
        .find(|p| p.id == wanted || eq_ignore_case(&p.name, wanted))
        .map(|p| p.to_ref());
    let result = found.ok_or_else(|| DeskError::not_found("Package", wanted));
    ctx.checked("update the client", result)
}
