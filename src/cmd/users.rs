use anyhow::Result;
use dialoguer::Password;

use opsdesk::desk::DeskContext;
use opsdesk::desk::crud;
use opsdesk::desk::detail::DetailView;
use opsdesk::desk::filter::UserFilter;
use opsdesk::desk::forms::{UserEdit, UserForm};
use opsdesk::desk::views::user_list;
use opsdesk::errors::DeskError;
use opsdesk::ui::render;
use opsdesk_common::{Role, User, eq_ignore_case};

use super::super::UserCommands;
use super::{Session, sort_order};

pub async fn cmd_users(session: &Session, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List {
            search,
            role,
            status,
            sort,
            order,
            page,
        } => {
            let page_size = session.config.page_size();
            let mut view = user_list(session.ctx.clone(), page_size);
            view.set_mode(session.config.view);
            view.set_filter(UserFilter {
                search: search.unwrap_or_default(),
                role,
                status,
            });
            if let Some(key) = sort {
                view.set_sort(key, sort_order(order.desc));
            }
            view.seek(page.saturating_sub(1).saturating_mul(page_size));
            session.load_list("Loading users", &mut view).await?;
            print!("{}", render::users(&view.visible(), view.mode(), session.width));
            print!(
                "{}",
                render::page_footer(view.offset(), view.items().len(), view.total())
            );
        }
        UserCommands::Show { id } => {
            let user = session.spin("Loading user", find_user(&session.ctx, &id)).await?;
            print!("{}", render::detail(&DetailView::of(&user), session.width));
        }
        UserCommands::Add {
            email,
            password,
            name,
            role,
            status,
        } => {
            let password = match password {
                Some(p) => p,
                None => Password::new().with_prompt("Password").interact()?,
            };
            let role = session.spin("Loading roles", resolve_role(&session.ctx, &role)).await?;
            let form = UserForm {
                email,
                password,
                name,
                role_id: role.id,
                status,
            };
            let user = session
                .spin("Creating user", crud::create_user(&session.ctx, &form))
                .await?;
            println!("{}", user.id);
        }
        UserCommands::Edit {
            id,
            email,
            name,
            phone,
            role,
            status,
        } => {
            let user = session.spin("Loading user", find_user(&session.ctx, &id)).await?;
            let role = match role {
                Some(wanted) => Some(resolve_role(&session.ctx, &wanted).await?),
                None => None,
            };
            let edit = UserEdit {
                email,
                name,
                phone,
                role,
                status,
            };
            if edit.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            session
                .spin("Saving user", crud::save_user(&session.ctx, &user, &edit))
                .await?;
        }
        UserCommands::Delete { id } => {
            if !session.confirm(&format!("Delete user '{}'?", id)) {
                println!("Deletion cancelled.");
                return Ok(());
            }
            session
                .spin("Deleting user", crud::delete_user(&session.ctx, &id))
                .await?;
        }
        UserCommands::Stats => {
            let ctx = &session.ctx;
            let stats = session.spin("Loading statistics", ctx.api.user_stats()).await;
            let stats = ctx.checked("load user statistics", stats)?;
            print!("{}", render::user_stats(&stats));
        }
    }
    Ok(())
}

pub async fn cmd_roles(session: &Session) -> Result<()> {
    let ctx = &session.ctx;
    let roles = session.spin("Loading roles", ctx.api.list_roles()).await;
    let roles = ctx.checked("load roles", roles)?;
    print!("{}", render::roles(&roles, session.width));
    Ok(())
}

pub async fn cmd_packages(session: &Session) -> Result<()> {
    let ctx = &session.ctx;
    let packages = session.spin("Loading packages", ctx.api.list_packages()).await;
    let packages = ctx.checked("load packages", packages)?;
    print!("{}", render::packages(&packages, session.width));
    Ok(())
}

const LOOKUP_PAGE: u64 = 100;

/// Users are only reachable through the paged listing, so walk it.
async fn find_user(ctx: &DeskContext, id: &str) -> Result<User, DeskError> {
    let mut offset = 0;
    loop {
        let page = ctx.checked("load the user", ctx.api.list_users(offset, LOOKUP_PAGE).await)?;
        if let Some(user) = page.items.iter().find(|u| u.id == id) {
            return Ok(user.clone());
        }
        offset += page.items.len() as u64;
        if page.items.is_empty() || offset >= page.total {
            break;
        }
    }
    ctx.checked("load the user", Err(DeskError::not_found("User", id)))
}

/// Match a role by id or name.
async fn resolve_role(ctx: &DeskContext, wanted: &str) -> Result<Role, DeskError> {
    let roles = ctx.checked("load roles", ctx.api.list_roles().await)?;
    let found = roles
        .into_iter()
        .find(|r| r.id == wanted || eq_ignore_case(&r.name, wanted));
    ctx.checked(
        "resolve the role",
        found.ok_or_else(|| DeskError::not_found("Role", wanted)),
    )
}
