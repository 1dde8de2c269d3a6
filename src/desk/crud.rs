//! Create, replace and delete actions for agents, clients and users.
//!
//! Each action validates locally first, then issues exactly one request and
//! raises exactly one toast for the outcome.

use tracing::info;

use opsdesk_common::{Agent, Client, User};

use super::context::DeskContext;
use super::forms::{AgentForm, ClientEdit, UserEdit, UserForm};
use crate::errors::DeskError;

pub async fn create_agent(ctx: &DeskContext, form: &AgentForm) -> Result<Agent, DeskError> {
    let payload = ctx.checked("create the agent", form.validate())?;
    let agent = ctx.checked("create the agent", ctx.api.create_agent(&payload).await)?;
    info!(agent_id = %agent.id, "agent created");
    ctx.success(format!("Agent '{}' created", agent.name));
    Ok(agent)
}

pub async fn delete_agent(ctx: &DeskContext, id: &str) -> Result<(), DeskError> {
    ctx.checked("delete the agent", ctx.api.delete_agent(id).await)?;
    info!(agent_id = id, "agent deleted");
    ctx.success("Agent deleted");
    Ok(())
}

/// Apply `edit` to `client` and PUT the whole record.
pub async fn save_client(
    ctx: &DeskContext,
    client: &Client,
    edit: &ClientEdit,
) -> Result<Client, DeskError> {
    let updated = ctx.checked("update the client", edit.apply_to(client))?;
    let saved = ctx.checked("update the client", ctx.api.update_client(&updated).await)?;
    info!(client_id = %saved.id, "client updated");
    ctx.success(format!("Client '{}' updated", saved.name));
    Ok(saved)
}

pub async fn delete_client(ctx: &DeskContext, id: &str) -> Result<(), DeskError> {
    ctx.checked("delete the client", ctx.api.delete_client(id).await)?;
    info!(client_id = id, "client deleted");
    ctx.success("Client deleted");
    Ok(())
}

pub async fn create_user(ctx: &DeskContext, form: &UserForm) -> Result<User, DeskError> {
    let payload = ctx.checked("create the user", form.validate())?;
    let user = ctx.checked("create the user", ctx.api.create_user(&payload).await)?;
    info!(user_id = %user.id, "user created");
    ctx.success(format!("User {} created", user.email));
    Ok(user)
}

/// Apply `edit` to `user` and PUT the whole record.
pub async fn save_user(ctx: &DeskContext, user: &User, edit: &UserEdit) -> Result<User, DeskError> {
    let updated = ctx.checked("update the user", edit.apply_to(user))?;
    let saved = ctx.checked("update the user", ctx.api.update_user(&updated).await)?;
    info!(user_id = %saved.id, "user updated");
    ctx.success(format!("User {} updated", saved.email));
    Ok(saved)
}

pub async fn delete_user(ctx: &DeskContext, id: &str) -> Result<(), DeskError> {
    ctx.checked("delete the user", ctx.api.delete_user(id).await)?;
    info!(user_id = id, "user deleted");
    ctx.success("User deleted");
    Ok(())
}
