//! Bulk task distribution.
//!
//! The pool of unassigned tasks is grouped by site type. The operator
//! selects several tasks, picks an agent from the first selected task's
//! dropdown, and the choice is applied to the whole selection locally.
//! Nothing reaches the backend until [`DistributionBoard::distribute`]
//! posts the pending batch in one request.

use tracing::{debug, info};

use opsdesk_common::{Agent, SiteType, Task};

use super::api::{DistributionBatch, DistributionEntry, DistributionResult};
use super::context::DeskContext;
use crate::errors::DeskError;

/// Tasks of one site type, in pool order.
#[derive(Debug)]
pub struct SiteGroup<'a> {
    pub site_type: SiteType,
    pub tasks: Vec<&'a Task>,
}

pub struct DistributionBoard {
    ctx: DeskContext,
    pool: Vec<Task>,
    agents: Vec<Agent>,
    /// Selected task ids, in the order they were picked.
    selection: Vec<String>,
}

impl DistributionBoard {
    pub async fn open(ctx: DeskContext) -> Result<Self, DeskError> {
        let result = futures::try_join!(ctx.api.list_distributable(), ctx.api.list_agents());
        let (pool, agents) = ctx.checked("load the distribution pool", result)?;
        debug!(tasks = pool.len(), agents = agents.len(), "distribution pool loaded");
        Ok(Self::from_parts(ctx, pool, agents))
    }

    pub fn from_parts(ctx: DeskContext, pool: Vec<Task>, agents: Vec<Agent>) -> Self {
        Self {
            ctx,
            pool,
            agents,
            selection: Vec::new(),
        }
    }

    pub fn pool(&self) -> &[Task] {
        &self.pool
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// One group per site type, including empty ones, in taxonomy order.
    pub fn groups(&self) -> Vec<SiteGroup<'_>> {
        SiteType::ALL
            .into_iter()
            .map(|site_type| SiteGroup {
                site_type,
                tasks: self
                    .pool
                    .iter()
                    .filter(|t| t.site_type_or_default() == site_type)
                    .collect(),
            })
            .collect()
    }

    fn task(&self, task_id: &str) -> Option<&Task> {
        self.pool.iter().find(|t| t.id == task_id)
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, task_id: &str) -> bool {
        self.selection.iter().any(|id| id == task_id)
    }

    /// Select or deselect a task. Returns whether it is now selected.
    pub fn toggle_select(&mut self, task_id: &str) -> Result<bool, DeskError> {
        if self.task(task_id).is_none() {
            return Err(DeskError::not_found("Task", task_id));
        }
        if let Some(pos) = self.selection.iter().position(|id| id == task_id) {
            self.selection.remove(pos);
            Ok(false)
        } else {
            self.selection.push(task_id.to_string());
            Ok(true)
        }
    }

    pub fn first_selected(&self) -> Option<&Task> {
        self.selection.first().and_then(|id| self.task(id))
    }

    /// Agents offered in the first selected task's dropdown.
    pub fn eligible_agents(&self) -> Vec<&Agent> {
        let Some(first) = self.first_selected() else {
            return Vec::new();
        };
        self.agents
            .iter()
            .filter(|a| a.handles_category(&first.category))
            .collect()
    }

    /// Apply `agent_id` to every selected task. Local only.
    pub fn assign_selected(&mut self, agent_id: &str) -> Result<usize, DeskError> {
        let result = self.try_assign_selected(agent_id);
        self.ctx.checked("assign the selected tasks", result)
    }

    fn try_assign_selected(&mut self, agent_id: &str) -> Result<usize, DeskError> {
        if self.selection.is_empty() {
            return Err(DeskError::validation("Select at least one task first"));
        }
        let agent = self
            .eligible_agents()
            .into_iter()
            .find(|a| a.id == agent_id)
            .map(Agent::to_ref)
            .ok_or_else(|| {
                DeskError::validation(format!(
                    "Agent {} does not handle the first selected task's category",
                    agent_id
                ))
            })?;

        let mut assigned = 0;
        for task in self.pool.iter_mut() {
            if self.selection.contains(&task.id) {
                task.assigned_to = Some(agent.clone());
                assigned += 1;
            }
        }
        self.ctx
            .info(format!("{} task(s) set to {}", assigned, agent.name));
        Ok(assigned)
    }

    /// Every locally assigned task, in pool order.
    pub fn pending_batch(&self) -> DistributionBatch {
        DistributionBatch {
            assignments: self
                .pool
                .iter()
                .filter_map(|t| {
                    t.assigned_to.as_ref().map(|a| DistributionEntry {
                        task_id: t.id.clone(),
                        agent_id: a.id.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Post the pending batch.
    ///
    /// On success the distributed tasks leave the pool and the selection
    /// clears. On failure local assignments stay so the batch can be resent.
    pub async fn distribute(&mut self) -> Result<DistributionResult, DeskError> {
        let batch = self.pending_batch();
        if batch.is_empty() {
            let err = DeskError::validation("No assignments to distribute");
            self.ctx.report_failure("distribute tasks", &err);
            return Err(err);
        }

        let result = self.ctx.api.distribute(&batch).await;
        let result = self.ctx.checked("distribute tasks", result)?;

        self.pool
            .retain(|t| !batch.assignments.iter().any(|e| e.task_id == t.id));
        self.selection.clear();
        info!(count = batch.len(), "tasks distributed");
        self.ctx
            .success(format!("Distributed {} task(s)", batch.len()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::fake::{FakeApi, sample_agent, sample_task};
    use crate::desk::notify::{ToastLevel, ToastLog};
    use opsdesk_common::TaskStatus;
    use std::sync::Arc;

    fn pool() -> Vec<Task> {
        let mut social = sample_task("d1", "Profile", "social", TaskStatus::Unassigned);
        social.site_type = Some(SiteType::SocialSite);
        let mut web2 = sample_task("d2", "Blogspot post", "content", TaskStatus::Unassigned);
        web2.site_type = Some(SiteType::Web2Site);
        let untyped = sample_task("d3", "Directory listing", "content", TaskStatus::Unassigned);
        vec![social, web2, untyped]
    }

    async fn open(api: &Arc<FakeApi>, log: &Arc<ToastLog>) -> DistributionBoard {
        let ctx = DeskContext::new(api.clone(), log.clone());
        DistributionBoard::open(ctx).await.unwrap()
    }

    fn seeded() -> Arc<FakeApi> {
        let api = Arc::new(FakeApi::new());
        api.put_distributable(pool());
        api.put_agents(vec![
            sample_agent("a-content", "Casey Content", "content"),
            sample_agent("a-social", "Sol Social", "social"),
        ]);
        api
    }

    #[tokio::test]
    async fn test_groups_put_untyped_tasks_in_other_asset() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let board = open(&api, &log).await;

        let groups = board.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].site_type, SiteType::SocialSite);
        assert_eq!(groups[0].tasks.len(), 1);
        assert_eq!(groups[2].site_type, SiteType::OtherAsset);
        assert_eq!(groups[2].tasks[0].id, "d3");
    }

    #[tokio::test]
    async fn test_first_selected_task_drives_dropdown() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;

        assert!(board.eligible_agents().is_empty());
        assert!(board.toggle_select("d2").unwrap());
        assert!(board.toggle_select("d3").unwrap());
        let ids: Vec<_> = board.eligible_agents().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a-content"]);

        assert!(!board.toggle_select("d2").unwrap());
        assert_eq!(board.first_selected().unwrap().id, "d3");
    }

    #[tokio::test]
    async fn test_assign_applies_to_every_selected_task() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;

        board.toggle_select("d2").unwrap();
        board.toggle_select("d1").unwrap();
        let count = board.assign_selected("a-content").unwrap();
        assert_eq!(count, 2);
        let batch = board.pending_batch();
        assert_eq!(batch.len(), 2);
        assert!(batch.assignments.iter().all(|e| e.agent_id == "a-content"));
        assert!(api.distributed().is_empty());
    }

    #[tokio::test]
    async fn test_assign_rejects_agent_outside_first_category() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;

        board.toggle_select("d2").unwrap();
        let err = board.assign_selected("a-social").unwrap_err();
        assert!(err.is_validation());
        assert!(board.pending_batch().is_empty());
        assert_eq!(log.count(ToastLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_distribute_success_clears_pool_and_selection() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;

        board.toggle_select("d2").unwrap();
        board.toggle_select("d3").unwrap();
        board.assign_selected("a-content").unwrap();
        log.clear();

        let result = board.distribute().await.unwrap();
        assert_eq!(result.distributed, 2);
        assert_eq!(board.pool().len(), 1);
        assert!(board.selection().is_empty());
        assert_eq!(api.distributed().len(), 1);
        assert_eq!(log.toasts().len(), 1);
        assert_eq!(log.count(ToastLevel::Success), 1);
    }

    #[tokio::test]
    async fn test_distribute_failure_keeps_assignments() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;
        board.toggle_select("d1").unwrap();
        board.assign_selected("a-social").unwrap();
        log.clear();
        api.fail_distribute(true);

        assert!(board.distribute().await.is_err());
        assert_eq!(board.pool().len(), 3);
        assert_eq!(board.pending_batch().len(), 1);
        assert_eq!(board.selection(), ["d1".to_string()]);
        assert_eq!(log.toasts().len(), 1);
        assert_eq!(log.count(ToastLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_distribute_with_empty_batch_sends_nothing() {
        let api = seeded();
        let log = Arc::new(ToastLog::new());
        let mut board = open(&api, &log).await;
        assert!(board.distribute().await.unwrap_err().is_validation());
        assert!(api.distributed().is_empty());
    }
}
