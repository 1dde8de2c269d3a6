use async_trait::async_trait;
use tracing::info;

use opsdesk_common::{Task, TaskStatus};

use super::context::DeskContext;
use super::filter::{self, Filter, SortKey, SortOrder};
use super::forms::ReportForm;
use super::saga::{CommitOutcome, Reconcile, apply_optimistic};
use crate::errors::DeskError;

/// Tasks assigned to one agent, with status changes and completion reports.
pub struct AgentTaskList {
    ctx: DeskContext,
    agent_id: String,
    tasks: Vec<Task>,
    /// The status change the next commit sends.
    last_change: Option<(String, TaskStatus)>,
}

impl AgentTaskList {
    pub async fn open(ctx: DeskContext, agent_id: &str) -> Result<Self, DeskError> {
        let result = ctx.api.list_agent_tasks(agent_id).await;
        let tasks = ctx.checked("load the agent's tasks", result)?;
        Ok(Self {
            ctx,
            agent_id: agent_id.to_string(),
            tasks,
            last_change: None,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks passing `filter`, optionally sorted.
    pub fn visible<F, K>(&self, filter: &F, sort: Option<(K, SortOrder)>) -> Vec<&Task>
    where
        F: Filter<Task>,
        K: SortKey<Task>,
    {
        let mut view = filter::apply(&self.tasks, filter);
        if let Some((key, order)) = sort {
            filter::sort_view(&mut view, key, order);
        }
        view
    }

    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Change one task's status optimistically.
    pub async fn set_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<CommitOutcome, DeskError> {
        let result = apply_optimistic(self, |list| {
            let task = list
                .tasks
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| DeskError::not_found("Task", task_id))?;
            task.status = status;
            let message = format!("Status of '{}' changed to {}", task.name, status.label());
            list.last_change = Some((task_id.to_string(), status));
            list.ctx.success(message);
            Ok(())
        })
        .await;
        self.last_change = None;

        match &result {
            Ok(outcome) => match outcome.error() {
                Some(err) => self.ctx.report_failure("update the task status", err),
                None => info!(agent_id = %self.agent_id, task_id, %status, "agent task status updated"),
            },
            Err(err) => self.ctx.report_failure("update the task status", err),
        }
        result
    }

    /// Validate and submit a completion report, then attach it locally.
    pub async fn submit_report(&mut self, task_id: &str, form: &ReportForm) -> Result<(), DeskError> {
        if self.find(task_id).is_none() {
            let err = DeskError::not_found("Task", task_id);
            self.ctx.report_failure("submit the report", &err);
            return Err(err);
        }
        let report = self.ctx.checked("submit the report", form.validate())?;
        let result = self
            .ctx
            .api
            .submit_report(&self.agent_id, task_id, &report)
            .await;
        self.ctx.checked("submit the report", result)?;

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.reports.push(report);
        }
        info!(agent_id = %self.agent_id, task_id, "report submitted");
        self.ctx.success("Report submitted");
        Ok(())
    }
}

#[async_trait]
impl Reconcile for AgentTaskList {
    type Snapshot = Vec<Task>;

    fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    fn restore(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
    }

    async fn commit(&self) -> Result<(), DeskError> {
        let Some((task_id, status)) = &self.last_change else {
            return Ok(());
        };
        self.ctx
            .api
            .update_agent_task_status(&self.agent_id, task_id, *status)
            .await
    }

    async fn refetch(&self) -> Result<Vec<Task>, DeskError> {
        self.ctx.api.list_agent_tasks(&self.agent_id).await
    }
}
