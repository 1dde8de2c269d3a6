//! Per-client kanban board.
//!
//! [`TaskBoard`] is the pure column model: it owns a [`TaskMap`] and keeps
//! every task's `status` equal to the column holding it. [`BoardSession`]
//! wraps a board with the client it belongs to and drives every change
//! through the optimistic flow in [`super::saga`]: mutate the board, toast,
//! PATCH the full map, and re-fetch on failure.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use opsdesk_common::{Agent, AgentRef, Client, Task, TaskMap, TaskStatus};

use super::context::DeskContext;
use super::forms::TaskForm;
use super::saga::{CommitOutcome, Reconcile, apply_optimistic};
use crate::errors::DeskError;

/// Task count per column, in board order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCounts {
    pub unassigned: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl BoardCounts {
    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Unassigned => self.unassigned,
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Cancelled => self.cancelled,
        }
    }

    pub fn total(&self) -> usize {
        self.unassigned + self.pending + self.in_progress + self.completed + self.cancelled
    }
}

/// Result of moving a task between columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moved { from: TaskStatus, to: TaskStatus },
    /// The task already sat in the target column.
    Unchanged(TaskStatus),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    map: TaskMap,
}

impl TaskBoard {
    /// Build a board from a server map. A task whose `status` disagrees with
    /// its column takes the column's status.
    pub fn from_map(mut map: TaskMap) -> Self {
        for status in TaskStatus::ALL {
            for task in map.column_mut(status) {
                if task.status != status {
                    debug!(task_id = %task.id, from = %task.status, to = %status, "normalizing task status to its column");
                    task.status = status;
                }
            }
        }
        Self { map }
    }

    pub fn map(&self) -> &TaskMap {
        &self.map
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.map.column(status)
    }

    pub fn counts(&self) -> BoardCounts {
        BoardCounts {
            unassigned: self.map.unassigned.len(),
            pending: self.map.pending.len(),
            in_progress: self.map.in_progress.len(),
            completed: self.map.completed.len(),
            cancelled: self.map.cancelled.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn locate(&self, task_id: &str) -> Option<(TaskStatus, usize)> {
        TaskStatus::ALL.into_iter().find_map(|status| {
            self.map
                .column(status)
                .iter()
                .position(|t| t.id == task_id)
                .map(|idx| (status, idx))
        })
    }

    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.locate(task_id)
            .map(|(status, idx)| &self.map.column(status)[idx])
    }

    /// Splice a task out of its column and append it to `target`.
    pub fn move_task(&mut self, task_id: &str, target: TaskStatus) -> Result<MoveResult, DeskError> {
        let (from, idx) = self
            .locate(task_id)
            .ok_or_else(|| DeskError::not_found("Task", task_id))?;
        if from == target {
            return Ok(MoveResult::Unchanged(target));
        }
        let mut task = self.map.column_mut(from).remove(idx);
        task.status = target;
        self.map.column_mut(target).push(task);
        Ok(MoveResult::Moved { from, to: target })
    }

    /// Set the assignee. An unassigned task moves to `pending`.
    pub fn assign(&mut self, task_id: &str, agent: AgentRef) -> Result<MoveResult, DeskError> {
        let (status, idx) = self
            .locate(task_id)
            .ok_or_else(|| DeskError::not_found("Task", task_id))?;
        self.map.column_mut(status)[idx].assigned_to = Some(agent);
        if status == TaskStatus::Unassigned {
            self.move_task(task_id, TaskStatus::Pending)
        } else {
            Ok(MoveResult::Unchanged(status))
        }
    }

    /// Add a freshly created task to the unassigned column. Returns `false`
    /// if a task with the same id is already on the board.
    pub fn insert_created(&mut self, mut task: Task) -> bool {
        if self.locate(&task.id).is_some() {
            return false;
        }
        task.status = TaskStatus::Unassigned;
        task.assigned_to = None;
        self.map.unassigned.push(task);
        true
    }
}

/// How a transition was requested; only changes the wording of the toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Drag,
    ChangeStatus,
    MarkCompleted,
    Cancel,
}

impl Transition {
    fn toast(&self, task_name: &str, result: MoveResult) -> String {
        let to = match result {
            MoveResult::Moved { to, .. } | MoveResult::Unchanged(to) => to,
        };
        match self {
            Self::Drag => format!("Moved '{}' to {}", task_name, to.label()),
            Self::ChangeStatus => format!("Status of '{}' changed to {}", task_name, to.label()),
            Self::MarkCompleted => format!("'{}' marked as completed", task_name),
            Self::Cancel => format!("'{}' cancelled", task_name),
        }
    }
}

/// A client's board plus the context needed to persist it.
pub struct BoardSession {
    ctx: DeskContext,
    client: Client,
    board: TaskBoard,
}

impl BoardSession {
    /// Fetch the client and its task map concurrently.
    pub async fn open(ctx: DeskContext, client_id: &str) -> Result<Self, DeskError> {
        let result = futures::try_join!(
            ctx.api.get_client(client_id),
            ctx.api.get_task_map(client_id)
        );
        let (client, map) = ctx.checked("load the task board", result)?;
        debug!(client_id, tasks = map.len(), "task board loaded");
        Ok(Self::from_parts(ctx, client, map))
    }

    pub fn from_parts(ctx: DeskContext, client: Client, map: TaskMap) -> Self {
        Self {
            ctx,
            client,
            board: TaskBoard::from_map(map),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn counts(&self) -> BoardCounts {
        self.board.counts()
    }

    /// Team members offered in a task's assignee dropdown: those whose
    /// category matches the task's.
    pub fn eligible_assignees(&self, task_id: &str) -> Vec<&Agent> {
        let Some(task) = self.board.find(task_id) else {
            return Vec::new();
        };
        self.client
            .team_members
            .iter()
            .filter(|m| m.handles_category(&task.category))
            .collect()
    }

    /// Move a task to `target` (drag-and-drop).
    pub async fn move_task(
        &mut self,
        task_id: &str,
        target: TaskStatus,
    ) -> Result<CommitOutcome, DeskError> {
        self.transition(task_id, target, Transition::Drag).await
    }

    pub async fn change_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<CommitOutcome, DeskError> {
        self.transition(task_id, status, Transition::ChangeStatus).await
    }

    pub async fn mark_completed(&mut self, task_id: &str) -> Result<CommitOutcome, DeskError> {
        self.transition(task_id, TaskStatus::Completed, Transition::MarkCompleted)
            .await
    }

    pub async fn cancel(&mut self, task_id: &str) -> Result<CommitOutcome, DeskError> {
        self.transition(task_id, TaskStatus::Cancelled, Transition::Cancel)
            .await
    }

    async fn transition(
        &mut self,
        task_id: &str,
        target: TaskStatus,
        kind: Transition,
    ) -> Result<CommitOutcome, DeskError> {
        let result = apply_optimistic(self, |session| {
            let moved = session.board.move_task(task_id, target)?;
            let name = session
                .board
                .find(task_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            session.ctx.success(kind.toast(&name, moved));
            Ok(())
        })
        .await;
        self.finish("update the task", result)
    }

    /// Assign a team member to a task.
    ///
    /// Returns `Ok(None)` without touching anything when no team member
    /// matches the task's category.
    pub async fn assign(
        &mut self,
        task_id: &str,
        member_id: &str,
    ) -> Result<Option<CommitOutcome>, DeskError> {
        if self.board.find(task_id).is_none() {
            let err = DeskError::not_found("Task", task_id);
            self.ctx.report_failure("assign the task", &err);
            return Err(err);
        }
        let eligible = self.eligible_assignees(task_id);
        if eligible.is_empty() {
            debug!(task_id, "no team member matches the task category");
            return Ok(None);
        }
        let Some(member) = eligible.into_iter().find(|m| m.id == member_id).map(Agent::to_ref) else {
            let err = DeskError::validation(format!(
                "Team member {} cannot take this task: category does not match",
                member_id
            ));
            self.ctx.report_failure("assign the task", &err);
            return Err(err);
        };

        let result = apply_optimistic(self, |session| {
            session.board.assign(task_id, member.clone())?;
            let name = session
                .board
                .find(task_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            session
                .ctx
                .success(format!("Assigned '{}' to {}", name, member.name));
            Ok(())
        })
        .await;
        self.finish("assign the task", result).map(Some)
    }

    /// Create a task from the new-task form. It lands in `unassigned`.
    pub async fn create_task(&mut self, form: &TaskForm, today: NaiveDate) -> Result<Task, DeskError> {
        let new_task = self.ctx.checked("create the task", form.validate(today))?;
        let mut created = self.ctx.checked(
            "create the task",
            self.ctx.api.create_task(&self.client.id, &new_task).await,
        )?;
        created.status = TaskStatus::Unassigned;
        created.assigned_to = None;
        if self.board.insert_created(created.clone()) {
            info!(task_id = %created.id, client_id = %self.client.id, "task created");
        }
        self.ctx.success(format!("Task '{}' created", created.name));
        Ok(created)
    }

    fn finish(
        &self,
        action: &str,
        result: Result<CommitOutcome, DeskError>,
    ) -> Result<CommitOutcome, DeskError> {
        match &result {
            Ok(outcome) => {
                if let Some(err) = outcome.error() {
                    self.ctx.report_failure(action, err);
                } else {
                    info!(client_id = %self.client.id, "task board saved");
                }
            }
            Err(err) => self.ctx.report_failure(action, err),
        }
        result
    }
}

#[async_trait]
impl Reconcile for BoardSession {
    type Snapshot = TaskMap;

    fn snapshot(&self) -> TaskMap {
        self.board.map().clone()
    }

    fn restore(&mut self, snapshot: TaskMap) {
        self.board = TaskBoard::from_map(snapshot);
    }

    async fn commit(&self) -> Result<(), DeskError> {
        self.ctx
            .api
            .replace_task_map(&self.client.id, self.board.map())
            .await
    }

    async fn refetch(&self) -> Result<TaskMap, DeskError> {
        self.ctx.api.get_task_map(&self.client.id).await
    }
}
