//! Desk: view state and actions behind every operator screen.
//!
//! ## Overview
//!
//! Each screen owns its state and talks to the operations backend through a
//! [`DeskContext`], which carries the `DeskApi` handle and the toast sink.
//! Reads populate view state; writes go through local validation and, on
//! the board and agent task list, the optimistic flow in `saga`.
//!
//! ## Module Map
//!
//! ```text
//! ┌───────────┐  &mut self   ┌────────────────────────────────────────────┐
//! │  cmd::*   │ ───────────> │  board.rs       (BoardSession, TaskBoard)  │
//! │  (clap)   │              │  distribute.rs  (DistributionBoard)        │
//! └───────────┘              │  agent_tasks.rs (AgentTaskList)            │
//!       │                    │  views.rs       (ListView, LoadState)      │
//!       │ render             │  crud.rs        (create / save / delete)   │
//!       v                    │         │                                  │
//! ┌───────────┐              │         │ saga::apply_optimistic()         │
//! │   ui::*   │              │         v                                  │
//! └───────────┘              │  context.rs  (DeskContext)                 │
//!                            │    ├─ api.rs     (DeskApi, HttpApi)        │
//!                            │    └─ notify.rs  (Notifier, Toast)         │
//!                            └────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module    | Responsibility                                          |
//! |-----------|---------------------------------------------------------|
//! | `filter`  | Pure search/filter predicates and sort keys             |
//! | `forms`   | Local validation producing request payloads             |
//! | `detail`  | Sectioned label/value rendering model for one entity    |
//! | `saga`    | `Reconcile` trait + apply/commit/compensate driver      |
//!
//! ## Typical Flow (drag a card to "Completed")
//!
//! 1. `BoardSession::move_task()` snapshots the task map.
//! 2. The task is spliced out of its column, appended to `completed`, and a
//!    success toast is raised.
//! 3. `PATCH /api/tasks/:clientId` sends the whole map.
//! 4. On failure the map is re-fetched and replaces local state; if that
//!    fails too the snapshot comes back. One error toast either way.

pub mod agent_tasks;
pub mod api;
pub mod board;
pub mod context;
pub mod crud;
pub mod detail;
pub mod distribute;
#[cfg(test)]
pub(crate) mod fake;
pub mod filter;
pub mod forms;
pub mod notify;
pub mod saga;
pub mod views;

pub use agent_tasks::AgentTaskList;
pub use api::{DeskApi, HttpApi};
pub use board::{BoardCounts, BoardSession, TaskBoard};
pub use context::DeskContext;
pub use distribute::DistributionBoard;
pub use notify::{Notifier, Toast, ToastLevel, ToastLog};
pub use saga::{CommitOutcome, Reconcile};
pub use views::{ListView, LoadState, ViewMode};
