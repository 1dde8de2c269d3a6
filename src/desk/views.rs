//! Fetch-once list views with client-side filter, sort and view mode.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opsdesk_common::{Agent, Client, Page, Task, User};

use super::api::DeskApi;
use super::context::DeskContext;
use super::filter::{
    self, AgentFilter, AgentSort, ClientFilter, ClientSort, Filter, SortKey, SortOrder, TaskFilter,
    TaskSort, UserFilter, UserSort,
};
use crate::errors::DeskError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Cards => "cards",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Table => Self::Cards,
            Self::Cards => Self::Table,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "cards" | "card" => Ok(Self::Cards),
            _ => Err(format!("Invalid view '{}'. Valid values: table, cards", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(Vec<T>),
    /// The fetch failed; the view waits for a manual retry.
    Failed(String),
}

/// Window requested from a paged endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

type Fetcher<T> = Box<
    dyn Fn(Arc<dyn DeskApi>, PageRequest) -> BoxFuture<'static, Result<Page<T>, DeskError>>
        + Send
        + Sync,
>;

/// A list screen: one fetched collection and the operator's view settings.
pub struct ListView<T, F, K> {
    ctx: DeskContext,
    label: &'static str,
    fetch: Fetcher<T>,
    state: LoadState<T>,
    filter: F,
    sort: Option<(K, SortOrder)>,
    mode: ViewMode,
    page: PageRequest,
    total: u64,
}

impl<T, F, K> ListView<T, F, K>
where
    F: Filter<T> + Default,
    K: SortKey<T>,
{
    pub fn new(ctx: DeskContext, label: &'static str, fetch: Fetcher<T>) -> Self {
        Self {
            ctx,
            label,
            fetch,
            state: LoadState::Loading,
            filter: F::default(),
            sort: None,
            mode: ViewMode::default(),
            page: PageRequest {
                offset: 0,
                limit: 0,
            },
            total: 0,
        }
    }

    pub fn with_page_size(mut self, limit: u64) -> Self {
        self.page.limit = limit;
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Fetch the collection. On failure the view moves to
    /// [`LoadState::Failed`] and one error toast is raised.
    pub async fn load(&mut self) -> Result<(), DeskError> {
        self.state = LoadState::Loading;
        let result = (self.fetch)(self.ctx.api.clone(), self.page).await;
        match result {
            Ok(page) => {
                debug!(
                    view = self.label,
                    count = page.items.len(),
                    total = page.total,
                    "list loaded"
                );
                self.total = page.total;
                self.state = LoadState::Ready(page.items);
                Ok(())
            }
            Err(err) => {
                self.ctx
                    .report_failure(&format!("load {}", self.label), &err);
                self.state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn retry(&mut self) -> Result<(), DeskError> {
        self.load().await
    }

    /// Load, and after every failure ask `again` whether to retry. Each
    /// failed attempt raises its own error toast.
    pub async fn load_or_retry(
        &mut self,
        mut again: impl FnMut(&DeskError) -> bool,
    ) -> Result<(), DeskError> {
        let mut result = self.load().await;
        while let Err(err) = result {
            if !again(&err) {
                return Err(err);
            }
            debug!(view = self.label, "retrying after failed load");
            result = self.retry().await;
        }
        Ok(())
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, LoadState::Failed(_))
    }

    /// Everything fetched, unfiltered. Empty unless loaded.
    pub fn items(&self) -> &[T] {
        match &self.state {
            LoadState::Ready(items) => items,
            _ => &[],
        }
    }

    /// The fetched items passing every active filter, then sorted.
    pub fn visible(&self) -> Vec<&T> {
        let mut view = filter::apply(self.items(), &self.filter);
        if let Some((key, order)) = self.sort {
            filter::sort_view(&mut view, key, order);
        }
        view
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, key: K, order: SortOrder) {
        self.sort = Some((key, order));
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn offset(&self) -> u64 {
        self.page.offset
    }

    pub fn is_paged(&self) -> bool {
        self.page.limit > 0
    }

    pub fn has_next_page(&self) -> bool {
        self.is_paged() && self.page.offset.saturating_add(self.items().len() as u64) < self.total
    }

    /// Position the next load at `offset` without fetching.
    pub fn seek(&mut self, offset: u64) {
        self.page.offset = offset;
    }

    /// Jump to the page starting at `offset` and load it.
    pub async fn goto(&mut self, offset: u64) -> Result<(), DeskError> {
        self.page.offset = offset;
        self.load().await
    }

    pub async fn next_page(&mut self) -> Result<bool, DeskError> {
        if !self.has_next_page() {
            return Ok(false);
        }
        self.goto(self.page.offset.saturating_add(self.page.limit)).await?;
        Ok(true)
    }

    pub async fn prev_page(&mut self) -> Result<bool, DeskError> {
        if !self.is_paged() || self.page.offset == 0 {
            return Ok(false);
        }
        self.goto(self.page.offset.saturating_sub(self.page.limit)).await?;
        Ok(true)
    }
}

pub type AgentList = ListView<Agent, AgentFilter, AgentSort>;
pub type ClientList = ListView<Client, ClientFilter, ClientSort>;
pub type TaskList = ListView<Task, TaskFilter, TaskSort>;
pub type UserList = ListView<User, UserFilter, UserSort>;

pub fn agent_list(ctx: DeskContext) -> AgentList {
    ListView::new(
        ctx,
        "agents",
        Box::new(|api: Arc<dyn DeskApi>, _: PageRequest| {
            async move { api.list_agents().await.map(Page::whole) }.boxed()
        }),
    )
}

pub fn client_list(ctx: DeskContext) -> ClientList {
    ListView::new(
        ctx,
        "clients",
        Box::new(|api: Arc<dyn DeskApi>, _: PageRequest| {
            async move { api.list_clients().await.map(Page::whole) }.boxed()
        }),
    )
}

pub fn client_task_list(ctx: DeskContext, client_id: &str) -> TaskList {
    let client_id = client_id.to_string();
    ListView::new(
        ctx,
        "tasks",
        Box::new(move |api: Arc<dyn DeskApi>, _: PageRequest| {
            let client_id = client_id.clone();
            async move { api.list_client_tasks(&client_id).await.map(Page::whole) }.boxed()
        }),
    )
}

/// Users are paged by the backend.
pub fn user_list(ctx: DeskContext, page_size: u64) -> UserList {
    ListView::new(
        ctx,
        "users",
        Box::new(|api: Arc<dyn DeskApi>, page: PageRequest| {
            async move { api.list_users(page.offset, page.limit).await }.boxed()
        }),
    )
    .with_page_size(page_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::fake::{FakeApi, sample_agent, sample_user};
    use crate::desk::notify::{ToastLevel, ToastLog};

    fn ctx(api: &Arc<FakeApi>, log: &Arc<ToastLog>) -> DeskContext {
        DeskContext::new(api.clone(), log.clone())
    }

    #[tokio::test]
    async fn test_failed_load_waits_for_retry() {
        let api = Arc::new(FakeApi::new());
        api.put_agents(vec![sample_agent("a1", "Casey", "content")]);
        api.fail_reads(true);
        let log = Arc::new(ToastLog::new());
        let mut view = agent_list(ctx(&api, &log));

        assert!(view.load().await.is_err());
        assert!(view.is_failed());
        assert!(view.items().is_empty());
        assert_eq!(log.count(ToastLevel::Error), 1);

        api.fail_reads(false);
        view.retry().await.unwrap();
        assert_eq!(view.items().len(), 1);
        assert_eq!(log.count(ToastLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_load_or_retry_until_backend_recovers() {
        let api = Arc::new(FakeApi::new());
        api.put_agents(vec![sample_agent("a1", "Casey", "content")]);
        api.fail_reads(true);
        let log = Arc::new(ToastLog::new());
        let mut view = agent_list(ctx(&api, &log));

        let mut asked = 0;
        view.load_or_retry(|_| {
            asked += 1;
            if asked == 2 {
                api.fail_reads(false);
            }
            true
        })
        .await
        .unwrap();

        assert_eq!(asked, 2);
        assert_eq!(view.items().len(), 1);
        assert_eq!(log.count(ToastLevel::Error), 2);
    }

    #[tokio::test]
    async fn test_load_or_retry_declined_keeps_failed_state() {
        let api = Arc::new(FakeApi::new());
        api.fail_reads(true);
        let log = Arc::new(ToastLog::new());
        let mut view = client_list(ctx(&api, &log));

        let err = view.load_or_retry(|_| false).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(view.is_failed());
        assert_eq!(log.count(ToastLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_seek_then_load_reads_that_page() {
        let api = Arc::new(FakeApi::new());
        api.put_users((1..=5).map(|i| sample_user(&format!("u{}", i))).collect());
        let log = Arc::new(ToastLog::new());
        let mut view = user_list(ctx(&api, &log), 2);

        view.seek(2);
        view.load().await.unwrap();
        assert_eq!(view.offset(), 2);
        assert_eq!(view.items()[0].id, "u3");
    }

    #[tokio::test]
    async fn test_visible_applies_filter_and_sort() {
        let api = Arc::new(FakeApi::new());
        api.put_agents(vec![
            sample_agent("a1", "Zed", "content"),
            sample_agent("a2", "Amy", "seo"),
            sample_agent("a3", "Bo", "content"),
        ]);
        let log = Arc::new(ToastLog::new());
        let mut view = agent_list(ctx(&api, &log));
        view.load().await.unwrap();

        view.filter_mut().category = Some("content".into());
        view.set_sort(AgentSort::Name, SortOrder::Asc);
        let names: Vec<_> = view.visible().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Zed"]);
        assert_eq!(view.items().len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_mode() {
        let api = Arc::new(FakeApi::new());
        let log = Arc::new(ToastLog::new());
        let mut view = client_list(ctx(&api, &log));
        assert_eq!(view.mode(), ViewMode::Table);
        assert_eq!(view.toggle_mode(), ViewMode::Cards);
        assert_eq!(view.toggle_mode(), ViewMode::Table);
    }

    #[tokio::test]
    async fn test_user_paging() {
        let api = Arc::new(FakeApi::new());
        api.put_users((1..=5).map(|i| sample_user(&format!("u{}", i))).collect());
        let log = Arc::new(ToastLog::new());
        let mut view = user_list(ctx(&api, &log), 2);

        view.load().await.unwrap();
        assert_eq!(view.total(), 5);
        assert_eq!(view.items().len(), 2);
        assert!(view.next_page().await.unwrap());
        assert!(view.next_page().await.unwrap());
        assert_eq!(view.offset(), 4);
        assert_eq!(view.items()[0].id, "u5");
        assert!(!view.next_page().await.unwrap());
        assert!(view.prev_page().await.unwrap());
        assert_eq!(view.offset(), 2);
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("Cards".parse::<ViewMode>().unwrap(), ViewMode::Cards);
        assert!("grid".parse::<ViewMode>().is_err());
    }
}
