//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `agents`        | `Agents`                                           |
//! | `clients`       | `Clients`                                          |
//! | `tasks`         | `Tasks`                                            |
//! | `users`         | `Users`, `Roles`, `Packages`                       |
//! | `board`         | `Board`                                            |
//! | `distribute`    | `Distribute`                                       |
//! | `config`        | `Config`                                           |

pub mod agents;
pub mod board;
pub mod clients;
pub mod config;
pub mod distribute;
pub mod tasks;
pub mod users;

pub use agents::cmd_agents;
pub use board::cmd_board;
pub use clients::cmd_clients;
pub use config::cmd_config;
pub use distribute::cmd_distribute;
pub use tasks::cmd_tasks;
pub use users::{cmd_packages, cmd_roles, cmd_users};

use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use console::Term;
use dialoguer::{Confirm, Select};
use dialoguer::theme::ColorfulTheme;
use indicatif::MultiProgress;

use opsdesk::config::DeskConfig;
use opsdesk::desk::filter::{Filter, SortKey, SortOrder};
use opsdesk::desk::views::ListView;
use opsdesk::desk::{DeskContext, HttpApi};
use opsdesk::errors::DeskError;
use opsdesk::ui::{ConsoleNotifier, terminal_width, with_spinner};

/// Everything a backend-facing command needs.
pub struct Session {
    pub config: DeskConfig,
    pub ctx: DeskContext,
    pub width: usize,
    multi: MultiProgress,
}

impl Session {
    pub fn connect(config: DeskConfig) -> Result<Self> {
        // Not shown as a toast, so keep it out of the DeskError path.
        let api = HttpApi::new(&config.api_url, config.timeout()).map_err(|e| anyhow!("{}", e))?;
        let multi = MultiProgress::new();
        let notifier = ConsoleNotifier::new(multi.clone());
        let ctx = DeskContext::new(Arc::new(api), Arc::new(notifier));
        Ok(Self {
            config,
            ctx,
            width: terminal_width(),
            multi,
        })
    }

    /// Await `fut` behind a spinner. Verbose runs skip it so log lines
    /// are not interleaved with redraws.
    pub async fn spin<F: Future>(&self, message: &str, fut: F) -> F::Output {
        with_spinner(&self.multi, message, !self.config.verbose, fut).await
    }

    /// Load a list view behind a spinner. A failed fetch offers a manual
    /// retry when someone is at the terminal.
    pub async fn load_list<T, F, K>(
        &self,
        message: &str,
        view: &mut ListView<T, F, K>,
    ) -> Result<(), DeskError>
    where
        F: Filter<T> + Default,
        K: SortKey<T>,
    {
        let interactive = !self.config.yes && Term::stderr().is_term();
        self.spin(
            message,
            view.load_or_retry(|_| interactive && self.ask_retry()),
        )
        .await
    }

    fn ask_retry(&self) -> bool {
        self.multi.suspend(|| {
            Confirm::new()
                .with_prompt("Retry?")
                .default(true)
                .interact()
                .unwrap_or(false)
        })
    }

    /// Ask before a destructive action. `--yes` answers for the user.
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.config.yes {
            return true;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    /// Pick one of `options`, returning its index.
    pub fn select(&self, prompt: &str, options: &[String]) -> Result<usize> {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact()?;
        Ok(choice)
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn sort_order(desc: bool) -> SortOrder {
    if desc { SortOrder::Desc } else { SortOrder::Asc }
}
