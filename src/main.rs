use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use opsdesk::config::{CliOverrides, DeskConfig};
use opsdesk::desk::filter::{AgentSort, ClientSort, TaskSort, UserSort};
use opsdesk::errors::DeskError;
use opsdesk::logging::{self, LogFormat};
use opsdesk_common::{ClientStatus, Priority, SiteType, TaskStatus, UserStatus};

mod cmd;

#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(version, about = "Operator console for the agency operations backend")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// Path to opsdesk.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend root URL. Overrides OPSDESK_API_URL and the config file.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Render listings as cards instead of a table
    #[arg(long, global = true)]
    pub cards: bool,

    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            api_url: self.api_url.clone(),
            cards: self.cards,
            yes: self.yes,
            verbose: self.verbose,
            log_format: self.log_format,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage agents and their task lists
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Manage clients
    Clients {
        #[command(subcommand)]
        command: ClientCommands,
    },
    /// Browse a client's tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// List user roles
    Roles,
    /// List service packages
    Packages,
    /// Work a client's kanban board
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Bulk-assign unassigned tasks to agents
    Distribute {
        #[command(subcommand)]
        command: Option<DistributeCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct SortArgs {
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Subcommand, Clone)]
pub enum AgentCommands {
    List {
        /// Match name or email
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// name, category, assigned, completed
        #[arg(long)]
        sort: Option<AgentSort>,
        #[command(flatten)]
        order: SortArgs,
    },
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        category: String,
    },
    Delete {
        id: String,
    },
    /// List the tasks assigned to an agent
    Tasks {
        agent_id: String,
        /// Match name, category or assignee
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Only tasks past their due date
        #[arg(long)]
        overdue: bool,
        /// name, priority, due_date, status
        #[arg(long)]
        sort: Option<TaskSort>,
        #[command(flatten)]
        order: SortArgs,
    },
    /// Change the status of one of an agent's tasks
    SetStatus {
        agent_id: String,
        task_id: String,
        status: TaskStatus,
    },
    /// Submit a completion report for a task
    Report {
        agent_id: String,
        task_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ClientCommands {
    List {
        /// Match name, company or email
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ClientStatus>,
        /// Package id or name
        #[arg(long)]
        package: Option<String>,
        /// name, company, progress, status
        #[arg(long)]
        sort: Option<ClientSort>,
        #[command(flatten)]
        order: SortArgs,
    },
    Show {
        id: String,
        /// Collapse a section by title (repeatable)
        #[arg(long)]
        collapse: Vec<String>,
    },
    /// Change fields and save the whole client record
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        status: Option<ClientStatus>,
        /// 0-100
        #[arg(long)]
        progress: Option<u8>,
        /// Package id or name
        #[arg(long)]
        package: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<chrono::NaiveDate>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    List {
        #[arg(long)]
        client: String,
        /// Match name, category or assignee
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        overdue: bool,
        /// name, priority, due_date, status
        #[arg(long)]
        sort: Option<TaskSort>,
        #[command(flatten)]
        order: SortArgs,
    },
}

#[derive(Subcommand, Clone)]
pub enum UserCommands {
    List {
        /// Match name or email
        #[arg(short, long)]
        search: Option<String>,
        /// Role id or name
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        status: Option<UserStatus>,
        /// email, name, role, status
        #[arg(long)]
        sort: Option<UserSort>,
        #[command(flatten)]
        order: SortArgs,
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u64,
    },
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Role id or name
        #[arg(long)]
        role: String,
        #[arg(long, default_value = "active")]
        status: UserStatus,
    },
    /// Change fields and save the whole user record
    Edit {
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Role id or name
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        status: Option<UserStatus>,
    },
    Delete {
        id: String,
    },
    /// Account counters by status and role
    Stats,
}

#[derive(Subcommand, Clone)]
pub enum BoardCommands {
    Show {
        client_id: String,
    },
    /// Move a task to another column
    Move {
        client_id: String,
        task_id: String,
        to: TaskStatus,
    },
    /// Set a task's status
    Status {
        client_id: String,
        task_id: String,
        status: TaskStatus,
    },
    /// Mark a task completed
    Complete {
        client_id: String,
        task_id: String,
    },
    Cancel {
        client_id: String,
        task_id: String,
    },
    /// Assign a team member whose category matches the task
    Assign {
        client_id: String,
        task_id: String,
        /// Prompted for when omitted
        member_id: Option<String>,
    },
    /// Create a task in the unassigned column
    New {
        client_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<chrono::NaiveDate>,
        #[arg(long)]
        site_type: Option<SiteType>,
    },
}

#[derive(Subcommand, Clone)]
pub enum DistributeCommands {
    /// Show the unassigned pool grouped by site type
    List,
    /// Assign one agent to several tasks and submit the batch
    Assign {
        /// Task ids in selection order; the first decides eligible agents
        #[arg(long = "task", required = true)]
        tasks: Vec<String>,
        /// Prompted for when omitted
        #[arg(long)]
        agent: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default opsdesk.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
        /// Write to the user config directory instead of ./.opsdesk
        #[arg(long)]
        user: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Desk errors were already shown as a toast.
            if err.downcast_ref::<DeskError>().is_none() {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = DeskConfig::load(&cli.overrides())?;
    if !config.toml.display.color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    let _log_guard = logging::init(&config.log_filter, config.log_format, config.log_dir())?;
    tracing::debug!(api_url = %config.api_url, config = ?config.path, "configuration loaded");

    if let Commands::Config { command } = &cli.command {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        return cmd::cmd_config(&config, &cwd, command.clone());
    }

    let session = cmd::Session::connect(config)?;
    match cli.command {
        Commands::Agents { command } => cmd::cmd_agents(&session, command).await?,
        Commands::Clients { command } => cmd::cmd_clients(&session, command).await?,
        Commands::Tasks { command } => cmd::cmd_tasks(&session, command).await?,
        Commands::Users { command } => cmd::cmd_users(&session, command).await?,
        Commands::Roles => cmd::cmd_roles(&session).await?,
        Commands::Packages => cmd::cmd_packages(&session).await?,
        Commands::Board { command } => cmd::cmd_board(&session, command).await?,
        Commands::Distribute { command } => cmd::cmd_distribute(&session, command).await?,
        Commands::Config { .. } => {}
    }
    Ok(())
}
