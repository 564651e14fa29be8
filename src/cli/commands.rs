use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::filter::Filter;
use crate::model::task::TaskId;

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdeck v", env!("CARGO_PKG_VERSION"), " - tasks, views, nothing on disk"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./taskdeck.toml if present)
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Evaluate overdue status as of this date instead of the local date
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive shell (the default)
    Shell,
    /// Run shell commands from a file, one per line
    Run(RunArgs),
    /// List the starting tasks
    List(ListArgs),
    /// Show counts for the starting tasks
    Stats,
}

#[derive(Args)]
pub struct RunArgs {
    /// Script path, or `-` for stdin
    pub script: PathBuf,
    /// Keep going after a failing line
    #[arg(long)]
    pub keep_going: bool,
}

// ---------------------------------------------------------------------------
// Shell commands
// ---------------------------------------------------------------------------

/// One line typed into the shell
#[derive(Parser)]
#[command(name = "td", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// Add a task at the end of the list
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Delete a task
    #[command(alias = "delete")]
    Rm(IdArgs),
    /// Flip a task between pending and completed
    Toggle(IdArgs),
    /// Set the active filter (all, completed, pending, overdue)
    Filter(FilterArgs),
    /// List tasks through a filter and optional search
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show task details
    Show(IdArgs),
    /// Search task titles
    Search(SearchArgs),
    /// Show task counts
    Stats,
    /// Counts plus the searched task list, numbered for `mv`
    Dash(DashArgs),
    /// Drag a task within the dashboard list (1-based positions)
    Mv(MvArgs),
    /// Set the full task order
    Order(OrderArgs),
    /// Print the store version
    Version,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
    /// Description
    #[arg(long)]
    pub desc: Option<String>,
    /// Due date (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due: Option<NaiveDate>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: TaskId,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long)]
    pub desc: Option<String>,
    /// New due date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due: Option<NaiveDate>,
    /// Mark completed
    #[arg(long, conflicts_with = "pending")]
    pub done: bool,
    /// Mark pending
    #[arg(long)]
    pub pending: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID (T-001 or 1)
    pub id: TaskId,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Filter name
    pub name: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter to apply (default: the active filter)
    #[arg(long)]
    pub filter: Option<Filter>,
    /// Only titles containing this text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in titles
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct DashArgs {
    /// Search text (default: none)
    #[arg(num_args = 0..)]
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Current position in the dashboard list
    pub from: usize,
    /// New position
    pub to: usize,
    /// Search text the list is narrowed by
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct OrderArgs {
    /// Every task ID, in the new order
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<TaskId>,
}
