use std::path::PathBuf;

use brain_domain::{
    finance::{CategoryKind, MonthRange},
    goal::GoalTerm,
    task::{TaskPriority, TaskStatus},
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

/// `brain` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "brain",
    about = "Track habits, tasks, money and goals from the terminal",
    version
)]
pub struct Cli {
    /// JSON data file. Falls back to `BRAIN_DATA_PATH` when omitted.
    #[arg(long = "data", value_name = "path", global = true)]
    pub data_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Today's habits, due tasks, this month's balance and top goals.
    Dashboard,
    /// List habits with today's state, streaks and recent completion.
    Habits,
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },
    /// Tasks grouped by today, this week and this month.
    Tasks {
        /// Show one column per day of the current week instead.
        #[arg(long)]
        board: bool,
    },
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Transactions and totals for one month.
    Finances {
        #[arg(long, value_name = "YYYY-MM", value_parser = parse_month)]
        month: Option<MonthRange>,
    },
    Finance {
        #[command(subcommand)]
        action: FinanceAction,
    },
    /// Goals of one term.
    Goals {
        #[arg(long, default_value_t = GoalTerm::Short)]
        term: GoalTerm,
    },
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum HabitAction {
    Add {
        name: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Repeat for several labels. Defaults to `Daily`.
        #[arg(long = "frequency", value_name = "label")]
        frequency: Vec<String>,
    },
    /// Flip today's completion for a habit.
    Toggle {
        id: Uuid,
        /// Day to toggle instead of today.
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskAction {
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "id")]
        project: Option<Uuid>,
        #[arg(long, default_value_t = TaskPriority::Normal)]
        priority: TaskPriority,
        /// RFC 3339 timestamp or a plain date (local midnight). Defaults to now.
        #[arg(long, value_name = "when", value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
    },
    Status {
        id: Uuid,
        status: TaskStatus,
    },
    /// Mark done, or reopen a done task.
    Toggle { id: Uuid },
}

#[derive(Debug, Clone, Subcommand)]
pub enum FinanceAction {
    Add {
        amount: f64,
        #[arg(long)]
        kind: CategoryKind,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum GoalAction {
    /// Add a goal under `--term`.
    Add {
        title: String,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value_t = GoalTerm::Short)]
        term: GoalTerm,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
        deadline: Option<NaiveDate>,
    },
    /// Set the current value of a goal.
    Progress { id: Uuid, value: f64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProjectAction {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
}

fn parse_month(value: &str) -> Result<MonthRange, String> {
    MonthRange::parse(value).ok_or_else(|| format!("expected YYYY-MM, got `{value}`"))
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_due(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(instant.with_timezone(&Utc));
    }
    let day = parse_day(value)?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or("invalid time")?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("`{value}` does not exist in the local time zone"))
}
