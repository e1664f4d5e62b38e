use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use brain_domain::{
    dashboard::DEFAULT_TASK_PREVIEW,
    file_store::FileStore,
    finance::{MonthRange, NewTransaction, UNCATEGORIZED},
    goal::NewGoal,
    habit::{NewHabit, COMPLETION_WINDOW_DAYS},
    task::{NewProject, NewTask},
    BrainService,
};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    cli::{Cli, Command, FinanceAction, GoalAction, HabitAction, ProjectAction, TaskAction},
    render::{self, HabitLine},
};

pub const DEFAULT_DATA_PATH: &str = "second-brain.json";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub user_id: Uuid,
    pub history_days: usize,
    pub task_preview: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Builds a config from any key lookup. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("BRAIN_DATA_PATH") {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path.trim());
            }
        }
        if let Some(user) = lookup("BRAIN_USER_ID") {
            match Uuid::parse_str(user.trim()) {
                Ok(id) => config.user_id = id,
                Err(err) => warn!(%err, value = %user, "ignoring BRAIN_USER_ID"),
            }
        }
        if let Some(days) = lookup("BRAIN_HISTORY_DAYS") {
            match days.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.history_days = value,
                _ => warn!(value = %days, "ignoring BRAIN_HISTORY_DAYS"),
            }
        }
        if let Some(preview) = lookup("BRAIN_TASK_PREVIEW") {
            match preview.trim().parse::<usize>() {
                Ok(value) => config.task_preview = value,
                Err(err) => warn!(%err, value = %preview, "ignoring BRAIN_TASK_PREVIEW"),
            }
        }
        config
    }

    pub fn with_data_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data_path = path;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            user_id: Uuid::nil(),
            history_days: COMPLETION_WINDOW_DAYS,
            task_preview: DEFAULT_TASK_PREVIEW,
        }
    }
}

pub fn run(config: AppConfig, cli: Cli) -> Result<()> {
    info!(path = %config.data_path.display(), "opening data file");
    let store = FileStore::open(&config.data_path)
        .with_context(|| format!("failed to open {}", config.data_path.display()))?;
    let service = BrainService::builder()
        .with_store(Arc::new(store))
        .owner(config.user_id)
        .build()
        .context("failed to initialize service")?;
    let output = execute(&service, &config, cli.command, &Local::now())?;
    print!("{output}");
    Ok(())
}

/// Runs one command against `service` and returns the text to print.
pub fn execute<Tz>(
    service: &BrainService,
    config: &AppConfig,
    command: Command,
    now: &DateTime<Tz>,
) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let today = now.date_naive();
    let output = match command {
        Command::Dashboard => {
            let dashboard = service.dashboard(now, config.task_preview)?;
            render::dashboard(&dashboard)
        }
        Command::Habits => {
            let tracker = service.habits()?;
            let lines: Vec<HabitLine<'_>> = tracker
                .habits()
                .iter()
                .map(|habit| HabitLine {
                    habit,
                    done_today: tracker.is_completed(habit.id, today),
                    streak: tracker.streak(habit.id, today),
                })
                .collect();
            let series = tracker.completion_series_for_window(today, config.history_days);
            render::habits(&lines, &series)
        }
        Command::Habit { action } => habit(service, action, today)?,
        Command::Tasks { board } => {
            let tasks = service.tasks()?;
            if board {
                render::task_board(&tasks.board_view(now))
            } else {
                render::task_list(&tasks.list_view(now))
            }
        }
        Command::Task { action } => task(service, action, now)?,
        Command::Finances { month } => {
            let month = month.unwrap_or_else(|| MonthRange::containing(today));
            let ledger = service.finances(month)?;
            render::ledger(ledger.month(), ledger.entries(), &ledger.summary())
        }
        Command::Finance {
            action:
                FinanceAction::Add {
                    amount,
                    kind,
                    category,
                    note,
                    date,
                },
        } => {
            let date = date.unwrap_or(today);
            let mut transaction = NewTransaction::new(amount, kind, date)?
                .in_category(category.unwrap_or_else(|| UNCATEGORIZED.to_string()));
            if let Some(note) = note {
                transaction = transaction.with_note(note);
            }
            let mut ledger = service.finances(MonthRange::containing(date))?;
            let entry = ledger.add_transaction(transaction)?;
            format!(
                "Recorded {:+.2} in {} on {}\n",
                entry.signed_amount(),
                entry.category_name(),
                entry.transaction.date
            )
        }
        Command::Goals { term } => {
            let mut tracker = service.goals()?;
            tracker.select_term(term);
            render::goals(term, &tracker.visible())
        }
        Command::Goal { action } => goal(service, action)?,
        Command::Project {
            action: ProjectAction::Add { name, description },
        } => {
            let mut project = NewProject::new(name)?;
            if let Some(description) = description {
                project = project.with_description(description);
            }
            let project = service.add_project(project)?;
            format!("Added project {} {}\n", project.name, project.id)
        }
    };
    Ok(output)
}

fn habit(service: &BrainService, action: HabitAction, today: NaiveDate) -> Result<String> {
    let mut tracker = service.habits()?;
    match action {
        HabitAction::Add {
            name,
            icon,
            color,
            frequency,
        } => {
            let mut habit = NewHabit::new(name)?;
            if let Some(icon) = icon {
                habit = habit.with_icon(icon);
            }
            if let Some(color) = color {
                habit = habit.with_color(color);
            }
            if !frequency.is_empty() {
                habit = habit.with_frequency(frequency);
            }
            let habit = tracker.add_habit(habit)?;
            Ok(format!("Added habit {} {}\n", habit.name, habit.id))
        }
        HabitAction::Toggle { id, date } => {
            let day = date.unwrap_or(today);
            let log = tracker.toggle_today(id, day)?;
            let state = if log.completed { "done" } else { "not done" };
            Ok(format!(
                "{state} on {day}, streak {}\n",
                tracker.streak(id, today)
            ))
        }
    }
}

fn task<Tz>(service: &BrainService, action: TaskAction, now: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut board = service.tasks()?;
    let tz = now.timezone();
    let task = match action {
        TaskAction::Add {
            title,
            description,
            project,
            priority,
            due,
        } => {
            let mut task = NewTask::new(title)?
                .with_priority(priority)
                .due_at(due.unwrap_or_else(|| now.with_timezone(&Utc)));
            if let Some(description) = description {
                task = task.with_description(description);
            }
            if let Some(project) = project {
                task = task.in_project(project);
            }
            board.add_task(task)?
        }
        TaskAction::Status { id, status } => board.update_status(id, status)?,
        TaskAction::Toggle { id } => board.toggle_done(id)?,
    };
    Ok(render::task_saved(&task, &tz))
}

fn goal(service: &BrainService, action: GoalAction) -> Result<String> {
    let mut tracker = service.goals()?;
    match action {
        GoalAction::Add {
            title,
            target,
            term,
            unit,
            description,
            deadline,
        } => {
            tracker.select_term(term);
            let mut goal = NewGoal::new(title, term, target)?;
            if let Some(unit) = unit {
                goal = goal.with_unit(unit);
            }
            if let Some(description) = description {
                goal = goal.with_description(description);
            }
            if let Some(deadline) = deadline {
                goal = goal.with_deadline(deadline);
            }
            let goal = tracker.add_goal(goal)?;
            Ok(format!("Added {} term goal {} {}\n", goal.term, goal.title, goal.id))
        }
        GoalAction::Progress { id, value } => {
            let goal = tracker.update_progress(id, value)?;
            Ok(format!(
                "{}: {}/{} {} ({}%)\n",
                goal.title,
                goal.current_value,
                goal.target_value,
                goal.unit,
                goal.rounded_progress()
            ))
        }
    }
}
