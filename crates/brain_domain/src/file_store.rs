use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    error::StoreResult,
    finance::{Category, CategoryKind, LedgerEntry, MonthRange, NewTransaction},
    goal::{Goal, GoalTerm, NewGoal},
    habit::{Habit, HabitLog, NewHabit, NewHabitLog},
    store::{BrainStore, LogFilter, TaskFilter, Tables},
    task::{NewProject, NewTask, Project, Task, TaskStatus},
};

/// Store persisted as a single JSON document, rewritten after every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FileStore {
    /// Opens `path`, treating a missing file as an empty store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Tables::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Tables::default()
        };
        tracing::info!(
            path = %path.display(),
            habits = tables.habits.len(),
            tasks = tables.tasks.len(),
            transactions = tables.transactions.len(),
            goals = tables.goals.len(),
            "opened file store"
        );
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` and writes the result to disk. The in-memory tables
    /// are only replaced once the write succeeded.
    fn mutate<T>(&self, change: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        let value = change(&mut staged)?;
        self.persist(&staged)?;
        *tables = staged;
        Ok(value)
    }

    fn persist(&self, tables: &Tables) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_string_pretty(tables)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        tracing::debug!(path = %self.path.display(), "persisted store");
        Ok(())
    }
}

impl BrainStore for FileStore {
    fn list_habits(&self, owner: Uuid) -> StoreResult<Vec<Habit>> {
        Ok(self.tables.read().list_habits(owner))
    }

    fn insert_habit(&self, owner: Uuid, habit: NewHabit) -> StoreResult<Habit> {
        self.mutate(|tables| Ok(tables.insert_habit(owner, habit)))
    }

    fn list_habit_logs(&self, owner: Uuid, filter: &LogFilter) -> StoreResult<Vec<HabitLog>> {
        Ok(self.tables.read().list_habit_logs(owner, filter))
    }

    fn insert_habit_log(&self, owner: Uuid, log: NewHabitLog) -> StoreResult<HabitLog> {
        self.mutate(|tables| tables.insert_habit_log(owner, log))
    }

    fn set_log_completed(
        &self,
        owner: Uuid,
        log_id: Uuid,
        completed: bool,
    ) -> StoreResult<HabitLog> {
        self.mutate(|tables| tables.set_log_completed(owner, log_id, completed))
    }

    fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>> {
        Ok(self.tables.read().list_projects(owner))
    }

    fn insert_project(&self, owner: Uuid, project: NewProject) -> StoreResult<Project> {
        self.mutate(|tables| Ok(tables.insert_project(owner, project)))
    }

    fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(self.tables.read().list_tasks(owner, filter))
    }

    fn insert_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        self.mutate(|tables| tables.insert_task(owner, task))
    }

    fn update_task_status(
        &self,
        owner: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Task> {
        self.mutate(|tables| tables.update_task_status(owner, task_id, status))
    }

    fn find_category(
        &self,
        owner: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().find_category(owner, name, kind))
    }

    fn insert_category(
        &self,
        owner: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> StoreResult<Category> {
        self.mutate(|tables| Ok(tables.insert_category(owner, name, kind)))
    }

    fn list_ledger(&self, owner: Uuid, month: &MonthRange) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.tables.read().list_ledger(owner, month))
    }

    fn insert_transaction(
        &self,
        owner: Uuid,
        category_id: Option<Uuid>,
        transaction: &NewTransaction,
    ) -> StoreResult<LedgerEntry> {
        self.mutate(|tables| tables.insert_transaction(owner, category_id, transaction))
    }

    fn list_goals(&self, owner: Uuid, term: Option<GoalTerm>) -> StoreResult<Vec<Goal>> {
        Ok(self.tables.read().list_goals(owner, term))
    }

    fn insert_goal(&self, owner: Uuid, goal: NewGoal) -> StoreResult<Goal> {
        self.mutate(|tables| Ok(tables.insert_goal(owner, goal)))
    }

    fn update_goal_progress(&self, owner: Uuid, goal_id: Uuid, value: f64) -> StoreResult<Goal> {
        self.mutate(|tables| tables.update_goal_progress(owner, goal_id, value))
    }
}
