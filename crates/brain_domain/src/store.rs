//! Data-access port used by every view-model, plus the in-memory adapter.
//!
//! Reads are scoped to an owner and return plain rows. Writes touch a single
//! row and return it as persisted. Rows owned by another user behave as if
//! they did not exist.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    finance::{Category, CategoryKind, LedgerEntry, MonthRange, NewTransaction, Transaction},
    goal::{Goal, GoalTerm, NewGoal},
    habit::{Habit, HabitLog, NewHabit, NewHabitLog},
    task::{NewProject, NewTask, Project, Task, TaskStatus},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub habit_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub completed_only: bool,
}

impl LogFilter {
    pub fn on(day: NaiveDate) -> Self {
        Self {
            from: Some(day),
            to: Some(day),
            ..Self::default()
        }
    }

    pub fn since(day: NaiveDate) -> Self {
        Self {
            from: Some(day),
            ..Self::default()
        }
    }

    pub fn completed_only(mut self) -> Self {
        self.completed_only = true;
        self
    }

    fn matches(&self, log: &HabitLog) -> bool {
        self.habit_id.map_or(true, |id| id == log.habit_id)
            && self.from.map_or(true, |from| log.date >= from)
            && self.to.map_or(true, |to| log.date <= to)
            && (!self.completed_only || log.completed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Open tasks whose due date is at or before `now`.
    pub fn due_by(now: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Todo),
            due_before: Some(now),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| status == task.status)
            && self
                .due_before
                .map_or(true, |cutoff| task.due_date.is_some_and(|due| due <= cutoff))
    }
}

/// The data-access capability handed to view-models.
pub trait BrainStore: Send + Sync {
    /// Habits ordered by creation time.
    fn list_habits(&self, owner: Uuid) -> StoreResult<Vec<Habit>>;
    fn insert_habit(&self, owner: Uuid, habit: NewHabit) -> StoreResult<Habit>;
    fn list_habit_logs(&self, owner: Uuid, filter: &LogFilter) -> StoreResult<Vec<HabitLog>>;
    fn insert_habit_log(&self, owner: Uuid, log: NewHabitLog) -> StoreResult<HabitLog>;
    fn set_log_completed(&self, owner: Uuid, log_id: Uuid, completed: bool)
        -> StoreResult<HabitLog>;

    fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>>;
    fn insert_project(&self, owner: Uuid, project: NewProject) -> StoreResult<Project>;
    /// Tasks ordered by due date, undated tasks last.
    fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    fn insert_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task>;
    fn update_task_status(&self, owner: Uuid, task_id: Uuid, status: TaskStatus)
        -> StoreResult<Task>;

    fn find_category(
        &self,
        owner: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> StoreResult<Option<Category>>;
    fn insert_category(&self, owner: Uuid, name: &str, kind: CategoryKind)
        -> StoreResult<Category>;
    /// Transactions dated inside `month`, newest first, joined with their category.
    fn list_ledger(&self, owner: Uuid, month: &MonthRange) -> StoreResult<Vec<LedgerEntry>>;
    fn insert_transaction(
        &self,
        owner: Uuid,
        category_id: Option<Uuid>,
        transaction: &NewTransaction,
    ) -> StoreResult<LedgerEntry>;

    /// Goals ordered by creation time.
    fn list_goals(&self, owner: Uuid, term: Option<GoalTerm>) -> StoreResult<Vec<Goal>>;
    fn insert_goal(&self, owner: Uuid, goal: NewGoal) -> StoreResult<Goal>;
    fn update_goal_progress(&self, owner: Uuid, goal_id: Uuid, value: f64) -> StoreResult<Goal>;
}

/// Every table of the store, as kept in memory and serialized to disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tables {
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub habit_logs: Vec<HabitLog>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<Goal>,
}

impl Tables {
    pub fn list_habits(&self, owner: Uuid) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self
            .habits
            .iter()
            .filter(|habit| habit.user_id == owner)
            .cloned()
            .collect();
        habits.sort_by_key(|habit| habit.created_at);
        habits
    }

    pub fn insert_habit(&mut self, owner: Uuid, habit: NewHabit) -> Habit {
        let row = Habit {
            id: Uuid::new_v4(),
            user_id: owner,
            name: habit.name,
            icon: habit.icon,
            color: habit.color,
            frequency: habit.frequency,
            created_at: Utc::now(),
        };
        self.habits.push(row.clone());
        row
    }

    pub fn list_habit_logs(&self, owner: Uuid, filter: &LogFilter) -> Vec<HabitLog> {
        self.habit_logs
            .iter()
            .filter(|log| self.owns_habit(owner, log.habit_id) && filter.matches(log))
            .cloned()
            .collect()
    }

    pub fn insert_habit_log(&mut self, owner: Uuid, log: NewHabitLog) -> StoreResult<HabitLog> {
        if !self.owns_habit(owner, log.habit_id) {
            return Err(StoreError::not_found("habit", log.habit_id));
        }
        let row = HabitLog {
            id: Uuid::new_v4(),
            habit_id: log.habit_id,
            date: log.date,
            completed: log.completed,
            note: log.note,
            created_at: Utc::now(),
        };
        self.habit_logs.push(row.clone());
        Ok(row)
    }

    pub fn set_log_completed(
        &mut self,
        owner: Uuid,
        log_id: Uuid,
        completed: bool,
    ) -> StoreResult<HabitLog> {
        let habit_ids: Vec<Uuid> = self
            .habits
            .iter()
            .filter(|habit| habit.user_id == owner)
            .map(|habit| habit.id)
            .collect();
        let log = self
            .habit_logs
            .iter_mut()
            .find(|log| log.id == log_id && habit_ids.contains(&log.habit_id))
            .ok_or_else(|| StoreError::not_found("habit log", log_id))?;
        log.completed = completed;
        Ok(log.clone())
    }

    pub fn list_projects(&self, owner: Uuid) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|project| project.user_id == owner)
            .cloned()
            .collect();
        projects.sort_by_key(|project| project.created_at);
        projects
    }

    pub fn insert_project(&mut self, owner: Uuid, project: NewProject) -> Project {
        let row = Project {
            id: Uuid::new_v4(),
            user_id: owner,
            name: project.name,
            description: project.description,
            created_at: Utc::now(),
        };
        self.projects.push(row.clone());
        row
    }

    pub fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| task.user_id == owner && filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.due_date.is_none(), task.due_date));
        tasks
    }

    pub fn insert_task(&mut self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        if let Some(project_id) = task.project_id {
            let visible = self
                .projects
                .iter()
                .any(|project| project.id == project_id && project.user_id == owner);
            if !visible {
                return Err(StoreError::not_found("project", project_id));
            }
        }
        let now = Utc::now();
        let row = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(row.clone());
        Ok(row)
    }

    pub fn update_task_status(
        &mut self,
        owner: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id && task.user_id == owner)
            .ok_or_else(|| StoreError::not_found("task", task_id))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub fn find_category(&self, owner: Uuid, name: &str, kind: CategoryKind) -> Option<Category> {
        self.categories
            .iter()
            .find(|category| {
                category.user_id == owner && category.kind == kind && category.name == name
            })
            .cloned()
    }

    pub fn insert_category(&mut self, owner: Uuid, name: &str, kind: CategoryKind) -> Category {
        let row = Category {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
        };
        self.categories.push(row.clone());
        row
    }

    pub fn list_ledger(&self, owner: Uuid, month: &MonthRange) -> Vec<LedgerEntry> {
        let mut entries: Vec<LedgerEntry> = self
            .transactions
            .iter()
            // Newest row first so same-day entries keep latest-added on top.
            .rev()
            .filter(|tx| tx.user_id == owner && month.contains(tx.date))
            .map(|tx| self.join_category(owner, tx))
            .collect();
        entries.sort_by(|a, b| b.transaction.date.cmp(&a.transaction.date));
        entries
    }

    pub fn insert_transaction(
        &mut self,
        owner: Uuid,
        category_id: Option<Uuid>,
        transaction: &NewTransaction,
    ) -> StoreResult<LedgerEntry> {
        if let Some(id) = category_id {
            if !self
                .categories
                .iter()
                .any(|category| category.id == id && category.user_id == owner)
            {
                return Err(StoreError::not_found("category", id));
            }
        }
        let row = Transaction {
            id: Uuid::new_v4(),
            user_id: owner,
            category_id,
            amount: transaction.amount,
            date: transaction.date,
            note: transaction.note.clone(),
            created_at: Utc::now(),
        };
        self.transactions.push(row.clone());
        Ok(self.join_category(owner, &row))
    }

    pub fn list_goals(&self, owner: Uuid, term: Option<GoalTerm>) -> Vec<Goal> {
        let mut goals: Vec<Goal> = self
            .goals
            .iter()
            .filter(|goal| goal.user_id == owner && term.map_or(true, |term| goal.term == term))
            .cloned()
            .collect();
        goals.sort_by_key(|goal| goal.created_at);
        goals
    }

    pub fn insert_goal(&mut self, owner: Uuid, goal: NewGoal) -> Goal {
        let row = Goal {
            id: Uuid::new_v4(),
            user_id: owner,
            title: goal.title,
            description: goal.description,
            term: goal.term,
            target_value: goal.target_value,
            current_value: 0.0,
            unit: goal.unit,
            deadline: goal.deadline,
            created_at: Utc::now(),
        };
        self.goals.push(row.clone());
        row
    }

    pub fn update_goal_progress(
        &mut self,
        owner: Uuid,
        goal_id: Uuid,
        value: f64,
    ) -> StoreResult<Goal> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.id == goal_id && goal.user_id == owner)
            .ok_or_else(|| StoreError::not_found("goal", goal_id))?;
        goal.current_value = value;
        Ok(goal.clone())
    }

    fn owns_habit(&self, owner: Uuid, habit_id: Uuid) -> bool {
        self.habits
            .iter()
            .any(|habit| habit.id == habit_id && habit.user_id == owner)
    }

    fn join_category(&self, owner: Uuid, tx: &Transaction) -> LedgerEntry {
        let category = tx.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|category| category.id == id && category.user_id == owner)
                .cloned()
        });
        LedgerEntry {
            transaction: tx.clone(),
            category,
        }
    }
}

/// Store kept entirely in memory. Used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.read().clone()
    }
}

impl BrainStore for MemoryStore {
    fn list_habits(&self, owner: Uuid) -> StoreResult<Vec<Habit>> {
        Ok(self.tables.read().list_habits(owner))
    }

    fn insert_habit(&self, owner: Uuid, habit: NewHabit) -> StoreResult<Habit> {
        Ok(self.tables.write().insert_habit(owner, habit))
    }

    fn list_habit_logs(&self, owner: Uuid, filter: &LogFilter) -> StoreResult<Vec<HabitLog>> {
        Ok(self.tables.read().list_habit_logs(owner, filter))
    }

    fn insert_habit_log(&self, owner: Uuid, log: NewHabitLog) -> StoreResult<HabitLog> {
        self.tables.write().insert_habit_log(owner, log)
    }

    fn set_log_completed(
        &self,
        owner: Uuid,
        log_id: Uuid,
        completed: bool,
    ) -> StoreResult<HabitLog> {
        self.tables.write().set_log_completed(owner, log_id, completed)
    }

    fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>> {
        Ok(self.tables.read().list_projects(owner))
    }

    fn insert_project(&self, owner: Uuid, project: NewProject) -> StoreResult<Project> {
        Ok(self.tables.write().insert_project(owner, project))
    }

    fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(self.tables.read().list_tasks(owner, filter))
    }

    fn insert_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        self.tables.write().insert_task(owner, task)
    }

    fn update_task_status(
        &self,
        owner: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Task> {
        self.tables.write().update_task_status(owner, task_id, status)
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
        Ok(self.tables.write().insert_category(owner, name, kind))
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
        self.tables
            .write()
            .insert_transaction(owner, category_id, transaction)
    }

    fn list_goals(&self, owner: Uuid, term: Option<GoalTerm>) -> StoreResult<Vec<Goal>> {
        Ok(self.tables.read().list_goals(owner, term))
    }

    fn insert_goal(&self, owner: Uuid, goal: NewGoal) -> StoreResult<Goal> {
        Ok(self.tables.write().insert_goal(owner, goal))
    }

    fn update_goal_progress(&self, owner: Uuid, goal_id: Uuid, value: f64) -> StoreResult<Goal> {
        self.tables.write().update_goal_progress(owner, goal_id, value)
    }
}
