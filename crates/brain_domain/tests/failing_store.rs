use std::sync::Arc;

use brain_domain::{
    error::{BrainError, StoreError, StoreResult},
    finance::{Category, CategoryKind, LedgerEntry, MonthRange, NewTransaction},
    goal::{Goal, GoalTerm, NewGoal},
    habit::{Habit, HabitLog, NewHabit, NewHabitLog},
    store::{BrainStore, LogFilter, MemoryStore, TaskFilter},
    task::{NewProject, NewTask, Project, Task, TaskStatus},
    BrainService,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use uuid::Uuid;

/// Delegates reads to a memory store and rejects writes while `offline` is set.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    offline: Mutex<bool>,
}

impl FlakyStore {
    fn go_offline(&self) {
        *self.offline.lock() = true;
    }

    fn guard(&self) -> StoreResult<()> {
        if *self.offline.lock() {
            Err(StoreError::unavailable("network down"))
        } else {
            Ok(())
        }
    }
}

impl BrainStore for FlakyStore {
    fn list_habits(&self, owner: Uuid) -> StoreResult<Vec<Habit>> {
        self.inner.list_habits(owner)
    }

    fn insert_habit(&self, owner: Uuid, habit: NewHabit) -> StoreResult<Habit> {
        self.guard()?;
        self.inner.insert_habit(owner, habit)
    }

    fn list_habit_logs(&self, owner: Uuid, filter: &LogFilter) -> StoreResult<Vec<HabitLog>> {
        self.inner.list_habit_logs(owner, filter)
    }

    fn insert_habit_log(&self, owner: Uuid, log: NewHabitLog) -> StoreResult<HabitLog> {
        self.guard()?;
        self.inner.insert_habit_log(owner, log)
    }

    fn set_log_completed(
        &self,
        owner: Uuid,
        log_id: Uuid,
        completed: bool,
    ) -> StoreResult<HabitLog> {
        self.guard()?;
        self.inner.set_log_completed(owner, log_id, completed)
    }

    fn list_projects(&self, owner: Uuid) -> StoreResult<Vec<Project>> {
        self.inner.list_projects(owner)
    }

    fn insert_project(&self, owner: Uuid, project: NewProject) -> StoreResult<Project> {
        self.guard()?;
        self.inner.insert_project(owner, project)
    }

    fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        self.inner.list_tasks(owner, filter)
    }

    fn insert_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        self.guard()?;
        self.inner.insert_task(owner, task)
    }

    fn update_task_status(
        &self,
        owner: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> StoreResult<Task> {
        self.guard()?;
        self.inner.update_task_status(owner, task_id, status)
    }

    fn find_category(
        &self,
        owner: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> StoreResult<Option<Category>> {
        self.inner.find_category(owner, name, kind)
    }

    fn insert_category(
        &self,
        owner: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> StoreResult<Category> {
        self.guard()?;
        self.inner.insert_category(owner, name, kind)
    }

    fn list_ledger(&self, owner: Uuid, month: &MonthRange) -> StoreResult<Vec<LedgerEntry>> {
        self.inner.list_ledger(owner, month)
    }

    fn insert_transaction(
        &self,
        owner: Uuid,
        category_id: Option<Uuid>,
        transaction: &NewTransaction,
    ) -> StoreResult<LedgerEntry> {
        self.guard()?;
        self.inner.insert_transaction(owner, category_id, transaction)
    }

    fn list_goals(&self, owner: Uuid, term: Option<GoalTerm>) -> StoreResult<Vec<Goal>> {
        self.inner.list_goals(owner, term)
    }

    fn insert_goal(&self, owner: Uuid, goal: NewGoal) -> StoreResult<Goal> {
        self.guard()?;
        self.inner.insert_goal(owner, goal)
    }

    fn update_goal_progress(&self, owner: Uuid, goal_id: Uuid, value: f64) -> StoreResult<Goal> {
        self.guard()?;
        self.inner.update_goal_progress(owner, goal_id, value)
    }
}

fn unavailable(err: &BrainError) -> bool {
    matches!(err, BrainError::Store(StoreError::Unavailable { .. }))
}

#[test]
fn failed_writes_leave_view_models_untouched() {
    let store = Arc::new(FlakyStore::default());
    let service = BrainService::builder()
        .with_store(store.clone())
        .owner(Uuid::new_v4())
        .build()
        .expect("build service");
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let mut habits = service.habits().expect("habits");
    let habit = habits.add_habit(NewHabit::new("Read").unwrap()).expect("add");
    habits.toggle_today(habit.id, today).expect("toggle");
    let mut tasks = service.tasks().expect("tasks");
    let task = tasks.add_task(NewTask::new("Write").unwrap()).expect("add task");
    let mut goals = service.goals().expect("goals");
    let goal = goals
        .add_goal(NewGoal::new("Books", GoalTerm::Short, 10.0).unwrap())
        .expect("add goal");
    let mut ledger = service
        .finances(MonthRange::containing(today))
        .expect("ledger");

    store.go_offline();

    let err = habits.toggle_today(habit.id, today).unwrap_err();
    assert!(unavailable(&err));
    assert!(habits.is_completed(habit.id, today));
    assert!(unavailable(
        &habits.add_habit(NewHabit::new("Run").unwrap()).unwrap_err()
    ));
    assert_eq!(habits.habits().len(), 1);

    assert!(unavailable(&tasks.toggle_done(task.id).unwrap_err()));
    assert_eq!(tasks.tasks()[0].status, TaskStatus::Todo);

    assert!(unavailable(&goals.update_progress(goal.id, 5.0).unwrap_err()));
    assert_eq!(goals.goals()[0].current_value, 0.0);

    let tx = NewTransaction::new(12.0, CategoryKind::Expense, today).unwrap();
    assert!(unavailable(&ledger.add_transaction(tx).unwrap_err()));
    assert!(ledger.entries().is_empty());
}

#[test]
fn failed_category_insert_records_nothing() {
    let store = Arc::new(FlakyStore::default());
    let service = BrainService::builder()
        .with_store(store.clone())
        .owner(Uuid::new_v4())
        .build()
        .expect("build service");
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let mut ledger = service
        .finances(MonthRange::containing(today))
        .expect("ledger");
    ledger
        .add_transaction(
            NewTransaction::new(20.0, CategoryKind::Expense, today)
                .unwrap()
                .in_category("Food"),
        )
        .expect("online add");

    store.go_offline();

    let rent = NewTransaction::new(900.0, CategoryKind::Expense, today)
        .unwrap()
        .in_category("Rent");
    assert!(unavailable(&ledger.add_transaction(rent).unwrap_err()));
    let food = NewTransaction::new(5.0, CategoryKind::Expense, today)
        .unwrap()
        .in_category("Food");
    assert!(unavailable(&ledger.add_transaction(food).unwrap_err()));

    let tables = store.inner.snapshot();
    assert_eq!(tables.categories.len(), 1);
    assert_eq!(tables.transactions.len(), 1);
    assert_eq!(ledger.entries().len(), 1);
    assert_eq!(ledger.summary().expense, 20.0);
}
