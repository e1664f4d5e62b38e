use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    dashboard::{Dashboard, DashboardSource},
    error::{BrainResult, StoreError},
    finance::MonthRange,
    finance_view::FinanceLedger,
    goal_view::GoalTracker,
    habit_view::HabitTracker,
    store::{BrainStore, LogFilter, TaskFilter},
    task::{NewProject, Project},
    task_view::TaskBoard,
};

/// Entry point tying a store to one owner. Hands out loaded view-models.
pub struct BrainService {
    store: Arc<dyn BrainStore>,
    owner: Uuid,
}

pub struct BrainServiceBuilder {
    store: Option<Arc<dyn BrainStore>>,
    owner: Option<Uuid>,
}

impl BrainServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            owner: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn BrainStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn owner(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Fails when no store was supplied. A missing owner falls back to the
    /// nil id, which is what a single-user data file uses.
    pub fn build(self) -> BrainResult<BrainService> {
        let store = self
            .store
            .ok_or_else(|| StoreError::unavailable("no store configured"))?;
        Ok(BrainService {
            store,
            owner: self.owner.unwrap_or_else(Uuid::nil),
        })
    }
}

impl Default for BrainServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BrainService {
    pub fn builder() -> BrainServiceBuilder {
        BrainServiceBuilder::new()
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn store(&self) -> Arc<dyn BrainStore> {
        Arc::clone(&self.store)
    }

    pub fn habits(&self) -> BrainResult<HabitTracker> {
        let mut tracker = HabitTracker::new(self.store(), self.owner);
        tracker.load()?;
        Ok(tracker)
    }

    pub fn tasks(&self) -> BrainResult<TaskBoard> {
        let mut board = TaskBoard::new(self.store(), self.owner);
        board.load()?;
        Ok(board)
    }

    pub fn finances(&self, month: MonthRange) -> BrainResult<FinanceLedger> {
        let mut ledger = FinanceLedger::new(self.store(), self.owner, month);
        ledger.load(month)?;
        Ok(ledger)
    }

    pub fn goals(&self) -> BrainResult<GoalTracker> {
        let mut tracker = GoalTracker::new(self.store(), self.owner);
        tracker.load()?;
        Ok(tracker)
    }

    #[instrument(skip(self, project), fields(name = %project.name))]
    pub fn add_project(&self, project: NewProject) -> BrainResult<Project> {
        Ok(self.store.insert_project(self.owner, project)?)
    }

    /// Fetches only what the dashboard shows: today's completed logs, open
    /// tasks already due, the current month's ledger and the goals.
    #[instrument(skip(self, now))]
    pub fn dashboard<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        preview: usize,
    ) -> BrainResult<Dashboard> {
        let today = now.date_naive();
        let month = MonthRange::containing(today);
        let source = DashboardSource {
            habits: self.store.list_habits(self.owner)?,
            logs: self
                .store
                .list_habit_logs(self.owner, &LogFilter::on(today).completed_only())?,
            tasks: self
                .store
                .list_tasks(self.owner, &TaskFilter::due_by(now.with_timezone(&Utc)))?,
            ledger: self.store.list_ledger(self.owner, &month)?,
            goals: self.store.list_goals(self.owner, None)?,
        };
        Ok(Dashboard::compute(&source, now, preview))
    }
}
