use chrono::{DateTime, TimeZone, Utc};

use crate::{
    finance::{self, FinanceSummary, LedgerEntry, MonthRange},
    goal::Goal,
    habit::{self, DailySummary, Habit, HabitLog},
    task::{self, DueTasks, Task},
};

pub const DEFAULT_TASK_PREVIEW: usize = 5;
pub const TOP_GOALS: usize = 3;

/// Rows the dashboard is computed from.
#[derive(Debug, Clone, Default)]
pub struct DashboardSource {
    pub habits: Vec<Habit>,
    pub logs: Vec<HabitLog>,
    pub tasks: Vec<Task>,
    pub ledger: Vec<LedgerEntry>,
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalSnapshot {
    pub title: String,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub habits: DailySummary,
    pub due: DueTasks,
    pub month: MonthRange,
    pub finance: FinanceSummary,
    pub goals: Vec<GoalSnapshot>,
}

impl Dashboard {
    /// Summarises `source` as seen at `now`. Ledger entries outside the
    /// current month are ignored, as are goals past the first three.
    pub fn compute<Tz: TimeZone>(
        source: &DashboardSource,
        now: &DateTime<Tz>,
        preview: usize,
    ) -> Self {
        let today = now.date_naive();
        let month = MonthRange::containing(today);
        let in_month: Vec<LedgerEntry> = source
            .ledger
            .iter()
            .filter(|entry| month.contains(entry.transaction.date))
            .cloned()
            .collect();
        Self {
            habits: habit::daily_summary(&source.habits, &source.logs, today),
            due: task::due_now(&source.tasks, now.with_timezone(&Utc), preview),
            month,
            finance: finance::summarize(&in_month),
            goals: source
                .goals
                .iter()
                .take(TOP_GOALS)
                .map(|goal| GoalSnapshot {
                    title: goal.title.clone(),
                    percent: goal.rounded_progress(),
                })
                .collect(),
        }
    }
}
