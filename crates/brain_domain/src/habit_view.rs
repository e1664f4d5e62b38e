use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{BrainResult, StoreError},
    habit::{self, CompletionPoint, DailySummary, Habit, HabitLog, NewHabit, NewHabitLog},
    store::{BrainStore, LogFilter},
};

/// Habit list plus completion logs for one owner.
pub struct HabitTracker {
    store: Arc<dyn BrainStore>,
    owner: Uuid,
    habits: Vec<Habit>,
    logs: Vec<HabitLog>,
}

impl HabitTracker {
    pub fn new(store: Arc<dyn BrainStore>, owner: Uuid) -> Self {
        Self {
            store,
            owner,
            habits: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Replaces the snapshot with every habit and every log of the owner.
    pub fn load(&mut self) -> BrainResult<()> {
        let habits = self.store.list_habits(self.owner)?;
        let logs = self.store.list_habit_logs(self.owner, &LogFilter::default())?;
        tracing::info!(habits = habits.len(), logs = logs.len(), "loaded habits");
        self.habits = habits;
        self.logs = logs;
        Ok(())
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn logs(&self) -> &[HabitLog] {
        &self.logs
    }

    #[instrument(skip(self, habit), fields(name = %habit.name))]
    pub fn add_habit(&mut self, habit: NewHabit) -> BrainResult<Habit> {
        let row = self
            .store
            .insert_habit(self.owner, habit)
            .inspect_err(|err| tracing::warn!(%err, "unable to add habit"))?;
        self.habits.push(row.clone());
        Ok(row)
    }

    /// Flips today's log if one exists, otherwise records a completed log.
    #[instrument(skip(self))]
    pub fn toggle_today(&mut self, habit_id: Uuid, today: NaiveDate) -> BrainResult<HabitLog> {
        if !self.habits.iter().any(|habit| habit.id == habit_id) {
            return Err(StoreError::not_found("habit", habit_id).into());
        }
        let existing = habit::log_for_day(habit_id, &self.logs, today).cloned();
        let result = match existing {
            Some(log) => self
                .store
                .set_log_completed(self.owner, log.id, !log.completed),
            None => self
                .store
                .insert_habit_log(self.owner, NewHabitLog::completed(habit_id, today)),
        };
        let row = result.inspect_err(|err| tracing::warn!(%err, "unable to toggle habit"))?;

        match self.logs.iter_mut().find(|log| log.id == row.id) {
            Some(slot) => *slot = row.clone(),
            None => self.logs.push(row.clone()),
        }
        tracing::debug!(completed = row.completed, "habit toggled");
        Ok(row)
    }

    pub fn is_completed(&self, habit_id: Uuid, day: NaiveDate) -> bool {
        habit::completed_on(habit_id, &self.logs, day)
    }

    pub fn streak(&self, habit_id: Uuid, today: NaiveDate) -> u32 {
        habit::streak(habit_id, &self.logs, today)
    }

    pub fn completion_series(&self, today: NaiveDate) -> Vec<CompletionPoint> {
        habit::completion_series(&self.habits, &self.logs, today)
    }

    pub fn completion_series_for_window(
        &self,
        today: NaiveDate,
        days: usize,
    ) -> Vec<CompletionPoint> {
        habit::completion_series_for_window(&self.habits, &self.logs, today, days)
    }

    pub fn daily_summary(&self, day: NaiveDate) -> DailySummary {
        habit::daily_summary(&self.habits, &self.logs, day)
    }
}
