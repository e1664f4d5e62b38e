use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{optional_text, required_text, ValidationError};

/// Number of days shown in the completion history chart.
pub const COMPLETION_WINDOW_DAYS: usize = 30;
pub const DEFAULT_FREQUENCY: &str = "Daily";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub frequency: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitLog {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub frequency: Vec<String>,
}

impl NewHabit {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text(name, "habit name")?,
            icon: None,
            color: None,
            frequency: vec![DEFAULT_FREQUENCY.to_string()],
        })
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = optional_text(Some(icon.into()));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = optional_text(Some(color.into()));
        self
    }

    /// Replaces the frequency labels. Blank labels are dropped and an empty
    /// result falls back to [`DEFAULT_FREQUENCY`].
    pub fn with_frequency<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .filter_map(|label| optional_text(Some(label.into())))
            .collect();
        if !labels.is_empty() {
            self.frequency = labels;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabitLog {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
}

impl NewHabitLog {
    pub fn completed(habit_id: Uuid, date: NaiveDate) -> Self {
        Self {
            habit_id,
            date,
            completed: true,
            note: None,
        }
    }
}

/// Where a streak starts counting when today has no completed log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreakPolicy {
    /// An incomplete today does not break the streak; counting starts yesterday.
    #[default]
    GraceDay,
    /// Today must be completed for the streak to be non-zero.
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionPoint {
    pub date: NaiveDate,
    pub label: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DailySummary {
    pub completed: usize,
    pub total: usize,
}

impl DailySummary {
    pub fn percentage(&self) -> u32 {
        percentage(self.completed, self.total)
    }
}

/// Completion rate for each of the last [`COMPLETION_WINDOW_DAYS`] days, oldest first.
pub fn completion_series(
    habits: &[Habit],
    logs: &[HabitLog],
    today: NaiveDate,
) -> Vec<CompletionPoint> {
    completion_series_for_window(habits, logs, today, COMPLETION_WINDOW_DAYS)
}

pub fn completion_series_for_window(
    habits: &[Habit],
    logs: &[HabitLog],
    today: NaiveDate,
    days: usize,
) -> Vec<CompletionPoint> {
    let completed = CompletedDays::new(habits, logs);
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            let summary = completed.summary_on(date);
            CompletionPoint {
                date,
                label: date.format("%b %d").to_string(),
                percentage: summary.percentage(),
            }
        })
        .collect()
}

/// Completed vs total habits for a single day.
pub fn daily_summary(habits: &[Habit], logs: &[HabitLog], day: NaiveDate) -> DailySummary {
    CompletedDays::new(habits, logs).summary_on(day)
}

pub fn streak(habit_id: Uuid, logs: &[HabitLog], today: NaiveDate) -> u32 {
    streak_with_policy(habit_id, logs, today, StreakPolicy::default())
}

pub fn streak_with_policy(
    habit_id: Uuid,
    logs: &[HabitLog],
    today: NaiveDate,
    policy: StreakPolicy,
) -> u32 {
    let done: HashSet<NaiveDate> = logs
        .iter()
        .filter(|log| log.habit_id == habit_id && log.completed)
        .map(|log| log.date)
        .collect();

    let start = if done.contains(&today) {
        Some(today)
    } else {
        match policy {
            StreakPolicy::GraceDay => today.pred_opt(),
            StreakPolicy::Strict => None,
        }
    };
    let Some(mut cursor) = start else {
        return 0;
    };

    let mut streak = 0;
    while done.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

pub fn completed_on(habit_id: Uuid, logs: &[HabitLog], day: NaiveDate) -> bool {
    logs.iter()
        .any(|log| log.habit_id == habit_id && log.date == day && log.completed)
}

/// First log recorded for the habit on `day`, completed or not.
pub fn log_for_day(habit_id: Uuid, logs: &[HabitLog], day: NaiveDate) -> Option<&HabitLog> {
    logs.iter()
        .find(|log| log.habit_id == habit_id && log.date == day)
}

struct CompletedDays {
    habit_ids: HashSet<Uuid>,
    done: HashSet<(Uuid, NaiveDate)>,
}

impl CompletedDays {
    fn new(habits: &[Habit], logs: &[HabitLog]) -> Self {
        let habit_ids: HashSet<Uuid> = habits.iter().map(|habit| habit.id).collect();
        let done = logs
            .iter()
            .filter(|log| log.completed && habit_ids.contains(&log.habit_id))
            .map(|log| (log.habit_id, log.date))
            .collect();
        Self { habit_ids, done }
    }

    fn summary_on(&self, day: NaiveDate) -> DailySummary {
        let completed = self
            .habit_ids
            .iter()
            .filter(|id| self.done.contains(&(**id, day)))
            .count();
        DailySummary {
            completed,
            total: self.habit_ids.len(),
        }
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(name: &str) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            icon: None,
            color: None,
            frequency: vec![DEFAULT_FREQUENCY.to_string()],
            created_at: Utc::now(),
        }
    }

    fn log(habit_id: Uuid, date: NaiveDate, completed: bool) -> HabitLog {
        HabitLog {
            id: Uuid::new_v4(),
            habit_id,
            date,
            completed,
            note: None,
            created_at: Utc::now(),
        }
    }

    fn run_ending(habit_id: Uuid, last: NaiveDate, len: i64) -> Vec<HabitLog> {
        (0..len)
            .map(|offset| log(habit_id, last - Duration::days(offset), true))
            .collect()
    }

    #[test]
    fn single_habit_completed_today() {
        let today = day(2026, 10, 19);
        let read = habit("Read");
        let logs = vec![log(read.id, today, true)];

        let series = completion_series(&[read.clone()], &logs, today);
        assert_eq!(series.len(), COMPLETION_WINDOW_DAYS);
        let last = series.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!(last.label, "Oct 19");
        assert_eq!(last.percentage, 100);
        assert_eq!(streak(read.id, &logs, today), 1);
    }

    #[test]
    fn series_is_oldest_first_and_zero_without_habits() {
        let today = day(2026, 3, 2);
        let series = completion_series(&[], &[log(Uuid::new_v4(), today, true)], today);
        assert_eq!(series.first().unwrap().date, day(2026, 2, 1));
        assert_eq!(series.last().unwrap().date, today);
        assert!(series.iter().all(|point| point.percentage == 0));
    }

    #[test]
    fn series_rounds_and_ignores_duplicates_and_unknown_habits() {
        let today = day(2026, 10, 19);
        let habits = vec![habit("Read"), habit("Run"), habit("Write")];
        let logs = vec![
            log(habits[0].id, today, true),
            log(habits[0].id, today, true),
            log(Uuid::new_v4(), today, true),
            log(habits[1].id, today, false),
        ];
        let series = completion_series_for_window(&habits, &logs, today, 3);
        assert_eq!(series.len(), 3);
        assert_eq!(series[2].percentage, 33);
        assert_eq!(series[1].percentage, 0);

        let logs = vec![log(habits[0].id, today, true), log(habits[1].id, today, true)];
        let series = completion_series_for_window(&habits, &logs, today, 1);
        assert_eq!(series[0].percentage, 67);
    }

    #[test]
    fn streak_is_zero_without_logs() {
        assert_eq!(streak(Uuid::new_v4(), &[], day(2026, 10, 19)), 0);
    }

    #[test]
    fn streak_counts_consecutive_days_including_today() {
        let today = day(2026, 10, 19);
        let id = Uuid::new_v4();
        let logs = run_ending(id, today, 7);
        assert_eq!(streak(id, &logs, today), 7);
    }

    #[test]
    fn grace_day_keeps_streak_from_yesterday() {
        let today = day(2026, 10, 19);
        let id = Uuid::new_v4();
        let mut logs = run_ending(id, today - Duration::days(1), 4);
        logs.push(log(id, today, false));
        assert_eq!(streak(id, &logs, today), 4);
        assert_eq!(
            streak_with_policy(id, &logs, today, StreakPolicy::Strict),
            0
        );
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let today = day(2026, 1, 2);
        let id = Uuid::new_v4();
        let logs = vec![
            log(id, today, true),
            log(id, day(2025, 12, 31), true),
            log(id, day(2025, 12, 30), true),
        ];
        assert_eq!(streak(id, &logs, today), 1);
    }

    #[test]
    fn daily_summary_counts_completed_habits() {
        let today = day(2026, 10, 19);
        let habits = vec![habit("Read"), habit("Run")];
        let logs = vec![log(habits[1].id, today, true)];
        let summary = daily_summary(&habits, &logs, today);
        assert_eq!(summary, DailySummary { completed: 1, total: 2 });
        assert_eq!(summary.percentage(), 50);
        assert!(completed_on(habits[1].id, &logs, today));
        assert!(!completed_on(habits[0].id, &logs, today));
    }

    #[test]
    fn new_habit_defaults_to_daily() {
        let habit = NewHabit::new("  Stretch ").unwrap();
        assert_eq!(habit.name, "Stretch");
        assert_eq!(habit.frequency, vec!["Daily".to_string()]);

        let custom = NewHabit::new("Gym")
            .unwrap()
            .with_frequency(["Mon", " ", "Thu"]);
        assert_eq!(custom.frequency, vec!["Mon".to_string(), "Thu".to_string()]);
        assert!(NewHabit::new("").is_err());
    }
}
