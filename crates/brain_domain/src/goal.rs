use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error::{finite, optional_text, positive, required_text, ValidationError};

pub const DEFAULT_UNIT: &str = "units";

/// Coarse horizon used only to filter goals.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum GoalTerm {
    #[default]
    Short,
    Mid,
    Long,
}

impl GoalTerm {
    pub const ALL: [GoalTerm; 3] = [GoalTerm::Short, GoalTerm::Mid, GoalTerm::Long];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub term: GoalTerm,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub unit: String,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Share of the target reached, clamped to `0..=100`.
    pub fn progress_percent(&self) -> f64 {
        if self.target_value <= 0.0 || !self.target_value.is_finite() {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0)
    }

    pub fn rounded_progress(&self) -> u32 {
        self.progress_percent().round() as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub term: GoalTerm,
    pub target_value: f64,
    pub unit: String,
    pub deadline: Option<NaiveDate>,
}

impl NewGoal {
    pub fn new(
        title: impl Into<String>,
        term: GoalTerm,
        target_value: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text(title, "goal title")?,
            description: None,
            term,
            target_value: positive(target_value, "target value")?,
            unit: DEFAULT_UNIT.to_string(),
            deadline: None,
        })
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = optional_text(Some(unit.into())).unwrap_or_else(|| DEFAULT_UNIT.to_string());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Checks a new `current_value` before it is sent to the store.
pub fn validate_progress(value: f64) -> Result<f64, ValidationError> {
    finite(value, "current value")
}

pub fn filter_by_term(goals: &[Goal], term: GoalTerm) -> Vec<Goal> {
    goals
        .iter()
        .filter(|goal| goal.term == term)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn goal(term: GoalTerm, target: f64, current: f64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: format!("{term} goal"),
            description: None,
            term,
            target_value: target,
            current_value: current,
            unit: DEFAULT_UNIT.to_string(),
            deadline: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(goal(GoalTerm::Short, 10.0, 2.5).progress_percent(), 25.0);
        assert_eq!(goal(GoalTerm::Short, 10.0, 25.0).progress_percent(), 100.0);
        assert_eq!(goal(GoalTerm::Short, 10.0, -3.0).progress_percent(), 0.0);
        assert_eq!(goal(GoalTerm::Short, 0.0, 3.0).progress_percent(), 0.0);
        assert_eq!(goal(GoalTerm::Short, 3.0, 2.0).rounded_progress(), 67);
    }

    #[test]
    fn filter_keeps_matching_term() {
        let goals = vec![
            goal(GoalTerm::Short, 1.0, 0.0),
            goal(GoalTerm::Long, 1.0, 0.0),
            goal(GoalTerm::Short, 1.0, 0.0),
        ];
        assert_eq!(filter_by_term(&goals, GoalTerm::Short).len(), 2);
        assert!(filter_by_term(&goals, GoalTerm::Mid).is_empty());
    }

    #[test]
    fn new_goal_validation() {
        assert!(NewGoal::new("Run", GoalTerm::Mid, 0.0).is_err());
        assert!(NewGoal::new(" ", GoalTerm::Mid, 5.0).is_err());
        let goal = NewGoal::new("Run", GoalTerm::Mid, 100.0).unwrap().with_unit("km");
        assert_eq!(goal.unit, "km");
        assert!(validate_progress(f64::INFINITY).is_err());
        assert_eq!(GoalTerm::from_str("long").unwrap(), GoalTerm::Long);
        assert_eq!(serde_json::to_string(&GoalTerm::Mid).unwrap(), "\"Mid\"");
    }
}
