use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::BrainResult,
    goal::{self, Goal, GoalTerm, NewGoal},
    store::BrainStore,
};

/// All goals of the owner, viewed one term at a time.
pub struct GoalTracker {
    store: Arc<dyn BrainStore>,
    owner: Uuid,
    goals: Vec<Goal>,
    term: GoalTerm,
}

impl GoalTracker {
    pub fn new(store: Arc<dyn BrainStore>, owner: Uuid) -> Self {
        Self {
            store,
            owner,
            goals: Vec::new(),
            term: GoalTerm::default(),
        }
    }

    pub fn load(&mut self) -> BrainResult<()> {
        let goals = self.store.list_goals(self.owner, None)?;
        tracing::info!(goals = goals.len(), "loaded goals");
        self.goals = goals;
        Ok(())
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn term(&self) -> GoalTerm {
        self.term
    }

    pub fn select_term(&mut self, term: GoalTerm) {
        self.term = term;
    }

    /// Goals of the selected term.
    pub fn visible(&self) -> Vec<Goal> {
        goal::filter_by_term(&self.goals, self.term)
    }

    /// Adds a goal under the currently selected term. Whatever `goal.term`
    /// holds is replaced by that selection before the goal is stored.
    #[instrument(skip(self, goal), fields(title = %goal.title))]
    pub fn add_goal(&mut self, goal: NewGoal) -> BrainResult<Goal> {
        let goal = NewGoal {
            term: self.term,
            ..goal
        };
        let row = self
            .store
            .insert_goal(self.owner, goal)
            .inspect_err(|err| tracing::warn!(%err, "unable to add goal"))?;
        self.goals.push(row.clone());
        Ok(row)
    }

    #[instrument(skip(self))]
    pub fn update_progress(&mut self, goal_id: Uuid, value: f64) -> BrainResult<Goal> {
        let value = goal::validate_progress(value)?;
        let row = self
            .store
            .update_goal_progress(self.owner, goal_id, value)
            .inspect_err(|err| tracing::warn!(%err, "unable to update goal"))?;
        match self.goals.iter_mut().find(|goal| goal.id == row.id) {
            Some(slot) => *slot = row.clone(),
            None => self.goals.push(row.clone()),
        }
        Ok(row)
    }
}
