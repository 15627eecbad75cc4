//! Commands that edit the active day's log and the user profile.

use super::Command;
use crate::log::DailyLog;
use crate::profile::{BodyMetrics, Profile};

/// The state diet commands operate on: the profile and the active day's log.
#[derive(Debug, Clone, PartialEq)]
pub struct DietState {
    pub profile: Profile,
    pub log: DailyLog,
}

/// Logs servings of a food.
///
/// Undo removes the whole entry rather than subtracting the added
/// servings, so servings logged earlier for the same food are lost too.
#[derive(Debug, Clone)]
pub struct AddToLog {
    food: String,
    servings: f64,
}

impl AddToLog {
    pub fn new(food: impl Into<String>, servings: f64) -> Self {
        Self {
            food: food.into(),
            servings,
        }
    }
}

impl Command<DietState> for AddToLog {
    fn execute(&self, state: &mut DietState) {
        state.log.add(&self.food, self.servings);
    }

    fn undo(&self, state: &mut DietState) {
        state.log.remove(&self.food);
    }

    fn description(&self) -> String {
        format!("Add {} serving(s) of {}", self.servings, self.food)
    }
}

/// Removes a food from the log.
#[derive(Debug, Clone)]
pub struct RemoveFromLog {
    food: String,
    prior_servings: f64,
}

impl RemoveFromLog {
    /// Captures the food's current servings in `log` (0 if absent).
    pub fn new(food: impl Into<String>, log: &DailyLog) -> Self {
        let food = food.into();
        let prior_servings = log.servings(&food).unwrap_or(0.0);
        Self {
            food,
            prior_servings,
        }
    }
}

impl Command<DietState> for RemoveFromLog {
    fn execute(&self, state: &mut DietState) {
        state.log.remove(&self.food);
    }

    fn undo(&self, state: &mut DietState) {
        if self.prior_servings > 0.0 {
            state.log.add(&self.food, self.prior_servings);
        }
    }

    fn description(&self) -> String {
        format!("Remove {}", self.food)
    }
}

/// Replaces the profile's body metrics and the active day's snapshot.
///
/// The two may differ before the update when the day was logged under
/// older metrics, so each is restored from its own snapshot.
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    new: BodyMetrics,
    old_profile: BodyMetrics,
    old_log: BodyMetrics,
}

impl UpdateProfile {
    pub fn new(state: &DietState, new: BodyMetrics) -> Self {
        Self {
            new,
            old_profile: state.profile.metrics,
            old_log: state.log.metrics,
        }
    }
}

impl Command<DietState> for UpdateProfile {
    fn execute(&self, state: &mut DietState) {
        state.profile.metrics = self.new;
        state.log.set_metrics(self.new);
    }

    fn undo(&self, state: &mut DietState) {
        state.profile.metrics = self.old_profile;
        state.log.set_metrics(self.old_log);
    }

    fn description(&self) -> String {
        format!("Update profile: {}", self.new)
    }
}
