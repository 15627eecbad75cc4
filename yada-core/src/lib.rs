//! YADA Core Library
//!
//! Food catalog, daily logs, calorie targets, and undoable edits for the
//! YADA diet tracker.

pub mod catalog;
pub mod command;
pub mod food;
pub mod log;
pub mod manager;
pub mod profile;
pub mod storage;

pub use catalog::{CatalogError, FoodCatalog, LoadReport, LoadWarning};
pub use command::{AddToLog, Command, CommandHistory, DietState, RemoveFromLog, UpdateProfile};
pub use food::{BasicFood, CalorieError, Component, CompositeFood, Food, FoodLookup, RecordError};
pub use log::{DailyLog, LogBook};
pub use manager::{DaySummary, DietManager, LoggedFood, ManagerError};
pub use profile::{
    formula_by_name, formula_names, ActivityLevel, BodyMetrics, CalorieFormula, Gender,
    HarrisBenedict, MifflinStJeor, Profile, ProfileError, DEFAULT_METHOD,
};
pub use storage::{DataFile, DataStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
