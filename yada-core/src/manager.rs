//! The diet manager: one entry point over the catalog, the active day's
//! log, the profile, and the undo/redo history.
//!
//! Catalog edits apply directly. Log and profile edits are validated here,
//! turned into commands, and run through the history so they can be undone.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CatalogError, FoodCatalog, LoadReport};
use crate::command::{AddToLog, CommandHistory, DietState, RemoveFromLog, UpdateProfile};
use crate::food::{BasicFood, Component, CompositeFood, Food};
use crate::log::{DailyLog, LogBook};
use crate::profile::{
    formula_by_name, formula_names, BodyMetrics, Profile, ProfileError, DEFAULT_METHOD,
};
use crate::storage::{DataFile, DataStore, StorageError};

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    Validation(#[from] ProfileError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Servings must be a positive number, got {0}")]
    InvalidServings(f64),
}

/// One logged food with its computed calories, if the catalog knows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedFood {
    pub name: String,
    pub servings: f64,
    pub calories: Option<f64>,
}

/// Calorie totals for the active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub entries: Vec<LoggedFood>,
    pub consumed: f64,
    pub target: f64,
    pub remaining: f64,
    /// Logged names that contributed nothing because the catalog has no
    /// usable entry for them.
    pub unmatched: Vec<String>,
}

pub struct DietManager {
    catalog: FoodCatalog,
    state: DietState,
    book: LogBook,
    history: CommandHistory<DietState>,
}

impl DietManager {
    /// An empty manager with a default profile, showing `date`.
    pub fn new(date: NaiveDate) -> Self {
        let profile = Profile::default();
        let log = DailyLog::new(date, profile.metrics);
        Self {
            catalog: FoodCatalog::new(),
            state: DietState { profile, log },
            book: LogBook::new(),
            history: CommandHistory::new(),
        }
    }

    /// Loads the catalog, log book, and profile from `store` and opens the
    /// log for `date`. Missing files start empty. `default_method` is used
    /// only when no profile has been saved yet.
    pub fn open(
        store: &DataStore,
        date: NaiveDate,
        default_method: &str,
        history_limit: usize,
    ) -> Result<(Self, LoadReport), ManagerError> {
        let mut catalog = FoodCatalog::new();
        let report = match store.read_bytes(DataFile::Foods)? {
            Some(content) => catalog.load(content.as_slice())?,
            None => LoadReport::default(),
        };

        let mut book: LogBook = store.read_json(DataFile::Logs)?.unwrap_or_default();

        let profile = match store.read_json::<Profile>(DataFile::Profile)? {
            Some(mut profile) => {
                if let Err(e) = profile.metrics.validate() {
                    tracing::warn!(
                        "Saved profile has invalid metrics ({}), using defaults",
                        e
                    );
                    profile.metrics = BodyMetrics::default();
                }
                if formula_by_name(profile.method()).is_none() {
                    tracing::warn!(
                        "Saved profile uses unknown method '{}', falling back to {}",
                        profile.method(),
                        DEFAULT_METHOD
                    );
                    profile.set_method(DEFAULT_METHOD)?;
                }
                profile
            }
            None => {
                let mut profile = Profile::default();
                profile.set_method(default_method)?;
                profile
            }
        };

        book.repair_metrics(profile.metrics);
        let log = book.take_or_new(date, profile.metrics);
        tracing::info!(
            "Opened {} with {} food(s) and {} other logged day(s)",
            date,
            catalog.len(),
            book.len()
        );

        let manager = Self {
            catalog,
            state: DietState { profile, log },
            book,
            history: CommandHistory::with_limit(history_limit),
        };
        Ok((manager, report))
    }

    /// Writes the catalog, every day's log, and the profile to `store`.
    pub fn save(&mut self, store: &DataStore) -> Result<(), ManagerError> {
        store.write(DataFile::Foods, &self.catalog.to_records())?;
        self.catalog.mark_saved();

        let mut book = self.book.clone();
        if !self.state.log.is_empty() {
            book.store(self.state.log.clone());
        }
        store.write_json(DataFile::Logs, &book)?;
        store.write_json(DataFile::Profile, &self.state.profile)?;

        tracing::info!("Saved data to {}", store.data_dir().display());
        Ok(())
    }

    // Catalog

    pub fn catalog(&self) -> &FoodCatalog {
        &self.catalog
    }

    pub fn add_basic_food<S: AsRef<str>>(
        &mut self,
        name: &str,
        keywords: &[S],
        calories: f64,
    ) -> Result<(), ManagerError> {
        let keywords = keywords.iter().map(|k| k.as_ref().to_string());
        self.catalog
            .add_food(BasicFood::new(name, keywords, calories))?;
        Ok(())
    }

    /// Adds a composite food. Fails without touching the catalog if any
    /// component is unknown.
    pub fn add_composite_food<S: AsRef<str>>(
        &mut self,
        name: &str,
        keywords: &[S],
        components: &[(String, f64)],
    ) -> Result<(), ManagerError> {
        let keywords = keywords.iter().map(|k| k.as_ref().to_string());
        let components = components
            .iter()
            .map(|(food, servings)| Component::new(food.as_str(), *servings))
            .collect();
        let food = CompositeFood::new(name, keywords).with_components(components);
        self.catalog.add_food(food)?;
        Ok(())
    }

    pub fn add_component(
        &mut self,
        composite: &str,
        component: &str,
        servings: f64,
    ) -> Result<(), ManagerError> {
        self.catalog.add_component(composite, component, servings)?;
        Ok(())
    }

    pub fn set_food_calories(&mut self, name: &str, calories: f64) -> Result<(), ManagerError> {
        self.catalog.set_calories(name, calories)?;
        Ok(())
    }

    pub fn find_food(&self, name: &str) -> Option<&Food> {
        self.catalog.find_by_name(name)
    }

    pub fn find_foods<S: AsRef<str>>(&self, terms: &[S], match_all: bool) -> Vec<&Food> {
        self.catalog.find_by_keywords(terms, match_all)
    }

    pub fn food_calories(&self, name: &str) -> Result<f64, ManagerError> {
        Ok(self.catalog.calories_per_serving(name)?)
    }

    // Daily log

    pub fn date(&self) -> NaiveDate {
        self.state.log.date
    }

    pub fn daily_log(&self) -> &DailyLog {
        &self.state.log
    }

    /// Dates with a saved log other than the active one.
    pub fn log_book(&self) -> &LogBook {
        &self.book
    }

    pub fn log_food(&mut self, name: &str, servings: f64) -> Result<(), ManagerError> {
        if !servings.is_finite() || servings <= 0.0 {
            return Err(ManagerError::InvalidServings(servings));
        }
        self.history
            .execute(Box::new(AddToLog::new(name, servings)), &mut self.state);
        Ok(())
    }

    /// Removes a food from the active log. Returns false if it was not
    /// logged; the removal is still recorded so undo/redo stay symmetric.
    pub fn remove_logged_food(&mut self, name: &str) -> bool {
        let was_logged = self.state.log.servings(name).is_some();
        let command = RemoveFromLog::new(name, &self.state.log);
        self.history.execute(Box::new(command), &mut self.state);
        was_logged
    }

    /// Switches the active day. The current day is filed into the log book
    /// and the undo/redo history is cleared. A day without a log starts
    /// with the profile's current metrics.
    pub fn set_date(&mut self, date: NaiveDate) {
        if date == self.state.log.date {
            return;
        }
        let next = self.book.take_or_new(date, self.state.profile.metrics);
        let previous = std::mem::replace(&mut self.state.log, next);
        if !previous.is_empty() {
            self.book.store(previous);
        }
        self.history.clear();
        tracing::debug!("Active date is now {}", date);
    }

    // Profile

    pub fn profile(&self) -> &Profile {
        &self.state.profile
    }

    pub fn update_profile(
        &mut self,
        gender: &str,
        height_cm: f64,
        weight_kg: f64,
        age: i64,
        activity_level: &str,
    ) -> Result<(), ManagerError> {
        let metrics = BodyMetrics::parse(gender, height_cm, weight_kg, age, activity_level)?;
        let command = UpdateProfile::new(&self.state, metrics);
        self.history.execute(Box::new(command), &mut self.state);
        Ok(())
    }

    pub fn set_calculation_method(&mut self, name: &str) -> Result<(), ManagerError> {
        self.state.profile.set_method(name)?;
        Ok(())
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        formula_names()
    }

    // Calories

    /// Per-entry and total calories for the active day.
    pub fn day_summary(&self) -> DaySummary {
        let mut entries = Vec::new();
        let mut unmatched = Vec::new();
        let mut consumed = 0.0;

        for (name, &servings) in self.state.log.consumed() {
            let calories = match self.catalog.calories_per_serving(name) {
                Ok(per_serving) => Some(per_serving * servings),
                Err(e) => {
                    tracing::warn!("Logged food '{}' contributes no calories: {}", name, e);
                    unmatched.push(name.clone());
                    None
                }
            };
            consumed += calories.unwrap_or(0.0);
            entries.push(LoggedFood {
                name: name.clone(),
                servings,
                calories,
            });
        }

        let target = self.target_calories();
        DaySummary {
            date: self.state.log.date,
            entries,
            consumed,
            target,
            remaining: target - consumed,
            unmatched,
        }
    }

    /// Daily target from the profile's formula and the day's metrics.
    pub fn target_calories(&self) -> f64 {
        self.state
            .profile
            .target_calories_for(&self.state.log.metrics)
    }

    // History

    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(&mut self.state)
    }

    pub fn history(&self) -> Vec<String> {
        self.history.history_descriptions()
    }

    /// Undone edits, next to redo last.
    pub fn redo_history(&self) -> Vec<String> {
        self.history.redo_descriptions()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn manager() -> DietManager {
        let mut manager = DietManager::new(day(1));
        manager
            .add_basic_food("Banana", &["fruit", "yellow"], 100.0)
            .unwrap();
        manager.add_basic_food("Milk", &["dairy"], 60.0).unwrap();
        manager
    }

    #[test]
    fn test_smoothie_tracks_component_edits() {
        let mut manager = manager();
        manager
            .add_composite_food("Smoothie", &["drink"], &[("Banana".into(), 2.0)])
            .unwrap();
        assert_eq!(manager.food_calories("Smoothie").unwrap(), 200.0);

        manager.set_food_calories("Banana", 120.0).unwrap();
        assert_eq!(manager.food_calories("Smoothie").unwrap(), 240.0);
    }

    #[test]
    fn test_composite_with_unknown_component_adds_nothing() {
        let mut manager = manager();
        let result = manager.add_composite_food(
            "Bowl",
            &["meal"],
            &[("Banana".into(), 1.0), ("Granola".into(), 1.0)],
        );

        assert!(matches!(
            result,
            Err(ManagerError::Catalog(CatalogError::MissingComponent(_)))
        ));
        assert!(manager.find_food("Bowl").is_none());
        assert_eq!(manager.catalog().len(), 2);
    }

    #[test]
    fn test_duplicate_food_rejected() {
        let mut manager = manager();
        assert!(manager.add_basic_food("X", &["a"], 1.0).is_ok());
        assert!(manager.add_basic_food("X", &["b"], 2.0).is_err());

        let matches = manager
            .catalog()
            .foods()
            .iter()
            .filter(|f| f.name() == "X")
            .count();
        assert_eq!(matches, 1);
    }

    #[test]
    fn test_remove_then_undo_restores_servings() {
        let mut manager = manager();
        manager.log_food("Banana", 2.0).unwrap();

        assert!(manager.remove_logged_food("Banana"));
        assert_eq!(manager.daily_log().servings("Banana"), None);

        assert_eq!(manager.undo(), Some("Remove Banana".to_string()));
        assert_eq!(manager.daily_log().servings("Banana"), Some(2.0));
    }

    #[test]
    fn test_log_food_rejects_bad_servings() {
        let mut manager = manager();
        for servings in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                manager.log_food("Banana", servings),
                Err(ManagerError::InvalidServings(_))
            ));
        }
        assert!(manager.daily_log().is_empty());
        assert!(!manager.can_undo());
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut manager = manager();
        manager.log_food("Banana", 1.0).unwrap();
        manager.undo();
        assert!(manager.can_redo());

        assert_eq!(manager.redo_history(), vec!["Add 1 serving(s) of Banana"]);

        manager.log_food("Milk", 1.0).unwrap();
        assert!(!manager.can_redo());
        assert!(manager.redo_history().is_empty());
        assert_eq!(manager.redo(), None);
    }

    #[test]
    fn test_update_profile_validation_and_undo() {
        let mut manager = manager();
        let before = manager.daily_log().clone();

        assert!(matches!(
            manager.update_profile("robot", 180.0, 80.0, 40, "light"),
            Err(ManagerError::Validation(ProfileError::InvalidGender(_)))
        ));
        assert!(!manager.can_undo());

        manager
            .update_profile("female", 160.0, 55.0, 35, "active")
            .unwrap();
        assert_eq!(manager.profile().metrics.weight_kg, 55.0);
        assert_eq!(manager.daily_log().metrics.weight_kg, 55.0);
        assert_eq!(
            manager.history(),
            vec!["Update profile: female, 160cm, 55kg, 35y, active"]
        );

        manager.undo();
        assert_eq!(manager.profile().metrics, BodyMetrics::default());
        assert_eq!(manager.daily_log(), &before);
    }

    #[test]
    fn test_day_summary_reports_unmatched_foods() {
        let mut manager = manager();
        manager.log_food("Banana", 2.0).unwrap();
        manager.log_food("Mystery Stew", 1.0).unwrap();

        let summary = manager.day_summary();
        assert_eq!(summary.consumed, 200.0);
        assert_eq!(summary.unmatched, vec!["Mystery Stew"]);
        assert_eq!(summary.target, 2591.0);
        assert_eq!(summary.remaining, 2391.0);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[0].calories, Some(200.0));
        assert_eq!(summary.entries[1].calories, None);
    }

    #[test]
    fn test_calculation_method() {
        let mut manager = manager();
        assert!(manager.set_calculation_method("Unknown").is_err());
        assert_eq!(manager.profile().method(), "Harris-Benedict");

        manager.set_calculation_method("Mifflin-St Jeor").unwrap();
        assert_eq!(manager.profile().method(), "Mifflin-St Jeor");
        assert_eq!(manager.method_names().len(), 2);
    }

    #[test]
    fn test_set_date_files_current_day_and_clears_history() {
        let mut manager = manager();
        manager.log_food("Banana", 1.0).unwrap();

        manager.set_date(day(2));
        assert_eq!(manager.date(), day(2));
        assert!(manager.daily_log().is_empty());
        assert!(!manager.can_undo());

        manager.log_food("Milk", 2.0).unwrap();
        manager.set_date(day(1));
        assert_eq!(manager.daily_log().servings("Banana"), Some(1.0));
        assert_eq!(
            manager.log_book().get(day(2)).unwrap().servings("Milk"),
            Some(2.0)
        );
    }

    #[test]
    fn test_undo_profile_update_on_older_day_keeps_its_snapshot() {
        let mut manager = manager();
        manager.log_food("Banana", 1.0).unwrap();
        manager.set_date(day(2));
        manager
            .update_profile("female", 160.0, 55.0, 40, "light")
            .unwrap();
        manager.log_food("Milk", 1.0).unwrap();
        manager.set_date(day(1));
        assert_eq!(manager.daily_log().metrics, BodyMetrics::default());
        assert_ne!(manager.profile().metrics, BodyMetrics::default());

        let log_before = manager.daily_log().clone();
        let profile_before = manager.profile().clone();

        manager
            .update_profile("male", 190.0, 95.0, 25, "active")
            .unwrap();
        manager.undo();

        assert_eq!(manager.daily_log(), &log_before);
        assert_eq!(manager.profile(), &profile_before);
        assert_eq!(manager.target_calories(), 2591.0);
    }

    #[test]
    fn test_open_replaces_invalid_saved_metrics() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path());

        let mut profile = Profile::default();
        profile.metrics.weight_kg = -70.0;
        store.write_json(DataFile::Profile, &profile).unwrap();

        let mut bad = BodyMetrics::default();
        bad.height_cm = 0.0;
        let mut log = DailyLog::new(day(2), bad);
        log.add("Banana", 1.0);
        let mut book = LogBook::new();
        book.store(log);
        store.write_json(DataFile::Logs, &book).unwrap();

        let (mut manager, _) = DietManager::open(&store, day(1), DEFAULT_METHOD, 10).unwrap();
        assert_eq!(manager.profile().metrics, BodyMetrics::default());
        assert!(manager.target_calories() > 0.0);

        manager.set_date(day(2));
        assert_eq!(manager.daily_log().metrics, BodyMetrics::default());
        assert_eq!(manager.daily_log().servings("Banana"), Some(1.0));
    }

    #[test]
    fn test_open_skips_non_utf8_food_line() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path());
        std::fs::write(
            store.path(DataFile::Foods),
            b"BASIC|Banana|fruit|100\nBASIC|Caf\xe9|drink|5\nBASIC|Milk|dairy|60\n",
        )
        .unwrap();

        let (manager, report) = DietManager::open(&store, day(1), DEFAULT_METHOD, 10).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(manager.catalog().len(), 2);
        assert_eq!(manager.food_calories("Milk").unwrap(), 60.0);
    }

    #[test]
    fn test_save_and_open_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path());

        let mut manager = manager();
        manager
            .add_composite_food(
                "Smoothie",
                &["drink"],
                &[("Banana".into(), 2.0), ("Milk".into(), 1.0)],
            )
            .unwrap();
        manager.log_food("Smoothie", 1.5).unwrap();
        manager
            .update_profile("female", 165.0, 60.0, 28, "sedentary")
            .unwrap();
        manager.set_calculation_method("Mifflin-St Jeor").unwrap();
        manager.save(&store).unwrap();
        assert!(!manager.catalog().is_dirty());

        let (reopened, report) = DietManager::open(&store, day(1), DEFAULT_METHOD, 10).unwrap();
        assert!(report.is_clean());
        assert_eq!(reopened.food_calories("Smoothie").unwrap(), 260.0);
        assert_eq!(reopened.daily_log().servings("Smoothie"), Some(1.5));
        assert_eq!(reopened.profile(), manager.profile());
        assert_eq!(reopened.day_summary(), manager.day_summary());
        assert!(!reopened.can_undo());
    }

    #[test]
    fn test_open_empty_store_uses_default_method() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path().join("missing"));

        let (manager, report) =
            DietManager::open(&store, day(3), "Mifflin-St Jeor", 10).unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(manager.catalog().is_empty());
        assert_eq!(manager.date(), day(3));
        assert_eq!(manager.profile().method(), "Mifflin-St Jeor");
    }

    #[test]
    fn test_open_rejects_unknown_default_method() {
        let temp = TempDir::new().unwrap();
        let store = DataStore::new(temp.path());

        let result = DietManager::open(&store, day(1), "Guesswork", 10);
        assert!(matches!(
            result,
            Err(ManagerError::Validation(ProfileError::UnknownMethod(_)))
        ));
    }
}
