mod config_cmd;
mod food;
mod log;
mod profile;
mod shell;

pub use config_cmd::ConfigCommand;
pub use food::FoodCommand;
pub use log::LogCommand;
pub use profile::ProfileCommand;
pub use shell::ShellCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use yada_core::{DataFile, DataStore, DietManager};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Whether a command changed data that must be saved.
pub type Changed = bool;

/// Opens the data directory from the config with the log for `date` active.
pub fn open_manager(
    config: &Config,
    date: NaiveDate,
) -> Result<(DietManager, DataStore), Box<dyn std::error::Error>> {
    let store = DataStore::new(config.data_dir.value.clone());
    tracing::debug!(
        "Opening {} ({}) for {}",
        store.data_dir().display(),
        config.data_dir.source,
        date
    );
    let (manager, report) = DietManager::open(
        &store,
        date,
        &config.calorie_method.value,
        config.history_limit.value,
    )?;
    if !report.is_clean() {
        eprintln!(
            "Warning: skipped {} problem(s) in {}",
            report.warnings.len(),
            store.path(DataFile::Foods).display()
        );
    }
    Ok((manager, store))
}

/// Parse a YYYY-MM-DD date or return today.
pub fn parse_date_or_today(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))?)
}

/// Format a calorie amount to at most two decimal places, dropping
/// trailing zeros.
pub fn format_calories(kcal: f64) -> String {
    if kcal.fract() == 0.0 {
        return format!("{}", kcal as i64);
    }
    let fixed = format!("{:.2}", kcal);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
