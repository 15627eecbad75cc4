//! Per-day consumption logs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::profile::BodyMetrics;

/// What was eaten on one day, plus the body metrics in effect that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    pub date: NaiveDate,
    consumed: BTreeMap<String, f64>,
    pub metrics: BodyMetrics,
}

impl DailyLog {
    pub fn new(date: NaiveDate, metrics: BodyMetrics) -> Self {
        Self {
            date,
            consumed: BTreeMap::new(),
            metrics,
        }
    }

    /// Food name to servings, ordered by name.
    pub fn consumed(&self) -> &BTreeMap<String, f64> {
        &self.consumed
    }

    pub fn servings(&self, food: &str) -> Option<f64> {
        self.consumed.get(food).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Adds servings to a food's entry, creating it if absent.
    /// Non-positive amounts are ignored.
    pub fn add(&mut self, food: &str, servings: f64) {
        if servings <= 0.0 {
            return;
        }
        *self.consumed.entry(food.to_string()).or_insert(0.0) += servings;
    }

    /// Removes a food's entry entirely. Returns true if it existed.
    pub fn remove(&mut self, food: &str) -> bool {
        self.consumed.remove(food).is_some()
    }

    pub fn set_metrics(&mut self, metrics: BodyMetrics) {
        self.metrics = metrics;
    }
}

impl fmt::Display for DailyLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Log for {}", self.date)?;
        writeln!(f, "{}", "=".repeat(22))?;
        if self.consumed.is_empty() {
            writeln!(f, "Nothing logged")?;
        }
        for (food, servings) in &self.consumed {
            writeln!(f, "  - {} x {}", servings, food)?;
        }
        Ok(())
    }
}

/// Every day's log, keyed by date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LogBook {
    days: BTreeMap<NaiveDate, DailyLog>,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.days.get(&date)
    }

    /// Removes and returns the log for `date`, or a fresh one carrying
    /// `metrics` if that day has no log yet.
    pub fn take_or_new(&mut self, date: NaiveDate, metrics: BodyMetrics) -> DailyLog {
        self.days
            .remove(&date)
            .unwrap_or_else(|| DailyLog::new(date, metrics))
    }

    /// Files a log under its date, replacing any previous one.
    pub fn store(&mut self, log: DailyLog) {
        self.days.insert(log.date, log);
    }

    /// Replaces every stored day's metrics that fail validation with
    /// `fallback`. Returns how many days were changed.
    pub fn repair_metrics(&mut self, fallback: BodyMetrics) -> usize {
        let mut repaired = 0;
        for log in self.days.values_mut() {
            if let Err(e) = log.metrics.validate() {
                tracing::warn!("Log for {} has invalid metrics ({}), replacing them", log.date, e);
                log.metrics = fallback;
                repaired += 1;
            }
        }
        repaired
    }

    /// Dates with a stored log, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
