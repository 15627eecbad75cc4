use clap::{Args, Subcommand};
use yada_core::{DaySummary, DietManager};

use super::{format_calories, parse_date, Changed, OutputFormat};

#[derive(Args)]
pub struct LogCommand {
    /// Day to work on (YYYY-MM-DD), defaults to the active day
    #[arg(long, short, global = true)]
    pub date: Option<String>,

    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Show the day's log with consumed and remaining calories
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Log servings of a food
    Add {
        /// Food name
        food: String,

        /// Number of servings
        #[arg(long, short, default_value_t = 1.0)]
        servings: f64,
    },

    /// Remove a food from the day's log
    Remove {
        /// Food name
        food: String,
    },

    /// List days that have logged food
    Days,
}

impl LogCommand {
    pub fn apply(&self, manager: &mut DietManager) -> Result<Changed, Box<dyn std::error::Error>> {
        if let Some(date) = &self.date {
            manager.set_date(parse_date(date)?);
        }

        match &self.command {
            LogSubcommand::Show { format } => {
                let summary = manager.day_summary();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    }
                    OutputFormat::Text => print_summary(&summary),
                }
                Ok(false)
            }
            LogSubcommand::Add { food, servings } => {
                manager.log_food(food, *servings)?;
                if manager.find_food(food).is_none() {
                    println!("Warning: '{}' is not in the food catalog", food);
                }
                println!(
                    "Logged {} serving(s) of {} on {}",
                    servings,
                    food,
                    manager.date()
                );
                Ok(true)
            }
            LogSubcommand::Remove { food } => {
                if manager.remove_logged_food(food) {
                    println!("Removed {} from {}", food, manager.date());
                    Ok(true)
                } else {
                    println!("'{}' is not logged on {}", food, manager.date());
                    Ok(false)
                }
            }
            LogSubcommand::Days => {
                let mut days: Vec<_> = manager.log_book().dates().collect();
                if !manager.daily_log().is_empty() {
                    days.push(manager.date());
                    days.sort();
                }
                if days.is_empty() {
                    println!("No days logged yet.");
                }
                for day in days {
                    println!("{}", day.format("%Y-%m-%d (%a)"));
                }
                Ok(false)
            }
        }
    }
}

fn print_summary(summary: &DaySummary) {
    println!("Log for {}", summary.date.format("%a, %b %d, %Y"));
    println!("{}", "=".repeat(44));

    if summary.entries.is_empty() {
        println!("Nothing logged.");
    } else {
        for entry in &summary.entries {
            let calories = entry
                .calories
                .map(|kcal| format!("{} kcal", format_calories(kcal)))
                .unwrap_or_else(|| "unknown food".to_string());
            println!(
                "  {:<28} {:>5} x  {:>10}",
                entry.name, entry.servings, calories
            );
        }
    }

    println!("{}", "-".repeat(44));
    println!("Consumed:  {:>8} kcal", format_calories(summary.consumed));
    println!("Target:    {:>8} kcal", format_calories(summary.target));
    println!("Remaining: {:>8} kcal", format_calories(summary.remaining));

    if !summary.unmatched.is_empty() {
        println!();
        println!(
            "Not counted (missing from catalog): {}",
            summary.unmatched.join(", ")
        );
    }
}
