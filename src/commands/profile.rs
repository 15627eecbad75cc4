use clap::{Args, Subcommand};
use serde::Serialize;
use yada_core::{BodyMetrics, DietManager};

use super::{format_calories, Changed, OutputFormat};

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show body metrics, calculation method and daily target
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update body metrics (omitted values are kept)
    Set {
        /// male or female
        #[arg(long)]
        gender: Option<String>,

        /// Height in centimeters
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Age in years
        #[arg(long)]
        age: Option<i64>,

        /// sedentary, light, moderate, active, or very active
        #[arg(long)]
        activity: Option<String>,
    },

    /// Select the calorie calculation method by exact name
    Method {
        /// Method name, e.g. "Mifflin-St Jeor"
        name: String,
    },

    /// List available calorie calculation methods
    Methods,
}

#[derive(Serialize)]
struct ProfileView<'a> {
    #[serde(flatten)]
    metrics: &'a BodyMetrics,
    method: &'a str,
    target_calories: f64,
}

impl ProfileCommand {
    pub fn apply(&self, manager: &mut DietManager) -> Result<Changed, Box<dyn std::error::Error>> {
        match &self.command {
            ProfileSubcommand::Show { format } => {
                let profile = manager.profile();
                let view = ProfileView {
                    metrics: &profile.metrics,
                    method: profile.method(),
                    target_calories: profile.target_calories(),
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                    OutputFormat::Text => print_profile(&view),
                }
                Ok(false)
            }
            ProfileSubcommand::Set {
                gender,
                height,
                weight,
                age,
                activity,
            } => {
                let current = manager.profile().metrics;
                let gender = gender
                    .clone()
                    .unwrap_or_else(|| current.gender.to_string());
                let activity = activity
                    .clone()
                    .unwrap_or_else(|| current.activity_level.to_string());
                manager.update_profile(
                    &gender,
                    height.unwrap_or(current.height_cm),
                    weight.unwrap_or(current.weight_kg),
                    age.unwrap_or_else(|| i64::from(current.age)),
                    &activity,
                )?;
                println!("Profile updated: {}", manager.profile().metrics);
                println!(
                    "Daily target: {} kcal",
                    format_calories(manager.profile().target_calories())
                );
                Ok(true)
            }
            ProfileSubcommand::Method { name } => {
                manager.set_calculation_method(name)?;
                println!("Calculation method set to {}", name);
                Ok(true)
            }
            ProfileSubcommand::Methods => {
                let current = manager.profile().method();
                for name in manager.method_names() {
                    let marker = if name == current { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
                Ok(false)
            }
        }
    }
}

fn print_profile(view: &ProfileView) {
    let m = view.metrics;
    println!("Profile");
    println!("=======\n");
    println!("Gender:   {}", m.gender);
    println!("Height:   {} cm", m.height_cm);
    println!("Weight:   {} kg", m.weight_kg);
    println!("Age:      {}", m.age);
    println!("Activity: {}", m.activity_level);
    println!();
    println!("Method:   {}", view.method);
    println!("Target:   {} kcal/day", format_calories(view.target_calories));
}
