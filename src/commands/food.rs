use clap::{Args, Subcommand};
use serde::Serialize;
use yada_core::{Component, DietManager, Food};

use super::{format_calories, Changed, OutputFormat};

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// List all foods in the catalog
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search foods by keyword (substring, case-insensitive)
    Search {
        /// Keywords to look for
        #[arg(required = true)]
        terms: Vec<String>,

        /// Match foods with any keyword instead of all of them
        #[arg(long)]
        any: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one food and its calories
    Show {
        /// Food name
        name: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a basic food
    Add {
        /// Food name
        name: String,

        /// Calories per serving
        #[arg(long)]
        calories: f64,

        /// Comma-separated keywords
        #[arg(long, short, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Add a composite food made of other foods
    Compose {
        /// Food name
        name: String,

        /// Component as NAME:SERVINGS (can be repeated)
        #[arg(long = "component", value_name = "NAME:SERVINGS", required = true)]
        components: Vec<String>,

        /// Comma-separated keywords
        #[arg(long, short, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Add a component to an existing composite food
    AddComponent {
        /// Composite food name
        composite: String,

        /// Component food name
        component: String,

        /// Servings of the component
        #[arg(long, default_value_t = 1.0)]
        servings: f64,
    },

    /// Change the calories of a basic food
    SetCalories {
        /// Food name
        name: String,

        /// New calories per serving
        calories: f64,
    },
}

/// A food as shown to the user, with its computed calories.
#[derive(Serialize)]
struct FoodView<'a> {
    name: &'a str,
    kind: &'static str,
    keywords: &'a [String],
    calories: Option<f64>,
    components: &'a [Component],
}

impl<'a> FoodView<'a> {
    fn new(food: &'a Food, manager: &DietManager) -> Self {
        Self {
            name: food.name(),
            kind: if food.is_composite() { "composite" } else { "basic" },
            keywords: food.keywords(),
            calories: manager.food_calories(food.name()).ok(),
            components: food.components(),
        }
    }
}

impl FoodCommand {
    pub fn apply(&self, manager: &mut DietManager) -> Result<Changed, Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::List { format } => {
                let foods: Vec<&Food> = manager.catalog().foods().iter().collect();
                print_foods(&foods, manager, format)?;
                Ok(false)
            }
            FoodSubcommand::Search {
                terms,
                any,
                format,
            } => {
                let foods = manager.find_foods(terms, !any);
                print_foods(&foods, manager, format)?;
                Ok(false)
            }
            FoodSubcommand::Show { name, format } => {
                let food = manager
                    .find_food(name)
                    .ok_or_else(|| format!("Food not found: {}", name))?;
                let view = FoodView::new(food, manager);
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                    OutputFormat::Text => print_food_details(&view),
                }
                Ok(false)
            }
            FoodSubcommand::Add {
                name,
                calories,
                keywords,
            } => {
                manager.add_basic_food(name, keywords, *calories)?;
                println!("Added food '{}' ({} kcal)", name, format_calories(*calories));
                Ok(true)
            }
            FoodSubcommand::Compose {
                name,
                components,
                keywords,
            } => {
                let components = components
                    .iter()
                    .map(|c| parse_component(c))
                    .collect::<Result<Vec<_>, _>>()?;
                manager.add_composite_food(name, keywords, &components)?;
                let calories = manager.food_calories(name)?;
                println!(
                    "Added composite food '{}' ({} kcal)",
                    name,
                    format_calories(calories)
                );
                Ok(true)
            }
            FoodSubcommand::AddComponent {
                composite,
                component,
                servings,
            } => {
                manager.add_component(composite, component, *servings)?;
                println!(
                    "Added {} x {} to '{}' (now {} kcal)",
                    servings,
                    component,
                    composite,
                    format_calories(manager.food_calories(composite)?)
                );
                Ok(true)
            }
            FoodSubcommand::SetCalories { name, calories } => {
                manager.set_food_calories(name, *calories)?;
                println!("Set '{}' to {} kcal", name, format_calories(*calories));
                Ok(true)
            }
        }
    }
}

/// Parse a NAME:SERVINGS component argument. The last ':' separates the
/// servings, so names may contain colons.
fn parse_component(arg: &str) -> Result<(String, f64), String> {
    let (name, servings) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid component '{}'. Use NAME:SERVINGS.", arg))?;
    let servings: f64 = servings
        .trim()
        .parse()
        .map_err(|_| format!("Invalid servings in component '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid component '{}'. Use NAME:SERVINGS.", arg));
    }
    Ok((name.to_string(), servings))
}

fn print_foods(
    foods: &[&Food],
    manager: &DietManager,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let views: Vec<FoodView> = foods.iter().map(|f| FoodView::new(f, manager)).collect();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        OutputFormat::Text => {
            if views.is_empty() {
                println!("No foods found.");
                return Ok(());
            }
            println!("{:<30} {:<10} {:>8}  KEYWORDS", "NAME", "TYPE", "KCAL");
            println!("{}", "-".repeat(70));
            for view in &views {
                println!(
                    "{:<30} {:<10} {:>8}  {}",
                    truncate(view.name, 30),
                    view.kind,
                    view.calories.map(format_calories).unwrap_or_else(|| "?".into()),
                    view.keywords.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn print_food_details(view: &FoodView) {
    println!("{}", view.name);
    println!("{}", "=".repeat(view.name.len().max(10)));
    println!("Type:     {}", view.kind);
    match view.calories {
        Some(kcal) => println!("Calories: {} kcal/serving", format_calories(kcal)),
        None => println!("Calories: unknown"),
    }
    if !view.keywords.is_empty() {
        println!("Keywords: {}", view.keywords.join(", "));
    }
    if !view.components.is_empty() {
        println!("Components:");
        for component in view.components {
            println!("  - {}", component);
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_component() {
        assert_eq!(parse_component("Banana:2").unwrap(), ("Banana".to_string(), 2.0));
        assert_eq!(
            parse_component("Soup: Tomato:0.5").unwrap(),
            ("Soup: Tomato".to_string(), 0.5)
        );
    }

    #[test]
    fn test_parse_component_invalid() {
        assert!(parse_component("Banana").is_err());
        assert!(parse_component("Banana:lots").is_err());
        assert!(parse_component(":2").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 30), "Short");
        assert_eq!(truncate("A very long food name indeed", 10), "A very ...");
    }

    #[test]
    fn test_food_view_of_composite() {
        let mut manager = DietManager::new(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        manager.add_basic_food("Banana", &["fruit"], 100.0).unwrap();
        manager
            .add_composite_food("Smoothie", &["drink"], &[("Banana".into(), 2.0)])
            .unwrap();

        let food = manager.find_food("Smoothie").unwrap();
        let view = FoodView::new(food, &manager);
        assert_eq!(view.kind, "composite");
        assert_eq!(view.calories, Some(200.0));
        assert_eq!(view.components.len(), 1);
    }
}
