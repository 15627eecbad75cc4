//! Food model: basic foods with a stored calorie value and composite foods
//! whose calories are derived from their components.
//!
//! Composite foods reference their components by name. Resolution happens
//! at read time through a [`FoodLookup`], so an edit to a shared component
//! shows up in every composite that uses it.

mod record;

pub use record::{parse_record, ParsedRecord, RecordError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Read-only name lookup used to resolve composite components.
pub trait FoodLookup {
    fn food(&self, name: &str) -> Option<&Food>;
}

impl FoodLookup for HashMap<String, Food> {
    fn food(&self, name: &str) -> Option<&Food> {
        self.get(name)
    }
}

/// Errors raised while deriving a food's calories.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalorieError {
    #[error("Cycle detected: composite food '{0}' contains itself")]
    Cycle(String),

    #[error("Component food not found: {0}")]
    MissingFood(String),
}

/// A food with a fixed calories-per-serving value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasicFood {
    pub name: String,
    pub keywords: Vec<String>,
    pub calories_per_serving: f64,
}

impl BasicFood {
    pub fn new<I, S>(name: impl Into<String>, keywords: I, calories_per_serving: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keyword_set(keywords),
            calories_per_serving,
        }
    }

    pub fn set_calories_per_serving(&mut self, calories: f64) {
        self.calories_per_serving = calories;
    }
}

/// A by-name reference to another catalog food, with a serving count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub food: String,
    pub servings: f64,
}

impl Component {
    pub fn new(food: impl Into<String>, servings: f64) -> Self {
        Self {
            food: food.into(),
            servings,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.servings, self.food)
    }
}

/// A food made of servings of other foods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositeFood {
    pub name: String,
    pub keywords: Vec<String>,
    pub components: Vec<Component>,
}

impl CompositeFood {
    /// Creates a composite with no components.
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keyword_set(keywords),
            components: Vec::new(),
        }
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    /// Appends a component. Components are never reordered or removed.
    pub fn add_component(&mut self, food: impl Into<String>, servings: f64) {
        self.components.push(Component::new(food, servings));
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Food {
    Basic(BasicFood),
    Composite(CompositeFood),
}

impl Food {
    pub fn name(&self) -> &str {
        match self {
            Food::Basic(food) => &food.name,
            Food::Composite(food) => &food.name,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            Food::Basic(food) => &food.keywords,
            Food::Composite(food) => &food.keywords,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Food::Composite(_))
    }

    /// Direct components; empty for basic foods.
    pub fn components(&self) -> &[Component] {
        match self {
            Food::Basic(_) => &[],
            Food::Composite(food) => &food.components,
        }
    }

    /// Calories in one serving.
    ///
    /// Basic foods return their stored value. Composite foods are recomputed
    /// on every call as the sum of component calories times servings, so the
    /// result always reflects the current state of `foods`.
    pub fn calories_per_serving<L>(&self, foods: &L) -> Result<f64, CalorieError>
    where
        L: FoodLookup + ?Sized,
    {
        let mut path = Vec::new();
        self.calories_on_path(foods, &mut path)
    }

    fn calories_on_path<'a, L>(
        &'a self,
        foods: &'a L,
        path: &mut Vec<&'a str>,
    ) -> Result<f64, CalorieError>
    where
        L: FoodLookup + ?Sized,
    {
        match self {
            Food::Basic(food) => Ok(food.calories_per_serving),
            Food::Composite(food) => {
                if path.contains(&food.name.as_str()) {
                    return Err(CalorieError::Cycle(food.name.clone()));
                }
                path.push(food.name.as_str());

                let mut total = 0.0;
                for component in &food.components {
                    let part = foods
                        .food(&component.food)
                        .ok_or_else(|| CalorieError::MissingFood(component.food.clone()))?;
                    total += part.calories_on_path(foods, path)? * component.servings;
                }

                path.pop();
                Ok(total)
            }
        }
    }

    /// True if every term is contained (case-insensitive) in some keyword.
    /// An empty term list matches.
    pub fn matches_all_keywords<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms.iter().all(|term| self.has_keyword_containing(term.as_ref()))
    }

    /// True if at least one term is contained (case-insensitive) in some
    /// keyword. An empty term list never matches.
    pub fn matches_any_keyword<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms.iter().any(|term| self.has_keyword_containing(term.as_ref()))
    }

    fn has_keyword_containing(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.keywords()
            .iter()
            .any(|keyword| keyword.to_lowercase().contains(&term))
    }
}

impl From<BasicFood> for Food {
    fn from(food: BasicFood) -> Self {
        Food::Basic(food)
    }
}

impl From<CompositeFood> for Food {
    fn from(food: CompositeFood) -> Self {
        Food::Composite(food)
    }
}

/// Normalizes keywords into an ordered set: empty entries dropped,
/// duplicates collapsed with the first occurrence kept.
fn keyword_set<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut set: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.into();
        if !keyword.is_empty() && !set.contains(&keyword) {
            set.push(keyword);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foods(list: Vec<Food>) -> HashMap<String, Food> {
        list.into_iter()
            .map(|food| (food.name().to_string(), food))
            .collect()
    }

    #[test]
    fn test_basic_food_calories() {
        let banana = Food::from(BasicFood::new("Banana", ["fruit", "yellow"], 100.0));
        let lookup = foods(vec![]);
        assert_eq!(banana.calories_per_serving(&lookup), Ok(100.0));
    }

    #[test]
    fn test_keywords_are_an_ordered_set() {
        let food = BasicFood::new("Apple", ["fruit", "", "red", "fruit"], 52.0);
        assert_eq!(food.keywords, vec!["fruit", "red"]);
    }

    #[test]
    fn test_composite_sums_components() {
        let mut catalog = foods(vec![
            BasicFood::new("Banana", ["fruit"], 100.0).into(),
            BasicFood::new("Milk", ["dairy"], 60.0).into(),
        ]);
        let smoothie = Food::from(
            CompositeFood::new("Smoothie", ["drink"])
                .with_components(vec![Component::new("Banana", 2.0), Component::new("Milk", 0.5)]),
        );
        catalog.insert("Smoothie".into(), smoothie.clone());

        assert_eq!(smoothie.calories_per_serving(&catalog), Ok(230.0));
    }

    #[test]
    fn test_composite_tracks_component_edits() {
        let mut catalog = foods(vec![BasicFood::new("Banana", ["fruit"], 100.0).into()]);
        let smoothie = Food::from(
            CompositeFood::new("Smoothie", ["drink"])
                .with_components(vec![Component::new("Banana", 2.0)]),
        );
        assert_eq!(smoothie.calories_per_serving(&catalog), Ok(200.0));

        if let Some(Food::Basic(banana)) = catalog.get_mut("Banana") {
            banana.set_calories_per_serving(120.0);
        }
        assert_eq!(smoothie.calories_per_serving(&catalog), Ok(240.0));
    }

    #[test]
    fn test_nested_composites() {
        let catalog = foods(vec![
            BasicFood::new("Bread", ["grain"], 80.0).into(),
            BasicFood::new("Cheese", ["dairy"], 110.0).into(),
            CompositeFood::new("Toastie", ["hot"])
                .with_components(vec![Component::new("Bread", 2.0), Component::new("Cheese", 1.0)])
                .into(),
            CompositeFood::new("Lunch", ["meal"])
                .with_components(vec![Component::new("Toastie", 1.5)])
                .into(),
        ]);

        let lunch = catalog.get("Lunch").unwrap();
        assert_eq!(lunch.calories_per_serving(&catalog), Ok(405.0));
    }

    #[test]
    fn test_cycle_is_reported_not_looped() {
        let catalog = foods(vec![
            CompositeFood::new("A", ["x"])
                .with_components(vec![Component::new("B", 1.0)])
                .into(),
            CompositeFood::new("B", ["x"])
                .with_components(vec![Component::new("A", 1.0)])
                .into(),
        ]);

        let a = catalog.get("A").unwrap();
        assert_eq!(
            a.calories_per_serving(&catalog),
            Err(CalorieError::Cycle("A".into()))
        );
    }

    #[test]
    fn test_shared_component_is_not_a_cycle() {
        let catalog = foods(vec![
            BasicFood::new("Egg", ["protein"], 70.0).into(),
            CompositeFood::new("Omelette", ["breakfast"])
                .with_components(vec![Component::new("Egg", 2.0)])
                .into(),
            CompositeFood::new("Brunch", ["meal"])
                .with_components(vec![Component::new("Omelette", 1.0), Component::new("Egg", 1.0)])
                .into(),
        ]);

        let brunch = catalog.get("Brunch").unwrap();
        assert_eq!(brunch.calories_per_serving(&catalog), Ok(210.0));
    }

    #[test]
    fn test_missing_component() {
        let catalog = foods(vec![]);
        let stew = Food::from(
            CompositeFood::new("Stew", ["hot"]).with_components(vec![Component::new("Beef", 1.0)]),
        );
        assert_eq!(
            stew.calories_per_serving(&catalog),
            Err(CalorieError::MissingFood("Beef".into()))
        );
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive_substring() {
        let food = Food::from(BasicFood::new("Banana", ["Fruit", "yellow"], 100.0));

        assert!(food.matches_all_keywords(&["fru", "YELL"]));
        assert!(!food.matches_all_keywords(&["fruit", "green"]));
        assert!(food.matches_any_keyword(&["green", "ellow"]));
        assert!(!food.matches_any_keyword(&["green", "red"]));
    }

    #[test]
    fn test_empty_terms() {
        let food = Food::from(BasicFood::new("Banana", ["fruit"], 100.0));
        let none: [&str; 0] = [];

        assert!(food.matches_all_keywords(&none));
        assert!(!food.matches_any_keyword(&none));
    }

    #[test]
    fn test_food_json_has_kind_tag() {
        let food = Food::from(BasicFood::new("Banana", ["fruit"], 100.0));
        let json = serde_json::to_value(&food).unwrap();
        assert_eq!(json["kind"], "basic");
        assert_eq!(json["name"], "Banana");
    }
}
