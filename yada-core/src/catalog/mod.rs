//! The food catalog: owning store of every known food, indexed by name.

mod persist;

pub use persist::{LoadReport, LoadWarning};

use std::collections::{HashMap, HashSet};
use std::io;
use thiserror::Error;

use crate::food::{CalorieError, Food, FoodLookup};

/// Errors from catalog mutations, lookups, and persistence.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("A food named '{0}' already exists")]
    DuplicateName(String),

    #[error("Food not found: {0}")]
    UnknownFood(String),

    #[error("Component food not found: {0}")]
    MissingComponent(String),

    #[error("'{0}' is not a composite food")]
    NotComposite(String),

    #[error("'{0}' is a composite food; its calories are derived from its components")]
    NotBasic(String),

    #[error("Invalid food name '{0}': must be non-empty and must not contain '|' or line breaks")]
    InvalidName(String),

    #[error("Invalid keyword '{0}': must not contain '|', ',' or line breaks")]
    InvalidKeyword(String),

    #[error("Calories must be a non-negative number, got {0}")]
    InvalidCalories(f64),

    #[error("Servings must be a positive number, got {0}")]
    InvalidServings(f64),

    #[error("Adding '{component}' to '{composite}' would make it contain itself")]
    CycleDetected { composite: String, component: String },

    #[error(transparent)]
    Calories(#[from] CalorieError),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Insertion-ordered collection of foods with a unique-name index.
///
/// Every name in `index` points at exactly one entry of `foods` and every
/// entry of `foods` is indexed.
#[derive(Debug, Default)]
pub struct FoodCatalog {
    foods: Vec<Food>,
    index: HashMap<String, usize>,
    dirty: bool,
}

impl FoodCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// All foods in insertion order.
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    /// True when in-memory state differs from the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Adds a new food.
    ///
    /// Fails without touching the catalog if the name is taken, the food is
    /// not representable as a record, or a composite references a food that
    /// is not in the catalog.
    pub fn add_food(&mut self, food: impl Into<Food>) -> Result<(), CatalogError> {
        let food = food.into();
        validate_name(food.name())?;
        for keyword in food.keywords() {
            validate_keyword(keyword)?;
        }
        if self.index.contains_key(food.name()) {
            return Err(CatalogError::DuplicateName(food.name().to_string()));
        }

        match &food {
            Food::Basic(basic) => validate_calories(basic.calories_per_serving)?,
            Food::Composite(composite) => {
                for component in &composite.components {
                    validate_servings(component.servings)?;
                    if !self.index.contains_key(&component.food) {
                        return Err(CatalogError::MissingComponent(component.food.clone()));
                    }
                }
            }
        }

        self.insert(food);
        self.dirty = true;
        Ok(())
    }

    /// Appends a component to an existing composite food.
    pub fn add_component(
        &mut self,
        composite: &str,
        component: &str,
        servings: f64,
    ) -> Result<(), CatalogError> {
        validate_servings(servings)?;
        match self.find_by_name(composite) {
            Some(Food::Composite(_)) => {}
            Some(Food::Basic(_)) => return Err(CatalogError::NotComposite(composite.to_string())),
            None => return Err(CatalogError::UnknownFood(composite.to_string())),
        }
        if !self.index.contains_key(component) {
            return Err(CatalogError::MissingComponent(component.to_string()));
        }
        if self.creates_cycle(composite, component) {
            return Err(CatalogError::CycleDetected {
                composite: composite.to_string(),
                component: component.to_string(),
            });
        }

        if let Food::Composite(food) = self.find_mut(composite)? {
            food.add_component(component, servings);
        }
        self.dirty = true;
        Ok(())
    }

    /// Changes the stored calories of a basic food.
    pub fn set_calories(&mut self, name: &str, calories: f64) -> Result<(), CatalogError> {
        validate_calories(calories)?;
        match self.find_mut(name)? {
            Food::Basic(food) => food.set_calories_per_serving(calories),
            Food::Composite(_) => return Err(CatalogError::NotBasic(name.to_string())),
        }
        self.dirty = true;
        Ok(())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Food> {
        self.index.get(name).map(|&i| &self.foods[i])
    }

    /// Foods matching all (or any) of the terms, in insertion order.
    pub fn find_by_keywords<S: AsRef<str>>(&self, terms: &[S], match_all: bool) -> Vec<&Food> {
        self.foods
            .iter()
            .filter(|food| {
                if match_all {
                    food.matches_all_keywords(terms)
                } else {
                    food.matches_any_keyword(terms)
                }
            })
            .collect()
    }

    /// Current calories per serving of the named food.
    pub fn calories_per_serving(&self, name: &str) -> Result<f64, CatalogError> {
        let food = self
            .find_by_name(name)
            .ok_or_else(|| CatalogError::UnknownFood(name.to_string()))?;
        Ok(food.calories_per_serving(self)?)
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Food, CatalogError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.foods[i]),
            None => Err(CatalogError::UnknownFood(name.to_string())),
        }
    }

    /// Inserts without validation. Returns false for a duplicate name.
    fn insert(&mut self, food: Food) -> bool {
        if self.index.contains_key(food.name()) {
            return false;
        }
        self.index.insert(food.name().to_string(), self.foods.len());
        self.foods.push(food);
        true
    }

    fn clear(&mut self) {
        self.foods.clear();
        self.index.clear();
    }

    /// True if making `component` part of `composite` would close a loop,
    /// i.e. `component` is `composite` or already contains it.
    fn creates_cycle(&self, composite: &str, component: &str) -> bool {
        let mut stack = vec![component];
        let mut seen = HashSet::new();

        while let Some(name) = stack.pop() {
            if name == composite {
                return true;
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(food) = self.find_by_name(name) {
                stack.extend(food.components().iter().map(|c| c.food.as_str()));
            }
        }
        false
    }
}

impl FoodLookup for FoodCatalog {
    fn food(&self, name: &str) -> Option<&Food> {
        self.find_by_name(name)
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.is_empty() || name.contains(['|', '\n', '\r']) {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_keyword(keyword: &str) -> Result<(), CatalogError> {
    if keyword.contains(['|', ',', '\n', '\r']) {
        return Err(CatalogError::InvalidKeyword(keyword.to_string()));
    }
    Ok(())
}

fn validate_calories(calories: f64) -> Result<(), CatalogError> {
    if !calories.is_finite() || calories < 0.0 {
        return Err(CatalogError::InvalidCalories(calories));
    }
    Ok(())
}

fn validate_servings(servings: f64) -> Result<(), CatalogError> {
    if !servings.is_finite() || servings <= 0.0 {
        return Err(CatalogError::InvalidServings(servings));
    }
    Ok(())
}
