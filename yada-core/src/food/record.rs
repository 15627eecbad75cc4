//! Pipe-delimited catalog records.
//!
//! ```text
//! BASIC|<name>|<kw1>,<kw2>,...|<calories>
//! COMPOSITE|<name>|<kw1>,<kw2>,...|<count>|<food1>:<servings1>|...
//! ```

use thiserror::Error;

use super::{BasicFood, Component, CompositeFood, Food};

const BASIC_TAG: &str = "BASIC";
const COMPOSITE_TAG: &str = "COMPOSITE";

/// Errors for a single malformed record line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Unknown record type: {0}")]
    UnknownKind(String),

    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Component count mismatch: declared {declared}, found {found}")]
    ComponentCount { declared: usize, found: usize },

    #[error("Invalid number in {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid component '{0}', expected <name>:<servings>")]
    InvalidComponent(String),

    #[error("Food name is empty")]
    EmptyName,

    #[error("Calories must not be negative: {0}")]
    NegativeCalories(f64),

    #[error("Servings must be positive: {0}")]
    NonPositiveServings(f64),

    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
}

/// A parsed record. Composite components are names only; resolving them
/// against a catalog is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    Basic(BasicFood),
    Composite {
        food: CompositeFood,
        components: Vec<Component>,
    },
}

impl Food {
    /// Renders this food as a single catalog record line (no newline).
    pub fn to_record(&self) -> String {
        match self {
            Food::Basic(food) => format!(
                "{}|{}|{}|{}",
                BASIC_TAG,
                food.name,
                food.keywords.join(","),
                food.calories_per_serving
            ),
            Food::Composite(food) => {
                let mut line = format!(
                    "{}|{}|{}|{}",
                    COMPOSITE_TAG,
                    food.name,
                    food.keywords.join(","),
                    food.components.len()
                );
                for component in &food.components {
                    line.push_str(&format!("|{}:{}", component.food, component.servings));
                }
                line
            }
        }
    }
}

/// Parses one record line.
pub fn parse_record(line: &str) -> Result<ParsedRecord, RecordError> {
    let parts: Vec<&str> = line.split('|').collect();

    match parts[0] {
        BASIC_TAG => parse_basic(&parts),
        COMPOSITE_TAG => parse_composite(&parts),
        other => Err(RecordError::UnknownKind(other.to_string())),
    }
}

fn parse_basic(parts: &[&str]) -> Result<ParsedRecord, RecordError> {
    if parts.len() != 4 {
        return Err(RecordError::FieldCount {
            expected: 4,
            found: parts.len(),
        });
    }

    let name = parse_name(parts[1])?;
    let calories = parse_number("calories", parts[3])?;
    if calories < 0.0 {
        return Err(RecordError::NegativeCalories(calories));
    }

    Ok(ParsedRecord::Basic(BasicFood::new(
        name,
        split_keywords(parts[2]),
        calories,
    )))
}

fn parse_composite(parts: &[&str]) -> Result<ParsedRecord, RecordError> {
    if parts.len() < 4 {
        return Err(RecordError::FieldCount {
            expected: 4,
            found: parts.len(),
        });
    }

    let name = parse_name(parts[1])?;
    let declared: usize = parts[3]
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidNumber {
            field: "component count",
            value: parts[3].to_string(),
        })?;

    let fields = &parts[4..];
    if fields.len() != declared {
        return Err(RecordError::ComponentCount {
            declared,
            found: fields.len(),
        });
    }

    let components = fields
        .iter()
        .map(|field| parse_component(field))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedRecord::Composite {
        food: CompositeFood::new(name, split_keywords(parts[2])),
        components,
    })
}

fn parse_component(field: &str) -> Result<Component, RecordError> {
    let (name, servings) = field
        .rsplit_once(':')
        .ok_or_else(|| RecordError::InvalidComponent(field.to_string()))?;
    if name.is_empty() {
        return Err(RecordError::InvalidComponent(field.to_string()));
    }

    let servings = parse_number("servings", servings)?;
    if servings <= 0.0 {
        return Err(RecordError::NonPositiveServings(servings));
    }

    Ok(Component::new(name, servings))
}

fn parse_name(field: &str) -> Result<&str, RecordError> {
    if field.is_empty() {
        Err(RecordError::EmptyName)
    } else {
        Ok(field)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, RecordError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn split_keywords(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').filter(|k| !k.is_empty())
}
