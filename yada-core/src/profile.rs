//! User profile and daily calorie target formulas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Profile validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Gender must be 'male' or 'female', got '{0}'")]
    InvalidGender(String),

    #[error(
        "Invalid activity level '{0}'. Use sedentary, light, moderate, active, or very active"
    )]
    InvalidActivityLevel(String),

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("Unknown calorie calculation method: {0}")]
    UnknownMethod(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Gender {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ProfileError::InvalidGender(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier applied to basal metabolic rate.
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very active",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ActivityLevel {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" | "high" => Ok(ActivityLevel::Active),
            "very active" | "very high" => Ok(ActivityLevel::VeryActive),
            _ => Err(ProfileError::InvalidActivityLevel(s.to_string())),
        }
    }
}

/// The body measurements a calorie formula needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BodyMetrics {
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub activity_level: ActivityLevel,
}

impl BodyMetrics {
    /// Validated constructor.
    pub fn new(
        gender: Gender,
        height_cm: f64,
        weight_kg: f64,
        age: u32,
        activity_level: ActivityLevel,
    ) -> Result<Self, ProfileError> {
        let metrics = Self {
            gender,
            height_cm,
            weight_kg,
            age,
            activity_level,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// Checks the numeric fields. Deserialized metrics skip [`BodyMetrics::new`],
    /// so loaders call this directly.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.height_cm.is_finite() || self.height_cm <= 0.0 {
            return Err(ProfileError::NonPositive("Height"));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(ProfileError::NonPositive("Weight"));
        }
        if self.age == 0 {
            return Err(ProfileError::NonPositive("Age"));
        }
        Ok(())
    }

    /// Parses and validates the five fields from user input.
    pub fn parse(
        gender: &str,
        height_cm: f64,
        weight_kg: f64,
        age: i64,
        activity_level: &str,
    ) -> Result<Self, ProfileError> {
        let gender = gender.parse()?;
        let activity_level = activity_level.parse()?;
        let age = u32::try_from(age)
            .ok()
            .filter(|a| *a > 0)
            .ok_or(ProfileError::NonPositive("Age"))?;
        Self::new(gender, height_cm, weight_kg, age, activity_level)
    }
}

impl Default for BodyMetrics {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            height_cm: 170.0,
            weight_kg: 70.0,
            age: 30,
            activity_level: ActivityLevel::Moderate,
        }
    }
}

impl fmt::Display for BodyMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}cm, {}kg, {}y, {}",
            self.gender, self.height_cm, self.weight_kg, self.age, self.activity_level
        )
    }
}

/// A named formula turning body metrics into a daily calorie target.
pub trait CalorieFormula: Sync {
    fn name(&self) -> &'static str;
    fn daily_calories(&self, metrics: &BodyMetrics) -> f64;
}

pub struct HarrisBenedict;

impl CalorieFormula for HarrisBenedict {
    fn name(&self) -> &'static str {
        "Harris-Benedict"
    }

    fn daily_calories(&self, m: &BodyMetrics) -> f64 {
        let age = f64::from(m.age);
        let bmr = match m.gender {
            Gender::Male => 88.362 + 13.397 * m.weight_kg + 4.799 * m.height_cm - 5.677 * age,
            Gender::Female => 447.593 + 9.247 * m.weight_kg + 3.098 * m.height_cm - 4.330 * age,
        };
        (bmr * m.activity_level.multiplier()).round()
    }
}

pub struct MifflinStJeor;

impl CalorieFormula for MifflinStJeor {
    fn name(&self) -> &'static str {
        "Mifflin-St Jeor"
    }

    fn daily_calories(&self, m: &BodyMetrics) -> f64 {
        let base = 10.0 * m.weight_kg + 6.25 * m.height_cm - 5.0 * f64::from(m.age);
        let bmr = match m.gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
        };
        (bmr * m.activity_level.multiplier()).round()
    }
}

static FORMULAS: [&dyn CalorieFormula; 2] = [&HarrisBenedict, &MifflinStJeor];

pub const DEFAULT_METHOD: &str = "Harris-Benedict";

/// Looks up a formula by its exact name.
pub fn formula_by_name(name: &str) -> Option<&'static dyn CalorieFormula> {
    FORMULAS.iter().copied().find(|f| f.name() == name)
}

/// Names of all available formulas, in registry order.
pub fn formula_names() -> Vec<&'static str> {
    FORMULAS.iter().map(|f| f.name()).collect()
}

/// The user's current metrics and chosen calorie formula.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub metrics: BodyMetrics,
    method: String,
}

impl Profile {
    pub fn new(metrics: BodyMetrics) -> Self {
        Self {
            metrics,
            method: DEFAULT_METHOD.to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Selects the calorie formula by exact name.
    pub fn set_method(&mut self, name: &str) -> Result<(), ProfileError> {
        if formula_by_name(name).is_none() {
            return Err(ProfileError::UnknownMethod(name.to_string()));
        }
        self.method = name.to_string();
        Ok(())
    }

    fn formula(&self) -> &'static dyn CalorieFormula {
        formula_by_name(&self.method).unwrap_or(&HarrisBenedict)
    }

    /// Daily target for the profile's own metrics.
    pub fn target_calories(&self) -> f64 {
        self.target_calories_for(&self.metrics)
    }

    /// Daily target for other metrics (e.g. a day's snapshot) using this
    /// profile's formula.
    pub fn target_calories_for(&self, metrics: &BodyMetrics) -> f64 {
        self.formula().daily_calories(metrics)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(BodyMetrics::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gender_case_insensitive() {
        assert_eq!("Male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("FEMALE".parse::<Gender>(), Ok(Gender::Female));
        assert!(matches!(
            "other".parse::<Gender>(),
            Err(ProfileError::InvalidGender(_))
        ));
    }

    #[test]
    fn test_parse_activity_aliases() {
        assert_eq!("High".parse::<ActivityLevel>(), Ok(ActivityLevel::Active));
        assert_eq!("very high".parse::<ActivityLevel>(), Ok(ActivityLevel::VeryActive));
        assert_eq!("very_active".parse::<ActivityLevel>(), Ok(ActivityLevel::VeryActive));
        assert_eq!("Sedentary".parse::<ActivityLevel>(), Ok(ActivityLevel::Sedentary));
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_metrics_validation() {
        assert_eq!(
            BodyMetrics::parse("male", 0.0, 70.0, 30, "light"),
            Err(ProfileError::NonPositive("Height"))
        );
        assert_eq!(
            BodyMetrics::parse("male", 180.0, -1.0, 30, "light"),
            Err(ProfileError::NonPositive("Weight"))
        );
        assert_eq!(
            BodyMetrics::parse("male", 180.0, 80.0, 0, "light"),
            Err(ProfileError::NonPositive("Age"))
        );
        assert_eq!(
            BodyMetrics::parse("male", 180.0, 80.0, -4, "light"),
            Err(ProfileError::NonPositive("Age"))
        );
        assert!(BodyMetrics::parse("female", 165.0, 60.0, 28, "moderate").is_ok());
    }

    #[test]
    fn test_deserialized_metrics_can_be_invalid() {
        let json = r#"{"gender":"male","height_cm":180.0,"weight_kg":-70.0,"age":30,"activity_level":"light"}"#;
        let metrics: BodyMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.validate(), Err(ProfileError::NonPositive("Weight")));
        assert!(BodyMetrics::default().validate().is_ok());
    }

    #[test]
    fn test_harris_benedict() {
        // 88.362 + 13.397*70 + 4.799*170 - 5.677*30 = 1671.672; * 1.55
        let metrics = BodyMetrics::default();
        assert_eq!(HarrisBenedict.daily_calories(&metrics), 2591.0);
    }

    #[test]
    fn test_mifflin_st_jeor() {
        // 10*60 + 6.25*165 - 5*28 - 161 = 1330.25; * 1.2
        let metrics = BodyMetrics::parse("female", 165.0, 60.0, 28, "sedentary").unwrap();
        assert_eq!(MifflinStJeor.daily_calories(&metrics), 1596.0);
    }

    #[test]
    fn test_method_selection() {
        let mut profile = Profile::default();
        assert_eq!(profile.method(), "Harris-Benedict");

        profile.set_method("Mifflin-St Jeor").unwrap();
        assert_eq!(profile.method(), "Mifflin-St Jeor");
        assert_eq!(
            profile.target_calories(),
            MifflinStJeor.daily_calories(&profile.metrics)
        );

        assert_eq!(
            profile.set_method("mifflin-st jeor"),
            Err(ProfileError::UnknownMethod("mifflin-st jeor".into()))
        );
        assert_eq!(profile.method(), "Mifflin-St Jeor");
    }

    #[test]
    fn test_formula_names() {
        assert_eq!(formula_names(), vec!["Harris-Benedict", "Mifflin-St Jeor"]);
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let mut profile = Profile::default();
        profile.set_method("Mifflin-St Jeor").unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }
}
