//! Raw form inputs and their range checks
//!
//! The estimator trusts its inputs; everything a user types goes through
//! [`PatientProfile::validate`] first.

use crate::error::AppError;
use crate::lifestyle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const AGE_RANGE: RangeInclusive<u32> = 30..=100;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=250.0;
pub const EXERCISE_DAYS_RANGE: RangeInclusive<u32> = 0..=7;
pub const FRUIT_VEG_RANGE: RangeInclusive<u32> = 0..=10;
pub const SLEEP_HOURS_RANGE: RangeInclusive<f64> = 0.0..=24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{}': expected male, female or other", other)),
        }
    }
}

/// Everything the intake form collects about one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub region: String,
    pub chronic_conditions: Vec<String>,
    pub family_history: Vec<String>,
    pub smoker: bool,
    pub alcohol: bool,
    pub exercise_days: u32,
    pub fruit_veg_portions: u32,
    pub sleep_hours: f64,
    pub has_insurance: bool,
}

impl PatientProfile {
    /// Range-check every field, naming the first one that is out of bounds
    pub fn validate(&self) -> Result<(), AppError> {
        check_range("age", self.age, &AGE_RANGE)?;
        check_range("height_cm", self.height_cm, &HEIGHT_RANGE_CM)?;
        check_range("weight_kg", self.weight_kg, &WEIGHT_RANGE_KG)?;
        check_range("exercise_days", self.exercise_days, &EXERCISE_DAYS_RANGE)?;
        check_range("fruit_veg_portions", self.fruit_veg_portions, &FRUIT_VEG_RANGE)?;
        check_range("sleep_hours", self.sleep_hours, &SLEEP_HOURS_RANGE)?;

        if self.region.trim().is_empty() {
            return Err(AppError::InvalidInput("region cannot be empty".to_string()));
        }

        Ok(())
    }

    pub fn lifestyle_score(&self) -> u8 {
        lifestyle::score(self.exercise_days, self.fruit_veg_portions, self.sleep_hours)
    }

    /// Body mass index, kg/m²
    pub fn bmi(&self) -> f64 {
        let meters = self.height_cm / 100.0;
        self.weight_kg / (meters * meters)
    }
}

fn check_range<T>(field: &str, value: T, range: &RangeInclusive<T>) -> Result<(), AppError>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_profile() -> PatientProfile {
        PatientProfile {
            age: 35,
            gender: Gender::Female,
            height_cm: 170.0,
            weight_kg: 65.0,
            region: "Turkey".to_string(),
            chronic_conditions: vec!["diabetes".to_string()],
            family_history: Vec::new(),
            smoker: false,
            alcohol: false,
            exercise_days: 3,
            fruit_veg_portions: 3,
            sleep_hours: 6.5,
            has_insurance: true,
        }
    }

    #[test]
    fn test_valid_profile() {
        let profile = create_test_profile();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.lifestyle_score(), 6);
    }

    #[test]
    fn test_age_out_of_range() {
        let mut profile = create_test_profile();
        profile.age = 25;

        let err = profile.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: age must be between 30 and 100, got 25"
        );
    }

    #[test]
    fn test_sleep_and_exercise_out_of_range() {
        let mut profile = create_test_profile();
        profile.sleep_hours = 25.0;
        assert!(profile.validate().unwrap_err().to_string().contains("sleep_hours"));

        let mut profile = create_test_profile();
        profile.exercise_days = 8;
        assert!(profile.validate().unwrap_err().to_string().contains("exercise_days"));
    }

    #[test]
    fn test_nan_height_rejected() {
        let mut profile = create_test_profile();
        profile.height_cm = f64::NAN;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_blank_region_rejected() {
        let mut profile = create_test_profile();
        profile.region = "  ".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_bmi() {
        let mut profile = create_test_profile();
        profile.height_cm = 200.0;
        profile.weight_kg = 100.0;
        assert_eq!(profile.bmi(), 25.0);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" diabetes, ,hypertension ,asthma,"),
            vec!["diabetes", "hypertension", "asthma"]
        );
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert!("unknown".parse::<Gender>().is_err());
    }
}
