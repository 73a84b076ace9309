//! The two record kinds the dashboard logs, and the forms that produce them.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::sheets::CellValue;

pub const DATE_COLUMN: &str = "Date";

/// Column order of the workout tab.
pub const WORKOUT_COLUMNS: [&str; 5] = ["Date", "Exercise", "Sets", "Reps", "Weight (kg)"];

/// Column order of the body metrics tab.
pub const METRIC_COLUMNS: [&str; 5] = ["Date", "Body Weight", "Body Fat", "Muscle Mass", "Fat Mass"];

/// Why a submitted form was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("{field}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a whole number")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be at least {min}")]
    BelowMinimum { field: &'static str, min: f64 },

    #[error("{field} must be at most {max}")]
    AboveMaximum { field: &'static str, max: f64 },
}

/// One logged exercise: `sets` x `reps` at `weight_kg`.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutEntry {
    pub date: NaiveDate,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
}

impl WorkoutEntry {
    /// The row appended to the workout tab, in [`WORKOUT_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::from(self.date.to_string()),
            CellValue::from(self.exercise.as_str()),
            CellValue::from(self.sets),
            CellValue::from(self.reps),
            CellValue::from(self.weight_kg),
        ]
    }

    pub fn volume(&self) -> f64 {
        f64::from(self.sets) * f64::from(self.reps) * self.weight_kg
    }

    /// Weight keeps at least one decimal place, e.g. `Squat (3x10 @ 60.0kg)`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}x{} @ {:?}kg)",
            self.exercise, self.sets, self.reps, self.weight_kg
        )
    }
}

/// One body-composition measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyMetricEntry {
    pub date: NaiveDate,
    pub body_weight_kg: f64,
    pub body_fat_pct: f64,
    pub muscle_mass_kg: f64,
    pub fat_mass_kg: f64,
}

impl BodyMetricEntry {
    /// The row appended to the metrics tab, in [`METRIC_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::from(self.date.to_string()),
            CellValue::from(self.body_weight_kg),
            CellValue::from(self.body_fat_pct),
            CellValue::from(self.muscle_mass_kg),
            CellValue::from(self.fat_mass_kg),
        ]
    }
}

/// Workout form as posted by the browser; every field arrives as text.
#[derive(Debug, Deserialize)]
pub struct WorkoutForm {
    pub date: String,
    #[serde(default)]
    pub exercise: String,
    pub sets: String,
    pub reps: String,
    pub weight: String,
}

impl TryFrom<WorkoutForm> for WorkoutEntry {
    type Error = EntryError;

    fn try_from(form: WorkoutForm) -> Result<Self, Self::Error> {
        Ok(WorkoutEntry {
            date: parse_form_date("Date", &form.date)?,
            exercise: form.exercise.trim().to_string(),
            sets: parse_count("Sets", &form.sets)?,
            reps: parse_count("Reps", &form.reps)?,
            weight_kg: parse_measure("Weight (kg)", &form.weight, None)?,
        })
    }
}

/// Body metrics form as posted by the browser.
#[derive(Debug, Deserialize)]
pub struct MetricsForm {
    pub date: String,
    pub body_weight: String,
    pub body_fat: String,
    pub muscle_mass: String,
    pub fat_mass: String,
}

impl TryFrom<MetricsForm> for BodyMetricEntry {
    type Error = EntryError;

    fn try_from(form: MetricsForm) -> Result<Self, Self::Error> {
        Ok(BodyMetricEntry {
            date: parse_form_date("Date", &form.date)?,
            body_weight_kg: parse_measure("Body Weight (kg)", &form.body_weight, None)?,
            body_fat_pct: parse_measure("Body Fat (%)", &form.body_fat, Some(100.0))?,
            muscle_mass_kg: parse_measure("Muscle Mass (kg)", &form.muscle_mass, None)?,
            fat_mass_kg: parse_measure("Fat Mass (kg)", &form.fat_mass, None)?,
        })
    }
}

fn parse_form_date(field: &'static str, value: &str) -> Result<NaiveDate, EntryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| EntryError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

// Sets and reps: integers, at least one.
fn parse_count(field: &'static str, value: &str) -> Result<u32, EntryError> {
    let n: i64 = value.trim().parse().map_err(|_| EntryError::NotAnInteger {
        field,
        value: value.to_string(),
    })?;
    if n < 1 {
        return Err(EntryError::BelowMinimum { field, min: 1.0 });
    }
    u32::try_from(n).map_err(|_| EntryError::AboveMaximum {
        field,
        max: f64::from(u32::MAX),
    })
}

// Non-negative finite reals, optionally capped.
fn parse_measure(field: &'static str, value: &str, max: Option<f64>) -> Result<f64, EntryError> {
    let x: f64 = value
        .trim()
        .parse()
        .ok()
        .filter(|x: &f64| x.is_finite())
        .ok_or_else(|| EntryError::NotANumber {
            field,
            value: value.to_string(),
        })?;
    if x < 0.0 {
        return Err(EntryError::BelowMinimum { field, min: 0.0 });
    }
    if let Some(max) = max.filter(|&max| x > max) {
        return Err(EntryError::AboveMaximum { field, max });
    }
    // Turns -0 into 0.
    Ok(x + 0.0)
}
