//! Workout volume: sets x reps x weight per row, summed per calendar day.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::DataError;
use crate::frame::Frame;

pub const SETS_COLUMN: &str = "Sets";
pub const REPS_COLUMN: &str = "Reps";
pub const WEIGHT_COLUMN: &str = "Weight (kg)";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub total: f64,
}

/// Volume of one row, or `None` when any factor is missing or the product
/// overflows.
pub fn row_volume(sets: Option<f64>, reps: Option<f64>, weight: Option<f64>) -> Option<f64> {
    Some(sets? * reps? * weight?).filter(|v| v.is_finite())
}

/// Total volume per day in ascending date order.
///
/// Rows with a non-numeric factor contribute nothing, so a day made only of
/// such rows totals zero. A row that would push the day's total past the
/// largest finite value is left out as well.
pub fn daily_volume(frame: &Frame) -> Result<Vec<DailyVolume>, DataError> {
    let sets = frame.numeric(SETS_COLUMN)?;
    let reps = frame.numeric(REPS_COLUMN)?;
    let weights = frame.numeric(WEIGHT_COLUMN)?;

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (i, row) in frame.rows().iter().enumerate() {
        let total = by_day.entry(row.date).or_insert(0.0);
        if let Some(volume) = row_volume(sets[i], reps[i], weights[i]) {
            let sum = *total + volume;
            if sum.is_finite() {
                *total = sum;
            }
        }
    }

    Ok(by_day
        .into_iter()
        .map(|(date, total)| DailyVolume { date, total })
        .collect())
}
