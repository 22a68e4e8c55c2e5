//! Daily totals, macro split and calorie progress.

use serde::Serialize;

use crate::day::DayBoundary;
use crate::error::ShredError;
use crate::models::{FoodLog, MealType};

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const CARBS_KCAL_PER_G: f64 = 4.0;
pub const FAT_KCAL_PER_G: f64 = 9.0;

const NEAR_TARGET_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DailyTotals {
    /// Sum logs that the caller has already restricted to one day.
    #[must_use]
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a FoodLog>) -> Self {
        logs.into_iter().fold(Self::default(), |mut acc, log| {
            acc.calories = acc.calories.saturating_add(log.total_calories());
            acc.protein += log.protein();
            acc.carbs += log.carbs();
            acc.fat += log.fat();
            acc
        })
    }

    #[must_use]
    pub fn macro_percentages(&self) -> MacroPercentages {
        MacroPercentages::from_grams(self.protein, self.carbs, self.fat)
    }
}

/// Logs from an unfiltered collection that fall on `day`.
pub fn logs_for_day<'a>(
    logs: &'a [FoodLog],
    day: chrono::NaiveDate,
    boundary: DayBoundary,
) -> impl Iterator<Item = &'a FoodLog> {
    let range = boundary.range_for(day);
    logs.iter().filter(move |log| range.contains(log.logged_at))
}

/// Share of macro calories, each in 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroPercentages {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroPercentages {
    #[must_use]
    pub fn from_grams(protein: f64, carbs: f64, fat: f64) -> Self {
        let protein_cal = protein * PROTEIN_KCAL_PER_G;
        let carbs_cal = carbs * CARBS_KCAL_PER_G;
        let fat_cal = fat * FAT_KCAL_PER_G;
        let total = protein_cal + carbs_cal + fat_cal;

        if total <= 0.0 || !total.is_finite() {
            return Self::default();
        }

        Self {
            protein: protein_cal / total * 100.0,
            carbs: carbs_cal / total * 100.0,
            fat: fat_cal / total * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieStatus {
    /// Below 70% of target.
    Under,
    /// 70% up to (not including) 100%.
    Near,
    /// At or above target.
    Over,
}

impl CalorieStatus {
    #[must_use]
    pub fn classify(ratio: f64) -> Self {
        if ratio < NEAR_TARGET_RATIO {
            CalorieStatus::Under
        } else if ratio < 1.0 {
            CalorieStatus::Near
        } else {
            CalorieStatus::Over
        }
    }

    /// Indicator colour used by the progress ring.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            CalorieStatus::Under => "green",
            CalorieStatus::Near => "yellow",
            CalorieStatus::Over => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieProgress {
    pub consumed: i64,
    pub target: i64,
    /// Never negative.
    pub remaining: i64,
    pub ratio: f64,
    pub status: CalorieStatus,
}

impl CalorieProgress {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(consumed: i64, target: i64) -> Result<Self, ShredError> {
        if target <= 0 {
            return Err(ShredError::InvalidTarget(target));
        }
        let ratio = consumed as f64 / target as f64;
        Ok(Self {
            consumed,
            target,
            remaining: (target - consumed).max(0),
            ratio,
            status: CalorieStatus::classify(ratio),
        })
    }
}

/// Classify intake against a target; non-positive targets are rejected.
pub fn classify_intake(consumed: i64, target: i64) -> Result<CalorieStatus, ShredError> {
    CalorieProgress::new(consumed, target).map(|p| p.status)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSubtotal {
    pub meal_type: MealType,
    pub items: usize,
    pub calories: i64,
}

/// Per-meal item counts and calories, skipping meals with nothing logged.
#[must_use]
pub fn meal_breakdown(logs: &[FoodLog]) -> Vec<MealSubtotal> {
    MealType::ALL
        .into_iter()
        .filter_map(|meal_type| {
            let meal_logs: Vec<&FoodLog> =
                logs.iter().filter(|l| l.meal_type == meal_type).collect();
            if meal_logs.is_empty() {
                return None;
            }
            Some(MealSubtotal {
                meal_type,
                items: meal_logs.len(),
                calories: meal_logs
                    .iter()
                    .fold(0_i64, |sum, l| sum.saturating_add(l.total_calories())),
            })
        })
        .collect()
}
