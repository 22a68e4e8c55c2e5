//! Per-day time series for the progress view, and statistics over them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::day::DayBoundary;
use crate::models::{FoodLog, UnitSystem, WeightLog};
use crate::nutrition::DailyTotals;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    ThreeMonths,
}

impl TimeRange {
    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::ThreeMonths => 90,
        }
    }

    /// Calendar days in the window ending with `today`, oldest first.
    #[must_use]
    pub fn window(self, today: NaiveDate) -> Vec<NaiveDate> {
        (0..i64::from(self.days()))
            .rev()
            .map(|offset| today - Duration::days(offset))
            .collect()
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" | "7" | "7d" => Ok(TimeRange::Week),
            "month" | "30" | "30d" => Ok(TimeRange::Month),
            "3months" | "three-months" | "quarter" | "90" | "90d" => Ok(TimeRange::ThreeMonths),
            _ => bail!("Invalid range '{s}'. Use week, month, or 3months"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Calories,
    Protein,
    Carbs,
    Fat,
    Weight,
}

impl Metric {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::Calories => "Calories",
            Metric::Protein => "Protein",
            Metric::Carbs => "Carbs",
            Metric::Fat => "Fat",
            Metric::Weight => "Weight",
        }
    }

    #[must_use]
    pub fn unit(self, units: UnitSystem) -> &'static str {
        match self {
            Metric::Calories => "kcal",
            Metric::Protein | Metric::Carbs | Metric::Fat => "g",
            Metric::Weight => units::weight_unit(units),
        }
    }

    /// Weight only has points on days something was logged; food metrics
    /// have a point for every day, zero when nothing was eaten.
    #[must_use]
    pub fn is_sparse(self) -> bool {
        matches!(self, Metric::Weight)
    }

    /// The metric's value for a day of food totals. `None` for weight.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn food_value(self, totals: &DailyTotals) -> Option<f64> {
        match self {
            Metric::Calories => Some(totals.calories as f64),
            Metric::Protein => Some(totals.protein),
            Metric::Carbs => Some(totals.carbs),
            Metric::Fat => Some(totals.fat),
            Metric::Weight => None,
        }
    }

    /// Format a value that is already in display units.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn format_value(self, value: f64, units: UnitSystem) -> String {
        match self {
            Metric::Calories => format!("{} kcal", value as i64),
            Metric::Protein | Metric::Carbs | Metric::Fat => format!("{value:.1} g"),
            Metric::Weight => format!("{value:.1} {}", units::weight_unit(units)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "calories" | "kcal" | "cal" => Ok(Metric::Calories),
            "protein" => Ok(Metric::Protein),
            "carbs" | "carbohydrates" => Ok(Metric::Carbs),
            "fat" => Ok(Metric::Fat),
            "weight" => Ok(Metric::Weight),
            _ => bail!("Invalid metric '{s}'. Use calories, protein, carbs, fat, or weight"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Dense per-day series for a food metric: exactly `range.days()` points.
#[must_use]
pub fn food_series(
    logs: &[FoodLog],
    metric: Metric,
    today: NaiveDate,
    range: TimeRange,
    boundary: DayBoundary,
) -> Vec<ProgressPoint> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&FoodLog>> = BTreeMap::new();
    for log in logs {
        by_day
            .entry(boundary.day_of(log.logged_at))
            .or_default()
            .push(log);
    }

    range
        .window(today)
        .into_iter()
        .map(|date| {
            let totals = by_day
                .get(&date)
                .map(|day_logs| DailyTotals::from_logs(day_logs.iter().copied()))
                .unwrap_or_default();
            ProgressPoint {
                date,
                value: metric.food_value(&totals).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Sparse weight series in kg: one point per logged day inside the window,
/// taking the latest entry of that day.
#[must_use]
pub fn weight_series(
    logs: &[WeightLog],
    today: NaiveDate,
    range: TimeRange,
    boundary: DayBoundary,
) -> Vec<ProgressPoint> {
    let window = boundary.range_ending(today, range.days());
    let mut latest: BTreeMap<NaiveDate, &WeightLog> = BTreeMap::new();

    for log in logs.iter().filter(|l| window.contains(l.logged_at)) {
        let day = boundary.day_of(log.logged_at);
        latest
            .entry(day)
            .and_modify(|cur| {
                if (log.logged_at, log.id) > (cur.logged_at, cur.id) {
                    *cur = log;
                }
            })
            .or_insert(log);
    }

    latest
        .into_iter()
        .map(|(date, log)| ProgressPoint {
            date,
            value: log.weight_kg,
        })
        .collect()
}

/// Series for any metric. Weight values stay in canonical kg.
#[must_use]
pub fn bucketize(
    metric: Metric,
    food_logs: &[FoodLog],
    weight_logs: &[WeightLog],
    today: NaiveDate,
    range: TimeRange,
    boundary: DayBoundary,
) -> Vec<ProgressPoint> {
    if metric.is_sparse() {
        weight_series(weight_logs, today, range, boundary)
    } else {
        food_series(food_logs, metric, today, range, boundary)
    }
}

/// Convert a weight series from kg to the user's unit; other metrics pass through.
#[must_use]
pub fn to_display_units(
    metric: Metric,
    points: Vec<ProgressPoint>,
    units: UnitSystem,
) -> Vec<ProgressPoint> {
    if metric != Metric::Weight {
        return points;
    }
    points
        .into_iter()
        .map(|p| ProgressPoint {
            date: p.date,
            value: units::display_weight(p.value, units),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Aggregate {
    /// Sum over the window (food metrics).
    Total(f64),
    /// Last minus first point (weight).
    Change(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub average: Option<f64>,
    pub max: Option<f64>,
    pub aggregate: Option<Aggregate>,
}

impl Statistics {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_series(metric: Metric, points: &[ProgressPoint]) -> Self {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self::default();
        };

        let sum: f64 = points.iter().map(|p| p.value).sum();
        let max = points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let aggregate = if metric.is_sparse() {
            Aggregate::Change(last.value - first.value)
        } else {
            Aggregate::Total(sum)
        };

        Self {
            average: Some(sum / points.len() as f64),
            max: Some(max),
            aggregate: Some(aggregate),
        }
    }
}
