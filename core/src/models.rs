use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage and display format for local timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Display order used by the dashboard meal breakdown.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        MealType::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid meal type '{s}'. Must be one of: breakfast, lunch, dinner, snack"
                )
            })
    }
}

/// Display and input preference. Stored values are always metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "kg" | "cm" => Ok(UnitSystem::Metric),
            "imperial" | "lb" | "lbs" | "in" => Ok(UnitSystem::Imperial),
            _ => bail!("Invalid unit system '{s}'. Use 'metric' or 'imperial'"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub target_calories: i64,
    pub unit_system: UnitSystem,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub target_calories: i64,
    pub unit_system: UnitSystem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    /// Calories per serving.
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// Free-text serving label, e.g. "1 medium (118g)".
    pub serving_size: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: String,
}

/// A logged food, joined with the food it references.
#[derive(Debug, Clone, Serialize)]
pub struct FoodLog {
    pub id: i64,
    pub uuid: String,
    pub user_id: i64,
    pub food: Food,
    /// Multiplier on the food's serving.
    pub quantity: f64,
    pub meal_type: MealType,
    pub logged_at: NaiveDateTime,
    pub created_at: String,
}

impl FoodLog {
    /// Calories for this entry, truncated to a whole number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_calories(&self) -> i64 {
        (self.food.calories as f64 * self.quantity) as i64
    }

    #[must_use]
    pub fn protein(&self) -> f64 {
        self.food.protein * self.quantity
    }

    #[must_use]
    pub fn carbs(&self) -> f64 {
        self.food.carbs * self.quantity
    }

    #[must_use]
    pub fn fat(&self) -> f64 {
        self.food.fat * self.quantity
    }
}

#[derive(Debug, Clone)]
pub struct NewFoodLog {
    pub user_id: i64,
    pub food_id: i64,
    pub quantity: f64,
    pub meal_type: MealType,
    pub logged_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightLog {
    pub id: i64,
    pub uuid: String,
    pub user_id: i64,
    pub weight_kg: f64,
    pub logged_at: NaiveDateTime,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWeightLog {
    pub user_id: i64,
    pub weight_kg: f64,
    pub logged_at: NaiveDateTime,
}

pub fn validate_profile(user: &NewUser) -> Result<()> {
    if user.name.trim().is_empty() {
        bail!("Name must not be empty");
    }
    if !user.weight_kg.is_finite() || user.weight_kg <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    if !user.height_cm.is_finite() || user.height_cm <= 0.0 {
        bail!("Height must be greater than 0");
    }
    if user.target_calories <= 0 {
        bail!("Calorie target must be greater than 0");
    }
    Ok(())
}

/// Upper bound on calories for a single serving.
pub const MAX_SERVING_CALORIES: i64 = 100_000;
/// Upper bound on any macro, in grams, for a single serving.
pub const MAX_SERVING_GRAMS: f64 = 10_000.0;
/// Upper bound on servings in one log entry.
pub const MAX_QUANTITY: f64 = 1_000.0;

/// Name must not be empty. Calories and macros must be finite numbers
/// between zero and the single-serving bound.
pub fn validate_food_data(food: &NewFood) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    if food.calories < 0 {
        bail!("Calories must not be negative");
    }
    if food.calories > MAX_SERVING_CALORIES {
        bail!("Calories must be at most {MAX_SERVING_CALORIES} per serving");
    }
    for (label, grams) in [
        ("Protein", food.protein),
        ("Carbs", food.carbs),
        ("Fat", food.fat),
    ] {
        if !grams.is_finite() {
            bail!("{label} must be a number");
        }
        if grams < 0.0 {
            bail!("{label} must not be negative");
        }
        if grams > MAX_SERVING_GRAMS {
            bail!("{label} must be at most {MAX_SERVING_GRAMS}g per serving");
        }
    }
    Ok(())
}

pub fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    if quantity > MAX_QUANTITY {
        bail!("Quantity must be at most {MAX_QUANTITY}");
    }
    Ok(())
}

pub fn validate_weight_kg(weight_kg: f64) -> Result<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{Food, FoodLog, MealType, UnitSystem, User, WeightLog};

    pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    pub(crate) fn user() -> User {
        User {
            id: 1,
            uuid: "user-1".to_string(),
            name: "Sam".to_string(),
            weight_kg: 80.0,
            height_cm: 180.0,
            target_calories: 2000,
            unit_system: UnitSystem::Metric,
            created_at: String::new(),
        }
    }

    pub(crate) fn food(name: &str, calories: i64, protein: f64, carbs: f64, fat: f64) -> Food {
        Food {
            id: 1,
            uuid: String::new(),
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            serving_size: "100g".to_string(),
            created_at: String::new(),
        }
    }

    pub(crate) fn food_log(food: Food, quantity: f64, logged_at: NaiveDateTime) -> FoodLog {
        FoodLog {
            id: 1,
            uuid: String::new(),
            user_id: 1,
            food,
            quantity,
            meal_type: MealType::Lunch,
            logged_at,
            created_at: String::new(),
        }
    }

    pub(crate) fn weight_log(weight_kg: f64, logged_at: NaiveDateTime) -> WeightLog {
        WeightLog {
            id: 1,
            uuid: String::new(),
            user_id: 1,
            weight_kg,
            logged_at,
            created_at: String::new(),
        }
    }
}
