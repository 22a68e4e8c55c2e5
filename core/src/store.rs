use anyhow::Result;
use chrono::NaiveDateTime;

use crate::day::DateRange;
use crate::models::{FoodLog, User, WeightLog};

/// Read side of the log store that reports are built from.
///
/// Implementations return already-persisted records; callers never check
/// referential integrity. `range` is half-open and `None` means everything.
pub trait NutritionStore {
    fn get_user(&self) -> Result<Option<User>>;

    /// Food logs ordered by `logged_at`, then id.
    fn list_food_logs(&self, user_id: i64, range: Option<DateRange>) -> Result<Vec<FoodLog>>;

    /// Weight logs ordered by `logged_at`, then id.
    fn list_weight_logs(&self, user_id: i64, range: Option<DateRange>)
    -> Result<Vec<WeightLog>>;

    /// Most recent weight log strictly before `before`.
    fn latest_weight_log(&self, user_id: i64, before: NaiveDateTime) -> Result<Option<WeightLog>>;
}
