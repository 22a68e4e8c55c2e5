use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};

use crate::day::{DateRange, DayBoundary};
use crate::error::ShredError;
use crate::models::{UnitSystem, User};
use crate::store::NutritionStore;

/// Who is asking and when. Passed into every report instead of looking the
/// user up from ambient state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub boundary: DayBoundary,
    pub now: NaiveDateTime,
}

impl Session {
    /// Load the active profile; `MissingUser` when onboarding hasn't happened.
    pub fn load(
        store: &dyn NutritionStore,
        boundary: DayBoundary,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let user = store.get_user()?.ok_or(ShredError::MissingUser)?;
        Ok(Self {
            user,
            boundary,
            now,
        })
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.boundary.day_of(self.now)
    }

    #[must_use]
    pub fn day_range(&self, date: NaiveDate) -> DateRange {
        self.boundary.range_for(date)
    }

    #[must_use]
    pub fn units(&self) -> UnitSystem {
        self.user.unit_system
    }
}
