//! Read-side reports. Each one fetches fresh rows from the store and derives
//! everything on the spot; nothing is cached between calls.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::models::{FoodLog, UnitSystem};
use crate::nutrition::{
    CalorieProgress, DailyTotals, MacroPercentages, MealSubtotal, meal_breakdown,
};
use crate::series::{self, Metric, ProgressPoint, Statistics, TimeRange};
use crate::session::Session;
use crate::store::NutritionStore;

#[derive(Debug, Clone, Serialize)]
pub struct LatestWeight {
    pub weight_kg: f64,
    /// `None` when falling back to the profile weight.
    pub logged_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub user_name: String,
    pub units: UnitSystem,
    pub totals: DailyTotals,
    pub macros: MacroPercentages,
    pub progress: CalorieProgress,
    pub meals: Vec<MealSubtotal>,
    pub entries: Vec<FoodLog>,
    pub latest_weight: LatestWeight,
}

pub fn build_dashboard(
    store: &dyn NutritionStore,
    session: &Session,
    date: NaiveDate,
) -> Result<Dashboard> {
    let day = session.day_range(date);
    let entries = store.list_food_logs(session.user.id, Some(day))?;
    let totals = DailyTotals::from_logs(&entries);
    let progress = CalorieProgress::new(totals.calories, session.user.target_calories)?;
    debug!(%date, entries = entries.len(), calories = totals.calories, "built dashboard");

    let latest_weight = store
        .latest_weight_log(session.user.id, day.end)?
        .map_or(
            LatestWeight {
                weight_kg: session.user.weight_kg,
                logged_at: None,
            },
            |log| LatestWeight {
                weight_kg: log.weight_kg,
                logged_at: Some(log.logged_at),
            },
        );

    Ok(Dashboard {
        date,
        user_name: session.user.name.clone(),
        units: session.units(),
        macros: totals.macro_percentages(),
        meals: meal_breakdown(&entries),
        totals,
        progress,
        entries,
        latest_weight,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub metric: Metric,
    pub range: TimeRange,
    pub units: UnitSystem,
    /// Values in display units (lb for imperial weight).
    pub points: Vec<ProgressPoint>,
    pub statistics: Statistics,
}

impl ProgressReport {
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.metric.unit(self.units)
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        self.metric.format_value(value, self.units)
    }
}

pub fn build_progress(
    store: &dyn NutritionStore,
    session: &Session,
    metric: Metric,
    range: TimeRange,
) -> Result<ProgressReport> {
    let today = session.today();
    let window = session.boundary.range_ending(today, range.days());
    let user_id = session.user.id;

    let points = if metric.is_sparse() {
        let logs = store.list_weight_logs(user_id, Some(window))?;
        series::bucketize(metric, &[], &logs, today, range, session.boundary)
    } else {
        let logs = store.list_food_logs(user_id, Some(window))?;
        series::bucketize(metric, &logs, &[], today, range, session.boundary)
    };
    let points = series::to_display_units(metric, points, session.units());
    let statistics = Statistics::from_series(metric, &points);
    debug!(%metric, days = range.days(), points = points.len(), "built progress series");

    Ok(ProgressReport {
        metric,
        range,
        units: session.units(),
        points,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::DayBoundary;
    use crate::error::ShredError;
    use crate::models::MealType;
    use crate::models::fixtures::{at, food, food_log, user, weight_log};
    use crate::series::Aggregate;
    use crate::store::memory::MemoryStore;

    fn session(now: NaiveDateTime) -> Session {
        Session {
            user: user(),
            boundary: DayBoundary::MIDNIGHT,
            now,
        }
    }

    fn store_with_day() -> MemoryStore {
        let mut breakfast = food_log(
            food("Banana", 105, 1.3, 27.0, 0.4),
            1.0,
            at(2025, 4, 1, 8, 0),
        );
        breakfast.meal_type = MealType::Breakfast;
        let mut lunch = food_log(
            food("Chicken Breast", 165, 31.0, 0.0, 3.6),
            1.0,
            at(2025, 4, 1, 12, 0),
        );
        lunch.id = 2;
        let mut dinner = food_log(food("Broccoli", 55, 3.7, 11.2, 0.6), 1.0, at(2025, 4, 1, 19, 0));
        dinner.id = 3;
        dinner.meal_type = MealType::Dinner;
        let mut yesterday = food_log(
            food("Pizza", 800, 30.0, 90.0, 35.0),
            1.0,
            at(2025, 3, 31, 20, 0),
        );
        yesterday.id = 4;

        MemoryStore {
            user: Some(user()),
            food_logs: vec![breakfast, lunch, dinner, yesterday],
            ..MemoryStore::default()
        }
    }

    #[test]
    fn test_dashboard_totals_for_day() {
        let store = store_with_day();
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let dash = build_dashboard(&store, &session(at(2025, 4, 1, 21, 0)), date).unwrap();

        assert_eq!(dash.entries.len(), 3);
        assert_eq!(dash.totals.calories, 325);
        assert_eq!(dash.progress.target, 2000);
        assert_eq!(dash.progress.remaining, 1675);

        let sum = dash.macros.protein + dash.macros.carbs + dash.macros.fat;
        assert!((sum - 100.0).abs() < 0.01);

        let lunch = dash
            .meals
            .iter()
            .find(|m| m.meal_type == MealType::Lunch)
            .unwrap();
        assert_eq!(lunch.calories, 165);
    }

    #[test]
    fn test_dashboard_weight_falls_back_to_profile() {
        let store = store_with_day();
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let dash = build_dashboard(&store, &session(at(2025, 4, 1, 21, 0)), date).unwrap();
        assert!((dash.latest_weight.weight_kg - 80.0).abs() < f64::EPSILON);
        assert!(dash.latest_weight.logged_at.is_none());
    }

    #[test]
    fn test_dashboard_uses_latest_weight_up_to_day() {
        let mut store = store_with_day();
        let mut later = weight_log(78.0, at(2025, 4, 5, 7, 0));
        later.id = 2;
        store.weight_logs = vec![weight_log(79.2, at(2025, 3, 30, 7, 0)), later];

        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let dash = build_dashboard(&store, &session(at(2025, 4, 6, 9, 0)), date).unwrap();
        assert!((dash.latest_weight.weight_kg - 79.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dashboard_rejects_invalid_target() {
        let store = store_with_day();
        let mut s = session(at(2025, 4, 1, 21, 0));
        s.user.target_calories = 0;
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let err = build_dashboard(&store, &s, date).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ShredError>(),
            Some(&ShredError::InvalidTarget(0))
        );
    }

    #[test]
    fn test_progress_calories_week() {
        let store = store_with_day();
        let report = build_progress(
            &store,
            &session(at(2025, 4, 1, 21, 0)),
            Metric::Calories,
            TimeRange::Week,
        )
        .unwrap();

        assert_eq!(report.points.len(), 7);
        let last = report.points.last().unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert!((last.value - 325.0).abs() < f64::EPSILON);
        assert_eq!(report.statistics.aggregate, Some(Aggregate::Total(1125.0)));
        assert!((report.statistics.max.unwrap() - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_weight_in_pounds() {
        let mut store = store_with_day();
        let mut u = user();
        u.unit_system = UnitSystem::Imperial;
        store.user = Some(u.clone());
        let mut second = weight_log(99.0, at(2025, 4, 5, 7, 0));
        second.id = 2;
        store.weight_logs = vec![weight_log(100.0, at(2025, 4, 1, 7, 0)), second];

        let s = Session {
            user: u,
            boundary: DayBoundary::MIDNIGHT,
            now: at(2025, 4, 7, 9, 0),
        };
        let report = build_progress(&store, &s, Metric::Weight, TimeRange::Week).unwrap();

        assert_eq!(report.points.len(), 2);
        assert_eq!(report.unit(), "lb");
        assert!((report.points[0].value - 220.462).abs() < 0.001);
        match report.statistics.aggregate {
            Some(Aggregate::Change(delta)) => assert!((delta + 2.20462).abs() < 0.001),
            other => panic!("expected change, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_weight_empty() {
        let store = store_with_day();
        let report = build_progress(
            &store,
            &session(at(2025, 4, 1, 21, 0)),
            Metric::Weight,
            TimeRange::Month,
        )
        .unwrap();
        assert!(report.points.is_empty());
        assert!(report.statistics.average.is_none());
    }
}
