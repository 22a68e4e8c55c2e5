use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::day::DayBoundary;
use crate::db::Database;
use crate::models::{
    self, Food, FoodLog, MealType, NewFood, NewFoodLog, NewUser, NewWeightLog, User, WeightLog,
};
use crate::query::{NutritionQueryProvider, NutritionQueryResult};
use crate::report::{self, Dashboard, ProgressReport};
use crate::series::{Metric, TimeRange};
use crate::session::Session;

/// Entry point for front ends: validates input, owns the database, and
/// builds reports for a [`Session`].
pub struct ShredService {
    db: Database,
    boundary: DayBoundary,
}

impl ShredService {
    pub fn new(db_path: &Path, boundary: DayBoundary) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db, boundary })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db,
            boundary: DayBoundary::MIDNIGHT,
        })
    }

    #[must_use]
    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Session for the active profile at `now`. Fails with `MissingUser`
    /// before onboarding.
    pub fn session(&self, now: NaiveDateTime) -> Result<Session> {
        Session::load(&self.db, self.boundary, now)
    }

    // --- Profile ---

    pub fn get_user(&self) -> Result<Option<User>> {
        self.db.get_user()
    }

    pub fn save_profile(&self, user: &NewUser) -> Result<User> {
        models::validate_profile(user)?;
        self.db.upsert_user(user)
    }

    // --- Foods ---

    pub fn add_food(&self, food: &NewFood) -> Result<Food> {
        models::validate_food_data(food)?;
        self.db.insert_food(food)
    }

    pub fn get_food(&self, id: i64) -> Result<Food> {
        self.db.get_food(id)
    }

    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        self.db.list_foods(search)
    }

    pub fn delete_food(&self, id: i64) -> Result<()> {
        self.db.delete_food(id)
    }

    // --- Food logs ---

    pub fn log_food(
        &self,
        session: &Session,
        food_id: i64,
        quantity: f64,
        meal_type: MealType,
        logged_at: NaiveDateTime,
    ) -> Result<FoodLog> {
        models::validate_quantity(quantity)?;
        self.db.insert_food_log(&NewFoodLog {
            user_id: session.user.id,
            food_id,
            quantity,
            meal_type,
            logged_at,
        })
    }

    pub fn delete_food_log(&self, id: i64) -> Result<bool> {
        self.db.delete_food_log(id)
    }

    // --- Weight ---

    pub fn log_weight(
        &self,
        session: &Session,
        weight_kg: f64,
        logged_at: NaiveDateTime,
    ) -> Result<WeightLog> {
        models::validate_weight_kg(weight_kg)?;
        self.db.insert_weight_log(&NewWeightLog {
            user_id: session.user.id,
            weight_kg,
            logged_at,
        })
    }

    pub fn delete_weight_log(&self, id: i64) -> Result<bool> {
        self.db.delete_weight_log(id)
    }

    /// Every weight log in the window ending today, oldest first.
    pub fn weight_history(&self, session: &Session, range: TimeRange) -> Result<Vec<WeightLog>> {
        let window = self.boundary.range_ending(session.today(), range.days());
        self.db.list_weight_logs(session.user.id, Some(window))
    }

    // --- Reports ---

    pub fn dashboard(&self, session: &Session, date: NaiveDate) -> Result<Dashboard> {
        report::build_dashboard(&self.db, session, date)
    }

    pub fn progress(
        &self,
        session: &Session,
        metric: Metric,
        range: TimeRange,
    ) -> Result<ProgressReport> {
        report::build_progress(&self.db, session, metric, range)
    }

    // --- Nutrition questions ---

    pub fn ask(
        &self,
        provider: &dyn NutritionQueryProvider,
        question: &str,
    ) -> Result<NutritionQueryResult> {
        let result = provider.query(question)?;
        info!(food = %result.food_name, confidence = result.confidence, "answered nutrition query");
        Ok(result)
    }

    /// Ask, then store the answer as a food for later logging.
    pub fn ask_and_save(
        &self,
        provider: &dyn NutritionQueryProvider,
        question: &str,
    ) -> Result<(NutritionQueryResult, Food)> {
        let result = self.ask(provider, question)?;
        let food = self.add_food(&result.clone().into_new_food())?;
        Ok((result, food))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShredError;
    use crate::models::UnitSystem;
    use crate::models::fixtures::at;
    use crate::query::{CannedNutritionQuery, NutritionQueryError};
    use crate::series::Aggregate;

    struct MockProvider {
        answer: Option<NutritionQueryResult>,
    }

    impl NutritionQueryProvider for MockProvider {
        fn query(&self, _question: &str) -> Result<NutritionQueryResult, NutritionQueryError> {
            self.answer.clone().ok_or(NutritionQueryError::NetworkError)
        }
    }

    fn profile() -> NewUser {
        NewUser {
            name: "Sam".to_string(),
            weight_kg: 80.0,
            height_cm: 180.0,
            target_calories: 2000,
            unit_system: UnitSystem::Metric,
        }
    }

    fn sample_food(name: &str, calories: i64, protein: f64, carbs: f64, fat: f64) -> NewFood {
        NewFood {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            serving_size: "1 serving".to_string(),
        }
    }

    fn onboarded() -> (ShredService, Session) {
        let svc = ShredService::new_in_memory().unwrap();
        svc.save_profile(&profile()).unwrap();
        let session = svc.session(at(2025, 4, 1, 21, 0)).unwrap();
        (svc, session)
    }

    #[test]
    fn test_session_requires_profile() {
        let svc = ShredService::new_in_memory().unwrap();
        let err = svc.session(at(2025, 4, 1, 9, 0)).unwrap_err();
        assert!(ShredError::is_missing_user(&err));
    }

    #[test]
    fn test_save_profile_validates() {
        let svc = ShredService::new_in_memory().unwrap();
        let mut bad = profile();
        bad.target_calories = -5;
        assert!(svc.save_profile(&bad).is_err());
        assert!(svc.get_user().unwrap().is_none());
    }

    #[test]
    fn test_log_food_and_dashboard() {
        let (svc, session) = onboarded();
        let banana = svc.add_food(&sample_food("Banana", 105, 1.3, 27.0, 0.4)).unwrap();
        let chicken = svc
            .add_food(&sample_food("Chicken Breast", 165, 31.0, 0.0, 3.6))
            .unwrap();
        let broccoli = svc
            .add_food(&sample_food("Broccoli", 55, 3.7, 11.2, 0.6))
            .unwrap();

        svc.log_food(&session, banana.id, 1.0, MealType::Breakfast, at(2025, 4, 1, 8, 0))
            .unwrap();
        svc.log_food(&session, chicken.id, 1.0, MealType::Lunch, at(2025, 4, 1, 12, 0))
            .unwrap();
        svc.log_food(&session, broccoli.id, 1.0, MealType::Dinner, at(2025, 4, 1, 19, 0))
            .unwrap();

        let dash = svc.dashboard(&session, session.today()).unwrap();
        assert_eq!(dash.totals.calories, 325);
        assert_eq!(dash.meals.len(), 3);
        assert_eq!(dash.progress.remaining, 1675);
    }

    #[test]
    fn test_log_food_rejects_bad_quantity() {
        let (svc, session) = onboarded();
        let food = svc.add_food(&sample_food("Egg", 72, 6.3, 0.4, 5.0)).unwrap();
        assert!(
            svc.log_food(&session, food.id, 0.0, MealType::Snack, at(2025, 4, 1, 10, 0))
                .is_err()
        );
    }

    #[test]
    fn test_add_food_validates() {
        let svc = ShredService::new_in_memory().unwrap();
        assert!(svc.add_food(&sample_food("", 100, 1.0, 1.0, 1.0)).is_err());
        assert!(svc.add_food(&sample_food("Oil", -1, 0.0, 0.0, 14.0)).is_err());
    }

    #[test]
    fn test_weight_history_and_progress() {
        let (svc, session) = onboarded();
        svc.log_weight(&session, 81.0, at(2025, 3, 20, 7, 0)).unwrap();
        svc.log_weight(&session, 80.0, at(2025, 3, 26, 7, 0)).unwrap();
        svc.log_weight(&session, 79.5, at(2025, 3, 30, 7, 0)).unwrap();

        let history = svc.weight_history(&session, TimeRange::Week).unwrap();
        assert_eq!(history.len(), 2);

        let report = svc
            .progress(&session, Metric::Weight, TimeRange::Week)
            .unwrap();
        assert_eq!(report.points.len(), 2);
        match report.statistics.aggregate {
            Some(Aggregate::Change(delta)) => assert!((delta + 0.5).abs() < 0.001),
            other => panic!("expected change, got {other:?}"),
        }

        assert!(svc.log_weight(&session, 0.0, at(2025, 4, 1, 7, 0)).is_err());
    }

    #[test]
    fn test_ask_canned() {
        let svc = ShredService::new_in_memory().unwrap();
        let result = svc.ask(&CannedNutritionQuery, "grilled chicken").unwrap();
        assert_eq!(result.calories, 330);

        let err = svc.ask(&CannedNutritionQuery, "tofu").unwrap_err();
        assert_eq!(
            err.downcast_ref::<NutritionQueryError>(),
            Some(&NutritionQueryError::InvalidResponse)
        );
    }

    #[test]
    fn test_ask_and_save() {
        let svc = ShredService::new_in_memory().unwrap();
        let provider = MockProvider {
            answer: Some(NutritionQueryResult {
                food_name: "Greek Yogurt".to_string(),
                serving_size: "170g".to_string(),
                calories: 100,
                protein: 17.0,
                carbs: 6.0,
                fat: 0.7,
                confidence: 0.6,
                source: "Test".to_string(),
            }),
        };

        let (result, food) = svc.ask_and_save(&provider, "yogurt").unwrap();
        assert!(!result.is_high_confidence());
        assert_eq!(food.name, "Greek Yogurt");
        assert_eq!(svc.list_foods(Some("yogurt")).unwrap().len(), 1);

        let offline = MockProvider { answer: None };
        assert!(svc.ask_and_save(&offline, "yogurt").is_err());
        assert_eq!(svc.list_foods(None).unwrap().len(), 1);
    }
}
