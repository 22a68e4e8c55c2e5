//! Free-text nutrition questions ("how much protein in 200g of chicken?").
//!
//! Answers come from a [`NutritionQueryProvider`]. The only provider shipped
//! here is a canned one; a real backend would implement the same trait.

use serde::Serialize;
use thiserror::Error;

use crate::models::NewFood;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionQueryResult {
    pub food_name: String,
    pub serving_size: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub source: String,
}

impl NutritionQueryResult {
    pub const HIGH_CONFIDENCE: f64 = 0.8;

    #[must_use]
    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= Self::HIGH_CONFIDENCE
    }

    /// Food row for saving the answer to the local database.
    #[must_use]
    pub fn into_new_food(self) -> NewFood {
        NewFood {
            name: self.food_name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            serving_size: self.serving_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NutritionQueryError {
    #[error("Could not understand the response. Please try rephrasing your question.")]
    InvalidResponse,
    #[error("The AI is not very confident about these values. Please verify them.")]
    LowConfidence,
    #[error("Could not connect to the AI. Please check your connection and try again.")]
    NetworkError,
}

pub trait NutritionQueryProvider: Send + Sync {
    fn query(&self, question: &str) -> Result<NutritionQueryResult, NutritionQueryError>;
}

/// Answers questions about chicken and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedNutritionQuery;

impl NutritionQueryProvider for CannedNutritionQuery {
    fn query(&self, question: &str) -> Result<NutritionQueryResult, NutritionQueryError> {
        if question.to_lowercase().contains("chicken") {
            Ok(NutritionQueryResult {
                food_name: "Chicken Breast".to_string(),
                serving_size: "200g".to_string(),
                calories: 330,
                protein: 62.0,
                carbs: 0.0,
                fat: 7.2,
                confidence: 0.95,
                source: "USDA Database".to_string(),
            })
        } else {
            Err(NutritionQueryError::InvalidResponse)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_chicken() {
        let result = CannedNutritionQuery
            .query("How much protein is in 200g of CHICKEN breast?")
            .unwrap();
        assert_eq!(result.food_name, "Chicken Breast");
        assert_eq!(result.calories, 330);
        assert!((result.protein - 62.0).abs() < f64::EPSILON);
        assert!(result.is_high_confidence());
    }

    #[test]
    fn test_canned_unknown_food() {
        let err = CannedNutritionQuery.query("calories in a bagel").unwrap_err();
        assert_eq!(err, NutritionQueryError::InvalidResponse);
        assert!(err.to_string().starts_with("Could not understand"));
    }

    #[test]
    fn test_confidence_threshold() {
        let mut result = CannedNutritionQuery.query("chicken").unwrap();
        result.confidence = 0.8;
        assert!(result.is_high_confidence());
        result.confidence = 0.79;
        assert!(!result.is_high_confidence());
    }

    #[test]
    fn test_into_new_food() {
        let food = CannedNutritionQuery.query("chicken").unwrap().into_new_food();
        assert_eq!(food.name, "Chicken Breast");
        assert_eq!(food.serving_size, "200g");
        assert!((food.fat - 7.2).abs() < f64::EPSILON);
    }
}
