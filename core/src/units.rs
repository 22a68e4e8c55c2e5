//! Weight and height conversion between canonical metric and imperial display.

use serde::Serialize;

use crate::models::UnitSystem;

pub const LBS_PER_KG: f64 = 2.20462;
pub const KG_PER_LB: f64 = 0.453_592;
pub const INCHES_PER_CM: f64 = 0.393_701;
pub const CM_PER_INCH: f64 = 2.54;

#[must_use]
pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

#[must_use]
pub fn lb_to_kg(lb: f64) -> f64 {
    lb * KG_PER_LB
}

#[must_use]
pub fn cm_to_in(cm: f64) -> f64 {
    cm * INCHES_PER_CM
}

#[must_use]
pub fn in_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

/// Height split for display, e.g. 5' 10.9".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: f64,
}

impl FeetInches {
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn from_inches(total: f64) -> Self {
        // Round first so 71.97 shows as 6' 0.0" rather than 5' 12.0".
        let total = (total.max(0.0) * 10.0).round() / 10.0;
        Self {
            feet: (total / 12.0).floor() as u32,
            inches: total % 12.0,
        }
    }

    #[must_use]
    pub fn from_cm(cm: f64) -> Self {
        Self::from_inches(cm_to_in(cm))
    }
}

/// Canonical kg expressed in the user's unit.
#[must_use]
pub fn display_weight(kg: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => kg,
        UnitSystem::Imperial => kg_to_lb(kg),
    }
}

/// A weight typed in the user's unit, converted to kg for storage.
#[must_use]
pub fn weight_to_canonical(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => lb_to_kg(value),
    }
}

/// A height typed in the user's unit (cm or inches), converted to cm for storage.
#[must_use]
pub fn height_to_canonical(value: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => in_to_cm(value),
    }
}

#[must_use]
pub fn weight_unit(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "kg",
        UnitSystem::Imperial => "lb",
    }
}

#[must_use]
pub fn format_weight(kg: f64, units: UnitSystem) -> String {
    format!("{:.1} {}", display_weight(kg, units), weight_unit(units))
}

#[must_use]
pub fn format_height(cm: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{cm:.1} cm"),
        UnitSystem::Imperial => {
            let FeetInches { feet, inches } = FeetInches::from_cm(cm);
            format!("{feet}' {inches:.1}\"")
        }
    }
}
