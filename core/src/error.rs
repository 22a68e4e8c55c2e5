use thiserror::Error;

/// Domain failures the presentation layer needs to tell apart.
///
/// Storage and service calls return `anyhow::Result`; these travel inside the
/// `anyhow::Error` and can be recovered with `downcast_ref::<ShredError>()`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShredError {
    /// Calorie ratios need a positive target.
    #[error("Calorie target must be greater than 0 (got {0})")]
    InvalidTarget(i64),

    /// No profile has been created yet (onboarding state).
    #[error("No profile found. Create one with `shred profile set`")]
    MissingUser,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),
}

impl ShredError {
    /// True when the error means "route the user to onboarding".
    #[must_use]
    pub fn is_missing_user(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ShredError>(), Some(ShredError::MissingUser))
    }
}
