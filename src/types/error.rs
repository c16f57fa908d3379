use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("duplicate rule id '{id}'")]
    DuplicateRule { id: String },

    #[error("rule '{rule}' declares '{kind}' as conflicting with itself")]
    SelfConflict { rule: String, kind: String },

    #[error("conflict rule '{rule}' lists no target kinds")]
    EmptyTargets { rule: String },

    #[error("rule '{rule}' sets max level of '{kind}' to 0; levels start at 1")]
    InvalidMaxLevel { rule: String, kind: String },

    #[error("rule '{rule}' has an invalid surcharge: {reason}")]
    InvalidSurcharge { rule: String, reason: String },
}

/// Contract violations of the level/point conversion functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("level must be non-negative, got {0}")]
    NegativeLevel(i64),

    #[error("points must be non-negative, got {0}")]
    NegativePoints(i64),

    #[error("level {0} is too large to convert to points")]
    LevelTooLarge(i64),

    #[error("level must be a finite number")]
    NotFinite,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("modifier '{kind}' is defined more than once")]
    DuplicateModifier { kind: String },

    #[error("modifier '{kind}' has a max level of 0")]
    ZeroMaxLevel { kind: String },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown modifier '{kind}'")]
    UnknownModifier { kind: String },

    #[error("modifier '{kind}' requested at level 0")]
    ZeroLevel { kind: String },

    #[error("{count} modifiers requested; the exhaustive search is limited to {limit}")]
    TooManyModifiers { count: usize, limit: usize },
}
