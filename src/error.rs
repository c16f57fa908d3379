use thiserror::Error;

use crate::parse::ParseError;
use crate::{CatalogError, CompileError, PlanError, RangeError};

/// Unified error type covering parsing, compilation, planning, and I/O.
///
/// Returned by convenience methods like [`RuleIndex::from_dsl()`](crate::RuleIndex::from_dsl)
/// and [`RuleIndex::from_file()`](crate::RuleIndex::from_file).
#[derive(Debug, Error)]
pub enum AnvilError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
