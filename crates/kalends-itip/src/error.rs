//! Engine error taxonomy.

use kalends_ical::core::{ComponentKind, TemporalKind};
use thiserror::Error;

/// Errors raised at engine operation boundaries.
///
/// All variants surface synchronously, before any container mutation; a
/// failed operation leaves the calendar exactly as it was.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid input that a caller must correct and re-submit.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A component kind the scheduling engine does not handle.
    #[error("Unsupported component type: {0}")]
    UnsupportedComponentType(ComponentKind),

    /// DATE and DATE-TIME values mixed within one component or comparison.
    #[error("Inconsistent temporal types: expected {expected}, found {found}")]
    InconsistentTemporalType {
        expected: TemporalKind,
        found: TemporalKind,
    },

    /// No series with the given UID exists in the container.
    #[error("Unknown series: {0}")]
    MissingSeries(String),

    #[error(transparent)]
    Timezone(#[from] kalends_ical::expand::TimezoneError),

    #[error("Parse error: {0}")]
    Parse(#[from] kalends_ical::parse::ParseError),

    #[error(transparent)]
    Core(#[from] kalends_core::error::CoreError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
