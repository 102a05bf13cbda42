//! Errors raised by the cache core.
//!
//! Lookup-by-key failures (`NotFound`) fail the whole call; batch updates never
//! raise for missing keys and report them through `failedKeys` instead.

use crate::types::conversions::ConversionError;
use crate::types::EntityKind;

/// Transport-neutral status attached to every error crossing the RPC façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Unavailable,
    NotFound,
    InvalidArgument,
    FailedPrecondition,
    Internal,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("dex state is not ready: InitState has not completed")]
    NotReady,
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },
    #[error("invalid decimal value for {field}: {value}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("division by zero computing {0}")]
    DivisionByZero(&'static str),
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
    #[error("no booster rewards entry for week {week} on {address}")]
    MissingBoosterRewards { address: String, week: u32 },
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StateError {
    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        StateError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Wraps a conversion failure with the name of the field being read.
    pub fn decimal(field: &'static str, value: &str, source: ConversionError) -> Self {
        match source {
            ConversionError::Overflow => StateError::Overflow(field),
            ConversionError::InvalidDecimal(_) => StateError::InvalidDecimal {
                field,
                value: value.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StateError::NotReady => StatusCode::Unavailable,
            StateError::NotFound { .. } => StatusCode::NotFound,
            StateError::InvalidDecimal { .. } | StateError::InvalidSnapshot(_) => {
                StatusCode::InvalidArgument
            }
            StateError::MissingBoosterRewards { .. } => StatusCode::FailedPrecondition,
            StateError::DivisionByZero(_)
            | StateError::Overflow(_)
            | StateError::Serialization(_) => StatusCode::Internal,
        }
    }
}

pub type StateResult<T> = Result<T, StateError>;
