use crate::common::MetricKind;
use crate::value::Value;
use thiserror::Error;

/// Errors surfaced by the metrics API.
///
/// Every failure is reported synchronously at the call site; nothing is
/// swallowed internally.  Exposition layers map these onto their own status
/// codes: [`UnknownMetric`](MetricError::UnknownMetric) is a not-found
/// condition, the rest are caller mistakes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// A `notify` argument could not be coerced to the numeric type the
    /// instrument ingests.  The instrument is left untouched.
    #[error("cannot use {value} as a {expected} value")]
    InvalidInput {
        /// The rejected value.
        value: Value,
        /// The numeric type the instrument expected.
        expected: &'static str,
    },

    /// An operation referenced a metric name that is not registered.
    #[error("metric {0:?} is not registered")]
    UnknownMetric(String),

    /// A metric kind name did not match any of [`MetricKind::ALL`].
    #[error("unknown metric kind {0:?}")]
    UnknownKind(String),

    /// A reservoir type name did not match any known sampling discipline.
    #[error("unknown reservoir type {0:?}")]
    UnknownReservoir(String),

    /// A `new_*` call collided with an existing metric of a different kind
    /// or different construction parameters.
    #[error("metric {name:?} already registered as a {existing}")]
    DuplicateMetric {
        /// The contested name.
        name: String,
        /// The kind already registered under that name.
        existing: MetricKind,
    },

    /// A reservoir or instrument was configured with out-of-range
    /// parameters (zero capacity, non-positive window, alpha, or rescale
    /// interval).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MetricError {
    pub(crate) fn invalid_input(value: &Value, expected: &'static str) -> MetricError {
        MetricError::InvalidInput { value: value.clone(), expected }
    }
}

/// Convenience alias for results carrying a [`MetricError`].
pub type Result<T> = std::result::Result<T, MetricError>;
