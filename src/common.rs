use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MetricError;
use crate::stats::HistogramSummary;
use crate::value::Value;

/// The kind of a metric instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// A signed accumulator.
    Counter,
    /// A point-in-time value of arbitrary type.
    Gauge,
    /// A reservoir-sampled distribution.
    Histogram,
    /// An EWMA throughput estimator.
    Meter,
}

impl MetricKind {
    /// Every valid metric kind, in declaration order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Counter,
        MetricKind::Gauge,
        MetricKind::Histogram,
        MetricKind::Meter,
    ];

    /// The kind's canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Meter => "meter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<MetricKind, MetricError> {
        MetricKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| MetricError::UnknownKind(s.to_string()))
    }
}

/// A computed, point-in-time summary of one instrument.
///
/// Summaries are plain data: stable field names, double-precision numbers
/// (counts excepted), and a `kind` discriminator, so any exposition surface
/// can serialize them as-is:
///
/// ```
/// use metron::{Registry, Value};
///
/// let registry = Registry::new();
/// let counter = registry.new_counter("jobs").unwrap();
/// counter.notify(Value::Int(7)).unwrap();
///
/// let encoded = serde_json::to_string(&counter.get()).unwrap();
/// assert_eq!(encoded, r#"{"kind":"counter","value":7}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Summary {
    /// Counter state.
    Counter {
        /// The accumulated value.
        value: i64,
    },
    /// Gauge state.
    Gauge {
        /// The last value written.
        value: Value,
    },
    /// Histogram statistics; see [`HistogramSummary`] for the field set.
    Histogram(HistogramSummary),
    /// Meter throughput rates, in events per second.
    Meter {
        /// Total events observed.
        count: i64,
        /// Lifetime mean rate.
        mean: f64,
        /// One-minute EWMA rate.
        one: f64,
        /// Five-minute EWMA rate.
        five: f64,
        /// Fifteen-minute EWMA rate.
        fifteen: f64,
        /// One-day EWMA rate.
        day: f64,
    },
}

impl Summary {
    /// The kind of instrument this summary came from.
    pub fn kind(&self) -> MetricKind {
        match self {
            Summary::Counter { .. } => MetricKind::Counter,
            Summary::Gauge { .. } => MetricKind::Gauge,
            Summary::Histogram(_) => MetricKind::Histogram,
            Summary::Meter { .. } => MetricKind::Meter,
        }
    }

    /// The histogram statistics, if this is a histogram summary.
    pub fn as_histogram(&self) -> Option<&HistogramSummary> {
        match self {
            Summary::Histogram(summary) => Some(summary),
            _ => None,
        }
    }
}

/// The raw state backing an instrument, as returned by `raw()`.
///
/// This is the unprocessed counterpart of [`Summary`]: stored samples for a
/// histogram, the bare accumulator for a counter or meter, the last written
/// value for a gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Raw {
    /// A counter's or meter's accumulated count.
    Count(i64),
    /// A gauge's current value.
    Value(Value),
    /// A histogram reservoir's stored values, unweighted.
    Samples(Vec<f64>),
}
