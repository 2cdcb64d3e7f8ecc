//! The metric instruments and the polymorphic handle over them.
//!
//! Each instrument lives in its own file and exposes the same three
//! operations: `notify` ingests an observation, `get` computes a
//! [`Summary`](crate::Summary), and `raw` exposes the underlying state.
//! [`Metric`] is the registry's uniform, cheaply-cloneable handle over the
//! four of them.

mod counter;
mod gauge;
mod histogram;
mod meter;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::Histogram;
pub use meter::Meter;

use std::sync::Arc;

use crate::common::{MetricKind, Raw, Summary};
use crate::error::Result;
use crate::value::Value;

/// A shared handle to a registered instrument.
///
/// Handles are `Arc`-backed: clones observe the same underlying state, and
/// an instrument stays alive for as long as any handle does, even after
/// removal from the registry.  Instruments synchronize internally, so all
/// operations take `&self`.
#[derive(Debug, Clone)]
pub enum Metric {
    /// A counter instrument.
    Counter(Arc<Counter>),
    /// A gauge instrument.
    Gauge(Arc<Gauge>),
    /// A histogram instrument.
    Histogram(Arc<Histogram>),
    /// A meter instrument.
    Meter(Arc<Meter>),
}

impl Metric {
    /// The instrument's kind.
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Meter(_) => MetricKind::Meter,
        }
    }

    /// Ingests an observation.
    ///
    /// Fails if the value cannot be coerced to the instrument's numeric
    /// type; a failed coercion leaves the instrument untouched.
    pub fn notify<V>(&self, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        match self {
            Metric::Counter(counter) => counter.notify(value),
            Metric::Gauge(gauge) => gauge.notify(value),
            Metric::Histogram(histogram) => histogram.notify(value),
            Metric::Meter(meter) => meter.notify(value),
        }
    }

    /// Computes the instrument's current summary.
    pub fn get(&self) -> Summary {
        match self {
            Metric::Counter(counter) => counter.get(),
            Metric::Gauge(gauge) => gauge.get(),
            Metric::Histogram(histogram) => histogram.get(),
            Metric::Meter(meter) => meter.get(),
        }
    }

    /// Exposes the instrument's raw underlying state.
    pub fn raw(&self) -> Raw {
        match self {
            Metric::Counter(counter) => Raw::Count(counter.raw()),
            Metric::Gauge(gauge) => Raw::Value(gauge.raw()),
            Metric::Histogram(histogram) => Raw::Samples(histogram.raw()),
            Metric::Meter(meter) => Raw::Count(meter.raw()),
        }
    }

    /// The counter behind this handle, if it is one.
    pub fn as_counter(&self) -> Option<Arc<Counter>> {
        match self {
            Metric::Counter(counter) => Some(Arc::clone(counter)),
            _ => None,
        }
    }

    /// The gauge behind this handle, if it is one.
    pub fn as_gauge(&self) -> Option<Arc<Gauge>> {
        match self {
            Metric::Gauge(gauge) => Some(Arc::clone(gauge)),
            _ => None,
        }
    }

    /// The histogram behind this handle, if it is one.
    pub fn as_histogram(&self) -> Option<Arc<Histogram>> {
        match self {
            Metric::Histogram(histogram) => Some(Arc::clone(histogram)),
            _ => None,
        }
    }

    /// The meter behind this handle, if it is one.
    pub fn as_meter(&self) -> Option<Arc<Meter>> {
        match self {
            Metric::Meter(meter) => Some(Arc::clone(meter)),
            _ => None,
        }
    }
}
