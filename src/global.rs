//! The process-wide default registry.
//!
//! Most applications want exactly one registry, shared by every module that
//! records a metric.  The free functions here mirror the [`Registry`] API
//! against a lazily-created global instance, so call sites need no handle
//! plumbing:
//!
//! ```
//! use metron::Value;
//!
//! let requests = metron::new_counter("example_requests").unwrap();
//! requests.notify(Value::Int(1)).unwrap();
//!
//! assert!(metron::names().contains(&"example_requests".to_string()));
//! # metron::delete("example_requests");
//! ```
//!
//! Libraries and tests that need isolation should construct private
//! [`Registry`] instances instead; nothing in the crate privileges the
//! global one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::LazyLock;

use crate::common::{MetricKind, Summary};
use crate::data::{Counter, Gauge, Histogram, Meter, Metric};
use crate::error::Result;
use crate::registry::Registry;
use crate::reservoir::ReservoirConfig;
use crate::value::Value;

static DEFAULT: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide default registry.
pub fn default_registry() -> &'static Registry {
    &DEFAULT
}

/// Creates (or returns) a counter in the default registry.
pub fn new_counter(name: &str) -> Result<Arc<Counter>> {
    DEFAULT.new_counter(name)
}

/// Creates (or returns) a gauge in the default registry.
pub fn new_gauge(name: &str) -> Result<Arc<Gauge>> {
    DEFAULT.new_gauge(name)
}

/// Creates (or returns) a uniform-reservoir histogram in the default
/// registry.
pub fn new_histogram(name: &str) -> Result<Arc<Histogram>> {
    DEFAULT.new_histogram(name)
}

/// Creates (or returns) a histogram with an explicit reservoir
/// configuration in the default registry.
pub fn new_histogram_with(name: &str, config: ReservoirConfig) -> Result<Arc<Histogram>> {
    DEFAULT.new_histogram_with(name, config)
}

/// Creates (or returns) a meter in the default registry.
pub fn new_meter(name: &str) -> Result<Arc<Meter>> {
    DEFAULT.new_meter(name)
}

/// Creates (or returns) a metric of a runtime-chosen kind in the default
/// registry.
pub fn create(
    kind: MetricKind,
    name: &str,
    reservoir: Option<ReservoirConfig>,
) -> Result<Metric> {
    DEFAULT.create(kind, name, reservoir)
}

/// Looks up a metric in the default registry.
pub fn metric(name: &str) -> Result<Metric> {
    DEFAULT.metric(name)
}

/// Computes the summary of a metric in the default registry.
pub fn get(name: &str) -> Result<Summary> {
    DEFAULT.get(name)
}

/// Ingests an observation into a metric in the default registry.
pub fn notify<V>(name: &str, value: V) -> Result<()>
where
    V: Into<Value>,
{
    DEFAULT.notify(name, value)
}

/// Removes a metric from the default registry.
pub fn delete(name: &str) -> Option<Metric> {
    DEFAULT.delete(name)
}

/// The default registry's metric names, sorted.
pub fn names() -> Vec<String> {
    DEFAULT.names()
}

/// Attaches a tag to a metric in the default registry.
pub fn tag(name: &str, tag_name: &str) -> Result<()> {
    DEFAULT.tag(name, tag_name)
}

/// Detaches a tag from a metric in the default registry.
pub fn untag(name: &str, tag_name: &str) -> bool {
    DEFAULT.untag(name, tag_name)
}

/// A snapshot of the default registry's tags.
pub fn tags() -> BTreeMap<String, BTreeSet<String>> {
    DEFAULT.tags()
}

/// Summaries of every default-registry metric carrying the tag.
pub fn by_tag(tag_name: &str) -> BTreeMap<String, Summary> {
    DEFAULT.by_tag(tag_name)
}

/// Summaries of every metric in the default registry.
pub fn snapshot() -> BTreeMap<String, Summary> {
    DEFAULT.snapshot()
}
