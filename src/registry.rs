use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::builder::Builder;
use crate::clock::Clock;
use crate::common::{MetricKind, Summary};
use crate::data::{Counter, Gauge, Histogram, Meter, Metric};
use crate::error::{MetricError, Result};
use crate::reservoir::ReservoirConfig;
use crate::value::Value;

/// A named store of metric instruments.
///
/// The registry owns instrument lifetime: instruments are created through
/// `new_*`, looked up by name, grouped by tags, and live until explicitly
/// deleted.  Creation is idempotent — asking again for a name with the same
/// kind and construction parameters returns the existing instrument, while
/// a mismatch is a duplicate-metric error.
///
/// One coarse mutex guards the name and tag tables; it is held only for
/// table manipulation, never while a summary is being computed.  The
/// instruments synchronize themselves, so `notify` traffic on different
/// metrics proceeds fully in parallel, and snapshot readers never block
/// writers for longer than a single instrument's lock.
///
/// ```
/// use metron::{Registry, Value};
///
/// let registry = Registry::new();
///
/// let requests = registry.new_meter("requests").unwrap();
/// requests.notify(Value::Int(1)).unwrap();
///
/// registry.tag("requests", "http").unwrap();
/// let group = registry.by_tag("http");
/// assert!(group.contains_key("requests"));
/// ```
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<Inner>,
    clock: Clock,
    default_reservoir: ReservoirConfig,
    seed: Option<u64>,
    seed_sequence: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    metrics: IndexMap<String, Metric>,
    tags: HashMap<String, BTreeSet<String>>,
}

impl Registry {
    /// Creates a registry with the default clock and configuration.
    pub fn new() -> Registry {
        Builder::default().build()
    }

    /// Returns a builder for configuring clock, RNG seeding, and the
    /// default histogram reservoir.
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn from_builder(
        clock: Clock,
        default_reservoir: ReservoirConfig,
        seed: Option<u64>,
    ) -> Registry {
        Registry {
            inner: Mutex::new(Inner::default()),
            clock,
            default_reservoir,
            seed,
            seed_sequence: AtomicU64::new(0),
        }
    }

    /// The clock shared by every instrument this registry creates.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Each reservoir gets its own RNG stream; with a configured base seed
    /// the streams are distinct but reproducible run to run.
    fn next_seed(&self) -> Option<u64> {
        self.seed
            .map(|seed| seed.wrapping_add(self.seed_sequence.fetch_add(1, Ordering::Relaxed)))
    }

    /// Registers a metric under `name`, or returns the existing one.
    ///
    /// `matches` decides whether an existing metric satisfies the request;
    /// `build` is only invoked when the name is free.
    fn get_or_insert<M, B>(&self, name: &str, matches: M, build: B) -> Result<Metric>
    where
        M: FnOnce(&Metric) -> bool,
        B: FnOnce(&Registry) -> Result<Metric>,
    {
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.metrics.get(name) {
            return if matches(existing) {
                Ok(existing.clone())
            } else {
                Err(MetricError::DuplicateMetric {
                    name: name.to_string(),
                    existing: existing.kind(),
                })
            };
        }

        let metric = build(self)?;
        debug!(name, kind = %metric.kind(), "registered metric");
        inner.metrics.insert(name.to_string(), metric.clone());
        Ok(metric)
    }

    /// Creates (or returns) the counter named `name`.
    pub fn new_counter(&self, name: &str) -> Result<Arc<Counter>> {
        let metric = self.get_or_insert(
            name,
            |existing| existing.kind() == MetricKind::Counter,
            |_| Ok(Metric::Counter(Arc::new(Counter::new()))),
        )?;
        Ok(metric.as_counter().expect("registered as a counter"))
    }

    /// Creates (or returns) the gauge named `name`.
    pub fn new_gauge(&self, name: &str) -> Result<Arc<Gauge>> {
        let metric = self.get_or_insert(
            name,
            |existing| existing.kind() == MetricKind::Gauge,
            |_| Ok(Metric::Gauge(Arc::new(Gauge::new()))),
        )?;
        Ok(metric.as_gauge().expect("registered as a gauge"))
    }

    /// Creates (or returns) the meter named `name`.
    pub fn new_meter(&self, name: &str) -> Result<Arc<Meter>> {
        let metric = self.get_or_insert(
            name,
            |existing| existing.kind() == MetricKind::Meter,
            |registry| Ok(Metric::Meter(Arc::new(Meter::new(registry.clock.clone())))),
        )?;
        Ok(metric.as_meter().expect("registered as a meter"))
    }

    /// Creates (or returns) a histogram over this registry's default
    /// reservoir configuration.
    pub fn new_histogram(&self, name: &str) -> Result<Arc<Histogram>> {
        self.new_histogram_with(name, self.default_reservoir)
    }

    /// Creates (or returns) a histogram with an explicit reservoir
    /// configuration.
    ///
    /// Re-registration only succeeds when the existing histogram was built
    /// from the same configuration; a histogram sampling the last minute
    /// is not interchangeable with one sampling all time.
    pub fn new_histogram_with(
        &self,
        name: &str,
        config: ReservoirConfig,
    ) -> Result<Arc<Histogram>> {
        let metric = self.get_or_insert(
            name,
            |existing| match existing {
                Metric::Histogram(histogram) => histogram.reservoir().config() == config,
                _ => false,
            },
            |registry| {
                let reservoir = config.build(&registry.clock, registry.next_seed())?;
                Ok(Metric::Histogram(Arc::new(Histogram::with_reservoir(reservoir))))
            },
        )?;
        Ok(metric.as_histogram().expect("registered as a histogram"))
    }

    /// Creates (or returns) a metric of a kind chosen at runtime.
    ///
    /// This is the entry point for dynamic callers such as an HTTP
    /// surface; `reservoir` applies only to histograms and defaults to the
    /// registry's configuration.
    pub fn create(
        &self,
        kind: MetricKind,
        name: &str,
        reservoir: Option<ReservoirConfig>,
    ) -> Result<Metric> {
        match kind {
            MetricKind::Counter => self.new_counter(name).map(Metric::Counter),
            MetricKind::Gauge => self.new_gauge(name).map(Metric::Gauge),
            MetricKind::Meter => self.new_meter(name).map(Metric::Meter),
            MetricKind::Histogram => self
                .new_histogram_with(name, reservoir.unwrap_or(self.default_reservoir))
                .map(Metric::Histogram),
        }
    }

    /// Looks up the metric registered under `name`.
    pub fn metric(&self, name: &str) -> Result<Metric> {
        self.inner
            .lock()
            .metrics
            .get(name)
            .cloned()
            .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))
    }

    /// Computes the summary of the metric named `name`.
    pub fn get(&self, name: &str) -> Result<Summary> {
        // The registry lock is released before the summary is computed.
        Ok(self.metric(name)?.get())
    }

    /// Ingests an observation into the metric named `name`.
    pub fn notify<V>(&self, name: &str, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        self.metric(name)?.notify(value)
    }

    /// Removes the metric named `name`, detaching it from every tag.
    ///
    /// Tags left without members disappear.  Returns the removed metric,
    /// which stays functional for any caller still holding a handle.
    pub fn delete(&self, name: &str) -> Option<Metric> {
        let mut inner = self.inner.lock();
        let removed = inner.metrics.shift_remove(name);

        if removed.is_some() {
            inner.tags.retain(|_, names| {
                names.remove(name);
                !names.is_empty()
            });
            debug!(name, "deleted metric");
        }

        removed
    }

    /// Attaches `tag` to the metric named `name`, which must exist.
    pub fn tag(&self, name: &str, tag: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.metrics.contains_key(name) {
            return Err(MetricError::UnknownMetric(name.to_string()));
        }

        inner.tags.entry(tag.to_string()).or_default().insert(name.to_string());
        Ok(())
    }

    /// Detaches `tag` from the metric named `name`.
    ///
    /// Returns whether the metric was tagged; a tag left without members
    /// disappears.
    pub fn untag(&self, name: &str, tag: &str) -> bool {
        let mut inner = self.inner.lock();
        let Some(names) = inner.tags.get_mut(tag) else {
            return false;
        };

        let removed = names.remove(name);
        if names.is_empty() {
            inner.tags.remove(tag);
        }
        removed
    }

    /// A snapshot of every tag and the names it groups.
    pub fn tags(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.inner
            .lock()
            .tags
            .iter()
            .map(|(tag, names)| (tag.clone(), names.clone()))
            .collect()
    }

    /// Computes the summary of every metric carrying `tag`.
    ///
    /// Unknown tags yield an empty map.  The membership list is copied
    /// under the registry lock; each summary is then computed outside it
    /// under the instrument's own lock, so a slow histogram never stalls
    /// registration traffic — at the cost that concurrent writes may land
    /// between one summary and the next.
    pub fn by_tag(&self, tag: &str) -> BTreeMap<String, Summary> {
        let members: Vec<(String, Metric)> = {
            let inner = self.inner.lock();
            match inner.tags.get(tag) {
                Some(names) => names
                    .iter()
                    .filter_map(|name| {
                        inner.metrics.get(name).map(|m| (name.clone(), m.clone()))
                    })
                    .collect(),
                None => return BTreeMap::new(),
            }
        };

        members.into_iter().map(|(name, metric)| (name, metric.get())).collect()
    }

    /// Computes the summary of every registered metric.
    ///
    /// Same locking discipline as [`by_tag`](Registry::by_tag); this is the
    /// hook a periodic reporter drains on each scheduled tick.
    pub fn snapshot(&self) -> BTreeMap<String, Summary> {
        let members: Vec<(String, Metric)> = {
            let inner = self.inner.lock();
            inner
                .metrics
                .iter()
                .map(|(name, metric)| (name.clone(), metric.clone()))
                .collect()
        };

        members.into_iter().map(|(name, metric)| (name, metric.get())).collect()
    }

    /// The registered metric names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.inner.lock().metrics.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.inner.lock().metrics.len()
    }

    /// Whether the registry holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().metrics.is_empty()
    }

    /// Removes every metric and tag.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.metrics.clear();
        inner.tags.clear();
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::common::{MetricKind, Summary};
    use crate::error::MetricError;
    use crate::reservoir::ReservoirConfig;
    use std::sync::Arc;

    #[test]
    fn test_same_kind_registration_is_idempotent() {
        let registry = Registry::new();

        let first = registry.new_counter("x").unwrap();
        let again = registry.new_counter("x").unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        first.notify(2).unwrap();
        again.notify(3).unwrap();
        assert_eq!(first.raw(), 5);
    }

    #[test]
    fn test_kind_collision_is_a_duplicate() {
        let registry = Registry::new();
        registry.new_counter("x").unwrap();

        match registry.new_gauge("x") {
            Err(MetricError::DuplicateMetric { name, existing }) => {
                assert_eq!(name, "x");
                assert_eq!(existing, MetricKind::Counter);
            }
            other => panic!("expected a duplicate-metric error, got {:?}", other),
        }
    }

    #[test]
    fn test_histogram_config_must_match_to_reuse() {
        let registry = Registry::new();
        let config = ReservoirConfig::SlidingWindow { size: 32 };

        let first = registry.new_histogram_with("h", config).unwrap();
        let again = registry.new_histogram_with("h", config).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let different = ReservoirConfig::SlidingWindow { size: 64 };
        assert!(matches!(
            registry.new_histogram_with("h", different),
            Err(MetricError::DuplicateMetric { .. })
        ));
    }

    #[test]
    fn test_invalid_config_never_registers() {
        let registry = Registry::new();
        let bad = ReservoirConfig::Uniform { size: 0 };

        assert!(matches!(
            registry.new_histogram_with("h", bad),
            Err(MetricError::InvalidConfig(_))
        ));
        assert!(registry.metric("h").is_err());
    }

    #[test]
    fn test_lookup_and_passthrough() {
        let registry = Registry::new();
        registry.new_counter("jobs").unwrap();

        registry.notify("jobs", 4).unwrap();
        assert_eq!(registry.get("jobs").unwrap(), Summary::Counter { value: 4 });

        assert!(matches!(
            registry.get("ghost"),
            Err(MetricError::UnknownMetric(_))
        ));
        assert!(registry.notify("ghost", 1).is_err());
    }

    #[test]
    fn test_dynamic_creation() {
        let registry = Registry::new();

        let config = ReservoirConfig::SlidingTime { window_secs: 30.0 };
        let metric = registry
            .create(MetricKind::Histogram, "h", Some(config))
            .unwrap();

        assert_eq!(metric.kind(), MetricKind::Histogram);
        metric.notify(1.5).unwrap();
        assert_eq!(metric.get().kind(), MetricKind::Histogram);
    }

    #[test]
    fn test_delete_detaches_tags() {
        let registry = Registry::new();
        registry.new_histogram("h").unwrap();
        registry.tag("h", "g").unwrap();

        registry.delete("h").unwrap();

        assert!(registry.tags().is_empty());
        assert!(registry.metric("h").is_err());
    }

    #[test]
    fn test_tag_requires_existing_metric() {
        let registry = Registry::new();
        assert!(registry.tag("ghost", "g").is_err());
    }

    #[test]
    fn test_untag_reports_membership() {
        let registry = Registry::new();
        registry.new_counter("a").unwrap();
        registry.new_counter("b").unwrap();
        registry.tag("a", "g").unwrap();
        registry.tag("b", "g").unwrap();

        assert!(registry.untag("a", "g"));
        assert!(!registry.untag("a", "g"));
        assert!(registry.tags().contains_key("g"));

        // Dropping the last member drops the tag itself.
        assert!(registry.untag("b", "g"));
        assert!(registry.tags().is_empty());
    }

    #[test]
    fn test_by_tag_groups_summaries() {
        let registry = Registry::new();
        registry.new_counter("a").unwrap();
        registry.new_counter("b").unwrap();
        registry.new_counter("c").unwrap();
        registry.tag("a", "g").unwrap();
        registry.tag("b", "g").unwrap();

        registry.notify("a", 1).unwrap();
        registry.notify("b", 2).unwrap();
        registry.notify("c", 3).unwrap();

        let group = registry.by_tag("g");
        assert_eq!(group.len(), 2);
        assert_eq!(group["a"], Summary::Counter { value: 1 });
        assert_eq!(group["b"], Summary::Counter { value: 2 });

        assert!(registry.by_tag("absent").is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = Registry::new();
        registry.new_counter("zeta").unwrap();
        registry.new_gauge("alpha").unwrap();
        registry.new_meter("mid").unwrap();

        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_snapshot_covers_everything() {
        let registry = Registry::new();
        registry.new_counter("a").unwrap();
        registry.new_gauge("b").unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a"].kind(), MetricKind::Counter);
        assert_eq!(snapshot["b"].kind(), MetricKind::Gauge);
    }

    #[test]
    fn test_clear_empties_the_registry() {
        let registry = Registry::new();
        registry.new_counter("a").unwrap();
        registry.tag("a", "g").unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.tags().is_empty());
    }

    #[test]
    fn test_seeded_registries_build_identical_reservoirs() {
        let run = || {
            let registry = Registry::builder().seed(1234).build();
            let histogram = registry
                .new_histogram_with("h", ReservoirConfig::Uniform { size: 4 })
                .unwrap();
            for i in 1..=100 {
                histogram.notify(i).unwrap();
            }
            let mut values = histogram.raw();
            values.sort_by(f64::total_cmp);
            values
        };

        assert_eq!(run(), run());
    }
}
