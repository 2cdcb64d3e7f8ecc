//! In-process application metrics.
//!
//! `metron` maintains a registry of named metric instruments that ingest
//! observations at high frequency, keep bounded statistical state, and
//! expose computed summaries to whatever wants to collect them — an HTTP
//! endpoint, a periodic reporter, a log line.  It is not a store: the crate
//! hands out snapshots and downstream systems do the keeping.
//!
//! # Instruments
//!
//! Four instrument kinds are provided, each supporting the same three
//! operations — `notify` to ingest, `get` to compute a summary, and `raw`
//! to inspect the underlying state:
//!
//! * **Counter** — a signed accumulator.
//! * **Gauge** — a point-in-time value of arbitrary type, last writer wins.
//! * **Histogram** — a statistical sample of a value stream, backed by a
//!   bounded reservoir.  Summaries include extrema, weighted moments
//!   through kurtosis, interpolated percentiles, and an auto-binned
//!   distribution.
//! * **Meter** — an event-rate estimator in the style of the Unix load
//!   average, with EWMA rates at one-minute, five-minute, fifteen-minute,
//!   and one-day horizons.
//!
//! ```
//! use metron::{Registry, Value};
//!
//! let registry = Registry::new();
//!
//! let latency = registry.new_histogram("db.latency").unwrap();
//! latency.notify(Value::Float(0.0123)).unwrap();
//! latency.notify(Value::Float(0.0087)).unwrap();
//!
//! let summary = latency.get();
//! let stats = summary.as_histogram().unwrap();
//! assert_eq!(stats.n, 2);
//! ```
//!
//! # Reservoirs
//!
//! Histograms delegate all sampling policy to a [`Reservoir`], chosen at
//! construction:
//!
//! * [`UniformReservoir`] — a uniform sample of the entire stream
//!   (Vitter's Algorithm R).
//! * [`SlidingWindowReservoir`] — the last N observations.
//! * [`SlidingTimeReservoir`] — everything from the last W seconds.
//! * [`ExpDecayingReservoir`] — forward-decay priority sampling, biased
//!   toward recent history; its snapshots are weighted and the statistics
//!   kernel honors those weights.
//!
//! Reservoir choice is data: a [`ReservoirConfig`] is a serializable tagged
//! union, so dynamic callers can submit
//! `{"type": "sliding_time", "window_secs": 30}` and get the histogram they
//! asked for.
//!
//! # The registry
//!
//! Instruments live in a [`Registry`] under unique names, optionally
//! grouped by string tags.  Registration is idempotent for identical
//! requests and an error for conflicting ones; deletion detaches tags.
//! Summaries can be pulled per instrument, per tag, or for the whole
//! registry at once.  A process-wide default registry is available through
//! free functions ([`new_counter`], [`by_tag`], …) for applications that
//! want zero plumbing, and private registries can be built — with their own
//! clock and RNG seed — for everything else:
//!
//! ```
//! use metron::{Clock, Registry};
//!
//! let (clock, mock) = Clock::mock();
//! let registry = Registry::builder().clock(clock).seed(42).build();
//!
//! let meter = registry.new_meter("jobs").unwrap();
//! meter.notify(metron::Value::Int(3)).unwrap();
//! # let _ = mock;
//! ```
//!
//! # Concurrency
//!
//! The registry guards its name and tag tables with one coarse lock, held
//! only for table work.  Every instrument synchronizes itself, so `notify`
//! and `get` on the same instrument exclude each other while different
//! instruments proceed in parallel, and within one instrument every
//! summary observes a prefix of that instrument's observation sequence.
//! The crate owns no background threads and never blocks beyond mutex
//! acquisition.
//!
//! # Time
//!
//! All time-driven behavior — sliding windows, decay, meter ticks — reads
//! an injectable [`Clock`].  [`Clock::mock`] returns a manually-advanced
//! clock, which is how every time-dependent test in this crate is written.

#![deny(missing_docs)]

mod builder;
mod clock;
mod common;
mod data;
mod error;
mod ewma;
mod global;
mod registry;
mod reservoir;
mod stats;
mod value;

pub use self::builder::Builder;
pub use self::clock::Clock;
pub use self::common::{MetricKind, Raw, Summary};
pub use self::data::{Counter, Gauge, Histogram, Meter, Metric};
pub use self::error::{MetricError, Result};
pub use self::ewma::{Ewma, TICK_INTERVAL_SECS};
pub use self::global::{
    by_tag, create, default_registry, delete, get, metric, names, new_counter, new_gauge,
    new_histogram, new_histogram_with, new_meter, notify, snapshot, tag, tags, untag,
};
pub use self::registry::Registry;
pub use self::reservoir::{
    ExpDecayingReservoir, Reservoir, ReservoirConfig, SlidingTimeReservoir,
    SlidingWindowReservoir, UniformReservoir, DEFAULT_DECAY_ALPHA, DEFAULT_RESCALE_SECS,
    DEFAULT_RESERVOIR_SIZE, DEFAULT_WINDOW_SECS,
};
pub use self::stats::{summarize, HistogramSummary, Sample, PERCENTILE_LEVELS};
pub use self::value::Value;
