//! Bounded sampling reservoirs.
//!
//! A reservoir maintains a statistically useful sample of an unbounded
//! observation stream in bounded memory.  Four disciplines are provided:
//!
//! * [`UniformReservoir`] — Vitter's Algorithm R; every observation ever
//!   added has equal probability of being in the sample.
//! * [`SlidingWindowReservoir`] — the last N observations, FIFO.
//! * [`SlidingTimeReservoir`] — every observation from the last W seconds.
//! * [`ExpDecayingReservoir`] — forward-decay priority sampling (Cormode et
//!   al.); recent observations are exponentially more likely to be present,
//!   and snapshots carry the retention priority as a sample weight.
//!
//! Each reservoir serializes its operations behind its own lock; reservoirs
//! never share state, so different instruments proceed in parallel.

use rand::rngs::OsRng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{MetricError, Result};
use crate::stats::Sample;

mod decaying;
mod sliding;
mod uniform;

pub use decaying::ExpDecayingReservoir;
pub use sliding::{SlidingTimeReservoir, SlidingWindowReservoir};
pub use uniform::UniformReservoir;

/// Default capacity of the sampled reservoirs.
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// Default window, in seconds, of the sliding-time reservoir.
pub const DEFAULT_WINDOW_SECS: f64 = 60.0;

/// Default decay factor of the exponentially-decaying reservoir.
pub const DEFAULT_DECAY_ALPHA: f64 = 0.015;

/// Default interval, in seconds, between decay-landmark rescales.
pub const DEFAULT_RESCALE_SECS: f64 = 3600.0;

pub(crate) fn new_rng(seed: Option<u64>) -> Xoshiro256StarStar {
    match seed {
        Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
        None => Xoshiro256StarStar::try_from_rng(&mut OsRng)
            .expect("system entropy source unavailable"),
    }
}

/// Construction parameters for a reservoir, as a tagged union.
///
/// This is both the programmatic configuration surface and the wire shape a
/// dynamic caller submits, e.g. `{"type": "sliding_time", "window_secs": 30}`.
/// Omitted fields take the crate defaults.  The config is retained by the
/// built reservoir so the registry can compare construction parameters when
/// a name is re-registered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservoirConfig {
    /// Uniform sampling over the whole stream.
    Uniform {
        /// Sample capacity.
        #[serde(default = "default_size")]
        size: usize,
    },
    /// The last `size` observations.
    SlidingWindow {
        /// Sample capacity.
        #[serde(default = "default_size")]
        size: usize,
    },
    /// Every observation from the trailing window.
    SlidingTime {
        /// Window length in seconds.
        #[serde(default = "default_window")]
        window_secs: f64,
    },
    /// Forward-decay priority sampling biased toward recent observations.
    ExpDecaying {
        /// Sample capacity.
        #[serde(default = "default_size")]
        size: usize,
        /// Decay factor; larger values forget faster.
        #[serde(default = "default_alpha")]
        alpha: f64,
        /// Seconds between decay-landmark rescales.
        #[serde(default = "default_rescale")]
        rescale_secs: f64,
    },
}

fn default_size() -> usize {
    DEFAULT_RESERVOIR_SIZE
}

fn default_window() -> f64 {
    DEFAULT_WINDOW_SECS
}

fn default_alpha() -> f64 {
    DEFAULT_DECAY_ALPHA
}

fn default_rescale() -> f64 {
    DEFAULT_RESCALE_SECS
}

impl Default for ReservoirConfig {
    fn default() -> ReservoirConfig {
        ReservoirConfig::Uniform { size: DEFAULT_RESERVOIR_SIZE }
    }
}

impl ReservoirConfig {
    /// The config's type name, matching its serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ReservoirConfig::Uniform { .. } => "uniform",
            ReservoirConfig::SlidingWindow { .. } => "sliding_window",
            ReservoirConfig::SlidingTime { .. } => "sliding_time",
            ReservoirConfig::ExpDecaying { .. } => "exp_decaying",
        }
    }

    /// Checks the parameters, rejecting empty capacities and non-positive
    /// windows, decay factors, and rescale intervals.
    pub fn validate(&self) -> Result<()> {
        match *self {
            ReservoirConfig::Uniform { size } | ReservoirConfig::SlidingWindow { size } => {
                if size == 0 {
                    return Err(MetricError::InvalidConfig(format!(
                        "{} reservoir capacity must be at least 1",
                        self.type_name()
                    )));
                }
            }
            ReservoirConfig::SlidingTime { window_secs } => {
                if !window_secs.is_finite() || window_secs <= 0.0 {
                    return Err(MetricError::InvalidConfig(format!(
                        "sliding window of {} seconds is not positive",
                        window_secs
                    )));
                }
            }
            ReservoirConfig::ExpDecaying { size, alpha, rescale_secs } => {
                if size == 0 {
                    return Err(MetricError::InvalidConfig(
                        "exp_decaying reservoir capacity must be at least 1".to_string(),
                    ));
                }
                if !alpha.is_finite() || alpha <= 0.0 {
                    return Err(MetricError::InvalidConfig(format!(
                        "decay alpha of {} is not positive",
                        alpha
                    )));
                }
                if !rescale_secs.is_finite() || rescale_secs <= 0.0 {
                    return Err(MetricError::InvalidConfig(format!(
                        "rescale interval of {} seconds is not positive",
                        rescale_secs
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the reservoir this config describes.
    ///
    /// Time-driven reservoirs read the given clock; sampling reservoirs
    /// seed their RNG from `seed` when given, or system entropy otherwise.
    pub fn build(&self, clock: &Clock, seed: Option<u64>) -> Result<Reservoir> {
        self.validate()?;

        Ok(match *self {
            ReservoirConfig::Uniform { size } => {
                Reservoir::Uniform(UniformReservoir::with_rng(size, new_rng(seed)))
            }
            ReservoirConfig::SlidingWindow { size } => {
                Reservoir::SlidingWindow(SlidingWindowReservoir::new(size))
            }
            ReservoirConfig::SlidingTime { window_secs } => {
                Reservoir::SlidingTime(SlidingTimeReservoir::new(window_secs, clock.clone()))
            }
            ReservoirConfig::ExpDecaying { size, alpha, rescale_secs } => {
                Reservoir::ExpDecaying(ExpDecayingReservoir::with_rng(
                    size,
                    alpha,
                    rescale_secs,
                    clock.clone(),
                    new_rng(seed),
                ))
            }
        })
    }
}

impl std::str::FromStr for ReservoirConfig {
    type Err = MetricError;

    /// Parses a bare type name into a config with default parameters.
    fn from_str(s: &str) -> Result<ReservoirConfig> {
        match s {
            "uniform" => Ok(ReservoirConfig::Uniform { size: DEFAULT_RESERVOIR_SIZE }),
            "sliding_window" => Ok(ReservoirConfig::SlidingWindow { size: DEFAULT_RESERVOIR_SIZE }),
            "sliding_time" => Ok(ReservoirConfig::SlidingTime { window_secs: DEFAULT_WINDOW_SECS }),
            "exp_decaying" => Ok(ReservoirConfig::ExpDecaying {
                size: DEFAULT_RESERVOIR_SIZE,
                alpha: DEFAULT_DECAY_ALPHA,
                rescale_secs: DEFAULT_RESCALE_SECS,
            }),
            other => Err(MetricError::UnknownReservoir(other.to_string())),
        }
    }
}

/// A bounded sample of a numeric stream, in one of the four disciplines.
///
/// All variants share the same contract: `add` is O(1) amortized,
/// `snapshot` is a read-only copy, and operations on one reservoir are
/// serialized by its internal lock.
#[derive(Debug)]
pub enum Reservoir {
    /// Uniform sampling over the whole stream.
    Uniform(UniformReservoir),
    /// The most recent observations by count.
    SlidingWindow(SlidingWindowReservoir),
    /// The most recent observations by time.
    SlidingTime(SlidingTimeReservoir),
    /// Exponentially biased toward recent observations.
    ExpDecaying(ExpDecayingReservoir),
}

impl Reservoir {
    /// Adds an observation to the sample.
    pub fn add(&self, value: f64) {
        match self {
            Reservoir::Uniform(r) => r.add(value),
            Reservoir::SlidingWindow(r) => r.add(value),
            Reservoir::SlidingTime(r) => r.add(value),
            Reservoir::ExpDecaying(r) => r.add(value),
        }
    }

    /// Number of observations currently stored.
    pub fn size(&self) -> usize {
        match self {
            Reservoir::Uniform(r) => r.size(),
            Reservoir::SlidingWindow(r) => r.size(),
            Reservoir::SlidingTime(r) => r.size(),
            Reservoir::ExpDecaying(r) => r.size(),
        }
    }

    /// Total number of observations ever added; monotonic.
    pub fn count(&self) -> u64 {
        match self {
            Reservoir::Uniform(r) => r.count(),
            Reservoir::SlidingWindow(r) => r.count(),
            Reservoir::SlidingTime(r) => r.count(),
            Reservoir::ExpDecaying(r) => r.count(),
        }
    }

    /// Copies out the current sample as weighted values.
    pub fn snapshot(&self) -> Vec<Sample> {
        match self {
            Reservoir::Uniform(r) => r.snapshot(),
            Reservoir::SlidingWindow(r) => r.snapshot(),
            Reservoir::SlidingTime(r) => r.snapshot(),
            Reservoir::ExpDecaying(r) => r.snapshot(),
        }
    }

    /// Copies out the stored values without weights.
    pub fn values(&self) -> Vec<f64> {
        self.snapshot().into_iter().map(|s| s.value).collect()
    }

    /// The construction parameters this reservoir was built from.
    pub fn config(&self) -> ReservoirConfig {
        match self {
            Reservoir::Uniform(r) => r.config(),
            Reservoir::SlidingWindow(r) => r.config(),
            Reservoir::SlidingTime(r) => r.config(),
            Reservoir::ExpDecaying(r) => r.config(),
        }
    }
}
