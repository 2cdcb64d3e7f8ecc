use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::trace;

use super::{new_rng, ReservoirConfig};
use crate::clock::Clock;
use crate::stats::Sample;

/// An exponentially-decaying reservoir.
///
/// Forward-decay priority sampling (Cormode et al.): each observation at
/// age `t − t₀` past the landmark draws priority `exp(α·(t − t₀)) / U` with
/// `U` uniform in (0, 1], and only the `size` highest-priority entries are
/// retained.  Newer observations draw exponentially larger priorities, so
/// the sample is biased toward recent history while still giving older
/// observations a fading chance of survival.  The probability of an
/// observation being present decays by `exp(α·Δt)` relative to newer ones.
///
/// Priorities grow without bound against a fixed landmark, so every
/// `rescale_secs` the landmark is moved up to the current time and every
/// stored priority is scaled by `exp(−α·(t₀' − t₀))`.  After a very long
/// idle period the scale factor underflows and the surviving priorities
/// collapse toward zero, leaving the stale entries to be displaced by the
/// first fresh observations.
///
/// Snapshots report each entry's priority as its sample weight; the
/// statistics kernel folds those weights into every figure it computes,
/// which is what makes the decay visible in summaries.
#[derive(Debug)]
pub struct ExpDecayingReservoir {
    size: usize,
    alpha: f64,
    rescale_interval: f64,
    clock: Clock,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    entries: BTreeMap<OrderedFloat<f64>, f64>,
    landmark: f64,
    next_rescale: f64,
    count: u64,
    rng: Xoshiro256StarStar,
}

impl ExpDecayingReservoir {
    /// Creates a reservoir of the given capacity and decay factor, with an
    /// entropy-seeded RNG.
    pub fn new(size: usize, alpha: f64, rescale_secs: f64, clock: Clock) -> ExpDecayingReservoir {
        ExpDecayingReservoir::with_rng(size, alpha, rescale_secs, clock, new_rng(None))
    }

    /// Creates a reservoir with a deterministic RNG seed, for reproducible
    /// sampling in tests.
    pub fn with_seed(
        size: usize,
        alpha: f64,
        rescale_secs: f64,
        clock: Clock,
        seed: u64,
    ) -> ExpDecayingReservoir {
        ExpDecayingReservoir::with_rng(size, alpha, rescale_secs, clock, new_rng(Some(seed)))
    }

    pub(crate) fn with_rng(
        size: usize,
        alpha: f64,
        rescale_secs: f64,
        clock: Clock,
        rng: Xoshiro256StarStar,
    ) -> ExpDecayingReservoir {
        let landmark = clock.now();
        ExpDecayingReservoir {
            size,
            alpha,
            rescale_interval: rescale_secs,
            clock,
            state: Mutex::new(State {
                entries: BTreeMap::new(),
                landmark,
                next_rescale: landmark + rescale_secs,
                count: 0,
                rng,
            }),
        }
    }

    /// Adds an observation, retaining it only if its drawn priority beats
    /// the current minimum (or the reservoir is not yet full).
    pub fn add(&self, value: f64) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.count += 1;

        if now >= state.next_rescale {
            self.rescale(&mut state, now);
        }

        // U is uniform in (0, 1]; flipping the half-open range keeps the
        // divisor away from zero.
        let uniform = 1.0 - state.rng.random::<f64>();
        let priority = (self.alpha * (now - state.landmark)).exp() / uniform;
        let key = OrderedFloat(priority);

        if state.entries.len() < self.size {
            state.entries.insert(key, value);
        } else {
            let lowest = state.entries.keys().next().copied();
            if let Some(lowest) = lowest {
                if key > lowest {
                    state.entries.remove(&lowest);
                    state.entries.insert(key, value);
                }
            }
        }
    }

    /// Rebases every stored priority onto a landmark at `now`.
    fn rescale(&self, state: &mut State, now: f64) {
        let factor = (-self.alpha * (now - state.landmark)).exp();
        let entries = std::mem::take(&mut state.entries);
        state.entries = entries
            .into_iter()
            .map(|(priority, value)| (OrderedFloat(priority.into_inner() * factor), value))
            .collect();
        state.landmark = now;
        state.next_rescale = now + self.rescale_interval;

        trace!(
            factor,
            landmark = state.landmark,
            retained = state.entries.len(),
            "rescaled decaying reservoir"
        );
    }

    /// Number of observations currently stored.
    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Total number of observations ever added.
    pub fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// Copies out the sample in ascending priority order, with each entry's
    /// priority as its weight.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|(priority, value)| Sample::weighted(*value, priority.into_inner()))
            .collect()
    }

    /// The construction parameters.
    pub fn config(&self) -> ReservoirConfig {
        ReservoirConfig::ExpDecaying {
            size: self.size,
            alpha: self.alpha,
            rescale_secs: self.rescale_interval,
        }
    }
}
