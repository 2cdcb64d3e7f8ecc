use parking_lot::Mutex;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

use super::{new_rng, ReservoirConfig};
use crate::stats::Sample;

/// A uniform sampling reservoir.
///
/// Based on Vitter's ["Algorithm R"][vitter_paper]: the first `size`
/// observations fill the sample; afterwards, the n-th observation replaces
/// a random slot with probability `size/n`.  Once the stream has exceeded
/// the capacity, every observation seen so far has equal probability of
/// being in the sample — a uniform picture of the full stream, not of any
/// recent window.
///
/// [vitter_paper]: https://www.cs.umd.edu/~samir/498/vitter.pdf
#[derive(Debug)]
pub struct UniformReservoir {
    size: usize,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    values: Vec<f64>,
    count: u64,
    rng: Xoshiro256StarStar,
}

impl UniformReservoir {
    /// Creates a reservoir holding up to `size` samples, with an
    /// entropy-seeded RNG.
    pub fn new(size: usize) -> UniformReservoir {
        UniformReservoir::with_rng(size, new_rng(None))
    }

    /// Creates a reservoir with a deterministic RNG seed, for reproducible
    /// sampling in tests.
    pub fn with_seed(size: usize, seed: u64) -> UniformReservoir {
        UniformReservoir::with_rng(size, new_rng(Some(seed)))
    }

    pub(crate) fn with_rng(size: usize, rng: Xoshiro256StarStar) -> UniformReservoir {
        UniformReservoir {
            size,
            state: Mutex::new(State { values: Vec::with_capacity(size), count: 0, rng }),
        }
    }

    /// Adds an observation, possibly evicting a random earlier sample.
    pub fn add(&self, value: f64) {
        let mut state = self.state.lock();
        let state = &mut *state;
        state.count += 1;

        if state.values.len() < self.size {
            state.values.push(value);
        } else {
            let slot = state.rng.random_range(0..state.count);
            if slot < self.size as u64 {
                state.values[slot as usize] = value;
            }
        }
    }

    /// Number of observations currently stored.
    pub fn size(&self) -> usize {
        self.state.lock().values.len()
    }

    /// Total number of observations ever added.
    pub fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// Copies out the sample; uniform samples carry unit weight.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.state.lock().values.iter().copied().map(Sample::unweighted).collect()
    }

    /// The construction parameters.
    pub fn config(&self) -> ReservoirConfig {
        ReservoirConfig::Uniform { size: self.size }
    }
}
