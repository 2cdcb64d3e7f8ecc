use std::collections::VecDeque;

use parking_lot::Mutex;

use super::ReservoirConfig;
use crate::clock::Clock;
use crate::stats::Sample;

/// A reservoir of the most recent `size` observations.
///
/// A plain ring buffer: adding beyond capacity drops the oldest entry.
#[derive(Debug)]
pub struct SlidingWindowReservoir {
    size: usize,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    values: VecDeque<f64>,
    count: u64,
}

impl SlidingWindowReservoir {
    /// Creates a reservoir holding the last `size` observations.
    pub fn new(size: usize) -> SlidingWindowReservoir {
        SlidingWindowReservoir {
            size,
            state: Mutex::new(State { values: VecDeque::with_capacity(size), count: 0 }),
        }
    }

    /// Appends an observation, dropping the oldest on overflow.
    pub fn add(&self, value: f64) {
        let mut state = self.state.lock();
        state.count += 1;
        if state.values.len() == self.size {
            state.values.pop_front();
        }
        state.values.push_back(value);
    }

    /// Number of observations currently stored.
    pub fn size(&self) -> usize {
        self.state.lock().values.len()
    }

    /// Total number of observations ever added.
    pub fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// Copies out the live entries, oldest first, with unit weight.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.state.lock().values.iter().copied().map(Sample::unweighted).collect()
    }

    /// The construction parameters.
    pub fn config(&self) -> ReservoirConfig {
        ReservoirConfig::SlidingWindow { size: self.size }
    }
}

/// A reservoir of every observation from the trailing time window.
///
/// Entries are `(timestamp, value)` pairs in arrival order; anything older
/// than the window is pruned on both writes and reads, so a snapshot never
/// contains an expired observation no matter how long the stream has been
/// idle.  Memory is bounded by the observation rate times the window
/// length, not by a fixed capacity.
#[derive(Debug)]
pub struct SlidingTimeReservoir {
    window: f64,
    clock: Clock,
    state: Mutex<TimedState>,
}

#[derive(Debug)]
struct TimedState {
    entries: VecDeque<(f64, f64)>,
    count: u64,
}

impl TimedState {
    fn prune(&mut self, cutoff: f64) {
        while let Some((timestamp, _)) = self.entries.front() {
            if *timestamp < cutoff {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }
}

impl SlidingTimeReservoir {
    /// Creates a reservoir keeping `window_secs` seconds of observations,
    /// timed against the given clock.
    pub fn new(window_secs: f64, clock: Clock) -> SlidingTimeReservoir {
        SlidingTimeReservoir {
            window: window_secs,
            clock,
            state: Mutex::new(TimedState { entries: VecDeque::new(), count: 0 }),
        }
    }

    /// Appends a timestamped observation, pruning expired entries first.
    pub fn add(&self, value: f64) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.count += 1;
        state.prune(now - self.window);
        state.entries.push_back((now, value));
    }

    /// Number of unexpired observations.
    pub fn size(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.prune(now - self.window);
        state.entries.len()
    }

    /// Total number of observations ever added.
    pub fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// Copies out the unexpired values, oldest first, with unit weight.
    pub fn snapshot(&self) -> Vec<Sample> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.prune(now - self.window);
        state.entries.iter().map(|(_, value)| Sample::unweighted(*value)).collect()
    }

    /// The construction parameters.
    pub fn config(&self) -> ReservoirConfig {
        ReservoirConfig::SlidingTime { window_secs: self.window }
    }
}

#[cfg(test)]
mod tests {
    use super::{SlidingTimeReservoir, SlidingWindowReservoir};
    use crate::clock::Clock;
    use std::time::Duration;

    fn values(reservoir: &SlidingTimeReservoir) -> Vec<f64> {
        reservoir.snapshot().iter().map(|s| s.value).collect()
    }

    #[test]
    fn test_window_keeps_the_newest() {
        let reservoir = SlidingWindowReservoir::new(3);
        for i in 1..=5 {
            reservoir.add(i as f64);
        }

        assert_eq!(reservoir.size(), 3);
        assert_eq!(reservoir.count(), 5);

        let live: Vec<f64> = reservoir.snapshot().iter().map(|s| s.value).collect();
        assert_eq!(live, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_window_below_capacity() {
        let reservoir = SlidingWindowReservoir::new(10);
        reservoir.add(1.0);
        reservoir.add(2.0);

        assert_eq!(reservoir.size(), 2);
        let live: Vec<f64> = reservoir.snapshot().iter().map(|s| s.value).collect();
        assert_eq!(live, vec![1.0, 2.0]);
    }

    #[test]
    fn test_timed_expiry_on_add() {
        let (clock, mock) = Clock::mock();
        let reservoir = SlidingTimeReservoir::new(3.0, clock);

        mock.increment(Duration::from_secs(1));
        reservoir.add(1.0);
        mock.increment(Duration::from_millis(100));
        reservoir.add(2.0);
        mock.increment(Duration::from_millis(100));
        reservoir.add(3.0);

        assert_eq!(values(&reservoir), vec![1.0, 2.0, 3.0]);

        // At t=4.05 the entry from t=1.0 has fallen out of the window.
        mock.increment(Duration::from_millis(2850));
        reservoir.add(4.0);
        assert_eq!(values(&reservoir), vec![2.0, 3.0, 4.0]);

        // A long gap empties everything but the newcomer.
        mock.increment(Duration::from_secs(100));
        reservoir.add(5.0);
        assert_eq!(values(&reservoir), vec![5.0]);
        assert_eq!(reservoir.count(), 5);
    }

    #[test]
    fn test_timed_expiry_on_read() {
        let (clock, mock) = Clock::mock();
        let reservoir = SlidingTimeReservoir::new(2.0, clock);

        reservoir.add(1.0);
        mock.increment(Duration::from_secs(1));
        reservoir.add(2.0);

        assert_eq!(reservoir.size(), 2);

        // No further writes; reads must still observe the expiry.
        mock.increment(Duration::from_millis(1500));
        assert_eq!(values(&reservoir), vec![2.0]);
        assert_eq!(reservoir.size(), 1);

        mock.increment(Duration::from_secs(10));
        assert!(values(&reservoir).is_empty());
        assert_eq!(reservoir.size(), 0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let (clock, mock) = Clock::mock();
        let reservoir = SlidingTimeReservoir::new(3.0, clock);

        reservoir.add(1.0);
        // Exactly window seconds later the entry is still live; only
        // strictly older entries are pruned.
        mock.increment(Duration::from_secs(3));
        assert_eq!(values(&reservoir), vec![1.0]);
    }
}
