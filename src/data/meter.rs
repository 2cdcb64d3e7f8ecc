use parking_lot::Mutex;

use crate::clock::Clock;
use crate::common::Summary;
use crate::error::Result;
use crate::ewma::{Ewma, TICK_INTERVAL_SECS};
use crate::value::Value;

/// A throughput estimator.
///
/// Tracks the total event count plus exponentially-weighted moving-average
/// rates over one-minute, five-minute, fifteen-minute, and one-day
/// horizons, in the manner of the Unix load average.  All rates are events
/// per second.
///
/// The meter owns no timer thread.  Instead, every `notify` and every
/// `get` checks how many whole tick intervals have elapsed since the last
/// tick and advances the EWMA units by that many steps: the first catch-up
/// tick rates the pending events, the rest decay the averages exactly as an
/// idle timer would have.  A meter that sits unobserved for an hour and is
/// then read reports rates that have decayed for the full hour, not rates
/// frozen at the last event.
#[derive(Debug)]
pub struct Meter {
    clock: Clock,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    count: i64,
    started: f64,
    last_tick: f64,
    one: Ewma,
    five: Ewma,
    fifteen: Ewma,
    day: Ewma,
}

impl State {
    /// Advances every EWMA by the whole tick intervals elapsed up to `now`.
    fn tick_to(&mut self, now: f64) {
        let elapsed = now - self.last_tick;
        if elapsed < TICK_INTERVAL_SECS {
            return;
        }

        let ticks = (elapsed / TICK_INTERVAL_SECS) as u64;
        for ewma in [&mut self.one, &mut self.five, &mut self.fifteen, &mut self.day] {
            ewma.tick();
            if ticks > 1 {
                ewma.decay(ticks - 1);
            }
        }
        self.last_tick += ticks as f64 * TICK_INTERVAL_SECS;
    }
}

impl Meter {
    /// Creates a meter started at the clock's current time.
    pub fn new(clock: Clock) -> Meter {
        let now = clock.now();
        Meter {
            clock,
            state: Mutex::new(State {
                count: 0,
                started: now,
                last_tick: now,
                one: Ewma::new(60.0),
                five: Ewma::new(300.0),
                fifteen: Ewma::new(900.0),
                day: Ewma::new(86400.0),
            }),
        }
    }

    /// Records events: the amount, coerced to an integer, is added to the
    /// count and rated into every moving average.
    pub fn notify<V>(&self, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        let amount = value.into().as_count()?;
        let now = self.clock.now();

        let mut state = self.state.lock();
        let state = &mut *state;
        state.count += amount;
        for ewma in [&mut state.one, &mut state.five, &mut state.fifteen, &mut state.day] {
            ewma.update(amount);
        }
        state.tick_to(now);
        Ok(())
    }

    /// Computes the current rates, ticking first so the snapshot reflects
    /// any idle time since the last event.
    pub fn get(&self) -> Summary {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.tick_to(now);

        let elapsed = now - state.started;
        let mean = if elapsed > 0.0 { state.count as f64 / elapsed } else { 0.0 };

        Summary::Meter {
            count: state.count,
            mean,
            one: state.one.rate(),
            five: state.five.rate(),
            fifteen: state.fifteen.rate(),
            day: state.day.rate(),
        }
    }

    /// The total event count.
    pub fn raw(&self) -> i64 {
        self.state.lock().count
    }
}
