//! Exponentially-weighted moving average rate estimation.
//!
//! An [`Ewma`] tracks an event rate over a fixed time horizon, advanced by a
//! fixed-interval tick.  It is the building block of the
//! [`Meter`](crate::Meter) instrument, which composes one unit per horizon
//! and drives their ticks from the shared clock.

/// Interval, in seconds, between EWMA ticks.
pub const TICK_INTERVAL_SECS: f64 = 5.0;

/// An exponentially-weighted moving average over a fixed window.
///
/// Events accumulate into `uncounted` via [`update`](Ewma::update); every
/// tick converts the pending total into an instantaneous per-second rate and
/// folds it into the running average with smoothing factor
/// `alpha = 1 − exp(−T/W)`.  The rate starts at zero and converges toward
/// the observed rate, so a fresh unit under-reports until roughly one window
/// has elapsed; idle ticks decay it back toward zero.
///
/// The unit carries no lock: the owning instrument serializes access.
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    interval: f64,
    rate: f64,
    uncounted: f64,
}

impl Ewma {
    /// Creates a unit averaging over `window_secs`, ticked every
    /// [`TICK_INTERVAL_SECS`].
    pub fn new(window_secs: f64) -> Ewma {
        Ewma::with_interval(window_secs, TICK_INTERVAL_SECS)
    }

    /// Creates a unit with an explicit tick interval.
    pub fn with_interval(window_secs: f64, interval: f64) -> Ewma {
        Ewma {
            alpha: 1.0 - (-interval / window_secs).exp(),
            interval,
            rate: 0.0,
            uncounted: 0.0,
        }
    }

    /// Adds `n` events to the pending total.  No time bookkeeping happens
    /// here; the events are rated at the next tick.
    pub fn update(&mut self, n: i64) {
        self.uncounted += n as f64;
    }

    /// Advances the average by one tick interval.
    pub fn tick(&mut self) {
        let instant = self.uncounted / self.interval;
        self.uncounted = 0.0;
        self.rate += self.alpha * (instant - self.rate);
    }

    /// Advances the average by `ticks` empty tick intervals at once.
    ///
    /// Equivalent to calling [`tick`](Ewma::tick) that many times with no
    /// pending events: the rate decays geometrically by `(1 − alpha)` per
    /// interval.  Used to catch up after idle gaps without looping.
    pub fn decay(&mut self, ticks: u64) {
        debug_assert_eq!(self.uncounted, 0.0);
        self.rate *= (1.0 - self.alpha).powf(ticks as f64);
    }

    /// Returns the current rate in events per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}
