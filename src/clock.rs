use std::sync::Arc;

/// A monotonic time source, measured in seconds.
///
/// All time-driven state in this crate — sliding windows, decay landmarks,
/// meter ticks — reads the same `Clock`, handed down from the owning
/// [`Registry`](crate::Registry) at construction time.  Clones share the
/// same origin, so every consumer observes a single coherent timeline.
///
/// The mocked variant is the only way to test time-driven behavior
/// deterministically; see [`Clock::mock`].
#[derive(Debug, Clone)]
pub struct Clock {
    inner: quanta::Clock,
    origin: quanta::Instant,
}

impl Clock {
    /// Creates a new `Clock` backed by the system's monotonic counter.
    pub fn new() -> Clock {
        let inner = quanta::Clock::new();
        let origin = inner.now();
        Clock { inner, origin }
    }

    /// Creates a mocked `Clock`, along with a handle to control it.
    ///
    /// The clock starts at zero and only advances when the returned
    /// [`quanta::Mock`] is incremented:
    ///
    /// ```
    /// use std::time::Duration;
    /// use metron::Clock;
    ///
    /// let (clock, mock) = Clock::mock();
    /// assert_eq!(clock.now(), 0.0);
    ///
    /// mock.increment(Duration::from_secs(5));
    /// assert_eq!(clock.now(), 5.0);
    /// ```
    pub fn mock() -> (Clock, Arc<quanta::Mock>) {
        let (inner, mock) = quanta::Clock::mock();
        let origin = inner.now();
        (Clock { inner, origin }, mock)
    }

    /// Returns the number of seconds elapsed since this clock was created.
    pub fn now(&self) -> f64 {
        (self.inner.now() - self.origin).as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Clock {
        Clock::new()
    }
}
