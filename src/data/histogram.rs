use crate::common::Summary;
use crate::error::Result;
use crate::reservoir::Reservoir;
use crate::stats;
use crate::value::Value;

/// A reservoir-sampled distribution of observations.
///
/// The histogram itself is thin: the sampling discipline lives in the
/// [`Reservoir`] chosen at construction, and `get()` hands the reservoir's
/// snapshot — weights included — to the statistics kernel.  Two histograms
/// over the same stream can therefore tell very different stories: a
/// uniform reservoir describes all time, a decaying one the recent past.
///
/// ```
/// use metron::{Histogram, Reservoir, UniformReservoir, Value};
///
/// let histogram = Histogram::with_reservoir(
///     Reservoir::Uniform(UniformReservoir::new(128)),
/// );
/// for sample in [12.0, 15.5, 13.1] {
///     histogram.notify(Value::Float(sample)).unwrap();
/// }
///
/// let summary = histogram.get();
/// assert_eq!(summary.as_histogram().unwrap().n, 3);
/// ```
#[derive(Debug)]
pub struct Histogram {
    reservoir: Reservoir,
}

impl Histogram {
    /// Creates a histogram over the given reservoir.
    pub fn with_reservoir(reservoir: Reservoir) -> Histogram {
        Histogram { reservoir }
    }

    /// Adds an observation, coerced to a float, to the sample.
    pub fn notify<V>(&self, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        let sample = value.into().as_sample()?;
        self.reservoir.add(sample);
        Ok(())
    }

    /// Computes the statistics of the current sample.
    pub fn get(&self) -> Summary {
        Summary::Histogram(stats::summarize(&self.reservoir.snapshot()))
    }

    /// The stored sample values, unweighted.
    pub fn raw(&self) -> Vec<f64> {
        self.reservoir.values()
    }

    /// The backing reservoir.
    pub fn reservoir(&self) -> &Reservoir {
        &self.reservoir
    }
}
