use std::sync::atomic::{AtomicI64, Ordering};

use crate::common::Summary;
use crate::error::Result;
use crate::value::Value;

/// A signed accumulator.
///
/// `notify` adds its argument — negative to decrement — and reads report
/// the running total.  Updates are a single atomic add; counters never
/// block.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    /// Creates a counter at zero.
    pub fn new() -> Counter {
        Counter { value: AtomicI64::new(0) }
    }

    /// Adds the given amount, coerced to an integer, to the total.
    pub fn notify<V>(&self, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        let amount = value.into().as_count()?;
        self.value.fetch_add(amount, Ordering::Relaxed);
        Ok(())
    }

    /// The current summary.
    pub fn get(&self) -> Summary {
        Summary::Counter { value: self.raw() }
    }

    /// The accumulated total.
    pub fn raw(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::Counter;
    use crate::common::Summary;
    use crate::value::Value;

    #[test]
    fn test_accumulates_signed_values() {
        let counter = Counter::new();
        counter.notify(10).unwrap();
        counter.notify(-3).unwrap();

        assert_eq!(counter.get(), Summary::Counter { value: 7 });
        assert_eq!(counter.raw(), 7);
    }

    #[test]
    fn test_coerces_loosely_typed_input() {
        let counter = Counter::new();
        counter.notify(2.9).unwrap();
        counter.notify("5").unwrap();
        counter.notify(true).unwrap();

        assert_eq!(counter.raw(), 8);
    }

    #[test]
    fn test_rejected_input_leaves_state_untouched() {
        let counter = Counter::new();
        counter.notify(1).unwrap();

        assert!(counter.notify(Value::Null).is_err());
        assert!(counter.notify("a lot").is_err());
        assert_eq!(counter.raw(), 1);
    }
}
