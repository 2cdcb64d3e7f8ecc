use parking_lot::RwLock;

use crate::common::Summary;
use crate::error::Result;
use crate::value::Value;

/// A point-in-time value of arbitrary type.
///
/// A gauge holds whatever it was last given — number, string, boolean, or
/// null — with last-writer-wins semantics.  It starts as null.
#[derive(Debug, Default)]
pub struct Gauge {
    value: RwLock<Value>,
}

impl Gauge {
    /// Creates an empty gauge.
    pub fn new() -> Gauge {
        Gauge { value: RwLock::new(Value::Null) }
    }

    /// Replaces the current value.  Any value is accepted.
    pub fn notify<V>(&self, value: V) -> Result<()>
    where
        V: Into<Value>,
    {
        *self.value.write() = value.into();
        Ok(())
    }

    /// The current summary.
    pub fn get(&self) -> Summary {
        Summary::Gauge { value: self.raw() }
    }

    /// The current value.
    pub fn raw(&self) -> Value {
        self.value.read().clone()
    }
}
