use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MetricError, Result};

/// A dynamically-typed observation or gauge payload.
///
/// Instruments are polymorphic over their input: a counter coerces its
/// argument to an integer, a histogram to a floating-point sample, and a
/// gauge stores whatever it is given.  `Value` is the tagged variant type
/// carrying that argument across the registry boundary, and serializes to
/// the matching bare JSON value.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The absence of a value; the initial state of a gauge.
    #[default]
    Null,
    /// A boolean, numerically treated as 0 or 1.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// An arbitrary string.
    Str(String),
}

impl Value {
    /// Coerces this value to a signed integer count.
    ///
    /// Finite floats are truncated toward zero, booleans map to 0/1, and
    /// strings must parse as a decimal integer.
    pub fn as_count(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.is_finite() => Ok(*f as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| MetricError::invalid_input(self, "integer")),
            _ => Err(MetricError::invalid_input(self, "integer")),
        }
    }

    /// Coerces this value to a floating-point sample.
    ///
    /// Booleans map to 0.0/1.0 and strings must parse as a float; NaN and
    /// infinities are rejected, as a reservoir holding them would poison
    /// every downstream statistic.
    pub fn as_sample(&self) -> Result<f64> {
        let sample = match self {
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| MetricError::invalid_input(self, "float"))?,
            Value::Null => return Err(MetricError::invalid_input(self, "float")),
        };

        if sample.is_finite() {
            Ok(sample)
        } else {
            Err(MetricError::invalid_input(self, "float"))
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Value {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
