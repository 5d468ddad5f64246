//! Caller-supplied parameters and typed SQL values.

use std::collections::BTreeMap;
use std::fmt;

/// A typed SQL value, as bound to a statement or read back from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in parameter trace lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::Text(_) => "Text",
            Value::Blob(_) => "Blob",
            Value::Boolean(_) => "Boolean",
        }
    }
}

/// String representation of a value. NULL renders as `null`, blobs as lowercase hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{:?}", v),
            Value::Text(v) => f.write_str(v),
            Value::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Value::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// The parameter object passed alongside a statement.
///
/// A scalar binds to every placeholder of the statement; a map binds by
/// placeholder name.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Parameter {
    #[default]
    None,
    Scalar(Value),
    Map(BTreeMap<String, Value>),
}

impl Parameter {
    /// Build a map parameter from `(name, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Parameter::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up the value a placeholder named `name` should receive.
    ///
    /// Returns `None` only when a map parameter has no entry for `name`.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        match self {
            Parameter::None => Some(Value::Null),
            Parameter::Scalar(v) => Some(v.clone()),
            Parameter::Map(map) => map.get(name).cloned(),
        }
    }
}

macro_rules! scalar_parameter_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Parameter {
                fn from(v: $ty) -> Self {
                    Parameter::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_parameter_from!(Value, i64, i32, f64, bool, &str, String, Vec<u8>);
