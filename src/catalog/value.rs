//! SQL value representation and value conversion

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value bound to a statement parameter or carried in a property overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Bridge for callers holding JSON-shaped property overlays.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

/// Paired conversion functions between a domain value and its physical
/// storage representation (e.g. enum ordinal <-> enum name text).
///
/// Applied symmetrically: assignment values and predicate comparison
/// literals against a converted column both pass through `to_storage`
/// before parameter binding, so stored and filtered representations match.
#[derive(Debug, Clone, Copy)]
pub struct ValueConverter {
    pub to_storage: fn(&SqlValue) -> SqlValue,
    pub from_storage: fn(&SqlValue) -> SqlValue,
}

impl ValueConverter {
    pub fn new(to_storage: fn(&SqlValue) -> SqlValue, from_storage: fn(&SqlValue) -> SqlValue) -> Self {
        Self {
            to_storage,
            from_storage,
        }
    }

    /// Domain -> storage. Null passes through unconverted.
    pub fn store(&self, value: &SqlValue) -> SqlValue {
        if value.is_null() {
            SqlValue::Null
        } else {
            (self.to_storage)(value)
        }
    }

    /// Storage -> domain. Null passes through unconverted.
    pub fn load(&self, value: &SqlValue) -> SqlValue {
        if value.is_null() {
            SqlValue::Null
        } else {
            (self.from_storage)(value)
        }
    }
}
