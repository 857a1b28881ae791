//! Typed key-value details attached to a log event
//!
//! Details keep their insertion order, and every value remembers its runtime
//! type so that structured formatters can serialize it natively.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// Value type for structured detail fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Null,
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::String(s) => write!(f, "{}", s),
            DetailValue::Int(i) => write!(f, "{}", i),
            DetailValue::UInt(u) => write!(f, "{}", u),
            DetailValue::Float(fl) => write!(f, "{}", fl),
            DetailValue::Bool(b) => write!(f, "{}", b),
            DetailValue::DateTime(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            DetailValue::Null => write!(f, "null"),
        }
    }
}

impl DetailValue {
    /// Best-effort conversion of any debuggable value
    pub fn from_debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        DetailValue::String(format!("{:?}", value))
    }

    /// Runtime type name written next to the value by JSON and XML output
    pub fn type_name(&self) -> &'static str {
        match self {
            DetailValue::String(_) => "String",
            DetailValue::Int(_) => "Int64",
            DetailValue::UInt(_) => "UInt64",
            DetailValue::Float(_) => "Double",
            DetailValue::Bool(_) => "Boolean",
            DetailValue::DateTime(_) => "DateTime",
            DetailValue::Null => "Null",
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Non-finite floats have no JSON representation and fall back to their
    /// string form instead of failing the whole event.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DetailValue::String(s) => serde_json::Value::String(s.clone()),
            DetailValue::Int(i) => serde_json::Value::Number((*i).into()),
            DetailValue::UInt(u) => serde_json::Value::Number((*u).into()),
            DetailValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            DetailValue::Bool(b) => serde_json::Value::Bool(*b),
            DetailValue::DateTime(_) => serde_json::Value::String(self.to_string()),
            DetailValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        DetailValue::String(s)
    }
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        DetailValue::String(s.to_string())
    }
}

macro_rules! detail_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for DetailValue {
            fn from(i: $t) -> Self {
                DetailValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! detail_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for DetailValue {
            fn from(u: $t) -> Self {
                DetailValue::UInt(u as u64)
            }
        })*
    };
}

detail_from_signed!(i8, i16, i32, i64, isize);
detail_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f64> for DetailValue {
    fn from(f: f64) -> Self {
        DetailValue::Float(f)
    }
}

impl From<f32> for DetailValue {
    fn from(f: f32) -> Self {
        DetailValue::Float(f as f64)
    }
}

impl From<bool> for DetailValue {
    fn from(b: bool) -> Self {
        DetailValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for DetailValue {
    fn from(dt: DateTime<Utc>) -> Self {
        DetailValue::DateTime(dt)
    }
}

impl<T: Into<DetailValue>> From<Option<T>> for DetailValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DetailValue::Null)
    }
}

/// One labelled value in a log event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogDetail {
    pub label: String,
    pub value: DetailValue,
}

impl LogDetail {
    pub fn new(label: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for LogDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)
    }
}
