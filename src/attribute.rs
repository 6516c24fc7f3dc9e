//! Runtime side of the generated code: typed key/value attributes and the
//! `Exportable` capability generated types implement.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    BoolSlice(Vec<bool>),
    Int64Slice(Vec<i64>),
    Float64Slice(Vec<f64>),
    StringSlice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

/// A type whose data can be exported as an ordered list of attributes.
pub trait Exportable {
    /// The attributes, in declaration order.
    fn attributes(&self) -> Vec<KeyValue>;
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self { key: key.into(), value }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int64(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float64(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn string_slice(key: impl Into<String>, value: Vec<String>) -> Self {
        Self::new(key, Value::StringSlice(value))
    }

    pub fn int64_slice(key: impl Into<String>, value: Vec<i64>) -> Self {
        Self::new(key, Value::Int64Slice(value))
    }

    pub fn float64_slice(key: impl Into<String>, value: Vec<f64>) -> Self {
        Self::new(key, Value::Float64Slice(value))
    }

    pub fn bool_slice(key: impl Into<String>, value: Vec<bool>) -> Self {
        Self::new(key, Value::BoolSlice(value))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::BoolSlice(v) => write!(f, "{v:?}"),
            Value::Int64Slice(v) => write!(f, "{v:?}"),
            Value::Float64Slice(v) => write!(f, "{v:?}"),
            Value::StringSlice(v) => write!(f, "{v:?}"),
        }
    }
}
