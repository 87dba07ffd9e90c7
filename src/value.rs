//! Values produced by field access.
//!
//! A `Value` is what the resolver hands back for a name: the raw text of a
//! field, a coerced number, or the whole field list. Scripts see these as
//! Rhai `Dynamic`s; `Value::into_dynamic` does the conversion.

use rhai::Dynamic;
use serde::Serialize;

/// A field-derived value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    List(Vec<Value>),
}

impl Value {
    /// Convert into the evaluator's dynamic value.
    pub fn into_dynamic(self) -> Dynamic {
        match self {
            Value::Text(s) => Dynamic::from(s),
            Value::Int(n) => Dynamic::from(n),
            Value::Float(x) => Dynamic::from(x),
            Value::List(items) => {
                Dynamic::from_array(items.into_iter().map(Value::into_dynamic).collect())
            }
        }
    }
}
