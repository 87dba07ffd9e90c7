//! Record-scoped built-in names.
//!
//! The registry holds the snapshot of the record currently being processed:
//! its index (`NR`), its raw text (`A0`) and its fields, from which `NF` is
//! derived. All of it is replaced at once by `bind`, so the built-ins always
//! describe the same record. User-defined globals live in the execution
//! context's scope, not here.

use serde_json::json;

use crate::fields::Separator;
use crate::reader::Record;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct Registry {
    nr: u64,
    a0: String,
    fields: Vec<String>,
}

impl Registry {
    /// Replace the snapshot with `record`, split on `separator`.
    pub fn bind(&mut self, record: Record, separator: &Separator) {
        debug_assert!(record.index > self.nr, "record index must increase");
        self.fields = separator.split(&record.text);
        self.a0 = record.text;
        self.nr = record.index;
    }

    /// Record index, 0 before the first record.
    pub fn nr(&self) -> u64 {
        self.nr
    }

    pub fn nf(&self) -> usize {
        self.fields.len()
    }

    pub fn a0(&self) -> &str {
        &self.a0
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Look up a built-in by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "NF" => Some(Value::Int(self.nf() as i64)),
            "NR" => Some(Value::Int(self.nr as i64)),
            "A0" => Some(Value::Text(self.a0.clone())),
            _ => None,
        }
    }

    /// JSON view of the current bindings, for verbose diagnostics.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "NR": self.nr,
            "NF": self.nf(),
            "A0": self.a0,
            "A": Value::List(self.fields.iter().cloned().map(Value::Text).collect()),
        })
    }
}
