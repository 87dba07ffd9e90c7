//! rawk: run Rhai script fragments over line-oriented records.
//!
//! Each input record is split into fields and exposed to the fragments
//! through a handful of names: `A0` (the record), `NR` (its index), `NF`
//! (its field count), `A`/`N`/`D` (all fields as text, integers, floats)
//! and `A1`, `N2`, `D3`, ... (single fields). All fragments share one
//! execution context for the whole run.

pub mod coerce;
pub mod context;
pub mod driver;
pub mod error;
pub mod fields;
pub mod fragment;
pub mod interrupt;
pub mod options;
pub mod output;
pub mod reader;
pub mod registry;
pub mod resolver;
pub mod value;
