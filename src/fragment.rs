//! Script fragments.

use rhai::AST;

/// Label of the startup fragment.
pub const BEGIN: &str = "BEGIN";
/// Label of the finalization fragment.
pub const END: &str = "END";

/// A unit of user script text, labelled for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub label: String,
    pub source: String,
}

impl Fragment {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }

    /// The startup fragment.
    pub fn begin(source: impl Into<String>) -> Self {
        Self::new(BEGIN, source)
    }

    /// The finalization fragment.
    pub fn end(source: impl Into<String>) -> Self {
        Self::new(END, source)
    }

    /// Per-record fragments, labelled `arg1`, `arg2`, ... in order.
    pub fn per_record<S: AsRef<str>>(sources: &[S]) -> Vec<Self> {
        sources
            .iter()
            .zip(1..)
            .map(|(source, idx)| Self::new(format!("arg{}", idx), source.as_ref()))
            .collect()
    }
}

/// A fragment compiled by the execution context's engine.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub label: String,
    pub(crate) ast: AST,
}
