//! Field splitting.

use serde::Serialize;

/// How a record is split into fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// Split on runs of whitespace, ignoring leading and trailing whitespace.
    #[default]
    Whitespace,
    /// Split on every occurrence of the string. Empty fields are kept.
    /// The empty string splits into characters.
    Literal(String),
}

impl Separator {
    /// Build a separator from an optional command line value.
    ///
    /// A single space means the same as no separator at all.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some(" ") => Separator::Whitespace,
            Some(s) => Separator::Literal(s.to_string()),
        }
    }

    /// Split a record into its fields.
    ///
    /// An empty record has no fields in every mode.
    pub fn split(&self, record: &str) -> Vec<String> {
        if record.is_empty() {
            return Vec::new();
        }
        match self {
            Separator::Whitespace => record.split_whitespace().map(str::to_string).collect(),
            Separator::Literal(sep) if sep.is_empty() => {
                record.chars().map(|c| c.to_string()).collect()
            }
            Separator::Literal(sep) => record.split(sep.as_str()).map(str::to_string).collect(),
        }
    }
}
