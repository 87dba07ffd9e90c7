//! Run configuration.

use serde::Serialize;

use crate::fields::Separator;
use crate::fragment::Fragment;
use crate::reader::Terminator;

/// Everything a run needs besides its input. Fixed once parsed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Options {
    pub separator: Separator,
    pub terminator: Terminator,
    pub verbose: bool,
    /// Per-record fragments, run in this order for every record.
    pub code: Vec<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
}

impl Options {
    /// Startup, per-record and finalization fragments, labelled.
    pub fn fragments(&self) -> (Option<Fragment>, Vec<Fragment>, Option<Fragment>) {
        (
            self.begin.as_deref().map(Fragment::begin),
            Fragment::per_record(&self.code),
            self.end.as_deref().map(Fragment::end),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.separator, Separator::Whitespace);
        assert_eq!(opts.terminator, Terminator::Newline);
        assert!(!opts.verbose);
        assert!(opts.code.is_empty());
    }

    #[test]
    fn fragments_are_labelled() {
        let opts = Options {
            code: vec!["x += 1".into(), "P(x)".into()],
            begin: Some("x = 1".into()),
            ..Options::default()
        };
        let (begin, per_record, end) = opts.fragments();
        assert_eq!(begin.unwrap().label, "BEGIN");
        assert_eq!(per_record[1].label, "arg2");
        assert!(end.is_none());
    }

    #[test]
    fn serializes_for_diagnostics() {
        let opts = Options {
            separator: Separator::Literal(",".into()),
            code: vec!["P(A1)".into()],
            ..Options::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["separator"]["literal"], ",");
        assert_eq!(json["terminator"], "newline");
        assert_eq!(json["code"][0], "P(A1)");
        assert!(json["begin"].is_null());
    }
}
