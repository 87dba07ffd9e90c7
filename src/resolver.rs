//! Field accessor resolution.
//!
//! Maps a symbolic name to a field-derived value, in a fixed order:
//!
//! | Name      | Resolves to                                    |
//! |-----------|------------------------------------------------|
//! | `A`       | all fields as text                             |
//! | `N`       | all fields as integers                         |
//! | `D`       | all fields as floats                           |
//! | `A<k>`    | field `k` (1-based) as text                    |
//! | `N<k>`    | field `k` as integer                           |
//! | `D<k>`    | field `k` as float                             |
//! | otherwise | a registry built-in (`NF`, `NR`, `A0`)         |
//!
//! A positional access past the last field is `Missing`, not an error.
//! Anything else is `Unresolved` and left to the caller.

use std::sync::LazyLock;

use regex::Regex;

use crate::coerce;
use crate::registry::Registry;
use crate::value::Value;

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([AND])([1-9]\d*)$").expect("field name pattern is valid"));

/// How field text is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Text,
    Int,
    Float,
}

impl Coercion {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "A" => Some(Coercion::Text),
            "N" => Some(Coercion::Int),
            "D" => Some(Coercion::Float),
            _ => None,
        }
    }

    pub fn apply(self, field: &str) -> Value {
        match self {
            Coercion::Text => Value::Text(field.to_string()),
            Coercion::Int => Value::Int(coerce::to_int(field)),
            Coercion::Float => Value::Float(coerce::to_float(field)),
        }
    }
}

/// A parsed field-access name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The whole field list.
    All(Coercion),
    /// One field by 1-based position.
    Field(Coercion, usize),
}

impl Access {
    /// Parse a field-access name, or `None` if `name` is not one.
    pub fn parse(name: &str) -> Option<Self> {
        if !name.starts_with(['A', 'N', 'D']) {
            return None;
        }
        if let Some(coercion) = Coercion::from_prefix(name) {
            return Some(Access::All(coercion));
        }
        let caps = FIELD_NAME.captures(name)?;
        let coercion = Coercion::from_prefix(&caps[1])?;
        // Positions too large for usize are past the end of any record.
        let position = caps[2].parse::<usize>().unwrap_or(usize::MAX);
        Some(Access::Field(coercion, position))
    }
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(Value),
    /// A field position past the end of the record.
    Missing,
    /// Not a field access or built-in.
    Unresolved,
}

/// Resolve `name` against the current record snapshot.
pub fn resolve(registry: &Registry, name: &str) -> Resolution {
    match Access::parse(name) {
        Some(Access::All(coercion)) => Resolution::Value(Value::List(
            registry
                .fields()
                .iter()
                .map(|f| coercion.apply(f))
                .collect(),
        )),
        Some(Access::Field(coercion, position)) => field_at(registry, position, coercion),
        None => registry
            .get(name)
            .map_or(Resolution::Unresolved, Resolution::Value),
    }
}

/// Field `position` (1-based) coerced with `coercion`.
///
/// Position 0 and positions past `NF` are `Missing`.
pub fn field_at(registry: &Registry, position: usize, coercion: Coercion) -> Resolution {
    match position
        .checked_sub(1)
        .and_then(|i| registry.fields().get(i))
    {
        Some(field) => Resolution::Value(coercion.apply(field)),
        None => Resolution::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Separator;
    use crate::reader::Record;

    fn registry(text: &str, separator: Separator) -> Registry {
        let mut reg = Registry::default();
        reg.bind(
            Record {
                index: 1,
                text: text.to_string(),
            },
            &separator,
        );
        reg
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn parse_names() {
        assert_eq!(Access::parse("A"), Some(Access::All(Coercion::Text)));
        assert_eq!(Access::parse("N"), Some(Access::All(Coercion::Int)));
        assert_eq!(Access::parse("D12"), Some(Access::Field(Coercion::Float, 12)));
        assert_eq!(Access::parse("A0"), None);
        assert_eq!(Access::parse("A01"), None);
        assert_eq!(Access::parse("NF"), None);
        assert_eq!(Access::parse("NR"), None);
        assert_eq!(Access::parse("B1"), None);
        assert_eq!(Access::parse("a1"), None);
        assert_eq!(Access::parse("N1x"), None);
    }

    #[test]
    fn huge_position_is_missing() {
        let reg = registry("a b", Separator::Whitespace);
        assert_eq!(
            resolve(&reg, "A99999999999999999999999"),
            Resolution::Missing
        );
    }

    #[test]
    fn whole_field_lists() {
        let reg = registry("3 x 4.5", Separator::Whitespace);
        assert_eq!(
            resolve(&reg, "A"),
            Resolution::Value(Value::List(vec![text("3"), text("x"), text("4.5")]))
        );
        assert_eq!(
            resolve(&reg, "N"),
            Resolution::Value(Value::List(vec![
                Value::Int(3),
                Value::Int(0),
                Value::Int(4)
            ]))
        );
        assert_eq!(
            resolve(&reg, "D"),
            Resolution::Value(Value::List(vec![
                Value::Float(3.0),
                Value::Float(0.0),
                Value::Float(4.5)
            ]))
        );
    }

    #[test]
    fn single_fields() {
        let reg = registry("7 seven 2.5", Separator::Whitespace);
        assert_eq!(resolve(&reg, "A2"), Resolution::Value(text("seven")));
        assert_eq!(resolve(&reg, "N1"), Resolution::Value(Value::Int(7)));
        assert_eq!(resolve(&reg, "N2"), Resolution::Value(Value::Int(0)));
        assert_eq!(resolve(&reg, "D3"), Resolution::Value(Value::Float(2.5)));
        assert_eq!(resolve(&reg, "D2"), Resolution::Value(Value::Float(0.0)));
    }

    #[test]
    fn one_past_the_end_is_missing() {
        let reg = registry("a b c", Separator::Whitespace);
        assert_eq!(resolve(&reg, "A3"), Resolution::Value(text("c")));
        assert_eq!(resolve(&reg, "A4"), Resolution::Missing);
        assert_eq!(resolve(&reg, "N4"), Resolution::Missing);
        assert_eq!(resolve(&reg, "D4"), Resolution::Missing);
    }

    #[test]
    fn empty_interior_field() {
        let reg = registry("a,b,,d", Separator::Literal(",".into()));
        assert_eq!(resolve(&reg, "A3"), Resolution::Value(text("")));
        assert_eq!(resolve(&reg, "NF"), Resolution::Value(Value::Int(4)));
    }

    #[test]
    fn builtins_and_unknowns() {
        let reg = registry("hello world", Separator::Whitespace);
        assert_eq!(resolve(&reg, "NR"), Resolution::Value(Value::Int(1)));
        assert_eq!(resolve(&reg, "A0"), Resolution::Value(text("hello world")));
        assert_eq!(resolve(&reg, "total"), Resolution::Unresolved);
        assert_eq!(resolve(&reg, "Apple"), Resolution::Unresolved);
    }

    #[test]
    fn field_at_position_zero_is_missing() {
        let reg = registry("a", Separator::Whitespace);
        assert_eq!(field_at(&reg, 0, Coercion::Text), Resolution::Missing);
        assert_eq!(field_at(&reg, 1, Coercion::Text), Resolution::Value(text("a")));
    }
}
