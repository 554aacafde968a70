//! Cell values and column keys.
//!
//! [`Value`] is the closed set of things a column can hand out from
//! `value_at`. [`Key`] addresses a column inside a dataframe; besides
//! caller-supplied names it has reserved variants that can never collide
//! with them.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Character appended to a column name until it no longer collides.
pub const COLLISION_MARKER: char = '$';

/// Name used for columns without a name when building named rows.
pub const UNNAMED: &str = "unnamed";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(Rc<str>),
    /// A level id of some partition (e.g. a parent level).
    Level(usize),
    /// A set of source row indices.
    Positions(Rc<BTreeSet<usize>>),
    /// A tuple of values, produced by composite columns and pair accumulators.
    Tuple(Rc<[Value]>),
    /// A missing value.
    #[default]
    Null,
}

impl Value {
    /// Get as f64, or None if not a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as level id.
    #[must_use]
    pub fn as_level(&self) -> Option<usize> {
        match self {
            Value::Level(l) => Some(*l),
            _ => None,
        }
    }

    /// Get as a set of row positions.
    #[must_use]
    pub fn as_positions(&self) -> Option<&BTreeSet<usize>> {
        match self {
            Value::Positions(p) => Some(p),
            _ => None,
        }
    }

    /// Get tuple members.
    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Build a tuple value.
    #[must_use]
    pub fn tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(values.into_iter().collect())
    }

    /// Build a positions value.
    #[must_use]
    pub fn positions(rows: impl IntoIterator<Item = usize>) -> Self {
        Value::Positions(Rc::new(rows.into_iter().collect()))
    }

    /// Check for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Level(l) => write!(f, "{l}"),
            Value::Positions(p) => {
                f.write_str("{")?;
                for (i, row) in p.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{row}")?;
                }
                f.write_str("}")
            }
            Value::Tuple(t) => {
                f.write_str("(")?;
                for (i, v) in t.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Value::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::Text(s)
    }
}

impl From<usize> for Value {
    fn from(level: usize) -> Self {
        Value::Level(level)
    }
}

/// Key of a column (or reducer) inside a dataframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A caller-supplied name.
    Name(Rc<str>),
    /// The constant-1 column every dataframe owns.
    Indicator,
    /// Per-level set of source row indices on factor level data.
    Positions,
    /// Per-level coarser level id on nested factor level data.
    Parent,
}

impl Key {
    /// Get the caller-supplied name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Check for a reserved key.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        !matches!(self, Key::Name(_))
    }

    /// Append [`COLLISION_MARKER`] to a named key until `taken` rejects it.
    ///
    /// Reserved keys are returned unchanged.
    #[must_use]
    pub fn disambiguate(self, taken: impl Fn(&Key) -> bool) -> Key {
        let name = match self {
            Key::Name(name) => name,
            reserved => return reserved,
        };

        let mut candidate = name.to_string();
        while taken(&Key::Name(Rc::from(candidate.as_str()))) {
            candidate.push(COLLISION_MARKER);
        }
        Key::Name(Rc::from(candidate))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Indicator => f.write_str("<indicator>"),
            Key::Positions => f.write_str("<positions>"),
            Key::Parent => f.write_str("<parent>"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        let num: Value = 42.0.into();
        assert_eq!(num.as_f64(), Some(42.0));
        assert_eq!(num.as_str(), None);

        let text: Value = "hello".into();
        assert_eq!(text.as_str(), Some("hello"));
        assert_eq!(text.as_f64(), None);

        let level: Value = 3usize.into();
        assert_eq!(level.as_level(), Some(3));
    }

    #[test]
    fn test_value_positions() {
        let p = Value::positions([3, 1, 2, 1]);
        let set = p.as_positions().unwrap();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(p.to_string(), "{1, 2, 3}");
    }

    #[test]
    fn test_value_tuple_display() {
        let t = Value::tuple([Value::from(1.0), Value::from("y")]);
        assert_eq!(t.as_tuple().unwrap().len(), 2);
        assert_eq!(t.to_string(), "(1, y)");
    }

    #[test]
    fn test_value_default_is_null() {
        assert!(Value::default().is_null());
    }

    #[test]
    fn test_key_disambiguate() {
        let taken = [Key::from("x"), Key::from("x$")];
        let key = Key::from("x").disambiguate(|k| taken.contains(k));
        assert_eq!(key, Key::from("x$$"));
    }

    #[test]
    fn test_key_disambiguate_free_name() {
        let key = Key::from("y").disambiguate(|_| false);
        assert_eq!(key.name(), Some("y"));
    }

    #[test]
    fn test_reserved_keys_never_renamed() {
        let key = Key::Positions.disambiguate(|_| true);
        assert_eq!(key, Key::Positions);
        assert!(key.is_reserved());
        assert!(!Key::from("positions").is_reserved());
    }
}
