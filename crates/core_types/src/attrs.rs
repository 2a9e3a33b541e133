use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single attribute value attached to a line, an op, or an embed descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl AttrValue {
    /// `false` is the only value that does not activate a type.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, AttrValue::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(n) => write!(f, "{n}"),
            AttrValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(Arc::from(value))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(Arc::from(value))
    }
}

/// Ordered attribute mapping.
///
/// Ordering is by name so iteration is deterministic across snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: BTreeMap<Arc<str>, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.entries.insert(Arc::from(name), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl<K: AsRef<str>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into()))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_false_is_falsy() {
        assert!(!AttrValue::Bool(false).is_truthy());
        assert!(AttrValue::Bool(true).is_truthy());
        assert!(AttrValue::Int(0).is_truthy());
        assert!(AttrValue::from("").is_truthy());
    }

    #[test]
    fn iteration_is_sorted_by_name() {
        let attrs = Attributes::new().with("link", "u").with("bold", true);
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["bold", "link"]);
    }
}
