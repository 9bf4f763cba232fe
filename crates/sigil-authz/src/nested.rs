//! Arbitrarily nested lists of ability or role identifiers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A leaf or a list of further nested values.
///
/// Grants often arrive as a mix of strings and lists of strings; flattening
/// is depth-unlimited and keeps order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    /// A single value.
    Leaf(T),
    /// A list of nested values.
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// An empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::List(Vec::new())
    }

    /// Every leaf, in order.
    #[must_use]
    pub fn flatten(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    /// Whether the tree holds no leaves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::List(items) => items.iter().all(Self::is_empty),
        }
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Self::Leaf(value) => out.push(value),
            Self::List(items) => {
                for item in items {
                    item.collect_into(out);
                }
            },
        }
    }
}

impl Nested<String> {
    /// Read a JSON value: strings become leaves, arrays recurse and anything
    /// else contributes nothing.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Leaf(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            _ => Self::empty(),
        }
    }
}

impl<T> Default for Nested<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for Nested<String> {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_owned())
    }
}

impl From<String> for Nested<String> {
    fn from(value: String) -> Self {
        Self::Leaf(value)
    }
}

impl From<Vec<&str>> for Nested<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(Self::from).collect())
    }
}

impl From<Vec<String>> for Nested<String> {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::Leaf).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Nested<String> {
    fn from(values: [&str; N]) -> Self {
        Self::List(values.into_iter().map(Self::from).collect())
    }
}

impl<T> From<Vec<Nested<T>>> for Nested<T> {
    fn from(values: Vec<Nested<T>>) -> Self {
        Self::List(values)
    }
}

impl<T> FromIterator<Nested<T>> for Nested<T> {
    fn from_iter<I: IntoIterator<Item = Nested<T>>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}
