//! Named numeric values threaded between rolls.
//!
//! A [`Context`] is a plain value: callees never mutate the context they
//! were given. Bundles build the next context from the previous one with
//! [`Context::merged`] and [`Context::with`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved key holding the total that selected the current row.
pub const ROLL_KEY: &str = "$roll";

/// Reserved key holding the total of the preceding roll in a bundle.
pub const PREVIOUS_ROLL_KEY: &str = "$previousRoll";

/// A flat mapping from identifier to number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, i64>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by name.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// This context with one value set.
    pub fn with(mut self, key: impl Into<String>, value: i64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// This context with every value of `other` layered on top.
    pub fn merged(mut self, other: &Context) -> Self {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), *v)));
        self
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
