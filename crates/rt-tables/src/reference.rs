//! References from rows, bundles, and inputs to other tables.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::Context;

/// A number given either literally or by name from the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueRef {
    /// A literal number.
    Number(i64),
    /// The name of a context value.
    Key(String),
}

impl ValueRef {
    /// Resolve against a context. Unknown keys resolve to `None`.
    pub fn resolve(&self, context: &Context) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Key(key) => context.get(key),
        }
    }

    /// Resolve against a context, falling back to `default` for unknown
    /// keys and for keys holding 0. A literal is always used as given.
    pub fn resolve_or(&self, context: &Context, default: i64) -> i64 {
        match self {
            Self::Number(n) => *n,
            Self::Key(key) => context.get(key).filter(|v| *v != 0).unwrap_or(default),
        }
    }
}

impl From<i64> for ValueRef {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ValueRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// Totals to exclude from a roll: one value or a list.
///
/// String entries of the form `N-M` expand to every number from N to M.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreRef {
    /// A single exclusion.
    One(ValueRef),
    /// Several exclusions.
    Many(Vec<ValueRef>),
}

/// Parse a strict `N-M` span.
fn parse_span(s: &str) -> Option<(i64, i64)> {
    let (low, high) = s.split_once('-')?;
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(low) || !digits(high) {
        return None;
    }
    Some((low.parse().ok()?, high.parse().ok()?))
}

fn exclusions_for(value: &ValueRef, context: &Context, out: &mut BTreeSet<i64>) {
    match value {
        ValueRef::Number(n) => {
            out.insert(*n);
        }
        ValueRef::Key(key) => {
            if let Some((low, high)) = parse_span(key) {
                out.extend(rt_dice::Range::new(low, high).members());
            } else if let Some(n) = context.get(key) {
                out.insert(n);
            } else {
                debug!(key = %key, "ignore key not in context");
            }
        }
    }
}

/// A pointer to another table or bundle plus per-use modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    /// Absolute (`/a/b`), relative (`./b`, `../b`), or `$/b` (below the
    /// referencing table's identifier).
    pub path: String,
    /// Title shown instead of the target table's title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// How many times to roll (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_count: Option<ValueRef>,
    /// Force a total instead of rolling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<ValueRef>,
    /// Dice notation replacing the table's own dice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice: Option<String>,
    /// Never select the same row twice across the roll count.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    /// Totals that are rerolled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<IgnoreRef>,
    /// Added to every rolled total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ValueRef>,
    /// Context values copied after a bundle visits this reference:
    /// `local key -> "@source"` or a literal key such as `$roll`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub store: BTreeMap<String, String>,
}

impl TableRef {
    /// A plain reference to `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Override the displayed title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the roll count.
    pub fn with_roll_count(mut self, count: impl Into<ValueRef>) -> Self {
        self.roll_count = Some(count.into());
        self
    }

    /// Force a total.
    pub fn with_total(mut self, total: impl Into<ValueRef>) -> Self {
        self.total = Some(total.into());
        self
    }

    /// Replace the target table's dice.
    pub fn with_dice(mut self, dice: impl Into<String>) -> Self {
        self.dice = Some(dice.into());
        self
    }

    /// Avoid selecting the same row twice.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Exclude totals from the roll.
    pub fn with_ignore(mut self, ignore: IgnoreRef) -> Self {
        self.ignore = Some(ignore);
        self
    }

    /// Add a modifier to rolled totals.
    pub fn with_modifier(mut self, modifier: impl Into<ValueRef>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }

    /// Copy a context value under a new name after this reference is rolled
    /// in a bundle.
    pub fn with_store(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.store.insert(key.into(), value.into());
        self
    }

    /// Roll count resolved against the context (default 1). A context key
    /// holding 0 also gives the default.
    pub fn resolved_roll_count(&self, context: &Context) -> i64 {
        self.roll_count
            .as_ref()
            .map_or(1, |v| v.resolve_or(context, 1))
    }

    /// Modifier resolved against the context (default 0).
    pub fn resolved_modifier(&self, context: &Context) -> i64 {
        self.modifier
            .as_ref()
            .map_or(0, |v| v.resolve_or(context, 0))
    }

    /// Forced total resolved against the context. Zero means "not forced".
    pub fn resolved_total(&self, context: &Context) -> Option<i64> {
        self.total
            .as_ref()
            .and_then(|v| v.resolve(context))
            .filter(|t| *t != 0)
    }

    /// The concrete set of totals to reroll.
    pub fn exclusions(&self, context: &Context) -> BTreeSet<i64> {
        let mut out = BTreeSet::new();
        match &self.ignore {
            None => {}
            Some(IgnoreRef::One(value)) => exclusions_for(value, context, &mut out),
            Some(IgnoreRef::Many(values)) => {
                for value in values {
                    exclusions_for(value, context, &mut out);
                }
            }
        }
        out
    }

    /// Apply this reference's `store` directives to a context.
    pub fn apply_store(&self, context: Context) -> Context {
        self.store.iter().fold(context, |ctx, (key, source)| {
            let source_key = source.strip_prefix('@').unwrap_or(source);
            match ctx.get(source_key) {
                Some(value) => ctx.with(key.clone(), value),
                None => {
                    debug!(key = %key, source = %source, "store source not in context");
                    ctx
                }
            }
        })
    }
}

/// A reference to `path` rolled `count` times.
pub fn make_table_ref(path: impl Into<String>, count: Option<ValueRef>) -> TableRef {
    TableRef::new(path).with_roll_count(count.unwrap_or(ValueRef::Number(1)))
}
