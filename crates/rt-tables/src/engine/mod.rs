//! The roll engine: resolves references, rolls tables and bundles, and
//! expands nested meta references.
//!
//! The engine borrows a [`TableStore`] and owns its RNG. Contexts are
//! passed by value; a callee never changes the context its caller holds.

mod bundle;
mod reference;
mod table;

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rt_dice::DiceExpr;

use crate::config::EngineConfig;
use crate::registry::TableStore;
use crate::table::Table;

/// Nesting level at which meta references stop being expanded.
pub const MAX_DEPTH: u32 = 10;

/// One option offered to a [`RowSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChoice {
    /// The row text.
    pub label: String,
    /// The total that selects the row.
    pub value: i64,
}

/// Picks a row of a selectable table, e.g. by prompting a user.
pub trait RowSelector {
    /// Return the chosen total, or `None` to take the first row.
    fn select(&mut self, prompt: &str, choices: &[RowChoice]) -> Option<i64>;
}

impl<F> RowSelector for F
where
    F: FnMut(&str, &[RowChoice]) -> Option<i64>,
{
    fn select(&mut self, prompt: &str, choices: &[RowChoice]) -> Option<i64> {
        self(prompt, choices)
    }
}

/// Per-roll options for [`RollEngine::roll_table`].
#[derive(Debug, Clone, Default)]
pub struct TableRollOptions {
    /// Dice replacing the table's own.
    pub dice: Option<DiceExpr>,
    /// Force this total instead of rolling.
    pub total: Option<i64>,
    /// Added to each rolled total.
    pub modifier: i64,
    /// Totals that are rerolled, and a forced total that is ignored.
    pub reroll: BTreeSet<i64>,
    /// Current nesting level.
    pub depth: u32,
    /// Title shown instead of the table's.
    pub title: Option<String>,
}

impl TableRollOptions {
    /// Force a total.
    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    /// Replace the table's dice.
    pub fn with_dice(mut self, dice: DiceExpr) -> Self {
        self.dice = Some(dice);
        self
    }

    /// Set the modifier.
    pub fn with_modifier(mut self, modifier: i64) -> Self {
        self.modifier = modifier;
        self
    }

    /// Set the reroll set.
    pub fn with_reroll(mut self, reroll: impl IntoIterator<Item = i64>) -> Self {
        self.reroll = reroll.into_iter().collect();
        self
    }

    /// Set the nesting level.
    pub fn at_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}

/// Rolls tables and bundles from a store.
pub struct RollEngine<'a, S: TableStore + ?Sized> {
    store: &'a S,
    rng: StdRng,
    interactive: bool,
    selector: Option<Box<dyn RowSelector + 'a>>,
}

impl<'a, S: TableStore + ?Sized> RollEngine<'a, S> {
    /// Create an engine over `store`.
    pub fn new(store: &'a S, config: &EngineConfig) -> Self {
        Self {
            store,
            rng: config.rng(),
            interactive: config.interactive,
            selector: None,
        }
    }

    /// Install a row selector for selectable tables. It is only consulted
    /// when the engine is interactive.
    pub fn with_selector(mut self, selector: impl RowSelector + 'a) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    /// The store the engine reads from.
    pub fn store(&self) -> &'a S {
        self.store
    }

    /// The engine's RNG.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// The total used for a selectable table when no total was given.
    fn select_total(&mut self, table: &Table) -> i64 {
        let fallback = table.rows.first().map(|row| row.range.min).unwrap_or(1);
        if !self.interactive {
            return fallback;
        }
        let Some(selector) = self.selector.as_mut() else {
            return fallback;
        };
        let choices: Vec<RowChoice> = table
            .rows
            .iter()
            .map(|row| RowChoice {
                label: row.text.clone(),
                value: row.range.min,
            })
            .collect();
        let prompt = table.selectable_prompt.as_deref().unwrap_or(&table.title);
        selector.select(prompt, &choices).unwrap_or(fallback)
    }
}
