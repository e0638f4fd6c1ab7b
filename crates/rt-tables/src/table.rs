//! Registered roll tables.

use std::collections::BTreeMap;

use rt_dice::{DiceExpr, Range};
use serde::Serialize;

use crate::reference::TableRef;

/// One row of a table, covering a sub-range of totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Totals that select this row.
    pub range: Range,
    /// Row text, possibly holding placeholders.
    pub text: String,
    /// Nested references expanded when the row is selected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<TableRef>,
}

impl TableRow {
    /// A row without meta references.
    pub fn new(range: impl Into<Range>, text: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            text: text.into(),
            meta: Vec::new(),
        }
    }

    /// Attach a meta reference.
    pub fn with_meta(mut self, meta: TableRef) -> Self {
        self.meta.push(meta);
        self
    }
}

/// A prepared table registered under an absolute identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Absolute registry key, e.g. `/dmg/treasure/gems`.
    pub identifier: String,
    /// Display title.
    pub title: String,
    /// Dice rolled to select a row.
    pub dice: DiceExpr,
    /// Rows in declaration order.
    pub rows: Vec<TableRow>,
    /// Named text inputs, substituted into `[name]` placeholders.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, TableRef>,
    /// Template evaluated once per roll, independent of the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_results: Option<String>,
    /// Expand meta references as part of the roll.
    pub auto_evaluate: bool,
    /// Let a row selector pick the row instead of rolling.
    pub selectable: bool,
    /// Prompt shown to the row selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selectable_prompt: Option<String>,
}

impl Table {
    /// A table with default options. `auto_evaluate` is on.
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        dice: DiceExpr,
        rows: Vec<TableRow>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            dice,
            rows,
            inputs: BTreeMap::new(),
            extra_results: None,
            auto_evaluate: true,
            selectable: false,
            selectable_prompt: None,
        }
    }

    /// Declare a named input.
    pub fn with_input(mut self, key: impl Into<String>, source: TableRef) -> Self {
        self.inputs.insert(key.into(), source);
        self
    }

    /// Set the extra results template.
    pub fn with_extra_results(mut self, template: impl Into<String>) -> Self {
        self.extra_results = Some(template.into());
        self
    }

    /// Enable or disable automatic meta expansion.
    pub fn auto_evaluate(mut self, auto_evaluate: bool) -> Self {
        self.auto_evaluate = auto_evaluate;
        self
    }

    /// Mark the table as selectable with an optional prompt.
    pub fn selectable(mut self, prompt: Option<String>) -> Self {
        self.selectable = true;
        self.selectable_prompt = prompt;
        self
    }

    /// Index of the row selected by `total`.
    ///
    /// Totals below the dice minimum select the first row and totals above
    /// the dice maximum select the last. `None` only for malformed tables.
    pub fn row_index_for_roll(&self, total: i64) -> Option<usize> {
        let dice_range = self.dice.range();
        if self.rows.is_empty() {
            return None;
        }
        if total < dice_range.min {
            return Some(0);
        }
        if total > dice_range.max {
            return Some(self.rows.len() - 1);
        }
        self.rows.iter().position(|row| row.range.contains(total))
    }

    /// The row selected by `total`. See [`Table::row_index_for_roll`].
    pub fn row_for_roll(&self, total: i64) -> Option<&TableRow> {
        self.row_index_for_roll(total).map(|i| &self.rows[i])
    }

    /// The smallest range spanning every row, or `None` without rows.
    pub fn row_coverage(&self) -> Option<Range> {
        self.rows
            .iter()
            .map(|row| row.range)
            .reduce(Range::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rt_dice::parse_dice;

    fn weather() -> Table {
        Table::new(
            "/weather",
            "Weather",
            parse_dice("2d6"),
            vec![
                TableRow::new(Range::new(2, 5), "rain"),
                TableRow::new(Range::new(6, 8), "cloudy"),
                TableRow::new(Range::new(9, 12), "sunny"),
            ],
        )
    }

    #[test]
    fn finds_row_by_total() {
        let t = weather();
        assert_eq!(t.row_for_roll(2).unwrap().text, "rain");
        assert_eq!(t.row_for_roll(7).unwrap().text, "cloudy");
        assert_eq!(t.row_for_roll(12).unwrap().text, "sunny");
    }

    #[test]
    fn clamps_out_of_range_totals() {
        let t = weather();
        assert_eq!(t.row_for_roll(-4).unwrap().text, "rain");
        assert_eq!(t.row_for_roll(40).unwrap().text, "sunny");
    }

    #[test]
    fn gap_inside_dice_range_has_no_row() {
        let t = Table::new(
            "/gappy",
            "Gappy",
            parse_dice("d6"),
            vec![TableRow::new(Range::new(1, 2), "a"), TableRow::new(6, "b")],
        );
        assert!(t.row_for_roll(4).is_none());
    }

    #[test]
    fn coverage_spans_rows() {
        assert_eq!(weather().row_coverage(), Some(Range::new(2, 12)));
        let empty = Table::new("/e", "Empty", parse_dice("d4"), Vec::new());
        assert_eq!(empty.row_coverage(), None);
        assert!(empty.row_for_roll(1).is_none());
    }

    #[test]
    fn defaults() {
        let t = weather();
        assert!(t.auto_evaluate);
        assert!(!t.selectable);
        assert!(t.inputs.is_empty());
    }
}
