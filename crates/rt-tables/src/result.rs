//! Results of rolling tables.

use std::collections::BTreeMap;

use rt_dice::{DiceExpr, Range};
use serde::Serialize;

use crate::context::{Context, ROLL_KEY};
use crate::placeholder::{Evaluation, NamedRoll, PercentSection};
use crate::reference::TableRef;

/// A selected row with its placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluatedRow {
    /// The row's range.
    pub range: Range,
    /// Row text with placeholders and inputs substituted.
    pub text: String,
    /// The row's meta references, unexpanded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<TableRef>,
    /// The total that selected this row.
    pub roll: i64,
    /// Named dice rolled in the row text.
    pub evaluation: BTreeMap<String, NamedRoll>,
    /// Percent sections in the row text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<PercentSection>,
}

impl EvaluatedRow {
    /// `$roll` plus the total of every named dice roll in the text.
    pub fn context(&self) -> Context {
        self.evaluation
            .iter()
            .fold(Context::new().with(ROLL_KEY, self.roll), |ctx, (name, named)| {
                ctx.with(name.clone(), named.result.total)
            })
    }
}

/// One roll against one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// Identifier of the table rolled.
    pub table: String,
    /// Title shown for this roll, after any reference override.
    pub title: String,
    /// Dice that were rolled.
    pub dice: DiceExpr,
    /// The total, modifier included.
    pub total: i64,
    /// The selected row.
    pub row: EvaluatedRow,
    /// The table's extra results template, evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_results: Option<Evaluation>,
    /// One list of results per meta reference of the row, in declaration
    /// order. `None` until meta is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_tables: Option<Vec<Vec<RollResult>>>,
}

impl RollResult {
    /// Expanded meta results, if expanded.
    pub fn evaluated_tables(&self) -> Option<&[Vec<RollResult>]> {
        self.evaluated_tables.as_deref()
    }

    /// Shorthand for the row's context.
    pub fn context(&self) -> Context {
        self.row.context()
    }
}
