//! Rolling a single table.

use tracing::debug;

use super::{MAX_DEPTH, RollEngine, TableRollOptions};
use crate::context::Context;
use crate::error::{TableError, TableResult};
use crate::placeholder::evaluate_placeholders;
use crate::placeholder::inputs::{InputPattern, InputValues};
use crate::registry::TableStore;
use crate::result::{EvaluatedRow, RollResult};
use crate::table::Table;

impl<S: TableStore + ?Sized> RollEngine<'_, S> {
    /// Roll `table` once.
    ///
    /// A selectable table without a forced total asks the row selector. A
    /// forced total in the reroll set is discarded, and rolled totals are
    /// rerolled until they leave the set. There is no retry cap: a reroll
    /// set covering every total never returns.
    pub fn roll_table(&mut self, table: &Table, options: TableRollOptions) -> TableResult<RollResult> {
        let TableRollOptions {
            dice,
            mut total,
            modifier,
            reroll,
            depth,
            title,
        } = options;

        if table.selectable && total.is_none() {
            total = Some(self.select_total(table));
        }
        if let Some(forced) = total
            && reroll.contains(&forced)
        {
            debug!(table = %table.identifier, total = forced, "forced total is excluded");
            total = None;
        }

        let dice = dice.unwrap_or_else(|| table.dice.clone());
        let total = match total {
            Some(total) => total,
            None => loop {
                let rolled = dice.roll(&mut self.rng).total + modifier;
                if !reroll.contains(&rolled) {
                    break rolled;
                }
                debug!(table = %table.identifier, total = rolled, "rerolling");
            },
        };

        let row = table
            .row_for_roll(total)
            .ok_or_else(|| TableError::NoRowForTotal {
                total,
                table: table.identifier.clone(),
            })?;

        let mut inputs = InputValues::new();
        let evaluation = evaluate_placeholders(&row.text, &mut self.rng);
        let text = self.apply_inputs(table, evaluation.text, &mut inputs, depth)?;
        let row = EvaluatedRow {
            range: row.range,
            text,
            meta: row.meta.clone(),
            roll: total,
            evaluation: evaluation.results,
            sections: evaluation.sections,
        };

        let evaluated_tables = if table.auto_evaluate && depth < MAX_DEPTH {
            Some(self.roll_meta(&table.identifier, &row, depth + 1)?)
        } else {
            if !row.meta.is_empty() {
                debug!(table = %table.identifier, depth, "meta left unexpanded");
            }
            None
        };

        let extra_results = match &table.extra_results {
            Some(template) => {
                let mut evaluation = evaluate_placeholders(template, &mut self.rng);
                evaluation.text = self.apply_inputs(table, evaluation.text, &mut inputs, depth)?;
                Some(evaluation)
            }
            None => None,
        };

        Ok(RollResult {
            table: table.identifier.clone(),
            title: title.unwrap_or_else(|| table.title.clone()),
            dice,
            total,
            row,
            extra_results,
            evaluated_tables,
        })
    }

    /// Roll every meta reference of `row`, in declaration order, under the
    /// row's own context only.
    fn roll_meta(
        &mut self,
        identifier: &str,
        row: &EvaluatedRow,
        depth: u32,
    ) -> TableResult<Vec<Vec<RollResult>>> {
        let context = row.context();
        row.meta
            .iter()
            .map(|reference| self.roll_ref(reference, &context, Some(identifier), depth))
            .collect()
    }

    /// Expand the meta references of a result that was rolled without
    /// automatic expansion. The expansion happens once; later calls return
    /// the cached results.
    pub fn evaluate_meta<'r>(
        &mut self,
        result: &'r mut RollResult,
        depth: u32,
    ) -> TableResult<&'r [Vec<RollResult>]> {
        if result.evaluated_tables.is_none() {
            let expanded = self.roll_meta(&result.table, &result.row, depth)?;
            result.evaluated_tables = Some(expanded);
        }
        Ok(result.evaluated_tables.as_deref().unwrap_or_default())
    }

    /// Substitute `[key]` input placeholders in `text`.
    ///
    /// Each key found is rolled once per table roll, with an empty context,
    /// and its values are reused by later text in the same roll.
    pub(crate) fn apply_inputs(
        &mut self,
        table: &Table,
        mut text: String,
        values: &mut InputValues,
        depth: u32,
    ) -> TableResult<String> {
        for (key, source) in &table.inputs {
            let pattern = InputPattern::new(key).map_err(|e| TableError::InvalidDefinition {
                identifier: table.identifier.clone(),
                reason: format!("input key {key}: {e}"),
            })?;
            if !pattern.is_match(&text) {
                continue;
            }
            if !values.contains_key(key) {
                if depth >= MAX_DEPTH {
                    debug!(table = %table.identifier, key = %key, "input left unrolled at depth limit");
                    continue;
                }
                let rolled = self.roll_ref(source, &Context::new(), Some(&table.identifier), depth + 1)?;
                values.insert(key.clone(), rolled.into_iter().map(|r| r.row.text).collect());
            }
            if let Some(rolled) = values.get(key) {
                text = pattern.substitute(&text, rolled);
            }
        }
        Ok(text)
    }

    /// Roll every total in the table's dice range with meta expanded.
    /// Used to eyeball a table while authoring it.
    pub fn self_test(&mut self, table: &Table) -> TableResult<Vec<RollResult>> {
        table
            .dice
            .range()
            .members()
            .map(|total| {
                let options = TableRollOptions::default()
                    .with_total(total)
                    .with_dice(table.dice.clone());
                let mut result = self.roll_table(table, options)?;
                self.evaluate_meta(&mut result, 0)?;
                Ok(result)
            })
            .collect()
    }
}
