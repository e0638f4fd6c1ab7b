//! Table and bundle definitions as authored, and their preparation into
//! registered [`Table`]s and [`Bundle`]s.
//!
//! Row lists accept three shapes, freely mixed:
//!
//! - a `"range|text"` line block (`"1-3|a goblin\n4|an orc"`), or plain
//!   lines numbered from 1 when the dice is `"#"` or omitted
//! - structured rows `{"range": [1, 3], "text": "a goblin"}`
//! - table references, attached as meta to the row before them

use std::collections::BTreeMap;

use rt_dice::{DiceExpr, Range, parse_range};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::bundle::Bundle;
use crate::error::{TableError, TableResult};
use crate::reference::TableRef;
use crate::rollable::Rollable;
use crate::table::{Table, TableRow};
use crate::validate::validate_table;

/// Dice notation that numbers rows 1..n and rolls `d<n>`.
pub const ROW_NUMBER_DICE: &str = "#";

const ROW_SEPARATOR: char = '|';

/// Anything that can be registered.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Definition {
    /// An ordered group of references.
    Bundle(BundleDefinition),
    /// One table per dimension sharing a row list.
    MultiDimensional(MultiDimensionalDefinition),
    /// A single table.
    Table(TableDefinition),
}

/// A bundle as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleDefinition {
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// References rolled in order.
    pub tables: Vec<TableRef>,
}

/// Dice given as notation or as explicit terms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DiceDefinition {
    /// Dice notation, or `"#"` for one die side per row.
    Notation(String),
    /// Pre-parsed terms.
    Terms(DiceExpr),
}

/// A row range as authored: `3`, `[1, 4]`, or `"1-4"` (`00` means 100).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RangeDefinition {
    /// A single total.
    Single(i64),
    /// Inclusive bounds.
    Pair(i64, i64),
    /// Text form.
    Text(String),
}

impl RangeDefinition {
    fn to_range(&self) -> Option<Range> {
        match self {
            Self::Single(n) => Some(Range::single(*n)),
            Self::Pair(a, b) => Some(Range::new(*a, *b)),
            Self::Text(s) => parse_range(s),
        }
    }
}

/// A structured row.
#[derive(Debug, Clone, Deserialize)]
pub struct RowDefinition {
    /// Totals selecting the row.
    pub range: RangeDefinition,
    /// Row text.
    pub text: String,
    /// Nested references.
    #[serde(default)]
    pub meta: Vec<TableRef>,
}

/// One entry of a row list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RowItem {
    /// A line block.
    Lines(String),
    /// A meta reference for the preceding row.
    Reference(TableRef),
    /// A structured row.
    Row(RowDefinition),
}

/// Rows as a single line block or a list of items.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RowsDefinition {
    /// A single line block.
    Block(String),
    /// A mixed list.
    Items(Vec<RowItem>),
}

/// A table as authored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    /// Display title. Defaults to the identifier.
    #[serde(default)]
    pub title: Option<String>,
    /// Dice rolled to select a row. Omitted means `"#"`.
    #[serde(default)]
    pub dice: Option<DiceDefinition>,
    /// The rows.
    pub rows: RowsDefinition,
    /// Named text inputs.
    #[serde(default)]
    pub inputs: BTreeMap<String, TableRef>,
    /// Template evaluated once per roll.
    #[serde(default)]
    pub extra_results: Option<String>,
    /// Expand meta references automatically (default true).
    #[serde(default)]
    pub auto_evaluate: Option<bool>,
    /// Ask a row selector instead of rolling.
    #[serde(default)]
    pub selectable: bool,
    /// Prompt for the row selector.
    #[serde(default)]
    pub selectable_prompt: Option<String>,
}

/// A row of a multi-dimensional table. `range` holds one range per
/// dimension separated by `/`, e.g. `"1-2/1/1-4"`.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiDimensionalRow {
    /// Slash-separated ranges.
    pub range: String,
    /// Row text.
    pub text: String,
    /// Nested references.
    #[serde(default)]
    pub meta: Vec<TableRef>,
}

/// A multi-dimensional table as authored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDimensionalDefinition {
    /// Base title; each table is titled `"<title> (<dimension>)"`.
    #[serde(default)]
    pub title: Option<String>,
    /// Dice shared by every dimension.
    pub dice: DiceDefinition,
    /// Dimension names.
    pub dimensions: Vec<String>,
    /// Shared rows.
    pub rows: Vec<MultiDimensionalRow>,
    /// Named text inputs.
    #[serde(default)]
    pub inputs: BTreeMap<String, TableRef>,
    /// Template evaluated once per roll.
    #[serde(default)]
    pub extra_results: Option<String>,
    /// Expand meta references automatically (default true).
    #[serde(default)]
    pub auto_evaluate: Option<bool>,
}

fn invalid(identifier: &str, reason: impl Into<String>) -> TableError {
    TableError::InvalidDefinition {
        identifier: identifier.to_string(),
        reason: reason.into(),
    }
}

/// Parse a line block into rows. In numbered mode every non-blank line is a
/// row and `next_number` advances; otherwise lines are `range|text`.
fn rows_from_lines(block: &str, numbered: bool, next_number: &mut i64) -> Vec<TableRow> {
    let mut rows = Vec::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if numbered {
            rows.push(TableRow::new(*next_number, line));
            *next_number += 1;
            continue;
        }
        let parsed = line
            .split_once(ROW_SEPARATOR)
            .and_then(|(range, text)| parse_range(range).map(|r| TableRow::new(r, text)));
        match parsed {
            Some(row) => rows.push(row),
            None => debug!(line, "skipping line without a row range"),
        }
    }
    rows
}

fn parse_rows(
    identifier: &str,
    rows: RowsDefinition,
    numbered: bool,
) -> TableResult<Vec<TableRow>> {
    let items = match rows {
        RowsDefinition::Block(block) => vec![RowItem::Lines(block)],
        RowsDefinition::Items(items) => items,
    };

    let mut out: Vec<TableRow> = Vec::new();
    let mut next_number = 1;
    for item in items {
        match item {
            RowItem::Lines(block) => {
                out.extend(rows_from_lines(&block, numbered, &mut next_number));
            }
            RowItem::Row(row) => {
                let range = row
                    .range
                    .to_range()
                    .ok_or_else(|| invalid(identifier, format!("bad row range for \"{}\"", row.text)))?;
                out.push(TableRow {
                    range,
                    text: row.text,
                    meta: row.meta,
                });
            }
            RowItem::Reference(reference) => match out.last_mut() {
                Some(prev) => prev.meta.push(reference),
                None => {
                    return Err(invalid(
                        identifier,
                        format!("reference to {} precedes every row", reference.path),
                    ));
                }
            },
        }
    }
    Ok(out)
}

/// Resolve dice for a table. `None` means "one side per row".
fn parse_table_dice(identifier: &str, dice: Option<DiceDefinition>) -> TableResult<Option<DiceExpr>> {
    match dice {
        None => Ok(None),
        Some(DiceDefinition::Terms(expr)) => {
            if expr.terms().iter().any(|term| term.sides == 0) {
                return Err(invalid(identifier, "a die needs at least one side"));
            }
            Ok(Some(expr))
        }
        Some(DiceDefinition::Notation(s)) if s.trim() == ROW_NUMBER_DICE => Ok(None),
        Some(DiceDefinition::Notation(s)) => s
            .parse::<DiceExpr>()
            .map(Some)
            .map_err(|e| invalid(identifier, e.to_string())),
    }
}

fn report_issues(table: &Table) {
    for issue in validate_table(table) {
        warn!(table = %issue.table, "{}", issue.kind);
    }
}

/// Prepare a single table. Validation issues are logged, not returned.
pub fn prepare_table(identifier: &str, definition: TableDefinition) -> TableResult<Table> {
    let dice = parse_table_dice(identifier, definition.dice)?;
    let rows = parse_rows(identifier, definition.rows, dice.is_none())?;
    let dice = match dice {
        Some(dice) => dice,
        None => {
            let sides = u32::try_from(rows.len())
                .map_err(|_| invalid(identifier, "too many rows to number"))?;
            if sides == 0 {
                return Err(invalid(identifier, "a numbered table needs at least one row"));
            }
            DiceExpr::single_die(sides)
        }
    };

    let table = Table {
        identifier: identifier.to_string(),
        title: definition.title.unwrap_or_else(|| identifier.to_string()),
        dice,
        rows,
        inputs: definition.inputs,
        extra_results: definition.extra_results,
        auto_evaluate: definition.auto_evaluate.unwrap_or(true),
        selectable: definition.selectable,
        selectable_prompt: definition.selectable_prompt,
    };
    report_issues(&table);
    Ok(table)
}

/// Identifier suffix for each dimension: lowercased, with every run of
/// non-alphanumeric characters turned into a single `-`.
pub fn dimension_identifiers(dimensions: &[String]) -> Vec<String> {
    dimensions
        .iter()
        .map(|dim| {
            let mut slug = String::with_capacity(dim.len());
            for c in dim.to_lowercase().chars() {
                if c.is_ascii_alphanumeric() {
                    slug.push(c);
                } else if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            slug
        })
        .collect()
}

/// Prepare one table per dimension, registered under
/// `<identifier>/<dimension slug>`.
pub fn prepare_multi_dimensional(
    identifier: &str,
    definition: MultiDimensionalDefinition,
) -> TableResult<Vec<Table>> {
    if definition.dimensions.is_empty() {
        return Err(TableError::MissingDimensions(identifier.to_string()));
    }
    let dice = parse_table_dice(identifier, Some(definition.dice))?
        .ok_or_else(|| invalid(identifier, "multi-dimensional tables need explicit dice"))?;
    let title = definition.title.unwrap_or_else(|| identifier.to_string());
    let slugs = dimension_identifiers(&definition.dimensions);

    let tables = definition
        .dimensions
        .iter()
        .zip(slugs)
        .enumerate()
        .map(|(index, (dimension, slug))| {
            let rows = definition
                .rows
                .iter()
                .filter_map(|row| {
                    let range = row.range.split('/').nth(index).and_then(parse_range)?;
                    Some(TableRow {
                        range,
                        text: row.text.clone(),
                        meta: row.meta.clone(),
                    })
                })
                .collect();
            let table = Table {
                identifier: format!("{identifier}/{slug}"),
                title: format!("{title} ({dimension})"),
                dice: dice.clone(),
                rows,
                inputs: definition.inputs.clone(),
                extra_results: definition.extra_results.clone(),
                auto_evaluate: definition.auto_evaluate.unwrap_or(true),
                selectable: false,
                selectable_prompt: None,
            };
            report_issues(&table);
            table
        })
        .collect();
    Ok(tables)
}

/// Prepare a bundle.
pub fn prepare_bundle(identifier: &str, definition: BundleDefinition) -> Bundle {
    Bundle {
        identifier: identifier.to_string(),
        title: definition.title,
        tables: definition.tables,
    }
}

/// Prepare any definition into the rollables it registers.
pub fn prepare(identifier: &str, definition: Definition) -> TableResult<Vec<Rollable>> {
    Ok(match definition {
        Definition::Bundle(def) => vec![prepare_bundle(identifier, def).into()],
        Definition::Table(def) => vec![prepare_table(identifier, def)?.into()],
        Definition::MultiDimensional(def) => prepare_multi_dimensional(identifier, def)?
            .into_iter()
            .map(Rollable::from)
            .collect(),
    })
}
