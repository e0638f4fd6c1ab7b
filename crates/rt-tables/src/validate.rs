//! Validation of prepared tables.
//!
//! Checks that row ranges partition a contiguous span of totals and that
//! the span covers everything the table's dice can roll. Issues are
//! advisory: a table with issues is still registered and rollable.

use std::collections::BTreeSet;
use std::fmt;

use rt_dice::Range;

use crate::table::Table;

/// What is wrong with a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The table has no rows at all.
    NoRows,
    /// A total is covered by more than one row.
    DuplicateCoverage {
        /// The first total found twice.
        total: i64,
    },
    /// The rows leave gaps inside their overall span.
    NonContiguous {
        /// The span from the lowest to the highest row bound.
        coverage: Range,
        /// How many distinct totals the rows actually cover.
        covered: usize,
    },
    /// The dice can roll above the highest row.
    DiceAboveCoverage {
        /// Highest dice total.
        dice_max: i64,
        /// Highest covered total.
        row_max: i64,
    },
    /// The dice can roll below the lowest row.
    DiceBelowCoverage {
        /// Lowest dice total.
        dice_min: i64,
        /// Lowest covered total.
        row_min: i64,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => write!(f, "table has no rows"),
            Self::DuplicateCoverage { total } => write!(f, "{total} found more than once"),
            Self::NonContiguous { coverage, covered } => write!(
                f,
                "range covered by rows is non-continuous ({covered} of {} totals in {coverage})",
                coverage.len()
            ),
            Self::DiceAboveCoverage { dice_max, row_max } => {
                write!(f, "dice may roll above max ({dice_max} vs. {row_max})")
            }
            Self::DiceBelowCoverage { dice_min, row_min } => {
                write!(f, "dice may roll below min ({dice_min} vs. {row_min})")
            }
        }
    }
}

/// A problem found while validating a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Identifier of the table, or its title before registration.
    pub table: String,
    /// The problem.
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {}: {}", self.table, self.kind)
    }
}

/// Validate a table's row coverage against its dice.
pub fn validate_table(table: &Table) -> Vec<ValidationIssue> {
    let name = if table.identifier.is_empty() {
        table.title.clone()
    } else {
        table.identifier.clone()
    };
    let issue = |kind| ValidationIssue {
        table: name.clone(),
        kind,
    };

    let Some(coverage) = table.row_coverage() else {
        return vec![issue(IssueKind::NoRows)];
    };

    let mut issues = Vec::new();
    let mut covered = BTreeSet::new();
    for row in &table.rows {
        if let Some(total) = row.range.members().find(|n| !covered.insert(*n)) {
            issues.push(issue(IssueKind::DuplicateCoverage { total }));
            covered.extend(row.range.members());
        }
    }

    if covered.len() as u64 != coverage.len() {
        issues.push(issue(IssueKind::NonContiguous {
            coverage,
            covered: covered.len(),
        }));
    }

    let dice = table.dice.range();
    if coverage.max < dice.max {
        issues.push(issue(IssueKind::DiceAboveCoverage {
            dice_max: dice.max,
            row_max: coverage.max,
        }));
    }
    if coverage.min > dice.min {
        issues.push(issue(IssueKind::DiceBelowCoverage {
            dice_min: dice.min,
            row_min: coverage.min,
        }));
    }

    issues
}

/// Returns true if the table has no validation issues.
pub fn is_valid(table: &Table) -> bool {
    validate_table(table).is_empty()
}
