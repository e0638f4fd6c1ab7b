//! Die terms and dice expressions.
//!
//! A dice expression is an ordered list of [`DieTerm`]s whose signed totals
//! are summed. Constants are terms with a single side: `12` is twelve
//! one-sided dice, which always total 12.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiceError;
use crate::range::Range;

/// Which end of a rolled pool a drop rule removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropKind {
    /// Remove the highest dice.
    Highest,
    /// Remove the lowest dice.
    Lowest,
}

impl fmt::Display for DropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => write!(f, "highest"),
            Self::Lowest => write!(f, "lowest"),
        }
    }
}

/// A keep/drop rule attached to a die term.
///
/// Keep rules are normalized at parse time: `4d6k3` keeps the three highest,
/// which is stored as "drop the lowest one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropRule {
    /// Which end of the pool to remove.
    #[serde(rename = "type")]
    pub kind: DropKind,
    /// How many dice to remove.
    pub number: u32,
}

/// One component of a dice expression, e.g. `4d6k3` or `-10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DieTerm {
    /// Number of dice rolled (or the absolute value of a constant).
    pub count: u32,
    /// Sides per die. A value of 1 marks a constant.
    pub sides: u32,
    /// Signed factor applied to every die of this term.
    pub multiplier: i64,
    /// Optional keep/drop rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop: Option<DropRule>,
}

impl DieTerm {
    /// A term of `count` dice with `sides` sides each.
    pub fn dice(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            multiplier: 1,
            drop: None,
        }
    }

    /// A constant term. The sign is carried by the multiplier.
    pub fn constant(value: i64) -> Self {
        Self {
            count: u32::try_from(value.unsigned_abs()).unwrap_or(u32::MAX),
            sides: 1,
            multiplier: if value < 0 { -1 } else { 1 },
            drop: None,
        }
    }

    /// Set the multiplier.
    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Attach a drop rule. A rule dropping zero dice is discarded.
    pub fn with_drop(mut self, kind: DropKind, number: u32) -> Self {
        self.drop = (number > 0).then_some(DropRule { kind, number });
        self
    }

    /// Returns true if this term is a constant rather than a die roll.
    pub fn is_constant(&self) -> bool {
        self.sides == 1
    }

    /// Number of dice that survive the drop rule.
    pub fn kept(&self) -> u32 {
        let dropped = self.drop.map_or(0, |d| d.number);
        self.count.saturating_sub(dropped)
    }

    /// The signed value of a constant term.
    pub fn constant_value(&self) -> i64 {
        i64::from(self.count) * self.multiplier
    }

    /// The range of totals this term can produce.
    pub fn range(&self) -> Range {
        if self.is_constant() {
            return Range::single(self.constant_value());
        }
        if self.sides == 0 {
            return Range::single(0);
        }
        let kept = i64::from(self.kept());
        Range::new(kept, kept * i64::from(self.sides)).multiply(self.multiplier)
    }
}

impl fmt::Display for DieTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            write!(f, "{}", self.count)?;
        } else if self.count == 1 {
            write!(f, "d{}", self.sides)?;
        } else {
            write!(f, "{}d{}", self.count, self.sides)?;
        }
        if let Some(drop) = self.drop.filter(|_| !self.is_constant()) {
            match drop.kind {
                DropKind::Lowest => write!(f, "d{}", drop.number)?,
                DropKind::Highest => write!(f, "dh{}", drop.number)?,
            }
        }
        if self.multiplier.abs() != 1 {
            write!(f, "*{}", self.multiplier.abs())?;
        }
        Ok(())
    }
}

/// An ordered sequence of die terms, summed with their signed multipliers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiceExpr {
    terms: Vec<DieTerm>,
}

impl DiceExpr {
    /// Build an expression from terms.
    pub fn new(terms: Vec<DieTerm>) -> Self {
        Self { terms }
    }

    /// A single die with the given number of sides (`d<sides>`).
    pub fn single_die(sides: u32) -> Self {
        Self::new(vec![DieTerm::dice(1, sides)])
    }

    /// The terms of this expression, in order.
    pub fn terms(&self) -> &[DieTerm] {
        &self.terms
    }

    /// Returns true if the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The range of totals this expression can produce.
    pub fn range(&self) -> Range {
        self.terms
            .iter()
            .fold(Range::single(0), |acc, term| acc.add(term.range()))
    }
}

impl From<Vec<DieTerm>> for DiceExpr {
    fn from(terms: Vec<DieTerm>) -> Self {
        Self::new(terms)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if term.multiplier < 0 {
                write!(f, "-")?;
            } else if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_strict(s)
    }
}
