//! Rolling dice expressions.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::term::{DiceExpr, DieTerm, DropKind};

/// The result of rolling a dice expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Grand total across all terms.
    pub total: i64,
    /// Surviving die values per term, multipliers applied.
    pub rolls: Vec<Vec<i64>>,
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self
            .rolls
            .iter()
            .flatten()
            .map(|v| v.to_string())
            .collect();
        write!(f, "[{}] = {}", values.join(", "), self.total)
    }
}

fn roll_term<R: Rng + ?Sized>(term: &DieTerm, rng: &mut R) -> Vec<i64> {
    if term.is_constant() {
        return vec![term.constant_value()];
    }
    // A zero-sided die has nothing to land on.
    if term.sides == 0 {
        return Vec::new();
    }

    let mut values: Vec<i64> = (0..term.count)
        .map(|_| i64::from(rng.random_range(1..=term.sides)) * term.multiplier)
        .collect();

    if let Some(drop) = term.drop {
        for _ in 0..drop.number {
            let target = match drop.kind {
                DropKind::Highest => values.iter().copied().max(),
                DropKind::Lowest => values.iter().copied().min(),
            };
            let Some(target) = target else { break };
            if let Some(pos) = values.iter().position(|v| *v == target) {
                values.remove(pos);
            }
        }
    }
    values
}

/// Roll every term of an expression and sum the results.
pub fn roll_dice<R: Rng + ?Sized>(expr: &DiceExpr, rng: &mut R) -> DiceRoll {
    let rolls: Vec<Vec<i64>> = expr.terms().iter().map(|t| roll_term(t, rng)).collect();
    let total = rolls.iter().flatten().sum();
    DiceRoll { total, rolls }
}

impl DiceExpr {
    /// Roll this expression using the given RNG.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        roll_dice(self, rng)
    }
}
