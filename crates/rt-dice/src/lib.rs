//! Dice expressions for Rolltables.
//!
//! Parses dice notation such as `4d6k3*2-1d4` into signed die terms,
//! computes the range of totals an expression can produce, and rolls
//! expressions against a caller-supplied RNG.

pub mod error;
pub mod parse;
pub mod range;
pub mod roll;
pub mod term;

pub use error::{DiceError, DiceResult};
pub use parse::{parse_dice, parse_range, parse_roll_integer};
pub use range::Range;
pub use roll::{DiceRoll, roll_dice};
pub use term::{DiceExpr, DieTerm, DropKind, DropRule};
