//! Random tables for tabletop games.
//!
//! Tables map dice totals to rows of text. Rows may embed named dice
//! (`[[@gold:3d6]]`), percentage-weighted alternatives (`[[30% a trap]]`),
//! named inputs filled from other tables (`[race:t=u]`), and meta
//! references to further tables that are rolled recursively. Bundles roll
//! a list of references in order, threading a [`Context`] of named
//! numbers from each pick to the next.
//!
//! ```no_run
//! use rt_tables::{Context, EngineConfig, Registry, RollEngine};
//!
//! let mut registry = Registry::new();
//! registry.load_json(r#"{"/weather": {"dice": "2d6", "rows": "2-6|rain\n7-12|sun"}}"#)?;
//! let mut engine = RollEngine::new(&registry, &EngineConfig::default().with_seed(1));
//! let results = engine.roll_path("/weather", Context::new())?;
//! println!("{}", results[0][0].row.text);
//! # Ok::<(), rt_tables::TableError>(())
//! ```

pub mod bundle;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod placeholder;
pub mod prepare;
pub mod reference;
pub mod registry;
pub mod result;
pub mod rollable;
pub mod table;
pub mod validate;

pub use bundle::Bundle;
pub use config::EngineConfig;
pub use context::{Context, PREVIOUS_ROLL_KEY, ROLL_KEY};
pub use engine::{MAX_DEPTH, RollEngine, RowChoice, RowSelector, TableRollOptions};
pub use error::{TableError, TableResult};
pub use placeholder::{Evaluation, NamedRoll, PercentSection, evaluate_placeholders};
pub use prepare::{Definition, dimension_identifiers, prepare};
pub use reference::{IgnoreRef, TableRef, ValueRef, make_table_ref};
pub use registry::{Registry, TableStore, resolve_path};
pub use result::{EvaluatedRow, RollResult};
pub use rollable::Rollable;
pub use table::{Table, TableRow};
pub use validate::{IssueKind, ValidationIssue, is_valid, validate_table};
