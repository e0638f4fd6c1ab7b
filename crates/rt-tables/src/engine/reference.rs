//! Resolving a table reference into roll results.

use rt_dice::DiceExpr;
use tracing::{debug, warn};

use super::{MAX_DEPTH, RollEngine, TableRollOptions};
use crate::context::{Context, PREVIOUS_ROLL_KEY};
use crate::error::TableResult;
use crate::reference::TableRef;
use crate::registry::TableStore;
use crate::result::RollResult;
use crate::rollable::Rollable;

impl<S: TableStore + ?Sized> RollEngine<'_, S> {
    /// Roll the target of `reference` as many times as its roll count.
    ///
    /// Bundle targets are rolled whole and their results flattened. With
    /// `unique`, every total of a selected row's range joins the reroll set
    /// so later rolls pick a different row.
    pub fn roll_ref(
        &mut self,
        reference: &TableRef,
        context: &Context,
        relative_to: Option<&str>,
        depth: u32,
    ) -> TableResult<Vec<RollResult>> {
        let target = self.store.get_rollable(&reference.path, relative_to)?;
        let count = reference.resolved_roll_count(context);
        let modifier = reference.resolved_modifier(context);
        let total = reference.resolved_total(context);
        let mut reroll = reference.exclusions(context);
        let dice = reference
            .dice
            .as_deref()
            .and_then(|notation| match notation.parse::<DiceExpr>() {
                Ok(dice) => Some(dice),
                Err(e) => {
                    warn!(path = %reference.path, "ignoring dice override: {e}");
                    None
                }
            });

        let mut results = Vec::new();
        for _ in 0..count {
            match target.as_ref() {
                Rollable::Bundle(bundle) => {
                    if depth >= MAX_DEPTH {
                        debug!(bundle = %bundle.identifier, depth, "bundle left unrolled at depth limit");
                        break;
                    }
                    let context = Context::new().with(PREVIOUS_ROLL_KEY, 0).merged(context);
                    let rolled = self.roll_bundle(bundle, context, depth + 1)?;
                    results.extend(rolled.into_iter().flatten());
                }
                Rollable::Table(table) => {
                    let options = TableRollOptions {
                        dice: dice.clone(),
                        total,
                        modifier,
                        reroll: reroll.clone(),
                        depth,
                        title: reference.title.clone(),
                    };
                    let result = self.roll_table(table, options)?;
                    if reference.unique
                        && let Some(row) = table.row_for_roll(result.total)
                    {
                        reroll.extend(row.range.members());
                    }
                    results.push(result);
                }
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::registry;
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::TableError;
    use crate::reference::{IgnoreRef, ValueRef};
    use std::collections::BTreeSet;

    const DICE: &str = r#"{
        "/d6": {"title": "Six", "dice": "d6", "rows": "1|one\n2|two\n3|three\n4|four\n5|five\n6|six"},
        "/pairs": {"title": "Pairs", "dice": "d6", "rows": "1-2|low\n3-4|mid\n5-6|high"}
    }"#;

    fn engine_roll(json: &str, reference: TableRef, context: Context, seed: u64) -> Vec<RollResult> {
        let reg = registry(json);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default().with_seed(seed));
        engine.roll_ref(&reference, &context, None, 0).unwrap()
    }

    #[test]
    fn roll_count_from_literal_and_context() {
        let r = engine_roll(DICE, TableRef::new("/d6").with_roll_count(4), Context::new(), 1);
        assert_eq!(r.len(), 4);
        let ctx = Context::new().with("times", 2);
        let r = engine_roll(DICE, TableRef::new("/d6").with_roll_count("times"), ctx, 1);
        assert_eq!(r.len(), 2);
        let r = engine_roll(DICE, TableRef::new("/d6").with_roll_count("unknown"), Context::new(), 1);
        assert_eq!(r.len(), 1);
        let ctx = Context::new().with("none", 0);
        let r = engine_roll(DICE, TableRef::new("/d6").with_roll_count("none"), ctx, 1);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn forced_total_from_context() {
        let ctx = Context::new().with("pick", 5);
        let r = engine_roll(DICE, TableRef::new("/d6").with_total("pick"), ctx, 1);
        assert_eq!(r[0].row.text, "five");
    }

    #[test]
    fn title_override_does_not_touch_the_table() {
        let reg = registry(DICE);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default().with_seed(3));
        let reference = TableRef::new("/d6").with_title("Custom");
        let r = engine.roll_ref(&reference, &Context::new(), None, 0).unwrap();
        assert_eq!(r[0].title, "Custom");
        assert_eq!(reg.get("/d6").unwrap().title(), "Six");
    }

    #[test]
    fn dice_override_and_modifier() {
        let r = engine_roll(
            DICE,
            TableRef::new("/d6").with_dice("2").with_modifier(1),
            Context::new(),
            1,
        );
        assert_eq!(r[0].total, 3);
        assert_eq!(r[0].dice.to_string(), "2");
    }

    #[test]
    fn bad_dice_override_falls_back_to_table_dice() {
        let r = engine_roll(DICE, TableRef::new("/d6").with_dice("oops"), Context::new(), 1);
        assert_eq!(r[0].dice.to_string(), "d6");
    }

    #[test]
    fn ignored_totals_never_appear() {
        for seed in 0..20 {
            let reference = TableRef::new("/d6")
                .with_roll_count(25)
                .with_ignore(IgnoreRef::Many(vec![ValueRef::Number(3), ValueRef::Number(5)]));
            let r = engine_roll(DICE, reference, Context::new(), seed);
            assert!(r.iter().all(|r| r.total != 3 && r.total != 5));
        }
    }

    #[test]
    fn ignored_span_and_context_key() {
        let ctx = Context::new().with("last", 6);
        let reference = TableRef::new("/d6").with_roll_count(30).with_ignore(IgnoreRef::Many(vec![
            ValueRef::Key("1-4".into()),
            ValueRef::Key("last".into()),
        ]));
        let r = engine_roll(DICE, reference, ctx, 9);
        assert!(r.iter().all(|r| r.total == 5));
    }

    #[test]
    fn unique_rolls_pick_distinct_rows() {
        for seed in 0..30 {
            let reference = TableRef::new("/d6").with_roll_count(3).unique(true);
            let r = engine_roll(DICE, reference, Context::new(), seed);
            let rows: BTreeSet<&str> = r.iter().map(|r| r.row.text.as_str()).collect();
            assert_eq!(rows.len(), 3);
        }
    }

    #[test]
    fn unique_excludes_whole_row_range() {
        for seed in 0..30 {
            let reference = TableRef::new("/pairs").with_roll_count(3).unique(true);
            let r = engine_roll(DICE, reference, Context::new(), seed);
            let rows: BTreeSet<&str> = r.iter().map(|r| r.row.text.as_str()).collect();
            assert_eq!(rows, BTreeSet::from(["low", "mid", "high"]));
        }
    }

    #[test]
    fn bundle_targets_are_flattened() {
        let json = r#"{
            "/d6": {"dice": "d6", "rows": "1-6|x"},
            "/two": {"tables": [{"path": "./d6"}, {"path": "./d6", "rollCount": 2}]}
        }"#;
        let r = engine_roll(json, TableRef::new("/two").with_roll_count(2), Context::new(), 1);
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn self_referencing_bundle_terminates() {
        let json = r#"{
            "/d6": {"dice": "d6", "rows": "1-6|x"},
            "/again": {"tables": [{"path": "./d6"}, {"path": "./again"}]}
        }"#;
        let r = engine_roll(json, TableRef::new("/again"), Context::new(), 1);
        assert_eq!(r.len(), MAX_DEPTH as usize);
    }

    #[test]
    fn relative_reference_without_anchor_fails() {
        let reg = registry(DICE);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default());
        let err = engine
            .roll_ref(&TableRef::new("./d6"), &Context::new(), None, 0)
            .unwrap_err();
        assert!(matches!(err, TableError::RelativeWithoutAnchor(_)));
    }

    #[test]
    fn missing_target_fails() {
        let reg = registry(DICE);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default());
        let err = engine
            .roll_ref(&TableRef::new("/nope"), &Context::new(), None, 0)
            .unwrap_err();
        assert!(matches!(err, TableError::NotFound(_)));
    }
}
