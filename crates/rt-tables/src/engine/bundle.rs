//! Rolling bundles and top-level rollables.

use super::{RollEngine, TableRollOptions};
use crate::bundle::Bundle;
use crate::context::{Context, PREVIOUS_ROLL_KEY};
use crate::error::TableResult;
use crate::registry::TableStore;
use crate::result::RollResult;
use crate::rollable::Rollable;

impl<S: TableStore + ?Sized> RollEngine<'_, S> {
    /// Roll each reference of `bundle` in order, one result list per
    /// reference.
    ///
    /// After every roll the row's context is merged into the bundle
    /// context, `$previousRoll` is set to its total, and the reference's
    /// `store` directives run, so later references can use earlier picks.
    pub fn roll_bundle(
        &mut self,
        bundle: &Bundle,
        context: Context,
        depth: u32,
    ) -> TableResult<Vec<Vec<RollResult>>> {
        let mut context = context;
        let mut out = Vec::with_capacity(bundle.tables.len());
        for reference in &bundle.tables {
            let results = self.roll_ref(reference, &context, Some(&bundle.identifier), depth)?;
            for result in &results {
                context = context
                    .merged(&result.row.context())
                    .with(PREVIOUS_ROLL_KEY, result.total);
                context = reference.apply_store(context);
            }
            out.push(results);
        }
        Ok(out)
    }

    /// Roll a table or bundle directly. A bundle's context starts with
    /// `$previousRoll = 0` under the given values. A table ignores the
    /// context: its meta sees only the selected row's context.
    pub fn roll_rollable(
        &mut self,
        rollable: &Rollable,
        context: Context,
    ) -> TableResult<Vec<Vec<RollResult>>> {
        match rollable {
            Rollable::Bundle(bundle) => {
                let context = Context::new().with(PREVIOUS_ROLL_KEY, 0).merged(&context);
                self.roll_bundle(bundle, context, 0)
            }
            Rollable::Table(table) => {
                Ok(vec![vec![self.roll_table(table, TableRollOptions::default())?]])
            }
        }
    }

    /// Look up `path` in the store and roll it with [`RollEngine::roll_rollable`].
    pub fn roll_path(&mut self, path: &str, context: Context) -> TableResult<Vec<Vec<RollResult>>> {
        let rollable = self.store.get_rollable(path, None)?;
        self.roll_rollable(&rollable, context)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::registry;
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::ROLL_KEY;
    use crate::error::TableError;

    fn roll(json: &str, path: &str, context: Context) -> Vec<Vec<RollResult>> {
        let reg = registry(json);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default().with_seed(11));
        engine.roll_path(path, context).unwrap()
    }

    #[test]
    fn one_list_per_reference_in_order() {
        let out = roll(
            r#"{
                "/a": {"title": "A", "dice": "d1", "rows": "1|a"},
                "/b": {"title": "B", "dice": "d1", "rows": "1|b"},
                "/ab": {"title": "AB", "tables": [{"path": "./b"}, {"path": "./a", "rollCount": 2}]}
            }"#,
            "/ab",
            Context::new(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][0].row.text, "b");
        assert_eq!(out[1].len(), 2);
        assert_eq!(out[1][1].row.text, "a");
    }

    #[test]
    fn previous_roll_feeds_next_reference() {
        let out = roll(
            r#"{
                "/first": {"dice": "d1", "rows": "1|first"},
                "/second": {"dice": "d1", "rows": "1-20|second"},
                "/seq": {"tables": [
                    {"path": "./first", "total": 4},
                    {"path": "./second", "total": "$previousRoll"}
                ]}
            }"#,
            "/seq",
            Context::new(),
        );
        assert_eq!(out[0][0].total, 4);
        assert_eq!(out[1][0].total, 4);
    }

    #[test]
    fn named_rolls_flow_to_later_references() {
        let out = roll(
            r#"{
                "/gold": {"dice": "d1", "rows": "1|[[@coins:3]] coins"},
                "/bags": {"dice": "d1", "rows": "1|bag"},
                "/hoard": {"tables": [{"path": "./gold"}, {"path": "./bags", "rollCount": "coins"}]}
            }"#,
            "/hoard",
            Context::new(),
        );
        assert_eq!(out[1].len(), 3);
    }

    #[test]
    fn store_copies_values_for_later_references() {
        let out = roll(
            r#"{
                "/pick": {"dice": "d1", "rows": "1-9|picked"},
                "/echo": {"dice": "d1", "rows": "1-9|echo"},
                "/filler": {"dice": "d1", "rows": "1-9|filler"},
                "/seq": {"tables": [
                    {"path": "./pick", "total": 7, "store": {"kept": "$roll"}},
                    {"path": "./filler", "total": 2},
                    {"path": "./echo", "total": "kept"}
                ]}
            }"#,
            "/seq",
            Context::new(),
        );
        assert_eq!(out[1][0].total, 2);
        assert_eq!(out[2][0].total, 7);
    }

    #[test]
    fn initial_context_is_visible() {
        let out = roll(
            r#"{
                "/t": {"dice": "d1", "rows": "1-9|t"},
                "/b": {"tables": [{"path": "./t", "total": "start"}]}
            }"#,
            "/b",
            Context::new().with("start", 6),
        );
        assert_eq!(out[0][0].total, 6);
    }

    #[test]
    fn tables_roll_directly() {
        let out = roll(
            r#"{"/t": {"dice": "d1", "rows": ["1|t", {"path": "./u", "total": "$previousRoll"}], "title": "T"},
                "/u": {"dice": "d4", "rows": "1-4|u"}}"#,
            "/t",
            Context::new(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 1);
        let meta = out[0][0].evaluated_tables().unwrap();
        assert_eq!(meta[0].len(), 1);
        assert_eq!(out[0][0].context().get(ROLL_KEY), Some(1));
    }

    #[test]
    fn callers_context_is_untouched() {
        let reg = registry(
            r#"{"/t": {"dice": "d1", "rows": "1|[[@x:2]]"}, "/b": {"tables": [{"path": "./t"}]}}"#,
        );
        let mut engine = RollEngine::new(&reg, &EngineConfig::default().with_seed(1));
        let context = Context::new().with("keep", 1);
        let bundle = reg.get("/b").unwrap();
        engine
            .roll_bundle(bundle.as_bundle().unwrap(), context.clone(), 0)
            .unwrap();
        assert_eq!(context, Context::new().with("keep", 1));
    }

    #[test]
    fn unknown_path_fails() {
        let reg = registry(r#"{"/t": {"dice": "d1", "rows": "1|t"}}"#);
        let mut engine = RollEngine::new(&reg, &EngineConfig::default());
        assert!(matches!(
            engine.roll_path("/missing", Context::new()),
            Err(TableError::NotFound(_))
        ));
    }
}
