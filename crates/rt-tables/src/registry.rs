//! The in-memory table registry and path resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::{TableError, TableResult};
use crate::prepare::{Definition, prepare};
use crate::rollable::Rollable;

/// Source of registered tables and bundles for the roll engine.
pub trait TableStore {
    /// Resolve `path` (absolute or relative to the identifier
    /// `relative_to`) to a registered rollable.
    fn get_rollable(&self, path: &str, relative_to: Option<&str>) -> TableResult<Arc<Rollable>>;
}

fn parent(identifier: &str) -> &str {
    match identifier.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &identifier[..i],
    }
}

/// Join and normalize path segments, resolving `.` and `..`.
fn normalize(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Resolve a reference path to an absolute identifier.
///
/// - `./x` and `../x` resolve against the directory of `relative_to`
/// - `$/x` resolves below `relative_to` itself
/// - `x` without a leading slash is treated as `/x`
pub fn resolve_path(path: &str, relative_to: Option<&str>) -> TableResult<String> {
    if let Some(rest) = path.strip_prefix("$/") {
        let anchor = relative_to.ok_or_else(|| TableError::RelativeWithoutAnchor(path.to_string()))?;
        return Ok(normalize(anchor, rest));
    }
    if path.starts_with('.') {
        let anchor = relative_to.ok_or_else(|| TableError::RelativeWithoutAnchor(path.to_string()))?;
        return Ok(normalize(parent(anchor), path));
    }
    Ok(normalize("/", path))
}

/// Registered tables and bundles keyed by absolute identifier.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    rollables: BTreeMap<String, Arc<Rollable>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare and register a definition under `identifier`.
    ///
    /// Multi-dimensional definitions register one table per dimension.
    pub fn register(
        &mut self,
        identifier: &str,
        definition: Definition,
    ) -> TableResult<Vec<Arc<Rollable>>> {
        if !identifier.starts_with('/') {
            return Err(TableError::NonAbsoluteIdentifier(identifier.to_string()));
        }
        prepare(identifier, definition)?
            .into_iter()
            .map(|rollable| self.insert(rollable))
            .collect()
    }

    /// Register an already prepared table or bundle, replacing any
    /// previous entry with the same identifier.
    pub fn insert(&mut self, rollable: impl Into<Rollable>) -> TableResult<Arc<Rollable>> {
        let rollable = Arc::new(rollable.into());
        let identifier = rollable.identifier().to_string();
        if !identifier.starts_with('/') {
            return Err(TableError::NonAbsoluteIdentifier(identifier));
        }
        debug!(identifier = %identifier, "registered");
        self.rollables.insert(identifier, Arc::clone(&rollable));
        Ok(rollable)
    }

    /// Register every definition in a JSON object keyed by identifier.
    /// Returns the identifiers registered, in identifier order.
    pub fn load_json(&mut self, text: &str) -> TableResult<Vec<String>> {
        let definitions: BTreeMap<String, Definition> = serde_json::from_str(text)?;
        let mut identifiers = Vec::new();
        for (identifier, definition) in definitions {
            for rollable in self.register(&identifier, definition)? {
                identifiers.push(rollable.identifier().to_string());
            }
        }
        Ok(identifiers)
    }

    /// Look up an exact identifier.
    pub fn get(&self, identifier: &str) -> Option<Arc<Rollable>> {
        self.rollables.get(identifier).cloned()
    }

    /// Iterate over identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.rollables.keys().map(String::as_str)
    }

    /// Iterate over registered rollables in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Rollable>> {
        self.rollables.values()
    }

    /// Every rollable whose identifier starts with `dir`.
    pub fn tables_in_directory(&self, dir: &str) -> Vec<Arc<Rollable>> {
        self.rollables
            .values()
            .filter(|r| r.identifier().starts_with(dir))
            .cloned()
            .collect()
    }

    /// A uniformly chosen table (never a bundle).
    pub fn random_table<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arc<Rollable>> {
        let tables: Vec<&Arc<Rollable>> = self
            .rollables
            .values()
            .filter(|r| matches!(r.as_ref(), Rollable::Table(_)))
            .collect();
        if tables.is_empty() {
            return None;
        }
        Some(Arc::clone(tables[rng.random_range(0..tables.len())]))
    }

    /// Number of registered rollables.
    pub fn len(&self) -> usize {
        self.rollables.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.rollables.is_empty()
    }
}

impl TableStore for Registry {
    fn get_rollable(&self, path: &str, relative_to: Option<&str>) -> TableResult<Arc<Rollable>> {
        let identifier = resolve_path(path, relative_to)?;
        debug!(path, identifier = %identifier, "lookup");
        self.get(&identifier)
            .ok_or(TableError::NotFound(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;
    use crate::reference::TableRef;
    use crate::table::{Table, TableRow};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rt_dice::parse_dice;

    fn table(identifier: &str) -> Table {
        Table::new(identifier, identifier, parse_dice("d1"), vec![TableRow::new(1, "x")])
    }

    #[test]
    fn resolves_paths() {
        let from = Some("/dmg/treasure/hoard");
        assert_eq!(resolve_path("/a/b", None).unwrap(), "/a/b");
        assert_eq!(resolve_path("a/b", None).unwrap(), "/a/b");
        assert_eq!(resolve_path("./gems", from).unwrap(), "/dmg/treasure/gems");
        assert_eq!(resolve_path("../npc/names", from).unwrap(), "/dmg/npc/names");
        assert_eq!(resolve_path("../../../../x", from).unwrap(), "/x");
        assert_eq!(resolve_path("$/coins", from).unwrap(), "/dmg/treasure/hoard/coins");
        assert_eq!(resolve_path("./x", Some("/top")).unwrap(), "/x");
    }

    #[test]
    fn relative_paths_need_an_anchor() {
        assert!(matches!(
            resolve_path("./gems", None),
            Err(TableError::RelativeWithoutAnchor(_))
        ));
        assert!(matches!(
            resolve_path("$/gems", None),
            Err(TableError::RelativeWithoutAnchor(_))
        ));
    }

    #[test]
    fn insert_and_lookup() {
        let mut reg = Registry::new();
        reg.insert(table("/dmg/gems")).unwrap();
        reg.insert(Bundle::new("/dmg/hoard", vec![TableRef::new("./gems")]))
            .unwrap();
        assert_eq!(reg.len(), 2);
        let found = reg.get_rollable("./gems", Some("/dmg/hoard")).unwrap();
        assert_eq!(found.identifier(), "/dmg/gems");
        assert!(matches!(
            reg.get_rollable("/dmg/missing", None),
            Err(TableError::NotFound(id)) if id == "/dmg/missing"
        ));
    }

    #[test]
    fn rejects_relative_identifiers() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.insert(table("gems")),
            Err(TableError::NonAbsoluteIdentifier(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn loads_json_documents() {
        let mut reg = Registry::new();
        let ids = reg
            .load_json(
                r#"{
                    "/names": {"title": "Names", "rows": "Ann\nBo"},
                    "/party": {"tables": [{"path": "./names", "rollCount": 2}]},
                    "/npc": {"dice": "d2", "dimensions": ["Hair", "Eyes"], "rows": [{"range": "1/1-2", "text": "x"}, {"range": "2/1-2", "text": "y"}]}
                }"#,
            )
            .unwrap();
        assert_eq!(ids, vec!["/names", "/npc/hair", "/npc/eyes", "/party"]);
        assert_eq!(
            reg.identifiers().collect::<Vec<_>>(),
            vec!["/names", "/npc/eyes", "/npc/hair", "/party"]
        );
    }

    #[test]
    fn load_json_reports_decode_errors() {
        let mut reg = Registry::new();
        assert!(matches!(reg.load_json("[1, 2]"), Err(TableError::Json(_))));
    }

    #[test]
    fn load_json_rejects_dice_without_sides() {
        let mut reg = Registry::new();
        for json in [
            r##"{"/e": {"dice": "#", "rows": ""}}"##,
            r#"{"/z": {"dice": [{"count": 1, "sides": 0, "multiplier": 1}], "rows": "1|a"}}"#,
        ] {
            assert!(matches!(
                reg.load_json(json),
                Err(TableError::InvalidDefinition { .. })
            ));
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn directory_listing() {
        let mut reg = Registry::new();
        for id in ["/a/x", "/a/y", "/b/z"] {
            reg.insert(table(id)).unwrap();
        }
        assert_eq!(reg.tables_in_directory("/a/").len(), 2);
        assert_eq!(reg.tables_in_directory("/").len(), 3);
    }

    #[test]
    fn random_table_skips_bundles() {
        let mut reg = Registry::new();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(reg.random_table(&mut rng).is_none());
        reg.insert(Bundle::new("/b", Vec::new())).unwrap();
        assert!(reg.random_table(&mut rng).is_none());
        reg.insert(table("/t")).unwrap();
        for _ in 0..10 {
            assert_eq!(reg.random_table(&mut rng).unwrap().identifier(), "/t");
        }
    }
}
