//! Anything a table reference can point at.

use serde::Serialize;

use crate::bundle::Bundle;
use crate::table::Table;

/// A registered table or bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rollable {
    /// A table of rows.
    Table(Table),
    /// An ordered group of references.
    Bundle(Bundle),
}

impl Rollable {
    /// The registry key.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Table(t) => &t.identifier,
            Self::Bundle(b) => &b.identifier,
        }
    }

    /// The display title. Untitled bundles show their identifier.
    pub fn title(&self) -> &str {
        match self {
            Self::Table(t) => &t.title,
            Self::Bundle(b) => b.title.as_deref().unwrap_or(&b.identifier),
        }
    }

    /// The table, if this is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            Self::Bundle(_) => None,
        }
    }

    /// The bundle, if this is one.
    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Self::Table(_) => None,
            Self::Bundle(b) => Some(b),
        }
    }
}

impl From<Table> for Rollable {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Bundle> for Rollable {
    fn from(bundle: Bundle) -> Self {
        Self::Bundle(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::TableRef;
    use crate::table::TableRow;
    use rt_dice::parse_dice;

    #[test]
    fn accessors_match_variant() {
        let table: Rollable =
            Table::new("/t", "T", parse_dice("d2"), vec![TableRow::new(1, "x")]).into();
        assert_eq!(table.identifier(), "/t");
        assert_eq!(table.title(), "T");
        assert!(table.as_table().is_some());
        assert!(table.as_bundle().is_none());

        let bundle: Rollable = Bundle::new("/b", vec![TableRef::new("/t")]).into();
        assert_eq!(bundle.title(), "/b");
        assert!(bundle.as_bundle().is_some());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let bundle: Rollable = Bundle::new("/b", Vec::new()).with_title("B").into();
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["kind"], "bundle");
        assert_eq!(json["title"], "B");
    }
}
