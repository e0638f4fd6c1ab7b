//! Bundles: ordered groups of table references rolled as a unit.

use serde::Serialize;

use crate::reference::TableRef;

/// A registered bundle. References are rolled strictly in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    /// Absolute registry key.
    pub identifier: String,
    /// Optional display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// References rolled in order.
    pub tables: Vec<TableRef>,
}

impl Bundle {
    /// A bundle without a title.
    pub fn new(identifier: impl Into<String>, tables: Vec<TableRef>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            tables,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
