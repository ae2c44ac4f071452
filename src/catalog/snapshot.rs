use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogAdapter, Resolution};
use crate::error::{CrawlError, Result};
use crate::parser::names::ObjectRef;
use crate::parser::sql_text::join_fragments;

/// One catalog object in a snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotObject {
    /// Owning schema.
    pub owner: String,
    /// Object name.
    pub name: String,
    /// Catalog object type. `VIEW` is expanded; anything else is a leaf.
    pub kind: String,
    /// Definition fragments for views, in catalog row order.
    #[serde(default)]
    pub text: Vec<String>,
}

/// Serialized form of a snapshot catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// All objects in the snapshot.
    pub objects: Vec<SnapshotObject>,
}

/// In-memory catalog, built programmatically or loaded from a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    objects: HashMap<ObjectRef, Resolution>,
}

impl SnapshotCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table.
    pub fn with_table(mut self, owner: &str, name: &str) -> Self {
        self.objects
            .insert(ObjectRef::new(owner, name), Resolution::Table);
        self
    }

    /// Register a view whose definition is split across `fragments`.
    pub fn with_view<S: AsRef<str>>(mut self, owner: &str, name: &str, fragments: &[S]) -> Self {
        self.objects.insert(
            ObjectRef::new(owner, name),
            Resolution::View {
                definition: join_fragments(fragments),
            },
        );
        self
    }

    /// Build a catalog from a parsed snapshot.
    pub fn from_snapshot(snapshot: SnapshotFile) -> Self {
        let mut catalog = Self::new();
        for object in snapshot.objects {
            catalog = if object.kind.trim().eq_ignore_ascii_case("VIEW") {
                catalog.with_view(&object.owner, &object.name, object.text.as_slice())
            } else {
                catalog.with_table(&object.owner, &object.name)
            };
        }
        catalog
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SnapshotFile = serde_json::from_str(json)
            .map_err(|e| CrawlError::Connection(format!("Invalid catalog snapshot: {e}")))?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Open a snapshot file. An unreadable or malformed file is a connection failure.
    pub fn open(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Connection(format!(
                "Failed to read catalog snapshot {}: {e}",
                path.display()
            ))
        })?;
        let catalog = Self::from_json(&json)?;
        debug!(
            "Loaded {} objects from catalog snapshot {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Number of objects in the catalog.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the catalog holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl CatalogAdapter for SnapshotCatalog {
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution> {
        Ok(self
            .objects
            .get(object)
            .cloned()
            .unwrap_or(Resolution::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectKind;

    #[test]
    fn resolves_tables_views_and_missing_objects() {
        let catalog = SnapshotCatalog::new()
            .with_table("sales", "orders")
            .with_view("sales", "v_orders", &["SELECT *", "FROM orders -- all"]);

        assert_eq!(
            catalog.resolve(&ObjectRef::new("SALES", "ORDERS")).unwrap(),
            Resolution::Table
        );
        assert_eq!(
            catalog.resolve(&ObjectRef::new("SALES", "V_ORDERS")).unwrap(),
            Resolution::View {
                definition: "SELECT *\nFROM orders".to_string()
            }
        );
        assert_eq!(
            catalog
                .resolve(&ObjectRef::new("SALES", "MISSING"))
                .unwrap()
                .kind(),
            None
        );
    }

    #[test]
    fn from_json_treats_non_view_kinds_as_leaves() {
        let catalog = SnapshotCatalog::from_json(
            r#"{"objects": [
                {"owner": "sales", "name": "orders", "kind": "TABLE"},
                {"owner": "sales", "name": "orders_mv", "kind": "MATERIALIZED VIEW"},
                {"owner": "sales", "name": "v_orders", "kind": "view", "text": ["SELECT 1 FROM orders"]}
            ]}"#,
        )
        .expect("snapshot should parse");

        assert_eq!(catalog.len(), 3);
        let kind = |name: &str| {
            catalog
                .resolve(&ObjectRef::new("SALES", name))
                .unwrap()
                .kind()
        };
        assert_eq!(kind("ORDERS"), Some(ObjectKind::Table));
        assert_eq!(kind("ORDERS_MV"), Some(ObjectKind::Table));
        assert_eq!(kind("V_ORDERS"), Some(ObjectKind::View));
    }

    #[test]
    fn malformed_snapshot_is_a_connection_failure() {
        let err = SnapshotCatalog::from_json("{not json").expect_err("should fail");
        assert!(matches!(err, CrawlError::Connection(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_snapshot_file_is_a_connection_failure() {
        let err = SnapshotCatalog::open(Path::new("/definitely/not/here.json"))
            .expect_err("should fail");
        assert!(matches!(err, CrawlError::Connection(ref msg) if msg.contains("here.json")));
    }
}
