//! Schema catalog access: resolving an object's kind and view text.

/// Live Oracle catalog over ODBC.
#[cfg(feature = "odbc")]
pub mod odbc;
/// In-memory catalog loadable from a JSON snapshot.
pub mod snapshot;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::names::ObjectRef;

/// Kind of a catalog object the crawler can traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectKind {
    /// Terminal: never expanded.
    Table,
    /// Expanded through its definition text.
    View,
}

/// Result of looking an object up in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A table (or any non-view object), never expanded.
    Table,
    /// A view with its cleaned definition text.
    View {
        /// Concatenated, comment-stripped, whitespace-normalized definition.
        definition: String,
    },
    /// No such object for this owner.
    NotFound,
}

impl Resolution {
    /// Kind of the resolved object, if it exists.
    pub fn kind(&self) -> Option<ObjectKind> {
        match self {
            Resolution::Table => Some(ObjectKind::Table),
            Resolution::View { .. } => Some(ObjectKind::View),
            Resolution::NotFound => None,
        }
    }
}

/// Source of object metadata and view definitions.
///
/// Implementations return `Ok(Resolution::NotFound)` for a missing object and
/// reserve `Err` for failures of the catalog itself.
pub trait CatalogAdapter {
    /// Resolve `object` to its kind and, for views, definition text.
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution>;
}

impl<C: CatalogAdapter + ?Sized> CatalogAdapter for &C {
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution> {
        (**self).resolve(object)
    }
}

impl<C: CatalogAdapter + ?Sized> CatalogAdapter for Box<C> {
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution> {
        (**self).resolve(object)
    }
}
