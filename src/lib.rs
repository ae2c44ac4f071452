//! Crawl the transitive table, view, and user-defined-function dependencies of a database view.
#![warn(missing_docs)]

/// Schema catalog adapters: snapshot files and live Oracle over ODBC.
pub mod catalog;
/// Function-call classification against the built-in registry.
pub mod classifier;
/// Depth-first dependency discovery from a root view.
pub mod crawler;
/// Error types and exit codes.
pub mod error;
/// Summary, tree, and definition artifacts.
pub mod output;
/// Name normalization, definition cleaning, and SQL reference extraction.
pub mod parser;

pub use crate::catalog::{CatalogAdapter, ObjectKind, Resolution};
pub use crate::crawler::{CrawlResult, Crawler};
pub use crate::error::{CrawlError, Result};
pub use crate::parser::names::ObjectRef;
