/// Object-name normalization: owner qualification, alias stripping, case folding.
pub mod names;
/// Table and function reference extraction from view definitions.
pub mod references;
/// Thin wrapper around `sqlparser` for dialect lookup and parsing.
pub mod sql_parser;
/// Comment stripping and whitespace normalization of definition text.
pub mod sql_text;
