use sqlparser::ast::Statement;
use sqlparser::dialect::{dialect_from_str, Dialect};
use sqlparser::parser::{Parser, ParserError};

use crate::error::CrawlError;

/// Dialect used when none is configured.
pub const DEFAULT_DIALECT: &str = "generic";

/// Look up a `sqlparser` dialect by name (`generic`, `ansi`, `postgresql`, ...).
pub fn resolve_dialect(name: &str) -> Result<Box<dyn Dialect>, CrawlError> {
    dialect_from_str(name.trim()).ok_or_else(|| CrawlError::UnknownDialect(name.to_string()))
}

/// Convenience: parse a definition into statements under `dialect`.
pub fn parse_definition(dialect: &dyn Dialect, sql: &str) -> Result<Vec<Statement>, ParserError> {
    Parser::parse_sql(dialect, sql)
}
