//! Error types for crawling and artifact output.

use thiserror::Error;

use crate::parser::names::ObjectRef;

/// Main error type for crawl operations.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The schema catalog could not be opened (bad credentials, unreachable host, missing file).
    #[error("Catalog connection failed: {0}")]
    Connection(String),

    /// An object reachable from the root does not exist in the catalog.
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectRef),

    /// A catalog lookup failed after the connection was established.
    #[error("Catalog lookup failed for {object}: {message}")]
    Catalog {
        /// Object being looked up.
        object: String,
        /// Driver or query error text.
        message: String,
    },

    /// Invalid or unsupported command-line configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The root object name is not of the form `owner.name`.
    #[error("Invalid object name '{0}': expected <owner>.<name>")]
    InvalidObjectName(String),

    /// No SQL dialect is registered under the configured name.
    #[error("Unknown SQL dialect '{0}'")]
    UnknownDialect(String),

    /// The built-in function registry extension could not be loaded.
    #[error("Invalid built-in registry: {0}")]
    Registry(String),

    /// Artifacts could not be written.
    #[error("Output error: {0}")]
    Output(String),
}

impl CrawlError {
    /// Create a Catalog error for a lookup of `object`.
    pub fn catalog(object: impl ToString, message: impl Into<String>) -> Self {
        CrawlError::Catalog {
            object: object.to_string(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// `2` and `3` are a stable contract: connection failure and a missing
    /// object respectively.
    pub fn exit_code(&self) -> u8 {
        match self {
            CrawlError::Connection(_) => 2,
            CrawlError::ObjectNotFound(_) => 3,
            CrawlError::Catalog { .. } | CrawlError::Output(_) => 4,
            CrawlError::Config(_)
            | CrawlError::InvalidObjectName(_)
            | CrawlError::UnknownDialect(_)
            | CrawlError::Registry(_) => 1,
        }
    }
}

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_connection_and_missing_objects() {
        let missing = CrawlError::ObjectNotFound(ObjectRef::new("sales", "v_gone"));
        let connection = CrawlError::Connection("refused".to_string());

        assert_eq!(connection.exit_code(), 2);
        assert_eq!(missing.exit_code(), 3);
        assert_ne!(connection.exit_code(), missing.exit_code());
        assert_eq!(missing.to_string(), "Object not found: SALES.V_GONE");
    }

    #[test]
    fn catalog_helper_renders_object_context() {
        let err = CrawlError::catalog("SALES.V_ORDERS", "ORA-00942");
        assert_eq!(err.exit_code(), 4);
        assert_eq!(
            err.to_string(),
            "Catalog lookup failed for SALES.V_ORDERS: ORA-00942"
        );
    }
}
