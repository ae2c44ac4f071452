//! Live Oracle catalog over ODBC.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - An Oracle ODBC driver must be installed and registered with the driver
//!   manager (unixODBC on Linux/macOS, the ODBC administrator on Windows)
//!
//! Kinds come from `ALL_OBJECTS` and view text from `ALL_VIEWS`, so the
//! connecting user only sees objects it has been granted access to.

use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogAdapter, Resolution};
use crate::error::{CrawlError, Result};
use crate::parser::names::ObjectRef;
use crate::parser::sql_text::join_fragments;

/// Upper bound for a single text cell. `ALL_VIEWS.TEXT` is a `LONG` column.
const MAX_TEXT_BYTES: usize = 1 << 20;

/// Connection parameters for an Oracle ODBC data source.
#[derive(Debug, Clone)]
pub struct OdbcConfig {
    /// Registered ODBC driver name, e.g. `Oracle in instantclient_23_7`.
    pub driver: String,
    /// Database host.
    pub host: String,
    /// Listener port.
    pub port: u16,
    /// Service name.
    pub service: String,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
}

impl OdbcConfig {
    /// Build the driver connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "Driver={{{}}};Dbq={}:{}/{};Uid={};Pwd={};",
            self.driver, self.host, self.port, self.service, self.user, self.password
        )
    }

    /// Connection target without credentials, for logs.
    pub fn describe(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.service)
    }
}

/// Escape a SQL string literal value. Doubles single quotes: `O'Brien` -> `O''Brien`.
fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Oracle schema catalog reached through ODBC.
pub struct OdbcCatalog {
    env: Environment,
    connection_string: String,
}

impl OdbcCatalog {
    /// Connect using structured parameters.
    pub fn connect(config: &OdbcConfig) -> Result<Self> {
        let catalog = Self::connect_with_string(config.connection_string())?;
        info!("Connected to Oracle via ODBC: {}", config.describe());
        Ok(catalog)
    }

    /// Connect using a raw ODBC connection string.
    ///
    /// The connection is opened once up front so that credential and
    /// listener problems surface before any crawling starts.
    pub fn connect_with_string(connection_string: String) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            CrawlError::Connection(format!(
                "Failed to create ODBC environment: {e}. \
                 Make sure an ODBC driver manager and the Oracle ODBC driver are installed."
            ))
        })?;

        {
            let conn = env
                .connect_with_connection_string(&connection_string, ConnectionOptions::default())
                .map_err(|e| connection_failure(&e.to_string()))?;
            conn.execute("SELECT 1 FROM DUAL", ())
                .map_err(|e| connection_failure(&e.to_string()))?;
        }

        Ok(Self {
            env,
            connection_string,
        })
    }

    fn execute_query(&self, object: &ObjectRef, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let conn = self
            .env
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
            .map_err(|e| CrawlError::catalog(object, format!("ODBC connection failed: {e}")))?;

        let mut rows = Vec::new();

        if let Some(mut cursor) = conn
            .execute(sql, ())
            .map_err(|e| CrawlError::catalog(object, format!("ODBC query failed: {e}")))?
        {
            let num_cols = cursor.num_result_cols().map_err(|e| {
                CrawlError::catalog(object, format!("Failed to get column count: {e}"))
            })? as usize;

            let mut buffers = TextRowSet::for_cursor(1, &mut cursor, Some(MAX_TEXT_BYTES))
                .map_err(|e| {
                    CrawlError::catalog(object, format!("Failed to create row buffer: {e}"))
                })?;

            let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(|e| {
                CrawlError::catalog(object, format!("Failed to bind buffer: {e}"))
            })?;

            while let Some(batch) = row_cursor
                .fetch_with_truncation_check(true)
                .map_err(|e| fetch_failure(object, e))?
            {
                for row_idx in 0..batch.num_rows() {
                    let mut row = Vec::with_capacity(num_cols);
                    for col_idx in 0..num_cols {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).to_string());
                        row.push(value);
                    }
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }
}

fn fetch_failure(object: &ObjectRef, error: odbc_api::Error) -> CrawlError {
    if matches!(error, odbc_api::Error::TooLargeValueForBuffer { .. }) {
        warn!("{object}: catalog value exceeds {MAX_TEXT_BYTES} bytes");
        return CrawlError::catalog(
            object,
            format!("Catalog value exceeds {MAX_TEXT_BYTES} bytes and would be truncated"),
        );
    }
    CrawlError::catalog(object, format!("Failed to fetch rows: {error}"))
}

fn connection_failure(message: &str) -> CrawlError {
    error!("Failed to connect to Oracle: {message}");
    if message.contains("ORA-12520") {
        error!(
            "Tip: ORA-12520 often means the service name is incorrect, misspelled, or has no handler."
        );
    }
    CrawlError::Connection(message.to_string())
}

impl CatalogAdapter for OdbcCatalog {
    fn resolve(&self, object: &ObjectRef) -> Result<Resolution> {
        let owner = escape_sql_string(object.owner());
        let name = escape_sql_string(object.name());

        let kinds = self.execute_query(
            object,
            &format!(
                "SELECT object_type FROM all_objects \
                 WHERE object_name = '{name}' AND owner = '{owner}'"
            ),
        )?;
        let kinds: Vec<String> = kinds
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect();
        debug!("{object}: catalog types {kinds:?}");

        if kinds.is_empty() {
            return Ok(Resolution::NotFound);
        }
        if !kinds.iter().any(|kind| kind.trim() == "VIEW") {
            return Ok(Resolution::Table);
        }

        let fragments: Vec<String> = self
            .execute_query(
                object,
                &format!(
                    "SELECT text FROM all_views \
                     WHERE view_name = '{name}' AND owner = '{owner}'"
                ),
            )?
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect();

        Ok(Resolution::View {
            definition: join_fragments(&fragments),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_uses_easy_connect_dbq() {
        let config = OdbcConfig {
            driver: "Oracle".to_string(),
            host: "db.example".to_string(),
            port: 1521,
            service: "ORCLPDB1".to_string(),
            user: "scott".to_string(),
            password: "tiger".to_string(),
        };
        assert_eq!(
            config.connection_string(),
            "Driver={Oracle};Dbq=db.example:1521/ORCLPDB1;Uid=scott;Pwd=tiger;"
        );
        assert_eq!(config.describe(), "db.example:1521/ORCLPDB1");
    }

    #[test]
    fn oversized_values_are_reported_not_truncated() {
        let object = ObjectRef::new("SALES", "V_HUGE");
        let err = fetch_failure(
            &object,
            odbc_api::Error::TooLargeValueForBuffer {
                indicator: Some(MAX_TEXT_BYTES * 2),
                buffer_index: 0,
            },
        );
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("SALES.V_HUGE"));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn escape_sql_string_doubles_quotes() {
        assert_eq!(escape_sql_string("O'BRIEN"), "O''BRIEN");
    }
}
