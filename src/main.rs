//! CLI entry point for `oracrawl`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing::{error, Level};

use oracrawl::catalog::snapshot::SnapshotCatalog;
use oracrawl::catalog::CatalogAdapter;
use oracrawl::classifier::function_registry::BuiltinRegistry;
use oracrawl::crawler::Crawler;
use oracrawl::error::{CrawlError, Result};
use oracrawl::output::formatter;
use oracrawl::parser::names::ObjectRef;
use oracrawl::parser::references::ReferenceExtractor;
use oracrawl::parser::sql_parser::DEFAULT_DIALECT;

#[derive(Parser)]
#[command(
    name = "oracrawl",
    about = "Crawl the table, view, and UDF dependencies of a database view",
    version
)]
#[command(group(
    ArgGroup::new("catalog")
        .required(true)
        .args(["catalog_file", "host", "connection_string"])
))]
#[cfg_attr(not(feature = "odbc"), allow(dead_code))]
struct Cli {
    /// Fully-qualified root object, e.g. SALES.V_ORDERS
    object: String,

    /// JSON catalog snapshot to crawl instead of a live database
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// Database host
    #[arg(long, requires_all = ["service", "user"])]
    host: Option<String>,

    /// Listener port
    #[arg(long, default_value_t = 1521)]
    port: u16,

    /// Service name
    #[arg(long)]
    service: Option<String>,

    /// Login user
    #[arg(long)]
    user: Option<String>,

    /// Login password
    #[arg(long, env = "ORACRAWL_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Raw ODBC connection string, instead of --host/--service/--user
    #[arg(long, env = "ORACRAWL_CONNECTION_STRING", hide_env_values = true)]
    connection_string: Option<String>,

    /// Registered ODBC driver name
    #[arg(long, default_value = "Oracle")]
    odbc_driver: String,

    /// SQL dialect used to parse view definitions. Use `snowflake` for
    /// definitions with Oracle `(+)` outer joins, which `generic` rejects.
    #[arg(long, default_value = DEFAULT_DIALECT)]
    dialect: String,

    /// JSON array of additional built-in function names
    #[arg(long)]
    builtins: Option<PathBuf>,

    /// Output directory; artifacts land in <output-dir>/<OBJECT>/
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    setup_logging(&cli.verbosity, &cli.log_format);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let root: ObjectRef = cli.object.parse()?;

    let mut registry = BuiltinRegistry::oracle();
    if let Some(path) = &cli.builtins {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Registry(format!("Failed to read {}: {e}", path.display()))
        })?;
        registry
            .load_from_json(&content)
            .map_err(CrawlError::Registry)?;
    }
    let extractor = ReferenceExtractor::new(&cli.dialect, registry)?;

    let catalog = open_catalog(cli)?;
    let result = Crawler::new(catalog, extractor).crawl(&root)?;

    formatter::write_output(&cli.output_dir, &result).map_err(CrawlError::Output)
}

fn open_catalog(cli: &Cli) -> Result<Box<dyn CatalogAdapter>> {
    if let Some(path) = &cli.catalog_file {
        return Ok(Box::new(SnapshotCatalog::open(path)?));
    }
    open_live_catalog(cli)
}

#[cfg(feature = "odbc")]
fn open_live_catalog(cli: &Cli) -> Result<Box<dyn CatalogAdapter>> {
    use oracrawl::catalog::odbc::{OdbcCatalog, OdbcConfig};

    if let Some(connection_string) = &cli.connection_string {
        return Ok(Box::new(OdbcCatalog::connect_with_string(
            connection_string.clone(),
        )?));
    }

    let (Some(host), Some(service), Some(user)) = (&cli.host, &cli.service, &cli.user) else {
        return Err(CrawlError::Config(
            "--host, --service, and --user are required for a live catalog".to_string(),
        ));
    };
    let config = OdbcConfig {
        driver: cli.odbc_driver.clone(),
        host: host.clone(),
        port: cli.port,
        service: service.clone(),
        user: user.clone(),
        password: cli.password.clone(),
    };
    Ok(Box::new(OdbcCatalog::connect(&config)?))
}

#[cfg(not(feature = "odbc"))]
fn open_live_catalog(_cli: &Cli) -> Result<Box<dyn CatalogAdapter>> {
    Err(CrawlError::Config(
        "live catalogs require the `odbc` feature; use --catalog-file or rebuild with --features odbc"
            .to_string(),
    ))
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
