use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::crawler::CrawlResult;
use crate::output::{summary, tree};
use crate::parser::names::sanitize_filename;

/// Summary listing file name.
pub const SUMMARY_FILE: &str = "summary.txt";
/// Rendered tree file name.
pub const TREE_FILE: &str = "tree.txt";
/// Machine-readable crawl result file name.
pub const DEPENDENCIES_FILE: &str = "dependencies.json";

/// Write all artifacts for `result` under `<output_dir>/<root>/`.
///
/// Returns the directory the artifacts were written to.
pub fn write_output(output_dir: &Path, result: &CrawlResult) -> Result<PathBuf, String> {
    let name = result.root.to_string();
    validate_output_name(&name)?;

    let dir = output_dir.join(&name);
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create output directory: {e}"))?;

    // One .sql file per captured view definition
    for definition in &result.view_definitions {
        let file_name = format!("{}.sql", sanitize_filename(&definition.object.to_string()));
        write_file(&dir.join(file_name), &definition.text)?;
    }

    write_file(&dir.join(SUMMARY_FILE), &summary::build_summary(result))?;
    write_file(
        &dir.join(TREE_FILE),
        &tree::render_tree(&result.root, &result.graph),
    )?;

    let json = serde_json::to_string_pretty(result)
        .map_err(|e| format!("Failed to serialize crawl result: {e}"))?;
    write_file(&dir.join(DEPENDENCIES_FILE), &json)?;

    info!("Dependency crawl complete. Output in: {}", dir.display());
    Ok(dir)
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn validate_output_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Output name must not be empty".to_string());
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(format!(
            "Invalid output name '{name}': absolute paths are not allowed"
        ));
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(format!(
            "Invalid output name '{name}': traversal segments are not allowed"
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!(
            "Invalid output name '{name}': path separators are not allowed"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CrawlResult, DependencyGraph, ViewDefinition};
    use crate::parser::names::ObjectRef;
    use std::collections::BTreeMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}"))
    }

    fn single_view_result(root: ObjectRef) -> CrawlResult {
        let table = ObjectRef::new("SALES", "ORDERS");
        let mut graph = DependencyGraph::new();
        graph.push_edge(&root, table.clone());
        CrawlResult {
            root: root.clone(),
            visit_order: vec![root.clone(), table.clone()],
            tables: vec![table],
            views: vec![root.clone()],
            functions: BTreeMap::new(),
            view_definitions: vec![ViewDefinition {
                object: root,
                text: "SELECT * FROM orders".to_string(),
            }],
            unparsed_views: Vec::new(),
            graph,
        }
    }

    #[test]
    fn write_output_reports_directory_creation_errors() {
        let path = unique_path("oracrawl_formatter_file");
        std::fs::write(&path, "not a directory").expect("should create marker file");

        let err = write_output(&path, &single_view_result(ObjectRef::new("S", "V")))
            .expect_err("directory creation should fail");
        assert!(err.contains("Failed to create output directory"));
    }

    #[test]
    fn write_output_rejects_unsafe_root_names() {
        let dir = unique_path("oracrawl_formatter_dir");
        let err = write_output(&dir, &single_view_result(ObjectRef::new("S", "\"A/B\"")))
            .expect_err("separator in root name should fail validation");
        assert!(err.contains("Invalid output name"));
    }

    #[test]
    fn validate_output_name_rejects_traversal() {
        assert!(validate_output_name("..").is_err());
        assert!(validate_output_name("  ").is_err());
        assert!(validate_output_name("SALES.V_ORDERS").is_ok());
    }

    #[test]
    fn write_output_writes_all_artifacts_on_success() {
        let dir = unique_path("oracrawl_formatter_ok");
        let root = ObjectRef::new("SALES", "V$ORDERS");

        let written = write_output(&dir, &single_view_result(root)).expect("should succeed");
        assert_eq!(written, dir.join("SALES.V$ORDERS"));

        let ddl = std::fs::read_to_string(written.join("SALES__V_ORDERS.sql"))
            .expect("ddl file should exist");
        let tree = std::fs::read_to_string(written.join(TREE_FILE)).expect("tree should exist");
        let summary =
            std::fs::read_to_string(written.join(SUMMARY_FILE)).expect("summary should exist");
        let json = std::fs::read_to_string(written.join(DEPENDENCIES_FILE))
            .expect("dependencies should exist");

        assert_eq!(ddl, "SELECT * FROM orders");
        assert_eq!(tree, "└── SALES.V$ORDERS\n    └── SALES.ORDERS");
        assert!(summary.contains(" - SALES.V$ORDERS\n"));
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["root"], "SALES.V$ORDERS");
        assert_eq!(parsed["graph"]["SALES.V$ORDERS"][0], "SALES.ORDERS");
    }
}
