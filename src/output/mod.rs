/// Writes captured definitions, the summary, the tree, and the JSON result to disk.
pub mod formatter;
/// Plain-text summary listing of discovered objects.
pub mod summary;
/// ASCII tree rendering of the dependency graph.
pub mod tree;
