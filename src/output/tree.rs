use crate::crawler::DependencyGraph;
use crate::parser::names::ObjectRef;

/// Marker for a child that has later siblings.
pub const BRANCH: &str = "├── ";
/// Marker for the last child at a depth.
pub const CORNER: &str = "└── ";
/// Suffix for a node that is already one of its own ancestors.
pub const CYCLE_SUFFIX: &str = " (cycle)";

const PIPE_INDENT: &str = "│   ";
const BLANK_INDENT: &str = "    ";

/// Render the dependency graph below `root` as an indented ASCII tree.
///
/// The walk is depth-first and pre-order, following each view's children in
/// graph order. An object reachable along several paths appears once per
/// path. A node already on the current path is printed with
/// [`CYCLE_SUFFIX`] and not expanded again.
pub fn render_tree(root: &ObjectRef, graph: &DependencyGraph) -> String {
    let mut lines = Vec::new();
    let mut path = Vec::new();
    walk(root, graph, "", true, &mut path, &mut lines);
    lines.join("\n")
}

fn walk(
    node: &ObjectRef,
    graph: &DependencyGraph,
    prefix: &str,
    is_last: bool,
    path: &mut Vec<ObjectRef>,
    lines: &mut Vec<String>,
) {
    let marker = if is_last { CORNER } else { BRANCH };
    if path.contains(node) {
        lines.push(format!("{prefix}{marker}{node}{CYCLE_SUFFIX}"));
        return;
    }
    lines.push(format!("{prefix}{marker}{node}"));

    let children = graph.children(node);
    let child_prefix = format!(
        "{prefix}{}",
        if is_last { BLANK_INDENT } else { PIPE_INDENT }
    );

    path.push(node.clone());
    for (idx, child) in children.iter().enumerate() {
        walk(
            child,
            graph,
            &child_prefix,
            idx + 1 == children.len(),
            path,
            lines,
        );
    }
    path.pop();
}
