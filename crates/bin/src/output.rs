//! Output formatting for human-readable and JSON output.

use arbor::Node;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

pub const NODE_HEADERS: [&str; 5] = ["ID", "TREE", "LEFT", "RIGHT", "NAME"];

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// One table row per node, matching [`NODE_HEADERS`].
pub fn node_row(node: &Node) -> Vec<String> {
    let bounds = node.bounds();
    vec![
        or_dash(node.id()),
        or_dash(node.tree_id()),
        or_dash(bounds.map(|b| b.left)),
        or_dash(bounds.map(|b| b.right)),
        node.name().to_string(),
    ]
}

/// A node and whatever of its hierarchy is loaded.
pub fn node_json(node: &Node) -> serde_json::Value {
    let bounds = node.bounds();
    let mut value = serde_json::json!({
        "id": node.id().map(|id| id.get()),
        "tree_id": node.tree_id().map(|t| t.get()),
        "left": bounds.map(|b| b.left),
        "right": bounds.map(|b| b.right),
        "name": node.name(),
        "data": node.data(),
    });
    if !node.children().is_unloaded() {
        value["children"] = node.children().as_slice().iter().map(node_json).collect();
    }
    value
}

/// Print a table with aligned columns.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    println!("{}", render_line(headers.iter().copied(), &widths));
    for row in rows {
        println!("{}", render_line(row.iter().map(String::as_str), &widths));
    }
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    line.join("  ").trim_end().to_string()
}

/// Render a loaded hierarchy as an indented outline.
pub fn outline(node: &Node) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack = vec![(node, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let truncated =
            node.children().is_unloaded() && node.bounds().is_some_and(|b| !b.is_leaf());
        let marker = if truncated {
            " ..."
        } else {
            ""
        };
        lines.push(format!(
            "{}{} [{}]{marker}",
            "  ".repeat(depth),
            node.name(),
            or_dash(node.id())
        ));
        for child in node.children().as_slice().iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    lines
}
