//! Plain-text rendering of structure trees and variable summaries.

use std::fmt::Write as _;

use super::node::FileNode;
use super::stats::VariableData;

/// Render a structure tree as indented text, ncdump-style: dimensions per
/// group, attributes prefixed with `:`, one line per variable.
#[must_use]
pub fn render_tree(root: &FileNode) -> String {
    let mut out = String::new();
    push_node(&mut out, root, 0);
    out
}

fn push_node(out: &mut String, node: &FileNode, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(out, "{pad}{}", node.label());

    if !node.is_variable() && !node.dimensions.is_empty() {
        let dims = node
            .dimensions
            .iter()
            .map(|(name, len)| format!("{name}={len}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{pad}  dimensions: {dims}");
    }
    for (name, value) in &node.attributes {
        let _ = writeln!(out, "{pad}  :{name} = {value}");
    }
    for child in &node.children {
        push_node(out, child, depth + 1);
    }
}

/// One-line numeric summary of a loaded variable.
#[must_use]
pub fn render_stats(var: &VariableData) -> String {
    match var.stats {
        Some(stats) => format!(
            "{}: min {} max {} mean {} std {} valid {}/{}",
            var.name,
            format_value(stats.min),
            format_value(stats.max),
            format_value(stats.mean),
            format_value(stats.std),
            stats.valid,
            var.total(),
        ),
        None => format!("{}: no finite values ({} elements)", var.name, var.total()),
    }
}

/// Format a statistic with precision scaled to its magnitude.
#[must_use]
pub fn format_value(val: f64) -> String {
    if val.is_nan() {
        return "NaN".to_string();
    }
    if val.is_infinite() {
        return if val > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let magnitude = val.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if !(1e-3..1e6).contains(&magnitude) {
        format!("{val:.3e}")
    } else if magnitude >= 100.0 {
        format!("{val:.2}")
    } else if magnitude >= 1.0 {
        format!("{val:.4}")
    } else {
        format!("{val:.5}")
    }
}
