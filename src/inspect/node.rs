//! Structure-tree node types.

use std::collections::BTreeMap;

/// Kind of node in a NetCDF file hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The file itself.
    Root,
    /// A named group.
    Group,
    /// A variable.
    Variable,
}

/// One node of a file's structure tree.
///
/// Attributes and dimensions use ordered maps/lists so rendered output is
/// deterministic.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Node name (file name for the root).
    pub name: String,
    /// Slash-separated path from the root.
    pub path: String,
    /// What this node is.
    pub kind: NodeKind,
    /// NetCDF attributes, stringified.
    pub attributes: BTreeMap<String, String>,
    /// For groups: declared dimensions. For variables: the dimensions the
    /// variable is laid out along. Pairs of name and length.
    pub dimensions: Vec<(String, usize)>,
    /// Storage type, for variables.
    pub dtype: Option<String>,
    /// Child nodes (groups and variables).
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// Create an empty node.
    #[must_use]
    pub fn new(name: String, path: String, kind: NodeKind) -> Self {
        Self {
            name,
            path,
            kind,
            attributes: BTreeMap::new(),
            dimensions: Vec::new(),
            dtype: None,
            children: Vec::new(),
        }
    }

    /// Is this node a variable?
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.kind == NodeKind::Variable
    }

    /// Attach a child node.
    pub fn add_child(&mut self, child: FileNode) {
        self.children.push(child);
    }

    /// One-line label for the node.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            NodeKind::Variable => {
                let dims = self
                    .dimensions
                    .iter()
                    .map(|(name, len)| format!("{name}={len}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let dtype = self.dtype.as_deref().unwrap_or("?");
                format!("{}({dims}) {dtype}", self.name)
            }
            NodeKind::Group => format!("{}/", self.name),
            NodeKind::Root => self.name.clone(),
        }
    }

    /// Paths of every variable in this subtree, depth first.
    #[must_use]
    pub fn variable_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_variable_paths(&mut paths);
        paths
    }

    fn collect_variable_paths(&self, paths: &mut Vec<String>) {
        if self.is_variable() {
            paths.push(self.path.clone());
        }
        for child in &self.children {
            child.collect_variable_paths(paths);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_label_includes_dims_and_type() {
        let mut node = FileNode::new(
            "wind_speed".to_string(),
            "/wind_speed".to_string(),
            NodeKind::Variable,
        );
        node.dimensions.push(("time".to_string(), 3));
        node.dtype = Some("float32".to_string());
        assert_eq!(node.label(), "wind_speed(time=3) float32");
    }

    #[test]
    fn variable_paths_walk_nested_groups() {
        let mut root = FileNode::new("f.nc".to_string(), "/".to_string(), NodeKind::Root);
        let mut group = FileNode::new("obs".to_string(), "/obs".to_string(), NodeKind::Group);
        group.add_child(FileNode::new(
            "t".to_string(),
            "/obs/t".to_string(),
            NodeKind::Variable,
        ));
        root.add_child(group);
        root.add_child(FileNode::new(
            "time".to_string(),
            "/time".to_string(),
            NodeKind::Variable,
        ));
        assert_eq!(root.variable_paths(), vec!["/obs/t", "/time"]);
    }
}
