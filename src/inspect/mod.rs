//! Headless inspection of NetCDF files.
//!
//! Reads a file's structure (groups, variables, dimensions, attributes) into
//! a tree, optionally loads per-variable data for summary statistics, and
//! renders both as plain text.

mod node;
mod reader;
mod render;
mod stats;

pub use node::{FileNode, NodeKind};
pub use reader::read_structure;
pub use render::{format_value, render_stats, render_tree};
pub use stats::{read_variable, VarStats, VariableData};
