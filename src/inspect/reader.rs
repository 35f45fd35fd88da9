//! NetCDF structure reader.

use std::path::Path;

use netcdf::types::{FloatType, IntType, NcVariableType};

use super::node::{FileNode, NodeKind};
use crate::error::Result;

/// Read the structure of a NetCDF file (groups, variables, dimensions,
/// attributes) without loading any data.
///
/// # Errors
///
/// Fails when the file cannot be opened as NetCDF.
pub fn read_structure(path: &Path) -> Result<FileNode> {
    let file = netcdf::open(path)?;

    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut root = FileNode::new(name, "/".to_string(), NodeKind::Root);

    for attr in file.attributes() {
        root.attributes
            .insert(attr.name().to_string(), attr_text(&attr));
    }
    for dim in file.dimensions() {
        root.dimensions.push((dim.name(), dim.len()));
    }
    for var in file.variables() {
        root.add_child(variable_node(&var, ""));
    }
    if let Ok(groups) = file.groups() {
        for group in groups {
            root.add_child(group_node(&group, ""));
        }
    }
    Ok(root)
}

fn group_node(group: &netcdf::Group<'_>, parent_path: &str) -> FileNode {
    let path = format!("{parent_path}/{}", group.name());
    let mut node = FileNode::new(group.name().to_string(), path.clone(), NodeKind::Group);

    for attr in group.attributes() {
        node.attributes
            .insert(attr.name().to_string(), attr_text(&attr));
    }
    for dim in group.dimensions() {
        node.dimensions.push((dim.name(), dim.len()));
    }
    for var in group.variables() {
        node.add_child(variable_node(&var, &path));
    }
    for child in group.groups() {
        node.add_child(group_node(&child, &path));
    }
    node
}

fn variable_node(var: &netcdf::Variable<'_>, parent_path: &str) -> FileNode {
    let path = format!("{parent_path}/{}", var.name());
    let mut node = FileNode::new(var.name().to_string(), path, NodeKind::Variable);

    for dim in var.dimensions() {
        node.dimensions.push((dim.name(), dim.len()));
    }
    node.dtype = Some(dtype_name(&var.vartype()));
    for attr in var.attributes() {
        node.attributes
            .insert(attr.name().to_string(), attr_text(&attr));
    }
    node
}

/// Friendly name for a NetCDF storage type.
#[must_use]
pub(crate) fn dtype_name(vartype: &NcVariableType) -> String {
    match vartype {
        NcVariableType::Float(FloatType::F32) => "float32".to_string(),
        NcVariableType::Float(FloatType::F64) => "float64".to_string(),
        NcVariableType::Int(IntType::I8) => "int8".to_string(),
        NcVariableType::Int(IntType::I16) => "int16".to_string(),
        NcVariableType::Int(IntType::I32) => "int32".to_string(),
        NcVariableType::Int(IntType::I64) => "int64".to_string(),
        NcVariableType::Int(IntType::U8) => "uint8".to_string(),
        NcVariableType::Int(IntType::U16) => "uint16".to_string(),
        NcVariableType::Int(IntType::U32) => "uint32".to_string(),
        NcVariableType::Int(IntType::U64) => "uint64".to_string(),
        NcVariableType::Char => "char".to_string(),
        NcVariableType::String => "string".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render an attribute's value as display text.
pub(crate) fn attr_text(attr: &netcdf::Attribute<'_>) -> String {
    use netcdf::AttributeValue as A;

    let Ok(value) = attr.value() else {
        return "<unreadable>".to_string();
    };
    match value {
        A::Str(s) => s,
        A::Strs(v) => v.join(", "),
        A::Uchar(v) => v.to_string(),
        A::Schar(v) => v.to_string(),
        A::Ushort(v) => v.to_string(),
        A::Short(v) => v.to_string(),
        A::Uint(v) => v.to_string(),
        A::Int(v) => v.to_string(),
        A::Ulonglong(v) => v.to_string(),
        A::Longlong(v) => v.to_string(),
        A::Float(v) => v.to_string(),
        A::Double(v) => v.to_string(),
        A::Uchars(v) => join(&v),
        A::Schars(v) => join(&v),
        A::Ushorts(v) => join(&v),
        A::Shorts(v) => join(&v),
        A::Uints(v) => join(&v),
        A::Ints(v) => join(&v),
        A::Ulonglongs(v) => join(&v),
        A::Longlongs(v) => join(&v),
        A::Floats(v) => join(&v),
        A::Doubles(v) => join(&v),
    }
}
