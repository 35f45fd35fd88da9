//! NCAS/AMF variable-table handling.
//!
//! The AMF data project publishes per-product variable lists as CSV exports
//! with `Variable,Attribute,Value` columns: a row with a non-empty `Variable`
//! cell opens a block for that variable (the opening row's own
//! attribute/value cells are ignored), and subsequent rows attach attributes
//! to the open block. The mean-winds defaults are embedded so no external
//! file is needed; a user-supplied CSV in the same layout substitutes for
//! them wholesale.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::{HarmattanError, Result};

/// The four variables written to every output file, keyed by their AMF
/// table entry.
pub const CANONICAL_VARS: [&str; 4] = [
    "wind_speed",
    "wind_from_direction",
    "eastward_wind",
    "northward_wind",
];

/// NetCDF storage type named by a variable table's `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// 32-bit float (`float32`, `f4`, `float`).
    F32,
    /// 64-bit float (`float64`, `f8`, `double`).
    F64,
    /// 32-bit signed integer (`int32`, `i4`, `int`).
    I32,
}

impl VarType {
    /// Parse a table `type` cell, accepting the NumPy-style aliases the AMF
    /// sheets use.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "float32" | "f4" | "float" => Some(Self::F32),
            "float64" | "f8" | "double" => Some(Self::F64),
            "int32" | "i4" | "int" => Some(Self::I32),
            _ => None,
        }
    }

    /// Canonical name for the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::I32 => "int32",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-resolved output variable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSpec {
    /// NetCDF variable name (the table's `name` attribute).
    pub name: String,
    /// Storage type.
    pub data_type: VarType,
    /// Dimension the variable is laid out along.
    pub dimension: String,
    /// CF `long_name` attribute.
    pub long_name: String,
    /// CF `units` attribute.
    pub units: String,
    /// CF `standard_name` attribute.
    pub standard_name: String,
}

/// Variable metadata table: block name to attribute map.
///
/// Blocks are kept raw and validated only when resolved, so a full AMF sheet
/// with entries this tool never writes is fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTable {
    blocks: BTreeMap<String, BTreeMap<String, String>>,
}

impl VariableTable {
    /// The embedded AMF mean-winds defaults.
    #[must_use]
    pub fn builtin() -> Self {
        let mut blocks = BTreeMap::new();
        let defaults: [(&str, &str, &str); 4] = [
            ("wind_speed", "Mean Wind Speed", "m s-1"),
            ("wind_from_direction", "Wind From Direction", "degree"),
            (
                "eastward_wind",
                "Eastward Wind Component in Earth Coordinates",
                "m s-1",
            ),
            (
                "northward_wind",
                "Northward Wind Component in Earth Coordinates",
                "m s-1",
            ),
        ];
        for (key, long_name, units) in defaults {
            let mut attrs = BTreeMap::new();
            attrs.insert("name".to_string(), key.to_string());
            attrs.insert("type".to_string(), "float32".to_string());
            attrs.insert("dimension".to_string(), "time".to_string());
            attrs.insert("long_name".to_string(), long_name.to_string());
            attrs.insert("units".to_string(), units.to_string());
            attrs.insert("standard_name".to_string(), key.to_string());
            blocks.insert(key.to_string(), attrs);
        }
        Self { blocks }
    }

    /// Load a table from an AMF-format CSV file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, lacks the expected columns, or
    /// attaches an attribute before any variable block was opened.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| HarmattanError::file_open(path.to_path_buf(), e))?;
        Self::from_reader(file)
    }

    /// Load a table from AMF-format CSV bytes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`VariableTable::from_csv`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers = csv.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                HarmattanError::variable_table(format!("CSV has no `{name}` column"))
            })
        };
        let var_idx = column("Variable")?;
        let attr_idx = column("Attribute")?;
        let value_idx = column("Value")?;

        let mut blocks: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;
        for (row_no, row) in csv.records().enumerate() {
            let row = row?;
            let variable = row.get(var_idx).unwrap_or("").trim();
            if !variable.is_empty() {
                blocks.entry(variable.to_string()).or_default();
                current = Some(variable.to_string());
                continue;
            }
            let attribute = row.get(attr_idx).unwrap_or("").trim();
            if attribute.is_empty() {
                continue;
            }
            let value = row.get(value_idx).unwrap_or("").trim();
            let Some(ref open) = current else {
                return Err(HarmattanError::variable_table(format!(
                    "row {}: attribute `{attribute}` appears before any variable block",
                    row_no + 2
                )));
            };
            if let Some(block) = blocks.get_mut(open) {
                block.insert(attribute.to_string(), value.to_string());
            }
        }
        Ok(Self { blocks })
    }

    /// Does the table contain a block for this variable?
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.blocks.contains_key(key)
    }

    /// Resolve and validate the spec for one variable.
    ///
    /// # Errors
    ///
    /// Fails when the block is missing, lacks a required attribute, or names
    /// an unknown storage type.
    pub fn spec(&self, key: &str) -> Result<VariableSpec> {
        let block = self
            .blocks
            .get(key)
            .ok_or_else(|| HarmattanError::variable_spec(key, "no entry in variable table"))?;
        let required = |attr: &str| -> Result<&str> {
            block.get(attr).map(String::as_str).ok_or_else(|| {
                HarmattanError::variable_spec(key, format!("missing required attribute `{attr}`"))
            })
        };

        let type_text = required("type")?;
        let data_type = VarType::parse(type_text).ok_or_else(|| {
            HarmattanError::variable_spec(key, format!("unknown storage type `{type_text}`"))
        })?;

        Ok(VariableSpec {
            name: required("name")?.to_string(),
            data_type,
            dimension: required("dimension")?.to_string(),
            long_name: required("long_name")?.to_string(),
            units: required("units")?.to_string(),
            standard_name: required("standard_name")?.to_string(),
        })
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_all_canonical_variables() {
        let table = VariableTable::builtin();
        for key in CANONICAL_VARS {
            let spec = table.spec(key).unwrap();
            assert_eq!(spec.name, key);
            assert_eq!(spec.data_type, VarType::F32);
            assert_eq!(spec.dimension, "time");
            assert!(!spec.long_name.is_empty());
        }
        assert_eq!(
            table.spec("wind_from_direction").unwrap().units,
            "degree"
        );
    }

    #[test]
    fn csv_blocks_open_on_variable_cell() {
        let csv = "\
Variable,Attribute,Value
wind_speed,ignored,also ignored
,name,wind_speed
,type,float32
,dimension,time
,long_name,Mean Wind Speed
,units,m s-1
,standard_name,wind_speed
";
        let table = VariableTable::from_reader(csv.as_bytes()).unwrap();
        let spec = table.spec("wind_speed").unwrap();
        assert_eq!(spec.long_name, "Mean Wind Speed");
        // The block-opening row's own attribute cells do not become attributes.
        assert_eq!(spec.units, "m s-1");
    }

    #[test]
    fn csv_attribute_before_block_is_an_error() {
        let csv = "\
Variable,Attribute,Value
,name,orphan
";
        let err = VariableTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("before any variable block"));
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let csv = "Variable,Value\nwind_speed,x\n";
        let err = VariableTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("`Attribute`"));
    }

    #[test]
    fn missing_required_attribute_reported_by_name() {
        let csv = "\
Variable,Attribute,Value
wind_speed,,
,name,wind_speed
,type,float32
,dimension,time
,units,m s-1
,standard_name,wind_speed
";
        let table = VariableTable::from_reader(csv.as_bytes()).unwrap();
        let err = table.spec("wind_speed").unwrap_err();
        assert!(err.to_string().contains("`long_name`"));
    }

    #[test]
    fn unknown_storage_type_rejected() {
        let csv = "\
Variable,Attribute,Value
wind_speed,,
,name,wind_speed
,type,complex128
,dimension,time
,long_name,Mean Wind Speed
,units,m s-1
,standard_name,wind_speed
";
        let table = VariableTable::from_reader(csv.as_bytes()).unwrap();
        let err = table.spec("wind_speed").unwrap_err();
        assert!(err.to_string().contains("complex128"));
    }

    #[test]
    fn missing_block_reported() {
        let table = VariableTable::from_reader("Variable,Attribute,Value\n".as_bytes()).unwrap();
        let err = table.spec("wind_speed").unwrap_err();
        assert!(err.to_string().contains("wind_speed"));
    }

    #[test]
    fn type_aliases_parse() {
        assert_eq!(VarType::parse("Float32"), Some(VarType::F32));
        assert_eq!(VarType::parse("f8"), Some(VarType::F64));
        assert_eq!(VarType::parse("int"), Some(VarType::I32));
        assert_eq!(VarType::parse("string"), None);
        assert_eq!(VarType::F64.to_string(), "float64");
    }

    #[test]
    fn extra_unresolved_blocks_are_tolerated() {
        // A full AMF sheet carries many variables this tool never writes;
        // incomplete blocks only matter if resolved.
        let csv = "\
Variable,Attribute,Value
air_temperature,,
,name,air_temperature
wind_speed,,
,name,wind_speed
,type,float32
,dimension,time
,long_name,Mean Wind Speed
,units,m s-1
,standard_name,wind_speed
";
        let table = VariableTable::from_reader(csv.as_bytes()).unwrap();
        assert!(table.contains("air_temperature"));
        assert!(table.spec("wind_speed").is_ok());
        assert!(table.spec("air_temperature").is_err());
    }
}
