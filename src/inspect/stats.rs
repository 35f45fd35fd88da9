//! Variable loading and summary statistics.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};

use super::reader::{attr_text, dtype_name};
use crate::error::{HarmattanError, Result};

/// Summary statistics over the finite values of a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarStats {
    /// Smallest finite value.
    pub min: f64,
    /// Largest finite value.
    pub max: f64,
    /// Arithmetic mean of finite values.
    pub mean: f64,
    /// Sample standard deviation (NaN with fewer than two finite values).
    pub std: f64,
    /// Count of finite values.
    pub valid: usize,
}

/// A variable's data, converted to `f64`, with metadata and statistics.
#[derive(Debug, Clone)]
pub struct VariableData {
    /// Variable name.
    pub name: String,
    /// Dimension names in layout order.
    pub dim_names: Vec<String>,
    /// Storage type as stored in the file.
    pub dtype: String,
    /// Attributes, stringified.
    pub attributes: BTreeMap<String, String>,
    /// The data, CF `scale_factor`/`add_offset` applied.
    pub data: ArrayD<f64>,
    /// Statistics over finite values; `None` when no value is finite.
    pub stats: Option<VarStats>,
}

impl VariableData {
    /// Total number of elements, valid or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.data.len()
    }
}

/// Load one variable from a NetCDF file by its slash-separated path.
///
/// # Errors
///
/// Fails when the file or variable cannot be found, or the variable holds
/// non-numeric (char/string) data.
pub fn read_variable(file_path: &Path, var_path: &str) -> Result<VariableData> {
    let file = netcdf::open(file_path)?;

    let netcdf_path = var_path.trim_start_matches('/');
    let var = file.variable(netcdf_path).ok_or_else(|| {
        HarmattanError::NetCDF(format!("variable `{netcdf_path}` not found"))
    })?;

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    let dtype = dtype_name(&var.vartype());

    let mut attributes = BTreeMap::new();
    for attr in var.attributes() {
        attributes.insert(attr.name().to_string(), attr_text(&attr));
    }

    let mut data = load_array(&var, &shape)?;

    // CF packing, applied before statistics.
    let scale = attributes
        .get("scale_factor")
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0);
    let offset = attributes
        .get("add_offset")
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    if scale != 1.0 || offset != 0.0 {
        data.mapv_inplace(|v| v * scale + offset);
    }

    let stats = compute_stats(&data);

    Ok(VariableData {
        name: var.name(),
        dim_names,
        dtype,
        attributes,
        data,
        stats,
    })
}

fn load_array(var: &netcdf::Variable<'_>, shape: &[usize]) -> Result<ArrayD<f64>> {
    fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
        values.into_iter().map(Into::into).collect()
    }

    let vartype = var.vartype();
    let values: Vec<f64> = match &vartype {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U8) => widen(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::U16) => widen(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::U32) => widen(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I64) => var
            .get_values::<i64, _>(..)?
            .into_iter()
            .map(|x| x as f64)
            .collect(),
        NcVariableType::Int(IntType::U64) => var
            .get_values::<u64, _>(..)?
            .into_iter()
            .map(|x| x as f64)
            .collect(),
        NcVariableType::Char | NcVariableType::String => {
            return Err(HarmattanError::NetCDF(format!(
                "variable `{}` holds {} data, no numeric summary",
                var.name(),
                dtype_name(&vartype),
            )));
        }
        other => {
            return Err(HarmattanError::NetCDF(format!(
                "unsupported variable type {other:?}"
            )));
        }
    };

    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|e| HarmattanError::NetCDF(format!("shape mismatch reading variable: {e}")))
}

fn compute_stats(data: &ArrayD<f64>) -> Option<VarStats> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut valid = 0usize;
    for &v in data.iter() {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            valid += 1;
        }
    }
    if valid == 0 {
        return None;
    }
    let mean = sum / valid as f64;

    let std = if valid > 1 {
        let mut ssd = 0.0;
        for &v in data.iter() {
            if v.is_finite() {
                let d = v - mean;
                ssd += d * d;
            }
        }
        (ssd / (valid - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(VarStats {
        min,
        max,
        mean,
        std,
        valid,
    })
}
