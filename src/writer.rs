//! CF-1.6 NetCDF output.
//!
//! The produced file has a single unlimited `time` dimension, a `time`
//! coordinate variable holding seconds since the first sample, the four
//! canonical wind variables described by the AMF table, and the usual global
//! attributes (`Conventions`, `institution`, `title`, `history`).

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::amf::{VarType, VariableSpec, VariableTable, CANONICAL_VARS};
use crate::error::{HarmattanError, Result};
use crate::series::SonicSeries;

/// Name of the record dimension and its coordinate variable.
pub const TIME_DIM: &str = "time";

/// Global attributes stamped onto every output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetAttrs {
    /// `title` global attribute.
    pub title: String,
    /// `institution` global attribute.
    pub institution: String,
    /// Optional `source` global attribute.
    pub source: Option<String>,
    /// Optional `comment` global attribute.
    pub comment: Option<String>,
}

impl Default for DatasetAttrs {
    fn default() -> Self {
        Self {
            title: "2D Sonic NetCDF file".to_string(),
            institution: "NCAS".to_string(),
            source: None,
            comment: None,
        }
    }
}

/// Write a wind series to a NetCDF file.
///
/// All four canonical variable specs are resolved and validated before the
/// output file is created, so a bad table never leaves a truncated file
/// behind.
///
/// # Errors
///
/// Fails on an empty series, an unusable variable table, or any NetCDF
/// library error.
pub fn write_netcdf(
    series: &SonicSeries,
    table: &VariableTable,
    attrs: &DatasetAttrs,
    path: &Path,
) -> Result<()> {
    let (base, offsets) = series
        .time_offsets()
        .ok_or(HarmattanError::EmptyInput { rejected: 0 })?;

    let mut specs: Vec<VariableSpec> = Vec::with_capacity(CANONICAL_VARS.len());
    for key in CANONICAL_VARS {
        let spec = table.spec(key)?;
        if spec.dimension != TIME_DIM {
            return Err(HarmattanError::variable_spec(
                key,
                format!("dimension `{}` is not `{TIME_DIM}`", spec.dimension),
            ));
        }
        specs.push(spec);
    }

    let n = series.len();
    let mut file = netcdf::create(path)?;
    file.add_unlimited_dimension(TIME_DIM)?;

    let time_units = format!("seconds since {}", base.format("%Y-%m-%d %H:%M:%S"));
    let mut time_var = file.add_variable::<f64>(TIME_DIM, &[TIME_DIM])?;
    time_var.put_attribute("units", time_units.as_str())?;
    time_var.put_attribute("standard_name", "time")?;
    time_var.put_attribute("calendar", "standard")?;
    time_var.put_values(&offsets, (0..n,))?;

    let speeds = series.speeds();
    let directions = series.directions();
    let columns: [&[f64]; 4] = [&speeds, &directions, series.u(), series.v()];
    for (spec, values) in specs.iter().zip(columns) {
        let mut var = match spec.data_type {
            VarType::F32 => file.add_variable::<f32>(&spec.name, &[TIME_DIM])?,
            VarType::F64 => file.add_variable::<f64>(&spec.name, &[TIME_DIM])?,
            VarType::I32 => file.add_variable::<i32>(&spec.name, &[TIME_DIM])?,
        };
        var.put_attribute("long_name", spec.long_name.as_str())?;
        var.put_attribute("units", spec.units.as_str())?;
        var.put_attribute("standard_name", spec.standard_name.as_str())?;
        match spec.data_type {
            VarType::F32 => {
                let cast: Vec<f32> = values.iter().map(|&v| v as f32).collect();
                var.put_values(&cast, (0..n,))?;
            }
            VarType::F64 => var.put_values(values, (0..n,))?,
            VarType::I32 => {
                let cast: Vec<i32> = values.iter().map(|&v| v as i32).collect();
                var.put_values(&cast, (0..n,))?;
            }
        }
    }

    file.add_attribute("Conventions", "CF-1.6")?;
    file.add_attribute("institution", attrs.institution.as_str())?;
    file.add_attribute("title", attrs.title.as_str())?;
    let history = format!(
        "{}: written by harmattan v{}",
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        env!("CARGO_PKG_VERSION")
    );
    file.add_attribute("history", history.as_str())?;
    if let Some(ref source) = attrs.source {
        file.add_attribute("source", source.as_str())?;
    }
    if let Some(ref comment) = attrs.comment {
        file.add_attribute("comment", comment.as_str())?;
    }

    info!(path = %path.display(), samples = n, "wrote NetCDF output");
    Ok(())
}
