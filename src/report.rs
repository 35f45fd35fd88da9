//! Tower status report: latest bin-averaged readings per sensor unit.
//!
//! Each unit on the sampling tower logs a 2D sonic TSV and an RHT
//! (temperature/relative-humidity) CSV under `<data_dir>/<unit>w/data/`. The
//! report finds the newest file of each kind, averages the final time bin,
//! and summarises wind and air readings per unit. Wind comes from the
//! newest sonic day-file (lexicographically greatest name); air readings come
//! from the newest RHT file by modification time and are optional.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{HarmattanError, Result};
use crate::gill::{self, parse_timestamp, ScanOutcome};
use crate::series::{self, SonicSeries};
use crate::wind;

/// Latest readings for one tower unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitSummary {
    /// Unit number, e.g. `000`.
    pub unit: String,
    /// Start of the averaged wind bin.
    pub time: NaiveDateTime,
    /// Eastward wind in m s-1.
    pub u: f64,
    /// Northward wind in m s-1.
    pub v: f64,
    /// Wind speed in m s-1.
    pub wind_speed: f64,
    /// Wind-from direction in degrees.
    pub wind_direction: f64,
    /// Air temperature in degrees C, when an RHT file was found.
    pub temperature: Option<f64>,
    /// Relative humidity in percent, when an RHT file was found.
    pub humidity: Option<f64>,
}

/// Report entry for one unit: a summary or the reason there is none.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    /// Unit number.
    pub unit: String,
    /// The readings, when the unit's data could be processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<UnitSummary>,
    /// The failure, otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summarise every unit, capturing per-unit failures instead of aborting the
/// whole report.
#[must_use]
pub fn report(data_dir: &Path, units: &[String], bin_seconds: u64) -> Vec<UnitReport> {
    units
        .iter()
        .map(|unit| match unit_summary(data_dir, unit, bin_seconds) {
            Ok(summary) => UnitReport {
                unit: unit.clone(),
                summary: Some(summary),
                error: None,
            },
            Err(e) => UnitReport {
                unit: unit.clone(),
                summary: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

/// Latest readings for a single unit.
///
/// # Errors
///
/// Fails when no sonic file exists for the unit or its newest file yields no
/// usable records. A missing RHT file is not an error; the air fields are
/// left empty.
pub fn unit_summary(data_dir: &Path, unit: &str, bin_seconds: u64) -> Result<UnitSummary> {
    let unit_dir = data_dir.join(format!("{unit}w")).join("data");

    let sonic_path = newest_by_name(&unit_dir, &format!("2D-sonic-{unit}-"), ".tsv")
        .ok_or_else(|| HarmattanError::NoUnitData {
            kind: "sonic",
            unit: unit.to_string(),
            dir: unit_dir.clone(),
        })?;
    debug!(unit, path = %sonic_path.display(), "newest sonic file");

    let mut outcome = ScanOutcome::default();
    gill::scan_path(&sonic_path, &mut outcome)?;
    if outcome.records.is_empty() {
        return Err(HarmattanError::EmptyInput {
            rejected: outcome.stats.rejected(),
        });
    }

    let binned = SonicSeries::from_records(&outcome.records).resample_mean(bin_seconds);
    let last = binned.len() - 1;
    let (u, v) = (binned.u()[last], binned.v()[last]);
    let (wind_speed, wind_direction) = wind::polar(u, v);

    let (temperature, humidity) =
        match newest_by_mtime(&unit_dir, &format!("RHT_{unit}_"), ".txt") {
            Some(rht_path) => {
                debug!(unit, path = %rht_path.display(), "newest RHT file");
                last_rht_bin(&rht_path, bin_seconds)?
            }
            None => {
                warn!(unit, dir = %unit_dir.display(), "no RHT file, air readings omitted");
                (None, None)
            }
        };

    Ok(UnitSummary {
        unit: unit.to_string(),
        time: binned.times()[last],
        u,
        v,
        wind_speed,
        wind_direction,
        temperature,
        humidity,
    })
}

/// Render unit reports as an aligned text table.
#[must_use]
pub fn render_plain(reports: &[UnitReport]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<5} {:<19} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
        "unit", "time", "ws", "wd", "u", "v", "temp", "rh"
    ));
    for entry in reports {
        match &entry.summary {
            Some(s) => {
                out.push_str(&format!(
                    "{:<5} {:<19} {:>6.1} {:>6.1} {:>6.1} {:>6.1} {:>6} {:>6}\n",
                    s.unit,
                    s.time.format("%Y-%m-%dT%H:%M:%S"),
                    s.wind_speed,
                    s.wind_direction,
                    s.u,
                    s.v,
                    optional_value(s.temperature),
                    optional_value(s.humidity),
                ));
            }
            None => {
                let reason = entry.error.as_deref().unwrap_or("unknown failure");
                out.push_str(&format!("{:<5} {reason}\n", entry.unit));
            }
        }
    }
    out
}

fn optional_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => "-".to_string(),
    }
}

/// Newest matching file by name order (day files sort lexicographically).
fn newest_by_name(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    matching_files(dir, prefix, suffix)
        .into_iter()
        .max_by(|a, b| a.file_name().cmp(&b.file_name()))
}

/// Newest matching file by modification time.
fn newest_by_mtime(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    matching_files(dir, prefix, suffix)
        .into_iter()
        .filter_map(|p| {
            let mtime = std::fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((mtime, p))
        })
        .max_by_key(|(mtime, _)| *mtime)
        .map(|(_, p)| p)
}

fn matching_files(dir: &Path, prefix: &str, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name();
            let name = name.to_str()?;
            (name.starts_with(prefix) && name.ends_with(suffix))
                .then(|| entry.path())
        })
        .collect()
}

/// Mean temperature and humidity over the newest bin of an RHT file.
///
/// RHT rows are `DateTime,<ignored>,TempSH,RH`. Rows with unparseable
/// timestamps are skipped; unparseable readings become NaN and are excluded
/// from the mean.
fn last_rht_bin(path: &Path, bin_seconds: u64) -> Result<(Option<f64>, Option<f64>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut times: Vec<NaiveDateTime> = Vec::new();
    let mut temps: Vec<f64> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();
    for row in reader.records() {
        let row = row?;
        let Some(stamp) = row.get(0).and_then(parse_timestamp) else {
            continue;
        };
        times.push(stamp);
        temps.push(field_value(&row, 2));
        rhs.push(field_value(&row, 3));
    }

    let Some(&latest) = times.iter().max() else {
        return Ok((None, None));
    };
    let bin = bin_seconds.max(1) as i64;
    let last_start = series::bin_start(latest, bin);

    let mut bin_temps = Vec::new();
    let mut bin_rhs = Vec::new();
    for (i, &t) in times.iter().enumerate() {
        if series::bin_start(t, bin) == last_start {
            bin_temps.push(temps[i]);
            bin_rhs.push(rhs[i]);
        }
    }
    Ok((
        Some(wind::finite_mean(&bin_temps)),
        Some(wind::finite_mean(&bin_rhs)),
    ))
}

fn field_value(row: &csv::StringRecord, index: usize) -> f64 {
    row.get(index)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(f64::NAN)
}
