//! Raw-file scanning: walk input files line by line, apply quality control
//! and collect accepted records.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::line::{parse_logger_line, parse_tower_line};
use super::record::{RejectReason, ScanStats, SonicRecord};
use crate::error::{HarmattanError, Result};

/// On-disk layout of a raw sonic file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// Serial-logger CSV lines with embedded STX/ETX telegram.
    Logger,
    /// Tab-separated tower rows (`2D-sonic-*.tsv`).
    Tower,
}

impl RawFormat {
    /// Pick the format from the file extension. `.tsv` files are tower rows;
    /// everything else is treated as logger output.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match extension {
            ext if ext.eq_ignore_ascii_case("tsv") => Self::Tower,
            _ => Self::Logger,
        }
    }
}

/// Everything a scan produces: the accepted records, in input order, plus the
/// quality-control tallies.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Accepted readings in the order they were encountered.
    pub records: Vec<SonicRecord>,
    /// Line-level accounting.
    pub stats: ScanStats,
}

/// Scan a list of raw files in order.
///
/// # Errors
///
/// Fails if any file cannot be opened or read; quality-control rejections are
/// tallied in the outcome, not raised.
pub fn scan_files(paths: &[PathBuf]) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome::default();
    for path in paths {
        scan_path(path, &mut outcome)?;
    }
    Ok(outcome)
}

/// Scan one raw file into an existing outcome.
///
/// # Errors
///
/// Fails if the file cannot be opened or read.
pub fn scan_path(path: &Path, outcome: &mut ScanOutcome) -> Result<()> {
    let format = RawFormat::for_path(path);
    let file = File::open(path).map_err(|e| HarmattanError::file_open(path.to_path_buf(), e))?;
    let before = outcome.stats.accepted;

    outcome.stats.files += 1;
    scan_reader(file, format, outcome)?;

    debug!(
        path = %path.display(),
        ?format,
        accepted = outcome.stats.accepted - before,
        "scanned raw file"
    );
    Ok(())
}

/// Scan raw bytes from any reader.
///
/// Lines are read as bytes so that serial corruption (non-UTF-8 noise) is
/// counted instead of aborting the scan.
///
/// # Errors
///
/// Fails only on I/O errors from the underlying reader.
pub fn scan_reader<R: Read>(
    reader: R,
    format: RawFormat,
    outcome: &mut ScanOutcome,
) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf: Vec<u8> = Vec::with_capacity(96);

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        match format {
            RawFormat::Logger => match parse_logger_line(&buf) {
                Ok(record) => {
                    outcome.stats.accept();
                    outcome.records.push(record);
                }
                Err(reason) => outcome.stats.reject(reason),
            },
            RawFormat::Tower => scan_tower_line(&buf, outcome),
        }
    }
    Ok(())
}

fn scan_tower_line(raw: &[u8], outcome: &mut ScanOutcome) {
    let Ok(text) = std::str::from_utf8(raw) else {
        outcome.stats.reject(RejectReason::ForeignChars);
        return;
    };
    let trimmed = text.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return;
    }
    match parse_tower_line(trimmed) {
        Ok(record) => {
            outcome.stats.accept();
            outcome.records.push(record);
        }
        Err(reason) => outcome.stats.reject(reason),
    }
}
