//! Gill WindSonic 2D raw-data ingest.
//!
//! This module handles reading the observatory's raw sonic files (serial
//! logger lines and tower TSV rows), the line-level quality control that
//! drops corrupted or out-of-status readings, and the accounting of what was
//! kept and why lines were rejected.

mod line;
mod reader;
mod record;

pub use line::{parse_logger_line, parse_timestamp, parse_tower_line, permitted_byte, LOGGER_LINE_LEN};
pub use reader::{scan_files, scan_path, scan_reader, RawFormat, ScanOutcome};
pub use record::{RejectReason, ScanStats, SonicRecord};
