//! Record and quality-control accounting types for Gill sonic data.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::wind;

/// One accepted reading from a Gill WindSonic 2D anemometer.
///
/// Components are stored in the instrument's own axis convention; use
/// [`SonicRecord::met`] for meteorological (eastward, northward) components.
#[derive(Debug, Clone, PartialEq)]
pub struct SonicRecord {
    /// Reading timestamp (naive UTC, microsecond resolution).
    pub timestamp: NaiveDateTime,
    /// Sonic node address letter (`Q` on the observatory logger).
    pub node: char,
    /// Instrument-axis U component in m s-1.
    pub u_gill: f64,
    /// Instrument-axis V component in m s-1.
    pub v_gill: f64,
}

impl SonicRecord {
    /// Meteorological (eastward, northward) components in m s-1.
    #[must_use]
    pub fn met(&self) -> (f64, f64) {
        wind::met_components(self.u_gill, self.v_gill)
    }
}

/// Why a raw line was rejected by quality control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Wrong byte length for the logger format.
    Length,
    /// Units or Gill status code not the "working" values.
    Status,
    /// Bytes outside the permitted character set (serial corruption).
    ForeignChars,
    /// Structurally plausible but a field failed to parse.
    Parse,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length => write!(f, "length"),
            Self::Status => write!(f, "status"),
            Self::ForeignChars => write!(f, "foreign characters"),
            Self::Parse => write!(f, "parse"),
        }
    }
}

/// Line-level quality control tallies for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Number of input files read.
    pub files: usize,
    /// Physical lines seen.
    pub lines: usize,
    /// Lines that produced a record.
    pub accepted: usize,
    /// Rejected: wrong length.
    pub rejected_length: usize,
    /// Rejected: bad units/status code.
    pub rejected_status: usize,
    /// Rejected: forbidden bytes.
    pub rejected_chars: usize,
    /// Rejected: field parse failure.
    pub rejected_parse: usize,
}

impl ScanStats {
    /// Record an accepted line.
    pub fn accept(&mut self) {
        self.lines += 1;
        self.accepted += 1;
    }

    /// Record a rejected line.
    pub fn reject(&mut self, reason: RejectReason) {
        self.lines += 1;
        match reason {
            RejectReason::Length => self.rejected_length += 1,
            RejectReason::Status => self.rejected_status += 1,
            RejectReason::ForeignChars => self.rejected_chars += 1,
            RejectReason::Parse => self.rejected_parse += 1,
        }
    }

    /// Total rejected lines.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected_length + self.rejected_status + self.rejected_chars + self.rejected_parse
    }
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s), {} line(s): {} accepted, {} rejected \
             (length {}, status {}, chars {}, parse {})",
            self.files,
            self.lines,
            self.accepted,
            self.rejected(),
            self.rejected_length,
            self.rejected_status,
            self.rejected_chars,
            self.rejected_parse,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn record_met_applies_gill_convention() {
        let rec = SonicRecord {
            timestamp: NaiveDate::from_ymd_opt(2017, 8, 30)
                .unwrap()
                .and_hms_opt(1, 17, 52)
                .unwrap(),
            node: 'Q',
            u_gill: 2.03,
            v_gill: 0.64,
        };
        let (u, v) = rec.met();
        assert!((u + 2.03).abs() < 1e-12);
        assert!((v - 0.64).abs() < 1e-12);
    }

    #[test]
    fn stats_tally_by_reason() {
        let mut stats = ScanStats::default();
        stats.accept();
        stats.reject(RejectReason::Length);
        stats.reject(RejectReason::Status);
        stats.reject(RejectReason::ForeignChars);
        stats.reject(RejectReason::Parse);
        stats.reject(RejectReason::Parse);

        assert_eq!(stats.lines, 6);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected(), 5);
        assert_eq!(stats.rejected_parse, 2);
    }

    #[test]
    fn stats_display_summarises_counts() {
        let mut stats = ScanStats {
            files: 2,
            ..ScanStats::default()
        };
        stats.accept();
        stats.reject(RejectReason::Status);
        let text = stats.to_string();
        assert!(text.contains("2 file(s)"));
        assert!(text.contains("1 accepted"));
        assert!(text.contains("status 1"));
    }

    #[test]
    fn stats_serialize_to_json() {
        let stats = ScanStats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("rejected_chars"));
    }
}
