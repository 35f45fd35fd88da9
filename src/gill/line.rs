//! Line-level parsing and quality control for raw Gill sonic files.
//!
//! Two on-disk layouts exist at the observatory. The serial logger writes one
//! CSV-ish line per reading, prefixed by the system date, timezone label and
//! reading timestamp, with the Gill telegram (STX .. ETX) embedded:
//!
//! ```text
//! 2017-08-30 01:17:51,UTC,2017-08-30T01:17:52.906838 ^BQ,+002.03,+000.64,M,00,^C
//! ```
//!
//! `^B`/`^C` are ASCII STX/ETX. A good line is exactly [`LOGGER_LINE_LEN`]
//! bytes including the trailing newline, ends in the "working" status tail
//! `M,00,` ETX, and contains no bytes outside a small permitted set; anything
//! else is serial corruption and is dropped. The tower units instead log
//! tab-separated rows (`DateTime node U V Units Status Checksum`).

use chrono::NaiveDateTime;

use super::record::{RejectReason, SonicRecord};

/// Byte length of a well-formed logger line, trailing newline included.
pub const LOGGER_LINE_LEN: usize = 77;

/// Units `M` (m s-1), status `00` (no error), ETX, newline.
const WORKING_TAIL: &[u8] = b"M,00,\x03\n";

const STX: u8 = 0x02;

/// Is this byte permitted in a logger line?
///
/// The set covers digits, timestamp punctuation, the `UTC` label, the node
/// letter `Q`, the units letter `M`, signs, separators and STX/ETX. Any other
/// byte marks the line as corrupted.
#[must_use]
pub fn permitted_byte(b: u8) -> bool {
    matches!(
        b,
        b'0'..=b'9'
            | b':'
            | b' '
            | b'\n'
            | b'U'
            | b'T'
            | b'C'
            | b'Q'
            | b'M'
            | b'+'
            | b','
            | b'.'
            | b'-'
            | 0x02
            | 0x03
    )
}

/// Parse a timestamp in either ISO `T` or space-separated form, with an
/// optional fractional-second part.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Validate and parse one raw logger line (bytes as read, newline included).
///
/// # Errors
///
/// Returns the [`RejectReason`] when the line fails quality control.
pub fn parse_logger_line(raw: &[u8]) -> Result<SonicRecord, RejectReason> {
    if raw.len() != LOGGER_LINE_LEN {
        return Err(RejectReason::Length);
    }
    if !raw.ends_with(WORKING_TAIL) {
        return Err(RejectReason::Status);
    }
    if !raw.iter().copied().all(permitted_byte) {
        return Err(RejectReason::ForeignChars);
    }

    // The permitted set is pure ASCII, so this cannot fail on an accepted line.
    let text = std::str::from_utf8(raw).map_err(|_| RejectReason::Parse)?;
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 8 {
        return Err(RejectReason::Parse);
    }

    // Field 2 is "<timestamp> <STX><node>"; the system date and timezone in
    // fields 0-1 are logger bookkeeping and are not carried forward.
    let stamp_field = fields[2].as_bytes();
    if stamp_field.len() < 4 {
        return Err(RejectReason::Parse);
    }
    let node = stamp_field[stamp_field.len() - 1];
    if stamp_field[stamp_field.len() - 2] != STX || stamp_field[stamp_field.len() - 3] != b' ' {
        return Err(RejectReason::Parse);
    }
    let stamp_text = &fields[2][..fields[2].len() - 3];
    let timestamp = parse_timestamp(stamp_text).ok_or(RejectReason::Parse)?;

    let u_gill: f64 = fields[3].parse().map_err(|_| RejectReason::Parse)?;
    let v_gill: f64 = fields[4].parse().map_err(|_| RejectReason::Parse)?;

    Ok(SonicRecord {
        timestamp,
        node: char::from(node),
        u_gill,
        v_gill,
    })
}

/// Parse one tower TSV row (newline already stripped).
///
/// Columns are `DateTime`, `node`, `U`, `V`, `Units`, `Status` and an
/// unverified trailing checksum. Rows whose units/status are not the working
/// `M`/`00` pair are rejected as [`RejectReason::Status`].
///
/// # Errors
///
/// Returns the [`RejectReason`] when the row fails quality control.
pub fn parse_tower_line(line: &str) -> Result<SonicRecord, RejectReason> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 6 {
        return Err(RejectReason::Parse);
    }

    if fields[4] != "M" || fields[5] != "00" {
        return Err(RejectReason::Status);
    }

    let timestamp = parse_timestamp(fields[0]).ok_or(RejectReason::Parse)?;
    let mut node_chars = fields[1].chars();
    let node = node_chars.next().ok_or(RejectReason::Parse)?;
    if node_chars.next().is_some() {
        return Err(RejectReason::Parse);
    }
    let u_gill: f64 = fields[2].parse().map_err(|_| RejectReason::Parse)?;
    let v_gill: f64 = fields[3].parse().map_err(|_| RejectReason::Parse)?;

    Ok(SonicRecord {
        timestamp,
        node,
        u_gill,
        v_gill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn sample_line() -> Vec<u8> {
        let line = format!(
            "2017-08-30 01:17:51,UTC,2017-08-30T01:17:52.906838 \u{2}Q,{:+07.2},{:+07.2},M,00,\u{3}\n",
            2.03, 0.64
        );
        line.into_bytes()
    }

    #[test]
    fn sample_line_is_reference_length() {
        assert_eq!(sample_line().len(), LOGGER_LINE_LEN);
    }

    #[test]
    fn good_logger_line_parses() {
        let rec = parse_logger_line(&sample_line()).unwrap();
        assert_eq!(
            rec.timestamp.date(),
            NaiveDate::from_ymd_opt(2017, 8, 30).unwrap()
        );
        assert_eq!(rec.timestamp.time().nanosecond(), 906_838_000);
        assert_eq!(rec.node, 'Q');
        assert!((rec.u_gill - 2.03).abs() < 1e-12);
        assert!((rec.v_gill - 0.64).abs() < 1e-12);
    }

    #[test]
    fn negative_components_parse() {
        let line = format!(
            "2017-08-30 01:17:51,UTC,2017-08-30T01:17:52.906838 \u{2}Q,{:+07.2},{:+07.2},M,00,\u{3}\n",
            -12.5, -0.04
        );
        let rec = parse_logger_line(line.as_bytes()).unwrap();
        assert!((rec.u_gill + 12.5).abs() < 1e-12);
        assert!((rec.v_gill + 0.04).abs() < 1e-12);
    }

    #[test]
    fn short_line_rejected_for_length() {
        let mut line = sample_line();
        line.remove(0);
        assert_eq!(parse_logger_line(&line), Err(RejectReason::Length));
    }

    #[test]
    fn missing_newline_rejected_for_length() {
        let mut line = sample_line();
        line.pop();
        assert_eq!(parse_logger_line(&line), Err(RejectReason::Length));
    }

    #[test]
    fn axis_failure_status_rejected() {
        let mut line = sample_line();
        // Status "01": U axis blocked, per the Gill manual.
        let n = line.len();
        line[n - 3] = b'1';
        assert_eq!(parse_logger_line(&line), Err(RejectReason::Status));
    }

    #[test]
    fn corrupted_byte_rejected() {
        let mut line = sample_line();
        line[30] = 0xD3; // latin-1 'Ó', a classic serial-noise artefact
        assert_eq!(parse_logger_line(&line), Err(RejectReason::ForeignChars));
    }

    #[test]
    fn lowercase_byte_rejected() {
        let mut line = sample_line();
        line[24] = b'q';
        assert_eq!(parse_logger_line(&line), Err(RejectReason::ForeignChars));
    }

    #[test]
    fn whitelisted_gibberish_rejected_at_parse() {
        // Same length and tail, but the U field is not a number.
        let line = format!(
            "2017-08-30 01:17:51,UTC,2017-08-30T01:17:52.906838 \u{2}Q,++02.03,{:+07.2},M,00,\u{3}\n",
            0.64
        );
        assert_eq!(parse_logger_line(line.as_bytes()).unwrap_err(), RejectReason::Parse);
    }

    #[test]
    fn extra_comma_rejected_at_parse() {
        // A comma in place of a digit keeps length/tail/charset valid but
        // shifts the field count.
        let mut line = sample_line();
        line[12] = b',';
        assert_eq!(parse_logger_line(&line), Err(RejectReason::Parse));
    }

    #[test]
    fn tower_row_parses_both_timestamp_forms() {
        let iso = "2014-08-20T12:00:00.5\tQ\t+001.00\t-000.50\tM\t00\t3A";
        let rec = parse_tower_line(iso).unwrap();
        assert_eq!(rec.node, 'Q');
        assert!((rec.u_gill - 1.0).abs() < 1e-12);
        assert!((rec.v_gill + 0.5).abs() < 1e-12);

        let spaced = "2014-08-20 12:00:00\tR\t+001.00\t-000.50\tM\t00\t3A";
        let rec = parse_tower_line(spaced).unwrap();
        assert_eq!(rec.node, 'R');
        assert_eq!(rec.timestamp.time().minute(), 0);
    }

    #[test]
    fn tower_row_bad_status_rejected() {
        let row = "2014-08-20T12:00:00\tQ\t+001.00\t-000.50\tM\t04\t3A";
        assert_eq!(parse_tower_line(row), Err(RejectReason::Status));

        let row = "2014-08-20T12:00:00\tQ\t+001.00\t-000.50\tN\t00\t3A";
        assert_eq!(parse_tower_line(row), Err(RejectReason::Status));
    }

    #[test]
    fn tower_row_truncated_rejected() {
        assert_eq!(
            parse_tower_line("2014-08-20T12:00:00\tQ\t+001.00"),
            Err(RejectReason::Parse)
        );
    }

    #[test]
    fn tower_row_without_checksum_still_parses() {
        let row = "2014-08-20T12:00:00\tQ\t+001.00\t-000.50\tM\t00";
        assert!(parse_tower_line(row).is_ok());
    }

    #[test]
    fn timestamp_without_fraction_parses() {
        let ts = parse_timestamp("2017-08-30T01:17:52").unwrap();
        assert_eq!(ts.time().nanosecond(), 0);
    }
}
