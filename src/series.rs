//! In-memory wind time series in meteorological components.
//!
//! A [`SonicSeries`] holds eastward/northward components against naive UTC
//! timestamps, in the order they were read. Averaging onto a regular grid
//! uses epoch-aligned bins (a 60 s grid starts on whole minutes regardless of
//! when the first reading landed), with NaN marking bins that received no
//! samples.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::gill::SonicRecord;
use crate::wind;

/// Wind component time series (eastward `u`, northward `v`, in m s-1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SonicSeries {
    times: Vec<NaiveDateTime>,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl SonicSeries {
    /// Build a series from accepted records, converting instrument axes to
    /// meteorological components. Input order is preserved.
    #[must_use]
    pub fn from_records(records: &[SonicRecord]) -> Self {
        let mut series = Self {
            times: Vec::with_capacity(records.len()),
            u: Vec::with_capacity(records.len()),
            v: Vec::with_capacity(records.len()),
        };
        for record in records {
            let (u, v) = record.met();
            series.times.push(record.timestamp);
            series.u.push(u);
            series.v.push(v);
        }
        series
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True when the series holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample timestamps (naive UTC).
    #[must_use]
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Eastward components in m s-1.
    #[must_use]
    pub fn u(&self) -> &[f64] {
        &self.u
    }

    /// Northward components in m s-1.
    #[must_use]
    pub fn v(&self) -> &[f64] {
        &self.v
    }

    /// Wind speeds in m s-1, derived per sample.
    #[must_use]
    pub fn speeds(&self) -> Vec<f64> {
        self.u
            .iter()
            .zip(&self.v)
            .map(|(&u, &v)| wind::polar(u, v).0)
            .collect()
    }

    /// Wind-from directions in degrees, in the range (0, 360].
    #[must_use]
    pub fn directions(&self) -> Vec<f64> {
        self.u
            .iter()
            .zip(&self.v)
            .map(|(&u, &v)| wind::polar(u, v).1)
            .collect()
    }

    /// True when timestamps never decrease.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.times.windows(2).all(|w| w[0] <= w[1])
    }

    /// Base time and per-sample offsets in seconds (fractional, microsecond
    /// resolution). The base is the first sample's timestamp.
    ///
    /// Returns `None` for an empty series.
    #[must_use]
    pub fn time_offsets(&self) -> Option<(NaiveDateTime, Vec<f64>)> {
        let base = *self.times.first()?;
        let offsets = self
            .times
            .iter()
            .map(|t| {
                let delta = t.signed_duration_since(base);
                match delta.num_microseconds() {
                    Some(us) => us as f64 / 1e6,
                    None => delta.num_seconds() as f64,
                }
            })
            .collect();
        Some((base, offsets))
    }

    /// Average onto a regular `bin_seconds` grid.
    ///
    /// Bin edges are aligned to the Unix epoch, so a 60 s grid always starts
    /// on whole minutes. The output covers every bin from the earliest to the
    /// latest sample inclusive; bins with no samples hold NaN. Components are
    /// averaged independently (a vector mean), not their derived speeds.
    #[must_use]
    pub fn resample_mean(&self, bin_seconds: u64) -> Self {
        if self.is_empty() || bin_seconds == 0 {
            return self.clone();
        }
        let bin = bin_seconds as i64;

        let starts: Vec<NaiveDateTime> = self.times.iter().map(|t| bin_start(*t, bin)).collect();
        // Min/max rather than first/last: the output grid is sorted even
        // when the input was not.
        let mut first = starts[0];
        let mut last = starts[0];
        for &s in &starts[1..] {
            if s < first {
                first = s;
            }
            if s > last {
                last = s;
            }
        }

        let span = last.signed_duration_since(first).num_seconds();
        let bins = (span / bin) as usize + 1;
        debug!(bin_seconds, bins, "resampling onto regular grid");

        let mut sum_u = vec![0.0f64; bins];
        let mut sum_v = vec![0.0f64; bins];
        let mut count = vec![0usize; bins];
        for (i, &start) in starts.iter().enumerate() {
            let idx = (start.signed_duration_since(first).num_seconds() / bin) as usize;
            sum_u[idx] += self.u[i];
            sum_v[idx] += self.v[i];
            count[idx] += 1;
        }

        let mut out = Self {
            times: Vec::with_capacity(bins),
            u: Vec::with_capacity(bins),
            v: Vec::with_capacity(bins),
        };
        for idx in 0..bins {
            out.times.push(first + Duration::seconds(idx as i64 * bin));
            if count[idx] == 0 {
                out.u.push(f64::NAN);
                out.v.push(f64::NAN);
            } else {
                out.u.push(sum_u[idx] / count[idx] as f64);
                out.v.push(sum_v[idx] / count[idx] as f64);
            }
        }
        out
    }
}

/// Start of the epoch-aligned bin containing `t`.
pub(crate) fn bin_start(t: NaiveDateTime, bin: i64) -> NaiveDateTime {
    let epoch = t.and_utc().timestamp();
    let into_bin = epoch.rem_euclid(bin);
    let micros = i64::from(t.and_utc().timestamp_subsec_micros());
    t - Duration::seconds(into_bin) - Duration::microseconds(micros)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(h: u32, m: u32, s: u32, u_gill: f64, v_gill: f64) -> SonicRecord {
        SonicRecord {
            timestamp: NaiveDate::from_ymd_opt(2017, 8, 30)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
            node: 'Q',
            u_gill,
            v_gill,
        }
    }

    #[test]
    fn from_records_converts_to_met_components() {
        let series = SonicSeries::from_records(&[record(1, 0, 0, 2.0, 0.5)]);
        assert!((series.u()[0] + 2.0).abs() < 1e-12);
        assert!((series.v()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn offsets_are_fractional_seconds_from_first_sample() {
        let mut records = vec![record(1, 0, 0, 0.0, 0.0), record(1, 0, 2, 0.0, 0.0)];
        records[1].timestamp += Duration::microseconds(500_000);
        let series = SonicSeries::from_records(&records);
        let (base, offsets) = series.time_offsets().unwrap();
        assert_eq!(base, records[0].timestamp);
        assert!((offsets[0]).abs() < 1e-12);
        assert!((offsets[1] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn empty_series_has_no_offsets() {
        assert!(SonicSeries::default().time_offsets().is_none());
    }

    #[test]
    fn monotonic_detection() {
        let sorted = SonicSeries::from_records(&[record(1, 0, 0, 0.0, 0.0), record(1, 0, 1, 0.0, 0.0)]);
        assert!(sorted.is_monotonic());
        let unsorted =
            SonicSeries::from_records(&[record(1, 0, 1, 0.0, 0.0), record(1, 0, 0, 0.0, 0.0)]);
        assert!(!unsorted.is_monotonic());
    }

    #[test]
    fn resample_bins_align_to_whole_minutes() {
        // Samples at 01:00:30 and 01:00:45 land in the 01:00:00 bin even
        // though the first sample is mid-minute.
        let series = SonicSeries::from_records(&[
            record(1, 0, 30, 1.0, 1.0),
            record(1, 0, 45, 3.0, 3.0),
        ]);
        let binned = series.resample_mean(60);
        assert_eq!(binned.len(), 1);
        assert_eq!(
            binned.times()[0],
            NaiveDate::from_ymd_opt(2017, 8, 30)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        );
        assert!((binned.u()[0] + 2.0).abs() < 1e-12); // mean of -1, -3
    }

    #[test]
    fn resample_fills_gaps_with_nan() {
        let series = SonicSeries::from_records(&[
            record(1, 0, 10, 1.0, 0.0),
            record(1, 2, 10, 3.0, 0.0),
        ]);
        let binned = series.resample_mean(60);
        assert_eq!(binned.len(), 3);
        assert!(binned.u()[1].is_nan());
        assert!(binned.v()[1].is_nan());
        assert!((binned.u()[0] + 1.0).abs() < 1e-12);
        assert!((binned.u()[2] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn resample_zero_seconds_is_identity() {
        let series = SonicSeries::from_records(&[record(1, 0, 30, 1.0, 1.0)]);
        assert_eq!(series.resample_mean(0), series);
    }

    #[test]
    fn resample_sorts_grid_even_for_unsorted_input() {
        let series = SonicSeries::from_records(&[
            record(1, 1, 10, 2.0, 0.0),
            record(1, 0, 10, 4.0, 0.0),
        ]);
        let binned = series.resample_mean(60);
        assert_eq!(binned.len(), 2);
        assert!(binned.times()[0] < binned.times()[1]);
        assert!((binned.u()[0] + 4.0).abs() < 1e-12);
    }

    #[test]
    fn derived_polar_series_match_samplewise() {
        // u_gill = -1 gives u_met = +1, v_met = 0: due east, the wrap point.
        let series = SonicSeries::from_records(&[record(1, 0, 0, -1.0, 0.0)]);
        assert!((series.speeds()[0] - 1.0).abs() < 1e-12);
        assert!((series.directions()[0] - 360.0).abs() < 1e-9);
    }
}
