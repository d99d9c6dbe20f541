//! Worked-hours, lateness and overtime derived from a day's punch record.
//!
//! All functions are pure and operate on whole-second differences; results
//! are unrounded hours. Presentation rounds via [`round_hours`].

use chrono::NaiveTime;

use crate::model::time_record::TimeRecord;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Hours between check-in and check-out minus the recorded break.
///
/// A missing break counts as zero. No clamping: a break longer than the
/// check-in/check-out span yields a negative result. Returns 0 when either
/// endpoint is missing.
pub fn worked_hours(record: &TimeRecord) -> f64 {
    match (record.check_in, record.check_out) {
        (Some(check_in), Some(check_out)) => {
            let span = record.date.and_time(check_out) - record.date.and_time(check_in);
            let break_seconds = record.break_seconds.unwrap_or(0);
            (span.num_seconds() - break_seconds) as f64 / SECONDS_PER_HOUR
        }
        _ => 0.0,
    }
}

/// Hours checked in after the standard check-in time, 0 when on time or
/// missing. Both times are combined with the record's date; there is no
/// cross-midnight handling.
pub fn lateness(record: &TimeRecord, standard_check_in: NaiveTime) -> f64 {
    match record.check_in {
        Some(check_in) if check_in > standard_check_in => {
            let actual = record.date.and_time(check_in);
            let expected = record.date.and_time(standard_check_in);
            (actual - expected).num_seconds() as f64 / SECONDS_PER_HOUR
        }
        _ => 0.0,
    }
}

/// Hours checked out after the standard check-out time, 0 when at or before
/// it or missing.
pub fn overtime(record: &TimeRecord, standard_check_out: NaiveTime) -> f64 {
    match record.check_out {
        Some(check_out) if check_out > standard_check_out => {
            let actual = record.date.and_time(check_out);
            let expected = record.date.and_time(standard_check_out);
            (actual - expected).num_seconds() as f64 / SECONDS_PER_HOUR
        }
        _ => 0.0,
    }
}

/// Round to 2 decimal places for display and export columns.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn record(
        check_in: Option<NaiveTime>,
        break_seconds: Option<i64>,
        check_out: Option<NaiveTime>,
    ) -> TimeRecord {
        TimeRecord {
            id: 1,
            employee_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            check_in,
            break_seconds,
            check_out,
        }
    }

    #[test]
    fn full_day_no_break_is_nine_hours() {
        let rec = record(Some(t(9, 0)), None, Some(t(18, 0)));
        assert_eq!(worked_hours(&rec), 9.0);
    }

    #[test]
    fn break_is_subtracted_from_span() {
        let rec = record(Some(t(9, 0)), Some(3600), Some(t(18, 0)));
        assert_eq!(worked_hours(&rec), 8.0);
    }

    #[test]
    fn break_longer_than_span_goes_negative() {
        // 1h span, 2h recorded break: -1.0, not clamped
        let rec = record(Some(t(9, 0)), Some(7200), Some(t(10, 0)));
        assert_eq!(worked_hours(&rec), -1.0);
    }

    #[test]
    fn missing_check_out_yields_zero() {
        let rec = record(Some(t(9, 0)), None, None);
        assert_eq!(worked_hours(&rec), 0.0);
    }

    #[test]
    fn missing_check_in_yields_zero() {
        let rec = record(None, None, Some(t(18, 0)));
        assert_eq!(worked_hours(&rec), 0.0);
    }

    #[test]
    fn open_break_sentinel_subtracts_nothing() {
        let rec = record(Some(t(9, 0)), Some(0), Some(t(18, 0)));
        assert_eq!(worked_hours(&rec), 9.0);
    }

    #[test]
    fn fractional_hours_from_whole_seconds() {
        let rec = record(Some(t(9, 0)), None, Some(t(13, 30)));
        assert_eq!(worked_hours(&rec), 4.5);
    }

    #[test]
    fn lateness_half_hour() {
        let rec = record(Some(t(9, 30)), None, None);
        assert_eq!(lateness(&rec, t(9, 0)), 0.5);
    }

    #[test]
    fn on_time_is_not_late() {
        let rec = record(Some(t(9, 0)), None, None);
        assert_eq!(lateness(&rec, t(9, 0)), 0.0);
    }

    #[test]
    fn early_arrival_is_not_late() {
        let rec = record(Some(t(8, 45)), None, None);
        assert_eq!(lateness(&rec, t(9, 0)), 0.0);
    }

    #[test]
    fn lateness_without_check_in_is_zero() {
        let rec = record(None, None, None);
        assert_eq!(lateness(&rec, t(9, 0)), 0.0);
    }

    #[test]
    fn overtime_one_hour() {
        let rec = record(None, None, Some(t(19, 0)));
        assert_eq!(overtime(&rec, t(18, 0)), 1.0);
    }

    #[test]
    fn leaving_on_time_is_no_overtime() {
        let rec = record(None, None, Some(t(18, 0)));
        assert_eq!(overtime(&rec, t(18, 0)), 0.0);
    }

    #[test]
    fn leaving_early_is_no_overtime() {
        let rec = record(None, None, Some(t(17, 30)));
        assert_eq!(overtime(&rec, t(18, 0)), 0.0);
    }

    #[test]
    fn overtime_without_check_out_is_zero() {
        let rec = record(Some(t(9, 0)), None, None);
        assert_eq!(overtime(&rec, t(18, 0)), 0.0);
    }

    #[test]
    fn repeated_calls_do_not_mutate_the_record() {
        let rec = record(Some(t(9, 0)), Some(1800), Some(t(18, 0)));
        let first = worked_hours(&rec);
        let second = worked_hours(&rec);
        assert_eq!(first, second);
        assert_eq!(rec.break_seconds, Some(1800));
    }

    #[test]
    fn round_hours_to_two_decimals() {
        assert_eq!(round_hours(8.4166666), 8.42);
        assert_eq!(round_hours(0.004), 0.0);
        assert_eq!(round_hours(0.125), 0.13);
        assert_eq!(round_hours(9.0), 9.0);
    }
}
