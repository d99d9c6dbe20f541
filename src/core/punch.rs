//! The punch state machine: validates one action against today's record.
//!
//! A day's state is inferred from field presence, never from a separate
//! status column: no check_in is "not started", `break_seconds == Some(0)`
//! is an open break, a set check_out closes the day.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::time_record::TimeRecord;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PunchAction {
    CheckIn,
    StartBreak,
    EndBreak,
    CheckOut,
}

/// Everything the punch flow can fail with. Display strings are the exact
/// user-facing messages the presentation layer renders.
#[derive(Debug, Error)]
pub enum PunchError {
    #[error("Invalid authentication code")]
    EmployeeNotFound,

    #[error("Invalid or duplicate action")]
    InvalidTransition,

    #[error("An error occurred: {0}")]
    Internal(String),
}

/// Applies one punch action to today's record, or rejects it.
///
/// `now` is the wall-clock instant of the request; its time-of-day is what
/// gets written. Preconditions follow the transition table: each action is
/// valid exactly once per day, and anything else is an invalid or duplicate
/// action. On rejection the record is left untouched.
///
/// end_break records the span since *check-in*, not since the break opened.
/// That conflates time-at-work with break length whenever the break starts
/// after a non-trivial working interval; it is the behavior the product
/// shipped with and is kept on purpose (see DESIGN.md before "fixing" it).
pub fn apply(
    record: &mut TimeRecord,
    action: PunchAction,
    now: NaiveDateTime,
) -> Result<(), PunchError> {
    match (action, record.check_in, record.break_seconds, record.check_out) {
        (PunchAction::CheckIn, None, _, _) => {
            record.check_in = Some(now.time());
        }
        (PunchAction::StartBreak, Some(_), None, _) => {
            record.break_seconds = Some(0);
        }
        (PunchAction::EndBreak, Some(check_in), Some(0), _) => {
            let since_check_in = now - record.date.and_time(check_in);
            record.break_seconds = Some(since_check_in.num_seconds());
        }
        (PunchAction::CheckOut, _, _, None) => {
            record.check_out = Some(now.time());
        }
        _ => return Err(PunchError::InvalidTransition),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        day().and_time(NaiveTime::from_hms_opt(hour, min, 0).unwrap())
    }

    fn fresh_record() -> TimeRecord {
        TimeRecord {
            id: 1,
            employee_id: 1,
            date: day(),
            check_in: None,
            break_seconds: None,
            check_out: None,
        }
    }

    #[test]
    fn full_day_sequence_succeeds_once_each() {
        let mut rec = fresh_record();

        apply(&mut rec, PunchAction::CheckIn, at(9, 0)).unwrap();
        assert_eq!(rec.check_in, NaiveTime::from_hms_opt(9, 0, 0));

        apply(&mut rec, PunchAction::StartBreak, at(12, 0)).unwrap();
        assert_eq!(rec.break_seconds, Some(0));

        apply(&mut rec, PunchAction::EndBreak, at(13, 0)).unwrap();
        // measured from check-in at 09:00, not from the break start
        assert_eq!(rec.break_seconds, Some(4 * 3600));

        apply(&mut rec, PunchAction::CheckOut, at(18, 0)).unwrap();
        assert_eq!(rec.check_out, NaiveTime::from_hms_opt(18, 0, 0));
    }

    #[test]
    fn every_replay_is_rejected() {
        let mut rec = fresh_record();
        let steps = [
            (PunchAction::CheckIn, at(9, 0)),
            (PunchAction::StartBreak, at(12, 0)),
            (PunchAction::EndBreak, at(13, 0)),
            (PunchAction::CheckOut, at(18, 0)),
        ];

        for (action, now) in steps {
            apply(&mut rec, action, now).unwrap();
            let before = rec.clone();
            let err = apply(&mut rec, action, now + chrono::Duration::minutes(1)).unwrap_err();
            assert!(matches!(err, PunchError::InvalidTransition));
            assert_eq!(rec.check_in, before.check_in);
            assert_eq!(rec.break_seconds, before.break_seconds);
            assert_eq!(rec.check_out, before.check_out);
        }
    }

    #[test]
    fn duplicate_check_in_leaves_original_time() {
        let mut rec = fresh_record();
        apply(&mut rec, PunchAction::CheckIn, at(9, 0)).unwrap();
        apply(&mut rec, PunchAction::CheckIn, at(10, 0)).unwrap_err();
        assert_eq!(rec.check_in, NaiveTime::from_hms_opt(9, 0, 0));
    }

    #[test]
    fn start_break_requires_check_in() {
        let mut rec = fresh_record();
        let err = apply(&mut rec, PunchAction::StartBreak, at(12, 0)).unwrap_err();
        assert!(matches!(err, PunchError::InvalidTransition));
        assert_eq!(rec.break_seconds, None);
    }

    #[test]
    fn end_break_requires_an_open_break() {
        let mut rec = fresh_record();
        apply(&mut rec, PunchAction::CheckIn, at(9, 0)).unwrap();
        let err = apply(&mut rec, PunchAction::EndBreak, at(13, 0)).unwrap_err();
        assert!(matches!(err, PunchError::InvalidTransition));
    }

    #[test]
    fn second_break_is_rejected() {
        let mut rec = fresh_record();
        apply(&mut rec, PunchAction::CheckIn, at(9, 0)).unwrap();
        apply(&mut rec, PunchAction::StartBreak, at(12, 0)).unwrap();
        apply(&mut rec, PunchAction::EndBreak, at(12, 30)).unwrap();
        let err = apply(&mut rec, PunchAction::StartBreak, at(15, 0)).unwrap_err();
        assert!(matches!(err, PunchError::InvalidTransition));
        assert_eq!(rec.break_seconds, Some(3 * 3600 + 1800));
    }

    #[test]
    fn check_out_has_no_check_in_precondition() {
        // the table only requires check_out to be absent
        let mut rec = fresh_record();
        apply(&mut rec, PunchAction::CheckOut, at(18, 0)).unwrap();
        assert_eq!(rec.check_out, NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(rec.check_in, None);
    }

    #[test]
    fn actions_parse_from_wire_names() {
        assert_eq!(
            PunchAction::from_str("check_in").unwrap(),
            PunchAction::CheckIn
        );
        assert_eq!(
            PunchAction::from_str("start_break").unwrap(),
            PunchAction::StartBreak
        );
        assert_eq!(
            PunchAction::from_str("end_break").unwrap(),
            PunchAction::EndBreak
        );
        assert_eq!(
            PunchAction::from_str("check_out").unwrap(),
            PunchAction::CheckOut
        );
        assert!(PunchAction::from_str("clock_in").is_err());
    }

    #[test]
    fn actions_display_as_wire_names() {
        assert_eq!(PunchAction::CheckIn.to_string(), "check_in");
        assert_eq!(PunchAction::CheckOut.to_string(), "check_out");
    }

    #[test]
    fn error_messages_are_the_user_facing_strings() {
        assert_eq!(
            PunchError::EmployeeNotFound.to_string(),
            "Invalid authentication code"
        );
        assert_eq!(
            PunchError::InvalidTransition.to_string(),
            "Invalid or duplicate action"
        );
        assert_eq!(
            PunchError::Internal("pool timed out".into()).to_string(),
            "An error occurred: pool timed out"
        );
    }
}
