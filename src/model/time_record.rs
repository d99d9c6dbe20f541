use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One punch record per (employee, date). `break_seconds == Some(0)` means a
/// break is currently open; the real span replaces it on end_break.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimeRecord {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub break_seconds: Option<i64>,
    pub check_out: Option<NaiveTime>,
}
