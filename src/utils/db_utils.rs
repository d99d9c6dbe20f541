use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// String values that parse as dates, times-of-day, or datetimes are bound
/// as such so TIME/DATE columns (schedules, punch corrections) accept them.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                {
                    values.push(SqlValue::Time(t));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_set_clause_and_where() {
        let payload = json!({"name": "Acme Ltda"});
        let update = build_update_sql("companies", &payload, "id", 7).unwrap();
        assert_eq!(update.sql, "UPDATE companies SET name = ? WHERE id = ?");
        assert_eq!(update.values.len(), 2);
        assert!(matches!(&update.values[0], SqlValue::String(s) if s == "Acme Ltda"));
        assert!(matches!(update.values[1], SqlValue::I64(7)));
    }

    #[test]
    fn time_of_day_strings_bind_as_time() {
        let payload = json!({"standard_check_in": "09:00:00"});
        let update = build_update_sql("employees", &payload, "id", 1).unwrap();
        assert!(matches!(
            update.values[0],
            SqlValue::Time(t) if t == NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        ));
    }

    #[test]
    fn short_time_format_is_accepted() {
        let payload = json!({"check_out": "18:30"});
        let update = build_update_sql("time_records", &payload, "id", 1).unwrap();
        assert!(matches!(
            update.values[0],
            SqlValue::Time(t) if t == NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        ));
    }

    #[test]
    fn date_strings_bind_as_date() {
        let payload = json!({"date": "2024-06-03"});
        let update = build_update_sql("time_records", &payload, "id", 1).unwrap();
        assert!(matches!(
            update.values[0],
            SqlValue::Date(d) if d == NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let payload = json!({});
        assert!(build_update_sql("companies", &payload, "id", 1).is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let payload = json!(["name"]);
        assert!(build_update_sql("companies", &payload, "id", 1).is_err());
    }

    #[test]
    fn nulls_and_numbers_pass_through() {
        let payload = json!({"break_seconds": 1800, "check_out": null});
        let update = build_update_sql("time_records", &payload, "id", 3).unwrap();
        // serde_json maps iterate in key order: break_seconds before check_out
        assert!(matches!(update.values[0], SqlValue::I64(1800)));
        assert!(matches!(update.values[1], SqlValue::Null));
    }
}
