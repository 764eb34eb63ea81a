//! Row parsing and column formatting helpers.
//!
//! `libsql::Row` is column-indexed; these helpers turn TEXT and INTEGER
//! columns back into typed values with uniform error messages.

use activity_core::{Attributes, ModelRef};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::DatabaseError;

/// Format a timestamp for storage.
///
/// Always microsecond precision with a `Z` suffix, so every stored value has
/// the same width and string comparison matches chronological order.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00.000000Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a nullable JSON object column. NULL and empty text yield an empty map.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the text is not a JSON object.
pub fn parse_json_object(s: Option<&str>) -> Result<Attributes, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::Query(format!("Invalid JSON object in column: {e}"))),
        _ => Ok(Attributes::new()),
    }
}

/// Serialize a JSON object column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text(map: &Attributes) -> Result<String, DatabaseError> {
    serde_json::to_string(map).map_err(|e| DatabaseError::Other(e.into()))
}

/// Convert a model id into the signed integer `SQLite` stores.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidArgument` for ids above `i64::MAX`.
pub fn id_to_sql(id: u64) -> Result<i64, DatabaseError> {
    i64::try_from(id)
        .map_err(|_| DatabaseError::InvalidArgument(format!("model id {id} exceeds i64::MAX")))
}

/// Rebuild a polymorphic reference from its type and id columns.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the id is negative.
pub fn model_ref(kind: String, id: i64) -> Result<ModelRef, DatabaseError> {
    let id = u64::try_from(id)
        .map_err(|_| DatabaseError::InvalidState(format!("negative model id {id} for {kind}")))?;
    Ok(ModelRef::new(kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn formatted_datetimes_have_fixed_width_and_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = early + chrono::Duration::microseconds(1_500_000);

        let a = format_datetime(&early);
        let b = format_datetime(&late);

        assert_eq!(a, "2024-01-01T00:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_datetime(&b).unwrap(), late);
    }

    #[test]
    fn parse_datetime_accepts_sqlite_format() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(format_datetime(&dt), "2026-02-09T14:30:00.000000Z");
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn json_object_columns() {
        assert!(parse_json_object(None).unwrap().is_empty());
        assert!(parse_json_object(Some("")).unwrap().is_empty());
        let map = parse_json_object(Some(r#"{"name":"A"}"#)).unwrap();
        assert_eq!(map["name"], "A");
        assert!(parse_json_object(Some("[1,2]")).is_err());
    }

    #[test]
    fn model_ids_are_range_checked() {
        assert_eq!(id_to_sql(42).unwrap(), 42);
        assert!(matches!(
            id_to_sql(u64::MAX),
            Err(DatabaseError::InvalidArgument(_))
        ));
        assert!(matches!(
            model_ref("auth::User".into(), -1),
            Err(DatabaseError::InvalidState(_))
        ));
    }
}
