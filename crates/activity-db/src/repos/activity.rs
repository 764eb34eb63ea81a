//! Activity log repository.
//!
//! Append-only writes plus dynamic filtering over `activity_logs`.

use activity_core::{ActivityFilter, ActivityRecord, CauserFilter, ModelRef, NewActivity};
use chrono::SubsecRound;

use crate::ActivityDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, id_to_sql, model_ref, parse_datetime, parse_enum,
    parse_json_object, to_json_text,
};

const COLUMNS: &str = "id, event, action, log, description, subject_type, subject_id, \
     causer_type, causer_id, properties, meta, batch_id, created_at, updated_at";

impl ActivityDb {
    /// Insert one activity and return the stored record.
    ///
    /// Timestamps are truncated to the stored microsecond precision, so the
    /// returned record equals what a later query reads back.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an id is out of range or the INSERT fails.
    pub async fn insert_activity(
        &self,
        mut activity: NewActivity,
    ) -> Result<ActivityRecord, DatabaseError> {
        activity.created_at = activity.created_at.trunc_subsecs(6);
        let created_at = format_datetime(&activity.created_at);
        let subject_id = id_to_sql(activity.subject.id)?;
        let (causer_type, causer_id) = match &activity.causer {
            Some(causer) => (Some(causer.kind.as_str()), Some(id_to_sql(causer.id)?)),
            None => (None, None),
        };
        let properties = to_json_text(&activity.properties)?;
        let meta = to_json_text(&activity.meta)?;

        let mut rows = self
            .conn
            .query(
                "INSERT INTO activity_logs (event, action, log, description, subject_type, subject_id,
                     causer_type, causer_id, properties, meta, batch_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                 RETURNING id",
                libsql::params![
                    activity.event.as_str(),
                    activity.action.as_deref(),
                    activity.log.as_str(),
                    activity.description.as_deref(),
                    activity.subject.kind.as_str(),
                    subject_id,
                    causer_type,
                    causer_id,
                    properties,
                    meta,
                    activity.batch_id.as_deref(),
                    created_at
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let id = row.get::<i64>(0)?;

        Ok(activity.into_record(id))
    }

    /// Query activities with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row cannot be parsed.
    pub async fn query_activities(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityRecord>, DatabaseError> {
        let (where_clause, params) = where_clause(filter)?;
        let limit_clause = filter
            .limit
            .map(|limit| format!(" LIMIT {limit}"))
            .unwrap_or_default();
        let sql = format!(
            "SELECT {COLUMNS} FROM activity_logs {where_clause}
             ORDER BY created_at DESC, id DESC{limit_clause}"
        );

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// Number of activities matching `filter`. The limit is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_activities(&self, filter: &ActivityFilter) -> Result<u64, DatabaseError> {
        let (where_clause, params) = where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) FROM activity_logs {where_clause}");

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))
    }

    /// Whether any activity exists for `subject`, without loading rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn subject_has_activity(&self, subject: &ModelRef) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM activity_logs WHERE subject_type = ?1 AND subject_id = ?2)",
                libsql::params![subject.kind.as_str(), id_to_sql(subject.id)?],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)? != 0)
    }
}

/// Build the WHERE clause and positional parameters for `filter`.
fn where_clause(filter: &ActivityFilter) -> Result<(String, Vec<libsql::Value>), DatabaseError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(event) = filter.event {
        params.push(libsql::Value::Text(event.as_str().to_string()));
        conditions.push(format!("event = ?{}", params.len()));
    }
    if let Some(ref subject) = filter.subject {
        params.push(libsql::Value::Text(subject.kind.clone()));
        conditions.push(format!("subject_type = ?{}", params.len()));
        params.push(libsql::Value::Integer(id_to_sql(subject.id)?));
        conditions.push(format!("subject_id = ?{}", params.len()));
    }
    if let Some(ref batch_id) = filter.batch_id {
        params.push(libsql::Value::Text(batch_id.clone()));
        conditions.push(format!("batch_id = ?{}", params.len()));
    }
    match filter.causer {
        Some(CauserFilter::Nobody) => {
            conditions.push("causer_type IS NULL AND causer_id IS NULL".to_string());
        }
        Some(CauserFilter::Model(ref causer)) => {
            params.push(libsql::Value::Text(causer.kind.clone()));
            conditions.push(format!("causer_type = ?{}", params.len()));
            params.push(libsql::Value::Integer(id_to_sql(causer.id)?));
            conditions.push(format!("causer_id = ?{}", params.len()));
        }
        None => {}
    }
    if let Some(ref log) = filter.log {
        params.push(libsql::Value::Text(log.clone()));
        conditions.push(format!("log = ?{}", params.len()));
    }
    if let Some(ref action) = filter.action {
        params.push(libsql::Value::Text(action.clone()));
        conditions.push(format!("action = ?{}", params.len()));
    }
    if let Some(ref from) = filter.created_from {
        params.push(libsql::Value::Text(format_datetime(from)));
        conditions.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(ref to) = filter.created_to {
        params.push(libsql::Value::Text(format_datetime(to)));
        conditions.push(format!("created_at <= ?{}", params.len()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    Ok((clause, params))
}

fn row_to_record(row: &libsql::Row) -> Result<ActivityRecord, DatabaseError> {
    let id = row.get::<i64>(0)?;
    let causer = match (get_opt_string(row, 7)?, row.get::<Option<i64>>(8)?) {
        (Some(kind), Some(causer_id)) => Some(model_ref(kind, causer_id)?),
        (None, None) => None,
        _ => {
            return Err(DatabaseError::InvalidState(format!(
                "activity {id} has a partial causer reference"
            )));
        }
    };

    Ok(ActivityRecord {
        id,
        event: parse_enum(&row.get::<String>(1)?)?,
        action: get_opt_string(row, 2)?,
        log: row.get::<String>(3)?,
        description: get_opt_string(row, 4)?,
        subject: model_ref(row.get::<String>(5)?, row.get::<i64>(6)?)?,
        causer,
        properties: parse_json_object(get_opt_string(row, 9)?.as_deref())?,
        meta: parse_json_object(get_opt_string(row, 10)?.as_deref())?,
        batch_id: get_opt_string(row, 11)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

#[cfg(test)]
mod tests {
    use activity_core::{ActivityEvent, Attributes};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    async fn test_db() -> ActivityDb {
        ActivityDb::open_local(":memory:").await.unwrap()
    }

    fn activity(subject_id: u64) -> NewActivity {
        let mut properties = Attributes::new();
        properties.insert("name".into(), json!("Test"));
        NewActivity {
            event: ActivityEvent::Created,
            action: None,
            log: "default".into(),
            description: Some("Post created".into()),
            subject: ModelRef::new("blog::Post", subject_id),
            causer: None,
            properties,
            meta: Attributes::new(),
            batch_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_returns_what_query_reads_back() {
        let db = test_db().await;
        let mut new = activity(1);
        new.causer = Some(ModelRef::new("auth::User", 9));
        new.batch_id = Some("7b1c1b8e-9f0a-4a43-a1a4-5f5d0f3a0c11".into());
        new.meta.insert("ip".into(), json!("203.0.113.7"));

        let inserted = db.insert_activity(new).await.unwrap();
        let fetched = db.query_activities(&ActivityFilter::new()).await.unwrap();

        assert_eq!(inserted.id, 1);
        assert_eq!(fetched, vec![inserted]);
    }

    #[tokio::test]
    async fn subsecond_precision_is_truncated_to_micros() {
        let db = test_db().await;
        let mut new = activity(1);
        new.created_at = Utc.timestamp_opt(1_714_564_800, 123_456_789).unwrap();

        let inserted = db.insert_activity(new).await.unwrap();

        assert_eq!(inserted.created_at.timestamp_subsec_nanos(), 123_456_000);
        assert_eq!(inserted.created_at, inserted.updated_at);
    }

    #[tokio::test]
    async fn ids_out_of_range_are_rejected() {
        let db = test_db().await;
        let new = activity(u64::MAX);

        let err = db.insert_activity(new).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn count_and_exists() {
        let db = test_db().await;
        db.insert_activity(activity(1)).await.unwrap();
        db.insert_activity(activity(1)).await.unwrap();
        db.insert_activity(activity(2)).await.unwrap();

        let subject = ModelRef::new("blog::Post", 1);
        let count = db
            .count_activities(&ActivityFilter::new().for_subject(subject.clone()).limit(1))
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert!(db.subject_has_activity(&subject).await.unwrap());
        assert!(
            !db.subject_has_activity(&ModelRef::new("blog::Post", 3))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn partial_causer_row_is_invalid_state() {
        let db = test_db().await;
        db.conn()
            .execute("DROP TABLE activity_logs", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "CREATE TABLE activity_logs (id INTEGER PRIMARY KEY, event TEXT, action TEXT, log TEXT,
                     description TEXT, subject_type TEXT, subject_id INTEGER, causer_type TEXT,
                     causer_id INTEGER, properties TEXT, meta TEXT, batch_id TEXT,
                     created_at TEXT, updated_at TEXT)",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO activity_logs (event, log, subject_type, subject_id, causer_type, created_at, updated_at)
                 VALUES ('created', 'default', 'blog::Post', 1, 'auth::User', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
                (),
            )
            .await
            .unwrap();

        let err = db.query_activities(&ActivityFilter::new()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }
}
