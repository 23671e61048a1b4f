use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::heart_metric::HeartMetricRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        captured_at,
        heart_rate,
        rmssd
    FROM heart_metrics
"#;

#[derive(Debug, Clone)]
pub struct HeartMetricRow {
    pub user_id: String,
    pub captured_at: String,
    pub heart_rate: i64,
    pub rmssd: Option<f64>,
}

impl TryFrom<&Row<'_>> for HeartMetricRecord {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            captured_at: row.get("captured_at")?,
            heart_rate: row.get("heart_rate")?,
            rmssd: row.get("rmssd")?,
        })
    }
}

pub struct HeartMetricRepository;

impl HeartMetricRepository {
    pub fn insert(conn: &Connection, row: &HeartMetricRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO heart_metrics (
                    user_id,
                    captured_at,
                    heart_rate,
                    rmssd
                ) VALUES (
                    :user_id,
                    :captured_at,
                    :heart_rate,
                    :rmssd
                )
            "#,
            named_params! {
                ":user_id": &row.user_id,
                ":captured_at": &row.captured_at,
                ":heart_rate": &row.heart_rate,
                ":rmssd": &row.rmssd,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<HeartMetricRecord> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = :id", BASE_SELECT))?;

        let record = stmt
            .query_row(named_params! {":id": id}, |row| {
                HeartMetricRecord::try_from(row)
            })
            .optional()?;

        record.ok_or_else(AppError::not_found)
    }

    pub fn list_for_user(
        conn: &Connection,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AppResult<Vec<HeartMetricRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"{}
                WHERE user_id = :user_id
                  AND (:from IS NULL OR captured_at >= :from)
                  AND (:to IS NULL OR captured_at <= :to)
                ORDER BY captured_at ASC, id ASC
            "#,
            BASE_SELECT
        ))?;

        let records = stmt
            .query_map(
                named_params! {":user_id": user_id, ":from": from, ":to": to},
                |row| HeartMetricRecord::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
