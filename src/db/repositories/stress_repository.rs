use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::stress::{StressLevel, StressScoreInsert, StressScoreRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        computed_at,
        score,
        level,
        source_metric_id
    FROM stress_scores
"#;

#[derive(Debug, Clone)]
pub struct StressScoreRow {
    pub id: i64,
    pub user_id: String,
    pub computed_at: String,
    pub score: i64,
    pub level: String,
    pub source_metric_id: Option<i64>,
}

impl StressScoreRow {
    pub fn into_record(self) -> AppResult<StressScoreRecord> {
        let level = StressLevel::try_from(self.level.as_str()).map_err(AppError::validation)?;

        Ok(StressScoreRecord {
            id: self.id,
            user_id: self.user_id,
            computed_at: self.computed_at,
            score: self.score,
            level,
            source_metric_id: self.source_metric_id,
        })
    }
}

impl TryFrom<&Row<'_>> for StressScoreRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            computed_at: row.get("computed_at")?,
            score: row.get("score")?,
            level: row.get("level")?,
            source_metric_id: row.get("source_metric_id")?,
        })
    }
}

pub struct StressRepository;

impl StressRepository {
    pub fn insert(conn: &Connection, insert: &StressScoreInsert) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO stress_scores (
                    user_id,
                    computed_at,
                    score,
                    level,
                    source_metric_id
                ) VALUES (
                    :user_id,
                    :computed_at,
                    :score,
                    :level,
                    :source_metric_id
                )
            "#,
            named_params! {
                ":user_id": &insert.user_id,
                ":computed_at": &insert.computed_at,
                ":score": &insert.score,
                ":level": insert.level.as_str(),
                ":source_metric_id": &insert.source_metric_id,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<StressScoreRecord> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = :id", BASE_SELECT))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| {
                StressScoreRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => row.into_record(),
            None => Err(AppError::not_found()),
        }
    }

    /// Newest score for the user; id breaks ties within one timestamp.
    pub fn latest_for_user(
        conn: &Connection,
        user_id: &str,
    ) -> AppResult<Option<StressScoreRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = :user_id ORDER BY computed_at DESC, id DESC LIMIT 1",
            BASE_SELECT
        ))?;

        let row = stmt
            .query_row(named_params! {":user_id": user_id}, |row| {
                StressScoreRow::try_from(row)
            })
            .optional()?;

        row.map(|row| row.into_record()).transpose()
    }

    pub fn list_for_user(
        conn: &Connection,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AppResult<Vec<StressScoreRecord>> {
        let mut stmt = conn.prepare(&format!(
            r#"{}
                WHERE user_id = :user_id
                  AND (:from IS NULL OR computed_at >= :from)
                  AND (:to IS NULL OR computed_at <= :to)
                ORDER BY computed_at ASC, id ASC
            "#,
            BASE_SELECT
        ))?;

        let records = stmt
            .query_map(
                named_params! {":user_id": user_id, ":from": from, ":to": to},
                |row| StressScoreRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
