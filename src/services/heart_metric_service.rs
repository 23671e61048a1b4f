use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::repositories::heart_metric_repository::{HeartMetricRepository, HeartMetricRow};
use crate::db::repositories::stress_repository::StressRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::heart_metric::{HeartMetricIngest, HeartMetricRecord};
use crate::models::stress::{StressScoreInsert, StressScoreRecord};
use crate::services::stress_score;

/// Turns one biometric observation into a durable, derived stress score.
#[derive(Clone)]
pub struct HeartMetricService {
    db: DbPool,
}

impl HeartMetricService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Persists the sample, scores it, and persists the score referencing the
    /// sample, in that order. Not transactional: a failed score write leaves
    /// the sample in place as a legitimate durable record.
    pub fn ingest(&self, mut input: HeartMetricIngest) -> AppResult<StressScoreRecord> {
        let user_id = normalize_user_id(&input.user_id)?;
        let captured_at = match normalize_datetime_opt(input.captured_at.take())? {
            Some(value) => value,
            None => Utc::now().to_rfc3339(),
        };

        let conn = self.db.get_connection()?;

        let metric_id = HeartMetricRepository::insert(
            &conn,
            &HeartMetricRow {
                user_id: user_id.clone(),
                captured_at,
                heart_rate: input.heart_rate,
                rmssd: input.rmssd,
            },
        )?;
        debug!(target: "app::stress", metric_id, heart_rate = input.heart_rate, "heart metric stored");

        let assessment = stress_score::assess(input.heart_rate, input.rmssd.unwrap_or(0.0));

        let score_id = StressRepository::insert(
            &conn,
            &StressScoreInsert {
                user_id: user_id.clone(),
                computed_at: Utc::now().to_rfc3339(),
                score: assessment.score,
                level: assessment.level,
                source_metric_id: Some(metric_id),
            },
        )?;

        let record = StressRepository::find_by_id(&conn, score_id)?;

        info!(
            target: "app::stress",
            user_id = %user_id,
            score = record.score,
            level = %record.level,
            "stress score computed"
        );

        Ok(record)
    }

    pub fn get_metric(&self, id: i64) -> AppResult<HeartMetricRecord> {
        self.db
            .with_connection(|conn| HeartMetricRepository::find_by_id(conn, id))
    }

    pub fn list_metrics(
        &self,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AppResult<Vec<HeartMetricRecord>> {
        let user_id = normalize_user_id(user_id)?;
        self.db.with_connection(|conn| {
            HeartMetricRepository::list_for_user(conn, &user_id, from, to)
        })
    }

    pub fn get_score(&self, id: i64) -> AppResult<StressScoreRecord> {
        self.db
            .with_connection(|conn| StressRepository::find_by_id(conn, id))
    }

    pub fn latest_score(&self, user_id: &str) -> AppResult<Option<StressScoreRecord>> {
        let user_id = normalize_user_id(user_id)?;
        self.db
            .with_connection(|conn| StressRepository::latest_for_user(conn, &user_id))
    }

    pub fn list_scores(
        &self,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AppResult<Vec<StressScoreRecord>> {
        let user_id = normalize_user_id(user_id)?;
        self.db
            .with_connection(|conn| StressRepository::list_for_user(conn, &user_id, from, to))
    }
}

fn normalize_user_id(user_id: &str) -> AppResult<String> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("用户标识不能为空"));
    }
    Ok(trimmed.to_string())
}

fn normalize_datetime_opt(value: Option<String>) -> AppResult<Option<String>> {
    if let Some(value) = value {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(trimmed).map_err(|_| AppError::validation("时间格式非法"))?;
        Ok(Some(trimmed.to_string()))
    } else {
        Ok(None)
    }
}
