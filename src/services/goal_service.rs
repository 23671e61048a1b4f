use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::repositories::goal_repository::GoalRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::goal::{GoalCreateInput, GoalRecord, GoalUpdateInput};

#[derive(Clone)]
pub struct GoalService {
    db: DbPool,
}

impl GoalService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_goal(&self, input: GoalCreateInput) -> AppResult<GoalRecord> {
        let now = Utc::now().to_rfc3339();
        let record = GoalRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: normalize_required(&input.user_id, "用户标识不能为空")?,
            title: normalize_title(&input.title)?,
            description: normalize_optional_string(input.description),
            starts_at: normalize_datetime_opt(input.starts_at)?,
            ends_at: normalize_datetime_opt(input.ends_at)?,
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        };
        validate_window(&record)?;

        self.db
            .with_connection(|conn| GoalRepository::insert(conn, &record))?;
        info!(target: "app::goals", goal_id = %record.id, "goal created");
        Ok(record)
    }

    pub fn update_goal(&self, id: &str, update: GoalUpdateInput) -> AppResult<GoalRecord> {
        let mut existing = self.get_goal(id)?;
        apply_update(&mut existing, update)?;
        existing.updated_at = Utc::now().to_rfc3339();
        validate_window(&existing)?;

        self.db
            .with_connection(|conn| GoalRepository::update(conn, &existing))?;
        info!(target: "app::goals", goal_id = %existing.id, "goal updated");
        Ok(existing)
    }

    /// Tasks pointing at the goal keep existing; their reference is cleared.
    pub fn delete_goal(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| GoalRepository::delete(conn, id))?;
        info!(target: "app::goals", goal_id = %id, "goal deleted");
        Ok(())
    }

    pub fn get_goal(&self, id: &str) -> AppResult<GoalRecord> {
        let record = self
            .db
            .with_connection(|conn| GoalRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        debug!(target: "app::goals", goal_id = %record.id, "goal fetched");
        Ok(record)
    }

    pub fn list_goals(&self, user_id: &str) -> AppResult<Vec<GoalRecord>> {
        let user_id = normalize_required(user_id, "用户标识不能为空")?;
        let goals = self
            .db
            .with_connection(|conn| GoalRepository::list_for_user(conn, &user_id))?;
        debug!(target: "app::goals", count = goals.len(), "goals listed");
        Ok(goals)
    }
}

fn apply_update(record: &mut GoalRecord, update: GoalUpdateInput) -> AppResult<()> {
    if let Some(title) = update.title {
        record.title = normalize_title(&title)?;
    }

    if let Some(description) = update.description {
        record.description = normalize_optional_string(description);
    }

    if let Some(starts_at) = update.starts_at {
        record.starts_at = normalize_datetime_opt(starts_at)?;
    }

    if let Some(ends_at) = update.ends_at {
        record.ends_at = normalize_datetime_opt(ends_at)?;
    }

    if let Some(completed) = update.completed {
        record.completed = completed;
    }

    Ok(())
}

fn validate_window(record: &GoalRecord) -> AppResult<()> {
    if let (Some(start), Some(end)) = (record.starts_at.as_ref(), record.ends_at.as_ref()) {
        let start_dt = DateTime::parse_from_rfc3339(start)
            .map_err(|_| AppError::validation("开始时间格式非法"))?;
        let end_dt = DateTime::parse_from_rfc3339(end)
            .map_err(|_| AppError::validation("结束时间格式非法"))?;
        if end_dt < start_dt {
            return Err(AppError::validation("结束时间不能早于开始时间"));
        }
    }
    Ok(())
}

fn normalize_title(title: &str) -> AppResult<String> {
    let trimmed = title.trim();
    if trimmed.chars().count() < 3 {
        return Err(AppError::validation("标题至少需要 3 个字符"));
    }
    if trimmed.chars().count() > 160 {
        return Err(AppError::validation("标题长度需在 160 字以内"));
    }
    Ok(trimmed.to_string())
}

fn normalize_required(value: &str, message: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
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
