use chrono::Utc;
use tracing::{debug, info};

use crate::db::repositories::goal_repository::GoalRepository;
use crate::db::repositories::task_repository::{TaskRepository, TaskRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::task::{Difficulty, TaskCreateInput, TaskRecord, TaskUpdateInput};

#[derive(Clone)]
pub struct TaskService {
    db: DbPool,
}

impl TaskService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn create_task(&self, input: TaskCreateInput) -> AppResult<TaskRecord> {
        let now = Utc::now().to_rfc3339();
        let record = TaskRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: normalize_required(&input.user_id, "用户标识不能为空")?,
            goal_id: normalize_optional_string(input.goal_id),
            title: normalize_title(&input.title)?,
            description: normalize_optional_string(input.description),
            difficulty: input.difficulty.unwrap_or(Difficulty::Easy),
            priority: normalize_priority(input.priority)?,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = TaskRow::from_record(&record);
        self.db.with_connection(|conn| {
            check_goal_owner(conn, record.goal_id.as_deref(), &record.user_id)?;
            TaskRepository::insert(conn, &row)
        })?;
        info!(target: "app::tasks", task_id = %record.id, "task created");
        Ok(record)
    }

    pub fn update_task(&self, id: &str, update: TaskUpdateInput) -> AppResult<TaskRecord> {
        let mut existing = self.get_task(id)?;
        apply_update(&mut existing, update)?;
        existing.updated_at = Utc::now().to_rfc3339();

        let row = TaskRow::from_record(&existing);
        self.db.with_connection(|conn| {
            check_goal_owner(conn, existing.goal_id.as_deref(), &existing.user_id)?;
            TaskRepository::update(conn, &row)
        })?;
        info!(target: "app::tasks", task_id = %existing.id, "task updated");
        Ok(existing)
    }

    pub fn delete_task(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| TaskRepository::delete(conn, id))?;
        info!(target: "app::tasks", task_id = %id, "task deleted");
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> AppResult<TaskRecord> {
        let row = self
            .db
            .with_connection(|conn| TaskRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        let record = row.into_record()?;
        debug!(target: "app::tasks", task_id = %record.id, "task fetched");
        Ok(record)
    }

    pub fn list_tasks(&self) -> AppResult<Vec<TaskRecord>> {
        let rows = self
            .db
            .with_connection(|conn| TaskRepository::list_all(conn))?;
        let tasks = rows
            .into_iter()
            .map(|row| row.into_record())
            .collect::<AppResult<Vec<_>>>()?;
        debug!(target: "app::tasks", count = tasks.len(), "tasks listed");
        Ok(tasks)
    }
}

fn apply_update(record: &mut TaskRecord, update: TaskUpdateInput) -> AppResult<()> {
    if let Some(title) = update.title {
        record.title = normalize_title(&title)?;
    }

    if let Some(description) = update.description {
        record.description = normalize_optional_string(description);
    }

    if let Some(difficulty) = update.difficulty {
        record.difficulty = difficulty;
    }

    if let Some(priority) = update.priority {
        record.priority = normalize_priority(Some(priority))?;
    }

    if let Some(goal_id) = update.goal_id {
        record.goal_id = normalize_optional_string(goal_id);
    }

    Ok(())
}

fn check_goal_owner(
    conn: &rusqlite::Connection,
    goal_id: Option<&str>,
    user_id: &str,
) -> AppResult<()> {
    if let Some(goal_id) = goal_id {
        let goal = GoalRepository::find_by_id(conn, goal_id)?
            .ok_or_else(|| AppError::validation("关联的目标不存在"))?;
        if goal.user_id != user_id {
            return Err(AppError::validation("目标属于其他用户"));
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

fn normalize_priority(priority: Option<i64>) -> AppResult<i64> {
    let value = priority.unwrap_or(1);
    if value < 1 {
        return Err(AppError::validation("优先级需不小于 1"));
    }
    Ok(value)
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
