use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::task::{Difficulty, TaskRecord};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        goal_id,
        title,
        description,
        difficulty,
        priority,
        created_at,
        updated_at
    FROM tasks
"#;

#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: String,
    pub user_id: String,
    pub goal_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub priority: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskRow {
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            goal_id: record.goal_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            difficulty: record.difficulty.as_str().to_string(),
            priority: record.priority,
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
        }
    }

    pub fn into_record(self) -> AppResult<TaskRecord> {
        let difficulty =
            Difficulty::try_from(self.difficulty.as_str()).map_err(AppError::validation)?;

        Ok(TaskRecord {
            id: self.id,
            user_id: self.user_id,
            goal_id: self.goal_id,
            title: self.title,
            description: self.description,
            difficulty,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for TaskRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            goal_id: row.get("goal_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            difficulty: row.get("difficulty")?,
            priority: row.get("priority")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct TaskRepository;

impl TaskRepository {
    pub fn insert(conn: &Connection, row: &TaskRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO tasks (
                    id,
                    user_id,
                    goal_id,
                    title,
                    description,
                    difficulty,
                    priority,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :user_id,
                    :goal_id,
                    :title,
                    :description,
                    :difficulty,
                    :priority,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":user_id": &row.user_id,
                ":goal_id": &row.goal_id,
                ":title": &row.title,
                ":description": &row.description,
                ":difficulty": &row.difficulty,
                ":priority": &row.priority,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, row: &TaskRow) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE tasks SET
                    goal_id = :goal_id,
                    title = :title,
                    description = :description,
                    difficulty = :difficulty,
                    priority = :priority,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &row.id,
                ":goal_id": &row.goal_id,
                ":title": &row.title,
                ":description": &row.description,
                ":difficulty": &row.difficulty,
                ":priority": &row.priority,
                ":updated_at": &row.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<TaskRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([id], |row| TaskRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    /// Returns every task; ownership filtering happens in the service layer.
    pub fn list_all(conn: &Connection) -> AppResult<Vec<TaskRow>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY created_at ASC, id ASC", BASE_SELECT))?;
        let rows = stmt
            .query_map([], |row| TaskRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
