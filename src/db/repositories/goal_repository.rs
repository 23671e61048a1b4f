use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::goal::GoalRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        title,
        description,
        starts_at,
        ends_at,
        completed,
        created_at,
        updated_at
    FROM goals
"#;

impl TryFrom<&Row<'_>> for GoalRecord {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            starts_at: row.get("starts_at")?,
            ends_at: row.get("ends_at")?,
            completed: row.get::<_, i64>("completed")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct GoalRepository;

impl GoalRepository {
    pub fn insert(conn: &Connection, record: &GoalRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO goals (
                    id,
                    user_id,
                    title,
                    description,
                    starts_at,
                    ends_at,
                    completed,
                    created_at,
                    updated_at
                ) VALUES (
                    :id,
                    :user_id,
                    :title,
                    :description,
                    :starts_at,
                    :ends_at,
                    :completed,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":id": &record.id,
                ":user_id": &record.user_id,
                ":title": &record.title,
                ":description": &record.description,
                ":starts_at": &record.starts_at,
                ":ends_at": &record.ends_at,
                ":completed": record.completed as i64,
                ":created_at": &record.created_at,
                ":updated_at": &record.updated_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, record: &GoalRecord) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE goals SET
                    title = :title,
                    description = :description,
                    starts_at = :starts_at,
                    ends_at = :ends_at,
                    completed = :completed,
                    updated_at = :updated_at
                WHERE id = :id
            "#,
            named_params! {
                ":id": &record.id,
                ":title": &record.title,
                ":description": &record.description,
                ":starts_at": &record.starts_at,
                ":ends_at": &record.ends_at,
                ":completed": record.completed as i64,
                ":updated_at": &record.updated_at,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<GoalRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", BASE_SELECT))?;
        let record = stmt
            .query_row([id], |row| GoalRecord::try_from(row))
            .optional()?;
        Ok(record)
    }

    pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<GoalRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = :user_id ORDER BY created_at ASC, id ASC",
            BASE_SELECT
        ))?;
        let records = stmt
            .query_map(named_params! {":user_id": user_id}, |row| {
                GoalRecord::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
