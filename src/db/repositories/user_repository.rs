use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::user::UserRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        email,
        password_hash,
        created_at
    FROM users
"#;

/// Storage row including the credential hash; only the repository and the
/// user service ever see it.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for UserRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct UserRepository;

impl UserRepository {
    pub fn insert(conn: &Connection, row: &UserRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO users (
                    id,
                    name,
                    email,
                    password_hash,
                    created_at
                ) VALUES (
                    :id,
                    :name,
                    :email,
                    :password_hash,
                    :created_at
                )
            "#,
            named_params! {
                ":id": &row.id,
                ":name": &row.name,
                ":email": &row.email,
                ":password_hash": &row.password_hash,
                ":created_at": &row.created_at,
            },
        )?;

        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<UserRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([id], |row| UserRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<UserRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE email = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([email], |row| UserRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<UserRow>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY created_at ASC, id ASC", BASE_SELECT))?;
        let rows = stmt
            .query_map([], |row| UserRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Cascades to goals, tasks, samples, and scores via foreign keys.
    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
