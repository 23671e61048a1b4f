use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::db::repositories::user_repository::{UserRepository, UserRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::user::{UserRecord, UserRegisterInput};
use crate::utils::crypto;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Clone)]
pub struct UserService {
    db: DbPool,
}

impl UserService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn register(&self, input: UserRegisterInput) -> AppResult<UserRecord> {
        let name = normalize_name(&input.name)?;
        let email = normalize_email(&input.email)?;

        if input.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::validation("密码至少需要 8 个字符"));
        }

        let row = UserRow {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: crypto::hash_password(&input.password)?,
            created_at: Utc::now().to_rfc3339(),
        };

        self.db.with_connection(|conn| {
            if UserRepository::find_by_email(conn, &row.email)?.is_some() {
                return Err(AppError::conflict("邮箱已被注册"));
            }
            UserRepository::insert(conn, &row)
        })?;

        info!(target: "app::users", user_id = %row.id, "user registered");
        Ok(row.into_record())
    }

    pub fn get_user(&self, id: &str) -> AppResult<UserRecord> {
        let row = self
            .db
            .with_connection(|conn| UserRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;
        debug!(target: "app::users", user_id = %row.id, "user fetched");
        Ok(row.into_record())
    }

    pub fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let rows = self.db.with_connection(|conn| UserRepository::list_all(conn))?;
        Ok(rows.into_iter().map(UserRow::into_record).collect())
    }

    /// Removes the account and, through the schema, every goal, task, sample,
    /// and score it owns.
    pub fn delete_user(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| UserRepository::delete(conn, id))?;
        info!(target: "app::users", user_id = %id, "user deleted");
        Ok(())
    }

    /// Checks an email/password pair. Returns the same validation error for
    /// an unknown email and a wrong password.
    pub fn verify_credentials(&self, email: &str, password: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email)?;

        let row = self
            .db
            .with_connection(|conn| UserRepository::find_by_email(conn, &email))?
            .ok_or_else(|| AppError::validation("邮箱或密码不正确"))?;

        if !crypto::verify_password(password, &row.password_hash)? {
            return Err(AppError::validation("邮箱或密码不正确"));
        }

        debug!(target: "app::users", user_id = %row.id, "credentials verified");
        Ok(row.into_record())
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("姓名不能为空"));
    }
    if trimmed.chars().count() > 120 {
        return Err(AppError::validation("姓名长度需在 120 字以内"));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> AppResult<String> {
    let trimmed = email.trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&trimmed) {
        return Err(AppError::validation("邮箱格式非法"));
    }
    Ok(trimmed)
}
