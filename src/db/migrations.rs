use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

pub fn run(conn: &Connection) -> AppResult<()> {
    // Ensure migration history table exists
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            1,
            "Add heart metric samples and derived stress scores",
            Some("DROP TABLE IF EXISTS stress_scores; DROP TABLE IF EXISTS heart_metrics;"),
        )?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            2,
            "Index stress scores by user and recency",
            Some("DROP INDEX IF EXISTS idx_stress_scores_user_time; DROP INDEX IF EXISTS idx_heart_metrics_user_time;"),
        )?;
    }

    debug_assert!(current_version == USER_VERSION);

    Ok(())
}

fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS heart_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            captured_at TEXT NOT NULL,
            heart_rate INTEGER NOT NULL,
            rmssd REAL
        );

        CREATE TABLE IF NOT EXISTS stress_scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            computed_at TEXT NOT NULL,
            score INTEGER NOT NULL,
            level TEXT NOT NULL,
            source_metric_id INTEGER REFERENCES heart_metrics(id) ON DELETE SET NULL
        );
        "#,
    )?;
    Ok(())
}

fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_heart_metrics_user_time
            ON heart_metrics(user_id, captured_at DESC);

        CREATE INDEX IF NOT EXISTS idx_stress_scores_user_time
            ON stress_scores(user_id, computed_at DESC);
        "#,
    )?;
    Ok(())
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO migration_history (version, description, applied_at, rollback_sql)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        rusqlite::params![version, description, Utc::now().to_rfc3339(), rollback_sql],
    )?;
    Ok(())
}
