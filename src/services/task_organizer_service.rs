use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::repositories::stress_repository::StressRepository;
use crate::db::repositories::task_repository::TaskRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::task::TaskRecord;

/// Stress value assumed for users with no stored score: mildly low, so
/// difficult or high-priority tasks are not suppressed without data.
pub const DEFAULT_STRESS_SCORE: i64 = 30;

const PRIORITY_WEIGHT: f64 = 1.0;
const DIFFICULTY_WEIGHT: f64 = 0.5;
const STRESS_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeTasksInput {
    pub user_id: String,
    #[serde(default)]
    pub goal_id: Option<String>,
    /// Overrides the stored score when set.
    #[serde(default)]
    pub stress_score: Option<i64>,
}

/// Orders a user's tasks with a transparent heuristic: the deterministic
/// stand-in for a trained ranking model.
#[derive(Clone)]
pub struct TaskOrganizerService {
    db: DbPool,
}

impl TaskOrganizerService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Returns the user's tasks sorted by heuristic rank, highest first.
    /// A user with no matching tasks gets an empty list, not an error.
    pub fn organize(&self, input: &OrganizeTasksInput) -> AppResult<Vec<TaskRecord>> {
        let user_id = input.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("用户标识不能为空"));
        }

        let conn = self.db.get_connection()?;

        // Ownership and goal filtering happen here, not in SQL.
        let tasks = TaskRepository::list_all(&conn)?
            .into_iter()
            .map(|row| row.into_record())
            .collect::<AppResult<Vec<_>>>()?;

        let mut matching: Vec<TaskRecord> = tasks
            .into_iter()
            .filter(|task| task.user_id == user_id)
            .filter(|task| match input.goal_id.as_deref() {
                Some(goal_id) => task.goal_id.as_deref() == Some(goal_id),
                None => true,
            })
            .collect();

        if matching.is_empty() {
            debug!(target: "app::organizer", %user_id, "no tasks to organize");
            return Ok(Vec::new());
        }

        let stress_score = match input.stress_score {
            Some(value) => value,
            None => StressRepository::latest_for_user(&conn, user_id)?
                .map(|score| score.score)
                .unwrap_or(DEFAULT_STRESS_SCORE),
        };

        // The stress term is identical for every task within one call, so
        // relative order comes entirely from priority and difficulty.
        let mut ranked: Vec<(f64, TaskRecord)> = matching
            .drain(..)
            .map(|task| (heuristic_rank(&task, stress_score), task))
            .collect();

        // Stable sort: equal ranks keep store order.
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        info!(
            target: "app::organizer",
            %user_id,
            stress_score,
            count = ranked.len(),
            "tasks organized"
        );

        Ok(ranked.into_iter().map(|(_, task)| task).collect())
    }
}

fn heuristic_rank(task: &TaskRecord, stress_score: i64) -> f64 {
    PRIORITY_WEIGHT * task.priority as f64
        - DIFFICULTY_WEIGHT * task.difficulty.ordinal() as f64
        + STRESS_WEIGHT * stress_score as f64
}
