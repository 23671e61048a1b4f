use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::goal_service::GoalService;
use crate::services::heart_metric_service::HeartMetricService;
use crate::services::task_organizer_service::TaskOrganizerService;
use crate::services::task_service::TaskService;
use crate::services::user_service::UserService;

/// Composition root: every service wired over one shared pool. Request
/// handlers (HTTP, IPC, tests) talk to the services through this.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    user_service: Arc<UserService>,
    goal_service: Arc<GoalService>,
    task_service: Arc<TaskService>,
    heart_metric_service: Arc<HeartMetricService>,
    task_organizer_service: Arc<TaskOrganizerService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let user_service = Arc::new(UserService::new(db_pool.clone()));
        let goal_service = Arc::new(GoalService::new(db_pool.clone()));
        let task_service = Arc::new(TaskService::new(db_pool.clone()));
        let heart_metric_service = Arc::new(HeartMetricService::new(db_pool.clone()));
        let task_organizer_service = Arc::new(TaskOrganizerService::new(db_pool.clone()));

        Ok(Self {
            db_pool,
            user_service,
            goal_service,
            task_service,
            heart_metric_service,
            task_organizer_service,
        })
    }

    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.user_service)
    }

    pub fn goals(&self) -> Arc<GoalService> {
        Arc::clone(&self.goal_service)
    }

    pub fn tasks(&self) -> Arc<TaskService> {
        Arc::clone(&self.task_service)
    }

    pub fn heart_metrics(&self) -> Arc<HeartMetricService> {
        Arc::clone(&self.heart_metric_service)
    }

    pub fn organizer(&self) -> Arc<TaskOrganizerService> {
        Arc::clone(&self.task_organizer_service)
    }

    pub fn db_pool(&self) -> &DbPool {
        &self.db_pool
    }
}
