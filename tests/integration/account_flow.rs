//! Integration tests for accounts, goals, and their cascade semantics.

use mindtrack::app::AppState;
use mindtrack::db::DbPool;
use mindtrack::error::AppError;
use mindtrack::models::goal::{GoalCreateInput, GoalUpdateInput};
use mindtrack::models::task::{Difficulty, TaskCreateInput};
use mindtrack::models::user::UserRegisterInput;
use mindtrack::utils::logger;
use tempfile::{tempdir, TempDir};

fn setup() -> (AppState, TempDir) {
    let dir = tempdir().expect("temp dir");
    logger::init_logging(&dir.path().join("logs")).expect("logging");
    let pool = DbPool::new(dir.path().join("accounts.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");
    (state, dir)
}

fn register(state: &AppState, email: &str) -> String {
    state
        .users()
        .register(UserRegisterInput {
            name: "Helena".into(),
            email: email.into(),
            password: "senha-de-teste".into(),
        })
        .expect("register user")
        .id
}

#[test]
fn register_get_and_list_users() {
    let (state, _dir) = setup();
    let id = register(&state, "helena@example.com");

    let fetched = state.users().get_user(&id).expect("get user");
    assert_eq!(fetched.email, "helena@example.com");

    let all = state.users().list_users().expect("list users");
    assert_eq!(all.len(), 1);

    assert!(matches!(
        state.users().get_user("missing"),
        Err(AppError::NotFound)
    ));
}

#[test]
fn goal_lifecycle_with_completion() {
    let (state, _dir) = setup();
    let user_id = register(&state, "goal-owner@example.com");

    let goal = state
        .goals()
        .create_goal(GoalCreateInput {
            user_id: user_id.clone(),
            title: "Dormir melhor".into(),
            description: Some("oito horas por noite".into()),
            starts_at: Some("2026-01-01T00:00:00+00:00".into()),
            ends_at: Some("2026-06-30T00:00:00+00:00".into()),
        })
        .expect("create goal");

    let done = state
        .goals()
        .update_goal(
            &goal.id,
            GoalUpdateInput {
                completed: Some(true),
                ..Default::default()
            },
        )
        .expect("complete goal");
    assert!(done.completed);

    state.goals().delete_goal(&goal.id).expect("delete goal");
    assert!(matches!(
        state.goals().get_goal(&goal.id),
        Err(AppError::NotFound)
    ));
}

#[test]
fn deleting_goal_detaches_tasks() {
    let (state, _dir) = setup();
    let user_id = register(&state, "detach@example.com");

    let goal = state
        .goals()
        .create_goal(GoalCreateInput {
            user_id: user_id.clone(),
            title: "Estudar Rust".into(),
            description: None,
            starts_at: None,
            ends_at: None,
        })
        .expect("create goal");

    let task = state
        .tasks()
        .create_task(TaskCreateInput {
            user_id: user_id.clone(),
            title: "Ler o capítulo de ownership".into(),
            description: None,
            difficulty: Some(Difficulty::Medium),
            priority: Some(2),
            goal_id: Some(goal.id.clone()),
        })
        .expect("create task");

    state.goals().delete_goal(&goal.id).expect("delete goal");

    let detached = state.tasks().get_task(&task.id).expect("task survives");
    assert_eq!(detached.goal_id, None);
}

#[test]
fn deleting_user_removes_goals_and_tasks() {
    let (state, _dir) = setup();
    let user_id = register(&state, "cascade@example.com");

    let goal = state
        .goals()
        .create_goal(GoalCreateInput {
            user_id: user_id.clone(),
            title: "Meta temporária".into(),
            description: None,
            starts_at: None,
            ends_at: None,
        })
        .expect("create goal");

    let task = state
        .tasks()
        .create_task(TaskCreateInput {
            user_id: user_id.clone(),
            title: "Tarefa temporária".into(),
            description: None,
            difficulty: None,
            priority: None,
            goal_id: Some(goal.id.clone()),
        })
        .expect("create task");

    state.users().delete_user(&user_id).expect("delete user");

    assert!(matches!(
        state.goals().get_goal(&goal.id),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state.tasks().get_task(&task.id),
        Err(AppError::NotFound)
    ));
}

#[test]
fn task_cannot_point_at_foreign_goal() {
    let (state, _dir) = setup();
    let owner = register(&state, "owner@example.com");
    let intruder = register(&state, "intruder@example.com");

    let goal = state
        .goals()
        .create_goal(GoalCreateInput {
            user_id: owner,
            title: "Meta particular".into(),
            description: None,
            starts_at: None,
            ends_at: None,
        })
        .expect("create goal");

    let result = state.tasks().create_task(TaskCreateInput {
        user_id: intruder,
        title: "Tarefa invasora".into(),
        description: None,
        difficulty: None,
        priority: None,
        goal_id: Some(goal.id),
    });
    assert!(matches!(result, Err(AppError::Validation { .. })));
}
