//! Integration tests for stress-aware task ordering.

use mindtrack::app::AppState;
use mindtrack::db::DbPool;
use mindtrack::models::goal::GoalCreateInput;
use mindtrack::models::heart_metric::HeartMetricIngest;
use mindtrack::models::task::{Difficulty, TaskCreateInput};
use mindtrack::models::user::UserRegisterInput;
use mindtrack::services::task_organizer_service::OrganizeTasksInput;
use tempfile::{tempdir, TempDir};

fn setup() -> (AppState, String, TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("organizer.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let user = state
        .users()
        .register(UserRegisterInput {
            name: "Elisa".into(),
            email: "elisa@example.com".into(),
            password: "senha-de-teste".into(),
        })
        .expect("register user");

    (state, user.id, dir)
}

fn add_task(
    state: &AppState,
    user_id: &str,
    title: &str,
    priority: i64,
    difficulty: Difficulty,
    goal_id: Option<String>,
) -> String {
    state
        .tasks()
        .create_task(TaskCreateInput {
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            difficulty: Some(difficulty),
            priority: Some(priority),
            goal_id,
        })
        .expect("create task")
        .id
}

fn organize_input(user_id: &str) -> OrganizeTasksInput {
    OrganizeTasksInput {
        user_id: user_id.to_string(),
        goal_id: None,
        stress_score: None,
    }
}

#[test]
fn user_without_tasks_gets_empty_list() {
    let (state, user_id, _dir) = setup();
    let ordered = state
        .organizer()
        .organize(&organize_input(&user_id))
        .expect("organize");
    assert!(ordered.is_empty());
}

#[test]
fn orders_by_priority_then_difficulty_without_any_score() {
    let (state, user_id, _dir) = setup();

    // No stored stress score: the default applies and ordering is driven by
    // priority and difficulty alone.
    let low = add_task(&state, &user_id, "baixa prioridade", 1, Difficulty::Hard, None);
    let high = add_task(&state, &user_id, "alta prioridade", 3, Difficulty::Easy, None);
    let mid = add_task(&state, &user_id, "prioridade média", 2, Difficulty::Medium, None);

    let ordered = state
        .organizer()
        .organize(&organize_input(&user_id))
        .expect("organize");

    let ids: Vec<&str> = ordered.iter().map(|task| task.id.as_str()).collect();
    // ranks: high = 3.0, mid = 1.5, low = 0.0 (plus the same stress term)
    assert_eq!(ids, vec![high.as_str(), mid.as_str(), low.as_str()]);
}

#[test]
fn priority_dominates_difficulty_for_spec_pair() {
    let (state, user_id, _dir) = setup();

    let b = add_task(&state, &user_id, "difícil e adiável", 1, Difficulty::Hard, None);
    let a = add_task(&state, &user_id, "fácil e urgente", 3, Difficulty::Easy, None);

    for stress in [Some(0), Some(50), Some(100), None] {
        let ordered = state
            .organizer()
            .organize(&OrganizeTasksInput {
                user_id: user_id.clone(),
                goal_id: None,
                stress_score: stress,
            })
            .expect("organize");
        assert_eq!(ordered[0].id, a);
        assert_eq!(ordered[1].id, b);
    }
}

#[test]
fn stress_override_never_reorders() {
    let (state, user_id, _dir) = setup();

    add_task(&state, &user_id, "escrever resumo", 2, Difficulty::Medium, None);
    add_task(&state, &user_id, "responder e-mails", 1, Difficulty::Easy, None);
    add_task(&state, &user_id, "planejar sprint", 3, Difficulty::Hard, None);

    let calm: Vec<String> = state
        .organizer()
        .organize(&OrganizeTasksInput {
            user_id: user_id.clone(),
            goal_id: None,
            stress_score: Some(0),
        })
        .expect("organize calm")
        .into_iter()
        .map(|task| task.id)
        .collect();

    let stressed: Vec<String> = state
        .organizer()
        .organize(&OrganizeTasksInput {
            user_id: user_id.clone(),
            goal_id: None,
            stress_score: Some(100),
        })
        .expect("organize stressed")
        .into_iter()
        .map(|task| task.id)
        .collect();

    // The stress term is additive and uniform per call, so it can never
    // change relative order.
    assert_eq!(calm, stressed);
}

#[test]
fn stored_score_is_read_but_ordering_stays_deterministic() {
    let (state, user_id, _dir) = setup();

    state
        .heart_metrics()
        .ingest(HeartMetricIngest {
            user_id: user_id.clone(),
            heart_rate: 135,
            rmssd: Some(4.0),
            captured_at: None,
        })
        .expect("ingest");

    let first = add_task(&state, &user_id, "primeira tarefa", 2, Difficulty::Easy, None);
    let second = add_task(&state, &user_id, "segunda tarefa", 2, Difficulty::Hard, None);

    let ordered = state
        .organizer()
        .organize(&organize_input(&user_id))
        .expect("organize");
    let ids: Vec<&str> = ordered.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
}

#[test]
fn equal_ranks_keep_store_order() {
    let (state, user_id, _dir) = setup();

    let older = add_task(&state, &user_id, "criada primeiro", 2, Difficulty::Medium, None);
    let newer = add_task(&state, &user_id, "criada depois", 2, Difficulty::Medium, None);

    let ordered = state
        .organizer()
        .organize(&organize_input(&user_id))
        .expect("organize");
    let ids: Vec<&str> = ordered.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec![older.as_str(), newer.as_str()]);
}

#[test]
fn goal_filter_restricts_the_set() {
    let (state, user_id, _dir) = setup();

    let goal = state
        .goals()
        .create_goal(GoalCreateInput {
            user_id: user_id.clone(),
            title: "Saúde".into(),
            description: None,
            starts_at: None,
            ends_at: None,
        })
        .expect("create goal");

    let in_goal = add_task(
        &state,
        &user_id,
        "caminhar 30 minutos",
        1,
        Difficulty::Easy,
        Some(goal.id.clone()),
    );
    add_task(&state, &user_id, "fora da meta", 3, Difficulty::Easy, None);

    let ordered = state
        .organizer()
        .organize(&OrganizeTasksInput {
            user_id: user_id.clone(),
            goal_id: Some(goal.id),
            stress_score: None,
        })
        .expect("organize");

    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].id, in_goal);
}

#[test]
fn other_users_tasks_are_never_included() {
    let (state, user_id, _dir) = setup();

    let other = state
        .users()
        .register(UserRegisterInput {
            name: "Fábio".into(),
            email: "fabio@example.com".into(),
            password: "senha-do-fabio".into(),
        })
        .expect("register other user");
    add_task(&state, &other.id, "tarefa alheia", 5, Difficulty::Easy, None);

    let mine = add_task(&state, &user_id, "minha tarefa", 1, Difficulty::Easy, None);

    let ordered = state
        .organizer()
        .organize(&organize_input(&user_id))
        .expect("organize");
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].id, mine);
}
