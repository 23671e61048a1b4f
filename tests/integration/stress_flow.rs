//! Integration tests for the stress ingestion pipeline:
//! sample persisted first, derived score second, weak back-reference.

use mindtrack::app::AppState;
use mindtrack::db::DbPool;
use mindtrack::error::AppError;
use mindtrack::models::heart_metric::HeartMetricIngest;
use mindtrack::models::stress::StressLevel;
use mindtrack::models::user::UserRegisterInput;
use tempfile::{tempdir, TempDir};

fn setup() -> (AppState, String, TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("stress.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let user = state
        .users()
        .register(UserRegisterInput {
            name: "Diego".into(),
            email: "diego@example.com".into(),
            password: "senha-de-teste".into(),
        })
        .expect("register user");

    (state, user.id, dir)
}

fn ingest_input(user_id: &str, heart_rate: i64, rmssd: Option<f64>) -> HeartMetricIngest {
    HeartMetricIngest {
        user_id: user_id.to_string(),
        heart_rate,
        rmssd,
        captured_at: None,
    }
}

#[test]
fn ingest_links_score_to_stored_sample() {
    let (state, user_id, _dir) = setup();

    let score = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 96, Some(20.0)))
        .expect("ingest");

    // hr_norm = 0.56, hrv_norm = 0.6, blended = 0.576 -> 58
    assert_eq!(score.score, 58);
    assert_eq!(score.level, StressLevel::Moderate);
    assert_eq!(score.user_id, user_id);

    let metric_id = score.source_metric_id.expect("source metric id");
    let metric = state
        .heart_metrics()
        .get_metric(metric_id)
        .expect("stored sample");
    assert_eq!(metric.user_id, user_id);
    assert_eq!(metric.heart_rate, 96);
    assert_eq!(metric.rmssd, Some(20.0));
    assert!(!metric.captured_at.is_empty());
}

#[test]
fn missing_hrv_scores_like_zero() {
    let (state, user_id, _dir) = setup();

    let absent = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 72, None))
        .expect("ingest without hrv");
    let zero = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 72, Some(0.0)))
        .expect("ingest with zero hrv");

    assert_eq!(absent.score, zero.score);
    assert_eq!(absent.level, zero.level);
}

#[test]
fn latest_score_is_newest_for_user() {
    let (state, user_id, _dir) = setup();

    state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 55, Some(48.0)))
        .expect("first ingest");
    let second = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 130, Some(5.0)))
        .expect("second ingest");

    let latest = state
        .heart_metrics()
        .latest_score(&user_id)
        .expect("latest score")
        .expect("score present");
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.score, second.score);

    let history = state
        .heart_metrics()
        .list_scores(&user_id, None, None)
        .expect("score history");
    assert_eq!(history.len(), 2);
}

#[test]
fn latest_score_absent_for_fresh_user() {
    let (state, user_id, _dir) = setup();
    let latest = state
        .heart_metrics()
        .latest_score(&user_id)
        .expect("latest score");
    assert!(latest.is_none());
}

#[test]
fn deleting_sample_clears_back_reference_but_keeps_score() {
    let (state, user_id, _dir) = setup();

    let score = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 110, Some(12.0)))
        .expect("ingest");
    let metric_id = score.source_metric_id.expect("source metric id");

    let conn = state.db_pool().get_connection().expect("connection");
    conn.execute("DELETE FROM heart_metrics WHERE id = ?1", [metric_id])
        .expect("delete sample");

    let survivor = state.heart_metrics().get_score(score.id).expect("score");
    assert_eq!(survivor.source_metric_id, None);
    assert_eq!(survivor.score, score.score);
}

#[test]
fn deleting_user_cascades_to_samples_and_scores() {
    let (state, user_id, _dir) = setup();

    let score = state
        .heart_metrics()
        .ingest(ingest_input(&user_id, 100, None))
        .expect("ingest");

    state.users().delete_user(&user_id).expect("delete user");

    assert!(matches!(
        state.heart_metrics().get_score(score.id),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state
            .heart_metrics()
            .get_metric(score.source_metric_id.expect("metric id")),
        Err(AppError::NotFound)
    ));
}

#[test]
fn ingest_for_unknown_user_surfaces_storage_failure() {
    let (state, _user_id, _dir) = setup();

    let result = state
        .heart_metrics()
        .ingest(ingest_input("missing-user", 90, Some(30.0)));
    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[test]
fn explicit_capture_time_is_preserved() {
    let (state, user_id, _dir) = setup();

    let input = HeartMetricIngest {
        user_id: user_id.clone(),
        heart_rate: 84,
        rmssd: Some(35.0),
        captured_at: Some("2026-03-10T08:30:00+00:00".into()),
    };
    let score = state.heart_metrics().ingest(input).expect("ingest");

    let metric = state
        .heart_metrics()
        .get_metric(score.source_metric_id.expect("metric id"))
        .expect("metric");
    assert_eq!(metric.captured_at, "2026-03-10T08:30:00+00:00");
}
