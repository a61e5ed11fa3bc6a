//! Integration tests for the daily check-in flow: catalog seeding,
//! idempotent task generation, and the task-completion → ledger path.

use std::sync::Arc;

use petpal_core::db::repositories::task_repository::TaskRepository;
use petpal_core::db::DbPool;
use petpal_core::error::AppError;
use petpal_core::models::catalog::TaskCategory;
use petpal_core::models::questionnaire::CheckinInput;
use petpal_core::services::checkin_service::CheckinService;
use petpal_core::services::progress_service::ProgressService;
use petpal_core::services::task_service::TaskService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::{tempdir, TempDir};

const USER: &str = "user-1";
const DATE: &str = "2024-03-05";

fn setup_test_env() -> (DbPool, CheckinService, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db = DbPool::new(&db_path).expect("Failed to create test database");
    let checkin_service = CheckinService::new(db.clone());

    (db, checkin_service, temp_dir)
}

fn checkin_input(emotions: &[&str]) -> CheckinInput {
    CheckinInput {
        emotion_ids: emotions.iter().map(|e| e.to_string()).collect(),
        relation_ids: vec!["work_school".to_string()],
        memo: "rough morning".to_string(),
    }
}

#[test]
fn seeded_catalogs_are_available() {
    let (_db, checkin_service, _temp_dir) = setup_test_env();

    let emotions = checkin_service.active_emotions().unwrap();
    let relations = checkin_service.active_relations().unwrap();

    assert_eq!(emotions.len(), 20, "all seeded emotions should be active");
    assert_eq!(relations.len(), 10, "all seeded relations should be active");
    assert!(emotions.iter().any(|e| e.id == "sad"));
    assert!(relations.iter().any(|r| r.id == "work_school"));

    // Sorted by category then name, the way the check-in screen lists them.
    let categories: Vec<&str> = emotions.iter().map(|e| e.category.as_str()).collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
}

#[test]
fn routine_generation_is_idempotent_per_day() {
    let (db, checkin_service, _temp_dir) = setup_test_env();

    let created = checkin_service.ensure_routine_tasks_on(USER, DATE).unwrap();
    assert_eq!(created, 5, "one task per seeded routine template");

    let again = checkin_service.ensure_routine_tasks_on(USER, DATE).unwrap();
    assert_eq!(again, 0, "second generation must be a no-op");

    let conn = db.get_connection().unwrap();
    let count = TaskRepository::count_for(&conn, USER, DATE, TaskCategory::DailyRoutine).unwrap();
    assert_eq!(count, 5, "no duplicate routine tasks persisted");

    // A different day generates its own set.
    let next_day = checkin_service
        .ensure_routine_tasks_on(USER, "2024-03-06")
        .unwrap();
    assert_eq!(next_day, 5);
}

#[test]
fn checkin_generates_personalized_tasks_once() {
    let (db, checkin_service, _temp_dir) = setup_test_env();
    let mut rng = StdRng::seed_from_u64(7);

    let outcome = checkin_service
        .submit_checkin_on(USER, DATE, checkin_input(&["sad", "anxious"]), &mut rng)
        .unwrap();

    assert!(outcome.tasks_created > 0 && outcome.tasks_created <= 3);
    assert!(outcome.questionnaire.completed);
    assert_eq!(outcome.questionnaire.id, "user-1_2024-03-05");
    assert_eq!(
        outcome.questionnaire.selected_emotion_names,
        vec!["Sad", "Anxious"]
    );
    assert_eq!(
        outcome.questionnaire.selected_relation_names,
        vec!["Work/School"]
    );

    let conn = db.get_connection().unwrap();
    let tasks = TaskRepository::tasks_for_date(&conn, USER, DATE).unwrap();
    assert_eq!(tasks.len(), outcome.tasks_created);

    for task in &tasks {
        assert_eq!(task.category, TaskCategory::QuestionnaireBased);
        assert_eq!(task.questionnaire_id, outcome.questionnaire.id);
        assert_eq!(task.triggering_emotion_names, vec!["Sad", "Anxious"]);
        assert_eq!(task.questionnaire_memo, "rough morning");
        assert_eq!(task.questionnaire_relations, vec!["Work/School"]);
        assert!(!task.completed);
    }
}

#[test]
fn second_checkin_same_day_is_rejected() {
    let (_db, checkin_service, _temp_dir) = setup_test_env();
    let mut rng = StdRng::seed_from_u64(7);

    checkin_service
        .submit_checkin_on(USER, DATE, checkin_input(&["sad"]), &mut rng)
        .unwrap();

    let error = checkin_service
        .submit_checkin_on(USER, DATE, checkin_input(&["happy"]), &mut rng)
        .expect_err("second check-in must be rejected");

    assert!(
        matches!(error, AppError::Conflict { .. }),
        "expected conflict, got {error:?}"
    );
}

#[test]
fn duplicate_task_batches_are_skipped_at_the_store() {
    let (db, checkin_service, _temp_dir) = setup_test_env();

    checkin_service.ensure_routine_tasks_on(USER, DATE).unwrap();

    let mut conn = db.get_connection().unwrap();
    let tasks = TaskRepository::tasks_for_date(&conn, USER, DATE).unwrap();

    // Replaying the exact same batch reports success without mutating.
    let saved = TaskRepository::save_if_absent(&mut conn, &tasks).unwrap();
    assert!(!saved, "replayed batch must be skipped");

    let count = TaskRepository::count_for(&conn, USER, DATE, TaskCategory::DailyRoutine).unwrap();
    assert_eq!(count, 5);
}

#[test]
fn completing_a_task_credits_the_ledger_exactly_once() {
    let (db, checkin_service, _temp_dir) = setup_test_env();

    let progress_service = Arc::new(ProgressService::new(db.clone()));
    let task_service = TaskService::new(db.clone(), Arc::clone(&progress_service));

    // Generate for today so completion and ledger share the date.
    let created = checkin_service.ensure_routine_tasks(USER).unwrap();
    assert_eq!(created, 5);

    let tasks = task_service.todays_tasks(USER).unwrap();
    let task = tasks.first().expect("routine task exists");

    let result = task_service.complete_task(&task.id, "", "").unwrap();
    assert!(result.first_completion);
    assert_eq!(result.points_awarded, task.points);

    let progress = result.progress.expect("ledger update returned");
    // First activity of the day earns the streak bonus of min(1, 10).
    assert_eq!(progress.total_points, task.points + 1);
    assert_eq!(progress.tasks_completed, 1);

    // Completing again must not double-award.
    let replay = task_service.complete_task(&task.id, "", "").unwrap();
    assert!(!replay.first_completion);
    assert_eq!(replay.points_awarded, 0);
    assert!(replay.progress.is_none());

    let ledger = progress_service.progress(USER).unwrap();
    assert_eq!(ledger.total_points, task.points + 1);
    assert_eq!(ledger.tasks_completed, 1);
}

#[test]
fn completion_patch_keeps_response_and_photo() {
    let (db, checkin_service, _temp_dir) = setup_test_env();
    let mut rng = StdRng::seed_from_u64(11);

    checkin_service
        .submit_checkin_on(USER, DATE, checkin_input(&["sad"]), &mut rng)
        .unwrap();

    let progress_service = Arc::new(ProgressService::new(db.clone()));
    let task_service = TaskService::new(db.clone(), progress_service);

    let conn = db.get_connection().unwrap();
    let tasks = TaskRepository::tasks_for_date(&conn, USER, DATE).unwrap();
    let task = tasks.first().expect("questionnaire task exists");

    let result = task_service
        .complete_task(&task.id, "wrote three sentences", "photos/2024-03-05.jpg")
        .unwrap();

    assert!(result.task.completed);
    assert!(result.task.completed_at > 0);
    assert_eq!(result.task.user_response, "wrote three sentences");
    assert_eq!(result.task.photo_path, "photos/2024-03-05.jpg");
}
