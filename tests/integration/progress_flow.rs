//! Integration tests for the progress ledger: streak arithmetic, levels,
//! monthly rollups, and spend semantics against a real database.

use petpal_core::db::DbPool;
use petpal_core::error::AppError;
use petpal_core::models::progress::PetAction;
use petpal_core::services::progress_service::ProgressService;
use tempfile::{tempdir, TempDir};

const USER: &str = "user-1";

fn setup_test_env() -> (DbPool, ProgressService, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db = DbPool::new(&db_path).expect("Failed to create test database");
    let service = ProgressService::new(db.clone());

    (db, service, temp_dir)
}

#[test]
fn absent_ledger_initializes_to_zero() {
    let (_db, service, _temp_dir) = setup_test_env();

    let progress = service.progress(USER).unwrap();

    assert_eq!(progress.total_points, 0);
    assert_eq!(progress.available_points, 0);
    assert_eq!(progress.current_streak, 0);
    assert_eq!(progress.level, 1);
    assert!(progress.first_login_date.is_empty());

    // The initialized ledger is persisted, not just returned.
    let reloaded = service.progress(USER).unwrap();
    assert_eq!(reloaded, progress);
}

#[test]
fn first_completion_starts_streak_and_month() {
    let (_db, service, _temp_dir) = setup_test_env();

    let progress = service
        .record_completion_on(USER, "2024-01-01", 10, true)
        .unwrap();

    assert_eq!(progress.current_streak, 1);
    assert_eq!(progress.total_points, 11, "10 earned + streak bonus of 1");
    assert_eq!(progress.available_points, 11);
    assert_eq!(progress.tasks_completed, 1);
    assert_eq!(progress.first_login_date, "2024-01-01");
    assert_eq!(progress.last_active_date, "2024-01-01");

    let month = progress.monthly_stats.get("2024-01").expect("month entry");
    assert_eq!(month.total_points, 11);
    assert_eq!(month.tasks_completed, 1);
    assert_eq!(month.login_days, vec!["2024-01-01"]);
    assert_eq!(month.streak_days, 1);
}

#[test]
fn consecutive_day_continues_streak_with_bonus() {
    let (_db, service, _temp_dir) = setup_test_env();

    service
        .record_completion_on(USER, "2024-01-01", 10, true)
        .unwrap();
    service
        .record_completion_on(USER, "2024-01-02", 10, true)
        .unwrap();
    let progress = service
        .record_completion_on(USER, "2024-01-03", 10, true)
        .unwrap();

    assert_eq!(progress.current_streak, 3);
    assert_eq!(progress.longest_streak, 3);
    // Bonuses: 1 + 2 + 3 on top of 30 earned.
    assert_eq!(progress.total_points, 36);
}

#[test]
fn gap_resets_streak_but_longest_survives() {
    let (_db, service, _temp_dir) = setup_test_env();

    service
        .record_completion_on(USER, "2023-12-31", 10, true)
        .unwrap();
    service
        .record_completion_on(USER, "2024-01-01", 10, true)
        .unwrap();
    let progress = service
        .record_completion_on(USER, "2024-01-05", 10, true)
        .unwrap();

    assert_eq!(progress.current_streak, 1, "gap > 1 day resets the streak");
    assert_eq!(progress.longest_streak, 2, "longest streak never decreases");
}

#[test]
fn same_day_completions_earn_one_bonus() {
    let (_db, service, _temp_dir) = setup_test_env();

    service
        .record_completion_on(USER, "2024-01-01", 10, true)
        .unwrap();
    service
        .record_completion_on(USER, "2024-01-02", 10, true)
        .unwrap();
    let progress = service
        .record_completion_on(USER, "2024-01-02", 10, true)
        .unwrap();

    assert_eq!(progress.current_streak, 2, "same day leaves the streak alone");
    // 30 earned, bonus 1 on day one, bonus 2 once on day two.
    assert_eq!(progress.total_points, 33);

    let month = progress.monthly_stats.get("2024-01").expect("month entry");
    assert_eq!(
        month.login_days,
        vec!["2024-01-01", "2024-01-02"],
        "login days are a set"
    );
    assert_eq!(month.tasks_completed, 3);
}

#[test]
fn levels_follow_the_point_thresholds() {
    let (_db, service, _temp_dir) = setup_test_env();

    // 98 earned + bonus 1 = 99 total -> still level 1.
    let progress = service
        .record_completion_on(USER, "2024-01-01", 98, true)
        .unwrap();
    assert_eq!(progress.total_points, 99);
    assert_eq!(progress.level, 1);

    // One more point crosses the first threshold.
    let progress = service
        .record_completion_on(USER, "2024-01-01", 1, true)
        .unwrap();
    assert_eq!(progress.total_points, 100);
    assert_eq!(progress.level, 2);

    // Pile on points past the cap: level pins at 10.
    let progress = service
        .record_completion_on(USER, "2024-01-01", 9900, true)
        .unwrap();
    assert_eq!(progress.total_points, 10000);
    assert_eq!(progress.level, 10);
}

#[test]
fn spend_debits_available_and_credits_spent() {
    let (_db, service, _temp_dir) = setup_test_env();

    service
        .record_completion_on(USER, "2024-01-01", 99, true)
        .unwrap();

    let progress = service
        .spend_on_pet_action_on(USER, "2024-01-01", PetAction::Feed)
        .unwrap();

    assert_eq!(progress.total_points, 100, "lifetime points are untouched");
    assert_eq!(progress.available_points, 80);
    assert_eq!(progress.total_points_spent, 20);
    assert_eq!(progress.pet_interactions, 1);

    let month = progress.monthly_stats.get("2024-01").expect("month entry");
    assert_eq!(month.points_spent, 20);
}

#[test]
fn spend_beyond_balance_fails_without_mutation() {
    let (_db, service, _temp_dir) = setup_test_env();

    // 9 earned + bonus 1 = 10 available.
    service
        .record_completion_on(USER, "2024-01-01", 9, true)
        .unwrap();

    let error = service
        .spend_on_pet_action_on(USER, "2024-01-01", PetAction::Play)
        .expect_err("25-point action must be rejected");

    match error {
        AppError::InsufficientPoints {
            available,
            required,
        } => {
            assert_eq!(available, 10);
            assert_eq!(required, 25);
        }
        other => panic!("expected InsufficientPoints, got {other:?}"),
    }

    let progress = service.progress(USER).unwrap();
    assert_eq!(progress.available_points, 10, "ledger unchanged after rejection");
    assert_eq!(progress.total_points_spent, 0);
    assert_eq!(progress.pet_interactions, 0);
}

#[test]
fn additivity_invariant_holds_across_mixed_operations() {
    let (_db, service, _temp_dir) = setup_test_env();

    let days = ["2024-01-01", "2024-01-02", "2024-01-02", "2024-01-09"];
    for (i, day) in days.iter().enumerate() {
        let progress = service
            .record_completion_on(USER, day, (i as i64 + 1) * 25, true)
            .unwrap();
        assert_eq!(
            progress.available_points,
            progress.total_points - progress.total_points_spent
        );
    }

    for action in [PetAction::Feed, PetAction::Care] {
        let progress = service
            .spend_on_pet_action_on(USER, "2024-01-09", action)
            .unwrap();
        assert_eq!(
            progress.available_points,
            progress.total_points - progress.total_points_spent
        );
    }
}

#[test]
fn longest_streak_is_monotonic_across_resets() {
    let (_db, service, _temp_dir) = setup_test_env();

    let days = [
        "2024-01-01",
        "2024-01-02",
        "2024-01-03",
        "2024-01-10",
        "2024-01-11",
    ];

    let mut longest_seen = 0;
    for day in days {
        let progress = service.record_completion_on(USER, day, 5, true).unwrap();
        assert!(progress.longest_streak >= longest_seen);
        longest_seen = progress.longest_streak;
    }

    assert_eq!(longest_seen, 3);
}

#[test]
fn non_task_credit_skips_the_task_counter() {
    let (_db, service, _temp_dir) = setup_test_env();

    let progress = service
        .record_completion_on(USER, "2024-01-01", 5, false)
        .unwrap();

    assert_eq!(progress.total_points, 6);
    assert_eq!(progress.tasks_completed, 0);
    let month = progress.monthly_stats.get("2024-01").expect("month entry");
    assert_eq!(month.tasks_completed, 0);
}
