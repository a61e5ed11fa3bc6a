//! Integration tests for the read-side aggregations: calendar view,
//! filtered task history, monthly stats, and diary statistics.

use petpal_core::db::repositories::task_repository::TaskRepository;
use petpal_core::db::DbPool;
use petpal_core::models::catalog::{TaskCategory, TaskDifficulty, TaskType};
use petpal_core::models::diary::{DiaryEntryInput, DiaryFilter, DiarySortOption};
use petpal_core::models::history::TaskHistoryFilter;
use petpal_core::models::questionnaire::CheckinInput;
use petpal_core::models::task::{DailyTask, TaskCompletionUpdate};
use petpal_core::services::checkin_service::CheckinService;
use petpal_core::services::diary_service::DiaryService;
use petpal_core::services::history_service::{HistoryService, HISTORY_RESULT_LIMIT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::{tempdir, TempDir};

const USER: &str = "user-1";

fn setup_test_env() -> (DbPool, HistoryService, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db = DbPool::new(&db_path).expect("Failed to create test database");
    let history_service = HistoryService::new(db.clone());

    (db, history_service, temp_dir)
}

fn make_task(
    date: &str,
    category: TaskCategory,
    template_id: &str,
    points: i64,
    emotions: &[&str],
) -> DailyTask {
    DailyTask {
        id: DailyTask::instance_id(USER, category, template_id, date, None),
        user_id: USER.to_string(),
        template_id: template_id.to_string(),
        title: format!("Task {template_id}"),
        description: String::new(),
        task_type: TaskType::Text,
        category,
        points,
        difficulty: TaskDifficulty::Easy,
        date: date.to_string(),
        completed: false,
        completed_at: 0,
        created_at: 1,
        user_response: String::new(),
        photo_path: String::new(),
        questionnaire_id: String::new(),
        triggering_emotion_names: emotions.iter().map(|e| e.to_string()).collect(),
        questionnaire_memo: String::new(),
        questionnaire_relations: Vec::new(),
    }
}

/// Persists one (date, category) batch and completes every task in it.
fn save_completed(db: &DbPool, tasks: Vec<DailyTask>, completed_at: i64) {
    let mut conn = db.get_connection().unwrap();
    assert!(TaskRepository::save_if_absent(&mut conn, &tasks).unwrap());

    for task in &tasks {
        let outcome = TaskRepository::complete_task(
            &conn,
            &task.id,
            &TaskCompletionUpdate {
                completed_at,
                user_response: String::new(),
                photo_path: String::new(),
            },
        )
        .unwrap();
        assert!(outcome.first_completion);
    }
}

#[test]
fn calendar_view_folds_tasks_and_checkins_by_day() {
    let (db, history_service, _temp_dir) = setup_test_env();

    save_completed(
        &db,
        vec![make_task(
            "2024-03-05",
            TaskCategory::DailyRoutine,
            "hydrate",
            10,
            &[],
        )],
        1_709_640_000_000,
    );
    save_completed(
        &db,
        vec![make_task(
            "2024-03-05",
            TaskCategory::QuestionnaireBased,
            "share_joy",
            15,
            &["Happy"],
        )],
        1_709_641_000_000,
    );

    // A check-in with no completed tasks still counts as a login day.
    let checkin_service = CheckinService::new(db.clone());
    let mut rng = StdRng::seed_from_u64(5);
    checkin_service
        .submit_checkin_on(
            USER,
            "2024-03-07",
            CheckinInput {
                emotion_ids: vec!["curious".to_string()],
                relation_ids: Vec::new(),
                memo: String::new(),
            },
            &mut rng,
        )
        .unwrap();

    let days = history_service.monthly_progress(USER, "2024-03").unwrap();

    let busy_day = days.get("2024-03-05").expect("task day present");
    assert!(busy_day.has_login);
    assert_eq!(busy_day.points_earned, 25);
    assert_eq!(busy_day.tasks_completed, 2);
    assert_eq!(busy_day.daily_tasks_completed, 1);
    assert_eq!(busy_day.questionnaire_tasks_completed, 1);
    assert!(!busy_day.check_in_completed);

    let checkin_day = days.get("2024-03-07").expect("check-in day present");
    assert!(checkin_day.has_login);
    assert!(checkin_day.check_in_completed);
    assert_eq!(checkin_day.tasks_completed, 0);
    assert_eq!(checkin_day.points_earned, 0);

    // Days outside the month never leak in.
    assert!(days.keys().all(|date| date.starts_with("2024-03")));
}

#[test]
fn task_history_filters_by_range_points_and_emotion() {
    let (db, history_service, _temp_dir) = setup_test_env();

    save_completed(
        &db,
        vec![make_task(
            "2024-03-01",
            TaskCategory::QuestionnaireBased,
            "breathing_exercise",
            10,
            &["Sad"],
        )],
        100,
    );
    save_completed(
        &db,
        vec![make_task(
            "2024-03-02",
            TaskCategory::QuestionnaireBased,
            "emotion_processing",
            35,
            &["Sad", "Tired"],
        )],
        200,
    );
    save_completed(
        &db,
        vec![make_task(
            "2024-03-03",
            TaskCategory::QuestionnaireBased,
            "share_joy",
            25,
            &["Happy"],
        )],
        300,
    );
    // Routine tasks never show up in questionnaire history.
    save_completed(
        &db,
        vec![make_task(
            "2024-03-03",
            TaskCategory::DailyRoutine,
            "hydrate",
            5,
            &[],
        )],
        400,
    );

    let everything = history_service
        .questionnaire_task_history(USER, &TaskHistoryFilter::default(), HISTORY_RESULT_LIMIT)
        .unwrap();
    assert_eq!(everything.len(), 3);
    assert_eq!(
        everything[0].completion_date, "2024-03-03",
        "newest completion first"
    );

    let sad_only = history_service
        .questionnaire_task_history(
            USER,
            &TaskHistoryFilter {
                emotions: vec!["Sad".to_string()],
                ..TaskHistoryFilter::default()
            },
            HISTORY_RESULT_LIMIT,
        )
        .unwrap();
    assert_eq!(sad_only.len(), 2);

    let ranged = history_service
        .questionnaire_task_history(
            USER,
            &TaskHistoryFilter {
                start_date: "2024-03-02".to_string(),
                end_date: "2024-03-02".to_string(),
                min_points: 20,
                ..TaskHistoryFilter::default()
            },
            HISTORY_RESULT_LIMIT,
        )
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].points_earned, 35);

    let capped = history_service
        .questionnaire_task_history(USER, &TaskHistoryFilter::default(), 2)
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[test]
fn monthly_stats_rank_triggering_emotions() {
    let (db, history_service, _temp_dir) = setup_test_env();

    save_completed(
        &db,
        vec![
            make_task(
                "2024-03-01",
                TaskCategory::QuestionnaireBased,
                "breathing_exercise",
                10,
                &["Sad", "Tired"],
            ),
        ],
        100,
    );
    save_completed(
        &db,
        vec![make_task(
            "2024-03-02",
            TaskCategory::QuestionnaireBased,
            "self_compassion",
            30,
            &["Sad"],
        )],
        200,
    );
    save_completed(
        &db,
        vec![make_task(
            "2024-03-02",
            TaskCategory::DailyRoutine,
            "hydrate",
            5,
            &[],
        )],
        300,
    );
    // April activity stays out of the March aggregate.
    save_completed(
        &db,
        vec![make_task(
            "2024-04-01",
            TaskCategory::QuestionnaireBased,
            "share_joy",
            25,
            &["Happy"],
        )],
        400,
    );

    let stats = history_service.task_history_stats(USER, "2024-03").unwrap();

    assert_eq!(stats.month, "2024-03");
    assert_eq!(stats.total_tasks_completed, 3);
    assert_eq!(stats.total_points, 45);
    assert_eq!(stats.questionnaire_tasks_completed, 2);
    assert_eq!(stats.daily_tasks_completed, 1);
    assert_eq!(stats.active_days, 2);
    assert_eq!(stats.top_emotions[0].name, "Sad");
    assert_eq!(stats.top_emotions[0].count, 2);
    assert_eq!(stats.top_emotions[1].name, "Tired");
    assert_eq!(stats.top_emotions[1].count, 1);
}

#[test]
fn diary_entries_keep_one_record_per_day() {
    let (db, _history_service, _temp_dir) = setup_test_env();
    let diary_service = DiaryService::new(db.clone());

    let first = diary_service
        .save_entry(
            USER,
            DiaryEntryInput {
                date: "2024-03-05".to_string(),
                title: "Morning".to_string(),
                content: "slow start but a good walk".to_string(),
                mood: "Okay".to_string(),
                mood_emoji: "😐".to_string(),
                tags: vec!["walk".to_string()],
            },
        )
        .unwrap();

    assert_eq!(first.id, "user-1_diary_2024-03-05");
    assert_eq!(first.word_count, 6);

    // Saving the same day overwrites content but keeps the creation instant.
    let updated = diary_service
        .save_entry(
            USER,
            DiaryEntryInput {
                date: "2024-03-05".to_string(),
                title: "Evening".to_string(),
                content: "one two three".to_string(),
                mood: "Happy".to_string(),
                mood_emoji: "😊".to_string(),
                tags: Vec::new(),
            },
        )
        .unwrap();

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.word_count, 3);
    assert_eq!(updated.created_at, first.created_at);

    let stored = diary_service.entry(USER, "2024-03-05").unwrap().unwrap();
    assert_eq!(stored.title, "Evening");

    diary_service.delete_entry(&stored.id).unwrap();
    assert!(diary_service.entry(USER, "2024-03-05").unwrap().is_none());
}

#[test]
fn diary_filters_and_sorting() {
    let (db, _history_service, _temp_dir) = setup_test_env();
    let diary_service = DiaryService::new(db.clone());

    let entries = [
        ("2024-03-01", "rainy walk home", "Sad", vec!["walk"]),
        ("2024-03-02", "sunny afternoon", "Happy", vec!["sun"]),
        ("2024-03-03", "long walk in the rain again", "Sad", vec!["walk"]),
    ];

    for (date, content, mood, tags) in entries {
        diary_service
            .save_entry(
                USER,
                DiaryEntryInput {
                    date: date.to_string(),
                    title: format!("Entry {date}"),
                    content: content.to_string(),
                    mood: mood.to_string(),
                    mood_emoji: String::new(),
                    tags: tags.into_iter().map(|t| t.to_string()).collect(),
                },
            )
            .unwrap();
    }

    let sad_rain = diary_service
        .entries(
            USER,
            &DiaryFilter {
                mood: "Sad".to_string(),
                search_text: "rain".to_string(),
                sort_by: DiarySortOption::WordCountDesc,
                ..DiaryFilter::default()
            },
        )
        .unwrap();

    assert_eq!(sad_rain.len(), 2);
    assert_eq!(sad_rain[0].date, "2024-03-03");

    let tagged = diary_service
        .entries(
            USER,
            &DiaryFilter {
                tags: vec!["sun".to_string()],
                ..DiaryFilter::default()
            },
        )
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].date, "2024-03-02");
}

#[test]
fn diary_stats_walk_the_streak_backwards() {
    let (db, _history_service, _temp_dir) = setup_test_env();
    let diary_service = DiaryService::new(db.clone());

    for date in ["2024-03-01", "2024-03-03", "2024-03-04", "2024-03-05"] {
        diary_service
            .save_entry(
                USER,
                DiaryEntryInput {
                    date: date.to_string(),
                    title: String::new(),
                    content: "some words for today".to_string(),
                    mood: "Happy".to_string(),
                    mood_emoji: String::new(),
                    tags: Vec::new(),
                },
            )
            .unwrap();
    }

    let stats = diary_service.stats_on(USER, "2024-03-05").unwrap();

    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.total_words, 16);
    assert_eq!(stats.average_words_per_entry, 4);
    assert_eq!(stats.longest_entry, 4);
    assert_eq!(stats.active_days, 4);
    assert_eq!(stats.current_streak, 3, "gap on 2024-03-02 ends the walk");
    assert_eq!(stats.most_common_mood, "Happy");
    assert_eq!(stats.entries_by_month.get("2024-03"), Some(&4));
}
