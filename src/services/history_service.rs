use std::collections::BTreeMap;

use tracing::debug;

use crate::db::repositories::questionnaire_repository::QuestionnaireRepository;
use crate::db::repositories::task_repository::TaskRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::catalog::TaskCategory;
use crate::models::history::{
    DailyProgress, EmotionCount, TaskHistoryFilter, TaskHistoryItem, TaskHistoryStats,
};
use crate::models::questionnaire::DailyQuestionnaire;
use crate::models::task::DailyTask;
use crate::utils::dates::format_time_of_day;

pub const HISTORY_RESULT_LIMIT: usize = 50;
const TOP_EMOTION_LIMIT: usize = 5;

/// Read-side folds over the task/questionnaire log. Nothing here mutates
/// state; each query loads the relevant slice of the log and folds it in
/// memory.
pub struct HistoryService {
    db: DbPool,
}

impl HistoryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Calendar view for a `yyyy-MM` month: per-day activity aggregates.
    pub fn monthly_progress(
        &self,
        user_id: &str,
        month: &str,
    ) -> AppResult<BTreeMap<String, DailyProgress>> {
        let conn = self.db.get_connection()?;

        let tasks = TaskRepository::completed_tasks_in_month(&conn, user_id, month)?;
        let questionnaires = QuestionnaireRepository::completed_in_month(&conn, user_id, month)?;

        let progress = fold_monthly_progress(&tasks, &questionnaires);

        debug!(
            target: "app::history",
            user_id,
            month,
            active_days = progress.len(),
            "monthly progress computed"
        );

        Ok(progress)
    }

    /// Completed questionnaire-based tasks, filtered and newest first.
    pub fn questionnaire_task_history(
        &self,
        user_id: &str,
        filter: &TaskHistoryFilter,
        limit: usize,
    ) -> AppResult<Vec<TaskHistoryItem>> {
        let conn = self.db.get_connection()?;
        let tasks = TaskRepository::completed_tasks(&conn, user_id)?;

        Ok(filter_history(tasks, filter, limit))
    }

    /// Monthly aggregate over completed tasks, including the top-5 emotion
    /// ranking across questionnaire tasks.
    pub fn task_history_stats(&self, user_id: &str, month: &str) -> AppResult<TaskHistoryStats> {
        let conn = self.db.get_connection()?;
        let tasks = TaskRepository::completed_tasks_in_month(&conn, user_id, month)?;

        Ok(fold_history_stats(month, &tasks))
    }
}

fn fold_monthly_progress(
    tasks: &[DailyTask],
    questionnaires: &[DailyQuestionnaire],
) -> BTreeMap<String, DailyProgress> {
    let mut days: BTreeMap<String, DailyProgress> = BTreeMap::new();

    for task in tasks {
        let day = days
            .entry(task.date.clone())
            .or_insert_with(|| DailyProgress::new(&task.date));
        day.points_earned += task.points;
        day.tasks_completed += 1;
        match task.category {
            TaskCategory::DailyRoutine => day.daily_tasks_completed += 1,
            TaskCategory::QuestionnaireBased => day.questionnaire_tasks_completed += 1,
        }
    }

    for questionnaire in questionnaires {
        let day = days
            .entry(questionnaire.date.clone())
            .or_insert_with(|| DailyProgress::new(&questionnaire.date));
        day.check_in_completed = true;
    }

    for day in days.values_mut() {
        day.has_login = day.check_in_completed || day.tasks_completed > 0;
    }

    days
}

fn filter_history(
    tasks: Vec<DailyTask>,
    filter: &TaskHistoryFilter,
    limit: usize,
) -> Vec<TaskHistoryItem> {
    let mut items: Vec<TaskHistoryItem> = tasks
        .into_iter()
        .filter(|task| task.completed && task.category == TaskCategory::QuestionnaireBased)
        .filter(|task| filter.start_date.is_empty() || task.date >= filter.start_date)
        .filter(|task| filter.end_date.is_empty() || task.date <= filter.end_date)
        .filter(|task| task.points >= filter.min_points && task.points <= filter.max_points)
        .filter(|task| {
            filter.emotions.is_empty()
                || task
                    .triggering_emotion_names
                    .iter()
                    .any(|name| filter.emotions.contains(name))
        })
        .map(|task| TaskHistoryItem {
            completion_date: task.date.clone(),
            points_earned: task.points,
            completion_time: format_time_of_day(task.completed_at),
            task,
        })
        .collect();

    items.sort_by(|a, b| {
        b.completion_date
            .cmp(&a.completion_date)
            .then(b.task.completed_at.cmp(&a.task.completed_at))
    });
    items.truncate(limit);

    items
}

fn fold_history_stats(month: &str, tasks: &[DailyTask]) -> TaskHistoryStats {
    let mut stats = TaskHistoryStats::empty(month);
    // Insertion-ordered counting keeps the first-seen emotion ahead on ties.
    let mut emotion_counts: Vec<(String, i64)> = Vec::new();
    let mut completion_days: Vec<&str> = Vec::new();

    for task in tasks {
        if !task.completed {
            continue;
        }

        stats.total_tasks_completed += 1;
        stats.total_points += task.points;
        if !completion_days.contains(&task.date.as_str()) {
            completion_days.push(&task.date);
        }

        match task.category {
            TaskCategory::QuestionnaireBased => {
                stats.questionnaire_tasks_completed += 1;
                for emotion in &task.triggering_emotion_names {
                    match emotion_counts.iter_mut().find(|(name, _)| name == emotion) {
                        Some((_, count)) => *count += 1,
                        None => emotion_counts.push((emotion.clone(), 1)),
                    }
                }
            }
            TaskCategory::DailyRoutine => stats.daily_tasks_completed += 1,
        }
    }

    stats.active_days = completion_days.len() as i64;

    emotion_counts.sort_by(|a, b| b.1.cmp(&a.1));
    stats.top_emotions = emotion_counts
        .into_iter()
        .take(TOP_EMOTION_LIMIT)
        .map(|(name, count)| EmotionCount { name, count })
        .collect();

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{TaskDifficulty, TaskType};

    fn task(
        date: &str,
        category: TaskCategory,
        points: i64,
        completed_at: i64,
        emotions: &[&str],
    ) -> DailyTask {
        DailyTask {
            id: format!("user-1_{}_{date}_{completed_at}", category.id_segment()),
            user_id: "user-1".to_string(),
            template_id: "tmpl".to_string(),
            title: "Task".to_string(),
            description: String::new(),
            task_type: TaskType::Text,
            category,
            points,
            difficulty: TaskDifficulty::Easy,
            date: date.to_string(),
            completed: true,
            completed_at,
            created_at: 0,
            user_response: String::new(),
            photo_path: String::new(),
            questionnaire_id: String::new(),
            triggering_emotion_names: emotions.iter().map(|e| e.to_string()).collect(),
            questionnaire_memo: String::new(),
            questionnaire_relations: Vec::new(),
        }
    }

    fn questionnaire(date: &str) -> DailyQuestionnaire {
        DailyQuestionnaire {
            id: format!("user-1_{date}"),
            user_id: "user-1".to_string(),
            date: date.to_string(),
            created_at: 0,
            selected_emotions: Vec::new(),
            selected_emotion_names: Vec::new(),
            selected_relations: Vec::new(),
            selected_relation_names: Vec::new(),
            memo: String::new(),
            completed: true,
            completed_at: 1,
        }
    }

    #[test]
    fn calendar_fold_aggregates_one_day() {
        let tasks = vec![
            task("2024-03-05", TaskCategory::DailyRoutine, 10, 1, &[]),
            task("2024-03-05", TaskCategory::QuestionnaireBased, 15, 2, &["Sad"]),
        ];

        let days = fold_monthly_progress(&tasks, &[]);

        let day = days.get("2024-03-05").expect("day present");
        assert!(day.has_login);
        assert_eq!(day.points_earned, 25);
        assert_eq!(day.tasks_completed, 2);
        assert_eq!(day.daily_tasks_completed, 1);
        assert_eq!(day.questionnaire_tasks_completed, 1);
        assert!(!day.check_in_completed);
    }

    #[test]
    fn questionnaire_only_day_counts_as_login() {
        let days = fold_monthly_progress(&[], &[questionnaire("2024-03-07")]);

        let day = days.get("2024-03-07").expect("day present");
        assert!(day.has_login);
        assert!(day.check_in_completed);
        assert_eq!(day.tasks_completed, 0);
        assert_eq!(day.points_earned, 0);
    }

    #[test]
    fn history_filter_applies_all_constraints() {
        let tasks = vec![
            task("2024-03-01", TaskCategory::QuestionnaireBased, 10, 5, &["Sad"]),
            task("2024-03-02", TaskCategory::QuestionnaireBased, 40, 6, &["Happy"]),
            task("2024-03-03", TaskCategory::QuestionnaireBased, 20, 7, &["Sad"]),
            task("2024-03-03", TaskCategory::DailyRoutine, 20, 8, &[]),
            task("2024-04-01", TaskCategory::QuestionnaireBased, 20, 9, &["Sad"]),
        ];

        let filter = TaskHistoryFilter {
            start_date: "2024-03-01".to_string(),
            end_date: "2024-03-31".to_string(),
            emotions: vec!["Sad".to_string()],
            min_points: 15,
            max_points: 30,
        };

        let items = filter_history(tasks, &filter, HISTORY_RESULT_LIMIT);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].completion_date, "2024-03-03");
        assert_eq!(items[0].points_earned, 20);
    }

    #[test]
    fn history_sorts_newest_first_then_by_completion_instant() {
        let tasks = vec![
            task("2024-03-01", TaskCategory::QuestionnaireBased, 10, 5, &[]),
            task("2024-03-02", TaskCategory::QuestionnaireBased, 10, 9, &[]),
            task("2024-03-02", TaskCategory::QuestionnaireBased, 10, 3, &[]),
        ];

        let items = filter_history(tasks, &TaskHistoryFilter::default(), HISTORY_RESULT_LIMIT);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].completion_date, "2024-03-02");
        assert_eq!(items[0].task.completed_at, 9);
        assert_eq!(items[1].task.completed_at, 3);
        assert_eq!(items[2].completion_date, "2024-03-01");
    }

    #[test]
    fn history_respects_the_result_limit() {
        let tasks: Vec<DailyTask> = (0..10)
            .map(|i| task("2024-03-01", TaskCategory::QuestionnaireBased, 10, i, &[]))
            .collect();

        let items = filter_history(tasks, &TaskHistoryFilter::default(), 4);

        assert_eq!(items.len(), 4);
    }

    #[test]
    fn stats_fold_counts_categories_days_and_emotions() {
        let tasks = vec![
            task("2024-03-01", TaskCategory::QuestionnaireBased, 10, 1, &["Sad", "Tired"]),
            task("2024-03-01", TaskCategory::QuestionnaireBased, 20, 2, &["Sad"]),
            task("2024-03-02", TaskCategory::DailyRoutine, 5, 3, &[]),
        ];

        let stats = fold_history_stats("2024-03", &tasks);

        assert_eq!(stats.total_tasks_completed, 3);
        assert_eq!(stats.total_points, 35);
        assert_eq!(stats.questionnaire_tasks_completed, 2);
        assert_eq!(stats.daily_tasks_completed, 1);
        assert_eq!(stats.active_days, 2);
        assert_eq!(stats.top_emotions[0].name, "Sad");
        assert_eq!(stats.top_emotions[0].count, 2);
        assert_eq!(stats.top_emotions[1].name, "Tired");
    }

    #[test]
    fn stats_tie_break_keeps_first_seen_order() {
        let tasks = vec![
            task("2024-03-01", TaskCategory::QuestionnaireBased, 10, 1, &["Calm", "Sad"]),
        ];

        let stats = fold_history_stats("2024-03", &tasks);

        assert_eq!(stats.top_emotions[0].name, "Calm");
        assert_eq!(stats.top_emotions[1].name, "Sad");
    }

    #[test]
    fn stats_top_emotions_capped_at_five() {
        let emotions = ["A", "B", "C", "D", "E", "F", "G"];
        let tasks: Vec<DailyTask> = emotions
            .iter()
            .enumerate()
            .map(|(i, e)| {
                task(
                    "2024-03-01",
                    TaskCategory::QuestionnaireBased,
                    10,
                    i as i64,
                    &[e],
                )
            })
            .collect();

        let stats = fold_history_stats("2024-03", &tasks);

        assert_eq!(stats.top_emotions.len(), 5);
    }
}
