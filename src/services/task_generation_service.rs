use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::catalog::{TaskCategory, TaskTemplate};
use crate::models::questionnaire::DailyQuestionnaire;
use crate::models::task::DailyTask;

/// Upper bound on tasks generated from one check-in, regardless of how many
/// emotions were selected.
pub const QUESTIONNAIRE_TASK_LIMIT: usize = 3;

/// Pure generation of concrete task instances from catalog templates.
/// Idempotency lives at the store layer (deterministic ids + batch
/// existence check), not here — generating twice is harmless.
pub struct TaskGenerationService;

impl TaskGenerationService {
    /// One task per active daily-routine template, unconditionally.
    pub fn routine_tasks(
        user_id: &str,
        date: &str,
        templates: &[TaskTemplate],
        now_millis: i64,
    ) -> Vec<DailyTask> {
        let tasks: Vec<DailyTask> = templates
            .iter()
            .filter(|template| {
                template.is_active && template.category == TaskCategory::DailyRoutine
            })
            .map(|template| DailyTask::from_template(user_id, template, date, now_millis, None))
            .collect();

        debug!(
            target: "app::tasks",
            user_id,
            date,
            count = tasks.len(),
            "generated daily routine tasks"
        );

        tasks
    }

    /// Emotion-matched generation: templates whose trigger set is empty or
    /// intersects the questionnaire's selected emotions form the pool, and
    /// up to `limit` of them are sampled without replacement. Each generated
    /// task snapshots the questionnaire context (emotion names, memo,
    /// relations) so history views need no join.
    pub fn questionnaire_tasks<R: Rng>(
        user_id: &str,
        questionnaire: &DailyQuestionnaire,
        templates: &[TaskTemplate],
        limit: usize,
        rng: &mut R,
        now_millis: i64,
    ) -> Vec<DailyTask> {
        let mut pool = Self::matching_pool(templates, &questionnaire.selected_emotions);
        pool.shuffle(rng);
        pool.truncate(limit);

        let tasks: Vec<DailyTask> = pool
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let mut task = DailyTask::from_template(
                    user_id,
                    template,
                    &questionnaire.date,
                    now_millis,
                    Some(index),
                );
                task.questionnaire_id = questionnaire.id.clone();
                task.triggering_emotion_names = questionnaire.selected_emotion_names.clone();
                task.questionnaire_memo = questionnaire.memo.clone();
                task.questionnaire_relations = questionnaire.selected_relation_names.clone();
                task
            })
            .collect();

        debug!(
            target: "app::tasks",
            user_id,
            date = %questionnaire.date,
            emotions = ?questionnaire.selected_emotions,
            count = tasks.len(),
            "generated questionnaire tasks"
        );

        tasks
    }

    /// Active questionnaire-based templates matching the selected emotions.
    /// An empty result is valid: check-in completion never blocks on it.
    pub fn matching_pool<'a>(
        templates: &'a [TaskTemplate],
        emotion_ids: &[String],
    ) -> Vec<&'a TaskTemplate> {
        templates
            .iter()
            .filter(|template| {
                template.is_active
                    && template.category == TaskCategory::QuestionnaireBased
                    && template.matches_any_emotion(emotion_ids)
            })
            .collect()
    }
}
