use rand::Rng;
use tracing::{debug, info};

use crate::db::repositories::catalog_repository::CatalogRepository;
use crate::db::repositories::questionnaire_repository::QuestionnaireRepository;
use crate::db::repositories::task_repository::TaskRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::catalog::{Emotion, EmotionRelation, TaskCategory};
use crate::models::questionnaire::{CheckinInput, CheckinOutcome, DailyQuestionnaire};
use crate::services::task_generation_service::{
    TaskGenerationService, QUESTIONNAIRE_TASK_LIMIT,
};
use crate::utils::dates::{now_millis, today_string};

/// Orchestrates the daily emotional check-in: one questionnaire per user per
/// day, with personalized task generation on submission.
pub struct CheckinService {
    db: DbPool,
}

impl CheckinService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn active_emotions(&self) -> AppResult<Vec<Emotion>> {
        let conn = self.db.get_connection()?;
        CatalogRepository::active_emotions(&conn)
    }

    pub fn active_relations(&self) -> AppResult<Vec<EmotionRelation>> {
        let conn = self.db.get_connection()?;
        CatalogRepository::active_relations(&conn)
    }

    pub fn has_completed_today(&self, user_id: &str) -> AppResult<bool> {
        let conn = self.db.get_connection()?;
        QuestionnaireRepository::has_completed(&conn, user_id, &today_string())
    }

    pub fn todays_questionnaire(&self, user_id: &str) -> AppResult<Option<DailyQuestionnaire>> {
        let conn = self.db.get_connection()?;
        QuestionnaireRepository::find(&conn, user_id, &today_string())
    }

    /// Submits today's check-in and generates the matching task batch.
    pub fn submit_checkin(&self, user_id: &str, input: CheckinInput) -> AppResult<CheckinOutcome> {
        self.submit_checkin_on(user_id, &today_string(), input, &mut rand::thread_rng())
    }

    /// Date- and rng-explicit variant of [`Self::submit_checkin`]. A second
    /// submission on the same day is rejected with a conflict; the task
    /// batch itself is additionally protected by the store-layer existence
    /// check, so a retried call can never duplicate tasks.
    pub fn submit_checkin_on<R: Rng>(
        &self,
        user_id: &str,
        date: &str,
        input: CheckinInput,
        rng: &mut R,
    ) -> AppResult<CheckinOutcome> {
        let mut conn = self.db.get_connection()?;

        if QuestionnaireRepository::has_completed(&conn, user_id, date)? {
            return Err(AppError::conflict("check-in already completed today"));
        }

        let emotions = CatalogRepository::active_emotions(&conn)?;
        let relations = CatalogRepository::active_relations(&conn)?;

        let selected_emotion_names = resolve_names(
            &input.emotion_ids,
            emotions.iter().map(|e| (e.id.as_str(), e.name.as_str())),
        );
        let selected_relation_names = resolve_names(
            &input.relation_ids,
            relations.iter().map(|r| (r.id.as_str(), r.name.as_str())),
        );

        let now = now_millis();
        let questionnaire = DailyQuestionnaire {
            id: DailyQuestionnaire::document_id(user_id, date),
            user_id: user_id.to_string(),
            date: date.to_string(),
            created_at: now,
            selected_emotions: input.emotion_ids,
            selected_emotion_names,
            selected_relations: input.relation_ids,
            selected_relation_names,
            memo: input.memo,
            completed: true,
            completed_at: now,
        };

        QuestionnaireRepository::save(&conn, &questionnaire)?;

        let templates =
            CatalogRepository::active_templates(&conn, TaskCategory::QuestionnaireBased)?;
        let tasks = TaskGenerationService::questionnaire_tasks(
            user_id,
            &questionnaire,
            &templates,
            QUESTIONNAIRE_TASK_LIMIT,
            rng,
            now,
        );

        let tasks_created = if tasks.is_empty() {
            debug!(
                target: "app::checkin",
                user_id,
                date,
                "no templates matched the selected emotions"
            );
            0
        } else if TaskRepository::save_if_absent(&mut conn, &tasks)? {
            tasks.len()
        } else {
            0
        };

        info!(
            target: "app::checkin",
            user_id,
            date,
            emotions = questionnaire.selected_emotions.len(),
            tasks_created,
            "check-in completed"
        );

        Ok(CheckinOutcome {
            questionnaire,
            tasks_created,
        })
    }

    /// Generates today's routine task set when it does not exist yet.
    /// Called on app open; safe to call any number of times per day.
    pub fn ensure_routine_tasks(&self, user_id: &str) -> AppResult<usize> {
        self.ensure_routine_tasks_on(user_id, &today_string())
    }

    pub fn ensure_routine_tasks_on(&self, user_id: &str, date: &str) -> AppResult<usize> {
        let mut conn = self.db.get_connection()?;

        if TaskRepository::count_for(&conn, user_id, date, TaskCategory::DailyRoutine)? > 0 {
            debug!(target: "app::checkin", user_id, date, "routine tasks already generated");
            return Ok(0);
        }

        let templates = CatalogRepository::active_templates(&conn, TaskCategory::DailyRoutine)?;
        let tasks =
            TaskGenerationService::routine_tasks(user_id, date, &templates, now_millis());

        if tasks.is_empty() {
            return Ok(0);
        }

        if TaskRepository::save_if_absent(&mut conn, &tasks)? {
            Ok(tasks.len())
        } else {
            Ok(0)
        }
    }
}

fn resolve_names<'a>(
    ids: &[String],
    catalog: impl Iterator<Item = (&'a str, &'a str)>,
) -> Vec<String> {
    let lookup: Vec<(&str, &str)> = catalog.collect();

    ids.iter()
        .filter_map(|id| {
            lookup
                .iter()
                .find(|(catalog_id, _)| *catalog_id == id.as_str())
                .map(|(_, name)| name.to_string())
        })
        .collect()
}
