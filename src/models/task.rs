use serde::{Deserialize, Serialize};

use crate::models::catalog::{TaskCategory, TaskDifficulty, TaskTemplate, TaskType};

/// One concrete task instance for a user on a given day. Template fields are
/// snapshotted at generation time; for questionnaire-based tasks the
/// triggering context (emotion names, memo, relations) is denormalized from
/// the source questionnaire so history views need no join. That snapshot is
/// immutable once written and is never re-synced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: String,
    pub user_id: String,
    pub template_id: String,
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub points: i64,
    pub difficulty: TaskDifficulty,
    pub date: String,
    pub completed: bool,
    pub completed_at: i64,
    pub created_at: i64,
    pub user_response: String,
    pub photo_path: String,
    pub questionnaire_id: String,
    pub triggering_emotion_names: Vec<String>,
    pub questionnaire_memo: String,
    pub questionnaire_relations: Vec<String>,
}

impl DailyTask {
    /// Deterministic instance id: `{user}_{daily|questionnaire}_{template}_{date}`,
    /// with a batch index suffix for sampled questionnaire tasks.
    pub fn instance_id(
        user_id: &str,
        category: TaskCategory,
        template_id: &str,
        date: &str,
        index: Option<usize>,
    ) -> String {
        match index {
            Some(index) => format!(
                "{user_id}_{}_{template_id}_{date}_{index}",
                category.id_segment()
            ),
            None => format!("{user_id}_{}_{template_id}_{date}", category.id_segment()),
        }
    }

    pub fn from_template(
        user_id: &str,
        template: &TaskTemplate,
        date: &str,
        created_at: i64,
        index: Option<usize>,
    ) -> Self {
        Self {
            id: Self::instance_id(user_id, template.category, &template.id, date, index),
            user_id: user_id.to_string(),
            template_id: template.id.clone(),
            title: template.title.clone(),
            description: template.description.clone(),
            task_type: template.task_type,
            category: template.category,
            points: template.points,
            difficulty: template.difficulty,
            date: date.to_string(),
            completed: false,
            completed_at: 0,
            created_at,
            user_response: String::new(),
            photo_path: String::new(),
            questionnaire_id: String::new(),
            triggering_emotion_names: Vec::new(),
            questionnaire_memo: String::new(),
            questionnaire_relations: Vec::new(),
        }
    }
}

/// Targeted patch applied when a task is marked done.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletionUpdate {
    pub completed_at: i64,
    #[serde(default)]
    pub user_response: String,
    #[serde(default)]
    pub photo_path: String,
}

/// Result of a completion attempt. `first_completion` is false when the task
/// had already been completed; callers must not credit the ledger again.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletionOutcome {
    pub task: DailyTask,
    pub first_completion: bool,
}
