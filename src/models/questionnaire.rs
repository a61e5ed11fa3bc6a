use serde::{Deserialize, Serialize};

/// One emotional check-in per user per day, keyed `{user}_{date}`. Emotion
/// and relation names are denormalized alongside their ids so downstream
/// snapshots (task context, history) never need a catalog join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestionnaire {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub created_at: i64,
    pub selected_emotions: Vec<String>,
    pub selected_emotion_names: Vec<String>,
    pub selected_relations: Vec<String>,
    pub selected_relation_names: Vec<String>,
    pub memo: String,
    pub completed: bool,
    pub completed_at: i64,
}

impl DailyQuestionnaire {
    pub fn document_id(user_id: &str, date: &str) -> String {
        format!("{user_id}_{date}")
    }
}

/// What the check-in screen submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinInput {
    pub emotion_ids: Vec<String>,
    #[serde(default)]
    pub relation_ids: Vec<String>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinOutcome {
    pub questionnaire: DailyQuestionnaire,
    pub tasks_created: usize,
}
