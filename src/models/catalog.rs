use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Text,
    Photo,
    SimpleAction,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Text => "text",
            TaskType::Photo => "photo",
            TaskType::SimpleAction => "simple_action",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "text" => Ok(TaskType::Text),
            "photo" => Ok(TaskType::Photo),
            "simple_action" => Ok(TaskType::SimpleAction),
            other => Err(format!("unsupported task type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    DailyRoutine,
    QuestionnaireBased,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::DailyRoutine => "daily_routine",
            TaskCategory::QuestionnaireBased => "questionnaire_based",
        }
    }

    /// Segment used inside deterministic task instance ids.
    pub fn id_segment(&self) -> &'static str {
        match self {
            TaskCategory::DailyRoutine => "daily",
            TaskCategory::QuestionnaireBased => "questionnaire",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskCategory {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily_routine" => Ok(TaskCategory::DailyRoutine),
            "questionnaire_based" => Ok(TaskCategory::QuestionnaireBased),
            other => Err(format!("unsupported task category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TaskDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDifficulty::Easy => "easy",
            TaskDifficulty::Medium => "medium",
            TaskDifficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for TaskDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskDifficulty {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "easy" => Ok(TaskDifficulty::Easy),
            "medium" => Ok(TaskDifficulty::Medium),
            "hard" => Ok(TaskDifficulty::Hard),
            other => Err(format!("unsupported task difficulty: {other}")),
        }
    }
}

/// Immutable catalog entry a daily task instance is generated from. An empty
/// `trigger_emotions` set matches any emotional state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub points: i64,
    pub is_active: bool,
    pub trigger_emotions: Vec<String>,
    pub difficulty: TaskDifficulty,
}

impl TaskTemplate {
    pub fn matches_any_emotion(&self, emotion_ids: &[String]) -> bool {
        self.trigger_emotions.is_empty()
            || self
                .trigger_emotions
                .iter()
                .any(|trigger| emotion_ids.iter().any(|selected| selected == trigger))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Emotion {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub category: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRelation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}
