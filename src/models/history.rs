use serde::{Deserialize, Serialize};

use crate::models::task::DailyTask;

/// One calendar cell: what a user did on a single day. A day "has login"
/// when it carries a completed questionnaire or at least one completed task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: String,
    pub has_login: bool,
    pub points_earned: i64,
    pub tasks_completed: i64,
    pub check_in_completed: bool,
    pub daily_tasks_completed: i64,
    pub questionnaire_tasks_completed: i64,
}

impl DailyProgress {
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            has_login: false,
            points_earned: 0,
            tasks_completed: 0,
            check_in_completed: false,
            daily_tasks_completed: 0,
            questionnaire_tasks_completed: 0,
        }
    }
}

/// Filter over the completed questionnaire-task history. Empty strings and
/// empty lists mean "no constraint".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistoryFilter {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub min_points: i64,
    #[serde(default = "default_max_points")]
    pub max_points: i64,
}

fn default_max_points() -> i64 {
    i64::MAX
}

impl Default for TaskHistoryFilter {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            end_date: String::new(),
            emotions: Vec::new(),
            min_points: 0,
            max_points: i64::MAX,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistoryItem {
    pub task: DailyTask,
    pub completion_date: String,
    pub points_earned: i64,
    pub completion_time: String,
}

/// Monthly aggregate over completed tasks, including a top-5 ranking of the
/// emotions that triggered questionnaire tasks (ties keep first-seen order).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistoryStats {
    pub month: String,
    pub total_tasks_completed: i64,
    pub total_points: i64,
    pub questionnaire_tasks_completed: i64,
    pub daily_tasks_completed: i64,
    pub active_days: i64,
    pub top_emotions: Vec<EmotionCount>,
}

impl TaskHistoryStats {
    pub fn empty(month: &str) -> Self {
        Self {
            month: month.to_string(),
            total_tasks_completed: 0,
            total_points: 0,
            questionnaire_tasks_completed: 0,
            daily_tasks_completed: 0,
            active_days: 0,
            top_emotions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionCount {
    pub name: String,
    pub count: i64,
}
