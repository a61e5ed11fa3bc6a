use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::db::repositories::task_repository::TaskRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::progress::UserProgress;
use crate::models::task::{DailyTask, TaskCompletionUpdate};
use crate::services::progress_service::ProgressService;
use crate::utils::dates::{now_millis, today_string};

/// Task queries plus the completion flow that feeds the ledger.
pub struct TaskService {
    db: DbPool,
    progress_service: Arc<ProgressService>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub task: DailyTask,
    pub first_completion: bool,
    pub points_awarded: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<UserProgress>,
}

impl TaskService {
    pub fn new(db: DbPool, progress_service: Arc<ProgressService>) -> Self {
        Self {
            db,
            progress_service,
        }
    }

    pub fn todays_tasks(&self, user_id: &str) -> AppResult<Vec<DailyTask>> {
        self.tasks_for_date(user_id, &today_string())
    }

    pub fn tasks_for_date(&self, user_id: &str, date: &str) -> AppResult<Vec<DailyTask>> {
        let conn = self.db.get_connection()?;
        TaskRepository::tasks_for_date(&conn, user_id, date)
    }

    /// Marks a task done and credits its points to the ledger. Completing an
    /// already-completed task is a success no-op: the patch is skipped and
    /// the ledger is left untouched.
    pub fn complete_task(
        &self,
        task_id: &str,
        user_response: &str,
        photo_path: &str,
    ) -> AppResult<CompletionResult> {
        let conn = self.db.get_connection()?;

        let outcome = TaskRepository::complete_task(
            &conn,
            task_id,
            &TaskCompletionUpdate {
                completed_at: now_millis(),
                user_response: user_response.to_string(),
                photo_path: photo_path.to_string(),
            },
        )?;

        if !outcome.first_completion {
            return Ok(CompletionResult {
                task: outcome.task,
                first_completion: false,
                points_awarded: 0,
                progress: None,
            });
        }

        let progress = self.progress_service.record_completion(
            &outcome.task.user_id,
            outcome.task.points,
            true,
        )?;

        info!(
            target: "app::tasks",
            task_id,
            user_id = %outcome.task.user_id,
            points = outcome.task.points,
            "task completed and ledger credited"
        );

        Ok(CompletionResult {
            points_awarded: outcome.task.points,
            task: outcome.task,
            first_completion: true,
            progress: Some(progress),
        })
    }
}
