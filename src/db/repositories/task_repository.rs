use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::db::repositories::{decode_list, encode_list};
use crate::error::{AppError, AppResult};
use crate::models::catalog::{TaskCategory, TaskDifficulty, TaskType};
use crate::models::task::{DailyTask, TaskCompletionOutcome, TaskCompletionUpdate};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        template_id,
        title,
        description,
        task_type,
        category,
        points,
        difficulty,
        date,
        completed,
        completed_at,
        created_at,
        user_response,
        photo_path,
        questionnaire_id,
        triggering_emotion_names,
        questionnaire_memo,
        questionnaire_relations
    FROM daily_tasks
"#;

#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: String,
    pub user_id: String,
    pub template_id: String,
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub category: String,
    pub points: i64,
    pub difficulty: String,
    pub date: String,
    pub completed: bool,
    pub completed_at: i64,
    pub created_at: i64,
    pub user_response: String,
    pub photo_path: String,
    pub questionnaire_id: String,
    pub triggering_emotion_names: String,
    pub questionnaire_memo: String,
    pub questionnaire_relations: String,
}

impl TaskRow {
    pub fn from_record(record: &DailyTask) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            template_id: record.template_id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            task_type: record.task_type.as_str().to_string(),
            category: record.category.as_str().to_string(),
            points: record.points,
            difficulty: record.difficulty.as_str().to_string(),
            date: record.date.clone(),
            completed: record.completed,
            completed_at: record.completed_at,
            created_at: record.created_at,
            user_response: record.user_response.clone(),
            photo_path: record.photo_path.clone(),
            questionnaire_id: record.questionnaire_id.clone(),
            triggering_emotion_names: encode_list(&record.triggering_emotion_names)?,
            questionnaire_memo: record.questionnaire_memo.clone(),
            questionnaire_relations: encode_list(&record.questionnaire_relations)?,
        })
    }

    pub fn into_record(self) -> AppResult<DailyTask> {
        Ok(DailyTask {
            id: self.id,
            user_id: self.user_id,
            template_id: self.template_id,
            title: self.title,
            description: self.description,
            task_type: TaskType::try_from(self.task_type.as_str())
                .map_err(AppError::validation)?,
            category: TaskCategory::try_from(self.category.as_str())
                .map_err(AppError::validation)?,
            points: self.points,
            difficulty: TaskDifficulty::try_from(self.difficulty.as_str())
                .map_err(AppError::validation)?,
            date: self.date,
            completed: self.completed,
            completed_at: self.completed_at,
            created_at: self.created_at,
            user_response: self.user_response,
            photo_path: self.photo_path,
            questionnaire_id: self.questionnaire_id,
            triggering_emotion_names: decode_list(&self.triggering_emotion_names)?,
            questionnaire_memo: self.questionnaire_memo,
            questionnaire_relations: decode_list(&self.questionnaire_relations)?,
        })
    }
}

impl TryFrom<&Row<'_>> for TaskRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            template_id: row.get("template_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            task_type: row.get("task_type")?,
            category: row.get("category")?,
            points: row.get("points")?,
            difficulty: row.get("difficulty")?,
            date: row.get("date")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
            created_at: row.get("created_at")?,
            user_response: row.get("user_response")?,
            photo_path: row.get("photo_path")?,
            questionnaire_id: row.get("questionnaire_id")?,
            triggering_emotion_names: row.get("triggering_emotion_names")?,
            questionnaire_memo: row.get("questionnaire_memo")?,
            questionnaire_relations: row.get("questionnaire_relations")?,
        })
    }
}

pub struct TaskRepository;

impl TaskRepository {
    /// Idempotent batch save. All tasks in a batch share (user, date,
    /// category); if any task of that triple already exists the whole batch
    /// is skipped and the call succeeds without mutation. This is the guard
    /// against double generation from duplicate triggers.
    pub fn save_if_absent(conn: &mut Connection, tasks: &[DailyTask]) -> AppResult<bool> {
        let Some(first) = tasks.first() else {
            return Ok(true);
        };

        let tx = conn.transaction()?;

        let existing = Self::count_for(&tx, &first.user_id, &first.date, first.category)?;
        if existing > 0 {
            warn!(
                target: "app::tasks",
                user_id = %first.user_id,
                date = %first.date,
                category = %first.category,
                existing,
                "tasks already generated for today, skipping batch"
            );
            return Ok(false);
        }

        for task in tasks {
            let row = TaskRow::from_record(task)?;
            tx.execute(
                r#"
                    INSERT INTO daily_tasks (
                        id, user_id, template_id, title, description,
                        task_type, category, points, difficulty, date,
                        completed, completed_at, created_at,
                        user_response, photo_path, questionnaire_id,
                        triggering_emotion_names, questionnaire_memo, questionnaire_relations
                    ) VALUES (
                        :id, :user_id, :template_id, :title, :description,
                        :task_type, :category, :points, :difficulty, :date,
                        :completed, :completed_at, :created_at,
                        :user_response, :photo_path, :questionnaire_id,
                        :triggering_emotion_names, :questionnaire_memo, :questionnaire_relations
                    )
                "#,
                named_params! {
                    ":id": &row.id,
                    ":user_id": &row.user_id,
                    ":template_id": &row.template_id,
                    ":title": &row.title,
                    ":description": &row.description,
                    ":task_type": &row.task_type,
                    ":category": &row.category,
                    ":points": row.points,
                    ":difficulty": &row.difficulty,
                    ":date": &row.date,
                    ":completed": row.completed,
                    ":completed_at": row.completed_at,
                    ":created_at": row.created_at,
                    ":user_response": &row.user_response,
                    ":photo_path": &row.photo_path,
                    ":questionnaire_id": &row.questionnaire_id,
                    ":triggering_emotion_names": &row.triggering_emotion_names,
                    ":questionnaire_memo": &row.questionnaire_memo,
                    ":questionnaire_relations": &row.questionnaire_relations,
                },
            )?;
        }

        tx.commit()?;

        debug!(
            target: "app::tasks",
            user_id = %first.user_id,
            date = %first.date,
            category = %first.category,
            count = tasks.len(),
            "task batch saved"
        );

        Ok(true)
    }

    pub fn count_for(
        conn: &Connection,
        user_id: &str,
        date: &str,
        category: TaskCategory,
    ) -> AppResult<i64> {
        let count = conn.query_row(
            r#"
                SELECT COUNT(*)
                FROM daily_tasks
                WHERE user_id = :user_id AND date = :date AND category = :category
            "#,
            named_params! {
                ":user_id": user_id,
                ":date": date,
                ":category": category.as_str(),
            },
            |row| row.get(0),
        )?;

        Ok(count)
    }

    pub fn find_by_id(conn: &Connection, task_id: &str) -> AppResult<Option<DailyTask>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;

        let row = stmt
            .query_row(named_params! {":id": task_id}, |row| {
                TaskRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// Marks a task done. Completing an already-completed task is a success
    /// no-op reported through `first_completion` so the ledger is credited
    /// at most once per task.
    pub fn complete_task(
        conn: &Connection,
        task_id: &str,
        update: &TaskCompletionUpdate,
    ) -> AppResult<TaskCompletionOutcome> {
        let task = Self::find_by_id(conn, task_id)?.ok_or_else(AppError::not_found)?;

        if task.completed {
            debug!(target: "app::tasks", %task_id, "task already completed, skipping patch");
            return Ok(TaskCompletionOutcome {
                task,
                first_completion: false,
            });
        }

        conn.execute(
            r#"
                UPDATE daily_tasks SET
                    completed = 1,
                    completed_at = :completed_at,
                    user_response = CASE WHEN :user_response = '' THEN user_response ELSE :user_response END,
                    photo_path = CASE WHEN :photo_path = '' THEN photo_path ELSE :photo_path END
                WHERE id = :id
            "#,
            named_params! {
                ":id": task_id,
                ":completed_at": update.completed_at,
                ":user_response": &update.user_response,
                ":photo_path": &update.photo_path,
            },
        )?;

        let task = Self::find_by_id(conn, task_id)?.ok_or_else(AppError::not_found)?;

        debug!(target: "app::tasks", %task_id, points = task.points, "task completed");

        Ok(TaskCompletionOutcome {
            task,
            first_completion: true,
        })
    }

    /// Tasks for one day, routine category first, then by points descending.
    pub fn tasks_for_date(
        conn: &Connection,
        user_id: &str,
        date: &str,
    ) -> AppResult<Vec<DailyTask>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                {BASE_SELECT}
                WHERE user_id = :user_id AND date = :date
                ORDER BY category ASC, points DESC
            "#
        ))?;

        let tasks = Self::collect(stmt.query_map(
            named_params! {":user_id": user_id, ":date": date},
            |row| TaskRow::try_from(row),
        )?);
        tasks
    }

    pub fn completed_tasks(conn: &Connection, user_id: &str) -> AppResult<Vec<DailyTask>> {
        let mut stmt = conn.prepare(&format!(
            "{BASE_SELECT} WHERE user_id = :user_id AND completed = 1"
        ))?;

        let tasks = Self::collect(stmt.query_map(named_params! {":user_id": user_id}, |row| {
            TaskRow::try_from(row)
        })?);
        tasks
    }

    /// Completed tasks whose date falls in the `yyyy-MM` month.
    pub fn completed_tasks_in_month(
        conn: &Connection,
        user_id: &str,
        month: &str,
    ) -> AppResult<Vec<DailyTask>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                {BASE_SELECT}
                WHERE user_id = :user_id AND completed = 1 AND date LIKE :month || '-%'
            "#
        ))?;

        let tasks = Self::collect(stmt.query_map(
            named_params! {":user_id": user_id, ":month": month},
            |row| TaskRow::try_from(row),
        )?);
        tasks
    }

    /// Titles of tasks completed on or after `cutoff_date`, deduplicated,
    /// capped — personalization context for tip generation.
    pub fn completed_titles_since(
        conn: &Connection,
        user_id: &str,
        cutoff_date: &str,
        limit: usize,
    ) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT DISTINCT title
                FROM daily_tasks
                WHERE user_id = :user_id AND completed = 1 AND date >= :cutoff
                ORDER BY title ASC
                LIMIT :limit
            "#,
        )?;

        let titles = stmt
            .query_map(
                named_params! {":user_id": user_id, ":cutoff": cutoff_date, ":limit": limit as i64},
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(titles)
    }

    fn collect(
        rows: impl Iterator<Item = Result<TaskRow, rusqlite::Error>>,
    ) -> AppResult<Vec<DailyTask>> {
        rows.map(|row| {
            row.map_err(AppError::from)
                .and_then(|row| row.into_record())
        })
        .collect()
    }
}
