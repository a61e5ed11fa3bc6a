use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::db::repositories::{decode_list, encode_list};
use crate::error::{AppError, AppResult};
use crate::models::tip::{MentalHealthTip, TipCategory, TipDifficulty};

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        date,
        title,
        content,
        category,
        difficulty,
        is_personalized,
        based_on_emotions,
        based_on_tasks,
        created_at,
        viewed_at,
        is_viewed,
        points_awarded,
        ai_model
    FROM mental_health_tips
"#;

#[derive(Debug, Clone)]
pub struct TipRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub difficulty: String,
    pub is_personalized: bool,
    pub based_on_emotions: String,
    pub based_on_tasks: String,
    pub created_at: i64,
    pub viewed_at: i64,
    pub is_viewed: bool,
    pub points_awarded: bool,
    pub ai_model: String,
}

impl TipRow {
    pub fn from_record(record: &MentalHealthTip) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            date: record.date.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            category: record.category.as_str().to_string(),
            difficulty: record.difficulty.as_str().to_string(),
            is_personalized: record.is_personalized,
            based_on_emotions: encode_list(&record.based_on_emotions)?,
            based_on_tasks: encode_list(&record.based_on_tasks)?,
            created_at: record.created_at,
            viewed_at: record.viewed_at,
            is_viewed: record.is_viewed,
            points_awarded: record.points_awarded,
            ai_model: record.ai_model.clone(),
        })
    }

    pub fn into_record(self) -> AppResult<MentalHealthTip> {
        Ok(MentalHealthTip {
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            title: self.title,
            content: self.content,
            category: TipCategory::try_from(self.category.as_str())
                .map_err(AppError::validation)?,
            difficulty: TipDifficulty::try_from(self.difficulty.as_str())
                .map_err(AppError::validation)?,
            is_personalized: self.is_personalized,
            based_on_emotions: decode_list(&self.based_on_emotions)?,
            based_on_tasks: decode_list(&self.based_on_tasks)?,
            created_at: self.created_at,
            viewed_at: self.viewed_at,
            is_viewed: self.is_viewed,
            points_awarded: self.points_awarded,
            ai_model: self.ai_model,
        })
    }
}

impl TryFrom<&Row<'_>> for TipRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            title: row.get("title")?,
            content: row.get("content")?,
            category: row.get("category")?,
            difficulty: row.get("difficulty")?,
            is_personalized: row.get("is_personalized")?,
            based_on_emotions: row.get("based_on_emotions")?,
            based_on_tasks: row.get("based_on_tasks")?,
            created_at: row.get("created_at")?,
            viewed_at: row.get("viewed_at")?,
            is_viewed: row.get("is_viewed")?,
            points_awarded: row.get("points_awarded")?,
            ai_model: row.get("ai_model")?,
        })
    }
}

pub struct TipRepository;

impl TipRepository {
    pub fn upsert(conn: &Connection, tip: &MentalHealthTip) -> AppResult<()> {
        let row = TipRow::from_record(tip)?;

        conn.execute(
            r#"
                INSERT INTO mental_health_tips (
                    id, user_id, date, title, content, category, difficulty,
                    is_personalized, based_on_emotions, based_on_tasks,
                    created_at, viewed_at, is_viewed, points_awarded, ai_model
                ) VALUES (
                    :id, :user_id, :date, :title, :content, :category, :difficulty,
                    :is_personalized, :based_on_emotions, :based_on_tasks,
                    :created_at, :viewed_at, :is_viewed, :points_awarded, :ai_model
                )
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    category = excluded.category,
                    difficulty = excluded.difficulty,
                    is_personalized = excluded.is_personalized,
                    based_on_emotions = excluded.based_on_emotions,
                    based_on_tasks = excluded.based_on_tasks,
                    ai_model = excluded.ai_model
            "#,
            named_params! {
                ":id": &row.id,
                ":user_id": &row.user_id,
                ":date": &row.date,
                ":title": &row.title,
                ":content": &row.content,
                ":category": &row.category,
                ":difficulty": &row.difficulty,
                ":is_personalized": row.is_personalized,
                ":based_on_emotions": &row.based_on_emotions,
                ":based_on_tasks": &row.based_on_tasks,
                ":created_at": row.created_at,
                ":viewed_at": row.viewed_at,
                ":is_viewed": row.is_viewed,
                ":points_awarded": row.points_awarded,
                ":ai_model": &row.ai_model,
            },
        )?;

        debug!(target: "app::tips", id = %row.id, "tip saved");

        Ok(())
    }

    pub fn find(conn: &Connection, tip_id: &str) -> AppResult<Option<MentalHealthTip>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;

        let row = stmt
            .query_row(named_params! {":id": tip_id}, |row| TipRow::try_from(row))
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// Targeted patch for the first view. The viewed/awarded flags only ever
    /// transition false → true.
    pub fn mark_viewed(conn: &Connection, tip_id: &str, viewed_at: i64) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE mental_health_tips SET
                    is_viewed = 1,
                    viewed_at = :viewed_at,
                    points_awarded = 1
                WHERE id = :id
            "#,
            named_params! {":id": tip_id, ":viewed_at": viewed_at},
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    /// Titles of tips generated on or after `cutoff_date`, newest first —
    /// used to steer generation away from repeating recent topics.
    pub fn recent_titles(
        conn: &Connection,
        user_id: &str,
        cutoff_date: &str,
    ) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT title
                FROM mental_health_tips
                WHERE user_id = :user_id AND date >= :cutoff
                ORDER BY date DESC
            "#,
        )?;

        let titles = stmt
            .query_map(
                named_params! {":user_id": user_id, ":cutoff": cutoff_date},
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(titles)
    }
}
