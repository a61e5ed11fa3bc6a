use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::db::repositories::{decode_list, encode_list};
use crate::error::{AppError, AppResult};
use crate::models::catalog::{
    Emotion, EmotionRelation, TaskCategory, TaskDifficulty, TaskTemplate, TaskType,
};

#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub task_type: String,
    pub category: String,
    pub points: i64,
    pub is_active: bool,
    pub trigger_emotions: String,
    pub difficulty: String,
}

impl TemplateRow {
    pub fn from_record(record: &TaskTemplate) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            task_type: record.task_type.as_str().to_string(),
            category: record.category.as_str().to_string(),
            points: record.points,
            is_active: record.is_active,
            trigger_emotions: encode_list(&record.trigger_emotions)?,
            difficulty: record.difficulty.as_str().to_string(),
        })
    }

    pub fn into_record(self) -> AppResult<TaskTemplate> {
        Ok(TaskTemplate {
            id: self.id,
            title: self.title,
            description: self.description,
            task_type: TaskType::try_from(self.task_type.as_str())
                .map_err(AppError::validation)?,
            category: TaskCategory::try_from(self.category.as_str())
                .map_err(AppError::validation)?,
            points: self.points,
            is_active: self.is_active,
            trigger_emotions: decode_list(&self.trigger_emotions)?,
            difficulty: TaskDifficulty::try_from(self.difficulty.as_str())
                .map_err(AppError::validation)?,
        })
    }
}

impl TryFrom<&Row<'_>> for TemplateRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            task_type: row.get("task_type")?,
            category: row.get("category")?,
            points: row.get("points")?,
            is_active: row.get("is_active")?,
            trigger_emotions: row.get("trigger_emotions")?,
            difficulty: row.get("difficulty")?,
        })
    }
}

pub struct CatalogRepository;

impl CatalogRepository {
    pub fn upsert_template(conn: &Connection, template: &TaskTemplate) -> AppResult<()> {
        let row = TemplateRow::from_record(template)?;

        conn.execute(
            r#"
                INSERT INTO task_templates (
                    id, title, description, task_type, category,
                    points, is_active, trigger_emotions, difficulty
                ) VALUES (
                    :id, :title, :description, :task_type, :category,
                    :points, :is_active, :trigger_emotions, :difficulty
                )
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    task_type = excluded.task_type,
                    category = excluded.category,
                    points = excluded.points,
                    is_active = excluded.is_active,
                    trigger_emotions = excluded.trigger_emotions,
                    difficulty = excluded.difficulty
            "#,
            named_params! {
                ":id": &row.id,
                ":title": &row.title,
                ":description": &row.description,
                ":task_type": &row.task_type,
                ":category": &row.category,
                ":points": row.points,
                ":is_active": row.is_active,
                ":trigger_emotions": &row.trigger_emotions,
                ":difficulty": &row.difficulty,
            },
        )?;

        Ok(())
    }

    /// Active templates of one category, in stable id order.
    pub fn active_templates(
        conn: &Connection,
        category: TaskCategory,
    ) -> AppResult<Vec<TaskTemplate>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id, title, description, task_type, category,
                    points, is_active, trigger_emotions, difficulty
                FROM task_templates
                WHERE category = :category AND is_active = 1
                ORDER BY id ASC
            "#,
        )?;

        let records = stmt
            .query_map(named_params! {":category": category.as_str()}, |row| {
                TemplateRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn upsert_emotion(conn: &Connection, emotion: &Emotion) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO emotions (id, name, emoji, category, is_active)
                VALUES (:id, :name, :emoji, :category, :is_active)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    emoji = excluded.emoji,
                    category = excluded.category,
                    is_active = excluded.is_active
            "#,
            named_params! {
                ":id": &emotion.id,
                ":name": &emotion.name,
                ":emoji": &emotion.emoji,
                ":category": &emotion.category,
                ":is_active": emotion.is_active,
            },
        )?;

        Ok(())
    }

    /// Active emotions sorted the way the check-in screen lists them:
    /// category first, then name.
    pub fn active_emotions(conn: &Connection) -> AppResult<Vec<Emotion>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, emoji, category, is_active
                FROM emotions
                WHERE is_active = 1
                ORDER BY category ASC, name ASC
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(Emotion {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    emoji: row.get("emoji")?,
                    category: row.get("category")?,
                    is_active: row.get("is_active")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn upsert_relation(conn: &Connection, relation: &EmotionRelation) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO emotion_relations (id, name, description, is_active)
                VALUES (:id, :name, :description, :is_active)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    is_active = excluded.is_active
            "#,
            named_params! {
                ":id": &relation.id,
                ":name": &relation.name,
                ":description": &relation.description,
                ":is_active": relation.is_active,
            },
        )?;

        Ok(())
    }

    pub fn active_relations(conn: &Connection) -> AppResult<Vec<EmotionRelation>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, name, description, is_active
                FROM emotion_relations
                WHERE is_active = 1
                ORDER BY name ASC
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(EmotionRelation {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    description: row.get("description")?,
                    is_active: row.get("is_active")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
