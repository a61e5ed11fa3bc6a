use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::db::repositories::{decode_list, encode_list};
use crate::error::{AppError, AppResult};
use crate::models::questionnaire::DailyQuestionnaire;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        date,
        created_at,
        selected_emotions,
        selected_emotion_names,
        selected_relations,
        selected_relation_names,
        memo,
        completed,
        completed_at
    FROM daily_questionnaires
"#;

#[derive(Debug, Clone)]
pub struct QuestionnaireRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub created_at: i64,
    pub selected_emotions: String,
    pub selected_emotion_names: String,
    pub selected_relations: String,
    pub selected_relation_names: String,
    pub memo: String,
    pub completed: bool,
    pub completed_at: i64,
}

impl QuestionnaireRow {
    pub fn from_record(record: &DailyQuestionnaire) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            date: record.date.clone(),
            created_at: record.created_at,
            selected_emotions: encode_list(&record.selected_emotions)?,
            selected_emotion_names: encode_list(&record.selected_emotion_names)?,
            selected_relations: encode_list(&record.selected_relations)?,
            selected_relation_names: encode_list(&record.selected_relation_names)?,
            memo: record.memo.clone(),
            completed: record.completed,
            completed_at: record.completed_at,
        })
    }

    pub fn into_record(self) -> AppResult<DailyQuestionnaire> {
        Ok(DailyQuestionnaire {
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            created_at: self.created_at,
            selected_emotions: decode_list(&self.selected_emotions)?,
            selected_emotion_names: decode_list(&self.selected_emotion_names)?,
            selected_relations: decode_list(&self.selected_relations)?,
            selected_relation_names: decode_list(&self.selected_relation_names)?,
            memo: self.memo,
            completed: self.completed,
            completed_at: self.completed_at,
        })
    }
}

impl TryFrom<&Row<'_>> for QuestionnaireRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
            selected_emotions: row.get("selected_emotions")?,
            selected_emotion_names: row.get("selected_emotion_names")?,
            selected_relations: row.get("selected_relations")?,
            selected_relation_names: row.get("selected_relation_names")?,
            memo: row.get("memo")?,
            completed: row.get("completed")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

pub struct QuestionnaireRepository;

impl QuestionnaireRepository {
    pub fn save(conn: &Connection, questionnaire: &DailyQuestionnaire) -> AppResult<()> {
        let row = QuestionnaireRow::from_record(questionnaire)?;

        conn.execute(
            r#"
                INSERT INTO daily_questionnaires (
                    id, user_id, date, created_at,
                    selected_emotions, selected_emotion_names,
                    selected_relations, selected_relation_names,
                    memo, completed, completed_at
                ) VALUES (
                    :id, :user_id, :date, :created_at,
                    :selected_emotions, :selected_emotion_names,
                    :selected_relations, :selected_relation_names,
                    :memo, :completed, :completed_at
                )
                ON CONFLICT(id) DO UPDATE SET
                    selected_emotions = excluded.selected_emotions,
                    selected_emotion_names = excluded.selected_emotion_names,
                    selected_relations = excluded.selected_relations,
                    selected_relation_names = excluded.selected_relation_names,
                    memo = excluded.memo,
                    completed = excluded.completed,
                    completed_at = excluded.completed_at
            "#,
            named_params! {
                ":id": &row.id,
                ":user_id": &row.user_id,
                ":date": &row.date,
                ":created_at": row.created_at,
                ":selected_emotions": &row.selected_emotions,
                ":selected_emotion_names": &row.selected_emotion_names,
                ":selected_relations": &row.selected_relations,
                ":selected_relation_names": &row.selected_relation_names,
                ":memo": &row.memo,
                ":completed": row.completed,
                ":completed_at": row.completed_at,
            },
        )?;

        debug!(target: "app::checkin", id = %row.id, "questionnaire saved");

        Ok(())
    }

    pub fn find(
        conn: &Connection,
        user_id: &str,
        date: &str,
    ) -> AppResult<Option<DailyQuestionnaire>> {
        let id = DailyQuestionnaire::document_id(user_id, date);
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| {
                QuestionnaireRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    pub fn has_completed(conn: &Connection, user_id: &str, date: &str) -> AppResult<bool> {
        Ok(Self::find(conn, user_id, date)?
            .map(|questionnaire| questionnaire.completed)
            .unwrap_or(false))
    }

    /// Completed questionnaires on or after `cutoff_date`, oldest first.
    pub fn completed_since(
        conn: &Connection,
        user_id: &str,
        cutoff_date: &str,
    ) -> AppResult<Vec<DailyQuestionnaire>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                {BASE_SELECT}
                WHERE user_id = :user_id AND completed = 1 AND date >= :cutoff
                ORDER BY date ASC
            "#
        ))?;

        let records = stmt
            .query_map(
                named_params! {":user_id": user_id, ":cutoff": cutoff_date},
                |row| QuestionnaireRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }

    /// Completed questionnaires whose date falls in the `yyyy-MM` month.
    pub fn completed_in_month(
        conn: &Connection,
        user_id: &str,
        month: &str,
    ) -> AppResult<Vec<DailyQuestionnaire>> {
        let mut stmt = conn.prepare(&format!(
            r#"
                {BASE_SELECT}
                WHERE user_id = :user_id AND completed = 1 AND date LIKE :month || '-%'
            "#
        ))?;

        let records = stmt
            .query_map(
                named_params! {":user_id": user_id, ":month": month},
                |row| QuestionnaireRow::try_from(row),
            )?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
