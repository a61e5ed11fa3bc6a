use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::db::repositories::{decode_list, encode_list};
use crate::error::{AppError, AppResult};
use crate::models::diary::DiaryEntry;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        user_id,
        date,
        title,
        content,
        mood,
        mood_emoji,
        word_count,
        tags,
        created_at,
        updated_at
    FROM diary_entries
"#;

#[derive(Debug, Clone)]
pub struct DiaryRow {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_emoji: String,
    pub word_count: i64,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiaryRow {
    pub fn from_record(record: &DiaryEntry) -> AppResult<Self> {
        Ok(Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            date: record.date.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            mood: record.mood.clone(),
            mood_emoji: record.mood_emoji.clone(),
            word_count: record.word_count,
            tags: encode_list(&record.tags)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn into_record(self) -> AppResult<DiaryEntry> {
        Ok(DiaryEntry {
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            title: self.title,
            content: self.content,
            mood: self.mood,
            mood_emoji: self.mood_emoji,
            word_count: self.word_count,
            tags: decode_list(&self.tags)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for DiaryRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            title: row.get("title")?,
            content: row.get("content")?,
            mood: row.get("mood")?,
            mood_emoji: row.get("mood_emoji")?,
            word_count: row.get("word_count")?,
            tags: row.get("tags")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub struct DiaryRepository;

impl DiaryRepository {
    pub fn upsert(conn: &Connection, entry: &DiaryEntry) -> AppResult<()> {
        let row = DiaryRow::from_record(entry)?;

        conn.execute(
            r#"
                INSERT INTO diary_entries (
                    id, user_id, date, title, content, mood, mood_emoji,
                    word_count, tags, created_at, updated_at
                ) VALUES (
                    :id, :user_id, :date, :title, :content, :mood, :mood_emoji,
                    :word_count, :tags, :created_at, :updated_at
                )
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    mood = excluded.mood,
                    mood_emoji = excluded.mood_emoji,
                    word_count = excluded.word_count,
                    tags = excluded.tags,
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":id": &row.id,
                ":user_id": &row.user_id,
                ":date": &row.date,
                ":title": &row.title,
                ":content": &row.content,
                ":mood": &row.mood,
                ":mood_emoji": &row.mood_emoji,
                ":word_count": row.word_count,
                ":tags": &row.tags,
                ":created_at": row.created_at,
                ":updated_at": row.updated_at,
            },
        )?;

        debug!(target: "app::diary", id = %row.id, "diary entry saved");

        Ok(())
    }

    pub fn find(conn: &Connection, user_id: &str, date: &str) -> AppResult<Option<DiaryEntry>> {
        let id = DiaryEntry::document_id(user_id, date);
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = :id"))?;

        let row = stmt
            .query_row(named_params! {":id": id}, |row| DiaryRow::try_from(row))
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    pub fn delete(conn: &Connection, entry_id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM diary_entries WHERE id = ?1", [entry_id])?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        debug!(target: "app::diary", id = %entry_id, "diary entry deleted");

        Ok(())
    }

    pub fn list_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<DiaryEntry>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE user_id = :user_id"))?;

        let records = stmt
            .query_map(named_params! {":user_id": user_id}, |row| {
                DiaryRow::try_from(row)
            })?
            .map(|row| {
                row.map_err(AppError::from)
                    .and_then(|row| row.into_record())
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
