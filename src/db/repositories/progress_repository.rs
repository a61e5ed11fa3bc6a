use std::collections::BTreeMap;
use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::progress::{MonthlyStats, UserProgress};

#[derive(Debug, Clone)]
pub struct ProgressRow {
    pub user_id: String,
    pub total_points: i64,
    pub available_points: i64,
    pub total_points_spent: i64,
    pub tasks_completed: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: String,
    pub level: i64,
    pub monthly_stats: String,
    pub first_login_date: String,
    pub pet_interactions: i64,
}

impl ProgressRow {
    pub fn from_record(record: &UserProgress) -> AppResult<Self> {
        Ok(Self {
            user_id: record.user_id.clone(),
            total_points: record.total_points,
            available_points: record.available_points,
            total_points_spent: record.total_points_spent,
            tasks_completed: record.tasks_completed,
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_active_date: record.last_active_date.clone(),
            level: record.level,
            monthly_stats: serde_json::to_string(&record.monthly_stats)?,
            first_login_date: record.first_login_date.clone(),
            pet_interactions: record.pet_interactions,
        })
    }

    pub fn into_record(self) -> AppResult<UserProgress> {
        let monthly_stats: BTreeMap<String, MonthlyStats> = if self.monthly_stats.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&self.monthly_stats)?
        };

        Ok(UserProgress {
            user_id: self.user_id,
            total_points: self.total_points,
            available_points: self.available_points,
            total_points_spent: self.total_points_spent,
            tasks_completed: self.tasks_completed,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_active_date: self.last_active_date,
            level: self.level,
            monthly_stats,
            first_login_date: self.first_login_date,
            pet_interactions: self.pet_interactions,
        })
    }
}

impl TryFrom<&Row<'_>> for ProgressRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.get("user_id")?,
            total_points: row.get("total_points")?,
            available_points: row.get("available_points")?,
            total_points_spent: row.get("total_points_spent")?,
            tasks_completed: row.get("tasks_completed")?,
            current_streak: row.get("current_streak")?,
            longest_streak: row.get("longest_streak")?,
            last_active_date: row.get("last_active_date")?,
            level: row.get("level")?,
            monthly_stats: row.get("monthly_stats")?,
            first_login_date: row.get("first_login_date")?,
            pet_interactions: row.get("pet_interactions")?,
        })
    }
}

pub struct ProgressRepository;

impl ProgressRepository {
    pub fn find(conn: &Connection, user_id: &str) -> AppResult<Option<UserProgress>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    user_id,
                    total_points,
                    available_points,
                    total_points_spent,
                    tasks_completed,
                    current_streak,
                    longest_streak,
                    last_active_date,
                    level,
                    monthly_stats,
                    first_login_date,
                    pet_interactions
                FROM user_progress
                WHERE user_id = :user_id
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":user_id": user_id}, |row| {
                ProgressRow::try_from(row)
            })
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_record()?)),
            None => Ok(None),
        }
    }

    /// Whole-record overwrite; the ledger is always persisted as one unit.
    pub fn upsert(conn: &Connection, progress: &UserProgress) -> AppResult<()> {
        let row = ProgressRow::from_record(progress)?;

        conn.execute(
            r#"
                INSERT INTO user_progress (
                    user_id, total_points, available_points, total_points_spent,
                    tasks_completed, current_streak, longest_streak,
                    last_active_date, level, monthly_stats,
                    first_login_date, pet_interactions
                ) VALUES (
                    :user_id, :total_points, :available_points, :total_points_spent,
                    :tasks_completed, :current_streak, :longest_streak,
                    :last_active_date, :level, :monthly_stats,
                    :first_login_date, :pet_interactions
                )
                ON CONFLICT(user_id) DO UPDATE SET
                    total_points = excluded.total_points,
                    available_points = excluded.available_points,
                    total_points_spent = excluded.total_points_spent,
                    tasks_completed = excluded.tasks_completed,
                    current_streak = excluded.current_streak,
                    longest_streak = excluded.longest_streak,
                    last_active_date = excluded.last_active_date,
                    level = excluded.level,
                    monthly_stats = excluded.monthly_stats,
                    first_login_date = excluded.first_login_date,
                    pet_interactions = excluded.pet_interactions
            "#,
            named_params! {
                ":user_id": &row.user_id,
                ":total_points": row.total_points,
                ":available_points": row.available_points,
                ":total_points_spent": row.total_points_spent,
                ":tasks_completed": row.tasks_completed,
                ":current_streak": row.current_streak,
                ":longest_streak": row.longest_streak,
                ":last_active_date": &row.last_active_date,
                ":level": row.level,
                ":monthly_stats": &row.monthly_stats,
                ":first_login_date": &row.first_login_date,
                ":pet_interactions": row.pet_interactions,
            },
        )?;

        Ok(())
    }
}
