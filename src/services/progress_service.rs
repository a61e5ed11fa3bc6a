use rusqlite::TransactionBehavior;
use tracing::{debug, info};

use crate::db::repositories::progress_repository::ProgressRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::progress::{PetAction, UserProgress};
use crate::utils::dates::{is_consecutive_day, month_key, today_string};

/// Streak bonus cap: `min(streak, 10)` extra points on the first qualifying
/// event of a day.
pub const MAX_STREAK_BONUS: i64 = 10;

/// The points/streak/level ledger. Every mutation runs inside one IMMEDIATE
/// transaction so concurrent completions and spends serialize on the write
/// lock instead of clobbering each other's read-modify-write.
pub struct ProgressService {
    db: DbPool,
}

impl ProgressService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Current ledger, initialized (and persisted) as a zero ledger when the
    /// user has none yet.
    pub fn progress(&self, user_id: &str) -> AppResult<UserProgress> {
        let conn = self.db.get_connection()?;

        if let Some(progress) = ProgressRepository::find(&conn, user_id)? {
            return Ok(progress);
        }

        let initial = UserProgress::new(user_id);
        ProgressRepository::upsert(&conn, &initial)?;
        debug!(target: "app::progress", user_id, "initialized empty ledger");
        Ok(initial)
    }

    /// Credits earned points (plus any streak bonus) for today's date.
    pub fn record_completion(
        &self,
        user_id: &str,
        points_earned: i64,
        counts_as_task: bool,
    ) -> AppResult<UserProgress> {
        self.record_completion_on(user_id, &today_string(), points_earned, counts_as_task)
    }

    /// Date-explicit variant of [`Self::record_completion`].
    pub fn record_completion_on(
        &self,
        user_id: &str,
        date: &str,
        points_earned: i64,
        counts_as_task: bool,
    ) -> AppResult<UserProgress> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = ProgressRepository::find(&tx, user_id)?
            .unwrap_or_else(|| UserProgress::new(user_id));

        let (updated, bonus) = apply_completion(current, date, points_earned, counts_as_task);

        ProgressRepository::upsert(&tx, &updated)?;
        tx.commit()?;

        info!(
            target: "app::progress",
            user_id,
            date,
            points_earned,
            bonus,
            streak = updated.current_streak,
            level = updated.level,
            "ledger credited"
        );

        Ok(updated)
    }

    /// Spends points on a pet action for today's date. Fails with
    /// `InsufficientPoints` (no mutation) when the balance doesn't cover the
    /// cost.
    pub fn spend_on_pet_action(&self, user_id: &str, action: PetAction) -> AppResult<UserProgress> {
        self.spend_on_pet_action_on(user_id, &today_string(), action)
    }

    pub fn spend_on_pet_action_on(
        &self,
        user_id: &str,
        date: &str,
        action: PetAction,
    ) -> AppResult<UserProgress> {
        let cost = action.points_cost();

        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = ProgressRepository::find(&tx, user_id)?
            .unwrap_or_else(|| UserProgress::new(user_id));

        if current.available_points < cost {
            return Err(AppError::insufficient_points(
                current.available_points,
                cost,
            ));
        }

        let mut updated = current;
        updated.available_points -= cost;
        updated.total_points_spent += cost;
        updated.pet_interactions += 1;

        let month = month_key(date).to_string();
        let month_stats = updated.month_entry(&month);
        month_stats.points_spent += cost;

        ProgressRepository::upsert(&tx, &updated)?;
        tx.commit()?;

        info!(
            target: "app::progress",
            user_id,
            action = %action,
            cost,
            available = updated.available_points,
            "points spent on pet action"
        );

        Ok(updated)
    }
}

/// The ledger step, applied to a loaded record. Returns the new ledger and
/// the streak bonus that was folded in.
///
/// Streak rule: one day after `last_active_date` continues the streak; the
/// same day leaves it untouched; anything else (gap, first activity) resets
/// it to 1. The bonus `min(streak, 10)` is granted only on the first
/// qualifying event of a day, i.e. while `last_active_date` still names a
/// different day — regardless of which event that is.
fn apply_completion(
    current: UserProgress,
    today: &str,
    points_earned: i64,
    counts_as_task: bool,
) -> (UserProgress, i64) {
    let new_streak = if is_consecutive_day(&current.last_active_date, today) {
        current.current_streak + 1
    } else if current.last_active_date != today {
        1
    } else {
        current.current_streak
    };

    let bonus = if current.last_active_date != today {
        new_streak.min(MAX_STREAK_BONUS)
    } else {
        0
    };

    let credited = points_earned + bonus;

    let mut updated = current;
    updated.total_points += credited;
    updated.available_points += credited;
    if counts_as_task {
        updated.tasks_completed += 1;
    }
    updated.current_streak = new_streak;
    updated.longest_streak = updated.longest_streak.max(new_streak);
    updated.last_active_date = today.to_string();
    updated.level = level_for_points(updated.total_points);
    if updated.first_login_date.is_empty() {
        updated.first_login_date = today.to_string();
    }

    let month = month_key(today).to_string();
    let month_stats = updated.month_entry(&month);
    month_stats.total_points += credited;
    if counts_as_task {
        month_stats.tasks_completed += 1;
    }
    month_stats.record_login_day(today);
    month_stats.streak_days = new_streak;

    (updated, bonus)
}

/// Level is a step function of lifetime points, capped at 10.
pub fn level_for_points(total_points: i64) -> i64 {
    match total_points {
        p if p >= 5000 => 10,
        p if p >= 3000 => 9,
        p if p >= 2000 => 8,
        p if p >= 1500 => 7,
        p if p >= 1000 => 6,
        p if p >= 750 => 5,
        p if p >= 500 => 4,
        p if p >= 250 => 3,
        p if p >= 100 => 2,
        _ => 1,
    }
}
