use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-month sub-ledger folded into [`UserProgress`]. `login_days` is a set
/// of day strings, not a counter, so re-recording the same day is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub month: String,
    pub total_points: i64,
    pub tasks_completed: i64,
    pub login_days: Vec<String>,
    pub streak_days: i64,
    pub points_spent: i64,
}

impl MonthlyStats {
    pub fn new(month: &str) -> Self {
        Self {
            month: month.to_string(),
            total_points: 0,
            tasks_completed: 0,
            login_days: Vec::new(),
            streak_days: 0,
            points_spent: 0,
        }
    }

    pub fn record_login_day(&mut self, date: &str) {
        if !self.login_days.iter().any(|day| day == date) {
            self.login_days.push(date.to_string());
        }
    }
}

/// The per-user progress ledger. Invariant held by construction:
/// `available_points == total_points - total_points_spent` — every credit
/// adds to both total and available, every debit subtracts only from
/// available and adds to spent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub total_points: i64,
    pub available_points: i64,
    pub total_points_spent: i64,
    pub tasks_completed: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: String,
    pub level: i64,
    pub monthly_stats: BTreeMap<String, MonthlyStats>,
    pub first_login_date: String,
    pub pet_interactions: i64,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_points: 0,
            available_points: 0,
            total_points_spent: 0,
            tasks_completed: 0,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: String::new(),
            level: 1,
            monthly_stats: BTreeMap::new(),
            first_login_date: String::new(),
            pet_interactions: 0,
        }
    }

    pub fn month_entry(&mut self, month: &str) -> &mut MonthlyStats {
        self.monthly_stats
            .entry(month.to_string())
            .or_insert_with(|| MonthlyStats::new(month))
    }
}

/// Pet care actions a user can spend points on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PetAction {
    Feed,
    Play,
    Care,
}

impl PetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetAction::Feed => "feed",
            PetAction::Play => "play",
            PetAction::Care => "care",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PetAction::Feed => "Feed",
            PetAction::Play => "Play",
            PetAction::Care => "Care",
        }
    }

    pub fn points_cost(&self) -> i64 {
        match self {
            PetAction::Feed => 20,
            PetAction::Play => 25,
            PetAction::Care => 15,
        }
    }

    pub fn happiness_increase(&self) -> i64 {
        match self {
            PetAction::Feed => 15,
            PetAction::Play => 10,
            PetAction::Care => 10,
        }
    }

    pub fn energy_increase(&self) -> i64 {
        match self {
            PetAction::Feed => 5,
            PetAction::Play => 20,
            PetAction::Care => 10,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PetAction::Feed => "🍎",
            PetAction::Play => "🎮",
            PetAction::Care => "❤️",
        }
    }
}

impl fmt::Display for PetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PetAction {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "feed" => Ok(PetAction::Feed),
            "play" => Ok(PetAction::Play),
            "care" => Ok(PetAction::Care),
            other => Err(format!("unsupported pet action: {other}")),
        }
    }
}
