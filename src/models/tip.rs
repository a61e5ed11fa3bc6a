use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TipCategory {
    General,
    Anxiety,
    Stress,
    Mood,
    Sleep,
    Mindfulness,
    Relationships,
    Productivity,
    SelfCare,
    Gratitude,
    Exercise,
    Nutrition,
}

impl TipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipCategory::General => "general",
            TipCategory::Anxiety => "anxiety",
            TipCategory::Stress => "stress",
            TipCategory::Mood => "mood",
            TipCategory::Sleep => "sleep",
            TipCategory::Mindfulness => "mindfulness",
            TipCategory::Relationships => "relationships",
            TipCategory::Productivity => "productivity",
            TipCategory::SelfCare => "self_care",
            TipCategory::Gratitude => "gratitude",
            TipCategory::Exercise => "exercise",
            TipCategory::Nutrition => "nutrition",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TipCategory::General => "General Wellness",
            TipCategory::Anxiety => "Anxiety",
            TipCategory::Stress => "Stress",
            TipCategory::Mood => "Mood",
            TipCategory::Sleep => "Sleep",
            TipCategory::Mindfulness => "Mindfulness",
            TipCategory::Relationships => "Relationships",
            TipCategory::Productivity => "Productivity",
            TipCategory::SelfCare => "Self-Care",
            TipCategory::Gratitude => "Gratitude",
            TipCategory::Exercise => "Exercise",
            TipCategory::Nutrition => "Nutrition",
        }
    }

    /// Lenient parse used on model output; anything unrecognized lands on
    /// `General` rather than failing the generation.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "anxiety" => TipCategory::Anxiety,
            "stress" => TipCategory::Stress,
            "mood" => TipCategory::Mood,
            "sleep" => TipCategory::Sleep,
            "mindfulness" => TipCategory::Mindfulness,
            "relationships" => TipCategory::Relationships,
            "productivity" => TipCategory::Productivity,
            "self_care" | "self-care" => TipCategory::SelfCare,
            "gratitude" => TipCategory::Gratitude,
            "exercise" => TipCategory::Exercise,
            "nutrition" => TipCategory::Nutrition,
            _ => TipCategory::General,
        }
    }
}

impl fmt::Display for TipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TipCategory {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "general" => Ok(TipCategory::General),
            "anxiety" => Ok(TipCategory::Anxiety),
            "stress" => Ok(TipCategory::Stress),
            "mood" => Ok(TipCategory::Mood),
            "sleep" => Ok(TipCategory::Sleep),
            "mindfulness" => Ok(TipCategory::Mindfulness),
            "relationships" => Ok(TipCategory::Relationships),
            "productivity" => Ok(TipCategory::Productivity),
            "self_care" => Ok(TipCategory::SelfCare),
            "gratitude" => Ok(TipCategory::Gratitude),
            "exercise" => Ok(TipCategory::Exercise),
            "nutrition" => Ok(TipCategory::Nutrition),
            other => Err(format!("unsupported tip category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TipDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TipDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipDifficulty::Easy => "easy",
            TipDifficulty::Medium => "medium",
            TipDifficulty::Hard => "hard",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "medium" => TipDifficulty::Medium,
            "hard" => TipDifficulty::Hard,
            _ => TipDifficulty::Easy,
        }
    }
}

impl fmt::Display for TipDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TipDifficulty {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "easy" => Ok(TipDifficulty::Easy),
            "medium" => Ok(TipDifficulty::Medium),
            "hard" => Ok(TipDifficulty::Hard),
            other => Err(format!("unsupported tip difficulty: {other}")),
        }
    }
}

/// Points credited the first time a user reads their daily tip.
pub const FIRST_VIEW_POINTS: i64 = 5;

/// One mental-health tip per user per day, keyed `{user}_tip_{date}`.
/// Lifecycle: absent → generated (unviewed) → viewed; `points_awarded`
/// guards the view credit against being claimed twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentalHealthTip {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub category: TipCategory,
    pub difficulty: TipDifficulty,
    pub is_personalized: bool,
    pub based_on_emotions: Vec<String>,
    pub based_on_tasks: Vec<String>,
    pub created_at: i64,
    pub viewed_at: i64,
    pub is_viewed: bool,
    pub points_awarded: bool,
    pub ai_model: String,
}

impl MentalHealthTip {
    pub fn document_id(user_id: &str, date: &str) -> String {
        format!("{user_id}_tip_{date}")
    }
}

/// Personalization context gathered from recent activity before asking the
/// model for a tip.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipGenerationContext {
    pub user_id: String,
    pub date: String,
    pub user_emotions: Vec<String>,
    pub recent_tasks: Vec<String>,
    pub previous_tips: Vec<String>,
}

impl TipGenerationContext {
    pub fn is_personalized(&self) -> bool {
        !self.user_emotions.is_empty() || !self.recent_tasks.is_empty()
    }
}

/// The structured payload the model must return.
#[derive(Debug, Clone, Deserialize)]
pub struct TipDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub difficulty: String,
}
