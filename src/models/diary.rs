use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::history::EmotionCount;

/// One free-form journal entry per user per day, keyed `{user}_diary_{date}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub mood: String,
    pub mood_emoji: String,
    pub word_count: i64,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiaryEntry {
    pub fn document_id(user_id: &str, date: &str) -> String {
        format!("{user_id}_diary_{date}")
    }

    pub fn word_count_of(content: &str) -> i64 {
        content.split_whitespace().count() as i64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntryInput {
    pub date: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub mood_emoji: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiarySortOption {
    #[default]
    DateDesc,
    DateAsc,
    WordCountDesc,
    WordCountAsc,
    TitleAsc,
}

impl DiarySortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiarySortOption::DateDesc => "date_desc",
            DiarySortOption::DateAsc => "date_asc",
            DiarySortOption::WordCountDesc => "word_count_desc",
            DiarySortOption::WordCountAsc => "word_count_asc",
            DiarySortOption::TitleAsc => "title_asc",
        }
    }
}

impl fmt::Display for DiarySortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and ordering over a user's diary entries. Empty fields mean "no
/// constraint"; search text matches title or content case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryFilter {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sort_by: DiarySortOption,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiaryStats {
    pub total_entries: i64,
    pub total_words: i64,
    pub average_words_per_entry: i64,
    pub longest_entry: i64,
    pub current_streak: i64,
    pub active_days: i64,
    pub most_common_mood: String,
    pub most_common_mood_count: i64,
    pub top_tags: Vec<EmotionCount>,
    pub entries_by_month: BTreeMap<String, i64>,
}
