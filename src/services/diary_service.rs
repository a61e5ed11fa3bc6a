use tracing::info;

use crate::db::repositories::diary_repository::DiaryRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::diary::{DiaryEntry, DiaryEntryInput, DiaryFilter, DiarySortOption, DiaryStats};
use crate::models::history::EmotionCount;
use crate::utils::dates::{day_offset, month_key, now_millis, today_string};

/// Bound on the backward walk when computing the consecutive-day streak.
const STREAK_LOOKBACK_DAYS: usize = 365;
const TOP_TAG_LIMIT: usize = 5;

/// Journaling: one entry per user per day plus read-side filtering and
/// statistics.
pub struct DiaryService {
    db: DbPool,
}

impl DiaryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Creates or overwrites the entry for `input.date`, recomputing the
    /// word count. The original creation instant survives overwrites.
    pub fn save_entry(&self, user_id: &str, input: DiaryEntryInput) -> AppResult<DiaryEntry> {
        let conn = self.db.get_connection()?;

        let now = now_millis();
        let existing = DiaryRepository::find(&conn, user_id, &input.date)?;

        let entry = DiaryEntry {
            id: DiaryEntry::document_id(user_id, &input.date),
            user_id: user_id.to_string(),
            date: input.date,
            title: input.title,
            word_count: DiaryEntry::word_count_of(&input.content),
            content: input.content,
            mood: input.mood,
            mood_emoji: input.mood_emoji,
            tags: input.tags,
            created_at: existing.map(|e| e.created_at).unwrap_or(now),
            updated_at: now,
        };

        DiaryRepository::upsert(&conn, &entry)?;

        info!(
            target: "app::diary",
            user_id,
            date = %entry.date,
            words = entry.word_count,
            "diary entry saved"
        );

        Ok(entry)
    }

    pub fn entry(&self, user_id: &str, date: &str) -> AppResult<Option<DiaryEntry>> {
        let conn = self.db.get_connection()?;
        DiaryRepository::find(&conn, user_id, date)
    }

    pub fn has_entry_today(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.entry(user_id, &today_string())?.is_some())
    }

    pub fn delete_entry(&self, entry_id: &str) -> AppResult<()> {
        let conn = self.db.get_connection()?;
        DiaryRepository::delete(&conn, entry_id)
    }

    pub fn entries(&self, user_id: &str, filter: &DiaryFilter) -> AppResult<Vec<DiaryEntry>> {
        let conn = self.db.get_connection()?;
        let entries = DiaryRepository::list_for_user(&conn, user_id)?;
        Ok(apply_filters(entries, filter))
    }

    pub fn stats(&self, user_id: &str) -> AppResult<DiaryStats> {
        self.stats_on(user_id, &today_string())
    }

    pub fn stats_on(&self, user_id: &str, today: &str) -> AppResult<DiaryStats> {
        let conn = self.db.get_connection()?;
        let entries = DiaryRepository::list_for_user(&conn, user_id)?;
        Ok(compute_stats(&entries, today))
    }
}

fn apply_filters(entries: Vec<DiaryEntry>, filter: &DiaryFilter) -> Vec<DiaryEntry> {
    let search = filter.search_text.to_lowercase();

    let mut filtered: Vec<DiaryEntry> = entries
        .into_iter()
        .filter(|entry| filter.start_date.is_empty() || entry.date >= filter.start_date)
        .filter(|entry| filter.end_date.is_empty() || entry.date <= filter.end_date)
        .filter(|entry| filter.mood.is_empty() || entry.mood == filter.mood)
        .filter(|entry| {
            search.is_empty()
                || entry.title.to_lowercase().contains(&search)
                || entry.content.to_lowercase().contains(&search)
        })
        .filter(|entry| {
            filter.tags.is_empty() || filter.tags.iter().any(|tag| entry.tags.contains(tag))
        })
        .collect();

    match filter.sort_by {
        DiarySortOption::DateDesc => filtered.sort_by(|a, b| b.date.cmp(&a.date)),
        DiarySortOption::DateAsc => filtered.sort_by(|a, b| a.date.cmp(&b.date)),
        DiarySortOption::WordCountDesc => filtered.sort_by(|a, b| b.word_count.cmp(&a.word_count)),
        DiarySortOption::WordCountAsc => filtered.sort_by(|a, b| a.word_count.cmp(&b.word_count)),
        DiarySortOption::TitleAsc => filtered.sort_by(|a, b| a.title.cmp(&b.title)),
    }

    filtered
}

fn compute_stats(entries: &[DiaryEntry], today: &str) -> DiaryStats {
    if entries.is_empty() {
        return DiaryStats::default();
    }

    let total_entries = entries.len() as i64;
    let total_words: i64 = entries.iter().map(|e| e.word_count).sum();
    let longest_entry = entries.iter().map(|e| e.word_count).max().unwrap_or(0);

    // Walk backwards from today until the first day without an entry.
    let mut current_streak = 0i64;
    let mut check_date = today.to_string();
    for _ in 0..STREAK_LOOKBACK_DAYS {
        if !entries.iter().any(|entry| entry.date == check_date) {
            break;
        }
        current_streak += 1;
        match day_offset(&check_date, -1) {
            Some(previous) => check_date = previous,
            None => break,
        }
    }

    let mut active_days: Vec<&str> = Vec::new();
    // Insertion-ordered counting keeps first-encountered winners on ties.
    let mut mood_counts: Vec<(&str, i64)> = Vec::new();
    let mut tag_counts: Vec<(&str, i64)> = Vec::new();
    let mut entries_by_month = std::collections::BTreeMap::new();

    for entry in entries {
        if !active_days.contains(&entry.date.as_str()) {
            active_days.push(&entry.date);
        }

        if !entry.mood.is_empty() {
            match mood_counts.iter_mut().find(|(mood, _)| *mood == entry.mood) {
                Some((_, count)) => *count += 1,
                None => mood_counts.push((&entry.mood, 1)),
            }
        }

        for tag in &entry.tags {
            match tag_counts.iter_mut().find(|(name, _)| name == tag) {
                Some((_, count)) => *count += 1,
                None => tag_counts.push((tag, 1)),
            }
        }

        *entries_by_month
            .entry(month_key(&entry.date).to_string())
            .or_insert(0) += 1;
    }

    let most_common = mood_counts.iter().max_by_key(|(_, count)| *count);

    tag_counts.sort_by(|a, b| b.1.cmp(&a.1));
    let top_tags = tag_counts
        .into_iter()
        .take(TOP_TAG_LIMIT)
        .map(|(name, count)| EmotionCount {
            name: name.to_string(),
            count,
        })
        .collect();

    DiaryStats {
        total_entries,
        total_words,
        average_words_per_entry: total_words / total_entries,
        longest_entry,
        current_streak,
        active_days: active_days.len() as i64,
        most_common_mood: most_common.map(|(mood, _)| mood.to_string()).unwrap_or_default(),
        most_common_mood_count: most_common.map(|(_, count)| *count).unwrap_or(0),
        top_tags,
        entries_by_month,
    }
}
