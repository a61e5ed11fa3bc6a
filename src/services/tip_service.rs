use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::repositories::questionnaire_repository::QuestionnaireRepository;
use crate::db::repositories::task_repository::TaskRepository;
use crate::db::repositories::tip_repository::TipRepository;
use crate::db::DbPool;
use crate::error::{AiErrorCode, AppError, AppResult};
use crate::models::tip::{
    MentalHealthTip, TipCategory, TipDifficulty, TipDraft, TipGenerationContext,
    FIRST_VIEW_POINTS,
};
use crate::services::progress_service::ProgressService;
use crate::utils::dates::{day_offset, now_millis, today_string};

/// Stored as `ai_model` when the static pool produced the tip.
pub const FALLBACK_MODEL: &str = "fallback";

const RECENT_CONTEXT_DAYS: i64 = 7;
const RECENT_TASK_TITLE_LIMIT: usize = 10;
const PROMPT_PREVIOUS_TIP_LIMIT: usize = 3;

/// One mental-health tip per user per day: absent → generated (unviewed) →
/// viewed. Generation calls an OpenAI-compatible endpoint and falls back to
/// a built-in pool on any failure; the view credit is guarded against
/// double-claiming via the stored flags, never the in-memory cache.
pub struct TipService {
    db: DbPool,
    progress_service: Arc<ProgressService>,
    provider: Option<OpenAiProvider>,
    cache: RwLock<HashMap<String, MentalHealthTip>>,
}

#[derive(Debug, Clone)]
pub struct TipServiceConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub http_timeout: StdDuration,
}

impl TipServiceConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("PETPAL_OPENAI_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let api_base_url = std::env::var("PETPAL_OPENAI_BASE_URL")
            .ok()
            .unwrap_or_else(|| "https://api.openai.com".to_string());
        let model = std::env::var("PETPAL_OPENAI_MODEL")
            .ok()
            .unwrap_or_else(|| "gpt-3.5-turbo".to_string());

        Self {
            api_key,
            api_base_url,
            model,
            http_timeout: StdDuration::from_secs(30),
        }
    }

    fn build_provider(&self) -> AppResult<Option<OpenAiProvider>> {
        match &self.api_key {
            Some(api_key) => Ok(Some(OpenAiProvider::try_new(self, api_key.clone())?)),
            None => Ok(None),
        }
    }
}

impl TipService {
    pub fn new(db: DbPool, progress_service: Arc<ProgressService>) -> AppResult<Self> {
        Self::with_config(db, progress_service, TipServiceConfig::from_env())
    }

    pub fn with_config(
        db: DbPool,
        progress_service: Arc<ProgressService>,
        config: TipServiceConfig,
    ) -> AppResult<Self> {
        let provider = config.build_provider()?;

        if provider.is_none() {
            warn!(
                target: "app::tips",
                "no API key configured, tips will come from the fallback pool"
            );
        }

        Ok(Self {
            db,
            progress_service,
            provider,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Today's tip, if one has been generated.
    pub fn todays_tip(&self, user_id: &str) -> AppResult<Option<MentalHealthTip>> {
        let tip_id = MentalHealthTip::document_id(user_id, &today_string());

        if let Some(tip) = self.cached(&tip_id) {
            return Ok(Some(tip));
        }

        let conn = self.db.get_connection()?;
        let tip = TipRepository::find(&conn, &tip_id)?;

        if let Some(tip) = &tip {
            self.remember(tip.clone());
        }

        Ok(tip)
    }

    /// Generates (or returns) today's tip. Idempotent per (user, day): an
    /// existing tip is returned as-is. Any provider failure is recovered
    /// locally via the fallback pool and never surfaces to the caller.
    pub async fn generate_todays_tip(&self, user_id: &str) -> AppResult<MentalHealthTip> {
        self.generate_tip_for(user_id, &today_string()).await
    }

    pub async fn generate_tip_for(&self, user_id: &str, date: &str) -> AppResult<MentalHealthTip> {
        let tip_id = MentalHealthTip::document_id(user_id, date);

        {
            let conn = self.db.get_connection()?;
            if let Some(existing) = TipRepository::find(&conn, &tip_id)? {
                debug!(target: "app::tips", %tip_id, "tip already generated for today");
                self.remember(existing.clone());
                return Ok(existing);
            }
        }

        let context = self.build_context(user_id, date)?;

        let generated = match &self.provider {
            Some(provider) => provider.generate_tip(&context).await,
            None => Err(AppError::ai(
                AiErrorCode::MissingApiKey,
                "API key not configured",
            )),
        };

        let tip = match generated {
            Ok(draft) => {
                let model = self
                    .provider
                    .as_ref()
                    .map(|provider| provider.model.as_str())
                    .unwrap_or(FALLBACK_MODEL);
                tip_from_draft(&context, draft, model)
            }
            Err(error) => {
                warn!(
                    target: "app::tips",
                    user_id,
                    error = %error,
                    "tip generation failed, using fallback pool"
                );
                fallback_tip(&context, &mut rand::thread_rng())
            }
        };

        let conn = self.db.get_connection()?;
        TipRepository::upsert(&conn, &tip)?;
        self.remember(tip.clone());

        info!(
            target: "app::tips",
            user_id,
            date,
            personalized = tip.is_personalized,
            model = %tip.ai_model,
            "daily tip ready"
        );

        Ok(tip)
    }

    /// Marks a tip viewed and credits `FIRST_VIEW_POINTS` exactly once.
    /// Returns whether this call was the first view; repeated calls succeed
    /// without touching the ledger. The guard reads the stored row, not the
    /// cache, so a stale client cannot double-claim.
    pub fn mark_tip_viewed(&self, tip_id: &str) -> AppResult<bool> {
        let conn = self.db.get_connection()?;

        let tip = TipRepository::find(&conn, tip_id)?.ok_or_else(AppError::not_found)?;

        if tip.is_viewed {
            debug!(target: "app::tips", %tip_id, "tip already viewed, skipping award");
            self.remember(tip);
            return Ok(false);
        }

        TipRepository::mark_viewed(&conn, tip_id, now_millis())?;

        self.progress_service
            .record_completion(&tip.user_id, FIRST_VIEW_POINTS, false)?;

        if let Some(updated) = TipRepository::find(&conn, tip_id)? {
            self.remember(updated);
        }

        info!(
            target: "app::tips",
            %tip_id,
            user_id = %tip.user_id,
            points = FIRST_VIEW_POINTS,
            "tip viewed and points awarded"
        );

        Ok(true)
    }

    fn build_context(&self, user_id: &str, date: &str) -> AppResult<TipGenerationContext> {
        let conn = self.db.get_connection()?;

        let cutoff =
            day_offset(date, -RECENT_CONTEXT_DAYS).unwrap_or_else(|| date.to_string());

        let mut user_emotions: Vec<String> = Vec::new();
        for questionnaire in QuestionnaireRepository::completed_since(&conn, user_id, &cutoff)? {
            for emotion in questionnaire.selected_emotions {
                if !user_emotions.contains(&emotion) {
                    user_emotions.push(emotion);
                }
            }
        }

        let recent_tasks =
            TaskRepository::completed_titles_since(&conn, user_id, &cutoff, RECENT_TASK_TITLE_LIMIT)?;
        let previous_tips = TipRepository::recent_titles(&conn, user_id, &cutoff)?;

        Ok(TipGenerationContext {
            user_id: user_id.to_string(),
            date: date.to_string(),
            user_emotions,
            recent_tasks,
            previous_tips,
        })
    }

    fn cached(&self, tip_id: &str) -> Option<MentalHealthTip> {
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(tip_id).cloned())
    }

    fn remember(&self, tip: MentalHealthTip) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(tip.id.clone(), tip);
        }
    }
}

struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiProvider {
    fn try_new(config: &TipServiceConfig, api_key: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build HTTP client: {err}")))?;

        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let endpoint = format!("{base_url}/v1/chat/completions");

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: config.model.clone(),
        })
    }

    async fn generate_tip(&self, context: &TipGenerationContext) -> AppResult<TipDraft> {
        let correlation_id = Uuid::new_v4().to_string();
        let request_body = self.build_request_body(context);
        let backoff_schedule = [
            StdDuration::from_secs(0),
            StdDuration::from_secs(1),
            StdDuration::from_secs(2),
            StdDuration::from_secs(4),
        ];

        let mut last_error: Option<AppError> = None;

        for (attempt, delay) in backoff_schedule.iter().enumerate() {
            if *delay > StdDuration::from_secs(0) {
                sleep(*delay).await;
            }

            debug!(
                target: "app::tips::provider",
                attempt = attempt + 1,
                correlation_id = %correlation_id,
                emotions = context.user_emotions.len(),
                "requesting tip"
            );

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let body: JsonValue = resp.json().await.map_err(|err| {
                            AppError::ai_with_details(
                                AiErrorCode::InvalidResponse,
                                "failed to read completion response",
                                Some(correlation_id.as_str()),
                                Some(json!({ "reason": err.to_string() })),
                            )
                        })?;

                        let content = body
                            .pointer("/choices/0/message/content")
                            .and_then(|value| value.as_str())
                            .ok_or_else(|| {
                                AppError::ai_with_details(
                                    AiErrorCode::InvalidResponse,
                                    "completion response missing message.content",
                                    Some(correlation_id.as_str()),
                                    Some(json!({ "reason": "missing_message_content" })),
                                )
                            })?;

                        return parse_tip_content(content, &correlation_id);
                    }

                    let (error, retryable) = Self::map_http_error(status, correlation_id.as_str());
                    warn!(
                        target: "app::tips::provider",
                        correlation_id = %correlation_id,
                        status = status.as_u16(),
                        retryable,
                        "provider returned non-success status"
                    );

                    if !retryable || attempt == backoff_schedule.len() - 1 {
                        return Err(error);
                    }

                    last_error = Some(error);
                    continue;
                }
                Err(err) => {
                    let (error, retryable) = Self::error_from_reqwest(err, correlation_id.as_str());
                    warn!(
                        target: "app::tips::provider",
                        correlation_id = %correlation_id,
                        retryable,
                        "provider request error"
                    );

                    if !retryable || attempt == backoff_schedule.len() - 1 {
                        return Err(error);
                    }

                    last_error = Some(error);
                    continue;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::ai_with_details(
                AiErrorCode::Unavailable,
                "tip provider request failed",
                Some(correlation_id.as_str()),
                None,
            )
        }))
    }

    fn build_request_body(&self, context: &TipGenerationContext) -> JsonValue {
        json!({
            "model": self.model,
            "max_tokens": 200,
            "temperature": 1.0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "user", "content": build_prompt(context) }
            ]
        })
    }

    fn map_http_error(status: StatusCode, correlation_id: &str) -> (AppError, bool) {
        match status {
            StatusCode::UNAUTHORIZED => (
                AppError::ai_with_details(
                    AiErrorCode::MissingApiKey,
                    "API key invalid or unauthorized",
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
            StatusCode::FORBIDDEN => (
                AppError::ai_with_details(
                    AiErrorCode::Forbidden,
                    "API key lacks permission",
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
            StatusCode::TOO_MANY_REQUESTS => (
                AppError::ai_with_details(
                    AiErrorCode::RateLimited,
                    "provider rate limit hit",
                    Some(correlation_id),
                    None,
                ),
                true,
            ),
            status if status.is_server_error() => (
                AppError::ai_with_details(
                    AiErrorCode::Unavailable,
                    format!("provider unavailable (status {})", status.as_u16()),
                    Some(correlation_id),
                    None,
                ),
                true,
            ),
            StatusCode::BAD_REQUEST => (
                AppError::ai_with_details(
                    AiErrorCode::InvalidRequest,
                    "provider rejected the request",
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
            status => (
                AppError::ai_with_details(
                    AiErrorCode::Unknown,
                    format!("provider returned status {}", status.as_u16()),
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
        }
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> (AppError, bool) {
        if err.is_timeout() {
            (
                AppError::ai_with_details(
                    AiErrorCode::HttpTimeout,
                    "provider request timed out",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if err.is_connect() {
            (
                AppError::ai_with_details(
                    AiErrorCode::Unavailable,
                    "provider connection failed",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if let Some(status) = err.status() {
            Self::map_http_error(status, correlation_id)
        } else {
            (
                AppError::ai_with_details(
                    AiErrorCode::Unknown,
                    format!("provider request failed: {err}"),
                    Some(correlation_id),
                    None,
                ),
                false,
            )
        }
    }
}

fn build_prompt(context: &TipGenerationContext) -> String {
    let mut prompt = String::from(
        "Generate a brief, actionable mental health tip (max 150 words) that is:\n\
         - Practical and easy to implement\n\
         - Positive and encouraging\n\
         - Suitable for daily practice\n\
         - Evidence-based\n\n\
         Format the response as JSON with these fields:\n\
         {\n\
             \"title\": \"Short tip title\",\n\
             \"content\": \"Main tip content\",\n\
             \"category\": \"one of: general, anxiety, stress, mood, sleep, mindfulness, relationships, productivity, self_care, gratitude, exercise, nutrition\",\n\
             \"difficulty\": \"easy, medium, or hard\"\n\
         }",
    );

    if !context.user_emotions.is_empty() {
        prompt.push_str(&format!(
            "\n\nUser's recent emotions: {}",
            context.user_emotions.join(", ")
        ));
        prompt.push_str("\nPlease tailor the tip to help with these emotional states.");
    }

    if !context.recent_tasks.is_empty() {
        prompt.push_str(&format!(
            "\n\nUser has been working on: {}",
            context.recent_tasks.join(", ")
        ));
        prompt.push_str("\nConsider their current self-care activities.");
    }

    if !context.previous_tips.is_empty() {
        let recent: Vec<&str> = context
            .previous_tips
            .iter()
            .take(PROMPT_PREVIOUS_TIP_LIMIT)
            .map(|title| title.as_str())
            .collect();
        prompt.push_str(&format!(
            "\n\nAvoid repeating these recent topics: {}",
            recent.join(", ")
        ));
    }

    prompt.push_str("\n\nMake the tip feel personal and relevant to their current situation.");

    prompt
}

fn parse_tip_content(content: &str, correlation_id: &str) -> AppResult<TipDraft> {
    let trimmed = content.trim();
    let cleaned = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    serde_json::from_str(cleaned).map_err(|err| {
        AppError::ai_with_details(
            AiErrorCode::InvalidResponse,
            format!("completion content is not a tip: {err}"),
            Some(correlation_id),
            Some(json!({ "reason": "invalid_json" })),
        )
    })
}

fn tip_from_draft(context: &TipGenerationContext, draft: TipDraft, model: &str) -> MentalHealthTip {
    MentalHealthTip {
        id: MentalHealthTip::document_id(&context.user_id, &context.date),
        user_id: context.user_id.clone(),
        date: context.date.clone(),
        title: draft.title,
        content: draft.content,
        category: TipCategory::parse_lenient(&draft.category),
        difficulty: TipDifficulty::parse_lenient(&draft.difficulty),
        is_personalized: context.is_personalized(),
        based_on_emotions: context.user_emotions.clone(),
        based_on_tasks: context.recent_tasks.clone(),
        created_at: now_millis(),
        viewed_at: 0,
        is_viewed: false,
        points_awarded: false,
        ai_model: model.to_string(),
    }
}

struct FallbackTip {
    title: &'static str,
    content: &'static str,
    category: TipCategory,
    difficulty: TipDifficulty,
}

const FALLBACK_POOL: &[FallbackTip] = &[
    FallbackTip {
        title: "Take a Mindful Moment",
        content: "Take 3 deep breaths and notice 5 things you can see, 4 things you can touch, 3 things you can hear, 2 things you can smell, and 1 thing you can taste. This grounding technique helps bring you into the present moment.",
        category: TipCategory::Mindfulness,
        difficulty: TipDifficulty::Easy,
    },
    FallbackTip {
        title: "Gratitude Check-In",
        content: "Write down three things you're grateful for today, no matter how small. It could be your morning coffee, a text from a friend, or simply having a roof over your head. Gratitude shifts our focus to the positive.",
        category: TipCategory::Gratitude,
        difficulty: TipDifficulty::Easy,
    },
    FallbackTip {
        title: "Move Your Body",
        content: "Take a 5-minute walk, do some gentle stretches, or dance to your favorite song. Physical movement releases endorphins and can instantly boost your mood while reducing stress and anxiety.",
        category: TipCategory::Exercise,
        difficulty: TipDifficulty::Easy,
    },
    FallbackTip {
        title: "Digital Detox Break",
        content: "Put your phone in another room for 30 minutes and engage in a screen-free activity. Read a book, take a bath, or have a face-to-face conversation. Your mind will thank you for the break.",
        category: TipCategory::Stress,
        difficulty: TipDifficulty::Medium,
    },
    FallbackTip {
        title: "Self-Compassion Practice",
        content: "Talk to yourself like you would talk to a good friend. When you notice self-criticism, pause and ask: 'What would I say to a friend in this situation?' Treat yourself with the same kindness.",
        category: TipCategory::SelfCare,
        difficulty: TipDifficulty::Medium,
    },
    FallbackTip {
        title: "Create a Calming Ritual",
        content: "Establish a 10-minute evening routine that signals to your brain it's time to wind down. This could include gentle stretching, herbal tea, journaling, or listening to calming music.",
        category: TipCategory::Sleep,
        difficulty: TipDifficulty::Medium,
    },
    FallbackTip {
        title: "Connect with Nature",
        content: "Step outside and spend at least 10 minutes in nature. If you can't go outside, sit by a window or tend to a houseplant. Nature connection reduces cortisol levels and improves mood.",
        category: TipCategory::Mood,
        difficulty: TipDifficulty::Easy,
    },
    FallbackTip {
        title: "Reach Out to Someone",
        content: "Send a text, make a call, or write a note to someone you care about. Social connections are vital for mental health, and often the simple act of reaching out benefits both people.",
        category: TipCategory::Relationships,
        difficulty: TipDifficulty::Easy,
    },
];

/// Picks from the static pool, preferring tips whose text overlaps the
/// user's recent emotions; falls back to a uniform pick otherwise.
fn fallback_tip<R: Rng>(context: &TipGenerationContext, rng: &mut R) -> MentalHealthTip {
    let relevant: Vec<&FallbackTip> = if context.user_emotions.is_empty() {
        FALLBACK_POOL.iter().collect()
    } else {
        let matching: Vec<&FallbackTip> = FALLBACK_POOL
            .iter()
            .filter(|tip| {
                context.user_emotions.iter().any(|emotion| {
                    let emotion = emotion.to_lowercase();
                    tip.content.to_lowercase().contains(&emotion)
                        || tip
                            .category
                            .display_name()
                            .to_lowercase()
                            .contains(&emotion)
                })
            })
            .collect();

        if matching.is_empty() {
            FALLBACK_POOL.iter().collect()
        } else {
            matching
        }
    };

    // The pool is a non-empty constant, so a pick always exists.
    let selected = relevant
        .choose(rng)
        .copied()
        .unwrap_or(&FALLBACK_POOL[0]);

    MentalHealthTip {
        id: MentalHealthTip::document_id(&context.user_id, &context.date),
        user_id: context.user_id.clone(),
        date: context.date.clone(),
        title: selected.title.to_string(),
        content: selected.content.to_string(),
        category: selected.category,
        difficulty: selected.difficulty,
        is_personalized: false,
        based_on_emotions: context.user_emotions.clone(),
        based_on_tasks: context.recent_tasks.clone(),
        created_at: now_millis(),
        viewed_at: 0,
        is_viewed: false,
        points_awarded: false,
        ai_model: FALLBACK_MODEL.to_string(),
    }
}

/// Test seams over provider internals that integration tests exercise
/// without a live endpoint.
pub mod testing {
    use super::*;

    pub fn map_http_error(status: StatusCode) -> (AppError, bool) {
        OpenAiProvider::map_http_error(status, "test-correlation-id")
    }

    pub fn parse_tip_draft(content: &str) -> AppResult<TipDraft> {
        parse_tip_content(content, "test-correlation-id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context(emotions: &[&str]) -> TipGenerationContext {
        TipGenerationContext {
            user_id: "user-1".to_string(),
            date: "2024-03-05".to_string(),
            user_emotions: emotions.iter().map(|e| e.to_string()).collect(),
            recent_tasks: vec!["Hydrate".to_string()],
            previous_tips: vec![
                "Tip A".to_string(),
                "Tip B".to_string(),
                "Tip C".to_string(),
                "Tip D".to_string(),
            ],
        }
    }

    #[test]
    fn prompt_includes_personalization_sections() {
        let prompt = build_prompt(&context(&["sad", "tired"]));

        assert!(prompt.contains("User's recent emotions: sad, tired"));
        assert!(prompt.contains("User has been working on: Hydrate"));
        // Only the three most recent tip titles make it into the prompt.
        assert!(prompt.contains("Tip A, Tip B, Tip C"));
        assert!(!prompt.contains("Tip D"));
    }

    #[test]
    fn prompt_omits_empty_sections() {
        let context = TipGenerationContext {
            user_id: "user-1".to_string(),
            date: "2024-03-05".to_string(),
            ..TipGenerationContext::default()
        };

        let prompt = build_prompt(&context);

        assert!(!prompt.contains("recent emotions"));
        assert!(!prompt.contains("working on"));
        assert!(!prompt.contains("Avoid repeating"));
    }

    #[test]
    fn parse_tip_content_accepts_fenced_json() {
        let content = "```json\n{\"title\":\"T\",\"content\":\"C\",\"category\":\"sleep\",\"difficulty\":\"medium\"}\n```";

        let draft = parse_tip_content(content, "test").expect("draft parses");

        assert_eq!(draft.title, "T");
        assert_eq!(draft.category, "sleep");
    }

    #[test]
    fn parse_tip_content_rejects_non_json() {
        let error = parse_tip_content("have a nice day", "test").expect_err("must fail");
        assert_eq!(error.ai_code(), Some(AiErrorCode::InvalidResponse));
    }

    #[test]
    fn draft_conversion_is_lenient_about_labels() {
        let draft = TipDraft {
            title: "T".to_string(),
            content: "C".to_string(),
            category: "Self-Care".to_string(),
            difficulty: "impossible".to_string(),
        };

        let tip = tip_from_draft(&context(&["sad"]), draft, "gpt-test");

        assert_eq!(tip.category, TipCategory::SelfCare);
        assert_eq!(tip.difficulty, TipDifficulty::Easy);
        assert!(tip.is_personalized);
        assert_eq!(tip.ai_model, "gpt-test");
        assert_eq!(tip.id, "user-1_tip_2024-03-05");
    }

    #[test]
    fn fallback_prefers_emotion_overlap() {
        let context = context(&["grateful"]);

        for seed in 0..12 {
            let mut rng = StdRng::seed_from_u64(seed);
            let tip = fallback_tip(&context, &mut rng);
            assert!(
                tip.content.to_lowercase().contains("grateful"),
                "expected a gratitude-flavored tip, got {}",
                tip.title
            );
            assert_eq!(tip.ai_model, FALLBACK_MODEL);
            assert!(!tip.is_personalized);
        }
    }

    #[test]
    fn fallback_without_overlap_uses_full_pool() {
        let context = context(&["zzz-unmatched"]);
        let mut rng = StdRng::seed_from_u64(3);

        let tip = fallback_tip(&context, &mut rng);

        assert!(!tip.title.is_empty());
        assert_eq!(tip.based_on_emotions, vec!["zzz-unmatched"]);
    }
}
