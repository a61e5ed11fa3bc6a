//! Versioned seed dataset for the read-only catalogs (emotions, relations,
//! task templates). Applied once at pool creation; bumping `SEED_VERSION`
//! re-applies the dataset on the next startup.

use rusqlite::Connection;
use tracing::info;

use crate::db::repositories::catalog_repository::CatalogRepository;
use crate::db::repositories::settings_repository::SettingsRepository;
use crate::error::AppResult;
use crate::models::catalog::{
    Emotion, EmotionRelation, TaskCategory, TaskDifficulty, TaskTemplate, TaskType,
};

const SEED_VERSION: i64 = 1;
const KEY_CATALOG_SEED_VERSION: &str = "catalog_seed_version";

pub fn apply(conn: &Connection) -> AppResult<()> {
    let applied = SettingsRepository::get(conn, KEY_CATALOG_SEED_VERSION)?
        .and_then(|row| row.value.parse::<i64>().ok())
        .unwrap_or(0);

    if applied >= SEED_VERSION {
        return Ok(());
    }

    for emotion in emotion_catalog() {
        CatalogRepository::upsert_emotion(conn, &emotion)?;
    }

    for relation in relation_catalog() {
        CatalogRepository::upsert_relation(conn, &relation)?;
    }

    for template in template_catalog() {
        CatalogRepository::upsert_template(conn, &template)?;
    }

    SettingsRepository::upsert(conn, KEY_CATALOG_SEED_VERSION, &SEED_VERSION.to_string())?;

    info!(
        target: "app::db",
        version = SEED_VERSION,
        "catalog seed applied"
    );

    Ok(())
}

fn emotion(id: &str, name: &str, emoji: &str, category: &str) -> Emotion {
    Emotion {
        id: id.to_string(),
        name: name.to_string(),
        emoji: emoji.to_string(),
        category: category.to_string(),
        is_active: true,
    }
}

fn emotion_catalog() -> Vec<Emotion> {
    vec![
        emotion("happy", "Happy", "😊", "positive"),
        emotion("excited", "Excited", "🤩", "positive"),
        emotion("grateful", "Grateful", "🙏", "positive"),
        emotion("peaceful", "Peaceful", "😌", "positive"),
        emotion("confident", "Confident", "💪", "positive"),
        emotion("loved", "Loved", "🥰", "positive"),
        emotion("proud", "Proud", "😎", "positive"),
        emotion("energetic", "Energetic", "⚡", "positive"),
        emotion("sad", "Sad", "😢", "negative"),
        emotion("anxious", "Anxious", "😰", "negative"),
        emotion("angry", "Angry", "😠", "negative"),
        emotion("frustrated", "Frustrated", "😤", "negative"),
        emotion("overwhelmed", "Overwhelmed", "😵", "negative"),
        emotion("lonely", "Lonely", "😔", "negative"),
        emotion("stressed", "Stressed", "😫", "negative"),
        emotion("tired", "Tired", "😴", "negative"),
        emotion("calm", "Calm", "😐", "neutral"),
        emotion("confused", "Confused", "🤔", "neutral"),
        emotion("curious", "Curious", "🧐", "neutral"),
        emotion("focused", "Focused", "🎯", "neutral"),
    ]
}

fn relation(id: &str, name: &str, description: &str) -> EmotionRelation {
    EmotionRelation {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        is_active: true,
    }
}

fn relation_catalog() -> Vec<EmotionRelation> {
    vec![
        relation(
            "work_school",
            "Work/School",
            "Related to job, studies, or academic pressure",
        ),
        relation(
            "relationships",
            "Relationships",
            "Friends, family, romantic relationships",
        ),
        relation("health", "Health", "Physical or mental health concerns"),
        relation("finance", "Finance", "Money, bills, or financial security"),
        relation("future", "Future", "Uncertainty about what's coming next"),
        relation(
            "personal_growth",
            "Personal Growth",
            "Self-improvement and personal development",
        ),
        relation(
            "daily_life",
            "Daily Life",
            "Routine activities and daily experiences",
        ),
        relation(
            "social_situations",
            "Social Situations",
            "Interactions with others, social anxiety",
        ),
        relation(
            "achievements",
            "Achievements",
            "Success, accomplishments, or lack thereof",
        ),
        relation("other", "Other", "Something else not listed above"),
    ]
}

struct TemplateSpec {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    task_type: TaskType,
    category: TaskCategory,
    points: i64,
    trigger_emotions: &'static [&'static str],
    difficulty: TaskDifficulty,
}

impl TemplateSpec {
    fn into_template(self) -> TaskTemplate {
        TaskTemplate {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            task_type: self.task_type,
            category: self.category,
            points: self.points,
            is_active: true,
            trigger_emotions: self
                .trigger_emotions
                .iter()
                .map(|id| id.to_string())
                .collect(),
            difficulty: self.difficulty,
        }
    }
}

fn template_catalog() -> Vec<TaskTemplate> {
    let specs = [
        TemplateSpec {
            id: "gratitude_photo",
            title: "Gratitude Photo",
            description: "Take a picture of something you're grateful for today",
            task_type: TaskType::Photo,
            category: TaskCategory::QuestionnaireBased,
            points: 20,
            trigger_emotions: &["happy", "excited", "grateful"],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "share_joy",
            title: "Share Your Joy",
            description: "Write about what made you feel good today and why it was meaningful",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 25,
            trigger_emotions: &["happy", "excited", "grateful", "proud"],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "spread_kindness",
            title: "Spread Kindness",
            description: "Write a kind message you could send to someone you care about",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 30,
            trigger_emotions: &["happy", "grateful", "loved", "peaceful"],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "breathing_exercise",
            title: "Breathing Exercise",
            description: "Take 5 deep breaths and write how you feel afterward",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 20,
            trigger_emotions: &["sad", "anxious", "angry", "frustrated", "stressed"],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "emotion_processing",
            title: "Emotion Processing",
            description: "Write about what you're feeling and what might help you feel better",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 35,
            trigger_emotions: &["sad", "anxious", "angry", "frustrated", "overwhelmed", "lonely"],
            difficulty: TaskDifficulty::Hard,
        },
        TemplateSpec {
            id: "self_compassion",
            title: "Self-Compassion",
            description: "Write something kind and understanding to yourself, as you would to a good friend",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 30,
            trigger_emotions: &["sad", "anxious", "stressed", "overwhelmed", "tired", "lonely"],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "comfort_item",
            title: "Comfort Item",
            description: "Take a photo of something that brings you comfort or peace",
            task_type: TaskType::Photo,
            category: TaskCategory::QuestionnaireBased,
            points: 15,
            trigger_emotions: &[
                "sad",
                "anxious",
                "stressed",
                "overwhelmed",
                "tired",
                "lonely",
                "frustrated",
                "angry",
            ],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "mindful_observation",
            title: "Mindful Observation",
            description: "Take a photo of something beautiful you notice around you right now",
            task_type: TaskType::Photo,
            category: TaskCategory::QuestionnaireBased,
            points: 20,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "three_good_things",
            title: "Three Good Things",
            description: "Write down three good things that happened today, no matter how small",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 25,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "future_self_letter",
            title: "Future Self Letter",
            description: "Write a short encouraging message to yourself for tomorrow",
            task_type: TaskType::Text,
            category: TaskCategory::QuestionnaireBased,
            points: 30,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "hydrate",
            title: "Hydrate",
            description: "Drink a glass of water mindfully",
            task_type: TaskType::SimpleAction,
            category: TaskCategory::DailyRoutine,
            points: 5,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "step_outside",
            title: "Step Outside",
            description: "Go outside for at least 2 minutes, even if just to your balcony",
            task_type: TaskType::SimpleAction,
            category: TaskCategory::DailyRoutine,
            points: 10,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "stretch_break",
            title: "Stretch Break",
            description: "Do some gentle stretches or move your body for 1 minute",
            task_type: TaskType::SimpleAction,
            category: TaskCategory::DailyRoutine,
            points: 10,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Easy,
        },
        TemplateSpec {
            id: "digital_break",
            title: "Digital Break",
            description: "Put your phone away for 10 minutes and focus on your surroundings",
            task_type: TaskType::SimpleAction,
            category: TaskCategory::DailyRoutine,
            points: 15,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Medium,
        },
        TemplateSpec {
            id: "tidy_space",
            title: "Tidy Space",
            description: "Clean or organize one small area around you",
            task_type: TaskType::SimpleAction,
            category: TaskCategory::DailyRoutine,
            points: 10,
            trigger_emotions: &[],
            difficulty: TaskDifficulty::Easy,
        },
    ];

    specs.into_iter().map(TemplateSpec::into_template).collect()
}
