//! Annotated conversation record types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::month::YearMonth;

/// Question types that count as open-ended ("complex") questions
pub const COMPLEX_QUESTION_TYPES: &[&str] = &["why", "how", "what-if"];

/// Emotion labels assigned by the annotation model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joyful,
    Calm,
    Neutral,
    Frustrated,
    Anxious,
    Excited,
    Curious,
    Worried,
    Happy,
    Stressed,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Joyful,
        Emotion::Calm,
        Emotion::Neutral,
        Emotion::Frustrated,
        Emotion::Anxious,
        Emotion::Excited,
        Emotion::Curious,
        Emotion::Worried,
        Emotion::Happy,
        Emotion::Stressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joyful => "Joyful",
            Emotion::Calm => "Calm",
            Emotion::Neutral => "Neutral",
            Emotion::Frustrated => "Frustrated",
            Emotion::Anxious => "Anxious",
            Emotion::Excited => "Excited",
            Emotion::Curious => "Curious",
            Emotion::Worried => "Worried",
            Emotion::Happy => "Happy",
            Emotion::Stressed => "Stressed",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == label)
    }

    /// Anxious and Stressed days weigh into the stress level
    pub fn is_stressful(&self) -> bool {
        matches!(self, Emotion::Anxious | Emotion::Stressed)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement rating for a single conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    /// Weight used by the communication score (high=3, medium=2, low=1)
    pub fn weight(&self) -> u32 {
        match self {
            EngagementLevel::High => 3,
            EngagementLevel::Medium => 2,
            EngagementLevel::Low => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub second_offset: u32,
    pub emotion: Emotion,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationInsight {
    #[serde(default)]
    pub engagement_level: EngagementLevel,
    #[serde(default)]
    pub question_count: u32,
    #[serde(default)]
    pub question_types: Vec<String>,
    /// Words per utterance
    #[serde(default)]
    pub avg_utterance_length: f64,
    /// 0-100
    #[serde(default)]
    pub vocabulary_complexity: f64,
}

impl ConversationInsight {
    pub fn complex_question_count(&self) -> usize {
        self.question_types
            .iter()
            .filter(|t| COMPLEX_QUESTION_TYPES.contains(&t.as_str()))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsight {
    #[serde(default)]
    pub struggle_areas: Vec<String>,
    #[serde(default)]
    pub breakthrough_moments: Vec<String>,
    #[serde(default)]
    pub skills_mentioned: Vec<String>,
    #[serde(default)]
    pub learning_methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialInsight {
    #[serde(default)]
    pub friends_mentioned: Vec<String>,
    #[serde(default)]
    pub empathy_indicators: Vec<String>,
    #[serde(default)]
    pub social_concerns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingInsight {
    #[serde(default)]
    pub stress_triggers: Vec<String>,
    #[serde(default)]
    pub coping_strategies: Vec<String>,
    #[serde(default)]
    pub resilience_signals: Vec<String>,
    #[serde(default)]
    pub warning_signals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    #[serde(default)]
    pub breakthrough: bool,
    #[serde(default)]
    pub needs_attention: bool,
}

/// One annotated conversation between a child and the companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub child_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub summary: String,
    #[serde(default)]
    pub key_phrases: Vec<String>,
    pub topics: Vec<String>,
    pub dominant_emotion: Emotion,
    pub sentiment_score: u8,
    #[serde(default)]
    pub emotion_timeline: Vec<EmotionSample>,
    pub conversation_insight: ConversationInsight,
    pub learning_insight: LearningInsight,
    pub social_insight: SocialInsight,
    pub wellbeing_insight: WellbeingInsight,
    #[serde(default)]
    pub flags: Flags,
}

impl Conversation {
    /// UTC calendar date of `started_at`
    pub fn date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date())
    }

    /// Whole minutes, rounded up
    pub fn minutes(&self) -> u64 {
        self.duration_seconds.div_ceil(60)
    }

    /// Topics with duplicates removed, in listed order
    pub fn distinct_topics(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.topics
            .iter()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn mentions_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }
}
