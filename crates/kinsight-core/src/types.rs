//! Derived entity types

use chrono::NaiveDate;
use kinsight_records::{Emotion, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Three-band rating used for stress, resilience and curiosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Band a signal count: 0 low, 1-3 medium, 4+ high
    pub fn from_signal_count(count: usize) -> Self {
        match count {
            0 => Level::Low,
            1..=3 => Level::Medium,
            _ => Level::High,
        }
    }
}

/// Topic mention trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[default]
    Emerging,
    Stable,
    Declining,
}

/// One child's day, recomputed wholesale from that day's conversations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub child_id: String,
    pub date: NaiveDate,
    pub total_conversations: usize,
    pub total_minutes: u64,
    pub avg_sentiment: f64,
    pub dominant_emotion: Emotion,
    /// Fraction of the day's conversations per observed emotion
    pub emotion_distribution: BTreeMap<Emotion, f64>,
    pub top_topics: Vec<String>,
    pub emerging_topics: Vec<String>,
    pub declining_topics: Vec<String>,
    pub highlights: Vec<String>,
    pub notable_events: Vec<String>,
    pub stress_level: Level,
    pub resilience_level: Level,
    pub curiosity_level: Level,
}

impl DailySummary {
    /// Summary for a day without conversations
    pub fn empty(child_id: &str, date: NaiveDate) -> Self {
        Self {
            child_id: child_id.to_string(),
            date,
            total_conversations: 0,
            total_minutes: 0,
            avg_sentiment: 50.0,
            dominant_emotion: Emotion::Neutral,
            emotion_distribution: BTreeMap::new(),
            top_topics: Vec::new(),
            emerging_topics: Vec::new(),
            declining_topics: Vec::new(),
            highlights: Vec::new(),
            notable_events: Vec::new(),
            stress_level: Level::Low,
            resilience_level: Level::Medium,
            curiosity_level: Level::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub mentions: u32,
    pub avg_sentiment: f64,
}

/// Per-topic mention history, one point per date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTrajectory {
    pub child_id: String,
    pub topic: String,
    pub history: Vec<TrajectoryPoint>,
    #[serde(default)]
    pub current_trend: Trend,
}

/// Monthly 0-100 growth scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthMetrics {
    pub child_id: String,
    pub month: YearMonth,
    pub curiosity_score: u8,
    pub communication_score: u8,
    pub resilience_score: u8,
    pub social_connection_score: u8,
}

/// Time spent with the companion on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub child_id: String,
    pub date: NaiveDate,
    pub minutes_used: u64,
    pub sessions_count: usize,
    #[serde(default)]
    pub over_daily_limit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bands() {
        assert_eq!(Level::from_signal_count(0), Level::Low);
        assert_eq!(Level::from_signal_count(1), Level::Medium);
        assert_eq!(Level::from_signal_count(3), Level::Medium);
        assert_eq!(Level::from_signal_count(4), Level::High);
    }

    #[test]
    fn test_empty_summary_defaults() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let summary = DailySummary::empty("c1", date);
        assert_eq!(summary.avg_sentiment, 50.0);
        assert_eq!(summary.dominant_emotion, Emotion::Neutral);
        assert_eq!(summary.stress_level, Level::Low);
        assert_eq!(summary.resilience_level, Level::Medium);
        assert_eq!(summary.curiosity_level, Level::Medium);
    }

    #[test]
    fn test_summary_json_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut summary = DailySummary::empty("c1", date);
        summary.emotion_distribution.insert(Emotion::Excited, 1.0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["date"], "2025-01-10");
        assert_eq!(json["dominantEmotion"], "Neutral");
        assert_eq!(json["stressLevel"], "low");
        assert_eq!(json["emotionDistribution"]["Excited"], 1.0);

        let back: DailySummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_trajectory_default_trend() {
        let json = r#"{"childId":"c1","topic":"space","history":[]}"#;
        let parsed: TopicTrajectory = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.current_trend, Trend::Emerging);
    }
}
