//! Configuration for the aggregation pipeline

use serde::{Deserialize, Serialize};

/// Aggregation limits and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Topics kept in a daily summary
    pub top_topics_limit: usize,

    /// Highlights kept in a daily summary
    pub highlight_limit: usize,

    /// Notable events kept in a daily summary
    pub notable_event_limit: usize,

    /// Key-phrase keywords marking a notable event (case-insensitive substring)
    pub event_keywords: Vec<String>,

    /// Summary characters quoted in a breakthrough highlight
    pub breakthrough_excerpt_chars: usize,

    /// Summary characters quoted in a high-engagement highlight
    pub engagement_excerpt_chars: usize,

    /// Age of the summary emerging/declining topics are compared against
    pub topic_lookback_days: u64,

    /// Trajectory entries per comparison window (trend needs two windows)
    pub trend_window: usize,

    /// recent > previous * ratio => emerging
    pub emerging_ratio: f64,

    /// recent < previous * ratio => declining
    pub declining_ratio: f64,

    /// Minutes per day before usage is flagged
    pub daily_time_limit_minutes: u64,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            top_topics_limit: 5,
            highlight_limit: 4,
            notable_event_limit: 5,
            event_keywords: ["test", "quiz", "exam", "recital", "game", "event"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            breakthrough_excerpt_chars: 100,
            engagement_excerpt_chars: 80,
            topic_lookback_days: 7,
            trend_window: 7,
            emerging_ratio: 1.2,
            declining_ratio: 0.8,
            daily_time_limit_minutes: 60,
        }
    }

    /// Read a config file; missing keys keep their defaults
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.top_topics_limit, 5);
        assert_eq!(config.highlight_limit, 4);
        assert_eq!(config.trend_window, 7);
        assert_eq!(config.event_keywords.len(), 6);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"daily_time_limit_minutes": 30}"#).unwrap();
        assert_eq!(config.daily_time_limit_minutes, 30);
        assert_eq!(config.emerging_ratio, 1.2);
        assert_eq!(config.notable_event_limit, 5);
    }
}
