//! Topic trajectory maintenance and trend classification

use chrono::NaiveDate;
use kinsight_records::Conversation;

use crate::config::PipelineConfig;
use crate::types::{TopicTrajectory, TrajectoryPoint, Trend};

/// Mentions and mean sentiment for `topic` among one day's conversations.
///
/// Returns `None` when no conversation that day mentions the topic.
pub fn trajectory_point(
    topic: &str,
    date: NaiveDate,
    conversations: &[Conversation],
) -> Option<TrajectoryPoint> {
    let matching: Vec<&Conversation> = conversations
        .iter()
        .filter(|c| c.date() == date && c.mentions_topic(topic))
        .collect();
    if matching.is_empty() {
        return None;
    }

    let mentions = matching.len();
    let avg_sentiment = matching
        .iter()
        .map(|c| f64::from(c.sentiment_score))
        .sum::<f64>()
        / mentions as f64;

    Some(TrajectoryPoint {
        date,
        mentions: mentions as u32,
        avg_sentiment,
    })
}

impl TopicTrajectory {
    pub fn new(child_id: &str, topic: &str) -> Self {
        Self {
            child_id: child_id.to_string(),
            topic: topic.to_string(),
            history: Vec::new(),
            current_trend: Trend::Emerging,
        }
    }

    /// Insert or replace the point for its date, keeping history sorted
    pub fn upsert(&mut self, point: TrajectoryPoint) {
        match self.history.binary_search_by_key(&point.date, |p| p.date) {
            Ok(i) => self.history[i] = point,
            Err(i) => self.history.insert(i, point),
        }
    }

    /// Compare the latest window of entries with the one before it.
    ///
    /// Leaves the trend untouched until two full windows of history exist.
    pub fn reclassify(&mut self, config: &PipelineConfig) {
        let window = config.trend_window.max(1);
        let len = self.history.len();
        if len < window.saturating_mul(2) {
            return;
        }

        let mean = |points: &[TrajectoryPoint]| {
            points.iter().map(|p| f64::from(p.mentions)).sum::<f64>() / window as f64
        };
        let recent_avg = mean(&self.history[len - window..]);
        let previous_avg = mean(&self.history[len - 2 * window..len - window]);

        self.current_trend = if recent_avg > previous_avg * config.emerging_ratio {
            Trend::Emerging
        } else if recent_avg < previous_avg * config.declining_ratio {
            Trend::Declining
        } else {
            Trend::Stable
        };
    }

    pub fn total_mentions(&self) -> u64 {
        self.history.iter().map(|p| u64::from(p.mentions)).sum()
    }
}
