//! Daily summary aggregation

use chrono::NaiveDate;
use kinsight_records::{Conversation, Emotion, EngagementLevel};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::levels::{curiosity_level, resilience_level, stress_level};
use crate::types::DailySummary;

/// Fold one day's conversations into a [`DailySummary`].
///
/// `conversations` must be in ingestion order: ties in dominant emotion and
/// topic ranking go to whichever label appeared first. `prior_top_topics` are
/// the top topics of the summary `topic_lookback_days` earlier (empty when
/// there is none).
pub fn summarize_day(
    child_id: &str,
    date: NaiveDate,
    conversations: &[Conversation],
    prior_top_topics: &[String],
    config: &PipelineConfig,
) -> DailySummary {
    if conversations.is_empty() {
        return DailySummary::empty(child_id, date);
    }

    let total = conversations.len();
    let total_minutes = conversations.iter().map(Conversation::minutes).sum();
    let avg_sentiment = conversations
        .iter()
        .map(|c| f64::from(c.sentiment_score))
        .sum::<f64>()
        / total as f64;

    let emotion_counts = rank_by_count(conversations.iter().map(|c| c.dominant_emotion));
    let dominant_emotion = emotion_counts
        .first()
        .map(|(e, _)| *e)
        .unwrap_or(Emotion::Neutral);
    let emotion_distribution: BTreeMap<Emotion, f64> = emotion_counts
        .iter()
        .map(|(e, n)| (*e, *n as f64 / total as f64))
        .collect();

    let top_topics: Vec<String> =
        rank_by_count(conversations.iter().flat_map(|c| c.distinct_topics()))
            .into_iter()
            .take(config.top_topics_limit)
            .map(|(t, _)| t.to_string())
            .collect();

    let (emerging_topics, declining_topics) = topic_trends(&top_topics, prior_top_topics);

    DailySummary {
        child_id: child_id.to_string(),
        date,
        total_conversations: total,
        total_minutes,
        avg_sentiment,
        dominant_emotion,
        emotion_distribution,
        top_topics,
        emerging_topics,
        declining_topics,
        highlights: highlights(conversations, config),
        notable_events: notable_events(conversations, config),
        stress_level: stress_level(conversations),
        resilience_level: resilience_level(conversations),
        curiosity_level: curiosity_level(conversations),
    }
}

/// Set differences between today's and the lookback day's top topics.
///
/// Returns (emerging, declining): topics only present today, and topics only
/// present on the lookback day, each in its list's order.
pub fn topic_trends(current: &[String], previous: &[String]) -> (Vec<String>, Vec<String>) {
    let emerging = current
        .iter()
        .filter(|t| !previous.contains(t))
        .cloned()
        .collect();
    let declining = previous
        .iter()
        .filter(|t| !current.contains(t))
        .cloned()
        .collect();
    (emerging, declining)
}

/// Count occurrences, ordered by count descending then first appearance
fn rank_by_count<T, I>(items: I) -> Vec<(T, usize)>
where
    T: Eq + std::hash::Hash + Copy,
    I: IntoIterator<Item = T>,
{
    let mut order: Vec<(T, usize)> = Vec::new();
    let mut index: HashMap<T, usize> = HashMap::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(item, order.len());
                order.push((item, 1));
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

fn highlights(conversations: &[Conversation], config: &PipelineConfig) -> Vec<String> {
    let mut out = Vec::new();
    for c in conversations {
        if c.flags.breakthrough {
            out.push(format!(
                "Breakthrough moment: {}...",
                excerpt(&c.summary, config.breakthrough_excerpt_chars)
            ));
        }
        if c.conversation_insight.engagement_level == EngagementLevel::High {
            out.push(format!(
                "High engagement: {}...",
                excerpt(&c.summary, config.engagement_excerpt_chars)
            ));
        }
    }
    out.truncate(config.highlight_limit);
    out
}

fn excerpt(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

fn notable_events(conversations: &[Conversation], config: &PipelineConfig) -> Vec<String> {
    let keywords: Vec<String> = config
        .event_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    let mut seen = HashSet::new();

    conversations
        .iter()
        .flat_map(|c| c.key_phrases.iter())
        .filter(|phrase| {
            let lower = phrase.to_lowercase();
            keywords.iter().any(|k| lower.contains(k.as_str()))
        })
        .filter(|phrase| seen.insert(*phrase))
        .take(config.notable_event_limit)
        .cloned()
        .collect()
}
