//! Monthly growth scores

use kinsight_records::{Conversation, YearMonth};

use crate::levels::{question_counts, resilience_signals};
use crate::types::GrowthMetrics;

const NEUTRAL_SCORE: u8 = 50;

/// Derive the four 0-100 growth scores from one month's conversations
pub fn compute_growth_metrics(
    child_id: &str,
    month: YearMonth,
    conversations: &[Conversation],
) -> GrowthMetrics {
    if conversations.is_empty() {
        return GrowthMetrics {
            child_id: child_id.to_string(),
            month,
            curiosity_score: NEUTRAL_SCORE,
            communication_score: NEUTRAL_SCORE,
            resilience_score: NEUTRAL_SCORE,
            social_connection_score: NEUTRAL_SCORE,
        };
    }
    let count = conversations.len() as f64;

    let (total_questions, complex_questions) = question_counts(conversations);
    let complex_share = if total_questions > 0 {
        complex_questions as f64 / total_questions as f64
    } else {
        0.0
    };
    let curiosity = (total_questions as f64 / count) * 10.0 + complex_share * 50.0;

    let avg_engagement = conversations
        .iter()
        .map(|c| f64::from(c.conversation_insight.engagement_level.weight()))
        .sum::<f64>()
        / count;
    let avg_vocabulary = conversations
        .iter()
        .map(|c| c.conversation_insight.vocabulary_complexity)
        .sum::<f64>()
        / count;
    let communication = (avg_engagement / 3.0) * 50.0 + (avg_vocabulary / 100.0) * 50.0;

    let resilience = (resilience_signals(conversations) as f64 / count) * 20.0 + 50.0;

    let social_indicators: i64 = conversations
        .iter()
        .map(|c| {
            let s = &c.social_insight;
            s.friends_mentioned.len() as i64 + s.empathy_indicators.len() as i64
                - s.social_concerns.len() as i64
        })
        .sum();
    let social = (social_indicators as f64 / count) * 15.0 + 50.0;

    GrowthMetrics {
        child_id: child_id.to_string(),
        month,
        curiosity_score: score(curiosity),
        communication_score: score(communication),
        resilience_score: score(resilience),
        social_connection_score: score(social),
    }
}

/// Round half up, then clamp into 0..=100
fn score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return NEUTRAL_SCORE;
    }
    (raw + 0.5).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::on;
    use serde_json::json;

    fn month() -> YearMonth {
        "2025-01".parse().unwrap()
    }

    #[test]
    fn test_empty_month_is_neutral() {
        let m = compute_growth_metrics("c1", month(), &[]);
        assert_eq!(m.curiosity_score, 50);
        assert_eq!(m.communication_score, 50);
        assert_eq!(m.resilience_score, 50);
        assert_eq!(m.social_connection_score, 50);
    }

    #[test]
    fn test_scores_for_known_month() {
        let convs = vec![
            on(
                "2025-01-03",
                "a",
                "Curious",
                json!({
                    "conversationInsight": {
                        "engagementLevel": "high",
                        "questionCount": 4,
                        "questionTypes": ["why", "how"],
                        "vocabularyComplexity": 70
                    },
                    "wellbeingInsight": {"resilienceSignals": ["tried again"]},
                    "flags": {"breakthrough": true},
                    "socialInsight": {"friendsMentioned": ["Ana", "Ben"]}
                }),
            ),
            on(
                "2025-01-20",
                "b",
                "Calm",
                json!({
                    "conversationInsight": {
                        "engagementLevel": "medium",
                        "questionCount": 2,
                        "vocabularyComplexity": 50
                    },
                    "socialInsight": {"socialConcerns": ["felt left out"]}
                }),
            ),
        ];
        let m = compute_growth_metrics("c1", month(), &convs);

        // 6/2*10 + 2/6*50 = 46.67
        assert_eq!(m.curiosity_score, 47);
        // 2.5/3*50 + 60/100*50 = 71.67
        assert_eq!(m.communication_score, 72);
        // (1 + 2)/2*20 + 50 = 80
        assert_eq!(m.resilience_score, 80);
        // (2 - 1)/2*15 + 50 = 57.5
        assert_eq!(m.social_connection_score, 58);
    }

    #[test]
    fn test_no_questions_guards_division() {
        let convs = vec![on("2025-01-03", "a", "Calm", json!({}))];
        let m = compute_growth_metrics("c1", month(), &convs);
        assert_eq!(m.curiosity_score, 0);
        // engagement defaults to low: 1/3*50
        assert_eq!(m.communication_score, 17);
    }

    #[test]
    fn test_scores_clamped() {
        let concerns: Vec<String> = (0..20).map(|i| format!("concern {i}")).collect();
        let signals: Vec<String> = (0..20).map(|i| format!("signal {i}")).collect();
        let convs = vec![on(
            "2025-01-03",
            "a",
            "Worried",
            json!({
                "conversationInsight": {
                    "questionCount": 40,
                    "questionTypes": ["why"],
                    "vocabularyComplexity": 250,
                    "engagementLevel": "high"
                },
                "socialInsight": {"socialConcerns": concerns},
                "wellbeingInsight": {"resilienceSignals": signals}
            }),
        )];
        let m = compute_growth_metrics("c1", month(), &convs);
        assert_eq!(m.curiosity_score, 100);
        assert_eq!(m.communication_score, 100);
        assert_eq!(m.resilience_score, 100);
        assert_eq!(m.social_connection_score, 0);
    }

    #[test]
    fn test_score_rounding() {
        assert_eq!(score(57.5), 58);
        assert_eq!(score(57.49), 57);
        assert_eq!(score(-0.5), 0);
        assert_eq!(score(f64::NAN), 50);
    }
}
