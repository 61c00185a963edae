//! Stress, resilience and curiosity classifiers over one day's conversations

use kinsight_records::Conversation;

use crate::types::Level;

/// Stress triggers and warning signals, +2 per Anxious/Stressed conversation
pub fn stress_level(conversations: &[Conversation]) -> Level {
    let score: usize = conversations
        .iter()
        .map(|c| {
            let emotion_weight = if c.dominant_emotion.is_stressful() { 2 } else { 0 };
            c.wellbeing_insight.stress_triggers.len()
                + c.wellbeing_insight.warning_signals.len()
                + emotion_weight
        })
        .sum();
    Level::from_signal_count(score)
}

/// Resilience signals and breakthrough moments, +2 per flagged breakthrough
pub fn resilience_level(conversations: &[Conversation]) -> Level {
    if conversations.is_empty() {
        return Level::Medium;
    }
    Level::from_signal_count(resilience_signals(conversations))
}

pub(crate) fn resilience_signals(conversations: &[Conversation]) -> usize {
    conversations
        .iter()
        .map(|c| {
            let flag_weight = if c.flags.breakthrough { 2 } else { 0 };
            c.wellbeing_insight.resilience_signals.len()
                + c.learning_insight.breakthrough_moments.len()
                + flag_weight
        })
        .sum()
}

/// Question volume and open-ended share.
///
/// Either weak signal alone pulls the rating down a band.
pub fn curiosity_level(conversations: &[Conversation]) -> Level {
    if conversations.is_empty() {
        return Level::Medium;
    }

    let (total_questions, complex_questions) = question_counts(conversations);
    let avg_questions = total_questions as f64 / conversations.len() as f64;
    let complex_ratio = if total_questions > 0 {
        complex_questions as f64 / total_questions as f64
    } else {
        0.0
    };

    if avg_questions < 2.0 || complex_ratio < 0.2 {
        Level::Low
    } else if avg_questions < 5.0 || complex_ratio < 0.4 {
        Level::Medium
    } else {
        Level::High
    }
}

/// (total questionCount, complex questionTypes) across conversations
pub(crate) fn question_counts(conversations: &[Conversation]) -> (u64, u64) {
    conversations.iter().fold((0, 0), |(total, complex), c| {
        (
            total + u64::from(c.conversation_insight.question_count),
            complex + c.conversation_insight.complex_question_count() as u64,
        )
    })
}
