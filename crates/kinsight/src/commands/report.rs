use kinsight_core::{DailySummary, DateRange, GrowthMetrics, Level, TopicTrajectory};
use kinsight_records::{Conversation, Emotion, Paths, YearMonth};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

pub fn run(db: Option<&Path>, child_id: &str, month: YearMonth) -> anyhow::Result<()> {
    let pipeline = super::open_pipeline(&Paths::new()?, db)?;
    let range = DateRange::Between {
        from: month.first_day(),
        to: month.last_day(),
    };
    let conversations = pipeline.list_conversations(child_id, range)?;

    let dates: BTreeSet<_> = conversations.iter().map(Conversation::date).collect();
    let mut summaries = Vec::new();
    for date in dates {
        if let Some(s) = pipeline.get_daily_summary(child_id, date)? {
            summaries.push(s);
        }
    }
    let growth = pipeline.get_growth_metrics(child_id, month)?;
    let trajectories = pipeline.trajectories(child_id)?;

    let report = build_report(
        child_id,
        month,
        &conversations,
        &summaries,
        growth.as_ref(),
        &trajectories,
    );
    println!("{}", report);
    Ok(())
}

fn build_report(
    child_id: &str,
    month: YearMonth,
    conversations: &[Conversation],
    summaries: &[DailySummary],
    growth: Option<&GrowthMetrics>,
    trajectories: &[TopicTrajectory],
) -> String {
    if conversations.is_empty() {
        return format!("No conversations recorded for {child_id} in {month}.");
    }

    let mut sections = Vec::new();

    // Section 1: Totals
    let total_minutes: u64 = conversations.iter().map(Conversation::minutes).sum();
    let avg_sentiment = conversations
        .iter()
        .map(|c| f64::from(c.sentiment_score))
        .sum::<f64>()
        / conversations.len() as f64;
    sections.push(format!(
        "Monthly Report: {child_id} ({month})\n==============================\n\
         Conversations: {}\nActive days: {}\nTotal minutes: {}\n\
         Average sentiment: {:.1}",
        conversations.len(),
        summaries.len(),
        total_minutes,
        avg_sentiment
    ));

    // Section 2: Emotion mix
    let mut emotions: BTreeMap<Emotion, usize> = BTreeMap::new();
    for c in conversations {
        *emotions.entry(c.dominant_emotion).or_default() += 1;
    }
    let mut emotions: Vec<_> = emotions.into_iter().collect();
    emotions.sort_by_key(|(_, n)| std::cmp::Reverse(*n));
    let mix = emotions
        .iter()
        .map(|(e, n)| {
            format!(
                "  {e}: {n} ({:.0}%)",
                *n as f64 / conversations.len() as f64 * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    sections.push(format!("\nEmotion Mix\n-----------\n{mix}"));

    // Section 3: Topics
    let topics = month_topics(conversations, trajectories);
    if !topics.is_empty() {
        sections.push(format!("\nTop Topics\n----------\n{topics}"));
    }

    // Section 4: Wellbeing days
    let stressful = summaries
        .iter()
        .filter(|s| s.stress_level == Level::High)
        .count();
    let curious = summaries
        .iter()
        .filter(|s| s.curiosity_level == Level::High)
        .count();
    sections.push(format!(
        "\nWellbeing\n---------\n\
         High-stress days: {stressful}\nHigh-curiosity days: {curious}"
    ));

    let highlights: Vec<&String> = summaries.iter().flat_map(|s| &s.highlights).take(5).collect();
    if !highlights.is_empty() {
        let lines = highlights
            .iter()
            .map(|h| format!("  {h}"))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("\nHighlights\n----------\n{lines}"));
    }

    // Section 5: Growth
    if let Some(g) = growth {
        sections.push(format!(
            "\nGrowth Scores\n-------------\n\
             Curiosity: {}\nCommunication: {}\nResilience: {}\nSocial connection: {}",
            g.curiosity_score, g.communication_score, g.resilience_score, g.social_connection_score
        ));
    }

    sections.join("\n")
}

/// Ten most mentioned topics this month with their current trend
fn month_topics(conversations: &[Conversation], trajectories: &[TopicTrajectory]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in conversations {
        for topic in c.distinct_topics() {
            *counts.entry(topic).or_default() += 1;
        }
    }
    let trends: HashMap<&str, _> = trajectories
        .iter()
        .map(|t| (t.topic.as_str(), t.current_trend))
        .collect();

    let mut topics: Vec<_> = counts.into_iter().collect();
    topics.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    topics
        .iter()
        .take(10)
        .map(|(topic, n)| match trends.get(topic) {
            Some(trend) => format!("  {topic}: {n} conversations, {trend:?}"),
            None => format!("  {topic}: {n} conversations"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
