//! Read commands printing stored entities as JSON

use chrono::NaiveDate;
use kinsight_core::DateRange;
use kinsight_records::{Paths, YearMonth};
use std::path::Path;

use super::{open_pipeline, print_json};

pub fn summary(db: Option<&Path>, child_id: &str, date: NaiveDate) -> anyhow::Result<()> {
    let pipeline = open_pipeline(&Paths::new()?, db)?;
    let summary = pipeline.get_daily_summary(child_id, date)?;
    print_json(summary.as_ref(), &format!("No summary for {child_id} on {date}"))
}

pub fn trajectory(db: Option<&Path>, child_id: &str, topic: &str) -> anyhow::Result<()> {
    let pipeline = open_pipeline(&Paths::new()?, db)?;
    let trajectory = pipeline.get_topic_trajectory(child_id, topic)?;
    print_json(
        trajectory.as_ref(),
        &format!("No trajectory for topic '{topic}' of {child_id}"),
    )
}

pub fn growth(db: Option<&Path>, child_id: &str, month: YearMonth) -> anyhow::Result<()> {
    let pipeline = open_pipeline(&Paths::new()?, db)?;
    let metrics = pipeline.get_growth_metrics(child_id, month)?;
    print_json(
        metrics.as_ref(),
        &format!("No growth metrics for {child_id} in {month}"),
    )
}

pub fn conversations(
    db: Option<&Path>,
    child_id: &str,
    date: Option<NaiveDate>,
    between: Option<(NaiveDate, NaiveDate)>,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(&Paths::new()?, db)?;
    let conversations = pipeline.list_conversations(child_id, date_range(date, between))?;
    print_json(Some(&conversations), "")
}

pub fn usage(db: Option<&Path>, child_id: &str, date: NaiveDate) -> anyhow::Result<()> {
    let pipeline = open_pipeline(&Paths::new()?, db)?;
    let usage = pipeline.usage_stats(child_id, date)?;
    print_json(usage.as_ref(), &format!("No usage for {child_id} on {date}"))
}

fn date_range(date: Option<NaiveDate>, between: Option<(NaiveDate, NaiveDate)>) -> DateRange {
    match (date, between) {
        (Some(day), _) => DateRange::Day(day),
        (None, Some((from, to))) => DateRange::Between { from, to },
        (None, None) => DateRange::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_date_range_selection() {
        assert_eq!(date_range(None, None), DateRange::All);
        assert_eq!(date_range(Some(d("2025-01-10")), None), DateRange::Day(d("2025-01-10")));
        assert_eq!(
            date_range(None, Some((d("2025-01-01"), d("2025-01-31")))),
            DateRange::Between {
                from: d("2025-01-01"),
                to: d("2025-01-31"),
            }
        );
    }
}
