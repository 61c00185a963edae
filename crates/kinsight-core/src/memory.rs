//! In-process [`InsightStore`]

use chrono::NaiveDate;
use kinsight_records::{Conversation, YearMonth};
use std::collections::{BTreeMap, HashMap};

use crate::store::{newest_first, DateRange, InsightStore, StoreError};
use crate::types::{DailySummary, GrowthMetrics, TopicTrajectory, UsageStats};

#[derive(Debug, Default)]
struct ChildData {
    conversations: Vec<Conversation>,
    summaries: HashMap<NaiveDate, DailySummary>,
    trajectories: BTreeMap<String, TopicTrajectory>,
    growth: HashMap<YearMonth, GrowthMetrics>,
    usage: HashMap<NaiveDate, UsageStats>,
}

/// Keeps everything in memory, partitioned by child
#[derive(Debug, Default)]
pub struct MemoryStore {
    children: HashMap<String, ChildData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn child(&self, child_id: &str) -> Option<&ChildData> {
        self.children.get(child_id)
    }

    fn child_mut(&mut self, child_id: &str) -> &mut ChildData {
        self.children.entry(child_id.to_string()).or_default()
    }

    fn select<F>(&self, child_id: &str, keep: F) -> Vec<Conversation>
    where
        F: Fn(&Conversation) -> bool,
    {
        self.child(child_id)
            .map(|child| {
                child
                    .conversations
                    .iter()
                    .filter(|c| keep(*c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl InsightStore for MemoryStore {
    fn insert_conversation(&mut self, conversation: &Conversation) -> Result<(), StoreError> {
        if self.has_conversation(&conversation.child_id, &conversation.id)? {
            return Err(StoreError::DuplicateConversation {
                child_id: conversation.child_id.clone(),
                id: conversation.id.clone(),
            });
        }
        self.child_mut(&conversation.child_id)
            .conversations
            .push(conversation.clone());
        Ok(())
    }

    fn has_conversation(&self, child_id: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .child(child_id)
            .is_some_and(|c| c.conversations.iter().any(|conv| conv.id == id)))
    }

    fn conversations_on(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.select(child_id, |c| c.date() == date))
    }

    fn conversations_in_month(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Vec<Conversation>, StoreError> {
        Ok(self.select(child_id, |c| c.month() == month))
    }

    fn list_conversations(
        &self,
        child_id: &str,
        range: DateRange,
    ) -> Result<Vec<Conversation>, StoreError> {
        let mut out = self.select(child_id, |c| range.contains(c.date()));
        newest_first(&mut out);
        Ok(out)
    }

    fn daily_summary(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, StoreError> {
        Ok(self
            .child(child_id)
            .and_then(|c| c.summaries.get(&date))
            .cloned())
    }

    fn put_daily_summary(&mut self, summary: &DailySummary) -> Result<(), StoreError> {
        self.child_mut(&summary.child_id)
            .summaries
            .insert(summary.date, summary.clone());
        Ok(())
    }

    fn topic_trajectory(
        &self,
        child_id: &str,
        topic: &str,
    ) -> Result<Option<TopicTrajectory>, StoreError> {
        Ok(self
            .child(child_id)
            .and_then(|c| c.trajectories.get(topic))
            .cloned())
    }

    fn put_topic_trajectory(&mut self, trajectory: &TopicTrajectory) -> Result<(), StoreError> {
        self.child_mut(&trajectory.child_id)
            .trajectories
            .insert(trajectory.topic.clone(), trajectory.clone());
        Ok(())
    }

    fn topics(&self, child_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .child(child_id)
            .map(|c| c.trajectories.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn growth_metrics(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Option<GrowthMetrics>, StoreError> {
        Ok(self
            .child(child_id)
            .and_then(|c| c.growth.get(&month))
            .cloned())
    }

    fn put_growth_metrics(&mut self, metrics: &GrowthMetrics) -> Result<(), StoreError> {
        self.child_mut(&metrics.child_id)
            .growth
            .insert(metrics.month, metrics.clone());
        Ok(())
    }

    fn usage_stats(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageStats>, StoreError> {
        Ok(self.child(child_id).and_then(|c| c.usage.get(&date)).cloned())
    }

    fn put_usage_stats(&mut self, usage: &UsageStats) -> Result<(), StoreError> {
        self.child_mut(&usage.child_id)
            .usage
            .insert(usage.date, usage.clone());
        Ok(())
    }

    fn delete_child(&mut self, child_id: &str) -> Result<usize, StoreError> {
        Ok(self
            .children
            .remove(child_id)
            .map(|c| c.conversations.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::on;
    use crate::types::Trend;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = MemoryStore::new();
        let conv = on("2025-01-10", "a", "Calm", json!({}));
        store.insert_conversation(&conv).unwrap();

        let err = store.insert_conversation(&conv).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateConversation { .. }));
        assert_eq!(store.list_conversations("c1", DateRange::All).unwrap().len(), 1);
    }

    #[test]
    fn test_same_id_different_child_allowed() {
        let mut store = MemoryStore::new();
        let conv = on("2025-01-10", "a", "Calm", json!({}));
        let other = on("2025-01-10", "a", "Calm", json!({"childId": "c2"}));
        store.insert_conversation(&conv).unwrap();
        store.insert_conversation(&other).unwrap();
        assert!(store.has_conversation("c2", "a").unwrap());
    }

    #[test]
    fn test_queries_by_day_and_month_keep_ingestion_order() {
        let mut store = MemoryStore::new();
        for (d, id) in [("2025-01-10", "b"), ("2025-01-11", "x"), ("2025-01-10", "a"), ("2025-02-01", "y")] {
            store.insert_conversation(&on(d, id, "Calm", json!({}))).unwrap();
        }

        let day: Vec<String> = store
            .conversations_on("c1", date("2025-01-10"))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(day, vec!["b", "a"]);

        let month = store
            .conversations_in_month("c1", "2025-01".parse().unwrap())
            .unwrap();
        assert_eq!(month.len(), 3);
    }

    #[test]
    fn test_list_range_newest_first() {
        let mut store = MemoryStore::new();
        for (d, id) in [("2025-01-10", "a"), ("2025-01-12", "b"), ("2025-01-15", "c")] {
            store.insert_conversation(&on(d, id, "Calm", json!({}))).unwrap();
        }
        let range = DateRange::Between {
            from: date("2025-01-10"),
            to: date("2025-01-12"),
        };
        let ids: Vec<String> = store
            .list_conversations("c1", range)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(store.list_conversations("nobody", DateRange::All).unwrap().is_empty());
    }

    #[test]
    fn test_derived_upserts_replace() {
        let mut store = MemoryStore::new();
        let d = date("2025-01-10");
        let mut summary = DailySummary::empty("c1", d);
        store.put_daily_summary(&summary).unwrap();
        summary.total_conversations = 3;
        store.put_daily_summary(&summary).unwrap();
        assert_eq!(
            store.daily_summary("c1", d).unwrap().unwrap().total_conversations,
            3
        );

        let mut t = TopicTrajectory::new("c1", "space");
        store.put_topic_trajectory(&t).unwrap();
        t.current_trend = Trend::Stable;
        store.put_topic_trajectory(&t).unwrap();
        store.put_topic_trajectory(&TopicTrajectory::new("c1", "art")).unwrap();
        assert_eq!(store.topics("c1").unwrap(), vec!["art", "space"]);
        assert_eq!(
            store.topic_trajectory("c1", "space").unwrap().unwrap().current_trend,
            Trend::Stable
        );
    }

    #[test]
    fn test_delete_child_only_touches_that_child() {
        let mut store = MemoryStore::new();
        store.insert_conversation(&on("2025-01-10", "a", "Calm", json!({}))).unwrap();
        store.insert_conversation(&on("2025-01-10", "b", "Calm", json!({}))).unwrap();
        store
            .insert_conversation(&on("2025-01-10", "a", "Calm", json!({"childId": "c2"})))
            .unwrap();
        store
            .put_daily_summary(&DailySummary::empty("c1", date("2025-01-10")))
            .unwrap();

        assert_eq!(store.delete_child("c1").unwrap(), 2);
        assert!(store.daily_summary("c1", date("2025-01-10")).unwrap().is_none());
        assert!(store.has_conversation("c2", "a").unwrap());
        assert_eq!(store.delete_child("c1").unwrap(), 0);
    }
}
