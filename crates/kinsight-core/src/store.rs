//! Persistence boundary for conversations and derived entities

use chrono::NaiveDate;
use kinsight_records::{Conversation, YearMonth};
use thiserror::Error;

use crate::types::{DailySummary, GrowthMetrics, TopicTrajectory, UsageStats};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation {id} already ingested for child {child_id}")]
    DuplicateConversation { child_id: String, id: String },

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("stored record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Wrap any backend failure
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Dates selected by [`InsightStore::list_conversations`], inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Day(NaiveDate),
    Between { from: NaiveDate, to: NaiveDate },
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateRange::All => true,
            DateRange::Day(day) => date == day,
            DateRange::Between { from, to } => from <= date && date <= to,
        }
    }
}

/// Per-child conversation log plus upsert-by-key tables for derived entities.
///
/// Conversation queries return records in ingestion order unless stated
/// otherwise. Derived entity puts replace any existing entity with the same key.
pub trait InsightStore {
    /// Append a conversation; rejects an `id` the child already has
    fn insert_conversation(&mut self, conversation: &Conversation) -> Result<(), StoreError>;

    fn has_conversation(&self, child_id: &str, id: &str) -> Result<bool, StoreError>;

    /// Conversations whose `startedAt` falls on `date` (UTC)
    fn conversations_on(&self, child_id: &str, date: NaiveDate)
        -> Result<Vec<Conversation>, StoreError>;

    fn conversations_in_month(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Vec<Conversation>, StoreError>;

    /// Conversations in `range`, newest `startedAt` first
    fn list_conversations(
        &self,
        child_id: &str,
        range: DateRange,
    ) -> Result<Vec<Conversation>, StoreError>;

    fn daily_summary(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, StoreError>;

    fn put_daily_summary(&mut self, summary: &DailySummary) -> Result<(), StoreError>;

    fn topic_trajectory(
        &self,
        child_id: &str,
        topic: &str,
    ) -> Result<Option<TopicTrajectory>, StoreError>;

    fn put_topic_trajectory(&mut self, trajectory: &TopicTrajectory) -> Result<(), StoreError>;

    /// Every topic with a stored trajectory, sorted
    fn topics(&self, child_id: &str) -> Result<Vec<String>, StoreError>;

    fn growth_metrics(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Option<GrowthMetrics>, StoreError>;

    fn put_growth_metrics(&mut self, metrics: &GrowthMetrics) -> Result<(), StoreError>;

    fn usage_stats(&self, child_id: &str, date: NaiveDate)
        -> Result<Option<UsageStats>, StoreError>;

    fn put_usage_stats(&mut self, usage: &UsageStats) -> Result<(), StoreError>;

    /// Remove everything stored for a child, returning the conversations removed
    fn delete_child(&mut self, child_id: &str) -> Result<usize, StoreError>;
}

/// Sort newest `startedAt` first; equal timestamps keep the later ingestion first
pub(crate) fn newest_first(conversations: &mut [Conversation]) {
    conversations.reverse();
    conversations.sort_by(|a, b| b.started_at.cmp(&a.started_at));
}
