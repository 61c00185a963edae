//! Conversation ingestion and derived-entity recomputation

use chrono::{Days, NaiveDate};
use kinsight_records::{validate_conversation, Conversation, ValidationError, YearMonth};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::daily::summarize_day;
use crate::growth::compute_growth_metrics;
use crate::store::{DateRange, InsightStore, StoreError};
use crate::trajectory::trajectory_point;
use crate::types::{DailySummary, GrowthMetrics, TopicTrajectory, UsageStats};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of one successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub conversation_id: String,
    pub date: NaiveDate,
    pub month: YearMonth,
    /// Derived recomputations that failed after the conversation was stored
    pub derived_failures: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    /// Positions of the failed records in the batch
    #[serde(skip)]
    pub rejected: Vec<usize>,
}

/// Validates conversations, stores them and refreshes every entity they feed
pub struct Pipeline<S> {
    store: S,
    config: PipelineConfig,
}

impl<S: InsightStore> Pipeline<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, PipelineConfig::default())
    }

    pub fn with_config(store: S, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validate and store one record, then recompute its day, topics, month and usage.
    ///
    /// Nothing is written when validation fails or the id is already stored.
    pub fn ingest(&mut self, record: &Value) -> Result<IngestReport, PipelineError> {
        let conversation = validate_conversation(record).map_err(|e| {
            warn!(error = %e, "rejected conversation");
            e
        })?;
        self.store.insert_conversation(&conversation)?;

        let child_id = conversation.child_id.as_str();
        let date = conversation.date();
        let month = conversation.month();
        info!(
            child_id,
            conversation_id = %conversation.id,
            %date,
            "ingested conversation"
        );

        let derived_failures = self.refresh_derived(&conversation);
        for failure in &derived_failures {
            warn!(child_id, conversation_id = %conversation.id, "{failure}");
        }

        Ok(IngestReport {
            conversation_id: conversation.id.clone(),
            date,
            month,
            derived_failures,
        })
    }

    /// Each derived step runs even when an earlier one fails
    fn refresh_derived(&mut self, conversation: &Conversation) -> Vec<String> {
        let child_id = conversation.child_id.as_str();
        let date = conversation.date();
        let month = conversation.month();
        let mut failures = Vec::new();

        if let Err(e) = self.recompute_daily_summary(child_id, date) {
            failures.push(format!("daily summary {date}: {e}"));
        }
        for topic in conversation.distinct_topics() {
            if let Err(e) = self.update_trajectory(child_id, topic, date) {
                failures.push(format!("trajectory '{topic}': {e}"));
            }
        }
        if let Err(e) = self.recompute_growth_metrics(child_id, month) {
            failures.push(format!("growth metrics {month}: {e}"));
        }
        if let Err(e) = self.recompute_usage(child_id, date) {
            failures.push(format!("usage {date}: {e}"));
        }
        failures
    }

    /// Ingest every record independently; one failure never stops the rest
    pub fn ingest_batch(&mut self, records: &[Value]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, record) in records.iter().enumerate() {
            match self.ingest(record) {
                Ok(_) => report.success += 1,
                Err(e) => {
                    report.failed += 1;
                    report.rejected.push(index);
                    report.errors.push(format!("Conversation {index}: {e}"));
                }
            }
        }
        info!(
            success = report.success,
            failed = report.failed,
            "batch ingestion finished"
        );
        report
    }

    pub fn recompute_daily_summary(
        &mut self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<DailySummary, PipelineError> {
        let conversations = self.store.conversations_on(child_id, date)?;
        let prior_top_topics = match date.checked_sub_days(Days::new(self.config.topic_lookback_days)) {
            Some(prior) => self
                .store
                .daily_summary(child_id, prior)?
                .map(|s| s.top_topics)
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let summary = summarize_day(child_id, date, &conversations, &prior_top_topics, &self.config);
        self.store.put_daily_summary(&summary)?;
        debug!(child_id, %date, conversations = conversations.len(), "recomputed daily summary");
        Ok(summary)
    }

    /// Refresh `topic`'s point for `date`; `None` when nothing that day mentions it
    pub fn update_trajectory(
        &mut self,
        child_id: &str,
        topic: &str,
        date: NaiveDate,
    ) -> Result<Option<TopicTrajectory>, PipelineError> {
        let conversations = self.store.conversations_on(child_id, date)?;
        let Some(point) = trajectory_point(topic, date, &conversations) else {
            return Ok(None);
        };

        let mut trajectory = self
            .store
            .topic_trajectory(child_id, topic)?
            .unwrap_or_else(|| TopicTrajectory::new(child_id, topic));
        trajectory.upsert(point);
        trajectory.reclassify(&self.config);
        self.store.put_topic_trajectory(&trajectory)?;
        debug!(
            child_id,
            topic,
            %date,
            entries = trajectory.history.len(),
            trend = ?trajectory.current_trend,
            "updated trajectory"
        );
        Ok(Some(trajectory))
    }

    pub fn recompute_growth_metrics(
        &mut self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<GrowthMetrics, PipelineError> {
        let conversations = self.store.conversations_in_month(child_id, month)?;
        let metrics = compute_growth_metrics(child_id, month, &conversations);
        self.store.put_growth_metrics(&metrics)?;
        debug!(child_id, %month, conversations = conversations.len(), "recomputed growth metrics");
        Ok(metrics)
    }

    /// Rebuild minutes and sessions for `date` from its stored conversations
    pub fn recompute_usage(
        &mut self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<UsageStats, PipelineError> {
        let conversations = self.store.conversations_on(child_id, date)?;
        let minutes_used: u64 = conversations.iter().map(Conversation::minutes).sum();
        let usage = UsageStats {
            child_id: child_id.to_string(),
            date,
            minutes_used,
            sessions_count: conversations.len(),
            over_daily_limit: minutes_used > self.config.daily_time_limit_minutes,
        };
        self.store.put_usage_stats(&usage)?;
        debug!(child_id, %date, minutes_used, "recomputed usage");
        Ok(usage)
    }

    pub fn get_daily_summary(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, PipelineError> {
        Ok(self.store.daily_summary(child_id, date)?)
    }

    pub fn get_topic_trajectory(
        &self,
        child_id: &str,
        topic: &str,
    ) -> Result<Option<TopicTrajectory>, PipelineError> {
        Ok(self.store.topic_trajectory(child_id, topic)?)
    }

    pub fn get_growth_metrics(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Option<GrowthMetrics>, PipelineError> {
        Ok(self.store.growth_metrics(child_id, month)?)
    }

    /// Newest first
    pub fn list_conversations(
        &self,
        child_id: &str,
        range: DateRange,
    ) -> Result<Vec<Conversation>, PipelineError> {
        Ok(self.store.list_conversations(child_id, range)?)
    }

    pub fn usage_stats(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageStats>, PipelineError> {
        Ok(self.store.usage_stats(child_id, date)?)
    }

    /// Every stored trajectory for the child, in topic order
    pub fn trajectories(&self, child_id: &str) -> Result<Vec<TopicTrajectory>, PipelineError> {
        let mut out = Vec::new();
        for topic in self.store.topics(child_id)? {
            if let Some(t) = self.store.topic_trajectory(child_id, &topic)? {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Delete all conversations and derived entities of a child
    pub fn forget_child(&mut self, child_id: &str) -> Result<usize, PipelineError> {
        let removed = self.store.delete_child(child_id)?;
        info!(child_id, conversations = removed, "forgot child");
        Ok(removed)
    }
}
