use chrono::{NaiveDate, SecondsFormat};
use kinsight_core::{
    DailySummary, DateRange, GrowthMetrics, InsightStore, StoreError, TopicTrajectory, UsageStats,
};
use kinsight_records::{Conversation, YearMonth};
use rusqlite::{params, Connection, OptionalExtension, Params};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// [`InsightStore`] backed by a single SQLite file.
///
/// Each entity lives in its own table as a JSON body keyed by child and date,
/// month or topic. Conversation rowids preserve ingestion order.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(StoreError::backend)?;
        }
        let conn = Connection::open(db_path).map_err(StoreError::backend)?;
        Self::init_schema(&conn)?;
        debug!(path = %db_path.display(), "opened insight store");
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS conversations (
                child_id TEXT NOT NULL,
                id TEXT NOT NULL,
                date TEXT NOT NULL,
                month TEXT NOT NULL,
                started_at TEXT NOT NULL,
                body TEXT NOT NULL,
                UNIQUE(child_id, id)
            );
            CREATE INDEX IF NOT EXISTS idx_conversations_date ON conversations(child_id, date);
            CREATE INDEX IF NOT EXISTS idx_conversations_month ON conversations(child_id, month);
            CREATE TABLE IF NOT EXISTS daily_summaries (
                child_id TEXT NOT NULL,
                date TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (child_id, date)
            );
            CREATE TABLE IF NOT EXISTS topic_trajectories (
                child_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (child_id, topic)
            );
            CREATE TABLE IF NOT EXISTS growth_metrics (
                child_id TEXT NOT NULL,
                month TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (child_id, month)
            );
            CREATE TABLE IF NOT EXISTS usage_stats (
                child_id TEXT NOT NULL,
                date TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (child_id, date)
            );
            ",
        )
        .map_err(StoreError::backend)
    }

    /// Decode the JSON body in column 0 of every row
    fn bodies<T: DeserializeOwned, P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare_cached(sql).map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))
            .map_err(StoreError::backend)?;

        let mut out = Vec::new();
        for body in rows {
            let body = body.map_err(StoreError::backend)?;
            out.push(serde_json::from_str(&body)?);
        }
        Ok(out)
    }

    fn body<T: DeserializeOwned, P: Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Option<T>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(sql, params, |row| row.get(0))
            .optional()
            .map_err(StoreError::backend)?;
        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a keyed JSON body in one of the derived tables
    fn upsert<T: Serialize>(
        &self,
        table: &str,
        key_column: &str,
        child_id: &str,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {table} (child_id, {key_column}, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(child_id, {key_column}) DO UPDATE SET body = excluded.body"
        );
        self.conn
            .execute(&sql, params![child_id, key, serde_json::to_string(value)?])
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

impl InsightStore for SqliteStore {
    fn insert_conversation(&mut self, conversation: &Conversation) -> Result<(), StoreError> {
        if self.has_conversation(&conversation.child_id, &conversation.id)? {
            return Err(StoreError::DuplicateConversation {
                child_id: conversation.child_id.clone(),
                id: conversation.id.clone(),
            });
        }
        self.conn
            .execute(
                "INSERT INTO conversations (child_id, id, date, month, started_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    conversation.child_id,
                    conversation.id,
                    conversation.date().to_string(),
                    conversation.month().to_string(),
                    conversation
                        .started_at
                        .to_rfc3339_opts(SecondsFormat::Nanos, true),
                    serde_json::to_string(conversation)?,
                ],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    fn has_conversation(&self, child_id: &str, id: &str) -> Result<bool, StoreError> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM conversations WHERE child_id = ?1 AND id = ?2)",
                params![child_id, id],
                |row| row.get(0),
            )
            .map_err(StoreError::backend)
    }

    fn conversations_on(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Conversation>, StoreError> {
        self.bodies(
            "SELECT body FROM conversations WHERE child_id = ?1 AND date = ?2 ORDER BY rowid",
            params![child_id, date.to_string()],
        )
    }

    fn conversations_in_month(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Vec<Conversation>, StoreError> {
        self.bodies(
            "SELECT body FROM conversations WHERE child_id = ?1 AND month = ?2 ORDER BY rowid",
            params![child_id, month.to_string()],
        )
    }

    fn list_conversations(
        &self,
        child_id: &str,
        range: DateRange,
    ) -> Result<Vec<Conversation>, StoreError> {
        // Fixed-width UTC timestamps sort lexically in time order
        let (from, to) = match range {
            DateRange::All => ("0000-01-01".to_string(), "9999-12-31".to_string()),
            DateRange::Day(day) => (day.to_string(), day.to_string()),
            DateRange::Between { from, to } => (from.to_string(), to.to_string()),
        };
        self.bodies(
            "SELECT body FROM conversations
             WHERE child_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY started_at DESC, rowid DESC",
            params![child_id, from, to],
        )
    }

    fn daily_summary(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>, StoreError> {
        self.body(
            "SELECT body FROM daily_summaries WHERE child_id = ?1 AND date = ?2",
            params![child_id, date.to_string()],
        )
    }

    fn put_daily_summary(&mut self, summary: &DailySummary) -> Result<(), StoreError> {
        self.upsert(
            "daily_summaries",
            "date",
            &summary.child_id,
            &summary.date.to_string(),
            summary,
        )
    }

    fn topic_trajectory(
        &self,
        child_id: &str,
        topic: &str,
    ) -> Result<Option<TopicTrajectory>, StoreError> {
        self.body(
            "SELECT body FROM topic_trajectories WHERE child_id = ?1 AND topic = ?2",
            params![child_id, topic],
        )
    }

    fn put_topic_trajectory(&mut self, trajectory: &TopicTrajectory) -> Result<(), StoreError> {
        self.upsert(
            "topic_trajectories",
            "topic",
            &trajectory.child_id,
            &trajectory.topic,
            trajectory,
        )
    }

    fn topics(&self, child_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT topic FROM topic_trajectories WHERE child_id = ?1 ORDER BY topic")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map(params![child_id], |row| row.get::<_, String>(0))
            .map_err(StoreError::backend)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    fn growth_metrics(
        &self,
        child_id: &str,
        month: YearMonth,
    ) -> Result<Option<GrowthMetrics>, StoreError> {
        self.body(
            "SELECT body FROM growth_metrics WHERE child_id = ?1 AND month = ?2",
            params![child_id, month.to_string()],
        )
    }

    fn put_growth_metrics(&mut self, metrics: &GrowthMetrics) -> Result<(), StoreError> {
        self.upsert(
            "growth_metrics",
            "month",
            &metrics.child_id,
            &metrics.month.to_string(),
            metrics,
        )
    }

    fn usage_stats(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Option<UsageStats>, StoreError> {
        self.body(
            "SELECT body FROM usage_stats WHERE child_id = ?1 AND date = ?2",
            params![child_id, date.to_string()],
        )
    }

    fn put_usage_stats(&mut self, usage: &UsageStats) -> Result<(), StoreError> {
        self.upsert(
            "usage_stats",
            "date",
            &usage.child_id,
            &usage.date.to_string(),
            usage,
        )
    }

    fn delete_child(&mut self, child_id: &str) -> Result<usize, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        let removed = tx
            .execute("DELETE FROM conversations WHERE child_id = ?1", params![child_id])
            .map_err(StoreError::backend)?;
        for table in ["daily_summaries", "topic_trajectories", "growth_metrics", "usage_stats"] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE child_id = ?1"),
                params![child_id],
            )
            .map_err(StoreError::backend)?;
        }
        tx.commit().map_err(StoreError::backend)?;
        debug!(child_id, conversations = removed, "deleted child data");
        Ok(removed)
    }
}
