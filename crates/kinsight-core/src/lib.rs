//! Aggregation pipeline deriving dashboard insights from annotated conversations

mod config;
mod daily;
mod growth;
mod levels;
mod memory;
mod pipeline;
mod store;
mod trajectory;
mod types;

pub use config::PipelineConfig;
pub use daily::{summarize_day, topic_trends};
pub use growth::compute_growth_metrics;
pub use levels::{curiosity_level, resilience_level, stress_level};
pub use memory::MemoryStore;
pub use pipeline::{BatchReport, IngestReport, Pipeline, PipelineError};
pub use store::{DateRange, InsightStore, StoreError};
pub use trajectory::trajectory_point;
pub use types::{
    DailySummary, GrowthMetrics, Level, TopicTrajectory, TrajectoryPoint, Trend, UsageStats,
};

#[cfg(test)]
mod testing;
