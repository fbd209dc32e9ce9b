//! Fraud metrics derived from enriched transactions

pub mod chart;
pub mod confusion;
pub mod summary;

pub use chart::{grouped_counts, time_series_at, ChartData, GroupKey};
pub use confusion::{ConfusionMatrix, PerformanceMetrics};
pub use summary::DashboardSummary;
