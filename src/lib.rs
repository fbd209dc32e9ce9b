//! Fraud Monitor Library
//!
//! Core of a fraud monitoring dashboard: transaction import, remote
//! prediction enrichment with a local fallback, filtering and the fraud
//! metrics shown to analysts.

pub mod config;
pub mod error;
pub mod filter;
pub mod import;
pub mod metrics;
pub mod mock;
pub mod prediction;
pub mod rules;
pub mod settings;
pub mod types;

pub use config::AppConfig;
pub use error::{ImportError, PredictionError, RuleError, SettingsError};
pub use filter::{FraudStatus, TransactionFilters};
pub use metrics::{ConfusionMatrix, DashboardSummary, PerformanceMetrics};
pub use prediction::{EndpointConfig, Enricher, Enrichment, FallbackPredictor, PredictionClient};
pub use settings::EndpointSettings;
pub use types::{prediction::PredictionBatch, transaction::Transaction};
