//! Prediction endpoint payloads

use super::transaction::{ScoringRecord, Transaction};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-transaction output of the scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Transaction this prediction belongs to
    pub transaction_id: String,

    /// Whether the model flags the transaction as fraud
    pub is_fraud_predicted: bool,

    /// Fraud probability (0.0 - 1.0)
    pub fraud_score: f64,
}

/// A full response of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBatch {
    pub predictions: Vec<PredictionResult>,

    #[serde(default)]
    pub total_fraud_count: usize,

    /// Label of the model that produced the batch
    #[serde(default = "unknown_model")]
    pub model_version: String,

    /// When the batch was generated; offset-less times are read as UTC
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn unknown_model() -> String {
    "unknown".to_string()
}

/// Accept RFC 3339 as well as naive ISO 8601 (`2024-05-01T12:00:00.123456`).
///
/// Anything unreadable is replaced by the receive time.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

impl PredictionBatch {
    /// Number of results flagged as fraud
    pub fn flagged_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| p.is_fraud_predicted)
            .count()
    }
}

/// Request body for `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub transactions: Vec<ScoringRecord>,
}

impl PredictRequest {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            transactions: transactions.iter().map(Transaction::scoring_record).collect(),
        }
    }
}
