//! HTTP client for the remote scoring endpoint

use crate::config::PredictionConfig;
use crate::error::PredictionError;
use crate::types::prediction::{PredictRequest, PredictionBatch};
use crate::types::transaction::Transaction;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

/// Where and how long to wait for the scoring service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL, without the `/predict` route
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PredictionConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout())
    }

    /// Same timeout, different base URL
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self::new(base_url, self.timeout)
    }

    /// Full URL of the prediction route
    pub fn predict_url(&self) -> Result<Url, PredictionError> {
        let raw = format!("{}/predict", self.base_url.trim_end_matches('/'));
        let url = Url::parse(&raw).map_err(|e| PredictionError::InvalidEndpoint {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(PredictionError::InvalidEndpoint {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

/// Client for `POST {base}/predict`
#[derive(Debug, Clone, Default)]
pub struct PredictionClient {
    http: reqwest::Client,
}

impl PredictionClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Use an existing reqwest client (shared connection pool)
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Score transactions remotely. One attempt, bounded by the endpoint timeout.
    pub async fn predict(
        &self,
        endpoint: &EndpointConfig,
        transactions: &[Transaction],
    ) -> Result<PredictionBatch, PredictionError> {
        let url = endpoint.predict_url()?;
        let request = PredictRequest::from_transactions(transactions);

        info!(url = %url, transactions = transactions.len(), "Calling prediction endpoint");

        let response = self
            .http
            .post(url)
            .json(&request)
            .timeout(endpoint.timeout)
            .send()
            .await
            .map_err(|e| classify(e, endpoint.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, endpoint.timeout))?;

        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let batch: PredictionBatch = serde_json::from_str(&body)?;

        debug!(
            predictions = batch.predictions.len(),
            total_fraud_count = batch.total_fraud_count,
            model_version = %batch.model_version,
            "Prediction response decoded"
        );

        Ok(batch)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> PredictionError {
    if err.is_timeout() {
        PredictionError::Timeout(timeout)
    } else {
        PredictionError::Network(err)
    }
}
