//! Mock Prediction Service
//!
//! Serves `POST /predict` in the scoring service's wire format so the
//! monitor can be run without the real model.
//!
//! Usage: mock-predictor [port] [fraud_count] [delay_ms]

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use fraud_monitor::config::DEFAULT_FRAUD_QUOTA;
use fraud_monitor::types::{PredictRequest, PredictionBatch, PredictionResult};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const MODEL_VERSION: &str = "colab-model-v1.0";
const FRAUD_SCORE: f64 = 0.9;
const LEGIT_SCORE: f64 = 0.2;

/// Scoring behaviour shared by all requests
struct MockModel {
    fraud_count: usize,
    delay: Duration,
}

impl MockModel {
    /// Flag the `fraud_count` largest amounts; ties go to the earlier record
    fn score(&self, request: &PredictRequest) -> PredictionBatch {
        let records = &request.transactions;

        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| records[b].amount.total_cmp(&records[a].amount));

        let mut flagged = vec![false; records.len()];
        for &idx in order.iter().take(self.fraud_count) {
            flagged[idx] = true;
        }

        let predictions: Vec<PredictionResult> = records
            .iter()
            .zip(&flagged)
            .map(|(record, &is_fraud)| PredictionResult {
                transaction_id: record.transaction_id.clone(),
                is_fraud_predicted: is_fraud,
                fraud_score: if is_fraud { FRAUD_SCORE } else { LEGIT_SCORE },
            })
            .collect();

        PredictionBatch {
            total_fraud_count: predictions.iter().filter(|p| p.is_fraud_predicted).count(),
            predictions,
            model_version: MODEL_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

async fn predict(
    State(model): State<Arc<MockModel>>,
    Json(request): Json<PredictRequest>,
) -> Json<PredictionBatch> {
    if !model.delay.is_zero() {
        tokio::time::sleep(model.delay).await;
    }

    let batch = model.score(&request);
    info!(
        transactions = request.transactions.len(),
        total_fraud_count = batch.total_fraud_count,
        "Scored batch"
    );
    Json(batch)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_predictor=info".parse()?),
        )
        .init();

    info!("Starting Mock Prediction Service");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let port: u16 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(5000);
    let fraud_count: usize = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAUD_QUOTA);
    let delay_ms: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0);

    let model = Arc::new(MockModel {
        fraud_count,
        delay: Duration::from_millis(delay_ms),
    });

    let app = Router::new()
        .route("/predict", post(predict))
        .with_state(model);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(
        addr = %addr,
        fraud_count = fraud_count,
        delay_ms = delay_ms,
        "Listening for prediction requests"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
