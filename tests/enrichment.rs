//! End-to-end enrichment against a local scoring server

use axum::{http::StatusCode, routing::post, Json, Router};
use chrono::{TimeZone, Utc};
use fraud_monitor::error::PredictionError;
use fraud_monitor::prediction::{
    EndpointConfig, Enricher, EnrichmentWarning, PredictionClient, PredictionSource,
};
use fraud_monitor::types::{PredictRequest, PredictionBatch, PredictionResult};
use fraud_monitor::{DashboardSummary, Transaction};
use std::sync::Arc;
use std::time::Duration;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn endpoint(base_url: &str) -> EndpointConfig {
    EndpointConfig::new(base_url, Duration::from_secs(5))
}

fn transactions(count: usize) -> Vec<Transaction> {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            Transaction::new(format!("TXN-{}", 100_000 + i), 100.0 * (i + 1) as f64, ts)
                .with_parties(format!("P-{:04}", i), "M-0001")
                .with_flags(false, i % 2 == 0)
        })
        .collect()
}

/// Flags the `flag` largest amounts, like the production model
fn score(request: &PredictRequest, flag: usize) -> PredictionBatch {
    let records = &request.transactions;
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| records[b].amount.total_cmp(&records[a].amount));
    let top: Vec<usize> = order.into_iter().take(flag).collect();

    let predictions: Vec<PredictionResult> = records
        .iter()
        .enumerate()
        .map(|(i, r)| PredictionResult {
            transaction_id: r.transaction_id.clone(),
            is_fraud_predicted: top.contains(&i),
            fraud_score: if top.contains(&i) { 0.9 } else { 0.2 },
        })
        .collect();

    PredictionBatch {
        total_fraud_count: top.len(),
        predictions,
        model_version: "colab-model-v1.0".to_string(),
        timestamp: Utc::now(),
    }
}

fn flagging_server(flag: usize) -> Router {
    Router::new().route(
        "/predict",
        post(move |Json(request): Json<PredictRequest>| async move {
            Json(score(&request, flag))
        }),
    )
}

fn ids(txs: &[Transaction]) -> Vec<&str> {
    txs.iter().map(|t| t.transaction_id.as_str()).collect()
}

#[tokio::test]
async fn test_remote_predictions_are_merged() {
    let base = spawn(flagging_server(2)).await;
    let enricher = Enricher::with_fraud_quota(2);
    let input = transactions(5);

    let enrichment = enricher.enrich(&input, &endpoint(&base)).await;

    assert_eq!(enrichment.source, PredictionSource::Remote);
    assert_eq!(enrichment.model_version, "colab-model-v1.0");
    assert_eq!(enrichment.total_fraud_count, 2);
    assert!(enrichment.warning.is_none());
    assert!(enrichment.remote_error.is_none());
    assert_eq!(ids(&enrichment.transactions), ids(&input));

    let flagged: Vec<&str> = enrichment
        .transactions
        .iter()
        .filter(|t| t.is_fraud_predicted)
        .map(|t| t.transaction_id.as_str())
        .collect();
    assert_eq!(flagged, vec!["TXN-100003", "TXN-100004"]);
    assert!(enrichment.transactions.iter().all(|t| t.fraud_score.is_some()));

    // Reported flags come from the input, untouched by scoring
    for (before, after) in input.iter().zip(&enrichment.transactions) {
        assert_eq!(before.is_fraud_reported, after.is_fraud_reported);
        assert_eq!(before.amount, after.amount);
    }

    let summary = DashboardSummary::from_transactions(&enrichment.transactions);
    assert_eq!(summary.flagged_transactions, 2);
}

#[tokio::test]
async fn test_unexpected_fraud_count_is_accepted_with_warning() {
    let base = spawn(flagging_server(1)).await;
    let enricher = Enricher::with_fraud_quota(3);

    let enrichment = enricher.enrich(&transactions(6), &endpoint(&base)).await;

    assert_eq!(enrichment.source, PredictionSource::Remote);
    assert_eq!(
        enrichment.warning,
        Some(EnrichmentWarning::CountMismatch {
            expected: 3,
            actual: 1
        })
    );
    assert_eq!(
        enrichment
            .transactions
            .iter()
            .filter(|t| t.is_fraud_predicted)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_naive_timestamp_response_is_accepted() {
    // Shape produced by a pandas `Timestamp.now().isoformat()` server
    let body = r#"{"predictions":[{"transaction_id":"TXN-100000","is_fraud_predicted":true,"fraud_score":0.9},{"transaction_id":"TXN-100001","is_fraud_predicted":false,"fraud_score":0.2}],"total_fraud_count":1,"model_version":"colab-model-v1.0","timestamp":"2024-05-01T12:00:00.123456"}"#;
    let app = Router::new().route("/predict", post(move || async move { body }));
    let base = spawn(app).await;

    let enrichment = Enricher::with_fraud_quota(1)
        .enrich(&transactions(2), &endpoint(&base))
        .await;

    assert_eq!(enrichment.source, PredictionSource::Remote);
    assert_eq!(enrichment.model_version, "colab-model-v1.0");
    assert!(enrichment.remote_error.is_none());
    assert!(enrichment.transactions[0].is_fraud_predicted);
    assert_eq!(enrichment.transactions[1].fraud_score, Some(0.2));
}

#[tokio::test]
async fn test_minimal_response_uses_defaults() {
    let body = r#"{"predictions":[{"transaction_id":"TXN-100000","is_fraud_predicted":true,"fraud_score":0.7}]}"#;
    let app = Router::new().route("/predict", post(move || async move { body }));
    let base = spawn(app).await;

    let enrichment = Enricher::with_fraud_quota(1)
        .enrich(&transactions(1), &endpoint(&base))
        .await;

    assert_eq!(enrichment.source, PredictionSource::Remote);
    assert_eq!(enrichment.model_version, "unknown");
    assert_eq!(enrichment.total_fraud_count, 0);
}

#[tokio::test]
async fn test_error_status_falls_back() {
    let app = Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let base = spawn(app).await;
    let enricher = Enricher::with_fraud_quota(2);
    let input = transactions(4);

    let enrichment = enricher.enrich(&input, &endpoint(&base)).await;

    assert_eq!(enrichment.source, PredictionSource::Fallback);
    assert_eq!(enrichment.model_version, "fallback-v1.0");
    assert_eq!(ids(&enrichment.transactions), ids(&input));
    assert!(enrichment.remote_error.unwrap().contains("500"));

    let flagged: Vec<&str> = enrichment
        .transactions
        .iter()
        .filter(|t| t.is_fraud_predicted)
        .map(|t| t.transaction_id.as_str())
        .collect();
    assert_eq!(flagged, vec!["TXN-100002", "TXN-100003"]);
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let app = Router::new().route("/predict", post(|| async { "definitely not json" }));
    let base = spawn(app).await;

    let client = PredictionClient::new();
    let err = client
        .predict(&endpoint(&base), &transactions(3))
        .await
        .unwrap_err();
    assert!(matches!(err, PredictionError::Decode(_)));

    let enrichment = Enricher::default()
        .enrich(&transactions(3), &endpoint(&base))
        .await;
    assert_eq!(enrichment.source, PredictionSource::Fallback);
    assert_eq!(enrichment.total_fraud_count, 3);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let app = Router::new().route(
        "/predict",
        post(|Json(request): Json<PredictRequest>| async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(score(&request, 1))
        }),
    );
    let base = spawn(app).await;
    let short = EndpointConfig::new(base.as_str(), Duration::from_millis(200));

    let err = PredictionClient::new()
        .predict(&short, &transactions(2))
        .await
        .unwrap_err();
    assert!(matches!(err, PredictionError::Timeout(_)));

    let enrichment = Enricher::default().enrich(&transactions(2), &short).await;
    assert_eq!(enrichment.source, PredictionSource::Fallback);
}

#[tokio::test]
async fn test_superseded_response_is_discarded() {
    // Single-transaction requests are slow, larger ones answer immediately
    let app = Router::new().route(
        "/predict",
        post(|Json(request): Json<PredictRequest>| async move {
            if request.transactions.len() == 1 {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Json(score(&request, 1))
        }),
    );
    let base = spawn(app).await;
    let enricher = Arc::new(Enricher::with_fraud_quota(1));

    let slow = {
        let enricher = enricher.clone();
        let endpoint = endpoint(&base);
        tokio::spawn(async move { enricher.enrich(&transactions(1), &endpoint).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let fast = enricher.enrich(&transactions(3), &endpoint(&base)).await;
    assert!(!fast.stale);
    assert_eq!(fast.transactions.len(), 3);

    let late = slow.await.unwrap();
    assert!(late.stale);
    assert_eq!(late.transactions.len(), 3);
    assert_eq!(enricher.latest().transactions.len(), 3);
}
