//! Prediction enrichment: score a transaction list and merge the results back.

use crate::error::PredictionError;
use crate::prediction::client::{EndpointConfig, PredictionClient};
use crate::prediction::fallback::FallbackPredictor;
use crate::types::prediction::{PredictionBatch, PredictionResult};
use crate::types::transaction::Transaction;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Where the predictions of an enrichment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// Nothing has been scored yet
    NotScored,
    Remote,
    Fallback,
}

/// Advisory findings about an accepted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EnrichmentWarning {
    /// The remote model flagged a different number of cases than contracted
    CountMismatch { expected: usize, actual: usize },
}

/// Enriched transaction list plus batch metadata
#[derive(Debug, Clone, Serialize)]
pub struct Enrichment {
    pub transactions: Vec<Transaction>,
    pub total_fraud_count: usize,
    pub model_version: String,
    pub source: PredictionSource,
    pub warning: Option<EnrichmentWarning>,
    /// Diagnostic text of the remote failure that triggered the fallback
    pub remote_error: Option<String>,
    /// Set when a newer call superseded this one and the latest committed result was returned
    pub stale: bool,
}

impl Enrichment {
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            total_fraud_count: 0,
            model_version: "unknown".to_string(),
            source: PredictionSource::NotScored,
            warning: None,
            remote_error: None,
            stale: false,
        }
    }

    fn from_batch(
        transactions: &[Transaction],
        batch: &PredictionBatch,
        source: PredictionSource,
    ) -> Self {
        Self {
            transactions: merge_predictions(transactions, &batch.predictions),
            total_fraud_count: batch.total_fraud_count,
            model_version: batch.model_version.clone(),
            source,
            warning: None,
            remote_error: None,
            stale: false,
        }
    }
}

impl Default for Enrichment {
    fn default() -> Self {
        Self::empty()
    }
}

/// Copy `transactions`, applying the prediction with a matching id to each.
///
/// Unmatched transactions keep their predicted flag and score. If a batch
/// carries several results for one id, the first one applies. Scores are
/// clamped to [0, 1]; a non-finite score is dropped.
pub fn merge_predictions(
    transactions: &[Transaction],
    predictions: &[PredictionResult],
) -> Vec<Transaction> {
    let mut by_id: HashMap<&str, &PredictionResult> = HashMap::with_capacity(predictions.len());
    for prediction in predictions {
        by_id
            .entry(prediction.transaction_id.as_str())
            .or_insert(prediction);
    }

    transactions
        .iter()
        .map(|tx| match by_id.get(tx.transaction_id.as_str()) {
            Some(prediction) => Transaction {
                is_fraud_predicted: prediction.is_fraud_predicted,
                fraud_score: clamp_score(prediction.fraud_score),
                ..tx.clone()
            },
            None => tx.clone(),
        })
        .collect()
}

fn clamp_score(score: f64) -> Option<f64> {
    score.is_finite().then(|| score.clamp(0.0, 1.0))
}

/// Compare a remote batch against the contracted fraud count
pub fn check_fraud_count(batch: &PredictionBatch, expected: usize) -> Option<EnrichmentWarning> {
    let actual = batch.flagged_count();
    (actual != expected).then_some(EnrichmentWarning::CountMismatch { expected, actual })
}

/// Runs enrichment calls and keeps the latest committed result.
///
/// Each call takes a generation number; a call that completes after a newer
/// one has started does not overwrite state and returns the committed result.
pub struct Enricher {
    client: PredictionClient,
    fallback: FallbackPredictor,
    generation: AtomicU64,
    latest: RwLock<(u64, Enrichment)>,
}

impl Enricher {
    pub fn new(client: PredictionClient, fallback: FallbackPredictor) -> Self {
        Self {
            client,
            fallback,
            generation: AtomicU64::new(0),
            latest: RwLock::new((0, Enrichment::empty())),
        }
    }

    pub fn with_fraud_quota(fraud_quota: usize) -> Self {
        Self::new(PredictionClient::new(), FallbackPredictor::new(fraud_quota))
    }

    pub fn fallback(&self) -> &FallbackPredictor {
        &self.fallback
    }

    /// Most recently committed enrichment
    pub fn latest(&self) -> Enrichment {
        match self.latest.read() {
            Ok(guard) => guard.1.clone(),
            Err(poisoned) => poisoned.into_inner().1.clone(),
        }
    }

    /// Score `transactions` against `endpoint`, falling back locally on any remote failure.
    ///
    /// Empty input makes no call and returns the latest committed enrichment.
    pub async fn enrich(&self, transactions: &[Transaction], endpoint: &EndpointConfig) -> Enrichment {
        if transactions.is_empty() {
            debug!("No transactions to enrich, keeping previous result");
            return self.latest();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let remote = self.client.predict(endpoint, transactions).await;
        let enrichment = self.build(transactions, remote);

        self.commit(generation, enrichment)
    }

    /// Turn a remote outcome into an enrichment, substituting the fallback on error
    fn build(
        &self,
        transactions: &[Transaction],
        remote: Result<PredictionBatch, PredictionError>,
    ) -> Enrichment {
        match remote {
            Ok(batch) => {
                let expected = self.fallback.expected_fraud_count(transactions.len());
                let mut enrichment =
                    Enrichment::from_batch(transactions, &batch, PredictionSource::Remote);

                if let Some(warning) = check_fraud_count(&batch, expected) {
                    warn!(
                        ?warning,
                        model_version = %batch.model_version,
                        "Remote model flagged an unexpected number of fraud cases"
                    );
                    enrichment.warning = Some(warning);
                }

                info!(
                    transactions = transactions.len(),
                    total_fraud_count = enrichment.total_fraud_count,
                    model_version = %enrichment.model_version,
                    "Applied remote predictions"
                );
                enrichment
            }
            Err(e) => {
                warn!(error = %e, "Prediction endpoint unavailable, using fallback predictions");

                let batch = self.fallback.predict(transactions);
                let mut enrichment =
                    Enrichment::from_batch(transactions, &batch, PredictionSource::Fallback);
                enrichment.remote_error = Some(e.to_string());

                info!(
                    transactions = transactions.len(),
                    total_fraud_count = enrichment.total_fraud_count,
                    "Applied fallback predictions"
                );
                enrichment
            }
        }
    }

    fn commit(&self, generation: u64, enrichment: Enrichment) -> Enrichment {
        let newest = self.generation.load(Ordering::SeqCst);
        let mut guard = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if generation < newest || generation < guard.0 {
            debug!(generation, newest, "Discarding superseded enrichment");
            let mut current = guard.1.clone();
            current.stale = true;
            return current;
        }

        *guard = (generation, enrichment.clone());
        enrichment
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new(PredictionClient::new(), FallbackPredictor::default())
    }
}
