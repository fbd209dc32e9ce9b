//! Local stand-in for the scoring model when the endpoint is unavailable.
//!
//! The external model is contracted to flag a fixed number of cases, so the
//! fallback flags the highest-amount transactions up to that quota.

use crate::config::DEFAULT_FRAUD_QUOTA;
use crate::types::prediction::{PredictionBatch, PredictionResult};
use crate::types::transaction::Transaction;
use chrono::Utc;
use rand::Rng;
use std::ops::Range;
use tracing::debug;

/// Model version reported for fallback batches
pub const FALLBACK_MODEL_VERSION: &str = "fallback-v1.0";

/// Score range for flagged transactions
pub const FRAUD_SCORE_RANGE: Range<f64> = 0.8..1.0;

/// Score range for everything else
pub const LEGIT_SCORE_RANGE: Range<f64> = 0.0..0.5;

/// Deterministic amount-ranked fallback predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPredictor {
    fraud_quota: usize,
}

impl FallbackPredictor {
    pub fn new(fraud_quota: usize) -> Self {
        Self { fraud_quota }
    }

    pub fn fraud_quota(&self) -> usize {
        self.fraud_quota
    }

    /// Number of transactions flagged for a list of `count`
    pub fn expected_fraud_count(&self, count: usize) -> usize {
        self.fraud_quota.min(count)
    }

    /// Produce a batch using the thread-local RNG for scores
    pub fn predict(&self, transactions: &[Transaction]) -> PredictionBatch {
        self.predict_with_rng(transactions, &mut rand::thread_rng())
    }

    /// Produce a batch, drawing scores from `rng`.
    ///
    /// Which transactions are flagged never depends on `rng`: the top
    /// `min(quota, len)` by amount, ties resolved by input order.
    pub fn predict_with_rng<R: Rng>(
        &self,
        transactions: &[Transaction],
        rng: &mut R,
    ) -> PredictionBatch {
        let flagged = self.flagged_positions(transactions);

        let predictions: Vec<PredictionResult> = transactions
            .iter()
            .zip(flagged.iter())
            .map(|(tx, &is_fraud)| PredictionResult {
                transaction_id: tx.transaction_id.clone(),
                is_fraud_predicted: is_fraud,
                fraud_score: if is_fraud {
                    rng.gen_range(FRAUD_SCORE_RANGE)
                } else {
                    rng.gen_range(LEGIT_SCORE_RANGE)
                },
            })
            .collect();

        let total_fraud_count = self.expected_fraud_count(transactions.len());

        debug!(
            transactions = transactions.len(),
            flagged = total_fraud_count,
            "Fallback predictions generated"
        );

        PredictionBatch {
            predictions,
            total_fraud_count,
            model_version: FALLBACK_MODEL_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Per-position fraud flags, aligned with `transactions`
    fn flagged_positions(&self, transactions: &[Transaction]) -> Vec<bool> {
        let mut order: Vec<usize> = (0..transactions.len()).collect();
        // sort_by is stable, so equal amounts keep their input order
        order.sort_by(|&a, &b| transactions[b].amount.total_cmp(&transactions[a].amount));

        let mut flagged = vec![false; transactions.len()];
        for &idx in order.iter().take(self.expected_fraud_count(transactions.len())) {
            flagged[idx] = true;
        }
        flagged
    }
}

impl Default for FallbackPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_FRAUD_QUOTA)
    }
}
