//! Confusion matrix and derived classification ratios

use crate::types::transaction::Transaction;
use serde::Serialize;

/// Predicted-vs-reported fraud counts over a transaction set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Classify every transaction into exactly one quadrant
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut matrix = Self::default();
        for tx in transactions {
            matrix.record(tx.is_fraud_predicted, tx.is_fraud_reported);
        }
        matrix
    }

    pub fn record(&mut self, predicted: bool, reported: bool) {
        match (predicted, reported) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    /// Size of the evaluated set
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Ratios in [0, 1]; every zero denominator yields 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub accuracy: f64,
}

impl PerformanceMetrics {
    pub fn from_matrix(matrix: &ConfusionMatrix, total_count: usize) -> Self {
        let precision = ratio(
            matrix.true_positives,
            matrix.true_positives + matrix.false_positives,
        );
        let recall = ratio(
            matrix.true_positives,
            matrix.true_positives + matrix.false_negatives,
        );
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let accuracy = ratio(matrix.true_positives + matrix.true_negatives, total_count);

        Self {
            precision,
            recall,
            f1_score,
            accuracy,
        }
    }

    /// Matrix and metrics in one pass over `transactions`
    pub fn evaluate(transactions: &[Transaction]) -> (ConfusionMatrix, Self) {
        let matrix = ConfusionMatrix::from_transactions(transactions);
        let metrics = Self::from_matrix(&matrix, transactions.len());
        (matrix, metrics)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
