//! Dashboard headline figures and the logged summary view.

use super::chart::{grouped_counts, ChartData, GroupKey};
use super::confusion::{ConfusionMatrix, PerformanceMetrics};
use crate::types::transaction::Transaction;
use serde::Serialize;
use tracing::info;

/// Everything the dashboard shows for one (filtered) transaction list
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_transactions: usize,
    /// Transactions predicted as fraud
    pub flagged_transactions: usize,
    /// flagged / total, 0 when empty
    pub fraud_ratio: f64,
    /// Mean amount of flagged transactions, 0 when none
    pub avg_fraud_amount: f64,
    pub matrix: ConfusionMatrix,
    pub metrics: PerformanceMetrics,
}

impl DashboardSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_transactions = transactions.len();
        let (flagged_transactions, flagged_amount) = transactions
            .iter()
            .filter(|tx| tx.is_fraud_predicted)
            .fold((0usize, 0.0f64), |(count, sum), tx| (count + 1, sum + tx.amount));

        let fraud_ratio = if total_transactions > 0 {
            flagged_transactions as f64 / total_transactions as f64
        } else {
            0.0
        };
        let avg_fraud_amount = if flagged_transactions > 0 {
            flagged_amount / flagged_transactions as f64
        } else {
            0.0
        };

        let (matrix, metrics) = PerformanceMetrics::evaluate(transactions);

        Self {
            total_transactions,
            flagged_transactions,
            fraud_ratio,
            avg_fraud_amount,
            matrix,
            metrics,
        }
    }

    /// Log the summary block
    pub fn log_summary(&self, model_version: &str) {
        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD MONITOR - DASHBOARD SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions: {:>8}  │  Flagged as Fraud: {:>8}          ║",
            self.total_transactions, self.flagged_transactions
        );
        info!(
            "║ Fraud Ratio: {:>7.2}%  │  Avg. Fraud Amount: ${:>10.0}     ║",
            self.fraud_ratio * 100.0,
            self.avg_fraud_amount
        );
        info!("║ Model: {:<54}║", model_version);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Confusion Matrix: TP={:>5} FP={:>5} TN={:>5} FN={:>5}        ║",
            self.matrix.true_positives,
            self.matrix.false_positives,
            self.matrix.true_negatives,
            self.matrix.false_negatives
        );
        info!(
            "║ Precision={:>5.1}% Recall={:>5.1}% F1={:>5.1}% Accuracy={:>5.1}% ║",
            self.metrics.precision * 100.0,
            self.metrics.recall * 100.0,
            self.metrics.f1_score * 100.0,
            self.metrics.accuracy * 100.0
        );
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

/// Log one chart as a bar listing of predicted vs reported counts
pub fn log_chart(title: &str, chart: &ChartData) {
    let max = chart
        .predicted
        .iter()
        .chain(chart.reported.iter())
        .copied()
        .max()
        .unwrap_or(0);

    info!("{}:", title);
    for ((label, &predicted), &reported) in chart
        .labels
        .iter()
        .zip(chart.predicted.iter())
        .zip(chart.reported.iter())
    {
        info!(
            "  {:<14} predicted={:>4} {:<20} reported={:>4} {}",
            label,
            predicted,
            bar(predicted, max),
            reported,
            bar(reported, max)
        );
    }
}

/// Log every dashboard chart for `transactions`
pub fn log_charts(transactions: &[Transaction]) {
    for (title, key) in [
        ("Fraud by Channel", GroupKey::Channel),
        ("Fraud by Payment Mode", GroupKey::PaymentMode),
        ("Fraud by Gateway", GroupKey::Gateway),
        ("Fraud Trend (14 days)", GroupKey::Time),
    ] {
        log_chart(title, &grouped_counts(transactions, key));
    }
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * 20).div_ceil(max);
    "█".repeat(len.min(20))
}
