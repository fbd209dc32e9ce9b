//! Grouped predicted/reported counts for the dashboard charts

use crate::types::transaction::Transaction;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length of the time-series window in days
pub const TIME_WINDOW_DAYS: u64 = 14;

/// Field the chart groups transactions by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Channel,
    PaymentMode,
    Gateway,
    /// One bucket per local calendar day over the trailing window
    Time,
}

/// Parallel label/count series, one entry per group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub predicted: Vec<usize>,
    pub reported: Vec<usize>,
}

impl ChartData {
    fn push(&mut self, label: String) -> usize {
        self.labels.push(label);
        self.predicted.push(0);
        self.reported.push(0);
        self.labels.len() - 1
    }

    fn count(&mut self, idx: usize, tx: &Transaction) {
        if tx.is_fraud_predicted {
            self.predicted[idx] += 1;
        }
        if tx.is_fraud_reported {
            self.reported[idx] += 1;
        }
    }
}

/// Group `transactions` by `key`; time mode ends at the current local day
pub fn grouped_counts(transactions: &[Transaction], key: GroupKey) -> ChartData {
    match key {
        GroupKey::Channel => categorical_counts(transactions, |tx| tx.channel.label().to_string()),
        GroupKey::PaymentMode => {
            categorical_counts(transactions, |tx| tx.payment_mode.label().to_string())
        }
        GroupKey::Gateway => categorical_counts(transactions, |tx| tx.payment_gateway.clone()),
        GroupKey::Time => time_series_at(transactions, Local::now()),
    }
}

/// Categorical grouping; labels keep the order of first occurrence
fn categorical_counts<F>(transactions: &[Transaction], label_of: F) -> ChartData
where
    F: Fn(&Transaction) -> String,
{
    let mut chart = ChartData::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions {
        let label = label_of(tx);
        let idx = match index.get(&label) {
            Some(&idx) => idx,
            None => {
                let idx = chart.push(label.clone());
                index.insert(label, idx);
                idx
            }
        };
        chart.count(idx, tx);
    }

    chart
}

/// Daily buckets for the 14 days ending on `now`'s calendar day, oldest first.
///
/// Transactions are assigned by their calendar day in `now`'s timezone;
/// anything outside the window is ignored.
pub fn time_series_at<Tz: TimeZone>(transactions: &[Transaction], now: DateTime<Tz>) -> ChartData {
    let today = now.date_naive();
    let tz = now.timezone();
    let mut chart = ChartData::default();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for offset in (0..TIME_WINDOW_DAYS).rev() {
        let day = today - Days::new(offset);
        let idx = chart.push(day.format("%b %-d").to_string());
        index.insert(day, idx);
    }

    for tx in transactions {
        let day = tx.timestamp.with_timezone(&tz).date_naive();
        if let Some(&idx) = index.get(&day) {
            chart.count(idx, tx);
        }
    }

    chart
}
