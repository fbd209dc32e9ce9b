//! Dashboard transaction filters

use crate::types::transaction::Transaction;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which fraud flags a transaction must carry to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FraudStatus {
    #[default]
    All,
    Predicted,
    Reported,
    /// Predicted and reported flags disagree
    Mismatch,
}

impl FraudStatus {
    fn matches(&self, tx: &Transaction) -> bool {
        match self {
            FraudStatus::All => true,
            FraudStatus::Predicted => tx.is_fraud_predicted,
            FraudStatus::Reported => tx.is_fraud_reported,
            FraudStatus::Mismatch => tx.is_fraud_predicted != tx.is_fraud_reported,
        }
    }
}

/// Filter criteria; empty strings and `None` dates match everything.
///
/// Dates are calendar days in the viewer's timezone: local time for
/// [`TransactionFilters::apply`], an explicit zone for `apply_in`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilters {
    /// Inclusive, from the start of this day
    pub start_date: Option<NaiveDate>,
    /// Inclusive, through the end of this day
    pub end_date: Option<NaiveDate>,
    pub payer_id: String,
    pub payee_id: String,
    /// Substring of the transaction id
    pub search_query: String,
    pub fraud_status: FraudStatus,
}

impl TransactionFilters {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_in(tx, &Local)
    }

    /// Like [`TransactionFilters::matches`], with day boundaries taken in `tz`
    pub fn matches_in<Tz: TimeZone>(&self, tx: &Transaction, tz: &Tz) -> bool {
        if let Some(start) = self.start_date.and_then(|date| day_start(date, tz)) {
            if tx.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self
            .end_date
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .and_then(|date| day_start(date, tz))
        {
            if tx.timestamp >= end {
                return false;
            }
        }

        contains_ci(&tx.payer_id, &self.payer_id)
            && contains_ci(&tx.payee_id, &self.payee_id)
            && contains_ci(&tx.transaction_id, &self.search_query)
            && self.fraud_status.matches(tx)
    }

    /// Matching transactions, in input order
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        self.apply_in(transactions, &Local)
    }

    pub fn apply_in<Tz: TimeZone>(&self, transactions: &[Transaction], tz: &Tz) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches_in(tx, tz))
            .cloned()
            .collect()
    }
}

/// First instant of `date` in `tz`, as UTC
fn day_start<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
