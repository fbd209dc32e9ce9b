//! Mock transaction generator for the dashboard

use crate::types::transaction::{Channel, PaymentMode, Transaction};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GATEWAYS: [&str; 5] = ["PayPal", "Stripe", "Square", "Adyen", "Chase"];

/// Probability that a mock transaction is predicted as fraud
const PREDICTED_RATE: f64 = 0.15;

/// Probability that the reported flag agrees with the predicted one
const AGREEMENT_RATE: f64 = 0.8;

/// Generates plausible transactions spread over the last 30 days
pub struct MockGenerator {
    rng: StdRng,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<Transaction> {
        let now = Utc::now();
        (0..count).map(|i| self.generate_one(i, now)).collect()
    }

    fn generate_one(&mut self, index: usize, now: chrono::DateTime<Utc>) -> Transaction {
        let is_fraud_predicted = self.rng.gen_bool(PREDICTED_RATE);
        let is_fraud_reported = if self.rng.gen_bool(AGREEMENT_RATE) {
            is_fraud_predicted
        } else {
            !is_fraud_predicted
        };

        let amount = self.rng.gen_range(100.0..=10_000.0_f64).round();
        let days_ago = self.rng.gen_range(0..30);

        Transaction {
            transaction_id: format!("TXN-{:06}", 100_000 + index),
            amount,
            timestamp: now - Duration::days(days_ago),
            payer_id: format!("P-{:04}", self.rng.gen_range(0..1000)),
            payee_id: format!("M-{:04}", self.rng.gen_range(0..500)),
            channel: Channel::ALL[self.rng.gen_range(0..Channel::ALL.len())],
            payment_mode: PaymentMode::ALL[self.rng.gen_range(0..PaymentMode::ALL.len())],
            payment_gateway: GATEWAYS[self.rng.gen_range(0..GATEWAYS.len())].to_string(),
            is_fraud_predicted,
            is_fraud_reported,
            fraud_score: None,
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}
