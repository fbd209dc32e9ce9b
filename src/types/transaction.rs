//! Transaction data structures for the fraud monitoring dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel a payment was initiated through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Channel {
    #[default]
    Web,
    Mobile,
    #[serde(rename = "In-person")]
    InPerson,
    #[serde(rename = "API")]
    Api,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Web, Channel::Mobile, Channel::InPerson, Channel::Api];

    /// Display label, identical to the wire name
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Web => "Web",
            Channel::Mobile => "Mobile",
            Channel::InPerson => "In-person",
            Channel::Api => "API",
        }
    }

    /// Map a free-form channel name onto a known channel.
    ///
    /// Unknown or missing names map to `Web`.
    pub fn from_loose(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Channel::Web;
        };
        let lower = raw.to_lowercase();

        if lower.contains("web") || lower.contains("online") {
            Channel::Web
        } else if lower.contains("mobile") || lower.contains("app") {
            Channel::Mobile
        } else if lower.contains("person") || lower.contains("pos") || lower.contains("terminal") {
            Channel::InPerson
        } else if lower.contains("api") || lower.contains("service") {
            Channel::Api
        } else {
            Channel::Web
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment instrument used for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMode {
    #[default]
    Card,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Wallet,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Card,
        PaymentMode::Upi,
        PaymentMode::BankTransfer,
        PaymentMode::Wallet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Card => "Card",
            PaymentMode::Upi => "UPI",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Wallet => "Wallet",
        }
    }

    /// Map a free-form payment method onto a known mode (default `Card`)
    pub fn from_loose(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return PaymentMode::Card;
        };
        let lower = raw.to_lowercase();

        if lower.contains("card") || lower.contains("credit") || lower.contains("debit") {
            PaymentMode::Card
        } else if lower.contains("upi") || lower.contains("instant") {
            PaymentMode::Upi
        } else if lower.contains("bank") || lower.contains("transfer") || lower.contains("wire") {
            PaymentMode::BankTransfer
        } else if lower.contains("wallet") || lower.contains("paypal") || lower.contains("venmo") {
            PaymentMode::Wallet
        } else {
            PaymentMode::Card
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A payment transaction shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: String,

    /// Transaction amount (non-negative)
    pub amount: f64,

    /// When the transaction happened
    pub timestamp: DateTime<Utc>,

    /// Paying party
    pub payer_id: String,

    /// Receiving party
    pub payee_id: String,

    pub channel: Channel,

    pub payment_mode: PaymentMode,

    /// Gateway label, free text
    pub payment_gateway: String,

    /// Set by the scoring model or the fallback heuristic
    #[serde(default)]
    pub is_fraud_predicted: bool,

    /// Ground truth supplied by the data source
    #[serde(default)]
    pub is_fraud_reported: bool,

    /// Score attached by prediction enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_score: Option<f64>,
}

impl Transaction {
    /// Create a new transaction with default categorical fields
    pub fn new(transaction_id: impl Into<String>, amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount,
            timestamp,
            payer_id: "unknown".to_string(),
            payee_id: "unknown".to_string(),
            channel: Channel::Web,
            payment_mode: PaymentMode::Card,
            payment_gateway: "Unknown".to_string(),
            is_fraud_predicted: false,
            is_fraud_reported: false,
            fraud_score: None,
        }
    }

    pub fn with_parties(mut self, payer_id: impl Into<String>, payee_id: impl Into<String>) -> Self {
        self.payer_id = payer_id.into();
        self.payee_id = payee_id.into();
        self
    }

    pub fn with_route(
        mut self,
        channel: Channel,
        payment_mode: PaymentMode,
        payment_gateway: impl Into<String>,
    ) -> Self {
        self.channel = channel;
        self.payment_mode = payment_mode;
        self.payment_gateway = payment_gateway.into();
        self
    }

    pub fn with_flags(mut self, predicted: bool, reported: bool) -> Self {
        self.is_fraud_predicted = predicted;
        self.is_fraud_reported = reported;
        self
    }

    /// Project the fields the scoring endpoint consumes
    pub fn scoring_record(&self) -> ScoringRecord {
        ScoringRecord {
            transaction_id: self.transaction_id.clone(),
            amount: self.amount,
            timestamp: self.timestamp,
            payer_id: self.payer_id.clone(),
            payee_id: self.payee_id.clone(),
            channel: self.channel,
            payment_mode: self.payment_mode,
            payment_gateway: self.payment_gateway.clone(),
        }
    }
}

/// Scoring-relevant subset of a transaction, as sent to the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRecord {
    pub transaction_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub payer_id: String,
    pub payee_id: String,
    pub channel: Channel,
    pub payment_mode: PaymentMode,
    pub payment_gateway: String,
}
