//! Transaction import from JSON or CSV.
//!
//! Source files use heterogeneous field names (`id`, `txn_id`, `sender_id`,
//! `method`, ...). Records are parsed into loose key/value maps first and then
//! normalized into [`Transaction`]s with per-field fallbacks.

use crate::error::ImportError;
use crate::types::transaction::{Channel, PaymentMode, Transaction};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// A record before normalization
pub type RawRecord = Map<String, Value>;

const ID_FIELDS: &[&str] = &["transaction_id", "id", "txn_id"];
const AMOUNT_FIELDS: &[&str] = &["amount", "transaction_amount"];
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "date", "transaction_date"];
const PAYER_FIELDS: &[&str] = &["payer_id", "sender_id", "from"];
const PAYEE_FIELDS: &[&str] = &["payee_id", "receiver_id", "to"];
const CHANNEL_FIELDS: &[&str] = &["channel", "transaction_channel"];
const MODE_FIELDS: &[&str] = &["payment_mode", "payment_method", "method"];
const GATEWAY_FIELDS: &[&str] = &["payment_gateway", "gateway", "processor"];
const PREDICTED_FIELDS: &[&str] = &["is_fraud", "is_fraud_predicted", "fraud_predicted", "isFraud"];
const REPORTED_FIELDS: &[&str] = &["is_fraud_reported", "fraud_reported", "reported_fraud"];

/// Supported import file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Pick the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(ImportFormat::Json),
            Some("csv") => Ok(ImportFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read, parse and normalize an import file
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, ImportError> {
    let path = path.as_ref();
    let format = ImportFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;

    let transactions = import_text(&text, format)?;
    info!(
        path = %path.display(),
        transactions = transactions.len(),
        "Imported transactions"
    );
    Ok(transactions)
}

/// Parse and normalize import text
pub fn import_text(text: &str, format: ImportFormat) -> Result<Vec<Transaction>, ImportError> {
    let records = match format {
        ImportFormat::Json => parse_json(text)?,
        ImportFormat::Csv => parse_csv(text)?,
    };

    if records.is_empty() {
        return Err(ImportError::Empty);
    }

    Ok(normalize(&records))
}

/// Parse a JSON array of objects; a single object counts as a one-element array
pub fn parse_json(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => {
            let total = items.len();
            let records: Vec<RawRecord> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();

            if records.len() < total {
                warn!(
                    skipped = total - records.len(),
                    "Skipped non-object entries in JSON import"
                );
            }
            Ok(records)
        }
        Value::Object(map) => Ok(vec![map]),
        other => Err(ImportError::NotAnArray(json_type_name(&other))),
    }
}

/// Parse comma-separated text with a header row; every cell becomes a string value
pub fn parse_csv(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Csv {
            line: 1,
            reason: e.to_string(),
        })?
        .clone();

    let mut records = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let row = result.map_err(|e| ImportError::Csv {
            line: line_num + 2,
            reason: e.to_string(),
        })?;

        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
            .collect();
        records.push(record);
    }

    debug!(rows = records.len(), columns = headers.len(), "Parsed CSV import");
    Ok(records)
}

/// Map loose records onto transactions
pub fn normalize(records: &[RawRecord]) -> Vec<Transaction> {
    records.iter().map(normalize_record).collect()
}

fn normalize_record(record: &RawRecord) -> Transaction {
    let transaction_id = first_text(record, ID_FIELDS).unwrap_or_else(generated_id);
    let amount = first(record, AMOUNT_FIELDS).map(parse_amount).unwrap_or(0.0);
    let timestamp = first(record, TIMESTAMP_FIELDS)
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);

    Transaction {
        transaction_id,
        amount,
        timestamp,
        payer_id: first_text(record, PAYER_FIELDS).unwrap_or_else(|| "unknown".to_string()),
        payee_id: first_text(record, PAYEE_FIELDS).unwrap_or_else(|| "unknown".to_string()),
        channel: Channel::from_loose(first_text(record, CHANNEL_FIELDS).as_deref()),
        payment_mode: PaymentMode::from_loose(first_text(record, MODE_FIELDS).as_deref()),
        payment_gateway: first_text(record, GATEWAY_FIELDS)
            .unwrap_or_else(|| "Unknown".to_string()),
        is_fraud_predicted: first(record, PREDICTED_FIELDS).is_some_and(is_truthy),
        is_fraud_reported: first(record, REPORTED_FIELDS).is_some_and(is_truthy),
        fraud_score: None,
    }
}

fn generated_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("TXN-{}", &uuid[..9])
}

/// First present, non-empty value among `keys`
fn first<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_present(value))
}

fn first_text(record: &RawRecord, keys: &[&str]) -> Option<String> {
    first(record, keys).and_then(|value| match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Absent-like values: null, false, zero and empty strings
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            let lower = s.trim().to_ascii_lowercase();
            !lower.is_empty() && lower != "false" && lower != "0"
        }
        other => is_present(other),
    }
}

fn parse_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .unwrap_or(0.0),
        _ => 0.0,
    };

    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_with_alternate_field_names() {
        let text = r#"[
            {"id": "A-1", "transaction_amount": "1,250.50", "date": "2024-02-10",
             "sender_id": "S1", "receiver_id": "R1", "transaction_channel": "iPhone app",
             "method": "PayPal", "processor": "Braintree", "isFraud": 1, "reported_fraud": "true"},
            {"txn_id": "A-2", "amount": 99, "timestamp": "2024-02-11T08:30:00Z",
             "from": "S2", "to": "R2", "channel": "POS", "payment_method": "wire",
             "gateway": "Chase", "is_fraud": false}
        ]"#;

        let txs = import_text(text, ImportFormat::Json).unwrap();
        assert_eq!(txs.len(), 2);

        let a = &txs[0];
        assert_eq!(a.transaction_id, "A-1");
        assert_eq!(a.amount, 1250.5);
        assert_eq!(a.timestamp, Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap());
        assert_eq!(a.payer_id, "S1");
        assert_eq!(a.payee_id, "R1");
        assert_eq!(a.channel, Channel::Mobile);
        assert_eq!(a.payment_mode, PaymentMode::Wallet);
        assert_eq!(a.payment_gateway, "Braintree");
        assert!(a.is_fraud_predicted);
        assert!(a.is_fraud_reported);

        let b = &txs[1];
        assert_eq!(b.transaction_id, "A-2");
        assert_eq!(b.amount, 99.0);
        assert_eq!(b.channel, Channel::InPerson);
        assert_eq!(b.payment_mode, PaymentMode::BankTransfer);
        assert!(!b.is_fraud_predicted);
        assert!(!b.is_fraud_reported);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let txs = import_text(r#"[{}]"#, ImportFormat::Json).unwrap();
        let tx = &txs[0];

        assert!(tx.transaction_id.starts_with("TXN-"));
        assert_eq!(tx.transaction_id.len(), 13);
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.payer_id, "unknown");
        assert_eq!(tx.payment_gateway, "Unknown");
        assert_eq!(tx.channel, Channel::Web);
        assert_eq!(tx.payment_mode, PaymentMode::Card);
    }

    #[test]
    fn test_single_object_and_rejections() {
        let single = import_text(r#"{"id": "X"}"#, ImportFormat::Json).unwrap();
        assert_eq!(single[0].transaction_id, "X");

        assert!(matches!(
            import_text("42", ImportFormat::Json),
            Err(ImportError::NotAnArray("a number"))
        ));
        assert!(matches!(
            import_text("[1, 2", ImportFormat::Json),
            Err(ImportError::Json(_))
        ));
        assert!(matches!(
            import_text("[]", ImportFormat::Json),
            Err(ImportError::Empty)
        ));
    }

    #[test]
    fn test_csv_import() {
        let text = "transaction_id, amount, timestamp, channel, payment_mode, gateway, is_fraud_predicted, is_fraud_reported\n\
                    T1, 500, 2024-01-05T10:00:00Z, Web, Card, Stripe, true, false\n\
                    T2, -20, 2024-01-06, Mobile, UPI, Square, false, 1\n\
                    T3, 75\n";

        let txs = import_text(text, ImportFormat::Csv).unwrap();
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].amount, 500.0);
        assert_eq!(txs[0].payment_gateway, "Stripe");
        assert!(txs[0].is_fraud_predicted);
        assert!(!txs[0].is_fraud_reported);

        assert_eq!(txs[1].amount, 0.0);
        assert_eq!(txs[1].payment_mode, PaymentMode::Upi);
        assert!(!txs[1].is_fraud_predicted);
        assert!(txs[1].is_fraud_reported);

        // short row: missing trailing cells fall back to defaults
        assert_eq!(txs[2].transaction_id, "T3");
        assert_eq!(txs[2].payment_gateway, "Unknown");
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        assert!(matches!(
            import_text("id,amount\n", ImportFormat::Csv),
            Err(ImportError::Empty)
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImportFormat::from_path("data/tx.JSON").unwrap(), ImportFormat::Json);
        assert_eq!(ImportFormat::from_path("tx.csv").unwrap(), ImportFormat::Csv);
        assert!(matches!(
            ImportFormat::from_path("tx.xlsx"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_import_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, "id,amount\nF-1,10\nF-2,20\n").unwrap();

        let txs = import_file(&path).unwrap();
        let ids: Vec<&str> = txs.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["F-1", "F-2"]);
    }
}
