//! Type definitions for the fraud monitor

pub mod prediction;
pub mod transaction;

pub use prediction::{PredictRequest, PredictionBatch, PredictionResult};
pub use transaction::{Channel, PaymentMode, ScoringRecord, Transaction};
