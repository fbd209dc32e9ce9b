//! Fraud prediction: remote scoring, local fallback and enrichment

pub mod client;
pub mod enricher;
pub mod fallback;

pub use client::{EndpointConfig, PredictionClient};
pub use enricher::{Enricher, Enrichment, EnrichmentWarning, PredictionSource};
pub use fallback::FallbackPredictor;
