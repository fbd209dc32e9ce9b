//! Fraud Monitor - Main Entry Point
//!
//! Loads transactions (an import file or mock data), enriches them with
//! predictions from the configured endpoint and logs the dashboard view.
//!
//! Usage: fraud-monitor [transactions.json|transactions.csv] [endpoint-url]

use anyhow::{Context, Result};
use fraud_monitor::{
    config::AppConfig,
    filter::TransactionFilters,
    import,
    metrics::summary::{log_charts, DashboardSummary},
    mock::MockGenerator,
    prediction::{EndpointConfig, Enricher, EnrichmentWarning, FallbackPredictor, PredictionClient},
    rules::RuleBook,
    settings::EndpointSettings,
    Transaction,
};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config)?;

    info!("Starting Fraud Monitor");

    let args: Vec<String> = std::env::args().collect();
    let import_path = args.get(1).filter(|s| !s.is_empty());
    let endpoint_override = args.get(2);

    let settings =
        EndpointSettings::open_with_default(&config.settings.path, &config.prediction.base_url)
            .with_context(|| format!("Failed to open endpoint settings {}", config.settings.path))?;
    if let Some(url) = endpoint_override {
        settings.set(url)?;
    }
    let endpoint = settings.endpoint(&EndpointConfig::from_config(&config.prediction));
    info!(
        "Prediction endpoint: {} (timeout {:?})",
        endpoint.base_url, endpoint.timeout
    );

    let transactions = load_transactions(import_path.map(String::as_str), &config)?;
    info!("Loaded {} transactions", transactions.len());

    let rules = RuleBook::default();
    info!(
        "{} of {} detection rules enabled",
        rules.enabled().count(),
        rules.len()
    );

    let enricher = Enricher::new(
        PredictionClient::new(),
        FallbackPredictor::new(config.prediction.fallback_fraud_count),
    );

    let start = Instant::now();
    let enrichment = enricher.enrich(&transactions, &endpoint).await;
    info!(
        source = ?enrichment.source,
        model_version = %enrichment.model_version,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Enrichment complete"
    );

    if let Some(EnrichmentWarning::CountMismatch { expected, actual }) = enrichment.warning {
        warn!(
            "Model flagged {} fraud cases, expected {}; metrics may be unreliable",
            actual, expected
        );
    }
    if let Some(err) = &enrichment.remote_error {
        warn!("Showing fallback predictions: {}", err);
    }

    let visible = TransactionFilters::default().apply(&enrichment.transactions);
    DashboardSummary::from_transactions(&visible).log_summary(&enrichment.model_version);
    log_charts(&visible);

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("fraud_monitor={}", config.logging.level)))?;

    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

fn load_transactions(path: Option<&str>, config: &AppConfig) -> Result<Vec<Transaction>> {
    match path {
        Some(path) => import::import_file(path)
            .with_context(|| format!("Failed to import transactions from {}", path)),
        None => {
            let mut generator = match config.dashboard.seed {
                Some(seed) => MockGenerator::with_seed(seed),
                None => MockGenerator::new(),
            };
            info!(
                "No import file given, generating {} mock transactions",
                config.dashboard.mock_transactions
            );
            Ok(generator.generate(config.dashboard.mock_transactions))
        }
    }
}
