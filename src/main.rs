use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paynow::application::engine::DecisionEngine;
use paynow::config::PolicyConfig;
use paynow::domain::ports::{DecisionMaker, DecisionMakerBox};
use paynow::infrastructure::ledger::AccountLedger;
use paynow::infrastructure::rate_limiter::RateLimiter;
use paynow::infrastructure::risk::SimulatedRiskProvider;
use paynow::interfaces::csv::request_reader::RequestReader;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment requests CSV file
    input: PathBuf,

    /// Path to a policy configuration JSON file (optional)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            serde_json::from_reader::<_, PolicyConfig>(file).into_diagnostic()?
        }
        None => PolicyConfig::default(),
    };

    let ledger = Arc::new(AccountLedger::new(&config));
    let rate_limiter = RateLimiter::new(config.rate_limit_per_window, config.rate_limit_window());
    let engine: DecisionMakerBox = Box::new(DecisionEngine::new(
        Arc::clone(&ledger),
        Box::new(SimulatedRiskProvider::new(config.high_risk_customer.clone())),
        &config,
    ));
    let sweeper = ledger.spawn_sweeper(config.sweep_interval());

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request_result in reader.requests() {
        let request = match request_result {
            Ok(request) => request,
            Err(e) => {
                eprintln!("Error reading request: {}", e);
                continue;
            }
        };

        if !rate_limiter.allow(&request.customer_id).await {
            eprintln!("Rate limit exceeded for request {}", request.idempotency_key);
            continue;
        }

        // Idempotent replay: a cache hit returns the original response
        // without re-running the rules or touching the balance again.
        if let Some(cached) = ledger.get_idempotency(&request.idempotency_key).await {
            let line = serde_json::to_string(&cached).into_diagnostic()?;
            println!("{line}");
            continue;
        }

        if let Err(e) = request.validate(&config) {
            eprintln!("Error processing request: {}", e);
            continue;
        }

        match engine.evaluate(&request).await {
            Ok(result) => {
                ledger
                    .save_idempotency(&request.idempotency_key, &result, config.idempotency_ttl())
                    .await;
                let line = serde_json::to_string(&result).into_diagnostic()?;
                println!("{line}");
            }
            Err(e) => {
                eprintln!("Error processing request: {}", e);
            }
        }
    }

    sweeper.shutdown().await;
    Ok(())
}
