//! zipfetch server binary

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zipfetch::{Cli, TaskEngine, api, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("zipfetch: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.environment);

    let engine = match TaskEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize task engine");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = tokio::spawn({
        let engine = engine.clone();
        async move { engine.start().await }
    });

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            zipfetch::wait_for_signal().await;
            shutdown.cancel();
        }
    });

    let served = api::start_api_server(engine.clone(), Arc::clone(&config), shutdown).await;

    engine.shutdown().await;
    if let Err(e) = engine.close_store().await {
        tracing::warn!(error = %e, "failed to close task store");
    }
    match dispatcher.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "dispatcher stopped with an error"),
        Err(e) => tracing::warn!(error = %e, "dispatcher task panicked"),
    }

    match served {
        Ok(()) => {
            tracing::info!("zipfetch stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "API server failed");
            ExitCode::FAILURE
        }
    }
}
