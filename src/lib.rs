pub mod api;
pub mod catalog;
pub mod config;
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::catalog::DrugCatalog;
use crate::config::{AppConfig, ConfigError};
use crate::pipeline::interactions::{InteractionClassifier, OllamaClient};
use crate::pipeline::labels::OpenFdaClient;
use crate::pipeline::InteractionPipeline;

/// Start the service and block until it is interrupted.
pub fn run() -> Result<(), ConfigError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let catalog = Arc::new(DrugCatalog::load(&config.catalog_path)?);
    let pipeline = Arc::new(build_pipeline(&config)?);

    tracing::info!(
        bind = %config.bind_addr,
        model = %config.ollama_model,
        policy = ?config.unknown_drug_policy,
        "Configuration loaded"
    );

    // The HTTP clients are blocking and must be created and dropped outside
    // the async runtime; `pipeline` is held here until the runtime is gone.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ConfigError::Runtime)?;

    let app = api::router::api_router(pipeline.clone(), catalog);
    let served = runtime.block_on(api::server::serve_until_interrupted(config.bind_addr, app));
    drop(runtime);
    drop(pipeline);

    served.map_err(ConfigError::Server)?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

fn build_pipeline(config: &AppConfig) -> Result<InteractionPipeline, ConfigError> {
    let labels = OpenFdaClient::new(
        &config.openfda_base_url,
        config.openfda_api_key.clone(),
        config.label_timeout_secs,
    )?;
    let engine = OllamaClient::new(
        &config.ollama_base_url,
        config.reasoning_timeout_secs,
        config.reasoning_temperature,
    )?;

    Ok(InteractionPipeline::new(
        Arc::new(labels),
        InteractionClassifier::new(Arc::new(engine), &config.ollama_model),
        config.unknown_drug_policy,
    ))
}
