//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use smsmock_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    smsmock_infra::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment,
        renderer = config.renderer.as_str(),
        cdn_provider = %config.cdn_provider,
        "Configuration loaded and validated successfully"
    );

    let state = Arc::new(AppState::from_config(config.clone())?);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
