//! Configuration validation
//!
//! Validates configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use smsmock_core::Config;

/// Validate configuration, warning about settings that work but are probably unintended
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows all origins in production");
    }

    if config.font_path.is_some() && !config.renderer.produces_surface() {
        tracing::warn!(
            renderer = config.renderer.as_str(),
            "MOCKUP_FONT_PATH only affects image rendering; GET requests will serve HTML"
        );
    }

    if config.allow_private_urls {
        tracing::warn!("ALLOW_PRIVATE_URLS is set; /api/upload may fetch internal addresses");
    }

    tracing::debug!(
        request_timeout_secs = config.request_timeout().as_secs(),
        outbound_budget_secs = config.outbound_budget().as_secs(),
        "Request timeout covers the CDN retry budget"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn timeout_shorter_than_retry_budget_is_rejected() {
        let config = Config {
            request_timeout_secs: Some(60),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            request_timeout_secs: Some(200),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            max_attempts: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
