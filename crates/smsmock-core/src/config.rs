//! Configuration module
//!
//! Settings are read once at start-up from the process environment (and a `.env`
//! file when present). Every value has a default, so an empty environment yields
//! a working development configuration.

use std::env;
use std::time::Duration;

use crate::models::{CdnProvider, RendererKind};

const SERVER_PORT: u16 = 3000;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;
const CDN_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 10;
/// Added on top of the outbound budget when no request timeout is configured
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 10;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Rendering
    pub renderer: RendererKind,
    pub font_path: Option<String>,
    // Retry of the render -> encode -> upload chain
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    // CDN relay
    pub cdn_provider: CdnProvider,
    pub cdn_timeout_secs: u64,
    pub uguu_upload_url: String,
    pub catbox_upload_url: String,
    pub cdn_user_agent: String,
    /// Let `/api/upload` fetch loopback and private-network URLs
    pub allow_private_urls: bool,
    // HTTP limits
    pub max_upload_size_bytes: usize,
    /// Explicit `REQUEST_TIMEOUT_SECS`; derived from the outbound budget when `None`
    pub request_timeout_secs: Option<u64>,
    pub http_concurrency_limit: usize,
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let renderer = match lookup("MOCKUP_RENDERER") {
            Some(raw) => RendererKind::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!(
                    "MOCKUP_RENDERER must be one of html, raster, dom-capture (got '{}')",
                    raw
                )
            })?,
            None => RendererKind::DomCapture,
        };

        let cdn_provider = match lookup("CDN_PROVIDER") {
            Some(raw) => CdnProvider::parse(&raw).ok_or_else(|| {
                anyhow::anyhow!("CDN_PROVIDER must be uguu or catbox (got '{}')", raw)
            })?,
            None => CdnProvider::default(),
        };

        let max_upload_size_mb: usize = parse_or(lookup("MAX_UPLOAD_SIZE_MB"), MAX_UPLOAD_SIZE_MB);

        Ok(Config {
            server_port,
            environment,
            cors_origins,
            renderer,
            font_path: lookup("MOCKUP_FONT_PATH").filter(|p| !p.trim().is_empty()),
            max_attempts: parse_or(lookup("MOCKUP_MAX_ATTEMPTS"), MAX_ATTEMPTS),
            retry_delay_ms: parse_or(lookup("MOCKUP_RETRY_DELAY_MS"), RETRY_DELAY_MS),
            cdn_provider,
            cdn_timeout_secs: parse_or(lookup("CDN_TIMEOUT_SECS"), CDN_TIMEOUT_SECS),
            uguu_upload_url: lookup("UGUU_UPLOAD_URL")
                .unwrap_or_else(|| CdnProvider::Uguu.default_endpoint().to_string()),
            catbox_upload_url: lookup("CATBOX_UPLOAD_URL")
                .unwrap_or_else(|| CdnProvider::Catbox.default_endpoint().to_string()),
            cdn_user_agent: lookup("CDN_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            allow_private_urls: parse_or(lookup("ALLOW_PRIVATE_URLS"), false),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok()),
            http_concurrency_limit: parse_or(
                lookup("HTTP_CONCURRENCY_LIMIT"),
                HTTP_CONCURRENCY_LIMIT,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("MOCKUP_MAX_ATTEMPTS must be at least 1"));
        }

        if self.cdn_timeout_secs == 0 {
            return Err(anyhow::anyhow!("CDN_TIMEOUT_SECS must be greater than 0"));
        }

        if self.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        if let Some(secs) = self.request_timeout_secs {
            let budget = self.outbound_budget();
            if Duration::from_secs(secs) <= budget {
                return Err(anyhow::anyhow!(
                    "REQUEST_TIMEOUT_SECS ({}) must exceed the {} s a request may spend on \
                     the CDN ({} attempts of CDN_TIMEOUT_SECS={} plus a remote fetch and \
                     retry delays)",
                    secs,
                    budget.as_secs_f64(),
                    self.max_attempts,
                    self.cdn_timeout_secs
                ));
            }
        }

        for (name, url) in [
            ("UGUU_UPLOAD_URL", &self.uguu_upload_url),
            ("CATBOX_UPLOAD_URL", &self.catbox_upload_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn upload_endpoint(&self, provider: CdnProvider) -> &str {
        match provider {
            CdnProvider::Uguu => &self.uguu_upload_url,
            CdnProvider::Catbox => &self.catbox_upload_url,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cdn_timeout(&self) -> Duration {
        Duration::from_secs(self.cdn_timeout_secs)
    }

    /// Worst case a request spends waiting on the network: one remote fetch, every
    /// upload attempt timing out, and the delays between attempts.
    pub fn outbound_budget(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        self.cdn_timeout() * (attempts + 1) + self.retry_delay() * (attempts - 1)
    }

    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self.outbound_budget() + Duration::from_secs(REQUEST_TIMEOUT_MARGIN_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            renderer: RendererKind::DomCapture,
            font_path: None,
            max_attempts: MAX_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            cdn_provider: CdnProvider::Uguu,
            cdn_timeout_secs: CDN_TIMEOUT_SECS,
            uguu_upload_url: CdnProvider::Uguu.default_endpoint().to_string(),
            catbox_upload_url: CdnProvider::Catbox.default_endpoint().to_string(),
            cdn_user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_urls: false,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            request_timeout_secs: None,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.renderer, RendererKind::DomCapture);
        assert_eq!(config.cdn_provider, CdnProvider::Uguu);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.upload_endpoint(CdnProvider::Uguu), "https://uguu.se/upload.php");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("MOCKUP_RENDERER", "raster"),
            ("CDN_PROVIDER", "Catbox"),
            ("MOCKUP_MAX_ATTEMPTS", "5"),
            ("CATBOX_UPLOAD_URL", "http://127.0.0.1:9999/api.php"),
            ("ENVIRONMENT", "prod"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.renderer, RendererKind::Raster);
        assert_eq!(config.cdn_provider, CdnProvider::Catbox);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(
            config.upload_endpoint(CdnProvider::Catbox),
            "http://127.0.0.1:9999/api.php"
        );
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values() {
        assert!(from_pairs(&[("PORT", "eighty")]).is_err());
        assert!(from_pairs(&[("MOCKUP_RENDERER", "puppeteer")]).is_err());
        assert!(from_pairs(&[("CDN_PROVIDER", "imgur")]).is_err());

        // Unparseable numbers fall back to their defaults
        let config = from_pairs(&[("MOCKUP_RETRY_DELAY_MS", "soon")]).unwrap();
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = from_pairs(&[("MOCKUP_MAX_ATTEMPTS", "0")]).unwrap();
        assert!(config.validate().is_err());

        let config = from_pairs(&[("UGUU_UPLOAD_URL", "ftp://uguu.se")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_covers_every_attempt() {
        let config = from_pairs(&[]).unwrap();
        // 3 uploads + 1 fetch at 30 s, 2 delays of 1 s
        assert_eq!(config.outbound_budget(), Duration::from_secs(122));
        assert_eq!(config.request_timeout(), Duration::from_secs(132));
        assert!(!config.allow_private_urls);

        // The old fixed 60 s would cut the retry chain short
        let config = from_pairs(&[("REQUEST_TIMEOUT_SECS", "60")]).unwrap();
        assert!(config.validate().is_err());

        let config = from_pairs(&[
            ("REQUEST_TIMEOUT_SECS", "20"),
            ("CDN_TIMEOUT_SECS", "4"),
            ("MOCKUP_RETRY_DELAY_MS", "500"),
        ])
        .unwrap();
        assert_eq!(config.outbound_budget(), Duration::from_secs(17));
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert!(config.validate().is_ok());
    }
}
