use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Engine tunables loaded from environment variables. Every variable is
/// optional — a library must not fail on a bare environment — and the
/// defaults match the documented pipeline behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default top-K for recommendation requests.
    pub recommendation_limit: usize,
    /// Default result count for semantic search.
    pub search_limit: usize,
    pub rust_log: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recommendation_limit: 5,
            search_limit: 10,
            rust_log: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Self::default();
        Ok(Self {
            recommendation_limit: parse_env("RECOMMENDATION_LIMIT", defaults.recommendation_limit)?,
            search_limit: parse_env("SEARCH_LIMIT", defaults.search_limit)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn parse_env(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("{key} must be a non-negative integer")),
        Err(_) => Ok(default),
    }
}

/// Initializes structured logging with the configured filter. Call once
/// from the host binary; `RUST_LOG` in the environment wins.
pub fn init_tracing(config: &EngineConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.recommendation_limit, 5);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_parse_env_override_and_fallback() {
        std::env::set_var("ENGINE_TEST_LIMIT_OK", "12");
        assert_eq!(parse_env("ENGINE_TEST_LIMIT_OK", 5).unwrap(), 12);
        assert_eq!(parse_env("ENGINE_TEST_LIMIT_UNSET", 5).unwrap(), 5);

        std::env::set_var("ENGINE_TEST_LIMIT_BAD", "many");
        assert!(parse_env("ENGINE_TEST_LIMIT_BAD", 5).is_err());
    }
}
