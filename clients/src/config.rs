//! Typed configuration for the pipeline, read once from the process environment.

use thiserror::Error;

/// Configuration error: a required variable is missing, empty, or malformed.
/// Fatal at startup — the process must refuse to serve.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required and must be a non-empty, absolute URL")]
    MissingUrl(&'static str),
    #[error("{0} must be an integer >= 1, got {1:?}")]
    InvalidPositiveInt(&'static str, String),
    #[error("{0} must be a number in [0, 1], got {1:?}")]
    InvalidScore(&'static str, String),
}

fn require_absolute_url(var: &'static str) -> Result<String, ConfigError> {
    let value = std::env::var(var).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(ConfigError::MissingUrl(var));
    }
    let parsed = url::Url::parse(&value).map_err(|_| ConfigError::MissingUrl(var))?;
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::MissingUrl(var));
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn optional_url(var: &'static str) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
}

fn positive_int(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| ConfigError::InvalidPositiveInt(var, v.clone())),
        _ => Ok(default),
    }
}

fn unit_score(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => {
            let parsed: f64 = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidScore(var, v.clone()))?;
            if (0.0..=1.0).contains(&parsed) {
                Ok(parsed)
            } else {
                Err(ConfigError::InvalidScore(var, v.clone()))
            }
        }
        _ => Ok(default),
    }
}

/// All configuration read from the environment. `GRAPHITI_URL` is the only
/// variable required to be present; everything else has a documented default or is optional
/// (absent clients degrade to "fire and report" failures rather than refusing to start).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub graphiti_url: String,
    pub graphiti_max_nodes: u32,
    pub graphiti_max_facts: u32,
    pub letta_base_url: Option<String>,
    pub letta_password: Option<String>,
    pub matrix_client_url: Option<String>,
    pub agent_registry_url: Option<String>,
    pub agent_registry_max_agents: u32,
    pub agent_registry_min_score: f64,
}

impl PipelineConfig {
    /// Reads and validates all configuration. Fails fast (before any socket is bound) on a
    /// missing/malformed `GRAPHITI_URL` or malformed numeric override.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(PipelineConfig {
            graphiti_url: require_absolute_url("GRAPHITI_URL")?,
            graphiti_max_nodes: positive_int("GRAPHITI_MAX_NODES", 10)?,
            graphiti_max_facts: positive_int("GRAPHITI_MAX_FACTS", 10)?,
            letta_base_url: optional_url("LETTA_BASE_URL"),
            letta_password: std::env::var("LETTA_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
            matrix_client_url: optional_url("MATRIX_CLIENT_URL"),
            agent_registry_url: optional_url("AGENT_REGISTRY_URL"),
            agent_registry_max_agents: positive_int("AGENT_REGISTRY_MAX_AGENTS", 5)?,
            agent_registry_min_score: unit_score("AGENT_REGISTRY_MIN_SCORE", 0.5)?,
        })
    }
}
