//! Configuration management for the Cupping Journal server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CUPPING__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::DisplaySettings;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// AI narrative service configuration
    pub narrative: NarrativeConfig,

    /// Language and theme used when rendering reports
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret shared with the identity provider that issues tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    /// Text generation endpoint; narratives are disabled when empty
    pub endpoint: String,

    /// API key sent as `x-api-key`
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl NarrativeConfig {
    pub fn is_enabled(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CUPPING_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CUPPING__ prefix)
            .add_source(
                Environment::with_prefix("CUPPING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("narrative.endpoint", "")?
            .set_default("narrative.api_key", "")?
            .set_default("narrative.timeout_secs", 60)?
            .set_default("display.language", "english")?
            .set_default("display.theme", "light")
    }
}
