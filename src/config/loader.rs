//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (PATHGUARD_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::AuthorizationEvaluator;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use crate::identity::InMemoryIdentityProvider;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "PATHGUARD";

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "pathguard.toml",
    ".pathguard.toml",
    "~/.config/pathguard/config.toml",
    "/etc/pathguard/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        debug!(path, "Using configuration file");
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                debug!(path = %expanded, "Using configuration file");
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with PATHGUARD_ prefix
    // e.g., PATHGUARD_LOGGING__LEVEL, PATHGUARD_AUTHORIZATION__DEFAULT
    // Double underscore (__) maps to nested keys (logging.level)
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
///
/// Compiles every rule and the identity store so that a bad pattern or a
/// duplicate user stops the process before it makes a single decision.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "logging.level".to_string(),
        });
    }

    for (index, rule) in config.authorization.rules.iter().enumerate() {
        if rule.pattern.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: format!("authorization.rules[{}].pattern", index),
            });
        }
    }

    AuthorizationEvaluator::from_config(&config.authorization)?;
    InMemoryIdentityProvider::from_config(&config.users)?;

    Ok(())
}
