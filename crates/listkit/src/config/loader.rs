use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Etsy accepts at most this many images per listing.
const MAX_LISTING_IMAGES: usize = 10;

/// `<platform config dir>/listkit/listkit.json`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("listkit").join("listkit.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.catalog.page_size == 0 || config.catalog.page_size > 100 {
        return Err(ConfigError::Validation {
            message: format!(
                "catalog.page_size must be between 1 and 100, got {}",
                config.catalog.page_size
            ),
        });
    }

    if !config.catalog.base_url.starts_with("http://")
        && !config.catalog.base_url.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            message: format!(
                "catalog.base_url must be an http(s) URL, got '{}'",
                config.catalog.base_url
            ),
        });
    }

    if config.images.max_images == 0 || config.images.max_images > MAX_LISTING_IMAGES {
        return Err(ConfigError::Validation {
            message: format!(
                "images.max_images must be between 1 and {}, got {}",
                MAX_LISTING_IMAGES, config.images.max_images
            ),
        });
    }

    let enrichment = &config.enrichment;
    if enrichment.input_timeout_secs == 0 || enrichment.settle_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "enrichment timeouts must be positive".to_string(),
        });
    }

    Ok(())
}
