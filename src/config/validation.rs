use crate::classify::Taxonomy;
use crate::config::types::{
    ClassifierConfig, Config, FetcherConfig, MetadataConfig, StorageConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_classifier_config(&config.classifier)?;
    validate_storage_config(&config.storage)?;
    validate_metadata_config(&config.metadata)?;
    if let Some(taxonomy) = &config.taxonomy {
        // Building the taxonomy checks rule categories and compiles every pattern
        Taxonomy::from_config(taxonomy)?;
    }
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetcher timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_redirects > 10 {
        return Err(ConfigError::Validation(format!(
            "fetcher max-redirects must be <= 10, got {}",
            config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetcher user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates classifier backend configuration
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.api_base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "api-base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "classifier model cannot be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "classifier temperature must be between 0 and 2, got {}",
            config.temperature
        )));
    }

    if config.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "classifier max-tokens must be >= 1".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "classifier timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates metadata configuration
fn validate_metadata_config(config: &MetadataConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.default_thumbnail)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid default-thumbnail: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "default-thumbnail must be an http(s) URL, got '{}'",
            config.default_thumbnail
        )));
    }

    Ok(())
}
