use crate::config::types::{Config, FetchConfig, OutputConfig, SearchConfig, SiteConfig};
use crate::url::{SearchQuery, SiteProfile};
use crate::ConfigError;

/// Upper bound on simultaneous ad page fetches
const MAX_CONCURRENCY: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_search_config(&config.search, &config.site)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site profile
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.domain.is_empty() {
        return Err(ConfigError::Validation(
            "site domain cannot be empty".to_string(),
        ));
    }

    if !config
        .domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "site domain '{}' contains invalid characters",
            config.domain
        )));
    }

    if config.search_marker.is_empty() {
        return Err(ConfigError::Validation(
            "search_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the search section
fn validate_search_config(config: &SearchConfig, site: &SiteConfig) -> Result<(), ConfigError> {
    // max_depth above the server cap is clamped by the crawler, not rejected
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    let profile = SiteProfile::new(&site.domain, &site.search_marker);
    SearchQuery::parse(&config.base_url, &profile)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if let Some(model) = config.models.iter().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "model codes cannot be empty, got '{}'",
            model
        )));
    }

    for parameter in &config.parameters {
        if parameter.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "parameter name cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates HTTP settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.crawl_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "crawl_deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }

    if config.postcodes_path.is_empty() {
        return Err(ConfigError::Validation(
            "postcodes_path cannot be empty".to_string(),
        ));
    }

    if config.database_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "database_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
