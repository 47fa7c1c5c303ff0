use crate::config::types::{
    Config, CrawlerConfig, FeedConfig, ImagesConfig, StorageConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

const MAX_POOL_SIZE: u32 = 64;
const MAX_CRAWL_DELAY_MS: u64 = 60_000;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_feed_config(&config.feed)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_images_config(&config.images)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > MAX_POOL_SIZE {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and {}, got {}",
            MAX_POOL_SIZE, config.pool_size
        )));
    }

    if config.crawl_delay_ms > MAX_CRAWL_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "crawl_delay_ms must be <= {}ms, got {}ms",
            MAX_CRAWL_DELAY_MS, config.crawl_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_SECS, config.request_timeout_secs
        )));
    }

    Ok(())
}

fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    if config.scheme != "http" && config.scheme != "https" {
        return Err(ConfigError::Validation(format!(
            "feed scheme must be 'http' or 'https', got '{}'",
            config.scheme
        )));
    }

    for (key, value) in [
        ("catalog_path", &config.catalog_path),
        ("detail_path", &config.detail_path),
    ] {
        if !value.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{} must start with '/', got '{}'",
                key, value
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if let Some(operator) = &config.operator {
        if operator.trim().is_empty() {
            return Err(ConfigError::Validation(
                "operator, when set, cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_images_config(config: &ImagesConfig) -> Result<(), ConfigError> {
    if config.base_path.is_empty() {
        return Err(ConfigError::Validation(
            "base_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
