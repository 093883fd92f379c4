use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_user_agent(&config.user_agent)?;

    if config.robots_timeout == 0 {
        return Err(ConfigError::Validation(
            "robots-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.page_timeout == 0 {
        return Err(ConfigError::Validation(
            "page-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.max_page_size == 0 {
        return Err(ConfigError::Validation(
            "max-page-size must be greater than 0".to_string(),
        ));
    }

    if config.content_buffer_size == 0 || config.content_buffer_size > config.max_page_size {
        return Err(ConfigError::Validation(format!(
            "content-buffer-size must be between 1 and max-page-size ({}), got {}",
            config.max_page_size, config.content_buffer_size
        )));
    }

    if config.robots_cache_size == 0 {
        return Err(ConfigError::Validation(
            "robots-cache-size must be >= 1".to_string(),
        ));
    }

    if config.check_content_type && config.accepted_content_types.is_empty() {
        return Err(ConfigError::Validation(
            "accepted-content-types cannot be empty when check-content-type is enabled"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates the user agent: non-empty, printable ASCII, with a product token
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if !user_agent.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(ConfigError::Validation(format!(
            "user-agent must be printable ASCII, got '{}'",
            user_agent
        )));
    }

    if user_agent.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "user-agent must start with a product token, got '{}'",
            user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
