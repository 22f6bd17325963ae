use crate::config::types::{Config, CrawlerConfig, ScopeConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_scope_config(&config.scope)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.politeness_delay_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "politeness-delay-ms must be >= 10ms, got {}ms",
            config.politeness_delay_ms
        )));
    }

    if config.trap_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "trap-threshold must be >= 1, got {}",
            config.trap_threshold
        )));
    }

    if config.backoff_floor_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff-floor-ms must be >= 1ms, got {}ms",
            config.backoff_floor_ms
        )));
    }

    if config.backoff_cap_ms < config.backoff_floor_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-cap-ms ({}ms) must be >= backoff-floor-ms ({}ms)",
            config.backoff_cap_ms, config.backoff_floor_ms
        )));
    }

    Ok(())
}

/// Validates scope configuration
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains cannot be empty; the crawl would have no scope".to_string(),
        ));
    }

    for pattern in &config.allowed_domains {
        let base = pattern.strip_prefix("*.").unwrap_or(pattern);
        if base.is_empty() || base.contains('/') || base.contains(' ') {
            return Err(ConfigError::Validation(format!(
                "invalid domain pattern '{}'",
                pattern
            )));
        }
    }

    for ext in &config.excluded_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must start with '.' and name a suffix",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.frontier_path.is_empty() {
        return Err(ConfigError::Validation(
            "frontier-path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed URLs parse as http(s) URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed '{}' must use http or https",
                seed
            )));
        }
    }
    Ok(())
}

/// Basic email shape check: one '@' with a dot somewhere after it
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact-email '{}' is not a valid email address",
            email
        )));
    }

    Ok(())
}
