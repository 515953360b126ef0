use crate::config::types::{Config, ShaarliConfig, TemplateEntry, UserAgentConfig};
use crate::template::{validate_template, Template};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_shaarli_config(&config.shaarli)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_templates(&config.templates)?;
    Ok(())
}

/// Validates the instance configuration
fn validate_shaarli_config(config: &ShaarliConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    match (&config.login, &config.password) {
        (Some(login), Some(_)) if login.is_empty() => Err(ConfigError::Validation(
            "login cannot be empty".to_string(),
        )),
        (Some(_), None) => Err(ConfigError::Validation(
            "login is set but password is missing".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::Validation(
            "password is set but login is missing".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates template overrides
fn validate_templates(entries: &[TemplateEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        let template = Template::new(
            entry.selector.as_str(),
            entry.attribute.as_str(),
            entry.regex.as_str(),
        );
        validate_template(&entry.key, &template)?;
    }
    Ok(())
}
