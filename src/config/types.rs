use crate::template::Templates;
use crate::ConfigResult;
use serde::Deserialize;

/// Main configuration structure for shaarli-client
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub shaarli: ShaarliConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    /// Overrides of the default templates, applied in order
    #[serde(rename = "template", default)]
    pub templates: Vec<TemplateEntry>,
}

impl Config {
    /// Builds the template registry: defaults, then each override in order
    pub fn templates(&self) -> ConfigResult<Templates> {
        let mut templates = Templates::new();
        for entry in &self.templates {
            templates.add(&entry.key, &entry.selector, &entry.attribute, &entry.regex)?;
        }
        Ok(templates)
    }

    /// Login and password, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.shaarli.login, &self.shaarli.password) {
            (Some(login), Some(password)) => Some((login.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Shaarli instance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ShaarliConfig {
    /// Base URL of the instance
    pub endpoint: String,

    #[serde(default)]
    pub login: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    #[serde(default = "default_agent_version")]
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
        }
    }
}

fn default_agent_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// One template override
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry {
    pub key: String,

    /// CSS selector, or a strftime format for the date-format keys
    #[serde(default)]
    pub selector: String,

    #[serde(default)]
    pub attribute: String,

    #[serde(default)]
    pub regex: String,
}
