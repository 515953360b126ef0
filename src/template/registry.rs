use crate::template::keys;
use crate::template::extract;
use crate::{ConfigError, ConfigResult};
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashMap;

/// A named extraction rule
///
/// Empty strings mean "not set": an empty selector targets the current node,
/// an empty attribute reads the text, an empty regex keeps the whole value.
/// For the date-format keys the selector holds a `chrono` strftime format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub selector: String,
    pub attribute: String,
    pub regex: String,
}

impl Template {
    pub fn new(
        selector: impl Into<String>,
        attribute: impl Into<String>,
        regex: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            attribute: attribute.into(),
            regex: regex.into(),
        }
    }

    /// Applies this rule to `node`, see [`extract`](crate::template::extract)
    pub fn extract(&self, node: ElementRef<'_>) -> Option<String> {
        extract(node, &self.selector, &self.attribute, &self.regex)
    }

    /// Parses the selector, `None` when the selector is empty
    pub(crate) fn css(&self) -> Option<Selector> {
        if self.selector.is_empty() {
            return None;
        }
        match Selector::parse(&self.selector) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!("Ignoring invalid selector '{}': {:?}", self.selector, e);
                None
            }
        }
    }
}

/// Built-in templates, matching Shaarli's default theme
const DEFAULTS: &[(&str, &str, &str, &str)] = &[
    (keys::ID_DATE_FORMAT, "%Y%m%d_%H%M%S", "", ""),
    (keys::PERMALINK_DATE_FORMAT, "%a %b %d %H:%M:%S %Y -", "", ""),
    (keys::CLOUDTAG, "#cloudtag *", "", ""),
    (keys::CLOUDTAG_NAME, "", "", ""),
    (keys::CLOUDTAG_COUNT, "", "", r"\d+"),
    (keys::LINKS_COUNT, "#pageheader div.nomobile", "", r"\d+"),
    (keys::TOKEN, "input[name=token]", "value", ""),
    (keys::LINKS, "ul li", "", ""),
    (keys::LINKS_PRIVATE, "li[class=private]", "class", ""),
    (keys::LINKS_ID, "input[name=lf_linkdate]", "value", ""),
    (keys::LINKS_DATE, "span.linkdate", "", ".* - "),
    (keys::LINKS_PERMALINK_ID, "a[name]", "id", ""),
    (keys::LINKS_TITLE, "span[class=linktitle]", "", ""),
    (keys::LINKS_DESCRIPTION, "div[class=linkdescription]", "", ""),
    (keys::LINKS_URL, "span[class=linkurl]", "", ""),
    (keys::TAGS, "div[class=linktaglist] a", "", ""),
    (keys::TAGS_TAG, "", "", ""),
    (keys::PAGE_MAX, "#paging_current", "", r"(\d+)$"),
];

/// Registry of extraction templates keyed by field name
///
/// Populated with defaults on construction; entries are overridden with
/// [`Templates::add`], usually from the `[[template]]` tables of the
/// configuration file.
#[derive(Debug, Clone)]
pub struct Templates {
    templates: HashMap<String, Template>,
}

impl Templates {
    /// Creates a registry holding the default templates
    pub fn new() -> Self {
        let templates = DEFAULTS
            .iter()
            .map(|(key, selector, attribute, regex)| {
                (key.to_string(), Template::new(*selector, *attribute, *regex))
            })
            .collect();

        Self { templates }
    }

    /// Adds a template, replacing any previous entry for `key`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The template was stored
    /// * `Err(ConfigError::InvalidTemplate)` - The selector, date format or regex is invalid
    pub fn add(
        &mut self,
        key: &str,
        selector: &str,
        attribute: &str,
        regex: &str,
    ) -> ConfigResult<()> {
        let template = Template::new(selector, attribute, regex);
        validate_template(key, &template)?;
        self.templates.insert(key.to_string(), template);
        Ok(())
    }

    /// Gets a template by key
    pub fn get(&self, key: &str) -> ConfigResult<&Template> {
        self.templates
            .get(key)
            .ok_or_else(|| ConfigError::UnknownTemplate(key.to_string()))
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that a template can be used for `key`
pub fn validate_template(key: &str, template: &Template) -> ConfigResult<()> {
    if key.is_empty() {
        return Err(ConfigError::Validation(
            "template key cannot be empty".to_string(),
        ));
    }

    if keys::is_date_format(key) {
        validate_date_format(key, &template.selector)?;
    } else if !template.selector.is_empty() {
        Selector::parse(&template.selector).map_err(|e| ConfigError::InvalidTemplate {
            key: key.to_string(),
            message: format!("invalid selector '{}': {:?}", template.selector, e),
        })?;
    }

    if !template.regex.is_empty() {
        Regex::new(&template.regex).map_err(|e| ConfigError::InvalidTemplate {
            key: key.to_string(),
            message: format!("invalid regex '{}': {}", template.regex, e),
        })?;
    }

    Ok(())
}

fn validate_date_format(key: &str, format: &str) -> ConfigResult<()> {
    if format.is_empty() {
        return Err(ConfigError::InvalidTemplate {
            key: key.to_string(),
            message: "date format cannot be empty".to_string(),
        });
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTemplate {
            key: key.to_string(),
            message: format!("invalid date format '{}'", format),
        });
    }

    Ok(())
}
