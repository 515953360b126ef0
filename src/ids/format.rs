use crate::template::{keys, Templates};
use crate::ConfigResult;
use chrono::{DateTime, Local, NaiveDateTime};

/// Conversions between link ids, timestamps and displayed link dates
///
/// Both formats come from the template registry, so they follow the theme
/// and configuration in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFormat {
    /// strftime format of an id, `%Y%m%d_%H%M%S` by default
    id: String,

    /// strftime format of the date shown on a listing
    permalink: String,
}

impl IdFormat {
    pub fn new(id: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            permalink: permalink.into(),
        }
    }

    /// Reads both formats from the registry
    pub fn from_templates(templates: &Templates) -> ConfigResult<Self> {
        let id = &templates.get(keys::ID_DATE_FORMAT)?.selector;
        let permalink = &templates.get(keys::PERMALINK_DATE_FORMAT)?.selector;
        Ok(Self::new(id.as_str(), permalink.as_str()))
    }

    /// Formats a timestamp as a link id
    pub fn format_id(&self, timestamp: &DateTime<Local>) -> String {
        timestamp.format(&self.id).to_string()
    }

    /// Parses a link id back into a timestamp
    ///
    /// Returns `None` when `id` does not follow the id format. Ambiguous
    /// local times resolve to the earliest candidate.
    pub fn parse_id(&self, id: &str) -> Option<DateTime<Local>> {
        parse_local(id.trim(), &self.id)
    }

    /// Turns a displayed link date into a link id
    ///
    /// # Example
    ///
    /// ```
    /// use shaarli_client::IdFormat;
    ///
    /// let format = IdFormat::new("%Y%m%d_%H%M%S", "%a %b %d %H:%M:%S %Y -");
    /// assert_eq!(
    ///     format.id_from_permalink_date("Mon Jan 06 12:00:00 2014 -"),
    ///     Some("20140106_120000".to_string())
    /// );
    /// ```
    pub fn id_from_permalink_date(&self, date: &str) -> Option<String> {
        let naive = NaiveDateTime::parse_from_str(date.trim(), &self.permalink).ok()?;
        Some(naive.format(&self.id).to_string())
    }

    /// Formats a timestamp the way a listing displays it
    pub fn format_permalink_date(&self, timestamp: &DateTime<Local>) -> String {
        timestamp.format(&self.permalink).to_string()
    }
}

impl Default for IdFormat {
    fn default() -> Self {
        // The registry always holds both keys
        match Self::from_templates(&Templates::new()) {
            Ok(format) => format,
            Err(_) => Self::new("%Y%m%d_%H%M%S", "%a %b %d %H:%M:%S %Y -"),
        }
    }
}

fn parse_local(value: &str, format: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
    naive.and_local_timezone(Local).earliest()
}
