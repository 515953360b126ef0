//! Bookmark records

use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// One bookmark, as scraped from a listing or prepared for submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// Date-derived id assigned at creation (`20140106_120000` with default templates)
    pub id: Option<String>,

    /// Short hash used in the shareable permalink
    pub permalink_id: Option<String>,

    pub title: Option<String>,

    pub description: Option<String>,

    pub url: Option<String>,

    /// Private link, only visible once logged in
    pub restricted: bool,

    /// Lower-cased tags, sorted
    pub tags: BTreeSet<String>,
}

impl Link {
    /// Creates an empty link
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, lower-cased. Blank tags are ignored.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() {
            self.tags.insert(tag.to_lowercase());
        }
    }

    /// Builds the permalink of this link under `endpoint`
    ///
    /// # Example
    ///
    /// ```
    /// use shaarli_client::Link;
    /// use url::Url;
    ///
    /// let link = Link {
    ///     permalink_id: Some("Ab12Cd".to_string()),
    ///     ..Link::default()
    /// };
    /// let endpoint = Url::parse("https://links.example.org/").unwrap();
    /// assert_eq!(
    ///     link.permalink(&endpoint).unwrap().as_str(),
    ///     "https://links.example.org/?Ab12Cd"
    /// );
    /// ```
    pub fn permalink(&self, endpoint: &Url) -> Option<Url> {
        let permalink_id = self.permalink_id.as_deref()?;
        let mut url = endpoint.clone();
        url.set_query(Some(permalink_id));
        url.set_fragment(None);
        Some(url)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{} {}",
            self.id.as_deref().unwrap_or("-"),
            if self.restricted { "[private] " } else { "" },
            self.title.as_deref().unwrap_or(""),
            self.url.as_deref().unwrap_or("")
        )?;
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            write!(f, " [{}]", tags.join(" "))?;
        }
        Ok(())
    }
}
