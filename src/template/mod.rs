//! Extraction templates for Shaarli pages
//!
//! This module describes where each piece of information lives in Shaarli's
//! markup:
//! - [`extract`] applies one selector/attribute/regex triple to a node
//! - [`Templates`] maps field names to triples, with defaults for the stock theme
//!
//! # Example
//!
//! ```
//! use shaarli_client::template::{keys, Templates};
//!
//! let mut templates = Templates::new();
//! templates.add(keys::LINKS_TITLE, "h2.link-title", "", "").unwrap();
//! assert_eq!(templates.get(keys::LINKS_TITLE).unwrap().selector, "h2.link-title");
//! ```

mod extract;
mod registry;

pub use extract::extract;
pub use registry::{validate_template, Template, Templates};

/// Template keys known to the client
pub mod keys {
    /// strftime format of link ids
    pub const ID_DATE_FORMAT: &str = "id-date-format";
    /// strftime format of the date shown next to a permalink
    pub const PERMALINK_DATE_FORMAT: &str = "permalink-date-format";
    /// Elements of the tag cloud, alternating count and name
    pub const CLOUDTAG: &str = "cloudtag";
    pub const CLOUDTAG_NAME: &str = "cloudtag-name";
    pub const CLOUDTAG_COUNT: &str = "cloudtag-count";
    /// Global link count in the page header
    pub const LINKS_COUNT: &str = "links-count";
    /// Anti-forgery token of a form
    pub const TOKEN: &str = "token";
    /// One element per link in a listing
    pub const LINKS: &str = "links";
    pub const LINKS_PRIVATE: &str = "links-private";
    /// Link id, when the markup exposes it directly
    pub const LINKS_ID: &str = "links-id";
    /// Human-readable link date, used when the id is not exposed
    pub const LINKS_DATE: &str = "links-date";
    pub const LINKS_PERMALINK_ID: &str = "links-permalink-id";
    pub const LINKS_TITLE: &str = "links-title";
    pub const LINKS_DESCRIPTION: &str = "links-description";
    pub const LINKS_URL: &str = "links-url";
    /// Tag elements inside one link
    pub const TAGS: &str = "tags";
    pub const TAGS_TAG: &str = "tags-tag";
    /// Last page number of a listing
    pub const PAGE_MAX: &str = "page-max";

    /// Keys whose selector is a date format rather than a CSS selector
    pub fn is_date_format(key: &str) -> bool {
        key == ID_DATE_FORMAT || key == PERMALINK_DATE_FORMAT
    }
}
