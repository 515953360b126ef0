//! Page parsers for Shaarli's HTML
//!
//! This module turns fetched pages into data:
//! - Link listings into [`Link`] records
//! - The tag cloud into tag counts
//! - Header counters, paging and form tokens into scalars
//!
//! Every location comes from the [`Templates`] registry.

use crate::ids::IdFormat;
use crate::link::Link;
use crate::template::{keys, Template, Templates};
use crate::{ConfigResult, Result, ShaarliError};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Templates needed to read one link of a listing
struct LinkTemplates<'t> {
    private: &'t Template,
    id: &'t Template,
    date: &'t Template,
    permalink_id: &'t Template,
    title: &'t Template,
    description: &'t Template,
    url: &'t Template,
    tags: Option<Selector>,
    tag: &'t Template,
}

impl<'t> LinkTemplates<'t> {
    fn from_registry(templates: &'t Templates) -> ConfigResult<Self> {
        Ok(Self {
            private: templates.get(keys::LINKS_PRIVATE)?,
            id: templates.get(keys::LINKS_ID)?,
            date: templates.get(keys::LINKS_DATE)?,
            permalink_id: templates.get(keys::LINKS_PERMALINK_ID)?,
            title: templates.get(keys::LINKS_TITLE)?,
            description: templates.get(keys::LINKS_DESCRIPTION)?,
            url: templates.get(keys::LINKS_URL)?,
            tags: templates.get(keys::TAGS)?.css(),
            tag: templates.get(keys::TAGS_TAG)?,
        })
    }

    fn parse_item(&self, item: ElementRef<'_>, base_url: &Url, format: &IdFormat) -> Link {
        // Prefer an exposed id over the displayed date
        let id = self.id.extract(item).or_else(|| {
            self.date
                .extract(item)
                .and_then(|date| format.id_from_permalink_date(&date))
        });

        let mut link = Link {
            id,
            permalink_id: self.permalink_id.extract(item),
            title: self.title.extract(item),
            description: self.description.extract(item),
            url: self
                .url
                .extract(item)
                .map(|url| resolve_url(&url, base_url)),
            restricted: self.private.extract(item).is_some(),
            ..Link::default()
        };

        if let Some(selector) = &self.tags {
            for element in item.select(selector) {
                if let Some(tag) = self.tag.extract(element) {
                    link.add_tag(&tag);
                }
            }
        }

        link
    }
}

/// Parses every link of a listing page
///
/// A page without the link container yields an empty vector. Missing fields
/// are left as `None`; only an unknown template key is an error.
///
/// # Arguments
///
/// * `html` - The page body
/// * `base_url` - The page URL, used to resolve relative link URLs
/// * `templates` - Where to find each field
/// * `format` - How to turn displayed dates into ids
pub fn parse_links(
    html: &str,
    base_url: &Url,
    templates: &Templates,
    format: &IdFormat,
) -> ConfigResult<Vec<Link>> {
    let document = Html::parse_document(html);

    let Some(container) = templates.get(keys::LINKS)?.css() else {
        return Ok(Vec::new());
    };
    let fields = LinkTemplates::from_registry(templates)?;

    let links: Vec<Link> = document
        .select(&container)
        .map(|item| fields.parse_item(item, base_url, format))
        .collect();

    tracing::debug!("Parsed {} links from {}", links.len(), base_url);
    Ok(links)
}

/// Parses the tag cloud into tag -> occurrence count
///
/// The cloud elements alternate a count and a tag name. A count that is not
/// a number, or a count without its name, fails the whole page.
pub fn parse_tag_cloud(html: &str, templates: &Templates) -> Result<BTreeMap<String, u32>> {
    let document = Html::parse_document(html);

    let name_template = templates.get(keys::CLOUDTAG_NAME)?;
    let count_template = templates.get(keys::CLOUDTAG_COUNT)?;
    let Some(cloud) = templates.get(keys::CLOUDTAG)?.css() else {
        return Ok(BTreeMap::new());
    };

    let elements: Vec<ElementRef<'_>> = document.select(&cloud).collect();
    let mut tags = BTreeMap::new();

    for pair in elements.chunks(2) {
        let [count_element, name_element] = pair else {
            return Err(ShaarliError::MalformedTagCloud(
                "tag count without a tag name".to_string(),
            ));
        };

        let count = count_template
            .extract(*count_element)
            .ok_or_else(|| ShaarliError::MalformedTagCloud("empty tag count".to_string()))?;
        let count: u32 = count.parse().map_err(|_| {
            ShaarliError::MalformedTagCloud(format!("'{}' is not a tag count", count))
        })?;

        let name = name_template
            .extract(*name_element)
            .ok_or_else(|| ShaarliError::MalformedTagCloud("empty tag name".to_string()))?;

        tags.insert(name, count);
    }

    Ok(tags)
}

/// Parses the global link count from a page header, 0 when absent
pub fn parse_links_count(html: &str, templates: &Templates) -> ConfigResult<u32> {
    let count = extract_from_page(html, templates.get(keys::LINKS_COUNT)?)
        .and_then(|count| count.parse().ok())
        .unwrap_or(0);
    Ok(count)
}

/// Parses the last page number of a listing, `None` when the page has no paging
pub fn parse_max_page(html: &str, templates: &Templates) -> ConfigResult<Option<u32>> {
    Ok(extract_from_page(html, templates.get(keys::PAGE_MAX)?).and_then(|page| page.parse().ok()))
}

/// Parses the anti-forgery token of a form page
pub fn parse_token(html: &str, templates: &Templates) -> ConfigResult<Option<String>> {
    Ok(extract_from_page(html, templates.get(keys::TOKEN)?))
}

fn extract_from_page(html: &str, template: &Template) -> Option<String> {
    let document = Html::parse_document(html);
    template.extract(document.root_element())
}

/// Resolves a possibly relative link URL against the page URL
///
/// Shaarli notes point back at the instance with a bare `?permalink` query.
fn resolve_url(url: &str, base_url: &Url) -> String {
    if Url::parse(url).is_ok() {
        return url.to_string();
    }

    match base_url.join(url) {
        Ok(absolute_url) => absolute_url.to_string(),
        Err(_) => url.to_string(),
    }
}
