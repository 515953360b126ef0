//! Shaarli client
//!
//! This module contains the operations on a Shaarli instance, including:
//! - Login and per-page settings
//! - Creating, updating and deleting links through Shaarli's forms
//! - Paged and lazily iterated searches
//! - Tag cloud and link count
//!
//! Public operations never fail on a network or server error: the failure is
//! logged and a neutral value (`false`, `None`, empty, 0) is returned.

mod http;
mod pager;
mod parser;

pub use self::http::build_http_client;
pub use pager::{LinkPager, Search};
pub use parser::{parse_links, parse_links_count, parse_max_page, parse_tag_cloud, parse_token};

use crate::config::{Config, UserAgentConfig};
use crate::ids::{IdFormat, IdGenerator};
use crate::link::Link;
use crate::template::Templates;
use crate::{Result, ShaarliError};
use chrono::{DateTime, Local};
use self::http::{get_page, get_status, post_form};
use reqwest::StatusCode;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Page size requested after login, so iterations need few pages
pub const MAX_LINKS_BY_PAGE: u32 = 100;

/// Client for one Shaarli instance
///
/// The client owns its HTTP connection pool and cookie jar; a successful
/// [`login`](Self::login) applies to every later call on the same client.
/// Everything is released when the client is dropped.
#[derive(Debug)]
pub struct ShaarliClient {
    http: reqwest::Client,
    endpoint: Url,
    templates: Templates,
    format: IdFormat,
    ids: IdGenerator,
}

impl ShaarliClient {
    /// Creates a client for the instance at `endpoint`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shaarli_client::{ShaarliClient, Templates};
    ///
    /// let client = ShaarliClient::new("https://links.example.org", Templates::new()).unwrap();
    /// ```
    pub fn new(endpoint: &str, templates: Templates) -> Result<Self> {
        let http = build_http_client(&UserAgentConfig::default())?;
        Self::with_http_client(http, endpoint, templates)
    }

    /// Creates a client over an existing HTTP client
    ///
    /// `http` must not follow redirects, and needs a cookie store for
    /// [`login`](Self::login) to have any effect.
    pub fn with_http_client(
        http: reqwest::Client,
        endpoint: &str,
        templates: Templates,
    ) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let format = IdFormat::from_templates(&templates)?;

        Ok(Self {
            http,
            endpoint,
            templates,
            format,
            ids: IdGenerator::new(),
        })
    }

    /// Creates a client from a loaded configuration
    ///
    /// Credentials are not used here, see [`login`](Self::login).
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(&config.user_agent)?;
        Self::with_http_client(http, &config.shaarli.endpoint, config.templates()?)
    }

    /// The instance URL, always ending with a `/`
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Logs in, then raises the page size to [`MAX_LINKS_BY_PAGE`]
    ///
    /// # Returns
    ///
    /// * `true` - Shaarli accepted the credentials form
    /// * `false` - The form could not be fetched or was rejected (logged)
    pub async fn login(&self, login: &str, password: &str) -> bool {
        tracing::debug!("login(): login={}", login);

        if let Err(e) = self.login_impl(login, password).await {
            tracing::error!("Cannot log in as {}: {}", login, e);
            return false;
        }

        self.set_links_by_page(MAX_LINKS_BY_PAGE).await;
        true
    }

    async fn login_impl(&self, login: &str, password: &str) -> Result<()> {
        let url = self.url_with_query("do=login");
        let token = self.fetch_token(&url).await?;

        let form = [
            ("login", login),
            ("password", password),
            ("token", token.as_str()),
            ("returnurl", self.endpoint.as_str()),
        ];
        post_form(&self.http, &url, &form).await
    }

    /// Creates a link with a freshly generated id
    ///
    /// See [`create_or_update_link`](Self::create_or_update_link).
    pub async fn create_link<I, S>(
        &self,
        url: &str,
        title: &str,
        description: Option<&str>,
        tags: I,
        restricted: bool,
    ) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.create_or_update_link(None, url, title, description, tags, restricted)
            .await
    }

    /// Creates the link `id`, or replaces it if it exists
    ///
    /// Without an id, one is generated from the current time. Ids are
    /// generated at most once per second per client, so this call may wait.
    ///
    /// # Returns
    ///
    /// * `Some(id)` - The id the link was saved under
    /// * `None` - The form could not be fetched or was rejected (logged)
    ///
    /// # Panics
    ///
    /// Panics if `url` is empty.
    pub async fn create_or_update_link<I, S>(
        &self,
        id: Option<&str>,
        url: &str,
        title: &str,
        description: Option<&str>,
        tags: I,
        restricted: bool,
    ) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        assert!(!url.is_empty(), "link url cannot be empty");

        let id = match id {
            Some(id) => id.to_string(),
            None => self.format.format_id(&self.ids.generate().await),
        };
        let tags = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(
            "create_or_update_link(): id={} url={} title={} restricted={}",
            id,
            url,
            title,
            restricted
        );

        match self
            .save_link_impl(&id, url, title, description, &tags, restricted)
            .await
        {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::error!("Cannot save link {}: {}", id, e);
                None
            }
        }
    }

    async fn save_link_impl(
        &self,
        id: &str,
        url: &str,
        title: &str,
        description: Option<&str>,
        tags: &str,
        restricted: bool,
    ) -> Result<()> {
        let token = self.fetch_token(&self.url_with_query("post")).await?;

        let mut submit_url = self.endpoint.clone();
        submit_url.query_pairs_mut().append_pair("post", url);

        let mut form = vec![("lf_linkdate", id), ("lf_url", url), ("lf_title", title)];
        if let Some(description) = description {
            form.push(("lf_description", description));
        }
        if restricted {
            form.push(("lf_private", "true"));
        }
        if !tags.is_empty() {
            form.push(("lf_tags", tags));
        }
        form.push(("save_edit", "Save"));
        form.push(("token", token.as_str()));
        form.push(("returnurl", self.endpoint.as_str()));

        post_form(&self.http, &submit_url, &form).await
    }

    /// Deletes the link `id`
    ///
    /// # Returns
    ///
    /// * `true` - Shaarli accepted the deletion
    /// * `false` - The form could not be fetched or was rejected (logged)
    pub async fn delete(&self, id: &str) -> bool {
        tracing::debug!("delete(): id={}", id);

        match self.delete_impl(id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Cannot delete link {}: {}", id, e);
                false
            }
        }
    }

    async fn delete_impl(&self, id: &str) -> Result<()> {
        let url = self.url_with_query("post");
        let token = self.fetch_token(&url).await?;

        let form = [
            ("lf_linkdate", id),
            ("delete_link", ""),
            ("token", token.as_str()),
        ];
        post_form(&self.http, &url, &form).await
    }

    /// Deletes every link visible to this client
    ///
    /// Links are collected first, then deleted one by one. A failed deletion
    /// is logged and skipped, so the instance may end up partially emptied.
    ///
    /// # Returns
    ///
    /// The number of links deleted
    pub async fn delete_all(&self) -> usize {
        tracing::debug!("delete_all()");

        let mut ids = BTreeSet::new();
        let mut pager = self.iter(Search::All);
        while let Some(link) = pager.next().await {
            if let Some(id) = link.id {
                ids.insert(id);
            }
        }

        let mut deleted = 0;
        for id in &ids {
            if self.delete(id).await {
                deleted += 1;
            }
        }

        tracing::info!("Deleted {} of {} links", deleted, ids.len());
        deleted
    }

    /// Reads the tag cloud: tag name -> number of links
    ///
    /// # Returns
    ///
    /// * `Ok(map)` - Tag counts, empty if the page could not be fetched (logged)
    /// * `Err(ShaarliError::MalformedTagCloud)` - The cloud did not pair counts and names
    pub async fn get_tags(&self) -> Result<BTreeMap<String, u32>> {
        tracing::debug!("get_tags()");

        let url = self.url_with_query("do=tagcloud");
        let html = match get_page(&self.http, &url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Cannot retrieve tags: {}", e);
                return Ok(BTreeMap::new());
            }
        };

        parse_tag_cloud(&html, &self.templates)
    }

    /// Fetches one listing page
    ///
    /// # Returns
    ///
    /// The links of the page, empty if it could not be fetched (logged)
    ///
    /// # Panics
    ///
    /// Panics if `page` is 0; pages are numbered from 1.
    pub async fn search(&self, page: u32, search: &Search) -> Vec<Link> {
        assert!(page >= 1, "page must be greater or equal to 1");
        tracing::debug!("search(): page={} search={:?}", page, search);

        self.fetch_page_or_empty(page, search).await
    }

    /// Iterates over a listing, newest first
    pub fn iter(&self, search: Search) -> LinkPager<'_> {
        tracing::debug!("iter(): search={:?}", search);
        LinkPager::forward(self, search)
    }

    /// Iterates over a listing, oldest first
    ///
    /// The number of pages is read once, from the first page of the listing.
    pub async fn iter_reverse(&self, search: Search) -> LinkPager<'_> {
        tracing::debug!("iter_reverse(): search={:?}", search);
        let max_page = self.max_page(&search).await;
        LinkPager::reverse(self, search, max_page)
    }

    pub async fn search_all(&self, page: u32) -> Vec<Link> {
        self.search(page, &Search::All).await
    }

    pub fn search_all_iter(&self) -> LinkPager<'_> {
        self.iter(Search::All)
    }

    pub async fn search_all_reverse_iter(&self) -> LinkPager<'_> {
        self.iter_reverse(Search::All).await
    }

    pub async fn search_term(&self, page: u32, term: &str) -> Vec<Link> {
        self.search(page, &Search::Term(term.to_string())).await
    }

    pub fn search_term_iter(&self, term: &str) -> LinkPager<'_> {
        self.iter(Search::Term(term.to_string()))
    }

    pub async fn search_term_reverse_iter(&self, term: &str) -> LinkPager<'_> {
        self.iter_reverse(Search::Term(term.to_string())).await
    }

    /// Fetches one page of links carrying all of `tags`
    ///
    /// # Panics
    ///
    /// Panics if `tags` is empty or `page` is 0.
    pub async fn search_tags(&self, page: u32, tags: &[&str]) -> Vec<Link> {
        self.search(page, &tags_search(tags)).await
    }

    /// # Panics
    ///
    /// Panics if `tags` is empty.
    pub fn search_tags_iter(&self, tags: &[&str]) -> LinkPager<'_> {
        self.iter(tags_search(tags))
    }

    /// # Panics
    ///
    /// Panics if `tags` is empty.
    pub async fn search_tags_reverse_iter(&self, tags: &[&str]) -> LinkPager<'_> {
        self.iter_reverse(tags_search(tags)).await
    }

    /// Reads the number of links visible to this client, 0 if unavailable
    pub async fn links_count(&self) -> u32 {
        tracing::debug!("links_count()");

        let result = match get_page(&self.http, &self.endpoint).await {
            Ok(html) => parse_links_count(&html, &self.templates).map_err(ShaarliError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Cannot get links count: {}", e);
                0
            }
        }
    }

    /// Sets how many links a listing page shows for this session
    ///
    /// Shaarli answers with a redirect to the listing, which counts as
    /// success like a plain 200.
    ///
    /// # Panics
    ///
    /// Panics if `count` is 0.
    pub async fn set_links_by_page(&self, count: u32) -> bool {
        assert!(count >= 1, "links per page must be greater or equal to 1");
        tracing::debug!("set_links_by_page(): count={}", count);

        let url = self.url_with_query(&format!("linksperpage={}", count));
        match get_status(&self.http, &url).await {
            Ok(StatusCode::OK) | Ok(StatusCode::FOUND) => true,
            Ok(status) => {
                tracing::error!("Cannot set links per page: unexpected status {}", status);
                false
            }
            Err(e) => {
                tracing::error!("Cannot set links per page: {}", e);
                false
            }
        }
    }

    /// Formats a timestamp as a link id
    pub fn format_id(&self, timestamp: &DateTime<Local>) -> String {
        self.format.format_id(timestamp)
    }

    /// Parses a link id, `None` if it does not follow the id format
    pub fn parse_id(&self, id: &str) -> Option<DateTime<Local>> {
        self.format.parse_id(id)
    }

    /// Fetches and parses one listing page
    pub(crate) async fn fetch_page(&self, page: u32, search: &Search) -> Result<Vec<Link>> {
        let url = self.page_url(page, search);
        let html = get_page(&self.http, &url).await?;
        Ok(parse_links(&html, &url, &self.templates, &self.format)?)
    }

    pub(crate) async fn fetch_page_or_empty(&self, page: u32, search: &Search) -> Vec<Link> {
        match self.fetch_page(page, search).await {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("Cannot retrieve links of page {}: {}", page, e);
                Vec::new()
            }
        }
    }

    /// Reads the number of pages of a listing
    ///
    /// A listing without paging has a single page; 0 means it could not be read.
    async fn max_page(&self, search: &Search) -> u32 {
        let url = self.page_url(1, search);
        let result = match get_page(&self.http, &url).await {
            Ok(html) => parse_max_page(&html, &self.templates).map_err(ShaarliError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(max_page) => max_page.unwrap_or(1),
            Err(e) => {
                tracing::error!("Cannot read page count of {}: {}", url, e);
                0
            }
        }
    }

    async fn fetch_token(&self, url: &Url) -> Result<String> {
        let html = get_page(&self.http, url).await?;
        parse_token(&html, &self.templates)?.ok_or_else(|| ShaarliError::MissingToken {
            url: url.to_string(),
        })
    }

    fn url_with_query(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(Some(query));
        url
    }

    fn page_url(&self, page: u32, search: &Search) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        search.append_to(&mut url);
        url
    }
}

/// Parses the endpoint and makes sure its path ends with a `/`
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint.trim())?;
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn tags_search(tags: &[&str]) -> Search {
    assert!(!tags.is_empty(), "at least one tag is required");
    Search::Tags(tags.iter().map(|tag| tag.to_string()).collect())
}
