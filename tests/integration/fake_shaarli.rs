//! A small in-memory Shaarli served by wiremock
//!
//! It speaks the same pages and forms as a Shaarli instance with the default
//! theme: login, link form, delete, tag cloud, paged listings with search,
//! and a per-session page size. A logged-in client is recognised by the
//! session cookie set on login.

use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header_exists, method};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const LOGIN: &str = "admin";
pub const PASSWORD: &str = "secret";

const TOKEN: &str = "f0e1d2c3b4a5";
const SESSION_COOKIE: &str = "shaarli=session; Path=/";
const DEFAULT_LINKS_PER_PAGE: usize = 20;

#[derive(Debug, Clone)]
pub struct StoredLink {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub private: bool,
}

#[derive(Debug)]
struct State {
    /// Keyed by id; ids sort chronologically
    links: BTreeMap<String, StoredLink>,
    anonymous_per_page: usize,
    session_per_page: usize,
}

/// Handle on a running fake instance
pub struct FakeShaarli {
    pub server: MockServer,
    state: Arc<Mutex<State>>,
}

impl FakeShaarli {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(State {
            links: BTreeMap::new(),
            anonymous_per_page: DEFAULT_LINKS_PER_PAGE,
            session_per_page: DEFAULT_LINKS_PER_PAGE,
        }));

        // Session mocks first so they take precedence
        for post in [false, true] {
            Mock::given(method(if post { "POST" } else { "GET" }))
                .and(header_exists("cookie"))
                .respond_with(Responder {
                    state: state.clone(),
                    authenticated: true,
                    post,
                })
                .mount(&server)
                .await;
        }
        for post in [false, true] {
            Mock::given(method(if post { "POST" } else { "GET" }))
                .respond_with(Responder {
                    state: state.clone(),
                    authenticated: false,
                    post,
                })
                .mount(&server)
                .await;
        }

        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Stores a link directly, bypassing the forms
    pub fn seed(&self, id: &str, title: &str, tags: &[&str], private: bool) {
        let link = StoredLink {
            id: id.to_string(),
            url: format!("http://example.org/{}", id),
            title: title.to_string(),
            description: format!("Description of {}", title),
            tags: tags.iter().map(|tag| tag.to_lowercase()).collect(),
            private,
        };
        self.lock().links.insert(link.id.clone(), link);
    }

    pub fn stored(&self, id: &str) -> Option<StoredLink> {
        self.lock().links.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().links.len()
    }

    pub fn session_per_page(&self) -> usize {
        self.lock().session_per_page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

struct Responder {
    state: Arc<Mutex<State>>,
    authenticated: bool,
    post: bool,
}

impl Respond for Responder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();
        let mut state = self.state.lock().unwrap();

        if self.post {
            let form: BTreeMap<String, String> = url::form_urlencoded::parse(&request.body)
                .into_owned()
                .collect();
            return self.handle_post(&mut state, &query, &form);
        }

        if query.get("do").map(String::as_str) == Some("login") {
            return html(form_page("login"));
        }
        if query.contains_key("post") {
            if !self.authenticated {
                return redirect("?do=login");
            }
            return html(form_page("linkform"));
        }
        if let Some(count) = query.get("linksperpage") {
            if let Ok(count) = count.parse::<usize>() {
                if self.authenticated {
                    state.session_per_page = count.max(1);
                } else {
                    state.anonymous_per_page = count.max(1);
                }
            }
            return redirect("./");
        }
        if query.get("do").map(String::as_str) == Some("tagcloud") {
            return html(self.tag_cloud(&state));
        }

        html(self.listing(&state, &query))
    }
}

impl Responder {
    fn handle_post(
        &self,
        state: &mut State,
        query: &BTreeMap<String, String>,
        form: &BTreeMap<String, String>,
    ) -> ResponseTemplate {
        if form.get("token").map(String::as_str) != Some(TOKEN) {
            return html("<html><body>Wrong token.</body></html>".to_string());
        }

        if query.get("do").map(String::as_str) == Some("login") {
            let accepted = form.get("login").map(String::as_str) == Some(LOGIN)
                && form.get("password").map(String::as_str) == Some(PASSWORD);
            if !accepted {
                return html(form_page("login"));
            }
            return redirect("./").insert_header("set-cookie", SESSION_COOKIE);
        }

        if !self.authenticated || !query.contains_key("post") {
            return html(form_page("login"));
        }

        let Some(id) = form.get("lf_linkdate") else {
            return html("<html><body>Missing id.</body></html>".to_string());
        };

        if form.contains_key("delete_link") {
            state.links.remove(id);
            return redirect("./");
        }

        let link = StoredLink {
            id: id.clone(),
            url: form.get("lf_url").cloned().unwrap_or_default(),
            title: form.get("lf_title").cloned().unwrap_or_default(),
            description: form.get("lf_description").cloned().unwrap_or_default(),
            tags: form
                .get("lf_tags")
                .map(|tags| tags.split_whitespace().map(str::to_lowercase).collect())
                .unwrap_or_default(),
            private: form.contains_key("lf_private"),
        };
        state.links.insert(link.id.clone(), link);
        redirect("./")
    }

    fn visible<'s>(&self, state: &'s State) -> Vec<&'s StoredLink> {
        // Newest first
        state
            .links
            .values()
            .rev()
            .filter(|link| self.authenticated || !link.private)
            .collect()
    }

    fn tag_cloud(&self, state: &State) -> String {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for link in self.visible(state) {
            for tag in &link.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }

        let cloud: String = counts
            .iter()
            .map(|(tag, count)| {
                format!(
                    r#"<span class="count">{count}</span><a href="?searchtags={tag}">{tag}</a>"#,
                    count = count,
                    tag = escape(tag)
                )
            })
            .collect();

        format!(
            r#"<html><body><div id="cloudtag">{}</div></body></html>"#,
            cloud
        )
    }

    fn listing(&self, state: &State, query: &BTreeMap<String, String>) -> String {
        let visible = self.visible(state);
        let total = visible.len();

        let term = query.get("searchterm").map(|term| term.to_lowercase());
        let wanted_tags: Vec<String> = query
            .get("searchtags")
            .map(|tags| tags.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default();

        let matching: Vec<&StoredLink> = visible
            .into_iter()
            .filter(|link| match &term {
                Some(term) => {
                    link.title.to_lowercase().contains(term)
                        || link.description.to_lowercase().contains(term)
                        || link.url.to_lowercase().contains(term)
                }
                None => true,
            })
            .filter(|link| wanted_tags.iter().all(|tag| link.tags.contains(tag)))
            .collect();

        let per_page = if self.authenticated {
            state.session_per_page
        } else {
            state.anonymous_per_page
        };
        let max_page = ((matching.len() + per_page - 1) / per_page).max(1);
        // Past the end, Shaarli serves the last page again
        let page = query
            .get("page")
            .and_then(|page| page.parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, max_page);

        let items: String = matching
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .map(|link| render_link(link))
            .collect();

        format!(
            r#"<html><body>
            <div id="pageheader"><div class="nomobile">{total} links</div></div>
            <div id="paging_current">page {page} / {max_page}</div>
            <div id="linklist"><ul>{items}</ul></div>
            </body></html>"#,
            total = total,
            page = page,
            max_page = max_page,
            items = items
        )
    }
}

fn render_link(link: &StoredLink) -> String {
    let permalink = format!("p{}", link.id.replace('_', ""));
    let date = NaiveDateTime::parse_from_str(&link.id, "%Y%m%d_%H%M%S")
        .map(|date| date.format("%a %b %d %H:%M:%S %Y").to_string())
        .unwrap_or_default();
    let description = if link.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="linkdescription">{}</div>"#,
            escape(&link.description)
        )
    };
    let tags: String = link
        .tags
        .iter()
        .map(|tag| {
            format!(
                r#"<span class="linktag"><a href="?searchtags={tag}">{tag}</a></span>"#,
                tag = escape(tag)
            )
        })
        .collect();

    format!(
        r#"<li{class}>
            <a name="{permalink}" id="{permalink}"></a>
            <span class="linktitle"><a href="{url}">{title}</a></span>
            {description}
            <span class="linkdate" title="Permalink"><a href="?{permalink}">{date} - permalink</a></span>
            <div class="linktaglist">{tags}</div>
            <span class="linkurl" title="Short link">{url}</span>
        </li>"#,
        class = if link.private { r#" class="private""# } else { "" },
        permalink = permalink,
        url = escape(&link.url),
        title = escape(&link.title),
        description = description,
        date = date,
        tags = tags
    )
}

fn form_page(name: &str) -> String {
    format!(
        r#"<html><body><form method="post" name="{}">
        <input type="hidden" name="token" value="{}">
        </form></body></html>"#,
        name, TOKEN
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn redirect(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("location", location)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
