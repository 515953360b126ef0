//! Lazy pagination over link listings
//!
//! Shaarli only paginates newest first. A [`LinkPager`] fetches one page at a
//! time as it is consumed:
//! - forward: pages 1, 2, ... in server order (newest first)
//! - reverse: pages max, max-1, ... 1 with each page reversed (oldest first)

use crate::client::ShaarliClient;
use crate::link::Link;
use std::collections::VecDeque;
use url::Url;

/// Which links a listing shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Search {
    /// Every link visible to the client
    All,
    /// Full-text search
    Term(String),
    /// Links carrying all of these tags
    Tags(Vec<String>),
}

impl Search {
    /// Appends the search parameters to a listing URL
    pub(crate) fn append_to(&self, url: &mut Url) {
        match self {
            Search::All => {}
            Search::Term(term) => {
                url.query_pairs_mut().append_pair("searchterm", term);
            }
            Search::Tags(tags) => {
                url.query_pairs_mut()
                    .append_pair("searchtags", &tags.join(" "));
            }
        }
    }
}

#[derive(Debug)]
enum Direction {
    Forward {
        next_page: u32,
        /// Id of the last link of the previous page
        last_seen_id: Option<String>,
    },
    Reverse {
        /// Counts down to 0
        next_page: u32,
    },
}

/// Cursor over all the links of a listing
///
/// Obtained from [`ShaarliClient::iter`] or [`ShaarliClient::iter_reverse`].
/// A page that fails to load ends the iteration. Once exhausted a pager stays
/// exhausted.
///
/// Shaarli serves its last page again for any page number past the end, so a
/// forward pager stops when a page ends on the same id as the previous one.
/// A listing whose consecutive pages legitimately end on the same id would be
/// cut short.
///
/// # Example
///
/// ```no_run
/// use shaarli_client::{Search, ShaarliClient, Templates};
///
/// # async fn run() -> shaarli_client::Result<()> {
/// let client = ShaarliClient::new("https://links.example.org", Templates::new())?;
/// let mut pager = client.iter(Search::All);
/// while let Some(link) = pager.next().await {
///     println!("{}", link);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LinkPager<'a> {
    client: &'a ShaarliClient,
    search: Search,
    buffer: VecDeque<Link>,
    direction: Direction,
    exhausted: bool,
}

impl<'a> LinkPager<'a> {
    pub(crate) fn forward(client: &'a ShaarliClient, search: Search) -> Self {
        Self {
            client,
            search,
            buffer: VecDeque::new(),
            direction: Direction::Forward {
                next_page: 1,
                last_seen_id: None,
            },
            exhausted: false,
        }
    }

    /// Starts a reverse walk at `max_page`; 0 gives an empty pager
    pub(crate) fn reverse(client: &'a ShaarliClient, search: Search, max_page: u32) -> Self {
        Self {
            client,
            search,
            buffer: VecDeque::new(),
            direction: Direction::Reverse {
                next_page: max_page,
            },
            exhausted: false,
        }
    }

    /// Returns true if another link is available, fetching a page if needed
    pub async fn has_next(&mut self) -> bool {
        if !self.buffer.is_empty() {
            return true;
        }
        if self.exhausted {
            return false;
        }

        let filled = self.fill_buffer().await;
        if !filled {
            self.exhausted = true;
        }
        filled
    }

    /// Returns the next link, or `None` once the listing is exhausted
    pub async fn next(&mut self) -> Option<Link> {
        if self.has_next().await {
            self.buffer.pop_front()
        } else {
            None
        }
    }

    /// Fetches the next page into the buffer, false when there is none
    async fn fill_buffer(&mut self) -> bool {
        match &mut self.direction {
            Direction::Forward {
                next_page,
                last_seen_id,
            } => {
                let page = *next_page;
                *next_page += 1;

                let links = self.client.fetch_page_or_empty(page, &self.search).await;
                let Some(last) = links.last() else {
                    tracing::debug!("Page {} is empty, listing exhausted", page);
                    return false;
                };

                if last.id.is_some() && last.id == *last_seen_id {
                    tracing::debug!("Page {} repeats the previous page, listing exhausted", page);
                    return false;
                }

                *last_seen_id = last.id.clone();
                self.buffer.extend(links);
                true
            }
            Direction::Reverse { next_page } => {
                if *next_page < 1 {
                    return false;
                }
                let page = *next_page;
                *next_page -= 1;

                let links = self.client.fetch_page_or_empty(page, &self.search).await;
                if links.is_empty() {
                    tracing::debug!("Page {} is empty, listing exhausted", page);
                    return false;
                }

                self.buffer.extend(links.into_iter().rev());
                true
            }
        }
    }
}
