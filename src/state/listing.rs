//! Listing state: loaded posts plus the cursor to the next page

use thiserror::Error;
use tokio::sync::Mutex;

use super::CursorList;
use crate::content::PostSummary;
use crate::prismic::{ContentClient, ContentError};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("no further pages to load")]
    NoMorePages,
    #[error("a page load is already in flight")]
    AlreadyLoading,
    #[error("load ticket {0} is not the outstanding load")]
    StaleLoad(u64),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Proof that the caller owns the single outstanding "load more"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    cursor: String,
}

impl LoadTicket {
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// A fetched page ready to be appended
#[derive(Debug, Clone)]
pub struct LoadedPage<T> {
    pub results: Vec<T>,
    pub next_page: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Listing<T = PostSummary> {
    posts: CursorList<T>,
    next_page: Option<String>,
    in_flight: Option<u64>,
    tickets_issued: u64,
}

impl<T> Listing<T> {
    /// Seed from a loader's first page
    pub fn new(posts: Vec<T>, next_page: Option<String>) -> Self {
        Self {
            posts: CursorList::from_items(posts),
            next_page,
            in_flight: None,
            tickets_issued: 0,
        }
    }

    /// Replace the collection with exactly `posts`
    pub fn insert_posts(&mut self, posts: Vec<T>) {
        self.posts.replace(posts);
    }

    pub fn posts(&self) -> &[T] {
        self.posts.items()
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the "load more" trigger should be offered
    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some() && !self.is_loading()
    }

    /// Claim the single in-flight slot for the current cursor
    pub fn begin_load_more(&mut self) -> Result<LoadTicket, ListingError> {
        if self.in_flight.is_some() {
            return Err(ListingError::AlreadyLoading);
        }
        let cursor = self.next_page.clone().ok_or(ListingError::NoMorePages)?;

        self.tickets_issued += 1;
        self.in_flight = Some(self.tickets_issued);
        Ok(LoadTicket {
            id: self.tickets_issued,
            cursor,
        })
    }

    /// Append a fetched page and move the cursor
    pub fn complete_load_more(
        &mut self,
        ticket: LoadTicket,
        page: LoadedPage<T>,
    ) -> Result<usize, ListingError> {
        if self.in_flight != Some(ticket.id) {
            return Err(ListingError::StaleLoad(ticket.id));
        }
        let appended = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.in_flight = None;
        Ok(appended)
    }

    /// Release the slot after a failed fetch; the cursor is left untouched
    pub fn abort_load_more(&mut self, ticket: LoadTicket) {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
        }
    }
}

impl Listing<PostSummary> {
    /// Fetch the page at the current cursor and append it.
    ///
    /// The lock is released while the request is in flight; a concurrent
    /// call fails with [`ListingError::AlreadyLoading`].
    pub async fn load_more(
        state: &Mutex<Self>,
        client: &ContentClient,
    ) -> Result<usize, ListingError> {
        let ticket = state.lock().await.begin_load_more()?;
        tracing::debug!("Loading more posts from {}", ticket.cursor());

        let fetched = client.fetch_page(ticket.cursor()).await;
        match fetched {
            Ok(page) => {
                let loaded = LoadedPage {
                    results: page.results.iter().map(PostSummary::from).collect(),
                    next_page: page.next_page,
                };
                state.lock().await.complete_load_more(ticket, loaded)
            }
            Err(e) => {
                state.lock().await.abort_load_more(ticket);
                Err(e.into())
            }
        }
    }
}
