//! Paginated, de-duplicated image feed.
//!
//! The feed is keyed by an optional query. Each fetch is split into
//! [`ImageFeed::begin_fetch`], which hands out the next [`PendingFetch`], and
//! [`ImageFeed::complete`], which merges the result. Callers may run the
//! request concurrently with other work; a result whose generation no longer
//! matches (the query changed meanwhile) is discarded.
//!
//! Merging is keyed by image id: a repeated id replaces the stored value in
//! place, so the newest data wins while the first-seen position is kept.

use std::collections::HashMap;

use pagination::{PageNumber, PageRequest, PageSize};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::ports::{ImageSource, ImageSourceError};
use super::{FeedImage, FeedQuery, FeedRequest};

/// Lifecycle of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FeedStatus {
    /// Nothing in flight.
    Idle,
    /// A page request is in flight.
    Loading,
    /// The provider returned an empty page; further signals are ignored.
    Exhausted,
}

/// A page request handed out by [`ImageFeed::begin_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    generation: u64,
    request: FeedRequest,
}

impl PendingFetch {
    /// Request to send to the image source.
    pub fn request(&self) -> &FeedRequest {
        &self.request
    }
}

/// Result of merging one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// A page was merged.
    Page {
        /// Page that was fetched.
        page: PageNumber,
        /// Images with ids not seen before, in provider order.
        added: Vec<FeedImage>,
        /// Images that replaced an existing entry.
        replaced: Vec<FeedImage>,
    },
    /// The page was empty; the feed is now exhausted.
    Exhausted,
    /// The fetch failed; the same page will be requested next time.
    FetchFailed {
        /// Page that failed.
        page: PageNumber,
        /// Failure description.
        message: String,
    },
    /// The result belonged to an earlier query and was dropped.
    Stale,
}

/// Feed state for one view.
#[derive(Debug, Clone)]
pub struct ImageFeed {
    query: Option<FeedQuery>,
    page_size: PageSize,
    next_page: PageNumber,
    images: Vec<FeedImage>,
    positions: HashMap<String, usize>,
    status: FeedStatus,
    generation: u64,
}

impl ImageFeed {
    /// Empty feed for `query`, starting at page 1.
    pub fn new(query: Option<FeedQuery>, page_size: PageSize) -> Self {
        Self {
            query,
            page_size,
            next_page: PageNumber::FIRST,
            images: Vec::new(),
            positions: HashMap::new(),
            status: FeedStatus::Idle,
            generation: 0,
        }
    }

    /// Start at `page` instead of page 1.
    pub fn starting_at(mut self, page: PageNumber) -> Self {
        self.next_page = page;
        self
    }

    /// Current query.
    pub fn query(&self) -> Option<&FeedQuery> {
        self.query.as_ref()
    }

    /// Merged images in first-seen order.
    pub fn images(&self) -> &[FeedImage] {
        &self.images
    }

    /// Current status.
    pub fn status(&self) -> FeedStatus {
        self.status
    }

    /// Page the next fetch will request.
    pub fn next_page(&self) -> PageNumber {
        self.next_page
    }

    /// Switch to `query`. A different query clears the images, resets to
    /// page 1 and invalidates any fetch in flight. Returns whether anything
    /// changed.
    pub fn set_query(&mut self, query: Option<FeedQuery>) -> bool {
        if self.query == query {
            return false;
        }
        debug!(query = ?query, "feed query changed");
        self.query = query;
        self.next_page = PageNumber::FIRST;
        self.images.clear();
        self.positions.clear();
        self.status = FeedStatus::Idle;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Claim the next page. Returns `None` while a fetch is in flight or once
    /// the feed is exhausted.
    pub fn begin_fetch(&mut self) -> Option<PendingFetch> {
        if self.status != FeedStatus::Idle {
            return None;
        }
        self.status = FeedStatus::Loading;
        Some(PendingFetch {
            generation: self.generation,
            request: FeedRequest {
                query: self.query.clone(),
                page: PageRequest::new(self.next_page, self.page_size),
            },
        })
    }

    /// Merge the outcome of `pending`.
    pub fn complete(
        &mut self,
        pending: PendingFetch,
        result: Result<Vec<FeedImage>, ImageSourceError>,
    ) -> FeedUpdate {
        if pending.generation != self.generation {
            debug!(page = %pending.request.page.page, "dropping stale feed page");
            return FeedUpdate::Stale;
        }
        let page = pending.request.page.page;
        match result {
            Err(err) => {
                warn!(page = %page, error = %err, "feed page fetch failed");
                self.status = FeedStatus::Idle;
                FeedUpdate::FetchFailed {
                    page,
                    message: err.to_string(),
                }
            }
            Ok(batch) if batch.is_empty() => {
                debug!(page = %page, "feed exhausted");
                self.status = FeedStatus::Exhausted;
                FeedUpdate::Exhausted
            }
            Ok(batch) => {
                let (added, replaced) = self.merge(batch);
                self.status = match page.next() {
                    Some(next) => {
                        self.next_page = next;
                        FeedStatus::Idle
                    }
                    None => FeedStatus::Exhausted,
                };
                FeedUpdate::Page {
                    page,
                    added,
                    replaced,
                }
            }
        }
    }

    /// Fetch and merge the next page in one step.
    ///
    /// Returns `None` when no fetch could be started.
    pub async fn advance<S>(&mut self, source: &S) -> Option<FeedUpdate>
    where
        S: ImageSource + ?Sized,
    {
        let pending = self.begin_fetch()?;
        let result = source.fetch_page(pending.request()).await;
        Some(self.complete(pending, result))
    }

    fn merge(&mut self, batch: Vec<FeedImage>) -> (Vec<FeedImage>, Vec<FeedImage>) {
        let mut added = Vec::new();
        let mut replaced = Vec::new();
        for image in batch {
            match self.positions.get(&image.id) {
                Some(&index) => {
                    if let Some(slot) = self.images.get_mut(index) {
                        *slot = image.clone();
                    }
                    replaced.push(image);
                }
                None => {
                    self.positions.insert(image.id.clone(), self.images.len());
                    self.images.push(image.clone());
                    added.push(image);
                }
            }
        }
        (added, replaced)
    }
}
