//! Paginated feed loading.
//!
//! [`FeedState`] is the accumulated feed plus its pagination bookkeeping. It
//! never performs I/O: a fetch is started by taking a [`FetchTicket`] from the
//! state and finished by handing the ticket back with the fetched [`Page`].
//! [`FeedLoader`] runs that cycle against a [`GalleryApi`].
//!
//! ## Ordering
//!
//! ```text
//! reset(filter)       generation += 1, items cleared, loading = true
//! begin_next_page()   only if has_more and idle; loading_more = true
//! settle(ticket, p)   stale generation → discarded
//!                     page 1 → replace, page N → append
//!                     has_more = p.pagination.has_more
//! ```
//!
//! The generation counter is what lets a filter change supersede a page-N
//! request still in flight for the old filter: when that response finally
//! arrives its ticket no longer matches and it is dropped. `loading_more` is
//! the only guard against duplicate next-page requests; it is set before the
//! request leaves and cleared when the request settles, success or not.

use crate::api::{self, GalleryApi};
use crate::filter::FilterState;
use crate::types::{GalleryItem, Page};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Which in-flight flag a ticket holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Reset,
    More,
}

/// Permission to fetch one page, bound to the feed generation that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
    pub filter: FilterState,
    kind: FetchKind,
}

/// Outcome of handing a fetched page back to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The page was applied; `added` items were replaced in or appended.
    Applied { added: usize },
    /// The ticket belonged to a superseded generation and was ignored.
    Stale,
}

/// Coarse view state, used to pick spinners and the empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Initial or filter-change load in flight.
    Loading,
    /// Items shown, next page in flight.
    LoadingMore,
    /// Nothing loading and nothing to show.
    Empty,
    /// Items shown, more pages available.
    Ready,
    /// Items shown, no more pages.
    Complete,
}

#[derive(Debug, Clone)]
pub struct FeedState {
    items: Vec<GalleryItem>,
    seen: HashSet<u64>,
    page: u32,
    has_more: bool,
    loading: bool,
    loading_more: bool,
    generation: u64,
    filter: FilterState,
    total: Option<u64>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            page: 1,
            has_more: true,
            loading: false,
            loading_more: false,
            generation: 0,
            filter: FilterState::default(),
            total: None,
        }
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item the scroll sentinel should watch.
    pub fn last(&self) -> Option<&GalleryItem> {
        self.items.last()
    }

    /// Page number of the most recently applied page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    /// Whether any fetch for the current generation is outstanding.
    pub fn in_flight(&self) -> bool {
        self.loading || self.loading_more
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    /// Total reported by the service for the current filter, once known.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether a visible sentinel should trigger the next page.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.in_flight()
    }

    pub fn status(&self) -> FeedStatus {
        if self.loading {
            FeedStatus::Loading
        } else if self.items.is_empty() {
            FeedStatus::Empty
        } else if self.loading_more {
            FeedStatus::LoadingMore
        } else if self.has_more {
            FeedStatus::Ready
        } else {
            FeedStatus::Complete
        }
    }

    /// Start over at page 1 under `filter`.
    ///
    /// Clears accumulated items immediately and supersedes every outstanding
    /// ticket.
    pub fn reset(&mut self, filter: FilterState) -> FetchTicket {
        self.generation += 1;
        self.items.clear();
        self.seen.clear();
        self.page = 1;
        self.has_more = true;
        self.loading = true;
        self.loading_more = false;
        self.filter = filter;
        self.total = None;
        debug!(generation = self.generation, ?filter, "feed reset");
        FetchTicket {
            generation: self.generation,
            page: 1,
            filter,
            kind: FetchKind::Reset,
        }
    }

    /// Claim the next page, if more exist and nothing is in flight.
    pub fn begin_next_page(&mut self) -> Option<FetchTicket> {
        if !self.can_load_more() {
            return None;
        }
        self.loading_more = true;
        Some(FetchTicket {
            generation: self.generation,
            page: self.page + 1,
            filter: self.filter,
            kind: FetchKind::More,
        })
    }

    /// Apply a fetched page.
    pub fn settle(&mut self, ticket: FetchTicket, page: Page) -> Settled {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                current = self.generation,
                page = ticket.page,
                "discarding stale page"
            );
            return Settled::Stale;
        }

        let added = page.items.len();
        if ticket.page <= 1 {
            self.items.clear();
            self.seen.clear();
        }
        for item in page.items {
            if !self.seen.insert(item.id) {
                warn!(id = item.id, page = ticket.page, "duplicate gallery item across pages");
            }
            self.items.push(item);
        }

        self.page = ticket.page;
        self.has_more = page.pagination.has_more;
        self.total = Some(page.pagination.total);
        match ticket.kind {
            FetchKind::Reset => self.loading = false,
            FetchKind::More => self.loading_more = false,
        }
        Settled::Applied { added }
    }
}

/// Fetches pages for a [`FeedState`].
pub struct FeedLoader<A> {
    api: A,
    page_size: u32,
}

impl<A: GalleryApi> FeedLoader<A> {
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch `page` under `filter`. Never fails: errors come back as an empty
    /// page with `has_more = false`.
    pub async fn load(&self, page: u32, filter: FilterState) -> Page {
        api::page_or_empty(&self.api, page, self.page_size, filter).await
    }

    /// Fetch the page a ticket grants and settle it into `state`.
    pub async fn run(&self, state: &mut FeedState, ticket: FetchTicket) -> Settled {
        let page = self.load(ticket.page, ticket.filter).await;
        state.settle(ticket, page)
    }

    /// Reset `state` to page 1 under `filter` and load it.
    pub async fn reload(&self, state: &mut FeedState, filter: FilterState) -> Settled {
        let ticket = state.reset(filter);
        self.run(state, ticket).await
    }

    /// Load the next page if the state allows it.
    pub async fn load_more(&self, state: &mut FeedState) -> Option<Settled> {
        let ticket = state.begin_next_page()?;
        Some(self.run(state, ticket).await)
    }
}
