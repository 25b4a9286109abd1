//! Gallery session: one explicit state object for the whole page.
//!
//! [`GallerySession`] owns the navigation data, the current filter, the
//! feed, the scroll sentinel and the masonry layout, and exposes the events a
//! front end produces (filter clicks, sentinel visibility, resizes) as update
//! methods. Methods that need a fetch hand back a [`FetchTicket`]; the caller
//! performs the fetch and returns the page through [`GallerySession::apply`].
//!
//! [`GalleryController`] is that caller for a [`GalleryApi`]: it drives the
//! session over async fetches, which is what the CLI uses.

use crate::api::{self, GalleryApi};
use crate::config::LayoutConfig;
use crate::feed::{FeedLoader, FeedState, FetchTicket, Settled};
use crate::filter::{FilterState, Navigation};
use crate::masonry::{ColumnAssignment, MasonryLayout};
use crate::sentinel::Sentinel;
use crate::types::{Category, Page, Region};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct GallerySession {
    navigation: Navigation,
    filter: FilterState,
    feed: FeedState,
    sentinel: Sentinel<u64>,
    layout: MasonryLayout,
}

impl GallerySession {
    pub fn new(layout: LayoutConfig, width: u32) -> Self {
        Self {
            navigation: Navigation::default(),
            filter: FilterState::default(),
            feed: FeedState::new(),
            sentinel: Sentinel::new(),
            layout: MasonryLayout::new(layout, width),
        }
    }

    /// Start out filtered. Takes effect at [`start`](Self::start).
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn sentinel(&self) -> &Sentinel<u64> {
        &self.sentinel
    }

    pub fn layout(&self) -> &MasonryLayout {
        &self.layout
    }

    /// Install the category list and region table.
    pub fn set_navigation(&mut self, categories: Vec<Category>, regions: Vec<Region>) {
        self.navigation = Navigation::new(categories, regions);
    }

    /// First load under the current filter.
    pub fn start(&mut self) -> FetchTicket {
        self.restart()
    }

    pub fn select_category(&mut self, category: Option<u64>) -> Option<FetchTicket> {
        self.filter
            .set_category(category)
            .then(|| self.restart())
    }

    pub fn select_region(&mut self, region: Option<u64>) -> Option<FetchTicket> {
        self.filter.set_region(region).then(|| self.restart())
    }

    pub fn clear_filters(&mut self) -> Option<FetchTicket> {
        self.filter.clear().then(|| self.restart())
    }

    /// Visibility report for the item with id `target`.
    ///
    /// Returns a next-page ticket when the sentinel fires.
    pub fn on_visible(&mut self, target: u64, visible: bool) -> Option<FetchTicket> {
        let ready = self.feed.can_load_more();
        if self.sentinel.notify(&target, visible, ready) {
            self.feed.begin_next_page()
        } else {
            None
        }
    }

    /// Hand back a fetched page. The sentinel moves to the new last item.
    pub fn apply(&mut self, ticket: FetchTicket, page: Page) -> Settled {
        let settled = self.feed.settle(ticket, page);
        if let Settled::Applied { added } = settled {
            debug!(page = ticket.page, added, total = self.feed.len(), "page applied");
            match self.feed.last() {
                Some(last) => self.sentinel.attach(last.id),
                None => self.sentinel.detach(),
            }
        }
        settled
    }

    /// Viewport resize. Returns whether the column count changed.
    pub fn resize(&mut self, width: u32) -> bool {
        self.layout.resize(width)
    }

    /// Masonry assignment of the current feed at the current width.
    pub fn assignment(&mut self) -> ColumnAssignment<'_> {
        self.layout.compute(self.feed.items(), self.feed.generation())
    }

    fn restart(&mut self) -> FetchTicket {
        self.sentinel.detach();
        self.feed.reset(self.filter)
    }
}

/// Drives a [`GallerySession`] against a [`GalleryApi`].
pub struct GalleryController<A> {
    loader: FeedLoader<A>,
    session: GallerySession,
}

impl<A: GalleryApi> GalleryController<A> {
    pub fn new(api: A, page_size: u32, session: GallerySession) -> Self {
        Self {
            loader: FeedLoader::new(api, page_size),
            session,
        }
    }

    pub fn session(&self) -> &GallerySession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GallerySession {
        &mut self.session
    }

    pub fn into_session(self) -> GallerySession {
        self.session
    }

    /// Load categories, regions and the first page concurrently.
    pub async fn start(&mut self) -> Settled {
        let ticket = self.session.start();
        let api = self.loader.api();
        let (categories, regions, page) = tokio::join!(
            api::categories_or_empty(api),
            api::regions_or_empty(api),
            self.loader.load(ticket.page, ticket.filter),
        );
        info!(
            categories = categories.len(),
            regions = regions.len(),
            "navigation loaded"
        );
        self.session.set_navigation(categories, regions);
        self.session.apply(ticket, page)
    }

    pub async fn select_category(&mut self, category: Option<u64>) -> Option<Settled> {
        let ticket = self.session.select_category(category)?;
        Some(self.fetch(ticket).await)
    }

    pub async fn select_region(&mut self, region: Option<u64>) -> Option<Settled> {
        let ticket = self.session.select_region(region)?;
        Some(self.fetch(ticket).await)
    }

    pub async fn clear_filters(&mut self) -> Option<Settled> {
        let ticket = self.session.clear_filters()?;
        Some(self.fetch(ticket).await)
    }

    /// Report the last item as visible and load the page that triggers.
    pub async fn reveal_last(&mut self) -> Option<Settled> {
        let target = self.session.feed().last()?.id;
        let ticket = self.session.on_visible(target, true)?;
        Some(self.fetch(ticket).await)
    }

    /// Keep revealing the last item until the feed is exhausted or
    /// `max_pages` extra pages were loaded. Returns the number loaded.
    pub async fn scroll_to_end(&mut self, max_pages: Option<u32>) -> u32 {
        let mut loaded = 0;
        while max_pages.is_none_or(|max| loaded < max) {
            if self.reveal_last().await.is_none() {
                break;
            }
            loaded += 1;
        }
        loaded
    }

    async fn fetch(&mut self, ticket: FetchTicket) -> Settled {
        let page = self.loader.load(ticket.page, ticket.filter).await;
        self.session.apply(ticket, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedStatus;
    use crate::test_helpers::{StubApi, ids, page};

    fn session() -> GallerySession {
        GallerySession::new(LayoutConfig::default(), 1280)
    }

    fn controller(total: u64) -> GalleryController<StubApi> {
        GalleryController::new(StubApi::new(total), 30, session())
    }

    #[test]
    fn sentinel_follows_last_item() {
        let mut s = session();
        let ticket = s.start();
        assert!(s.sentinel().target().is_none());
        s.apply(ticket, page(1..=30, 1, 30, true));
        assert_eq!(s.sentinel().target(), Some(&30));

        let next = s.on_visible(30, true).unwrap();
        assert_eq!(next.page, 2);
        // Already fired for this attachment and a page is in flight.
        assert!(s.on_visible(30, true).is_none());

        s.apply(next, page(31..=40, 2, 30, false));
        assert_eq!(s.sentinel().target(), Some(&40));
        assert!(s.on_visible(40, true).is_none());
    }

    #[test]
    fn stale_item_visibility_is_ignored() {
        let mut s = session();
        let ticket = s.start();
        s.apply(ticket, page(1..=30, 1, 30, true));
        assert!(s.on_visible(12, true).is_none());
        assert!(s.on_visible(30, false).is_none());
        assert!(s.on_visible(30, true).is_some());
    }

    #[test]
    fn filter_change_detaches_and_resets() {
        let mut s = session();
        let ticket = s.start();
        s.apply(ticket, page(1..=30, 1, 30, true));
        let stale = s.on_visible(30, true).unwrap();

        let fresh = s.select_category(Some(2)).unwrap();
        assert!(s.sentinel().target().is_none());
        assert!(s.feed().is_empty());
        assert_eq!(s.feed().status(), FeedStatus::Loading);

        assert_eq!(s.apply(stale, page(31..=60, 2, 30, true)), Settled::Stale);
        assert!(s.sentinel().target().is_none());

        s.apply(fresh, page(2001..=2005, 1, 30, false));
        assert_eq!(ids(s.feed().items()), (2001..=2005).collect::<Vec<_>>());
        assert_eq!(s.sentinel().target(), Some(&2005));
    }

    #[test]
    fn initial_filter_applies_on_start() {
        let mut s = session().with_filter(FilterState::new(Some(2), Some(0)));
        let ticket = s.start();
        assert_eq!(ticket.filter, FilterState::new(Some(2), None));
        assert_eq!(s.feed().filter().category, Some(2));
    }

    #[test]
    fn reselecting_same_filter_is_a_no_op() {
        let mut s = session();
        assert!(s.select_region(Some(10)).is_some());
        assert!(s.select_region(Some(10)).is_none());
        assert!(s.clear_filters().is_some());
        assert!(s.clear_filters().is_none());
    }

    #[test]
    fn empty_result_detaches_sentinel() {
        let mut s = session();
        let ticket = s.start();
        s.apply(ticket, page(std::iter::empty(), 1, 30, false));
        assert!(s.sentinel().target().is_none());
        assert_eq!(s.feed().status(), FeedStatus::Empty);
    }

    #[test]
    fn assignment_tracks_resize() {
        let mut s = session();
        let ticket = s.start();
        s.apply(ticket, page(1..=12, 1, 30, false));
        assert_eq!(s.assignment().column_count(), 5);
        assert!(s.resize(700));
        assert_eq!(s.assignment().column_sizes(), vec![6, 6]);
        assert!(!s.resize(720));
    }

    #[test]
    fn assignment_follows_filter_change() {
        let mut s = session();
        let ticket = s.start();
        s.apply(ticket, page([1, 2, 3], 1, 30, false));
        assert_eq!(s.assignment().item_count(), 3);

        let ticket = s.select_category(Some(2)).unwrap();
        s.apply(ticket, page([1, 99, 3], 1, 30, false));
        assert_eq!(s.assignment().columns[1][0].item.id, 99);
        assert_eq!(s.layout().placements(), 6);
    }

    #[tokio::test]
    async fn start_loads_navigation_and_first_page() {
        let mut c = controller(40);
        assert_eq!(c.start().await, Settled::Applied { added: 30 });
        let s = c.session();
        assert_eq!(s.navigation().categories.len(), 2);
        assert_eq!(s.navigation().regions.name(11), Some("Papua"));
        assert_eq!(s.feed().len(), 30);
        assert!(s.feed().has_more());
    }

    #[tokio::test]
    async fn scrolls_thirty_then_ten() {
        let mut c = controller(40);
        c.start().await;
        assert_eq!(c.scroll_to_end(None).await, 1);

        let feed = c.session().feed();
        assert_eq!(feed.len(), 40);
        assert!(!feed.has_more());
        assert_eq!(ids(feed.items()), (1..=40).collect::<Vec<_>>());
        // Further visibility does nothing.
        assert!(c.reveal_last().await.is_none());
    }

    #[tokio::test]
    async fn scroll_respects_page_cap() {
        let mut c = controller(200);
        c.start().await;
        assert_eq!(c.scroll_to_end(Some(2)).await, 2);
        assert_eq!(c.session().feed().len(), 90);
        assert_eq!(c.session().feed().page(), 3);
    }

    #[tokio::test]
    async fn filter_selection_refetches_page_one() {
        let mut c = controller(40);
        c.start().await;
        c.scroll_to_end(None).await;

        assert!(c.select_category(Some(1)).await.is_some());
        let feed = c.session().feed();
        assert_eq!(feed.len(), 30);
        assert_eq!(feed.items()[0].id, 1001);
        assert_eq!(feed.filter(), FilterState::new(Some(1), None));

        assert!(c.select_category(Some(1)).await.is_none());
        assert!(c.select_region(Some(10)).await.is_some());
        assert_eq!(c.session().feed().items()[0].id, 1_001_001);
    }

    #[tokio::test]
    async fn failing_service_shows_empty_state() {
        let mut c = GalleryController::new(StubApi::failing(), 30, session());
        c.start().await;
        let s = c.session();
        assert!(s.navigation().categories.is_empty());
        assert_eq!(s.feed().status(), FeedStatus::Empty);
        assert!(s.sentinel().target().is_none());
    }
}
