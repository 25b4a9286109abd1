//! # Gallery Feed
//!
//! Client for a remote photo gallery service: an infinitely scrolling,
//! filterable image feed laid out as a masonry grid.
//!
//! # Architecture: Fetch, Accumulate, Lay Out
//!
//! ```text
//! 1. Fetch       api        →  Page        (paginated HTTP, degrades on failure)
//! 2. Accumulate  feed       →  FeedState   (replace on page 1, append after)
//! 3. Lay out     masonry    →  columns     (greedy shortest-column assignment)
//! ```
//!
//! The [`session`] module ties the stages to user events: filter selections
//! restart the feed at page 1, and the scroll [`sentinel`] on the last item
//! asks for the next page when it becomes visible.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | `GalleryApi` trait, reqwest client, failure degradation |
//! | [`feed`] | Page accumulation with generation-guarded fetch tickets |
//! | [`masonry`] | Greedy column assignment and width breakpoints |
//! | [`sentinel`] | Notify-once visibility trigger for infinite scroll |
//! | [`filter`] | Category / region selection and navigation labels |
//! | [`session`] | Single state object for the page plus its async driver |
//! | [`render`] | Static HTML page via Maud: nav, grid, lightbox, states |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Wire types shared by every module (`GalleryItem`, `Page`, ...) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures Degrade, Never Propagate
//!
//! A failed page fetch becomes an empty page with `has_more = false`; failed
//! navigation fetches become empty lists. The error is logged and the feed
//! simply ends. Only local concerns (config, writing output) return errors.
//!
//! ## Generations Over Cancellation
//!
//! In-flight requests are never cancelled. Every fetch carries the feed
//! generation it was issued under, and a filter change bumps the generation,
//! so a late response for an old filter is recognised and dropped.
//!
//! ## Greedy Layout Is Authoritative
//!
//! Item heights are estimated, not measured, so the assignment is a pure
//! function of item order, column count and config. The same input always
//! yields the same grid, which keeps recomputation on resize or append
//! trivially idempotent.

pub mod api;
pub mod config;
pub mod feed;
pub mod filter;
pub mod masonry;
pub mod output;
pub mod render;
pub mod sentinel;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
