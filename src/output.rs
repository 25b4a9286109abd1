//! CLI output formatting for every command.
//!
//! # Entity Display Contract
//!
//! Every listed entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + display name
//! 2. **Context lines**: indented `Categories:`, `Region:`, `Image:`, etc.
//!
//! # Output Format
//!
//! ## Categories / Regions
//!
//! ```text
//! Categories
//! 001 Budaya (#1, budaya)
//! 002 Alam (#2, alam)
//! ```
//!
//! ## Galleries
//!
//! ```text
//! Galleries (2)
//! 001 Tari Saman
//!     Categories: Budaya
//! ```
//!
//! ## Feed
//!
//! ```text
//! Filter: Budaya / Semua Wilayah
//! 001 Tari Saman
//!     Categories: Budaya
//!     Region: Aceh
//! 002 (#41)
//!     Image: none
//!
//! Loaded 40 of 40 items in 2 pages (complete)
//! ```
//!
//! ## Layout
//!
//! ```text
//! Layout: 1280px → 5 columns
//! Column 1 (8 items, 2592px)
//!     001 Tari Saman
//!     006 Pantai Kuta
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O.

use crate::config::LabelsConfig;
use crate::feed::FeedStatus;
use crate::masonry::ColumnAssignment;
use crate::session::GallerySession;
use crate::types::{Category, GalleryItem, Region, RegionLookup};

const CAPTION_WIDTH: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head.trim_end())
    }
}

/// Format an item line: captioned items show the caption, others their id.
///
/// ```text
/// 001 Tari Saman
/// 002 (#41)
/// ```
fn item_line(index: usize, item: &GalleryItem) -> String {
    match item.caption_text() {
        Some(caption) => format!(
            "{} {}",
            format_index(index),
            truncate(caption.trim(), CAPTION_WIDTH)
        ),
        None => format!("{} (#{})", format_index(index), item.id),
    }
}

fn item_context(item: &GalleryItem, regions: &RegionLookup, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let pad = indent(depth);
    if !item.categories.is_empty() {
        lines.push(format!("{pad}Categories: {}", item.category_names().join(", ")));
    }
    if let Some(region) = item.region_label(regions) {
        lines.push(format!("{pad}Region: {region}"));
    }
    if item.image.is_none() {
        lines.push(format!("{pad}Image: none"));
    }
    lines
}

// ============================================================================
// Navigation
// ============================================================================

pub fn format_categories(categories: &[Category]) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    if categories.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, category) in categories.iter().enumerate() {
        lines.push(format!(
            "{} {} (#{}, {})",
            format_index(i + 1),
            category.name,
            category.id,
            category.slug
        ));
    }
    lines
}

pub fn print_categories(categories: &[Category]) {
    for line in format_categories(categories) {
        println!("{line}");
    }
}

pub fn format_regions<'a>(regions: impl IntoIterator<Item = &'a Region>) -> Vec<String> {
    let mut lines = vec!["Regions".to_string()];
    for (i, region) in regions.into_iter().enumerate() {
        lines.push(format!("{} {} (#{})", format_index(i + 1), region.name, region.id));
    }
    if lines.len() == 1 {
        lines.push(format!("{}(none)", indent(1)));
    }
    lines
}

pub fn print_regions<'a>(regions: impl IntoIterator<Item = &'a Region>) {
    for line in format_regions(regions) {
        println!("{line}");
    }
}

pub fn format_galleries(items: &[GalleryItem], regions: &RegionLookup) -> Vec<String> {
    let mut lines = vec![format!("Galleries ({})", items.len())];
    for (i, item) in items.iter().enumerate() {
        lines.push(item_line(i + 1, item));
        lines.extend(item_context(item, regions, 1));
    }
    lines
}

pub fn print_galleries(items: &[GalleryItem], regions: &RegionLookup) {
    for line in format_galleries(items, regions) {
        println!("{line}");
    }
}

// ============================================================================
// Feed
// ============================================================================

pub fn format_feed(session: &GallerySession, labels: &LabelsConfig) -> Vec<String> {
    let nav = session.navigation();
    let filter = session.filter();
    let feed = session.feed();

    let mut lines = vec![format!(
        "Filter: {} / {}",
        nav.category_label(filter.category, &labels.all_categories),
        nav.region_label(filter.region, &labels.all_regions)
    )];

    for (i, item) in feed.items().iter().enumerate() {
        lines.push(item_line(i + 1, item));
        lines.extend(item_context(item, &nav.regions, 1));
    }

    let state = match feed.status() {
        FeedStatus::Loading => "loading",
        FeedStatus::LoadingMore => "loading more",
        FeedStatus::Empty => "no items",
        FeedStatus::Ready => "more available",
        FeedStatus::Complete => "complete",
    };
    let total = feed
        .total()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    let pages = if feed.is_empty() { 0 } else { feed.page() };
    lines.push(String::new());
    lines.push(format!(
        "Loaded {} of {} items in {} {} ({})",
        feed.len(),
        total,
        pages,
        if pages == 1 { "page" } else { "pages" },
        state
    ));
    lines
}

pub fn print_feed(session: &GallerySession, labels: &LabelsConfig) {
    for line in format_feed(session, labels) {
        println!("{line}");
    }
}

// ============================================================================
// Layout
// ============================================================================

pub fn format_layout(assignment: &ColumnAssignment<'_>, width: u32) -> Vec<String> {
    let mut lines = vec![format!(
        "Layout: {}px → {} columns",
        width,
        assignment.column_count()
    )];
    for (c, column) in assignment.columns.iter().enumerate() {
        lines.push(format!(
            "Column {} ({} items, {}px)",
            c + 1,
            column.len(),
            assignment.heights[c]
        ));
        for placement in column {
            lines.push(format!(
                "{}{}",
                indent(1),
                item_line(placement.index + 1, placement.item)
            ));
        }
    }
    lines
}

pub fn print_layout(assignment: &ColumnAssignment<'_>, width: u32) {
    for line in format_layout(assignment, width) {
        println!("{line}");
    }
}
