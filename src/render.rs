//! Static HTML rendering of a gallery session.
//!
//! Produces one self-contained page: header with category pills and the
//! region dropdown, the masonry grid, a lightbox per item, loading and empty
//! states, and the footer.
//!
//! ## Masonry in static HTML
//!
//! The greedy column assignment depends on the column count, which depends
//! on the viewport width. The page therefore carries one pre-assigned grid per
//! distinct column count the breakpoints can produce, and generated media
//! queries show exactly one of them:
//!
//! ```text
//! ≥1280px      .masonry-5
//! 1024–1279px  .masonry-4
//! 768–1023px   .masonry-3
//! 640–767px    .masonry-2
//! <640px       .masonry-1
//! ```
//!
//! With `css_columns` the page instead carries a single grid in source order
//! and leaves column flow to CSS `column-count`.
//!
//! ## Lightbox
//!
//! Each item links to `#photo-{id}`; the matching overlay is shown with the
//! CSS `:target` selector, so the page needs no JavaScript.
//!
//! Uses [maud](https://maud.lambda.xyz/) for templating, which escapes all
//! interpolated text.

use crate::config::{self, AppConfig, LabelsConfig, LayoutConfig};
use crate::feed::FeedStatus;
use crate::filter::{FilterState, Navigation};
use crate::masonry::{self, ColumnAssignment};
use crate::session::GallerySession;
use crate::types::GalleryItem;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Flow items with CSS columns instead of the greedy assignment.
    pub css_columns: bool,
}

/// Render the full page for the current state of `session`.
pub fn render_gallery(
    session: &GallerySession,
    config: &AppConfig,
    options: RenderOptions,
) -> Markup {
    let labels = &config.labels;
    let layout = session.layout().config();
    let css = format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        layout_css(layout, options.css_columns),
        CSS_STATIC
    );
    let feed = session.feed();

    if feed.status() == FeedStatus::Loading {
        return base_document(&labels.site_title, &css, loading_screen(&labels.loading));
    }

    let nav = render_filters(session.navigation(), session.filter(), labels);
    let content = html! {
        (site_header(&labels.site_title, nav))
        main.gallery {
            @if feed.status() == FeedStatus::Empty {
                (empty_state(&labels.empty))
            } @else if options.css_columns {
                div.masonry-flow {
                    @for item in feed.items() {
                        (render_item(item))
                    }
                }
            } @else {
                @for (_, columns) in masonry::breakpoint_columns(layout) {
                    (render_masonry(&masonry::assign(feed.items(), columns, layout)))
                }
            }
        }
        @if feed.is_loading_more() {
            div.load-more {
                div.spinner.small {}
            }
        }
        (render_lightboxes(feed.items()))
        footer.site-footer {
            p { (labels.footer) }
        }
    };

    base_document(&labels.site_title, &css, content)
}

/// Write a rendered page, creating parent directories as needed.
pub fn write_gallery(path: &Path, page: &Markup) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &page.0)?;
    info!(path = %path.display(), "gallery written");
    Ok(())
}

// ============================================================================
// Layout CSS
// ============================================================================

/// Media-query CSS selecting the grid for each width range.
pub fn layout_css(layout: &LayoutConfig, css_columns: bool) -> String {
    let gap = layout.gap;
    let mut rules = Vec::new();
    if css_columns {
        rules.push(format!(".masonry-flow {{ column-gap: {gap}px; }}"));
        rules.push(format!(".masonry-flow .gallery-item {{ margin-bottom: {gap}px; }}"));
    } else {
        rules.push(format!(".masonry, .masonry-column {{ gap: {gap}px; }}"));
    }

    for (min, max, columns) in width_ranges(layout) {
        let rule = if css_columns {
            format!(".masonry-flow {{ column-count: {columns}; }}")
        } else {
            format!(".masonry-{columns} {{ display: flex; }}")
        };
        rules.push(match media_query(min, max) {
            Some(query) => format!("@media {query} {{ {rule} }}"),
            None => rule,
        });
    }
    rules.join("\n")
}

/// `(min, max, columns)` per breakpoint, widest first, closed off with the
/// single-column range below the narrowest breakpoint.
fn width_ranges(layout: &LayoutConfig) -> Vec<(Option<u32>, Option<u32>, usize)> {
    let mut ranges = Vec::new();
    let mut upper = None;
    for [min_width, columns] in &layout.breakpoints {
        let columns = (*columns as usize).max(1);
        if *min_width == 0 {
            ranges.push((None, upper, columns));
            return ranges;
        }
        ranges.push((Some(*min_width), upper, columns));
        upper = Some(min_width - 1);
    }
    ranges.push((None, upper, 1));
    ranges
}

fn media_query(min: Option<u32>, max: Option<u32>) -> Option<String> {
    match (min, max) {
        (None, None) => None,
        (Some(min), None) => Some(format!("(min-width: {min}px)")),
        (None, Some(max)) => Some(format!("(max-width: {max}px)")),
        (Some(min), Some(max)) => Some(format!(
            "(min-width: {min}px) and (max-width: {max}px)"
        )),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="id" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(title: &str, filters: Markup) -> Markup {
    html! {
        header.site-header {
            div.site-header-inner {
                a.brand href="?" {
                    span.brand-mark { (initials(title)) }
                    h1.brand-title { (title) }
                }
                nav.filters {
                    (filters)
                }
            }
        }
    }
}

/// Up to two initials for the logo mark.
fn initials(title: &str) -> String {
    title
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Query string for a filter selection. Unfiltered links to `?`.
fn filter_href(filter: FilterState) -> String {
    let mut params = Vec::new();
    if let Some(category) = filter.category {
        params.push(format!("category={category}"));
    }
    if let Some(region) = filter.region {
        params.push(format!("region={region}"));
    }
    format!("?{}", params.join("&"))
}

/// Region dropdown and category pills.
pub fn render_filters(nav: &Navigation, selected: FilterState, labels: &LabelsConfig) -> Markup {
    let with_region = |region| FilterState { region, ..selected };
    let with_category = |category| FilterState { category, ..selected };

    html! {
        details.region-filter {
            summary { (nav.region_label(selected.region, &labels.all_regions)) }
            ul {
                li.current[selected.region.is_none()] {
                    a href=(filter_href(with_region(None))) { (labels.all_regions) }
                }
                @for region in nav.regions.iter() {
                    li.current[selected.region == Some(region.id)] {
                        a href=(filter_href(with_region(Some(region.id)))) { (region.name) }
                    }
                }
            }
        }
        div.category-pills {
            a.pill.current[selected.category.is_none()] href=(filter_href(with_category(None))) {
                (labels.all_categories)
            }
            @for category in &nav.categories {
                a.pill.current[selected.category == Some(category.id)]
                    href=(filter_href(with_category(Some(category.id)))) {
                    (category.name)
                }
            }
        }
    }
}

fn render_masonry(assignment: &ColumnAssignment<'_>) -> Markup {
    html! {
        div class={ "masonry masonry-" (assignment.column_count()) } {
            @for column in &assignment.columns {
                div.masonry-column {
                    @for placement in column {
                        (render_item(placement.item))
                    }
                }
            }
        }
    }
}

fn render_item(item: &GalleryItem) -> Markup {
    html! {
        article.gallery-item data-id=(item.id) {
            a.item-link href={ "#photo-" (item.id) } {
                (render_image(item))
                @if !item.categories.is_empty() {
                    div.item-overlay {
                        @for category in &item.categories {
                            span.category-tag { (category.name) }
                        }
                    }
                }
            }
            @if let Some(caption) = item.caption_text() {
                p.item-caption { (caption) }
            }
        }
    }
}

fn render_image(item: &GalleryItem) -> Markup {
    let alt = item.caption_text().unwrap_or("Gallery image");
    html! {
        @if let Some(src) = &item.image {
            img src=(src) alt=(alt) loading="lazy";
        } @else {
            div.no-image { "No image" }
        }
    }
}

/// One overlay per distinct item id.
fn render_lightboxes(items: &[GalleryItem]) -> Markup {
    let mut seen = HashSet::new();
    html! {
        @for item in items.iter().filter(|i| seen.insert(i.id)) {
            div.lightbox id={ "photo-" (item.id) } {
                a.lightbox-backdrop href="#_" aria-label="Close" {}
                div.lightbox-frame {
                    a.lightbox-close href="#_" aria-label="Close" { "×" }
                    (render_image(item))
                }
            }
        }
    }
}

fn loading_screen(label: &str) -> Markup {
    html! {
        div.loading-screen {
            div.spinner {}
            p { (label) }
        }
    }
}

fn empty_state(label: &str) -> Markup {
    html! {
        div.empty-state {
            div.empty-icon { "🖼" }
            p { (label) }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
