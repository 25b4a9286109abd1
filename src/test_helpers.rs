//! Shared test utilities for the gallery-feed test suite.
//!
//! Provides gallery item builders, JSON bodies in the service's wire format,
//! and [`StubApi`], an in-memory [`GalleryApi`] with a fixed catalogue.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let feed = items(1..=30);
//! let api = StubApi::new(40);
//! let page = api.fetch_page(2, 30, FilterState::default()).await?;
//! assert_eq!(ids(&page.items), (31..=40).collect::<Vec<_>>());
//! ```

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use std::sync::Mutex;

use crate::api::{ApiError, GalleryApi};
use crate::filter::FilterState;
use crate::types::{Category, GalleryItem, Page, Pagination, Region};

// =========================================================================
// Builders
// =========================================================================

pub fn category(id: u64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        slug: name.to_lowercase(),
    }
}

pub fn region(id: u64, name: &str) -> Region {
    Region {
        id,
        name: name.to_string(),
    }
}

/// A gallery item with an image, a caption and one category.
pub fn item(id: u64) -> GalleryItem {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    GalleryItem {
        id,
        image: Some(format!("https://cdn.example.org/{id}.jpg")),
        caption: Some(format!("Photo {id}")),
        region_id: None,
        region_name: None,
        region: None,
        gallery_date: None,
        categories: vec![category(1, "Budaya")],
        created_at: Some(at),
        updated_at: Some(at),
    }
}

pub fn items(ids: impl IntoIterator<Item = u64>) -> Vec<GalleryItem> {
    ids.into_iter().map(item).collect()
}

pub fn ids(items: &[GalleryItem]) -> Vec<u64> {
    items.iter().map(|i| i.id).collect()
}

pub fn page(ids: impl IntoIterator<Item = u64>, page: u32, limit: u32, has_more: bool) -> Page {
    let items = items(ids);
    Page {
        pagination: Pagination {
            page,
            limit,
            total: items.len() as u64,
            total_pages: page,
            has_more,
        },
        items,
    }
}

// =========================================================================
// Wire-format bodies
// =========================================================================

pub fn item_json(id: u64) -> Value {
    json!({
        "id": id,
        "s3Path": format!("https://cdn.example.org/{id}.jpg"),
        "caption": format!("Photo {id}"),
        "regionId": null,
        "regionName": null,
        "categories": [{"id": 1, "name": "Budaya", "slug": "budaya"}],
        "region": null,
        "createdAt": "2025-01-01T00:00:00.000Z",
        "updatedAt": "2025-01-01T00:00:00.000Z"
    })
}

/// A `/api/galleries/paginated` response body.
pub fn page_body(
    ids: impl IntoIterator<Item = u64>,
    page: u32,
    limit: u32,
    total: u64,
    has_more: bool,
) -> Value {
    let data: Vec<Value> = ids.into_iter().map(item_json).collect();
    let total_pages = total.div_ceil(u64::from(limit.max(1)));
    json!({
        "message": "Galleries retrieved successfully",
        "data": data,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
            "hasMore": has_more
        }
    })
}

// =========================================================================
// In-memory service
// =========================================================================

/// In-memory gallery service.
///
/// Holds `total` items per filter combination. Ids are offset by the filter
/// (`category * 1000 + region * 100_000`) so feeds under different filters
/// never share ids. Every call is recorded.
pub struct StubApi {
    total: u64,
    fail: bool,
    pub categories: Vec<Category>,
    pub regions: Vec<Region>,
    calls: Mutex<Vec<(u32, FilterState)>>,
}

impl StubApi {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            fail: false,
            categories: vec![category(1, "Budaya"), category(2, "Alam")],
            regions: vec![region(10, "Aceh"), region(11, "Papua")],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A service whose every request fails with a 500.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    /// Page requests received so far, as `(page, filter)`.
    pub fn calls(&self) -> Vec<(u32, FilterState)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn offset(filter: FilterState) -> u64 {
        filter.category.unwrap_or(0) * 1000 + filter.region.unwrap_or(0) * 100_000
    }

    fn error() -> ApiError {
        ApiError::Status {
            url: "stub://gallery".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
impl GalleryApi for StubApi {
    async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        filter: FilterState,
    ) -> Result<Page, ApiError> {
        self.calls.lock().unwrap().push((page, filter));
        if self.fail {
            return Err(Self::error());
        }
        let offset = Self::offset(filter);
        let start = u64::from(page.saturating_sub(1)) * u64::from(limit);
        let end = (start + u64::from(limit)).min(self.total);
        let items = items((start..end).map(|i| offset + i + 1));
        Ok(Page {
            items,
            pagination: Pagination {
                page,
                limit,
                total: self.total,
                total_pages: self.total.div_ceil(u64::from(limit.max(1))) as u32,
                has_more: end < self.total,
            },
        })
    }

    async fn fetch_all(&self) -> Result<Vec<GalleryItem>, ApiError> {
        if self.fail {
            return Err(Self::error());
        }
        Ok(items(1..=self.total))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        if self.fail {
            return Err(Self::error());
        }
        Ok(self.categories.clone())
    }

    async fn fetch_regions(&self) -> Result<Vec<Region>, ApiError> {
        if self.fail {
            return Err(Self::error());
        }
        Ok(self.regions.clone())
    }
}
