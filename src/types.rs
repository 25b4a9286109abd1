//! Shared data model for the gallery feed.
//!
//! These types mirror the JSON returned by the remote gallery service and are
//! shared by the API client, the feed loader, the layout engine and the
//! renderer. Field names follow Rust conventions; serde renames map them to
//! the service's camelCase wire format.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A photo category. Flat, non-hierarchical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// A geographic region. Flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub name: String,
}

/// Region as served by `/api/regions`.
///
/// The service uses `regionId` / `regionName`; everything past the API layer
/// works with [`Region`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    pub region_id: u64,
    pub region_name: String,
}

impl From<RegionRecord> for Region {
    fn from(record: RegionRecord) -> Self {
        Self {
            id: record.region_id,
            name: record.region_name,
        }
    }
}

/// One photo in the feed. Immutable once fetched, identified by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: u64,
    /// Image URL. `None` means no image is available for this entry.
    #[serde(rename = "s3Path", default)]
    pub image: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub region_id: Option<u64>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub gallery_date: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    /// `None` when absent or in a format [`parse_timestamp`] does not know.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parse a service timestamp: RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS`
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Unparseable or missing timestamps become `None` instead of failing the item.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

impl GalleryItem {
    /// Caption worth showing: blank captions count as none.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn category_ids(&self) -> Vec<u64> {
        self.categories.iter().map(|c| c.id).collect()
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Region display name, preferring the embedded region over the lookup.
    pub fn region_label<'a>(&'a self, regions: &'a RegionLookup) -> Option<&'a str> {
        self.region
            .as_ref()
            .map(|r| r.name.as_str())
            .or(self.region_name.as_deref())
            .or_else(|| self.region_id.and_then(|id| regions.name(id)))
    }
}

/// Pagination metadata attached to a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_more: bool,
}

impl Pagination {
    /// Terminal metadata used when a fetch fails: nothing here, nothing more.
    pub fn exhausted(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            total: 0,
            total_pages: 0,
            has_more: false,
        }
    }
}

/// A batch of gallery items plus its pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<GalleryItem>,
    pub pagination: Pagination,
}

impl Page {
    /// The degraded result of a failed fetch.
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::exhausted(page, limit),
        }
    }
}

/// Envelope shared by every service response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Id-keyed region table.
///
/// Regions are owned by navigation; gallery items only refer to them by id.
#[derive(Debug, Clone, Default)]
pub struct RegionLookup {
    by_id: BTreeMap<u64, Region>,
    order: Vec<u64>,
}

impl RegionLookup {
    pub fn new(regions: Vec<Region>) -> Self {
        let mut lookup = Self::default();
        for region in regions {
            if lookup.by_id.insert(region.id, region.clone()).is_none() {
                lookup.order.push(region.id);
            }
        }
        lookup
    }

    pub fn get(&self, id: u64) -> Option<&Region> {
        self.by_id.get(&id)
    }

    pub fn name(&self, id: u64) -> Option<&str> {
        self.get(id).map(|r| r.name.as_str())
    }

    /// Regions in the order the service listed them.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
