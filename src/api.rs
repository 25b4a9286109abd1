//! Remote gallery service client.
//!
//! The service is consumed, not implemented, here. [`GalleryApi`] is the seam
//! the rest of the crate depends on; [`HttpGalleryApi`] implements it over
//! reqwest.
//!
//! ## Endpoints
//!
//! ```text
//! GET /api/galleries/paginated?page=N&limit=N[&categoryId=N][&regionId=N]
//! GET /api/galleries
//! GET /api/galleries/categories/all
//! GET /api/regions
//! ```
//!
//! Every response is wrapped in `{ message, data, pagination? }`. Regions come
//! back as `{regionId, regionName}` and are remapped to [`Region`].
//!
//! ## Freshness
//!
//! Requests always bypass caches (`Cache-Control: no-store`). No
//! authentication headers are sent.
//!
//! ## Failures
//!
//! Trait methods return [`ApiError`]. Callers that must never fail (the feed
//! loader, navigation bootstrap) go through the `*_or_empty` helpers, which
//! log the error and substitute an empty result.

use crate::config::ApiConfig;
use crate::filter::FilterState;
use crate::types::{ApiResponse, Category, GalleryItem, Page, Pagination, Region, RegionRecord};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

pub const PAGINATED_PATH: &str = "/api/galleries/paginated";
pub const GALLERIES_PATH: &str = "/api/galleries";
pub const CATEGORIES_PATH: &str = "/api/galleries/categories/all";
pub const REGIONS_PATH: &str = "/api/regions";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid service URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Read access to the remote gallery service.
#[async_trait]
pub trait GalleryApi: Send + Sync {
    /// One page of gallery items, optionally filtered.
    async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        filter: FilterState,
    ) -> Result<Page, ApiError>;

    /// The full, unpaginated listing.
    async fn fetch_all(&self) -> Result<Vec<GalleryItem>, ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn fetch_regions(&self) -> Result<Vec<Region>, ApiError>;
}

/// Fetch a page, degrading any failure to an empty terminal page.
pub async fn page_or_empty<A: GalleryApi + ?Sized>(
    api: &A,
    page: u32,
    limit: u32,
    filter: FilterState,
) -> Page {
    match api.fetch_page(page, limit, filter).await {
        Ok(result) => result,
        Err(e) => {
            error!(page, limit, ?filter, error = %e, "error fetching galleries");
            Page::empty(page, limit)
        }
    }
}

/// Fetch categories, degrading any failure to an empty list.
pub async fn categories_or_empty<A: GalleryApi + ?Sized>(api: &A) -> Vec<Category> {
    api.fetch_categories().await.unwrap_or_else(|e| {
        error!(error = %e, "error fetching categories");
        Vec::new()
    })
}

/// Fetch regions, degrading any failure to an empty list.
pub async fn regions_or_empty<A: GalleryApi + ?Sized>(api: &A) -> Vec<Region> {
    api.fetch_regions().await.unwrap_or_else(|e| {
        error!(error = %e, "error fetching regions");
        Vec::new()
    })
}

/// Fetch the unpaginated listing, degrading any failure to an empty list.
pub async fn galleries_or_empty<A: GalleryApi + ?Sized>(api: &A) -> Vec<GalleryItem> {
    api.fetch_all().await.unwrap_or_else(|e| {
        error!(error = %e, "error fetching galleries");
        Vec::new()
    })
}

/// Headers sent with every request.
fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Query parameters for a page request. Unset filters are omitted; an id of
/// zero counts as unset.
fn page_query(page: u32, limit: u32, filter: FilterState) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
    if let Some(id) = filter.category.filter(|id| *id != 0) {
        query.push(("categoryId", id.to_string()));
    }
    if let Some(id) = filter.region.filter(|id| *id != 0) {
        query.push(("regionId", id.to_string()));
    }
    query
}

#[derive(Debug, Clone)]
pub struct HttpGalleryApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGalleryApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(no_store_headers())
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ApiError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        filter: FilterState,
    ) -> Result<Page, ApiError> {
        let query = page_query(page, limit, filter);
        let response: ApiResponse<Vec<GalleryItem>> =
            self.get_json(PAGINATED_PATH, &query).await?;

        // Without pagination metadata the response is the whole result set.
        let pagination = response.pagination.unwrap_or(Pagination {
            page,
            limit,
            total: response.data.len() as u64,
            total_pages: 1,
            has_more: false,
        });
        debug!(
            page,
            received = response.data.len(),
            has_more = pagination.has_more,
            "page fetched"
        );
        Ok(Page {
            items: response.data,
            pagination,
        })
    }

    async fn fetch_all(&self) -> Result<Vec<GalleryItem>, ApiError> {
        let response: ApiResponse<Vec<GalleryItem>> = self.get_json(GALLERIES_PATH, &[]).await?;
        Ok(response.data)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response: ApiResponse<Vec<Category>> = self.get_json(CATEGORIES_PATH, &[]).await?;
        Ok(response.data)
    }

    async fn fetch_regions(&self) -> Result<Vec<Region>, ApiError> {
        let response: ApiResponse<Vec<RegionRecord>> = self.get_json(REGIONS_PATH, &[]).await?;
        Ok(response.data.into_iter().map(Region::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{item_json, page_body, region};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn api_for(server: &Server) -> HttpGalleryApi {
        HttpGalleryApi::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn page_query_omits_unset_filters() {
        let query = page_query(2, 30, FilterState::default());
        assert_eq!(
            query,
            vec![("page", "2".to_string()), ("limit", "30".to_string())]
        );
    }

    #[test]
    fn page_query_includes_filters() {
        let query = page_query(1, 30, FilterState::new(Some(4), Some(9)));
        assert!(query.contains(&("categoryId", "4".to_string())));
        assert!(query.contains(&("regionId", "9".to_string())));
    }

    #[test]
    fn page_query_treats_zero_as_unset() {
        let query = page_query(1, 30, FilterState::new(Some(0), Some(0)));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = HttpGalleryApi::new("::nope::", Duration::from_secs(1));
        assert!(matches!(result, Err(ApiError::Url(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpGalleryApi::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn fetch_page_sends_filters_and_no_store() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", PAGINATED_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("limit".into(), "30".into()),
                Matcher::UrlEncoded("categoryId".into(), "2".into()),
                Matcher::UrlEncoded("regionId".into(), "5".into()),
            ]))
            .match_header("cache-control", "no-store")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page_body(1..=3, 1, 30, 3, false).to_string())
            .create_async()
            .await;

        let page = api_for(&server)
            .fetch_page(1, 30, FilterState::new(Some(2), Some(5)))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.pagination.total, 3);
        assert!(!page.pagination.has_more);
    }

    #[tokio::test]
    async fn fetch_page_without_pagination_defaults_to_single_page() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", PAGINATED_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"message": "ok", "data": [item_json(1), item_json(2)]}).to_string())
            .create_async()
            .await;

        let page = api_for(&server)
            .fetch_page(1, 30, FilterState::default())
            .await
            .unwrap();
        assert_eq!(
            page.pagination,
            Pagination {
                page: 1,
                limit: 30,
                total: 2,
                total_pages: 1,
                has_more: false,
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", PAGINATED_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = api_for(&server)
            .fetch_page(1, 30, FilterState::default())
            .await;
        assert!(matches!(result, Err(ApiError::Status { status, .. }) if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn malformed_body_is_malformed_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", CATEGORIES_PATH)
            .with_status(200)
            .with_body(r#"{"message": "ok", "data": "not a list"}"#)
            .create_async()
            .await;

        let result = api_for(&server).fetch_categories().await;
        assert!(matches!(result, Err(ApiError::Malformed { .. })));
    }

    #[tokio::test]
    async fn page_or_empty_degrades_on_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", PAGINATED_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let page = page_or_empty(&api_for(&server), 2, 30, FilterState::default()).await;
        assert_eq!(page, Page::empty(2, 30));
    }

    #[tokio::test]
    async fn page_or_empty_degrades_on_network_error() {
        // Nothing listens on port 9 locally.
        let api = HttpGalleryApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let page = page_or_empty(&api, 1, 30, FilterState::default()).await;
        assert!(page.items.is_empty());
        assert!(!page.pagination.has_more);
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn regions_are_remapped() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", REGIONS_PATH)
            .with_status(200)
            .with_body(
                json!({
                    "message": "ok",
                    "data": [
                        {"regionId": 1, "regionName": "Aceh"},
                        {"regionId": 2, "regionName": "Bali"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let regions = api_for(&server).fetch_regions().await.unwrap();
        assert_eq!(
            regions,
            vec![region(1, "Aceh"), region(2, "Bali")]
        );
    }

    #[tokio::test]
    async fn categories_or_empty_degrades() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", CATEGORIES_PATH)
            .with_status(404)
            .create_async()
            .await;

        assert!(categories_or_empty(&api_for(&server)).await.is_empty());
    }

    #[tokio::test]
    async fn listings_degrade_on_malformed_body() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for path in [REGIONS_PATH, GALLERIES_PATH] {
            mocks.push(
                server
                    .mock("GET", path)
                    .with_status(200)
                    .with_body("<html>maintenance</html>")
                    .create_async()
                    .await,
            );
        }

        let api = api_for(&server);
        assert!(regions_or_empty(&api).await.is_empty());
        assert!(galleries_or_empty(&api).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_returns_listing() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", GALLERIES_PATH)
            .with_status(200)
            .with_body(json!({"message": "ok", "data": [item_json(5)]}).to_string())
            .create_async()
            .await;

        let items = galleries_or_empty(&api_for(&server)).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 5);
    }
}
