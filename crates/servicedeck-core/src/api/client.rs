//! API client for the users, products and cache services.
//!
//! This module provides the `ApiClient` struct for listing and creating
//! collection records and for the point operations of the cache service.

use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Endpoints;
use crate::models::{CacheEntry, NewProduct, NewUser, Product, ServerTime, StatusMessage, User};

use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// Path of the clock resource, relative to the cache service base
const TIME_PATH: &str = "time";

/// Path of the key/value resource, relative to the cache service base
const CACHE_PATH: &str = "cache";

// ============================================================================
// Outcomes
// ============================================================================

/// Result of looking up one key. A miss is an expected outcome, kept apart
/// from transport and server failures.
#[derive(Debug)]
pub enum CacheLookup {
    Found(CacheEntry),
    NotFound,
    Failed(ApiError),
}

impl From<ApiResult<Option<CacheEntry>>> for CacheLookup {
    fn from(result: ApiResult<Option<CacheEntry>>) -> Self {
        match result {
            Ok(Some(entry)) => CacheLookup::Found(entry),
            Ok(None) => CacheLookup::NotFound,
            Err(e) => CacheLookup::Failed(e),
        }
    }
}

/// Successful outcomes of deleting one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDeletion {
    /// Key existed and was removed; carries the server's message
    Deleted(String),
    /// Key did not exist
    NotFound,
}

/// API client for the remote services.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoints: Endpoints,
    users_url: Url,
    products_url: Url,
    cache_base: Url,
}

impl ApiClient {
    /// Create a new API client for the given endpoints
    pub fn new(endpoints: Endpoints) -> ApiResult<Self> {
        let client = Client::builder().build()?;
        Self::with_client(client, endpoints)
    }

    /// Create a client for other endpoints, sharing the connection pool.
    pub fn with_endpoints(&self, endpoints: Endpoints) -> ApiResult<Self> {
        Self::with_client(self.client.clone(), endpoints)
    }

    fn with_client(client: Client, endpoints: Endpoints) -> ApiResult<Self> {
        Ok(Self {
            users_url: Self::parse_url(&endpoints.users)?,
            products_url: Self::parse_url(&endpoints.products)?,
            cache_base: Self::parse_url(&endpoints.cache_base)?,
            client,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn parse_url(raw: &str) -> ApiResult<Url> {
        let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!("{}: not an http(s) URL", raw)));
        }
        Ok(url)
    }

    /// Build `<cache base>/<segments...>`. Each segment is percent-encoded,
    /// so a key containing `/` stays a single segment.
    ///
    /// URL normalization drops `.` and `..` segments (encoded or not), so
    /// those are rejected rather than sent to the parent resource.
    fn cache_url(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(dots) = segments.iter().find(|s| is_dot_segment(s)) {
            return Err(ApiError::InvalidUrl(format!(
                "{:?} cannot be used as a path segment",
                dots
            )));
        }
        let mut url = self.cache_base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.cache_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> ApiResult<T> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, what).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
        what: &str,
    ) -> ApiResult<T> {
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response, what).await
    }

    // ===== Collections =====

    /// Fetch the full users collection
    pub async fn fetch_users(&self) -> ApiResult<Vec<User>> {
        self.get(self.users_url.clone(), "users").await
    }

    /// Fetch the full products collection
    pub async fn fetch_products(&self) -> ApiResult<Vec<Product>> {
        self.get(self.products_url.clone(), "products").await
    }

    /// Create a user, returning the stored record
    pub async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        self.post(self.users_url.clone(), user, "created user").await
    }

    /// Create a product, returning the stored record
    pub async fn create_product(&self, product: &NewProduct) -> ApiResult<Product> {
        self.post(self.products_url.clone(), product, "created product").await
    }

    // ===== Cache service =====

    /// Fetch the service clock in seconds since the epoch
    pub async fn fetch_time(&self) -> ApiResult<f64> {
        let url = self.cache_url(&[TIME_PATH])?;
        let time: ServerTime = self.get(url, "time").await?;
        Ok(time.time)
    }

    /// Insert or overwrite one key
    pub async fn set_cache(&self, entry: &CacheEntry) -> ApiResult<StatusMessage> {
        let url = self.cache_url(&[CACHE_PATH])?;
        self.post(url, entry, "cache status").await
    }

    /// Look up one key
    pub async fn get_cache(&self, key: &str) -> CacheLookup {
        self.lookup_cache(key).await.into()
    }

    async fn lookup_cache(&self, key: &str) -> ApiResult<Option<CacheEntry>> {
        let url = self.cache_url(&[CACHE_PATH, key])?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(key, "Cache miss");
            return Ok(None);
        }
        let response = Self::check_response(response).await?;
        Self::parse_json(response, "cache entry").await.map(Some)
    }

    /// Delete one key
    pub async fn delete_cache(&self, key: &str) -> ApiResult<CacheDeletion> {
        let url = self.cache_url(&[CACHE_PATH, key])?;
        debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(key, "Delete of missing key");
            return Ok(CacheDeletion::NotFound);
        }
        let response = Self::check_response(response).await?;
        let status: StatusMessage = Self::parse_json(response, "cache status").await?;
        Ok(CacheDeletion::Deleted(status.message))
    }
}

/// Segments that URL parsing resolves away instead of sending
pub fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_cache_base(base: &str) -> ApiClient {
        ApiClient::new(Endpoints {
            cache_base: base.to_string(),
            ..Endpoints::default()
        })
        .expect("Failed to build client")
    }

    #[test]
    fn test_cache_url_root_base() {
        let api = client_with_cache_base("http://localhost:5000");
        assert_eq!(
            api.cache_url(&[CACHE_PATH]).unwrap().as_str(),
            "http://localhost:5000/cache"
        );
        assert_eq!(
            api.cache_url(&[TIME_PATH]).unwrap().as_str(),
            "http://localhost:5000/time"
        );
    }

    #[test]
    fn test_cache_url_nested_base() {
        let api = client_with_cache_base("http://gateway/api/");
        assert_eq!(
            api.cache_url(&[CACHE_PATH, "k"]).unwrap().as_str(),
            "http://gateway/api/cache/k"
        );
    }

    #[test]
    fn test_cache_url_encodes_key_as_one_segment() {
        let api = client_with_cache_base("http://localhost:5000");
        let url = api.cache_url(&[CACHE_PATH, "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/cache/a%2Fb%20c");
    }

    #[test]
    fn test_cache_url_rejects_dot_keys() {
        let api = client_with_cache_base("http://localhost:5000");
        assert!(matches!(
            api.cache_url(&[CACHE_PATH, "."]),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            api.cache_url(&[CACHE_PATH, ".."]),
            Err(ApiError::InvalidUrl(_))
        ));
        assert_eq!(
            api.cache_url(&[CACHE_PATH, "..."]).unwrap().as_str(),
            "http://localhost:5000/cache/..."
        );
        assert_eq!(
            api.cache_url(&[CACHE_PATH, ".hidden"]).unwrap().as_str(),
            "http://localhost:5000/cache/.hidden"
        );
    }

    #[test]
    fn test_invalid_endpoints_rejected() {
        let bad = |users: &str| {
            ApiClient::new(Endpoints {
                users: users.to_string(),
                ..Endpoints::default()
            })
        };
        assert!(matches!(bad("not a url"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(bad("mailto:ops@example.com"), Err(ApiError::InvalidUrl(_))));
        assert!(matches!(bad("ftp://files/users"), Err(ApiError::InvalidUrl(_))));
        assert!(bad("https://users.internal/users").is_ok());
    }

    #[test]
    fn test_with_endpoints_swaps_addresses() {
        let api = ApiClient::new(Endpoints::default()).unwrap();
        let other = Endpoints {
            users: "http://other:1/users".to_string(),
            ..Endpoints::default()
        };
        let swapped = api.with_endpoints(other.clone()).unwrap();
        assert_eq!(swapped.endpoints(), &other);
        assert_eq!(api.endpoints(), &Endpoints::default());
    }
}
