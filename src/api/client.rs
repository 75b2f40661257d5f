//! HTTP client for the camera service REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::{ApiError, MountainApi, ScrapeQuery, WeatherQuery};
use crate::models::{Catalog, ScrapeRecord, WeatherEmbed};

const USER_AGENT: &str = concat!("mtcam/", env!("CARGO_PKG_VERSION"), " (terminal client)");

/// Resolve user agent from config value.
/// - None => default mtcam user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some(custom) if custom.trim().is_empty() => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// Parse a service base URL, making sure it ends with a slash so that
/// relative joins keep any path prefix.
pub fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|source| ApiError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })
}

/// Resolve an image path from a scrape record against the service root.
///
/// Absolute URLs pass through unchanged.
pub fn resolve_frame_url(base: &Url, file: &str) -> String {
    base.join(file)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| file.to_string())
}

/// Client for `<base>/api/...`.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    api_root: Url,
}

impl ApiClient {
    /// Create a client with the default user agent.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Self::with_user_agent(base_url, timeout, None)
    }

    /// Create a client with a custom user agent configuration.
    pub fn with_user_agent(
        base_url: &str,
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let api_root = base
            .join("api/")
            .map_err(|source| ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                source,
            })?;

        let client = Client::builder()
            .user_agent(resolve_user_agent(user_agent_config))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base,
            api_root,
        })
    }

    /// Root of the service, used to resolve image paths.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Full URL for an API path such as `data` or `mountains/1/weather`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.api_root
            .join(path)
            .map_err(|source| ApiError::InvalidBaseUrl {
                url: self.api_root.to_string(),
                source,
            })
    }

    /// GET an API path and decode a JSON body. Anything but 200 is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {} {:?}", url, query);

        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        info!(
            "GET {} {} ({} bytes, {:?})",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed()
        );

        match status {
            StatusCode::OK => serde_json::from_str(&body).map_err(|source| ApiError::Parse {
                url: url.to_string(),
                source,
            }),
            StatusCode::BAD_REQUEST => {
                warn!("{} rejected the request: {}", url, body.trim());
                Err(ApiError::BadRequest {
                    url: url.to_string(),
                    body,
                })
            }
            other => {
                warn!("{} returned {}", url, other);
                Err(ApiError::Status {
                    url: url.to_string(),
                    status: other.as_u16(),
                })
            }
        }
    }
}

#[async_trait]
impl MountainApi for ApiClient {
    async fn catalog(&self) -> Result<Catalog, ApiError> {
        self.get_json("data", &[]).await
    }

    async fn scrapes(&self, query: &ScrapeQuery) -> Result<Vec<ScrapeRecord>, ApiError> {
        self.get_json(&query.path(), &query.query_pairs()).await
    }

    async fn weather(&self, query: &WeatherQuery) -> Result<WeatherEmbed, ApiError> {
        self.get_json(&query.path(), &query.query_pairs()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent_default() {
        let ua = resolve_user_agent(None);
        assert!(ua.starts_with("mtcam/"));
        assert_eq!(resolve_user_agent(Some("  ")), ua);
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        let ua = resolve_user_agent(Some("MyBot/1.0"));
        assert_eq!(ua, "MyBot/1.0");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = ApiClient::new("https://example.com/mtcam", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("data").unwrap().as_str(),
            "https://example.com/mtcam/api/data"
        );
        assert_eq!(
            client.endpoint("mountains/1/cams/2/scrapes").unwrap().as_str(),
            "https://example.com/mtcam/api/mountains/1/cams/2/scrapes"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_resolve_frame_url() {
        let base = parse_base_url("http://127.0.0.1:5000").unwrap();
        assert_eq!(
            resolve_frame_url(&base, "/images/hood/1.jpg"),
            "http://127.0.0.1:5000/images/hood/1.jpg"
        );
        assert_eq!(
            resolve_frame_url(&base, "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
