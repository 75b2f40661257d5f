//! Data fetch layer for the camera service REST API.

mod client;
mod error;
mod query;

pub use client::{parse_base_url, resolve_frame_url, resolve_user_agent, ApiClient};
pub use error::ApiError;
pub use query::{
    parse_date, DateRange, QueryError, ScrapeQuery, WeatherQuery, DEFAULT_MAX_SPAN_DAYS,
};

use async_trait::async_trait;

use crate::models::{Catalog, ScrapeRecord, WeatherEmbed};

/// Read-only operations the front ends need from the service.
#[async_trait]
pub trait MountainApi: Send + Sync {
    /// `GET /api/data`
    async fn catalog(&self) -> Result<Catalog, ApiError>;

    /// `GET /api/mountains/{mt}/cams/{cam}/scrapes`
    async fn scrapes(&self, query: &ScrapeQuery) -> Result<Vec<ScrapeRecord>, ApiError>;

    /// `GET /api/mountains/{mt}/weather?format=bokeh`
    async fn weather(&self, query: &WeatherQuery) -> Result<WeatherEmbed, ApiError>;
}
