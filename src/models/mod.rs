//! Data types exchanged with the camera service API.

mod mountain;
mod scrape;
mod weather;

pub use mountain::{Camera, CameraId, Catalog, Mountain, MountainId, Timezone};
pub use scrape::{ScrapeRecord, ScrapeResult, ScrapeStats, Timestamp, TimestampError};
pub use weather::WeatherEmbed;
