//! Presentation helpers shared by the terminal UI and the CLI.
//!
//! The info boxes mirror what the viewer shows for the selected mountain,
//! the selected camera and the current scrape result set.

pub mod templates;
pub mod text;

use url::Url;

use crate::api::resolve_frame_url;
use crate::models::{Camera, Mountain, ScrapeRecord, ScrapeStats};

/// One "property / value" line of an info box.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    pub property: String,
    pub value: String,
}

impl InfoRow {
    fn new(property: impl Into<String>, value: impl ToString) -> Self {
        Self {
            property: property.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoBox {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<InfoRow>,
}

/// Map page for a coordinate pair.
pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps/place/{},{}", latitude, longitude)
}

fn location(latitude: f64, longitude: f64) -> String {
    format!("{}, {}", latitude, longitude)
}

pub fn mountain_box(mountain: &Mountain) -> InfoBox {
    let tz = mountain
        .tz
        .as_ref()
        .map(|tz| tz.to_string())
        .unwrap_or_default();
    InfoBox {
        title: format!("{}  ({})", mountain.name, mountain.state),
        subtitle: String::new(),
        rows: vec![
            InfoRow::new("Elevation (ft)", mountain.elevation_ft),
            InfoRow::new("Location", location(mountain.latitude, mountain.longitude)),
            InfoRow::new("Map", map_link(mountain.latitude, mountain.longitude)),
            InfoRow::new("Timezone", tz),
        ],
    }
}

pub fn camera_box(camera: &Camera) -> InfoBox {
    InfoBox {
        title: camera.name.clone(),
        subtitle: format!("active = {}", camera.is_active),
        rows: vec![
            InfoRow::new("Elevation (ft)", camera.elevation_ft),
            InfoRow::new("Location", location(camera.latitude, camera.longitude)),
            InfoRow::new("Map", map_link(camera.latitude, camera.longitude)),
            InfoRow::new("Interval (min)", camera.interval),
            InfoRow::new("Comment", camera.comment.as_deref().unwrap_or("")),
        ],
    }
}

pub fn stats_box(stats: &ScrapeStats) -> InfoBox {
    InfoBox {
        title: "Scrape Statistics".to_string(),
        subtitle: String::new(),
        rows: vec![
            InfoRow::new("total", stats.total),
            InfoRow::new("success", stats.success),
            InfoRow::new("failure", stats.failure),
            InfoRow::new("idle", stats.idle),
            InfoRow::new("success rate", stats.success_rate_label()),
        ],
    }
}

/// Cells of one scrape log row: time, result, detail, image URL.
///
/// The image URL is only filled for successful scrapes, resolved against
/// `base`.
pub fn scrape_cells(record: &ScrapeRecord, base: &Url) -> [String; 4] {
    [
        record.time.to_string(),
        record.result.to_string(),
        record.detail.clone(),
        record
            .frame_file()
            .map(|file| resolve_frame_url(base, file))
            .unwrap_or_default(),
    ]
}

pub const SCRAPE_HEADER: [&str; 4] = ["Time", "Result", "Detail", "File"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScrapeResult, Timestamp};

    fn camera() -> Camera {
        serde_json::from_str(
            r#"{"id": 4, "name": "Timberline", "elevation_ft": 6000, "latitude": 45.33,
                "longitude": -121.71, "interval": 10, "comment": "south face", "is_active": true}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_map_link() {
        assert_eq!(
            map_link(45.33, -121.71),
            "https://www.google.com/maps/place/45.33,-121.71"
        );
    }

    #[test]
    fn test_camera_box() {
        let info = camera_box(&camera());
        assert_eq!(info.title, "Timberline");
        assert_eq!(info.subtitle, "active = true");
        assert_eq!(info.rows[0], InfoRow::new("Elevation (ft)", "6000"));
        assert_eq!(info.rows[3], InfoRow::new("Interval (min)", "10"));
        assert_eq!(info.rows[4].value, "south face");
    }

    #[test]
    fn test_stats_box_reports_rate() {
        let stats = ScrapeStats {
            total: 4,
            success: 2,
            failure: 2,
            idle: 0,
        };
        let info = stats_box(&stats);
        assert_eq!(info.rows.last().unwrap().value, "50.0%");

        let info = stats_box(&ScrapeStats::default());
        assert_eq!(info.rows.last().unwrap().value, "n/a");
    }

    fn base() -> Url {
        Url::parse("http://cams.example.org/").unwrap()
    }

    #[test]
    fn test_scrape_cells() {
        let record = ScrapeRecord {
            time: Timestamp::parse("2024-01-02 03:04").unwrap(),
            result: ScrapeResult::Failure,
            file: None,
            detail: "timeout".into(),
        };
        assert_eq!(
            scrape_cells(&record, &base()),
            [
                "2024-01-02 03:04".to_string(),
                "failure".into(),
                "timeout".into(),
                String::new()
            ]
        );
    }

    #[test]
    fn test_success_row_links_image() {
        let record = ScrapeRecord {
            time: Timestamp::parse("2024-01-02 03:04").unwrap(),
            result: ScrapeResult::Success,
            file: Some("/static/img/hood/a.jpg".into()),
            detail: String::new(),
        };
        let [_, result, _, file] = scrape_cells(&record, &base());
        assert_eq!(result, "success");
        assert_eq!(file, "http://cams.example.org/static/img/hood/a.jpg");
    }

    #[test]
    fn test_idle_row_has_no_image() {
        let record = ScrapeRecord {
            time: Timestamp::parse("2024-01-02 03:04").unwrap(),
            result: ScrapeResult::Idle,
            file: Some("/static/img/hood/stale.jpg".into()),
            detail: "night".into(),
        };
        assert_eq!(scrape_cells(&record, &base())[3], "");
    }
}
