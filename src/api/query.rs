//! Request parameters for the scrape and weather endpoints.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{CameraId, MountainId};

/// Longest date span the client will request.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(
        "Sorry, but you've asked for a time span of {days} days, longer than {max} days. \
         To maintain performance of the server, please select a time span of {max} days or less."
    )]
    SpanTooLong { days: i64, max: i64 },

    #[error("invalid date {input:?}, expected YYYY-MM-DD")]
    InvalidDate { input: String },
}

/// Parse a `YYYY-MM-DD` date. Blank input means "unset".
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, QueryError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map(Some)
        .map_err(|_| QueryError::InvalidDate {
            input: input.to_string(),
        })
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Inclusive date bounds; either end may be left for the server to pick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Days from start to end, when both are set.
    pub fn span_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Reject spans longer than `max_days`. A range with an unset end,
    /// or one that runs backwards, is left to the server.
    pub fn validate(&self, max_days: i64) -> Result<(), QueryError> {
        match self.span_days() {
            Some(days) if days > max_days => Err(QueryError::SpanTooLong {
                days,
                max: max_days,
            }),
            _ => Ok(()),
        }
    }

    pub fn start_param(&self) -> String {
        format_date(self.start)
    }

    pub fn end_param(&self) -> String {
        format_date(self.end)
    }
}

/// Parameters for `GET /api/mountains/{mt}/cams/{cam}/scrapes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeQuery {
    pub mountain_id: MountainId,
    pub camera_id: CameraId,
    pub range: DateRange,
    pub as_local_time: Option<bool>,
}

impl ScrapeQuery {
    pub fn path(&self) -> String {
        format!(
            "mountains/{}/cams/{}/scrapes",
            self.mountain_id, self.camera_id
        )
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start", self.range.start_param()),
            ("end", self.range.end_param()),
        ];
        if let Some(as_local) = self.as_local_time {
            pairs.push(("as_local_time", as_local.to_string()));
        }
        pairs
    }
}

/// Parameters for `GET /api/mountains/{mt}/weather`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub mountain_id: MountainId,
    pub range: DateRange,
    pub as_local_time: bool,
}

impl WeatherQuery {
    pub fn path(&self) -> String {
        format!("mountains/{}/weather", self.mountain_id)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("format", "bokeh".to_string()),
            ("start", self.range.start_param()),
            ("end", self.range.end_param()),
            ("as_local_time", self.as_local_time.to_string()),
        ]
    }
}
