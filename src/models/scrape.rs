//! Scrape records: one automated attempt to capture a camera image.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Outcome of a single scrape attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeResult {
    Success,
    Failure,
    Idle,
}

impl ScrapeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeResult::Success => "success",
            ScrapeResult::Failure => "failure",
            ScrapeResult::Idle => "idle",
        }
    }
}

impl fmt::Display for ScrapeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unrecognized scrape time {0:?}")]
pub struct TimestampError(String);

/// Time of a scrape.
///
/// The Go server sends RFC 3339 in the mountain's timezone, the Python
/// server a naive `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl Timestamp {
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let input = input.trim();
        if let Ok(zoned) = DateTime::parse_from_rfc3339(input) {
            return Ok(Timestamp::Zoned(zoned));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(Timestamp::Local)
            .ok_or_else(|| TimestampError(input.to_string()))
    }

    /// Wall-clock time, ignoring any offset.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            Timestamp::Zoned(zoned) => zoned.naive_local(),
            Timestamp::Local(naive) => *naive,
        }
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Timestamp::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        match value {
            Timestamp::Zoned(zoned) => zoned.to_rfc3339(),
            Timestamp::Local(naive) => naive.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Zoned(zoned) => write!(f, "{}", zoned.format("%Y-%m-%d %H:%M %:z")),
            Timestamp::Local(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M")),
        }
    }
}

/// One row of the scrape log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub time: Timestamp,
    pub result: ScrapeResult,
    /// Image path, only present for successful scrapes.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub detail: String,
}

impl ScrapeRecord {
    pub fn is_success(&self) -> bool {
        self.result == ScrapeResult::Success
    }

    /// Image path if this record contributes a timelapse frame.
    pub fn frame_file(&self) -> Option<&str> {
        if self.is_success() {
            self.file.as_deref()
        } else {
            None
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Summary counts over a scrape result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeStats {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub idle: usize,
}

impl ScrapeStats {
    pub fn from_records(records: &[ScrapeRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.result {
                ScrapeResult::Success => stats.success += 1,
                ScrapeResult::Failure => stats.failure += 1,
                ScrapeResult::Idle => stats.idle += 1,
            }
            stats
        })
    }

    /// Percentage of attempted scrapes that succeeded. Idle records are
    /// not attempts and do not count.
    pub fn success_rate(&self) -> Option<f64> {
        let attempted = self.success + self.failure;
        if attempted == 0 {
            None
        } else {
            Some(100.0 * self.success as f64 / attempted as f64)
        }
    }

    pub fn success_rate_label(&self) -> String {
        match self.success_rate() {
            Some(rate) => format!("{:.1}%", rate),
            None => "n/a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(result: ScrapeResult) -> ScrapeRecord {
        ScrapeRecord {
            time: Timestamp::parse("2024-01-01 08:00").unwrap(),
            result,
            file: None,
            detail: String::new(),
        }
    }

    #[test]
    fn test_stats_success_rate() {
        let records = vec![
            record(ScrapeResult::Success),
            record(ScrapeResult::Failure),
            record(ScrapeResult::Idle),
        ];
        let stats = ScrapeStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.failure, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.success_rate_label(), "50.0%");
    }

    #[test]
    fn test_idle_scrapes_do_not_count_as_attempts() {
        let records = vec![
            record(ScrapeResult::Success),
            record(ScrapeResult::Success),
            record(ScrapeResult::Failure),
            record(ScrapeResult::Idle),
        ];
        let stats = ScrapeStats::from_records(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success_rate_label(), "66.7%");
    }

    #[test]
    fn test_stats_without_attempts() {
        let stats = ScrapeStats::from_records(&[record(ScrapeResult::Idle)]);
        assert_eq!(stats.success_rate(), None);
        assert_eq!(stats.success_rate_label(), "n/a");
        assert_eq!(ScrapeStats::from_records(&[]).total, 0);
    }

    #[test]
    fn test_stats_rounding() {
        let records = vec![
            record(ScrapeResult::Success),
            record(ScrapeResult::Failure),
            record(ScrapeResult::Failure),
        ];
        assert_eq!(ScrapeStats::from_records(&records).success_rate_label(), "33.3%");
    }

    #[test]
    fn test_deserialize_python_record() {
        let json = r#"{"time": "2024-01-05 13:40", "result": "success",
                       "detail": "ok", "file": "/static/img/hood/timberline/1.jpg"}"#;
        let record: ScrapeRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_success());
        assert_eq!(record.frame_file(), Some("/static/img/hood/timberline/1.jpg"));
        assert_eq!(record.time.to_string(), "2024-01-05 13:40");
    }

    #[test]
    fn test_deserialize_go_record() {
        let json = r#"{"time": "2024-01-05T13:40:00-08:00", "result": "failure",
                       "detail": "timeout", "file": ""}"#;
        let record: ScrapeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.result, ScrapeResult::Failure);
        assert_eq!(record.file, None);
        assert_eq!(record.frame_file(), None);
        assert_eq!(record.time.to_string(), "2024-01-05 13:40 -08:00");
    }

    #[test]
    fn test_failure_with_file_is_not_a_frame() {
        let json = r#"{"time": "2024-01-05 13:40", "result": "idle", "detail": null,
                       "file": "/img/x.jpg"}"#;
        let record: ScrapeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.detail, "");
        assert_eq!(record.frame_file(), None);
    }

    #[test]
    fn test_unknown_result_is_rejected() {
        let json = r#"{"time": "2024-01-05 13:40", "result": "exploded", "detail": ""}"#;
        assert!(serde_json::from_str::<ScrapeRecord>(json).is_err());
    }

    #[test]
    fn test_bad_timestamp() {
        assert!(Timestamp::parse("yesterday").is_err());
    }
}
