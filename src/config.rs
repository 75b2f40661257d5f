//! Configuration management for mtcam using the prefer crate.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_MAX_SPAN_DAYS;
use crate::controllers::DEFAULT_FRAMES_PER_SECOND;

/// Default service root when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root URL of the camera service (the API lives under `/api/`).
    pub base_url: String,
    /// User agent for HTTP requests (None = mtcam default).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Longest date span a scrape request may cover.
    pub max_span_days: i64,
    /// Initial timelapse speed.
    pub frames_per_second: f64,
    /// Interpret query dates in the mountain's timezone.
    pub as_local_time: bool,
    /// Where downloaded weather plots are written.
    pub weather_output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            request_timeout: 30,
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            as_local_time: false,
            weather_output: PathBuf::from("weather.html"),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the camera service.
    #[serde(default)]
    pub base_url: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Longest date span in days.
    #[serde(default)]
    pub max_span_days: Option<i64>,
    /// Initial timelapse frames per second.
    #[serde(default)]
    pub frames_per_second: Option<f64>,
    /// Query in the mountain's local time.
    #[serde(default)]
    pub as_local_time: Option<bool>,
    /// Weather plot output path (`~` is expanded).
    #[serde(default)]
    pub weather_output: Option<String>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers mtcam config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("mtcam").await {
            Ok(pref_config) => {
                let base_url: Option<String> = pref_config.get("base_url").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let max_span_days: Option<i64> = pref_config.get("max_span_days").ok();
                let frames_per_second: Option<f64> =
                    pref_config.get("frames_per_second").ok();
                let as_local_time: Option<bool> = pref_config.get("as_local_time").ok();
                let weather_output: Option<String> = pref_config.get("weather_output").ok();

                Config {
                    base_url,
                    user_agent,
                    request_timeout,
                    max_span_days,
                    frames_per_second,
                    as_local_time,
                    weather_output,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(days) = self.max_span_days.filter(|d| *d > 0) {
            settings.max_span_days = days;
        }
        if let Some(fps) = self.frames_per_second.filter(|f| f.is_finite() && *f > 0.0) {
            settings.frames_per_second = fps;
        }
        if let Some(as_local) = self.as_local_time {
            settings.as_local_time = as_local;
        }
        if let Some(ref output) = self.weather_output {
            settings.weather_output = expand_path(output);
        }
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
