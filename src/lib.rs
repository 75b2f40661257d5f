//! mtcam: client for a mountain camera scrape log and timelapse service.
//!
//! The library holds the data fetch layer, the playback and tab
//! controllers and the viewer workflow; the `mtcam` binary puts a terminal
//! UI and a handful of one-shot commands on top.

pub mod api;
pub mod config;
pub mod controllers;
pub mod models;
pub mod render;
pub mod services;
pub mod tui;
