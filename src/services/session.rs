//! Viewer workflow shared by the front ends.
//!
//! A [`Session`] owns the catalog, the current selection and query inputs,
//! the latest scrape result set and the two UI controllers. Every method
//! is a synchronous reaction to one user action or one API response; the
//! front end performs the requests the session hands back.

use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::api::{
    parse_base_url, resolve_frame_url, ApiError, DateRange, QueryError, ScrapeQuery, WeatherQuery,
};
use crate::config::Settings;
use crate::controllers::{Frame, TabController, TabError, TabId, TimelapseController, TimelapseError};
use crate::models::{Camera, CameraId, Catalog, Mountain, MountainId, ScrapeRecord, ScrapeStats, WeatherEmbed};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("mountain and camera data has not loaded yet")]
    NoCatalog,

    #[error("no mountain selected")]
    NoMountain,

    #[error("no camera selected")]
    NoCamera,

    #[error("unknown mountain {0}")]
    UnknownMountain(MountainId),

    #[error("mountain {mountain} has no camera {camera}")]
    UnknownCamera {
        mountain: MountainId,
        camera: CameraId,
    },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Tab(#[from] TabError),

    #[error(transparent)]
    Timelapse(#[from] TimelapseError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Session {
    frame_base: Url,
    max_span_days: i64,
    catalog: Option<Catalog>,
    mountain_id: Option<MountainId>,
    camera_id: Option<CameraId>,
    range: DateRange,
    as_local_time: bool,
    scrapes: Option<Vec<ScrapeRecord>>,
    stats: Option<ScrapeStats>,
    weather: Option<WeatherEmbed>,
    timelapse: TimelapseController,
    tabs: TabController,
}

impl Session {
    /// Start a session with the tab bar in its initial layout and the
    /// start date set to `today`.
    pub fn new(settings: &Settings, today: NaiveDate) -> Result<Self, SessionError> {
        let mut tabs = TabController::standard();
        tabs.set_tab_visible(TabId::Help, true)?;
        tabs.select(TabId::Help)?;
        tabs.set_tab_visible(TabId::Info, true)?;

        Ok(Self {
            frame_base: parse_base_url(&settings.base_url)?,
            max_span_days: settings.max_span_days,
            catalog: None,
            mountain_id: None,
            camera_id: None,
            range: DateRange::new(Some(today), None),
            as_local_time: settings.as_local_time,
            scrapes: None,
            stats: None,
            weather: None,
            timelapse: TimelapseController::with_speed(settings.frames_per_second)?,
            tabs,
        })
    }

    /// Mountain and camera data arrived. Selects the first mountain.
    pub fn apply_catalog(&mut self, catalog: Catalog) {
        info!("catalog loaded with {} mountains", catalog.len());
        let first = catalog
            .first_mountain()
            .map(|m| (m.id, m.first_camera().map(|c| c.id)));
        self.catalog = Some(catalog);
        self.mountain_id = None;
        self.camera_id = None;
        if let Some((id, camera)) = first {
            self.focus_mountain(id, camera);
        }
    }

    /// Switch mountain; its first camera becomes selected.
    pub fn select_mountain(&mut self, id: MountainId) -> Result<(), SessionError> {
        let catalog = self.catalog.as_ref().ok_or(SessionError::NoCatalog)?;
        let mountain = catalog
            .mountain(id)
            .ok_or(SessionError::UnknownMountain(id))?;
        let camera = mountain.first_camera().map(|c| c.id);
        self.focus_mountain(id, camera);
        Ok(())
    }

    fn focus_mountain(&mut self, id: MountainId, camera: Option<CameraId>) {
        self.mountain_id = Some(id);
        self.camera_id = camera;
        debug!("mountain {} selected, camera {:?}", id, camera);
    }

    /// Switch camera. Results from the previous camera are put out of view:
    /// the Info tab is selected and the Timelapse and Log tabs hidden.
    pub fn select_camera(&mut self, id: CameraId) -> Result<(), SessionError> {
        let mountain = self.mountain().ok_or(SessionError::NoMountain)?;
        if mountain.camera(id).is_none() {
            return Err(SessionError::UnknownCamera {
                mountain: mountain.id,
                camera: id,
            });
        }
        self.camera_id = Some(id);
        self.tabs.select(TabId::Info)?;
        self.tabs.set_tab_visible(TabId::Timelapse, false)?;
        self.tabs.set_tab_visible(TabId::Log, false)?;
        Ok(())
    }

    /// Move the mountain selection by `offset`, wrapping.
    pub fn cycle_mountain(&mut self, offset: isize) -> Result<(), SessionError> {
        let catalog = self.catalog.as_ref().ok_or(SessionError::NoCatalog)?;
        let id = catalog
            .cycle_mountain(self.mountain_id, offset)
            .ok_or(SessionError::NoMountain)?;
        self.select_mountain(id)
    }

    /// Move the camera selection by `offset`, wrapping.
    pub fn cycle_camera(&mut self, offset: isize) -> Result<(), SessionError> {
        let catalog = self.catalog.as_ref().ok_or(SessionError::NoCatalog)?;
        let mountain_id = self.mountain_id.ok_or(SessionError::NoMountain)?;
        let id = catalog
            .cycle_camera(mountain_id, self.camera_id, offset)
            .ok_or(SessionError::NoCamera)?;
        self.select_camera(id)
    }

    pub fn set_start(&mut self, start: Option<NaiveDate>) {
        self.range.start = start;
    }

    pub fn set_end(&mut self, end: Option<NaiveDate>) {
        self.range.end = end;
    }

    pub fn toggle_local_time(&mut self) -> bool {
        self.as_local_time = !self.as_local_time;
        self.as_local_time
    }

    /// "Load photos": validate the inputs and hand back the request to make.
    ///
    /// On success the result tabs are revealed right away (Info selected,
    /// Timelapse and Log flashed, Help hidden). A rejected date span changes
    /// nothing.
    pub fn submit_photos(&mut self, now: Instant) -> Result<ScrapeQuery, SessionError> {
        let mountain_id = self.mountain_id.ok_or(SessionError::NoMountain)?;
        let camera_id = self.camera_id.ok_or(SessionError::NoCamera)?;
        self.range.validate(self.max_span_days)?;

        for tab in [TabId::Info, TabId::Timelapse, TabId::Log] {
            self.tabs.set_tab_visible(tab, true)?;
        }
        self.tabs.flash(TabId::Timelapse, now)?;
        self.tabs.flash(TabId::Log, now)?;
        self.tabs.select(TabId::Info)?;
        self.tabs.set_tab_visible(TabId::Help, false)?;

        Ok(ScrapeQuery {
            mountain_id,
            camera_id,
            range: self.range,
            as_local_time: self.as_local_time.then_some(true),
        })
    }

    /// Scrape records arrived. Replaces the previous result set and
    /// rebuilds the timelapse from the successful scrapes. Returns whether
    /// the timelapse has frames.
    pub fn apply_scrapes(&mut self, records: Vec<ScrapeRecord>) -> bool {
        let frames: Vec<Frame> = records
            .iter()
            .filter_map(|record| {
                record.frame_file().map(|file| Frame {
                    url: resolve_frame_url(&self.frame_base, file),
                    time: record.time,
                })
            })
            .collect();
        info!(
            "{} scrapes received, {} timelapse frames",
            records.len(),
            frames.len()
        );
        self.stats = Some(ScrapeStats::from_records(&records));
        self.scrapes = Some(records);
        self.timelapse.load(frames)
    }

    /// "Load weather": the request for the selected mountain and dates.
    pub fn weather_query(&self) -> Result<WeatherQuery, SessionError> {
        let mountain_id = self.mountain_id.ok_or(SessionError::NoMountain)?;
        Ok(WeatherQuery {
            mountain_id,
            range: self.range,
            as_local_time: self.as_local_time,
        })
    }

    /// Weather plot arrived; the Weather tab is revealed.
    pub fn apply_weather(&mut self, embed: WeatherEmbed) -> Result<(), SessionError> {
        self.weather = Some(embed);
        self.tabs.set_tab_visible(TabId::Weather, true)?;
        Ok(())
    }

    /// Root that image paths in scrape records resolve against.
    pub fn frame_base(&self) -> &Url {
        &self.frame_base
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn mountain(&self) -> Option<&Mountain> {
        let id = self.mountain_id?;
        self.catalog.as_ref()?.mountain(id)
    }

    pub fn camera(&self) -> Option<&Camera> {
        let id = self.camera_id?;
        self.mountain()?.camera(id)
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn as_local_time(&self) -> bool {
        self.as_local_time
    }

    pub fn max_span_days(&self) -> i64 {
        self.max_span_days
    }

    pub fn scrapes(&self) -> Option<&[ScrapeRecord]> {
        self.scrapes.as_deref()
    }

    pub fn stats(&self) -> Option<&ScrapeStats> {
        self.stats.as_ref()
    }

    pub fn weather(&self) -> Option<&WeatherEmbed> {
        self.weather.as_ref()
    }

    pub fn timelapse(&self) -> &TimelapseController {
        &self.timelapse
    }

    pub fn timelapse_mut(&mut self) -> &mut TimelapseController {
        &mut self.timelapse
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabController {
        &mut self.tabs
    }
}
