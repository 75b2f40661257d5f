//! Terminal UI state and key handling.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::api::{parse_date, ApiError, ScrapeQuery, WeatherQuery};
use crate::controllers::{Scheduler, TabId, SPEED_CHOICES};
use crate::models::{Catalog, ScrapeRecord, WeatherEmbed};
use crate::render::templates::weather_page;
use crate::services::{Session, SessionError};

/// Request the event loop should perform on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchCatalog,
    FetchScrapes(ScrapeQuery),
    FetchWeather(WeatherQuery),
}

/// Completed request, delivered back to the event loop.
#[derive(Debug)]
pub enum Response {
    Catalog(Result<Catalog, ApiError>),
    Scrapes(Result<Vec<ScrapeRecord>, ApiError>),
    Weather(Result<WeatherEmbed, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

impl DateField {
    pub fn label(&self) -> &'static str {
        match self {
            DateField::Start => "start",
            DateField::End => "end",
        }
    }
}

/// Date being typed in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateInput {
    pub field: DateField,
    pub buffer: String,
}

pub struct App {
    session: Session,
    scheduler: Scheduler,
    input: Option<DateInput>,
    alert: Option<String>,
    status: String,
    log_scroll: usize,
    weather_output: PathBuf,
    weather_written: Option<PathBuf>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, weather_output: PathBuf) -> Self {
        Self {
            session,
            scheduler: Scheduler::new(),
            input: None,
            alert: None,
            status: "Loading mountains...".to_string(),
            log_scroll: 0,
            weather_output,
            weather_written: None,
            should_quit: false,
        }
    }

    /// Handle one key press. An open alert swallows the key and closes.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        if self.alert.take().is_some() {
            return None;
        }
        if self.input.is_some() {
            self.handle_date_input(key);
            return None;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(digit @ '1'..='5') => {
                let index = digit as usize - '1' as usize;
                self.select_tab(TabId::ALL[index]);
            }
            KeyCode::Tab => self.cycle_tab(1),
            KeyCode::BackTab => self.cycle_tab(-1),
            KeyCode::Char('m') => self.report(|s| s.cycle_mountain(1)),
            KeyCode::Char('M') => self.report(|s| s.cycle_mountain(-1)),
            KeyCode::Char('c') => self.report(|s| s.cycle_camera(1)),
            KeyCode::Char('C') => self.report(|s| s.cycle_camera(-1)),
            KeyCode::Char('s') => self.begin_date_input(DateField::Start),
            KeyCode::Char('e') => self.begin_date_input(DateField::End),
            KeyCode::Char('l') => {
                let local = self.session.toggle_local_time();
                self.status = format!("as_local_time = {}", local);
            }
            KeyCode::Enter => return self.load_photos(now),
            KeyCode::Char('w') => return self.load_weather(),
            KeyCode::Left => self.session.timelapse_mut().previous(),
            KeyCode::Right => self.session.timelapse_mut().next(),
            KeyCode::Char(' ') => {
                let schedule = self.session.timelapse_mut().toggle_play();
                self.scheduler.arm(schedule, now);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_speed(true),
            KeyCode::Char('-') => self.change_speed(false),
            KeyCode::Up => self.log_scroll = self.log_scroll.saturating_sub(1),
            KeyCode::Down => {
                let rows = self.session.scrapes().map_or(0, |s| s.len());
                if self.log_scroll + 1 < rows {
                    self.log_scroll += 1;
                }
            }
            _ => {}
        }
        None
    }

    /// Apply a completed request.
    pub fn on_response(&mut self, response: Response) {
        match response {
            Response::Catalog(Ok(catalog)) => {
                self.status = format!("{} mountains loaded", catalog.len());
                self.session.apply_catalog(catalog);
            }
            Response::Catalog(Err(err)) => self.fail(err.alert("loading mountains")),
            Response::Scrapes(Ok(records)) => {
                let count = records.len();
                self.log_scroll = 0;
                let has_frames = self.session.apply_scrapes(records);
                self.status = if has_frames {
                    format!(
                        "{} scrapes, {} timelapse frames",
                        count,
                        self.session.timelapse().len()
                    )
                } else {
                    format!("{} scrapes, no images", count)
                };
            }
            Response::Scrapes(Err(err)) => self.fail(err.alert("loading scrapes")),
            Response::Weather(Ok(embed)) => self.store_weather(embed),
            Response::Weather(Err(err)) => self.fail(err.alert("loading weather")),
        }
    }

    /// Fire due playback steps.
    pub fn tick(&mut self, now: Instant) {
        self.scheduler.fire_due(self.session.timelapse_mut(), now);
    }

    fn select_tab(&mut self, id: TabId) {
        // Hidden tabs are not selectable.
        if self.session.tabs().is_tab_visible(id).unwrap_or(false) {
            self.report(|s| s.tabs_mut().select(id).map_err(SessionError::from));
        }
    }

    fn cycle_tab(&mut self, offset: isize) {
        self.report(|s| s.tabs_mut().cycle(offset).map_err(SessionError::from));
    }

    fn begin_date_input(&mut self, field: DateField) {
        let range = self.session.range();
        let current = match field {
            DateField::Start => range.start_param(),
            DateField::End => range.end_param(),
        };
        self.input = Some(DateInput {
            field,
            buffer: current,
        });
    }

    fn handle_date_input(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => input.buffer.push(c),
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => {
                if let Some(input) = self.input.take() {
                    match parse_date(&input.buffer) {
                        Ok(date) => match input.field {
                            DateField::Start => self.session.set_start(date),
                            DateField::End => self.session.set_end(date),
                        },
                        Err(err) => self.fail(err.to_string()),
                    }
                }
            }
            _ => {}
        }
    }

    fn load_photos(&mut self, now: Instant) -> Option<Command> {
        match self.session.submit_photos(now) {
            Ok(query) => {
                self.status = "Loading scrapes...".to_string();
                Some(Command::FetchScrapes(query))
            }
            Err(err) => {
                self.fail(err.to_string());
                None
            }
        }
    }

    fn load_weather(&mut self) -> Option<Command> {
        match self.session.weather_query() {
            Ok(query) => {
                self.status = "Loading weather...".to_string();
                Some(Command::FetchWeather(query))
            }
            Err(err) => {
                self.fail(err.to_string());
                None
            }
        }
    }

    fn change_speed(&mut self, faster: bool) {
        let current = self.session.timelapse().frames_per_second();
        let next = if faster {
            SPEED_CHOICES.iter().copied().find(|s| *s > current)
        } else {
            SPEED_CHOICES.iter().copied().rev().find(|s| *s < current)
        };
        if let Some(fps) = next {
            self.report(|s| s.timelapse_mut().set_speed(fps).map_err(SessionError::from));
        }
    }

    fn store_weather(&mut self, embed: WeatherEmbed) {
        let title = self
            .session
            .mountain()
            .map(|m| format!("{} weather", m.label()))
            .unwrap_or_else(|| "Weather".to_string());
        let page = weather_page(&title, &embed);
        if let Err(err) = std::fs::write(&self.weather_output, page) {
            self.fail(format!(
                "(saving weather) could not write {}: {}",
                self.weather_output.display(),
                err
            ));
            return;
        }
        info!("weather plot written to {}", self.weather_output.display());
        self.weather_written = Some(self.weather_output.clone());
        self.status = format!("Weather written to {}", self.weather_output.display());
        self.report(|s| s.apply_weather(embed));
    }

    fn report(&mut self, action: impl FnOnce(&mut Session) -> Result<(), SessionError>) {
        if let Err(err) = action(&mut self.session) {
            self.fail(err.to_string());
        }
    }

    fn fail(&mut self, message: String) {
        warn!("{}", message);
        self.alert = Some(message);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn input(&self) -> Option<&DateInput> {
        self.input.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn log_scroll(&self) -> usize {
        self.log_scroll
    }

    pub fn weather_written(&self) -> Option<&PathBuf> {
        self.weather_written.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
