//! Looping slideshow over the images of successful scrapes.
//!
//! # States
//!
//! - `Empty`: no frames loaded, every control is a no-op.
//! - `Stopped`: frames loaded, one frame visible.
//! - `Playing`: like `Stopped`, plus a chain of deferred single-step
//!   advances. Each step checks the playing flag before rescheduling, so
//!   pausing is observed at the next step rather than preemptively.
//!
//! The controller never owns a timer. Operations that start or continue
//! playback return a [`Schedule`] and the host fires the enclosed [`Tick`]
//! once the delay has passed (see [`super::playback::Scheduler`]).

use std::time::Duration;

use thiserror::Error;

use crate::models::Timestamp;

/// Frames per second before the user picks a speed.
pub const DEFAULT_FRAMES_PER_SECOND: f64 = 1.0;

/// Speeds offered by the front ends, in frames per second.
pub const SPEED_CHOICES: &[f64] = &[0.5, 1.0, 2.0, 4.0, 8.0, 16.0];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelapseError {
    #[error("playback speed must be a positive number of frames per second, got {0}")]
    InvalidSpeed(f64),
}

/// One image of the timelapse.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub url: String,
    pub time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Empty,
    Stopped,
    Playing,
}

/// Token for one deferred advance. Only the newest play session's ticks
/// are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// What the host should do after a playback operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fire `tick` after `delay`.
    After { delay: Duration, tick: Tick },
    /// Nothing further to schedule.
    Done,
}

fn interval_for(frames_per_second: f64) -> Result<Duration, TimelapseError> {
    if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
        return Err(TimelapseError::InvalidSpeed(frames_per_second));
    }
    Duration::try_from_secs_f64(1.0 / frames_per_second)
        .map_err(|_| TimelapseError::InvalidSpeed(frames_per_second))
}

#[derive(Debug, Clone)]
pub struct TimelapseController {
    frames: Vec<Frame>,
    current: usize,
    playing: bool,
    frames_per_second: f64,
    frame_interval: Duration,
    generation: u64,
}

impl Default for TimelapseController {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            current: 0,
            playing: false,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            frame_interval: Duration::from_secs(1),
            generation: 0,
        }
    }
}

impl TimelapseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(frames_per_second: f64) -> Result<Self, TimelapseError> {
        let mut controller = Self::default();
        controller.set_speed(frames_per_second)?;
        Ok(controller)
    }

    /// Replace the frame set. Playback stops and the first frame becomes
    /// visible. Returns whether there is anything to play.
    pub fn load(&mut self, frames: Vec<Frame>) -> bool {
        self.stop();
        self.frames = frames;
        self.current = 0;
        !self.frames.is_empty()
    }

    /// Advance one frame, wrapping at the end.
    pub fn next(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.frames.len();
    }

    /// Step back one frame, wrapping at the start.
    pub fn previous(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        let len = self.frames.len();
        self.current = (self.current + len - 1) % len;
    }

    /// Change the frame rate. An advance that is already scheduled keeps
    /// its delay; the new interval applies from the next one.
    pub fn set_speed(&mut self, frames_per_second: f64) -> Result<(), TimelapseError> {
        self.frame_interval = interval_for(frames_per_second)?;
        self.frames_per_second = frames_per_second;
        Ok(())
    }

    /// Start or pause playback.
    ///
    /// Starting advances one frame immediately and asks for the next step.
    /// Pausing only clears the flag; a step that is already scheduled will
    /// see it and end the chain.
    pub fn toggle_play(&mut self) -> Schedule {
        if self.frames.is_empty() {
            return Schedule::Done;
        }
        if self.playing {
            self.playing = false;
            return Schedule::Done;
        }
        self.playing = true;
        self.generation = self.generation.wrapping_add(1);
        self.advance()
    }

    /// Run a scheduled step.
    pub fn on_tick(&mut self, tick: Tick) -> Schedule {
        if !self.playing || tick.generation != self.generation {
            return Schedule::Done;
        }
        self.advance()
    }

    fn advance(&mut self) -> Schedule {
        self.next();
        Schedule::After {
            delay: self.frame_interval,
            tick: Tick {
                generation: self.generation,
            },
        }
    }

    fn stop(&mut self) {
        if self.playing {
            self.playing = false;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.frames.is_empty() {
            PlaybackState::Empty
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether next/previous/play do anything.
    pub fn controls_enabled(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    /// The single visible frame.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.current)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        !self.frames.is_empty() && index == self.current
    }

    /// Progress text such as `3/20`.
    pub fn progress(&self) -> Option<String> {
        self.current_index()
            .map(|index| format!("{}/{}", index + 1, self.frames.len()))
    }

    pub fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Caption for the play button.
    pub fn play_label(&self) -> &'static str {
        if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame {
                url: format!("http://cam.test/img/{i}.jpg"),
                time: Timestamp::parse(&format!("2024-01-01 {:02}:00", i % 24)).unwrap(),
            })
            .collect()
    }

    fn loaded(n: usize) -> TimelapseController {
        let mut controller = TimelapseController::new();
        controller.load(frames(n));
        controller
    }

    fn tick_of(schedule: Schedule) -> Tick {
        match schedule {
            Schedule::After { tick, .. } => tick,
            Schedule::Done => panic!("expected a scheduled step"),
        }
    }

    #[test]
    fn test_next_cycles_back_to_start() {
        for n in 1..6 {
            let mut controller = loaded(n);
            controller.next();
            let start = controller.current_index();
            for _ in 0..n {
                controller.next();
            }
            assert_eq!(controller.current_index(), start);
        }
    }

    #[test]
    fn test_next_then_previous_is_identity() {
        let mut controller = loaded(4);
        for _ in 0..4 {
            let before = controller.current_index();
            controller.next();
            controller.previous();
            assert_eq!(controller.current_index(), before);
            controller.next();
        }
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let mut controller = loaded(3);
        controller.previous();
        assert_eq!(controller.current_index(), Some(2));
        assert_eq!(controller.progress().as_deref(), Some("3/3"));
    }

    #[test]
    fn test_exactly_one_frame_visible() {
        let mut controller = loaded(5);
        controller.next();
        controller.next();
        let visible: Vec<usize> = (0..5).filter(|i| controller.is_visible(*i)).collect();
        assert_eq!(visible, vec![2]);
        assert_eq!(controller.current_frame().unwrap().url, "http://cam.test/img/2.jpg");
    }

    #[test]
    fn test_load_empty_disables_controls() {
        let mut controller = TimelapseController::new();
        assert!(!controller.load(Vec::new()));
        assert_eq!(controller.state(), PlaybackState::Empty);
        assert!(!controller.controls_enabled());
        assert_eq!(controller.progress(), None);

        assert_eq!(controller.toggle_play(), Schedule::Done);
        assert!(!controller.is_playing());
        controller.next();
        controller.previous();
        assert_eq!(controller.current_index(), None);
    }

    #[test]
    fn test_toggle_twice_restores_playing() {
        let mut controller = loaded(3);
        assert!(!controller.is_playing());
        controller.toggle_play();
        assert!(controller.is_playing());
        assert_eq!(controller.play_label(), "Pause");
        controller.toggle_play();
        assert!(!controller.is_playing());
        assert_eq!(controller.play_label(), "Play");
    }

    #[test]
    fn test_play_advances_immediately_and_schedules() {
        let mut controller = loaded(3);
        controller.set_speed(4.0).unwrap();
        let schedule = controller.toggle_play();
        assert_eq!(controller.current_index(), Some(1));
        match schedule {
            Schedule::After { delay, .. } => assert_eq!(delay, Duration::from_millis(250)),
            Schedule::Done => panic!("expected a scheduled step"),
        }

        let next = controller.on_tick(tick_of(schedule));
        assert_eq!(controller.current_index(), Some(2));
        assert!(matches!(next, Schedule::After { .. }));
    }

    #[test]
    fn test_pending_tick_after_pause_stops_chain() {
        let mut controller = loaded(3);
        let pending = tick_of(controller.toggle_play());
        controller.toggle_play();
        let index = controller.current_index();

        assert_eq!(controller.on_tick(pending), Schedule::Done);
        assert_eq!(controller.current_index(), index);
    }

    #[test]
    fn test_stale_tick_from_earlier_play_is_ignored() {
        let mut controller = loaded(5);
        let stale = tick_of(controller.toggle_play());
        controller.toggle_play();
        let fresh = tick_of(controller.toggle_play());
        let index = controller.current_index();

        assert_eq!(controller.on_tick(stale), Schedule::Done);
        assert_eq!(controller.current_index(), index);
        assert!(matches!(controller.on_tick(fresh), Schedule::After { .. }));
    }

    #[test]
    fn test_speed_change_applies_to_next_step() {
        let mut controller = loaded(3);
        let first = controller.toggle_play();
        controller.set_speed(2.0).unwrap();
        match first {
            Schedule::After { delay, .. } => assert_eq!(delay, Duration::from_secs(1)),
            Schedule::Done => panic!("expected a scheduled step"),
        }
        match controller.on_tick(tick_of(first)) {
            Schedule::After { delay, .. } => assert_eq!(delay, Duration::from_millis(500)),
            Schedule::Done => panic!("expected a scheduled step"),
        }
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let mut controller = TimelapseController::new();
        assert_eq!(controller.set_speed(0.0), Err(TimelapseError::InvalidSpeed(0.0)));
        assert!(controller.set_speed(-2.0).is_err());
        assert!(controller.set_speed(f64::NAN).is_err());
        assert!(controller.set_speed(f64::INFINITY).is_err());
        assert_eq!(controller.frame_interval(), Duration::from_secs(1));
        assert_eq!(controller.frames_per_second(), DEFAULT_FRAMES_PER_SECOND);
    }

    #[test]
    fn test_load_while_playing_stops() {
        let mut controller = loaded(3);
        let pending = tick_of(controller.toggle_play());
        assert_eq!(controller.state(), PlaybackState::Playing);

        assert!(controller.load(frames(2)));
        assert_eq!(controller.state(), PlaybackState::Stopped);
        assert_eq!(controller.current_index(), Some(0));
        assert_eq!(controller.on_tick(pending), Schedule::Done);

        controller.toggle_play();
        controller.load(Vec::new());
        assert_eq!(controller.state(), PlaybackState::Empty);
    }
}
