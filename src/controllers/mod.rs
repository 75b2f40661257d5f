//! UI state machines: the tab bar and the timelapse player.
//!
//! Both are plain synchronous state. Front ends call into them from a
//! single event loop and render from their accessors.

pub mod playback;
pub mod tabs;
pub mod timelapse;

pub use playback::Scheduler;
pub use tabs::{PaneId, TabController, TabError, TabId, FLASH_DURATION};
pub use timelapse::{
    Frame, PlaybackState, Schedule, Tick, TimelapseController, TimelapseError,
    DEFAULT_FRAMES_PER_SECOND, SPEED_CHOICES,
};
