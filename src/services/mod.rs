//! Workflow layer for mtcam.
//!
//! Keeps the viewer state separate from any particular front end so the
//! terminal UI and the one-shot commands share the same behavior.

pub mod session;

pub use session::{Session, SessionError};
