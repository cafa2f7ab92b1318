//! Browser-automation posting subsystem.
//!
//! The scheduler publishes to most platforms over official HTTP APIs; Reddit
//! has no usable one for this workload, so posting there drives a real
//! rendered page through a multi-step authenticated workflow. This crate owns
//! that subsystem end to end:
//!
//! - [`session`] - durable per-account authentication state (cookies plus
//!   web-storage snapshots) persisted across process restarts
//! - [`login`] - the human-assisted login flow that creates a session
//! - [`post`] - the automated submission flow (navigate, fill, submit, verify)
//! - [`guard`] - process-wide single-flight gating for automation runs
//! - [`engine`] - the seam to the controllable browser engine
//! - [`poster`] - the application-scoped facade the serving layer talks to
//!
//! Nothing in here throws across the subsystem boundary: every public entry
//! point converts internal failures into structured results.

pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod login;
pub mod post;
pub mod poster;
pub mod progress;
pub mod reddit;
pub mod session;
pub mod types;

pub use config::{PosterConfig, RetryOptions};
pub use error::{Error, Result};
pub use poster::Poster;
pub use progress::{ProgressEvent, ProgressStage};
pub use session::{CookieEntry, SessionRecord, SessionStore};
pub use types::{LoginResult, LoginStatus, PostDraft, PostKind, PostResult, SessionStatus};
