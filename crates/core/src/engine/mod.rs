//! Seam to the controllable browser automation engine.
//!
//! Controllers drive a [`EngineSession`] and never see engine internals, so
//! the production chromium implementation and the scripted engines used in
//! tests are interchangeable. A session handle only exists once a launch has
//! succeeded; there is no half-initialized state to check for at call sites.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::session::CookieEntry;

pub mod chromium;

pub use chromium::ChromiumEngine;

/// Options for one browser launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Persistent profile directory, when one is used.
    pub profile_dir: Option<PathBuf>,
}

/// Launches browser sessions. Constructed once and shared.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Starts a browser and opens one page.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BrowserLaunch`] when the engine cannot start.
    async fn launch(&self, options: LaunchOptions) -> Result<Box<dyn EngineSession>>;
}

/// One exclusively-owned browser page, alive for the duration of a run.
///
/// Every method may suspend on engine I/O; each is bounded by the engine's
/// per-operation timeout rather than a caller-supplied one.
#[async_trait]
pub trait EngineSession: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    async fn current_url(&mut self) -> Result<String>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Sets a field's value verbatim and fires the page's input events.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Clicks the first element matching `selector` whose trimmed visible
    /// text equals `text` exactly. Returns whether anything matched.
    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<bool>;

    /// Visible text of the first matching element, or `None` when no element
    /// appears within the engine's wait bound.
    async fn inner_text(&mut self, selector: &str) -> Result<Option<String>>;

    /// Evaluates a script in page context and returns its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    async fn cookies(&mut self) -> Result<Vec<CookieEntry>>;

    async fn set_cookies(&mut self, cookies: &[CookieEntry]) -> Result<()>;

    /// Waits until in-flight page activity settles, best effort.
    async fn wait_for_idle(&mut self) -> Result<()>;

    /// Fixed settle delay.
    async fn pause(&mut self, duration: Duration);

    /// Releases the browser. Idempotent; later calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}

/// Releases a session on a run's exit path. Disposal failures never surface
/// to callers; they are logged and swallowed.
pub(crate) async fn dispose(session: &mut dyn EngineSession) {
    if let Err(err) = session.close().await {
        debug!(target = "crosspost.engine", error = %err, "browser disposal failed");
    }
}
