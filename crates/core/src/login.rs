//! Human-assisted login flow.
//!
//! The controller opens a headed browser on the platform's login page and
//! waits for a person to finish authenticating, polling the current URL until
//! it leaves the login surface. It then reads the account identity from the
//! settings page and captures the full session through the store. Failure or
//! timeout leaves any previously stored session untouched; the record is only
//! written after identity extraction succeeds.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::PosterConfig;
use crate::engine::{self, BrowserEngine, EngineSession, LaunchOptions};
use crate::error::{Error, Result};
use crate::progress::{ProgressSender, ProgressStage};
use crate::reddit;
use crate::session::{self, SessionStore};

/// Drives one login run: `Initializing -> AwaitingUserLogin ->
/// ExtractingIdentity -> PersistingSession`, with progress at each
/// transition.
pub struct LoginController<'a> {
    engine: &'a dyn BrowserEngine,
    store: &'a SessionStore,
    config: &'a PosterConfig,
    progress: &'a ProgressSender,
}

impl<'a> LoginController<'a> {
    pub fn new(
        engine: &'a dyn BrowserEngine,
        store: &'a SessionStore,
        config: &'a PosterConfig,
        progress: &'a ProgressSender,
    ) -> Self {
        Self {
            engine,
            store,
            config,
            progress,
        }
    }

    /// Runs the flow to completion and returns the extracted username.
    ///
    /// The wait is abandoned when `cancel` flips to `true`. The browser is
    /// released on every exit path.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> Result<String> {
        self.progress
            .emit(ProgressStage::Initializing, "Launching browser for login");
        // Login is always headed; a human completes it.
        let mut session = self
            .engine
            .launch(LaunchOptions {
                headless: false,
                profile_dir: self.config.profile_dir.clone(),
            })
            .await?;
        let outcome = self.drive(session.as_mut(), &mut cancel).await;
        engine::dispose(session.as_mut()).await;
        outcome
    }

    async fn drive(
        &self,
        session: &mut dyn EngineSession,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<String> {
        match self.store.read() {
            // Re-login/refresh: start from the stored session so the user
            // may only need to confirm, not re-enter credentials.
            Ok(existing) => session::restore(session, &existing).await?,
            Err(Error::SessionMissing) => {}
            Err(err) => {
                warn!(target = "crosspost.login", error = %err, "stored session unreadable; starting fresh");
            }
        }

        session.goto(reddit::LOGIN_URL).await?;
        self.progress
            .emit(ProgressStage::Loading, "Waiting for login to complete");
        self.await_authenticated(session, cancel).await?;

        self.progress
            .emit(ProgressStage::Verifying, "Reading account identity");
        let username = extract_username(session).await?;

        self.progress
            .emit(ProgressStage::Submitting, "Saving session");
        let record = session::capture(session).await?;
        self.store.write(&record)?;
        info!(target = "crosspost.login", %username, "session captured");
        Ok(username)
    }

    /// Polls the current URL at the configured interval until it leaves the
    /// login surface, bounded by the login deadline and the cancel signal.
    async fn await_authenticated(
        &self,
        session: &mut dyn EngineSession,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.login_timeout;
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let url = session.current_url().await?;
                    if !reddit::is_login_url(&url) {
                        return Ok(());
                    }
                    if tokio::time::Instant::now() >= deadline {
                        return Err(Error::LoginTimeout);
                    }
                }
                _ = tokio::time::sleep_until(deadline) => return Err(Error::LoginTimeout),
                changed = cancel.changed() => {
                    match changed {
                        Ok(()) if *cancel.borrow() => return Err(Error::LoginCancelled),
                        Ok(()) => {}
                        // Sender gone means the owning handle is being torn
                        // down; treat as cancellation.
                        Err(_) => return Err(Error::LoginCancelled),
                    }
                }
            }
        }
    }

    /// Validates the stored session by restoring it and reading the identity.
    ///
    /// # Errors
    ///
    /// [`Error::SessionMissing`] without launching a browser when no record
    /// exists; [`Error::IdentityExtraction`] when the restored session no
    /// longer reaches a readable username.
    pub async fn check_status(&self) -> Result<String> {
        let record = self.store.read()?;
        let mut session = self
            .engine
            .launch(LaunchOptions {
                headless: self.config.headless,
                profile_dir: self.config.profile_dir.clone(),
            })
            .await?;
        let outcome = check_drive(session.as_mut(), &record).await;
        engine::dispose(session.as_mut()).await;
        outcome
    }
}

async fn check_drive(
    session: &mut dyn EngineSession,
    record: &crate::session::SessionRecord,
) -> Result<String> {
    session::restore(session, record).await?;
    extract_username(session).await
}

async fn extract_username(session: &mut dyn EngineSession) -> Result<String> {
    session.goto(reddit::SETTINGS_URL).await?;
    session.wait_for_idle().await?;
    let text = session.inner_text(reddit::selectors::USERNAME).await?;
    text.as_deref()
        .map(normalize_username)
        .filter(|name| !name.is_empty())
        .ok_or(Error::IdentityExtraction)
}

fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches("u/").to_string()
}
