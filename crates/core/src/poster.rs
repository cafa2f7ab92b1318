//! Application-scoped facade over the posting subsystem.
//!
//! One [`Poster`] is constructed at startup and shared by reference with
//! every caller; there is no lazily-built module singleton. All entry points
//! catch internal failures and return structured results, so nothing throws
//! across the subsystem boundary.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::config::PosterConfig;
use crate::engine::{BrowserEngine, ChromiumEngine};
use crate::error::Error;
use crate::guard::Gate;
use crate::login::LoginController;
use crate::post::PostingController;
use crate::progress::{ProgressEvent, ProgressSender, ProgressStage};
use crate::session::SessionStore;
use crate::types::{LoginResult, LoginStatus, PostDraft, PostResult, SessionStatus};

/// Shared handle for login, posting, and session management.
pub struct Poster {
    config: PosterConfig,
    engine: Arc<dyn BrowserEngine>,
    post_gate: Gate,
    login_gate: Gate,
    progress: ProgressSender,
    login_cancel: watch::Sender<bool>,
}

impl Poster {
    /// Builds a poster backed by the production chromium engine.
    pub fn new(config: PosterConfig) -> Self {
        let engine = Arc::new(ChromiumEngine::new(config.element_timeout));
        Self::with_engine(config, engine)
    }

    /// Builds a poster over any engine implementation.
    pub fn with_engine(config: PosterConfig, engine: Arc<dyn BrowserEngine>) -> Self {
        let (login_cancel, _) = watch::channel(false);
        Self {
            config,
            engine,
            post_gate: Gate::new("post"),
            login_gate: Gate::new("login"),
            progress: ProgressSender::default(),
            login_cancel,
        }
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Subscribes to run progress. Events are ephemeral; a new subscriber
    /// only sees what is emitted after it joins.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    /// Whether a posting run is active. Pure read.
    pub fn is_running(&self) -> bool {
        self.post_gate.is_running()
    }

    /// Whether a login run is active. Pure read.
    pub fn is_login_running(&self) -> bool {
        self.login_gate.is_running()
    }

    /// Asks an in-flight login wait to abandon itself.
    pub fn cancel_login(&self) {
        self.login_cancel.send_replace(true);
    }

    fn store(&self, identity: Option<&str>) -> SessionStore {
        SessionStore::new(&self.config.base_dir, identity)
    }

    /// Runs the human-assisted login flow for an identity.
    ///
    /// Rejected immediately when a login is already in flight. On success the
    /// session store holds a fresh record; on failure any pre-existing record
    /// is untouched.
    pub async fn perform_login(&self, identity: Option<&str>) -> LoginResult {
        let Some(_pass) = self.login_gate.try_enter() else {
            return LoginResult::failed(Error::AlreadyRunning("login").to_string());
        };
        self.login_cancel.send_replace(false);

        let store = self.store(identity);
        let controller = LoginController::new(&*self.engine, &store, &self.config, &self.progress);
        match controller.run(self.login_cancel.subscribe()).await {
            Ok(username) => {
                self.progress
                    .emit(ProgressStage::Completed, format!("Logged in as {username}"));
                LoginResult::logged_in(username)
            }
            Err(err) => {
                warn!(target = "crosspost.login", error = %err, "login failed");
                self.progress.emit(ProgressStage::Failed, err.to_string());
                LoginResult::failed(err.to_string())
            }
        }
    }

    /// Checks whether the stored session still reaches a logged-in account.
    /// A missing session reports failure without launching a browser.
    pub async fn check_login_status(&self, identity: Option<&str>) -> LoginStatus {
        let store = self.store(identity);
        let controller = LoginController::new(&*self.engine, &store, &self.config, &self.progress);
        match controller.check_status().await {
            Ok(username) => LoginStatus::logged_in(username),
            Err(err) => LoginStatus::failed(err.to_string()),
        }
    }

    /// Presence summary for the stored session. `is_valid` mirrors presence;
    /// expiry is not checked at this layer.
    pub fn session_status(&self, identity: Option<&str>) -> SessionStatus {
        let has_session = self.store(identity).exists();
        SessionStatus {
            has_session,
            is_valid: has_session,
        }
    }

    /// Removes the stored session. Idempotent; reports whether the store is
    /// clear afterwards.
    pub fn clear_session(&self, identity: Option<&str>) -> bool {
        match self.store(identity).clear() {
            Ok(removed) => {
                info!(target = "crosspost.session", removed, "session cleared");
                true
            }
            Err(err) => {
                warn!(target = "crosspost.session", error = %err, "session clear failed");
                false
            }
        }
    }

    /// Runs one posting attempt for a draft.
    ///
    /// At most one posting run exists process-wide; a concurrent attempt
    /// fails immediately with a structured result and never touches the
    /// browser engine.
    pub async fn post(&self, identity: Option<&str>, draft: PostDraft) -> PostResult {
        let Some(_pass) = self.post_gate.try_enter() else {
            return PostResult::failed(Error::AlreadyRunning("post").to_string());
        };

        let store = self.store(identity);
        let controller = PostingController::new(&*self.engine, &store, &self.config, &self.progress);
        match controller.run(&draft).await {
            Ok(url) => {
                self.progress
                    .emit(ProgressStage::Completed, format!("Posted to {url}"));
                PostResult::published(url)
            }
            Err(err) => {
                warn!(target = "crosspost.post", error = %err, "posting failed");
                self.progress.emit(ProgressStage::Failed, err.to_string());
                PostResult::failed(err.to_string())
            }
        }
    }
}
