//! Automated submission flow: navigate, fill, submit, verify.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::PosterConfig;
use crate::engine::{self, BrowserEngine, EngineSession, LaunchOptions};
use crate::error::{Error, Result};
use crate::progress::{ProgressSender, ProgressStage};
use crate::reddit::{self, selectors};
use crate::session::{self, SessionStore};
use crate::types::{PostDraft, PostKind};

/// Delay after opening the flair picker before its options are read.
const FLAIR_MENU_DELAY: Duration = Duration::from_millis(500);

/// Drives one posting run: `Initializing -> LoadingTarget -> FillingForm ->
/// Submitting -> Verifying`, with progress at each stage.
pub struct PostingController<'a> {
    engine: &'a dyn BrowserEngine,
    store: &'a SessionStore,
    config: &'a PosterConfig,
    progress: &'a ProgressSender,
}

impl<'a> PostingController<'a> {
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

    /// Runs one submission attempt and returns the published permalink.
    ///
    /// Fails with [`Error::SessionMissing`] before any browser resources are
    /// allocated when no stored session exists. The browser is released on
    /// every exit path.
    pub async fn run(&self, draft: &PostDraft) -> Result<String> {
        draft.validate()?;
        self.progress
            .emit(ProgressStage::Initializing, "Preparing submission");
        let record = self.store.read()?;

        let mut session = self
            .engine
            .launch(LaunchOptions {
                headless: self.config.headless,
                profile_dir: self.config.profile_dir.clone(),
            })
            .await?;
        let outcome = self.drive(session.as_mut(), draft, &record).await;
        engine::dispose(session.as_mut()).await;
        outcome
    }

    async fn drive(
        &self,
        session: &mut dyn EngineSession,
        draft: &PostDraft,
        record: &session::SessionRecord,
    ) -> Result<String> {
        session::restore(session, record).await?;

        let submit_url = reddit::submit_url(&draft.target_community)?;
        self.progress.emit(
            ProgressStage::Loading,
            format!("Opening submission page for {}", draft.target_community),
        );
        session.goto(&submit_url).await?;
        session.wait_for_idle().await?;

        self.progress
            .emit(ProgressStage::Filling, "Filling the submission form");
        self.fill_form(session, draft).await?;

        self.progress
            .emit(ProgressStage::Submitting, "Submitting the post");
        session.click(selectors::SUBMIT_BUTTON).await?;
        session.wait_for_idle().await?;
        session.pause(self.config.settle_delay).await;

        self.progress
            .emit(ProgressStage::Verifying, "Verifying the published post");
        let landed = session.current_url().await?;
        if reddit::is_permalink(&landed) {
            info!(target = "crosspost.post", url = %landed, "submission verified");
            Ok(landed)
        } else {
            Err(Error::SubmissionVerification { url: landed })
        }
    }

    async fn fill_form(&self, session: &mut dyn EngineSession, draft: &PostDraft) -> Result<()> {
        let tab = draft.kind.tab_label();
        if !session.click_by_text(selectors::POST_TYPE_TAB, tab).await? {
            return Err(Error::Interaction {
                selector: selectors::POST_TYPE_TAB.to_string(),
                message: format!("no `{tab}` tab on the submission page"),
            });
        }

        if draft.kind == PostKind::Link {
            if let Some(url) = draft.url.as_deref() {
                // The URL goes in verbatim; any trimming or rewriting would
                // change what gets published.
                session.fill(selectors::URL_FIELD, url).await?;
            }
        }

        session.fill(selectors::TITLE_FIELD, &draft.caption).await?;

        if let Some(flair) = draft.flair.as_deref() {
            self.select_flair(session, flair).await?;
        }
        Ok(())
    }

    /// Opens the flair picker and selects the option whose visible text
    /// equals `flair` exactly. No match is a silent no-op: the post goes out
    /// unflaired rather than failing the run.
    async fn select_flair(&self, session: &mut dyn EngineSession, flair: &str) -> Result<()> {
        session.click(selectors::FLAIR_BUTTON).await?;
        session.pause(FLAIR_MENU_DELAY).await;
        let matched = session.click_by_text(selectors::FLAIR_OPTION, flair).await?;
        if !matched {
            warn!(target = "crosspost.post", flair, "no flair option matched; posting without flair");
        }
        Ok(())
    }
}
