//! Error taxonomy for the posting subsystem.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by session persistence, login, and posting runs.
///
/// The `Display` text of the fast-fail variants is part of the public
/// contract: callers receive it verbatim inside `{success: false, error}`
/// results and some UIs match on it.
#[derive(Debug, Error)]
pub enum Error {
    /// No stored session exists for the requested account identity.
    #[error("No session found")]
    SessionMissing,

    /// The login page was still showing when the login wait deadline passed.
    #[error("Login timeout")]
    LoginTimeout,

    /// The login wait was abandoned by an external cancellation signal.
    #[error("Login cancelled")]
    LoginCancelled,

    /// The settings surface did not expose a readable username.
    #[error("Could not read a logged-in username")]
    IdentityExtraction,

    /// Another run of the same automation type holds the single-flight gate.
    #[error("A {0} is already in progress")]
    AlreadyRunning(&'static str),

    /// The draft cannot be submitted as described.
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    /// The post-submission URL did not match the accepted permalink shape.
    #[error("Submission could not be verified (landed on {url})")]
    SubmissionVerification { url: String },

    /// The browser engine failed to start.
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// A page navigation failed.
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A selector-level click/fill/read failed. Engine failures during form
    /// interaction are deliberately unclassified beyond this.
    #[error("Interaction with `{selector}` failed: {message}")]
    Interaction { selector: String, message: String },

    /// Any other browser-engine failure.
    #[error("Browser engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_fail_messages_are_stable() {
        assert_eq!(Error::SessionMissing.to_string(), "No session found");
        assert_eq!(Error::LoginTimeout.to_string(), "Login timeout");
        assert_eq!(
            Error::AlreadyRunning("post").to_string(),
            "A post is already in progress"
        );
        assert_eq!(
            Error::AlreadyRunning("login").to_string(),
            "A login is already in progress"
        );
    }

    #[test]
    fn verification_error_names_the_landing_url() {
        let err = Error::SubmissionVerification {
            url: "https://www.reddit.com/r/test/submit".into(),
        };
        assert!(err.to_string().contains("/r/test/submit"));
    }
}
