//! The Reddit UI surface the controllers drive.
//!
//! URLs, URL classification, and the CSS selectors for the login, settings,
//! and submission pages live here so markup churn lands in one file.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

pub const ORIGIN: &str = "https://www.reddit.com";
pub const LOGIN_URL: &str = "https://www.reddit.com/login/";
pub const SETTINGS_URL: &str = "https://www.reddit.com/settings";

static LOGIN_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"reddit\.com/login").expect("static pattern compiles"));

static PERMALINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/comments/[0-9a-z]+").expect("static pattern compiles"));

/// Whether a URL is still the login surface. The login wait polls this until
/// it flips.
pub fn is_login_url(url: &str) -> bool {
    LOGIN_PAGE.is_match(url)
}

/// Whether a URL is an accepted successful-submission landing page.
pub fn is_permalink(url: &str) -> bool {
    PERMALINK.is_match(url)
}

/// Submission page for a community, accepting names with or without the
/// `r/` prefix.
///
/// # Errors
///
/// Returns [`Error::InvalidDraft`] when the community name does not form a
/// valid URL path segment.
pub fn submit_url(community: &str) -> Result<String> {
    let name = community.trim().trim_start_matches("r/");
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidDraft(format!(
            "`{community}` is not a community name"
        )));
    }
    let url = Url::parse(ORIGIN)
        .and_then(|base| base.join(&format!("/r/{name}/submit")))
        .map_err(|err| Error::InvalidDraft(format!("`{community}`: {err}")))?;
    Ok(url.to_string())
}

/// Selectors for the surfaces the controllers touch.
pub mod selectors {
    /// Visible username on the settings page.
    pub const USERNAME: &str = "[data-testid='profile-username'], span.user a";

    /// Post-type tabs on the submission page; matched by visible label.
    pub const POST_TYPE_TAB: &str = "button[role='tab']";

    pub const TITLE_FIELD: &str = "textarea[name='title'], faceplate-textarea-input[name='title']";

    /// URL field shown on the Link tab.
    pub const URL_FIELD: &str = "textarea[name='link'], input[name='url']";

    pub const FLAIR_BUTTON: &str = "button[aria-label='Add flair']";

    /// Options inside the opened flair picker; matched by visible label.
    pub const FLAIR_OPTION: &str = "div[role='menuitem'], [data-testid='flair-option']";

    pub const SUBMIT_BUTTON: &str = "button[type='submit'], button#submit-post-button";
}
