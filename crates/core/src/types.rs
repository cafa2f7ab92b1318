//! Inputs and terminal outputs of automation runs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The submission mode a draft targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Link,
    Text,
    Image,
}

impl PostKind {
    /// Visible label of the post-type tab on the submission page.
    pub fn tab_label(self) -> &'static str {
        match self {
            PostKind::Link => "Link",
            PostKind::Text => "Text",
            PostKind::Image => "Images & Video",
        }
    }
}

/// An unsubmitted post description, immutable input to one posting attempt.
///
/// Drafts are resolved by the caller from scheduler records and are never
/// persisted by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub kind: PostKind,
    /// Community name, with or without the `r/` prefix.
    pub target_community: String,
    pub caption: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub flair: Option<String>,
}

impl PostDraft {
    /// Rejects drafts that cannot be submitted as described.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDraft`] for an empty community or caption, or
    /// a link draft without a URL.
    pub fn validate(&self) -> Result<()> {
        if self.target_community.trim().is_empty() {
            return Err(Error::InvalidDraft("target community is required".into()));
        }
        if self.caption.trim().is_empty() {
            return Err(Error::InvalidDraft("caption is required".into()));
        }
        if self.kind == PostKind::Link && self.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(Error::InvalidDraft("link posts require a url".into()));
        }
        Ok(())
    }
}

/// Terminal output of one posting attempt.
///
/// `success == true` always carries a non-empty `url`; construct results
/// through [`PostResult::published`] and [`PostResult::failed`] to keep that
/// invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostResult {
    pub fn published(url: impl Into<String>) -> Self {
        let url = url.into();
        debug_assert!(!url.is_empty(), "published results carry a permalink");
        Self {
            success: true,
            url: Some(url),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
        }
    }
}

/// Output of a login run, and of session-validity checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A login-status check has the same shape as a login result.
pub type LoginStatus = LoginResult;

impl LoginResult {
    pub fn logged_in(username: impl Into<String>) -> Self {
        let username = username.into();
        debug_assert!(!username.is_empty(), "successful logins carry a username");
        Self {
            success: true,
            username: Some(username),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            username: None,
            error: Some(error.into()),
        }
    }
}

/// Presence/validity summary of a stored session.
///
/// `is_valid` currently mirrors `has_session`; no expiry or liveness check is
/// performed at this layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub has_session: bool,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_draft() -> PostDraft {
        PostDraft {
            kind: PostKind::Link,
            target_community: "test".into(),
            caption: "Hello".into(),
            url: Some("https://example.com/x".into()),
            flair: None,
        }
    }

    #[test]
    fn link_draft_without_url_is_rejected() {
        let draft = PostDraft {
            url: None,
            ..link_draft()
        };
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("link posts require a url"));
    }

    #[test]
    fn text_draft_without_url_is_fine() {
        let draft = PostDraft {
            kind: PostKind::Text,
            url: None,
            ..link_draft()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn blank_community_is_rejected() {
        let draft = PostDraft {
            target_community: "  ".into(),
            ..link_draft()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn result_wire_shape_is_camel_case() {
        let json = serde_json::to_value(PostResult::published("https://r.example/comments/a1")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["url"], "https://r.example/comments/a1");
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(PostResult::failed("No session found")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No session found");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn draft_accepts_camel_case_payload() {
        let draft: PostDraft = serde_json::from_str(
            r#"{"kind":"link","targetCommunity":"rustlang","caption":"t","url":"https://e.com"}"#,
        )
        .unwrap();
        assert_eq!(draft.kind, PostKind::Link);
        assert_eq!(draft.target_community, "rustlang");
        assert!(draft.flair.is_none());
    }
}
