//! Durable authentication-session persistence.
//!
//! One JSON file per account identity at
//! `<baseDir>/session-<identity>.json`, holding cookies plus web-storage
//! snapshots. A record on disk implies a prior successful login; it is
//! written wholesale by the login flow, replayed verbatim into fresh browser
//! contexts, and removed only by an explicit clear.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

mod replay;
pub mod snapshot;

pub(crate) use replay::{capture, restore};

/// Identity used when the caller does not name an account.
pub const DEFAULT_IDENTITY: &str = "default";

/// One captured cookie, in the storage-state shape used on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Seconds since epoch; negative or absent means a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

/// Serialized authentication state for one account identity.
///
/// The storage fields hold JSON-encoded flat string maps exactly as captured
/// from the page, so a record replays without re-interpreting the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub cookies: Vec<CookieEntry>,
    #[serde(default = "empty_map")]
    pub local_storage: String,
    #[serde(default = "empty_map")]
    pub session_storage: String,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            cookies: Vec::new(),
            local_storage: empty_map(),
            session_storage: empty_map(),
        }
    }
}

fn empty_map() -> String {
    "{}".to_string()
}

/// Per-identity store for one [`SessionRecord`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store keyed by identity under `base_dir`.
    pub fn new(base_dir: &Path, identity: Option<&str>) -> Self {
        let identity = identity
            .map(sanitize_identity)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_IDENTITY.to_string());
        Self {
            path: base_dir.join(format!("session-{identity}.json")),
        }
    }

    /// Backing file path; also anchors any persistent profile directory the
    /// browser engine derives from it.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record exists on disk. No side effects.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the stored record.
    ///
    /// # Errors
    ///
    /// [`Error::SessionMissing`] when no record exists; `Io`/`Json` on a
    /// present but unreadable file.
    pub fn read(&self) -> Result<SessionRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SessionMissing);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Overwrites the record wholesale, creating the base directory first.
    /// Records are never merged; each successful login replaces the file.
    pub fn write(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, json)?;
        debug!(
            target = "crosspost.session",
            path = %self.path.display(),
            cookies = record.cookies.len(),
            "session record written"
        );
        Ok(())
    }

    /// Removes the record. Idempotent; reports whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn sanitize_identity(identity: &str) -> String {
    identity
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
