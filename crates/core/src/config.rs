//! Fixed per-process configuration for automation runs.

use std::path::PathBuf;
use std::time::Duration;

/// Retry/backoff knobs accepted in configuration.
///
/// Carried for configuration compatibility but not consumed by the posting
/// algorithm: no retry is performed by this layer, and rate limiting is not
/// detected. A rate-limited submission fails verification like any other.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub retries: u32,
    pub rate_limit_delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            rate_limit_delay: Duration::from_secs(30),
        }
    }
}

/// Configuration shared by every run, constructed once per process.
#[derive(Debug, Clone)]
pub struct PosterConfig {
    /// Directory holding `session-<identity>.json` files.
    pub base_dir: PathBuf,
    /// Whether posting runs use a headless browser. Login runs are always
    /// headed; a human completes them.
    pub headless: bool,
    /// Optional persistent browser profile directory.
    pub profile_dir: Option<PathBuf>,
    /// Overall deadline for the human-assisted login wait.
    pub login_timeout: Duration,
    /// Interval at which the login wait re-reads the current URL.
    pub poll_interval: Duration,
    /// Fixed delay after submission before reading the landing URL.
    pub settle_delay: Duration,
    /// Per-element bound on selector waits.
    pub element_timeout: Duration,
    pub retry: RetryOptions,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            headless: true,
            profile_dir: None,
            login_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            element_timeout: Duration::from_secs(15),
            retry: RetryOptions::default(),
        }
    }
}

impl PosterConfig {
    /// Sets the session/profile base directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Sets headless/headed mode for posting runs.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets the login wait deadline.
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Sets the login-wait poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the post-submission settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crosspost")
        .join("sessions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let config = PosterConfig::default();
        assert_eq!(config.login_timeout, Duration::from_secs(300));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.settle_delay, Duration::from_secs(2));
        assert!(config.headless);
    }

    #[test]
    fn builders_override_fields() {
        let config = PosterConfig::default()
            .with_base_dir("/tmp/x")
            .with_headless(false)
            .with_login_timeout(Duration::from_millis(50));
        assert_eq!(config.base_dir, PathBuf::from("/tmp/x"));
        assert!(!config.headless);
        assert_eq!(config.login_timeout, Duration::from_millis(50));
    }
}
