//! Scripted browser engine used to drive the controllers without a browser.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crosspost::engine::{BrowserEngine, EngineSession, LaunchOptions};
use crosspost::error::Result;
use crosspost::session::CookieEntry;

/// Everything a controller asked the engine to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Goto(String),
    Click(String),
    Fill(String, String),
    ClickByText(String, String),
    SetCookies(Vec<CookieEntry>),
    Evaluate(String),
    WaitIdle,
    Pause,
}

/// Scripted responses shared by every session the engine hands out.
#[derive(Default)]
pub struct Behavior {
    /// URLs returned by successive `current_url` calls; the last repeats.
    pub urls: Vec<String>,
    /// `inner_text` responses keyed by selector.
    pub texts: HashMap<String, String>,
    /// `evaluate` responses keyed by exact script; anything else is `Null`.
    pub eval: HashMap<String, serde_json::Value>,
    /// Cookies reported by `cookies()`.
    pub cookies: Vec<CookieEntry>,
    /// `(selector, text)` pairs `click_by_text` reports as unmatched.
    pub misses: Vec<(String, String)>,
    /// Navigations to this URL block until the flag flips true.
    pub hold: Option<(String, watch::Receiver<bool>)>,
}

pub struct MockEngine {
    behavior: Arc<Behavior>,
    launches: AtomicUsize,
    closes: Arc<AtomicUsize>,
    ops: Arc<Mutex<Vec<Op>>>,
    headless: Arc<Mutex<Vec<bool>>>,
}

impl MockEngine {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Arc::new(behavior),
            launches: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            ops: Arc::new(Mutex::new(Vec::new())),
            headless: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().clone()
    }

    /// Headless flag of each launch, in order.
    pub fn headless_launches(&self) -> Vec<bool> {
        self.headless.lock().clone()
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn launch(&self, options: LaunchOptions) -> Result<Box<dyn EngineSession>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.headless.lock().push(options.headless);
        Ok(Box::new(MockSession {
            behavior: Arc::clone(&self.behavior),
            ops: Arc::clone(&self.ops),
            closes: Arc::clone(&self.closes),
            url_cursor: 0,
            closed: false,
        }))
    }
}

pub struct MockSession {
    behavior: Arc<Behavior>,
    ops: Arc<Mutex<Vec<Op>>>,
    closes: Arc<AtomicUsize>,
    url_cursor: usize,
    closed: bool,
}

impl MockSession {
    fn record(&self, op: Op) {
        self.ops.lock().push(op);
    }
}

#[async_trait]
impl EngineSession for MockSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.record(Op::Goto(url.to_string()));
        if let Some((held_url, release)) = &self.behavior.hold {
            if url == held_url {
                let mut release = release.clone();
                while !*release.borrow() {
                    if release.changed().await.is_err() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        let urls = &self.behavior.urls;
        let url = urls
            .get(self.url_cursor)
            .or_else(|| urls.last())
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string());
        if self.url_cursor + 1 < urls.len() {
            self.url_cursor += 1;
        }
        Ok(url)
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.record(Op::Click(selector.to_string()));
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.record(Op::Fill(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<bool> {
        self.record(Op::ClickByText(selector.to_string(), text.to_string()));
        let missed = self
            .behavior
            .misses
            .iter()
            .any(|(s, t)| s == selector && t == text);
        Ok(!missed)
    }

    async fn inner_text(&mut self, selector: &str) -> Result<Option<String>> {
        Ok(self.behavior.texts.get(selector).cloned())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        self.record(Op::Evaluate(script.to_string()));
        Ok(self
            .behavior
            .eval
            .get(script)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn cookies(&mut self) -> Result<Vec<CookieEntry>> {
        Ok(self.behavior.cookies.clone())
    }

    async fn set_cookies(&mut self, cookies: &[CookieEntry]) -> Result<()> {
        self.record(Op::SetCookies(cookies.to_vec()));
        Ok(())
    }

    async fn wait_for_idle(&mut self) -> Result<()> {
        self.record(Op::WaitIdle);
        Ok(())
    }

    async fn pause(&mut self, _duration: Duration) {
        self.record(Op::Pause);
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// A cookie in the shape the login flow captures.
pub fn sample_cookie() -> CookieEntry {
    CookieEntry {
        name: "reddit_session".into(),
        value: "token".into(),
        domain: Some(".reddit.com".into()),
        path: Some("/".into()),
        expires: Some(-1.0),
        http_only: true,
        secure: true,
        same_site: Some("Lax".into()),
    }
}
