//! Production engine backed by chromiumoxide over the DevTools protocol.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::{BrowserEngine, EngineSession, LaunchOptions};
use crate::error::{Error, Result};
use crate::session::CookieEntry;

const ELEMENT_POLL: Duration = Duration::from_millis(250);
const IDLE_GRACE: Duration = Duration::from_millis(500);

/// Launches Chromium sessions with a fixed per-element wait bound.
#[derive(Debug, Clone)]
pub struct ChromiumEngine {
    element_timeout: Duration,
}

impl ChromiumEngine {
    pub fn new(element_timeout: Duration) -> Self {
        Self { element_timeout }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self, options: LaunchOptions) -> Result<Box<dyn EngineSession>> {
        let mut builder = BrowserConfig::builder().request_timeout(self.element_timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(dir) = &options.profile_dir {
            builder = builder.user_data_dir(dir);
        }
        let config = builder.build().map_err(Error::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::BrowserLaunch(e.to_string()))?;

        // The handler stream must be drained for the whole session lifetime.
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                driver.abort();
                return Err(Error::BrowserLaunch(err.to_string()));
            }
        };

        debug!(target = "crosspost.engine", headless = options.headless, "chromium session started");
        Ok(Box::new(ChromiumSession {
            state: State::Ready {
                browser,
                page,
                driver,
            },
            element_timeout: self.element_timeout,
        }))
    }
}

enum State {
    Ready {
        browser: Browser,
        page: Page,
        driver: JoinHandle<()>,
    },
    Closed,
}

pub struct ChromiumSession {
    state: State,
    element_timeout: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        match &self.state {
            State::Ready { page, .. } => Ok(page),
            State::Closed => Err(Error::Engine("browser session is closed".into())),
        }
    }

    async fn wait_for_element(&self, selector: &str) -> Result<chromiumoxide::Element> {
        let deadline = tokio::time::Instant::now() + self.element_timeout;
        loop {
            match self.page()?.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(err) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(Error::Interaction {
                            selector: selector.to_string(),
                            message: err.to_string(),
                        });
                    }
                    tokio::time::sleep(ELEMENT_POLL).await;
                }
            }
        }
    }
}

#[async_trait]
impl EngineSession for ChromiumSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.page()?
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| Error::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn current_url(&mut self) -> Result<String> {
        let url = self
            .page()?
            .url()
            .await
            .map_err(|e| Error::Engine(e.to_string()))?;
        url.ok_or_else(|| Error::Engine("page reported no url".into()))
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self.wait_for_element(selector).await?;
        element
            .click()
            .await
            .map(|_| ())
            .map_err(|e| Error::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.wait_for_element(selector).await?;
        let accepted = self.evaluate(&fill_script(selector, value)).await?;
        if accepted.as_bool() != Some(true) {
            return Err(Error::Interaction {
                selector: selector.to_string(),
                message: "element did not accept input".into(),
            });
        }
        Ok(())
    }

    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<bool> {
        let clicked = self.evaluate(&click_by_text_script(selector, text)).await?;
        Ok(clicked.as_bool() == Some(true))
    }

    async fn inner_text(&mut self, selector: &str) -> Result<Option<String>> {
        let deadline = tokio::time::Instant::now() + self.element_timeout;
        let element = loop {
            match self.page()?.find_element(selector).await {
                Ok(element) => break element,
                Err(_) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(ELEMENT_POLL).await;
                }
                Err(_) => return Ok(None),
            }
        };
        element
            .inner_text()
            .await
            .map_err(|e| Error::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| Error::Engine(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn cookies(&mut self) -> Result<Vec<CookieEntry>> {
        let cookies = self
            .page()?
            .get_cookies()
            .await
            .map_err(|e| Error::Engine(e.to_string()))?;
        // The wire shape of a CDP cookie is a superset of the stored entry,
        // so conversion is a serde pass rather than field plumbing.
        let mut entries = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            let value = serde_json::to_value(&cookie)?;
            entries.push(serde_json::from_value(value)?);
        }
        Ok(entries)
    }

    async fn set_cookies(&mut self, cookies: &[CookieEntry]) -> Result<()> {
        let mut params: Vec<CookieParam> = Vec::with_capacity(cookies.len());
        for entry in cookies {
            let value = serde_json::to_value(entry)?;
            params.push(serde_json::from_value(value)?);
        }
        self.page()?
            .set_cookies(params)
            .await
            .map(|_| ())
            .map_err(|e| Error::Engine(e.to_string()))
    }

    async fn wait_for_idle(&mut self) -> Result<()> {
        let page = self.page()?;
        // wait_for_navigation resolves with the in-flight load; when nothing
        // is pending the timeout path is the settled case, not a failure.
        if let Ok(result) =
            tokio::time::timeout(self.element_timeout, page.wait_for_navigation()).await
        {
            result.map(|_| ()).map_err(|e| Error::Engine(e.to_string()))?;
        }
        tokio::time::sleep(IDLE_GRACE).await;
        Ok(())
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Ready {
                mut browser,
                page,
                driver,
            } => {
                drop(page);
                let closed = browser.close().await;
                let _ = browser.wait().await;
                driver.abort();
                closed.map(|_| ()).map_err(|e| Error::Engine(e.to_string()))
            }
            State::Closed => Ok(()),
        }
    }
}

fn fill_script(selector: &str, value: &str) -> String {
    format!(
        r#"((sel, value) => {{
  const el = document.querySelector(sel);
  if (!el) return false;
  const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
  const descriptor = Object.getOwnPropertyDescriptor(proto, 'value');
  if (descriptor && descriptor.set) {{ descriptor.set.call(el, value); }} else {{ el.value = value; }}
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})({sel}, {val})"#,
        sel = literal(selector),
        val = literal(value),
    )
}

fn click_by_text_script(selector: &str, text: &str) -> String {
    format!(
        r#"((sel, want) => {{
  for (const el of document.querySelectorAll(sel)) {{
    if ((el.textContent || '').trim() === want) {{ el.click(); return true; }}
  }}
  return false;
}})({sel}, {want})"#,
        sel = literal(selector),
        want = literal(text),
    )
}

fn literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_script_embeds_the_exact_value() {
        let script = fill_script("textarea[name='title']", "Hello \"world\"\nline two");
        assert!(script.contains(&literal("Hello \"world\"\nline two")));
        assert!(script.contains("dispatchEvent(new Event('input'"));
    }

    #[test]
    fn click_by_text_matches_trimmed_text() {
        let script = click_by_text_script("button[role='tab']", "Link");
        assert!(script.contains(".trim() === want"));
        assert!(script.contains(&literal("button[role='tab']")));
    }

    #[test]
    fn cookie_entry_converts_to_cdp_param() {
        let entry = CookieEntry {
            name: "reddit_session".into(),
            value: "token".into(),
            domain: Some(".reddit.com".into()),
            path: Some("/".into()),
            expires: Some(-1.0),
            http_only: true,
            secure: true,
            same_site: Some("Lax".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        let param: CookieParam = serde_json::from_value(value).unwrap();
        assert_eq!(param.name, "reddit_session");
        assert_eq!(param.value, "token");
        assert_eq!(param.domain.as_deref(), Some(".reddit.com"));
    }
}
