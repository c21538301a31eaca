//! CDP-backed browser driver
//!
//! Implements [`BrowserDriver`] over a chromiumoxide session. DOM access
//! goes through `Runtime.evaluate` with a window-side element registry, so
//! handles naturally go stale when the page navigates (the registry lives
//! on the old document's window).

use super::{BrowserDriver, ElementHandle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How often `wait_for` re-probes the page
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser driver speaking the Chrome DevTools Protocol
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    next_handle: AtomicU64,
}

impl CdpDriver {
    /// Launch a local Chrome/Chromium and open a blank page
    pub async fn launch(headless: bool) -> Result<Self> {
        info!("Launching browser (headless={headless})");

        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        let config = builder
            .build()
            .map_err(|e| Error::browser(format!("Failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::browser(format!("Failed to launch browser: {e}")))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::browser(format!("Failed to open page: {e}")))?;

        Ok(Self {
            browser,
            page,
            next_handle: AtomicU64::new(1),
        })
    }

    /// Close the underlying browser
    pub async fn close(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| Error::browser(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| Error::browser(format!("script result mismatch: {e}")))
    }

    /// Script acting on one registered element; evaluates `body` with `el`
    /// in scope, or yields `null` when the handle no longer resolves.
    fn element_script(el: &ElementHandle, body: &str) -> String {
        format!(
            "(() => {{ const r = window.__pw_els; const el = r && r[{id}]; \
             if (!el || !document.contains(el)) return null; return {body}; }})()",
            id = el.id(),
            body = body
        )
    }

    async fn eval_on_element<T: serde::de::DeserializeOwned>(
        &self,
        el: &ElementHandle,
        body: &str,
    ) -> Result<T> {
        let value: Option<T> = self.eval(Self::element_script(el, body)).await?;
        value.ok_or_else(|| Error::browser("stale element reference"))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| Error::browser(e.to_string()))?
            .ok_or_else(|| Error::browser("page has no URL"))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let sel = serde_json::to_string(selector)?;
        let base = self.next_handle.load(Ordering::SeqCst);
        let script = format!(
            "(() => {{ const reg = (window.__pw_els = window.__pw_els || {{}}); \
             let nodes; try {{ nodes = Array.from(document.querySelectorAll({sel})); }} \
             catch (e) {{ return -1; }} \
             let id = {base}; for (const n of nodes) {{ reg[id++] = n; }} \
             return nodes.length; }})()"
        );
        let count: i64 = self.eval(script).await?;
        if count < 0 {
            return Err(Error::browser(format!("invalid selector: {selector}")));
        }
        let count = count as u64;
        self.next_handle.store(base + count, Ordering::SeqCst);
        Ok((base..base + count).map(ElementHandle::new).collect())
    }

    async fn query_one(&self, selector: &str) -> Result<Option<ElementHandle>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn attr(&self, el: &ElementHandle, name: &str) -> Result<Option<String>> {
        let name = serde_json::to_string(name)?;
        // Wrap in an object so "attribute absent" survives the null-means-stale check
        let value: serde_json::Value = self
            .eval_on_element(el, &format!("({{ v: el.getAttribute({name}) }})"))
            .await?;
        Ok(value
            .get("v")
            .and_then(|v| v.as_str())
            .map(ToString::to_string))
    }

    async fn text(&self, el: &ElementHandle) -> Result<String> {
        self.eval_on_element(el, "(el.innerText || el.textContent || '')")
            .await
    }

    async fn is_enabled(&self, el: &ElementHandle) -> Result<bool> {
        self.eval_on_element(
            el,
            "!(el.disabled || el.getAttribute('aria-disabled') === 'true')",
        )
        .await
    }

    async fn scroll_into_view(&self, el: &ElementHandle) -> Result<()> {
        let _: bool = self
            .eval_on_element(el, "(el.scrollIntoView({block: 'center'}), true)")
            .await?;
        Ok(())
    }

    async fn click(&self, el: &ElementHandle) -> Result<()> {
        let _: bool = self.eval_on_element(el, "(el.click(), true)").await?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| Error::browser(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| Error::browser(e.to_string()))?;
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<serde_json::Value> {
        self.eval(script.to_string()).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let sel = serde_json::to_string(selector)?;
        let probe = format!("document.querySelector({sel}) !== null");
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>(probe.clone()).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn is_stale(&self, el: &ElementHandle) -> Result<bool> {
        let script = format!(
            "(() => {{ const r = window.__pw_els; const el = r && r[{id}]; \
             return !el || !document.contains(el); }})()",
            id = el.id()
        );
        self.eval(script).await
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let _: bool = self
            .eval("(window.scrollTo(0, document.body.scrollHeight), true)".to_string())
            .await?;
        Ok(())
    }

    async fn document_height(&self) -> Result<i64> {
        self.eval("document.body.scrollHeight".to_string()).await
    }
}

impl std::fmt::Debug for CdpDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpDriver").finish_non_exhaustive()
    }
}
