//! Navigation strategy implementations
//!
//! Each strategy handles a specific pagination pattern: URL rewriting,
//! clicking a "next" control, or loading more content by scrolling. The
//! auto strategy tries the concrete ones in order and binds to the first
//! that claims the page.

use crate::browser::BrowserDriver;
use crate::config::PaginationConfig;
use crate::error::{Error, Result};
use crate::types::StrategyKind;
use async_trait::async_trait;
use regex::Regex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Settle timeout for the post-navigation presence check
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// How often staleness is re-checked after a click
const STALE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Core trait for navigation strategies
#[async_trait]
pub trait NavigationStrategy: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// The concrete kind actually driving navigation; composites report
    /// the strategy they bound to
    fn effective_kind(&self) -> StrategyKind {
        self.kind()
    }

    /// Whether this strategy can drive the current page
    async fn can_handle(&mut self, browser: &dyn BrowserDriver) -> bool;

    /// The URL the next page would live at, when one can be computed.
    /// Click- and scroll-driven strategies return the current URL.
    async fn next_target(
        &self,
        browser: &dyn BrowserDriver,
        current_url: &str,
    ) -> Result<Option<String>>;

    /// Perform one page-to-page advancement
    async fn navigate(&mut self, browser: &dyn BrowserDriver) -> Result<()>;

    /// Total page count, when this strategy can see one
    async fn estimate_total_pages(&self, browser: &dyn BrowserDriver) -> Option<u32>;
}

/// Extract a page number from an element label like `"7"`
fn parse_page_label(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Highest numeric label among elements matching `selector`
async fn max_page_label(browser: &dyn BrowserDriver, selector: &str) -> Option<u32> {
    let elements = browser.query_all(selector).await.ok()?;
    let mut max = None;
    for el in elements {
        if let Ok(text) = browser.text(&el).await {
            if let Some(n) = parse_page_label(&text) {
                max = Some(max.map_or(n, |m: u32| m.max(n)));
            }
        }
    }
    max
}

// ============================================================================
// URL Strategy
// ============================================================================

/// One compiled page-number pattern
#[derive(Debug, Clone)]
struct PagePattern {
    regex: Regex,
    /// Path-segment pattern (leading `/`) vs query-parameter pattern
    is_path: bool,
}

/// URL-based navigation (e.g. `?page=2`, `/page/3/`)
///
/// Matches the current URL against an ordered pattern list, increments the
/// discovered page number, and loads the rewritten URL.
#[derive(Debug)]
pub struct UrlStrategy {
    patterns: Vec<PagePattern>,
    /// Query parameter rewritten/inserted for query-based matches
    pub page_param: String,
    /// Template for the no-pattern-matched first-page fallback;
    /// empty disables it
    pub first_page_template: String,
    /// Settle pause after loading the next URL
    pub wait_time: Duration,
}

impl UrlStrategy {
    /// Build from configuration; invalid patterns are skipped with a warning
    pub fn from_config(config: &PaginationConfig) -> Self {
        let patterns = config
            .url_patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(regex) => Some(PagePattern {
                    regex,
                    is_path: p.starts_with('/'),
                }),
                Err(e) => {
                    warn!("Ignoring invalid URL pattern '{p}': {e}");
                    None
                }
            })
            .collect();

        Self {
            patterns,
            page_param: config.page_param.clone(),
            first_page_template: config.first_page_template.clone(),
            wait_time: config.navigation.wait_duration(),
        }
    }

    /// Find the first matching pattern, path patterns first
    fn find_match<'a>(&self, url: &'a str) -> Option<(regex::Captures<'a>, bool)> {
        for pattern in self.patterns.iter().filter(|p| p.is_path) {
            if let Some(caps) = pattern.regex.captures(url) {
                return Some((caps, true));
            }
        }
        for pattern in self.patterns.iter().filter(|p| !p.is_path) {
            if let Some(caps) = pattern.regex.captures(url) {
                return Some((caps, false));
            }
        }
        None
    }

    /// Compute the next URL from the current one, without touching the page
    pub fn next_url(&self, current_url: &str) -> Option<String> {
        if let Some((caps, is_path)) = self.find_match(current_url) {
            let page_group = caps.get(1)?;
            let current_page: u32 = page_group.as_str().parse().ok()?;
            let next_page = current_page + 1;

            if is_path {
                // Splice the new number over the matched digits
                let mut next = String::with_capacity(current_url.len() + 2);
                next.push_str(&current_url[..page_group.start()]);
                next.push_str(&next_page.to_string());
                next.push_str(&current_url[page_group.end()..]);
                debug!("Next page URL (path-based): {next}");
                return Some(next);
            }

            let next = set_query_param(current_url, &self.page_param, next_page)?;
            debug!("Next page URL (query-based): {next}");
            return Some(next);
        }

        // No pattern matched: assume page 1 and synthesize a target
        if self.first_page_template.is_empty() {
            return None;
        }
        let base = current_url.trim_end_matches('/');
        if base.ends_with("/page/1") {
            return None;
        }
        let next = self
            .first_page_template
            .replace("{base}", base)
            .replace("{page}", "2");
        debug!("Next page URL (first page fallback): {next}");
        Some(next)
    }
}

/// Rewrite or insert a query parameter on a URL
fn set_query_param(url_str: &str, param: &str, value: u32) -> Option<String> {
    let mut url = url::Url::parse(url_str).ok()?;
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &remaining {
        pairs.append_pair(k, v);
    }
    pairs.append_pair(param, &value.to_string());
    drop(pairs);

    Some(url.to_string())
}

#[async_trait]
impl NavigationStrategy for UrlStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Url
    }

    async fn can_handle(&mut self, browser: &dyn BrowserDriver) -> bool {
        let Ok(url) = browser.current_url().await else {
            return false;
        };
        self.find_match(&url).is_some() || !self.first_page_template.is_empty()
    }

    async fn next_target(
        &self,
        _browser: &dyn BrowserDriver,
        current_url: &str,
    ) -> Result<Option<String>> {
        Ok(self.next_url(current_url))
    }

    async fn navigate(&mut self, browser: &dyn BrowserDriver) -> Result<()> {
        let current_url = browser.current_url().await?;
        let next_url = self
            .next_url(&current_url)
            .ok_or_else(|| Error::navigation("no next URL could be derived"))?;

        info!("Navigating to {next_url}");
        browser.goto(&next_url).await?;
        tokio::time::sleep(self.wait_time).await;

        if !browser.wait_for("body", PAGE_LOAD_TIMEOUT).await? {
            return Err(Error::navigation("page body did not appear after load"));
        }
        Ok(())
    }

    async fn estimate_total_pages(&self, browser: &dyn BrowserDriver) -> Option<u32> {
        // Explicit indicators first, then the highest numbered link
        for selector in [
            "[data-total-pages]",
            "[data-last-page]",
            ".pagination .total",
            ".pagination .last",
            ".pagination .count",
        ] {
            let Ok(Some(el)) = browser.query_one(selector).await else {
                continue;
            };
            for attr in ["data-total-pages", "data-last-page"] {
                if let Ok(Some(value)) = browser.attr(&el, attr).await {
                    if let Some(n) = parse_page_label(&value) {
                        return Some(n);
                    }
                }
            }
            if let Ok(text) = browser.text(&el).await {
                if let Some(n) = last_number_in(&text) {
                    return Some(n);
                }
            }
        }
        max_page_label(browser, ".pagination a, .pagination .page").await
    }
}

/// Last run of digits in a string, e.g. `"Page 2 of 17"` → 17
fn last_number_in(text: &str) -> Option<u32> {
    let mut result = None;
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            result = current.parse().ok().or(result);
            current.clear();
        }
    }
    if !current.is_empty() {
        result = current.parse().ok().or(result);
    }
    result
}

// ============================================================================
// JavaScript Click Strategy
// ============================================================================

/// Click-driven navigation: find the "next" control, click it, and require
/// the old DOM reference to go stale within a bounded wait
#[derive(Debug)]
pub struct ClickStrategy {
    /// Selector for the "next" control
    pub next_button: String,
    /// Selector for pagination containers (capability probe)
    pub container: String,
    /// Selector for numbered page links (total-page estimates)
    pub page_numbers: String,
    /// Settle pause after the click
    pub wait_time: Duration,
    /// How long the old DOM reference gets to go stale
    pub stale_timeout: Duration,
}

impl ClickStrategy {
    /// Build from configuration
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            next_button: config.selectors.next_button.clone(),
            container: config.selectors.pagination_container.clone(),
            page_numbers: config.selectors.page_numbers.clone(),
            wait_time: config.navigation.wait_duration(),
            stale_timeout: PAGE_LOAD_TIMEOUT,
        }
    }
}

#[async_trait]
impl NavigationStrategy for ClickStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Javascript
    }

    async fn can_handle(&mut self, browser: &dyn BrowserDriver) -> bool {
        match browser.query_all(&self.container).await {
            Ok(found) if !found.is_empty() => true,
            Ok(_) => matches!(browser.query_one(&self.next_button).await, Ok(Some(_))),
            Err(e) => {
                debug!("Error checking click pagination: {e}");
                false
            }
        }
    }

    async fn next_target(
        &self,
        _browser: &dyn BrowserDriver,
        current_url: &str,
    ) -> Result<Option<String>> {
        // Navigation happens in place via clicks
        Ok(Some(current_url.to_string()))
    }

    async fn navigate(&mut self, browser: &dyn BrowserDriver) -> Result<()> {
        let button = browser
            .query_one(&self.next_button)
            .await?
            .ok_or_else(|| Error::navigation("next button not found"))?;

        if !browser.is_enabled(&button).await? {
            return Err(Error::navigation("next button is disabled"));
        }

        browser.scroll_into_view(&button).await?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        browser.click(&button).await?;
        tokio::time::sleep(self.wait_time).await;

        // Success means the page visibly changed: the clicked control's
        // DOM reference goes stale
        let deadline = Instant::now() + self.stale_timeout;
        loop {
            if browser.is_stale(&button).await.unwrap_or(true) {
                info!("Clicked next button; page changed");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::navigation("page did not change after click"));
            }
            tokio::time::sleep(STALE_POLL_INTERVAL).await;
        }
    }

    async fn estimate_total_pages(&self, browser: &dyn BrowserDriver) -> Option<u32> {
        max_page_label(browser, &self.page_numbers).await
    }
}

// ============================================================================
// Infinite Scroll Strategy
// ============================================================================

/// Controls that load another batch of content when clicked
const LOAD_MORE_SELECTORS: &str = ".load-more, .load-more-btn, .show-more, .infinite-scroll-trigger";

/// Indicators that a page loads content on scroll
const SCROLL_INDICATOR_SELECTORS: &str =
    "[data-infinite-scroll], [class*='infinite'], [class*='scroll'], .load-more, .infinite-scroll";

/// Scroll-driven navigation: click a "load more" control when present,
/// otherwise scroll to the bottom and require the document to grow
#[derive(Debug)]
pub struct ScrollStrategy {
    /// Pause after a scroll round before re-measuring the document
    pub scroll_pause: Duration,
    /// Settle pause after a "load more" click
    pub wait_time: Duration,
    /// Scroll rounds allowed before the strategy gives up
    pub max_scrolls: u32,
    scrolls_done: u32,
}

impl ScrollStrategy {
    /// Build from configuration
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            scroll_pause: config.navigation.scroll_pause_duration(),
            wait_time: config.navigation.wait_duration(),
            max_scrolls: config.limits.max_scrolls,
            scrolls_done: 0,
        }
    }
}

#[async_trait]
impl NavigationStrategy for ScrollStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InfiniteScroll
    }

    async fn can_handle(&mut self, browser: &dyn BrowserDriver) -> bool {
        match browser.query_all(SCROLL_INDICATOR_SELECTORS).await {
            Ok(found) if !found.is_empty() => true,
            _ => matches!(browser.query_one(LOAD_MORE_SELECTORS).await, Ok(Some(_))),
        }
    }

    async fn next_target(
        &self,
        _browser: &dyn BrowserDriver,
        current_url: &str,
    ) -> Result<Option<String>> {
        // Content loads in place
        Ok(Some(current_url.to_string()))
    }

    async fn navigate(&mut self, browser: &dyn BrowserDriver) -> Result<()> {
        if self.scrolls_done >= self.max_scrolls {
            return Err(Error::navigation(format!(
                "scroll limit ({}) reached",
                self.max_scrolls
            )));
        }
        self.scrolls_done += 1;

        // A "load more" control beats blind scrolling
        if let Some(button) = browser.query_one(LOAD_MORE_SELECTORS).await? {
            if browser.is_enabled(&button).await? {
                browser.scroll_into_view(&button).await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                browser.click(&button).await?;
                tokio::time::sleep(self.wait_time).await;
                info!("Clicked load more button");
                return Ok(());
            }
        }

        let initial_height = browser.document_height().await?;
        browser.scroll_to_bottom().await?;
        tokio::time::sleep(self.scroll_pause).await;
        let new_height = browser.document_height().await?;

        if new_height > initial_height {
            info!("Scrolled to load more content ({initial_height} -> {new_height})");
            Ok(())
        } else {
            Err(Error::navigation("no more content to load"))
        }
    }

    async fn estimate_total_pages(&self, _browser: &dyn BrowserDriver) -> Option<u32> {
        // Infinite scroll has no page count
        None
    }
}

// ============================================================================
// Auto Strategy
// ============================================================================

/// Composite strategy that binds to the first concrete strategy claiming
/// the page and delegates from then on
pub struct AutoStrategy {
    strategies: Vec<Box<dyn NavigationStrategy>>,
    bound: Option<usize>,
}

impl AutoStrategy {
    /// Build with the standard URL → click → scroll ordering
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            strategies: vec![
                Box::new(UrlStrategy::from_config(config)),
                Box::new(ClickStrategy::from_config(config)),
                Box::new(ScrollStrategy::from_config(config)),
            ],
            bound: None,
        }
    }

    /// The strategy this composite committed to, if any
    pub fn bound_kind(&self) -> Option<StrategyKind> {
        self.bound.map(|i| self.strategies[i].kind())
    }

    async fn bind(&mut self, browser: &dyn BrowserDriver) -> Option<usize> {
        if self.bound.is_some() {
            return self.bound;
        }
        for (idx, strategy) in self.strategies.iter_mut().enumerate() {
            if strategy.can_handle(browser).await {
                info!("Auto strategy bound to {}", strategy.kind());
                self.bound = Some(idx);
                return self.bound;
            }
        }
        None
    }
}

#[async_trait]
impl NavigationStrategy for AutoStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Auto
    }

    fn effective_kind(&self) -> StrategyKind {
        self.bound_kind().unwrap_or(StrategyKind::Auto)
    }

    async fn can_handle(&mut self, browser: &dyn BrowserDriver) -> bool {
        match self.bound {
            Some(idx) => self.strategies[idx].can_handle(browser).await,
            None => self.bind(browser).await.is_some(),
        }
    }

    async fn next_target(
        &self,
        browser: &dyn BrowserDriver,
        current_url: &str,
    ) -> Result<Option<String>> {
        match self.bound {
            Some(idx) => self.strategies[idx].next_target(browser, current_url).await,
            None => Ok(None),
        }
    }

    async fn navigate(&mut self, browser: &dyn BrowserDriver) -> Result<()> {
        let idx = self
            .bind(browser)
            .await
            .ok_or_else(|| Error::navigation("no applicable strategy"))?;
        self.strategies[idx].navigate(browser).await
    }

    async fn estimate_total_pages(&self, browser: &dyn BrowserDriver) -> Option<u32> {
        match self.bound {
            Some(idx) => self.strategies[idx].estimate_total_pages(browser).await,
            None => None,
        }
    }
}

impl std::fmt::Debug for AutoStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoStrategy")
            .field("bound", &self.bound_kind())
            .finish_non_exhaustive()
    }
}
