//! Pagination navigation
//!
//! The navigator binds detection, a strategy, and progress state together
//! and drives the extract → record → advance loop with retry, fallback,
//! and a fatal failure threshold. It never raises to its caller: every
//! failure mode resolves into a boolean plus state bookkeeping.

use crate::browser::BrowserDriver;
use crate::config::PaginationConfig;
use crate::error::Result;
use crate::pagination::detector::PaginationDetector;
use crate::pagination::state::{format_duration, PaginationState, ProgressSnapshot};
use crate::pagination::strategy::NavigationStrategy;
use crate::types::{EngineStatus, RetryPolicy, StrategyKind};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cumulative failed-page count at which the run is halted
const FATAL_FAILURE_THRESHOLD: usize = 3;

/// Per-page extraction callback run against the current page before
/// navigating away from it
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Extract data from the current page, returning the item count
    async fn extract(&mut self, browser: &dyn BrowserDriver) -> Result<u64>;
}

/// Extractor that counts the elements matching a CSS selector
#[derive(Debug, Clone)]
pub struct SelectorCountExtractor {
    /// Selector identifying one item
    pub selector: String,
}

impl SelectorCountExtractor {
    /// Count matches of the given selector
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

#[async_trait]
impl PageExtractor for SelectorCountExtractor {
    async fn extract(&mut self, browser: &dyn BrowserDriver) -> Result<u64> {
        let found = browser.query_all(&self.selector).await?;
        Ok(found.len() as u64)
    }
}

/// Orchestrator for page-to-page navigation
pub struct PaginationNavigator {
    config: Arc<PaginationConfig>,
    browser: Arc<dyn BrowserDriver>,
    detector: PaginationDetector,
    state: PaginationState,
    strategy: Option<Box<dyn NavigationStrategy>>,
    status: EngineStatus,
    retry: RetryPolicy,
}

impl PaginationNavigator {
    /// Create an uninitialized navigator over a browser session
    pub fn new(config: Arc<PaginationConfig>, browser: Arc<dyn BrowserDriver>) -> Self {
        let retry = config.retry_policy();
        Self {
            detector: PaginationDetector::new(Arc::clone(&config)),
            config,
            browser,
            state: PaginationState::new(),
            strategy: None,
            status: EngineStatus::Uninitialized,
            retry,
        }
    }

    /// Detect pagination and bind a strategy.
    ///
    /// Returns false (and stays uninitialized) when the page shows no
    /// pagination; detection failures are swallowed into the same outcome.
    pub async fn initialize(&mut self) -> bool {
        info!("Initializing pagination navigation");

        let detection = self.detector.detect(self.browser.as_ref()).await;
        if !detection.has_pagination {
            info!("No pagination detected on current page");
            return false;
        }

        let kind = detection.strategy.unwrap_or_default();
        self.strategy = Some(self.detector.create_strategy(kind));

        if let Some(total) = detection.total_pages {
            self.state.total_pages = Some(total);
        }
        // Seed the position from detection, but never move a restored
        // state backwards
        if detection.current_page > self.state.current_page {
            let _ = self.state.set_page(detection.current_page);
        }
        self.state.strategy = kind.to_string();
        self.status = EngineStatus::Active;

        info!(
            "Pagination initialized with strategy: {kind} (confidence {:.0}%)",
            detection.confidence * 100.0
        );
        true
    }

    /// Whether the run may continue: initialized, not exhausted, and
    /// within the configured limits
    pub fn can_continue(&self) -> bool {
        self.status == EngineStatus::Active
            && self.state.can_continue(self.max_pages(), self.max_items())
    }

    /// Extract from the current page, then navigate to the next one.
    ///
    /// The extraction outcome is recorded against the current page before
    /// navigation is attempted. Returns true when the session is on a new
    /// page afterwards.
    pub async fn navigate_to_next(&mut self, extractor: Option<&mut dyn PageExtractor>) -> bool {
        if self.status != EngineStatus::Active {
            warn!("Pagination not initialized");
            return false;
        }
        if !self.state.can_continue(self.max_pages(), self.max_items()) {
            info!("Pagination limits reached");
            self.status = EngineStatus::Exhausted;
            return false;
        }

        let page = self.state.current_page;
        if let Some(extractor) = extractor {
            match extractor.extract(self.browser.as_ref()).await {
                Ok(items) => {
                    info!("Extracted {items} items from page {page}");
                    if self.state.items_per_page == 0 && items > 0 {
                        self.state.items_per_page = items;
                    }
                    self.state.record_success(page, items);
                }
                Err(e) => {
                    self.state.record_failure(page, &e.to_string());
                }
            }
        } else {
            self.state.record_success(page, 0);
        }

        if self.navigate_with_retry().await {
            let new_page = self.state.advance();
            debug!("Now on page {new_page}");
            if !self.state.can_continue(self.max_pages(), self.max_items()) {
                self.status = EngineStatus::Exhausted;
            }
            true
        } else {
            self.state.record_failure(page, "Navigation failed");
            warn!("Failed to navigate from page {page}");
            false
        }
    }

    /// Bounded-retry navigation with the fallback chain.
    ///
    /// Each attempt tries the bound strategy, then a URL strategy, then a
    /// JavaScript strategy (skipping whichever the bound one already is);
    /// the first success wins. Backoff between attempts is
    /// `wait_time × attempt`.
    async fn navigate_with_retry(&mut self) -> bool {
        let Self {
            browser,
            detector,
            strategy,
            retry,
            ..
        } = self;
        let Some(strategy) = strategy.as_mut() else {
            return false;
        };
        let browser = browser.as_ref();
        let bound_kind = strategy.effective_kind();

        for attempt in 0..retry.max_attempts {
            debug!("Navigation attempt {}/{}", attempt + 1, retry.max_attempts);

            match strategy.navigate(browser).await {
                Ok(()) => return true,
                Err(e) => warn!("Navigation attempt {} failed: {e}", attempt + 1),
            }

            for fallback_kind in [StrategyKind::Url, StrategyKind::Javascript] {
                if bound_kind == fallback_kind {
                    continue;
                }
                let mut fallback = detector.create_strategy(fallback_kind);
                if !fallback.can_handle(browser).await {
                    continue;
                }
                debug!("Trying {fallback_kind} navigation as fallback");
                match fallback.navigate(browser).await {
                    Ok(()) => return true,
                    Err(e) => debug!("{fallback_kind} fallback failed: {e}"),
                }
            }

            if attempt + 1 < retry.max_attempts {
                tokio::time::sleep(retry.delay_for(attempt)).await;
            }
        }

        false
    }

    /// Record an error against the current page and decide whether the run
    /// can go on. Returns false once the fatal threshold is reached.
    pub async fn handle_error(&mut self, error: &crate::error::Error, context: &str) -> bool {
        error!("Pagination error in {context}: {error}");
        self.state
            .record_failure(self.state.current_page, &error.to_string());

        if self.state.failed_pages.len() >= FATAL_FAILURE_THRESHOLD {
            error!("Too many failed pages, stopping pagination");
            self.status = EngineStatus::Exhausted;
            return false;
        }

        // Give the site room to recover before the next attempt
        tokio::time::sleep(self.config.navigation.wait_duration() * 2).await;
        true
    }

    /// Current progress, or `None` before initialization
    pub fn progress(&self) -> Option<ProgressSnapshot> {
        if self.status == EngineStatus::Uninitialized {
            return None;
        }
        Some(self.state.progress(self.config.limits.target_items))
    }

    /// Engine status
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Kind of the bound strategy, if one is bound
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        self.strategy.as_ref().map(|s| s.effective_kind())
    }

    /// Read access to the progress state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Persist the progress state
    pub async fn save_state(&self, path: impl AsRef<Path>) -> Result<()> {
        self.state.save(path).await
    }

    /// Load progress state from a file; a missing or corrupt snapshot
    /// substitutes a fresh default state
    pub async fn load_state(&mut self, path: impl AsRef<Path>) {
        self.state = PaginationState::load(path).await;
    }

    /// Clear the bound strategy and state, returning to uninitialized
    pub fn reset(&mut self) {
        self.state.reset();
        self.strategy = None;
        self.status = EngineStatus::Uninitialized;
        info!("Pagination navigation reset");
    }

    /// Human-readable summary of pagination detection on the current page
    pub async fn pagination_summary(&self) -> String {
        self.detector.summary(self.browser.as_ref()).await
    }

    /// Human-readable summary of the navigation run so far
    pub fn navigation_summary(&self) -> String {
        let Some(progress) = self.progress() else {
            return "Pagination not initialized".to_string();
        };

        let status = if self.can_continue() {
            "active"
        } else {
            "completed"
        };
        let strategy = self
            .strategy_kind()
            .map_or_else(|| self.state.strategy.clone(), |k| k.to_string());

        let mut summary = String::from("Pagination Navigation Summary\n");
        summary.push_str(&format!("Status: {status}\n"));
        summary.push_str(&format!("Strategy: {strategy}\n"));
        summary.push_str(&format!("Current Page: {}\n", progress.current_page));
        if let Some(total) = progress.total_pages {
            summary.push_str(&format!("Total Pages: {total}\n"));
        }
        summary.push_str(&format!("Items Found: {}\n", progress.total_items));
        summary.push_str(&format!("Success Rate: {:.1}%\n", progress.success_rate));
        summary.push_str(&format!(
            "Elapsed Time: {}\n",
            format_duration(progress.elapsed)
        ));
        if let Some(eta) = progress.estimated_completion {
            summary.push_str(&format!("Estimated Completion: {}\n", format_duration(eta)));
        }
        if !self.state.failed_pages.is_empty() {
            let pages: Vec<String> = self
                .state
                .failed_pages
                .iter()
                .map(ToString::to_string)
                .collect();
            summary.push_str(&format!("Failed Pages: {}\n", pages.join(", ")));
        }
        summary
    }

    fn max_pages(&self) -> Option<u32> {
        (self.config.limits.max_pages > 0).then_some(self.config.limits.max_pages)
    }

    fn max_items(&self) -> Option<u64> {
        (self.config.limits.max_items > 0).then_some(self.config.limits.max_items)
    }
}

impl std::fmt::Debug for PaginationNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationNavigator")
            .field("status", &self.status)
            .field("strategy", &self.strategy_kind())
            .field("current_page", &self.state.current_page)
            .finish_non_exhaustive()
    }
}
