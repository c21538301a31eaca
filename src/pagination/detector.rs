//! Pagination detection
//!
//! Inspects the current page through the browser driver, scores how likely
//! it is to carry pagination, recommends a strategy, and manufactures
//! strategy instances.

use crate::browser::BrowserDriver;
use crate::config::PaginationConfig;
use crate::pagination::strategy::{
    AutoStrategy, ClickStrategy, NavigationStrategy, ScrollStrategy, UrlStrategy,
};
use crate::types::StrategyKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

/// Selectors probed per element category, beyond the configured ones
const CONTAINER_SELECTORS: &[&str] = &[
    ".pagination",
    ".pager",
    ".page-navigation",
    ".pagination-wrapper",
    "[class*='pagination']",
    "[class*='pager']",
];

const NEXT_BUTTON_SELECTORS: &[&str] = &[
    ".pagination .next",
    ".pagination .next-page",
    ".pager .next",
    ".next-page",
    "[aria-label*='next']",
    "[title*='next']",
];

const PREV_BUTTON_SELECTORS: &[&str] = &[
    ".pagination .prev",
    ".pagination .prev-page",
    ".pager .prev",
    ".prev-page",
    "[aria-label*='previous']",
    "[title*='previous']",
];

const PAGE_NUMBER_SELECTORS: &[&str] = &[
    ".pagination .page",
    ".pagination a",
    ".pager .page",
    ".pager a",
    ".page-number",
    "[data-page]",
];

const CURRENT_PAGE_SELECTORS: &[&str] = &[
    ".pagination .current",
    ".pagination .active",
    ".pager .current",
    ".pager .active",
    ".current-page",
    ".active-page",
];

const TOTAL_PAGE_SELECTORS: &[&str] = &[
    "[data-total-pages]",
    "[data-last-page]",
    ".pagination .total",
    ".pagination .last",
    ".pagination .count",
];

const INFINITE_SCROLL_SELECTORS: &[&str] = &[
    "[data-infinite-scroll]",
    "[class*='infinite']",
    ".load-more",
    ".load-more-btn",
    ".show-more",
    ".infinite-scroll",
    ".infinite-scroll-trigger",
    ".lazy-load",
];

/// Query parameters commonly carrying a page number
const PAGE_QUERY_PARAMS: &[&str] = &["page", "p", "pg", "pageno", "pagenumber"];

static PATH_PAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"/page/(\d+)", r"/p/(\d+)", r"/pg/(\d+)"]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
});

/// What a detection pass found on the page.
///
/// Ephemeral: produced per `detect` call and consumed immediately.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Whether the page appears to carry pagination at all
    pub has_pagination: bool,

    /// Strategy chosen for the page (forced, configured, or recommended)
    pub strategy: Option<StrategyKind>,

    /// Element category → number of matches
    pub elements: BTreeMap<String, usize>,

    /// Pagination patterns spotted in the URL (e.g. `page=<number>`)
    pub url_patterns: Vec<String>,

    /// Total page estimate, when the page exposes one
    pub total_pages: Option<u32>,

    /// Current page estimate (defaults to 1)
    pub current_page: u32,

    /// Additive likelihood score in [0, 1]
    pub confidence: f64,
}

/// Heuristic pagination detector
#[derive(Debug)]
pub struct PaginationDetector {
    config: Arc<PaginationConfig>,
}

impl PaginationDetector {
    /// Create a detector over the shared configuration
    pub fn new(config: Arc<PaginationConfig>) -> Self {
        Self { config }
    }

    /// Detect whether the current page has pagination.
    ///
    /// With `pagination.enabled` set, the configured strategy is trusted and
    /// heuristics only fill in the details. Driver failures are swallowed;
    /// the result then reports no pagination.
    pub async fn detect(&self, browser: &dyn BrowserDriver) -> Detection {
        if self.config.enabled {
            let mut detection = self.scan(browser).await;
            detection.has_pagination = true;
            detection.strategy = Some(self.config.strategy);
            info!(
                "Using configured pagination strategy: {}",
                self.config.strategy
            );
            return detection;
        }

        let mut detection = self.scan(browser).await;
        if detection.has_pagination {
            let recommended = recommend_strategy(&detection);
            detection.strategy = Some(recommended);
            info!("Auto-detected pagination strategy: {recommended}");
        } else {
            info!("No pagination detected on current page");
        }
        detection
    }

    /// Run the heuristic scan and build raw detection info
    async fn scan(&self, browser: &dyn BrowserDriver) -> Detection {
        let mut detection = Detection {
            current_page: 1,
            ..Detection::default()
        };

        let containers = self
            .count_matches(
                browser,
                CONTAINER_SELECTORS,
                &self.config.selectors.pagination_container,
            )
            .await;
        if containers > 0 {
            detection.has_pagination = true;
            detection.elements.insert("container".to_string(), containers);
            detection.confidence += 0.3;
        }

        let next_buttons = self
            .count_matches(
                browser,
                NEXT_BUTTON_SELECTORS,
                &self.config.selectors.next_button,
            )
            .await;
        if next_buttons > 0 {
            detection
                .elements
                .insert("next_button".to_string(), next_buttons);
            detection.confidence += 0.2;
        }

        let prev_buttons = self
            .count_matches(
                browser,
                PREV_BUTTON_SELECTORS,
                &self.config.selectors.prev_button,
            )
            .await;
        if prev_buttons > 0 {
            detection
                .elements
                .insert("prev_button".to_string(), prev_buttons);
            detection.confidence += 0.1;
        }

        let page_numbers = self
            .count_matches(
                browser,
                PAGE_NUMBER_SELECTORS,
                &self.config.selectors.page_numbers,
            )
            .await;
        if page_numbers > 0 {
            detection
                .elements
                .insert("page_numbers".to_string(), page_numbers);
            detection.confidence += 0.2;
        }

        let current_indicators = self
            .count_matches(
                browser,
                CURRENT_PAGE_SELECTORS,
                &self.config.selectors.current_page,
            )
            .await;
        if current_indicators > 0 {
            detection
                .elements
                .insert("current_page".to_string(), current_indicators);
            detection.confidence += 0.1;
        }

        let current_url = browser.current_url().await.unwrap_or_default();
        detection.url_patterns = detect_url_patterns(&current_url);
        if !detection.url_patterns.is_empty() {
            detection.confidence += 0.2;
        }

        if let Some(total) = self.extract_total_pages(browser).await {
            detection.total_pages = Some(total);
            detection.confidence += 0.1;
        }

        detection.current_page = self.extract_current_page(browser, &current_url).await;

        if self.has_infinite_scroll(browser).await {
            detection.has_pagination = true;
            detection.strategy = Some(StrategyKind::InfiniteScroll);
            detection.confidence += 0.3;
        }

        detection.confidence = detection.confidence.min(1.0);
        detection
    }

    /// Count elements across a selector list plus the configured selector
    async fn count_matches(
        &self,
        browser: &dyn BrowserDriver,
        selectors: &[&str],
        configured: &str,
    ) -> usize {
        let mut count = 0;
        for selector in selectors.iter().copied().chain([configured]) {
            match browser.query_all(selector).await {
                Ok(found) => count += found.len(),
                Err(e) => debug!("Selector '{selector}' failed: {e}"),
            }
        }
        count
    }

    /// Total pages: explicit indicator first, then the highest numbered link
    async fn extract_total_pages(&self, browser: &dyn BrowserDriver) -> Option<u32> {
        for selector in TOTAL_PAGE_SELECTORS {
            let Ok(Some(el)) = browser.query_one(selector).await else {
                continue;
            };
            for attr in ["data-total-pages", "data-last-page"] {
                if let Ok(Some(value)) = browser.attr(&el, attr).await {
                    if let Ok(n) = value.trim().parse() {
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

        let mut max = None;
        for selector in PAGE_NUMBER_SELECTORS
            .iter()
            .copied()
            .chain([self.config.selectors.page_numbers.as_str()])
        {
            let Ok(elements) = browser.query_all(selector).await else {
                continue;
            };
            for el in elements {
                if let Ok(text) = browser.text(&el).await {
                    let trimmed = text.trim();
                    if let Ok(n) = trimmed.parse::<u32>() {
                        max = Some(max.map_or(n, |m: u32| m.max(n)));
                    }
                }
            }
        }
        max
    }

    /// Current page: explicit indicator, then the page query parameter,
    /// then 1
    async fn extract_current_page(&self, browser: &dyn BrowserDriver, url: &str) -> u32 {
        for selector in CURRENT_PAGE_SELECTORS
            .iter()
            .copied()
            .chain([self.config.selectors.current_page.as_str()])
        {
            let Ok(elements) = browser.query_all(selector).await else {
                continue;
            };
            for el in elements {
                if let Ok(text) = browser.text(&el).await {
                    if let Ok(n) = text.trim().parse() {
                        return n;
                    }
                }
            }
        }

        let param = regex::escape(&self.config.page_param);
        if let Ok(re) = Regex::new(&format!(r"[?&]{param}=(\d+)")) {
            if let Some(caps) = re.captures(url) {
                if let Ok(n) = caps[1].parse() {
                    return n;
                }
            }
        }

        1
    }

    async fn has_infinite_scroll(&self, browser: &dyn BrowserDriver) -> bool {
        for selector in INFINITE_SCROLL_SELECTORS {
            if let Ok(found) = browser.query_all(selector).await {
                if !found.is_empty() {
                    return true;
                }
            }
        }
        false
    }

    /// Create a strategy instance by kind
    pub fn create_strategy(&self, kind: StrategyKind) -> Box<dyn NavigationStrategy> {
        match kind {
            StrategyKind::Url => Box::new(UrlStrategy::from_config(&self.config)),
            StrategyKind::Javascript => Box::new(ClickStrategy::from_config(&self.config)),
            StrategyKind::InfiniteScroll => Box::new(ScrollStrategy::from_config(&self.config)),
            StrategyKind::Auto => Box::new(AutoStrategy::from_config(&self.config)),
        }
    }

    /// Human-readable summary of a detection pass
    pub async fn summary(&self, browser: &dyn BrowserDriver) -> String {
        let detection = self.detect(browser).await;
        if !detection.has_pagination {
            return "No pagination detected".to_string();
        }

        let strategy = detection.strategy.unwrap_or_default();
        let mut out = format!(
            "Pagination detected (Strategy: {strategy}, Confidence: {:.0}%)\n",
            detection.confidence * 100.0
        );
        if let Some(total) = detection.total_pages {
            let _ = writeln!(out, "Total pages: {total}");
        }
        let _ = writeln!(out, "Current page: {}", detection.current_page);
        if !detection.url_patterns.is_empty() {
            let _ = writeln!(out, "URL patterns: {}", detection.url_patterns.join(", "));
        }
        if !detection.elements.is_empty() {
            let _ = writeln!(out, "Elements found:");
            for (kind, count) in &detection.elements {
                let _ = writeln!(out, "  - {kind}: {count}");
            }
        }
        out.trim_end().to_string()
    }
}

/// Recommend a strategy for a detection result.
///
/// Pure function of the detection info: low confidence falls back to auto;
/// a forced infinite-scroll tag, URL patterns, and clickable elements are
/// honored in that order.
pub fn recommend_strategy(detection: &Detection) -> StrategyKind {
    if detection.confidence < 0.3 {
        return StrategyKind::Auto;
    }
    if detection.strategy == Some(StrategyKind::InfiniteScroll) {
        return StrategyKind::InfiniteScroll;
    }
    if !detection.url_patterns.is_empty() {
        return StrategyKind::Url;
    }
    if detection.elements.contains_key("next_button") || detection.elements.contains_key("page_numbers")
    {
        return StrategyKind::Javascript;
    }
    StrategyKind::Auto
}

/// Pagination patterns present in a URL
fn detect_url_patterns(url: &str) -> Vec<String> {
    let mut patterns = Vec::new();

    if let Ok(parsed) = url::Url::parse(url) {
        for param in PAGE_QUERY_PARAMS {
            if parsed.query_pairs().any(|(k, _)| k == *param) {
                patterns.push(format!("{param}=<number>"));
            }
        }
    }

    for re in PATH_PAGE_PATTERNS.iter() {
        if re.is_match(url) {
            patterns.push(re.as_str().replace(r"(\d+)", "<number>"));
        }
    }

    patterns
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
