//! Configuration types for the pagination engine
//!
//! One immutable configuration value is built once (from YAML or JSON) and
//! passed by reference to the detector, strategies, and navigator.

use crate::error::{Error, Result};
use crate::types::{BackoffType, RetryPolicy, StrategyKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Pagination Config
// ============================================================================

/// Complete pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// When true, skip heuristics and trust `strategy`
    #[serde(default)]
    pub enabled: bool,

    /// Strategy to use when `enabled` is set (or recommended by detection)
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Pagination element selectors
    #[serde(default)]
    pub selectors: SelectorsConfig,

    /// Run limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Navigation timing and retry settings
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Ordered page-number patterns; path patterns (leading `/`) are
    /// checked before query-parameter patterns
    #[serde(default = "default_url_patterns")]
    pub url_patterns: Vec<String>,

    /// Query parameter to rewrite for URL-based navigation
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Template used to synthesize a next-page URL when the current URL
    /// carries no page marker at all (assumed page 1). Placeholders:
    /// `{base}` and `{page}`. Empty string disables the fallback.
    #[serde(default = "default_first_page_template")]
    pub first_page_template: String,

    /// CSS selector counted per page by the CLI extractor
    #[serde(default)]
    pub item_selector: Option<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strategy: StrategyKind::Auto,
            selectors: SelectorsConfig::default(),
            limits: LimitsConfig::default(),
            navigation: NavigationConfig::default(),
            url_patterns: default_url_patterns(),
            page_param: default_page_param(),
            first_page_template: default_first_page_template(),
            item_selector: None,
        }
    }
}

fn default_url_patterns() -> Vec<String> {
    vec![
        r"[?&]page=(\d+)".to_string(),
        r"[?&]p=(\d+)".to_string(),
        r"[?&]pg=(\d+)".to_string(),
        r"[?&]pageno=(\d+)".to_string(),
        r"/page/(\d+)".to_string(),
        r"/p/(\d+)".to_string(),
    ]
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_first_page_template() -> String {
    "{base}/page/{page}/".to_string()
}

impl PaginationConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file, dispatching on extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(Error::config(format!(
                "Unsupported config extension for {}: expected .yaml, .yml, or .json",
                path.display()
            ))),
        }
    }

    /// Retry policy for navigation attempts (linear `wait_time × attempt`)
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.navigation.retry_attempts,
            self.navigation.wait_duration(),
            BackoffType::Linear,
        )
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// Pagination element selectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorsConfig {
    /// "Next page" control
    #[serde(default = "default_next_button")]
    pub next_button: String,

    /// "Previous page" control
    #[serde(default = "default_prev_button")]
    pub prev_button: String,

    /// Numbered page links
    #[serde(default = "default_page_numbers")]
    pub page_numbers: String,

    /// Current page indicator
    #[serde(default = "default_current_page")]
    pub current_page: String,

    /// Pagination container element
    #[serde(default = "default_container")]
    pub pagination_container: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            next_button: default_next_button(),
            prev_button: default_prev_button(),
            page_numbers: default_page_numbers(),
            current_page: default_current_page(),
            pagination_container: default_container(),
        }
    }
}

fn default_next_button() -> String {
    ".pagination .next, .pagination .next-page".to_string()
}

fn default_prev_button() -> String {
    ".pagination .prev, .pagination .prev-page".to_string()
}

fn default_page_numbers() -> String {
    ".pagination .page, .pagination a".to_string()
}

fn default_current_page() -> String {
    ".pagination .current, .pagination .active".to_string()
}

fn default_container() -> String {
    ".pagination, .pager, .page-navigation".to_string()
}

// ============================================================================
// Limits
// ============================================================================

/// Run limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum pages to visit (0 = unlimited)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum items to collect (0 = unlimited)
    #[serde(default = "default_max_items")]
    pub max_items: u64,

    /// Maximum scroll rounds for infinite scroll
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: u32,

    /// Item count used to estimate completion when the total page count
    /// is unknown
    #[serde(default = "default_target_items")]
    pub target_items: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_items: default_max_items(),
            max_scrolls: default_max_scrolls(),
            target_items: default_target_items(),
        }
    }
}

fn default_max_pages() -> u32 {
    100
}

fn default_max_items() -> u64 {
    1000
}

fn default_max_scrolls() -> u32 {
    50
}

fn default_target_items() -> u64 {
    1000
}

// ============================================================================
// Navigation
// ============================================================================

/// Navigation timing and retry settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Settle pause after a navigation action, in seconds
    #[serde(default = "default_wait_time")]
    pub wait_time: f64,

    /// Attempts per navigation call
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Pause after a scroll round, in seconds
    #[serde(default = "default_scroll_pause")]
    pub scroll_pause: f64,

    /// Pixels from the bottom that still count as "at the bottom"
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wait_time: default_wait_time(),
            retry_attempts: default_retry_attempts(),
            scroll_pause: default_scroll_pause(),
            scroll_threshold: default_scroll_threshold(),
        }
    }
}

fn default_wait_time() -> f64 {
    2.0
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_scroll_pause() -> f64 {
    1.0
}

fn default_scroll_threshold() -> u32 {
    100
}

impl NavigationConfig {
    /// Settle wait as a `Duration`
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs_f64(self.wait_time.max(0.0))
    }

    /// Scroll pause as a `Duration`
    pub fn scroll_pause_duration(&self) -> Duration {
        Duration::from_secs_f64(self.scroll_pause.max(0.0))
    }
}
