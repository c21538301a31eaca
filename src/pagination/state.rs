//! Pagination progress state
//!
//! Tracks page position, item counts, failures, and timing for a run, and
//! persists itself to JSON so an interrupted run can resume from the last
//! successful page.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Progress state for a pagination run.
///
/// Owned by the navigator; nothing else writes into it. Every field
/// round-trips through the persisted JSON snapshot except the monotonic
/// anchor, which only exists for states created in this process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationState {
    /// Page the session is currently on (1-based)
    pub current_page: u32,

    /// Total page estimate, when one is known; may be revised
    pub total_pages: Option<u32>,

    /// Items collected so far; never decreases except via `reset`
    pub total_items: u64,

    /// Informational items-per-page figure used for completion estimates
    pub items_per_page: u64,

    /// Name of the bound navigation strategy
    pub strategy: String,

    /// Last page that recorded a success
    pub last_successful_page: u32,

    /// Pages that errored; a later success removes the page again
    pub failed_pages: BTreeSet<u32>,

    /// When the run started (wall clock, persisted)
    pub start_time: DateTime<Utc>,

    /// Last state mutation (wall clock, persisted)
    pub last_activity: DateTime<Utc>,

    /// Caller-supplied session identifier
    pub session_id: Option<String>,

    /// Monotonic anchor for elapsed-time math; absent on restored snapshots
    #[serde(skip)]
    anchor: Option<Instant>,
}

impl Default for PaginationState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            current_page: 1,
            total_pages: None,
            total_items: 0,
            items_per_page: 0,
            strategy: "auto".to_string(),
            last_successful_page: 1,
            failed_pages: BTreeSet::new(),
            start_time: now,
            last_activity: now,
            session_id: None,
            anchor: Some(Instant::now()),
        }
    }
}

impl PaginationState {
    /// Create a fresh state starting at page 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next page and return the new page number
    pub fn advance(&mut self) -> u32 {
        self.current_page += 1;
        self.touch();
        info!("Moving to page {}", self.current_page);
        self.current_page
    }

    /// Set the current page; pages are numbered from 1
    pub fn set_page(&mut self, page: u32) -> Result<()> {
        if page < 1 {
            return Err(Error::InvalidPage {
                page: i64::from(page),
            });
        }
        self.current_page = page;
        self.touch();
        Ok(())
    }

    /// Record a successfully processed page and the items it yielded
    pub fn record_success(&mut self, page: u32, items_found: u64) {
        self.last_successful_page = page;
        self.total_items += items_found;
        self.failed_pages.remove(&page);
        self.touch();
        info!("Page {page} succeeded, {items_found} items found");
    }

    /// Record a failed page; recording the same page twice is a no-op
    pub fn record_failure(&mut self, page: u32, reason: &str) {
        self.failed_pages.insert(page);
        self.touch();
        warn!("Page {page} failed: {reason}");
    }

    /// Whether the run may continue under the given limits.
    ///
    /// Checks max-pages, then max-items, then the known total page count;
    /// the first failing limit wins. A limit of `None` is not checked.
    pub fn can_continue(&self, max_pages: Option<u32>, max_items: Option<u64>) -> bool {
        if let Some(max) = max_pages {
            if self.current_page >= max {
                info!("Reached maximum page limit: {max}");
                return false;
            }
        }
        if let Some(max) = max_items {
            if self.total_items >= max {
                info!("Reached maximum item limit: {max}");
                return false;
            }
        }
        if let Some(total) = self.total_pages {
            if self.current_page > total {
                info!("Reached last known page: {total}");
                return false;
            }
        }
        true
    }

    /// Time since the run started.
    ///
    /// Uses the monotonic anchor when the state was created in-process,
    /// wall-clock deltas otherwise.
    pub fn elapsed(&self) -> Duration {
        match self.anchor {
            Some(anchor) => anchor.elapsed(),
            None => (Utc::now() - self.start_time)
                .to_std()
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Current progress, with completion estimated against `target_items`
    /// when no total page count is known
    pub fn progress(&self, target_items: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            items_per_page: self.items_per_page,
            success_rate: self.success_rate(),
            elapsed: self.elapsed(),
            estimated_completion: self.estimate_completion(target_items),
        }
    }

    /// Share of attempted pages without a recorded failure, in percent.
    /// Defined as 100 before any page has been attempted.
    pub fn success_rate(&self) -> f64 {
        if self.current_page <= 1 {
            return 100.0;
        }
        let attempted = u64::from(self.current_page - 1);
        let failed = self
            .failed_pages
            .iter()
            .filter(|&&p| p <= self.current_page)
            .count() as u64;
        let succeeded = attempted.saturating_sub(failed);
        (succeeded as f64 / attempted as f64) * 100.0
    }

    fn estimate_completion(&self, target_items: u64) -> Option<Duration> {
        if self.current_page <= 1 {
            return None;
        }
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        let pages_per_second = f64::from(self.current_page - 1) / elapsed;
        if pages_per_second <= 0.0 {
            return None;
        }

        let seconds = if let Some(total) = self.total_pages {
            f64::from(total.saturating_sub(self.current_page)) / pages_per_second
        } else if self.items_per_page > 0 {
            let remaining = target_items.saturating_sub(self.total_items) as f64;
            remaining / (self.items_per_page as f64 * pages_per_second)
        } else {
            return None;
        };

        (seconds > 0.0).then(|| Duration::from_secs_f64(seconds))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to a file, writing a temp file first and renaming for atomicity
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_json()?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        info!("Pagination state saved to {}", path.display());
        Ok(())
    }

    /// Load from a file. A missing or corrupt snapshot logs a warning and
    /// yields a fresh default state; this never fails.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Corrupt state file {}: {e}; starting fresh", path.display());
                    Self::new()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read state file {}: {e}; starting fresh",
                    path.display()
                );
                Self::new()
            }
        }
    }

    /// Restore all fields to their initial defaults
    pub fn reset(&mut self) {
        *self = Self::new();
        info!("Pagination state reset");
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// Read-only progress view derived from [`PaginationState`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub current_page: u32,
    pub total_pages: Option<u32>,
    pub total_items: u64,
    pub items_per_page: u64,
    /// Percentage of attempted pages without a recorded failure
    pub success_rate: f64,
    pub elapsed: Duration,
    /// Estimated time remaining, when one can be derived
    pub estimated_completion: Option<Duration>,
}

/// Format a duration as `2h 5m 3s`, omitting leading zero units
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PaginationState::new();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_items, 0);
        assert!(state.total_pages.is_none());
        assert!(state.failed_pages.is_empty());
        assert_eq!(state.strategy, "auto");
        assert_eq!(state.last_successful_page, 1);
    }

    #[test]
    fn test_advance() {
        let mut state = PaginationState::new();
        assert_eq!(state.advance(), 2);
        assert_eq!(state.advance(), 3);
        assert_eq!(state.current_page, 3);
    }

    #[test]
    fn test_set_page_invalid_leaves_state_unchanged() {
        let mut state = PaginationState::new();
        state.set_page(5).unwrap();

        let before = state.last_activity;
        let err = state.set_page(0).unwrap_err();
        assert!(matches!(err, Error::InvalidPage { page: 0 }));
        assert_eq!(state.current_page, 5);
        assert_eq!(state.last_activity, before);
    }

    #[test]
    fn test_record_success_clears_failure() {
        let mut state = PaginationState::new();
        state.record_failure(3, "timeout");
        assert!(state.failed_pages.contains(&3));

        state.record_success(3, 12);
        assert!(!state.failed_pages.contains(&3));
        assert_eq!(state.total_items, 12);
        assert_eq!(state.last_successful_page, 3);
    }

    #[test]
    fn test_record_failure_idempotent() {
        let mut state = PaginationState::new();
        state.record_failure(2, "timeout");
        state.record_failure(2, "timeout again");
        assert_eq!(state.failed_pages.len(), 1);
    }

    #[test]
    fn test_total_items_monotonic() {
        let mut state = PaginationState::new();
        let mut last = 0;
        for (page, items) in [(1, 10), (2, 0), (3, 25), (4, 0)] {
            state.record_success(page, items);
            state.record_failure(page, "late failure");
            assert!(state.total_items >= last);
            last = state.total_items;
        }
        assert_eq!(state.total_items, 35);
    }

    #[test]
    fn test_can_continue_page_limit() {
        let mut state = PaginationState::new();
        state.set_page(100).unwrap();
        state.total_items = 5;
        assert!(!state.can_continue(Some(100), None));
        assert!(!state.can_continue(Some(100), Some(1_000_000)));
    }

    #[test]
    fn test_can_continue_item_limit() {
        let mut state = PaginationState::new();
        state.total_items = 1000;
        assert!(!state.can_continue(None, Some(1000)));
        assert!(state.can_continue(None, Some(1001)));
    }

    #[test]
    fn test_can_continue_total_pages() {
        let mut state = PaginationState::new();
        state.total_pages = Some(4);
        state.set_page(4).unwrap();
        assert!(state.can_continue(None, None));
        state.advance();
        assert!(!state.can_continue(None, None));
    }

    #[test]
    fn test_scenario_advance_twice_hits_page_limit() {
        let mut state = PaginationState::new();
        state.advance();
        state.advance();
        assert_eq!(state.current_page, 3);
        assert!(!state.can_continue(Some(3), None));
    }

    #[test]
    fn test_success_rate() {
        let mut state = PaginationState::new();
        assert!((state.success_rate() - 100.0).abs() < f64::EPSILON);

        state.set_page(5).unwrap();
        state.record_failure(2, "boom");
        // 4 attempted, 1 failed
        assert!((state.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_snapshot() {
        let mut state = PaginationState::new();
        state.set_page(5).unwrap();
        state.total_items = 50;
        state.items_per_page = 10;

        let progress = state.progress(1000);
        assert_eq!(progress.current_page, 5);
        assert_eq!(progress.total_items, 50);
        assert_eq!(progress.items_per_page, 10);
        assert!(progress.success_rate > 0.0);
    }

    #[test]
    fn test_estimate_none_without_rate_inputs() {
        let state = PaginationState::new();
        // Page 1: nothing attempted yet
        assert!(state.progress(1000).estimated_completion.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = PaginationState::new();
        state.set_page(7).unwrap();
        state.total_pages = Some(20);
        state.total_items = 140;
        state.items_per_page = 20;
        state.strategy = "url".to_string();
        state.record_failure(3, "timeout");
        state.record_failure(5, "timeout");
        state.session_id = Some("run-42".to_string());

        let json = state.to_json().unwrap();
        let restored = PaginationState::from_json(&json).unwrap();

        assert_eq!(restored.current_page, state.current_page);
        assert_eq!(restored.total_pages, state.total_pages);
        assert_eq!(restored.total_items, state.total_items);
        assert_eq!(restored.items_per_page, state.items_per_page);
        assert_eq!(restored.strategy, state.strategy);
        assert_eq!(restored.failed_pages, state.failed_pages);
        assert_eq!(restored.start_time, state.start_time);
        assert_eq!(restored.last_activity, state.last_activity);
        assert_eq!(restored.session_id, state.session_id);
    }

    #[test]
    fn test_persisted_field_names() {
        let state = PaginationState::new();
        let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        for key in [
            "current_page",
            "total_pages",
            "total_items",
            "items_per_page",
            "strategy",
            "last_successful_page",
            "failed_pages",
            "start_time",
            "last_activity",
            "session_id",
        ] {
            assert!(json.get(key).is_some(), "missing persisted field {key}");
        }
    }

    #[test]
    fn test_reset() {
        let mut state = PaginationState::new();
        state.set_page(9).unwrap();
        state.total_items = 300;
        state.record_failure(2, "x");
        state.strategy = "javascript".to_string();

        state.reset();

        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_items, 0);
        assert!(state.failed_pages.is_empty());
        assert_eq!(state.strategy, "auto");
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = PaginationState::new();
        state.set_page(6).unwrap();
        state.total_items = 60;
        state.record_failure(4, "boom");
        state.save(&path).await.unwrap();

        let restored = PaginationState::load(&path).await;
        assert_eq!(restored.current_page, 6);
        assert_eq!(restored.total_items, 60);
        assert!(restored.failed_pages.contains(&4));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = PaginationState::load(dir.path().join("absent.json")).await;
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_items, 0);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let state = PaginationState::load(&path).await;
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(7384)), "2h 3m 4s");
    }
}
