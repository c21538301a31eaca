//! Tests for the pagination engine

use super::*;
use crate::browser::fixture::{ClickAction, ElementFixture, FixtureDriver, PageFixture};
use crate::browser::BrowserDriver;
use crate::config::PaginationConfig;
use crate::error::{Error, Result};
use crate::types::{EngineStatus, StrategyKind};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;

/// Config with all waits zeroed so tests run fast
fn fast_config() -> PaginationConfig {
    let mut config = PaginationConfig::default();
    config.navigation.wait_time = 0.0;
    config.navigation.scroll_pause = 0.0;
    config
}

/// A page carrying a body element, like any real document
fn page(url: &str) -> PageFixture {
    PageFixture::new(url).with_element(ElementFixture::new(&["body"]).with_text("content"))
}

// ============================================================================
// URL Strategy Tests
// ============================================================================

#[test_case("https://site.com/list?page=2", "https://site.com/list?page=3"; "query page param")]
#[test_case("https://site.com/list?p=7", "https://site.com/list?p=7&page=8"; "short query param adds page_param")]
#[test_case("https://site.com/cat/page/2/", "https://site.com/cat/page/3/"; "path segment")]
#[test_case("https://site.com/cat/p/9", "https://site.com/cat/p/10"; "short path segment")]
fn test_url_strategy_next_url(current: &str, expected: &str) {
    let strategy = UrlStrategy::from_config(&fast_config());
    assert_eq!(strategy.next_url(current).as_deref(), Some(expected));
}

#[test]
fn test_url_strategy_path_wins_over_query() {
    let strategy = UrlStrategy::from_config(&fast_config());
    // Both a path segment and a query parameter are present; the path match
    // is rewritten and the query parameter is left alone
    let next = strategy
        .next_url("https://site.com/cat/page/4/?page=9")
        .unwrap();
    assert_eq!(next, "https://site.com/cat/page/5/?page=9");
}

#[test]
fn test_url_strategy_first_page_fallback() {
    let strategy = UrlStrategy::from_config(&fast_config());
    let next = strategy.next_url("https://site.com/products/").unwrap();
    assert_eq!(next, "https://site.com/products/page/2/");
}

#[test]
fn test_url_strategy_fallback_disabled_by_empty_template() {
    let mut config = fast_config();
    config.first_page_template = String::new();
    let strategy = UrlStrategy::from_config(&config);
    assert!(strategy.next_url("https://site.com/products/").is_none());
}

#[test]
fn test_url_strategy_custom_fallback_template() {
    let mut config = fast_config();
    config.first_page_template = "{base}?page={page}".to_string();
    let strategy = UrlStrategy::from_config(&config);
    assert_eq!(
        strategy.next_url("https://site.com/products").as_deref(),
        Some("https://site.com/products?page=2")
    );
}

#[test]
fn test_url_strategy_invalid_pattern_skipped() {
    let mut config = fast_config();
    config
        .url_patterns
        .insert(0, r"[?&]page=(\d+".to_string()); // unbalanced group
    let strategy = UrlStrategy::from_config(&config);
    // Remaining patterns still work
    assert_eq!(
        strategy.next_url("https://site.com/a?page=1").as_deref(),
        Some("https://site.com/a?page=2")
    );
}

#[tokio::test]
async fn test_url_strategy_navigate() {
    let driver = FixtureDriver::new(vec![
        page("https://site.com/list?page=1"),
        page("https://site.com/list?page=2"),
    ]);
    let mut strategy = UrlStrategy::from_config(&fast_config());

    strategy.navigate(&driver).await.unwrap();
    assert_eq!(
        driver.current_url().await.unwrap(),
        "https://site.com/list?page=2"
    );
}

#[tokio::test]
async fn test_url_strategy_navigate_failure_surfaces() {
    let driver = FixtureDriver::single(page("https://site.com/list?page=1"));
    driver.fail_next_gotos(1);
    let mut strategy = UrlStrategy::from_config(&fast_config());

    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_url_strategy_estimates_total_from_attribute() {
    let driver = FixtureDriver::single(
        page("https://site.com/list?page=1").with_element(
            ElementFixture::new(&["[data-total-pages]"]).with_attr("data-total-pages", "17"),
        ),
    );
    let strategy = UrlStrategy::from_config(&fast_config());
    assert_eq!(strategy.estimate_total_pages(&driver).await, Some(17));
}

// ============================================================================
// Click Strategy Tests
// ============================================================================

fn clickable_site() -> FixtureDriver {
    FixtureDriver::new(vec![
        page("https://site.com/products")
            .with_element(ElementFixture::new(&[".pagination"]).with_text(""))
            .with_element(
                ElementFixture::new(&[".pagination .next"])
                    .with_text("Next")
                    .on_click(ClickAction::GotoPage(1)),
            ),
        page("https://site.com/products#2"),
    ])
}

#[tokio::test]
async fn test_click_strategy_navigate() {
    let driver = clickable_site();
    let mut strategy = ClickStrategy::from_config(&fast_config());

    strategy.navigate(&driver).await.unwrap();
    assert_eq!(driver.current_page_index(), 1);
}

#[tokio::test]
async fn test_click_strategy_missing_button() {
    let driver = FixtureDriver::single(page("https://site.com/products"));
    let mut strategy = ClickStrategy::from_config(&fast_config());

    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(matches!(err, Error::Navigation { .. }));
}

#[tokio::test]
async fn test_click_strategy_disabled_button() {
    let driver = FixtureDriver::single(page("https://site.com/products").with_element(
        ElementFixture::new(&[".pagination .next"]).with_text("Next").disabled(),
    ));
    let mut strategy = ClickStrategy::from_config(&fast_config());

    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(err.to_string().contains("disabled"));
}

#[tokio::test]
async fn test_click_strategy_requires_page_change() {
    // Button clicks fine but nothing happens: no staleness, no success
    let driver = FixtureDriver::single(page("https://site.com/products").with_element(
        ElementFixture::new(&[".pagination .next"]).with_text("Next"),
    ));
    let mut strategy = ClickStrategy::from_config(&fast_config());
    strategy.stale_timeout = Duration::ZERO;

    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(err.to_string().contains("did not change"));
}

#[tokio::test]
async fn test_click_strategy_can_handle() {
    let driver = clickable_site();
    let mut strategy = ClickStrategy::from_config(&fast_config());
    assert!(strategy.can_handle(&driver).await);

    let empty = FixtureDriver::single(page("https://site.com/about"));
    assert!(!strategy.can_handle(&empty).await);
}

#[tokio::test]
async fn test_click_strategy_estimates_total_from_labels() {
    let driver = FixtureDriver::single(
        page("https://site.com/products")
            .with_element(ElementFixture::new(&[".pagination a"]).with_text("1"))
            .with_element(ElementFixture::new(&[".pagination a"]).with_text("12"))
            .with_element(ElementFixture::new(&[".pagination a"]).with_text("Next")),
    );
    let strategy = ClickStrategy::from_config(&fast_config());
    assert_eq!(strategy.estimate_total_pages(&driver).await, Some(12));
}

// ============================================================================
// Scroll Strategy Tests
// ============================================================================

#[tokio::test]
async fn test_scroll_strategy_grows_document() {
    let driver = FixtureDriver::single(
        page("https://site.com/feed").with_heights(vec![1000, 2400]),
    );
    let mut strategy = ScrollStrategy::from_config(&fast_config());

    strategy.navigate(&driver).await.unwrap();
}

#[tokio::test]
async fn test_scroll_strategy_unchanged_height_fails() {
    // No load-more control and the document refuses to grow
    let driver = FixtureDriver::single(page("https://site.com/feed"));
    let mut strategy = ScrollStrategy::from_config(&fast_config());

    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(err.to_string().contains("no more content"));
}

#[tokio::test]
async fn test_scroll_strategy_prefers_load_more() {
    let driver = FixtureDriver::single(
        page("https://site.com/feed")
            .with_element(
                ElementFixture::new(&[".load-more"])
                    .with_text("Load more")
                    .on_click(ClickAction::GrowDocument),
            )
            .with_heights(vec![1000, 1500]),
    );
    let mut strategy = ScrollStrategy::from_config(&fast_config());

    strategy.navigate(&driver).await.unwrap();
    assert_eq!(driver.document_height().await.unwrap(), 1500);
}

#[tokio::test]
async fn test_scroll_strategy_respects_scroll_limit() {
    let mut config = fast_config();
    config.limits.max_scrolls = 1;
    let driver = FixtureDriver::single(
        page("https://site.com/feed").with_heights(vec![1000, 2000, 3000]),
    );
    let mut strategy = ScrollStrategy::from_config(&config);

    strategy.navigate(&driver).await.unwrap();
    let err = strategy.navigate(&driver).await.unwrap_err();
    assert!(err.to_string().contains("scroll limit"));
}

#[tokio::test]
async fn test_scroll_strategy_reports_no_total() {
    let driver = FixtureDriver::single(page("https://site.com/feed"));
    let strategy = ScrollStrategy::from_config(&fast_config());
    assert_eq!(strategy.estimate_total_pages(&driver).await, None);
}

// ============================================================================
// Auto Strategy Tests
// ============================================================================

#[tokio::test]
async fn test_auto_strategy_binds_first_match_and_remembers() {
    // URL strategy cannot claim (no pattern, fallback disabled), so the
    // click strategy should win
    let mut config = fast_config();
    config.first_page_template = String::new();
    let driver = clickable_site();

    let mut auto = AutoStrategy::from_config(&config);
    assert!(auto.can_handle(&driver).await);
    assert_eq!(auto.bound_kind(), Some(StrategyKind::Javascript));
    assert_eq!(auto.effective_kind(), StrategyKind::Javascript);

    auto.navigate(&driver).await.unwrap();
    assert_eq!(driver.current_page_index(), 1);
}

#[tokio::test]
async fn test_auto_strategy_reports_incapable() {
    let mut config = fast_config();
    config.first_page_template = String::new();
    let driver = FixtureDriver::single(page("https://site.com/about"));

    let mut auto = AutoStrategy::from_config(&config);
    assert!(!auto.can_handle(&driver).await);
    assert!(auto.bound_kind().is_none());

    let err = auto.navigate(&driver).await.unwrap_err();
    assert!(err.to_string().contains("no applicable strategy"));
}

// ============================================================================
// Detector Tests
// ============================================================================

#[tokio::test]
async fn test_detector_scores_click_pagination() {
    // Container + next button + page numbers, no URL pattern, no infinite
    // scroll: 0.3 + 0.2 + 0.2 = 0.7, recommended strategy is javascript
    let driver = FixtureDriver::single(
        page("https://site.com/products")
            .with_element(ElementFixture::new(&[".pagination"]))
            .with_element(ElementFixture::new(&[".pagination .next"]).with_text("›"))
            .with_element(ElementFixture::new(&[".pagination a"]).with_text("›")),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert!(detection.has_pagination);
    assert!((detection.confidence - 0.7).abs() < 1e-9);
    assert_eq!(detection.strategy, Some(StrategyKind::Javascript));
    assert!(detection.elements.contains_key("container"));
    assert!(detection.elements.contains_key("next_button"));
    assert!(detection.elements.contains_key("page_numbers"));
}

#[test]
fn test_detector_low_confidence_recommends_auto() {
    // Only a current-page indicator: confidence 0.1
    let mut detection = Detection {
        confidence: 0.1,
        ..Detection::default()
    };
    detection.elements.insert("current_page".to_string(), 1);
    assert_eq!(recommend_strategy(&detection), StrategyKind::Auto);
}

#[test]
fn test_detector_recommendation_priority() {
    // URL patterns beat clickable elements
    let mut detection = Detection {
        confidence: 0.9,
        url_patterns: vec!["page=<number>".to_string()],
        ..Detection::default()
    };
    detection.elements.insert("next_button".to_string(), 1);
    assert_eq!(recommend_strategy(&detection), StrategyKind::Url);

    // Forced infinite scroll beats both
    detection.strategy = Some(StrategyKind::InfiniteScroll);
    assert_eq!(recommend_strategy(&detection), StrategyKind::InfiniteScroll);
}

#[tokio::test]
async fn test_detector_forces_infinite_scroll() {
    let driver = FixtureDriver::single(
        page("https://site.com/feed")
            .with_element(ElementFixture::new(&[".load-more"]).with_text("More")),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert!(detection.has_pagination);
    assert_eq!(detection.strategy, Some(StrategyKind::InfiniteScroll));
}

#[tokio::test]
async fn test_detector_url_patterns_recommend_url() {
    let driver = FixtureDriver::single(
        page("https://site.com/products?page=2")
            .with_element(ElementFixture::new(&[".pagination"])),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert_eq!(detection.url_patterns, vec!["page=<number>".to_string()]);
    assert_eq!(detection.strategy, Some(StrategyKind::Url));
    assert_eq!(detection.current_page, 2);
}

#[tokio::test]
async fn test_detector_extracts_totals_with_precedence() {
    // An explicit data attribute beats the highest numbered link
    let driver = FixtureDriver::single(
        page("https://site.com/products")
            .with_element(ElementFixture::new(&[".pagination"]))
            .with_element(
                ElementFixture::new(&["[data-total-pages]"]).with_attr("data-total-pages", "40"),
            )
            .with_element(ElementFixture::new(&[".pagination a"]).with_text("12")),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert_eq!(detection.total_pages, Some(40));
}

#[tokio::test]
async fn test_detector_current_page_indicator_beats_url() {
    let driver = FixtureDriver::single(
        page("https://site.com/products?page=9")
            .with_element(ElementFixture::new(&[".pagination"]))
            .with_element(ElementFixture::new(&[".pagination .current"]).with_text("3")),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert_eq!(detection.current_page, 3);
}

#[tokio::test]
async fn test_detector_no_pagination_on_plain_page() {
    let driver = FixtureDriver::single(page("https://site.com/about"));
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let detection = detector.detect(&driver).await;
    assert!(!detection.has_pagination);
    assert!(detection.strategy.is_none());
}

#[tokio::test]
async fn test_detector_trusts_enabled_config() {
    let mut config = fast_config();
    config.enabled = true;
    config.strategy = StrategyKind::InfiniteScroll;
    let driver = FixtureDriver::single(page("https://site.com/about"));
    let detector = PaginationDetector::new(Arc::new(config));

    let detection = detector.detect(&driver).await;
    assert!(detection.has_pagination);
    assert_eq!(detection.strategy, Some(StrategyKind::InfiniteScroll));
}

#[tokio::test]
async fn test_detector_create_strategy_kinds() {
    let detector = PaginationDetector::new(Arc::new(fast_config()));
    assert_eq!(
        detector.create_strategy(StrategyKind::Url).kind(),
        StrategyKind::Url
    );
    assert_eq!(
        detector.create_strategy(StrategyKind::Javascript).kind(),
        StrategyKind::Javascript
    );
    assert_eq!(
        detector
            .create_strategy(StrategyKind::InfiniteScroll)
            .kind(),
        StrategyKind::InfiniteScroll
    );
    assert_eq!(
        detector.create_strategy(StrategyKind::Auto).kind(),
        StrategyKind::Auto
    );
}

#[tokio::test]
async fn test_detector_summary() {
    let driver = FixtureDriver::single(
        page("https://site.com/products?page=2")
            .with_element(ElementFixture::new(&[".pagination"])),
    );
    let detector = PaginationDetector::new(Arc::new(fast_config()));

    let summary = detector.summary(&driver).await;
    assert!(summary.contains("Pagination detected"));
    assert!(summary.contains("url"));

    let empty = FixtureDriver::single(page("https://site.com/about"));
    assert_eq!(detector.summary(&empty).await, "No pagination detected");
}

// ============================================================================
// Navigator Tests
// ============================================================================

/// Extractor that always fails
struct FailingExtractor;

#[async_trait]
impl PageExtractor for FailingExtractor {
    async fn extract(&mut self, _browser: &dyn BrowserDriver) -> Result<u64> {
        Err(Error::extraction(0, "boom"))
    }
}

fn url_config(max_pages: u32) -> Arc<PaginationConfig> {
    let mut config = fast_config();
    config.enabled = true;
    config.strategy = StrategyKind::Url;
    config.limits.max_pages = max_pages;
    config.item_selector = Some(".item".to_string());
    Arc::new(config)
}

fn three_page_site() -> Arc<FixtureDriver> {
    let item = || ElementFixture::new(&[".item"]).with_text("item");
    Arc::new(FixtureDriver::new(vec![
        page("https://site.com/list?page=1")
            .with_element(item())
            .with_element(item()),
        page("https://site.com/list?page=2").with_element(item()),
        page("https://site.com/list?page=3").with_element(item()),
    ]))
}

#[tokio::test]
async fn test_navigator_uninitialized() {
    let driver = Arc::new(FixtureDriver::single(page("https://site.com/about")));
    let navigator = PaginationNavigator::new(Arc::new(fast_config()), driver);

    assert_eq!(navigator.status(), EngineStatus::Uninitialized);
    assert!(!navigator.can_continue());
    assert!(navigator.progress().is_none());
    assert_eq!(navigator.navigation_summary(), "Pagination not initialized");
}

#[tokio::test]
async fn test_navigator_initialize_false_without_pagination() {
    let driver = Arc::new(FixtureDriver::single(page("https://site.com/about")));
    let mut navigator = PaginationNavigator::new(Arc::new(fast_config()), driver);

    assert!(!navigator.initialize().await);
    assert_eq!(navigator.status(), EngineStatus::Uninitialized);
}

#[tokio::test]
async fn test_navigator_initialize_seeds_state() {
    let driver = Arc::new(FixtureDriver::single(
        page("https://site.com/list?page=2")
            .with_element(ElementFixture::new(&[".pagination"]))
            .with_element(
                ElementFixture::new(&["[data-total-pages]"]).with_attr("data-total-pages", "9"),
            ),
    ));
    let mut navigator = PaginationNavigator::new(Arc::new(fast_config()), driver);

    assert!(navigator.initialize().await);
    assert_eq!(navigator.status(), EngineStatus::Active);
    assert_eq!(navigator.state().total_pages, Some(9));
    assert_eq!(navigator.state().current_page, 2);
    assert_eq!(navigator.state().strategy, "url");
}

#[tokio::test]
async fn test_navigator_full_loop_records_items() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(3), driver);
    assert!(navigator.initialize().await);

    let mut extractor = SelectorCountExtractor::new(".item");
    let mut visited = 1;
    while navigator.can_continue() {
        if !navigator.navigate_to_next(Some(&mut extractor)).await {
            break;
        }
        visited += 1;
    }

    assert_eq!(visited, 3);
    assert_eq!(navigator.state().current_page, 3);
    // Pages 1 and 2 were extracted before navigating away (2 + 1 items)
    assert_eq!(navigator.state().total_items, 3);
    assert_eq!(navigator.state().last_successful_page, 2);
    assert!(!navigator.can_continue());
    assert_eq!(navigator.status(), EngineStatus::Exhausted);
}

#[tokio::test]
async fn test_navigator_extraction_failure_marks_page() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(3), driver);
    assert!(navigator.initialize().await);

    let mut extractor = FailingExtractor;
    assert!(navigator.navigate_to_next(Some(&mut extractor)).await);

    // Extraction failed on page 1, navigation still advanced
    assert!(navigator.state().failed_pages.contains(&1));
    assert_eq!(navigator.state().current_page, 2);
}

#[tokio::test]
async fn test_navigator_navigation_failure_recorded() {
    // Only one fixture page exists, so every goto fails
    let driver = Arc::new(FixtureDriver::single(
        page("https://site.com/list?page=1")
            .with_element(ElementFixture::new(&[".item"]).with_text("item")),
    ));
    let mut navigator = PaginationNavigator::new(url_config(10), driver);
    assert!(navigator.initialize().await);

    let ok = navigator.navigate_to_next(None).await;
    assert!(!ok);
    assert!(navigator.state().failed_pages.contains(&1));
    assert_eq!(navigator.state().current_page, 1);
}

#[tokio::test]
async fn test_navigator_retry_exhaustion_uses_all_attempts() {
    let driver = Arc::new(FixtureDriver::new(vec![
        page("https://site.com/list?page=1"),
        page("https://site.com/list?page=2"),
    ]));
    // Three attempts configured, first two gotos fail, third succeeds
    driver.fail_next_gotos(2);
    let mut navigator = PaginationNavigator::new(url_config(10), driver.clone());
    assert!(navigator.initialize().await);

    assert!(navigator.navigate_to_next(None).await);
    assert_eq!(navigator.state().current_page, 2);
    assert_eq!(driver.goto_log().len(), 3);
}

#[tokio::test]
async fn test_navigator_fatal_threshold() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(10), driver);
    assert!(navigator.initialize().await);

    // Fail extraction on three consecutive pages
    let mut extractor = FailingExtractor;
    for _ in 0..2 {
        assert!(navigator.navigate_to_next(Some(&mut extractor)).await);
    }
    assert!(!navigator.navigate_to_next(Some(&mut extractor)).await);
    assert_eq!(navigator.state().failed_pages.len(), 3);

    // The cumulative count is at the threshold: the error handler stops us
    let halt = navigator
        .handle_error(&Error::navigation("still stuck"), "loop")
        .await;
    assert!(!halt);
    assert_eq!(navigator.status(), EngineStatus::Exhausted);
    assert!(!navigator.can_continue());
}

#[tokio::test]
async fn test_navigator_handle_error_below_threshold_continues() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(10), driver);
    assert!(navigator.initialize().await);

    let proceed = navigator
        .handle_error(&Error::navigation("hiccup"), "loop")
        .await;
    assert!(proceed);
    assert_eq!(navigator.status(), EngineStatus::Active);
    assert!(navigator.state().failed_pages.contains(&1));
}

#[tokio::test]
async fn test_navigator_respects_max_pages() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(2), driver);
    assert!(navigator.initialize().await);

    assert!(navigator.navigate_to_next(None).await);
    // current_page == max_pages now
    assert!(!navigator.can_continue());
    assert!(!navigator.navigate_to_next(None).await);
}

#[tokio::test]
async fn test_navigator_respects_max_items() {
    let mut config = fast_config();
    config.enabled = true;
    config.strategy = StrategyKind::Url;
    config.limits.max_pages = 100;
    config.limits.max_items = 2;
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(Arc::new(config), driver);
    assert!(navigator.initialize().await);

    let mut extractor = SelectorCountExtractor::new(".item");
    // Page 1 yields two items, hitting the limit
    assert!(navigator.navigate_to_next(Some(&mut extractor)).await);
    assert!(!navigator.can_continue());
}

#[tokio::test]
async fn test_navigator_save_and_load_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");

    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(5), driver.clone());
    assert!(navigator.initialize().await);
    assert!(navigator.navigate_to_next(None).await);
    navigator.save_state(&path).await.unwrap();

    let mut restored = PaginationNavigator::new(url_config(5), driver);
    restored.load_state(&path).await;
    assert_eq!(restored.state().current_page, 2);
    assert_eq!(restored.state().strategy, "url");
}

#[tokio::test]
async fn test_navigator_load_corrupt_state_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.json");
    tokio::fs::write(&path, "][").await.unwrap();

    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(5), driver);
    navigator.load_state(&path).await;
    assert_eq!(navigator.state().current_page, 1);
}

#[tokio::test]
async fn test_navigator_reset() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(5), driver);
    assert!(navigator.initialize().await);
    assert!(navigator.navigate_to_next(None).await);

    navigator.reset();
    assert_eq!(navigator.status(), EngineStatus::Uninitialized);
    assert!(navigator.strategy_kind().is_none());
    assert_eq!(navigator.state().current_page, 1);
}

#[tokio::test]
async fn test_navigator_navigation_summary() {
    let driver = three_page_site();
    let mut navigator = PaginationNavigator::new(url_config(5), driver);
    assert!(navigator.initialize().await);
    assert!(navigator.navigate_to_next(None).await);

    let summary = navigator.navigation_summary();
    assert!(summary.contains("Pagination Navigation Summary"));
    assert!(summary.contains("Strategy: url"));
    assert!(summary.contains("Current Page: 2"));
    assert!(summary.contains("Success Rate:"));
}
