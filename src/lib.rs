// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewalk
//!
//! A pagination engine for browser-driven scraping runs: detect whether a
//! page is part of a multi-page structure, pick a navigation strategy,
//! advance page by page with bounded retries and fallbacks, and persist
//! progress so an interrupted run can resume.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::browser::{BrowserDriver, CdpDriver};
//! use pagewalk::config::PaginationConfig;
//! use pagewalk::pagination::{PaginationNavigator, SelectorCountExtractor};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let config = Arc::new(PaginationConfig::load("site.yaml")?);
//!     let driver = Arc::new(CdpDriver::launch(true).await?);
//!     driver.goto("https://example.com/products").await?;
//!
//!     let browser: Arc<dyn BrowserDriver> = driver;
//!     let mut navigator = PaginationNavigator::new(config, browser);
//!     if navigator.initialize().await {
//!         let mut extractor = SelectorCountExtractor::new(".product");
//!         while navigator.can_continue() {
//!             if !navigator.navigate_to_next(Some(&mut extractor)).await {
//!                 break;
//!             }
//!             navigator.save_state("progress.json").await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      PaginationNavigator                        │
//! │  initialize() → bool    navigate_to_next(extractor) → bool      │
//! │  can_continue()         save_state() / load_state()             │
//! └─────────────────────────────────────────────────────────────────┘
//!                │                │                 │
//! ┌──────────────┴───┬────────────┴─────┬───────────┴──────────────┐
//! │    Detector      │    Strategies    │       State              │
//! ├──────────────────┼──────────────────┼──────────────────────────┤
//! │ Confidence score │ URL rewrite      │ Page position, items     │
//! │ Element scan     │ Next-button click│ Failed pages, timing     │
//! │ Recommendation   │ Infinite scroll  │ JSON persistence         │
//! │ Strategy factory │ Auto (composite) │ Resume after interrupt   │
//! └──────────────────┴──────────────────┴──────────────────────────┘
//!                │
//!      BrowserDriver (narrow collaborator interface; CDP impl)
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the engine
pub mod error;

/// Common types and the retry policy
pub mod types;

/// Configuration surface
pub mod config;

/// Browser collaborator interface and drivers
pub mod browser;

/// Detection, strategies, state, and the navigator
pub mod pagination;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PaginationConfig;
pub use error::{Error, Result};
pub use types::{BackoffType, EngineStatus, RetryPolicy, StrategyKind};

// Re-export commonly used types
pub use pagination::{
    PageExtractor, PaginationDetector, PaginationNavigator, PaginationState, ProgressSnapshot,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
