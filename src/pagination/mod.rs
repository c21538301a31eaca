//! Pagination engine
//!
//! Supports: URL-parameter, JavaScript-click, Infinite-scroll, Auto
//!
//! # Overview
//!
//! The pagination module decides whether a loaded page is part of a
//! multi-page structure, selects a navigation strategy, advances page by
//! page with retries and fallbacks, and tracks progress in a persistable
//! state so an interrupted run can resume.
//!
//! Control flow: [`PaginationNavigator::initialize`] runs
//! [`PaginationDetector::detect`] and binds the recommended strategy; the
//! caller then loops `extract → navigate_to_next` until
//! [`PaginationNavigator::can_continue`] says stop.

mod detector;
mod navigator;
mod state;
mod strategy;

pub use detector::{recommend_strategy, Detection, PaginationDetector};
pub use navigator::{PageExtractor, PaginationNavigator, SelectorCountExtractor};
pub use state::{format_duration, PaginationState, ProgressSnapshot};
pub use strategy::{
    AutoStrategy, ClickStrategy, NavigationStrategy, ScrollStrategy, UrlStrategy,
};

#[cfg(test)]
mod tests;
