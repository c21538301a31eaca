//! Common types used throughout pagewalk
//!
//! This module contains shared type definitions used across multiple modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Strategy Kind
// ============================================================================

/// Navigation strategy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Try every concrete strategy in order and bind to the first match
    #[default]
    Auto,
    /// Rewrite a page number in the URL and navigate to it
    Url,
    /// Click a "next" control and wait for the page to change
    Javascript,
    /// Scroll (or click "load more") until the document stops growing
    InfiniteScroll,
}

impl StrategyKind {
    /// Strategy name as it appears in configuration and persisted state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Url => "url",
            Self::Javascript => "javascript",
            Self::InfiniteScroll => "infinite_scroll",
        }
    }

    /// Parse a strategy name; unknown names fall back to `Auto`
    pub fn parse_or_auto(name: &str) -> Self {
        match name {
            "url" => Self::Url,
            "javascript" => Self::Javascript,
            "infinite_scroll" => Self::InfiniteScroll,
            _ => Self::Auto,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Engine Status
// ============================================================================

/// Lifecycle of the navigator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStatus {
    /// No pagination detected yet (or `reset()` was called)
    #[default]
    Uninitialized,
    /// A strategy is bound and limits have not been reached
    Active,
    /// Limits reached or the fatal failure threshold was hit
    Exhausted,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Exhausted => "exhausted",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    #[default]
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Bounded retry policy with a backoff function.
///
/// Attempts are numbered from 0; `delay_for(n)` is the pause taken after
/// attempt `n` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Base delay fed into the backoff function
    pub base_delay: Duration,
    /// Backoff shape
    pub backoff: BackoffType,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            backoff: BackoffType::Linear,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt count and base delay
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: BackoffType) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff,
        }
    }

    /// Calculate the delay after a failed attempt (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            BackoffType::Constant => self.base_delay,
            BackoffType::Linear => self.base_delay * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.base_delay * factor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_kind_serde() {
        let kind: StrategyKind = serde_json::from_str("\"infinite_scroll\"").unwrap();
        assert_eq!(kind, StrategyKind::InfiniteScroll);

        let json = serde_json::to_string(&StrategyKind::Javascript).unwrap();
        assert_eq!(json, "\"javascript\"");
    }

    #[test]
    fn test_strategy_kind_parse_unknown_is_auto() {
        assert_eq!(StrategyKind::parse_or_auto("url"), StrategyKind::Url);
        assert_eq!(StrategyKind::parse_or_auto("bogus"), StrategyKind::Auto);
        assert_eq!(StrategyKind::parse_or_auto(""), StrategyKind::Auto);
    }

    #[test]
    fn test_engine_status_display() {
        assert_eq!(EngineStatus::Uninitialized.to_string(), "uninitialized");
        assert_eq!(EngineStatus::Active.to_string(), "active");
        assert_eq!(EngineStatus::Exhausted.to_string(), "exhausted");
    }

    #[test]
    fn test_retry_policy_linear() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2), BackoffType::Linear);
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(6));
    }

    #[test]
    fn test_retry_policy_constant() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500), BackoffType::Constant);
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
    }

    #[test]
    fn test_retry_policy_exponential() {
        let policy = RetryPolicy::new(4, Duration::from_secs(1), BackoffType::Exponential);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }
}
