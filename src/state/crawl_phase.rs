//! Crawl phase definitions for a single domain
//!
//! A domain moves through navigation, a bounded scroll loop, and ends either
//! converged (markup captured) or failed (empty markup).

use crate::ScoutError;
use std::fmt;

/// Represents where a domain crawl currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active States =====
    /// Loading the seed URL and waiting for the DOM to be parsed
    #[default]
    Navigating,

    /// Scrolling to the bottom and waiting for lazy content
    Scrolling,

    // ===== Terminal States =====
    /// Content height stopped growing or the attempt cap was reached
    Converged,

    /// Navigation or page evaluation failed; the markup result is empty
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Failed)
    }

    /// Returns true if the transition from `self` to `next` is legal
    ///
    /// ```text
    /// Navigating -> Scrolling | Failed
    /// Scrolling  -> Scrolling | Converged | Failed
    /// ```
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Navigating, Self::Scrolling)
                | (Self::Navigating, Self::Failed)
                | (Self::Scrolling, Self::Scrolling)
                | (Self::Scrolling, Self::Converged)
                | (Self::Scrolling, Self::Failed)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), ScoutError> {
        if !self.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigating => "navigating",
            Self::Scrolling => "scrolling",
            Self::Converged => "converged",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
