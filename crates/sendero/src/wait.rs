//! Synchronizer: explicit, bounded waits on asynchronous UI state.
//!
//! Every wait carries its own timeout. Page-load conditions get
//! [`PAGE_LOAD_TIMEOUT_MS`]; conditions that follow an action or a
//! navigation get [`ACTION_TIMEOUT_MS`]. A timeout is never retried here;
//! it surfaces as [`HarnessError::Timeout`] and the caller decides.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::driver::{ElementState, PageDriver};
use crate::locator::Locator;
use crate::pattern::{UrlMatcher, UrlPattern};
use crate::result::{HarnessError, HarnessResult};

/// Bound for conditions that gate an initial page load (20 seconds)
pub const PAGE_LOAD_TIMEOUT_MS: u64 = 20_000;

/// Bound for conditions that follow an action or navigation (30 seconds)
pub const ACTION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Predicate a wait is satisfied by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Element is attached and rendered
    Visible(Locator),
    /// Element is in the DOM, rendered or not
    Attached(Locator),
    /// Page URL matches a pattern
    UrlMatches(UrlPattern),
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible(locator) => write!(f, "{} to be visible", locator.label()),
            Self::Attached(locator) => write!(f, "{} to be attached", locator.label()),
            Self::UrlMatches(pattern) => write!(f, "URL to match {pattern}"),
        }
    }
}

/// A condition plus its own timeout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitCondition {
    /// What must become true
    #[serde(flatten)]
    pub condition: Condition,
    /// Upper bound in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    ACTION_TIMEOUT_MS
}

impl WaitCondition {
    /// Wait for `locator` to be visible within `timeout_ms`
    #[must_use]
    pub const fn visible(locator: Locator, timeout_ms: u64) -> Self {
        Self {
            condition: Condition::Visible(locator),
            timeout_ms,
        }
    }

    /// Wait for `locator` to be attached within `timeout_ms`
    #[must_use]
    pub const fn attached(locator: Locator, timeout_ms: u64) -> Self {
        Self {
            condition: Condition::Attached(locator),
            timeout_ms,
        }
    }

    /// Wait for the page URL to match `pattern` within `timeout_ms`
    #[must_use]
    pub const fn url(pattern: UrlPattern, timeout_ms: u64) -> Self {
        Self {
            condition: Condition::UrlMatches(pattern),
            timeout_ms,
        }
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A condition prepared for repeated evaluation
enum Predicate<'a> {
    Visible(&'a Locator),
    Attached(&'a Locator),
    Url(UrlMatcher),
}

impl<'a> Predicate<'a> {
    fn new(condition: &'a Condition) -> HarnessResult<Self> {
        Ok(match condition {
            Condition::Visible(locator) => Self::Visible(locator),
            Condition::Attached(locator) => Self::Attached(locator),
            Condition::UrlMatches(pattern) => Self::Url(pattern.compile()?),
        })
    }

    /// Evaluate once against the live page
    async fn holds<D: PageDriver + ?Sized>(&self, driver: &D) -> HarnessResult<bool> {
        match self {
            Self::Visible(locator) => Ok(driver.probe(locator).await? == ElementState::Visible),
            Self::Attached(locator) => Ok(driver.probe(locator).await?.is_attached()),
            Self::Url(matcher) => Ok(matcher.is_match(&driver.current_url().await?)),
        }
    }
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (timeout {}ms)", self.condition, self.timeout_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the predicate was evaluated
    pub polls: u32,
}

/// Polls conditions until they hold or their deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Synchronizer {
    poll_interval: Duration,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer {
    /// Create a synchronizer with the default polling interval
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Block until `wait` holds or its timeout elapses.
    ///
    /// Returns as soon as the predicate is observed true. Sleeps are clipped
    /// to the remaining time and each probe is bounded by it. When the last
    /// sleep lands on the deadline the predicate gets one final look, so a
    /// condition that became true inside the last poll window still counts.
    /// A timeout is reported only once the full bound has elapsed.
    pub async fn wait_for<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        wait: &WaitCondition,
    ) -> HarnessResult<WaitOutcome> {
        let predicate = Predicate::new(&wait.condition)?;
        let start = Instant::now();
        let deadline = start + wait.timeout();
        let mut polls = 0_u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            polls += 1;
            match tokio::time::timeout(remaining, predicate.holds(driver)).await {
                Ok(Ok(true)) => return Ok(satisfied(wait, start, polls)),
                Ok(Ok(false)) => {}
                Ok(Err(err)) => return Err(err),
                // The probe itself ran into the deadline
                Err(_) => return Err(timed_out(wait, polls)),
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }

        // At the deadline
        polls += 1;
        match tokio::time::timeout(self.poll_interval, predicate.holds(driver)).await {
            Ok(Ok(true)) => Ok(satisfied(wait, start, polls)),
            Ok(Err(err)) => Err(err),
            Ok(Ok(false)) | Err(_) => Err(timed_out(wait, polls)),
        }
    }
}

fn satisfied(wait: &WaitCondition, start: Instant, polls: u32) -> WaitOutcome {
    let elapsed = start.elapsed();
    debug!(condition = %wait.condition, ?elapsed, polls, "wait satisfied");
    WaitOutcome { elapsed, polls }
}

fn timed_out(wait: &WaitCondition, polls: u32) -> HarnessError {
    debug!(condition = %wait.condition, polls, "wait timed out");
    HarnessError::Timeout {
        waited_for: wait.condition.to_string(),
        ms: wait.timeout_ms,
    }
}
