//! PageDriver - Abstract Browser Automation Trait
//!
//! The harness never talks to a browser directly. Everything it needs from
//! the automation capability goes through [`PageDriver`]:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  PageDriver (trait)                                               │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────┐        ┌────────────────────────────┐  │
//! │  │  ChromiumDriver       │        │  MockDriver                │  │
//! │  │  (feature "browser")  │        │  (scripted page, tests)    │  │
//! │  │  CDP via chromiumoxide│        │  tokio-clock driven        │  │
//! │  └───────────────────────┘        └────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typed waits (`waitForVisible`, `waitForUrl`) are not part of the trait;
//! the Synchronizer builds them from [`PageDriver::probe`] and
//! [`PageDriver::current_url`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::locator::Locator;
use crate::result::{HarnessError, HarnessResult};

/// Browser viewport size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Viewport {
    /// Desktop 1080p, the size every built-in journey runs at
    pub const DESKTOP_1080P: Self = Self::new(1920, 1080);

    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DESKTOP_1080P
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// What a probe found for a locator on the live page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// No element matches
    Detached,
    /// Matched, but has no box or is `visibility: hidden`
    Hidden,
    /// Matched and rendered
    Visible,
}

impl ElementState {
    /// Element exists in the DOM
    #[must_use]
    pub const fn is_attached(self) -> bool {
        !matches!(self, Self::Detached)
    }

    /// Element is rendered
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// Abstract driver trait for one browser page
///
/// A driver value is one page/session. The journey runner borrows it
/// mutably for the whole run, so a page is never shared between journeys.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> HarnessResult<()>;

    /// Resize the viewport
    async fn set_viewport(&mut self, viewport: Viewport) -> HarnessResult<()>;

    /// Resolve `locator` against the current page and report its state
    async fn probe(&self, locator: &Locator) -> HarnessResult<ElementState>;

    /// Replace the value of an input element
    async fn fill(&mut self, locator: &Locator, value: &str) -> HarnessResult<()>;

    /// Click an element
    async fn click(&mut self, locator: &Locator) -> HarnessResult<()>;

    /// Get current URL
    async fn current_url(&self) -> HarnessResult<String>;

    /// Capture a PNG of the viewport, or of the whole document when `full_page`
    async fn screenshot(&self, full_page: bool) -> HarnessResult<Vec<u8>>;

    /// Whether the page or its browser is gone
    async fn is_closed(&self) -> bool;
}

/// PNG signature returned as mock screenshot data
pub const MOCK_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone)]
struct MockElement {
    appears_at: Instant,
    state: ElementState,
}

/// Scripted reaction to a click
#[derive(Debug, Clone, Default)]
pub struct ClickEffect {
    navigate_to: Option<String>,
    reveal: Vec<(Locator, Duration, ElementState)>,
    remove: Vec<Locator>,
    requires: Vec<(Locator, String)>,
}

impl ClickEffect {
    /// Create an effect that does nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the URL when clicked
    #[must_use]
    pub fn navigate_to(mut self, url: impl Into<String>) -> Self {
        self.navigate_to = Some(url.into());
        self
    }

    /// Make an element visible `after` the click
    #[must_use]
    pub fn reveal(mut self, locator: Locator, after: Duration) -> Self {
        self.reveal.push((locator, after, ElementState::Visible));
        self
    }

    /// Remove an element from the page when clicked
    #[must_use]
    pub fn remove(mut self, locator: Locator) -> Self {
        self.remove.push(locator);
        self
    }

    /// Only take effect if `locator` was filled with `value`
    #[must_use]
    pub fn requires(mut self, locator: Locator, value: impl Into<String>) -> Self {
        self.requires.push((locator, value.into()));
        self
    }
}

/// Mock driver for unit testing
///
/// Elements appear on a schedule measured with the tokio clock, so tests
/// running with paused time are deterministic.
#[derive(Debug)]
pub struct MockDriver {
    url: String,
    viewport: Viewport,
    elements: HashMap<String, MockElement>,
    clicks: HashMap<String, ClickEffect>,
    fills: HashMap<String, String>,
    navigation_error: Option<String>,
    screenshot_error: Option<String>,
    closed: bool,
    call_history: Mutex<Vec<String>>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create new mock driver showing `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            viewport: Viewport::new(800, 600),
            elements: HashMap::new(),
            clicks: HashMap::new(),
            fills: HashMap::new(),
            navigation_error: None,
            screenshot_error: None,
            closed: false,
            call_history: Mutex::new(Vec::new()),
        }
    }

    /// Add an element that becomes visible `after` now
    #[must_use]
    pub fn with_element(mut self, locator: &Locator, after: Duration) -> Self {
        self.place(locator, after, ElementState::Visible);
        self
    }

    /// Add an element that is attached but never rendered
    #[must_use]
    pub fn with_hidden_element(mut self, locator: &Locator, after: Duration) -> Self {
        self.place(locator, after, ElementState::Hidden);
        self
    }

    /// Script what clicking `locator` does
    #[must_use]
    pub fn on_click(mut self, locator: &Locator, effect: ClickEffect) -> Self {
        self.clicks.insert(locator.to_string(), effect);
        self
    }

    /// Make every navigation fail
    #[must_use]
    pub fn failing_navigation(mut self, message: impl Into<String>) -> Self {
        self.navigation_error = Some(message.into());
        self
    }

    /// Make every screenshot fail
    #[must_use]
    pub fn failing_screenshots(mut self, message: impl Into<String>) -> Self {
        self.screenshot_error = Some(message.into());
        self
    }

    /// Simulate the page crashing or being closed
    pub fn close(&mut self) {
        self.record("close".to_string());
        self.closed = true;
    }

    /// Value last filled into `locator`
    #[must_use]
    pub fn filled(&self, locator: &Locator) -> Option<&str> {
        self.fills.get(&locator.to_string()).map(String::as_str)
    }

    /// Current viewport
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.call_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    fn record(&self, call: String) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(call);
        }
    }

    fn place(&mut self, locator: &Locator, after: Duration, state: ElementState) {
        self.elements.insert(
            locator.to_string(),
            MockElement {
                appears_at: Instant::now() + after,
                state,
            },
        );
    }

    fn state_of(&self, locator: &Locator) -> ElementState {
        match self.elements.get(&locator.to_string()) {
            Some(element) if Instant::now() >= element.appears_at => element.state,
            _ => ElementState::Detached,
        }
    }

    fn ensure_open(&self) -> HarnessResult<()> {
        if self.closed {
            Err(HarnessError::driver("Target page, context or browser has been closed"))
        } else {
            Ok(())
        }
    }

    fn ensure_visible(&self, locator: &Locator) -> HarnessResult<()> {
        match self.state_of(locator) {
            ElementState::Visible => Ok(()),
            ElementState::Hidden => Err(HarnessError::driver(format!(
                "element {locator} is not visible"
            ))),
            ElementState::Detached => Err(HarnessError::driver(format!(
                "element {locator} is not attached to the DOM"
            ))),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        self.ensure_open()?;
        self.record(format!("navigate:{url}"));
        if let Some(message) = &self.navigation_error {
            return Err(HarnessError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        self.url = url.to_string();
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> HarnessResult<()> {
        self.ensure_open()?;
        self.record(format!("set_viewport:{viewport}"));
        self.viewport = viewport;
        Ok(())
    }

    async fn probe(&self, locator: &Locator) -> HarnessResult<ElementState> {
        self.ensure_open()?;
        Ok(self.state_of(locator))
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.record(format!("fill:{locator}"));
        self.fills.insert(locator.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> HarnessResult<()> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.record(format!("click:{locator}"));

        let Some(effect) = self.clicks.get(&locator.to_string()).cloned() else {
            return Ok(());
        };
        let satisfied = effect
            .requires
            .iter()
            .all(|(field, value)| self.filled(field) == Some(value.as_str()));
        if !satisfied {
            return Ok(());
        }
        for gone in &effect.remove {
            self.elements.remove(&gone.to_string());
        }
        if let Some(url) = effect.navigate_to {
            self.url = url;
        }
        for (target, after, state) in &effect.reveal {
            self.place(target, *after, *state);
        }
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        self.ensure_open()?;
        Ok(self.url.clone())
    }

    async fn screenshot(&self, full_page: bool) -> HarnessResult<Vec<u8>> {
        self.ensure_open()?;
        let scope = if full_page { "full_page" } else { "viewport" };
        self.record(format!("screenshot:{scope}"));
        match &self.screenshot_error {
            Some(message) => Err(HarnessError::driver(format!("screenshot failed: {message}"))),
            None => Ok(MOCK_PNG.to_vec()),
        }
    }

    async fn is_closed(&self) -> bool {
        self.closed
    }
}
