//! Steps: the atomic actions a journey is made of.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::driver::Viewport;
use crate::locator::Locator;
use crate::wait::WaitCondition;

/// Mask shown in logs in place of secret fill values
pub const SECRET_MASK: &str = "********";

/// One atomic driven action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a URL
    Navigate {
        /// Absolute URL
        url: String,
    },
    /// Resize the viewport
    SetViewport {
        /// Width in CSS pixels
        width: u32,
        /// Height in CSS pixels
        height: u32,
    },
    /// Replace an input's value
    Fill {
        /// Target input
        locator: Locator,
        /// Value to type
        value: String,
        /// Keep the value out of logs and failure records
        #[serde(default)]
        secret: bool,
    },
    /// Click an element
    Click {
        /// Target element
        locator: Locator,
    },
    /// Block until a condition holds
    WaitFor(WaitCondition),
    /// Save a PNG of the page
    Screenshot {
        /// Output file
        path: PathBuf,
        /// Capture the whole document instead of the viewport
        #[serde(default = "default_full_page")]
        full_page: bool,
    },
}

const fn default_full_page() -> bool {
    true
}

impl Step {
    /// Navigate to `url`
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    /// Resize the viewport
    #[must_use]
    pub const fn set_viewport(viewport: Viewport) -> Self {
        Self::SetViewport {
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Fill `locator` with `value`
    #[must_use]
    pub fn fill(locator: Locator, value: impl Into<String>) -> Self {
        Self::Fill {
            locator,
            value: value.into(),
            secret: false,
        }
    }

    /// Fill `locator` with a value that must never be logged
    #[must_use]
    pub fn fill_secret(locator: Locator, value: impl Into<String>) -> Self {
        Self::Fill {
            locator,
            value: value.into(),
            secret: true,
        }
    }

    /// Click `locator`
    #[must_use]
    pub const fn click(locator: Locator) -> Self {
        Self::Click { locator }
    }

    /// Wait for a condition
    #[must_use]
    pub const fn wait(condition: WaitCondition) -> Self {
        Self::WaitFor(condition)
    }

    /// Wait for `locator` to become visible within `timeout_ms`
    #[must_use]
    pub const fn expect_visible(locator: Locator, timeout_ms: u64) -> Self {
        Self::WaitFor(WaitCondition::visible(locator, timeout_ms))
    }

    /// Full-page screenshot to `path`
    #[must_use]
    pub fn screenshot(path: impl Into<PathBuf>) -> Self {
        Self::Screenshot {
            path: path.into(),
            full_page: true,
        }
    }

    /// Element the step acts on, which must be ready before the action
    #[must_use]
    pub const fn target(&self) -> Option<&Locator> {
        match self {
            Self::Fill { locator, .. } | Self::Click { locator } => Some(locator),
            _ => None,
        }
    }

    /// Log line for this step; secret values are masked
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Navigate { url } => format!("navigate to {url}"),
            Self::SetViewport { width, height } => format!("set viewport {width}x{height}"),
            Self::Fill {
                locator,
                value,
                secret,
            } => {
                let shown = if *secret { SECRET_MASK } else { value.as_str() };
                format!("fill {} with \"{shown}\"", locator.label())
            }
            Self::Click { locator } => format!("click {}", locator.label()),
            Self::WaitFor(wait) => format!("wait for {wait}"),
            Self::Screenshot { path, full_page } => {
                let scope = if *full_page { "full page" } else { "viewport" };
                format!("screenshot {} ({scope})", path.display())
            }
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
