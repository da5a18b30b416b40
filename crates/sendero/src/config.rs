//! Journey files, credentials and browser settings.
//!
//! A journey file is YAML. Targets are declared once and referenced by name
//! from steps; a step may also carry an inline locator.
//!
//! ```yaml
//! name: OrangeHRM Login
//! base_url: https://opensource-demo.orangehrmlive.com/
//! overall_timeout_ms: 60000
//! targets:
//!   username: { attribute: { tag: input, attribute: name, value: username } }
//!   profile_menu: { class: { tag: span, class: oxd-userdropdown-tab } }
//! login:
//!   steps:
//!     - { action: wait_for, visible: username, timeout_ms: 20000 }
//!     - { action: fill, target: username, value: "${username}" }
//!   marker: { visible: profile_menu, timeout_ms: 30000 }
//! body: []
//! ```
//!
//! `${username}` and `${password}` are replaced from [`Credentials`] when the
//! journey runs. Credentials come from `SENDERO_USERNAME` /
//! `SENDERO_PASSWORD`, falling back to the file's `credentials` section.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::driver::Viewport;
use crate::journey::{JourneyConfig, Login, DEFAULT_DEADLINE_MS};
use crate::locator::{Locator, Locators};
use crate::pattern::UrlPattern;
use crate::result::{HarnessError, HarnessResult};
use crate::step::{Step, SECRET_MASK};
use crate::wait::{Condition, WaitCondition, ACTION_TIMEOUT_MS};

/// Environment variable holding the login username
pub const USERNAME_ENV: &str = "SENDERO_USERNAME";

/// Environment variable holding the login password
pub const PASSWORD_ENV: &str = "SENDERO_PASSWORD";

/// Placeholder replaced by the username in fill values
pub const USERNAME_PLACEHOLDER: &str = "${username}";

/// Placeholder replaced by the password in fill values
pub const PASSWORD_PLACEHOLDER: &str = "${password}";

/// Login credentials
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &SECRET_MASK)
            .finish()
    }
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read from the environment, field by field, falling back to `fallback`
    pub fn resolve(fallback: Option<&Self>) -> HarnessResult<Self> {
        Self::resolve_with(|key| std::env::var(key).ok(), fallback)
    }

    /// [`resolve`](Self::resolve) with an explicit variable lookup
    pub fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
        fallback: Option<&Self>,
    ) -> HarnessResult<Self> {
        let pick = |key: &str, file: Option<&String>| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .or_else(|| file.filter(|v| !v.is_empty()).cloned())
                .ok_or_else(|| {
                    HarnessError::config(format!(
                        "missing credential: set {key} or add it to the journey file"
                    ))
                })
        };
        Ok(Self {
            username: pick(USERNAME_ENV, fallback.map(|c| &c.username))?,
            password: pick(PASSWORD_ENV, fallback.map(|c| &c.password))?,
        })
    }

    /// Replace placeholders in a fill value; a filled password becomes secret
    #[must_use]
    pub fn substitute(&self, step: &Step) -> Step {
        match step {
            Step::Fill {
                locator,
                value,
                secret,
            } => Step::Fill {
                locator: locator.clone(),
                value: value
                    .replace(USERNAME_PLACEHOLDER, &self.username)
                    .replace(PASSWORD_PLACEHOLDER, &self.password),
                secret: *secret || value.contains(PASSWORD_PLACEHOLDER),
            },
            other => other.clone(),
        }
    }

    /// Substitute every step
    #[must_use]
    pub fn apply(&self, steps: &[Step]) -> Vec<Step> {
        steps.iter().map(|s| self.substitute(s)).collect()
    }
}

/// A target given by registry name or inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetRef {
    /// Name declared under `targets`
    Name(String),
    /// Inline locator
    Inline(Locator),
}

impl TargetRef {
    fn resolve(&self, targets: &Locators) -> HarnessResult<Locator> {
        match self {
            Self::Name(name) => targets.resolve(name),
            Self::Inline(locator) => Ok(locator.clone()),
        }
    }
}

/// Wait condition as written in a journey file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSpec {
    /// Target becomes visible
    Visible(TargetRef),
    /// Target is attached
    Attached(TargetRef),
    /// URL matches
    UrlMatches(UrlPattern),
}

/// Wait as written in a journey file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSpec {
    /// Condition
    #[serde(flatten)]
    pub condition: ConditionSpec,
    /// Upper bound in milliseconds
    #[serde(default = "default_wait_ms")]
    pub timeout_ms: u64,
}

fn default_wait_ms() -> u64 {
    ACTION_TIMEOUT_MS
}

impl WaitSpec {
    fn resolve(&self, targets: &Locators) -> HarnessResult<WaitCondition> {
        let condition = match &self.condition {
            ConditionSpec::Visible(target) => Condition::Visible(target.resolve(targets)?),
            ConditionSpec::Attached(target) => Condition::Attached(target.resolve(targets)?),
            ConditionSpec::UrlMatches(pattern) => {
                pattern.validate()?;
                Condition::UrlMatches(pattern.clone())
            }
        };
        Ok(WaitCondition {
            condition,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// Step as written in a journey file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepSpec {
    /// Load a URL
    Navigate {
        /// Absolute URL
        url: String,
    },
    /// Resize the viewport
    SetViewport {
        /// Width
        width: u32,
        /// Height
        height: u32,
    },
    /// Fill an input
    Fill {
        /// Target input
        target: TargetRef,
        /// Value, may contain credential placeholders
        value: String,
        /// Keep the value out of logs
        #[serde(default)]
        secret: bool,
    },
    /// Click
    Click {
        /// Target element
        target: TargetRef,
    },
    /// Wait for a condition
    WaitFor(WaitSpec),
    /// Save a PNG, relative paths land in the artifacts directory
    Screenshot {
        /// Output path
        path: PathBuf,
        /// Whole document
        #[serde(default = "default_full_page")]
        full_page: bool,
    },
}

const fn default_full_page() -> bool {
    true
}

impl StepSpec {
    fn resolve(&self, targets: &Locators) -> HarnessResult<Step> {
        Ok(match self {
            Self::Navigate { url } => Step::navigate(url.clone()),
            Self::SetViewport { width, height } => {
                Step::set_viewport(Viewport::new(*width, *height))
            }
            Self::Fill {
                target,
                value,
                secret,
            } => Step::Fill {
                locator: target.resolve(targets)?,
                value: value.clone(),
                secret: *secret,
            },
            Self::Click { target } => Step::click(target.resolve(targets)?),
            Self::WaitFor(wait) => Step::wait(wait.resolve(targets)?),
            Self::Screenshot { path, full_page } => Step::Screenshot {
                path: path.clone(),
                full_page: *full_page,
            },
        })
    }
}

/// Login section of a journey file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSpec {
    /// Steps that submit the credentials
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    /// UI element confirming the session
    pub marker: WaitSpec,
}

/// A journey as loaded from YAML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JourneyFile {
    /// Scenario name
    pub name: String,
    /// Application root
    pub base_url: String,
    /// Viewport, 1920x1080 when omitted
    #[serde(default)]
    pub viewport: Viewport,
    /// Deadline for the whole journey
    #[serde(default = "default_deadline_ms")]
    pub overall_timeout_ms: u64,
    /// Fallback credentials
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Named targets
    #[serde(default)]
    pub targets: Locators,
    /// Login precondition
    #[serde(default)]
    pub login: Option<LoginSpec>,
    /// Scenario body
    #[serde(default)]
    pub body: Vec<StepSpec>,
}

const fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE_MS
}

impl JourneyFile {
    /// Load and validate a journey file
    pub fn load(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> HarnessResult<Self> {
        let mut file: Self = serde_yaml_ng::from_str(yaml)?;
        file.targets.name_from_keys();
        file.validate()?;
        Ok(file)
    }

    /// Check the root URL, deadline, target references and URL patterns
    pub fn validate(&self) -> HarnessResult<()> {
        if self.name.trim().is_empty() {
            return Err(HarnessError::config("journey name is empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HarnessError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.overall_timeout_ms == 0 {
            return Err(HarnessError::config("overall_timeout_ms must be positive"));
        }
        self.login()?;
        self.body()?;
        Ok(())
    }

    /// Resolved login section
    pub fn login(&self) -> HarnessResult<Option<Login>> {
        self.login
            .as_ref()
            .map(|spec| {
                Ok(Login {
                    steps: self.resolve_all(&spec.steps)?,
                    marker: spec.marker.resolve(&self.targets)?,
                })
            })
            .transpose()
    }

    /// Resolved body steps
    pub fn body(&self) -> HarnessResult<Vec<Step>> {
        self.resolve_all(&self.body)
    }

    /// Build a runnable journey
    pub fn to_journey(
        &self,
        credentials: Credentials,
        artifacts_dir: impl Into<PathBuf>,
    ) -> HarnessResult<JourneyConfig> {
        let mut journey = JourneyConfig::new(&self.name, &self.base_url)
            .with_credentials(credentials)
            .with_viewport(self.viewport)
            .with_body(self.body()?)
            .with_overall_timeout_ms(self.overall_timeout_ms)
            .with_artifacts_dir(artifacts_dir);
        if let Some(login) = self.login()? {
            journey = journey.with_login(login);
        }
        Ok(journey)
    }

    fn resolve_all(&self, specs: &[StepSpec]) -> HarnessResult<Vec<Step>> {
        specs.iter().map(|s| s.resolve(&self.targets)).collect()
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run without a window
    pub headless: bool,
    /// Initial window size
    pub viewport: Viewport,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::DESKTOP_1080P,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}
