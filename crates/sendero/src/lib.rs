//! Sendero: synchronized browser journeys
//!
//! Sendero (Spanish: "footpath") drives a web application through a browser
//! and checks that user journeys complete. Waits are explicit and bounded,
//! steps run strictly in order, and every failure leaves a snapshot and a
//! structured record behind.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SENDERO Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Journey    │    │ Step       │    │ Page       │            │
//! │   │ Runner     │───►│ Sequencer  │───►│ Driver     │            │
//! │   │            │    │            │    │ (chromium) │            │
//! │   └─────┬──────┘    └─────┬──────┘    └────────────┘            │
//! │         │                 ▼                  ▲                  │
//! │         │           ┌────────────┐           │                  │
//! │         │           │Synchronizer│───────────┘                  │
//! │         ▼           └────────────┘                              │
//! │   ┌────────────┐    ┌────────────┐                              │
//! │   │ Artifact   │    │ Outcome    │                              │
//! │   │ Capturer   │    │ Reporter   │                              │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> sendero::HarnessResult<()> {
//! use sendero::{scenarios, JourneyRunner, MockDriver};
//!
//! let journey = scenarios::admin(scenarios::DEMO_URL)
//!     .with_credentials(scenarios::demo_credentials());
//! let mut driver = MockDriver::new();
//! let result = JourneyRunner::new().run(&mut driver, &journey).await;
//! println!("{}: {}", result.scenario, result.outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod artifact;
#[cfg(feature = "browser")]
mod cdp;
mod config;
mod driver;
mod journey;
mod locator;
mod pattern;
mod report;
mod result;
mod sequencer;
mod step;
mod wait;

/// Tracing subscriber setup
pub mod logging;

/// Built-in OrangeHRM journeys
pub mod scenarios;

pub use artifact::{write_png, ArtifactPaths, FailureArtifactCapturer, FailureRecord, CAPTURE_TIMEOUT};
#[cfg(feature = "browser")]
pub use cdp::{run_journey, ChromiumDriver};
pub use config::{
    BrowserConfig, ConditionSpec, Credentials, JourneyFile, LoginSpec, StepSpec, TargetRef,
    WaitSpec, PASSWORD_ENV, PASSWORD_PLACEHOLDER, USERNAME_ENV, USERNAME_PLACEHOLDER,
};
pub use driver::{ClickEffect, ElementState, MockDriver, PageDriver, Viewport, MOCK_PNG};
pub use journey::{
    JourneyConfig, JourneyRunner, JourneyState, Login, StateMachine, DEFAULT_ARTIFACTS_DIR,
    DEFAULT_DEADLINE_MS,
};
pub use locator::{AttrMatch, Locator, Locators, Strategy};
pub use pattern::{UrlMatcher, UrlPattern};
pub use report::{Outcome, OutcomeReporter, RunContext, ScenarioResult};
pub use result::{ErrorKind, HarnessError, HarnessResult};
pub use sequencer::{StepFailure, StepSequencer};
pub use step::{Step, SECRET_MASK};
pub use wait::{
    Condition, Synchronizer, WaitCondition, WaitOutcome, ACTION_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS, PAGE_LOAD_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::cdp::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::journey::*;
    pub use super::locator::*;
    pub use super::pattern::*;
    pub use super::report::*;
    pub use super::result::*;
    pub use super::sequencer::*;
    pub use super::step::*;
    pub use super::wait::*;
}
