//! Journey Runner: one user journey, start to verdict.
//!
//! ```text
//!  NotStarted ──► NavigatingRoot ──► LoggingIn ──► LoggedIn ──► ExecutingBody ──► Completed
//!       │               │                │             │               │
//!       └───────────────┴────────────────┴─────────────┴───────────────┴──────► Failed
//! ```
//!
//! The runner navigates to the application root, sets the viewport, runs the
//! login steps and confirms the session through a UI marker, then runs the
//! scenario body and saves the success snapshot. The whole journey is bounded
//! by one overall deadline. Any failure moves to `Failed`, triggers artifact
//! capture, and is returned inside the [`ScenarioResult`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactPaths, FailureArtifactCapturer, FailureRecord};
use crate::config::Credentials;
use crate::driver::{PageDriver, Viewport};
use crate::report::{OutcomeReporter, RunContext, ScenarioResult};
use crate::result::{HarnessError, HarnessResult};
use crate::sequencer::StepSequencer;
use crate::step::Step;
use crate::wait::WaitCondition;

/// Default deadline for a whole journey (60 seconds)
pub const DEFAULT_DEADLINE_MS: u64 = 60_000;

/// Default artifact directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Lifecycle of one journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyState {
    /// Nothing has happened yet
    NotStarted,
    /// Loading the application root
    NavigatingRoot,
    /// Submitting credentials
    LoggingIn,
    /// Session confirmed
    LoggedIn,
    /// Running the scenario body
    ExecutingBody,
    /// Every step passed
    Completed,
    /// Some step, wait or check failed
    Failed,
}

impl JourneyState {
    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal successor
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::NavigatingRoot)
            | (Self::NavigatingRoot, Self::LoggingIn)
            | (Self::LoggingIn, Self::LoggedIn)
            | (Self::LoggedIn, Self::ExecutingBody)
            | (Self::ExecutingBody, Self::Completed) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JourneyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::NavigatingRoot => "navigating root",
            Self::LoggingIn => "logging in",
            Self::LoggedIn => "logged in",
            Self::ExecutingBody => "executing body",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the current state and rejects illegal transitions
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: JourneyState,
    trail: Vec<JourneyState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Start in `NotStarted`
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: JourneyState::NotStarted,
            trail: vec![JourneyState::NotStarted],
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> JourneyState {
        self.state
    }

    /// Every state visited, in order
    #[must_use]
    pub fn trail(&self) -> &[JourneyState] {
        &self.trail
    }

    /// Move to `next`
    pub fn advance(&mut self, next: JourneyState) -> HarnessResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(HarnessError::InvalidState {
                message: format!("cannot move from {} to {next}", self.state),
            });
        }
        debug!(from = %self.state, to = %next, "journey state");
        self.state = next;
        self.trail.push(next);
        Ok(())
    }

    /// Move to `Failed`
    pub fn fail(&mut self) -> HarnessResult<()> {
        self.advance(JourneyState::Failed)
    }
}

/// Login precondition: steps plus the UI marker that proves the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Login {
    /// Steps that submit the credentials
    pub steps: Vec<Step>,
    /// Element visible only to a logged-in user
    pub marker: WaitCondition,
}

/// Everything needed to run one journey
#[derive(Debug, Clone)]
pub struct JourneyConfig {
    /// Scenario name
    pub name: String,
    /// Application root
    pub base_url: String,
    /// Substituted into `${username}` / `${password}` fill values
    pub credentials: Credentials,
    /// Viewport set right after the root loads
    pub viewport: Viewport,
    /// Login precondition; `None` skips straight to the body
    pub login: Option<Login>,
    /// Scenario body
    pub body: Vec<Step>,
    /// Deadline for the whole journey
    pub overall_timeout_ms: u64,
    /// Where snapshots and failure records go
    pub artifacts_dir: PathBuf,
}

impl JourneyConfig {
    /// Create a journey with no login and an empty body
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            credentials: Credentials::default(),
            viewport: Viewport::DESKTOP_1080P,
            login: None,
            body: Vec::new(),
            overall_timeout_ms: DEFAULT_DEADLINE_MS,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
        }
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set viewport
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the login precondition
    #[must_use]
    pub fn with_login(mut self, login: Login) -> Self {
        self.login = Some(login);
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: Vec<Step>) -> Self {
        self.body = body;
        self
    }

    /// Append a body step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.body.push(step);
        self
    }

    /// Set the overall deadline
    #[must_use]
    pub const fn with_overall_timeout_ms(mut self, ms: u64) -> Self {
        self.overall_timeout_ms = ms;
        self
    }

    /// Set the artifact directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Overall deadline as Duration
    #[must_use]
    pub const fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    /// Artifact locations for this journey
    #[must_use]
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.artifacts_dir, &self.name)
    }
}

/// What a run has done so far; survives cancellation by the deadline
#[derive(Debug, Default)]
struct Progress {
    machine: StateMachine,
    steps: Vec<String>,
    failed_step: Option<(usize, String)>,
}

impl Progress {
    async fn run<D: PageDriver + ?Sized>(
        &mut self,
        sequencer: &StepSequencer,
        driver: &mut D,
        steps: &[Step],
    ) -> HarnessResult<()> {
        sequencer
            .run_into(driver, steps, &mut self.steps)
            .await
            .map_err(|failure| {
                self.failed_step = Some((failure.index, failure.step));
                failure.error
            })
    }
}

/// Runs journeys against a page driver
#[derive(Debug, Clone, Default)]
pub struct JourneyRunner {
    sequencer: StepSequencer,
    capturer: FailureArtifactCapturer,
    reporter: OutcomeReporter,
}

impl JourneyRunner {
    /// Create a runner with default waits
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom sequencer
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: StepSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    /// Run `journey` on `driver`, which is borrowed exclusively for the run.
    ///
    /// Never panics and never swallows a failure: a failed journey comes back
    /// as a failed [`ScenarioResult`] holding the original error.
    pub async fn run<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        journey: &JourneyConfig,
    ) -> ScenarioResult {
        let ctx = RunContext::new(&journey.name);
        let paths = journey.artifact_paths();
        self.reporter.start(&ctx, journey);
        if let Err(e) = paths.clear_stale().await {
            warn!(error = %e, "could not clear stale artifacts");
        }

        let sequencer = self
            .sequencer
            .clone()
            .with_output_dir(&journey.artifacts_dir);
        let mut progress = Progress::default();
        let driven = tokio::time::timeout(
            journey.overall_timeout(),
            self.drive(&sequencer, &mut *driver, journey, &paths, &mut progress),
        )
        .await;

        let error = match driven {
            Ok(Ok(snapshot)) => match progress.machine.advance(JourneyState::Completed) {
                Ok(()) => return self.reporter.passed(&ctx, progress.steps, snapshot),
                Err(e) => e,
            },
            Ok(Err(e)) => e,
            Err(_) => HarnessError::Timeout {
                waited_for: "journey deadline".to_string(),
                ms: journey.overall_timeout_ms,
            },
        };
        self.fail(&*driver, &ctx, &paths, progress, error).await
    }

    async fn drive<D: PageDriver + ?Sized>(
        &self,
        sequencer: &StepSequencer,
        driver: &mut D,
        journey: &JourneyConfig,
        paths: &ArtifactPaths,
        progress: &mut Progress,
    ) -> HarnessResult<PathBuf> {
        progress.machine.advance(JourneyState::NavigatingRoot)?;
        let root = [
            Step::navigate(&journey.base_url),
            Step::set_viewport(journey.viewport),
        ];
        progress.run(sequencer, driver, &root).await?;

        progress.machine.advance(JourneyState::LoggingIn)?;
        if let Some(login) = &journey.login {
            let steps = journey.credentials.apply(&login.steps);
            progress.run(sequencer, driver, &steps).await?;
            sequencer
                .synchronizer()
                .wait_for(&*driver, &login.marker)
                .await
                .map_err(|e| login_not_confirmed(e, &login.marker))?;
            info!(marker = %login.marker.condition, "login confirmed");
        }
        progress.machine.advance(JourneyState::LoggedIn)?;

        progress.machine.advance(JourneyState::ExecutingBody)?;
        let body = journey.credentials.apply(&journey.body);
        progress.run(sequencer, driver, &body).await?;

        self.reporter.success_snapshot(&*driver, paths).await
    }

    async fn fail<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        ctx: &RunContext,
        paths: &ArtifactPaths,
        mut progress: Progress,
        error: HarnessError,
    ) -> ScenarioResult {
        let state = progress.machine.state();
        if let Err(e) = progress.machine.fail() {
            warn!(error = %e, "journey already terminal");
        }
        // A success snapshot may exist if the deadline hit right after it.
        if let Err(e) = paths.clear_stale().await {
            warn!(error = %e, "could not clear success snapshot");
        }

        let mut record = FailureRecord::new(ctx.run_id, &ctx.scenario, state, &error);
        if let Some((index, step)) = progress.failed_step.take() {
            record.step_index = Some(index);
            record.step = Some(step);
        }
        record.completed_steps.clone_from(&progress.steps);
        self.capturer.capture(driver, paths, &mut record).await;
        self.reporter.failed(ctx, progress.steps, record, error)
    }
}

/// A marker that never shows up means the login was rejected
fn login_not_confirmed(error: HarnessError, marker: &WaitCondition) -> HarnessError {
    if error.is_timeout() {
        HarnessError::assertion(format!(
            "login not confirmed: expected {} within {}ms",
            marker.condition, marker.timeout_ms
        ))
    } else {
        error
    }
}
