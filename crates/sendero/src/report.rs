//! Outcome Reporter: scenario results and start/pass/fail banners.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::artifact::{write_png, ArtifactPaths, FailureRecord};
use crate::driver::PageDriver;
use crate::journey::{JourneyConfig, JourneyState};
use crate::result::{HarnessError, HarnessResult};

/// Final verdict of a journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every step and check succeeded
    Passed,
    /// Some wait, action or assertion failed
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Result of one journey run
#[derive(Debug, Serialize)]
pub struct ScenarioResult {
    /// Run identifier
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// Verdict
    pub outcome: Outcome,
    /// Completed steps, in execution order
    pub steps: Vec<String>,
    /// State the journey ended in
    pub final_state: JourneyState,
    /// Failure details, present iff the journey failed
    pub failure: Option<FailureRecord>,
    /// The original error, kept for re-raising
    #[serde(skip)]
    pub error: Option<HarnessError>,
    /// Success or failure snapshot
    pub artifact: Option<PathBuf>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
}

impl ScenarioResult {
    /// Check if passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// Run duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Message of the original error, if any
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.failure.as_ref().map(|f| f.message.clone()))
    }

    /// Re-raise the original error of a failed run
    pub fn into_result(mut self) -> HarnessResult<Self> {
        if self.passed() {
            return Ok(self);
        }
        Err(self.error.take().unwrap_or_else(|| {
            HarnessError::assertion(
                self.failure
                    .map_or_else(|| "journey failed".to_string(), |f| f.message),
            )
        }))
    }
}

/// Identity and clock of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Run identifier
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    started: Instant,
}

impl RunContext {
    /// Start the clock for `scenario`
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scenario: scenario.into(),
            started: Instant::now(),
        }
    }

    /// Time since the run started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Builds scenario results and logs their banners
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeReporter;

impl OutcomeReporter {
    /// Announce a journey
    pub fn start(&self, ctx: &RunContext, journey: &JourneyConfig) {
        info!(
            scenario = %ctx.scenario,
            run_id = %ctx.run_id,
            base_url = %journey.base_url,
            deadline_ms = journey.overall_timeout_ms,
            "journey started"
        );
    }

    /// Save the full-page success snapshot
    pub async fn success_snapshot<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        paths: &ArtifactPaths,
    ) -> HarnessResult<PathBuf> {
        let path = paths.success_snapshot();
        let data = driver.screenshot(true).await?;
        write_png(&path, &data).await?;
        info!(path = %path.display(), "success screenshot saved");
        Ok(path)
    }

    /// Passed result carrying the step log and success snapshot
    #[must_use]
    pub fn passed(&self, ctx: &RunContext, steps: Vec<String>, snapshot: PathBuf) -> ScenarioResult {
        let duration_ms = ctx.elapsed_ms();
        info!(
            scenario = %ctx.scenario,
            steps = steps.len(),
            duration_ms,
            "journey passed"
        );
        ScenarioResult {
            run_id: ctx.run_id,
            scenario: ctx.scenario.clone(),
            outcome: Outcome::Passed,
            steps,
            final_state: JourneyState::Completed,
            failure: None,
            error: None,
            artifact: Some(snapshot),
            duration_ms,
            finished_at: Utc::now(),
        }
    }

    /// Failed result carrying the original error and failure snapshot
    #[must_use]
    pub fn failed(
        &self,
        ctx: &RunContext,
        steps: Vec<String>,
        record: FailureRecord,
        error: HarnessError,
    ) -> ScenarioResult {
        let duration_ms = ctx.elapsed_ms();
        error!(
            scenario = %ctx.scenario,
            state = %record.state,
            kind = %record.kind,
            error = %error,
            duration_ms,
            "journey failed"
        );
        ScenarioResult {
            run_id: ctx.run_id,
            scenario: ctx.scenario.clone(),
            outcome: Outcome::Failed,
            steps,
            final_state: JourneyState::Failed,
            artifact: record.snapshot.clone(),
            failure: Some(record),
            error: Some(error),
            duration_ms,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::result::ErrorKind;
    use tempfile::TempDir;

    fn failed_result() -> ScenarioResult {
        let ctx = RunContext::new("admin");
        let error = HarnessError::assertion("table header missing");
        let record = FailureRecord::new(ctx.run_id, "admin", JourneyState::ExecutingBody, &error);
        OutcomeReporter.failed(&ctx, vec!["navigate to https://hr/".into()], record, error)
    }

    #[test]
    fn test_failed_result_reraises_original_error() {
        let result = failed_result();
        assert!(!result.passed());
        assert_eq!(result.final_state, JourneyState::Failed);
        assert_eq!(result.error_message().as_deref(), Some("Assertion failed: table header missing"));
        let err = result.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Assertion);
    }

    #[test]
    fn test_json_omits_error_but_keeps_failure_record() {
        let json = serde_json::to_value(failed_result()).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["final_state"], "failed");
        assert_eq!(json["failure"]["kind"], "assertion");
        assert_eq!(json["failure"]["state"], "executing_body");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_passed_result_points_at_success_snapshot() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "login");
        let driver = MockDriver::new();
        let ctx = RunContext::new("login");

        let snapshot = OutcomeReporter.success_snapshot(&driver, &paths).await.unwrap();
        let result = OutcomeReporter.passed(&ctx, vec!["click login".into()], snapshot);

        assert!(result.passed());
        assert_eq!(result.artifact, Some(paths.success_snapshot()));
        assert!(paths.success_snapshot().exists());
        assert!(result.failure.is_none());
        assert_eq!(Outcome::Passed.to_string(), "PASSED");
    }
}
