//! Step Sequencer: runs steps strictly in order against one page.
//!
//! ```text
//!   steps ──► [auto-wait target visible] ──► action ──► next step
//!                     │                        │
//!                     └──── first error ───────┴──► StepFailure (stop)
//! ```
//!
//! No step starts before the previous one returned, and nothing after the
//! first failing step runs.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::artifact::write_png;
use crate::driver::{PageDriver, Viewport};
use crate::result::{HarnessError, HarnessResult};
use crate::step::Step;
use crate::wait::{Synchronizer, WaitCondition, ACTION_TIMEOUT_MS};

/// The step that stopped a sequence, and what ran before it
#[derive(Debug, thiserror::Error)]
#[error("step {index} ({step}) failed: {error}")]
pub struct StepFailure {
    /// Zero-based index of the failing step
    pub index: usize,
    /// Description of the failing step
    pub step: String,
    /// Descriptions of the steps that completed before it
    pub completed: Vec<String>,
    /// Underlying error
    #[source]
    pub error: HarnessError,
}

impl StepFailure {
    /// Drop the context and keep the underlying error
    #[must_use]
    pub fn into_error(self) -> HarnessError {
        self.error
    }
}

/// Executes ordered steps, waiting for each interaction target first
#[derive(Debug, Clone)]
pub struct StepSequencer {
    sync: Synchronizer,
    auto_wait_ms: u64,
    output_dir: Option<PathBuf>,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    /// Create a sequencer with the default synchronizer and auto-wait bound
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sync: Synchronizer::new(),
            auto_wait_ms: ACTION_TIMEOUT_MS,
            output_dir: None,
        }
    }

    /// Use a custom synchronizer
    #[must_use]
    pub const fn with_synchronizer(mut self, sync: Synchronizer) -> Self {
        self.sync = sync;
        self
    }

    /// Bound for the implicit visibility wait before fills and clicks
    #[must_use]
    pub const fn with_auto_wait_ms(mut self, ms: u64) -> Self {
        self.auto_wait_ms = ms;
        self
    }

    /// Resolve relative screenshot paths against `dir`
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// The synchronizer used for waits
    #[must_use]
    pub const fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    /// Run `steps` in order, stopping at the first failure.
    ///
    /// Returns the descriptions of all executed steps.
    pub async fn run<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        steps: &[Step],
    ) -> Result<Vec<String>, StepFailure> {
        let mut log = Vec::with_capacity(steps.len());
        self.run_into(driver, steps, &mut log).await?;
        Ok(log)
    }

    /// Like [`run`](Self::run), appending each description to `log` as soon
    /// as its step completes, so the log survives cancellation.
    pub async fn run_into<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        steps: &[Step],
        log: &mut Vec<String>,
    ) -> Result<(), StepFailure> {
        let start = log.len();
        for (index, step) in steps.iter().enumerate() {
            let description = step.describe();
            info!(index, step = %description, "step");
            if let Err(error) = self.execute(driver, step).await {
                return Err(StepFailure {
                    index,
                    step: description,
                    completed: log[start..].to_vec(),
                    error,
                });
            }
            log.push(description);
        }
        Ok(())
    }

    /// Execute a single step
    pub async fn execute<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        step: &Step,
    ) -> HarnessResult<()> {
        if let Some(target) = step.target() {
            let ready = WaitCondition::visible(target.clone(), self.auto_wait_ms);
            let outcome = self.sync.wait_for(&*driver, &ready).await?;
            debug!(target = %target.label(), elapsed = ?outcome.elapsed, "target ready");
        }

        match step {
            Step::Navigate { url } => driver.navigate(url).await,
            Step::SetViewport { width, height } => {
                driver.set_viewport(Viewport::new(*width, *height)).await
            }
            Step::Fill { locator, value, .. } => driver.fill(locator, value).await,
            Step::Click { locator } => driver.click(locator).await,
            Step::WaitFor(wait) => self.sync.wait_for(&*driver, wait).await.map(|_| ()),
            Step::Screenshot { path, full_page } => {
                let data = driver.screenshot(*full_page).await?;
                let path = self.output_path(path);
                write_png(&path, &data).await?;
                info!(path = %path.display(), "screenshot saved");
                Ok(())
            }
        }
    }

    fn output_path(&self, path: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
