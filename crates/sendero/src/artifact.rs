//! Failure Artifact Capturer and artifact paths.
//!
//! On failure the capturer saves what the page looked like and a JSON record
//! of what went wrong. It never fails itself: every capture problem is
//! logged and dropped so the original journey error is the one reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::driver::PageDriver;
use crate::journey::JourneyState;
use crate::result::{ErrorKind, HarnessError, HarnessResult};

/// Upper bound for the whole capture, so a hung session cannot stall the report
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Deterministic artifact locations for one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Output directory
    pub dir: PathBuf,
    /// File-name stem derived from the scenario name
    pub slug: String,
}

impl ArtifactPaths {
    /// Artifacts for `scenario` under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, scenario: &str) -> Self {
        Self {
            dir: dir.into(),
            slug: slugify(scenario),
        }
    }

    /// `<dir>/<slug>_success.png`
    #[must_use]
    pub fn success_snapshot(&self) -> PathBuf {
        self.dir.join(format!("{}_success.png", self.slug))
    }

    /// `<dir>/<slug>_failed.png`
    #[must_use]
    pub fn failure_snapshot(&self) -> PathBuf {
        self.dir.join(format!("{}_failed.png", self.slug))
    }

    /// `<dir>/<slug>_failed.json`
    #[must_use]
    pub fn failure_record(&self) -> PathBuf {
        self.dir.join(format!("{}_failed.json", self.slug))
    }

    /// Remove artifacts left by a previous run of the same scenario
    pub async fn clear_stale(&self) -> HarnessResult<()> {
        for path in [
            self.success_snapshot(),
            self.failure_snapshot(),
            self.failure_record(),
        ] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => info!(path = %path.display(), "removed stale artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Lowercase, ASCII alphanumerics, everything else collapsed to `_`
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "journey".to_string()
    } else {
        slug.to_string()
    }
}

/// Write PNG bytes, creating parent directories
pub async fn write_png(path: &Path, data: &[u8]) -> HarnessResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await?;
    Ok(())
}

/// Structured description of a failed journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Run identifier shared with the scenario result
    pub run_id: Uuid,
    /// Scenario name
    pub scenario: String,
    /// State the journey was in when it failed
    pub state: JourneyState,
    /// Error classification
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
    /// Index of the failing step within its phase, when a step failed
    pub step_index: Option<usize>,
    /// Description of the failing step
    pub step: Option<String>,
    /// Steps completed before the failure, across phases
    pub completed_steps: Vec<String>,
    /// Page URL at capture time, if the page was reachable
    pub url: Option<String>,
    /// Failure snapshot, if one was written
    pub snapshot: Option<PathBuf>,
    /// When the failure was recorded
    pub captured_at: DateTime<Utc>,
}

impl FailureRecord {
    /// Record for `error` raised while in `state`
    #[must_use]
    pub fn new(run_id: Uuid, scenario: &str, state: JourneyState, error: &HarnessError) -> Self {
        Self {
            run_id,
            scenario: scenario.to_string(),
            state,
            kind: error.kind(),
            message: error.to_string(),
            step_index: None,
            step: None,
            completed_steps: Vec::new(),
            url: None,
            snapshot: None,
            captured_at: Utc::now(),
        }
    }
}

/// Saves diagnostics for a failed journey
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureArtifactCapturer;

impl FailureArtifactCapturer {
    /// Capture a full-page snapshot and write the failure record.
    ///
    /// The snapshot is only attempted while the page is reachable. Returns
    /// the snapshot path when one was written.
    pub async fn capture<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        paths: &ArtifactPaths,
        record: &mut FailureRecord,
    ) -> Option<PathBuf> {
        let snapshot =
            match tokio::time::timeout(CAPTURE_TIMEOUT, Self::snapshot(driver, paths, record))
                .await
            {
                Ok(snapshot) => snapshot,
                Err(_) => {
                    warn!(
                        scenario = %record.scenario,
                        timeout = ?CAPTURE_TIMEOUT,
                        "failure snapshot timed out"
                    );
                    None
                }
            };
        record.snapshot.clone_from(&snapshot);

        let path = paths.failure_record();
        if let Err(e) = Self::write_record(&path, record).await {
            warn!(path = %path.display(), error = %e, "could not write failure record");
        }
        snapshot
    }

    async fn snapshot<D: PageDriver + ?Sized>(
        driver: &D,
        paths: &ArtifactPaths,
        record: &mut FailureRecord,
    ) -> Option<PathBuf> {
        if driver.is_closed().await {
            warn!(scenario = %record.scenario, "page closed, skipping failure snapshot");
            return None;
        }
        record.url = driver.current_url().await.ok();

        let path = paths.failure_snapshot();
        let written = match driver.screenshot(true).await {
            Ok(data) => write_png(&path, &data).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => {
                info!(path = %path.display(), "failure screenshot saved");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failure screenshot not captured");
                None
            }
        }
    }

    async fn write_record(path: &Path, record: &FailureRecord) -> HarnessResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use tempfile::TempDir;

    fn record(scenario: &str) -> FailureRecord {
        let err = HarnessError::Timeout {
            waited_for: "username field to be visible".into(),
            ms: 20_000,
        };
        FailureRecord::new(Uuid::new_v4(), scenario, JourneyState::LoggingIn, &err)
    }

    mod path_tests {
        use super::*;

        #[test]
        fn test_slugify() {
            assert_eq!(slugify("OrangeHRM Login Only Test"), "orangehrm_login_only_test");
            assert_eq!(slugify("pim_add_employee"), "pim_add_employee");
            assert_eq!(slugify("  --  "), "journey");
        }

        #[test]
        fn test_paths_are_distinct_and_deterministic() {
            let paths = ArtifactPaths::new("shots", "PIM Add Employee");
            assert_eq!(paths.success_snapshot(), Path::new("shots/pim_add_employee_success.png"));
            assert_eq!(paths.failure_snapshot(), Path::new("shots/pim_add_employee_failed.png"));
            assert_eq!(paths.failure_record(), Path::new("shots/pim_add_employee_failed.json"));
            assert_eq!(paths, ArtifactPaths::new("shots", "PIM Add Employee"));
        }

        #[tokio::test]
        async fn test_clear_stale_tolerates_missing_files() {
            let dir = TempDir::new().unwrap();
            let paths = ArtifactPaths::new(dir.path(), "login");
            write_png(&paths.success_snapshot(), b"old").await.unwrap();
            paths.clear_stale().await.unwrap();
            assert!(!paths.success_snapshot().exists());
            paths.clear_stale().await.unwrap();
        }
    }

    mod capture_tests {
        use super::*;

        #[tokio::test]
        async fn test_capture_writes_snapshot_and_record() {
            let dir = TempDir::new().unwrap();
            let paths = ArtifactPaths::new(dir.path().join("nested"), "login");
            let mut driver = MockDriver::new();
            driver.navigate("https://hr.example/").await.unwrap();

            let mut rec = record("login");
            let snapshot = FailureArtifactCapturer.capture(&driver, &paths, &mut rec).await;

            assert_eq!(snapshot.as_deref(), Some(paths.failure_snapshot().as_path()));
            assert!(paths.failure_snapshot().exists());
            let saved: FailureRecord =
                serde_json::from_slice(&std::fs::read(paths.failure_record()).unwrap()).unwrap();
            assert_eq!(saved.kind, ErrorKind::Timeout);
            assert_eq!(saved.state, JourneyState::LoggingIn);
            assert_eq!(saved.url.as_deref(), Some("https://hr.example/"));
            assert_eq!(saved.snapshot, snapshot);
        }

        #[tokio::test]
        async fn test_closed_page_skips_snapshot_without_error() {
            let dir = TempDir::new().unwrap();
            let paths = ArtifactPaths::new(dir.path(), "login");
            let mut driver = MockDriver::new();
            driver.close();

            let mut rec = record("login");
            let snapshot = FailureArtifactCapturer.capture(&driver, &paths, &mut rec).await;

            assert!(snapshot.is_none());
            assert!(!paths.failure_snapshot().exists());
            assert!(paths.failure_record().exists());
        }

        #[tokio::test]
        async fn test_screenshot_failure_is_swallowed() {
            let dir = TempDir::new().unwrap();
            let paths = ArtifactPaths::new(dir.path(), "admin");
            let driver = MockDriver::new().failing_screenshots("GPU process gone");

            let mut rec = record("admin");
            let snapshot = FailureArtifactCapturer.capture(&driver, &paths, &mut rec).await;

            assert!(snapshot.is_none());
            assert!(rec.snapshot.is_none());
            assert_eq!(rec.kind, ErrorKind::Timeout);
        }
    }
}
