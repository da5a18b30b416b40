//! Chromium driver over the Chrome DevTools Protocol.
//!
//! Element interactions run as page-side JavaScript built from
//! [`Locator::query_js`], so every strategy (attribute, role, class, scoped)
//! resolves the same way in probes, fills and clicks.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::driver::{ElementState, PageDriver, Viewport};
use crate::journey::{JourneyConfig, JourneyRunner};
use crate::locator::Locator;
use crate::report::ScenarioResult;
use crate::result::{HarnessError, HarnessResult};

/// One Chromium process with a single page
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    closed: AtomicBool,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched or the page not opened
    pub async fn launch(config: &BrowserConfig) -> HarnessResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport.width, config.viewport.height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(|message| HarnessError::BrowserLaunch { message })?;

        let (browser, mut events) = Browser::launch(cdp_config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(launch_error)?;
        info!(headless = config.headless, viewport = %config.viewport, "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            closed: AtomicBool::new(false),
        })
    }

    /// Close the browser and stop the CDP handler
    pub async fn close(self) -> HarnessResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(driver_error);
        if let Err(e) = browser.wait().await {
            debug!(error = %e, "chromium exit status unavailable");
        }
        self.handler.abort();
        closed.map(|_| ())
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> HarnessResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(driver_error)?
            .into_value()
            .map_err(driver_error)
    }

    async fn act(&self, locator: &Locator, action: &str, script: String) -> HarnessResult<()> {
        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(HarnessError::driver(format!(
                "cannot {action} {locator}: element not found"
            )))
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| HarnessError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> HarnessResult<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        );
        self.page.execute(params).await.map_err(driver_error)?;
        Ok(())
    }

    async fn probe(&self, locator: &Locator) -> HarnessResult<ElementState> {
        match self.eval::<ElementState>(probe_script(locator)).await {
            Ok(state) => Ok(state),
            // The document is being replaced; the element is not there yet.
            Err(HarnessError::Driver { message }) if is_context_loss(&message) => {
                Ok(ElementState::Detached)
            }
            Err(e) => Err(e),
        }
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.act(locator, "fill", fill_script(locator, value)).await
    }

    async fn click(&mut self, locator: &Locator) -> HarnessResult<()> {
        self.act(locator, "click", click_script(locator)).await
    }

    async fn current_url(&self) -> HarnessResult<String> {
        let url = self.page.url().await.map_err(driver_error)?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn screenshot(&self, full_page: bool) -> HarnessResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        self.page.screenshot(params).await.map_err(driver_error)
    }

    async fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.page.url().await.is_err()
    }
}

/// Launch Chromium, run `journey`, and close the browser
///
/// # Errors
///
/// Returns error only if the browser cannot be launched; journey failures are
/// reported inside the [`ScenarioResult`].
pub async fn run_journey(
    journey: &JourneyConfig,
    browser: &BrowserConfig,
) -> HarnessResult<ScenarioResult> {
    let mut driver = ChromiumDriver::launch(browser).await?;
    let result = JourneyRunner::new().run(&mut driver, journey).await;
    if let Err(e) = driver.close().await {
        warn!(error = %e, "browser did not close cleanly");
    }
    Ok(result)
}

fn launch_error(e: impl std::fmt::Display) -> HarnessError {
    HarnessError::BrowserLaunch {
        message: e.to_string(),
    }
}

fn driver_error(e: impl std::fmt::Display) -> HarnessError {
    HarnessError::driver(e.to_string())
}

fn is_context_loss(message: &str) -> bool {
    message.contains("Execution context was destroyed")
        || message.contains("Cannot find context with specified id")
}

fn probe_script(locator: &Locator) -> String {
    format!(
        r#"(() => {{
  const el = {};
  if (!el || !el.isConnected) return "detached";
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  if (style.visibility === "hidden" || style.display === "none" || rect.width === 0 || rect.height === 0) return "hidden";
  return "visible";
}})()"#,
        locator.query_js()
    )
}

fn fill_script(locator: &Locator, value: &str) -> String {
    let value = serde_json::Value::String(value.to_string());
    format!(
        r"(() => {{
  const el = {};
  if (!el) return false;
  el.focus();
  const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
  Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {value});
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()",
        locator.query_js()
    )
}

fn click_script(locator: &Locator) -> String {
    format!(
        r"(() => {{
  const el = {};
  if (!el) return false;
  el.scrollIntoView({{ block: 'center' }});
  el.click();
  return true;
}})()",
        locator.query_js()
    )
}
