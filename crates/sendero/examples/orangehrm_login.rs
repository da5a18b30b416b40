//! Example: OrangeHRM Login
//!
//! Demonstrates: running a built-in journey against the public demo in a
//! real Chromium.
//!
//! Run with: `cargo run --example orangehrm_login --features browser`

use sendero::prelude::*;
use sendero::{logging, scenarios};

#[tokio::main]
async fn main() -> HarnessResult<()> {
    logging::init_tracing("info", logging::LogFormat::Text, true)?;

    let credentials = Credentials::resolve(Some(&scenarios::demo_credentials()))?;
    let journey = scenarios::login(scenarios::DEMO_URL)
        .with_credentials(credentials)
        .with_artifacts_dir("target/sendero");

    let result = run_journey(&journey, &BrowserConfig::default()).await?;

    println!("{} {}", result.scenario, result.outcome);
    for step in &result.steps {
        println!("  - {step}");
    }
    if let Some(path) = &result.artifact {
        println!("snapshot: {}", path.display());
    }
    result.into_result().map(|_| ())
}
