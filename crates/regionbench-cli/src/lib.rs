//! regionbench command-line runner
//!
//! Wires settings, fixtures and the JSON-RPC deployment into one
//! [`ScenarioRunner`] run of the [`BenchmarkSuite`].

#![warn(unreachable_pub)]

pub mod logging;
pub mod settings;

pub use settings::Settings;

use anyhow::Context;
use regionbench_core::{InputDataProvider, RunReport, ScenarioRunner};
use regionbench_remote::connect;
use regionbench_scenarios::{BenchmarkSuite, JsonInputProvider};

/// Execute one benchmark run described by `settings`
pub async fn run(settings: &Settings) -> anyhow::Result<RunReport> {
    let config = settings.resolve().context("invalid run configuration")?;
    tracing::info!(%config, "configuration resolved");

    let input = JsonInputProvider::new(&settings.fixtures)
        .load()
        .await
        .context("failed to load fixtures")?;
    let deployment = connect(
        &settings.rpc_url,
        settings.request_timeout(),
        settings.contracts.clone().into(),
    )
    .with_context(|| format!("failed to set up client for {}", settings.rpc_url))?;

    let runner = ScenarioRunner::new(config, &settings.out_dir, deployment, input);
    let report = runner.run(&BenchmarkSuite::new()).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_configuration_stops_before_fixtures() {
        let settings = Settings {
            insertion_mode: "grid".into(),
            fixtures: "/nonexistent/input.json".into(),
            ..Settings::default()
        };
        let err = run(&settings).await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("invalid run configuration"));
        assert!(chain.contains("grid"));
    }

    #[tokio::test]
    async fn missing_fixtures_are_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            fixtures: dir.path().join("input.json"),
            out_dir: dir.path().join("out"),
            ..Settings::default()
        };
        let err = run(&settings).await.unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to load fixtures"));
        assert!(chain.contains("input.json"));
        assert!(!dir.path().join("out").exists());
    }
}
