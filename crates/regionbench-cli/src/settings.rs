//! Run settings
//!
//! Read from a TOML file. Lookup order: the explicit `--config` path, then
//! `REGIONBENCH_CONFIG`, then `regionbench.toml` in the working directory.
//! Every key is optional; absent keys take the defaults below.

use anyhow::Context;
use regionbench_core::{Address, ConfigError, RunConfiguration, DEFAULT_OUT_DIR};
use regionbench_remote::ServiceAddresses;
use regionbench_scenarios::DEFAULT_FIXTURES;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the settings file
pub const CONFIG_ENV: &str = "REGIONBENCH_CONFIG";
/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "regionbench.toml";
/// Default JSON-RPC endpoint of the local ledger node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9545/";

/// Addresses of the deployed services
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Contracts {
    /// Region index under benchmark
    pub regions: Address,
    /// Device registry
    pub devices: Address,
    /// Reputation manager
    pub reputation: Address,
}

impl From<Contracts> for ServiceAddresses {
    fn from(c: Contracts) -> Self {
        Self {
            regions: c.regions,
            devices: c.devices,
            reputation: c.reputation,
        }
    }
}

/// Everything a run needs besides fixtures and the remote system itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Variant identifier, e.g. `GeohashCellsRegions`
    pub variant: String,
    /// Precision tier, 0..=2
    pub precision_index: u8,
    /// `cells` or `tree`
    pub insertion_mode: String,
    /// Ledger node endpoint
    pub rpc_url: String,
    /// Output directory
    pub out_dir: PathBuf,
    /// Fixture document
    pub fixtures: PathBuf,
    /// HTTP request timeout; none when absent
    pub request_timeout_secs: Option<u64>,
    /// Deployed service addresses
    pub contracts: Contracts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: "GeohashCellsRegions".to_string(),
            precision_index: 0,
            insertion_mode: "cells".to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            fixtures: PathBuf::from(DEFAULT_FIXTURES),
            request_timeout_secs: None,
            contracts: Contracts::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    /// Read settings from a file that must exist
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Locate and read the settings file
    ///
    /// An explicit path or one named by [`CONFIG_ENV`] must exist. A missing
    /// [`DEFAULT_CONFIG_FILE`] yields the defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve the benchmark factors into a run configuration
    pub fn resolve(&self) -> Result<RunConfiguration, ConfigError> {
        RunConfiguration::resolve(&self.variant, self.precision_index, &self.insertion_mode)
    }

    /// HTTP request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regionbench_core::{Family, InsertionMode, Variant};

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());

        let config = settings.resolve().unwrap();
        assert_eq!(config.variant(), Variant::GeohashCellsRegions);
        assert_eq!(config.precision(), 6);
        assert_eq!(config.insertion_mode(), InsertionMode::Cells);
        assert_eq!(settings.request_timeout(), None);
    }

    #[test]
    fn full_file() {
        let settings = Settings::from_toml(
            r#"
            variant = "S2TreeRegions"
            precision_index = 2
            insertion_mode = "tree"
            rpc_url = "http://ledger:8545/"
            out_dir = "results"
            request_timeout_secs = 30

            [contracts]
            regions = "0x01"
            devices = "0x02"
            reputation = "0x03"
            "#,
        )
        .unwrap();

        let config = settings.resolve().unwrap();
        assert_eq!(config.family(), Family::S2Regions);
        assert_eq!(config.precision(), 19);
        assert!(!config.supports_direct_cell_lookup());
        assert_eq!(settings.out_dir, PathBuf::from("results"));
        assert_eq!(settings.fixtures, PathBuf::from(DEFAULT_FIXTURES));
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(30)));

        let addresses = ServiceAddresses::from(settings.contracts);
        assert_eq!(addresses.devices, Address::new("0x02"));
    }

    #[test]
    fn invalid_factors_surface_at_resolve() {
        let settings = Settings::from_toml("variant = \"H3Regions\"").unwrap();
        assert_eq!(
            settings.resolve().unwrap_err(),
            ConfigError::UnknownVariant("H3Regions".into())
        );

        let settings = Settings::from_toml("precision_index = 3").unwrap();
        assert_eq!(settings.resolve().unwrap_err(), ConfigError::PrecisionOutOfRange(3));
    }

    #[test]
    fn mistyped_value_is_rejected() {
        assert!(Settings::from_toml("precision_index = \"high\"").is_err());
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = Settings::load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));

        let present = dir.path().join("bench.toml");
        std::fs::write(&present, "insertion_mode = \"tree\"").unwrap();
        let settings = Settings::load(Some(&present)).unwrap();
        assert_eq!(settings.insertion_mode, "tree");
    }
}
