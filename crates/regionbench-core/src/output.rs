//! Output file paths
//!
//! One CSV file per scenario, named after the resolved configuration so that
//! distinct runs never collide and identical runs overwrite each other.

use crate::config::RunConfiguration;
use crate::error::RunError;
use crate::types::ScenarioKind;
use std::path::{Path, PathBuf};

/// Default destination directory
pub const DEFAULT_OUT_DIR: &str = "./out/";

/// Per-scenario output paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
    files: [PathBuf; 5],
}

impl OutputPaths {
    /// Derive the five paths for `config` under `dir`
    #[must_use]
    pub fn build(dir: impl Into<PathBuf>, config: &RunConfiguration) -> Self {
        let dir = dir.into();
        let files = ScenarioKind::ALL.map(|kind| dir.join(file_name(config, kind)));
        Self { dir, files }
    }

    /// Destination directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for one scenario
    #[inline]
    #[must_use]
    pub fn path(&self, kind: ScenarioKind) -> &Path {
        &self.files[kind.index()]
    }

    /// All paths in scenario order
    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &Path)> {
        ScenarioKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.path(kind)))
    }

    /// Create the destination directory if absent
    pub async fn ensure_dir(&self) -> Result<(), RunError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| RunError::Io {
                path: self.dir.clone(),
                source,
            })
    }
}

/// File-name suffix for a scenario
fn suffix(config: &RunConfiguration, kind: ScenarioKind) -> &'static str {
    match kind {
        ScenarioKind::RegionRegistration => config.insertion_mode().as_str(),
        ScenarioKind::RegionInteraction => "interact",
        ScenarioKind::DeviceRegistration => "devices",
        ScenarioKind::DeviceMovement => "bulkdevices",
        ScenarioKind::Reputation => "reputations",
    }
}

fn file_name(config: &RunConfiguration, kind: ScenarioKind) -> String {
    format!(
        "experiment-{}-{}-{}.csv",
        config.variant().name().to_lowercase(),
        config.precision(),
        suffix(config, kind)
    )
}
