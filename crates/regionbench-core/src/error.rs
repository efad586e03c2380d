//! Error types for regionbench core
//!
//! Provides one error enum per layer:
//! - Run configuration resolution
//! - Remote ledger and service calls
//! - Metrics recording
//! - Scenario execution
//! - Whole-run orchestration

use crate::config::Family;
use crate::types::{ScenarioKind, TxHash};
use std::fmt;
use std::path::PathBuf;

/// Run configuration errors
///
/// Always raised before any remote interaction takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Variant identifier outside the supported enumeration
    #[error(
        "unknown variant: '{0}' (expected one of GeohashCellsRegions, GeohashTreeRegions, S2CellsRegions, S2TreeRegions)"
    )]
    UnknownVariant(String),

    /// Precision index is not a valid offset into the precision table
    #[error("precision index {0} out of range (expected 0, 1 or 2)")]
    PrecisionOutOfRange(u8),

    /// Insertion mode identifier not recognized
    #[error("unknown insertion mode: '{0}' (expected 'cells' or 'tree')")]
    UnknownInsertionMode(String),
}

/// Errors returned by remote collaborators (ledger client and service handles)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Request could not be delivered or the response could not be read
    #[error("transport error: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success HTTP status
    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    /// Remote side reported an error for the call
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// Requested entity (transaction, block) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Response payload did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Create not-found error
    #[inline]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create decode error
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Metrics recording errors
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// IO error while creating or appending to an output file
    #[error("io error writing {path}")]
    Io {
        /// Output file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Transaction or block lookup failed
    #[error("cost lookup failed")]
    Lookup(#[from] RemoteError),

    /// Transaction exists but is not part of a block yet
    #[error("transaction {0} is not included in a block")]
    Pending(TxHash),
}

impl RecorderError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised inside a scenario body
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A remote call made by the scenario failed
    #[error("remote call failed")]
    Remote(#[from] RemoteError),

    /// Recording a metric row failed
    #[error("recording failed")]
    Recorder(#[from] RecorderError),

    /// Fixture data is inconsistent with what the scenario needs
    #[error("invalid fixture data: {0}")]
    Fixture(String),
}

impl ScenarioError {
    /// Create fixture error
    #[inline]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }
}

/// Input data loading errors
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// IO error during fixture read
    #[error("io error reading {path}")]
    Io {
        /// Fixture document
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Fixture document could not be parsed
    #[error("invalid fixture document {path}")]
    Parse {
        /// Fixture document
        path: PathBuf,
        /// Parser error with line and column
        #[source]
        source: serde_json::Error,
    },

    /// A name or cell id contains a CSV separator or line break
    #[error("fixture label {label:?} in {path} contains ',' or a line break")]
    UnsafeLabel {
        /// Fixture document
        path: PathBuf,
        /// Offending value
        label: String,
    },
}

/// Errors that abort a benchmark run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Output directory could not be prepared
    #[error("io error preparing {path}")]
    Io {
        /// Output directory
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No fixture bundle for the configured family
    #[error("no fixture data for family {0}")]
    MissingFixtures(Family),

    /// Ledger accounts could not be enumerated
    #[error("failed to list ledger accounts")]
    Accounts(#[source] RemoteError),

    /// Ledger exposes fewer accounts than the run needs
    #[error("ledger account #{0} is not available")]
    MissingAccount(usize),

    /// Output file could not be created
    #[error("recorder setup failed")]
    Recorder(#[from] RecorderError),

    /// A scenario failed
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// Failure of a whole run
///
/// Carries the originating error unchanged plus the scenario that was
/// executing when it occurred (`None` when the run failed during setup).
/// `Display` names only the failing step; the error itself is the `source`.
#[derive(Debug)]
pub struct RunFailure {
    /// Scenario that failed, if any had started
    pub scenario: Option<ScenarioKind>,
    /// Originating error
    pub error: RunError,
}

impl RunFailure {
    /// Failure before the first scenario started
    #[inline]
    #[must_use]
    pub fn setup(error: impl Into<RunError>) -> Self {
        Self {
            scenario: None,
            error: error.into(),
        }
    }

    /// Failure inside a scenario
    #[inline]
    #[must_use]
    pub fn in_scenario(scenario: ScenarioKind, error: impl Into<RunError>) -> Self {
        Self {
            scenario: Some(scenario),
            error: error.into(),
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scenario {
            Some(kind) => write!(f, "scenario '{kind}' failed"),
            None => f.write_str("run setup failed"),
        }
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::UnknownVariant("QuadTreeRegions".to_string());
        assert!(err.to_string().contains("unknown variant: 'QuadTreeRegions'"));
        assert_eq!(
            ConfigError::PrecisionOutOfRange(3).to_string(),
            "precision index 3 out of range (expected 0, 1 or 2)"
        );
    }

    #[test]
    fn recorder_error_from_remote() {
        let err: RecorderError = RemoteError::not_found("transaction 0x01").into();
        assert!(matches!(err, RecorderError::Lookup(RemoteError::NotFound(_))));
    }

    #[test]
    fn scenario_error_is_transparent_in_run_error() {
        let err: RunError = ScenarioError::fixture("device index 9").into();
        assert_eq!(err.to_string(), "invalid fixture data: device index 9");
    }

    #[test]
    fn run_failure_display_names_scenario() {
        let failure = RunFailure::in_scenario(
            ScenarioKind::RegionInteraction,
            ScenarioError::fixture("boom"),
        );
        assert_eq!(failure.to_string(), "scenario 'region-interaction' failed");

        let setup = RunFailure::setup(RunError::MissingAccount(1));
        assert_eq!(setup.to_string(), "run setup failed");
        assert!(setup.scenario.is_none());
    }

    #[test]
    fn run_failure_exposes_source() {
        use std::error::Error as _;
        let failure = RunFailure::setup(RunError::MissingFixtures(Family::S2Regions));
        let source = failure.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("no fixture data for family S2Regions"));
    }

    #[test]
    fn error_chain_mentions_each_message_once() {
        use std::error::Error as _;
        let failure = RunFailure::in_scenario(
            ScenarioKind::DeviceMovement,
            ScenarioError::from(RecorderError::from(RemoteError::not_found("block 7"))),
        );

        let mut messages = vec![failure.to_string()];
        let mut source = failure.source();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }

        assert_eq!(
            messages,
            [
                "scenario 'device-movement' failed",
                "recording failed",
                "cost lookup failed",
                "not found: block 7",
            ]
        );
    }
}
