//! JSON fixture loading

use async_trait::async_trait;
use regionbench_core::{FixtureError, InputData, InputDataProvider};
use std::path::{Path, PathBuf};

/// Default fixture document location
pub const DEFAULT_FIXTURES: &str = "./fixtures/input-data.json";

/// Reads the whole fixture set from one JSON document
#[derive(Debug, Clone)]
pub struct JsonInputProvider {
    path: PathBuf,
}

impl JsonInputProvider {
    /// Provider for the document at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document location
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl InputDataProvider for JsonInputProvider {
    async fn load(&self) -> Result<InputData, FixtureError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FixtureError::Io {
                path: self.path.clone(),
                source,
            })?;
        let input: InputData = serde_json::from_str(&raw).map_err(|source| FixtureError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if let Some(label) = input.find_unsafe_label() {
            return Err(FixtureError::UnsafeLabel {
                path: self.path.clone(),
                label: label.to_string(),
            });
        }
        tracing::info!(
            path = %self.path.display(),
            families = input.families.len(),
            devices = input.devices.devices.len(),
            reputations = input.reputations.len(),
            "fixtures loaded"
        );
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonInputProvider::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }

    #[tokio::test]
    async fn invalid_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        tokio::fs::write(&path, r#"{"families": {"QuadRegions": {}}}"#)
            .await
            .unwrap();

        let err = JsonInputProvider::new(&path).load().await.unwrap_err();
        assert!(matches!(err, FixtureError::Parse { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn separator_in_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        tokio::fs::write(
            &path,
            r#"{"families": {"S2Regions": {"regions": [{"name": "harbor,east", "cells": [[], [], []]}]}}}"#,
        )
        .await
        .unwrap();

        let err = JsonInputProvider::new(&path).load().await.unwrap_err();
        assert!(matches!(err, FixtureError::UnsafeLabel { ref label, .. } if label == "harbor,east"));
    }
}
