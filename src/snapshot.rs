//! Visual checkpoints.
//!
//! A snapshot never decides whether a scenario passes: capture errors are
//! logged and dropped by [`capture_snapshot`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::driver::Driver;

#[async_trait]
pub trait Snapshotter: Send + Sync {
    async fn capture(&self, driver: &dyn Driver, label: &str) -> Result<()>;
}

/// Take a labelled snapshot, logging instead of failing. Returns whether it was stored.
///
/// A capture that has not finished within `limit` is abandoned and counts as failed.
pub async fn capture_snapshot(
    snapshotter: &dyn Snapshotter,
    driver: &dyn Driver,
    label: &str,
    limit: Duration,
) -> bool {
    match tokio::time::timeout(limit, snapshotter.capture(driver, label)).await {
        Ok(Ok(())) => {
            tracing::debug!("Snapshot '{}' captured", label);
            true
        }
        Ok(Err(e)) => {
            tracing::warn!("Snapshot '{}' failed: {:#}", label, e);
            false
        }
        Err(_) => {
            tracing::warn!("Snapshot '{}' abandoned after {}ms", label, limit.as_millis());
            false
        }
    }
}

/// File-name friendly form of a label: `Info sheet - WWT Tab` → `info-sheet-wwt-tab`.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("snapshot");
    }
    slug
}

/// Accepts every capture and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSnapshotter;

#[async_trait]
impl Snapshotter for DisabledSnapshotter {
    async fn capture(&self, _driver: &dyn Driver, label: &str) -> Result<()> {
        tracing::debug!("Snapshots disabled, skipping '{}'", label);
        Ok(())
    }
}

/// One entry of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub label: String,
    pub file: String,
    pub bytes: usize,
}

/// Writes numbered PNG files plus a `manifest.json` into one directory.
pub struct DirectorySnapshotter {
    dir: PathBuf,
    records: tokio::sync::Mutex<Vec<SnapshotRecord>>,
}

impl DirectorySnapshotter {
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;
        Ok(Self {
            dir,
            records: tokio::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn records(&self) -> Vec<SnapshotRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl Snapshotter for DirectorySnapshotter {
    async fn capture(&self, driver: &dyn Driver, label: &str) -> Result<()> {
        let png = driver.screenshot().await.context("Failed to capture screenshot")?;

        let mut records = self.records.lock().await;
        let file = format!("{:03}-{}.png", records.len() + 1, slugify(label));
        let path = self.dir.join(&file);
        tokio::fs::write(&path, &png)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        records.push(SnapshotRecord {
            label: label.to_string(),
            file,
            bytes: png.len(),
        });
        let manifest = serde_json::to_vec_pretty(&*records)?;
        tokio::fs::write(self.dir.join("manifest.json"), manifest)
            .await
            .context("Failed to write snapshot manifest")?;

        tracing::info!("Saved snapshot '{}' to {}", label, path.display());
        Ok(())
    }
}

/// Keeps labels in memory; used to check checkpoint order.
#[derive(Debug, Default)]
pub struct RecordingSnapshotter {
    labels: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSnapshotter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the label, then reports a capture error.
    pub fn failing() -> Self {
        Self {
            labels: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Snapshotter for RecordingSnapshotter {
    async fn capture(&self, _driver: &dyn Driver, label: &str) -> Result<()> {
        self.labels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(label.to_string());
        if self.fail {
            anyhow::bail!("snapshot service unavailable");
        }
        Ok(())
    }
}
