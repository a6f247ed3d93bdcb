use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the snapshot instant for Recency is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Latest purchase timestamp across all orders plus `days`.
    LastOrderPlusDays { days: i64 },
    /// An explicit "as of" instant. Must not precede the latest order.
    Fixed { at: Timestamp },
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::LastOrderPlusDays { days: 1 }
    }
}

/// File names of the four tables inside a dataset directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetFiles {
    pub orders:      String,
    pub payments:    String,
    pub reviews:     String,
    pub geolocation: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            orders:      "orders_dataset.csv".into(),
            payments:    "order_payments_dataset.csv".into(),
            reviews:     "order_reviews_dataset.csv".into(),
            geolocation: "geolocation_dataset.csv".into(),
        }
    }
}

impl DatasetFiles {
    pub fn orders_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.orders)
    }

    pub fn payments_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.payments)
    }

    pub fn reviews_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.reviews)
    }

    pub fn geolocation_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.geolocation)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RfmConfig {
    pub snapshot:   SnapshotPolicy,
    pub files:      DatasetFiles,
    pub top_cities: usize,
}

impl Default for RfmConfig {
    fn default() -> Self {
        Self {
            snapshot:   SnapshotPolicy::default(),
            files:      DatasetFiles::default(),
            top_cities: 10,
        }
    }
}

impl RfmConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
