use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::models::Target;

/// On-disk form of one target. Field names are the stable schema; the file
/// is a JSON array of these records.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    #[serde(default)]
    description: String,
    ip: String,
    port: u16,
}

impl From<&Target> for PersistedRecord {
    fn from(target: &Target) -> Self {
        Self {
            description: target.label.clone(),
            ip: target.host.clone(),
            port: target.port,
        }
    }
}

/// Gateway to the registry's durable storage. Load tolerates a missing file
/// and malformed individual records; save rewrites the whole file.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing store is an empty registry. Records failing validation
    /// (empty ip, missing/non-integer/zero port) are skipped one by one;
    /// only an unreadable or structurally corrupt file is an error, and the
    /// caller treats that as recoverable.
    pub fn load(&self) -> Result<Vec<Target>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a JSON array", self.path.display()))?;

        let mut targets = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<PersistedRecord>(record) {
                Ok(rec) if !rec.ip.is_empty() && rec.port != 0 => {
                    targets.push(Target::new(rec.description, rec.ip, rec.port));
                }
                Ok(rec) => {
                    warn!("skipping saved entry with empty ip or zero port: {:?}", rec);
                }
                Err(e) => {
                    warn!("skipping malformed saved entry: {}", e);
                }
            }
        }
        Ok(targets)
    }

    /// Serializes the full snapshot and replaces the previous content via a
    /// sibling temp file and rename, so the store is never half-written.
    pub fn save(&self, targets: &[Target]) -> Result<()> {
        let records: Vec<PersistedRecord> = targets.iter().map(PersistedRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
