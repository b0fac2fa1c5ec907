use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::panel::PanelRow;
use crate::model::rules::AnalysisMode;
use crate::model::snapshot::AnalysisSnapshot;
use crate::model::status::StatusMap;

pub mod dir;
pub mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

/// Opaque snapshot key handed out by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub u64);

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SnapshotId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(SnapshotId)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot {0} not found")]
    NotFound(SnapshotId),
    #[error("failed to encode snapshot: {0}")]
    Encode(serde_json::Error),
    #[error("snapshot {id} is unreadable: {source}")]
    Decode {
        id: SnapshotId,
        source: serde_json::Error,
    },
}

/// Listing entry; the blobs are not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub id: SnapshotId,
    pub subject_key: String,
    pub lot_number: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub rule_version: Option<String>,
}

/// Persistence boundary for analysis snapshots. Last write wins per id.
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &AnalysisSnapshot) -> Result<SnapshotId, StoreError>;

    /// Returns the snapshot as stored. Corrupt blobs decode to empty values.
    fn load(&self, id: SnapshotId) -> Result<AnalysisSnapshot, StoreError>;

    /// Snapshots in id order, optionally restricted to one subject key.
    fn list(&self, subject: Option<&str>) -> Result<Vec<SnapshotSummary>, StoreError>;

    /// Replaces the stored user selection. Nothing else in a snapshot is
    /// mutable.
    fn supersede_selections(
        &mut self,
        id: SnapshotId,
        selections: &[String],
    ) -> Result<(), StoreError>;
}

/// On-disk shape of a snapshot: scalar columns plus three JSON blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: SnapshotId,
    pub subject_key: String,
    pub lot_number: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_version: Option<String>,
    #[serde(default)]
    pub mode: AnalysisMode,
    pub panel_json: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panel_columns: Vec<String>,
    pub status_json: String,
    pub user_sel_json: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBlob {
    #[serde(default)]
    status_map: StatusMap,
    #[serde(default)]
    exclusion_reasons: BTreeMap<String, String>,
    #[serde(default)]
    system_excluded: Vec<String>,
}

impl StoredRecord {
    pub fn encode(id: SnapshotId, snapshot: &AnalysisSnapshot) -> Result<Self, StoreError> {
        let status = StatusBlob {
            status_map: snapshot.status_map.clone(),
            exclusion_reasons: snapshot.exclusion_reasons.clone(),
            system_excluded: snapshot.system_excluded.clone(),
        };
        Ok(Self {
            id,
            subject_key: snapshot.subject_key.clone(),
            lot_number: snapshot.lot_number.clone(),
            timestamp: snapshot.timestamp,
            rule_version: snapshot.rule_version.clone(),
            mode: snapshot.mode,
            panel_json: serde_json::to_string(&snapshot.panel).map_err(StoreError::Encode)?,
            panel_columns: snapshot.panel_columns.clone(),
            status_json: serde_json::to_string(&status).map_err(StoreError::Encode)?,
            user_sel_json: serde_json::to_string(&snapshot.user_selections)
                .map_err(StoreError::Encode)?,
        })
    }

    /// Lenient decode: a blob that fails to parse becomes its empty value.
    pub fn decode(&self) -> AnalysisSnapshot {
        let panel: Vec<PanelRow> = decode_blob(self.id, "panel", &self.panel_json);
        let status: StatusBlob = decode_blob(self.id, "status", &self.status_json);
        let user_selections: Vec<String> = decode_blob(self.id, "selection", &self.user_sel_json);
        AnalysisSnapshot {
            subject_key: self.subject_key.clone(),
            lot_number: self.lot_number.clone(),
            timestamp: self.timestamp,
            rule_version: self.rule_version.clone(),
            mode: self.mode,
            panel,
            panel_columns: self.panel_columns.clone(),
            status_map: status.status_map,
            exclusion_reasons: status.exclusion_reasons,
            system_excluded: status.system_excluded,
            user_selections,
        }
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.id,
            subject_key: self.subject_key.clone(),
            lot_number: self.lot_number.clone(),
            timestamp: self.timestamp,
            rule_version: self.rule_version.clone(),
        }
    }

    pub fn set_selections(&mut self, selections: &[String]) -> Result<(), StoreError> {
        self.user_sel_json = serde_json::to_string(selections).map_err(StoreError::Encode)?;
        Ok(())
    }
}

fn decode_blob<T>(id: SnapshotId, field: &str, text: &str) -> T
where
    T: Default + serde::de::DeserializeOwned,
{
    match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            crate::warn!("snapshot {}: corrupt {} blob ({}); using empty value", id, field, e);
            T::default()
        }
    }
}

fn matches_subject(record: &StoredRecord, subject: Option<&str>) -> bool {
    subject.is_none_or(|s| record.subject_key == s)
}

#[cfg(test)]
#[path = "../../tests/src_inline/store/mod.rs"]
mod tests;
