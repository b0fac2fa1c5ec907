use std::fs;
use std::path::{Path, PathBuf};

use crate::model::snapshot::AnalysisSnapshot;
use crate::store::{
    SnapshotId, SnapshotStore, SnapshotSummary, StoreError, StoredRecord, matches_subject,
};

const PREFIX: &str = "analysis_";
const SUFFIX: &str = ".json";

/// One JSON file per snapshot, `analysis_<id>.json`, under a root directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: SnapshotId) -> PathBuf {
        self.root.join(format!("{PREFIX}{id}{SUFFIX}"))
    }

    fn ids(&self) -> Result<Vec<SnapshotId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let id = name
                .strip_prefix(PREFIX)
                .and_then(|rest| rest.strip_suffix(SUFFIX))
                .and_then(|n| n.parse::<SnapshotId>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_record(&self, id: SnapshotId) -> Result<StoredRecord, StoreError> {
        let path = self.record_path(id);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Decode { id, source })
    }

    /// Writes through a temp file and a rename so readers never see a partial
    /// record.
    pub fn write_record(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record).map_err(StoreError::Encode)?;
        let path = self.record_path(record.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl SnapshotStore for DirStore {
    fn save(&mut self, snapshot: &AnalysisSnapshot) -> Result<SnapshotId, StoreError> {
        let last = self.ids()?.last().map(|id| id.0).unwrap_or(0);
        let id = SnapshotId(last + 1);
        self.write_record(&StoredRecord::encode(id, snapshot)?)?;
        crate::info!("saved snapshot {} for subject '{}'", id, snapshot.subject_key);
        Ok(id)
    }

    fn load(&self, id: SnapshotId) -> Result<AnalysisSnapshot, StoreError> {
        Ok(self.read_record(id)?.decode())
    }

    fn list(&self, subject: Option<&str>) -> Result<Vec<SnapshotSummary>, StoreError> {
        let mut out = Vec::new();
        for id in self.ids()? {
            match self.read_record(id) {
                Ok(record) if matches_subject(&record, subject) => out.push(record.summary()),
                Ok(_) => {}
                Err(e) => crate::warn!("skipping snapshot {}: {}", id, e),
            }
        }
        Ok(out)
    }

    fn supersede_selections(
        &mut self,
        id: SnapshotId,
        selections: &[String],
    ) -> Result<(), StoreError> {
        let mut record = self.read_record(id)?;
        record.set_selections(selections)?;
        self.write_record(&record)?;
        crate::info!("superseded selections of snapshot {}", id);
        Ok(())
    }
}
