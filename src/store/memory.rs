use std::collections::BTreeMap;

use crate::model::snapshot::AnalysisSnapshot;
use crate::store::{
    SnapshotId, SnapshotStore, SnapshotSummary, StoreError, StoredRecord, matches_subject,
};

/// Volatile store, used by tests and single-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<SnapshotId, StoredRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw record under its own id, replacing any previous one.
    pub fn put_record(&mut self, record: StoredRecord) {
        self.records.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_id(&self) -> SnapshotId {
        let last = self.records.keys().next_back().map(|id| id.0).unwrap_or(0);
        SnapshotId(last + 1)
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &AnalysisSnapshot) -> Result<SnapshotId, StoreError> {
        let id = self.next_id();
        self.put_record(StoredRecord::encode(id, snapshot)?);
        Ok(id)
    }

    fn load(&self, id: SnapshotId) -> Result<AnalysisSnapshot, StoreError> {
        self.records
            .get(&id)
            .map(|r| r.decode())
            .ok_or(StoreError::NotFound(id))
    }

    fn list(&self, subject: Option<&str>) -> Result<Vec<SnapshotSummary>, StoreError> {
        Ok(self
            .records
            .values()
            .filter(|r| matches_subject(r, subject))
            .map(|r| r.summary())
            .collect())
    }

    fn supersede_selections(
        &mut self,
        id: SnapshotId,
        selections: &[String],
    ) -> Result<(), StoreError> {
        let record = self.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        record.set_selections(selections)
    }
}
