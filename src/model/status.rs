use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AntigenStatus {
    Excluded,
    Confirmed3x,
    Confirmed2x,
    NotExcluded,
    NoReaction,
}

impl AntigenStatus {
    /// Tier for a non-excluded antigen from its positive count among reactive
    /// rows.
    pub fn from_positive_count(count: usize) -> Self {
        match count {
            0 => AntigenStatus::NoReaction,
            1 => AntigenStatus::NotExcluded,
            2 => AntigenStatus::Confirmed2x,
            _ => AntigenStatus::Confirmed3x,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AntigenStatus::Excluded => "Excluded",
            AntigenStatus::Confirmed3x => "Confirmed (3x +)",
            AntigenStatus::Confirmed2x => "Confirmed (2x +)",
            AntigenStatus::NotExcluded => "Not excluded",
            AntigenStatus::NoReaction => "No reaction",
        }
    }
}

impl std::fmt::Display for AntigenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub type StatusMap = BTreeMap<String, AntigenStatus>;
