use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::panel::{PanelRow, PanelTable};
use crate::model::rules::AnalysisMode;
use crate::model::selection::SelectionSet;
use crate::model::status::StatusMap;

/// Unit of persistence for one completed grading pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub subject_key: String,
    pub lot_number: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_version: Option<String>,
    #[serde(default)]
    pub mode: AnalysisMode,
    pub panel: Vec<PanelRow>,
    /// Antigen columns in import order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panel_columns: Vec<String>,
    pub status_map: StatusMap,
    pub exclusion_reasons: BTreeMap<String, String>,
    pub system_excluded: Vec<String>,
    pub user_selections: Vec<String>,
}

impl AnalysisSnapshot {
    /// Selection as it was stored. The system side is the status map minus the
    /// system-excluded antigens, so it reflects the catalog of the original run.
    pub fn selection(&self) -> SelectionSet {
        let excluded: BTreeSet<&str> = self.system_excluded.iter().map(|s| s.as_str()).collect();
        let system_selected = self
            .status_map
            .keys()
            .filter(|a| !excluded.contains(a.as_str()))
            .cloned()
            .collect();
        let user_selected = self.user_selections.iter().cloned().collect();
        SelectionSet {
            system_selected,
            user_selected,
        }
    }

    /// Panel in its stored column order. Snapshots without a column list
    /// fall back to the order of the row maps.
    pub fn panel_table(&self) -> PanelTable {
        PanelTable::from_rows(self.panel.clone()).with_column_order(&self.panel_columns)
    }
}
