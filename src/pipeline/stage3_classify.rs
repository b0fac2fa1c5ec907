use std::collections::BTreeSet;

use crate::model::panel::PanelTable;
use crate::model::status::{AntigenStatus, StatusMap};
use crate::panels::AntigenCatalog;

/// Number of reactive rows typed `+` for the antigen.
pub fn reaction_count(panel: &PanelTable, antigen: &str) -> usize {
    panel
        .reactive_rows()
        .filter(|r| r.is_positive(antigen))
        .count()
}

pub fn classify(
    panel: &PanelTable,
    catalog: &AntigenCatalog,
    excluded: &BTreeSet<String>,
) -> StatusMap {
    let mut out = StatusMap::new();
    for antigen in catalog.antigens() {
        let status = if excluded.contains(antigen) {
            AntigenStatus::Excluded
        } else {
            AntigenStatus::from_positive_count(reaction_count(panel, antigen))
        };
        out.insert(antigen.clone(), status);
    }
    out
}

/// Manual review: nothing is excluded and every antigen stays open.
pub fn classify_manual(catalog: &AntigenCatalog) -> StatusMap {
    catalog
        .antigens()
        .iter()
        .map(|a| (a.clone(), AntigenStatus::NotExcluded))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_classify.rs"]
mod tests;
