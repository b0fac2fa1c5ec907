use std::collections::{BTreeMap, BTreeSet};

use crate::model::panel::PanelTable;
use crate::model::rules::AnalysisMode;
use crate::model::status::StatusMap;
use crate::panels::AntigenCatalog;

pub mod stage1_normalize;
pub mod stage2_exclusions;
pub mod stage3_classify;
pub mod stage4_select;
pub mod stage5_report;

use stage2_exclusions::{ExclusionResult, compute_exclusions};
use stage3_classify::{classify, classify_manual};

/// Result of one grading pass over a normalized panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub mode: AnalysisMode,
    pub exclusions: ExclusionResult,
    pub status: StatusMap,
}

impl AnalysisOutcome {
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.exclusions.excluded
    }

    pub fn reasons(&self) -> BTreeMap<String, String> {
        self.exclusions.audit.reasons()
    }
}

/// Runs the exclusion engine and the classifier for the chosen mode. Manual
/// mode bypasses the engine entirely.
pub fn analyze(panel: &PanelTable, catalog: &AntigenCatalog, mode: AnalysisMode) -> AnalysisOutcome {
    crate::info!(
        "grading {} rows against {} catalog antigens ({} mode)",
        panel.len(),
        catalog.len(),
        mode.label()
    );
    match mode {
        AnalysisMode::Automatic => {
            let exclusions = compute_exclusions(panel, catalog);
            let status = classify(panel, catalog, &exclusions.excluded);
            AnalysisOutcome {
                mode,
                exclusions,
                status,
            }
        }
        AnalysisMode::Manual => AnalysisOutcome {
            mode,
            exclusions: ExclusionResult::default(),
            status: classify_manual(catalog),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
