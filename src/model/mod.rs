pub mod audit;
pub mod panel;
pub mod rules;
pub mod selection;
pub mod snapshot;
pub mod status;

pub use audit::ExclusionAudit;
pub use panel::{LissGrade, PanelRow, PanelTable, Reaction};
pub use rules::{AnalysisMode, RULE_VERSION};
pub use selection::SelectionSet;
pub use snapshot::AnalysisSnapshot;
pub use status::{AntigenStatus, StatusMap};

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
