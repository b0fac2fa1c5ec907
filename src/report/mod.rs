use chrono::{DateTime, Utc};

use crate::model::rules::AnalysisMode;
use crate::model::status::AntigenStatus;

pub mod json;
pub mod text;

/// One line of the lab-technical antigen overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntigenLine {
    pub antigen: String,
    /// `+` count among reactive rows.
    pub reactions: usize,
    pub status: AntigenStatus,
    pub user_selected: bool,
    pub exclusion_reason: Option<String>,
    /// Reviewer departs from the system default for this antigen.
    pub differs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything the text and JSON renderers need, already in display order.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub tool_name: String,
    pub tool_version: String,
    pub subject_key: Option<String>,
    pub lot_number: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub mode: AnalysisMode,
    pub rule_version: Option<String>,

    pub rows_tested: usize,
    pub system_selected: usize,
    pub user_selected: Vec<String>,
    pub differences: Vec<String>,

    pub confirmed_3x: Vec<String>,
    pub confirmed_2x: Vec<String>,

    pub antigens: Vec<AntigenLine>,
    pub excluded: Vec<(String, String)>,
    /// Reactive rows restricted to the user-selected antigens.
    pub reactive_table: ReactionTable,
}

/// `Anti-K, Anti-E` for a list of antigen symbols.
pub fn anti_list(antigens: &[String]) -> String {
    antigens
        .iter()
        .map(|a| format!("Anti-{a}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
