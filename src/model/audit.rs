use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Antigen → panel row indices that caused its exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionAudit {
    rows: BTreeMap<String, BTreeSet<u32>>,
}

impl ExclusionAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, antigen: &str, row_index: u32) {
        self.rows
            .entry(antigen.to_string())
            .or_default()
            .insert(row_index);
    }

    pub fn rows(&self, antigen: &str) -> Option<&BTreeSet<u32>> {
        self.rows.get(antigen)
    }

    pub fn antigens(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, antigen: &str) -> bool {
        self.rows.contains_key(antigen)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display summary, e.g. `rows: 3, 7, 12`.
    pub fn reason(&self, antigen: &str) -> Option<String> {
        self.rows.get(antigen).map(|rows| format_reason(rows))
    }

    pub fn reasons(&self) -> BTreeMap<String, String> {
        self.rows
            .iter()
            .map(|(antigen, rows)| (antigen.clone(), format_reason(rows)))
            .collect()
    }
}

fn format_reason(rows: &BTreeSet<u32>) -> String {
    let joined = rows
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("rows: {joined}")
}
