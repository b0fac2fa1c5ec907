use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// System-derived inclusion set next to the reviewer's own selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSet {
    pub system_selected: BTreeSet<String>,
    pub user_selected: BTreeSet<String>,
}

impl SelectionSet {
    /// Antigens where the reviewer departs from the system default. Always
    /// computed from the current sets.
    pub fn diff(&self) -> BTreeSet<String> {
        self.system_selected
            .symmetric_difference(&self.user_selected)
            .cloned()
            .collect()
    }

    pub fn is_user_selected(&self, antigen: &str) -> bool {
        self.user_selected.contains(antigen)
    }

    pub fn has_user_selection(&self) -> bool {
        !self.user_selected.is_empty()
    }
}
