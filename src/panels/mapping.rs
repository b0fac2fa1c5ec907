use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical antigen spelling. Single-character symbols are case-significant
/// (`C` and `c` are different antigens) and kept verbatim; longer symbols keep
/// their first character and lowercase the rest, so `KpA`, `FyB` and `CW`
/// become `Kpa`, `Fyb` and `Cw`.
pub fn canonical_symbol(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut out = String::with_capacity(trimmed.len());
            out.push(first);
            for c in chars {
                out.extend(c.to_lowercase());
            }
            out
        }
    }
}

/// Role a non-antigen column plays in the canonical panel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    RowIndex,
    SubjectId,
    DonorLabel,
    Liss,
    Annotation,
    Ignore,
}

/// Header aliases seen across historical import layouts. Keys are matched
/// after trimming and ASCII-lowercasing.
const DEFAULT_ALIASES: &[(&str, ColumnRole)] = &[
    ("index", ColumnRole::RowIndex),
    ("row", ColumnRole::RowIndex),
    ("sp.nr.", ColumnRole::SubjectId),
    ("sp.nr", ColumnRole::SubjectId),
    ("spendernummer", ColumnRole::SubjectId),
    ("subject", ColumnRole::SubjectId),
    ("subject_id", ColumnRole::SubjectId),
    ("spender", ColumnRole::DonorLabel),
    ("donor", ColumnRole::DonorLabel),
    ("donor_label", ColumnRole::DonorLabel),
    ("liss", ColumnRole::Liss),
    ("spez. antigen", ColumnRole::Annotation),
    ("annotation", ColumnRole::Annotation),
    ("gen.", ColumnRole::Ignore),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    map: BTreeMap<String, ColumnRole>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        for (alias, role) in DEFAULT_ALIASES {
            map.insert(alias.to_string(), *role);
        }
        Self { map }
    }
}

impl ColumnAliases {
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn with(mut self, alias: &str, role: ColumnRole) -> Self {
        self.insert(alias, role);
        self
    }

    pub fn insert(&mut self, alias: &str, role: ColumnRole) {
        self.map.insert(alias_key(alias), role);
    }

    pub fn resolve(&self, header: &str) -> Option<ColumnRole> {
        self.map.get(&alias_key(header)).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn alias_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
