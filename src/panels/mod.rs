use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub mod defs;
pub mod loader;
pub mod mapping;

pub use loader::{CatalogConfig, load_catalog_config, parse_catalog_config};
pub use mapping::{ColumnAliases, ColumnRole, canonical_symbol};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntitheticalPair {
    pub first: String,
    pub second: String,
}

impl AntitheticalPair {
    pub fn members(&self) -> [&str; 2] {
        [self.first.as_str(), self.second.as_str()]
    }
}

impl std::fmt::Display for AntitheticalPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// The antigens in scope for one analysis pass, with the antithetical pairs
/// and the heterozygous allow-list. Always passed explicitly into engine calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AntigenCatalog {
    antigens: Vec<String>,
    pairs: Vec<AntitheticalPair>,
    allowed_heterozygous: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog has no antigens")]
    Empty,
    #[error("catalog contains an empty antigen symbol")]
    EmptySymbol,
    #[error("duplicate antigen in catalog: {0}")]
    Duplicate(String),
    #[error("antithetical pair {0}/{0} pairs an antigen with itself")]
    SelfPair(String),
    #[error("antithetical pair member {0} is not in the catalog")]
    PairMemberUnknown(String),
    #[error("allowed-heterozygous antigen {0} is not in the catalog")]
    AllowedUnknown(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl AntigenCatalog {
    /// Canonicalizes every symbol and validates that pairs and the allow-list
    /// only reference catalog antigens.
    pub fn new<S: AsRef<str>>(
        antigens: &[S],
        pairs: &[(S, S)],
        allowed_heterozygous: &[S],
    ) -> Result<Self, CatalogError> {
        if antigens.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = BTreeSet::new();
        let mut canon_antigens = Vec::with_capacity(antigens.len());
        for a in antigens {
            let sym = canonical_symbol(a.as_ref());
            if sym.is_empty() {
                return Err(CatalogError::EmptySymbol);
            }
            if !seen.insert(sym.clone()) {
                return Err(CatalogError::Duplicate(sym));
            }
            canon_antigens.push(sym);
        }

        let mut canon_pairs = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            let first = canonical_symbol(a.as_ref());
            let second = canonical_symbol(b.as_ref());
            if first == second {
                return Err(CatalogError::SelfPair(first));
            }
            for m in [&first, &second] {
                if !seen.contains(m) {
                    return Err(CatalogError::PairMemberUnknown(m.clone()));
                }
            }
            canon_pairs.push(AntitheticalPair { first, second });
        }

        let mut allowed = BTreeSet::new();
        for a in allowed_heterozygous {
            let sym = canonical_symbol(a.as_ref());
            if !seen.contains(&sym) {
                return Err(CatalogError::AllowedUnknown(sym));
            }
            allowed.insert(sym);
        }

        Ok(Self {
            antigens: canon_antigens,
            pairs: canon_pairs,
            allowed_heterozygous: allowed,
        })
    }

    /// The historical default panel layout.
    pub fn builtin() -> Self {
        let antigens = defs::builtin_antigens()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pairs = defs::builtin_pairs()
            .iter()
            .map(|(a, b)| AntitheticalPair {
                first: a.to_string(),
                second: b.to_string(),
            })
            .collect();
        let allowed_heterozygous = defs::builtin_allowed_heterozygous()
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            antigens,
            pairs,
            allowed_heterozygous,
        }
    }

    pub fn antigens(&self) -> &[String] {
        &self.antigens
    }

    pub fn pairs(&self) -> &[AntitheticalPair] {
        &self.pairs
    }

    pub fn allowed_heterozygous(&self) -> &BTreeSet<String> {
        &self.allowed_heterozygous
    }

    pub fn contains(&self, antigen: &str) -> bool {
        self.antigens.iter().any(|a| a == antigen)
    }

    pub fn is_heterozygous_allowed(&self, antigen: &str) -> bool {
        self.allowed_heterozygous.contains(antigen)
    }

    pub fn len(&self) -> usize {
        self.antigens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.antigens.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/panels/tests.rs"]
mod tests;
