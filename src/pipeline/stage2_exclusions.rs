use std::collections::BTreeSet;

use crate::model::audit::ExclusionAudit;
use crate::model::panel::{PanelRow, PanelTable, Reaction};
use crate::panels::{AntigenCatalog, AntitheticalPair};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zygosity {
    /// Both alleles expressed on the cell.
    Heterozygous,
    /// Exactly one allele expressed.
    Homozygous,
    NoSignal,
}

pub fn zygosity(first: Reaction, second: Reaction) -> Zygosity {
    match (first.is_positive(), second.is_positive()) {
        (true, true) => Zygosity::Heterozygous,
        (true, false) | (false, true) => Zygosity::Homozygous,
        (false, false) => Zygosity::NoSignal,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionResult {
    pub excluded: BTreeSet<String>,
    pub audit: ExclusionAudit,
    /// Pairs with both columns present in the panel.
    pub evaluated_pairs: Vec<AntitheticalPair>,
    /// Pairs skipped because at least one column is absent from the panel.
    pub skipped_pairs: Vec<AntitheticalPair>,
}

impl ExclusionResult {
    fn stage(&mut self, antigen: &str, row: &PanelRow) {
        crate::debug!("row {} excludes {}", row.index, antigen);
        self.excluded.insert(antigen.to_string());
        self.audit.record(antigen, row.index);
    }
}

/// Applies the zygosity rule table to the negative rows of a panel.
///
/// Antigens outside every evaluated pair are excluded by any `+` on a
/// negative row. For an evaluated pair, a homozygous cell excludes its
/// positive member, a heterozygous cell excludes only allow-listed members.
/// A pair with a missing column is skipped, so its present member falls
/// under the unpaired rule.
pub fn compute_exclusions(panel: &PanelTable, catalog: &AntigenCatalog) -> ExclusionResult {
    let mut result = ExclusionResult::default();

    for pair in catalog.pairs() {
        if panel.has_antigen(&pair.first) && panel.has_antigen(&pair.second) {
            result.evaluated_pairs.push(pair.clone());
        } else {
            crate::warn!(
                "antithetical pair {} references a column absent from the panel; skipped",
                pair
            );
            result.skipped_pairs.push(pair.clone());
        }
    }

    let paired: BTreeSet<&str> = result
        .evaluated_pairs
        .iter()
        .flat_map(|p| p.members())
        .collect();
    let unpaired: Vec<&str> = catalog
        .antigens()
        .iter()
        .map(|a| a.as_str())
        .filter(|a| panel.has_antigen(a) && !paired.contains(a))
        .collect();

    let mut staged = Vec::new();
    for row in panel.negative_rows() {
        for &antigen in &unpaired {
            if row.is_positive(antigen) {
                staged.push((antigen.to_string(), row));
            }
        }

        for pair in &result.evaluated_pairs {
            let [a1, a2] = pair.members();
            match zygosity(row.reaction(a1), row.reaction(a2)) {
                Zygosity::Homozygous => {
                    let positive = if row.is_positive(a1) { a1 } else { a2 };
                    staged.push((positive.to_string(), row));
                }
                Zygosity::Heterozygous => {
                    for member in [a1, a2] {
                        if catalog.is_heterozygous_allowed(member) {
                            staged.push((member.to_string(), row));
                        }
                    }
                }
                Zygosity::NoSignal => {}
            }
        }
    }

    for (antigen, row) in staged {
        result.stage(&antigen, row);
    }

    crate::info!(
        "exclusion pass: {} antigens excluded, {} pairs evaluated, {} skipped",
        result.excluded.len(),
        result.evaluated_pairs.len(),
        result.skipped_pairs.len()
    );

    result
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_exclusions.rs"]
mod tests;
