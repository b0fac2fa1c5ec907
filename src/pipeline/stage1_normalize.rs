use std::collections::{BTreeMap, BTreeSet};

use crate::input::RawTable;
use crate::model::panel::{LissGrade, PanelRow, PanelTable, Reaction};
use crate::panels::mapping::{ColumnAliases, ColumnRole, canonical_symbol};

/// What the normalizer recovered from, kept next to the table for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    /// Rows whose LISS cell was outside the enumeration and became `-`.
    pub coerced_liss_rows: Vec<u32>,
    pub dropped_columns: Vec<String>,
    pub assigned_index: bool,
    pub import_confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPanel {
    pub table: PanelTable,
    pub report: NormalizeReport,
}

/// Fatal import problems. Every variant means the import is malformed and
/// grading must not proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("malformed input: no LISS column")]
    MissingLiss,
    #[error("malformed input: no antigen columns")]
    NoAntigenColumns,
    #[error("malformed input: invalid row index '{value}' in data row {row}")]
    InvalidIndex { row: usize, value: String },
    #[error("malformed input: duplicate row index {0}")]
    DuplicateIndex(u32),
}

#[derive(Debug, Default)]
struct ColumnPlan {
    index: Option<usize>,
    subject: Option<usize>,
    donor: Option<usize>,
    liss: Option<usize>,
    annotation: Option<usize>,
    antigens: Vec<(String, usize)>,
    dropped: Vec<String>,
}

fn plan_columns(raw: &RawTable, aliases: &ColumnAliases) -> ColumnPlan {
    let mut plan = ColumnPlan::default();
    for (col, header) in raw.columns.iter().enumerate() {
        let slot = match aliases.resolve(header) {
            Some(ColumnRole::RowIndex) => &mut plan.index,
            Some(ColumnRole::SubjectId) => &mut plan.subject,
            Some(ColumnRole::DonorLabel) => &mut plan.donor,
            Some(ColumnRole::Liss) => &mut plan.liss,
            Some(ColumnRole::Annotation) => &mut plan.annotation,
            Some(ColumnRole::Ignore) => {
                plan.dropped.push(header.clone());
                continue;
            }
            None => {
                let symbol = canonical_symbol(header);
                if symbol.is_empty() {
                    plan.dropped.push(header.clone());
                } else if plan.antigens.iter().any(|(a, _)| *a == symbol) {
                    crate::warn!(
                        "antigen column '{}' duplicates {}; keeping the first",
                        header,
                        symbol
                    );
                    plan.dropped.push(header.clone());
                } else {
                    plan.antigens.push((symbol, col));
                }
                continue;
            }
        };
        if slot.is_some() {
            crate::warn!("column '{}' repeats an already mapped role; dropping it", header);
            plan.dropped.push(header.clone());
        } else {
            *slot = Some(col);
        }
    }
    plan
}

/// Canonicalizes a raw import: resolves column aliases, coerces LISS codes
/// and assigns row indices when the import has none.
pub fn normalize(raw: &RawTable, aliases: &ColumnAliases) -> Result<NormalizedPanel, NormalizeError> {
    let plan = plan_columns(raw, aliases);
    let liss_col = plan.liss.ok_or(NormalizeError::MissingLiss)?;
    if plan.antigens.is_empty() {
        return Err(NormalizeError::NoAntigenColumns);
    }

    let mut rows = Vec::with_capacity(raw.n_rows());
    let mut seen_index = BTreeSet::new();
    let mut coerced = Vec::new();
    let mut valid_liss = 0usize;

    for r in 0..raw.n_rows() {
        let index = match plan.index {
            Some(col) => parse_index(raw.cell(r, col), r + 1)?,
            None => (r + 1) as u32,
        };
        if !seen_index.insert(index) {
            return Err(NormalizeError::DuplicateIndex(index));
        }

        let liss_raw = raw.cell(r, liss_col);
        let liss = match LissGrade::parse(liss_raw) {
            Some(g) => {
                valid_liss += 1;
                g
            }
            None => {
                if !liss_raw.trim().is_empty() {
                    crate::warn!(
                        "unknown LISS code '{}' in row {}; treated as '-'",
                        liss_raw,
                        index
                    );
                }
                coerced.push(index);
                LissGrade::Negative
            }
        };

        let mut reactions = BTreeMap::new();
        for (antigen, col) in &plan.antigens {
            reactions.insert(antigen.clone(), Reaction::parse(raw.cell(r, *col)));
        }

        rows.push(PanelRow {
            index,
            subject_id: plan
                .subject
                .map(|c| raw.cell(r, c).to_string())
                .unwrap_or_default(),
            donor_label: plan.donor.map(|c| raw.cell(r, c).to_string()),
            liss,
            reactions,
            annotation: plan.annotation.map(|c| raw.cell(r, c).to_string()),
        });
    }

    let import_confidence = import_confidence(&plan, raw.n_rows(), valid_liss);
    for col in &plan.dropped {
        crate::warn!("dropped column '{}' from import", col);
    }
    crate::info!(
        "normalized panel: {} rows, {} antigen columns, {} LISS values coerced, confidence {:.2}",
        rows.len(),
        plan.antigens.len(),
        coerced.len(),
        import_confidence
    );

    let table = PanelTable {
        antigens: plan.antigens.iter().map(|(a, _)| a.clone()).collect(),
        has_donor_label: plan.donor.is_some(),
        has_annotation: plan.annotation.is_some(),
        rows,
    };

    Ok(NormalizedPanel {
        table,
        report: NormalizeReport {
            coerced_liss_rows: coerced,
            dropped_columns: plan.dropped,
            assigned_index: plan.index.is_none(),
            import_confidence,
        },
    })
}

fn parse_index(value: &str, data_row: usize) -> Result<u32, NormalizeError> {
    match value.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(NormalizeError::InvalidIndex {
            row: data_row,
            value: value.to_string(),
        }),
    }
}

/// 0.80 base, up to 0.15 for the expected identity columns and up to 0.05 for
/// the share of valid LISS codes. Empty imports score zero.
fn import_confidence(plan: &ColumnPlan, n_rows: usize, valid_liss: usize) -> f32 {
    if n_rows == 0 {
        return 0.0;
    }
    let found = [plan.subject, plan.donor, plan.liss]
        .iter()
        .filter(|c| c.is_some())
        .count();
    let mut confidence = 0.80 + (found as f32 / 3.0) * 0.15;
    confidence += (valid_liss as f32 / n_rows as f32) * 0.05;
    confidence.min(1.0)
}

/// Sets the LISS grade of one row, identified by its stable index.
pub fn set_grade(table: &PanelTable, index: u32, grade: LissGrade) -> Option<PanelTable> {
    let mut out = table.clone();
    out.row_mut(index)?.liss = grade;
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_normalize.rs"]
mod tests;
