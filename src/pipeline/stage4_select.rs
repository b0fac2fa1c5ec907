use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::selection::SelectionSet;
use crate::panels::{AntigenCatalog, canonical_symbol};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("antigen {0} is not in the catalog")]
    UnknownAntigen(String),
}

/// Reviewer edits, in the form the workflow threads them through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum SelectionOp {
    SelectAll,
    SelectNone,
    ResetToSystemDefault,
    Toggle(String),
    SetExplicit(Vec<String>),
}

pub fn initial_selection(catalog: &AntigenCatalog, excluded: &BTreeSet<String>) -> SelectionSet {
    let system_selected: BTreeSet<String> = catalog
        .antigens()
        .iter()
        .filter(|a| !excluded.contains(*a))
        .cloned()
        .collect();
    SelectionSet {
        user_selected: system_selected.clone(),
        system_selected,
    }
}

pub fn select_all(selection: &SelectionSet, catalog: &AntigenCatalog) -> SelectionSet {
    SelectionSet {
        system_selected: selection.system_selected.clone(),
        user_selected: catalog.antigens().iter().cloned().collect(),
    }
}

pub fn select_none(selection: &SelectionSet) -> SelectionSet {
    SelectionSet {
        system_selected: selection.system_selected.clone(),
        user_selected: BTreeSet::new(),
    }
}

pub fn reset_to_system_default(selection: &SelectionSet) -> SelectionSet {
    SelectionSet {
        system_selected: selection.system_selected.clone(),
        user_selected: selection.system_selected.clone(),
    }
}

pub fn toggle(
    selection: &SelectionSet,
    catalog: &AntigenCatalog,
    antigen: &str,
) -> Result<SelectionSet, SelectionError> {
    let symbol = catalog_symbol(catalog, antigen)?;
    let mut out = selection.clone();
    if !out.user_selected.remove(&symbol) {
        out.user_selected.insert(symbol);
    }
    Ok(out)
}

/// Replaces the user selection. Fails without effect if any symbol is
/// outside the catalog.
pub fn set_explicit<S: AsRef<str>>(
    selection: &SelectionSet,
    catalog: &AntigenCatalog,
    antigens: &[S],
) -> Result<SelectionSet, SelectionError> {
    let mut user_selected = BTreeSet::new();
    for a in antigens {
        user_selected.insert(catalog_symbol(catalog, a.as_ref())?);
    }
    Ok(SelectionSet {
        system_selected: selection.system_selected.clone(),
        user_selected,
    })
}

pub fn apply_selection_op(
    selection: &SelectionSet,
    catalog: &AntigenCatalog,
    op: &SelectionOp,
) -> Result<SelectionSet, SelectionError> {
    match op {
        SelectionOp::SelectAll => Ok(select_all(selection, catalog)),
        SelectionOp::SelectNone => Ok(select_none(selection)),
        SelectionOp::ResetToSystemDefault => Ok(reset_to_system_default(selection)),
        SelectionOp::Toggle(antigen) => toggle(selection, catalog, antigen),
        SelectionOp::SetExplicit(antigens) => {
            set_explicit(selection, catalog, antigens.as_slice())
        }
    }
}

fn catalog_symbol(catalog: &AntigenCatalog, antigen: &str) -> Result<String, SelectionError> {
    let symbol = canonical_symbol(antigen);
    if catalog.contains(&symbol) {
        Ok(symbol)
    } else {
        Err(SelectionError::UnknownAntigen(antigen.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_select.rs"]
mod tests;
