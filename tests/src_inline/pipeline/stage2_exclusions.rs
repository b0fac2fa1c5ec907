use proptest::prelude::*;

use super::*;
use crate::model::panel::LissGrade;

fn row(index: u32, liss: &str, reactions: &[(&str, &str)]) -> PanelRow {
    PanelRow {
        index,
        subject_id: String::new(),
        donor_label: None,
        liss: LissGrade::coerce(liss),
        reactions: reactions
            .iter()
            .map(|(a, v)| (a.to_string(), Reaction::parse(v)))
            .collect(),
        annotation: None,
    }
}

fn panel(rows: Vec<PanelRow>) -> PanelTable {
    PanelTable::from_rows(rows)
}

fn catalog(antigens: &[&str], pairs: &[(&str, &str)], allowed: &[&str]) -> AntigenCatalog {
    AntigenCatalog::new(antigens, pairs, allowed).unwrap()
}

#[test]
fn test_zygosity() {
    use Reaction::{Blank, Negative, Positive};
    assert_eq!(zygosity(Positive, Positive), Zygosity::Heterozygous);
    assert_eq!(zygosity(Positive, Negative), Zygosity::Homozygous);
    assert_eq!(zygosity(Blank, Positive), Zygosity::Homozygous);
    assert_eq!(zygosity(Negative, Blank), Zygosity::NoSignal);
}

#[test]
fn test_homozygous_c_excluded_with_row_reference() {
    let p = panel(vec![row(1, "-", &[("C", "+"), ("c", "0")])]);
    let cat = catalog(&["C", "c"], &[("C", "c")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert!(out.excluded.contains("C"));
    assert!(!out.excluded.contains("c"));
    assert_eq!(out.audit.reason("C").as_deref(), Some("rows: 1"));
    assert!(out.audit.rows("c").is_none());
}

#[test]
fn test_heterozygous_only_allow_listed_member() {
    let p = panel(vec![row(1, "-", &[("K", "+"), ("k", "+")])]);
    let cat = catalog(&["K", "k"], &[("K", "k")], &["K"]);
    let out = compute_exclusions(&p, &cat);
    assert!(out.excluded.contains("K"));
    assert!(!out.excluded.contains("k"));
}

#[test]
fn test_heterozygous_neither_allowed() {
    let p = panel(vec![row(1, "-", &[("Fya", "+"), ("Fyb", "+")])]);
    let cat = catalog(&["Fya", "Fyb"], &[("Fya", "Fyb")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert!(out.excluded.is_empty());
    assert!(out.audit.is_empty());
    assert_eq!(out.evaluated_pairs.len(), 1);
}

#[test]
fn test_homozygous_ignores_allow_list() {
    let p = panel(vec![row(4, "-", &[("K", "0"), ("k", "+")])]);
    let cat = catalog(&["K", "k"], &[("K", "k")], &["K"]);
    let out = compute_exclusions(&p, &cat);
    assert_eq!(out.excluded.iter().collect::<Vec<_>>(), vec!["k"]);
    assert_eq!(out.audit.reason("k").as_deref(), Some("rows: 4"));
}

#[test]
fn test_reactive_rows_never_exclude() {
    let p = panel(vec![
        row(1, "1+", &[("C", "+"), ("c", "0"), ("P1", "+")]),
        row(2, "+/-", &[("C", "+"), ("c", "0"), ("P1", "+")]),
    ]);
    let cat = catalog(&["C", "c", "P1"], &[("C", "c")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert!(out.excluded.is_empty());
}

#[test]
fn test_unpaired_antigen_excluded_directly() {
    let p = panel(vec![
        row(2, "-", &[("P1", "+"), ("Cw", "+")]),
        row(5, "-", &[("P1", "+"), ("Cw", "0")]),
    ]);
    let cat = catalog(&["P1", "Cw"], &[], &[]);
    let out = compute_exclusions(&p, &cat);
    assert!(out.excluded.contains("P1"));
    assert!(out.excluded.contains("Cw"));
    assert_eq!(out.audit.reason("P1").as_deref(), Some("rows: 2, 5"));
    assert_eq!(out.audit.reason("Cw").as_deref(), Some("rows: 2"));
}

#[test]
fn test_audit_collects_all_contributing_rows() {
    let p = panel(vec![
        row(12, "-", &[("C", "+"), ("c", "0")]),
        row(3, "-", &[("C", "+"), ("c", "0")]),
        row(7, "-", &[("C", "+"), ("c", "+")]),
        row(8, "3+", &[("C", "+"), ("c", "0")]),
    ]);
    let cat = catalog(&["C", "c"], &[("C", "c")], &["C"]);
    let out = compute_exclusions(&p, &cat);
    assert_eq!(out.audit.reason("C").as_deref(), Some("rows: 3, 7, 12"));
}

#[test]
fn test_skipped_pair_is_reported_not_evaluated() {
    let p = panel(vec![row(1, "-", &[("Jka", "+"), ("M", "+"), ("N", "0")])]);
    let cat = catalog(&["Jka", "Jkb", "M", "N"], &[("Jka", "Jkb"), ("M", "N")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert_eq!(out.skipped_pairs.len(), 1);
    assert_eq!(out.skipped_pairs[0].members(), ["Jka", "Jkb"]);
    assert_eq!(out.evaluated_pairs.len(), 1);
    // Jka has no partner column, so the plain unpaired rule applies
    assert!(out.excluded.contains("Jka"));
    assert_eq!(out.audit.reason("Jka").as_deref(), Some("rows: 1"));
    assert!(out.excluded.contains("M"));
}

#[test]
fn test_skipped_pair_member_excluded_without_allow_list() {
    let p = panel(vec![row(1, "-", &[("Jka", "+"), ("P1", "+")])]);
    let cat = catalog(&["Jka", "Jkb", "P1"], &[("Jka", "Jkb")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert_eq!(out.skipped_pairs[0].members(), ["Jka", "Jkb"]);
    assert!(out.evaluated_pairs.is_empty());
    assert_eq!(
        out.excluded.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["Jka", "P1"]
    );
    assert_eq!(out.audit.reason("Jka").as_deref(), Some("rows: 1"));
}

#[test]
fn test_skipped_pair_member_allow_listed_is_excluded() {
    let p = panel(vec![row(6, "-", &[("Kpa", "+")])]);
    let cat = catalog(&["Kpa", "Kpb"], &[("Kpa", "Kpb")], &["Kpa"]);
    let out = compute_exclusions(&p, &cat);
    assert_eq!(out.skipped_pairs.len(), 1);
    assert!(out.excluded.contains("Kpa"));
    assert_eq!(out.audit.reason("Kpa").as_deref(), Some("rows: 6"));
}

#[test]
fn test_panel_columns_outside_catalog_ignored() {
    let p = panel(vec![row(1, "-", &[("Xga", "+"), ("C", "+"), ("c", "0")])]);
    let cat = catalog(&["C", "c"], &[("C", "c")], &[]);
    let out = compute_exclusions(&p, &cat);
    assert!(!out.excluded.contains("Xga"));
    assert!(out.excluded.contains("C"));
}

fn reaction_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("+"), Just("0"), Just("")]
}

fn liss_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("-"), Just("+/-"), Just("1+"), Just("2+"), Just("3+"), Just("4+")]
}

fn builtin_panel_strategy() -> impl Strategy<Value = PanelTable> {
    let n_antigens = AntigenCatalog::builtin().len();
    prop::collection::vec(
        (liss_strategy(), prop::collection::vec(reaction_strategy(), n_antigens)),
        0..12,
    )
    .prop_map(|rows| {
        let cat = AntigenCatalog::builtin();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, (liss, reactions))| {
                let pairs: Vec<(&str, &str)> = cat
                    .antigens()
                    .iter()
                    .map(|a| a.as_str())
                    .zip(reactions)
                    .collect();
                row(i as u32 + 1, liss, &pairs)
            })
            .collect();
        panel(rows)
    })
}

proptest! {
    #[test]
    fn prop_excluded_subset_of_catalog(p in builtin_panel_strategy()) {
        let cat = AntigenCatalog::builtin();
        let out = compute_exclusions(&p, &cat);
        for a in &out.excluded {
            prop_assert!(cat.contains(a));
            prop_assert!(out.audit.contains(a));
        }
        prop_assert_eq!(out.audit.len(), out.excluded.len());
    }

    #[test]
    fn prop_exclusions_deterministic(p in builtin_panel_strategy()) {
        let cat = AntigenCatalog::builtin();
        prop_assert_eq!(compute_exclusions(&p, &cat), compute_exclusions(&p, &cat));
    }

    #[test]
    fn prop_audit_rows_are_negative_rows(p in builtin_panel_strategy()) {
        let cat = AntigenCatalog::builtin();
        let out = compute_exclusions(&p, &cat);
        for a in out.audit.antigens() {
            for idx in out.audit.rows(a).into_iter().flatten() {
                let r = p.row(*idx).unwrap();
                prop_assert!(r.liss.is_negative());
                prop_assert!(r.is_positive(a));
            }
        }
    }

    #[test]
    fn prop_heterozygous_non_allowed_never_excluded_alone(
        first in prop_oneof![Just("C"), Just("k"), Just("Fyb"), Just("S")],
    ) {
        let cat = AntigenCatalog::builtin();
        let pair = cat
            .pairs()
            .iter()
            .find(|p| p.first == first || p.second == first)
            .unwrap()
            .clone();
        let p = panel(vec![row(1, "-", &[(pair.first.as_str(), "+"), (pair.second.as_str(), "+")])]);
        let out = compute_exclusions(&p, &cat);
        for m in pair.members() {
            prop_assert_eq!(out.excluded.contains(m), cat.is_heterozygous_allowed(m));
        }
    }
}
