use super::*;
use crate::model::panel::{LissGrade, PanelRow, Reaction};
use crate::model::status::AntigenStatus;

fn panel() -> PanelTable {
    let rows = vec![
        PanelRow {
            index: 1,
            subject_id: "S-1".to_string(),
            donor_label: None,
            liss: LissGrade::Negative,
            reactions: [("C", "+"), ("c", "0"), ("K", "0"), ("k", "+")]
                .iter()
                .map(|(a, v)| (a.to_string(), Reaction::parse(v)))
                .collect(),
            annotation: None,
        },
        PanelRow {
            index: 2,
            subject_id: "S-1".to_string(),
            donor_label: None,
            liss: LissGrade::TwoPlus,
            reactions: [("C", "0"), ("c", "+"), ("K", "+"), ("k", "+")]
                .iter()
                .map(|(a, v)| (a.to_string(), Reaction::parse(v)))
                .collect(),
            annotation: None,
        },
    ];
    PanelTable::from_rows(rows)
}

#[test]
fn test_analyze_automatic() {
    let cat = AntigenCatalog::builtin();
    let out = analyze(&panel(), &cat, AnalysisMode::Automatic);
    assert!(out.excluded().contains("C"));
    assert!(out.excluded().contains("k"));
    assert_eq!(out.status["C"], AntigenStatus::Excluded);
    assert_eq!(out.status["K"], AntigenStatus::NotExcluded);
    assert_eq!(out.reasons()["C"], "rows: 1");
    assert_eq!(out.status.len(), cat.len());
}

#[test]
fn test_analyze_manual_bypasses_engine() {
    let cat = AntigenCatalog::builtin();
    let out = analyze(&panel(), &cat, AnalysisMode::Manual);
    assert!(out.excluded().is_empty());
    assert!(out.reasons().is_empty());
    assert!(out.status.values().all(|s| *s == AntigenStatus::NotExcluded));
}
