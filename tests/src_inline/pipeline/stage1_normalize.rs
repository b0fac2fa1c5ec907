use super::*;

fn raw(columns: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::from_str_rows(columns, rows)
}

#[test]
fn test_canonical_layout_and_aliases() {
    let table = raw(
        &["spendernummer", "Spender", "Gen.", "LISS", "C", "KpA", "Spez. Antigen"],
        &[
            &["D-77", "Cell 1", "R1R1", "-", "+", "0", "note"],
            &["D-77", "Cell 2", "rr", "2+", "0", "+", ""],
        ],
    );
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    let t = &out.table;
    assert_eq!(t.antigens, vec!["C", "Kpa"]);
    assert_eq!(
        t.columns(),
        vec!["index", "subject_id", "donor_label", "LISS", "C", "Kpa", "annotation"]
    );
    assert_eq!(t.rows[0].index, 1);
    assert_eq!(t.rows[1].index, 2);
    assert_eq!(t.rows[0].subject_id, "D-77");
    assert_eq!(t.rows[0].donor_label.as_deref(), Some("Cell 1"));
    assert_eq!(t.rows[0].annotation.as_deref(), Some("note"));
    assert!(t.rows[1].is_positive("Kpa"));
    assert!(out.report.assigned_index);
    assert_eq!(out.report.dropped_columns, vec!["Gen."]);
}

#[test]
fn test_subject_alias_variants_resolve_identically() {
    let aliases = ColumnAliases::default();
    let mut outs = Vec::new();
    for subject in ["Sp.Nr.", "spendernummer", "Spendernummer"] {
        let table = raw(&[subject, "LISS", "K"], &[&["X1", "-", "+"]]);
        outs.push(normalize(&table, &aliases).unwrap().table);
    }
    assert_eq!(outs[0], outs[1]);
    assert_eq!(outs[1], outs[2]);
    assert_eq!(outs[0].rows[0].subject_id, "X1");
}

#[test]
fn test_unknown_liss_coerced_to_negative() {
    let table = raw(
        &["LISS", "K"],
        &[&["5+", "+"], &["", "+"], &["1+", "+"], &["pos", "0"]],
    );
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    let grades: Vec<LissGrade> = out.table.rows.iter().map(|r| r.liss).collect();
    assert_eq!(
        grades,
        vec![
            LissGrade::Negative,
            LissGrade::Negative,
            LissGrade::OnePlus,
            LissGrade::Negative
        ]
    );
    assert_eq!(out.report.coerced_liss_rows, vec![1, 2, 4]);
}

#[test]
fn test_missing_required_columns_are_fatal() {
    let no_liss = raw(&["Sp.Nr.", "C"], &[&["1", "+"]]);
    assert_eq!(
        normalize(&no_liss, &ColumnAliases::default()),
        Err(NormalizeError::MissingLiss)
    );

    let no_antigens = raw(&["Sp.Nr.", "LISS", "Gen."], &[&["1", "-", "x"]]);
    assert_eq!(
        normalize(&no_antigens, &ColumnAliases::default()),
        Err(NormalizeError::NoAntigenColumns)
    );
}

#[test]
fn test_optional_columns_missing_is_fine() {
    let table = raw(&["LISS", "M"], &[&["-", "+"]]);
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    assert!(!out.table.has_donor_label);
    assert!(!out.table.has_annotation);
    assert_eq!(out.table.rows[0].subject_id, "");
    assert_eq!(out.table.columns(), vec!["index", "subject_id", "LISS", "M"]);
}

#[test]
fn test_explicit_index_is_kept() {
    let table = raw(&["Index", "LISS", "C"], &[&["7", "-", "+"], &["3", "1+", "0"]]);
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    assert!(!out.report.assigned_index);
    assert_eq!(out.table.rows[0].index, 7);
    assert_eq!(out.table.rows[1].index, 3);
}

#[test]
fn test_invalid_and_duplicate_index_rejected() {
    let bad = raw(&["Index", "LISS", "C"], &[&["0", "-", "+"]]);
    assert!(matches!(
        normalize(&bad, &ColumnAliases::default()),
        Err(NormalizeError::InvalidIndex { row: 1, .. })
    ));

    let dup = raw(&["Index", "LISS", "C"], &[&["2", "-", "+"], &["2", "-", "0"]]);
    assert_eq!(
        normalize(&dup, &ColumnAliases::default()),
        Err(NormalizeError::DuplicateIndex(2))
    );
}

#[test]
fn test_duplicate_antigen_spelling_keeps_first() {
    let table = raw(&["LISS", "FyA", "Fya"], &[&["-", "+", "0"]]);
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    assert_eq!(out.table.antigens, vec!["Fya"]);
    assert!(out.table.rows[0].is_positive("Fya"));
    assert_eq!(out.report.dropped_columns, vec!["Fya"]);
}

#[test]
fn test_custom_alias() {
    let aliases = ColumnAliases::default().with("Patient-ID", ColumnRole::SubjectId);
    let table = raw(&["Patient-ID", "LISS", "S"], &[&["P9", "-", "+"]]);
    let out = normalize(&table, &aliases).unwrap();
    assert_eq!(out.table.rows[0].subject_id, "P9");
    assert_eq!(out.table.antigens, vec!["S"]);
}

#[test]
fn test_import_confidence() {
    let full = raw(&["Sp.Nr.", "Spender", "LISS", "C"], &[&["1", "a", "-", "+"]]);
    let out = normalize(&full, &ColumnAliases::default()).unwrap();
    assert!((out.report.import_confidence - 1.0).abs() < 1e-6);

    let partial = raw(&["LISS", "C"], &[&["-", "+"], &["??", "+"]]);
    let out = normalize(&partial, &ColumnAliases::default()).unwrap();
    // 0.80 + 0.05 (1 of 3 identity columns) + 0.025 (half the LISS codes valid)
    assert!((out.report.import_confidence - 0.875).abs() < 1e-5);

    let empty = raw(&["LISS", "C"], &[]);
    let out = normalize(&empty, &ColumnAliases::default()).unwrap();
    assert_eq!(out.report.import_confidence, 0.0);
    assert!(out.table.is_empty());
}

#[test]
fn test_set_grade_by_stable_index() {
    let table = raw(&["Index", "LISS", "C"], &[&["4", "-", "+"], &["9", "-", "0"]]);
    let out = normalize(&table, &ColumnAliases::default()).unwrap();
    let edited = set_grade(&out.table, 9, LissGrade::ThreePlus).unwrap();
    assert_eq!(edited.row(9).map(|r| r.liss), Some(LissGrade::ThreePlus));
    assert_eq!(edited.row(4).map(|r| r.liss), Some(LissGrade::Negative));
    assert!(set_grade(&out.table, 1, LissGrade::OnePlus).is_none());
}
