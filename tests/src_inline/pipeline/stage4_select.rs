use super::*;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn catalog() -> AntigenCatalog {
    AntigenCatalog::new(&["C", "c", "K", "k", "Fya"], &[("C", "c"), ("K", "k")], &["K"]).unwrap()
}

#[test]
fn test_initial_selection() {
    let sel = initial_selection(&catalog(), &set(&["C", "K"]));
    assert_eq!(sel.system_selected, set(&["c", "k", "Fya"]));
    assert_eq!(sel.user_selected, sel.system_selected);
    assert!(sel.diff().is_empty());
}

#[test]
fn test_select_all_and_none() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["C"]));
    let all = select_all(&sel, &cat);
    assert_eq!(all.user_selected.len(), cat.len());
    assert_eq!(all.diff(), set(&["C"]));
    assert_eq!(select_all(&all, &cat), all);

    let none = select_none(&all);
    assert!(none.user_selected.is_empty());
    assert_eq!(none.system_selected, sel.system_selected);
    assert_eq!(none.diff(), sel.system_selected);
    assert_eq!(select_none(&none), none);
}

#[test]
fn test_reset_then_diff_is_empty() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["C"]));
    let edited = toggle(&select_none(&sel), &cat, "C").unwrap();
    let reset = reset_to_system_default(&edited);
    assert!(reset.diff().is_empty());
    assert_eq!(reset_to_system_default(&reset), reset);
}

#[test]
fn test_toggle_round_trip() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["K"]));
    let once = toggle(&sel, &cat, "K").unwrap();
    assert!(once.user_selected.contains("K"));
    assert_eq!(once.diff(), set(&["K"]));
    let twice = toggle(&once, &cat, "K").unwrap();
    assert_eq!(twice, sel);
}

#[test]
fn test_toggle_canonicalizes_symbol() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["Fya"]));
    let out = toggle(&sel, &cat, "FyA").unwrap();
    assert!(out.user_selected.contains("Fya"));
}

#[test]
fn test_unknown_antigen_rejected() {
    let cat = catalog();
    let sel = initial_selection(&cat, &BTreeSet::new());
    assert_eq!(
        toggle(&sel, &cat, "Xga"),
        Err(SelectionError::UnknownAntigen("Xga".to_string()))
    );
    assert!(set_explicit(&sel, &cat, &["C", "Lua"]).is_err());
}

#[test]
fn test_set_explicit() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["C", "K"]));
    let out = set_explicit(&sel, &cat, &["C", "k", "k"]).unwrap();
    assert_eq!(out.user_selected, set(&["C", "k"]));
    assert_eq!(out.diff(), set(&["C", "c", "Fya"]));
    assert_eq!(set_explicit(&out, &cat, &["C", "k"]).unwrap(), out);
}

#[test]
fn test_apply_selection_op() {
    let cat = catalog();
    let sel = initial_selection(&cat, &set(&["C"]));
    let out = apply_selection_op(&sel, &cat, &SelectionOp::SelectNone).unwrap();
    assert!(out.user_selected.is_empty());
    let out = apply_selection_op(&out, &cat, &SelectionOp::SetExplicit(vec!["K".to_string()]))
        .unwrap();
    assert_eq!(out.user_selected, set(&["K"]));
    let out = apply_selection_op(&out, &cat, &SelectionOp::ResetToSystemDefault).unwrap();
    assert!(out.diff().is_empty());
}

#[test]
fn test_selection_op_json() {
    let op: SelectionOp = serde_json::from_str(r#"{"op":"toggle","value":"K"}"#).unwrap();
    assert_eq!(op, SelectionOp::Toggle("K".to_string()));
    let op: SelectionOp = serde_json::from_str(r#"{"op":"select_all"}"#).unwrap();
    assert_eq!(op, SelectionOp::SelectAll);
}
