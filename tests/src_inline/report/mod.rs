use chrono::TimeZone;

use super::json::render_summary_json;
use super::text::{render_exclusion_summary, render_medical, render_report_text};
use super::*;

fn data() -> ReportData {
    ReportData {
        tool_name: "kira-abid".to_string(),
        tool_version: "0.1.0".to_string(),
        subject_key: Some("4711".to_string()),
        lot_number: None,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        mode: AnalysisMode::Automatic,
        rule_version: Some("zygosity-v1".to_string()),
        rows_tested: 11,
        system_selected: 3,
        user_selected: vec!["K".to_string(), "E".to_string()],
        differences: vec!["Fya".to_string()],
        confirmed_3x: vec!["K".to_string()],
        confirmed_2x: vec![],
        antigens: vec![
            AntigenLine {
                antigen: "C".to_string(),
                reactions: 0,
                status: AntigenStatus::Excluded,
                user_selected: false,
                exclusion_reason: Some("rows: 3, 7".to_string()),
                differs: false,
            },
            AntigenLine {
                antigen: "K".to_string(),
                reactions: 3,
                status: AntigenStatus::Confirmed3x,
                user_selected: true,
                exclusion_reason: None,
                differs: false,
            },
        ],
        excluded: vec![("C".to_string(), "rows: 3, 7".to_string())],
        reactive_table: ReactionTable {
            header: vec!["index".to_string(), "LISS".to_string(), "K".to_string()],
            rows: vec![vec!["2".to_string(), "3+".to_string(), "+".to_string()]],
        },
    }
}

#[test]
fn test_anti_list() {
    assert_eq!(anti_list(&["K".to_string(), "E".to_string()]), "Anti-K, Anti-E");
    assert_eq!(anti_list(&[]), "");
    assert_eq!(join_or_none(&[]), "none");
}

#[test]
fn test_medical_report_lists_confirmations() {
    let text = render_medical(&data());
    assert!(text.contains("3+ antibodies present: Anti-K"));
    assert!(!text.contains("2+ antibodies present"));
    assert!(text.contains("2      3+    +"));
}

#[test]
fn test_medical_report_without_findings() {
    let mut d = data();
    d.confirmed_3x.clear();
    let text = render_medical(&d);
    assert!(text.contains("No antibodies detected."));
}

#[test]
fn test_report_text_sections() {
    let text = render_report_text(&data());
    assert!(text.contains("Subject: 4711"));
    assert!(text.contains("Lot number: not recorded"));
    assert!(text.contains("Date: 2024-03-01 09:30:00 UTC"));
    assert!(text.contains("Rows tested: 11"));
    assert!(text.contains("Differences: 1 antigens (Fya)"));
    assert!(text.contains("4. Exclusion summary\nC: rows: 3, 7\n"));
}

#[test]
fn test_exclusion_summary_empty() {
    let mut d = data();
    d.excluded.clear();
    assert_eq!(render_exclusion_summary(&d), "No antigens excluded.\n");
}

#[test]
fn test_summary_json() {
    let json = render_summary_json(&data()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["tool"]["name"], "kira-abid");
    assert_eq!(v["lot_number"], serde_json::Value::Null);
    assert_eq!(v["mode"], "automatic");
    assert_eq!(v["findings"]["confirmed_3x"][0], "K");
    assert_eq!(v["findings"]["antibodies_detected"], true);
    assert_eq!(v["antigens"][0]["exclusion_reason"], "rows: 3, 7");
    assert_eq!(v["antigens"][1]["status"], "Confirmed (3x +)");
    assert_eq!(v["selection"]["differences"][0], "Fya");
}
