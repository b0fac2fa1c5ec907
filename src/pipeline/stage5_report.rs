use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::model::panel::PanelTable;
use crate::model::rules::AnalysisMode;
use crate::model::selection::SelectionSet;
use crate::model::snapshot::AnalysisSnapshot;
use crate::model::status::{AntigenStatus, StatusMap};
use crate::pipeline::stage3_classify::reaction_count;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{AntigenLine, ReactionTable, ReportData};

#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub panel: &'a PanelTable,
    /// Display order of the antigens in the status map.
    pub antigens: &'a [String],
    pub status: &'a StatusMap,
    pub reasons: &'a BTreeMap<String, String>,
    pub selection: &'a SelectionSet,

    pub subject_key: Option<&'a str>,
    pub lot_number: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
    pub mode: AnalysisMode,
    pub rule_version: Option<&'a str>,

    pub tool_name: String,
    pub tool_version: String,
}

/// Writes `summary.json`, `report.txt` and the canonical `panel.tsv`.
pub fn write_reports(input: &ReportInput<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let data = build_report_data(input);

    let json = render_summary_json(&data)?;
    write_text(&out_dir.join("summary.json"), &json)?;

    let report = render_report_text(&data);
    write_text(&out_dir.join("report.txt"), &report)?;

    write_panel_tsv(input.panel, &out_dir.join("panel.tsv"))?;

    crate::info!("reports written to {}", out_dir.display());
    Ok(())
}

/// Renders the reports of a stored snapshot exactly as it was saved.
pub fn write_snapshot_reports(snapshot: &AnalysisSnapshot, out_dir: &Path) -> std::io::Result<()> {
    let panel = snapshot.panel_table();
    let selection = snapshot.selection();
    let order = report_order(&panel, &snapshot.status_map);
    let input = ReportInput {
        panel: &panel,
        antigens: &order,
        status: &snapshot.status_map,
        reasons: &snapshot.exclusion_reasons,
        selection: &selection,
        subject_key: Some(snapshot.subject_key.as_str()).filter(|s| !s.is_empty()),
        lot_number: snapshot.lot_number.as_deref(),
        timestamp: snapshot.timestamp,
        mode: snapshot.mode,
        rule_version: snapshot.rule_version.as_deref(),
        tool_name: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    write_reports(&input, out_dir)
}

/// Panel columns first in import order, then status-map antigens the panel
/// never typed.
pub fn report_order(panel: &PanelTable, status: &StatusMap) -> Vec<String> {
    let mut order: Vec<String> = panel
        .antigens
        .iter()
        .filter(|a| status.contains_key(*a))
        .cloned()
        .collect();
    let seen: BTreeSet<String> = order.iter().cloned().collect();
    order.extend(status.keys().filter(|a| !seen.contains(*a)).cloned());
    order
}

pub fn build_report_data(input: &ReportInput<'_>) -> ReportData {
    let differences = input.selection.diff();
    let user_selected: Vec<String> = input
        .antigens
        .iter()
        .filter(|a| input.selection.is_user_selected(a))
        .cloned()
        .collect();

    let confirmed_with = |tier: AntigenStatus| -> Vec<String> {
        user_selected
            .iter()
            .filter(|a| input.status.get(*a) == Some(&tier))
            .cloned()
            .collect()
    };
    let confirmed_3x = confirmed_with(AntigenStatus::Confirmed3x);
    let confirmed_2x = confirmed_with(AntigenStatus::Confirmed2x);

    let mut antigens = Vec::with_capacity(input.antigens.len());
    let mut excluded = Vec::new();
    for antigen in input.antigens {
        let Some(&status) = input.status.get(antigen) else {
            continue;
        };
        let reason = input.reasons.get(antigen).cloned();
        if status == AntigenStatus::Excluded {
            excluded.push((
                antigen.clone(),
                reason.clone().unwrap_or_else(|| "no reason recorded".to_string()),
            ));
        }
        antigens.push(AntigenLine {
            antigen: antigen.clone(),
            reactions: reaction_count(input.panel, antigen),
            status,
            user_selected: input.selection.is_user_selected(antigen),
            exclusion_reason: reason,
            differs: differences.contains(antigen),
        });
    }

    ReportData {
        tool_name: input.tool_name.clone(),
        tool_version: input.tool_version.clone(),
        subject_key: input.subject_key.map(str::to_string),
        lot_number: input.lot_number.map(str::to_string),
        timestamp: input.timestamp,
        mode: input.mode,
        rule_version: input.rule_version.map(str::to_string),
        rows_tested: input.panel.len(),
        system_selected: input.selection.system_selected.len(),
        differences: input
            .antigens
            .iter()
            .filter(|a| differences.contains(*a))
            .cloned()
            .collect(),
        user_selected: user_selected.clone(),
        confirmed_3x,
        confirmed_2x,
        antigens,
        excluded,
        reactive_table: reactive_table(input.panel, &user_selected),
    }
}

fn reactive_table(panel: &PanelTable, selected: &[String]) -> ReactionTable {
    let show_subject = panel.subject_key().is_some();
    let columns: Vec<&String> = selected.iter().filter(|a| panel.has_antigen(a)).collect();

    let mut header = vec!["index".to_string()];
    if show_subject {
        header.push("subject_id".to_string());
    }
    if panel.has_donor_label {
        header.push("donor".to_string());
    }
    header.push("LISS".to_string());
    header.extend(columns.iter().map(|a| a.to_string()));

    let rows = panel
        .reactive_rows()
        .map(|row| {
            let mut cells = vec![row.index.to_string()];
            if show_subject {
                cells.push(row.subject_id.clone());
            }
            if panel.has_donor_label {
                cells.push(row.donor_label.clone().unwrap_or_default());
            }
            cells.push(row.liss.to_string());
            cells.extend(columns.iter().map(|a| row.reaction(a).as_str().to_string()));
            cells
        })
        .collect();

    ReactionTable { header, rows }
}

/// Canonical layout, tab separated.
pub fn write_panel_tsv(panel: &PanelTable, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "{}", panel.columns().join("\t"))?;
    for row in &panel.rows {
        let mut cells = vec![row.index.to_string(), row.subject_id.clone()];
        if panel.has_donor_label {
            cells.push(row.donor_label.clone().unwrap_or_default());
        }
        cells.push(row.liss.to_string());
        for antigen in &panel.antigens {
            cells.push(row.reaction(antigen).as_str().to_string());
        }
        if panel.has_annotation {
            cells.push(row.annotation.clone().unwrap_or_default());
        }
        writeln!(w, "{}", cells.join("\t"))?;
    }
    w.flush()
}

fn write_text(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(contents.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
