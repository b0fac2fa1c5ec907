use serde::Serialize;

use crate::report::ReportData;

#[derive(Debug, Serialize)]
struct SummaryJson<'a> {
    tool: ToolMeta<'a>,
    subject_key: Option<&'a str>,
    lot_number: Option<&'a str>,
    timestamp: String,
    mode: &'static str,
    rule_version: Option<&'a str>,
    rows_tested: usize,
    findings: Findings<'a>,
    selection: SelectionSummary<'a>,
    antigens: Vec<AntigenJson<'a>>,
}

#[derive(Debug, Serialize)]
struct ToolMeta<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct Findings<'a> {
    confirmed_3x: &'a [String],
    confirmed_2x: &'a [String],
    antibodies_detected: bool,
}

#[derive(Debug, Serialize)]
struct SelectionSummary<'a> {
    system_selected: usize,
    user_selected: &'a [String],
    differences: &'a [String],
}

#[derive(Debug, Serialize)]
struct AntigenJson<'a> {
    antigen: &'a str,
    reactions: usize,
    status: &'static str,
    user_selected: bool,
    exclusion_reason: Option<&'a str>,
}

pub fn render_summary_json(data: &ReportData) -> Result<String, serde_json::Error> {
    let summary = SummaryJson {
        tool: ToolMeta {
            name: &data.tool_name,
            version: &data.tool_version,
        },
        subject_key: data.subject_key.as_deref(),
        lot_number: data.lot_number.as_deref(),
        timestamp: data.timestamp.to_rfc3339(),
        mode: data.mode.label(),
        rule_version: data.rule_version.as_deref(),
        rows_tested: data.rows_tested,
        findings: Findings {
            confirmed_3x: &data.confirmed_3x,
            confirmed_2x: &data.confirmed_2x,
            antibodies_detected: !data.confirmed_3x.is_empty() || !data.confirmed_2x.is_empty(),
        },
        selection: SelectionSummary {
            system_selected: data.system_selected,
            user_selected: &data.user_selected,
            differences: &data.differences,
        },
        antigens: data
            .antigens
            .iter()
            .map(|line| AntigenJson {
                antigen: &line.antigen,
                reactions: line.reactions,
                status: line.status.label(),
                user_selected: line.user_selected,
                exclusion_reason: line.exclusion_reason.as_deref(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary)
}
