use crate::report::{
    ReactionTable, ReportData, anti_list, format_timestamp, join_or_none,
};

pub fn render_report_text(data: &ReportData) -> String {
    let mut out = String::new();

    out.push_str("Antibody Identification Report\n");
    out.push_str("==============================\n\n");
    out.push_str(&format!(
        "Subject: {}\n",
        data.subject_key.as_deref().unwrap_or("unknown")
    ));
    out.push_str(&format!(
        "Lot number: {}\n",
        data.lot_number.as_deref().unwrap_or("not recorded")
    ));
    out.push_str(&format!("Date: {}\n", format_timestamp(&data.timestamp)));
    out.push_str(&format!("Evaluation mode: {}\n", data.mode.label()));
    if let Some(v) = &data.rule_version {
        out.push_str(&format!("Rule version: {v}\n"));
    }
    out.push('\n');

    out.push_str("1. Provisional findings\n");
    out.push_str(&render_provisional(data));
    out.push('\n');

    out.push_str("2. Medical report\n");
    out.push_str(&render_medical(data));
    out.push('\n');

    out.push_str("3. Lab-technical report\n");
    out.push_str(&render_lab_technical(data));
    out.push('\n');

    out.push_str("4. Exclusion summary\n");
    out.push_str(&render_exclusion_summary(data));

    out
}

pub fn render_provisional(data: &ReportData) -> String {
    let mut out = String::new();
    if data.confirmed_3x.is_empty() && data.confirmed_2x.is_empty() {
        out.push_str("No confirmed antigens among the current selection.\n");
        return out;
    }
    if !data.confirmed_3x.is_empty() {
        out.push_str(&format!(
            "Confirmed (3x +): {}\n",
            data.confirmed_3x.join(", ")
        ));
    }
    if !data.confirmed_2x.is_empty() {
        out.push_str(&format!(
            "Confirmed (2x +): {}\n",
            data.confirmed_2x.join(", ")
        ));
    }
    out
}

pub fn render_medical(data: &ReportData) -> String {
    let mut out = String::new();
    if data.confirmed_3x.is_empty() && data.confirmed_2x.is_empty() {
        out.push_str("No antibodies detected.\n");
    }
    if !data.confirmed_3x.is_empty() {
        out.push_str(&format!(
            "3+ antibodies present: {}\n",
            anti_list(&data.confirmed_3x)
        ));
    }
    if !data.confirmed_2x.is_empty() {
        out.push_str(&format!(
            "2+ antibodies present: {}\n",
            anti_list(&data.confirmed_2x)
        ));
    }
    out.push_str("\nReaction table (reactive rows):\n");
    if data.reactive_table.rows.is_empty() {
        out.push_str("(no reactive rows)\n");
    } else {
        out.push_str(&render_table(&data.reactive_table));
    }
    out
}

pub fn render_lab_technical(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str(&format!("Rows tested: {}\n", data.rows_tested));
    out.push_str(&format!("System selection: {} antigens\n", data.system_selected));
    out.push_str(&format!(
        "User selection: {} antigens\n",
        data.user_selected.len()
    ));
    out.push_str(&format!(
        "Differences: {} antigens ({})\n",
        data.differences.len(),
        join_or_none(&data.differences)
    ));
    out.push_str("\nAntigen overview:\n");

    let table = ReactionTable {
        header: ["antigen", "reactions", "status", "user_selected", "exclusion_reason"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: data
            .antigens
            .iter()
            .map(|line| {
                let marker = if line.differs { "*" } else { "" };
                vec![
                    format!("{}{}", line.antigen, marker),
                    line.reactions.to_string(),
                    line.status.label().to_string(),
                    (if line.user_selected { "yes" } else { "no" }).to_string(),
                    line.exclusion_reason.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    };
    out.push_str(&render_table(&table));
    if !data.differences.is_empty() {
        out.push_str("* user selection differs from the system default\n");
    }
    out
}

pub fn render_exclusion_summary(data: &ReportData) -> String {
    if data.excluded.is_empty() {
        return "No antigens excluded.\n".to_string();
    }
    let mut out = String::new();
    for (antigen, reason) in &data.excluded {
        out.push_str(&format!("{antigen}: {reason}\n"));
    }
    out
}

/// Left-aligned columns separated by two spaces.
fn render_table(table: &ReactionTable) -> String {
    let n_cols = table.header.len();
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (c, cell) in row.iter().enumerate().take(n_cols) {
            widths[c] = widths[c].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &table.header, &widths);
    for row in &table.rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (c, width) in widths.iter().enumerate() {
        if c > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(c).map(|s| s.as_str()).unwrap_or("");
        line.push_str(cell);
        for _ in cell.chars().count()..*width {
            line.push(' ');
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
