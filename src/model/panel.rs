use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Graded reaction of the serum against one reagent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LissGrade {
    Negative,
    Weak,
    OnePlus,
    TwoPlus,
    ThreePlus,
    FourPlus,
}

impl LissGrade {
    pub const ALL: [LissGrade; 6] = [
        LissGrade::Negative,
        LissGrade::Weak,
        LissGrade::OnePlus,
        LissGrade::TwoPlus,
        LissGrade::ThreePlus,
        LissGrade::FourPlus,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "-" => Some(LissGrade::Negative),
            "+/-" => Some(LissGrade::Weak),
            "1+" => Some(LissGrade::OnePlus),
            "2+" => Some(LissGrade::TwoPlus),
            "3+" => Some(LissGrade::ThreePlus),
            "4+" => Some(LissGrade::FourPlus),
            _ => None,
        }
    }

    /// Unknown codes fall back to negative: an unrecognised reaction is never
    /// promoted to a positive one.
    pub fn coerce(s: &str) -> Self {
        Self::parse(s).unwrap_or(LissGrade::Negative)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LissGrade::Negative => "-",
            LissGrade::Weak => "+/-",
            LissGrade::OnePlus => "1+",
            LissGrade::TwoPlus => "2+",
            LissGrade::ThreePlus => "3+",
            LissGrade::FourPlus => "4+",
        }
    }

    pub fn is_negative(self) -> bool {
        self == LissGrade::Negative
    }

    pub fn is_reactive(self) -> bool {
        !self.is_negative()
    }
}

impl From<String> for LissGrade {
    fn from(value: String) -> Self {
        LissGrade::coerce(&value)
    }
}

impl From<LissGrade> for String {
    fn from(value: LissGrade) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for LissGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Antigen typing of a reagent cell for one antigen column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Reaction {
    Positive,
    Negative,
    #[default]
    Blank,
}

impl Reaction {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "+" => Reaction::Positive,
            "0" | "-" => Reaction::Negative,
            _ => Reaction::Blank,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Positive => "+",
            Reaction::Negative => "0",
            Reaction::Blank => "",
        }
    }

    pub fn is_positive(self) -> bool {
        self == Reaction::Positive
    }
}

impl From<String> for Reaction {
    fn from(value: String) -> Self {
        Reaction::parse(&value)
    }
}

impl From<Reaction> for String {
    fn from(value: Reaction) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRow {
    /// 1-based and stable for the lifetime of the panel.
    pub index: u32,
    #[serde(default)]
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_label: Option<String>,
    pub liss: LissGrade,
    #[serde(default)]
    pub reactions: BTreeMap<String, Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl PanelRow {
    pub fn reaction(&self, antigen: &str) -> Reaction {
        self.reactions.get(antigen).copied().unwrap_or_default()
    }

    pub fn is_positive(&self, antigen: &str) -> bool {
        self.reaction(antigen).is_positive()
    }
}

pub const INDEX_COLUMN: &str = "index";
pub const SUBJECT_COLUMN: &str = "subject_id";
pub const DONOR_COLUMN: &str = "donor_label";
pub const LISS_COLUMN: &str = "LISS";
pub const ANNOTATION_COLUMN: &str = "annotation";

/// A panel in canonical layout: antigen columns in import order, rows with
/// stable indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelTable {
    pub antigens: Vec<String>,
    #[serde(default)]
    pub has_donor_label: bool,
    #[serde(default)]
    pub has_annotation: bool,
    pub rows: Vec<PanelRow>,
}

impl PanelTable {
    /// Rebuilds a table from persisted rows. Antigen columns are collected in
    /// first-seen order.
    pub fn from_rows(rows: Vec<PanelRow>) -> Self {
        let mut antigens: Vec<String> = Vec::new();
        for row in &rows {
            for antigen in row.reactions.keys() {
                if !antigens.iter().any(|a| a == antigen) {
                    antigens.push(antigen.clone());
                }
            }
        }
        let has_donor_label = rows.iter().any(|r| r.donor_label.is_some());
        let has_annotation = rows.iter().any(|r| r.annotation.is_some());
        Self {
            antigens,
            has_donor_label,
            has_annotation,
            rows,
        }
    }

    /// Moves the listed antigen columns to the front in the given order.
    /// Unknown names are ignored; unlisted columns keep their relative order.
    pub fn with_column_order(mut self, order: &[String]) -> Self {
        let mut antigens: Vec<String> = Vec::with_capacity(self.antigens.len());
        for antigen in order.iter().chain(self.antigens.iter()) {
            if self.has_antigen(antigen) && !antigens.contains(antigen) {
                antigens.push(antigen.clone());
            }
        }
        self.antigens = antigens;
        self
    }

    pub fn has_antigen(&self, antigen: &str) -> bool {
        self.antigens.iter().any(|a| a == antigen)
    }

    pub fn row(&self, index: u32) -> Option<&PanelRow> {
        self.rows.iter().find(|r| r.index == index)
    }

    pub fn row_mut(&mut self, index: u32) -> Option<&mut PanelRow> {
        self.rows.iter_mut().find(|r| r.index == index)
    }

    pub fn negative_rows(&self) -> impl Iterator<Item = &PanelRow> {
        self.rows.iter().filter(|r| r.liss.is_negative())
    }

    pub fn reactive_rows(&self) -> impl Iterator<Item = &PanelRow> {
        self.rows.iter().filter(|r| r.liss.is_reactive())
    }

    /// Header of the canonical layout:
    /// index, subject id, donor label?, LISS, antigens, annotation?.
    pub fn columns(&self) -> Vec<String> {
        let mut cols = vec![INDEX_COLUMN.to_string(), SUBJECT_COLUMN.to_string()];
        if self.has_donor_label {
            cols.push(DONOR_COLUMN.to_string());
        }
        cols.push(LISS_COLUMN.to_string());
        cols.extend(self.antigens.iter().cloned());
        if self.has_annotation {
            cols.push(ANNOTATION_COLUMN.to_string());
        }
        cols
    }

    /// Subject key of the panel: the first non-empty subject id.
    pub fn subject_key(&self) -> Option<&str> {
        self.rows
            .iter()
            .map(|r| r.subject_id.as_str())
            .find(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
