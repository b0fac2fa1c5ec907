use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::panel::{LissGrade, PanelTable};
use crate::model::rules::{AnalysisMode, RULE_VERSION};
use crate::model::selection::SelectionSet;
use crate::model::snapshot::AnalysisSnapshot;
use crate::model::status::StatusMap;
use crate::panels::AntigenCatalog;
use crate::pipeline::analyze;
use crate::pipeline::stage1_normalize::set_grade;
use crate::pipeline::stage4_select::{SelectionError, SelectionOp, apply_selection_op, initial_selection};

/// Review session stages. `Landing` sits before the first numbered stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Landing,
    Import,
    Grading,
    Review,
    Finalize,
    Report,
}

impl Stage {
    pub const NUMBERED: [Stage; 5] = [
        Stage::Import,
        Stage::Grading,
        Stage::Review,
        Stage::Finalize,
        Stage::Report,
    ];

    /// -1 for `Landing`, 0..=4 for the numbered stages.
    pub fn number(self) -> i8 {
        match self {
            Stage::Landing => -1,
            Stage::Import => 0,
            Stage::Grading => 1,
            Stage::Review => 2,
            Stage::Finalize => 3,
            Stage::Report => 4,
        }
    }

    pub fn from_number(n: i8) -> Option<Stage> {
        match n {
            -1 => Some(Stage::Landing),
            0..=4 => Some(Self::NUMBERED[n as usize]),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Stage> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<Stage> {
        Self::from_number(self.number() - 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Landing => "landing",
            Stage::Import => "import",
            Stage::Grading => "grading",
            Stage::Review => "review",
            Stage::Finalize => "finalize",
            Stage::Report => "report",
        }
    }

    fn slot(self) -> Option<usize> {
        usize::try_from(self.number()).ok()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move from {from} to {to}: {reason}")]
    StaleStageAdvance {
        from: Stage,
        to: Stage,
        reason: &'static str,
    },
    #[error("{request} is not available in stage {stage}")]
    WrongStage { request: &'static str, stage: Stage },
    #[error("no panel row with index {0}")]
    UnknownRow(u32),
    #[error("session is incomplete: {0}")]
    Incomplete(&'static str),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Output of the grading stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grading {
    pub status_map: StatusMap,
    pub exclusion_reasons: BTreeMap<String, String>,
    pub system_excluded: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub enum Request {
    Start,
    LoadPanel {
        panel: PanelTable,
        lot_number: Option<String>,
    },
    SetMode(AnalysisMode),
    SetLot(Option<String>),
    SetGrade { index: u32, grade: LissGrade },
    Grade,
    Select(SelectionOp),
    Advance,
    Retreat,
    JumpTo(Stage),
    Restart,
    Resume(AnalysisSnapshot),
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Request::Start => "start",
            Request::LoadPanel { .. } => "load_panel",
            Request::SetMode(_) => "set_mode",
            Request::SetLot(_) => "set_lot",
            Request::SetGrade { .. } => "set_grade",
            Request::Grade => "grade",
            Request::Select(_) => "select",
            Request::Advance => "advance",
            Request::Retreat => "retreat",
            Request::JumpTo(_) => "jump_to",
            Request::Restart => "restart",
            Request::Resume(_) => "resume",
        }
    }
}

/// The whole working state of a review session. Every transition consumes a
/// reference and returns the successor; refused transitions leave it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub stage: Stage,
    pub mode: AnalysisMode,
    pub panel: Option<PanelTable>,
    pub lot_number: Option<String>,
    pub grading: Option<Grading>,
    pub selection: Option<SelectionSet>,
    /// Numbered stages the session may jump to.
    pub unlocked: [bool; 5],
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, stage: Stage) -> bool {
        stage.slot().is_some_and(|i| self.unlocked[i])
    }

    pub fn apply(
        &self,
        catalog: &AntigenCatalog,
        request: Request,
    ) -> Result<WorkflowState, TransitionError> {
        let name = request.name();
        let next = match request {
            Request::Start => self.start(),
            Request::LoadPanel { panel, lot_number } => self.load_panel(panel, lot_number),
            Request::SetMode(mode) => self.set_mode(mode),
            Request::SetLot(lot) => self.set_lot(lot),
            Request::SetGrade { index, grade } => self.set_grade(index, grade),
            Request::Grade => self.grade(catalog),
            Request::Select(op) => self.select(catalog, &op),
            Request::Advance => self.advance(),
            Request::Retreat => self.retreat(),
            Request::JumpTo(stage) => self.jump_to(stage),
            Request::Restart => Ok(WorkflowState::default()),
            Request::Resume(snapshot) => Ok(Self::resume(snapshot)),
        };
        match &next {
            Ok(state) => crate::debug!("{}: {} -> {}", name, self.stage, state.stage),
            Err(e) => crate::warn!("{} refused in stage {}: {}", name, self.stage, e),
        }
        next
    }

    fn start(&self) -> Result<WorkflowState, TransitionError> {
        if self.stage != Stage::Landing {
            return Err(self.wrong_stage("start"));
        }
        let mut next = self.clone();
        next.stage = Stage::Import;
        next.unlock(Stage::Import);
        next.unlock(Stage::Grading);
        Ok(next)
    }

    fn load_panel(
        &self,
        panel: PanelTable,
        lot_number: Option<String>,
    ) -> Result<WorkflowState, TransitionError> {
        if self.stage != Stage::Import {
            return Err(self.wrong_stage("load_panel"));
        }
        let mut next = self.clone();
        next.panel = Some(panel);
        next.lot_number = lot_number;
        next.invalidate_analysis();
        Ok(next)
    }

    fn set_mode(&self, mode: AnalysisMode) -> Result<WorkflowState, TransitionError> {
        if !matches!(self.stage, Stage::Import | Stage::Grading) {
            return Err(self.wrong_stage("set_mode"));
        }
        let mut next = self.clone();
        if next.mode != mode {
            next.mode = mode;
            next.invalidate_analysis();
        }
        Ok(next)
    }

    fn set_lot(&self, lot: Option<String>) -> Result<WorkflowState, TransitionError> {
        if self.stage == Stage::Landing {
            return Err(self.wrong_stage("set_lot"));
        }
        let mut next = self.clone();
        next.lot_number = lot.filter(|l| !l.trim().is_empty());
        Ok(next)
    }

    /// Editing a grade invalidates any previous analysis.
    fn set_grade(&self, index: u32, grade: LissGrade) -> Result<WorkflowState, TransitionError> {
        if self.stage != Stage::Grading {
            return Err(self.wrong_stage("set_grade"));
        }
        let panel = self
            .panel
            .as_ref()
            .ok_or(TransitionError::Incomplete("no panel loaded"))?;
        let edited = set_grade(panel, index, grade).ok_or(TransitionError::UnknownRow(index))?;
        let mut next = self.clone();
        next.panel = Some(edited);
        next.invalidate_analysis();
        Ok(next)
    }

    fn grade(&self, catalog: &AntigenCatalog) -> Result<WorkflowState, TransitionError> {
        if self.stage != Stage::Grading {
            return Err(self.wrong_stage("grade"));
        }
        let panel = self
            .panel
            .as_ref()
            .ok_or(TransitionError::Incomplete("no panel loaded"))?;
        let outcome = analyze(panel, catalog, self.mode);
        let selection = initial_selection(catalog, outcome.excluded());

        let mut next = self.clone();
        next.grading = Some(Grading {
            exclusion_reasons: outcome.reasons(),
            system_excluded: outcome.exclusions.excluded,
            status_map: outcome.status,
        });
        next.selection = Some(selection);
        next.lock_from(Stage::Review);
        next.unlock(Stage::Review);
        Ok(next)
    }

    fn select(
        &self,
        catalog: &AntigenCatalog,
        op: &SelectionOp,
    ) -> Result<WorkflowState, TransitionError> {
        if !matches!(self.stage, Stage::Review | Stage::Finalize) {
            return Err(self.wrong_stage("select"));
        }
        let selection = self
            .selection
            .as_ref()
            .ok_or(TransitionError::Incomplete("no grading result"))?;
        let updated = apply_selection_op(selection, catalog, op)?;
        let mut next = self.clone();
        if !updated.has_user_selection() {
            next.lock_from(Stage::Finalize);
        }
        next.selection = Some(updated);
        Ok(next)
    }

    fn advance(&self) -> Result<WorkflowState, TransitionError> {
        let to = self.stage.next().ok_or(TransitionError::StaleStageAdvance {
            from: self.stage,
            to: self.stage,
            reason: "already at the last stage",
        })?;
        self.enter(to)
    }

    fn retreat(&self) -> Result<WorkflowState, TransitionError> {
        let to = self.stage.prev().ok_or(TransitionError::StaleStageAdvance {
            from: self.stage,
            to: self.stage,
            reason: "already at the first stage",
        })?;
        if to == Stage::Landing {
            return Err(self.stale(to, "landing is only reachable by restart"));
        }
        let mut next = self.clone();
        next.stage = to;
        Ok(next)
    }

    fn jump_to(&self, to: Stage) -> Result<WorkflowState, TransitionError> {
        if to == Stage::Landing {
            return Err(self.stale(to, "landing is only reachable by restart"));
        }
        if to <= self.stage {
            let mut next = self.clone();
            next.stage = to;
            return Ok(next);
        }
        if !self.is_unlocked(to) {
            return Err(self.stale(to, "stage is locked"));
        }
        self.enter(to)
    }

    /// Forward entry into `to`, guarded by its precondition.
    fn enter(&self, to: Stage) -> Result<WorkflowState, TransitionError> {
        if let Some(reason) = self.missing_precondition(to) {
            return Err(self.stale(to, reason));
        }
        let mut next = self.clone();
        next.stage = to;
        next.unlock(to);
        Ok(next)
    }

    fn missing_precondition(&self, to: Stage) -> Option<&'static str> {
        match to {
            Stage::Landing | Stage::Import => None,
            Stage::Grading if self.panel.is_none() => Some("no validated panel"),
            Stage::Review if self.grading.is_none() => Some("no status map computed"),
            Stage::Finalize | Stage::Report
                if !self
                    .selection
                    .as_ref()
                    .is_some_and(SelectionSet::has_user_selection) =>
            {
                Some("user selection is empty")
            }
            _ => None,
        }
    }

    /// Rehydrates a stored snapshot at Finalize, or at Review when the stored
    /// user selection is empty. The stored results are used as they are;
    /// nothing is re-derived.
    fn resume(snapshot: AnalysisSnapshot) -> WorkflowState {
        let selection = snapshot.selection();
        let panel = snapshot.panel_table();
        let mut state = WorkflowState {
            stage: Stage::Finalize,
            mode: snapshot.mode,
            panel: Some(panel),
            lot_number: snapshot.lot_number,
            grading: Some(Grading {
                status_map: snapshot.status_map,
                exclusion_reasons: snapshot.exclusion_reasons,
                system_excluded: snapshot.system_excluded.into_iter().collect(),
            }),
            selection: Some(selection),
            unlocked: [true, true, true, true, false],
        };
        if !state.selection.as_ref().is_some_and(SelectionSet::has_user_selection) {
            crate::warn!("resumed snapshot has no user selection; landing at review");
            state.stage = Stage::Review;
            state.lock_from(Stage::Finalize);
        }
        state
    }

    /// Snapshot of a graded session.
    pub fn to_snapshot(&self, timestamp: DateTime<Utc>) -> Result<AnalysisSnapshot, TransitionError> {
        let panel = self
            .panel
            .as_ref()
            .ok_or(TransitionError::Incomplete("no panel loaded"))?;
        let grading = self
            .grading
            .as_ref()
            .ok_or(TransitionError::Incomplete("no grading result"))?;
        let selection = self
            .selection
            .as_ref()
            .ok_or(TransitionError::Incomplete("no selection"))?;
        Ok(AnalysisSnapshot {
            subject_key: panel.subject_key().unwrap_or_default().to_string(),
            lot_number: self.lot_number.clone(),
            timestamp,
            rule_version: Some(RULE_VERSION.to_string()),
            mode: self.mode,
            panel: panel.rows.clone(),
            panel_columns: panel.antigens.clone(),
            status_map: grading.status_map.clone(),
            exclusion_reasons: grading.exclusion_reasons.clone(),
            system_excluded: grading.system_excluded.iter().cloned().collect(),
            user_selections: selection.user_selected.iter().cloned().collect(),
        })
    }

    fn invalidate_analysis(&mut self) {
        self.grading = None;
        self.selection = None;
        self.lock_from(Stage::Review);
    }

    fn unlock(&mut self, stage: Stage) {
        if let Some(i) = stage.slot() {
            self.unlocked[i] = true;
        }
    }

    fn lock_from(&mut self, stage: Stage) {
        if let Some(i) = stage.slot() {
            for flag in &mut self.unlocked[i..] {
                *flag = false;
            }
        }
    }

    fn wrong_stage(&self, request: &'static str) -> TransitionError {
        TransitionError::WrongStage {
            request,
            stage: self.stage,
        }
    }

    fn stale(&self, to: Stage, reason: &'static str) -> TransitionError {
        TransitionError::StaleStageAdvance {
            from: self.stage,
            to,
            reason,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/workflow/mod.rs"]
mod tests;
