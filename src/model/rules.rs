use serde::{Deserialize, Serialize};

/// Version tag of the exclusion/classification rule table, stamped into every
/// snapshot so stored results can be told apart from later rule revisions.
pub const RULE_VERSION: &str = "zygosity-v1";

/// Policy switch chosen per analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Zygosity rule engine followed by the positive-count classifier.
    #[default]
    Automatic,
    /// Rule engine bypassed; every antigen stays under consideration.
    Manual,
}

impl AnalysisMode {
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::Automatic => "automatic",
            AnalysisMode::Manual => "manual",
        }
    }
}
