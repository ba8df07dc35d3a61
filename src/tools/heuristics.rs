//! Keyword-based scoring against Nielsen's usability heuristics.

use crate::agent::{ParamType, ToolSpec};
use crate::error::ToolFailure;
use serde::{Deserialize, Serialize};

/// Highest severity a heuristic can receive.
pub const MAX_SEVERITY: u8 = 5;

const HEURISTIC_CUES: &[(&str, &[&str])] = &[
    ("Visibility of system status", &["loading", "feedback", "waiting"]),
    ("User control and freedom", &["back", "undo", "cancel"]),
    ("Error prevention", &["error", "mistake", "wrong"]),
    ("Consistency", &["confusing", "inconsistent"]),
];

#[derive(Debug, Deserialize)]
pub struct HeuristicsArgs {
    pub problem_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeuristicScore {
    pub heuristic: String,
    pub severity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeuristicsReport {
    pub summary: String,
    pub heuristics: Vec<HeuristicScore>,
}

pub fn spec() -> ToolSpec {
    ToolSpec::new(
        "score_usability_heuristics",
        "Score UX problem using heuristics",
    )
    .required("problem_description", ParamType::String)
}

/// Every heuristic starts at 1 and gains a point per matching cue.
/// Results are sorted by severity, highest first, ties in declaration order.
pub fn score_usability_heuristics(args: HeuristicsArgs) -> Result<HeuristicsReport, ToolFailure> {
    let text = args.problem_description.to_lowercase();

    let mut heuristics: Vec<HeuristicScore> = HEURISTIC_CUES
        .iter()
        .map(|(heuristic, cues)| {
            let hits = cues.iter().filter(|cue| text.contains(*cue)).count();
            let severity = (hits + 1).min(MAX_SEVERITY as usize) as u8;
            HeuristicScore {
                heuristic: heuristic.to_string(),
                severity,
            }
        })
        .collect();

    heuristics.sort_by(|a, b| b.severity.cmp(&a.severity));

    Ok(HeuristicsReport {
        summary: "Higher score = bigger UX risk".to_string(),
        heuristics,
    })
}
