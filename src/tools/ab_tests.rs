//! A/B test suggestions for a checkout flow.

use crate::agent::{ParamType, ToolSpec};
use crate::error::ToolFailure;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct AbTestArgs {
    pub goal: String,
    pub current_flow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbTest {
    pub hypothesis: String,
    pub variant_a: String,
    pub variant_b: String,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbTestPlan {
    pub goal: String,
    pub tests: Vec<AbTest>,
}

pub fn spec() -> ToolSpec {
    ToolSpec::new("suggest_ab_tests", "Generate A/B test ideas")
        .required("goal", ParamType::String)
        .required("current_flow", ParamType::String)
}

fn ab_test(hypothesis: &str, variant_a: &str, variant_b: &str, metric: &str) -> AbTest {
    AbTest {
        hypothesis: hypothesis.to_string(),
        variant_a: variant_a.to_string(),
        variant_b: variant_b.to_string(),
        metric: metric.to_string(),
    }
}

pub fn suggest_ab_tests(args: AbTestArgs) -> Result<AbTestPlan, ToolFailure> {
    debug!("Suggesting A/B tests for flow: {}", args.current_flow);

    Ok(AbTestPlan {
        goal: args.goal,
        tests: vec![
            ab_test(
                "Clear CTA reduces hesitation",
                "CTA: Pokračovať",
                "CTA: Pokračovať k platbe (30s)",
                "Checkout completion rate",
            ),
            ab_test(
                "Progress indicator reduces drop-off",
                "No progress",
                "3-step progress bar",
                "Step-to-step conversion",
            ),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_echoes_goal() {
        let plan = suggest_ab_tests(AbTestArgs {
            goal: "Reduce checkout drop-off".to_string(),
            current_flow: "cart > delivery > payment".to_string(),
        })
        .unwrap();
        assert_eq!(plan.goal, "Reduce checkout drop-off");
        assert_eq!(plan.tests.len(), 2);
        assert_eq!(plan.tests[1].metric, "Step-to-step conversion");
    }
}
