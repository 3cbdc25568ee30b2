//! Static dependency planning: which steps of a flow reference which others.

mod dependency;
mod model;
mod scan;

use crate::types::{Flow, StepTemplates};

pub use model::{DependencyGraph, FlowPlan, PlannedStep};

pub(crate) use scan::scan_steps;

pub fn plan_flow(flow: &Flow) -> Result<FlowPlan, PlannerError> {
    plan_steps(&flow.steps)
}

/// Plans any list of steps; the orchestrator plans resolved steps so that templates
/// inherited from endpoints count as references too.
pub fn plan_steps<S: StepTemplates>(steps: &[S]) -> Result<FlowPlan, PlannerError> {
    let order: Vec<&str> = steps.iter().map(|s| s.step_id()).collect();
    for (i, id) in order.iter().enumerate() {
        if order[..i].contains(id) {
            return Err(PlannerError::DuplicateStepId((*id).to_string()));
        }
    }

    let scan = scan_steps(steps);
    let graph = dependency::build_step_dependency_graph(&order, &scan.step_dependencies)?;

    let steps = order
        .iter()
        .enumerate()
        .map(|(index, id)| PlannedStep {
            step_id: (*id).to_string(),
            index,
            depends_on: graph.depends_on.get(*id).cloned().unwrap_or_default(),
            referenced_inputs: scan
                .referenced_inputs_by_step
                .get(*id)
                .cloned()
                .unwrap_or_default(),
            referenced_env: scan
                .referenced_env_by_step
                .get(*id)
                .cloned()
                .unwrap_or_default(),
            external_steps: scan
                .external_steps_by_step
                .get(*id)
                .cloned()
                .unwrap_or_default(),
        })
        .collect();

    Ok(FlowPlan { steps, graph })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("cycle detected in step dependency graph (involving: {})", steps.join(", "))]
    Cycle { steps: Vec<String> },

    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Step;

    fn step(id: &str, url: &str) -> Step {
        Step {
            id: id.to_string(),
            name: id.to_uppercase(),
            endpoint: None,
            method: Some("GET".to_string()),
            url: Some(url.to_string()),
            headers: Default::default(),
            body: None,
            timeout_ms: None,
            expected_status: None,
        }
    }

    #[test]
    fn self_reference_is_not_an_edge() {
        let steps = vec![step("a", "https://x.test/{{a.body.id}}")];
        let plan = plan_steps(&steps).unwrap();
        assert!(plan.steps[0].depends_on.is_empty());
        assert!(scan_steps(&steps).self_references.contains("a"));
    }

    #[test]
    fn unknown_step_scopes_are_external() {
        let steps = vec![step("a", "https://x.test/{{old.body.id}}")];
        let plan = plan_steps(&steps).unwrap();
        assert!(plan.steps[0].external_steps.contains("old"));
        assert!(plan.graph.depends_on["a"].is_empty());
    }
}
