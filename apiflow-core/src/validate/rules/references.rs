use std::collections::HashMap;

use crate::planner::{plan_steps, scan_steps, PlannerError};
use crate::types::{FlowConfig, Step};
use crate::validate::validator::Validator;

/// Self-references, cycles and (for sequential flows) references to later steps.
pub(crate) fn validate_references(v: &mut Validator, steps: &[Step], cfg: &FlowConfig) {
    let index: HashMap<&str, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let scan = scan_steps(steps);

    for (idx, s) in steps.iter().enumerate() {
        let spath = format!("$.steps[{idx}]");
        if scan.self_references.contains(&s.id) {
            v.push(spath.as_str(), "must not reference its own output");
        }
        if cfg.parallel {
            continue;
        }
        let Some(deps) = scan.step_dependencies.get(&s.id) else {
            continue;
        };
        for dep in deps {
            if index.get(dep.as_str()).is_some_and(|&j| j > idx) {
                v.push(
                    spath.as_str(),
                    format!("references step `{dep}` which runs later in a sequential flow"),
                );
            }
        }
    }

    if let Err(PlannerError::Cycle { steps: involved }) = plan_steps(steps) {
        v.push(
            "$.steps",
            format!("dependency cycle between steps: {}", involved.join(", ")),
        );
    }
}
