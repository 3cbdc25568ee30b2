use std::collections::{BTreeMap, BTreeSet};

use crate::template::{parse_template, Scope};
use crate::types::StepTemplates;

#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    /// Step ids of this flow each step references, self-references excluded.
    pub step_dependencies: BTreeMap<String, BTreeSet<String>>,
    pub self_references: BTreeSet<String>,
    /// Step-scope tokens naming a step outside this flow (may resolve from an earlier run).
    pub external_steps_by_step: BTreeMap<String, BTreeSet<String>>,
    pub referenced_inputs_by_step: BTreeMap<String, BTreeSet<String>>,
    pub referenced_env_by_step: BTreeMap<String, BTreeSet<String>>,
}

/// Static token scan: finds references without resolving anything.
pub(crate) fn scan_steps<S: StepTemplates>(steps: &[S]) -> ScanResult {
    let ids: BTreeSet<&str> = steps.iter().map(|s| s.step_id()).collect();
    let mut out = ScanResult::default();

    for step in steps {
        let id = step.step_id();
        let mut deps = BTreeSet::new();
        let mut external = BTreeSet::new();
        let mut inputs = BTreeSet::new();
        let mut env = BTreeSet::new();

        for s in step.templates() {
            let tpl = parse_template(s);
            for token in tpl.tokens() {
                match &token.scope {
                    Scope::Step(target) if target == id => {
                        out.self_references.insert(id.to_string());
                    }
                    Scope::Step(target) if ids.contains(target.as_str()) => {
                        deps.insert(target.clone());
                    }
                    Scope::Step(target) => {
                        external.insert(target.clone());
                    }
                    Scope::Input => {
                        inputs.insert(token.path_string());
                    }
                    Scope::Env => {
                        env.insert(token.path_string());
                    }
                    Scope::Runtime | Scope::Config => {}
                }
            }
        }

        out.step_dependencies.insert(id.to_string(), deps);
        out.external_steps_by_step.insert(id.to_string(), external);
        out.referenced_inputs_by_step.insert(id.to_string(), inputs);
        out.referenced_env_by_step.insert(id.to_string(), env);
    }
    out
}
