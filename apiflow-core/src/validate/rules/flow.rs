use std::collections::HashSet;

use crate::template::RESERVED_SCOPES;
use crate::types::{Flow, FlowConfig};
use crate::validate::rules::{config, inputs, references, step};
use crate::validate::validator::{Validator, ID_RE};

pub(crate) fn validate_flow(v: &mut Validator, flow: &Flow, cfg: &FlowConfig) {
    if flow.name.trim().is_empty() {
        v.push("$.name", "must not be empty");
    }

    if flow.steps.is_empty() {
        v.push("$.steps", "must have at least one entry");
    }

    let mut step_ids = HashSet::<&str>::new();
    let mut ids_ok = true;
    for (idx, s) in flow.steps.iter().enumerate() {
        let spath = format!("$.steps[{idx}]");

        if s.id.trim().is_empty() {
            v.push(format!("{spath}.id"), "must not be empty");
            ids_ok = false;
        } else if !ID_RE.is_match(&s.id) {
            v.push(format!("{spath}.id"), "must match regex [A-Za-z0-9_\\-]+");
            ids_ok = false;
        } else if RESERVED_SCOPES.contains(&s.id.as_str()) {
            v.push(
                format!("{spath}.id"),
                format!("`{}` is a reserved scope name", s.id),
            );
            ids_ok = false;
        }
        if !step_ids.insert(s.id.as_str()) {
            v.push(format!("{spath}.id"), "must be unique within the flow");
            ids_ok = false;
        }

        step::validate_step(v, s, &spath);
    }

    config::validate_config(v, cfg, "$.config");
    inputs::validate_inputs(v, &flow.inputs, "$.inputs");

    // Reference ordering is only meaningful once every step has a usable, unique id.
    if ids_ok && !flow.steps.is_empty() {
        references::validate_references(v, &flow.steps, cfg);
    }
}
