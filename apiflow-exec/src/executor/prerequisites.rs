use std::collections::BTreeMap;

use apiflow_core::{Flow, FlowPlan, SessionState};

use crate::executor::result::ConfigurationError;

pub(crate) fn check_session(state: &SessionState, plan: &FlowPlan) -> Result<(), ConfigurationError> {
    if state.is_closed() {
        return Err(ConfigurationError::SessionClosed(state.session_id()));
    }
    if plan.references_env() && state.environment().is_empty() {
        return Err(ConfigurationError::MissingEnvironment);
    }
    Ok(())
}

/// Checks supplied inputs against the flow's declarations and returns the defaults that must
/// be merged into the `input` scope.
pub(crate) fn prepare_inputs(
    flow: &Flow,
    supplied: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let mut defaults = BTreeMap::new();
    let mut missing = Vec::new();

    for input in &flow.inputs {
        let value = match supplied.get(&input.name) {
            Some(v) => v.clone(),
            None => match input.default_value() {
                Some(d) => {
                    defaults.insert(input.name.clone(), d.clone());
                    d
                }
                None => {
                    if input.required {
                        missing.push(input.name.clone());
                    }
                    continue;
                }
            },
        };
        input
            .check_value(&value)
            .map_err(|message| ConfigurationError::InvalidInput {
                name: input.name.clone(),
                message,
            })?;
    }

    if !missing.is_empty() {
        return Err(ConfigurationError::MissingInputs(missing));
    }
    Ok(defaults)
}
