mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::{Flow, FlowConfig, ResolvedStep};
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for Flow {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_flow(self, &self.config)
    }
}

/// Checks a flow against the execution policy it will run under.
///
/// `config` is taken separately from `flow.config` because callers may override the
/// document's policy; ordering rules depend on the effective `parallel` setting.
pub fn validate_flow(flow: &Flow, config: &FlowConfig) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_flow(flow, config);
    v.finish()
}

/// Checks the url, headers and body of steps after endpoint references are merged in.
/// Paths point at the step that uses the endpoint.
pub fn validate_resolved_steps(steps: &[ResolvedStep]) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_resolved_steps(steps);
    v.finish()
}
