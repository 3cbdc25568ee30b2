use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::{Flow, FlowConfig, ResolvedStep};

use super::rules;

pub(crate) static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid"));

pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_flow(&mut self, flow: &Flow, config: &FlowConfig) {
        rules::flow::validate_flow(self, flow, config);
    }

    pub fn validate_resolved_steps(&mut self, steps: &[ResolvedStep]) {
        for (i, step) in steps.iter().enumerate() {
            rules::step::validate_resolved_step(self, step, &format!("$.steps[{i}]"));
        }
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn check_range(&mut self, path: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(path, format!("must be between {min} and {max} (got {value})"));
        }
    }
}
