use std::collections::BTreeMap;

use uuid::Uuid;

use crate::types::{ConfigValue, StepResult};

/// Immutable copy of every scope of a session, taken at one instant.
///
/// Interpolation always reads from a snapshot so a step never observes a partial write.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub flow_inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub step_outputs: BTreeMap<String, StepResult>,
    #[serde(default)]
    pub runtime_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub config: BTreeMap<String, ConfigValue>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.environment.is_empty()
            && self.flow_inputs.is_empty()
            && self.step_outputs.is_empty()
            && self.runtime_vars.is_empty()
            && self.config.is_empty()
    }
}
