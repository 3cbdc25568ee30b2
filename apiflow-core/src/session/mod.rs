//! Per-session scoped variable store.
//!
//! Five scopes live side by side: `env`, `input`, step outputs, `runtime` and `config`.
//! Missing keys are never an error here; the interpolator decides what absence means.

mod snapshot;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{ConfigValue, StepResult};

pub use snapshot::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Environment,
    FlowInputs,
    StepOutputs,
    RuntimeVars,
    Config,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::FlowInputs => "input",
            Self::StepOutputs => "steps",
            Self::RuntimeVars => "runtime",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "env" | "environment" => Ok(Self::Environment),
            "input" | "inputs" => Ok(Self::FlowInputs),
            "steps" | "outputs" => Ok(Self::StepOutputs),
            "runtime" => Ok(Self::RuntimeVars),
            "config" => Ok(Self::Config),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    closed: bool,
    environment: BTreeMap<String, String>,
    flow_inputs: BTreeMap<String, String>,
    step_outputs: BTreeMap<String, StepResult>,
    runtime_vars: BTreeMap<String, String>,
    config: BTreeMap<String, ConfigValue>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(session_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            created_at: now,
            last_activity: now,
            closed: false,
            environment: BTreeMap::new(),
            flow_inputs: BTreeMap::new(),
            step_outputs: BTreeMap::new(),
            runtime_vars: BTreeMap::new(),
            config: BTreeMap::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True when nothing touched the session for longer than `max_idle` as of `now`.
    pub fn is_stale(&self, max_idle: Duration, now: DateTime<Utc>) -> bool {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return false;
        };
        now.signed_duration_since(self.last_activity) > max_idle
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn flow_inputs(&self) -> &BTreeMap<String, String> {
        &self.flow_inputs
    }

    pub fn step_outputs(&self) -> &BTreeMap<String, StepResult> {
        &self.step_outputs
    }

    pub fn step_output(&self, step_id: &str) -> Option<&StepResult> {
        self.step_outputs.get(step_id)
    }

    pub fn runtime_vars(&self) -> &BTreeMap<String, String> {
        &self.runtime_vars
    }

    pub fn config(&self) -> &BTreeMap<String, ConfigValue> {
        &self.config
    }

    // Writes on a closed session are dropped: its state has been released.

    pub fn set_environment<K, V>(&mut self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if self.closed {
            return;
        }
        merge(&mut self.environment, partial);
        self.touch();
    }

    pub fn set_flow_inputs<K, V>(&mut self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if self.closed {
            return;
        }
        merge(&mut self.flow_inputs, partial);
        self.touch();
    }

    pub fn set_runtime_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if self.closed {
            return;
        }
        self.runtime_vars.insert(key.into(), value.into());
        self.touch();
    }

    /// Records a step result, replacing the entry left by an earlier run of the same flow.
    pub fn set_step_output(&mut self, step_id: impl Into<String>, result: StepResult) {
        if self.closed {
            return;
        }
        self.step_outputs.insert(step_id.into(), result);
        self.touch();
    }

    pub fn set_config<K, V>(&mut self, partial: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<ConfigValue>,
    {
        if self.closed {
            return;
        }
        for (k, v) in partial {
            self.config.insert(k.into(), v.into());
        }
        self.touch();
    }

    /// Drops the recorded results of the given steps so a re-run starts clean for them.
    pub fn remove_step_outputs<'a>(&mut self, step_ids: impl IntoIterator<Item = &'a str>) {
        for id in step_ids {
            self.step_outputs.remove(id);
        }
        self.touch();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            environment: self.environment.clone(),
            flow_inputs: self.flow_inputs.clone(),
            step_outputs: self.step_outputs.clone(),
            runtime_vars: self.runtime_vars.clone(),
            config: self.config.clone(),
        }
    }

    pub fn clear(&mut self, scope: ScopeKind) {
        match scope {
            ScopeKind::Environment => self.environment.clear(),
            ScopeKind::FlowInputs => self.flow_inputs.clear(),
            ScopeKind::StepOutputs => self.step_outputs.clear(),
            ScopeKind::RuntimeVars => self.runtime_vars.clear(),
            ScopeKind::Config => self.config.clear(),
        }
        self.touch();
    }

    /// Empties every scope; identity and creation time are kept.
    pub fn reset(&mut self) {
        self.environment.clear();
        self.flow_inputs.clear();
        self.step_outputs.clear();
        self.runtime_vars.clear();
        self.config.clear();
        self.touch();
    }

    /// Releases all state. Nothing is persisted.
    pub fn close(&mut self) {
        self.reset();
        self.closed = true;
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

fn merge<K, V>(target: &mut BTreeMap<String, String>, partial: impl IntoIterator<Item = (K, V)>)
where
    K: Into<String>,
    V: Into<String>,
{
    for (k, v) in partial {
        target.insert(k.into(), v.into());
    }
}
