use std::time::Duration;

use regex::Regex;

use crate::types::{AnyValue, Step};

pub const DEFAULT_FLOW_TIMEOUT_MS: i64 = 300_000;
pub const DEFAULT_MAX_CONCURRENCY: i64 = 5;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub steps: Vec<Step>,

    #[serde(default)]
    pub config: FlowConfig,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<FlowInput>,
}

impl Flow {
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// Execution policy for one flow invocation.
///
/// Numeric fields are signed so that out-of-range values reach the validator instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowConfig {
    #[serde(default = "default_flow_timeout_ms")]
    pub timeout_ms: i64,

    #[serde(default = "default_true")]
    pub stop_on_error: bool,

    #[serde(default)]
    pub parallel: bool,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: i64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FLOW_TIMEOUT_MS,
            stop_on_error: true,
            parallel: false,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl FlowConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.timeout_ms).unwrap_or(0))
    }

    /// Number of steps allowed in flight at once; always 1 for sequential flows.
    pub fn concurrency_limit(&self) -> usize {
        if !self.parallel {
            return 1;
        }
        usize::try_from(self.max_concurrency.clamp(1, 20)).unwrap_or(1)
    }
}

fn default_flow_timeout_ms() -> i64 {
    DEFAULT_FLOW_TIMEOUT_MS
}

fn default_max_concurrency() -> i64 {
    DEFAULT_MAX_CONCURRENCY
}

fn default_true() -> bool {
    true
}

/// Declaration of a caller-supplied value that populates the session `input` scope.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInput {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: InputType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FlowInput {
    /// The declared default rendered as the string stored in the `input` scope.
    /// Only scalar defaults have a string form.
    pub fn default_value(&self) -> Option<String> {
        match self.default.as_ref()? {
            AnyValue::String(s) => Some(s.clone()),
            AnyValue::Bool(b) => Some(b.to_string()),
            AnyValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Checks a supplied value against the declared type and pattern.
    pub fn check_value(&self, value: &str) -> Result<(), String> {
        if !self.kind.accepts(value) {
            return Err(format!("expected a {} value, got `{value}`", self.kind.as_str()));
        }
        if let Some(pattern) = &self.pattern {
            let re = Regex::new(pattern).map_err(|e| format!("invalid pattern: {e}"))?;
            if !re.is_match(value) {
                return Err(format!("`{value}` does not match pattern {pattern}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    String,
    Number,
    Boolean,
}

impl InputType {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String => true,
            Self::Number => value.trim().parse::<f64>().is_ok_and(f64::is_finite),
            Self::Boolean => matches!(value.trim(), "true" | "false"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}
