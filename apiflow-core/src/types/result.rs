use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::AnyValue;

/// Status recorded when no HTTP response was received.
pub const NO_STATUS: u16 = 0;

/// Recorded outcome of one HTTP exchange.
///
/// HTTP 4xx/5xx responses are ordinary results; `error` is only set when no response was
/// obtained (transport failure or timeout), in which case `status` is [`NO_STATUS`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Decoded response body: JSON when the payload is JSON, text otherwise, `null` when empty.
    #[serde(default)]
    pub body: AnyValue,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepResult {
    pub fn response(
        status: u16,
        headers: BTreeMap<String, String>,
        body: AnyValue,
        latency_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            latency_ms,
            timestamp,
            error: None,
        }
    }

    pub fn failure(
        kind: StepErrorKind,
        message: impl Into<String>,
        latency_ms: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: NO_STATUS,
            headers: BTreeMap::new(),
            body: AnyValue::Null,
            latency_ms,
            timestamp,
            error: Some(StepError {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Header lookup ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepError {
    pub kind: StepErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepErrorKind {
    Network,
    Timeout,
}

impl StepErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for StepErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a step within one flow run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed(StepResult),
    Failed(StepResult),
    TimedOut(StepResult),
    Skipped,
    Cancelled,
}

impl StepOutcome {
    /// Classifies a finished exchange: only transport failures and timeouts count as errors.
    pub fn from_result(result: StepResult) -> Self {
        match result.error.as_ref().map(|e| e.kind) {
            None => Self::Completed(result),
            Some(StepErrorKind::Network) => Self::Failed(result),
            Some(StepErrorKind::Timeout) => Self::TimedOut(result),
        }
    }

    pub fn result(&self) -> Option<&StepResult> {
        match self {
            Self::Completed(r) | Self::Failed(r) | Self::TimedOut(r) => Some(r),
            Self::Skipped | Self::Cancelled => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::TimedOut(_) => "timed_out",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step_id: String,
    pub name: String,
    pub outcome: StepOutcome,
    /// `Some` when the step declares `expectedStatus` and produced a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status_met: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub completed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

impl FlowSummary {
    pub fn from_reports(reports: &[StepReport]) -> Self {
        let mut summary = Self::default();
        for r in reports {
            match r.outcome {
                StepOutcome::Completed(_) => summary.completed += 1,
                StepOutcome::Failed(_) => summary.failed += 1,
                StepOutcome::TimedOut(_) => summary.timed_out += 1,
                StepOutcome::Skipped => summary.skipped += 1,
                StepOutcome::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }
}

/// Ordered per-step outcomes of one flow run plus overall timing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub run_id: Uuid,
    pub flow_name: String,
    pub status: FlowStatus,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    pub summary: FlowSummary,
}

impl FlowResult {
    pub fn step(&self, step_id: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn outcome_states(&self) -> Vec<(&str, &'static str)> {
        self.steps
            .iter()
            .map(|s| (s.step_id.as_str(), s.outcome.as_str()))
            .collect()
    }
}
