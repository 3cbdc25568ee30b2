use apiflow_core::{FlowStatus, StepErrorKind};
use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    FlowStarted {
        run_id: Uuid,
        flow_name: String,
        step_count: usize,
    },
    FlowFinished {
        run_id: Uuid,
        status: FlowStatus,
        duration_ms: u64,
    },
    StepStarted {
        run_id: Uuid,
        step_id: String,
    },
    /// A response was received, whatever its HTTP status.
    StepCompleted {
        run_id: Uuid,
        step_id: String,
        status: u16,
        latency_ms: u64,
    },
    StepFailed {
        run_id: Uuid,
        step_id: String,
        kind: StepErrorKind,
        message: String,
    },
    StepSkipped {
        run_id: Uuid,
        step_id: String,
    },
    StepCancelled {
        run_id: Uuid,
        step_id: String,
    },
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::FlowStarted { .. } => "flow.started",
            Event::FlowFinished { .. } => "flow.finished",
            Event::StepStarted { .. } => "step.started",
            Event::StepCompleted { .. } => "step.completed",
            Event::StepFailed { .. } => "step.failed",
            Event::StepSkipped { .. } => "step.skipped",
            Event::StepCancelled { .. } => "step.cancelled",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let ty = self.event_type();
        match self {
            Event::FlowStarted {
                run_id,
                flow_name,
                step_count,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "flow_name": flow_name, "step_count": step_count })
            }
            Event::FlowFinished {
                run_id,
                status,
                duration_ms,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "status": status.as_str(), "duration_ms": duration_ms })
            }
            Event::StepStarted { run_id, step_id }
            | Event::StepSkipped { run_id, step_id }
            | Event::StepCancelled { run_id, step_id } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "step_id": step_id })
            }
            Event::StepCompleted {
                run_id,
                step_id,
                status,
                latency_ms,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "step_id": step_id, "status": status, "latency_ms": latency_ms })
            }
            Event::StepFailed {
                run_id,
                step_id,
                kind,
                message,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "step_id": step_id, "kind": kind.as_str(), "message": message })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// JSON lines on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing`; failures are logged at `warn`.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::FlowStarted {
                run_id,
                flow_name,
                step_count,
            } => {
                tracing::info!(run_id = %run_id, flow = %flow_name, steps = step_count, "flow started");
            }
            Event::FlowFinished {
                run_id,
                status,
                duration_ms,
            } => {
                tracing::info!(run_id = %run_id, status = %status, duration_ms, "flow finished");
            }
            Event::StepStarted { run_id, step_id } => {
                tracing::debug!(run_id = %run_id, step = %step_id, "step started");
            }
            Event::StepCompleted {
                run_id,
                step_id,
                status,
                latency_ms,
            } => {
                tracing::info!(run_id = %run_id, step = %step_id, status, latency_ms, "step completed");
            }
            Event::StepFailed {
                run_id,
                step_id,
                kind,
                message,
            } => {
                tracing::warn!(run_id = %run_id, step = %step_id, kind = %kind, error = %message, "step failed");
            }
            Event::StepSkipped { run_id, step_id } => {
                tracing::info!(run_id = %run_id, step = %step_id, "step skipped");
            }
            Event::StepCancelled { run_id, step_id } => {
                tracing::warn!(run_id = %run_id, step = %step_id, "step cancelled");
            }
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
