#![forbid(unsafe_code)]

//! Runtime engine for executing apiflow flows.
//!
//! The flow model, interpolation and validation live in `apiflow-core`; this crate adds the
//! HTTP transport, the shared session handle and the orchestrator that schedules steps.

pub mod endpoints;
pub mod executor;
pub mod session;

pub use crate::endpoints::EndpointRegistry;
pub use crate::executor::{
    execute_step, CompositeEventSink, ConfigurationError, Event, EventSink, ExecutorConfig,
    ExecutorContext, FlowError, HttpClient, HttpError, HttpRequest, HttpResponse,
    NoOpEventSink, Orchestrator, ReqwestHttpClient, StdoutEventSink, TracingEventSink,
};
pub use crate::session::{SessionManager, SharedSession};
