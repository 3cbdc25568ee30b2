pub mod concurrency;
pub mod events;
pub mod http;
mod orchestrator;
mod prerequisites;
mod request;
pub mod response;
mod result;
mod scheduler;
mod step_runner;
mod types;

pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use orchestrator::Orchestrator;
pub use result::{ConfigurationError, FlowError};
pub use step_runner::{execute_step, step_timeout};
pub use types::{ExecutorConfig, ExecutorContext, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_STEP_TIMEOUT};
