use apiflow_core::{PlannerError, ResolveError, ValidationError};
use uuid::Uuid;

/// Why a flow run was refused or could not finish. Step-level network failures and
/// timeouts are never errors here; they are recorded in the `FlowResult`.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("task join error: {0}")]
    TaskJoin(String),
}

/// Missing or inconsistent session prerequisites, detected before any step is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("session {0} is closed")]
    SessionClosed(Uuid),
    #[error("flow references {{{{env.*}}}} but no environment is configured for the session")]
    MissingEnvironment,
    #[error("step `{step_id}` references unknown endpoint `{endpoint}`")]
    UnknownEndpoint { step_id: String, endpoint: String },
    #[error("step `{step_id}` cannot be resolved: {error}")]
    InvalidStep {
        step_id: String,
        #[source]
        error: ResolveError,
    },
    #[error("missing required flow inputs: {}", .0.join(", "))]
    MissingInputs(Vec<String>),
    #[error("invalid value for flow input `{name}`: {message}")]
    InvalidInput { name: String, message: String },
}
