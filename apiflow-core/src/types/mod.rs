mod common;
mod endpoint;
mod flow;
mod result;
mod step;

pub use common::{AnyValue, ConfigValue};
pub use endpoint::Endpoint;
pub use flow::{Flow, FlowConfig, FlowInput, InputType};
pub use result::{
    FlowResult, FlowStatus, FlowSummary, StepError, StepErrorKind, StepOutcome, StepReport,
    StepResult, NO_STATUS,
};
pub use step::{HttpMethod, ResolvedStep, Step, StepTemplates};
