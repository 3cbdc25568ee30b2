#![forbid(unsafe_code)]

pub mod error;
pub mod interpolate;
pub mod parser;
pub mod planner;
pub mod session;
pub mod template;
pub mod types;
pub mod validate;

pub use crate::error::{ParseError, ResolveError, ValidationError, Violation};
pub use crate::interpolate::{interpolate, interpolate_value, resolve_token};
pub use crate::parser::{
    parse_document_str, parse_flow_str, DocumentFormat, ParsedDocument, ParsedFlow,
};
pub use crate::planner::{plan_flow, plan_steps, DependencyGraph, FlowPlan, PlannedStep, PlannerError};
pub use crate::session::{ScopeKind, SessionSnapshot, SessionState};
pub use crate::template::{parse_template, Scope, Segment, Template, TemplateError, Token};
pub use crate::types::{
    AnyValue, ConfigValue, Endpoint, Flow, FlowConfig, FlowInput, FlowResult, FlowStatus, FlowSummary,
    HttpMethod, InputType, ResolvedStep, Step, StepError, StepErrorKind, StepOutcome, StepReport,
    StepResult, StepTemplates,
};
pub use crate::validate::{validate_flow, validate_resolved_steps, Validate};
