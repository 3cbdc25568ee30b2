use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Values seeded into the session before the flow runs.
#[derive(Debug, Args, Clone, Default)]
pub struct SessionArgs {
    /// JSON or YAML map loaded into the `env` scope.
    #[arg(long = "env", value_name = "FILE")]
    pub env_file: Option<PathBuf>,
    /// JSON or YAML map loaded into the `input` scope.
    #[arg(long = "inputs", value_name = "FILE")]
    pub inputs_file: Option<PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_inputs: Vec<String>,
    #[arg(long = "env-var", value_name = "KEY=VALUE")]
    pub env_vars: Vec<String>,
    #[arg(long = "runtime", value_name = "KEY=VALUE")]
    pub runtime_vars: Vec<String>,
    #[arg(long = "config", value_name = "KEY=VALUE")]
    pub config: Vec<String>,
}

/// Overrides for the flow's `config` block.
#[derive(Debug, Args, Clone, Default)]
pub struct FlowConfigArgs {
    #[arg(long, conflicts_with = "sequential")]
    pub parallel: bool,
    #[arg(long)]
    pub sequential: bool,
    #[arg(long)]
    pub max_concurrency: Option<i64>,
    /// Overall flow timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout: Option<i64>,
    #[arg(long)]
    pub continue_on_error: bool,
}

#[derive(Debug, Args, Clone)]
pub struct HttpArgs {
    /// Timeout for steps that set none themselves, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 30_000)]
    pub step_timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    #[arg(long)]
    pub follow_redirects: bool,
    /// JSON or YAML list of saved endpoints steps may reference.
    #[arg(long = "endpoints", value_name = "FILE")]
    pub endpoints_file: Option<PathBuf>,
    /// Where run events go: `none` or `stdout` (JSON lines). Events are always logged.
    #[arg(long, default_value = "none")]
    pub events: String,
}
