use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a flow document without sending any request.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the step dependency graph of a flow.
    Plan {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Execute a flow against live endpoints.
    Run {
        path: PathBuf,
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        flow_config: FlowConfigArgs,
        #[command(flatten)]
        http: HttpArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
