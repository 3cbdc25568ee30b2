use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use apiflow_core::{
    parse_document_str, parse_flow_str, ConfigValue, DocumentFormat, Endpoint, FlowConfig,
    ParseError, ParsedFlow, SessionState, ValidationError,
};
use apiflow_exec::{EndpointRegistry, ExecutorConfig};

use crate::exit_codes;
use crate::output::{print_error, print_violations};
use crate::{FlowConfigArgs, HttpArgs, OutputArgs, SessionArgs};

fn read_file(path: &Path, output: &OutputArgs) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })
}

/// Reads and parses a flow document; the error is the exit code to return.
pub fn read_flow(path: &Path, output: &OutputArgs) -> Result<ParsedFlow, i32> {
    let content = read_file(path, output)?;
    parse_flow_str(&content, DocumentFormat::Auto).map_err(|e| {
        let message = match e {
            ParseError::Json(e) => format!("JSON parse failed: {e}"),
            ParseError::Yaml(e) => format!("YAML parse failed: {e}"),
            ParseError::UnknownFormat => "input is neither valid JSON nor valid YAML".to_string(),
        };
        print_error(output.format, output.quiet, &message);
        exit_codes::VALIDATION_FAILED
    })
}

pub fn report_violations(err: &ValidationError, output: &OutputArgs) -> i32 {
    let lines: Vec<String> = err.violations.iter().map(|v| v.to_string()).collect();
    print_violations(output.format, output.quiet, &lines);
    exit_codes::VALIDATION_FAILED
}

/// A JSON or YAML map of scalars. Non-string scalars keep their JSON spelling.
fn load_string_map(
    path: &Path,
    what: &str,
    output: &OutputArgs,
) -> Result<BTreeMap<String, String>, i32> {
    let content = read_file(path, output)?;
    let parsed =
        parse_document_str::<BTreeMap<String, serde_json::Value>>(&content, DocumentFormat::Auto)
            .map_err(|e| {
                print_error(
                    output.format,
                    output.quiet,
                    &format!("invalid {what} file {}: {e}", path.display()),
                );
                exit_codes::RUNTIME_ERROR
            })?;

    Ok(parsed
        .document
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (k, v)
        })
        .collect())
}

fn parse_pairs(
    pairs: &[String],
    flag: &str,
    output: &OutputArgs,
) -> Result<Vec<(String, String)>, i32> {
    pairs
        .iter()
        .map(|s| match s.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => {
                print_error(
                    output.format,
                    output.quiet,
                    &format!("{flag} expects KEY=VALUE, got `{s}`"),
                );
                Err(exit_codes::RUNTIME_ERROR)
            }
        })
        .collect()
}

/// Seeds a fresh session from files first, then from individual flags.
pub fn build_session(args: &SessionArgs, output: &OutputArgs) -> Result<SessionState, i32> {
    let mut state = SessionState::new();

    if let Some(path) = &args.env_file {
        state.set_environment(load_string_map(path, "environment", output)?);
    }
    state.set_environment(parse_pairs(&args.env_vars, "--env-var", output)?);

    if let Some(path) = &args.inputs_file {
        state.set_flow_inputs(load_string_map(path, "inputs", output)?);
    }
    state.set_flow_inputs(parse_pairs(&args.set_inputs, "--set", output)?);

    for (k, v) in parse_pairs(&args.runtime_vars, "--runtime", output)? {
        state.set_runtime_var(k, v);
    }
    state.set_config(
        parse_pairs(&args.config, "--config", output)?
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::parse_lossy(&v))),
    );

    Ok(state)
}

pub fn load_endpoints(path: Option<&Path>, output: &OutputArgs) -> Result<EndpointRegistry, i32> {
    let Some(path) = path else {
        return Ok(EndpointRegistry::new());
    };
    let content = read_file(path, output)?;
    let parsed = parse_document_str::<Vec<Endpoint>>(&content, DocumentFormat::Auto).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("invalid endpoints file {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })?;
    Ok(EndpointRegistry::from_endpoints(parsed.document))
}

/// The flow's own `config` block with command-line overrides applied.
pub fn apply_flow_config(base: &FlowConfig, args: &FlowConfigArgs) -> FlowConfig {
    let mut cfg = base.clone();
    if args.parallel {
        cfg.parallel = true;
    }
    if args.sequential {
        cfg.parallel = false;
    }
    if let Some(n) = args.max_concurrency {
        cfg.max_concurrency = n;
    }
    if let Some(ms) = args.timeout {
        cfg.timeout_ms = ms;
    }
    if args.continue_on_error {
        cfg.stop_on_error = false;
    }
    cfg
}

pub fn build_executor_config(http: &HttpArgs) -> ExecutorConfig {
    ExecutorConfig {
        default_step_timeout: Duration::from_millis(http.step_timeout.max(1)),
        max_response_bytes: http.max_response_bytes,
        follow_redirects: http.follow_redirects,
        ..Default::default()
    }
}
