use std::path::Path;
use std::sync::Arc;

use apiflow_core::{FlowResult, StepOutcome};
use apiflow_exec::{
    CompositeEventSink, EventSink, ExecutorContext, FlowError, HttpClient, Orchestrator,
    ReqwestHttpClient, SharedSession, StdoutEventSink, TracingEventSink,
};
use tokio_util::sync::CancellationToken;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{FlowConfigArgs, HttpArgs, OutputArgs, SessionArgs};

use super::config::{
    apply_flow_config, build_executor_config, build_session, load_endpoints, read_flow,
    report_violations,
};

pub async fn run_cmd(
    path: &Path,
    session_args: SessionArgs,
    flow_config: FlowConfigArgs,
    http_args: HttpArgs,
    output: OutputArgs,
) -> i32 {
    let parsed = match read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let flow = parsed.document;
    let config = apply_flow_config(&flow.config, &flow_config);

    let state = match build_session(&session_args, &output) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let endpoints = match load_endpoints(http_args.endpoints_file.as_deref(), &output) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let events = match build_events(&http_args.events) {
        Some(e) => e,
        None => {
            print_error(
                output.format,
                output.quiet,
                &format!("unknown event sink: {}", http_args.events),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let exec_config = build_executor_config(&http_args);
    let http: Arc<dyn HttpClient> = match ReqwestHttpClient::new(&exec_config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let ctx = ExecutorContext::new(http)
        .with_endpoints(endpoints)
        .with_config(exec_config)
        .with_events(events);
    let orchestrator = Orchestrator::new(ctx);
    let session = SharedSession::new(state);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling flow");
            on_interrupt.cancel();
        }
    });

    let result = orchestrator
        .run_with_cancel(&flow, &config, &session, cancel)
        .await;

    match result {
        Ok(result) => {
            if output.format == OutputFormat::Text && !output.quiet {
                print_text(&result);
            } else {
                print_result(output.format, output.quiet, &result);
            }
            if result.success {
                exit_codes::SUCCESS
            } else {
                exit_codes::RUN_FAILED
            }
        }
        Err(FlowError::Validation(err)) => report_violations(&err, &output),
        Err(e @ (FlowError::Configuration(_) | FlowError::Planner(_))) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::VALIDATION_FAILED
        }
        Err(e @ FlowError::TaskJoin(_)) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn build_events(kind: &str) -> Option<Arc<dyn EventSink>> {
    let mut sinks = CompositeEventSink::new();
    sinks.add(Box::new(TracingEventSink));
    match kind {
        "none" => {}
        "stdout" => sinks.add(Box::new(StdoutEventSink)),
        _ => return None,
    }
    Some(Arc::new(sinks))
}

fn print_text(result: &FlowResult) {
    println!(
        "flow `{}`: {} ({} ms)",
        result.flow_name, result.status, result.duration_ms
    );
    for step in &result.steps {
        let detail = match &step.outcome {
            StepOutcome::Completed(r) => {
                let mut d = format!("HTTP {} in {} ms", r.status, r.latency_ms);
                if step.expected_status_met == Some(false) {
                    d.push_str(" (unexpected status)");
                }
                d
            }
            StepOutcome::Failed(r) | StepOutcome::TimedOut(r) => r
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_default(),
            StepOutcome::Skipped | StepOutcome::Cancelled => String::new(),
        };
        println!(
            "  {:<10} {} {}",
            step.outcome.as_str(),
            step.step_id,
            detail
        );
    }
    let s = &result.summary;
    println!(
        "completed: {}, failed: {}, timed out: {}, skipped: {}, cancelled: {}",
        s.completed, s.failed, s.timed_out, s.skipped, s.cancelled
    );
}
