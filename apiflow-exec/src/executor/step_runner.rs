use std::time::Duration;

use apiflow_core::{ResolvedStep, SessionSnapshot, StepErrorKind, StepResult};
use chrono::Utc;
use tokio::time::Instant;

use crate::executor::http::{HttpClient, HttpError};
use crate::executor::request::build_request;
use crate::executor::response::decode_body;
use crate::executor::types::ExecutorConfig;

const CONFIG_TIMEOUT_KEY: &str = "timeoutMs";

/// Sends one step and records what happened. Never fails: transport problems and timeouts
/// become a [`StepResult`] with `error` set. The caller decides where the result goes.
pub async fn execute_step(
    step: &ResolvedStep,
    snapshot: &SessionSnapshot,
    http: &dyn HttpClient,
    config: &ExecutorConfig,
) -> StepResult {
    let timeout = step_timeout(step, snapshot, config);
    let timestamp = Utc::now();
    let started = Instant::now();

    let req = match build_request(step, snapshot) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(step = %step.id, error = %e, "request could not be built");
            return StepResult::failure(StepErrorKind::Network, e.to_string(), 0, timestamp);
        }
    };
    tracing::debug!(step = %step.id, method = %req.method, url = %req.url, "sending request");

    // The outer timeout also bounds clients that ignore the one they are given.
    let sent = tokio::time::timeout(timeout, http.send(req, timeout, config.max_response_bytes)).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match sent {
        Err(_) | Ok(Err(HttpError::Timeout)) => StepResult::failure(
            StepErrorKind::Timeout,
            format!("no response within {} ms", timeout.as_millis()),
            latency_ms,
            timestamp,
        ),
        Ok(Err(e)) => StepResult::failure(StepErrorKind::Network, e.to_string(), latency_ms, timestamp),
        Ok(Ok(resp)) => {
            let body = decode_body(&resp.headers, &resp.body);
            StepResult::response(resp.status, resp.headers, body, latency_ms, timestamp)
        }
    }
}

/// Step `timeoutMs`, else an integer `config.timeoutMs` in the session, else the executor default.
pub fn step_timeout(
    step: &ResolvedStep,
    snapshot: &SessionSnapshot,
    config: &ExecutorConfig,
) -> Duration {
    step.timeout_ms
        .filter(|ms| *ms > 0)
        .or_else(|| {
            snapshot
                .config
                .get(CONFIG_TIMEOUT_KEY)
                .and_then(|v| v.as_u64())
                .filter(|ms| *ms > 0)
        })
        .map(Duration::from_millis)
        .unwrap_or(config.default_step_timeout)
}
