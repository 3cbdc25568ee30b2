use std::collections::HashMap;
use std::sync::Arc;

use apiflow_core::{
    FlowConfig, FlowPlan, FlowStatus, ResolvedStep, SessionSnapshot, StepOutcome, StepResult,
};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::executor::concurrency::ConcurrencyLimits;
use crate::executor::events::Event;
use crate::executor::result::FlowError;
use crate::executor::step_runner::execute_step;
use crate::executor::types::ExecutorContext;
use crate::session::SharedSession;

pub(crate) struct Schedule<'a> {
    pub run_id: Uuid,
    pub steps: &'a [ResolvedStep],
    pub plan: &'a FlowPlan,
    pub config: &'a FlowConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    /// Every step ran or was skipped.
    Drained,
    Cancelled,
    DeadlineExceeded,
}

/// Terminal step outcomes in array order plus how the run ended.
pub(crate) struct ScheduleOutcome {
    pub outcomes: Vec<StepOutcome>,
    pub interrupted: Option<FlowStatus>,
}

/// Dispatches steps as they become eligible and collects their results.
///
/// A step is eligible once every step it references is terminal. Sequential flows only
/// ever dispatch the first pending step, and only when nothing is running; parallel flows
/// dispatch eligible steps in array order while a permit is free. Results are written to
/// the session as they arrive, so later snapshots see them.
pub(crate) async fn run_steps(
    ctx: &ExecutorContext,
    session: &SharedSession,
    schedule: Schedule<'_>,
    cancel: CancellationToken,
) -> Result<ScheduleOutcome, FlowError> {
    let Schedule {
        run_id,
        steps,
        plan,
        config,
    } = schedule;
    let n = steps.len();

    let index: HashMap<&str, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let deps: Vec<Vec<usize>> = steps
        .iter()
        .map(|s| {
            plan.step(&s.id)
                .map(|p| {
                    p.depends_on
                        .iter()
                        .filter_map(|d| index.get(d.as_str()).copied())
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let limits = ConcurrencyLimits::new(config.concurrency_limit());
    let deadline = Instant::now() + config.timeout();

    let mut outcomes: Vec<Option<StepOutcome>> = vec![None; n];
    let mut running = vec![false; n];
    let mut halted = false;
    let mut set: JoinSet<(usize, StepResult)> = JoinSet::new();

    let halt = loop {
        if !halted {
            let ready = eligible(config.parallel, &outcomes, &running, &deps);
            let mut snapshot: Option<Arc<SessionSnapshot>> = None;
            for i in ready {
                let Some(permit) = limits.try_acquire() else {
                    break;
                };
                let snapshot = match &snapshot {
                    Some(s) => s.clone(),
                    None => {
                        let s = Arc::new(session.snapshot().await);
                        snapshot = Some(s.clone());
                        s
                    }
                };

                running[i] = true;
                let step = steps[i].clone();
                ctx.events
                    .emit(Event::StepStarted {
                        run_id,
                        step_id: step.id.clone(),
                    })
                    .await;

                let http = ctx.http.clone();
                let exec_config = ctx.config.clone();
                set.spawn(async move {
                    let _permit = permit;
                    let result = execute_step(&step, &snapshot, http.as_ref(), &exec_config).await;
                    (i, result)
                });
            }
        }

        if set.is_empty() {
            break Halt::Drained;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Halt::Cancelled,
            _ = tokio::time::sleep_until(deadline) => break Halt::DeadlineExceeded,
            joined = set.join_next() => {
                let Some(joined) = joined else {
                    continue;
                };
                let (i, result) = joined.map_err(|e| FlowError::TaskJoin(e.to_string()))?;
                running[i] = false;

                let step_id = steps[i].id.clone();
                session.set_step_output(step_id.clone(), result.clone()).await;

                let outcome = StepOutcome::from_result(result);
                ctx.events.emit(completion_event(run_id, &step_id, &outcome)).await;
                if outcome.is_error() && config.stop_on_error && !halted {
                    tracing::warn!(run_id = %run_id, step = %step_id, "step failed, halting scheduling");
                    halted = true;
                }
                outcomes[i] = Some(outcome);
            }
        }
    };

    let interrupted = match halt {
        Halt::Drained => None,
        Halt::Cancelled => Some(FlowStatus::Cancelled),
        Halt::DeadlineExceeded => Some(FlowStatus::TimedOut),
    };

    if interrupted.is_some() {
        // Dropping the tasks drops their in-flight HTTP futures.
        set.shutdown().await;
        tracing::warn!(run_id = %run_id, reason = ?halt, "flow interrupted, cancelling unfinished steps");
    }

    let mut finished = Vec::with_capacity(n);
    for (i, outcome) in outcomes.into_iter().enumerate() {
        let outcome = match outcome {
            Some(o) => o,
            None => {
                let step_id = steps[i].id.clone();
                if interrupted.is_some() {
                    ctx.events.emit(Event::StepCancelled { run_id, step_id }).await;
                    StepOutcome::Cancelled
                } else {
                    ctx.events.emit(Event::StepSkipped { run_id, step_id }).await;
                    StepOutcome::Skipped
                }
            }
        };
        finished.push(outcome);
    }

    Ok(ScheduleOutcome {
        outcomes: finished,
        interrupted,
    })
}

fn eligible(
    parallel: bool,
    outcomes: &[Option<StepOutcome>],
    running: &[bool],
    deps: &[Vec<usize>],
) -> Vec<usize> {
    let pending = |i: usize| outcomes[i].is_none() && !running[i];

    if !parallel {
        if running.iter().any(|r| *r) {
            return Vec::new();
        }
        return (0..outcomes.len()).find(|&i| pending(i)).into_iter().collect();
    }

    (0..outcomes.len())
        .filter(|&i| pending(i) && deps[i].iter().all(|&d| outcomes[d].is_some()))
        .collect()
}

fn completion_event(run_id: Uuid, step_id: &str, outcome: &StepOutcome) -> Event {
    match outcome.result() {
        Some(r) if r.is_error() => {
            let (kind, message) = r
                .error
                .as_ref()
                .map(|e| (e.kind, e.message.clone()))
                .unwrap_or((apiflow_core::StepErrorKind::Network, String::new()));
            Event::StepFailed {
                run_id,
                step_id: step_id.to_string(),
                kind,
                message,
            }
        }
        Some(r) => Event::StepCompleted {
            run_id,
            step_id: step_id.to_string(),
            status: r.status,
            latency_ms: r.latency_ms,
        },
        None => Event::StepSkipped {
            run_id,
            step_id: step_id.to_string(),
        },
    }
}
