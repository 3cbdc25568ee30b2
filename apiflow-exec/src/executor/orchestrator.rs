use apiflow_core::{
    plan_steps, validate_flow, validate_resolved_steps, Flow, FlowConfig, FlowResult, FlowStatus,
    FlowSummary, StepOutcome, StepReport,
};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::executor::events::Event;
use crate::executor::prerequisites::{check_session, prepare_inputs};
use crate::executor::result::FlowError;
use crate::executor::scheduler::{run_steps, Schedule};
use crate::executor::types::ExecutorContext;
use crate::session::SharedSession;

pub const RUNTIME_RUN_ID: &str = "runId";
pub const RUNTIME_FLOW_NAME: &str = "flowName";

pub struct Orchestrator {
    ctx: ExecutorContext,
}

impl Orchestrator {
    pub fn new(ctx: ExecutorContext) -> Self {
        Self { ctx }
    }

    pub async fn run(
        &self,
        flow: &Flow,
        config: &FlowConfig,
        session: &SharedSession,
    ) -> Result<FlowResult, FlowError> {
        self.run_with_cancel(flow, config, session, CancellationToken::new())
            .await
    }

    /// Runs `flow` under `config` against `session`.
    ///
    /// Validation and prerequisite failures return `Err` before any request is sent.
    /// Once scheduling starts the run always produces a `FlowResult`; cancelling `cancel`
    /// or passing `config.timeoutMs` returns the partial result with unfinished steps
    /// marked cancelled.
    pub async fn run_with_cancel(
        &self,
        flow: &Flow,
        config: &FlowConfig,
        session: &SharedSession,
        cancel: CancellationToken,
    ) -> Result<FlowResult, FlowError> {
        validate_flow(flow, config)?;
        let steps = self.ctx.endpoints.resolve_steps(&flow.steps)?;
        validate_resolved_steps(&steps)?;
        let plan = plan_steps(&steps)?;

        let run_id = Uuid::new_v4();
        {
            let mut state = session.lock().await;
            check_session(&state, &plan)?;
            let defaults = prepare_inputs(flow, state.flow_inputs())?;
            state.set_flow_inputs(defaults);
            state.remove_step_outputs(steps.iter().map(|s| s.id.as_str()));
            state.set_runtime_var(RUNTIME_RUN_ID, run_id.to_string());
            state.set_runtime_var(RUNTIME_FLOW_NAME, flow.name.clone());
        }

        let started_at = Utc::now();
        let clock = tokio::time::Instant::now();
        self.ctx
            .events
            .emit(Event::FlowStarted {
                run_id,
                flow_name: flow.name.clone(),
                step_count: steps.len(),
            })
            .await;

        let scheduled = run_steps(
            &self.ctx,
            session,
            Schedule {
                run_id,
                steps: &steps,
                plan: &plan,
                config,
            },
            cancel,
        )
        .await?;

        let reports: Vec<StepReport> = steps
            .iter()
            .zip(scheduled.outcomes)
            .map(|(step, outcome)| {
                let expected_status_met = match (&outcome, step.expected_status) {
                    (StepOutcome::Completed(r), Some(expected)) => Some(r.status == expected),
                    _ => None,
                };
                StepReport {
                    step_id: step.id.clone(),
                    name: step.name.clone(),
                    outcome,
                    expected_status_met,
                }
            })
            .collect();

        let success = scheduled.interrupted.is_none()
            && reports.iter().all(|r| {
                matches!(r.outcome, StepOutcome::Completed(_)) && r.expected_status_met != Some(false)
            });
        let status = match scheduled.interrupted {
            Some(status) => status,
            None if success => FlowStatus::Succeeded,
            None => FlowStatus::Failed,
        };

        let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.ctx
            .events
            .emit(Event::FlowFinished {
                run_id,
                status,
                duration_ms,
            })
            .await;

        Ok(FlowResult {
            run_id,
            flow_name: flow.name.clone(),
            status,
            success,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
            summary: FlowSummary::from_reports(&reports),
            steps: reports,
        })
    }
}
