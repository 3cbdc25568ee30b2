use crate::types::FlowConfig;
use crate::validate::validator::Validator;

pub(crate) const MAX_FLOW_TIMEOUT_MS: i64 = 3_600_000;
pub(crate) const MAX_CONCURRENCY: i64 = 20;

pub(crate) fn validate_config(v: &mut Validator, cfg: &FlowConfig, path: &str) {
    v.check_range(&format!("{path}.timeoutMs"), cfg.timeout_ms, 1, MAX_FLOW_TIMEOUT_MS);
    v.check_range(
        &format!("{path}.maxConcurrency"),
        cfg.max_concurrency,
        1,
        MAX_CONCURRENCY,
    );
}
