use crate::types::{HttpMethod, ResolvedStep, Step};
use crate::validate::rules::common::{
    validate_template_string, validate_url_template, validate_value_templates,
};
use crate::validate::validator::Validator;

pub(crate) const MAX_STEP_TIMEOUT_MS: i64 = 300_000;

pub(crate) fn validate_step(v: &mut Validator, step: &Step, path: &str) {
    if step.name.trim().is_empty() {
        v.push(format!("{path}.name"), "must not be empty");
    }

    match &step.endpoint {
        Some(endpoint) if endpoint.trim().is_empty() => {
            v.push(format!("{path}.endpoint"), "must not be empty");
        }
        Some(_) => {}
        None => {
            if step.method.is_none() || step.url.is_none() {
                v.push(
                    path,
                    "must reference an endpoint or provide both method and url",
                );
            }
        }
    }

    if let Some(method) = &step.method {
        if HttpMethod::parse(method).is_none() {
            let allowed = HttpMethod::ALL.map(|m| m.as_str()).join(", ");
            v.push(
                format!("{path}.method"),
                format!("unsupported HTTP method `{method}` (expected one of {allowed})"),
            );
        }
    }

    if let Some(url) = &step.url {
        validate_url_template(v, &format!("{path}.url"), url);
    }

    for (name, value) in &step.headers {
        if name.trim().is_empty() {
            v.push(format!("{path}.headers"), "header names must not be empty");
            continue;
        }
        validate_template_string(v, &format!("{path}.headers.{name}"), value);
    }

    if let Some(body) = &step.body {
        validate_value_templates(v, &format!("{path}.body"), body);
    }

    if let Some(timeout) = step.timeout_ms {
        v.check_range(&format!("{path}.timeoutMs"), timeout, 1, MAX_STEP_TIMEOUT_MS);
    }
    if let Some(status) = step.expected_status {
        v.check_range(&format!("{path}.expectedStatus"), i64::from(status), 100, 599);
    }
}

/// Checks the merged url, headers and body of a step after its endpoint is applied.
/// Templates that came from the endpoint are not covered by [`validate_step`].
pub(crate) fn validate_resolved_step(v: &mut Validator, step: &ResolvedStep, path: &str) {
    validate_url_template(v, &format!("{path}.url"), &step.url);
    for (name, value) in &step.headers {
        validate_template_string(v, &format!("{path}.headers.{name}"), value);
    }
    if let Some(body) = &step.body {
        validate_value_templates(v, &format!("{path}.body"), body);
    }
}
