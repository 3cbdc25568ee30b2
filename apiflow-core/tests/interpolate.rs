use std::collections::BTreeMap;

use apiflow_core::{interpolate, SessionState, StepResult};
use chrono::Utc;
use serde_json::json;

fn response(body: serde_json::Value) -> StepResult {
    StepResult::response(200, BTreeMap::new(), body, 4, Utc::now())
}

#[test]
fn template_without_tokens_is_returned_unchanged() {
    let state = SessionState::new();
    for t in ["", "plain", "https://x.test/a?b=c", "{ not: a token }", "{{", "}}{{"] {
        assert_eq!(interpolate(t, &state.snapshot()), t);
    }
}

#[test]
fn missing_env_key_keeps_the_literal_token() {
    let mut state = SessionState::new();
    state.set_environment([("other", "1")]);
    assert_eq!(interpolate("{{env.X}}", &state.snapshot()), "{{env.X}}");
    assert_eq!(
        interpolate("pre-{{ env.X }}-post", &state.snapshot()),
        "pre-{{ env.X }}-post"
    );
}

#[test]
fn step_output_body_field_resolves() {
    let mut state = SessionState::new();
    state.set_step_output("a", response(json!({"id": 7})));
    assert_eq!(interpolate("{{a.body.id}}", &state.snapshot()), "7");
}

#[test]
fn resolved_output_is_a_fixed_point() {
    let mut state = SessionState::new();
    state.set_environment([("base", "https://api.test")]);
    state.set_flow_inputs([("user", "42")]);
    let snap = state.snapshot();
    let once = interpolate("{{env.base}}/users/{{input.user}}", &snap);
    assert_eq!(once, "https://api.test/users/42");
    assert_eq!(interpolate(&once, &snap), once);
}

#[test]
fn values_containing_tokens_are_inserted_verbatim() {
    let mut state = SessionState::new();
    state.set_environment([("a", "{{env.b}}"), ("b", "B")]);
    let snap = state.snapshot();
    let once = interpolate("{{env.a}}", &snap);
    assert_eq!(once, "{{env.b}}");
    assert_eq!(interpolate(&once, &snap), "B");
}

#[test]
fn scopes_mix_and_resolve_independently() {
    let mut state = SessionState::new();
    state.set_environment([("base", "https://api.test")]);
    state.set_runtime_var("runId", "r1");
    state.set_config([("debug", true)]);
    let out = interpolate(
        "{{env.base}}/{{missing.body.x}}?run={{runtime.runId}}&debug={{config.debug}}",
        &state.snapshot(),
    );
    assert_eq!(out, "https://api.test/{{missing.body.x}}?run=r1&debug=true");
}

#[test]
fn snapshot_taken_before_a_write_does_not_see_it() {
    let mut state = SessionState::new();
    let before = state.snapshot();
    state.set_step_output("a", response(json!({"id": 1})));
    assert_eq!(interpolate("{{a.body.id}}", &before), "{{a.body.id}}");
    assert_eq!(interpolate("{{a.body.id}}", &state.snapshot()), "1");
}
