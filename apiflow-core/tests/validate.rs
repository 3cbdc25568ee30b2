use std::collections::BTreeMap;

use apiflow_core::{
    parse_flow_str, validate_flow, validate_resolved_steps, DocumentFormat, Flow, FlowConfig,
    HttpMethod, ResolvedStep, Validate,
};

fn flow(yaml: &str) -> Flow {
    parse_flow_str(yaml, DocumentFormat::Yaml).unwrap().document
}

#[test]
fn valid_flow_passes() {
    let f = flow(
        r#"
name: checkout
steps:
  - id: login
    name: Login
    method: post
    url: "{{env.base}}/login"
    body: { user: "{{input.user}}" }
  - id: cart
    name: Cart
    method: GET
    url: https://shop.test/cart/{{login.body.cartId}}
    headers:
      Authorization: "Bearer {{login.body.token}}"
    timeoutMs: 5000
    expectedStatus: 200
  - id: saved
    name: Saved request
    endpoint: list-orders
"#,
    );
    f.validate().unwrap();
}

#[test]
fn every_violation_is_reported() {
    let f = flow(
        r#"
name: broken
config:
  timeoutMs: 0
  maxConcurrency: 21
steps:
  - id: env
    name: ""
    method: FETCH
    url: "ftp://files.test/x"
    timeoutMs: 300001
    expectedStatus: 99
  - id: "bad id"
    name: B
  - id: dup
    name: C
    method: GET
    url: "{{env.base"
  - id: dup
    name: D
    method: GET
    url: "not a url"
"#,
    );
    let err = f.validate().unwrap_err();
    for path in [
        "$.config.timeoutMs",
        "$.config.maxConcurrency",
        "$.steps[0].id",
        "$.steps[0].name",
        "$.steps[0].method",
        "$.steps[0].url",
        "$.steps[0].timeoutMs",
        "$.steps[0].expectedStatus",
        "$.steps[1].id",
        "$.steps[1]",
        "$.steps[2].url",
        "$.steps[3].id",
        "$.steps[3].url",
    ] {
        assert!(err.has_path(path), "missing violation at {path}: {err:?}");
    }
}

#[test]
fn empty_flow_is_rejected() {
    let f = flow("name: empty\nsteps: []\n");
    let err = f.validate().unwrap_err();
    assert!(err.has_path("$.steps"));
}

#[test]
fn sequential_flow_must_not_reference_later_steps() {
    let f = flow(
        r#"
name: order
steps:
  - id: a
    name: A
    method: GET
    url: https://x.test/{{b.body.id}}
  - id: b
    name: B
    method: GET
    url: https://x.test/b
"#,
    );
    let err = validate_flow(&f, &f.config).unwrap_err();
    assert!(err.has_path("$.steps[0]"));

    let parallel = FlowConfig {
        parallel: true,
        ..f.config.clone()
    };
    validate_flow(&f, &parallel).unwrap();
}

#[test]
fn self_reference_and_cycles_are_rejected() {
    let f = flow(
        r#"
name: loop
config: { parallel: true }
steps:
  - id: a
    name: A
    method: GET
    url: https://x.test/{{b.body.id}}/{{a.status}}
  - id: b
    name: B
    method: GET
    url: https://x.test/{{a.body.id}}
"#,
    );
    let err = f.validate().unwrap_err();
    assert!(err.has_path("$.steps[0]"));
    assert!(err.has_path("$.steps"));
}

#[test]
fn input_declarations_are_checked() {
    let f = flow(
        r#"
name: inputs
inputs:
  - name: count
    type: number
    default: many
  - name: count
    pattern: "(["
  - name: ""
steps:
  - id: a
    name: A
    method: GET
    url: https://x.test
"#,
    );
    let err = f.validate().unwrap_err();
    assert!(err.has_path("$.inputs[0].default"));
    assert!(err.has_path("$.inputs[1].name"));
    assert!(err.has_path("$.inputs[1].pattern"));
    assert!(err.has_path("$.inputs[2].name"));
}

fn resolved(url: &str) -> ResolvedStep {
    ResolvedStep {
        id: "saved".into(),
        name: "Saved".into(),
        method: HttpMethod::Get,
        url: url.into(),
        headers: BTreeMap::new(),
        body: None,
        timeout_ms: None,
        expected_status: None,
    }
}

#[test]
fn resolved_steps_are_checked_after_endpoint_merge() {
    let ok = resolved("{{env.base}}/orders");
    validate_resolved_steps(&[ok.clone()]).unwrap();

    let mut bad = resolved("ftp://files.test/{{env.base");
    bad.headers
        .insert("Authorization".into(), "Bearer {{login.body.token".into());
    bad.body = Some(serde_json::json!({ "items": ["{{cart.body.id"] }));

    let err = validate_resolved_steps(&[ok, bad]).unwrap_err();
    assert_eq!(err.violations.len(), 3, "{err:?}");
    assert!(err.has_path("$.steps[1].url"));
    assert!(err.has_path("$.steps[1].headers.Authorization"));
    assert!(err.has_path("$.steps[1].body.items[0]"));

    let err = validate_resolved_steps(&[resolved("ftp://files.test/orders")]).unwrap_err();
    assert!(err.has_path("$.steps[0].url"));
}
