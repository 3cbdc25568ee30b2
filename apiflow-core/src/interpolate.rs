//! Resolution of `{{scope.path}}` tokens against a [`SessionSnapshot`].
//!
//! Resolution is fail-open: a token that cannot be resolved is written back verbatim, so a
//! flow can keep going when only some of the values it mentions exist yet.

use std::collections::BTreeMap;

use crate::session::SessionSnapshot;
use crate::template::{parse_template, Scope, Segment, Token};
use crate::types::{AnyValue, StepResult};

const OPEN: &str = "{{";

/// Replaces every token in `template` in a single pass.
///
/// Substituted values are not escaped or re-scanned: a stored value that itself contains
/// `{{...}}` text comes out as that text, and only a second call would resolve it. Output is
/// therefore a fixed point only when no stored value looks like a token.
pub fn interpolate(template: &str, snapshot: &SessionSnapshot) -> String {
    if !template.contains(OPEN) {
        return template.to_string();
    }

    let parsed = parse_template(template);
    let mut out = String::with_capacity(template.len());
    for seg in &parsed.segments {
        match seg {
            Segment::Literal(l) => out.push_str(l),
            Segment::Token(t) => match resolve_token(t, snapshot) {
                Some(v) => out.push_str(&v),
                None => out.push_str(&t.raw),
            },
        }
    }
    out
}

/// Interpolates every string leaf of a JSON value; object keys and non-string scalars are
/// kept as they are.
pub fn interpolate_value(value: &AnyValue, snapshot: &SessionSnapshot) -> AnyValue {
    match value {
        AnyValue::Null | AnyValue::Bool(_) | AnyValue::Number(_) => value.clone(),
        AnyValue::String(s) => AnyValue::String(interpolate(s, snapshot)),
        AnyValue::Array(arr) => {
            AnyValue::Array(arr.iter().map(|v| interpolate_value(v, snapshot)).collect())
        }
        AnyValue::Object(map) => AnyValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, snapshot)))
                .collect(),
        ),
    }
}

/// The string a token stands for, or `None` when any part of its path is missing.
pub fn resolve_token(token: &Token, snapshot: &SessionSnapshot) -> Option<String> {
    match &token.scope {
        Scope::Env => lookup_flat(&snapshot.environment, &token.path),
        Scope::Input => lookup_flat(&snapshot.flow_inputs, &token.path),
        Scope::Runtime => lookup_flat(&snapshot.runtime_vars, &token.path),
        Scope::Config => snapshot
            .config
            .get(&token.path_string())
            .map(|v| v.to_string()),
        Scope::Step(id) => {
            let result = snapshot.step_outputs.get(id)?;
            resolve_step_path(result, &token.path)
        }
    }
}

/// Flat scopes hold strings, so the only way to resolve a dotted path is as a literal key
/// (`{{env.api.host}}` reads the key `api.host`).
fn lookup_flat(map: &BTreeMap<String, String>, path: &[String]) -> Option<String> {
    if let [single] = path {
        return map.get(single).cloned();
    }
    map.get(&path.join(".")).cloned()
}

fn resolve_step_path(result: &StepResult, path: &[String]) -> Option<String> {
    let (field, rest) = path.split_first()?;
    match field.as_str() {
        "status" if rest.is_empty() => Some(result.status.to_string()),
        "latencyMs" if rest.is_empty() => Some(result.latency_ms.to_string()),
        "timestamp" if rest.is_empty() => Some(result.timestamp.to_rfc3339()),
        "headers" => match rest {
            [] => serde_json::to_string(&result.headers).ok(),
            [name] => result.header(name).map(str::to_string),
            // Header names may contain dots.
            _ => result.header(&rest.join(".")).map(str::to_string),
        },
        "body" => walk(&result.body, rest).and_then(render),
        "error" => {
            let error = serde_json::to_value(result.error.as_ref()?).ok()?;
            walk(&error, rest).and_then(render)
        }
        _ => None,
    }
}

fn walk<'a>(root: &'a AnyValue, path: &[String]) -> Option<&'a AnyValue> {
    let mut cur = root;
    for seg in path {
        cur = match cur {
            AnyValue::Object(map) => map.get(seg)?,
            AnyValue::Array(arr) => arr.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn render(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::String(s) => Some(s.clone()),
        AnyValue::Null => Some("null".to_string()),
        AnyValue::Bool(b) => Some(b.to_string()),
        AnyValue::Number(n) => Some(n.to_string()),
        AnyValue::Array(_) | AnyValue::Object(_) => serde_json::to_string(value).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfigValue, StepErrorKind};
    use chrono::Utc;
    use serde_json::json;

    fn snapshot() -> SessionSnapshot {
        let mut snap = SessionSnapshot::default();
        snap.environment.insert("base".into(), "https://api.test".into());
        snap.environment.insert("api.version".into(), "v2".into());
        snap.config.insert("retries".into(), ConfigValue::Integer(3));
        snap.step_outputs.insert(
            "a".into(),
            StepResult::response(
                201,
                BTreeMap::from([("x-request-id".to_string(), "rq-9".to_string())]),
                json!({"id": 7, "tags": ["x", "y"], "owner": {"name": "kim"}, "none": null}),
                12,
                Utc::now(),
            ),
        );
        snap
    }

    #[test]
    fn literal_key_with_dots_resolves_in_flat_scopes() {
        assert_eq!(interpolate("{{env.api.version}}", &snapshot()), "v2");
        assert_eq!(interpolate("{{config.retries}}", &snapshot()), "3");
    }

    #[test]
    fn step_fields_resolve() {
        let snap = snapshot();
        assert_eq!(interpolate("{{a.status}}", &snap), "201");
        assert_eq!(interpolate("{{a.headers.X-Request-Id}}", &snap), "rq-9");
        assert_eq!(interpolate("{{a.body.tags[1]}}", &snap), "y");
        assert_eq!(interpolate("{{a.body.tags.0}}", &snap), "x");
        assert_eq!(interpolate("{{a.latencyMs}}", &snap), "12");
        assert_eq!(interpolate("{{a.body.none}}", &snap), "null");
        assert_eq!(interpolate("{{a.body.owner}}", &snap), r#"{"name":"kim"}"#);
    }

    #[test]
    fn non_container_intermediate_is_unresolved() {
        let snap = snapshot();
        assert_eq!(interpolate("{{a.body.id.deeper}}", &snap), "{{a.body.id.deeper}}");
        assert_eq!(interpolate("{{a.body.tags[5]}}", &snap), "{{a.body.tags[5]}}");
        assert_eq!(interpolate("{{a.error.kind}}", &snap), "{{a.error.kind}}");
    }

    #[test]
    fn error_fields_resolve_for_failed_steps() {
        let mut snap = SessionSnapshot::default();
        snap.step_outputs.insert(
            "down".into(),
            StepResult::failure(StepErrorKind::Network, "connection refused", 2, Utc::now()),
        );
        assert_eq!(interpolate("{{down.status}}", &snap), "0");
        assert_eq!(interpolate("{{down.error.kind}}", &snap), "network");
        assert_eq!(
            interpolate("{{down.error.message}}", &snap),
            "connection refused"
        );
    }

    #[test]
    fn value_interpolation_touches_only_string_leaves() {
        let body = json!({"id": "{{a.body.id}}", "n": 1, "list": ["{{env.base}}", true]});
        let out = interpolate_value(&body, &snapshot());
        assert_eq!(out, json!({"id": "7", "n": 1, "list": ["https://api.test", true]}));
    }
}
