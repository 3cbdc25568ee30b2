use apiflow_core::{interpolate, interpolate_value, AnyValue, ResolvedStep, SessionSnapshot};

use crate::executor::http::{HttpError, HttpRequest};

const CONTENT_TYPE: &str = "content-type";

/// Materializes a resolved step against a snapshot. Unresolved tokens stay literal, so a url
/// that still holds one usually fails to parse here.
pub(crate) fn build_request(
    step: &ResolvedStep,
    snapshot: &SessionSnapshot,
) -> Result<HttpRequest, HttpError> {
    let raw_url = interpolate(&step.url, snapshot);
    let url = url::Url::parse(raw_url.trim())
        .map_err(|e| HttpError::InvalidRequest(format!("invalid url `{raw_url}`: {e}")))?;

    let mut headers = step
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), interpolate(v, snapshot)))
        .collect::<std::collections::BTreeMap<_, _>>();

    let body = match &step.body {
        None | Some(AnyValue::Null) => None,
        Some(AnyValue::String(s)) => Some(interpolate(s, snapshot).into_bytes()),
        Some(value) => {
            let resolved = interpolate_value(value, snapshot);
            let bytes = serde_json::to_vec(&resolved)
                .map_err(|e| HttpError::InvalidRequest(format!("body is not serializable: {e}")))?;
            if !headers.keys().any(|k| k.eq_ignore_ascii_case(CONTENT_TYPE)) {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
            Some(bytes)
        }
    };

    Ok(HttpRequest {
        method: step.method,
        url,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use apiflow_core::HttpMethod;
    use serde_json::json;

    use super::*;

    fn step(body: Option<AnyValue>, headers: BTreeMap<String, String>) -> ResolvedStep {
        ResolvedStep {
            id: "s".to_string(),
            name: "S".to_string(),
            method: HttpMethod::Post,
            url: "{{env.base}}/items".to_string(),
            headers,
            body,
            timeout_ms: None,
            expected_status: None,
        }
    }

    fn snapshot() -> SessionSnapshot {
        let mut snap = SessionSnapshot::default();
        snap.environment.insert("base".into(), "https://api.test".into());
        snap.flow_inputs.insert("qty".into(), "3".into());
        snap
    }

    #[test]
    fn json_body_sets_content_type() {
        let req = build_request(&step(Some(json!({"qty": "{{input.qty}}"})), BTreeMap::new()), &snapshot())
            .unwrap();
        assert_eq!(req.url.as_str(), "https://api.test/items");
        assert_eq!(req.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        let sent: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"qty": "3"}));
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let headers = BTreeMap::from([("content-type".to_string(), "application/vnd.x+json".to_string())]);
        let req = build_request(&step(Some(json!({"a": 1})), headers), &snapshot()).unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers["content-type"], "application/vnd.x+json");
    }

    #[test]
    fn string_body_is_sent_as_text() {
        let req = build_request(&step(Some(json!("qty={{input.qty}}")), BTreeMap::new()), &snapshot())
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(&b"qty=3"[..]));
        assert!(req.headers.is_empty());
    }

    #[test]
    fn unresolved_host_is_an_invalid_request() {
        let err = build_request(&step(None, BTreeMap::new()), &SessionSnapshot::default()).unwrap_err();
        assert!(matches!(err, HttpError::InvalidRequest(_)));
    }
}
