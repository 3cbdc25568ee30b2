use std::collections::BTreeMap;

use apiflow_core::AnyValue;

/// Decodes a response payload into a value tree: JSON when it parses as JSON (and the
/// content type does not say otherwise), text otherwise, `null` when empty.
pub fn decode_body(headers: &BTreeMap<String, String>, body: &[u8]) -> AnyValue {
    if body.is_empty() {
        return AnyValue::Null;
    }

    let content_type = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.to_ascii_lowercase())
        .unwrap_or_default();
    let declared_text = !content_type.contains("json")
        && (content_type.starts_with("text/") || content_type.contains("xml"));

    if !declared_text {
        if let Ok(v) = serde_json::from_slice::<AnyValue>(body) {
            return v;
        }
    }
    AnyValue::String(String::from_utf8_lossy(body).into_owned())
}
