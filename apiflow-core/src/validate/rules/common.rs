use crate::template::{check_template, Segment};
use crate::types::AnyValue;
use crate::validate::validator::Validator;

pub(crate) fn validate_template_string(v: &mut Validator, path: &str, s: &str) {
    if let Err(e) = check_template(s) {
        v.push(path, format!("invalid template: {e}"));
    }
}

pub(crate) fn validate_value_templates(v: &mut Validator, path: &str, value: &AnyValue) {
    match value {
        AnyValue::Null | AnyValue::Bool(_) | AnyValue::Number(_) => {}
        AnyValue::String(s) => validate_template_string(v, path, s),
        AnyValue::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                validate_value_templates(v, &format!("{path}[{i}]"), item);
            }
        }
        AnyValue::Object(map) => {
            for (k, item) in map {
                validate_value_templates(v, &format!("{path}.{k}"), item);
            }
        }
    }
}

/// A url must be a well-formed template. When it does not start with a token (which could
/// supply scheme and host at run time) it must also parse as an absolute http(s) URL with
/// every token replaced by a placeholder.
pub(crate) fn validate_url_template(v: &mut Validator, path: &str, url: &str) {
    if url.trim().is_empty() {
        v.push(path, "must not be empty");
        return;
    }

    let tpl = match check_template(url) {
        Ok(tpl) => tpl,
        Err(e) => {
            v.push(path, format!("invalid template: {e}"));
            return;
        }
    };
    if tpl.starts_with_token() {
        return;
    }

    let concrete: String = tpl
        .segments
        .iter()
        .map(|seg| match seg {
            Segment::Literal(l) => l.as_str(),
            Segment::Token(_) => "x",
        })
        .collect();

    match url::Url::parse(concrete.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => v.push(
            path,
            format!("scheme must be http or https (got `{}`)", parsed.scheme()),
        ),
        Err(e) => v.push(path, format!("must be an absolute http(s) URL: {e}")),
    }
}
