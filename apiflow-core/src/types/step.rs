use std::collections::BTreeMap;
use std::fmt;

use crate::error::ResolveError;
use crate::types::{AnyValue, Endpoint};

/// One HTTP request definition inside a flow.
///
/// `url`, header values and `body` are templates that may contain `{{scope.path}}` tokens.
/// A step either spells out `method` and `url` itself or references a saved [`Endpoint`];
/// when both are present the step's own fields win.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Either a string template or a JSON value whose string leaves are templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<u16>,
}

impl Step {
    /// Merges this step with the endpoint it references (if any) into a concrete definition.
    pub fn resolve(&self, endpoint: Option<&Endpoint>) -> Result<ResolvedStep, ResolveError> {
        let raw_method = self
            .method
            .as_deref()
            .or(endpoint.map(|e| e.method.as_str()))
            .ok_or(ResolveError::MissingMethod)?;
        let method = HttpMethod::parse(raw_method)
            .ok_or_else(|| ResolveError::InvalidMethod(raw_method.to_string()))?;

        let url = self
            .url
            .clone()
            .or_else(|| endpoint.map(|e| e.url.clone()))
            .ok_or(ResolveError::MissingUrl)?;

        let mut headers = endpoint.map(|e| e.headers.clone()).unwrap_or_default();
        for (name, value) in &self.headers {
            // Header names are case-insensitive; drop the endpoint's spelling before overriding.
            headers.retain(|k: &String, _| !k.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        let body = self
            .body
            .clone()
            .or_else(|| endpoint.and_then(|e| e.body.clone()));

        Ok(ResolvedStep {
            id: self.id.clone(),
            name: self.name.clone(),
            method,
            url,
            headers,
            body,
            timeout_ms: self.timeout_ms.and_then(|t| u64::try_from(t).ok()),
            expected_status: self.expected_status,
        })
    }
}

/// A step with its endpoint reference merged in, ready to be interpolated and sent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStep {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<AnyValue>,
    pub timeout_ms: Option<u64>,
    pub expected_status: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Case-insensitive parse of a method name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to every template string a step carries, used by the planner and the validator
/// to find interpolation tokens without resolving them.
pub trait StepTemplates {
    fn step_id(&self) -> &str;
    fn templates(&self) -> Vec<&str>;
}

impl StepTemplates for Step {
    fn step_id(&self) -> &str {
        &self.id
    }

    fn templates(&self) -> Vec<&str> {
        collect_templates(self.url.as_deref(), &self.headers, self.body.as_ref())
    }
}

impl StepTemplates for ResolvedStep {
    fn step_id(&self) -> &str {
        &self.id
    }

    fn templates(&self) -> Vec<&str> {
        collect_templates(Some(&self.url), &self.headers, self.body.as_ref())
    }
}

fn collect_templates<'a>(
    url: Option<&'a str>,
    headers: &'a BTreeMap<String, String>,
    body: Option<&'a AnyValue>,
) -> Vec<&'a str> {
    let mut out = Vec::new();
    if let Some(url) = url {
        out.push(url);
    }
    out.extend(headers.values().map(String::as_str));
    if let Some(body) = body {
        collect_value_strings(body, &mut out);
    }
    out
}

fn collect_value_strings<'a>(value: &'a AnyValue, out: &mut Vec<&'a str>) {
    match value {
        AnyValue::Null | AnyValue::Bool(_) | AnyValue::Number(_) => {}
        AnyValue::String(s) => out.push(s),
        AnyValue::Array(arr) => {
            for v in arr {
                collect_value_strings(v, out);
            }
        }
        AnyValue::Object(map) => {
            for v in map.values() {
                collect_value_strings(v, out);
            }
        }
    }
}
