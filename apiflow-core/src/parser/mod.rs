use serde::de::DeserializeOwned;

use crate::error::ParseError;
use crate::types::Flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument<T> {
    pub document: T,
    /// The format that actually parsed; never `Auto`.
    pub format: DocumentFormat,
}

pub type ParsedFlow = ParsedDocument<Flow>;

/// Parses a flow definition. Session seed files (environment maps, endpoint lists) go
/// through [`parse_document_str`] with their own target type.
pub fn parse_flow_str(input: &str, format: DocumentFormat) -> Result<ParsedFlow, ParseError> {
    parse_document_str(input, format)
}

pub fn parse_document_str<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument<T>, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: serde_json::from_str::<T>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: serde_yaml::from_str::<T>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn parse_document_auto<T: DeserializeOwned>(input: &str) -> Result<ParsedDocument<T>, ParseError> {
    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Err(ParseError::UnknownFormat);
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(document) => Ok(ParsedDocument {
                document,
                format: DocumentFormat::Json,
            }),
            // Flow-style YAML also starts with a brace.
            Err(e) => serde_yaml::from_str::<T>(input)
                .map(|document| ParsedDocument {
                    document,
                    format: DocumentFormat::Yaml,
                })
                .map_err(|_| ParseError::Json(e)),
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(document) => Ok(ParsedDocument {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => serde_json::from_str::<T>(input)
            .map(|document| ParsedDocument {
                document,
                format: DocumentFormat::Json,
            })
            .map_err(|_| ParseError::Yaml(e)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn auto_detects_json_and_yaml() {
        let json = r#"{"name":"f","steps":[{"id":"a","name":"A","method":"GET","url":"https://x.test"}]}"#;
        let parsed = parse_flow_str(json, DocumentFormat::Auto).unwrap();
        assert_eq!(parsed.format, DocumentFormat::Json);
        assert_eq!(parsed.document.steps.len(), 1);

        let yaml = "name: f\nsteps:\n  - id: a\n    name: A\n    method: GET\n    url: https://x.test\n";
        let parsed = parse_flow_str(yaml, DocumentFormat::Auto).unwrap();
        assert_eq!(parsed.format, DocumentFormat::Yaml);
        assert_eq!(parsed.document.name, "f");
    }

    #[test]
    fn string_maps_parse_for_session_seeds() {
        let parsed: ParsedDocument<BTreeMap<String, String>> =
            parse_document_str("baseUrl: https://api.test\ntoken: abc\n", DocumentFormat::Auto)
                .unwrap();
        assert_eq!(parsed.document.len(), 2);
    }

    #[test]
    fn empty_input_has_no_format() {
        let err = parse_flow_str("   \n", DocumentFormat::Auto).unwrap_err();
        assert!(matches!(err, ParseError::UnknownFormat));
    }
}
