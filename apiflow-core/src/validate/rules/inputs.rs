use std::collections::HashSet;

use regex::Regex;

use crate::types::{AnyValue, FlowInput};
use crate::validate::validator::Validator;

pub(crate) fn validate_inputs(v: &mut Validator, inputs: &[FlowInput], path: &str) {
    let mut names = HashSet::<&str>::new();
    for (idx, input) in inputs.iter().enumerate() {
        let ipath = format!("{path}[{idx}]");

        if input.name.trim().is_empty() {
            v.push(format!("{ipath}.name"), "must not be empty");
        } else if !names.insert(input.name.as_str()) {
            v.push(format!("{ipath}.name"), "must be unique within the flow");
        }

        let pattern_ok = match &input.pattern {
            Some(p) => match Regex::new(p) {
                Ok(_) => true,
                Err(e) => {
                    v.push(format!("{ipath}.pattern"), format!("invalid regex: {e}"));
                    false
                }
            },
            None => true,
        };

        match &input.default {
            None => {}
            Some(AnyValue::Array(_) | AnyValue::Object(_) | AnyValue::Null) => {
                v.push(
                    format!("{ipath}.default"),
                    "must be a string, number or boolean",
                );
            }
            Some(_) if !pattern_ok => {}
            Some(_) => {
                if let Some(value) = input.default_value() {
                    if let Err(msg) = input.check_value(&value) {
                        v.push(format!("{ipath}.default"), msg);
                    }
                }
            }
        }
    }
}
