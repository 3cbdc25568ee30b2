use std::path::Path;

use apiflow_core::Validate;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

use super::config::{read_flow, report_violations};

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    flow: String,
    format: String,
    steps: usize,
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if let Err(err) = parsed.document.validate() {
        return report_violations(&err, &output);
    }

    let flow = &parsed.document;
    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "ok: valid flow `{}` ({:?}, {} steps)",
            flow.name,
            parsed.format,
            flow.steps.len()
        );
    } else {
        print_result(
            output.format,
            output.quiet,
            &ValidateResult {
                valid: true,
                flow: flow.name.clone(),
                format: format!("{:?}", parsed.format),
                steps: flow.steps.len(),
            },
        );
    }
    exit_codes::SUCCESS
}
