use std::path::Path;

use apiflow_core::{plan_flow, FlowPlan, Validate};

use crate::exit_codes;
use crate::output::{print_error, OutputFormat};
use crate::OutputArgs;

use super::config::{read_flow, report_violations};

pub async fn plan_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match read_flow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let flow = &parsed.document;

    if let Err(err) = flow.validate() {
        return report_violations(&err, &output);
    }

    let plan = match plan_flow(flow) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    if output.quiet {
        return exit_codes::SUCCESS;
    }
    match output.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&plan) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize plan as JSON: {e}");
                return exit_codes::RUNTIME_ERROR;
            }
        },
        OutputFormat::Dot => print!("{}", plan.graph.to_dot(&flow.name)),
        OutputFormat::Text => print_text(&flow.name, flow.config.parallel, &plan),
    }
    exit_codes::SUCCESS
}

fn print_text(name: &str, parallel: bool, plan: &FlowPlan) {
    println!("flow: {name}");
    println!("mode: {}", if parallel { "parallel" } else { "sequential" });

    println!("\nexecution levels:");
    for (idx, level) in plan.graph.levels.iter().enumerate() {
        println!("  Level {idx}: {}", level.join(", "));
    }

    println!("\nper-step references:");
    for s in &plan.steps {
        println!("- {}", s.step_id);
        if !s.depends_on.is_empty() {
            println!("  dependsOn: {}", s.depends_on.join(", "));
        }
        if !s.referenced_inputs.is_empty() {
            let inputs: Vec<&str> = s.referenced_inputs.iter().map(String::as_str).collect();
            println!("  inputs: {}", inputs.join(", "));
        }
        if !s.referenced_env.is_empty() {
            let env: Vec<&str> = s.referenced_env.iter().map(String::as_str).collect();
            println!("  env: {}", env.join(", "));
        }
        if !s.external_steps.is_empty() {
            let ext: Vec<&str> = s.external_steps.iter().map(String::as_str).collect();
            println!("  earlier runs: {}", ext.join(", "));
        }
    }
}
