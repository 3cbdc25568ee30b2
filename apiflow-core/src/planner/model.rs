use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPlan {
    pub steps: Vec<PlannedStep>,
    pub graph: DependencyGraph,
}

impl FlowPlan {
    pub fn step(&self, step_id: &str) -> Option<&PlannedStep> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn referenced_inputs(&self) -> BTreeSet<String> {
        self.steps
            .iter()
            .flat_map(|s| s.referenced_inputs.iter().cloned())
            .collect()
    }

    pub fn references_env(&self) -> bool {
        self.steps.iter().any(|s| !s.referenced_env.is_empty())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStep {
    pub step_id: String,
    /// Position in the flow's step array.
    pub index: usize,
    /// Steps of this flow that must be terminal before this one may start, in array order.
    pub depends_on: Vec<String>,
    pub referenced_inputs: BTreeSet<String>,
    pub referenced_env: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub external_steps: BTreeSet<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    /// For each step, which steps it depends on.
    pub depends_on: BTreeMap<String, Vec<String>>,
    /// Steps grouped by levels that could run side by side.
    pub levels: Vec<Vec<String>>,
    /// A deterministic topological order; array order breaks ties.
    pub topo_order: Vec<String>,
}

impl DependencyGraph {
    pub fn to_dot(&self, flow_name: &str) -> String {
        let mut out = String::new();
        out.push_str("digraph apiflow {\n");
        out.push_str(&format!("  label=\"flow: {}\";\n", escape(flow_name)));
        out.push_str("  labelloc=t;\n");
        out.push_str("  rankdir=LR;\n");

        for step in &self.topo_order {
            let deps = self.depends_on.get(step).map(Vec::as_slice).unwrap_or(&[]);
            if deps.is_empty() {
                out.push_str(&format!("  \"{step}\";\n"));
            } else {
                for dep in deps {
                    out.push_str(&format!("  \"{dep}\" -> \"{step}\";\n"));
                }
            }
        }

        for level in &self.levels {
            if level.len() > 1 {
                out.push_str("  { rank=same; ");
                for s in level {
                    out.push_str(&format!("\"{s}\"; "));
                }
                out.push_str("}\n");
            }
        }

        out.push_str("}\n");
        out
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
