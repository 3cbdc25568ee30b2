use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::planner::model::DependencyGraph;
use crate::planner::PlannerError;

/// Builds the graph over `order` (step ids in array order).
///
/// Kahn's algorithm is seeded and drained in array order, so independent steps keep the
/// order they were written in.
pub(crate) fn build_step_dependency_graph(
    order: &[&str],
    deps: &BTreeMap<String, BTreeSet<String>>,
) -> Result<DependencyGraph, PlannerError> {
    let index: BTreeMap<&str, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut depends_on: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for id in order {
        let mut d = deps
            .get(*id)
            .map(|set| {
                set.iter()
                    .filter(|x| index.contains_key(x.as_str()) && x.as_str() != *id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        d.sort_by_key(|x| index.get(x.as_str()).copied().unwrap_or(usize::MAX));
        depends_on.insert((*id).to_string(), d);
    }

    let topo_order = topo_sort(order, &index, &depends_on)?;
    let levels = compute_levels(&topo_order, &depends_on);

    Ok(DependencyGraph {
        depends_on,
        levels,
        topo_order,
    })
}

fn topo_sort(
    order: &[&str],
    index: &BTreeMap<&str, usize>,
    depends_on: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<String>, PlannerError> {
    let mut indeg = vec![0usize; order.len()];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); order.len()];

    for (i, id) in order.iter().enumerate() {
        for d in depends_on.get(*id).into_iter().flatten() {
            let Some(&j) = index.get(d.as_str()) else {
                continue;
            };
            indeg[i] += 1;
            outgoing[j].push(i);
        }
    }
    for v in &mut outgoing {
        v.sort_unstable();
    }

    let mut q: VecDeque<usize> = (0..order.len()).filter(|&i| indeg[i] == 0).collect();
    let mut out = Vec::with_capacity(order.len());
    while let Some(n) = q.pop_front() {
        out.push(order[n].to_string());
        for &m in &outgoing[n] {
            indeg[m] -= 1;
            if indeg[m] == 0 {
                q.push_back(m);
            }
        }
    }

    if out.len() != order.len() {
        let stuck = (0..order.len())
            .filter(|&i| indeg[i] > 0)
            .map(|i| order[i].to_string())
            .collect();
        return Err(PlannerError::Cycle { steps: stuck });
    }
    Ok(out)
}

fn compute_levels(topo: &[String], depends_on: &BTreeMap<String, Vec<String>>) -> Vec<Vec<String>> {
    let mut level: BTreeMap<&str, usize> = BTreeMap::new();
    for node in topo {
        let deps = depends_on.get(node).map(|v| v.as_slice()).unwrap_or(&[]);
        let l = deps
            .iter()
            .filter_map(|d| level.get(d.as_str()).copied())
            .max()
            .map(|m| m + 1)
            .unwrap_or(0);
        level.insert(node, l);
    }

    let max_level = level.values().copied().max().unwrap_or(0);
    let mut levels = vec![Vec::<String>::new(); max_level + 1];
    for node in topo {
        if let Some(&l) = level.get(node.as_str()) {
            levels[l].push(node.clone());
        }
    }
    levels.retain(|l| !l.is_empty());
    levels
}
