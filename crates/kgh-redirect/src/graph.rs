//! Consistency checks over the instruction set
//!
//! Each source may redirect to exactly one target, and following
//! source → target edges must never return to where it started.

use crate::error::ResolveError;
use crate::instruction::RedirectInstruction;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Drop duplicate (source, target) pairs and reject conflicting or cyclic sets
///
/// Input order is preserved for the instructions that remain.
pub(crate) fn validate(
    instructions: Vec<RedirectInstruction>,
) -> Result<Vec<RedirectInstruction>, ResolveError> {
    let mut targets: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for i in &instructions {
        targets
            .entry(i.source_path())
            .or_default()
            .insert(i.target_path());
    }

    if let Some((source, claimed)) = targets.iter().find(|(_, t)| t.len() > 1) {
        return Err(ResolveError::AmbiguousRedirect {
            source_path: (*source).to_string(),
            targets: claimed.iter().map(|t| (*t).to_string()).collect(),
        });
    }

    let edges: BTreeMap<&str, &str> = targets
        .iter()
        .filter_map(|(s, t)| t.first().map(|t| (*s, *t)))
        .collect();

    if let Some(cycle) = first_ring(&edges) {
        return Err(ResolveError::cycle(cycle));
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    Ok(instructions
        .into_iter()
        .filter(|i| {
            let fresh = seen.insert((i.source_path().to_string(), i.target_path().to_string()));
            if !fresh {
                tracing::debug!(key = i.object_key(), "duplicate redirect {i}");
            }
            fresh
        })
        .collect())
}

/// Ring through the smallest path of any strongly connected component
///
/// Returned closed, with the first path repeated at the end.
fn first_ring(edges: &BTreeMap<&str, &str>) -> Option<Vec<String>> {
    let graph: DiGraphMap<&str, ()> = DiGraphMap::from_edges(edges.iter().map(|(s, t)| (*s, *t)));

    let start = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .filter_map(|scc| scc.into_iter().min())
        .min()?;

    let mut ring = vec![start.to_string()];
    let mut current = start;
    while let Some(&next) = edges.get(current) {
        ring.push(next.to_string());
        if next == start {
            break;
        }
        current = next;
    }
    Some(ring)
}
