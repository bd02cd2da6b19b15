//! Label Resolver (§4.5): collapses the label set on each closed edge down
//! to a single primary relationship, then expands the result with the
//! declared opposite of every resolved edge. Also carries the external
//! anchor tables (§4.6) that get merged into the graph between the two
//! closure passes.

use crate::inference::{close, insert_label, EdgeMap};
use crate::model::{AmbiguousGroup, Label, PatientId, RelationGroup};
use crate::relationships::RelationshipsLookup;
use std::collections::{BTreeSet, HashSet};

/// A fully resolved, single-label edge ready for family partitioning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolvedEdge {
    pub src: PatientId,
    pub dst: PatientId,
    pub relation: RelationGroup,
}

/// An externally supplied edge (Mother/Child link table, or the other-family
/// link table) merged into the graph ahead of the second closure pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub src: PatientId,
    pub relation: RelationGroup,
    pub dst: PatientId,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResolverStats {
    pub edges_seen: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub anchors_merged: usize,
    pub expanded_added: usize,
}

/// Collapses one edge's label set to a single primary group, or `None` if
/// the set is genuinely ambiguous (§4.5 priority rules):
///
/// a primary candidate wins only if every label on the edge is consistent
/// with it — a bare primary label is consistent only with itself, an
/// ambiguous label is consistent with each of its constituents. When
/// exactly one candidate survives that filter, it is the resolution.
pub fn resolve_labels(labels: &BTreeSet<Label>) -> Option<RelationGroup> {
    if labels.is_empty() {
        return None;
    }
    let mut candidates: BTreeSet<RelationGroup> = BTreeSet::new();
    for label in labels {
        match label {
            Label::Primary(g) => {
                candidates.insert(*g);
            }
            Label::Ambiguous(a) => candidates.extend(a.constituents().iter().copied()),
        }
    }
    let consistent: Vec<RelationGroup> = candidates
        .into_iter()
        .filter(|g| labels.iter().all(|l| label_allows(l, *g)))
        .collect();
    match consistent.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

fn label_allows(label: &Label, candidate: RelationGroup) -> bool {
    match label {
        Label::Primary(g) => *g == candidate,
        Label::Ambiguous(a) => a.constituents().contains(&candidate),
    }
}

/// Applies [`resolve_labels`] to every edge in a closed [`EdgeMap`].
pub fn resolve_all(map: &EdgeMap) -> (Vec<ResolvedEdge>, ResolverStats) {
    let mut stats = ResolverStats::default();
    let mut out = Vec::new();
    for (src, dsts) in map {
        for (dst, labels) in dsts {
            stats.edges_seen += 1;
            match resolve_labels(labels) {
                Some(relation) => {
                    stats.resolved += 1;
                    out.push(ResolvedEdge {
                        src: src.clone(),
                        dst: dst.clone(),
                        relation,
                    });
                }
                None => stats.unresolved += 1,
            }
        }
    }
    (out, stats)
}

/// Adds the declared opposite of every resolved edge when the reverse edge
/// isn't already present (§4.5 bidirectional expansion). Returns the
/// expanded edge list and the number of edges added.
pub fn expand(resolved: &[ResolvedEdge], lookup: &RelationshipsLookup) -> (Vec<ResolvedEdge>, usize) {
    let mut present: HashSet<(PatientId, PatientId)> = resolved
        .iter()
        .map(|e| (e.src.clone(), e.dst.clone()))
        .collect();
    let mut out = resolved.to_vec();
    let mut added = 0;
    for edge in resolved {
        if edge.src == edge.dst {
            continue;
        }
        let Some(opposite) = lookup.opposite(edge.relation) else {
            continue;
        };
        let key = (edge.dst.clone(), edge.src.clone());
        if present.insert(key) {
            out.push(ResolvedEdge {
                src: edge.dst.clone(),
                dst: edge.src.clone(),
                relation: opposite,
            });
            added += 1;
        }
    }
    (out, added)
}

/// Merges externally declared anchors into a closing [`EdgeMap`] (§4.6).
pub fn merge_anchors(map: &mut EdgeMap, anchors: &[Anchor]) -> usize {
    let mut merged = 0;
    for anchor in anchors {
        if insert_label(map, &anchor.src, Label::Primary(anchor.relation), &anchor.dst) {
            merged += 1;
        }
    }
    merged
}

/// Runs the full two-pass cycle: close the matcher-derived graph, resolve
/// it down to primary labels, merge in the external anchors, close again
/// over the combined graph, then resolve and expand the final result.
pub fn run(mut map: EdgeMap, anchors: &[Anchor], lookup: &RelationshipsLookup) -> (Vec<ResolvedEdge>, ResolverStats) {
    close(&mut map);
    let (first_pass, _) = resolve_all(&map);

    let mut second_pass_map = EdgeMap::new();
    for edge in &first_pass {
        insert_label(&mut second_pass_map, &edge.src, Label::Primary(edge.relation), &edge.dst);
    }
    let anchors_merged = merge_anchors(&mut second_pass_map, anchors);
    close(&mut second_pass_map);

    let (resolved, mut stats) = resolve_all(&second_pass_map);
    stats.anchors_merged = anchors_merged;
    let (expanded, added) = expand(&resolved, lookup);
    stats.expanded_added = added;
    (expanded, stats)
}
