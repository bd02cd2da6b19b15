//! Match Cleaner (§4.3): deterministic age/sex rules that prune and flip
//! joined edges, plus a high-degree trim to suppress shared-contact noise.

use crate::join::JoinedEdge;
use crate::model::{PatientId, RelationGroup};
use std::collections::{HashMap, HashSet};

/// Default high-degree trim threshold (`H` in §4.3).
pub const DEFAULT_HIGH_MATCH: usize = 20;

/// A cleaned, pre-closure edge: just the canonical triple the Inference
/// Engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CleanedEdge {
    pub src: PatientId,
    pub declared_rel: RelationGroup,
    pub dst: PatientId,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CleanerStats {
    pub joined_edges_seen: usize,
    pub dropped_age_rule: usize,
    pub dropped_same_sex_spouse: usize,
    pub flipped: usize,
    pub dropped_high_degree: usize,
    pub cleaned_edges: usize,
}

/// Applies the drop rules, then the flip rules, then the high-degree trim.
pub fn clean(edges: &[JoinedEdge], high_match: usize) -> (Vec<CleanedEdge>, CleanerStats) {
    let mut stats = CleanerStats {
        joined_edges_seen: edges.len(),
        ..CleanerStats::default()
    };

    let mut survivors = Vec::with_capacity(edges.len());
    for edge in edges {
        if is_dropped_by_age_rule(edge) {
            stats.dropped_age_rule += 1;
            continue;
        }
        if edge.declared_rel == RelationGroup::Spouse && edge.sex_src == edge.sex_dst {
            stats.dropped_same_sex_spouse += 1;
            continue;
        }
        let declared_rel = flip_if_needed(edge, &mut stats);
        survivors.push(CleanedEdge {
            src: edge.src.clone(),
            declared_rel,
            dst: edge.dst.clone(),
        });
    }

    let trimmed = trim_high_degree(survivors, high_match, &mut stats);

    let mut dedup: HashSet<CleanedEdge> = HashSet::new();
    let mut out = Vec::new();
    for edge in trimmed {
        if dedup.insert(edge.clone()) {
            out.push(edge);
        }
    }
    stats.cleaned_edges = out.len();
    (out, stats)
}

fn is_dropped_by_age_rule(edge: &JoinedEdge) -> bool {
    match edge.declared_rel {
        RelationGroup::Parent | RelationGroup::Child => edge.delta.abs() < 10,
        RelationGroup::Grandparent | RelationGroup::Grandchild => edge.delta.abs() < 20,
        _ => false,
    }
}

// `delta` is birth_year_src - birth_year_dst, so a real Parent edge (src
// older) carries a large negative delta. A flip fires when the sign says
// the declared direction is backwards: src is the younger one.
fn flip_if_needed(edge: &JoinedEdge, stats: &mut CleanerStats) -> RelationGroup {
    let flipped = match edge.declared_rel {
        RelationGroup::Parent if edge.delta > 10 => Some(RelationGroup::Child),
        RelationGroup::Child if edge.delta < -10 => Some(RelationGroup::Parent),
        RelationGroup::Grandparent if edge.delta > 20 => Some(RelationGroup::Grandchild),
        RelationGroup::Grandchild if edge.delta < -20 => Some(RelationGroup::Grandparent),
        _ => None,
    };
    match flipped {
        Some(group) => {
            stats.flipped += 1;
            group
        }
        None => edge.declared_rel,
    }
}

/// Drops any edge whose `src` or `dst` has more than `high_match` distinct
/// other endpoints across the surviving edge set (shared-phone noise).
fn trim_high_degree(
    edges: Vec<CleanedEdge>,
    high_match: usize,
    stats: &mut CleanerStats,
) -> Vec<CleanedEdge> {
    let mut neighbors: HashMap<&PatientId, HashSet<&PatientId>> = HashMap::new();
    for edge in &edges {
        neighbors.entry(&edge.src).or_default().insert(&edge.dst);
        neighbors.entry(&edge.dst).or_default().insert(&edge.src);
    }
    let degree_of = |id: &PatientId| neighbors.get(id).map(|s| s.len()).unwrap_or(0);

    edges
        .into_iter()
        .filter(|edge| {
            let keep = degree_of(&edge.src) <= high_match && degree_of(&edge.dst) <= high_match;
            if !keep {
                stats.dropped_high_degree += 1;
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sex;

    fn joined(src: &str, dst: &str, rel: RelationGroup, delta: i32, sex_src: Sex, sex_dst: Sex) -> JoinedEdge {
        JoinedEdge {
            src: src.to_string(),
            dst: dst.to_string(),
            declared_rel: rel,
            matched_path: "first,last,phone,zip",
            birth_year_src: 1900 + delta.max(0),
            sex_src,
            birth_year_dst: 1900,
            sex_dst,
            delta,
        }
    }

    #[test]
    fn drops_parent_edge_with_small_age_gap() {
        let edges = vec![joined("P1", "P2", RelationGroup::Parent, 1, Sex::F, Sex::M)];
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert!(cleaned.is_empty());
        assert_eq!(stats.dropped_age_rule, 1);
    }

    #[test]
    fn flips_reversed_parent_edge_to_child() {
        // src is 15 years younger than dst: declared Parent is backwards.
        let edges = vec![joined("P1", "P2", RelationGroup::Parent, 15, Sex::M, Sex::F)];
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].declared_rel, RelationGroup::Child);
        assert_eq!(stats.flipped, 1);
    }

    #[test]
    fn flips_reversed_child_edge_to_parent() {
        let edges = vec![joined("P1", "P2", RelationGroup::Child, -15, Sex::M, Sex::F)];
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].declared_rel, RelationGroup::Parent);
        assert_eq!(stats.flipped, 1);
    }

    #[test]
    fn a_genuinely_older_parent_is_never_flipped() {
        // src born well before dst, exactly the shape a real Parent edge has.
        let edges = vec![joined("P1", "P2", RelationGroup::Parent, -25, Sex::F, Sex::M)];
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].declared_rel, RelationGroup::Parent);
        assert_eq!(stats.flipped, 0);
    }

    #[test]
    fn drops_same_sex_spouse() {
        let edges = vec![joined("P1", "P2", RelationGroup::Spouse, 0, Sex::F, Sex::F)];
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert!(cleaned.is_empty());
        assert_eq!(stats.dropped_same_sex_spouse, 1);
    }

    #[test]
    fn trims_high_degree_hub() {
        // P0 is an emergency-contact phone shared by 21 unrelated patients.
        let mut edges = Vec::new();
        for i in 0..21 {
            edges.push(joined(
                "P0",
                &format!("Q{i}"),
                RelationGroup::Sibling,
                0,
                Sex::F,
                Sex::M,
            ));
        }
        let (cleaned, stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert!(cleaned.is_empty());
        assert_eq!(stats.dropped_high_degree, 21);
    }

    #[test]
    fn boundary_delta_of_exactly_ten_is_kept_unflipped() {
        let edges = vec![joined("P1", "P2", RelationGroup::Parent, 10, Sex::F, Sex::M)];
        let (cleaned, _stats) = clean(&edges, DEFAULT_HIGH_MATCH);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].declared_rel, RelationGroup::Parent);
    }
}
