//! Demographic Join (§4.2): augments candidate edges with birth year and
//! sex for both endpoints, dropping edges whose demographics are missing or
//! implausible.

use crate::matcher::CandidateEdge;
use crate::model::{Demographic, PatientId, RelationGroup, Sex};
use std::collections::HashMap;

/// A candidate edge augmented with both endpoints' demographics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedEdge {
    pub src: PatientId,
    pub dst: PatientId,
    pub declared_rel: RelationGroup,
    pub matched_path: &'static str,
    pub birth_year_src: i32,
    pub sex_src: Sex,
    pub birth_year_dst: i32,
    pub sex_dst: Sex,
    /// birth_year_src - birth_year_dst
    pub delta: i32,
}

const MIN_PLAUSIBLE_BIRTH_YEAR: i32 = 1900;

#[derive(Debug, Default, Clone, Copy)]
pub struct JoinStats {
    pub candidate_edges_seen: usize,
    pub dropped_missing_demographics: usize,
    pub dropped_implausible_birth_year: usize,
    pub joined_edges: usize,
}

/// Left-joins candidate edges against demographics on both `src` and `dst`.
pub fn join_demographics(
    edges: &[CandidateEdge],
    demographics: &HashMap<PatientId, Demographic>,
) -> (Vec<JoinedEdge>, JoinStats) {
    let mut stats = JoinStats {
        candidate_edges_seen: edges.len(),
        ..JoinStats::default()
    };
    let mut out = Vec::with_capacity(edges.len());

    for edge in edges {
        let (Some(src_dg), Some(dst_dg)) =
            (demographics.get(&edge.src), demographics.get(&edge.dst))
        else {
            stats.dropped_missing_demographics += 1;
            continue;
        };
        if src_dg.birth_year <= MIN_PLAUSIBLE_BIRTH_YEAR || dst_dg.birth_year <= MIN_PLAUSIBLE_BIRTH_YEAR {
            stats.dropped_implausible_birth_year += 1;
            continue;
        }
        out.push(JoinedEdge {
            src: edge.src.clone(),
            dst: edge.dst.clone(),
            declared_rel: edge.declared_rel,
            matched_path: edge.matched_path,
            birth_year_src: src_dg.birth_year,
            sex_src: src_dg.sex,
            birth_year_dst: dst_dg.birth_year,
            sex_dst: dst_dg.sex,
            delta: src_dg.birth_year - dst_dg.birth_year,
        });
        stats.joined_edges += 1;
    }

    (out, stats)
}
