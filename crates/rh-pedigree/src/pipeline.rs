//! Orchestrates the full reconstruction: match, join, clean, close, resolve,
//! expand and partition, collecting the per-stage counts described in §7.

use crate::cleaner::{clean, CleanerStats, DEFAULT_HIGH_MATCH};
use crate::inference::{build_initial_state, ClosureStats};
use crate::join::{join_demographics, JoinStats};
use crate::matcher::{find_matches, MatchStats};
use crate::model::{Demographic, EcEntry, Patient, PatientId};
use crate::partition::{partition, Family};
use crate::relationships::RelationshipsLookup;
use crate::resolver::{resolve_all, Anchor, ResolvedEdge, ResolverStats};
use std::collections::HashMap;

pub struct PipelineInput<'a> {
    pub patients: &'a [Patient],
    pub ec_entries: &'a [EcEntry],
    pub demographics: &'a HashMap<PatientId, Demographic>,
    pub anchors: &'a [Anchor],
    pub high_match: usize,
}

impl<'a> PipelineInput<'a> {
    pub fn new(
        patients: &'a [Patient],
        ec_entries: &'a [EcEntry],
        demographics: &'a HashMap<PatientId, Demographic>,
        anchors: &'a [Anchor],
    ) -> Self {
        Self {
            patients,
            ec_entries,
            demographics,
            anchors,
            high_match: DEFAULT_HIGH_MATCH,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineStats {
    pub match_stats: MatchStats,
    pub join_stats: JoinStats,
    pub cleaner_stats: CleanerStats,
    pub closure_stats: ClosureStats,
    pub resolver_stats: ResolverStats,
}

pub struct PipelineOutput {
    pub resolved_edges: Vec<ResolvedEdge>,
    pub families: Vec<Family>,
    pub stats: PipelineStats,
}

/// Runs the stages A through F in order, logging each transition at `info`
/// so a single run's row counts can be read straight off the log.
pub fn run(input: PipelineInput<'_>) -> Result<PipelineOutput, crate::error::PedigreeError> {
    let lookup = RelationshipsLookup::load_default()?;

    let (candidates, match_stats) = find_matches(input.patients, input.ec_entries, &lookup);
    tracing::info!(
        ec_entries = match_stats.ec_entries_seen,
        candidate_edges = match_stats.candidate_edges,
        "candidate matcher complete"
    );

    let (joined, join_stats) = join_demographics(&candidates, input.demographics);
    tracing::info!(joined_edges = join_stats.joined_edges, "demographic join complete");

    let (cleaned, cleaner_stats) = clean(&joined, input.high_match);
    tracing::info!(cleaned_edges = cleaner_stats.cleaned_edges, "match cleaner complete");

    let mut map = build_initial_state(&cleaned);
    let closure_stats = crate::inference::close(&mut map);
    tracing::info!(
        passes = closure_stats.passes,
        labels_inserted = closure_stats.labels_inserted,
        "first inference closure complete"
    );
    let (first_pass, _) = resolve_all(&map);

    let mut second_pass_map = crate::inference::EdgeMap::new();
    for edge in &first_pass {
        crate::inference::insert_label(
            &mut second_pass_map,
            &edge.src,
            crate::model::Label::Primary(edge.relation),
            &edge.dst,
        );
    }
    let anchors_merged = crate::resolver::merge_anchors(&mut second_pass_map, input.anchors);
    crate::inference::close(&mut second_pass_map);

    let (resolved, mut resolver_stats) = resolve_all(&second_pass_map);
    resolver_stats.anchors_merged = anchors_merged;
    let (expanded, added) = crate::resolver::expand(&resolved, &lookup);
    resolver_stats.expanded_added = added;
    tracing::info!(
        resolved = resolver_stats.resolved,
        unresolved = resolver_stats.unresolved,
        anchors_merged,
        expanded_added = added,
        "label resolution complete"
    );

    let patient_ids: Vec<PatientId> = input.patients.iter().map(|p| p.mrn.clone()).collect();
    let families = partition(&expanded, &patient_ids);
    tracing::info!(families = families.len(), "family partitioning complete");

    Ok(PipelineOutput {
        resolved_edges: expanded,
        families,
        stats: PipelineStats {
            match_stats,
            join_stats,
            cleaner_stats,
            closure_stats,
            resolver_stats,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sex;

    fn patient(mrn: &str, first: &str, last: &str, phone: &str, zip: &str) -> Patient {
        Patient {
            mrn: mrn.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: phone.to_string(),
            zip: zip.to_string(),
        }
    }

    fn ec(owner: &str, first: &str, last: &str, phone: &str, zip: &str, rel: &str) -> EcEntry {
        EcEntry {
            owner: owner.to_string(),
            ec_first_name: first.to_string(),
            ec_last_name: last.to_string(),
            ec_phone: phone.to_string(),
            ec_zip: zip.to_string(),
            declared_rel: rel.to_string(),
        }
    }

    #[test]
    fn two_parent_child_ec_entries_yield_one_family_of_three() {
        let patients = vec![
            patient("P1", "ana", "smith", "5550001", "10001"),   // grandparent
            patient("P2", "bob", "smith", "5550002", "10001"),   // parent
            patient("P3", "cal", "smith", "5550003", "10001"),   // child
        ];
        let ecs = vec![
            ec("P2", "ana", "smith", "5550001", "10001", "mother"),
            ec("P3", "bob", "smith", "5550002", "10001", "father"),
        ];
        let mut demographics = HashMap::new();
        demographics.insert("P1".to_string(), Demographic { birth_year: 1950, sex: Sex::F });
        demographics.insert("P2".to_string(), Demographic { birth_year: 1975, sex: Sex::M });
        demographics.insert("P3".to_string(), Demographic { birth_year: 2000, sex: Sex::M });

        let anchors = Vec::new();
        let input = PipelineInput::new(&patients, &ecs, &demographics, &anchors);
        let output = run(input).unwrap();

        assert_eq!(output.families.len(), 1);
        assert_eq!(output.families[0].members, vec!["P1", "P2", "P3"]);
        assert!(output
            .resolved_edges
            .iter()
            .any(|e| e.src == "P1" && e.dst == "P3" && e.relation == crate::model::RelationGroup::Grandparent));
    }
}
