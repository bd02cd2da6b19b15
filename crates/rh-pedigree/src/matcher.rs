//! Candidate Matcher (§4.1): turns each EC entry into a candidate edge by
//! locating the patient uniquely identified by the EC's attributes.

use crate::model::{EcEntry, Patient, PatientId, RelationGroup};
use crate::relationships::RelationshipsLookup;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A pre-closure directed edge derived from a single EC entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEdge {
    /// The patient matched from the EC's attributes.
    pub src: PatientId,
    /// The patient who listed the EC (owner of the EC entry).
    pub dst: PatientId,
    pub declared_rel: RelationGroup,
    /// Name of the join key the match was found on, e.g. "first,last,phone".
    pub matched_path: &'static str,
}

struct MatchKey {
    name: &'static str,
    patient_key: fn(&Patient) -> [&str; 4],
    ec_key: fn(&EcEntry) -> [&str; 4],
    arity: usize,
}

/// Join keys in order from most to least specific (§4.1). Each closure
/// returns a fixed-size slot array; only the first `arity` slots are
/// populated and compared, letting every key share one comparable shape.
fn match_keys() -> Vec<MatchKey> {
    vec![
        MatchKey {
            name: "first,last,phone,zip",
            patient_key: |p| [&p.first_name, &p.last_name, &p.phone, &p.zip],
            ec_key: |e| [&e.ec_first_name, &e.ec_last_name, &e.ec_phone, &e.ec_zip],
            arity: 4,
        },
        MatchKey {
            name: "first,last,phone",
            patient_key: |p| [&p.first_name, &p.last_name, &p.phone, ""],
            ec_key: |e| [&e.ec_first_name, &e.ec_last_name, &e.ec_phone, ""],
            arity: 3,
        },
        MatchKey {
            name: "first,last,zip",
            patient_key: |p| [&p.first_name, &p.last_name, &p.zip, ""],
            ec_key: |e| [&e.ec_first_name, &e.ec_last_name, &e.ec_zip, ""],
            arity: 3,
        },
        MatchKey {
            name: "first,phone,zip",
            patient_key: |p| [&p.first_name, &p.phone, &p.zip, ""],
            ec_key: |e| [&e.ec_first_name, &e.ec_phone, &e.ec_zip, ""],
            arity: 3,
        },
        MatchKey {
            name: "last,phone,zip",
            patient_key: |p| [&p.last_name, &p.phone, &p.zip, ""],
            ec_key: |e| [&e.ec_last_name, &e.ec_phone, &e.ec_zip, ""],
            arity: 3,
        },
        MatchKey {
            name: "first,phone",
            patient_key: |p| [&p.first_name, &p.phone, "", ""],
            ec_key: |e| [&e.ec_first_name, &e.ec_phone, "", ""],
            arity: 2,
        },
        MatchKey {
            name: "first,zip",
            patient_key: |p| [&p.first_name, &p.zip, "", ""],
            ec_key: |e| [&e.ec_first_name, &e.ec_zip, "", ""],
            arity: 2,
        },
        MatchKey {
            name: "last,phone",
            patient_key: |p| [&p.last_name, &p.phone, "", ""],
            ec_key: |e| [&e.ec_last_name, &e.ec_phone, "", ""],
            arity: 2,
        },
        MatchKey {
            name: "last,zip",
            patient_key: |p| [&p.last_name, &p.zip, "", ""],
            ec_key: |e| [&e.ec_last_name, &e.ec_zip, "", ""],
            arity: 2,
        },
        MatchKey {
            name: "phone,zip",
            patient_key: |p| [&p.phone, &p.zip, "", ""],
            ec_key: |e| [&e.ec_phone, &e.ec_zip, "", ""],
            arity: 2,
        },
    ]
}

/// Counts of rows dropped while matching, for the aggregate summary (§7
/// category 2 — per-row validity failures).
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchStats {
    pub ec_entries_seen: usize,
    pub dropped_unknown_relationship: usize,
    pub dropped_empty_relationship: usize,
    pub dropped_self_loop: usize,
    pub candidate_edges: usize,
}

/// Runs the multi-key union described in §4.1 and returns the deduplicated
/// candidate edges plus drop counts.
pub fn find_matches(
    patients: &[Patient],
    ec_entries: &[EcEntry],
    lookup: &RelationshipsLookup,
) -> (Vec<CandidateEdge>, MatchStats) {
    let mut stats = MatchStats {
        ec_entries_seen: ec_entries.len(),
        ..MatchStats::default()
    };

    // Keyed on the raw declared-relationship text so that identical EC rows
    // reached through several keys collapse to one entry, tagged with the
    // most specific key that found them (match_keys() is iterated in
    // most-to-least-specific order and entry() keeps the first writer).
    let mut edges: BTreeMap<(PatientId, String, PatientId), &'static str> = BTreeMap::new();
    for key in match_keys() {
        let uniq = build_unique_index(patients, &key);
        for ec in ec_entries {
            let ec_tuple = slots_to_vec((key.ec_key)(ec), key.arity);
            if let Some(src) = uniq.get(&ec_tuple) {
                edges
                    .entry((src.clone(), ec.declared_rel.clone(), ec.owner.clone()))
                    .or_insert(key.name);
            }
        }
    }

    let mut out = Vec::with_capacity(edges.len());
    for ((src, declared_rel_raw, dst), matched_path) in edges {
        if declared_rel_raw.trim().is_empty() {
            stats.dropped_empty_relationship += 1;
            continue;
        }
        let Some(declared_rel) = lookup.normalize(&declared_rel_raw) else {
            stats.dropped_unknown_relationship += 1;
            continue;
        };
        if src == dst {
            stats.dropped_self_loop += 1;
            continue;
        }
        out.push(CandidateEdge {
            src,
            dst,
            declared_rel,
            matched_path,
        });
        stats.candidate_edges += 1;
    }

    (out, stats)
}

fn slots_to_vec(slots: [&str; 4], arity: usize) -> Vec<String> {
    slots[..arity].iter().map(|s| s.to_string()).collect()
}

/// Builds `key-tuple -> mrn` for patients whose key tuple is unique within
/// the cohort (the uniqueness rule in §4.1).
fn build_unique_index(patients: &[Patient], key: &MatchKey) -> HashMap<Vec<String>, PatientId> {
    let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
    let mut tuples: Vec<(Vec<String>, PatientId)> = Vec::with_capacity(patients.len());
    for p in patients {
        let tuple = slots_to_vec((key.patient_key)(p), key.arity);
        *counts.entry(tuple.clone()).or_insert(0) += 1;
        tuples.push((tuple, p.mrn.clone()));
    }
    let mut index = HashMap::new();
    for (tuple, mrn) in tuples {
        if counts.get(&tuple).copied().unwrap_or(0) == 1 {
            index.insert(tuple, mrn);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::RelationshipsLookup;

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
    fn scenario_1_basic_parent_match() {
        let lookup = RelationshipsLookup::load_default().unwrap();
        let patients = vec![
            patient("P1", "ana", "smith", "5550001", "10001"),
            patient("P2", "bob", "smith", "5550001", "10001"),
        ];
        let ecs = vec![ec("P2", "ana", "smith", "5550001", "10001", "mother")];

        let (edges, stats) = find_matches(&patients, &ecs, &lookup);
        assert_eq!(stats.candidate_edges, 1);
        assert_eq!(edges[0].src, "P1");
        assert_eq!(edges[0].dst, "P2");
        assert_eq!(edges[0].declared_rel, RelationGroup::Parent);
    }

    #[test]
    fn drops_self_loops_and_unknown_relationships() {
        let lookup = RelationshipsLookup::load_default().unwrap();
        let patients = vec![patient("P1", "ana", "smith", "5550001", "10001")];
        let ecs = vec![
            ec("P1", "ana", "smith", "5550001", "10001", "mother"), // self-loop
            ec("P1", "zed", "zed", "5559999", "99999", "frenemy"),  // unknown, and unmatched anyway
        ];
        let (edges, stats) = find_matches(&patients, &ecs, &lookup);
        assert!(edges.is_empty());
        assert_eq!(stats.dropped_self_loop, 1);
    }

    #[test]
    fn ambiguous_first_name_alone_is_not_a_match() {
        let lookup = RelationshipsLookup::load_default().unwrap();
        let patients = vec![
            patient("P1", "ana", "smith", "5550001", "10001"),
            patient("P3", "ana", "jones", "5559999", "99999"),
        ];
        let ecs = vec![ec("P2", "ana", "smith", "5550001", "10001", "mother")];
        let (edges, _stats) = find_matches(&patients, &ecs, &lookup);
        // first,last,phone,zip all still match uniquely even though first alone is ambiguous.
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].src, "P1");
    }
}
