//! End-to-end runs of the pipeline against the concrete scenarios worked
//! through by hand in the specification.

use rh_pedigree::model::{Demographic, EcEntry, Patient, RelationGroup, Sex};
use rh_pedigree::resolver::Anchor;
use rh_pedigree::PipelineInput;
use std::collections::HashMap;

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

fn demo(year: i32, sex: Sex) -> Demographic {
    Demographic { birth_year: year, sex }
}

#[test]
fn scenario_1_basic_parent_inference() {
    let patients = vec![
        patient("P1", "ana", "smith", "5550001", "10001"),
        patient("P2", "bob", "smith", "5550001", "10001"),
    ];
    let ecs = vec![ec("P2", "ana", "smith", "5550001", "10001", "mother")];
    let mut demographics = HashMap::new();
    demographics.insert("P1".to_string(), demo(1960, Sex::F));
    demographics.insert("P2".to_string(), demo(1985, Sex::M));

    let anchors = Vec::new();
    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P1" && e.dst == "P2" && e.relation == RelationGroup::Parent));
    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P2" && e.dst == "P1" && e.relation == RelationGroup::Child));
    assert_eq!(output.families.len(), 1);
    assert_eq!(output.families[0].family_id, 0);
    assert_eq!(output.families[0].members, vec!["P1", "P2"]);
}

#[test]
fn scenario_2_sibling_by_composition() {
    let patients = vec![
        patient("P1", "ana", "smith", "5550001", "10001"),
        patient("P2", "bob", "smith", "5550001", "10001"),
        patient("P3", "cara", "smith", "5550001", "10001"),
    ];
    let ecs = vec![
        ec("P2", "ana", "smith", "5550001", "10001", "mother"),
        ec("P3", "ana", "smith", "5550001", "10001", "mother"),
    ];
    let mut demographics = HashMap::new();
    demographics.insert("P1".to_string(), demo(1960, Sex::F));
    demographics.insert("P2".to_string(), demo(1985, Sex::M));
    demographics.insert("P3".to_string(), demo(1988, Sex::F));

    let anchors = Vec::new();
    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P2" && e.dst == "P3" && e.relation == RelationGroup::Sibling));
    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P3" && e.dst == "P2" && e.relation == RelationGroup::Sibling));
    assert_eq!(output.families.len(), 1);
    assert_eq!(output.families[0].members, vec!["P1", "P2", "P3"]);
}

#[test]
fn scenario_3_grandparent_by_composition() {
    let patients = vec![
        patient("P1", "ana", "smith", "5550001", "10001"),
        patient("P2", "bob", "smith", "5550001", "10001"),
        patient("P4", "dan", "smith", "5550001", "10001"),
    ];
    let ecs = vec![
        ec("P2", "ana", "smith", "5550001", "10001", "mother"),
        ec("P1", "dan", "smith", "5550001", "10001", "father"),
    ];
    let mut demographics = HashMap::new();
    demographics.insert("P1".to_string(), demo(1960, Sex::F));
    demographics.insert("P2".to_string(), demo(1985, Sex::M));
    demographics.insert("P4".to_string(), demo(1935, Sex::M));

    let anchors = Vec::new();
    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P4" && e.dst == "P1" && e.relation == RelationGroup::Parent));
    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P4" && e.dst == "P2" && e.relation == RelationGroup::Grandparent));
    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "P2" && e.dst == "P4" && e.relation == RelationGroup::Grandchild));
}

#[test]
fn scenario_4_age_rule_drop_blocks_propagation() {
    let patients = vec![
        patient("P2", "bob", "smith", "5550001", "10001"),
        patient("P5", "eve", "smith", "5550001", "10001"),
    ];
    let ecs = vec![ec("P5", "bob", "smith", "5550001", "10001", "father")];
    let mut demographics = HashMap::new();
    demographics.insert("P2".to_string(), demo(1985, Sex::M));
    demographics.insert("P5".to_string(), demo(1986, Sex::F)); // |delta| = 1 < 10

    let anchors = Vec::new();
    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert!(output.resolved_edges.is_empty());
    assert_eq!(output.stats.cleaner_stats.dropped_age_rule, 1);
}

#[test]
fn scenario_6_family_partition_orders_by_descending_size() {
    // Pedigree A: P1-P2-P3 (parent/child chain, size 3).
    // Pedigree B: Q1-Q2 (size 2).
    let patients = vec![
        patient("P1", "ana", "smith", "5550001", "10001"),
        patient("P2", "bob", "smith", "5550001", "10001"),
        patient("P3", "cara", "smith", "5550002", "10002"),
        patient("Q1", "wes", "jones", "5559001", "20001"),
        patient("Q2", "xia", "jones", "5559001", "20001"),
    ];
    let ecs = vec![
        ec("P2", "ana", "smith", "5550001", "10001", "mother"),
        ec("P3", "bob", "smith", "5550002", "10002", "father"),
        ec("Q2", "wes", "jones", "5559001", "20001", "father"),
    ];
    let mut demographics = HashMap::new();
    demographics.insert("P1".to_string(), demo(1950, Sex::F));
    demographics.insert("P2".to_string(), demo(1975, Sex::M));
    demographics.insert("P3".to_string(), demo(2000, Sex::F));
    demographics.insert("Q1".to_string(), demo(1960, Sex::M));
    demographics.insert("Q2".to_string(), demo(1990, Sex::F));

    let anchors: Vec<Anchor> = Vec::new();
    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert_eq!(output.families.len(), 2);
    assert_eq!(output.families[0].family_id, 0);
    assert_eq!(output.families[0].members, vec!["P1", "P2", "P3"]);
    assert_eq!(output.families[1].family_id, 1);
    assert_eq!(output.families[1].members, vec!["Q1", "Q2"]);
}

#[test]
fn mother_child_anchor_is_merged_and_expanded() {
    let patients = vec![
        patient("M1", "ana", "smith", "5550001", "10001"),
        patient("C1", "bob", "smith", "5550002", "10002"),
    ];
    let ecs: Vec<EcEntry> = Vec::new();
    let demographics = HashMap::new();
    let anchors = vec![Anchor {
        src: "M1".to_string(),
        relation: RelationGroup::Parent,
        dst: "C1".to_string(),
    }];

    let output = rh_pedigree::run(PipelineInput::new(&patients, &ecs, &demographics, &anchors)).unwrap();

    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "M1" && e.dst == "C1" && e.relation == RelationGroup::Parent));
    assert!(output
        .resolved_edges
        .iter()
        .any(|e| e.src == "C1" && e.dst == "M1" && e.relation == RelationGroup::Child));
    assert_eq!(output.families.len(), 1);
    assert_eq!(output.families[0].members, vec!["C1", "M1"]);
}
