//! TSV readers and writers for the pipeline's external surface (§6).

use crate::normalize::{normalize_name, normalize_phone, normalize_sex, normalize_zip};
use anyhow::{Context, Result};
use rh_pedigree::model::{Demographic, EcEntry, Patient, PatientId};
use rh_pedigree::partition::Family;
use rh_pedigree::qc::{ContactInfoCoverage, QcReport};
use rh_pedigree::relationships::RelationshipsLookup;
use rh_pedigree::resolver::{Anchor, ResolvedEdge};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

fn lines_after_header(path: &Path) -> Result<impl Iterator<Item = Result<String>>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    lines.next(); // header row
    Ok(lines.map(|l| l.map_err(anyhow::Error::from)).filter(|l| {
        !matches!(l, Ok(s) if s.trim().is_empty())
    }))
}

/// Reads `mrn, first_name, last_name, phone, zip`, dropping any row whose
/// phone or zip fails normalization rather than matching on raw text.
pub fn read_patients(path: &Path) -> Result<Vec<Patient>> {
    let mut out = Vec::new();
    for line in lines_after_header(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            anyhow::bail!("{}: expected 5 columns, got {}", path.display(), fields.len());
        }
        let phone = normalize_phone(fields[3]).unwrap_or_default();
        let zip = normalize_zip(fields[4]).unwrap_or_default();
        out.push(Patient {
            mrn: fields[0].trim().to_string(),
            first_name: normalize_name(fields[1]),
            last_name: normalize_name(fields[2]),
            phone,
            zip,
        });
    }
    Ok(out)
}

/// Reads `owner, ec_first_name, ec_last_name, ec_phone, ec_zip, declared_rel`.
pub fn read_ec_entries(path: &Path) -> Result<Vec<EcEntry>> {
    let mut out = Vec::new();
    for line in lines_after_header(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 6 {
            anyhow::bail!("{}: expected 6 columns, got {}", path.display(), fields.len());
        }
        out.push(EcEntry {
            owner: fields[0].trim().to_string(),
            ec_first_name: normalize_name(fields[1]),
            ec_last_name: normalize_name(fields[2]),
            ec_phone: normalize_phone(fields[3]).unwrap_or_default(),
            ec_zip: normalize_zip(fields[4]).unwrap_or_default(),
            declared_rel: fields[5].trim().to_string(),
        });
    }
    Ok(out)
}

/// Reads `mrn, birth_year, sex`. Rows with an unparseable birth year or sex
/// letter are skipped; the join stage treats a missing entry as absent
/// demographics either way.
pub fn read_demographics(path: &Path) -> Result<HashMap<PatientId, Demographic>> {
    let mut out = HashMap::new();
    for line in lines_after_header(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            anyhow::bail!("{}: expected 3 columns, got {}", path.display(), fields.len());
        }
        let (Ok(birth_year), Some(sex)) = (fields[1].trim().parse::<i32>(), normalize_sex(fields[2])) else {
            tracing::warn!("{}: skipping unparseable demographics row for {}", path.display(), fields[0]);
            continue;
        };
        out.insert(fields[0].trim().to_string(), Demographic { birth_year, sex });
    }
    Ok(out)
}

/// Reads a Mother/Child ground-truth link table: `mother_mrn, child_mrn`,
/// always Parent-oriented from mother to child.
pub fn read_mc_link(path: &Path) -> Result<Vec<Anchor>> {
    let mut out = Vec::new();
    for line in lines_after_header(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            anyhow::bail!("{}: expected at least 2 columns, got {}", path.display(), fields.len());
        }
        // child_mrn is the first column, mother_mrn is always the last;
        // anything in between is carried by the source table but unused here.
        let child = fields[0].trim().to_string();
        let mother = fields[fields.len() - 1].trim().to_string();
        out.push(Anchor {
            src: mother,
            relation: rh_pedigree::model::RelationGroup::Parent,
            dst: child,
        });
    }
    Ok(out)
}

/// Reads the other-family link table: `src_mrn, relation, dst_mrn`, where
/// `relation` is free text normalized through the shipped synonym table.
pub fn read_of_link(path: &Path, lookup: &RelationshipsLookup) -> Result<Vec<Anchor>> {
    let mut out = Vec::new();
    for line in lines_after_header(path)? {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            anyhow::bail!("{}: expected 3 columns, got {}", path.display(), fields.len());
        }
        let Some(relation) = lookup.normalize(fields[1]) else {
            tracing::warn!("{}: skipping unknown relationship {:?}", path.display(), fields[1]);
            continue;
        };
        out.push(Anchor {
            src: fields[0].trim().to_string(),
            relation,
            dst: fields[2].trim().to_string(),
        });
    }
    Ok(out)
}

pub fn write_pedigree(path: &Path, edges: &[ResolvedEdge]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(file, "src\trelation\tdst")?;
    for edge in edges {
        writeln!(file, "{}\t{}\t{}", edge.src, edge.relation, edge.dst)?;
    }
    Ok(())
}

pub fn write_families(path: &Path, families: &[Family]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(file, "family_id\tmrn")?;
    for family in families {
        for member in &family.members {
            writeln!(file, "{}\t{}", family.family_id, member)?;
        }
    }
    Ok(())
}

pub fn write_qc_stats(path: &Path, qc: Option<&QcReport>, coverage: &ContactInfoCoverage) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(file, "metric\tvalue")?;
    if let Some(qc) = qc {
        writeln!(file, "ground_truth_edges\t{}", qc.ground_truth_edges)?;
        writeln!(file, "true_positives\t{}", qc.true_positives)?;
        writeln!(file, "false_positives\t{}", qc.false_positives)?;
        writeln!(file, "false_negatives\t{}", qc.false_negatives)?;
        writeln!(file, "sensitivity\t{:.4}", qc.sensitivity)?;
        writeln!(file, "ppv\t{:.4}", qc.ppv)?;
    }
    writeln!(file, "ec_entries\t{}", coverage.ec_entries)?;
    writeln!(file, "missing_phone\t{}", coverage.missing_phone)?;
    writeln!(file, "missing_zip\t{}", coverage.missing_zip)?;
    writeln!(file, "missing_both\t{}", coverage.missing_both)?;
    writeln!(file, "missing_declared_relationship\t{}", coverage.missing_declared_relationship)?;
    Ok(())
}
