use anyhow::{Context, Result};
use clap::Parser;
use rh_pedigree::cleaner::DEFAULT_HIGH_MATCH;
use rh_pedigree::qc::{contact_info_coverage, evaluate as evaluate_qc};
use rh_pedigree::relationships::RelationshipsLookup;
use std::path::PathBuf;
use tracing::info;

mod io;
mod normalize;

/// riftehr - pedigree reconstruction from emergency-contact record linkage
#[derive(Parser)]
#[clap(name = "riftehr")]
#[clap(about = "Reconstruct patient pedigrees from emergency-contact record linkage")]
#[clap(version)]
struct Cli {
    /// Patient table: mrn, first_name, last_name, phone, zip
    #[clap(long, value_name = "FILE")]
    pt_file: PathBuf,

    /// Emergency-contact table: owner, ec_first_name, ec_last_name, ec_phone, ec_zip, declared_rel
    #[clap(long, value_name = "FILE")]
    ec_file: PathBuf,

    /// Demographics table: mrn, birth_year, sex
    #[clap(long, value_name = "FILE")]
    dg_file: PathBuf,

    /// Directory the pedigree, families and QC_stats outputs are written to
    #[clap(long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Ground-truth Mother/Child link table: mother_mrn, child_mrn
    #[clap(long, value_name = "FILE")]
    mc_link: Option<PathBuf>,

    /// Other-family link table: src_mrn, relation, dst_mrn
    #[clap(long, value_name = "FILE")]
    of_link: Option<PathBuf>,

    /// Drop edges touching a patient with more than this many distinct matches
    #[clap(long, default_value_t = DEFAULT_HIGH_MATCH)]
    high_match: usize,

    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = if cli.verbose {
        tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).finish()
    } else {
        tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).finish()
    };
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(err) = run(cli) {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let lookup = RelationshipsLookup::load_default().context("loading bundled reference tables")?;

    let patients = io::read_patients(&cli.pt_file)?;
    let ec_entries = io::read_ec_entries(&cli.ec_file)?;
    let demographics = io::read_demographics(&cli.dg_file)?;

    let mut anchors = Vec::new();
    if let Some(mc_link) = &cli.mc_link {
        anchors.extend(io::read_mc_link(mc_link)?);
    }
    if let Some(of_link) = &cli.of_link {
        anchors.extend(io::read_of_link(of_link, &lookup)?);
    }

    info!(
        patients = patients.len(),
        ec_entries = ec_entries.len(),
        demographics = demographics.len(),
        anchors = anchors.len(),
        "loaded input tables"
    );

    let input = rh_pedigree::PipelineInput {
        patients: &patients,
        ec_entries: &ec_entries,
        demographics: &demographics,
        anchors: &anchors,
        high_match: cli.high_match,
    };
    let output = rh_pedigree::run(input)?;

    io::write_pedigree(&cli.out_dir.join("pedigree.tsv"), &output.resolved_edges)?;
    io::write_families(&cli.out_dir.join("families.tsv"), &output.families)?;

    let qc_report = cli.mc_link.as_ref().map(|mc_link| {
        let ground_truth = io::read_mc_link(mc_link)
            .unwrap_or_default()
            .into_iter()
            .map(|a| rh_pedigree::qc::GroundTruthEdge { src: a.src, relation: a.relation, dst: a.dst })
            .collect::<Vec<_>>();
        evaluate_qc(&output.resolved_edges, &ground_truth)
    });
    let coverage = contact_info_coverage(&ec_entries);
    io::write_qc_stats(&cli.out_dir.join("QC_stats.tsv"), qc_report.as_ref(), &coverage)?;

    info!(
        families = output.families.len(),
        resolved_edges = output.resolved_edges.len(),
        "run complete"
    );
    Ok(())
}
