
use anyhow::{bail, Context};
use log::warn;
use std::path::{Path, PathBuf};

/// The pipeline report types the aggregation step consumes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportKind {
    /// Per-sample coverage / QC metrics
    Qc,
    /// Per-variant calls, may be an empty file when nothing was called
    VariantSummary,
    /// Pangolin lineage classifications, concatenated per case
    Lineage
}

impl ReportKind {
    /// The filename suffix that identifies this report inside the result directory
    pub fn suffix(&self) -> &'static str {
        match self {
            ReportKind::Qc => "qc.csv",
            ReportKind::VariantSummary => "variant_summary.csv",
            ReportKind::Lineage => "pangolin.csv"
        }
    }
}

/// The resolved set of report files for one aggregation pass
#[derive(Clone, Debug)]
pub struct ReportPaths {
    pub qc: PathBuf,
    pub variants: PathBuf,
    pub lineage: PathBuf
}

/// Resolves all report files the aggregation needs, failing on the first
/// report type that cannot be found.
/// # Arguments
/// * `result_dir` - the pipeline result directory to scan
/// # Errors
/// * if the directory cannot be scanned
/// * if any report type has zero matches
pub fn locate_reports(result_dir: &Path) -> anyhow::Result<ReportPaths> {
    Ok(ReportPaths {
        qc: locate_report(result_dir, ReportKind::Qc)?,
        variants: locate_report(result_dir, ReportKind::VariantSummary)?,
        lineage: locate_report(result_dir, ReportKind::Lineage)?
    })
}

/// Resolves a single report file by suffix match inside the result directory.
/// Exactly one match is expected; zero matches is an error, multiple matches
/// resolve deterministically to the lexicographically first candidate with a
/// warning naming all of them.
/// # Arguments
/// * `result_dir` - the pipeline result directory to scan
/// * `kind` - the report type to resolve
/// # Errors
/// * if the directory cannot be scanned
/// * if no file matches the pattern for `kind`
pub fn locate_report(result_dir: &Path, kind: ReportKind) -> anyhow::Result<PathBuf> {
    let entries = std::fs::read_dir(result_dir)
        .with_context(|| format!("Error while scanning result directory {result_dir:?}:"))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(kind.suffix()))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => bail!("Unable to find \"*{}\" in {:?}", kind.suffix(), result_dir),
        1 => Ok(candidates.remove(0)),
        _ => {
            warn!(
                "Multiple hits for \"*{}\" in {:?}, picking {:?}; candidates: {:?}",
                kind.suffix(), result_dir, candidates[0], candidates
            );
            Ok(candidates.remove(0))
        }
    }
}
