
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::writers::naming;

/// Header of the concatenated lineage file; matches the per-sample
/// classifier output so the result parses like any other lineage report.
const PANGOLIN_HEADER: &str = "taxon,lineage,probability,pangoLEARN_version,status,note\n";

/// Concatenates the per-sample lineage classifications into one per-case
/// report at the result-dir root, where the aggregation step resolves it.
/// Source files are visited in sorted order; their header rows are dropped.
/// # Arguments
/// * `result_dir` - the pipeline result directory
/// * `ticket` - the customer project ticket naming the output
/// # Errors
/// * if the classification subdirectory is missing or any file fails to read/write
pub fn concat_pangolin(result_dir: &Path, ticket: &str) -> anyhow::Result<PathBuf> {
    let source_dir = result_dir.join(naming::PANGOLIN_TYPING_DIR);
    let sources = sorted_files_with_suffix(&source_dir, ".csv")?;

    let out_fn = naming::pangolin_concat_path(result_dir, ticket);
    let mut writer = BufWriter::new(
        File::create(&out_fn)
            .with_context(|| format!("Error while creating {out_fn:?}:"))?
    );
    writer.write_all(PANGOLIN_HEADER.as_bytes())
        .with_context(|| format!("Error while writing {out_fn:?}:"))?;

    for source in sources.iter() {
        let contents = std::fs::read_to_string(source)
            .with_context(|| format!("Error while reading {source:?}:"))?;
        for line in contents.lines().skip(1) {
            writer.write_all(line.as_bytes())
                .with_context(|| format!("Error while writing {out_fn:?}:"))?;
            writer.write_all(b"\n")
                .with_context(|| format!("Error while writing {out_fn:?}:"))?;
        }
    }

    writer.flush()
        .with_context(|| format!("Error while flushing {out_fn:?}:"))?;
    Ok(out_fn)
}

/// Concatenates the per-sample consensus sequences into one per-case FASTA
/// at the result-dir root. Source files are visited in sorted order and
/// separated by a newline.
/// # Arguments
/// * `result_dir` - the pipeline result directory
/// * `ticket` - the customer project ticket naming the output
/// # Errors
/// * if the consensus subdirectory is missing or any file fails to read/write
pub fn concat_consensus(result_dir: &Path, ticket: &str) -> anyhow::Result<PathBuf> {
    let source_dir = result_dir.join(naming::MAKE_CONSENSUS_DIR);
    let sources = sorted_files_with_suffix(&source_dir, ".consensus.fa")?;

    let out_fn = naming::consensus_concat_path(result_dir, ticket);
    let mut writer = BufWriter::new(
        File::create(&out_fn)
            .with_context(|| format!("Error while creating {out_fn:?}:"))?
    );

    for source in sources.iter() {
        let contents = std::fs::read_to_string(source)
            .with_context(|| format!("Error while reading {source:?}:"))?;
        writer.write_all(contents.as_bytes())
            .with_context(|| format!("Error while writing {out_fn:?}:"))?;
        writer.write_all(b"\n")
            .with_context(|| format!("Error while writing {out_fn:?}:"))?;
    }

    writer.flush()
        .with_context(|| format!("Error while flushing {out_fn:?}:"))?;
    Ok(out_fn)
}

/// Lists the files in a directory whose names end with `suffix`, sorted
fn sorted_files_with_suffix(dir: &Path, suffix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Error while scanning {dir:?}:"))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file() && p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(suffix))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
