
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::writers::naming;

/// Shape of the run-tracking dump consumed by the monitoring system
#[derive(Serialize)]
struct TrailblazerConfig {
    jobs: Vec<i64>
}

/// Collects the scheduler job ids of the finished pipeline run and dumps them
/// for the monitoring system. Nothing is written when no ids parse from the
/// trace, matching a run that scheduled no jobs.
/// # Arguments
/// * `result_dir` - the pipeline result directory
/// # Errors
/// * if the execution trace is absent, which indicates a corrupt pipeline run
/// * if the output file cannot be written
pub fn write_trailblazer_config(result_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    let trace_fn = result_dir.join("pipeline_info").join("execution_trace.txt");
    let jobs = finished_job_ids(&trace_fn)?;
    if jobs.is_empty() {
        return Ok(None);
    }

    let out_fn = naming::trailblazer_path(result_dir);
    let file = File::create(&out_fn)
        .with_context(|| format!("Error while creating {out_fn:?}:"))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, &TrailblazerConfig { jobs })
        .with_context(|| format!("Error while serializing {out_fn:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_fn:?}:"))?;
    Ok(Some(out_fn))
}

/// Parses the scheduler job ids from the execution trace: the third
/// whitespace-delimited column of each line, non-numeric tokens skipped
/// (the header line among them).
fn finished_job_ids(trace_fn: &Path) -> anyhow::Result<Vec<i64>> {
    let contents = std::fs::read_to_string(trace_fn)
        .with_context(|| format!("Error while reading execution trace {trace_fn:?}:"))?;
    let jobs = contents.lines()
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter_map(|token| token.parse().ok())
        .collect();
    Ok(jobs)
}
