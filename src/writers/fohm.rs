
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::data_types::case_record::CaseList;
use crate::writers::naming;

/// Fixed header of the public-health submission files; the accession column
/// is filled in by a downstream process and stays blank here.
const FOHM_HEADER: &str = "provnummer,urvalskriterium,GISAID_accession\n";

/// Writes one public-health submission file per distinct region-lab pairing.
/// Every file is freshly truncated with its header before any rows are
/// appended, so a rerun overwrites rather than accumulates.
/// # Arguments
/// * `case` - the case records and derived region-lab list
/// * `result_dir` - directory the submission files are written into
/// * `today` - the `YYYYMMDD` date stamp used in the filenames
/// # Errors
/// * if any file cannot be created or appended to
pub fn write_fohm_csvs(case: &CaseList, result_dir: &Path, today: &str) -> anyhow::Result<Vec<PathBuf>> {
    // truncate all submission files up front
    let mut filenames: Vec<PathBuf> = vec![];
    for region_lab in case.region_labs() {
        let filename = naming::fohm_path(result_dir, region_lab, today);
        let mut file = File::create(&filename)
            .with_context(|| format!("Error while creating {filename:?}:"))?;
        file.write_all(FOHM_HEADER.as_bytes())
            .with_context(|| format!("Error while writing {filename:?}:"))?;
        filenames.push(filename);
    }

    // append each sample to the file of its region-lab pairing
    for record in case.records() {
        let filename = naming::fohm_path(result_dir, &record.region_lab(), today);
        let file = OpenOptions::new()
            .append(true)
            .open(&filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        csv_writer.write_record([
            record.customer_sample_id.as_str(),
            record.selection_criteria.as_str()
        ]).with_context(|| format!("Error while writing {filename:?}:"))?;
        csv_writer.flush()
            .with_context(|| format!("Error while flushing {filename:?}:"))?;
    }

    Ok(filenames)
}
