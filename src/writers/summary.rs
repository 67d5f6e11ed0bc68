
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::sample_result::SampleResult;

/// The reserved value for the summary `Selection` column
const SELECTION_PLACEHOLDER: &str = "-";

/// Contains all the data written to each row of the summary report.
/// The serialized names are the customer-facing column headers; the column
/// order is part of the file contract.
#[derive(Serialize)]
struct SummaryRow {
    #[serde(rename = "Sample")]
    sample: String,
    /// Reserved for future use, always the placeholder
    #[serde(rename = "Selection")]
    selection: String,
    #[serde(rename = "Ticket")]
    ticket: String,
    #[serde(rename = "%N_bases")]
    pct_n_bases: f64,
    #[serde(rename = "%10X_coverage")]
    pct_10x_coverage: f64,
    #[serde(rename = "QC_pass")]
    qc_pass: String,
    #[serde(rename = "Lineage")]
    lineage: String,
    #[serde(rename = "Pangolin_version")]
    pangolin_version: String,
    #[serde(rename = "VOC")]
    voc: String,
    /// The VOC-relevant variant calls, `;`-joined
    #[serde(rename = "Variants")]
    variants: String
}

impl SummaryRow {
    /// Creates a row from one finalized sample result
    fn new(sample: &str, ticket: &str, result: &SampleResult) -> Self {
        Self {
            sample: sample.to_string(),
            selection: SELECTION_PLACEHOLDER.to_string(),
            ticket: ticket.to_string(),
            pct_n_bases: result.pct_n_bases,
            pct_10x_coverage: result.pct_10x_bases,
            qc_pass: if result.qc { "TRUE".to_string() } else { "FALSE".to_string() },
            lineage: result.lineage.clone(),
            pangolin_version: result.pangolin_version.clone(),
            voc: result.voc_flag.as_ref().to_string(),
            variants: result.voc_amino_joined()
        }
    }
}

/// Writes the per-sample summary report, one row per aggregated sample in
/// mapping order.
/// # Arguments
/// * `filename` - the output CSV path
/// * `ticket` - the customer project ticket repeated on each row
/// * `results` - the finalized result mapping
pub fn write_summary(filename: &Path, ticket: &str, results: &IndexMap<String, SampleResult>) -> csv::Result<()> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .from_path(filename)?;

    for (sample, result) in results.iter() {
        let row = SummaryRow::new(sample, ticket, result);
        csv_writer.serialize(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
