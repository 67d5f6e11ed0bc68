
use anyhow::Context;
use log::warn;
use std::fs::File;
use std::path::Path;

use crate::parsing::report_locator::ReportKind;
use crate::parsing::sample_key::extract_sample_key;

/// Writes the customer-facing variant report: a row-for-row copy of the raw
/// variant summary with the sample column rewritten to the canonical key.
/// An empty raw report yields an existing, empty output file; downstream
/// consumers expect the file regardless of content.
/// # Arguments
/// * `raw_report` - the pipeline's variant summary report
/// * `filename` - the output CSV path
/// # Errors
/// * if either file cannot be read/written
pub fn write_variant_report(raw_report: &Path, filename: &Path) -> anyhow::Result<()> {
    let metadata = std::fs::metadata(raw_report)
        .with_context(|| format!("Error while checking {raw_report:?}:"))?;
    if metadata.len() == 0 {
        File::create(filename)
            .with_context(|| format!("Error while creating {filename:?}:"))?;
        return Ok(());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(raw_report)
        .with_context(|| format!("Error while opening {raw_report:?}:"))?;
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;

    let header = reader.headers()
        .with_context(|| format!("Error while reading header of {raw_report:?}"))?
        .clone();
    csv_writer.write_record(&header)
        .with_context(|| format!("Error while writing {filename:?}:"))?;

    for row in reader.records() {
        let record = row.with_context(|| format!("Error while reading {raw_report:?}"))?;
        let raw_id = record.get(0).unwrap_or("");
        let key = match extract_sample_key(raw_id, ReportKind::VariantSummary) {
            Ok(key) => key,
            Err(e) => {
                warn!("Excluding unresolvable sample in {raw_report:?}: {e}");
                continue;
            }
        };

        let mut remapped = csv::StringRecord::new();
        remapped.push_field(&key);
        for value in record.iter().skip(1) {
            remapped.push_field(value);
        }
        csv_writer.write_record(&remapped)
            .with_context(|| format!("Error while writing {filename:?}:"))?;
    }

    csv_writer.flush()
        .with_context(|| format!("Error while flushing {filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_column_is_rewritten() {
        let temp_dir = tempfile::tempdir().unwrap();
        let raw_fn = temp_dir.path().join("nf.variant_summary.csv");
        let out_fn = temp_dir.path().join("sars-cov-2_123456_variants.csv");
        std::fs::write(
            &raw_fn,
            "sampleID,gene,aa_var,dna_var\n\
             nf_01_SE100_s1,S,S:E484K,G23012A\n\
             nf_01_SE100_s2,S,S:D614G,C23403A\n"
        ).unwrap();

        write_variant_report(&raw_fn, &out_fn).unwrap();

        let contents = std::fs::read_to_string(&out_fn).unwrap();
        assert_eq!(
            contents,
            "sampleID,gene,aa_var,dna_var\n\
             s1,S,S:E484K,G23012A\n\
             s2,S,S:D614G,C23403A\n"
        );
    }

    #[test]
    fn test_empty_raw_report_yields_empty_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let raw_fn = temp_dir.path().join("nf.variant_summary.csv");
        let out_fn = temp_dir.path().join("sars-cov-2_123456_variants.csv");
        std::fs::write(&raw_fn, "").unwrap();

        write_variant_report(&raw_fn, &out_fn).unwrap();

        assert!(out_fn.exists());
        assert_eq!(std::fs::metadata(&out_fn).unwrap().len(), 0);
    }
}
