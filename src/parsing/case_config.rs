
use anyhow::Context;
use std::path::Path;

use crate::data_types::case_record::{CaseList, CaseRecord};
use crate::util::json_io::load_json;

/// Loads and normalizes the case metadata JSON document.
/// # Arguments
/// * `filename` - path to the case config, a JSON array of sample records
/// # Errors
/// * if the file is absent or not valid JSON
/// * if the records violate the shared case id / ticket invariant
pub fn load_case_config(filename: &Path) -> anyhow::Result<CaseList> {
    let mut records: Vec<CaseRecord> = load_json(filename)
        .with_context(|| format!("Error while loading case config {filename:?}:"))?;

    for record in records.iter_mut() {
        normalize_record(record);
    }

    CaseList::new(records)
        .with_context(|| format!("Error while validating case config {filename:?}:"))
}

/// Normalizes the free-text fields of one record in place.
/// Region and lab codes have spaces replaced by underscores so they are safe
/// as filename components; the selection criteria is reduced to its canonical
/// code (the text after the leading enumeration separator).
fn normalize_record(record: &mut CaseRecord) {
    record.region_code = record.region_code.replace(' ', "_");
    record.lab_code = record.lab_code.replace(' ', "_");
    record.selection_criteria = canonical_selection_code(&record.selection_criteria);
}

/// Extracts the canonical selection-criteria code from the descriptive form,
/// e.g. `"1. Allmän övervakning"` becomes `"Allmän övervakning"`. A value
/// without the separator is kept as-is, trimmed.
fn canonical_selection_code(raw: &str) -> String {
    match raw.split_once('.') {
        Some((_, code)) => code.trim().to_string(),
        None => raw.trim().to_string()
    }
}
