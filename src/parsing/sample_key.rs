
use crate::parsing::report_locator::ReportKind;

/// Errors from canonical sample key derivation
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum SampleKeyError {
    #[error("no sample key could be derived from {raw:?}")]
    EmptyKey { raw: String }
}

/// Derives the canonical sample key from a raw report identifier.
/// Each report type embeds the key at a different position inside an
/// underscore-delimited name, so the extraction is keyed on the report kind:
/// * QC and variant reports end with the key (`<prefix>_<key>`)
/// * lineage reports additionally carry a dotted suffix (`<prefix>_<key>.<suffix>`)
///
/// The derived key must agree across all report types for the same physical
/// sample; that agreement is what makes the downstream join possible.
/// # Arguments
/// * `raw` - the identifier exactly as it appears in column 0 of the report
/// * `kind` - which report the identifier came from
/// # Errors
/// * if the extraction yields an empty token, e.g. a trailing underscore or an empty field
pub fn extract_sample_key(raw: &str, kind: ReportKind) -> Result<String, SampleKeyError> {
    let stem = match kind {
        ReportKind::Lineage => raw.split('.').next().unwrap_or(""),
        ReportKind::Qc | ReportKind::VariantSummary => raw
    };

    // the key is the last underscore-delimited token of the stem
    let key = stem.rsplit('_').next().unwrap_or("").trim();
    if key.is_empty() {
        Err(SampleKeyError::EmptyKey { raw: raw.to_string() })
    } else {
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_agreement_across_report_types() {
        // the same physical sample as each report names it
        let qc_raw = "prefix_01_SE100_ACC123";
        let variant_raw = "prefix_01_SE100_ACC123";
        let lineage_raw = "prefix_01_SE100_ACC123.consensus";

        let qc_key = extract_sample_key(qc_raw, ReportKind::Qc).unwrap();
        let variant_key = extract_sample_key(variant_raw, ReportKind::VariantSummary).unwrap();
        let lineage_key = extract_sample_key(lineage_raw, ReportKind::Lineage).unwrap();

        assert_eq!(qc_key, "ACC123");
        assert_eq!(qc_key, variant_key);
        assert_eq!(qc_key, lineage_key);
    }

    #[test]
    fn test_no_underscore_keeps_whole_token() {
        let key = extract_sample_key("ACC123", ReportKind::Qc).unwrap();
        assert_eq!(key, "ACC123");
    }

    #[test]
    fn test_lineage_multi_dot_suffix() {
        let key = extract_sample_key("run_ACC9.consensus.fa", ReportKind::Lineage).unwrap();
        assert_eq!(key, "ACC9");
    }

    #[test]
    fn test_malformed_identifiers_are_rejected() {
        assert_eq!(
            extract_sample_key("", ReportKind::Qc),
            Err(SampleKeyError::EmptyKey { raw: "".to_string() })
        );
        assert_eq!(
            extract_sample_key("prefix_ACC123_", ReportKind::VariantSummary),
            Err(SampleKeyError::EmptyKey { raw: "prefix_ACC123_".to_string() })
        );
        assert_eq!(
            extract_sample_key(".consensus", ReportKind::Lineage),
            Err(SampleKeyError::EmptyKey { raw: ".consensus".to_string() })
        );
    }
}
