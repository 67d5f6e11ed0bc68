
use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The %10x coverage above which a sample passes the reporting QC gate.
/// The comparison is strict, a sample at exactly the threshold fails.
pub const QC_PASS_THRESHOLD: f64 = 95.0;

/// The serialized placeholder for "no data" in list-valued fields
pub const EMPTY_SENTINEL: &str = "-";

/// Variant-of-concern status reported per sample
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, strum_macros::AsRefStr)]
pub enum VocStatus {
    /// Lineage is in the configured of-concern set
    Yes,
    /// Lineage was classified and is not of concern
    No,
    /// The classifier made no lineage call
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Unknown
}

/// The unified per-sample result record, joined from the QC, lineage, and
/// variant reports. Mandatory fields come from the QC report; the lineage and
/// variant fields default to placeholders so a sample that only appears in the
/// QC report still finalizes into a complete record.
///
/// Serialized field names follow the downstream JSON contract.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct SampleResult {
    /// Percentage of N bases in the consensus
    pub pct_n_bases: f64,
    /// Percentage of bases covered at >= 10x depth
    #[serde(rename = "pct_10X_bases")]
    pub pct_10x_bases: f64,
    /// Longest run of non-N bases in the consensus
    #[serde(rename = "longest_no_N_run")]
    pub longest_no_n_run: u64,
    /// Number of reads aligned to the reference
    pub num_aligned_reads: u64,
    /// The pipeline's own QC verdict, passed through verbatim
    pub artic_qc: String,
    /// Derived reporting QC gate: pct_10x_bases strictly above the threshold
    pub qc: bool,
    /// Classifier lineage call, the literal `None` when no call was made
    #[builder(default = "String::from(\"None\")")]
    pub lineage: String,
    /// Classifier call probability
    #[builder(default = "0.0")]
    pub pangolin_probability: f64,
    /// Classifier data release used for the call
    #[serde(rename = "pangoLEARN_version")]
    #[builder(default = "String::from(EMPTY_SENTINEL)")]
    pub pangolin_version: String,
    /// Classifier-level QC flag
    #[builder(default = "String::from(EMPTY_SENTINEL)")]
    pub pangolin_qc: String,
    /// Variant-of-concern status derived from the lineage
    #[serde(rename = "VOC")]
    #[builder(default = "VocStatus::Unknown")]
    pub voc_flag: VocStatus,
    /// Variant calls satisfying the VOC rules, in call order
    #[serde(rename = "VOC_aa", with = "semicolon_list")]
    #[builder(default)]
    pub voc_amino_variants: Vec<String>,
    /// All variant calls for the sample, in call order
    #[serde(rename = "variants", with = "semicolon_list")]
    #[builder(default)]
    pub all_variants: Vec<String>
}

impl SampleResult {
    /// Derives the reporting QC gate from the 10x coverage fraction
    pub fn qc_gate(pct_10x_bases: f64) -> bool {
        pct_10x_bases > QC_PASS_THRESHOLD
    }

    /// VOC-relevant variants joined for CSV output, the sentinel when empty
    pub fn voc_amino_joined(&self) -> String {
        join_or_sentinel(&self.voc_amino_variants)
    }

    /// All variants joined for CSV output, the sentinel when empty
    pub fn all_variants_joined(&self) -> String {
        join_or_sentinel(&self.all_variants)
    }
}

fn join_or_sentinel(values: &[String]) -> String {
    if values.is_empty() {
        EMPTY_SENTINEL.to_string()
    } else {
        values.iter().join(";")
    }
}

/// Serializes list-valued fields as `;`-joined strings with `-` standing in
/// for "no data", matching the downstream JSON and CSV contracts.
mod semicolon_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::join_or_sentinel(values))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let joined = String::deserialize(deserializer)?;
        if joined.is_empty() || joined == super::EMPTY_SENTINEL {
            Ok(vec![])
        } else {
            Ok(joined.split(';').map(|s| s.to_string()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_qc_gate_threshold_is_strict() {
        assert!(!SampleResult::qc_gate(95.0));
        assert!(SampleResult::qc_gate(95.0001));
        assert!(!SampleResult::qc_gate(50.0));
        assert!(SampleResult::qc_gate(100.0));
    }

    #[test]
    fn test_qc_only_sample_finalizes_with_placeholders() {
        let result = SampleResultBuilder::default()
            .pct_n_bases(3.1)
            .pct_10x_bases(96.4)
            .longest_no_n_run(28912_u64)
            .num_aligned_reads(430123_u64)
            .artic_qc("TRUE")
            .qc(SampleResult::qc_gate(96.4))
            .build()
            .unwrap();

        assert!(result.qc);
        assert_eq!(result.lineage, "None");
        assert_approx_eq!(result.pangolin_probability, 0.0);
        assert_eq!(result.pangolin_version, "-");
        assert_eq!(result.pangolin_qc, "-");
        assert_eq!(result.voc_flag, VocStatus::Unknown);
        assert_eq!(result.voc_amino_joined(), "-");
        assert_eq!(result.all_variants_joined(), "-");
    }

    #[test]
    fn test_finalize_without_qc_pass_is_rejected() {
        // lineage data alone must not produce a record
        let result = SampleResultBuilder::default()
            .lineage("B.1.1.7")
            .voc_flag(VocStatus::Yes)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_all_fields() {
        let original = SampleResultBuilder::default()
            .pct_n_bases(1.2)
            .pct_10x_bases(98.7)
            .longest_no_n_run(29001_u64)
            .num_aligned_reads(381222_u64)
            .artic_qc("TRUE")
            .qc(true)
            .lineage("B.1.1.7")
            .pangolin_probability(0.9998)
            .pangolin_version("2021-02-21")
            .pangolin_qc("passed_qc")
            .voc_flag(VocStatus::Yes)
            .voc_amino_variants(vec!["S:N501Y".to_string()])
            .all_variants(vec!["S:N501Y".to_string(), "S:D614G".to_string()])
            .build()
            .unwrap();

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: SampleResult = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);

        // the wire format uses the joined-list contract
        assert!(encoded.contains("\"VOC_aa\":\"S:N501Y\""));
        assert!(encoded.contains("\"variants\":\"S:N501Y;S:D614G\""));
        assert!(encoded.contains("\"VOC\":\"Yes\""));
    }

    #[test]
    fn test_empty_lists_round_trip_through_sentinel() {
        let original = SampleResultBuilder::default()
            .pct_n_bases(40.0)
            .pct_10x_bases(50.0)
            .longest_no_n_run(3000_u64)
            .num_aligned_reads(1200_u64)
            .artic_qc("FALSE")
            .qc(false)
            .build()
            .unwrap();

        let encoded = serde_json::to_string(&original).unwrap();
        assert!(encoded.contains("\"VOC_aa\":\"-\""));
        assert!(encoded.contains("\"variants\":\"-\""));

        let decoded: SampleResult = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
        assert!(decoded.voc_amino_variants.is_empty());
        assert!(decoded.all_variants.is_empty());
    }
}
