
use anyhow::{anyhow, bail, Context};
use indexmap::IndexMap;
use log::warn;
use rustc_hash::FxHashMap as HashMap;
use std::path::Path;

use crate::data_types::sample_result::{SampleResult, SampleResultBuilder};
use crate::data_types::voc_rules::VocRuleSet;
use crate::parsing::report_locator::{ReportKind, ReportPaths};
use crate::parsing::sample_key::extract_sample_key;

/// The central join: accumulates partial per-sample records across the QC,
/// lineage, and variant reports, then finalizes them into one complete record
/// per sample. The QC report defines the sample universe; the other reports
/// only ever update samples it introduced.
pub struct ResultAggregator {
    /// The rule set consulted for lineage and variant classification
    voc_rules: VocRuleSet,
    /// Partial records keyed by canonical sample key, in QC report order
    builders: IndexMap<String, SampleResultBuilder>,
    /// All variant calls per sample, in call order, duplicates preserved
    var_all: HashMap<String, Vec<String>>,
    /// The subset of variant calls satisfying the VOC rules
    var_voc: HashMap<String, Vec<String>>,
    /// Set once `parse_qc` completes; the other passes require it
    qc_parsed: bool
}

impl ResultAggregator {
    /// Creates an aggregator with the given rule set injected
    pub fn new(voc_rules: VocRuleSet) -> Self {
        Self {
            voc_rules,
            builders: Default::default(),
            var_all: Default::default(),
            var_voc: Default::default(),
            qc_parsed: false
        }
    }

    /// Runs all three parse passes in order and finalizes the mapping.
    /// # Arguments
    /// * `reports` - the resolved report paths for this result directory
    /// # Errors
    /// * if any report fails to parse, or the QC report yields no samples
    pub fn aggregate(mut self, reports: &ReportPaths) -> anyhow::Result<IndexMap<String, SampleResult>> {
        self.parse_qc(&reports.qc)?;
        self.parse_lineage(&reports.lineage)?;
        self.parse_variants(&reports.variants)?;
        self.finalize()
    }

    /// Parses the QC report, creating one partial record per data row.
    /// The derived reporting QC gate is computed here from the 10x coverage.
    /// # Arguments
    /// * `filename` - the QC report path
    /// # Errors
    /// * if the file cannot be read, a row is missing columns, or a numeric field is malformed
    pub fn parse_qc(&mut self, filename: &Path) -> anyhow::Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;

        for row in reader.records() {
            let record = row.with_context(|| format!("Error while reading {filename:?}"))?;
            let raw_id = field(&record, 0, filename)?;
            let key = match extract_sample_key(raw_id, ReportKind::Qc) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Excluding unresolvable sample in {filename:?}: {e}");
                    continue;
                }
            };

            let pct_n_bases: f64 = parse_number(field(&record, 1, filename)?, "%N bases", &key, filename)?;
            let pct_10x_bases: f64 = parse_number(field(&record, 2, filename)?, "%10x coverage", &key, filename)?;
            let longest_no_n_run: u64 = parse_number(field(&record, 3, filename)?, "longest non-N run", &key, filename)?;
            let num_aligned_reads: u64 = parse_number(field(&record, 4, filename)?, "aligned read count", &key, filename)?;
            let artic_qc = field(&record, 7, filename)?;

            let mut builder = SampleResultBuilder::default();
            builder.pct_n_bases(pct_n_bases)
                .pct_10x_bases(pct_10x_bases)
                .longest_no_n_run(longest_no_n_run)
                .num_aligned_reads(num_aligned_reads)
                .artic_qc(artic_qc)
                .qc(SampleResult::qc_gate(pct_10x_bases));

            if self.builders.insert(key.clone(), builder).is_some() {
                warn!("Duplicate sample key {key:?} in {filename:?}, keeping the latest row");
            }
        }

        self.qc_parsed = true;
        Ok(())
    }

    /// Parses the lineage report, updating records the QC pass created.
    /// Rows whose key was never seen in the QC report are skipped with a
    /// warning; a lineage call without QC data is a data-integrity violation
    /// but does not discard the rest of the batch.
    /// # Arguments
    /// * `filename` - the concatenated lineage report path
    /// # Errors
    /// * if called before `parse_qc`
    /// * if the file cannot be read, a row is missing columns, or the probability is malformed
    pub fn parse_lineage(&mut self, filename: &Path) -> anyhow::Result<()> {
        if !self.qc_parsed {
            bail!("The QC report must be parsed before the lineage report");
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;

        for row in reader.records() {
            let record = row.with_context(|| format!("Error while reading {filename:?}"))?;
            let raw_id = field(&record, 0, filename)?;
            let key = match extract_sample_key(raw_id, ReportKind::Lineage) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Excluding unresolvable sample in {filename:?}: {e}");
                    continue;
                }
            };

            let lineage = field(&record, 1, filename)?.to_string();
            let probability: f64 = parse_number(field(&record, 2, filename)?, "call probability", &key, filename)?;
            let version = field(&record, 3, filename)?.to_string();
            let pangolin_qc = field(&record, 4, filename)?.to_string();
            let voc_flag = self.voc_rules.classify_lineage(&lineage);

            let builder = match self.builders.get_mut(&key) {
                Some(builder) => builder,
                None => {
                    warn!("Lineage call for sample {key:?} in {filename:?} has no QC data, skipping");
                    continue;
                }
            };
            builder.lineage(lineage)
                .pangolin_probability(probability)
                .pangolin_version(version)
                .pangolin_qc(pangolin_qc)
                .voc_flag(voc_flag);
        }

        Ok(())
    }

    /// Parses the variant report into the all-variants and VOC-variants
    /// groupings. A zero-byte file is the valid "no variants called" state.
    /// Rows for samples without QC data are skipped with a warning.
    /// # Arguments
    /// * `filename` - the variant summary report path
    /// # Errors
    /// * if called before `parse_qc`
    /// * if the file cannot be read or a row is missing columns
    pub fn parse_variants(&mut self, filename: &Path) -> anyhow::Result<()> {
        if !self.qc_parsed {
            bail!("The QC report must be parsed before the variant report");
        }

        let metadata = std::fs::metadata(filename)
            .with_context(|| format!("Error while checking {filename:?}:"))?;
        if metadata.len() == 0 {
            return Ok(());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;

        for row in reader.records() {
            let record = row.with_context(|| format!("Error while reading {filename:?}"))?;
            let raw_id = field(&record, 0, filename)?;
            let key = match extract_sample_key(raw_id, ReportKind::VariantSummary) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Excluding unresolvable sample in {filename:?}: {e}");
                    continue;
                }
            };
            if !self.builders.contains_key(&key) {
                warn!("Variant call for sample {key:?} in {filename:?} has no QC data, skipping");
                continue;
            }

            let variant = field(&record, 2, filename)?.to_string();
            if self.voc_rules.is_voc_variant(&variant) {
                self.var_voc.entry(key.clone()).or_default().push(variant.clone());
            }
            self.var_all.entry(key).or_default().push(variant);
        }

        Ok(())
    }

    /// Merges the three sources into the final mapping, one complete record
    /// per QC sample. Samples without lineage or variant data finalize with
    /// their placeholder values.
    /// # Errors
    /// * if the QC pass never ran or produced no samples
    /// * if any record is left incomplete, which indicates a bug in the parse passes
    pub fn finalize(self) -> anyhow::Result<IndexMap<String, SampleResult>> {
        if !self.qc_parsed {
            bail!("Refusing to finalize: the QC report was never parsed");
        }
        let Self { builders, mut var_all, mut var_voc, .. } = self;
        if builders.is_empty() {
            bail!("No samples found in the QC report, nothing to aggregate");
        }

        let mut results: IndexMap<String, SampleResult> = IndexMap::with_capacity(builders.len());
        for (key, mut builder) in builders {
            builder.voc_amino_variants(var_voc.remove(&key).unwrap_or_default());
            builder.all_variants(var_all.remove(&key).unwrap_or_default());
            let result = builder.build()
                .with_context(|| format!("Incomplete result record for sample {key:?}"))?;
            results.insert(key, result);
        }
        Ok(results)
    }
}

/// Fetches a column by index, erroring with the file and row named
fn field<'a>(record: &'a csv::StringRecord, index: usize, filename: &Path) -> anyhow::Result<&'a str> {
    record.get(index)
        .ok_or_else(|| anyhow!("Missing column {index} in {filename:?} on row: {record:?}"))
}

/// Parses a numeric field, erroring with the field label, sample, and file named
fn parse_number<T: std::str::FromStr>(value: &str, label: &str, key: &str, filename: &Path) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static
{
    value.trim().parse()
        .with_context(|| format!("Malformed {label} value {value:?} for sample {key:?} in {filename:?}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data_types::sample_result::VocStatus;
    use crate::data_types::voc_rules::tests::mock_rule_set;
    use crate::util::json_io::{load_json, save_json};
    use approx_eq::assert_approx_eq;
    use std::path::PathBuf;

    pub(crate) const QC_HEADER: &str =
        "sample_name,pct_N_bases,pct_covered_bases,longest_no_N_run,num_aligned_reads,fasta_length,qc_pass,artic_qc\n";
    pub(crate) const LINEAGE_HEADER: &str =
        "taxon,lineage,probability,pangoLEARN_version,status,note\n";
    pub(crate) const VARIANT_HEADER: &str =
        "sampleID,gene,aa_var,dna_var\n";

    /// Writes the three report files into a temp result directory
    pub(crate) fn write_reports(qc: &str, lineage: &str, variants: &str) -> (tempfile::TempDir, ReportPaths) {
        let temp_dir = tempfile::tempdir().unwrap();
        let reports = ReportPaths {
            qc: temp_dir.path().join("nf.qc.csv"),
            variants: temp_dir.path().join("nf.variant_summary.csv"),
            lineage: temp_dir.path().join("123456.pangolin.csv")
        };
        std::fs::write(&reports.qc, qc).unwrap();
        std::fs::write(&reports.variants, variants).unwrap();
        std::fs::write(&reports.lineage, lineage).unwrap();
        (temp_dir, reports)
    }

    /// The two-sample scenario used by several tests: one passing VOC sample,
    /// one failing sample without a lineage call, no variant calls.
    pub(crate) fn two_sample_reports() -> (tempfile::TempDir, ReportPaths) {
        let qc = format!(
            "{QC_HEADER}nf_01_SE100_sample1,2.5,96,29000,400000,29903,TRUE,TRUE\n\
             nf_01_SE100_sample2,45.2,50,3000,1200,29903,FALSE,FALSE\n"
        );
        let lineage = format!(
            "{LINEAGE_HEADER}Consensus_nf_01_SE100_sample1.consensus_threshold_0.75,B.1.1.7,0.99,2021-02-21,passed_qc,\n\
             Consensus_nf_01_SE100_sample2.consensus_threshold_0.75,None,0,2021-02-21,fail,\n"
        );
        write_reports(&qc, &lineage, "")
    }

    #[test]
    fn test_two_sample_end_to_end() {
        let (_temp_dir, reports) = two_sample_reports();
        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();

        assert_eq!(results.len(), 2);
        let first = &results["sample1"];
        assert!(first.qc);
        assert_approx_eq!(first.pct_10x_bases, 96.0);
        assert_eq!(first.lineage, "B.1.1.7");
        assert_eq!(first.voc_flag, VocStatus::Yes);
        assert_eq!(first.voc_amino_joined(), "-");
        assert_eq!(first.all_variants_joined(), "-");

        let second = &results["sample2"];
        assert!(!second.qc);
        assert_eq!(second.lineage, "None");
        assert_eq!(second.voc_flag, VocStatus::Unknown);
        assert_eq!(second.voc_amino_joined(), "-");

        // the QC report order defines the mapping order
        let keys: Vec<&String> = results.keys().collect();
        assert_eq!(keys, vec!["sample1", "sample2"]);
    }

    #[test]
    fn test_qc_threshold_boundary() {
        let qc = format!(
            "{QC_HEADER}nf_01_SE100_edge,5,95,20000,100000,29903,TRUE,TRUE\n\
             nf_01_SE100_above,5,95.0001,20000,100000,29903,TRUE,TRUE\n"
        );
        let lineage = LINEAGE_HEADER.to_string();
        let (_temp_dir, reports) = write_reports(&qc, &lineage, "");

        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();
        assert!(!results["edge"].qc);
        assert!(results["above"].qc);
    }

    #[test]
    fn test_variant_groupings_preserve_order_and_duplicates() {
        let qc = format!("{QC_HEADER}nf_01_SE100_s1,2.5,96,29000,400000,29903,TRUE,TRUE\n");
        let lineage = LINEAGE_HEADER.to_string();
        let variants = format!(
            "{VARIANT_HEADER}nf_01_SE100_s1,S,S:D614G,C23403A\n\
             nf_01_SE100_s1,S,S:E484K,G23012A\n\
             nf_01_SE100_s1,S,S:N501Y,A23063T\n\
             nf_01_SE100_s1,S,S:D614G,C23403A\n"
        );
        let (_temp_dir, reports) = write_reports(&qc, &lineage, &variants);

        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();
        let s1 = &results["s1"];
        // E484K by position range, N501Y by the whitelist
        assert_eq!(s1.voc_amino_joined(), "S:E484K;S:N501Y");
        assert_eq!(s1.all_variants_joined(), "S:D614G;S:E484K;S:N501Y;S:D614G");
    }

    #[test]
    fn test_unknown_sample_in_secondary_reports_is_skipped() {
        let qc = format!("{QC_HEADER}nf_01_SE100_s1,2.5,96,29000,400000,29903,TRUE,TRUE\n");
        let lineage = format!(
            "{LINEAGE_HEADER}Consensus_nf_01_SE100_ghost.consensus,B.1.1.7,0.99,2021-02-21,passed_qc,\n"
        );
        let variants = format!("{VARIANT_HEADER}nf_01_SE100_phantom,S,S:E484K,G23012A\n");
        let (_temp_dir, reports) = write_reports(&qc, &lineage, &variants);

        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.contains_key("s1"));
        // the stray rows left the known sample untouched
        assert_eq!(results["s1"].lineage, "None");
        assert_eq!(results["s1"].all_variants_joined(), "-");
    }

    #[test]
    fn test_malformed_numeric_field_is_fatal() {
        let qc = format!("{QC_HEADER}nf_01_SE100_s1,2.5,not-a-number,29000,400000,29903,TRUE,TRUE\n");
        let (_temp_dir, reports) = write_reports(&qc, LINEAGE_HEADER, "");

        let mut aggregator = ResultAggregator::new(mock_rule_set());
        let error = aggregator.parse_qc(&reports.qc).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("not-a-number"));
        assert!(message.contains("s1"));
    }

    #[test]
    fn test_duplicate_qc_key_keeps_latest() {
        let qc = format!(
            "{QC_HEADER}nf_01_SE100_s1,2.5,96,29000,400000,29903,TRUE,TRUE\n\
             other_01_SE100_s1,4,80,10000,200000,29903,FALSE,FALSE\n"
        );
        let (_temp_dir, reports) = write_reports(&qc, LINEAGE_HEADER, "");

        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();
        assert_eq!(results.len(), 1);
        assert_approx_eq!(results["s1"].pct_10x_bases, 80.0);
    }

    #[test]
    fn test_lineage_before_qc_is_rejected() {
        let (_temp_dir, reports) = two_sample_reports();
        let mut aggregator = ResultAggregator::new(mock_rule_set());
        assert!(aggregator.parse_lineage(&reports.lineage).is_err());
        assert!(aggregator.parse_variants(&reports.variants).is_err());
    }

    #[test]
    fn test_finalize_without_any_parse_is_rejected() {
        let aggregator = ResultAggregator::new(mock_rule_set());
        assert!(aggregator.finalize().is_err());
    }

    #[test]
    fn test_empty_qc_report_is_rejected() {
        let (_temp_dir, reports) = write_reports(QC_HEADER, LINEAGE_HEADER, "");
        let result = ResultAggregator::new(mock_rule_set()).aggregate(&reports);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_report_file_is_fatal() {
        let (_temp_dir, mut reports) = two_sample_reports();
        reports.qc = PathBuf::from("/nonexistent/nf.qc.csv");
        let mut aggregator = ResultAggregator::new(mock_rule_set());
        assert!(aggregator.parse_qc(&reports.qc).is_err());
    }

    #[test]
    fn test_aggregated_mapping_round_trips_through_json() {
        let (temp_dir, reports) = two_sample_reports();
        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();

        let json_fn = temp_dir.path().join("artic.json");
        save_json(&results, &json_fn).unwrap();
        let reloaded: IndexMap<String, SampleResult> = load_json(&json_fn).unwrap();
        assert_eq!(results, reloaded);
    }
}
