
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_types::case_record::CaseList;
use crate::data_types::manifest::{DeliveryManifest, FileDescriptor};
use crate::writers::naming;

/// Builds the delivery manifest: project-wide entries first, then one pair of
/// entries per distinct region-lab, then per-sample entries. Samples that
/// failed sequencing QC contribute no per-sample entries.
/// # Arguments
/// * `case` - the case records and derived identifiers
/// * `result_dir` - the pipeline result directory the reports live in
/// * `fastq_dir` - the directory holding the concatenated delivery fastqs
/// * `case_config` - path to the case metadata document, delivered as-is
/// * `pipeline_config` - path to the pipeline settings dump, delivered as-is
/// * `today` - the `YYYYMMDD` date stamp used in region-split filenames
pub fn build_manifest(
    case: &CaseList,
    result_dir: &Path, fastq_dir: &Path,
    case_config: &Path, pipeline_config: &Path,
    today: &str
) -> DeliveryManifest {
    let case_id = case.case_id();
    let ticket = case.ticket();
    let mut manifest = DeliveryManifest::default();

    // case-wide reports
    manifest.push(FileDescriptor::new(
        "csv", case_id,
        naming::summary_path(result_dir, ticket).display().to_string(),
        "report", "ks-results"
    ));
    manifest.push(FileDescriptor::new(
        "csv", case_id,
        naming::variant_report_path(result_dir, ticket).display().to_string(),
        "report", "ks-aux-results"
    ));
    manifest.push(FileDescriptor::new(
        "csv", case_id,
        naming::pangolin_concat_path(result_dir, ticket).display().to_string(),
        "report", "pangolin-typing"
    ));
    manifest.push(FileDescriptor::new(
        "csv", case_id,
        naming::consensus_concat_path(result_dir, ticket).display().to_string(),
        "analysis", "consensus"
    ));
    manifest.push(FileDescriptor::new(
        "json", case_id,
        naming::multiqc_html_path(result_dir, ticket).display().to_string(),
        "report", "multiqc-html"
    ));
    manifest.push(FileDescriptor::new(
        "json", case_id,
        naming::multiqc_json_path(result_dir, ticket).display().to_string(),
        "report", "multiqc-json"
    ));
    manifest.push(FileDescriptor::new(
        "json", case_id,
        naming::json_dump_path(result_dir, ticket).display().to_string(),
        "result_aggregation", "artic-json"
    ));

    // run provenance
    manifest.push(FileDescriptor::new(
        "json", case_id,
        case_config.display().to_string(),
        "runinfo", "sampleinfo"
    ));
    manifest.push(FileDescriptor::new(
        "txt", case_id,
        pipeline_config.display().to_string(),
        "runinfo", "runtime-settings"
    ));
    manifest.push(FileDescriptor::new(
        "txt", case_id,
        naming::nextflow_log_path(result_dir).display().to_string(),
        "runinfo", "logfile"
    ));

    // region split
    for region_lab in case.region_labs() {
        manifest.push(FileDescriptor::new(
            "csv", case_id,
            naming::classification_path(result_dir, region_lab, today).display().to_string(),
            "typing", "SARS-CoV-2-type"
        ));
        manifest.push(FileDescriptor::new(
            "csv", case_id,
            naming::fohm_path(result_dir, region_lab, today).display().to_string(),
            "report", "SARS-CoV-2-info"
        ));
    }

    // per sample, excluding sequencing QC failures from delivery
    for record in case.records() {
        if !record.sequencing_qc_pass {
            continue;
        }
        let base_sample = record.base_sample();
        manifest.push(FileDescriptor::new(
            "fastq", &record.cg_sample_id,
            fastq_dir.join(format!("{base_sample}_1.fastq.gz")).display().to_string(),
            "concatination", "forward-reads"
        ));
        manifest.push(FileDescriptor::new(
            "fastq", &record.cg_sample_id,
            fastq_dir.join(format!("{base_sample}_2.fastq.gz")).display().to_string(),
            "concatination", "reverse-reads"
        ));
        manifest.push(FileDescriptor::new(
            "fasta", &record.cg_sample_id,
            naming::sample_consensus_path(result_dir, &base_sample).display().to_string(),
            "consensus", "consensus"
        ));
    }

    manifest
}

/// Serializes the manifest to its YAML file.
/// # Arguments
/// * `manifest` - the constructed manifest
/// * `filename` - the output YAML path
/// # Errors
/// * if the file cannot be written or serialization fails
pub fn write_manifest(manifest: &DeliveryManifest, filename: &Path) -> anyhow::Result<()> {
    let file = File::create(filename)
        .with_context(|| format!("Error while creating {filename:?}:"))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, manifest)
        .with_context(|| format!("Error while serializing {filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::case_record::tests::mock_record;
    use std::path::PathBuf;

    fn mock_case() -> CaseList {
        CaseList::new(vec![
            mock_record("71CS000001", "01", "SE100", true),
            mock_record("71CS000002", "01", "SE100", false),
            mock_record("71CS000003", "14", "SE300", true)
        ]).unwrap()
    }

    fn mock_manifest() -> DeliveryManifest {
        build_manifest(
            &mock_case(),
            &PathBuf::from("/results/frankhutch"),
            &PathBuf::from("/fastq/frankhutch"),
            &PathBuf::from("/configs/frankhutch.json"),
            &PathBuf::from("/configs/pipeline.config"),
            "20210410"
        )
    }

    #[test]
    fn test_failed_samples_are_excluded_from_delivery() {
        let manifest = mock_manifest();

        let forward = manifest.with_tag("forward-reads");
        let reverse = manifest.with_tag("reverse-reads");
        assert_eq!(forward.len(), 2);
        assert_eq!(reverse.len(), 2);

        // one consensus per passing sample plus the case-wide concatenation
        let consensus = manifest.with_tag("consensus");
        assert_eq!(consensus.len(), 3);
        let per_sample: Vec<_> = consensus.iter().filter(|d| d.step == "consensus").collect();
        assert_eq!(per_sample.len(), 2);
        assert_eq!(
            per_sample[0].path,
            "/results/frankhutch/ncovIllumina_sequenceAnalysis_makeConsensus/01_SE100_71CS000001.consensus.fasta"
        );

        // the failed sample never appears anywhere in the manifest
        assert!(!manifest.files.iter().any(|d| d.id == "ACC71CS000002"));
        assert!(!manifest.files.iter().any(|d| d.path.contains("71CS000002")));
    }

    #[test]
    fn test_region_lab_entries_appear_once_per_pairing() {
        let manifest = mock_manifest();
        assert_eq!(manifest.with_tag("SARS-CoV-2-info").len(), 2);
        assert_eq!(manifest.with_tag("SARS-CoV-2-type").len(), 2);

        let info = manifest.with_tag("SARS-CoV-2-info");
        assert_eq!(info[0].path, "/results/frankhutch/01_SE100_20210410_komplettering.csv");
        assert_eq!(info[1].path, "/results/frankhutch/14_SE300_20210410_komplettering.csv");
    }

    #[test]
    fn test_case_wide_entries_use_the_case_id() {
        let manifest = mock_manifest();
        let results = manifest.with_tag("ks-results");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "frankhutch");
        assert_eq!(results[0].path, "/results/frankhutch/sars-cov-2_123456_results.csv");
        assert_eq!(results[0].path_index, "~");
    }

    #[test]
    fn test_exclusion_splits_delivery_from_aggregation() {
        use crate::aggregator::tests::two_sample_reports;
        use crate::aggregator::ResultAggregator;
        use crate::data_types::voc_rules::tests::mock_rule_set;

        // sample2 failed sequencing QC in the case metadata
        let case = CaseList::new(vec![
            mock_record("sample1", "01", "SE100", true),
            mock_record("sample2", "01", "SE100", false)
        ]).unwrap();

        // it still gets a complete aggregated record
        let (_temp_dir, reports) = two_sample_reports();
        let results = ResultAggregator::new(mock_rule_set()).aggregate(&reports).unwrap();
        assert!(results.contains_key("sample2"));

        // but never a delivery entry
        let manifest = build_manifest(
            &case,
            &PathBuf::from("/results/frankhutch"),
            &PathBuf::from("/fastq/frankhutch"),
            &PathBuf::from("/configs/frankhutch.json"),
            &PathBuf::from("/configs/pipeline.config"),
            "20210410"
        );
        assert!(!manifest.files.iter().any(|d| d.path.contains("sample2")));
        assert_eq!(manifest.with_tag("forward-reads").len(), 1);
    }

    #[test]
    fn test_manifest_round_trips_through_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manifest_fn = temp_dir.path().join("frankhutch_deliverables.yaml");
        let manifest = mock_manifest();

        write_manifest(&manifest, &manifest_fn).unwrap();
        let reloaded: DeliveryManifest = serde_yaml::from_str(
            &std::fs::read_to_string(&manifest_fn).unwrap()
        ).unwrap();
        assert_eq!(manifest, reloaded);
    }
}
