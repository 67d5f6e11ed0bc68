
use std::path::{Path, PathBuf};

/// Pipeline subdirectory holding the per-sample lineage classifications
pub const PANGOLIN_TYPING_DIR: &str = "ncovIllumina_sequenceAnalysis_pangolinTyping";
/// Pipeline subdirectory holding the per-sample consensus sequences
pub const MAKE_CONSENSUS_DIR: &str = "ncovIllumina_sequenceAnalysis_makeConsensus";

/// `sars-cov-2_{ticket}_results.csv` - the customer summary report
pub fn summary_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("sars-cov-2_{ticket}_results.csv"))
}

/// `sars-cov-2_{ticket}_variants.csv` - the customer variant report
pub fn variant_report_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("sars-cov-2_{ticket}_variants.csv"))
}

/// `{ticket}.pangolin.csv` - the concatenated lineage classifications
pub fn pangolin_concat_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("{ticket}.pangolin.csv"))
}

/// `{ticket}.consensus.fa` - the concatenated consensus sequences
pub fn consensus_concat_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("{ticket}.consensus.fa"))
}

/// `{ticket}_artic.json` - the aggregated result dump
pub fn json_dump_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("{ticket}_artic.json"))
}

/// `{case}_deliverables.yaml` - the delivery manifest
pub fn manifest_path(result_dir: &Path, case_id: &str) -> PathBuf {
    result_dir.join(format!("{case_id}_deliverables.yaml"))
}

/// `{region}_{lab}_{date}_komplettering.csv` - the public-health submission file
pub fn fohm_path(result_dir: &Path, region_lab: &str, today: &str) -> PathBuf {
    result_dir.join(format!("{region_lab}_{today}_komplettering.csv"))
}

/// `{region}_{lab}_{date}_pangolin_classification.txt` - the region-split typing file
pub fn classification_path(result_dir: &Path, region_lab: &str, today: &str) -> PathBuf {
    result_dir.join(MAKE_CONSENSUS_DIR)
        .join(format!("{region_lab}_{today}_pangolin_classification.txt"))
}

/// `{base_sample}.consensus.fasta` - the delivered per-sample consensus sequence
pub fn sample_consensus_path(result_dir: &Path, base_sample: &str) -> PathBuf {
    result_dir.join(MAKE_CONSENSUS_DIR)
        .join(format!("{base_sample}.consensus.fasta"))
}

/// `{ticket}_multiqc.html` - the pipeline's aggregate QC report
pub fn multiqc_html_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("{ticket}_multiqc.html"))
}

/// `{ticket}_multiqc.json` - the machine-readable aggregate QC data
pub fn multiqc_json_path(result_dir: &Path, ticket: &str) -> PathBuf {
    result_dir.join(format!("{ticket}_multiqc.json"))
}

/// `nextflow.log` - the pipeline execution log
pub fn nextflow_log_path(result_dir: &Path) -> PathBuf {
    result_dir.join("nextflow.log")
}

/// `trailblazer_config.yaml` - the scheduler job-id dump for run tracking
pub fn trailblazer_path(result_dir: &Path) -> PathBuf {
    result_dir.join("trailblazer_config.yaml")
}
