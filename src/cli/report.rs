
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_required_directory, check_required_filename, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ReportSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    meerkat_version: String,

    /// Pipeline result directory to aggregate
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub result_dir: PathBuf,

    /// Case metadata document (JSON)
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "case-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub case_config: PathBuf,

    /// Variant-of-concern rule configuration (JSON)
    #[clap(required = true)]
    #[clap(long = "voc-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub voc_config: PathBuf,

    /// Directory holding the concatenated delivery fastq files
    #[clap(required = true)]
    #[clap(short = 'f')]
    #[clap(long = "fastq-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub fastq_dir: PathBuf,

    /// Pipeline settings file delivered as run provenance
    #[clap(required = true)]
    #[clap(long = "pipeline-config")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub pipeline_config: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

pub fn check_report_settings(mut settings: ReportSettings) -> anyhow::Result<ReportSettings> {
    // hard code the version in
    settings.meerkat_version = FULL_VERSION.clone();
    info!("Meerkat version: {:?}", &settings.meerkat_version);
    info!("Sub-command: report");
    info!("Inputs:");

    // check for all the required inputs
    check_required_directory(&settings.result_dir, "Result directory")?;
    check_required_filename(&settings.case_config, "Case config")?;
    check_required_filename(&settings.voc_config, "VOC rule config")?;
    check_required_directory(&settings.fastq_dir, "Fastq directory")?;
    check_required_filename(&settings.pipeline_config, "Pipeline config")?;

    // dump stuff to the logger
    info!("\tResult directory: {:?}", &settings.result_dir);
    info!("\tCase config: {:?}", &settings.case_config);
    info!("\tVOC rule config: {:?}", &settings.voc_config);
    info!("\tFastq directory: {:?}", &settings.fastq_dir);
    info!("\tPipeline config: {:?}", &settings.pipeline_config);

    Ok(settings)
}
