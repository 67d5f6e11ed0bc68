
use anyhow::bail;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::report::ReportSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.6.2-a1b2c3d-dirty` - while on a dirty branch
    /// * `0.6.2-a1b2c3d` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2021-{}
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// Meerkat, a sentry that rounds up SARS-CoV-2 amplicon results into delivery-ready reports.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Aggregates pipeline results and emits the delivery and reporting bundle
    Report(Box<ReportSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise error
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a directory exists and will otherwise error
/// # Arguments
/// * `dirname` - the directory path to check for
/// * `label` - the label to use for error messages
pub fn check_required_directory(dirname: &Path, label: &str) -> anyhow::Result<()> {
    if !dirname.is_dir() {
        bail!("{} is not a directory: \"{}\"", label, dirname.display());
    }

    // directory exists
    Ok(())
}
