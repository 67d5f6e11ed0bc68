
use log::{LevelFilter, error, info};
use std::time::Instant;

use meerkat::aggregator::ResultAggregator;
use meerkat::cli::core::{Commands, get_cli};
use meerkat::cli::report::{ReportSettings, check_report_settings};
use meerkat::data_types::voc_rules::VocRuleSet;
use meerkat::parsing::case_config::load_case_config;
use meerkat::parsing::report_locator::locate_reports;
use meerkat::util::json_io::save_json;
use meerkat::writers::concat::{concat_consensus, concat_pangolin};
use meerkat::writers::delivery_manifest::{build_manifest, write_manifest};
use meerkat::writers::fohm::write_fohm_csvs;
use meerkat::writers::naming;
use meerkat::writers::summary::write_summary;
use meerkat::writers::trailblazer::write_trailblazer_config;
use meerkat::writers::variant_report::write_variant_report;

fn run_report(settings: ReportSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_report_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // load the case metadata
    info!("Loading case config...");
    let case = match load_case_config(&settings.case_config) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while loading case config: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    info!("\tCase: {:?}", case.case_id());
    info!("\tTicket: {:?}", case.ticket());
    info!("\tSamples: {}", case.records().len());
    info!("\tRegion-labs: {:?}", case.region_labs());

    // load the VOC rules
    info!("Loading VOC rule config...");
    let voc_rules = match VocRuleSet::from_json(&settings.voc_config) {
        Ok(v) => v,
        Err(e) => {
            error!("Error while loading VOC rule config: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let result_dir = settings.result_dir.as_path();
    let ticket = case.ticket();
    let today = chrono::Local::now().format("%Y%m%d").to_string();

    // produce the per-case inputs the aggregation consumes
    info!("Concatenating lineage classifications...");
    if let Err(e) = concat_pangolin(result_dir, ticket) {
        error!("Error while concatenating lineage classifications: {e:#}");
        std::process::exit(exitcode::IOERR);
    }
    info!("Concatenating consensus sequences...");
    if let Err(e) = concat_consensus(result_dir, ticket) {
        error!("Error while concatenating consensus sequences: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    // dump the scheduler job ids for run tracking
    info!("Writing run-tracking config...");
    match write_trailblazer_config(result_dir) {
        Ok(Some(out_fn)) => info!("\tJob ids saved to {out_fn:?}"),
        Ok(None) => info!("\tNo finished jobs found, skipping"),
        Err(e) => {
            error!("Error while writing run-tracking config: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    // resolve the report files
    info!("Resolving pipeline reports...");
    let reports = match locate_reports(result_dir) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while resolving pipeline reports: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("\tQC report: {:?}", &reports.qc);
    info!("\tVariant report: {:?}", &reports.variants);
    info!("\tLineage report: {:?}", &reports.lineage);

    // the central join; everything below consumes this one snapshot
    info!("Aggregating per-sample results...");
    let results = match ResultAggregator::new(voc_rules).aggregate(&reports) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while aggregating results: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Aggregated {} samples.", results.len());

    // emit the reporting bundle
    let summary_fn = naming::summary_path(result_dir, ticket);
    info!("Saving summary report to {summary_fn:?}...");
    if let Err(e) = write_summary(&summary_fn, ticket, &results) {
        error!("Error while saving summary report: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    let variant_fn = naming::variant_report_path(result_dir, ticket);
    info!("Saving variant report to {variant_fn:?}...");
    if let Err(e) = write_variant_report(&reports.variants, &variant_fn) {
        error!("Error while saving variant report: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    let json_fn = naming::json_dump_path(result_dir, ticket);
    info!("Saving aggregated results to {json_fn:?}...");
    if let Err(e) = save_json(&results, &json_fn) {
        error!("Error while saving aggregated results: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    let manifest_fn = naming::manifest_path(result_dir, case.case_id());
    info!("Saving delivery manifest to {manifest_fn:?}...");
    let manifest = build_manifest(
        &case, result_dir, &settings.fastq_dir,
        &settings.case_config, &settings.pipeline_config, &today
    );
    if let Err(e) = write_manifest(&manifest, &manifest_fn) {
        error!("Error while saving delivery manifest: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    info!("Saving public-health submission files...");
    match write_fohm_csvs(&case, result_dir, &today) {
        Ok(filenames) => {
            for filename in filenames.iter() {
                info!("\tSaved {filename:?}");
            }
        },
        Err(e) => {
            error!("Error while saving public-health submission files: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Reports completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Report(settings) => {
            run_report(*settings);
        }
    }

    info!("Process finished successfully.");
}
