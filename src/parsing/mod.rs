/*!
# Parsing module
Contains the logic for resolving and normalizing the pipeline inputs before aggregation.
*/
/// Loader and normalizer for the case metadata document
pub mod case_config;
/// Resolves report files inside the pipeline result directory
pub mod report_locator;
/// Derives canonical sample keys from the per-report identifier formats
pub mod sample_key;
