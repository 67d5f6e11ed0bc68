/*!
# Writers module
Contains the logic for producing the delivery and reporting artifacts.
*/
/// Concatenates per-sample pipeline outputs into per-case files
pub mod concat;
/// Builds and serializes the delivery manifest
pub mod delivery_manifest;
/// Generates the per-region-lab public-health submission files
pub mod fohm;
/// The file naming contracts shared by the emitters
pub mod naming;
/// Generates the per-sample summary report
pub mod summary;
/// Dumps scheduler job ids for the run-tracking system
pub mod trailblazer;
/// Generates the customer-facing variant report
pub mod variant_report;
