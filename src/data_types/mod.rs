
/// Case metadata records and the per-invocation case list
pub mod case_record;
/// Delivery manifest descriptors for the downstream archival system
pub mod manifest;
/// The unified per-sample result record and its builder
pub mod sample_result;
/// The variant-of-concern rule set and its configuration resource
pub mod voc_rules;
