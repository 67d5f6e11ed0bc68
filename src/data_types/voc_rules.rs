
use anyhow::Context;
use rustc_hash::FxHashSet as HashSet;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::data_types::sample_result::VocStatus;
use crate::util::json_io::load_json;

/// The spike-protein region-of-interest covering the N-terminal RBD positions
/// that public-health reporting tracks; used when the rule config carries no
/// explicit ranges.
const DEFAULT_POSITION_RANGE: (u64, u64) = (475, 485);

/// On-disk shape of the VOC rule configuration.
/// The lineage list and amino-acid whitelist change as the pandemic evolves,
/// so they live in a swappable JSON resource rather than in code.
#[derive(Clone, Debug, Deserialize)]
struct VocConfig {
    /// Lineage names currently flagged as of-concern
    voc_strains: Vec<String>,
    /// Amino-acid change labels that flag a variant regardless of position
    voc_pos_aa: Vec<String>,
    /// Inclusive nucleotide position ranges that flag a variant
    #[serde(default = "default_position_ranges")]
    voc_position_ranges: Vec<(u64, u64)>
}

fn default_position_ranges() -> Vec<(u64, u64)> {
    vec![DEFAULT_POSITION_RANGE]
}

/// The loaded, immutable rule set consulted during aggregation.
/// Answers two independent questions: whether a lineage is of concern, and
/// whether a single variant call is of concern.
#[derive(Clone, Debug)]
pub struct VocRuleSet {
    /// Of-concern lineage names
    strains: HashSet<String>,
    /// Of-concern amino-acid change labels
    amino_changes: HashSet<String>,
    /// Of-concern nucleotide position ranges, inclusive
    position_ranges: Vec<RangeInclusive<u64>>
}

impl VocRuleSet {
    /// Loads the rule set from its JSON configuration resource.
    /// # Arguments
    /// * `filename` - path to the rule config JSON
    /// # Errors
    /// * if the file is absent or not valid JSON for the expected shape
    pub fn from_json(filename: &Path) -> anyhow::Result<Self> {
        let config: VocConfig = load_json(filename)
            .with_context(|| format!("Error while loading VOC rule config {filename:?}:"))?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: VocConfig) -> Self {
        Self {
            strains: config.voc_strains.into_iter().collect(),
            amino_changes: config.voc_pos_aa.into_iter().collect(),
            position_ranges: config.voc_position_ranges.into_iter()
                .map(|(start, end)| start..=end)
                .collect()
        }
    }

    /// True if the lineage name is in the curated of-concern list
    pub fn is_voc_lineage(&self, lineage: &str) -> bool {
        self.strains.contains(lineage)
    }

    /// Maps a classifier lineage to the reported VOC status:
    /// the literal `None` placeholder means the classifier made no call.
    pub fn classify_lineage(&self, lineage: &str) -> VocStatus {
        if lineage == "None" {
            VocStatus::Unknown
        } else if self.is_voc_lineage(lineage) {
            VocStatus::Yes
        } else {
            VocStatus::No
        }
    }

    /// True if a single variant call is of concern, either because its
    /// embedded nucleotide position falls inside a configured range or
    /// because the label matches the amino-acid change whitelist.
    pub fn is_voc_variant(&self, label: &str) -> bool {
        if self.amino_changes.contains(label) {
            return true;
        }
        match Self::variant_position(label) {
            Some(pos) => self.position_ranges.iter().any(|r| r.contains(&pos)),
            None => false
        }
    }

    /// Extracts the embedded numeric position from a variant label as its
    /// first contiguous digit run, e.g. `"S:N501Y"` yields 501.
    pub fn variant_position(label: &str) -> Option<u64> {
        let digits: String = label.chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}
