
use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Metadata for one sequenced sample, as provided by the sample database export.
/// Field names mirror the upstream JSON document.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CaseRecord {
    /// Case identifier, shared by every record of one invocation
    #[serde(rename = "case_ID")]
    pub case_id: String,
    /// Customer project identifier (the ticket), also shared
    #[serde(rename = "Customer_ID_project")]
    pub customer_project_id: String,
    /// Internal sample identifier
    #[serde(rename = "CG_ID_sample")]
    pub cg_sample_id: String,
    /// Customer-facing sample identifier
    #[serde(rename = "Customer_ID_sample")]
    pub customer_sample_id: String,
    /// Submitting region code
    pub region_code: String,
    /// Submitting laboratory code
    pub lab_code: String,
    /// Canonical selection criteria code after normalization
    pub selection_criteria: String,
    /// Whether the sample passed sequencing QC; failures are excluded from delivery
    pub sequencing_qc_pass: bool
}

impl CaseRecord {
    /// The region-lab pairing public-health reporting is partitioned by
    pub fn region_lab(&self) -> String {
        format!("{}_{}", self.region_code, self.lab_code)
    }

    /// The customer-facing file stem used for delivered per-sample files
    pub fn base_sample(&self) -> String {
        format!("{}_{}_{}", self.region_code, self.lab_code, self.customer_sample_id)
    }
}

/// All case records of one invocation plus the identifiers they share.
/// Construction validates the shared-identifier invariant once so downstream
/// consumers can rely on a single case id and ticket.
#[derive(Clone, Debug)]
pub struct CaseList {
    /// The normalized records, in file order
    records: Vec<CaseRecord>,
    /// Distinct region-lab pairings, in first-seen order
    region_labs: Vec<String>
}

impl CaseList {
    /// Wraps a record list, validating the cross-record invariants.
    /// # Arguments
    /// * `records` - the normalized case records
    /// # Errors
    /// * if the record list is empty
    /// * if any record disagrees on the case id or ticket
    pub fn new(records: Vec<CaseRecord>) -> anyhow::Result<Self> {
        let first = match records.first() {
            Some(r) => r,
            None => bail!("Case config contains no sample records")
        };

        for record in records.iter().skip(1) {
            if record.case_id != first.case_id {
                bail!(
                    "Case config mixes case ids: {:?} and {:?}",
                    first.case_id, record.case_id
                );
            }
            if record.customer_project_id != first.customer_project_id {
                bail!(
                    "Case config mixes project tickets: {:?} and {:?}",
                    first.customer_project_id, record.customer_project_id
                );
            }
        }

        let mut region_labs: Vec<String> = vec![];
        for record in records.iter() {
            let region_lab = record.region_lab();
            if !region_labs.contains(&region_lab) {
                region_labs.push(region_lab);
            }
        }

        Ok(Self {
            records,
            region_labs
        })
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Case identifier shared by all records
    pub fn case_id(&self) -> &str {
        &self.records[0].case_id
    }

    /// Customer project ticket shared by all records
    pub fn ticket(&self) -> &str {
        &self.records[0].customer_project_id
    }

    /// Distinct region-lab pairings observed across the records, in first-seen order
    pub fn region_labs(&self) -> &[String] {
        &self.region_labs
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shared fixture for tests that need a populated case list
    pub(crate) fn mock_record(sample: &str, region: &str, lab: &str, qc_pass: bool) -> CaseRecord {
        CaseRecord {
            case_id: "frankhutch".to_string(),
            customer_project_id: "123456".to_string(),
            cg_sample_id: format!("ACC{sample}"),
            customer_sample_id: sample.to_string(),
            region_code: region.to_string(),
            lab_code: lab.to_string(),
            selection_criteria: "Allmän övervakning".to_string(),
            sequencing_qc_pass: qc_pass
        }
    }

    #[test]
    fn test_region_lab_list_dedups_in_order() {
        let case = CaseList::new(vec![
            mock_record("71CS000001", "01", "SE100", true),
            mock_record("71CS000002", "01", "SE100", true),
            mock_record("71CS000003", "14", "SE300", true)
        ]).unwrap();

        assert_eq!(case.region_labs(), &["01_SE100".to_string(), "14_SE300".to_string()]);
        assert_eq!(case.case_id(), "frankhutch");
        assert_eq!(case.ticket(), "123456");
    }

    #[test]
    fn test_empty_case_config_is_rejected() {
        assert!(CaseList::new(vec![]).is_err());
    }

    #[test]
    fn test_mixed_case_ids_are_rejected() {
        let mut other = mock_record("71CS000002", "01", "SE100", true);
        other.case_id = "othercase".to_string();
        let result = CaseList::new(vec![
            mock_record("71CS000001", "01", "SE100", true),
            other
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_sample_stem() {
        let record = mock_record("71CS000001", "01", "SE100", true);
        assert_eq!(record.base_sample(), "01_SE100_71CS000001");
    }
}
