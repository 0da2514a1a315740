use serde::Serialize;

use crate::aggregate::GroupedRecords;
use crate::stats::BoxplotStats;
use crate::types::{GroupKey, ValidatedRecord};

#[cfg(test)]
#[path = "distribution_test.rs"]
mod distribution_test;

/// Raw per-run values of one metric for one key. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionGroup {
    pub key: GroupKey,
    /// Values in record order.
    pub values: Vec<f64>,
}

impl DistributionGroup {
    pub fn boxplot(&self) -> Option<BoxplotStats> {
        BoxplotStats::from_values(self.values.iter().copied())
    }
}

impl GroupedRecords<'_> {
    /// One group per key holding at least one defined value of `metric`, ascending by key.
    pub fn distributions(&self, metric: &str) -> Vec<DistributionGroup> {
        self.iter()
            .filter_map(|(key, records)| {
                let values: Vec<f64> = Self::values(records, metric).collect();
                (!values.is_empty()).then_some(DistributionGroup { key, values })
            })
            .collect()
    }
}

pub fn extract_distributions(records: &[ValidatedRecord], metric: &str) -> Vec<DistributionGroup> {
    GroupedRecords::new(records).distributions(metric)
}
