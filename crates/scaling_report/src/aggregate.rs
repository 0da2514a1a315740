use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::stats::MetricSummary;
use crate::types::{GroupKey, ValidatedRecord};

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod aggregate_test;

/// Summary of every tracked metric over the records sharing one key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    /// Number of validated records with this key.
    pub count: usize,
    pub metrics: BTreeMap<&'static str, MetricSummary>,
}

impl AggregateRow {
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.get(name)
    }

    pub fn mean(&self, name: &str) -> Option<f64> {
        self.metric(name).and_then(|summary| summary.mean)
    }
}

/// Validated records partitioned by key, in ascending key order.
///
/// Built in a single pass; the aggregate table, the distributions and the rate-style derived
/// metrics are all read from the same partition.
#[derive(Debug)]
pub struct GroupedRecords<'a> {
    groups: BTreeMap<GroupKey, Vec<&'a ValidatedRecord>>,
}

impl<'a> GroupedRecords<'a> {
    pub fn new(records: &'a [ValidatedRecord]) -> Self {
        let mut groups: BTreeMap<GroupKey, Vec<&'a ValidatedRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.key).or_default().push(record);
        }
        debug!("Partitioned {} records into {} groups.", records.len(), groups.len());
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.groups.keys().copied()
    }

    /// The smallest key present.
    pub fn baseline_key(&self) -> Option<GroupKey> {
        self.groups.keys().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupKey, &[&'a ValidatedRecord])> + '_ {
        self.groups.iter().map(|(key, records)| (*key, records.as_slice()))
    }

    /// Defined values of `metric` within one group, in record order.
    pub fn values<'s>(
        records: &'s [&'s ValidatedRecord],
        metric: &'s str,
    ) -> impl Iterator<Item = f64> + 's {
        records.iter().filter_map(move |record| record.metric(metric))
    }

    /// One row per key with a [`MetricSummary`] of each metric in `metric_fields`.
    pub fn aggregate(&self, metric_fields: &[&'static str]) -> Vec<AggregateRow> {
        self.iter()
            .map(|(key, records)| AggregateRow {
                key,
                count: records.len(),
                metrics: metric_fields
                    .iter()
                    .map(|&metric| {
                        (metric, MetricSummary::from_values(Self::values(records, metric)))
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Groups `records` by key and summarizes each metric in `metric_fields`. Rows are ordered by
/// ascending key.
pub fn aggregate(records: &[ValidatedRecord], metric_fields: &[&'static str]) -> Vec<AggregateRow> {
    GroupedRecords::new(records).aggregate(metric_fields)
}
