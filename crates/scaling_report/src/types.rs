use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

/// A distinct value of the independent variable (thread count or client count).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupKey(pub u64);

impl GroupKey {
    pub fn as_f64(&self) -> f64 {
        #[allow(clippy::as_conversions)]
        {
            self.0 as f64
        }
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A benchmark run that passed validation.
///
/// `metrics` holds only defined values: a metric missing from the map was absent or unparsable in
/// the input. Required metrics are always present.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidatedRecord {
    pub key: GroupKey,
    pub run_index: Option<i64>,
    pub metrics: BTreeMap<&'static str, f64>,
}

impl ValidatedRecord {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}
