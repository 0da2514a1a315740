use std::collections::BTreeMap;

use crate::raw_table::RawTable;
use crate::types::{GroupKey, ValidatedRecord};

pub const BUILD_HEADER: &str = "threads,run,elapsed_ms,scanned,indexed,skipped,errors";
pub const SEARCH_HEADER: &str = "clients,run,rps,p50_ms,p95_ms,p99_ms,ok,fail,total,duration_s,topk";

pub fn csv_table(content: &str) -> RawTable {
    RawTable::from_reader(content.as_bytes()).unwrap()
}

/// A build table with one row per `(threads, elapsed_ms)` pair and run indices counting per row.
pub fn build_table(runs: &[(u64, f64)]) -> RawTable {
    let rows: String = runs
        .iter()
        .enumerate()
        .map(|(run, (threads, elapsed))| format!("{threads},{run},{elapsed},100,90,10,0\n"))
        .collect();
    csv_table(&format!("{BUILD_HEADER}\n{rows}"))
}

/// A search table with one row per `(clients, rps, ok, fail)` tuple. Latencies grow with clients.
pub fn search_table(runs: &[(u64, f64, u64, u64)]) -> RawTable {
    let rows: String = runs
        .iter()
        .enumerate()
        .map(|(run, (clients, rps, ok, fail))| {
            let p50 = 2 * clients;
            let p95 = 3 * clients;
            let p99 = 4 * clients;
            format!("{clients},{run},{rps},{p50},{p95},{p99},{ok},{fail},{},30,10\n", ok + fail)
        })
        .collect();
    csv_table(&format!("{SEARCH_HEADER}\n{rows}"))
}

pub fn record(key: u64, metrics: &[(&'static str, f64)]) -> ValidatedRecord {
    ValidatedRecord {
        key: GroupKey(key),
        run_index: Some(0),
        metrics: metrics.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!((actual - expected).abs() < tolerance, "expected {expected}, got {actual}");
}
