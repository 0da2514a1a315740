use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::aggregate::{aggregate, GroupedRecords};
use crate::derived::{
    derive, derive_rate_style, derive_relative_to_baseline, ok_rate, rate_per_unit,
    DerivedMetrics,
};
use crate::schema::MetricSchema;
use crate::test_utils::{assert_close, record};
use crate::types::GroupKey;

fn relative(records: &[(u64, f64)]) -> Vec<(GroupKey, Option<f64>, Option<f64>)> {
    let records: Vec<_> =
        records.iter().map(|&(key, elapsed)| record(key, &[("elapsed_ms", elapsed)])).collect();
    derive_relative_to_baseline(&aggregate(&records, &["elapsed_ms"]), "elapsed_ms")
        .rows
        .into_iter()
        .map(|row| (row.key, row.speedup(), row.efficiency()))
        .collect()
}

#[rstest]
fn doubling_threads_halves_elapsed() {
    assert_eq!(
        relative(&[(1, 100.0), (2, 50.0)]),
        vec![(GroupKey(1), Some(1.0), Some(1.0)), (GroupKey(2), Some(2.0), Some(1.0))]
    );
}

#[rstest]
#[case::odd_mean(&[(3, 0.1), (3, 0.2), (3, 0.7)])]
#[case::large(&[(1, 1e12), (1, 3.3e12)])]
#[case::tiny(&[(2, 1e-7)])]
fn baseline_speedup_is_exactly_one(#[case] baseline_runs: &[(u64, f64)]) {
    let mut runs = baseline_runs.to_vec();
    runs.push((16, 0.05));
    let rows = relative(&runs);
    assert_eq!(rows[0].1, Some(1.0));
}

#[rstest]
fn huge_elapsed_times_keep_ratios_defined() {
    let rows = relative(&[(1, 1e308), (1, 1e308), (2, 1.5e308), (2, 1.7e308)]);
    assert_eq!(rows[0], (GroupKey(1), Some(1.0), Some(1.0)));
    let (_, speedup, efficiency) = rows[1];
    assert_close(speedup.unwrap(), 1.0 / 1.6);
    assert_close(efficiency.unwrap(), 0.5 / 1.6);
}

#[rstest]
fn speedup_beyond_f64_is_undefined() {
    let rows = relative(&[(1, 1e308), (2, 1e-10)]);
    assert_eq!(rows[1], (GroupKey(2), None, None));
}

#[rstest]
fn baseline_is_smallest_key_not_one() {
    let records = vec![
        record(8, &[("elapsed_ms", 20.0)]),
        record(4, &[("elapsed_ms", 40.0)]),
        record(16, &[("elapsed_ms", 10.0)]),
    ];
    let table = derive_relative_to_baseline(&aggregate(&records, &["elapsed_ms"]), "elapsed_ms");
    assert_eq!(table.baseline_key, Some(GroupKey(4)));
    assert_eq!(table.rows[0].speedup(), Some(1.0));
    assert_eq!(table.rows[1].speedup(), Some(2.0));
    assert_close(table.rows[0].efficiency().unwrap(), 0.25);
}

#[rstest]
fn efficiency_is_speedup_per_key() {
    for (key, speedup, efficiency) in
        relative(&[(1, 97.0), (1, 103.0), (2, 55.0), (3, 41.0), (6, 23.5), (12, 19.0)])
    {
        assert_close(efficiency.unwrap(), speedup.unwrap() / key.as_f64());
    }
}

#[rstest]
fn super_linear_scaling_is_kept() {
    let rows = relative(&[(1, 100.0), (4, 20.0)]);
    assert_eq!(rows[1].1, Some(5.0));
    assert_eq!(rows[1].2, Some(1.25));
}

#[rstest]
fn empty_aggregate_has_no_baseline() {
    let table = derive_relative_to_baseline(&[], "elapsed_ms");
    assert_eq!(table.baseline_key, None);
    assert!(table.rows.is_empty());
}

#[rstest]
#[case::all_ok(5.0, 0.0, Some(1.0))]
#[case::mixed(90.0, 10.0, Some(0.9))]
#[case::all_failed(0.0, 4.0, Some(0.0))]
#[case::nothing_sent(0.0, 0.0, None)]
#[case::huge_counts(1e308, 1e308, Some(0.5))]
fn ok_rate_cases(#[case] ok: f64, #[case] fail: f64, #[case] expected: Option<f64>) {
    assert_eq!(ok_rate(ok, fail), expected);
}

#[rstest]
fn rate_per_unit_guards_zero_key() {
    assert_eq!(rate_per_unit(100.0, GroupKey(4)), Some(25.0));
    assert_eq!(rate_per_unit(100.0, GroupKey(0)), None);
}

#[rstest]
fn grouped_ok_rate_is_mean_of_run_rates() {
    let records = vec![
        record(10, &[("rps", 200.0), ("ok", 90.0), ("fail", 10.0)]),
        record(10, &[("rps", 300.0), ("ok", 80.0), ("fail", 0.0)]),
    ];
    let table = derive_rate_style(&GroupedRecords::new(&records), "rps", "ok", "fail");

    assert_eq!(table.baseline_key, None);
    let row = &table.rows[0];
    let ok_rate = row.ok_rate().unwrap();
    assert_eq!(ok_rate.count, 2);
    assert_close(ok_rate.mean.unwrap(), 0.95);
    assert_close(row.rate_per_unit().unwrap().mean.unwrap(), 25.0);
    assert_eq!(row.efficiency(), None);
}

#[rstest]
fn ok_rate_ignores_empty_denominators() {
    let records = vec![
        record(2, &[("rps", 10.0), ("ok", 0.0), ("fail", 0.0)]),
        record(2, &[("rps", 10.0), ("ok", 3.0), ("fail", 1.0)]),
        record(4, &[("rps", 10.0), ("ok", 0.0), ("fail", 0.0)]),
        record(4, &[("rps", 12.0), ("ok", 0.0), ("fail", 0.0)]),
    ];
    let table = derive_rate_style(&GroupedRecords::new(&records), "rps", "ok", "fail");

    assert_eq!(table.rows.len(), 2);
    let partial = table.rows[0].ok_rate().unwrap();
    assert_eq!((partial.count, partial.mean), (1, Some(0.75)));
    let undefined = table.rows[1].ok_rate().unwrap();
    assert_eq!((undefined.count, undefined.mean, undefined.std), (0, None, None));
    // The per-unit rate of the same group is still defined.
    assert_eq!(table.rows[1].rate_per_unit().unwrap().mean, Some(2.75));
}

#[rstest]
fn derive_follows_schema_family() {
    let records = vec![
        record(1, &[("elapsed_ms", 10.0), ("rps", 5.0), ("ok", 1.0), ("fail", 0.0)]),
        record(2, &[("elapsed_ms", 5.0), ("rps", 8.0), ("ok", 1.0), ("fail", 1.0)]),
    ];
    let grouped = GroupedRecords::new(&records);
    let aggregate = grouped.aggregate(&["elapsed_ms", "rps"]);

    let build = derive(&MetricSchema::build().derivation, &aggregate, &grouped);
    assert_eq!(build.baseline_key, Some(GroupKey(1)));
    assert_eq!(
        build.rows[1].metrics,
        DerivedMetrics::RelativeToBaseline { speedup: Some(2.0), efficiency: Some(1.0) }
    );

    let search = derive(&MetricSchema::search().derivation, &aggregate, &grouped);
    assert_eq!(search.baseline_key, None);
    assert_eq!(search.rows[1].ok_rate().unwrap().mean, Some(0.5));
    assert_eq!(search.rows[1].rate_per_unit().unwrap().mean, Some(4.0));
    assert_eq!(search.rows[1].efficiency(), None);
}
