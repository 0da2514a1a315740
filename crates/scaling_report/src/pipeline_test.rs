use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::errors::{ReportError, SchemaError};
use crate::pipeline::run_pipeline;
use crate::raw_table::RawTable;
use crate::schema::{BenchmarkShape, MetricSchema};
use crate::test_utils::{assert_close, build_table, csv_table, search_table};
use crate::types::GroupKey;

#[rstest]
fn build_report_end_to_end() {
    let table = build_table(&[(1, 100.0), (2, 50.0)]);
    let report = run_pipeline(&table, &MetricSchema::build()).unwrap();

    assert_eq!(report.keys(), vec![GroupKey(1), GroupKey(2)]);
    assert_eq!(report.baseline_key(), Some(GroupKey(1)));
    assert_eq!(report.aggregate[0].mean("elapsed_ms"), Some(100.0));
    assert_eq!(report.aggregate[1].mean("elapsed_ms"), Some(50.0));
    let speedups: Vec<_> = report.derived.rows.iter().map(|row| row.speedup()).collect();
    assert_eq!(speedups, vec![Some(1.0), Some(2.0)]);
    let efficiencies: Vec<_> = report.derived.rows.iter().map(|row| row.efficiency()).collect();
    assert_eq!(efficiencies, vec![Some(1.0), Some(1.0)]);
}

#[rstest]
fn search_report_end_to_end() {
    let table = search_table(&[(10, 200.0, 90, 10), (10, 300.0, 80, 0), (20, 350.0, 0, 0)]);
    let report = run_pipeline(&table, &MetricSchema::search()).unwrap();

    assert_eq!(report.baseline_key(), None);
    assert_close(report.derived.rows[0].ok_rate().unwrap().mean.unwrap(), 0.95);
    assert_eq!(report.derived.rows[1].ok_rate().unwrap().mean, None);
    assert_eq!(report.aggregate[1].mean("p95_ms"), Some(60.0));
}

#[rstest]
fn missing_required_column_is_fatal() {
    let table = csv_table("threads,run,scanned\n1,0,10\n2,0,10\n");
    assert_matches!(
        run_pipeline(&table, &MetricSchema::build()),
        Err(ReportError::Schema(SchemaError::MissingColumns {
            shape: BenchmarkShape::Build,
            columns,
        })) if columns == vec!["elapsed_ms"]
    );
}

#[rstest]
fn nothing_left_after_validation() {
    let table = csv_table("threads,run,elapsed_ms\n0,0,10\n2,0,-1\n");
    assert_matches!(
        run_pipeline(&table, &MetricSchema::build()),
        Err(ReportError::EmptyDataset { n_raw_rows: 2, n_dropped: 2 })
    );
}

#[rstest]
#[case::build(MetricSchema::build(), build_table(&[(8, 9.0), (1, 60.0), (4, 15.0), (8, 11.0)]))]
#[case::search(
    MetricSchema::search(),
    search_table(&[(32, 900.0, 10, 0), (1, 40.0, 1, 0), (32, 950.0, 9, 1)])
)]
fn all_tables_share_keys(#[case] schema: MetricSchema, #[case] table: RawTable) {
    let report = run_pipeline(&table, &schema).unwrap();

    let keys = report.keys();
    let derived_keys: Vec<GroupKey> = report.derived.rows.iter().map(|row| row.key).collect();
    let distribution_keys: Vec<GroupKey> =
        report.distributions.iter().map(|group| group.key).collect();
    assert_eq!(derived_keys, keys);
    assert_eq!(distribution_keys, keys);
    for (row, group) in report.aggregate.iter().zip(&report.distributions) {
        assert_eq!(row.count, group.values.len());
    }
}

#[rstest]
fn invalid_rows_reach_no_output() {
    let table = csv_table("threads,run,elapsed_ms\n-2,0,10\n3,0,abc\n1,0,40\n1,1,44\n");
    let report = run_pipeline(&table, &MetricSchema::build()).unwrap();

    assert_eq!(report.n_dropped(), 2);
    assert_eq!(report.keys(), vec![GroupKey(1)]);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.aggregate[0].count, 2);
}

#[rstest]
fn huge_timings_keep_baseline_speedup_exact() {
    let table = csv_table("threads,run,elapsed_ms\n1,0,1e308\n1,1,1e308\n2,0,1e308\n2,1,1e308\n");
    let report = run_pipeline(&table, &MetricSchema::build()).unwrap();

    assert_eq!(report.aggregate[1].metric("elapsed_ms").unwrap().std, Some(0.0));
    let speedups: Vec<_> = report.derived.rows.iter().map(|row| row.speedup()).collect();
    assert_eq!(speedups, vec![Some(1.0), Some(1.0)]);
    assert_eq!(report.derived.rows[1].efficiency(), Some(0.5));
}
