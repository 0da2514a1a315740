use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::errors::SchemaError;
use crate::schema::{BenchmarkShape, FieldConstraint, MetricSchema, RequiredColumns};

#[rstest]
fn build_schema_columns() {
    let schema = MetricSchema::build();
    assert_eq!(schema.required_columns(), vec!["threads", "run", "elapsed_ms"]);
    assert_eq!(
        schema.tracked_metrics(),
        vec!["elapsed_ms", "scanned", "indexed", "skipped", "errors"]
    );
}

#[rstest]
fn search_schema_columns() {
    let schema = MetricSchema::search();
    assert_eq!(
        schema.required_columns(),
        vec!["clients", "run", "rps", "p50_ms", "p95_ms", "p99_ms", "ok", "fail"]
    );
    assert_eq!(schema.derivation.primary_metric(), "rps");
}

#[rstest]
#[case::build(BenchmarkShape::Build)]
#[case::search(BenchmarkShape::Search)]
fn schema_for_shape_matches(#[case] shape: BenchmarkShape) {
    assert_eq!(MetricSchema::for_shape(shape).shape, shape);
}

#[rstest]
fn check_columns_accepts_extra_columns() {
    let headers = ["threads", "run", "elapsed_ms", "host"];
    assert_eq!(MetricSchema::build().check_columns(&headers), Ok(()));
}

#[rstest]
fn check_columns_lists_every_missing_column() {
    let headers = ["clients", "run", "rps", "p50_ms"];
    assert_matches!(
        MetricSchema::search().check_columns(&headers),
        Err(SchemaError::MissingColumns { shape: BenchmarkShape::Search, columns })
            if columns == vec!["p95_ms", "p99_ms", "ok", "fail"]
    );
}

#[rstest]
fn locate_columns_follows_header_order() {
    let headers = ["host", "elapsed_ms", "run", "threads", "elapsed_ms"];
    assert_eq!(
        MetricSchema::build().locate_columns(&headers),
        Ok(RequiredColumns { independent: 3, run: 2, metrics: vec![1] })
    );
}

#[rstest]
fn locate_columns_reports_key_and_metrics_together() {
    let headers = ["run", "rps", "p50_ms", "p99_ms", "ok"];
    assert_matches!(
        MetricSchema::search().locate_columns(&headers),
        Err(SchemaError::MissingColumns { columns, .. })
            if columns == vec!["clients", "p95_ms", "fail"]
    );
}

#[rstest]
#[case::positive_zero(FieldConstraint::Positive, 0.0, false)]
#[case::positive_value(FieldConstraint::Positive, 0.5, true)]
#[case::count_zero(FieldConstraint::NonNegative, 0.0, true)]
#[case::count_negative(FieldConstraint::NonNegative, -1.0, false)]
fn field_constraints(#[case] constraint: FieldConstraint, #[case] value: f64, #[case] ok: bool) {
    assert_eq!(constraint.is_satisfied_by(value), ok);
}
