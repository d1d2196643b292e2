use semantic_manifest::enums::{AggregationType, MetricType};
use semantic_manifest::error::{ManifestError, ParseErrorKind};
use semantic_manifest::{load, parse, serialize, transform};

const MANIFEST: &str = r#"
semantic_models:
  - name: Bookings_Source
    node_relation:
      alias: bookings_source
      schema_name: main
    entities:
      - name: booking
        type: primary
    dimensions:
      - name: ds
        type: time
        type_params:
          time_granularity: day
          is_primary: true
      - name: is_instant
        type: categorical
    measures:
      - name: bookings
        agg: count
        expr: booking_id
        create_metric: true
      - name: all_rows
        agg: count
        expr: "1"
      - name: instant_bookings
        agg: sum_boolean
        expr: is_instant
      - name: median_value
        agg: median
        expr: booking_value
metrics:
  - name: Total_Bookings
    type: simple
    type_params:
      measure: bookings
"#;

// ─── parse ──────────────────────────────────────────────────────────────────

#[test]
fn parse_reads_models_and_metrics() {
    let manifest = parse(MANIFEST).unwrap();
    assert_eq!(manifest.semantic_models.len(), 1);
    assert_eq!(manifest.semantic_models[0].measures.len(), 4);
    assert_eq!(manifest.metrics[0].metric_type, MetricType::Simple);
    assert_eq!(
        manifest.metrics[0].type_params.measure.as_ref().map(|m| m.name.as_str()),
        Some("bookings")
    );
    assert!(manifest.saved_queries.is_empty());
}

#[test]
fn parse_accepts_json() {
    let manifest = parse(r#"{"metrics": [], "semantic_models": []}"#).unwrap();
    assert!(manifest.metrics.is_empty());
}

#[test]
fn parse_rejects_empty_input() {
    let err = parse("   \n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn parse_rejects_non_mapping_root() {
    let err = parse("- a\n- b\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
}

#[test]
fn parse_rejects_unknown_top_level_field() {
    let err = parse("metrics: []\nmeasures: []\n").unwrap_err();
    assert!(err.message.contains("measures"), "{}", err);
}

#[test]
fn parse_rejects_multiple_documents() {
    let err = parse("---\nmetrics: []\n---\nmetrics: []\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.line, Some(3));
    assert!(err.to_string().starts_with("3:1: "), "{}", err);
}

#[test]
fn parse_error_without_position_renders_message_only() {
    let err = parse("- a\n").unwrap_err();
    assert_eq!(err.to_string(), err.message);
}

#[test]
fn parse_reports_missing_fields_as_type_mismatch() {
    let err = parse("metrics:\n  - type: simple\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch, "{}", err);
    assert!(err.message.contains("missing field"), "{}", err);
}

#[test]
fn parse_rejects_unknown_metric_type() {
    let err = parse(
        r#"
metrics:
  - name: bookings
    type: fancy
"#,
    )
    .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownVariant, "{}", err);
}

// ─── transform ──────────────────────────────────────────────────────────────

#[test]
fn transform_rewrites_aggregations() {
    let manifest = transform(parse(MANIFEST).unwrap()).unwrap();
    let model = &manifest.semantic_models[0];

    let bookings = model.measure("bookings").unwrap();
    assert_eq!(bookings.agg, AggregationType::Sum);
    assert_eq!(
        bookings.expr.as_deref(),
        Some("CASE WHEN booking_id IS NOT NULL THEN 1 ELSE 0 END")
    );

    let all_rows = model.measure("all_rows").unwrap();
    assert_eq!(all_rows.agg, AggregationType::Sum);
    assert_eq!(all_rows.expr.as_deref(), Some("1"));

    let instant = model.measure("instant_bookings").unwrap();
    assert_eq!(instant.agg, AggregationType::Sum);
    assert_eq!(instant.expr.as_deref(), Some("CASE WHEN is_instant THEN 1 ELSE 0 END"));

    let median = model.measure("median_value").unwrap();
    assert_eq!(median.agg, AggregationType::Percentile);
    assert_eq!(median.agg_params.as_ref().and_then(|p| p.percentile), Some(0.5));
}

#[test]
fn transform_lowercases_names() {
    let manifest = transform(parse(MANIFEST).unwrap()).unwrap();
    assert_eq!(manifest.semantic_models[0].name, "bookings_source");
    assert!(manifest.metric("total_bookings").is_some());
}

#[test]
fn transform_defaults_agg_time_dimension_and_adds_proxy_metrics() {
    let manifest = transform(parse(MANIFEST).unwrap()).unwrap();
    let model = &manifest.semantic_models[0];
    assert!(
        model
            .measures
            .iter()
            .all(|m| m.agg_time_dimension.as_deref() == Some("ds"))
    );

    let proxy = manifest.metric("bookings").expect("proxy metric");
    assert_eq!(proxy.metric_type, MetricType::Simple);
    assert_eq!(
        proxy.type_params.measure.as_ref().map(|m| m.name.as_str()),
        Some("bookings")
    );
    assert_eq!(manifest.metrics.len(), 2);
}

#[test]
fn transform_is_idempotent() {
    let once = transform(parse(MANIFEST).unwrap()).unwrap();
    let twice = transform(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn transform_rejects_count_without_expr() {
    let input = MANIFEST.replace("        expr: booking_id\n", "");
    let err = transform(parse(&input).unwrap()).unwrap_err();
    assert!(err.message.contains("requires an expr"), "{}", err);
}

// ─── serialize ──────────────────────────────────────────────────────────────

#[test]
fn serialize_round_trips_through_parse() {
    let manifest = transform(parse(MANIFEST).unwrap()).unwrap();
    let json = serialize(&manifest).unwrap();
    assert!(json.contains("\"semantic_models\""));
    let reparsed = parse(&json).unwrap();
    assert_eq!(reparsed, manifest);
}

#[test]
fn serialize_omits_absent_optionals() {
    let json = serialize(&parse(MANIFEST).unwrap()).unwrap();
    assert!(!json.contains("\"description\""), "{}", json);
}

// ─── load ───────────────────────────────────────────────────────────────────

#[test]
fn load_returns_transformed_manifest() {
    let result = load(MANIFEST).unwrap_or_else(|errors| {
        panic!(
            "{:#?}",
            errors.iter().map(ToString::to_string).collect::<Vec<_>>()
        )
    });
    assert!(result.manifest.metric("bookings").is_some());
    assert!(result.issues.iter().all(|i| !i.is_blocking()));
}

#[test]
fn load_reports_parse_errors() {
    let errors = load("").unwrap_err();
    assert!(matches!(errors.as_slice(), [ManifestError::Parse(_)]));
}

#[test]
fn load_reports_transform_errors() {
    let input = MANIFEST.replace("        expr: booking_id\n", "");
    let errors = load(&input).unwrap_err();
    assert!(matches!(errors.as_slice(), [ManifestError::Transform(_)]));
}

#[test]
fn load_reports_every_validation_error() {
    let input = format!(
        "{}{}",
        MANIFEST,
        r#"  - name: revenue
    type: simple
    type_params:
      measure: revenue
  - name: doubled
    type: derived
    type_params:
      expr: missing * 2
      metrics:
        - missing
"#
    );
    let errors = load(&input).unwrap_err();
    assert_eq!(errors.len(), 2, "{:#?}", errors);
    assert!(errors.iter().all(|e| matches!(e, ManifestError::Validation(_))));
}
