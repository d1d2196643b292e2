use semantic_manifest::error::ValidationIssueLevel;
use semantic_manifest::parse::parse;
use semantic_manifest::validate::validate;
use semantic_manifest::{SemanticManifestValidationResults, ValidationIssue};

const MODELS: &str = r#"
semantic_models:
  - name: bookings_source
    node_relation:
      alias: bookings_source
      schema_name: main
    defaults:
      agg_time_dimension: ds
    entities:
      - name: booking
        type: primary
      - name: listing
        type: foreign
    dimensions:
      - name: ds
        type: time
        type_params:
          time_granularity: day
      - name: is_instant
        type: categorical
    measures:
      - name: bookings
        agg: sum
        expr: "1"
      - name: booking_value
        agg: sum
  - name: listings_source
    node_relation:
      alias: listings_source
      schema_name: main
    defaults:
      agg_time_dimension: created_at
    entities:
      - name: listing
        type: primary
    dimensions:
      - name: created_at
        type: time
        type_params:
          time_granularity: day
      - name: country
        type: categorical
    measures:
      - name: listings
        agg: count_distinct
        expr: listing_id
"#;

const BASE_METRICS: &str = r#"
  - name: bookings
    type: simple
    type_params:
      measure: bookings
  - name: listings
    type: simple
    type_params:
      measure: listings
"#;

/// Helper: the two base models, the base metrics plus `metrics`, then `rest`.
fn validate_yaml(metrics: &str, rest: &str) -> SemanticManifestValidationResults {
    let input = format!("{}metrics:{}{}{}", MODELS, BASE_METRICS, metrics, rest);
    let manifest = parse(&input).expect("parse should succeed");
    validate(&manifest)
}

/// Helper: the two base models plus `extra_models`, then the base metrics.
fn validate_models(extra_models: &str) -> SemanticManifestValidationResults {
    let input = format!("{}{}metrics:{}", MODELS, extra_models, BASE_METRICS);
    validate(&parse(&input).expect("parse should succeed"))
}

/// Helper: the base manifest with `find` replaced by `replace` in the models.
fn validate_edited_models(find: &str, replace: &str) -> SemanticManifestValidationResults {
    assert!(MODELS.contains(find), "fixture does not contain {:?}", find);
    let input = format!("{}metrics:{}", MODELS.replacen(find, replace, 1), BASE_METRICS);
    validate(&parse(&input).expect("parse should succeed"))
}

fn assert_clean(results: &SemanticManifestValidationResults) {
    assert!(
        results.all_issues().is_empty(),
        "unexpected issues: {:#?}",
        results.all_issues()
    );
}

fn messages(issues: &[&ValidationIssue]) -> Vec<String> {
    issues.iter().map(|i| i.message.clone()).collect()
}

/// Helper: assert some error message contains `needle`.
fn assert_has_error(results: &SemanticManifestValidationResults, needle: &str) {
    assert!(
        results.errors().iter().any(|e| e.message.contains(needle)),
        "expected an error containing {:?}, got: {:#?}",
        needle,
        messages(&results.errors())
    );
}

fn assert_has_warning(results: &SemanticManifestValidationResults, needle: &str) {
    assert!(
        results.warnings().iter().any(|e| e.message.contains(needle)),
        "expected a warning containing {:?}, got: {:#?}",
        needle,
        messages(&results.warnings())
    );
}

// ─── Baseline ───────────────────────────────────────────────────────────────

#[test]
fn base_manifest_is_clean() {
    let results = validate_yaml("", "");
    assert!(
        results.all_issues().is_empty(),
        "unexpected issues: {:#?}",
        results.all_issues()
    );
}

#[test]
fn empty_manifest_reports_missing_models_and_metrics() {
    let manifest = parse("metrics: []").unwrap();
    let results = validate(&manifest);
    assert_has_error(&results, "No semantic models present in the model.");
    assert_has_error(&results, "No metrics present in the model.");
}

#[test]
fn create_metric_measure_satisfies_metric_requirement() {
    let input = MODELS.replace("        expr: \"1\"", "        expr: \"1\"\n        create_metric: true");
    let manifest = parse(&input).unwrap();
    let results = validate(&manifest);
    assert!(
        !results
            .errors()
            .iter()
            .any(|e| e.message.contains("No metrics present")),
        "{:#?}",
        results.errors()
    );
}

// ─── Names ──────────────────────────────────────────────────────────────────

#[test]
fn duplicate_metric_name_is_an_error() {
    let results = validate_yaml(
        r#"
  - name: bookings
    type: simple
    type_params:
      measure: booking_value
"#,
        "",
    );
    assert_has_error(
        &results,
        "Can't use name `bookings` for a metric when it was already used for a metric",
    );
}

#[test]
fn invalid_metric_names_are_errors() {
    for name in ["Bookings", "bookings_", "book__ings", "x"] {
        let results = validate_yaml(
            &format!(
                r#"
  - name: {}
    type: simple
    type_params:
      measure: booking_value
"#,
                name
            ),
            "",
        );
        assert_has_error(&results, &format!("Invalid name `{}`", name));
    }
}

#[test]
fn granularity_and_engine_names_are_reserved() {
    for name in ["month", "metric_time"] {
        let results = validate_yaml(
            &format!(
                r#"
  - name: {}
    type: simple
    type_params:
      measure: booking_value
"#,
                name
            ),
            "",
        );
        assert_has_error(&results, &format!("Invalid name `{}`", name));
    }
}

#[test]
fn measure_defined_in_two_models_is_an_error() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replace("      - name: listings\n        agg: count_distinct", "      - name: bookings\n        agg: count_distinct"),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    assert_has_error(&results, "Found measure with name bookings in multiple semantic models");
}

#[test]
fn reserved_sql_keyword_dimension_is_an_error() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replace("      - name: country\n", "      - name: select\n"),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    assert_has_error(
        &results,
        "'select' is an SQL reserved keyword, and thus cannot be used as a dimension 'name'.",
    );
}

#[test]
fn duplicated_semantic_model_is_exactly_one_error() {
    let start = MODELS.find("  - name: bookings_source").unwrap();
    let end = MODELS.find("  - name: listings_source").unwrap();
    let results = validate_models(&MODELS[start..end]);

    assert_eq!(results.all_issues().len(), 1, "{:#?}", results.all_issues());
    assert_has_error(
        &results,
        "Can't use name `bookings_source` for a semantic model when it was already used for a semantic model",
    );
}

#[test]
fn duplicated_saved_query_is_exactly_one_error() {
    let saved_query = r#"
  - name: bookings_by_country
    query_params:
      metrics:
        - bookings
      group_by:
        - "Dimension('listing__country')"
      limit: 10
"#;
    let once = validate_yaml("", &format!("saved_queries:{}", saved_query));
    assert_clean(&once);

    let twice = validate_yaml("", &format!("saved_queries:{}{}", saved_query, saved_query));
    assert_eq!(twice.all_issues().len(), 1, "{:#?}", twice.all_issues());
    assert_has_error(
        &twice,
        "Can't use name `bookings_by_country` for a saved query when it was already used for a saved query",
    );
}

#[test]
fn duplicate_model_labels_and_element_labels() {
    let results = validate_models(
        r#"
  - name: hosts_source
    label: Hosts
    node_relation:
      alias: hosts_source
      schema_name: main
    entities:
      - name: host
        type: primary
        label: Host
    dimensions:
      - name: host_name
        type: categorical
        label: Host
  - name: hosts_history
    label: Hosts
    node_relation:
      alias: hosts_history
      schema_name: main
    entities:
      - name: host_version
        type: primary
"#,
    );
    assert_has_error(&results, "Semantic model label `Hosts` is used by multiple semantic models");
    assert_has_error(&results, "label `Host` is used by both `host` and `host_name`");
}

#[test]
fn distinct_labels_are_clean() {
    let results = validate_models(
        r#"
  - name: hosts_source
    label: Hosts
    node_relation:
      alias: hosts_source
      schema_name: main
    entities:
      - name: host
        type: primary
        label: Host
    dimensions:
      - name: host_name
        type: categorical
        label: Host name
"#,
    );
    assert_clean(&results);
}

// ─── Semantic models ────────────────────────────────────────────────────────

#[test]
fn two_primary_time_dimensions_are_errors() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replacen(
            "          time_granularity: day\n      - name: is_instant",
            "          time_granularity: day\n          is_primary: true\n      - name: ds_alt\n        type: time\n        type_params:\n          time_granularity: day\n          is_primary: true\n      - name: is_instant",
            1
        ),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    let hits: Vec<_> = results
        .errors()
        .into_iter()
        .filter(|e| e.message.contains("is one of many defined as primary."))
        .collect();
    assert_eq!(hits.len(), 2, "{:#?}", results.errors());
}

#[test]
fn dimension_type_conflict_across_models() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replace(
            "      - name: country\n        type: categorical",
            "      - name: country\n        type: categorical\n      - name: ds\n        type: categorical"
        ),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    assert_has_error(&results, "type conflict for dimension `ds`");
}

#[test]
fn missing_agg_time_dimension_is_an_error() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replace("      agg_time_dimension: ds", "      agg_time_dimension: booked_at"),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    assert!(
        results.errors().iter().any(|e| e.message.contains("booked_at")),
        "{:#?}",
        results.errors()
    );
}

#[test]
fn count_measure_without_expr_is_an_error() {
    let input = format!(
        "{}metrics:{}",
        MODELS.replace("      - name: booking_value\n        agg: sum", "      - name: booking_value\n        agg: count"),
        BASE_METRICS
    );
    let results = validate(&parse(&input).unwrap());
    assert!(
        results
            .errors()
            .iter()
            .any(|e| e.message.contains("booking_value") && e.message.to_lowercase().contains("count")),
        "{:#?}",
        results.errors()
    );
}

const LISTINGS_SCD: &str = r#"
  - name: listings_scd
    node_relation:
      alias: listings_scd
      schema_name: main
    entities:
      - name: listing
        type: natural
    dimensions:
      - name: window_start
        type: time
        type_params:
          time_granularity: day
          validity_params:
            is_start: true
      - name: window_end
        type: time
        type_params:
          time_granularity: day
          validity_params:
            is_end: true
      - name: tier
        type: categorical
"#;

#[test]
fn natural_keyed_validity_window_model_is_clean() {
    assert_clean(&validate_models(LISTINGS_SCD));
}

#[test]
fn validity_window_model_rejects_keys_and_measures() {
    let extra = format!(
        "{}{}",
        LISTINGS_SCD.replace(
            "        type: natural\n",
            "        type: natural\n      - name: listing_version\n        type: primary\n",
        ),
        r#"    measures:
      - name: tier_changes
        agg: sum
        expr: "1"
        agg_time_dimension: window_start
"#
    );
    let results = validate_models(&extra);
    assert_has_error(&results, "also has primary or unique entities (listing_version)");
    assert_has_error(&results, "also has measures (tier_changes)");
}

#[test]
fn validity_window_needs_one_start_and_one_end() {
    let extra = LISTINGS_SCD.replace("            is_end: true", "            is_start: true");
    let results = validate_models(&extra);
    assert_has_error(&results, "There must be exactly one start and one end dimension.");
}

#[test]
fn validity_window_needs_a_natural_entity() {
    let extra = LISTINGS_SCD.replace("        type: natural", "        type: foreign");
    let results = validate_models(&extra);
    assert_has_error(&results, "must have exactly one natural entity, but found 0.");
}

const REVIEWS_SOURCE: &str = r#"
  - name: reviews_source
    node_relation:
      alias: reviews_source
      schema_name: main
    entities:
      - name: listing
        type: foreign
    dimensions:
      - name: rating
        type: categorical
"#;

#[test]
fn model_with_dimensions_needs_a_primary_entity() {
    let results = validate_models(REVIEWS_SOURCE);
    assert_has_error(
        &results,
        "The semantic model 'reviews_source' contains dimensions, but it does not define a primary entity.",
    );
}

#[test]
fn explicit_primary_entity_satisfies_the_requirement() {
    let extra = REVIEWS_SOURCE.replace(
        "    entities:
",
        "    primary_entity: review
    entities:
",
    );
    assert_clean(&validate_models(&extra));
}

#[test]
fn two_primary_entities_are_an_error() {
    let extra = REVIEWS_SOURCE.replace(
        "        type: foreign
",
        "        type: primary
      - name: review
        type: primary
",
    );
    let results = validate_models(&extra);
    assert_has_error(&results, "has multiple primary entities (listing, review)");
}

#[test]
fn primary_entity_dimension_pair_in_two_models_is_an_error() {
    let results = validate_models(
        r#"
  - name: listing_attributes
    node_relation:
      alias: listing_attributes
      schema_name: main
    entities:
      - name: listing
        type: primary
    dimensions:
      - name: country
        type: categorical
"#,
    );
    assert_has_error(&results, "The reference `listing__country` would be ambiguous.");
}

#[test]
fn primary_entity_with_new_dimension_is_clean() {
    let results = validate_models(
        r#"
  - name: listing_attributes
    node_relation:
      alias: listing_attributes
      schema_name: main
    entities:
      - name: listing
        type: primary
    dimensions:
      - name: region
        type: categorical
"#,
    );
    assert_clean(&results);
}

const BOOKING_EVENTS: &str = r#"
  - name: booking_events
    node_relation:
      alias: booking_events
      schema_name: main
    entities:
      - name: booking_event
        type: primary
    dimensions:
      - name: ds
        type: time
        type_params:
          time_granularity: day
"#;

#[test]
fn shared_dimension_with_same_attributes_is_clean() {
    assert_clean(&validate_models(BOOKING_EVENTS));
}

#[test]
fn shared_dimension_partition_and_granularity_conflicts() {
    let extra = BOOKING_EVENTS
        .replace("        type: time
", "        type: time
        is_partition: true
")
        .replace("time_granularity: day", "time_granularity: week");
    let results = validate_models(&extra);
    assert_has_error(&results, "conflicting is_partition attribute for dimension `ds`");
    assert_has_error(&results, "time granularity conflict for dimension `ds`");
}

#[test]
fn element_name_used_as_two_kinds_is_an_error() {
    let results = validate_models(
        r#"
  - name: hosts_source
    node_relation:
      alias: hosts_source
      schema_name: main
    entities:
      - name: host
        type: primary
    dimensions:
      - name: listing
        type: categorical
"#,
    );
    assert_has_error(&results, "element `listing` is of type dimension");
}

#[test]
fn element_name_reused_as_same_kind_is_clean() {
    let results = validate_models(
        r#"
  - name: hosts_source
    node_relation:
      alias: hosts_source
      schema_name: main
    entities:
      - name: host
        type: primary
      - name: listing
        type: foreign
    dimensions:
      - name: host_name
        type: categorical
"#,
    );
    assert_clean(&results);
}

// ─── Measures ───────────────────────────────────────────────────────────────

const BOOKING_VALUE: &str = "      - name: booking_value\n        agg: sum\n";

#[test]
fn percentile_measure_in_range_is_clean() {
    let results = validate_edited_models(
        BOOKING_VALUE,
        "      - name: booking_value\n        agg: percentile\n        agg_params:\n          percentile: 0.9\n",
    );
    assert_clean(&results);
}

#[test]
fn percentile_measure_params_are_checked() {
    let missing = validate_edited_models(
        BOOKING_VALUE,
        "      - name: booking_value\n        agg: percentile\n",
    );
    assert_has_error(
        &missing,
        "Percentile aggregation parameters for the measure booking_value must contain percentile.",
    );

    let out_of_range = validate_edited_models(
        BOOKING_VALUE,
        "      - name: booking_value\n        agg: percentile\n        agg_params:\n          percentile: 1.5\n          use_discrete_percentile: true\n          use_approximate_percentile: true\n",
    );
    assert_has_error(&out_of_range, "is 1.5, but must be between 0 and 1 (non-inclusive)");
    assert_has_error(&out_of_range, "set both use_discrete_percentile and use_approximate_percentile");

    let misplaced = validate_edited_models(
        BOOKING_VALUE,
        "      - name: booking_value\n        agg: sum\n        agg_params:\n          percentile: 0.5\n",
    );
    assert_has_error(&misplaced, "cannot be used with percentile");
}

fn with_non_additive(name: &str, window_choice: &str, grouping: &str) -> String {
    format!(
        "      - name: booking_value\n        agg: sum\n        non_additive_dimension:\n          name: {}\n          window_choice: {}\n          window_groupings:\n            - {}\n",
        name, window_choice, grouping
    )
}

#[test]
fn non_additive_dimension_on_agg_time_dimension_is_clean() {
    let results = validate_edited_models(BOOKING_VALUE, &with_non_additive("ds", "max", "listing"));
    assert_clean(&results);
}

#[test]
fn non_additive_dimension_must_exist_and_be_time() {
    let missing = validate_edited_models(BOOKING_VALUE, &with_non_additive("booked_at", "min", "listing"));
    assert_has_error(
        &missing,
        "has a non_additive_dimension with name 'booked_at' that is not defined as a dimension in semantic model 'bookings_source'.",
    );

    let categorical =
        validate_edited_models(BOOKING_VALUE, &with_non_additive("is_instant", "min", "listing"));
    assert_has_error(
        &categorical,
        "that is defined as a categorical dimension which is not supported.",
    );
}

#[test]
fn non_additive_dimension_grain_must_match_agg_time_dimension() {
    let edited = MODELS
        .replacen(
            "      - name: is_instant\n        type: categorical\n",
            "      - name: is_instant\n        type: categorical\n      - name: booked_month\n        type: time\n        type_params:\n          time_granularity: month\n",
            1,
        )
        .replacen(BOOKING_VALUE, &with_non_additive("booked_month", "min", "listing"), 1);
    let results = validate(&parse(&format!("{}metrics:{}", edited, BASE_METRICS)).unwrap());
    assert_has_error(
        &results,
        "has a base time granularity (month) that is not equal to the measure agg_time_dimension 'ds'",
    );
}

#[test]
fn non_additive_window_choice_and_groupings_are_checked() {
    let results = validate_edited_models(BOOKING_VALUE, &with_non_additive("ds", "sum", "guest"));
    assert_has_error(&results, "invalid 'window_choice' of 'sum'");
    assert_has_error(
        &results,
        "These entities [guest] do not exist in the semantic model 'bookings_source'.",
    );
}

// ─── Metrics ────────────────────────────────────────────────────────────────

#[test]
fn undefined_measure_is_an_error() {
    let results = validate_yaml(
        r#"
  - name: revenue
    type: simple
    type_params:
      measure: revenue
"#,
        "",
    );
    assert_has_error(
        &results,
        "Measure revenue referenced in metric revenue is not defined in the model!",
    );
}

#[test]
fn cumulative_window_with_unknown_granularity() {
    let results = validate_yaml(
        r#"
  - name: weekly_bookings
    type: cumulative
    type_params:
      measure: bookings
      cumulative_type_params:
        window: 7 moons
"#,
        "",
    );
    assert_has_error(&results, "Invalid time granularity moon");
}

#[test]
fn cumulative_window_and_grain_to_date_are_exclusive() {
    let results = validate_yaml(
        r#"
  - name: running_bookings
    type: cumulative
    type_params:
      measure: bookings
      cumulative_type_params:
        window: 7 days
        grain_to_date: month
"#,
        "",
    );
    assert_has_error(&results, "Both window and grain_to_date set for cumulative metric.");
}

#[test]
fn legacy_cumulative_window_is_a_future_error() {
    let results = validate_yaml(
        r#"
  - name: trailing_bookings
    type: cumulative
    type_params:
      measure: bookings
      window: 28 days
"#,
        "",
    );
    assert!(results.errors().is_empty(), "{:#?}", results.errors());
    assert_eq!(results.future_errors().len(), 1);
    assert!(!results.has_blocking_issues());
}

#[test]
fn derived_metric_with_missing_input_is_exactly_one_error() {
    let results = validate_yaml(
        r#"
  - name: doubled
    type: derived
    type_params:
      expr: nonexistent * 2
      metrics:
        - nonexistent
"#,
        "",
    );
    assert_eq!(results.errors().len(), 1, "{:#?}", results.errors());
    assert_has_error(
        &results,
        "input metric: 'nonexistent' does not exist as a configured metric in the model.",
    );
}

#[test]
fn derived_metric_input_not_in_expr() {
    let results = validate_yaml(
        r#"
  - name: ratio_ish
    type: derived
    type_params:
      expr: bookings * 2
      metrics:
        - bookings
        - name: listings
          alias: listing_count
"#,
        "",
    );
    assert_has_error(&results, "Input metric 'listing_count' is not used in `expr`");
}

#[test]
fn derived_metric_input_must_appear_as_a_whole_word() {
    let results = validate_yaml(
        r#"
  - name: bookings_plus
    type: derived
    type_params:
      expr: (bookings_total + listings) / listings_v2
      metrics:
        - name: bookings
          alias: bookings_total
        - listings
        - name: listings
          alias: listings_v
"#,
        "",
    );
    assert_has_error(&results, "Input metric 'listings_v' is not used in `expr`");
    assert!(
        !results
            .errors()
            .iter()
            .any(|e| e.message.contains("'bookings_total' is not used")
                || e.message.contains("'listings' is not used")),
        "{:#?}",
        results.errors()
    );
}

#[test]
fn derived_metric_offsets_are_exclusive() {
    let results = validate_yaml(
        r#"
  - name: bookings_growth
    type: derived
    type_params:
      expr: bookings - prior
      metrics:
        - bookings
        - name: bookings
          alias: prior
          offset_window: 1 week
          offset_to_grain: month
"#,
        "",
    );
    assert_has_error(&results, "Both offset_window and offset_to_grain set");
}

#[test]
fn derived_metric_without_expr_is_a_warning() {
    let results = validate_yaml(
        r#"
  - name: passthrough
    type: derived
    type_params:
      metrics:
        - bookings
"#,
        "",
    );
    assert!(results.errors().is_empty(), "{:#?}", results.errors());
    assert_has_warning(&results, "No `expr` set for derived metric `passthrough`");
}

#[test]
fn conversion_metric_requires_counting_measures() {
    let results = validate_yaml(
        r#"
  - name: visit_to_buy
    type: conversion
    type_params:
      conversion_type_params:
        base_measure: listings
        conversion_measure: booking_value
        entity: listing
"#,
        "",
    );
    assert_has_error(
        &results,
        "For conversion metrics, the measure must be COUNT/SUM(1)/COUNT_DISTINCT. Measure: booking_value",
    );
}

#[test]
fn conversion_metric_entity_must_exist_in_both_models() {
    let results = validate_yaml(
        r#"
  - name: listing_to_booking
    type: conversion
    type_params:
      conversion_type_params:
        base_measure: listings
        conversion_measure: bookings
        entity: booking
        window: 7 days
"#,
        "",
    );
    assert_has_error(&results, "Entity: booking not found in base semantic model: listings_source.");
}

#[test]
fn conversion_constant_properties_must_exist() {
    let metric = |base_property: &str| {
        format!(
            r#"
  - name: listing_to_booking
    type: conversion
    type_params:
      conversion_type_params:
        base_measure: listings
        conversion_measure: bookings
        entity: listing
        window: 7 days
        constant_properties:
          - base_property: {}
            conversion_property: is_instant
"#,
            base_property
        )
    };

    assert_clean(&validate_yaml(&metric("country"), ""));

    let results = validate_yaml(&metric("region"), "");
    assert_has_error(
        &results,
        "The provided constant property: region, cannot be found in semantic model listings_source",
    );
}

#[test]
fn conversion_measure_filter_is_a_warning() {
    let results = validate_yaml(
        r#"
  - name: listing_to_instant_booking
    type: conversion
    type_params:
      conversion_type_params:
        base_measure: listings
        conversion_measure:
          name: bookings
          filter: "{{ Dimension('booking__is_instant') }}"
        entity: listing
"#,
        "",
    );
    assert!(results.errors().is_empty(), "{:#?}", results.errors());
    assert_has_warning(&results, "Measure input bookings has a filter.");
}

#[test]
fn cumulative_grain_to_date_must_be_a_known_granularity() {
    let metric = |grain: &str| {
        format!(
            r#"
  - name: bookings_to_date
    type: cumulative
    type_params:
      measure: bookings
      cumulative_type_params:
        grain_to_date: {}
"#,
            grain
        )
    };

    assert_clean(&validate_yaml(&metric("month"), ""));

    let results = validate_yaml(&metric("fortnight"), "");
    assert_has_error(
        &results,
        "Invalid time granularity `fortnight` for grain_to_date in cumulative metric `bookings_to_date`",
    );
}

#[test]
fn measure_alias_is_clean_when_unique() {
    let results = validate_yaml(
        r#"
  - name: aliased_bookings
    type: simple
    type_params:
      measure:
        name: bookings
        alias: booking_count
"#,
        "",
    );
    assert_clean(&results);
}

#[test]
fn measure_alias_conflicts_are_errors() {
    let results = validate_yaml(
        r#"
  - name: shadowing_bookings
    type: simple
    type_params:
      measure:
        name: bookings
        alias: listings
  - name: aliased_bookings
    type: simple
    type_params:
      measure:
        name: bookings
        alias: booking_measure
  - name: aliased_value
    type: simple
    type_params:
      measure:
        name: booking_value
        alias: booking_measure
"#,
        "",
    );
    assert_has_error(
        &results,
        "Alias `listings` for measure `bookings` in metric `shadowing_bookings` conflicts with measure `listings`",
    );
    assert_has_error(
        &results,
        "Measure alias `booking_measure` is used for different measures (bookings, booking_value)",
    );
}

#[test]
fn duplicate_metric_labels_are_errors() {
    let results = validate_yaml(
        r#"
  - name: booking_total
    type: simple
    label: Bookings
    type_params:
      measure: booking_value
  - name: booking_sum
    type: simple
    label: Bookings
    type_params:
      measure: booking_value
"#,
        "",
    );
    assert_has_error(&results, "Cannot use label `Bookings`");
}

// ─── Where filters ──────────────────────────────────────────────────────────

#[test]
fn unparseable_metric_filter_is_an_error() {
    let results = validate_yaml(
        r#"
  - name: instant_bookings
    type: simple
    type_params:
      measure: bookings
    filter: "{{ Dimension('is_instant') }}"
"#,
        "",
    );
    assert_has_error(
        &results,
        "An error occurred while trying to parse filter of metric `instant_bookings`",
    );
    let issue = results.errors()[0];
    assert_eq!(
        issue.extra_detail.as_deref(),
        Some("{{ Dimension('is_instant') }}")
    );
}

#[test]
fn unknown_filter_granularity_is_a_warning() {
    let results = validate_yaml(
        r#"
  - name: recent_bookings
    type: simple
    type_params:
      measure:
        name: bookings
        filter: "{{ TimeDimension('metric_time', 'fortnight') }} > '2024-01-01'"
"#,
        "",
    );
    assert!(results.errors().is_empty(), "{:#?}", results.errors());
    assert_has_warning(&results, "`fortnight` is not a valid granularity name.");
}

#[test]
fn custom_granularity_is_accepted_in_filters() {
    let results = validate_yaml(
        r#"
  - name: recent_bookings
    type: simple
    type_params:
      measure: bookings
    filter: "{{ TimeDimension('metric_time', 'fiscal_quarter') }} > '2024-01-01'"
"#,
        r#"
project_configuration:
  time_spines:
    - node_relation:
        alias: time_spine
        schema_name: main
      primary_column:
        name: ds
        time_granularity: day
      custom_granularities:
        - name: fiscal_quarter
"#,
    );
    assert!(results.all_issues().is_empty(), "{:#?}", results.all_issues());
}

// ─── Saved queries ──────────────────────────────────────────────────────────

#[test]
fn valid_saved_query_is_clean() {
    let results = validate_yaml(
        "",
        r#"
saved_queries:
  - name: bookings_by_country
    query_params:
      metrics:
        - bookings
      group_by:
        - "Dimension('listing__country')"
        - "TimeDimension('metric_time', 'month')"
      where: "{{ Dimension('booking__is_instant') }}"
      order_by:
        - "Metric('bookings').descending(True)"
        - "TimeDimension('metric_time', 'month')"
      limit: 10
"#,
    );
    assert!(results.all_issues().is_empty(), "{:#?}", results.all_issues());
}

#[test]
fn unparseable_group_by_is_an_error() {
    let results = validate_yaml(
        "",
        r#"
saved_queries:
  - name: broken
    query_params:
      metrics:
        - bookings
      group_by:
        - "{{ invalid_format }}"
"#,
    );
    assert_has_error(
        &results,
        "An error occurred while trying to parse a group-by in saved query `broken`",
    );
}

#[test]
fn saved_query_unknown_metric_and_group_by() {
    let results = validate_yaml(
        "",
        r#"
saved_queries:
  - name: unknown_things
    query_params:
      metrics:
        - revenue
      group_by:
        - "Dimension('listing__region')"
"#,
    );
    assert_has_error(&results, "`revenue` is not a valid metric name.");
    assert_has_error(&results, "`Dimension('listing__region')` is not a valid group-by name.");
}

#[test]
fn saved_query_order_by_must_be_selected() {
    let results = validate_yaml(
        "",
        r#"
saved_queries:
  - name: ordered
    query_params:
      metrics:
        - bookings
      order_by:
        - listings
"#,
    );
    assert_has_error(&results, "Order by item `listings` in saved query `ordered`");
}

#[test]
fn saved_query_negative_limit_and_duplicate_exports() {
    let results = validate_yaml(
        "",
        r#"
saved_queries:
  - name: exported
    query_params:
      metrics:
        - bookings
      limit: -1
    exports:
      - name: daily
        config:
          export_as: table
      - name: daily
        config:
          export_as: view
"#,
    );
    assert_has_error(&results, "has a negative limit (-1)");
    assert_has_error(&results, "Export name `daily` is used more than once");
}

#[test]
fn issue_levels_partition_all_issues() {
    let results = validate_yaml(
        r#"
  - name: passthrough
    type: derived
    type_params:
      metrics:
        - bookings
  - name: trailing_bookings
    type: cumulative
    type_params:
      measure: bookings
      window: 28 days
  - name: revenue
    type: simple
    type_params:
      measure: revenue
"#,
        "",
    );
    let total = results.errors().len() + results.warnings().len() + results.future_errors().len();
    assert_eq!(total, results.all_issues().len());
    assert!(results.all_issues().iter().any(|i| i.level == ValidationIssueLevel::Warning));
    assert!(results.has_blocking_issues());
}
