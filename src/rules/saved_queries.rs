use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::call_parameter_sets::FilterCallParameterSets;
use crate::enums::{DimensionType, SavedQueryElementType};
use crate::error::{ValidationContext, ValidationIssue, generate_exception_issue};
use crate::naming::METRIC_TIME_ELEMENT_NAME;
use crate::primitives::is_known_granularity_name;
use crate::rules::SemanticManifestValidationRule;
use crate::types::{SavedQuery, SemanticManifest};
use crate::where_filter::parse_group_by_item;

static DESCENDING_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\.\s*descending\s*\(\s*(True|False|true|false)?\s*\)\s*$").unwrap()
});

static METRIC_ORDER_BY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*Metric\s*\(\s*['"]([^'"]+)['"]\s*\)\s*$"#).unwrap()
});

static BARE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([a-z][a-z0-9_]*)\s*$").unwrap());

/// Element names a saved query can group or filter by.
struct KnownElements<'a> {
    entities: HashSet<&'a str>,
    dimensions: HashSet<&'a str>,
    time_dimensions: HashSet<&'a str>,
}

impl<'a> KnownElements<'a> {
    fn of(manifest: &'a SemanticManifest) -> Self {
        let mut known = KnownElements {
            entities: HashSet::new(),
            dimensions: HashSet::new(),
            time_dimensions: HashSet::from([METRIC_TIME_ELEMENT_NAME]),
        };
        for model in &manifest.semantic_models {
            known.entities.extend(model.entities.iter().map(|e| e.name.as_str()));
            for dimension in &model.dimensions {
                known.dimensions.insert(&dimension.name);
                if dimension.dimension_type == DimensionType::Time {
                    known.time_dimensions.insert(&dimension.name);
                }
            }
        }
        known
    }

    /// Names in `sets` that don't resolve to an element of the right kind.
    fn unknown_names<'s>(&self, sets: &'s FilterCallParameterSets) -> Vec<&'s str> {
        let dimensions = sets
            .dimension_call_parameter_sets
            .iter()
            .map(|c| c.dimension_reference.as_str())
            .filter(|n| !self.dimensions.contains(n));
        let time_dimensions = sets
            .time_dimension_call_parameter_sets
            .iter()
            .map(|c| c.time_dimension_reference.as_str())
            .filter(|n| !self.time_dimensions.contains(n));
        let entities = sets
            .entity_call_parameter_sets
            .iter()
            .map(|c| c.entity_reference.as_str())
            .filter(|n| !self.entities.contains(n));
        dimensions.chain(time_dimensions).chain(entities).collect()
    }
}

/// Saved queries reference existing metrics and elements, parse, order by
/// what they select, and name their exports uniquely.
pub struct SavedQueryRule;

impl SemanticManifestValidationRule for SavedQueryRule {
    fn name(&self) -> &'static str {
        "SavedQueryRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let custom = manifest.custom_granularity_names();
        let known = KnownElements::of(manifest);
        let mut issues = Vec::new();

        for saved_query in &manifest.saved_queries {
            check_metrics(manifest, saved_query, &mut issues);
            let group_by = check_group_by(saved_query, &known, &custom, &mut issues);
            check_where(manifest, saved_query, &known, &custom, &mut issues);
            check_order_by(saved_query, &group_by, &custom, &mut issues);
            check_limit_and_exports(saved_query, &mut issues);
        }

        issues
    }
}

fn check_metrics(manifest: &SemanticManifest, saved_query: &SavedQuery, issues: &mut Vec<ValidationIssue>) {
    for metric in &saved_query.query_params.metrics {
        if manifest.metric(metric).is_none() {
            issues.push(ValidationIssue::error(
                ValidationContext::saved_query_element(
                    saved_query,
                    SavedQueryElementType::Metric,
                    metric.as_str(),
                ),
                format!("`{}` is not a valid metric name.", metric),
            ));
        }
    }
}

/// Returns the call sets of every group-by item that parsed.
fn check_group_by(
    saved_query: &SavedQuery,
    known: &KnownElements<'_>,
    custom: &[String],
    issues: &mut Vec<ValidationIssue>,
) -> Vec<FilterCallParameterSets> {
    let mut parsed = Vec::new();

    for item in &saved_query.query_params.group_by {
        let context = ValidationContext::saved_query_element(
            saved_query,
            SavedQueryElementType::GroupBy,
            item.as_str(),
        );
        let sets = match parse_group_by_item(item, custom) {
            Ok(sets) => sets,
            Err(e) => {
                issues.push(generate_exception_issue(
                    &format!("trying to parse a group-by in saved query `{}`", saved_query.name),
                    &e,
                    Some(context),
                ));
                continue;
            }
        };

        if sets.len() != 1
            || !sets.metric_call_parameter_sets.is_empty()
            || !known.unknown_names(&sets).is_empty()
        {
            issues.push(ValidationIssue::error(
                context,
                format!("`{}` is not a valid group-by name.", item),
            ));
            continue;
        }

        for call in &sets.time_dimension_call_parameter_sets {
            if let Some(grain) = &call.time_granularity_name
                && !is_known_granularity_name(grain, custom)
            {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "`{}` is not a valid granularity name in group-by `{}` of saved query `{}`.",
                        grain, item, saved_query.name
                    ),
                ));
            }
        }
        parsed.push(sets);
    }

    parsed
}

fn check_where(
    manifest: &SemanticManifest,
    saved_query: &SavedQuery,
    known: &KnownElements<'_>,
    custom: &[String],
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(intersection) = &saved_query.query_params.where_filter else {
        return;
    };

    for filter in &intersection.where_filters {
        let context = ValidationContext::saved_query_element(
            saved_query,
            SavedQueryElementType::Where,
            filter.where_sql_template.as_str(),
        );
        let sets = match filter.call_parameter_sets(custom) {
            Ok(sets) => sets,
            Err(e) => {
                issues.push(generate_exception_issue(
                    &format!("trying to parse the where filter in saved query `{}`", saved_query.name),
                    &e,
                    Some(context),
                ));
                continue;
            }
        };

        for name in known.unknown_names(&sets) {
            issues.push(ValidationIssue::error(
                context.clone(),
                format!(
                    "`{}` referenced in the where filter of saved query `{}` is not a valid element name.",
                    name, saved_query.name
                ),
            ));
        }
        for call in &sets.metric_call_parameter_sets {
            if manifest.metric(call.metric_reference.as_str()).is_none() {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "`{}` referenced in the where filter of saved query `{}` is not a valid metric name.",
                        call.metric_reference, saved_query.name
                    ),
                ));
            }
        }
    }
}

fn check_order_by(
    saved_query: &SavedQuery,
    group_by: &[FilterCallParameterSets],
    custom: &[String],
    issues: &mut Vec<ValidationIssue>,
) {
    let metrics = &saved_query.query_params.metrics;

    for item in &saved_query.query_params.order_by {
        let stripped = DESCENDING_SUFFIX_RE.replace(item, "");

        let metric_name = METRIC_ORDER_BY_RE
            .captures(&stripped)
            .or_else(|| BARE_NAME_RE.captures(&stripped))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());

        let selected = match metric_name {
            Some(name) => metrics.iter().any(|m| m == name),
            None => parse_group_by_item(&stripped, custom)
                .map(|sets| group_by.contains(&sets))
                .unwrap_or(false),
        };

        if !selected {
            issues.push(ValidationIssue::error(
                ValidationContext::saved_query_element(
                    saved_query,
                    SavedQueryElementType::OrderBy,
                    item.as_str(),
                ),
                format!(
                    "Order by item `{}` in saved query `{}` is not one of the query's metrics or group-by items.",
                    item, saved_query.name
                ),
            ));
        }
    }
}

fn check_limit_and_exports(saved_query: &SavedQuery, issues: &mut Vec<ValidationIssue>) {
    if let Some(limit) = saved_query.query_params.limit
        && limit < 0
    {
        issues.push(ValidationIssue::error(
            ValidationContext::saved_query_element(
                saved_query,
                SavedQueryElementType::Limit,
                limit.to_string(),
            ),
            format!(
                "Saved query `{}` has a negative limit ({}). The limit must be non-negative.",
                saved_query.name, limit
            ),
        ));
    }

    let mut export_names = HashSet::new();
    for export in &saved_query.exports {
        if !export_names.insert(export.name.as_str()) {
            issues.push(ValidationIssue::error(
                ValidationContext::saved_query_element(
                    saved_query,
                    SavedQueryElementType::Export,
                    export.name.as_str(),
                ),
                format!(
                    "Export name `{}` is used more than once in saved query `{}`.",
                    export.name, saved_query.name
                ),
            ));
        }
    }
}
