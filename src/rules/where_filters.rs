use crate::enums::TimeGranularity;
use crate::error::{ValidationContext, ValidationIssue, generate_exception_issue};
use crate::primitives::is_known_granularity_name;
use crate::rules::SemanticManifestValidationRule;
use crate::types::{Metric, SemanticManifest};
use crate::where_filter::WhereFilterIntersection;

/// Every filter attached to a metric or one of its inputs parses, and the
/// granularities it names are known.
pub struct WhereFiltersAreParseableRule;

impl SemanticManifestValidationRule for WhereFiltersAreParseableRule {
    fn name(&self) -> &'static str {
        "WhereFiltersAreParseableRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let custom = manifest.custom_granularity_names();
        let mut issues = Vec::new();
        for metric in &manifest.metrics {
            check_metric(metric, &custom, &mut issues);
        }
        issues
    }
}

fn check_metric(metric: &Metric, custom: &[String], issues: &mut Vec<ValidationIssue>) {
    let context = ValidationContext::metric(metric);
    let params = &metric.type_params;

    let mut filters: Vec<(String, &WhereFilterIntersection)> = Vec::new();
    if let Some(filter) = &metric.filter {
        filters.push((format!("trying to parse filter of metric `{}`", metric.name), filter));
    }
    for input in metric.input_measures() {
        if let Some(filter) = &input.filter {
            filters.push((
                format!(
                    "trying to parse filter of measure input `{}` on metric `{}`",
                    input.name, metric.name
                ),
                filter,
            ));
        }
    }
    if let Some(filter) = params.numerator.as_ref().and_then(|n| n.filter.as_ref()) {
        filters.push((
            format!("trying to parse the numerator filter on metric `{}`", metric.name),
            filter,
        ));
    }
    if let Some(filter) = params.denominator.as_ref().and_then(|d| d.filter.as_ref()) {
        filters.push((
            format!("trying to parse the denominator filter on metric `{}`", metric.name),
            filter,
        ));
    }
    for input in params.metrics.iter().flatten() {
        if let Some(filter) = &input.filter {
            filters.push((
                format!(
                    "trying to parse filter for input metric `{}` on metric `{}`",
                    input.name, metric.name
                ),
                filter,
            ));
        }
    }

    for (what, intersection) in filters {
        for filter in &intersection.where_filters {
            match filter.call_parameter_sets(custom) {
                Err(e) => issues.push(
                    generate_exception_issue(&what, &e, Some(context.clone()))
                        .with_extra_detail(filter.where_sql_template.clone()),
                ),
                Ok(sets) => {
                    for call in &sets.time_dimension_call_parameter_sets {
                        let Some(grain) = &call.time_granularity_name else {
                            continue;
                        };
                        if !is_known_granularity_name(grain, custom) {
                            issues.push(ValidationIssue::warning(
                                context.clone(),
                                format!(
                                    "Filter for metric `{}` is not valid. `{}` is not a valid granularity name. Valid granularity options: {}",
                                    metric.name,
                                    grain,
                                    TimeGranularity::names()
                                        .into_iter()
                                        .map(str::to_string)
                                        .chain(custom.iter().cloned())
                                        .collect::<Vec<_>>()
                                        .join(", ")
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }
}
