use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::enums::{AggregationType, MetricType, TimeGranularity};
use crate::error::{ValidationContext, ValidationIssue};
use crate::primitives::{check_valid_name, is_known_granularity_name, parse_window};
use crate::references::MeasureReference;
use crate::rules::{SemanticManifestValidationRule, first_by_name};
use crate::types::{Metric, MetricInputMeasure, SemanticManifest, SemanticModel};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

fn valid_granularity_options(custom_granularity_names: &[String]) -> String {
    TimeGranularity::names()
        .into_iter()
        .map(str::to_string)
        .chain(custom_granularity_names.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── MetricTypeParamsRule ───────────────────────────────────────────────────

/// Each metric type sets the type params it needs and none that belong to
/// another type.
pub struct MetricTypeParamsRule;

impl SemanticManifestValidationRule for MetricTypeParamsRule {
    fn name(&self) -> &'static str {
        "MetricTypeParamsRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for metric in &manifest.metrics {
            check_type_params(manifest, metric, &mut issues);
        }
        issues
    }
}

fn check_type_params(manifest: &SemanticManifest, metric: &Metric, issues: &mut Vec<ValidationIssue>) {
    let params = &metric.type_params;
    let context = ValidationContext::metric(metric);
    let mut require = |present: bool, field: &str| {
        if !present {
            issues.push(ValidationIssue::error(
                context.clone(),
                format!(
                    "{} metric `{}` must set `type_params.{}`.",
                    metric.metric_type, metric.name, field
                ),
            ));
        }
    };

    match metric.metric_type {
        MetricType::Simple => {
            require(
                params.measure.is_some() || params.metric_aggregation_params.is_some(),
                "measure` or `type_params.metric_aggregation_params",
            );
        }
        MetricType::Ratio => {
            require(params.numerator.is_some(), "numerator");
            require(params.denominator.is_some(), "denominator");
        }
        MetricType::Cumulative => require(params.measure.is_some(), "measure"),
        MetricType::Derived => {}
        MetricType::Conversion => {
            require(params.conversion_type_params.is_some(), "conversion_type_params")
        }
    }

    let misplaced: &[(bool, &str, MetricType)] = &[
        (params.numerator.is_some(), "numerator", MetricType::Ratio),
        (params.denominator.is_some(), "denominator", MetricType::Ratio),
        (params.metrics.is_some(), "metrics", MetricType::Derived),
        (
            params.conversion_type_params.is_some(),
            "conversion_type_params",
            MetricType::Conversion,
        ),
        (
            params.cumulative_type_params.is_some(),
            "cumulative_type_params",
            MetricType::Cumulative,
        ),
        (
            params.metric_aggregation_params.is_some(),
            "metric_aggregation_params",
            MetricType::Simple,
        ),
    ];
    for (present, field, owner) in misplaced {
        if *present && metric.metric_type != *owner {
            issues.push(ValidationIssue::error(
                context.clone(),
                format!(
                    "Metric `{}` is of type {} and can't set `type_params.{}`; it is only used by {} metrics.",
                    metric.name, metric.metric_type, field, owner
                ),
            ));
        }
    }

    if metric.metric_type == MetricType::Simple
        && params.measure.is_some()
        && params.metric_aggregation_params.is_some()
    {
        issues.push(ValidationIssue::error(
            context.clone(),
            format!(
                "Simple metric `{}` sets both `type_params.measure` and `type_params.metric_aggregation_params`. Set one or the other.",
                metric.name
            ),
        ));
    }

    if let Some(aggregation) = &params.metric_aggregation_params
        && manifest.semantic_model(&aggregation.semantic_model).is_none()
    {
        issues.push(ValidationIssue::error(
            context,
            format!(
                "Metric `{}` aggregates semantic model `{}`, which is not defined in the model.",
                metric.name, aggregation.semantic_model
            ),
        ));
    }
}

// ─── MetricMeasuresRule ─────────────────────────────────────────────────────

/// Measures read by a metric exist.
pub struct MetricMeasuresRule;

impl SemanticManifestValidationRule for MetricMeasuresRule {
    fn name(&self) -> &'static str {
        "MetricMeasuresRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for metric in &manifest.metrics {
            for input in metric.input_measures() {
                if manifest.measure(&input.measure_reference()).is_none() {
                    issues.push(ValidationIssue::error(
                        ValidationContext::metric(metric),
                        format!(
                            "Measure {} referenced in metric {} is not defined in the model!",
                            input.name, metric.name
                        ),
                    ));
                }
            }
        }
        issues
    }
}

// ─── MeasureAliasesRule ─────────────────────────────────────────────────────

/// Measure input aliases are valid names, don't shadow a measure, and mean
/// one measure wherever they're used.
pub struct MeasureAliasesRule;

impl SemanticManifestValidationRule for MeasureAliasesRule {
    fn name(&self) -> &'static str {
        "MeasureAliasesRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut alias_targets: HashMap<&str, &str> = HashMap::new();

        for metric in &manifest.metrics {
            let context = ValidationContext::metric(metric);
            for input in metric.input_measures() {
                let Some(alias) = input.alias.as_deref() else {
                    continue;
                };
                issues.extend(check_valid_name(alias, Some(&context)));

                if alias != input.name
                    && let Some((model, _)) = manifest.measure(&MeasureReference::new(alias))
                {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Alias `{}` for measure `{}` in metric `{}` conflicts with measure `{}` defined in semantic model `{}`.",
                            alias, input.name, metric.name, alias, model.name
                        ),
                    ));
                }

                match alias_targets.get(alias) {
                    Some(target) if *target != input.name => {
                        issues.push(ValidationIssue::error(
                            context.clone(),
                            format!(
                                "Measure alias `{}` is used for different measures ({}, {}) in metric `{}`.",
                                alias, target, input.name, metric.name
                            ),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        alias_targets.insert(alias, &input.name);
                    }
                }
            }
        }

        issues
    }
}

// ─── CumulativeMetricRule ───────────────────────────────────────────────────

/// Cumulative metrics set a window or a grain-to-date, not both, in the
/// nested `cumulative_type_params` location.
pub struct CumulativeMetricRule;

impl SemanticManifestValidationRule for CumulativeMetricRule {
    fn name(&self) -> &'static str {
        "CumulativeMetricRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let custom = manifest.custom_granularity_names();
        let mut issues = Vec::new();

        for metric in manifest
            .metrics
            .iter()
            .filter(|m| m.metric_type == MetricType::Cumulative)
        {
            let context = ValidationContext::metric(metric);
            let params = &metric.type_params;
            let nested = params.cumulative_type_params.as_ref();

            if params.window.is_some() || params.grain_to_date.is_some() {
                issues.push(ValidationIssue::future_error(
                    context.clone(),
                    "Cumulative fields `type_params.window` and `type_params.grain_to_date` have been moved and will soon be removed. Please nest those values under `type_params.cumulative_type_params.window` and `type_params.cumulative_type_params.grain_to_date`.",
                ));
            }

            let window = nested
                .and_then(|c| c.window.as_ref())
                .or(params.window.as_ref());
            let grain_to_date = nested
                .and_then(|c| c.grain_to_date.as_deref())
                .or(params.grain_to_date.as_deref());

            if window.is_some() && grain_to_date.is_some() {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    "Both window and grain_to_date set for cumulative metric. Please set one or the other",
                ));
            }

            if let Some(window) = window
                && let Err(e) = parse_window(&window.window_string, &custom)
            {
                issues.push(ValidationIssue::error(context.clone(), e.message));
            }

            if let Some(grain) = grain_to_date
                && !is_known_granularity_name(grain, &custom)
            {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "Invalid time granularity `{}` for grain_to_date in cumulative metric `{}`. Valid granularity options: {}",
                        grain,
                        metric.name,
                        valid_granularity_options(&custom)
                    ),
                ));
            }
        }

        issues
    }
}

// ─── DerivedMetricRule ──────────────────────────────────────────────────────

/// Derived metrics read existing metrics under unique, valid names, use each
/// input in their expr, and offset each input at most one way.
pub struct DerivedMetricRule;

impl SemanticManifestValidationRule for DerivedMetricRule {
    fn name(&self) -> &'static str {
        "DerivedMetricRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let custom = manifest.custom_granularity_names();
        let mut issues = Vec::new();

        for metric in manifest
            .metrics
            .iter()
            .filter(|m| m.metric_type == MetricType::Derived)
        {
            let context = ValidationContext::metric(metric);
            let inputs = metric.type_params.metrics.as_deref().unwrap_or_default();

            if inputs.is_empty() {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "No input metrics found for derived metric `{}`. Please add metrics to `type_params.metrics`.",
                        metric.name
                    ),
                ));
            }

            let mut used_names: HashSet<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
            for input in inputs {
                if manifest.metric(&input.name).is_none() {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "For metric: {}, input metric: '{}' does not exist as a configured metric in the model.",
                            metric.name, input.name
                        ),
                    ));
                }

                if let Some(alias) = &input.alias {
                    issues.extend(check_valid_name(alias, Some(&context)));
                    if !used_names.insert(alias) {
                        issues.push(ValidationIssue::error(
                            context.clone(),
                            format!(
                                "Alias '{}' for input metric: '{}' is already being used. Please choose another alias.",
                                alias, input.name
                            ),
                        ));
                    }
                }

                if input.offset_window.is_some() && input.offset_to_grain.is_some() {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Both offset_window and offset_to_grain set for derived metric '{}' on input metric '{}'. Please set one or the other.",
                            metric.name, input.name
                        ),
                    ));
                }

                if let Some(window) = &input.offset_window
                    && let Err(e) = parse_window(&window.window_string, &custom)
                {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Invalid offset_window for input metric '{}' on derived metric '{}': {}",
                            input.name, metric.name, e
                        ),
                    ));
                }

                if let Some(grain) = &input.offset_to_grain
                    && !is_known_granularity_name(grain, &custom)
                {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Invalid time granularity '{}' in offset_to_grain for input metric '{}' on derived metric '{}'. Valid granularity options: {}",
                            grain,
                            input.name,
                            metric.name,
                            valid_granularity_options(&custom)
                        ),
                    ));
                }
            }

            match &metric.type_params.expr {
                None => issues.push(ValidationIssue::warning(
                    context.clone(),
                    format!(
                        "No `expr` set for derived metric `{}`. Derived metrics should combine their input metrics with an expr.",
                        metric.name
                    ),
                )),
                Some(expr) => {
                    for input in inputs {
                        let used_as = input.alias.as_deref().unwrap_or(&input.name);
                        if !expr_uses(expr, used_as) {
                            issues.push(ValidationIssue::error(
                                context.clone(),
                                format!(
                                    "Input metric '{}' is not used in `expr`: '{}' for derived metric '{}'.",
                                    used_as, expr, metric.name
                                ),
                            ));
                        }
                    }
                }
            }
        }

        issues
    }
}

/// Whole-word occurrence of `name` in `expr`.
fn expr_uses(expr: &str, name: &str) -> bool {
    WORD_RE.find_iter(expr).any(|word| word.as_str() == name)
}

// ─── ConversionMetricRule ───────────────────────────────────────────────────

/// Conversion metrics count rows, join on an entity both models define, and
/// hold constant properties both models define.
pub struct ConversionMetricRule;

impl SemanticManifestValidationRule for ConversionMetricRule {
    fn name(&self) -> &'static str {
        "ConversionMetricRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let custom = manifest.custom_granularity_names();
        let mut issues = Vec::new();

        for metric in manifest
            .metrics
            .iter()
            .filter(|m| m.metric_type == MetricType::Conversion)
        {
            let Some(params) = &metric.type_params.conversion_type_params else {
                continue;
            };
            let context = ValidationContext::metric(metric);

            if let Some(window) = &params.window
                && let Err(e) = parse_window(&window.window_string, &custom)
            {
                issues.push(ValidationIssue::error(context.clone(), e.message));
            }

            if params.conversion_measure.filter.is_some() {
                issues.push(ValidationIssue::warning(
                    context.clone(),
                    format!(
                        "Measure input {} has a filter. For conversion metrics, filtering on a conversion input measure is not fully supported.",
                        params.conversion_measure.name
                    ),
                ));
            }

            let base = resolve_measure_model(manifest, metric, &params.base_measure, &context, &mut issues);
            let conversion = resolve_measure_model(
                manifest,
                metric,
                &params.conversion_measure,
                &context,
                &mut issues,
            );

            if let Some(base) = base
                && base.entity(&params.entity).is_none()
            {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "Entity: {} not found in base semantic model: {}.",
                        params.entity, base.name
                    ),
                ));
            }
            if let Some(conversion) = conversion
                && conversion.entity(&params.entity).is_none()
            {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "Entity: {} not found in conversion semantic model: {}.",
                        params.entity, conversion.name
                    ),
                ));
            }

            for property in params.constant_properties.iter().flatten() {
                for (model, element) in [
                    (base, &property.base_property),
                    (conversion, &property.conversion_property),
                ] {
                    if let Some(model) = model
                        && !has_linkable_element(model, element)
                    {
                        issues.push(ValidationIssue::error(
                            context.clone(),
                            format!(
                                "The provided constant property: {}, cannot be found in semantic model {}",
                                element, model.name
                            ),
                        ));
                    }
                }
            }
        }

        issues
    }
}

/// Model of a conversion input measure, after checking the measure counts
/// rows. Missing measures are left to [`MetricMeasuresRule`].
fn resolve_measure_model<'a>(
    manifest: &'a SemanticManifest,
    metric: &Metric,
    input: &MetricInputMeasure,
    context: &ValidationContext,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'a SemanticModel> {
    let Some((model, measure)) = manifest.measure(&input.measure_reference()) else {
        tracing::warn!(
            metric = %metric.name,
            measure = %input.name,
            "skipping conversion checks for measure; not defined in the model"
        );
        return None;
    };

    let counts_rows = match measure.agg {
        AggregationType::Count | AggregationType::CountDistinct => true,
        AggregationType::Sum => measure.expr.as_deref().map(str::trim) == Some("1"),
        _ => false,
    };
    if !counts_rows {
        issues.push(ValidationIssue::error(
            context.clone(),
            format!(
                "For conversion metrics, the measure must be COUNT/SUM(1)/COUNT_DISTINCT. Measure: {} is agg type: {}",
                measure.name, measure.agg
            ),
        ));
    }
    Some(model)
}

fn has_linkable_element(model: &SemanticModel, name: &str) -> bool {
    model.entity(name).is_some() || model.dimension(name).is_some()
}

// ─── MetricLabelsRule ───────────────────────────────────────────────────────

/// Metric labels are unique.
pub struct MetricLabelsRule;

impl SemanticManifestValidationRule for MetricLabelsRule {
    fn name(&self) -> &'static str {
        "MetricLabelsRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut owners: HashMap<&str, &str> = HashMap::new();

        for metric in first_by_name(&manifest.metrics, |m| m.name.as_str()) {
            let Some(label) = metric.label.as_deref() else {
                continue;
            };
            if let Some(owner) = owners.get(label) {
                issues.push(ValidationIssue::error(
                    ValidationContext::metric(metric),
                    format!(
                        "Cannot use label `{}` for metric `{}` as it's already used by metric `{}`",
                        label, metric.name, owner
                    ),
                ));
            } else {
                owners.insert(label, &metric.name);
            }
        }

        issues
    }
}
