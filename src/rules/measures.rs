use std::sync::LazyLock;

use regex::Regex;

use crate::enums::{AggregationType, DimensionType, SemanticModelElementType};
use crate::error::{ValidationContext, ValidationIssue};
use crate::rules::SemanticManifestValidationRule;
use crate::types::{AdditiveElement, SemanticManifest, SemanticModel};

static DISTINCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bdistinct\b").unwrap());

/// Every additive element in the manifest with the model it aggregates and
/// the context issues about it should carry.
fn additive_elements(
    manifest: &SemanticManifest,
) -> Vec<(&SemanticModel, Box<dyn AdditiveElement + '_>, ValidationContext)> {
    let mut elements: Vec<(&SemanticModel, Box<dyn AdditiveElement + '_>, ValidationContext)> =
        Vec::new();
    for model in &manifest.semantic_models {
        for measure in &model.measures {
            elements.push((
                model,
                Box::new(measure) as Box<dyn AdditiveElement + '_>,
                ValidationContext::semantic_model_element(
                    model,
                    &measure.name,
                    SemanticModelElementType::Measure,
                ),
            ));
        }
    }
    for metric in &manifest.metrics {
        let Some(aggregation) = metric.simple_aggregation() else {
            continue;
        };
        match manifest.semantic_model(&aggregation.params.semantic_model) {
            Some(model) => elements.push((
                model,
                Box::new(aggregation) as Box<dyn AdditiveElement + '_>,
                ValidationContext::metric(metric),
            )),
            None => tracing::warn!(
                metric = %metric.name,
                semantic_model = %aggregation.params.semantic_model,
                "skipping aggregation checks; semantic model not found"
            ),
        }
    }
    elements
}

// ─── CountAggregationExprRule ───────────────────────────────────────────────

/// COUNT measures name what they count, and don't smuggle in a DISTINCT.
pub struct CountAggregationExprRule;

impl SemanticManifestValidationRule for CountAggregationExprRule {
    fn name(&self) -> &'static str {
        "CountAggregationExprRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for model in &manifest.semantic_models {
            for measure in model.measures.iter().filter(|m| m.agg == AggregationType::Count) {
                let context = ValidationContext::semantic_model_element(
                    model,
                    &measure.name,
                    SemanticModelElementType::Measure,
                );
                match &measure.expr {
                    None => issues.push(ValidationIssue::error(
                        context,
                        format!(
                            "Measure '{}' uses a COUNT aggregation, which requires an expr to be provided. Provide 'expr: 1' if a count of all rows is desired.",
                            measure.name
                        ),
                    )),
                    Some(expr) if DISTINCT_RE.is_match(expr) => {
                        issues.push(ValidationIssue::error(
                            context,
                            format!(
                                "In semantic model `{}`, measure `{}` uses a COUNT aggregation with a DISTINCT expr: `{}`. Use a COUNT_DISTINCT aggregation instead.",
                                model.name, measure.name, expr
                            ),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
        issues
    }
}

// ─── PercentileAggregationRule ──────────────────────────────────────────────

/// Percentile aggregations carry a percentile strictly between 0 and 1 and
/// at most one of the discrete/approximate modes; other aggregations carry no
/// percentile params.
pub struct PercentileAggregationRule;

impl SemanticManifestValidationRule for PercentileAggregationRule {
    fn name(&self) -> &'static str {
        "PercentileAggregationRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (_, element, context) in additive_elements(manifest) {
            let kind = element.element_kind();
            let name = element.element_name();
            let params = element.agg_params();

            if element.agg() == AggregationType::Percentile {
                match params.and_then(|p| p.percentile) {
                    None => issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Percentile aggregation parameters for the {} {} must contain percentile.",
                            kind.to_lowercase(),
                            name
                        ),
                    )),
                    Some(p) if p <= 0.0 || p >= 1.0 => issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "Percentile aggregation parameter for the {} {} is {}, but must be between 0 and 1 (non-inclusive). For example, to indicate the 65th percentile, input 0.65.",
                            kind.to_lowercase(),
                            name,
                            p
                        ),
                    )),
                    Some(_) => {}
                }
                if let Some(p) = params
                    && p.use_discrete_percentile
                    && p.use_approximate_percentile
                {
                    issues.push(ValidationIssue::error(
                        context,
                        format!(
                            "Percentile aggregation parameters for the {} {} set both use_discrete_percentile and use_approximate_percentile. Only one can be used.",
                            kind.to_lowercase(),
                            name
                        ),
                    ));
                }
            } else if let Some(p) = params
                && (p.percentile.is_some() || p.use_discrete_percentile || p.use_approximate_percentile)
            {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "{} {} with agg type {} cannot be used with percentile, use_discrete_percentile, or use_approximate_percentile agg params.",
                        kind,
                        name,
                        element.agg()
                    ),
                ));
            }
        }

        issues
    }
}

// ─── MeasuresNonAdditiveDimensionRule ───────────────────────────────────────

/// A non-additive dimension is a time dimension of the element's model at the
/// grain of its agg time dimension, with a min/max window choice and window
/// groupings drawn from the model's entities.
pub struct MeasuresNonAdditiveDimensionRule;

impl SemanticManifestValidationRule for MeasuresNonAdditiveDimensionRule {
    fn name(&self) -> &'static str {
        "MeasuresNonAdditiveDimensionRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (model, element, context) in additive_elements(manifest) {
            let Some(non_additive) = element.non_additive_dimension() else {
                continue;
            };
            let kind = element.element_kind();
            let name = element.element_name();

            let Some(agg_time_dimension) = model.agg_time_dimension_for(&*element) else {
                tracing::warn!(
                    element = %name,
                    semantic_model = %model.name,
                    "skipping non-additive dimension check; no agg time dimension resolved"
                );
                continue;
            };

            match model.dimension(&non_additive.name) {
                None => issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "{} '{}' has a non_additive_dimension with name '{}' that is not defined as a dimension in semantic model '{}'.",
                        kind, name, non_additive.name, model.name
                    ),
                )),
                Some(dimension) if dimension.dimension_type != DimensionType::Time => {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "{} '{}' has a non_additive_dimension with name '{}' that is defined as a categorical dimension which is not supported.",
                            kind, name, non_additive.name
                        ),
                    ))
                }
                Some(dimension) => {
                    let agg_grain = model
                        .dimension(agg_time_dimension.as_str())
                        .and_then(|d| d.time_granularity());
                    if let (Some(agg_grain), Some(grain)) = (agg_grain, dimension.time_granularity())
                        && agg_grain != grain
                    {
                        issues.push(ValidationIssue::error(
                            context.clone(),
                            format!(
                                "{} '{}' has a non_additive_dimension with name '{}' that has a base time granularity ({}) that is not equal to the {} agg_time_dimension '{}' with a base granularity of ({}).",
                                kind,
                                name,
                                non_additive.name,
                                grain,
                                kind.to_lowercase(),
                                agg_time_dimension,
                                agg_grain
                            ),
                        ));
                    }
                }
            }

            if !matches!(
                non_additive.window_choice,
                AggregationType::Min | AggregationType::Max
            ) {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "{} '{}' has a non_additive_dimension with an invalid 'window_choice' of '{}'. Only choices supported are 'min' or 'max'.",
                        kind, name, non_additive.window_choice
                    ),
                ));
            }

            let missing: Vec<&str> = non_additive
                .window_groupings
                .iter()
                .filter(|g| model.entity(g).is_none())
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "{} '{}' has a non_additive_dimension with an invalid 'window_groupings'. These entities [{}] do not exist in the semantic model '{}'.",
                        kind,
                        name,
                        missing.join(", "),
                        model.name
                    ),
                ));
            }
        }

        issues
    }
}
