use crate::enums::{DimensionType, EntityType, SemanticModelElementType};
use crate::error::{ValidationContext, ValidationIssue};
use crate::rules::SemanticManifestValidationRule;
use crate::types::{AdditiveElement, SemanticManifest, SemanticModel};

// ─── SemanticModelTimeDimensionRule ─────────────────────────────────────────

/// Time dimensions declare a granularity; at most one is primary; a model
/// whose measures rely on the default agg time dimension must have one.
pub struct SemanticModelTimeDimensionRule;

impl SemanticManifestValidationRule for SemanticModelTimeDimensionRule {
    fn name(&self) -> &'static str {
        "SemanticModelTimeDimensionRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for model in &manifest.semantic_models {
            for dimension in &model.dimensions {
                if dimension.dimension_type == DimensionType::Time
                    && dimension.time_granularity().is_none()
                {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(
                            model,
                            &dimension.name,
                            SemanticModelElementType::Dimension,
                        ),
                        format!(
                            "In semantic model `{}`, time dimension `{}` must set `type_params.time_granularity`.",
                            model.name, dimension.name
                        ),
                    ));
                }
            }

            let primaries = model.primary_time_dimensions();
            if primaries.len() > 1 {
                for dimension in &primaries {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(
                            model,
                            &dimension.name,
                            SemanticModelElementType::Dimension,
                        ),
                        format!(
                            "In semantic model {}, Primary time dimension with name: {} is one of many defined as primary.",
                            model.name, dimension.name
                        ),
                    ));
                }
            }

            let has_default = model
                .defaults
                .as_ref()
                .is_some_and(|d| d.agg_time_dimension.is_some());
            let needs_default = model.measures.iter().any(|m| m.agg_time_dimension.is_none());
            if needs_default && !has_default && primaries.is_empty() {
                issues.push(ValidationIssue::error(
                    ValidationContext::semantic_model(model),
                    format!(
                        "No primary time dimension in semantic model with name ({}). Please add one",
                        model.name
                    ),
                ));
            }
        }

        issues
    }
}

// ─── SemanticModelValidityWindowRule ────────────────────────────────────────

/// A slowly-changing-dimension model declares its validity window with
/// exactly one start and one end dimension, is keyed by a natural entity,
/// and holds no measures.
pub struct SemanticModelValidityWindowRule;

impl SemanticManifestValidationRule for SemanticModelValidityWindowRule {
    fn name(&self) -> &'static str {
        "SemanticModelValidityWindowRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for model in &manifest.semantic_models {
            check_validity_window(model, &mut issues);
        }
        issues
    }
}

fn check_validity_window(model: &SemanticModel, issues: &mut Vec<ValidationIssue>) {
    let validity_dimensions: Vec<_> = model
        .dimensions
        .iter()
        .filter_map(|d| d.validity_params().map(|p| (d, p)))
        .collect();
    if validity_dimensions.is_empty() {
        return;
    }
    let context = ValidationContext::semantic_model(model);

    for (dimension, params) in &validity_dimensions {
        if dimension.dimension_type != DimensionType::Time {
            issues.push(ValidationIssue::error(
                context.clone(),
                format!(
                    "Semantic model `{}` sets validity_params on dimension `{}`, which is not a time dimension.",
                    model.name, dimension.name
                ),
            ));
        }
        if params.is_start && params.is_end {
            issues.push(ValidationIssue::error(
                context.clone(),
                format!(
                    "Semantic model `{}` has validity param dimension `{}` marked as both start and end. A validity window needs separate start and end dimensions.",
                    model.name, dimension.name
                ),
            ));
        }
    }

    let starts: Vec<&str> = validity_dimensions
        .iter()
        .filter(|(_, p)| p.is_start)
        .map(|(d, _)| d.name.as_str())
        .collect();
    let ends: Vec<&str> = validity_dimensions
        .iter()
        .filter(|(_, p)| p.is_end)
        .map(|(d, _)| d.name.as_str())
        .collect();

    if validity_dimensions.len() != 2 || starts.len() != 1 || ends.len() != 1 {
        issues.push(ValidationIssue::error(
            context.clone(),
            format!(
                "Semantic model `{}` has {} dimensions with validity_params, with start dimensions [{}] and end dimensions [{}]. There must be exactly one start and one end dimension.",
                model.name,
                validity_dimensions.len(),
                starts.join(", "),
                ends.join(", ")
            ),
        ));
    }

    let naturals = model
        .entities
        .iter()
        .filter(|e| e.entity_type == EntityType::Natural)
        .count();
    if naturals != 1 {
        issues.push(ValidationIssue::error(
            context.clone(),
            format!(
                "Semantic model `{}` has validity param dimensions defined, so it must have exactly one natural entity, but found {}.",
                model.name, naturals
            ),
        ));
    }

    let keyed: Vec<&str> = model
        .entities
        .iter()
        .filter(|e| matches!(e.entity_type, EntityType::Primary | EntityType::Unique))
        .map(|e| e.name.as_str())
        .collect();
    if !keyed.is_empty() {
        issues.push(ValidationIssue::error(
            context.clone(),
            format!(
                "Semantic model `{}` has validity param dimensions defined and also has primary or unique entities ({}). A model with a validity window must be keyed by its natural entity.",
                model.name,
                keyed.join(", ")
            ),
        ));
    }

    if !model.measures.is_empty() {
        issues.push(ValidationIssue::error(
            context,
            format!(
                "Semantic model `{}` has validity param dimensions defined and also has measures ({}). Measures are not supported on models with a validity window.",
                model.name,
                model
                    .measures
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }
}

// ─── AggregationTimeDimensionRule ───────────────────────────────────────────

/// The agg time dimension of every measure, and of every simple metric that
/// aggregates a model directly, is a time dimension of its model.
pub struct AggregationTimeDimensionRule;

impl SemanticManifestValidationRule for AggregationTimeDimensionRule {
    fn name(&self) -> &'static str {
        "AggregationTimeDimensionRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for model in &manifest.semantic_models {
            if let Some(default) = model
                .defaults
                .as_ref()
                .and_then(|d| d.agg_time_dimension.as_deref())
                && !is_time_dimension(model, default)
            {
                issues.push(ValidationIssue::error(
                    ValidationContext::semantic_model(model),
                    format!(
                        "In semantic model '{}', the default agg_time_dimension is set to '{}', which is not a valid time dimension in the semantic model",
                        model.name, default
                    ),
                ));
            }

            for measure in &model.measures {
                if let Some(issue) = check_element(model, measure) {
                    issues.push(issue.with_context(ValidationContext::semantic_model_element(
                        model,
                        &measure.name,
                        SemanticModelElementType::Measure,
                    )));
                }
            }
        }

        for metric in &manifest.metrics {
            let Some(aggregation) = metric.simple_aggregation() else {
                continue;
            };
            let Some(model) = manifest.semantic_model(&aggregation.params.semantic_model) else {
                tracing::warn!(
                    metric = %metric.name,
                    semantic_model = %aggregation.params.semantic_model,
                    "skipping agg time dimension check; semantic model not found"
                );
                continue;
            };
            if let Some(issue) = check_element(model, &aggregation) {
                issues.push(issue.with_context(ValidationContext::metric(metric)));
            }
        }

        issues
    }
}

fn is_time_dimension(model: &SemanticModel, name: &str) -> bool {
    model
        .dimension(name)
        .is_some_and(|d| d.dimension_type == DimensionType::Time)
}

fn check_element(model: &SemanticModel, element: &dyn AdditiveElement) -> Option<ValidationIssue> {
    let agg_time_dimension = model.agg_time_dimension_for(element)?;
    if is_time_dimension(model, agg_time_dimension.as_str()) {
        return None;
    }
    Some(ValidationIssue::error(
        None,
        format!(
            "In semantic model '{}', {} '{}' has the aggregation time dimension set to '{}', which is not a valid time dimension in the semantic model",
            model.name,
            element.element_kind().to_lowercase(),
            element.element_name(),
            agg_time_dimension
        ),
    ))
}
