use std::collections::{HashMap, HashSet};

use crate::enums::{SemanticModelElementType, TimeGranularity};
use crate::error::{ValidationContext, ValidationIssue};
use crate::primitives::{check_valid_name, is_valid_granularity_name};
use crate::rules::{SemanticManifestValidationRule, first_by_name};
use crate::types::{SemanticManifest, SemanticModel};

// ─── UniqueAndValidNameRule ─────────────────────────────────────────────────

/// Names are valid identifiers and unique: top-level objects within their
/// category, elements within their semantic model, custom granularities
/// within the project.
pub struct UniqueAndValidNameRule;

impl SemanticManifestValidationRule for UniqueAndValidNameRule {
    fn name(&self) -> &'static str {
        "UniqueAndValidNameRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut model_names = HashSet::new();
        for model in &manifest.semantic_models {
            let context = ValidationContext::semantic_model(model);
            issues.extend(check_valid_name(&model.name, Some(&context)));
            if !model_names.insert(model.name.as_str()) {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "Can't use name `{}` for a semantic model when it was already used for a semantic model",
                        model.name
                    ),
                ));
            }
            check_model_elements(model, &mut issues);
        }

        let mut metric_names = HashSet::new();
        for metric in &manifest.metrics {
            let context = ValidationContext::metric(metric);
            issues.extend(check_valid_name(&metric.name, Some(&context)));
            if !metric_names.insert(metric.name.as_str()) {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "Can't use name `{}` for a metric when it was already used for a metric",
                        metric.name
                    ),
                ));
            }
        }

        let mut saved_query_names = HashSet::new();
        for saved_query in &manifest.saved_queries {
            let context = ValidationContext::saved_query(saved_query);
            issues.extend(check_valid_name(&saved_query.name, Some(&context)));
            if !saved_query_names.insert(saved_query.name.as_str()) {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "Can't use name `{}` for a saved query when it was already used for a saved query",
                        saved_query.name
                    ),
                ));
            }
        }

        check_custom_granularities(manifest, &mut issues);
        issues
    }
}

fn check_model_elements(model: &SemanticModel, issues: &mut Vec<ValidationIssue>) {
    let elements = model
        .entities
        .iter()
        .map(|e| (e.name.as_str(), SemanticModelElementType::Entity))
        .chain(
            model
                .dimensions
                .iter()
                .map(|d| (d.name.as_str(), SemanticModelElementType::Dimension)),
        )
        .chain(
            model
                .measures
                .iter()
                .map(|m| (m.name.as_str(), SemanticModelElementType::Measure)),
        );

    let mut seen: HashMap<&str, SemanticModelElementType> = HashMap::new();
    for (name, element_type) in elements {
        let context = ValidationContext::semantic_model_element(model, name, element_type);
        issues.extend(check_valid_name(name, Some(&context)));
        if let Some(existing) = seen.get(name) {
            issues.push(ValidationIssue::error(
                context,
                format!(
                    "In semantic model `{}`, can't use name `{}` for a {} when it was already used for a {}",
                    model.name, name, element_type, existing
                ),
            ));
        } else {
            seen.insert(name, element_type);
        }
    }

    if let Some(primary_entity) = &model.primary_entity {
        let context = ValidationContext::semantic_model(model);
        issues.extend(check_valid_name(primary_entity, Some(&context)));
    }
}

fn check_custom_granularities(manifest: &SemanticManifest, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for granularity in manifest
        .project_configuration
        .time_spines
        .iter()
        .flat_map(|spine| spine.custom_granularities.iter())
    {
        let name = granularity.name.to_lowercase();
        if !is_valid_granularity_name(&name) {
            issues.push(ValidationIssue::error(
                None,
                format!(
                    "Invalid custom granularity name `{}` - names may only contain letters, numbers, and underscores, and must start with a letter.",
                    granularity.name
                ),
            ));
        }
        if TimeGranularity::from_name(&name).is_some() {
            issues.push(ValidationIssue::error(
                None,
                format!(
                    "Custom granularity `{}` can't use the name of a standard time granularity ({})",
                    granularity.name,
                    TimeGranularity::names().join(", ")
                ),
            ));
        }
        if !seen.insert(name) {
            issues.push(ValidationIssue::error(
                None,
                format!(
                    "Custom granularity `{}` is defined more than once across time spines",
                    granularity.name
                ),
            ));
        }
    }
}

// ─── SemanticModelMeasuresUniqueRule ────────────────────────────────────────

/// A measure name may be defined in only one semantic model.
pub struct SemanticModelMeasuresUniqueRule;

impl SemanticManifestValidationRule for SemanticModelMeasuresUniqueRule {
    fn name(&self) -> &'static str {
        "SemanticModelMeasuresUniqueRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut models_by_measure: HashMap<&str, Vec<&str>> = HashMap::new();

        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            for measure in &model.measures {
                let seen_in = models_by_measure.entry(measure.name.as_str()).or_default();
                if !seen_in.is_empty() {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(
                            model,
                            &measure.name,
                            SemanticModelElementType::Measure,
                        ),
                        format!(
                            "Found measure with name {} in multiple semantic models with names ({})",
                            measure.name,
                            seen_in.join(", ")
                        ),
                    ));
                }
                seen_in.push(model.name.as_str());
            }
        }

        issues
    }
}

// ─── SemanticModelLabelsRule ────────────────────────────────────────────────

/// Semantic model labels are unique across the manifest; element labels are
/// unique within their semantic model.
pub struct SemanticModelLabelsRule;

impl SemanticManifestValidationRule for SemanticModelLabelsRule {
    fn name(&self) -> &'static str {
        "SemanticModelLabelsRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut model_labels: HashMap<&str, &str> = HashMap::new();

        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            if let Some(label) = &model.label {
                if let Some(other) = model_labels.get(label.as_str()) {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model(model),
                        format!(
                            "Semantic model label `{}` is used by multiple semantic models: `{}` and `{}`",
                            label, other, model.name
                        ),
                    ));
                } else {
                    model_labels.insert(label, &model.name);
                }
            }

            let labelled = model
                .entities
                .iter()
                .filter_map(|e| e.label.as_deref().map(|l| (l, e.name.as_str(), SemanticModelElementType::Entity)))
                .chain(model.dimensions.iter().filter_map(|d| {
                    d.label
                        .as_deref()
                        .map(|l| (l, d.name.as_str(), SemanticModelElementType::Dimension))
                }))
                .chain(model.measures.iter().filter_map(|m| {
                    m.label
                        .as_deref()
                        .map(|l| (l, m.name.as_str(), SemanticModelElementType::Measure))
                }));

            let mut element_labels: HashMap<&str, &str> = HashMap::new();
            for (label, name, element_type) in labelled {
                if let Some(other) = element_labels.get(label) {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(model, name, element_type),
                        format!(
                            "In semantic model `{}`, label `{}` is used by both `{}` and `{}`",
                            model.name, label, other, name
                        ),
                    ));
                } else {
                    element_labels.insert(label, name);
                }
            }
        }

        issues
    }
}
