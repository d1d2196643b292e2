use std::collections::{BTreeSet, HashMap};

use crate::enums::{DimensionType, EntityType, SemanticModelElementType, TimeGranularity};
use crate::error::{ValidationContext, ValidationIssue};
use crate::rules::{SemanticManifestValidationRule, first_by_name};
use crate::types::{Dimension, SemanticManifest, SemanticModel};

fn model_elements(model: &SemanticModel) -> Vec<(&str, SemanticModelElementType)> {
    model
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
        )
        .collect()
}

// ─── ElementConsistencyRule ─────────────────────────────────────────────────

/// An element name means the same kind of element in every semantic model.
pub struct ElementConsistencyRule;

impl SemanticManifestValidationRule for ElementConsistencyRule {
    fn name(&self) -> &'static str {
        "ElementConsistencyRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut types_by_name: HashMap<&str, BTreeSet<String>> = HashMap::new();
        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            for (name, element_type) in model_elements(model) {
                types_by_name
                    .entry(name)
                    .or_default()
                    .insert(element_type.to_string());
            }
        }

        let mut issues = Vec::new();
        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            for (name, element_type) in model_elements(model) {
                let Some(types) = types_by_name.get(name) else {
                    continue;
                };
                if types.len() > 1 {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(model, name, element_type),
                        format!(
                            "In semantic model `{}`, element `{}` is of type {}, but it is used as types {} across the model.",
                            model.name,
                            name,
                            element_type,
                            types.iter().cloned().collect::<Vec<_>>().join(", ")
                        ),
                    ));
                }
            }
        }
        issues
    }
}

// ─── DimensionConsistencyRule ───────────────────────────────────────────────

struct DimensionInvariants {
    model_name: String,
    dimension_type: DimensionType,
    is_partition: bool,
    time_granularity: Option<TimeGranularity>,
}

impl DimensionInvariants {
    fn of(model: &SemanticModel, dimension: &Dimension) -> Self {
        Self {
            model_name: model.name.clone(),
            dimension_type: dimension.dimension_type,
            is_partition: dimension.is_partition,
            time_granularity: dimension.time_granularity(),
        }
    }
}

/// Dimensions sharing a name across semantic models agree on type,
/// partitioning and time granularity.
pub struct DimensionConsistencyRule;

impl SemanticManifestValidationRule for DimensionConsistencyRule {
    fn name(&self) -> &'static str {
        "DimensionConsistencyRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut first_seen: HashMap<&str, DimensionInvariants> = HashMap::new();

        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            for dimension in &model.dimensions {
                let Some(known) = first_seen.get(dimension.name.as_str()) else {
                    first_seen.insert(&dimension.name, DimensionInvariants::of(model, dimension));
                    continue;
                };
                let context = ValidationContext::semantic_model_element(
                    model,
                    &dimension.name,
                    SemanticModelElementType::Dimension,
                );

                if known.dimension_type != dimension.dimension_type {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "In semantic model `{}`, type conflict for dimension `{}` - already in semantic model `{}` as type `{}` but got `{}`",
                            model.name,
                            dimension.name,
                            known.model_name,
                            known.dimension_type,
                            dimension.dimension_type
                        ),
                    ));
                }

                if known.is_partition != dimension.is_partition {
                    issues.push(ValidationIssue::error(
                        context.clone(),
                        format!(
                            "In semantic model `{}`, conflicting is_partition attribute for dimension `{}` - already in semantic model `{}` with is_partition as `{}` but got `{}`",
                            model.name,
                            dimension.name,
                            known.model_name,
                            known.is_partition,
                            dimension.is_partition
                        ),
                    ));
                }

                if let (Some(known_grain), Some(grain)) =
                    (known.time_granularity, dimension.time_granularity())
                    && known_grain != grain
                {
                    issues.push(ValidationIssue::error(
                        context,
                        format!(
                            "In semantic model `{}`, time granularity conflict for dimension `{}` - already in semantic model `{}` with granularity `{}` but got `{}`",
                            model.name, dimension.name, known.model_name, known_grain, grain
                        ),
                    ));
                }
            }
        }

        issues
    }
}

// ─── PrimaryEntityRule ──────────────────────────────────────────────────────

/// A semantic model has at most one primary entity, declared one way, and
/// one is required once the model has dimensions.
pub struct PrimaryEntityRule;

impl SemanticManifestValidationRule for PrimaryEntityRule {
    fn name(&self) -> &'static str {
        "PrimaryEntityRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for model in &manifest.semantic_models {
            let context = ValidationContext::semantic_model(model);
            let primaries: Vec<&str> = model
                .entities
                .iter()
                .filter(|e| e.entity_type == EntityType::Primary)
                .map(|e| e.name.as_str())
                .collect();

            if primaries.len() > 1 {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "Semantic model `{}` has multiple primary entities ({}). Only one entity can be of type primary.",
                        model.name,
                        primaries.join(", ")
                    ),
                ));
            }

            if let (Some(explicit), Some(typed)) = (&model.primary_entity, primaries.first())
                && explicit.as_str() != *typed
            {
                issues.push(ValidationIssue::error(
                    context.clone(),
                    format!(
                        "Semantic model `{}` sets `primary_entity: {}` but also has an entity of type primary (`{}`). Only one primary entity can be declared.",
                        model.name, explicit, typed
                    ),
                ));
            }

            if !model.dimensions.is_empty() && model.primary_entity_reference().is_none() {
                issues.push(ValidationIssue::error(
                    context,
                    format!(
                        "The semantic model '{}' contains dimensions, but it does not define a primary entity.",
                        model.name
                    ),
                ));
            }
        }

        issues
    }
}

// ─── PrimaryEntityDimensionPairs ────────────────────────────────────────────

/// A (primary entity, dimension) pair is defined in only one semantic model,
/// otherwise `entity__dimension` would be ambiguous.
pub struct PrimaryEntityDimensionPairs;

impl SemanticManifestValidationRule for PrimaryEntityDimensionPairs {
    fn name(&self) -> &'static str {
        "PrimaryEntityDimensionPairs"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut owners: HashMap<(String, String), &str> = HashMap::new();

        for model in first_by_name(&manifest.semantic_models, |m| m.name.as_str()) {
            let Some(primary) = model.primary_entity_reference() else {
                continue;
            };
            for dimension in &model.dimensions {
                let key = (primary.element_name.clone(), dimension.name.clone());
                if let Some(owner) = owners.get(&key) {
                    issues.push(ValidationIssue::error(
                        ValidationContext::semantic_model_element(
                            model,
                            &dimension.name,
                            SemanticModelElementType::Dimension,
                        ),
                        format!(
                            "In semantic model `{}`, dimension `{}` with primary entity `{}` is already defined in semantic model `{}`. The reference `{}__{}` would be ambiguous.",
                            model.name, dimension.name, primary, owner, primary, dimension.name
                        ),
                    ));
                } else {
                    owners.insert(key, &model.name);
                }
            }
        }

        issues
    }
}
