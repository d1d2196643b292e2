use crate::error::ValidationIssue;
use crate::rules::SemanticManifestValidationRule;
use crate::types::SemanticManifest;

/// A manifest must define at least one semantic model and at least one
/// metric. A measure with `create_metric` counts as a metric.
pub struct NonEmptyRule;

impl SemanticManifestValidationRule for NonEmptyRule {
    fn name(&self) -> &'static str {
        "NonEmptyRule"
    }

    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if manifest.semantic_models.is_empty() {
            issues.push(ValidationIssue::error(
                None,
                "No semantic models present in the model.",
            ));
        }

        if manifest.metrics.is_empty() {
            let creates_metric = manifest
                .semantic_models
                .iter()
                .flat_map(|m| m.measures.iter())
                .any(|m| m.create_metric);
            if !creates_metric {
                issues.push(ValidationIssue::error(None, "No metrics present in the model."));
            }
        }

        issues
    }
}
