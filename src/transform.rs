//! Default transforms that turn an authored manifest into the form the
//! validator and query engine expect.
//!
//! Every step is idempotent, so `transform(transform(m)?)? == transform(m)?`.

use std::collections::HashSet;

use crate::enums::{AggregationType, MetricType};
use crate::error::ModelTransformError;
use crate::types::*;

/// Apply the default transform pipeline to `manifest`.
///
/// # Errors
///
/// [`ModelTransformError`] when a measure is configured in a way that can't
/// be rewritten, e.g. a COUNT without an `expr`.
pub fn transform(mut manifest: SemanticManifest) -> Result<SemanticManifest, ModelTransformError> {
    lowercase_names(&mut manifest);
    convert_count_to_sum(&mut manifest)?;
    convert_sum_boolean_to_sum(&mut manifest);
    convert_median_to_percentile(&mut manifest);
    set_measure_agg_time_dimension(&mut manifest);
    add_proxy_metrics(&mut manifest);
    Ok(manifest)
}

// ─── Names ──────────────────────────────────────────────────────────────────

fn lowercase_names(manifest: &mut SemanticManifest) {
    for model in &mut manifest.semantic_models {
        model.name = model.name.to_lowercase();
        for entity in &mut model.entities {
            entity.name = entity.name.to_lowercase();
        }
        for dimension in &mut model.dimensions {
            dimension.name = dimension.name.to_lowercase();
        }
        for measure in &mut model.measures {
            measure.name = measure.name.to_lowercase();
        }
    }
    for metric in &mut manifest.metrics {
        metric.name = metric.name.to_lowercase();
    }
    for saved_query in &mut manifest.saved_queries {
        saved_query.name = saved_query.name.to_lowercase();
    }
}

// ─── Aggregations ───────────────────────────────────────────────────────────

fn convert_count_to_sum(manifest: &mut SemanticManifest) -> Result<(), ModelTransformError> {
    for model in &mut manifest.semantic_models {
        for measure in &mut model.measures {
            if measure.agg != AggregationType::Count {
                continue;
            }
            let Some(expr) = &measure.expr else {
                return Err(ModelTransformError {
                    message: format!(
                        "Measure {} uses a COUNT aggregation, which requires an expr to be provided. \
                         Provide 'expr: 1' if a count of all rows is desired.",
                        measure.name
                    ),
                });
            };
            if expr.trim() != "1" {
                measure.expr = Some(format!("CASE WHEN {} IS NOT NULL THEN 1 ELSE 0 END", expr));
            }
            measure.agg = AggregationType::Sum;
        }
    }
    Ok(())
}

fn convert_sum_boolean_to_sum(manifest: &mut SemanticManifest) {
    for model in &mut manifest.semantic_models {
        for measure in &mut model.measures {
            if measure.agg != AggregationType::SumBoolean {
                continue;
            }
            let expr = measure.expr.as_deref().unwrap_or(&measure.name);
            measure.expr = Some(format!("CASE WHEN {} THEN 1 ELSE 0 END", expr));
            measure.agg = AggregationType::Sum;
        }
    }
}

fn convert_median_to_percentile(manifest: &mut SemanticManifest) {
    for model in &mut manifest.semantic_models {
        for measure in &mut model.measures {
            if measure.agg != AggregationType::Median {
                continue;
            }
            let params = measure.agg_params.get_or_insert_with(Default::default);
            params.percentile = Some(0.5);
            params.use_discrete_percentile = false;
            measure.agg = AggregationType::Percentile;
        }
    }
}

// ─── Defaults ───────────────────────────────────────────────────────────────

fn set_measure_agg_time_dimension(manifest: &mut SemanticManifest) {
    for model in &mut manifest.semantic_models {
        let Some(default) = model.default_agg_time_dimension() else {
            continue;
        };
        for measure in &mut model.measures {
            if measure.agg_time_dimension.is_none() {
                measure.agg_time_dimension = Some(default.element_name.clone());
            }
        }
    }
}

fn add_proxy_metrics(manifest: &mut SemanticManifest) {
    let existing: HashSet<String> = manifest.metrics.iter().map(|m| m.name.clone()).collect();

    let proxies: Vec<Metric> = manifest
        .semantic_models
        .iter()
        .flat_map(|model| model.measures.iter().map(move |measure| (model, measure)))
        .filter(|(_, measure)| measure.create_metric && !existing.contains(&measure.name))
        .map(|(model, measure)| {
            tracing::debug!(
                semantic_model = %model.name,
                measure = %measure.name,
                "adding proxy metric for measure"
            );
            Metric {
                name: measure.name.clone(),
                metric_type: MetricType::Simple,
                type_params: MetricTypeParams {
                    measure: Some(MetricInputMeasure::new(measure.name.clone())),
                    ..Default::default()
                },
                filter: None,
                description: measure.description.clone(),
                label: measure.label.clone(),
                metadata: model.metadata.clone(),
            }
        })
        .collect();

    manifest.metrics.extend(proxies);
}
