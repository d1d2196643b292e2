//! The validation rules run over a semantic manifest.
//!
//! Each rule is independent and stateless: it reads the whole manifest and
//! returns every issue it finds. Rules never mutate the manifest and never
//! rely on another rule having run.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::ValidationIssue;
use crate::types::SemanticManifest;

mod elements;
mod measures;
mod metrics;
mod names;
mod non_empty;
mod reserved_keywords;
mod saved_queries;
mod time_dimensions;
mod where_filters;

pub use elements::{
    DimensionConsistencyRule, ElementConsistencyRule, PrimaryEntityDimensionPairs,
    PrimaryEntityRule,
};
pub use measures::{
    CountAggregationExprRule, MeasuresNonAdditiveDimensionRule, PercentileAggregationRule,
};
pub use metrics::{
    ConversionMetricRule, CumulativeMetricRule, DerivedMetricRule, MeasureAliasesRule,
    MetricLabelsRule, MetricMeasuresRule, MetricTypeParamsRule,
};
pub use names::{SemanticModelLabelsRule, SemanticModelMeasuresUniqueRule, UniqueAndValidNameRule};
pub use non_empty::NonEmptyRule;
pub use reserved_keywords::{RESERVED_SQL_KEYWORDS, ReservedKeywordsRule, is_reserved_sql_keyword};
pub use saved_queries::SavedQueryRule;
pub use time_dimensions::{
    AggregationTimeDimensionRule, SemanticModelTimeDimensionRule, SemanticModelValidityWindowRule,
};
pub use where_filters::WhereFiltersAreParseableRule;

/// A single check over a semantic manifest.
///
/// Implementations must be safe to run concurrently with other rules on the
/// same manifest.
pub trait SemanticManifestValidationRule: Send + Sync {
    /// Stable rule name, used in logs and in the issue reported when the rule
    /// itself fails.
    fn name(&self) -> &'static str;

    /// Every issue found in `manifest`.
    fn validate(&self, manifest: &SemanticManifest) -> Vec<ValidationIssue>;
}

/// Items whose name has not appeared earlier in `items`.
///
/// Cross-object rules walk these so a repeated top-level object is reported
/// once, by [`UniqueAndValidNameRule`].
pub(crate) fn first_by_name<'a, T>(
    items: &'a [T],
    name: fn(&T) -> &str,
) -> impl Iterator<Item = &'a T> {
    let mut seen = HashSet::new();
    items.iter().filter(move |&item| seen.insert(name(item)))
}

/// The rule set used by [`crate::validate::SemanticManifestValidator::with_default_rules`].
pub fn default_rules() -> Vec<Arc<dyn SemanticManifestValidationRule>> {
    vec![
        Arc::new(NonEmptyRule),
        Arc::new(UniqueAndValidNameRule),
        Arc::new(SemanticModelMeasuresUniqueRule),
        Arc::new(SemanticModelLabelsRule),
        Arc::new(ElementConsistencyRule),
        Arc::new(DimensionConsistencyRule),
        Arc::new(PrimaryEntityRule),
        Arc::new(PrimaryEntityDimensionPairs),
        Arc::new(SemanticModelTimeDimensionRule),
        Arc::new(SemanticModelValidityWindowRule),
        Arc::new(AggregationTimeDimensionRule),
        Arc::new(CountAggregationExprRule),
        Arc::new(PercentileAggregationRule),
        Arc::new(MeasuresNonAdditiveDimensionRule),
        Arc::new(MetricTypeParamsRule),
        Arc::new(MetricMeasuresRule),
        Arc::new(MeasureAliasesRule),
        Arc::new(CumulativeMetricRule),
        Arc::new(DerivedMetricRule),
        Arc::new(ConversionMetricRule),
        Arc::new(MetricLabelsRule),
        Arc::new(ReservedKeywordsRule),
        Arc::new(WhereFiltersAreParseableRule),
        Arc::new(SavedQueryRule),
    ]
}
