use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::*;
use crate::references::*;
use crate::where_filter::WhereFilterIntersection;

// ─── Manifest ───────────────────────────────────────────────────────────────

/// The top-level container of a hydrated semantic manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticManifest {
    #[serde(default)]
    pub semantic_models: Vec<SemanticModel>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub saved_queries: Vec<SavedQuery>,
    #[serde(default)]
    pub project_configuration: ProjectConfiguration,
    #[serde(default = "default_interfaces_version")]
    pub interfaces_version: String,
}

fn default_interfaces_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for SemanticManifest {
    fn default() -> Self {
        Self {
            semantic_models: Vec::new(),
            metrics: Vec::new(),
            saved_queries: Vec::new(),
            project_configuration: ProjectConfiguration::default(),
            interfaces_version: default_interfaces_version(),
        }
    }
}

impl SemanticManifest {
    /// Names of every custom granularity declared on a time spine.
    pub fn custom_granularity_names(&self) -> Vec<String> {
        self.project_configuration
            .time_spines
            .iter()
            .flat_map(|spine| spine.custom_granularities.iter())
            .map(|g| g.name.to_lowercase())
            .collect()
    }

    pub fn semantic_model(&self, name: &str) -> Option<&SemanticModel> {
        self.semantic_models.iter().find(|m| m.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// The first semantic model defining the measure, with the measure.
    pub fn measure(&self, reference: &MeasureReference) -> Option<(&SemanticModel, &Measure)> {
        self.semantic_models.iter().find_map(|model| {
            model
                .measure(&reference.element_name)
                .map(|measure| (model, measure))
        })
    }
}

/// Project-level settings the manifest is compiled with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfiguration {
    #[serde(default)]
    pub time_spines: Vec<TimeSpine>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSpine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_relation: Option<NodeRelation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_column: Option<TimeSpinePrimaryColumn>,
    #[serde(default)]
    pub custom_granularities: Vec<CustomGranularity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSpinePrimaryColumn {
    pub name: String,
    pub time_granularity: TimeGranularity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomGranularity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
}

// ─── Provenance ─────────────────────────────────────────────────────────────

/// Slice of the YAML file an object was read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSlice {
    pub filename: String,
    #[serde(default)]
    pub content: String,
    pub start_line_number: usize,
    pub end_line_number: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub repo_file_path: String,
    pub file_slice: FileSlice,
}

// ─── Semantic models ────────────────────────────────────────────────────────

/// Physical location of a semantic model's table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRelation {
    pub alias: String,
    pub schema_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticModelDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_time_dimension: Option<String>,
}

/// A table with its entities, dimensions and measures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub node_relation: NodeRelation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<SemanticModelDefaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SemanticModel {
    pub fn reference(&self) -> SemanticModelReference {
        SemanticModelReference::new(self.name.clone())
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }

    /// Explicit `primary_entity`, else the entity typed `primary`, else the
    /// `natural` entity keying a validity window.
    pub fn primary_entity_reference(&self) -> Option<EntityReference> {
        if let Some(name) = &self.primary_entity {
            return Some(EntityReference::new(name.clone()));
        }
        self.entities
            .iter()
            .find(|e| e.entity_type == EntityType::Primary)
            .or_else(|| {
                self.entities
                    .iter()
                    .find(|e| e.entity_type == EntityType::Natural)
            })
            .map(Entity::reference)
    }

    /// Time dimensions flagged `is_primary`.
    pub fn primary_time_dimensions(&self) -> Vec<&Dimension> {
        self.dimensions
            .iter()
            .filter(|d| {
                d.dimension_type == DimensionType::Time
                    && d.type_params.as_ref().is_some_and(|p| p.is_primary)
            })
            .collect()
    }

    /// The time dimension an element aggregates over when none is set on
    /// the element itself: the model default, else the single primary time
    /// dimension.
    pub fn default_agg_time_dimension(&self) -> Option<TimeDimensionReference> {
        if let Some(name) = self
            .defaults
            .as_ref()
            .and_then(|d| d.agg_time_dimension.as_ref())
        {
            return Some(TimeDimensionReference::new(name.clone()));
        }
        match self.primary_time_dimensions().as_slice() {
            [only] => Some(TimeDimensionReference::new(only.name.clone())),
            _ => None,
        }
    }

    /// The agg time dimension of `element`, resolved through the model
    /// defaults.
    pub fn agg_time_dimension_for(
        &self,
        element: &dyn AdditiveElement,
    ) -> Option<TimeDimensionReference> {
        element
            .explicit_agg_time_dimension()
            .map(TimeDimensionReference::new)
            .or_else(|| self.default_agg_time_dimension())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Entity {
    pub fn reference(&self) -> EntityReference {
        EntityReference::new(self.name.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValidityParams {
    #[serde(default)]
    pub is_start: bool,
    #[serde(default)]
    pub is_end: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTypeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_granularity: Option<TimeGranularity>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_params: Option<DimensionValidityParams>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    #[serde(rename = "type")]
    pub dimension_type: DimensionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_partition: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_params: Option<DimensionTypeParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Dimension {
    pub fn reference(&self) -> DimensionReference {
        DimensionReference::new(self.name.clone())
    }

    pub fn time_granularity(&self) -> Option<TimeGranularity> {
        self.type_params.as_ref().and_then(|p| p.time_granularity)
    }

    pub fn validity_params(&self) -> Option<&DimensionValidityParams> {
        self.type_params
            .as_ref()
            .and_then(|p| p.validity_params.as_ref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureAggregationParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
    #[serde(default)]
    pub use_discrete_percentile: bool,
    #[serde(default)]
    pub use_approximate_percentile: bool,
}

fn default_window_choice() -> AggregationType {
    AggregationType::Min
}

/// Marks an aggregation as non-additive across a time dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonAdditiveDimensionParameters {
    pub name: String,
    #[serde(default = "default_window_choice")]
    pub window_choice: AggregationType,
    #[serde(default)]
    pub window_groupings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub name: String,
    pub agg: AggregationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub create_metric: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_params: Option<MeasureAggregationParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_additive_dimension: Option<NonAdditiveDimensionParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_time_dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Measure {
    pub fn reference(&self) -> MeasureReference {
        MeasureReference::new(self.name.clone())
    }
}

/// Something aggregated directly off a semantic model's rows: a measure, or a
/// simple metric declared with its own aggregation params.
pub trait AdditiveElement {
    /// Human-readable kind, e.g. "Measure".
    fn element_kind(&self) -> &'static str;
    fn element_name(&self) -> &str;
    fn agg(&self) -> AggregationType;
    fn agg_params(&self) -> Option<&MeasureAggregationParameters>;
    fn non_additive_dimension(&self) -> Option<&NonAdditiveDimensionParameters>;
    fn explicit_agg_time_dimension(&self) -> Option<&str>;
}

impl<T: AdditiveElement + ?Sized> AdditiveElement for &T {
    fn element_kind(&self) -> &'static str {
        (**self).element_kind()
    }

    fn element_name(&self) -> &str {
        (**self).element_name()
    }

    fn agg(&self) -> AggregationType {
        (**self).agg()
    }

    fn agg_params(&self) -> Option<&MeasureAggregationParameters> {
        (**self).agg_params()
    }

    fn non_additive_dimension(&self) -> Option<&NonAdditiveDimensionParameters> {
        (**self).non_additive_dimension()
    }

    fn explicit_agg_time_dimension(&self) -> Option<&str> {
        (**self).explicit_agg_time_dimension()
    }
}

impl AdditiveElement for Measure {
    fn element_kind(&self) -> &'static str {
        "Measure"
    }

    fn element_name(&self) -> &str {
        &self.name
    }

    fn agg(&self) -> AggregationType {
        self.agg
    }

    fn agg_params(&self) -> Option<&MeasureAggregationParameters> {
        self.agg_params.as_ref()
    }

    fn non_additive_dimension(&self) -> Option<&NonAdditiveDimensionParameters> {
        self.non_additive_dimension.as_ref()
    }

    fn explicit_agg_time_dimension(&self) -> Option<&str> {
        self.agg_time_dimension.as_deref()
    }
}

/// A simple metric viewed through its aggregation params.
pub struct SimpleMetricAggregation<'a> {
    pub metric: &'a Metric,
    pub params: &'a MetricAggregationParams,
}

impl AdditiveElement for SimpleMetricAggregation<'_> {
    fn element_kind(&self) -> &'static str {
        "Metric"
    }

    fn element_name(&self) -> &str {
        &self.metric.name
    }

    fn agg(&self) -> AggregationType {
        self.params.agg
    }

    fn agg_params(&self) -> Option<&MeasureAggregationParameters> {
        self.params.agg_params.as_ref()
    }

    fn non_additive_dimension(&self) -> Option<&NonAdditiveDimensionParameters> {
        self.params.non_additive_dimension.as_ref()
    }

    fn explicit_agg_time_dimension(&self) -> Option<&str> {
        self.params.agg_time_dimension.as_deref()
    }
}

// ─── Metrics ────────────────────────────────────────────────────────────────

/// A `<count> <granularity>` window, kept as written and parsed on demand
/// (see [`crate::primitives::parse_window`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricTimeWindow {
    pub window_string: String,
}

impl MetricTimeWindow {
    pub fn new(window_string: impl Into<String>) -> Self {
        Self {
            window_string: window_string.into(),
        }
    }
}

/// A measure used as a metric input. Accepts a bare name or an object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricInputMeasure {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<WhereFilterIntersection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub join_to_timespine: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_nulls_with: Option<i64>,
}

impl MetricInputMeasure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            alias: None,
            join_to_timespine: false,
            fill_nulls_with: None,
        }
    }

    pub fn measure_reference(&self) -> MeasureReference {
        MeasureReference::new(self.name.clone())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricInputMeasureRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        filter: Option<WhereFilterIntersection>,
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        join_to_timespine: bool,
        #[serde(default)]
        fill_nulls_with: Option<i64>,
    },
}

impl<'de> Deserialize<'de> for MetricInputMeasure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match MetricInputMeasureRepr::deserialize(deserializer)? {
            MetricInputMeasureRepr::Name(name) => MetricInputMeasure::new(name),
            MetricInputMeasureRepr::Full {
                name,
                filter,
                alias,
                join_to_timespine,
                fill_nulls_with,
            } => MetricInputMeasure {
                name,
                filter,
                alias,
                join_to_timespine,
                fill_nulls_with,
            },
        })
    }
}

/// A metric used as an input to a ratio or derived metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<WhereFilterIntersection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_window: Option<MetricTimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_to_grain: Option<String>,
}

impl MetricInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            alias: None,
            offset_window: None,
            offset_to_grain: None,
        }
    }

    pub fn as_reference(&self) -> MetricReference {
        MetricReference::new(self.name.clone())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricInputRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        filter: Option<WhereFilterIntersection>,
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        offset_window: Option<MetricTimeWindow>,
        #[serde(default)]
        offset_to_grain: Option<String>,
    },
}

impl<'de> Deserialize<'de> for MetricInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match MetricInputRepr::deserialize(deserializer)? {
            MetricInputRepr::Name(name) => MetricInput::new(name),
            MetricInputRepr::Full {
                name,
                filter,
                alias,
                offset_window,
                offset_to_grain,
            } => MetricInput {
                name,
                filter,
                alias,
                offset_window,
                offset_to_grain,
            },
        })
    }
}

/// Pairs a property of the base and conversion semantic models that must
/// hold the same value for a conversion to count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPropertyInput {
    pub base_property: String,
    pub conversion_property: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversionTypeParams {
    pub base_measure: MetricInputMeasure,
    pub conversion_measure: MetricInputMeasure,
    pub entity: String,
    #[serde(default)]
    pub calculation: ConversionCalculationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<MetricTimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant_properties: Option<Vec<ConstantPropertyInput>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeTypeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<MetricTimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_to_date: Option<String>,
    #[serde(default)]
    pub period_agg: PeriodAggregation,
}

/// Aggregation params for a simple metric that aggregates a column directly
/// instead of going through a measure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricAggregationParams {
    pub semantic_model: String,
    pub agg: AggregationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_params: Option<MeasureAggregationParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_time_dimension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_additive_dimension: Option<NonAdditiveDimensionParameters>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTypeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<MetricInputMeasure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerator: Option<MetricInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator: Option<MetricInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<MetricTimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grain_to_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetricInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_type_params: Option<ConversionTypeParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_type_params: Option<CumulativeTypeParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_aggregation_params: Option<MetricAggregationParams>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(default)]
    pub type_params: MetricTypeParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<WhereFilterIntersection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Metric {
    pub fn reference(&self) -> MetricReference {
        MetricReference::new(self.name.clone())
    }

    /// Measures this metric reads directly.
    pub fn input_measures(&self) -> Vec<&MetricInputMeasure> {
        let params = &self.type_params;
        let mut measures: Vec<&MetricInputMeasure> = params.measure.iter().collect();
        if let Some(conversion) = &params.conversion_type_params {
            measures.push(&conversion.base_measure);
            measures.push(&conversion.conversion_measure);
        }
        measures
    }

    /// Metrics this metric reads: numerator, denominator, derived inputs.
    pub fn input_metrics(&self) -> Vec<&MetricInput> {
        let params = &self.type_params;
        params
            .numerator
            .iter()
            .chain(params.denominator.iter())
            .chain(params.metrics.iter().flatten())
            .collect()
    }

    /// The aggregation params of a simple metric, viewed as an additive
    /// element.
    pub fn simple_aggregation(&self) -> Option<SimpleMetricAggregation<'_>> {
        match (&self.metric_type, &self.type_params.metric_aggregation_params) {
            (MetricType::Simple, Some(params)) => Some(SimpleMetricAggregation {
                metric: self,
                params,
            }),
            _ => None,
        }
    }
}

// ─── Saved queries ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedQueryQueryParams {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<WhereFilterIntersection>,
    #[serde(default)]
    pub order_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub export_as: ExportDestinationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Named output destination of a saved query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    pub config: ExportConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub name: String,
    #[serde(default)]
    pub query_params: SavedQueryQueryParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub exports: Vec<Export>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl SavedQuery {
    pub fn reference(&self) -> SavedQueryReference {
        SavedQueryReference::new(self.name.clone())
    }
}
