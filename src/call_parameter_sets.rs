//! Structured records of the calls found in a where-filter or group-by
//! template. This is the contract exported to query compilation.

use crate::enums::DatePart;
use crate::references::{
    DimensionReference, EntityReference, LinkableElementReference, MetricReference,
    TimeDimensionReference,
};
use serde::{Deserialize, Serialize};

/// One `Dimension(...)` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionCallParameterSet {
    pub entity_path: Vec<EntityReference>,
    pub dimension_reference: DimensionReference,
}

/// One `TimeDimension(...)` call, or a `Dimension(...)` call chained with
/// `.grain(...)` / `.date_part(...)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeDimensionCallParameterSet {
    pub entity_path: Vec<EntityReference>,
    pub time_dimension_reference: TimeDimensionReference,
    /// Lowercased granularity name; may be a custom granularity.
    pub time_granularity_name: Option<String>,
    pub date_part: Option<DatePart>,
}

/// One `Entity(...)` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityCallParameterSet {
    pub entity_path: Vec<EntityReference>,
    pub entity_reference: EntityReference,
}

/// One `Metric(...)` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricCallParameterSet {
    pub metric_reference: MetricReference,
    pub group_by: Vec<LinkableElementReference>,
}

/// Every call found in one template, in call order. Repeated calls are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCallParameterSets {
    pub dimension_call_parameter_sets: Vec<DimensionCallParameterSet>,
    pub time_dimension_call_parameter_sets: Vec<TimeDimensionCallParameterSet>,
    pub entity_call_parameter_sets: Vec<EntityCallParameterSet>,
    pub metric_call_parameter_sets: Vec<MetricCallParameterSet>,
}

impl FilterCallParameterSets {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of calls recorded.
    pub fn len(&self) -> usize {
        self.dimension_call_parameter_sets.len()
            + self.time_dimension_call_parameter_sets.len()
            + self.entity_call_parameter_sets.len()
            + self.metric_call_parameter_sets.len()
    }

    /// Append another set's calls after this one's.
    pub fn extend(&mut self, other: FilterCallParameterSets) {
        self.dimension_call_parameter_sets
            .extend(other.dimension_call_parameter_sets);
        self.time_dimension_call_parameter_sets
            .extend(other.time_dimension_call_parameter_sets);
        self.entity_call_parameter_sets
            .extend(other.entity_call_parameter_sets);
        self.metric_call_parameter_sets
            .extend(other.metric_call_parameter_sets);
    }

    /// Element names of every dimension, time dimension and entity call.
    pub fn linkable_element_names(&self) -> Vec<&str> {
        self.entity_call_parameter_sets
            .iter()
            .map(|c| c.entity_reference.as_str())
            .chain(
                self.dimension_call_parameter_sets
                    .iter()
                    .map(|c| c.dimension_reference.as_str()),
            )
            .chain(
                self.time_dimension_call_parameter_sets
                    .iter()
                    .map(|c| c.time_dimension_reference.as_str()),
            )
            .collect()
    }
}
