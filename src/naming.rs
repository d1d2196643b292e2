//! Dundered names and reserved element names.
//!
//! A dundered name such as `listing__user__country__month` joins an entity
//! link path, an element name and an optional granularity suffix with
//! double underscores.

use crate::enums::TimeGranularity;
use crate::references::EntityReference;

pub const DUNDER: &str = "__";

/// The synthetic time dimension every metric can be grouped by.
pub const METRIC_TIME_ELEMENT_NAME: &str = "metric_time";

/// Column name reserved by the query engine for generated row identifiers.
pub const MF_INTERNAL_UUID: &str = "mf_internal_uuid";

/// Names the query engine owns.
pub const ENGINE_RESERVED_NAMES: [&str; 2] = [METRIC_TIME_ELEMENT_NAME, MF_INTERNAL_UUID];

pub fn is_metric_time_name(element_name: &str) -> bool {
    element_name == METRIC_TIME_ELEMENT_NAME
}

/// A dundered name split into its parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructuredDunderedName {
    pub entity_links: Vec<EntityReference>,
    pub element_name: String,
    /// Standard or custom granularity parsed from the last segment.
    pub time_granularity: Option<String>,
}

impl StructuredDunderedName {
    /// Re-join the parts with dunders.
    pub fn dundered_name(&self) -> String {
        let mut parts: Vec<&str> = self.entity_links.iter().map(|e| e.as_str()).collect();
        parts.push(&self.element_name);
        if let Some(grain) = &self.time_granularity {
            parts.push(grain);
        }
        parts.join(DUNDER)
    }

    /// The name without the granularity suffix.
    pub fn dundered_name_without_granularity(&self) -> String {
        let mut parts: Vec<&str> = self.entity_links.iter().map(|e| e.as_str()).collect();
        parts.push(&self.element_name);
        parts.join(DUNDER)
    }
}

/// Split `name` into entity links, element name and granularity.
///
/// The last segment is treated as a granularity only when there are at least
/// two segments and it names a standard grain or one of
/// `custom_granularity_names`.
pub fn parse_dundered_name(name: &str, custom_granularity_names: &[String]) -> StructuredDunderedName {
    let parts: Vec<&str> = name.split(DUNDER).collect();

    if parts.len() == 1 {
        return StructuredDunderedName {
            entity_links: Vec::new(),
            element_name: parts[0].to_string(),
            time_granularity: None,
        };
    }

    let last = parts[parts.len() - 1];
    let granularity = if TimeGranularity::from_name(last).is_some()
        || custom_granularity_names
            .iter()
            .any(|c| c.eq_ignore_ascii_case(last))
    {
        Some(last.to_string())
    } else {
        None
    };

    match granularity {
        Some(grain) => StructuredDunderedName {
            entity_links: parts[..parts.len() - 2]
                .iter()
                .map(|p| EntityReference::new(*p))
                .collect(),
            element_name: parts[parts.len() - 2].to_string(),
            time_granularity: Some(grain),
        },
        None => StructuredDunderedName {
            entity_links: parts[..parts.len() - 1]
                .iter()
                .map(|p| EntityReference::new(*p))
                .collect(),
            element_name: last.to_string(),
            time_granularity: None,
        },
    }
}
