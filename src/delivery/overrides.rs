//! Per-entity delivery overrides.
//!
//! Projects, episodes, sequences and shots may each redefine delivery
//! fields. A hierarchy is kept most specific first. Field lookups stop at
//! the first level that defines the field; anatomy overrides come from the
//! first level that defines any override unless levels are merged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shotforged_common::{DeliveryType, EntityLevel};
use tracing::debug;

/// Override value meaning "keep what the source context has".
pub const USE_SOURCE_VALUE: &str = "-- Use source --";

pub(crate) const OVERRIDE_SUFFIX: &str = "_override";
pub(crate) const CUSTOM_TOKENS_KEY: &str = "custom_tokens";

/// Delivery fields set on one tracker entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideEntity {
    pub level: EntityLevel,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl OverrideEntity {
    pub fn new(level: EntityLevel) -> Self {
        Self {
            level,
            name: None,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Value of `key` when it is actually set: nulls, empty strings and
    /// empty collections count as unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| is_set(value))
    }

    pub fn defines(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether any anatomy override is set here. `*_override` keys holding
    /// [`USE_SOURCE_VALUE`] don't count.
    pub fn defines_overrides(&self) -> bool {
        self.fields.iter().any(|(key, value)| {
            is_override(key, value) || (key == CUSTOM_TOKENS_KEY && is_set(value))
        })
    }

    fn set_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().filter(|(_, value)| is_set(value))
    }
}

/// A `*_override` key carrying a value to apply.
pub(crate) fn is_override(key: &str, value: &Value) -> bool {
    key.ends_with(OVERRIDE_SUFFIX) && is_set(value) && value.as_str() != Some(USE_SOURCE_VALUE)
}

pub(crate) fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

/// Override entities ordered from most to least specific.
///
/// ```
/// use serde_json::json;
/// use shotforged::delivery::overrides::{OverrideEntity, OverrideHierarchy};
/// use shotforged_common::{DeliveryType, EntityLevel};
///
/// let hierarchy = OverrideHierarchy::new(vec![
///     OverrideEntity::new(EntityLevel::Project)
///         .with_field("sg_review_output_type", json!(["mov_review"])),
///     OverrideEntity::new(EntityLevel::Shot),
/// ]);
///
/// let (names, level) = hierarchy.get_representation_names(&[DeliveryType::Review]);
/// assert_eq!(names, ["mov_review"]);
/// assert_eq!(level, Some(EntityLevel::Project));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<OverrideEntity>", into = "Vec<OverrideEntity>")]
pub struct OverrideHierarchy {
    entities: Vec<OverrideEntity>,
}

impl From<Vec<OverrideEntity>> for OverrideHierarchy {
    fn from(entities: Vec<OverrideEntity>) -> Self {
        Self::new(entities)
    }
}

impl From<OverrideHierarchy> for Vec<OverrideEntity> {
    fn from(hierarchy: OverrideHierarchy) -> Self {
        hierarchy.entities
    }
}

impl OverrideHierarchy {
    /// Entities may be given in any order; they are sorted by level.
    pub fn new(mut entities: Vec<OverrideEntity>) -> Self {
        entities.sort_by_key(|entity| entity.level);
        Self { entities }
    }

    pub fn entities(&self) -> &[OverrideEntity] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Most specific value of `key` and the level defining it.
    pub fn find(&self, key: &str) -> Option<(&Value, EntityLevel)> {
        self.entities
            .iter()
            .find_map(|entity| entity.get(key).map(|value| (value, entity.level)))
    }

    /// Set fields of the most specific level that defines any override.
    pub fn effective(&self) -> Map<String, Value> {
        let Some(entity) = self.entities.iter().find(|e| e.defines_overrides()) else {
            return Map::new();
        };
        debug!("Using delivery overrides from {} level", entity.level);
        entity
            .set_fields()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// All set fields folded from generic to specific; specific levels win.
    pub fn merged(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for entity in self.entities.iter().rev() {
            for (key, value) in entity.set_fields() {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Delivery data for the output anatomy: [`Self::merged`] when
    /// `merge_levels` is set, [`Self::effective`] otherwise.
    pub fn delivery_data(&self, merge_levels: bool) -> Map<String, Value> {
        if merge_levels {
            self.merged()
        } else {
            self.effective()
        }
    }

    /// Representation names for `delivery_types` from the most specific
    /// level that defines any of their output-type fields.
    ///
    /// Output types may be a list of names or a map keyed by representation
    /// name. Names are lowercased, stripped of spaces and suffixed with the
    /// delivery type when they don't end with it already.
    pub fn get_representation_names(
        &self,
        delivery_types: &[DeliveryType],
    ) -> (Vec<String>, Option<EntityLevel>) {
        for entity in &self.entities {
            let mut names = Vec::new();
            for delivery_type in delivery_types {
                let Some(value) = entity.get(&delivery_type.output_type_field()) else {
                    continue;
                };
                for name in output_type_names(value) {
                    let name = representation_name(&name, *delivery_type);
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            if !names.is_empty() {
                debug!(
                    "Using output types from {} level: {:?}",
                    entity.level, names
                );
                return (names, Some(entity.level));
            }
        }
        (Vec::new(), None)
    }
}

fn output_type_names(value: &Value) -> Vec<String> {
    match value {
        Value::String(name) => vec![name.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.clone()),
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn representation_name(name: &str, delivery_type: DeliveryType) -> String {
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    let name = name.to_lowercase();
    let suffix = format!("_{}", delivery_type.as_str());
    if name.ends_with(&suffix) {
        name
    } else {
        format!("{name}{suffix}")
    }
}
