use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

pub const PERIMETER: &str = "perimeter";
pub const STREETS: &str = "streets";
pub const BUILDINGS: &str = "buildings";
pub const LANDUSES: &str = "landuses";
pub const NATURALS: &str = "naturals";
pub const BOUNDARYS: &str = "boundarys";
pub const RAILWAYS: &str = "railways";
pub const WATERS: &str = "waters";
pub const GREEN_SPACES: &str = "green_spaces";

/// The value side of a tag predicate.
///
/// Serializes to the shape the data source expects: `true`, a bare string, or
/// a list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// The tag must be present, with any value.
    Any,
    Exact(String),
    OneOf(Vec<String>),
}

impl TagValue {
    pub fn exact(value: &str) -> Self {
        TagValue::Exact(value.to_string())
    }

    pub fn one_of(values: &[&str]) -> Self {
        TagValue::OneOf(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            TagValue::Any => true,
            TagValue::Exact(expected) => expected == value,
            TagValue::OneOf(values) => values.iter().any(|v| v == value),
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagValue::Any => serializer.serialize_bool(true),
            TagValue::Exact(value) => serializer.serialize_str(value),
            TagValue::OneOf(values) => serializer.collect_seq(values),
        }
    }
}

/// Feature-tag predicates used to request a layer's geometry.
///
/// A feature belongs to the layer when any one of the predicates matches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selector {
    tags: IndexMap<String, TagValue>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: TagValue) -> Self {
        self.tags.insert(key.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn matches(&self, feature_tags: &[(&str, &str)]) -> bool {
        feature_tags.iter().any(|(key, value)| {
            self.tags
                .get(*key)
                .is_some_and(|predicate| predicate.matches(value))
        })
    }
}

/// Street classification to line width.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WidthTable(IndexMap<String, f64>);

impl WidthTable {
    pub fn get(&self, classification: &str) -> Option<f64> {
        self.0.get(classification).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for WidthTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        WidthTable(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerDefinition {
    #[serde(rename = "tags", skip_serializing_if = "Selector::is_empty")]
    selector: Selector,
    #[serde(rename = "width", skip_serializing_if = "Option::is_none")]
    width_table: Option<WidthTable>,
}

impl LayerDefinition {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tagged(selector: Selector) -> Self {
        Self {
            selector,
            width_table: None,
        }
    }

    pub fn with_widths(width_table: WidthTable) -> Self {
        Self {
            selector: Selector::new(),
            width_table: Some(width_table),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn width_table(&self) -> Option<&WidthTable> {
        self.width_table.as_ref()
    }
}

/// The ordered set of named map layers handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LayerCatalog {
    layers: IndexMap<String, LayerDefinition>,
}

impl LayerCatalog {
    pub fn get(&self, name: &str) -> Option<&LayerDefinition> {
        self.layers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayerDefinition)> {
        self.layers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

static LAYERS: LazyLock<LayerCatalog> = LazyLock::new(build_catalog);

/// Returns the fixed layer catalog. Built once on first access.
pub fn get_layers() -> &'static LayerCatalog {
    &LAYERS
}

fn build_catalog() -> LayerCatalog {
    let street_widths = WidthTable::from_iter([
        ("motorway", 4.0),
        ("trunk", 4.0),
        ("primary", 3.5),
        ("secondary", 3.0),
        ("tertiary", 2.0),
        ("residential", 2.0),
        ("unclassified", 1.0),
        ("service", 0.8),
        ("pedestrian", 0.5),
        ("path", 0.5),
        ("footway", 0.4),
        ("cycleway", 0.4),
    ]);

    let layers = [
        (PERIMETER, LayerDefinition::empty()),
        (STREETS, LayerDefinition::with_widths(street_widths)),
        (
            BUILDINGS,
            LayerDefinition::tagged(Selector::new().with("building", TagValue::Any)),
        ),
        (
            LANDUSES,
            LayerDefinition::tagged(Selector::new().with("landuse", TagValue::Any)),
        ),
        (
            NATURALS,
            LayerDefinition::tagged(
                Selector::new()
                    .with("natural", TagValue::Any)
                    .with("leisure", TagValue::exact("nature_reserve")),
            ),
        ),
        (
            BOUNDARYS,
            LayerDefinition::tagged(Selector::new().with("boundary", TagValue::Any)),
        ),
        (
            RAILWAYS,
            LayerDefinition::tagged(Selector::new().with("railway", TagValue::Any)),
        ),
        (
            WATERS,
            LayerDefinition::tagged(Selector::new().with(
                "natural",
                TagValue::one_of(&[
                    "water", "sea", "river", "canal", "pond", "spring", "stream", "lake",
                ]),
            )),
        ),
        (
            GREEN_SPACES,
            LayerDefinition::tagged(
                Selector::new()
                    .with("leisure", TagValue::Any)
                    .with("landuse", TagValue::exact("grass"))
                    .with("natural", TagValue::Any),
            ),
        ),
    ];

    LayerCatalog {
        layers: layers
            .into_iter()
            .map(|(name, definition)| (name.to_string(), definition))
            .collect(),
    }
}
