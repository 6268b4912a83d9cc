use crate::{
    constants::{BACKGROUND_EDGE_COLOR, BACKGROUND_LAYER, DEFAULT_LINE_WIDTH},
    layers::{GREEN_SPACES, LayerCatalog, RAILWAYS, STREETS, WATERS},
    palette::{ColorScheme, Palette},
};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{Level, event, span};

/// Layers drawn without an explicit z-order sit at the renderer's default.
pub const DEFAULT_ZORDER: i32 = 1;

pub type EdgeColors = IndexMap<String, String>;
pub type LineWidths = IndexMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error(r#"missing palette entry for layer "{layer}" in the {scheme} palette"#)]
    MissingPaletteEntry { layer: String, scheme: ColorScheme },
}

/// The `fill` attribute of a style entry. [Fill::Disabled] serializes as
/// `null`, which the renderer reads as "no fill".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    Color(String),
    Disabled,
}

impl Serialize for Fill {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fill::Color(color) => serializer.serialize_str(color),
            Fill::Disabled => serializer.serialize_none(),
        }
    }
}

/// Rendering attributes for one layer. Unset fields are left out of the
/// serialized form so the renderer applies its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleEntry {
    #[serde(rename = "ec")]
    pub edge_color: String,
    #[serde(rename = "fc", skip_serializing_if = "Option::is_none")]
    pub face_color: Option<String>,
    #[serde(rename = "lw", skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hatch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zorder: Option<i32>,
}

impl StyleEntry {
    fn new(edge_color: &str, line_width: f64) -> Self {
        StyleEntry {
            edge_color: edge_color.to_string(),
            face_color: None,
            line_width: Some(line_width),
            fill: None,
            hatch: None,
            zorder: None,
        }
    }

    /// An outline-only entry with an explicit "no fill".
    pub fn outline(edge_color: &str, line_width: f64) -> Self {
        StyleEntry {
            fill: Some(Fill::Disabled),
            ..Self::new(edge_color, line_width)
        }
    }

    pub fn background() -> Self {
        Self::outline(BACKGROUND_EDGE_COLOR, 0.0)
    }

    fn face(mut self, color: &str) -> Self {
        self.face_color = Some(color.to_string());
        self
    }

    fn filled(mut self, color: &str) -> Self {
        self.fill = Some(Fill::Color(color.to_string()));
        self
    }

    fn hatched(mut self, pattern: &str) -> Self {
        self.hatch = Some(pattern.to_string());
        self
    }

    fn at_zorder(mut self, zorder: i32) -> Self {
        self.zorder = Some(zorder);
        self
    }

    pub fn effective_zorder(&self) -> i32 {
        self.zorder.unwrap_or(DEFAULT_ZORDER)
    }

    /// The color the area is painted with, if any.
    pub fn paint(&self) -> Option<&str> {
        match (&self.fill, &self.face_color) {
            (Some(Fill::Disabled), _) => None,
            (Some(Fill::Color(color)), _) => Some(color),
            (None, Some(color)) => Some(color),
            (None, None) => None,
        }
    }
}

/// Layer name to style entry, with the reserved `background` key first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StyleSheet {
    entries: IndexMap<String, StyleEntry>,
}

impl StyleSheet {
    pub fn get(&self, layer: &str) -> Option<&StyleEntry> {
        self.entries.get(layer)
    }

    pub fn background(&self) -> Option<&StyleEntry> {
        self.entries.get(BACKGROUND_LAYER)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Layer entries (background excluded) in drawing order. Entries with
    /// the same z-order keep their sheet order.
    pub fn layers_by_zorder(&self) -> Vec<(&str, &StyleEntry)> {
        let mut layers = self
            .iter()
            .filter(|(name, _)| *name != BACKGROUND_LAYER)
            .collect::<Vec<_>>();
        layers.sort_by_key(|(_, entry)| entry.effective_zorder());
        layers
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, StyleEntry)> for StyleSheet {
    fn from_iter<T: IntoIterator<Item = (String, StyleEntry)>>(iter: T) -> Self {
        StyleSheet {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Builds the style sheet for every layer in `edge_colors`.
///
/// Streets, waters, green spaces and railways get fixed treatments; every
/// other layer is drawn as an outline with its `line_widths` entry, or
/// [DEFAULT_LINE_WIDTH] when it has none.
pub fn get_styles(edge_colors: &EdgeColors, line_widths: &LineWidths) -> StyleSheet {
    let mut entries = IndexMap::with_capacity(edge_colors.len() + 1);
    entries.insert(BACKGROUND_LAYER.to_string(), StyleEntry::background());

    for (layer, color) in edge_colors {
        let entry = match layer.as_str() {
            STREETS => StyleEntry::new(color, 0.2)
                .face(color)
                .filled(color)
                .at_zorder(2),
            WATERS => StyleEntry::new(color, 0.2)
                .face(color)
                .hatched("......")
                .at_zorder(-1),
            GREEN_SPACES => StyleEntry::new(color, 0.4)
                .face(color)
                .hatched("/////////")
                .at_zorder(-2),
            RAILWAYS => StyleEntry::outline(color, 0.3).at_zorder(-3),
            _ => StyleEntry::outline(
                color,
                line_widths
                    .get(layer)
                    .copied()
                    .unwrap_or(DEFAULT_LINE_WIDTH),
            ),
        };

        entries.insert(layer.clone(), entry);
    }

    event!(Level::DEBUG, "Resolved styles for {} layers", edge_colors.len());

    StyleSheet { entries }
}

/// Looks up the palette color of every catalog layer.
///
/// # Errors
///
/// - [StyleError::MissingPaletteEntry] for the first layer the palette has no
///   color for.
pub fn default_edge_colors(
    palette: &Palette,
    layers: &LayerCatalog,
) -> Result<EdgeColors, StyleError> {
    layers
        .names()
        .map(|layer| match palette.get(layer) {
            Some(color) => Ok((layer.to_string(), color.to_string())),
            None => Err(StyleError::MissingPaletteEntry {
                layer: layer.to_string(),
                scheme: palette.scheme(),
            }),
        })
        .collect()
}

pub fn default_line_widths(layers: &LayerCatalog) -> LineWidths {
    layers
        .names()
        .map(|layer| (layer.to_string(), DEFAULT_LINE_WIDTH))
        .collect()
}

/// Per-layer values the user chose over the palette defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleOverrides {
    pub edge_colors: EdgeColors,
    pub line_widths: LineWidths,
}

/// Resolves the full style sheet for the catalog under `scheme`.
///
/// An edge color override stands in for a missing palette entry.
pub fn resolve_styles(
    scheme: ColorScheme,
    layers: &LayerCatalog,
    overrides: &StyleOverrides,
) -> Result<StyleSheet, StyleError> {
    let span = span!(Level::DEBUG, "resolve_styles", %scheme);
    let _guard = span.enter();

    let palette = Palette::for_scheme(scheme);

    let edge_colors = layers
        .names()
        .map(|layer| {
            let color = overrides
                .edge_colors
                .get(layer)
                .map(String::as_str)
                .or_else(|| palette.get(layer));

            match color {
                Some(color) => Ok((layer.to_string(), color.to_string())),
                None => {
                    event!(Level::WARN, "No color for layer {} in {}", layer, scheme);
                    Err(StyleError::MissingPaletteEntry {
                        layer: layer.to_string(),
                        scheme,
                    })
                }
            }
        })
        .collect::<Result<EdgeColors, _>>()?;

    let mut line_widths = default_line_widths(layers);
    for (layer, width) in &overrides.line_widths {
        line_widths.insert(layer.clone(), *width);
    }

    Ok(get_styles(&edge_colors, &line_widths))
}
