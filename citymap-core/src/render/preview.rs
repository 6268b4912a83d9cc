use super::{Figure, MapRenderer, RenderError, hatch::hatch_pattern};
use crate::{
    constants::{BACKGROUND_LAYER, PREVIEW_FIGURE_INCHES},
    layers::{LayerCatalog, PERIMETER, STREETS},
    request::MapRequest,
    style::{StyleEntry, StyleSheet},
};

use svg::{
    Document,
    node::element::{Circle, ClipPath, Definitions, Group, Rectangle},
};
use tracing::{Level, event, span};

const CANVAS_SIZE: f32 = 1000.0;
const CANVAS_MARGIN: f32 = 50.0;
const POINTS_PER_INCH: f32 = 72.0;
// Line width the renderer falls back to when a layer sets none, in points.
const DEFAULT_LINE_POINTS: f64 = 1.0;
// Bands reach into their neighbours by this fraction of their height.
const BAND_OVERLAP: f32 = 0.25;
const MIN_STREET_HEIGHT: f32 = 0.5;
const BOUNDARY_CLIP_ID: &str = "boundary";

macro_rules! styled {
    ($element:expr, $entry:expr) => {
        $element
            .set("fill", $entry.paint().unwrap_or("none"))
            .set("stroke", $entry.edge_color.as_str())
            .set("stroke-width", stroke_width($entry))
    };
}

fn stroke_width(entry: &StyleEntry) -> f32 {
    let units_per_point = CANVAS_SIZE / (PREVIEW_FIGURE_INCHES as f32 * POINTS_PER_INCH);
    entry.line_width.unwrap_or(DEFAULT_LINE_POINTS) as f32 * units_per_point
}

/// Draws a style preview instead of real geodata: the map boundary, and one
/// band per styled layer stacked in z-order and clipped to the boundary.
///
/// Streets are drawn as one strip per road class, as thick as the class
/// width in metres at the requested scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewRenderer;

#[derive(Debug, Clone, Copy)]
struct Geometry {
    center: f32,
    // Dilated boundary, in canvas units
    outer: f32,
    inner: f32,
    metres_per_unit: f32,
    circle: bool,
}

impl Geometry {
    fn for_request(request: &MapRequest) -> Self {
        let radius = request.radius().get() as f32;
        let extent = radius + request.dilate().get() as f32;
        let outer = CANVAS_SIZE / 2.0 - CANVAS_MARGIN;

        Geometry {
            center: CANVAS_SIZE / 2.0,
            outer,
            inner: outer * radius / extent,
            metres_per_unit: extent / outer,
            circle: request.circle(),
        }
    }

    fn clip_path(&self) -> ClipPath {
        let clip = ClipPath::new().set("id", BOUNDARY_CLIP_ID);

        if self.circle {
            clip.add(
                Circle::new()
                    .set("cx", self.center)
                    .set("cy", self.center)
                    .set("r", self.outer),
            )
        } else {
            clip.add(
                Rectangle::new()
                    .set("x", self.center - self.outer)
                    .set("y", self.center - self.outer)
                    .set("width", self.outer * 2.0)
                    .set("height", self.outer * 2.0),
            )
        }
    }

    fn perimeter(&self, entry: &StyleEntry) -> Group {
        let group = Group::new().set("id", layer_id(PERIMETER));

        if self.circle {
            group.add(styled!(
                Circle::new()
                    .set("cx", self.center)
                    .set("cy", self.center)
                    .set("r", self.inner),
                entry
            ))
        } else {
            group.add(styled!(
                Rectangle::new()
                    .set("x", self.center - self.inner)
                    .set("y", self.center - self.inner)
                    .set("width", self.inner * 2.0)
                    .set("height", self.inner * 2.0),
                entry
            ))
        }
    }
}

fn layer_id(name: &str) -> String {
    format!("layer-{name}")
}

fn hatch_id(name: &str) -> String {
    format!("hatch-{name}")
}

impl PreviewRenderer {
    fn band(
        geometry: &Geometry,
        slot: usize,
        slots: usize,
        name: &str,
        entry: &StyleEntry,
        layers: &LayerCatalog,
        hatched: bool,
    ) -> Group {
        let band_height = geometry.outer * 2.0 / slots as f32;
        let top = geometry.center - geometry.outer + band_height * slot as f32;
        let left = geometry.center - geometry.outer;
        let width = geometry.outer * 2.0;

        let mut group = Group::new().set("id", layer_id(name));

        let widths = match name {
            STREETS => layers.get(name).and_then(|layer| layer.width_table()),
            _ => None,
        };

        let strips = match widths {
            Some(widths) if !widths.is_empty() => {
                let pitch = band_height / widths.len() as f32;
                widths
                    .iter()
                    .enumerate()
                    .map(|(idx, (_, road_width))| {
                        let height =
                            (road_width as f32 / geometry.metres_per_unit).max(MIN_STREET_HEIGHT);
                        let y = top + pitch * idx as f32 + (pitch - height) / 2.0;
                        (y, height)
                    })
                    .collect::<Vec<_>>()
            }
            _ => {
                let overlap = band_height * BAND_OVERLAP;
                vec![(top - overlap, band_height + overlap * 2.0)]
            }
        };

        for (y, height) in strips.iter().copied() {
            group = group.add(styled!(
                Rectangle::new()
                    .set("x", left)
                    .set("y", y)
                    .set("width", width)
                    .set("height", height),
                entry
            ));

            if hatched {
                group = group.add(
                    Rectangle::new()
                        .set("x", left)
                        .set("y", y)
                        .set("width", width)
                        .set("height", height)
                        .set("fill", format!("url(#{})", hatch_id(name)))
                        .set("stroke", "none"),
                );
            }
        }

        group
    }
}

impl MapRenderer for PreviewRenderer {
    fn plot(
        &self,
        request: &MapRequest,
        layers: &LayerCatalog,
        style: &StyleSheet,
    ) -> Result<Figure, RenderError> {
        let span = span!(
            Level::DEBUG,
            "plot_preview",
            location = %request.location(),
            preset = ?request.preset()
        );
        let _guard = span.enter();

        let background = style
            .background()
            .ok_or_else(|| RenderError::MissingStyle(BACKGROUND_LAYER.to_string()))?;

        let geometry = Geometry::for_request(request);

        let slots = style
            .iter()
            .map(|(name, _)| name)
            .filter(|name| *name != BACKGROUND_LAYER && *name != PERIMETER)
            .collect::<Vec<_>>();

        let mut defs = Definitions::new().add(geometry.clip_path());
        let mut map_group =
            Group::new().set("clip-path", format!("url(#{BOUNDARY_CLIP_ID})"));

        for (name, entry) in style.layers_by_zorder() {
            if name == PERIMETER {
                map_group = map_group.add(geometry.perimeter(entry));
                continue;
            }

            if !layers.contains(name) {
                event!(Level::DEBUG, "Layer {} is not in the catalog", name);
            }

            let mut hatched = false;
            if let Some(hatch) = entry.hatch.as_deref() {
                match hatch_pattern(&hatch_id(name), hatch, &entry.edge_color) {
                    Some(pattern) => {
                        defs = defs.add(pattern);
                        hatched = true;
                    }
                    None => event!(Level::WARN, "Unsupported hatch {:?} on {}", hatch, name),
                }
            }

            let Some(slot) = slots.iter().position(|slot| *slot == name) else {
                continue;
            };

            map_group = map_group.add(Self::band(
                &geometry,
                slot,
                slots.len(),
                name,
                entry,
                layers,
                hatched,
            ));
        }

        let document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("viewBox", format!("0 0 {CANVAS_SIZE} {CANVAS_SIZE}"))
            .set("width", CANVAS_SIZE)
            .set("height", CANVAS_SIZE)
            .add(defs)
            .add(styled!(
                Rectangle::new()
                    .set("id", BACKGROUND_LAYER)
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", CANVAS_SIZE)
                    .set("height", CANVAS_SIZE),
                background
            ))
            .add(map_group);

        event!(
            Level::DEBUG,
            "Plotted {} layers around {}",
            slots.len(),
            request.location()
        );

        Ok(Figure::new(
            document,
            PREVIEW_FIGURE_INCHES,
            PREVIEW_FIGURE_INCHES,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        layers::get_layers,
        palette::ColorScheme,
        style::{StyleOverrides, resolve_styles},
    };

    fn greyscale_sheet() -> StyleSheet {
        resolve_styles(
            ColorScheme::Greyscale,
            get_layers(),
            &StyleOverrides::default(),
        )
        .unwrap()
    }

    fn position(markup: &str, layer: &str) -> usize {
        markup
            .find(&format!(r#"id="{}""#, layer_id(layer)))
            .unwrap_or_else(|| panic!("layer {layer} was not drawn"))
    }

    #[test]
    fn test_preview_draws_layers_in_zorder() {
        let figure = PreviewRenderer
            .plot(&MapRequest::default(), get_layers(), &greyscale_sheet())
            .unwrap();
        let markup = figure.document().to_string();

        let railways = position(&markup, "railways");
        let green = position(&markup, "green_spaces");
        let waters = position(&markup, "waters");
        let buildings = position(&markup, "buildings");
        let streets = position(&markup, "streets");

        assert!(railways < green);
        assert!(green < waters);
        assert!(waters < buildings);
        assert!(buildings < streets);

        assert!(markup.contains(r#"id="hatch-waters""#));
        assert!(markup.contains(r#"id="hatch-green_spaces""#));
        assert!(markup.contains("url(#boundary)"));
    }

    #[test]
    fn test_preview_figure_size() {
        let figure = PreviewRenderer
            .plot(&MapRequest::default(), get_layers(), &greyscale_sheet())
            .unwrap();

        assert_eq!(figure.size_inches(), (15.0, 15.0));
    }

    #[test]
    fn test_square_boundary() {
        let request =
            MapRequest::try_from_raw("Bristol, UK", 500, false, 0, ColorScheme::Greyscale)
                .unwrap();

        let geometry = Geometry::for_request(&request);
        assert_eq!(geometry.inner, geometry.outer);
        assert!(!geometry.clip_path().to_string().contains("<circle"));

        let figure = PreviewRenderer
            .plot(&request, get_layers(), &greyscale_sheet())
            .unwrap();
        assert!(figure.document().to_string().contains(r#"id="layer-perimeter""#));
    }

    #[test]
    fn test_dilate_shrinks_the_perimeter() {
        let request =
            MapRequest::try_from_raw("Bristol, UK", 1000, true, 250, ColorScheme::Greyscale)
                .unwrap();

        let geometry = Geometry::for_request(&request);

        assert_eq!(geometry.outer, 450.0);
        assert_eq!(geometry.inner, 360.0);
        assert_eq!(geometry.metres_per_unit, 1250.0 / 450.0);
    }

    #[test]
    fn test_missing_background_is_an_error() {
        let sheet = greyscale_sheet()
            .iter()
            .filter(|(name, _)| *name != BACKGROUND_LAYER)
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect::<StyleSheet>();

        let result = PreviewRenderer.plot(&MapRequest::default(), get_layers(), &sheet);

        assert!(matches!(result, Err(RenderError::MissingStyle(ref key)) if key == "background"));
    }
}
