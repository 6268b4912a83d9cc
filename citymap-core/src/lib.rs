mod constants;
mod export;
mod layers;
mod palette;
mod render;
mod request;
mod session;
mod style;

use thiserror::Error;
use tracing::{Level, event, span};

pub use constants::{
    DEFAULT_CIRCLE, DEFAULT_DILATE, DEFAULT_DPI, DEFAULT_LINE_WIDTH, DEFAULT_LOCATION,
    DEFAULT_RADIUS, MAX_DILATE, MAX_DPI, MAX_RADIUS, MIN_RADIUS, PREVIEW_DPI,
};
pub use export::{ExportError, ExportOptions, FileType, PageSize, save_plot, save_preview};
pub use layers::{LayerCatalog, LayerDefinition, Selector, TagValue, WidthTable, get_layers};
pub use palette::{ColorScheme, Palette, get_default_colors};
pub use render::{Figure, MapRenderer, PreviewRenderer, RenderError};
pub use request::{Dilate, Location, MapRequest, Radius, RequestError};
pub use session::{FormValues, SessionState};
pub use style::{
    EdgeColors, Fill, LineWidths, StyleEntry, StyleError, StyleOverrides, StyleSheet,
    default_edge_colors, default_line_widths, get_styles, resolve_styles,
};

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no map has been generated yet")]
    NoFigure,
}

/// Resolves the style sheet for `request` and hands it to `renderer` along
/// with the layer catalog.
pub fn create_map<R: MapRenderer>(
    renderer: &R,
    request: &MapRequest,
    overrides: &StyleOverrides,
) -> Result<Figure, MapError> {
    let span = span!(Level::DEBUG, "create_map");
    let _guard = span.enter();

    let layers = get_layers();
    let style = resolve_styles(request.color_scheme(), layers, overrides)?;

    event!(
        Level::INFO,
        "Rendering {} (radius {}, dilate {}, circle {}) in {}",
        request.location(),
        request.radius().get(),
        request.dilate().get(),
        request.circle(),
        request.color_scheme()
    );

    Ok(renderer.plot(request, layers, &style)?)
}
