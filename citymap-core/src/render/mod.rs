mod hatch;
mod preview;

use crate::{layers::LayerCatalog, request::MapRequest, style::StyleSheet};

use svg::Document;
use thiserror::Error;

pub use preview::PreviewRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(r#"style sheet has no entry for "{0}""#)]
    MissingStyle(String),
    /// Failures raised by an external rendering backend, passed through as-is.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A rendered map with the physical size it is meant to be printed at.
#[derive(Debug, Clone)]
pub struct Figure {
    document: Document,
    width_inches: f64,
    height_inches: f64,
}

impl Figure {
    pub fn new(document: Document, width_inches: f64, height_inches: f64) -> Self {
        Self {
            document,
            width_inches,
            height_inches,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn size_inches(&self) -> (f64, f64) {
        (self.width_inches, self.height_inches)
    }

    pub fn set_size_inches(&mut self, width_inches: f64, height_inches: f64) {
        self.width_inches = width_inches;
        self.height_inches = height_inches;
    }
}

/// The plotting backend: turns the layer catalog and a style sheet into a
/// figure for the requested area.
pub trait MapRenderer {
    /// # Errors
    ///
    /// Implementations surface their own failures (geocoding, data fetch)
    /// through [RenderError::Backend] without translating them.
    fn plot(
        &self,
        request: &MapRequest,
        layers: &LayerCatalog,
        style: &StyleSheet,
    ) -> Result<Figure, RenderError>;
}

impl<R: MapRenderer + ?Sized> MapRenderer for &R {
    fn plot(
        &self,
        request: &MapRequest,
        layers: &LayerCatalog,
        style: &StyleSheet,
    ) -> Result<Figure, RenderError> {
        (**self).plot(request, layers, style)
    }
}
