use crate::{
    constants::{
        DEFAULT_DPI, MAX_DPI, MM_PER_INCH, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PNG_FILE_NAME,
        PREVIEW_DPI, SVG_FILE_NAME,
    },
    render::Figure,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_skia::{Color, Pixmap, Transform};
use tracing::{Level, event, span};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("dpi {0} is outside the 1..={max} range", max = MAX_DPI)]
    DpiOutOfRange(u32),
    #[error("failed to parse the rendered figure: {0}")]
    Parse(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} pixmap")]
    InvalidPixmapSize { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Png,
    Svg,
}

impl FileType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Png => "image/png",
            FileType::Svg => "image/svg+xml",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            FileType::Png => PNG_FILE_NAME,
            FileType::Svg => SVG_FILE_NAME,
        }
    }
}

/// Physical output size, in millimetres.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub const A3_LANDSCAPE: PageSize = PageSize {
        width_mm: PAGE_WIDTH_MM,
        height_mm: PAGE_HEIGHT_MM,
    };

    pub fn to_inches(&self) -> (f64, f64) {
        (self.width_mm / MM_PER_INCH, self.height_mm / MM_PER_INCH)
    }

    /// Pixel dimensions of the page rasterised at `dpi`.
    pub fn to_pixels(&self, dpi: u32) -> (u32, u32) {
        let (width, height) = self.to_inches();
        (
            (width * dpi as f64).round() as u32,
            (height * dpi as f64).round() as u32,
        )
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A3_LANDSCAPE
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub file_type: FileType,
    /// Only used for raster output.
    pub dpi: u32,
    pub size: PageSize,
}

impl ExportOptions {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            ..Self::default()
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Checks the options before any encoding work is done. The DPI bound
    /// applies to SVG output too, so a request is valid regardless of format.
    pub fn validate(&self) -> Result<(), ExportError> {
        check_dpi(self.dpi)
    }
}

fn check_dpi(dpi: u32) -> Result<(), ExportError> {
    if dpi == 0 || dpi > MAX_DPI {
        return Err(ExportError::DpiOutOfRange(dpi));
    }
    Ok(())
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_type: FileType::default(),
            dpi: DEFAULT_DPI,
            size: PageSize::default(),
        }
    }
}

/// Re-scales `figure` to the page size in `options` and encodes it.
///
/// The figure keeps its aspect ratio and is centered on the page. PNG output
/// is painted on a white page.
pub fn save_plot(figure: &Figure, options: &ExportOptions) -> Result<Vec<u8>, ExportError> {
    let span = span!(Level::DEBUG, "save_plot", file_type = ?options.file_type);
    let _guard = span.enter();

    options.validate()?;

    let mut figure = figure.clone();
    let (width_in, height_in) = options.size.to_inches();
    figure.set_size_inches(width_in, height_in);

    let svg_markup = sized_markup(&figure, &options.size);

    match options.file_type {
        FileType::Svg => {
            event!(Level::DEBUG, "Encoded SVG ({} bytes)", svg_markup.len());
            Ok(svg_markup.into_bytes())
        }
        FileType::Png => rasterize(&svg_markup, &figure, options.dpi),
    }
}

/// Encodes `figure` as PNG at its own size, for on-screen display.
pub fn save_preview(figure: &Figure) -> Result<Vec<u8>, ExportError> {
    let span = span!(Level::DEBUG, "save_preview");
    let _guard = span.enter();

    rasterize(&figure.document().to_string(), figure, PREVIEW_DPI)
}

fn sized_markup(figure: &Figure, size: &PageSize) -> String {
    figure
        .document()
        .clone()
        .set("width", format!("{}mm", size.width_mm))
        .set("height", format!("{}mm", size.height_mm))
        .to_string()
}

fn rasterize(svg_markup: &str, figure: &Figure, dpi: u32) -> Result<Vec<u8>, ExportError> {
    check_dpi(dpi)?;

    let (width_in, height_in) = figure.size_inches();
    let width = (width_in * dpi as f64).round() as u32;
    let height = (height_in * dpi as f64).round() as u32;

    let tree = usvg::Tree::from_str(svg_markup, &usvg::Options::default())?;

    let mut pixmap =
        Pixmap::new(width, height).ok_or(ExportError::InvalidPixmapSize { width, height })?;
    pixmap.fill(Color::WHITE);

    // The tree is sized in CSS pixels; stretch it onto the target raster.
    let tree_size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / tree_size.width(),
        height as f32 / tree_size.height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    event!(Level::DEBUG, "Rasterised figure to {}x{} at {} dpi", width, height, dpi);

    pixmap
        .encode_png()
        .map_err(|err| ExportError::Encode(err.to_string()))
}
