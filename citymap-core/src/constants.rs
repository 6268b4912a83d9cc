pub(crate) const BACKGROUND_LAYER: &str = "background";
pub(crate) const BACKGROUND_EDGE_COLOR: &str = "#F2F4CB";

pub const DEFAULT_LINE_WIDTH: f64 = 0.3;

pub const DEFAULT_LOCATION: &str = "Bristol, UK";
pub const DEFAULT_RADIUS: u32 = 1000;
pub const DEFAULT_DILATE: u32 = 200;
pub const DEFAULT_CIRCLE: bool = true;

pub const MIN_RADIUS: u32 = 100;
pub const MAX_RADIUS: u32 = 5000;
pub const MAX_DILATE: u32 = 500;

pub const DEFAULT_DPI: u32 = 300;
// An A3 page at this resolution is a ~1.4 GB raster.
pub const MAX_DPI: u32 = 1200;
// Resolution of the on-screen preview of the unscaled figure.
pub const PREVIEW_DPI: u32 = 100;

// A3 landscape
pub const PAGE_WIDTH_MM: f64 = 420.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub(crate) const MM_PER_INCH: f64 = 25.4;

pub(crate) const PREVIEW_FIGURE_INCHES: f64 = 15.0;

pub const SVG_FILE_NAME: &str = "map_output.svg";
pub const PNG_FILE_NAME: &str = "map_output.png";
