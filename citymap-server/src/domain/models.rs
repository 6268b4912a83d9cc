use citymap_core::{
    ColorScheme, Dilate, EdgeColors, ExportError, ExportOptions, FileType, FormValues,
    LineWidths, Location, MapError, Radius, RenderError, RequestError, SessionState, StyleError,
};

use derive_more::{Display, From};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Identifies one user's session across requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, From)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A "Generate Map" submission. Fields left unset keep the value the session
/// last committed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerateMapRequest {
    session_id: Option<SessionId>,
    location: Option<Location>,
    radius: Option<Radius>,
    circle: Option<bool>,
    dilate: Option<Dilate>,
    color_scheme: Option<ColorScheme>,
    preset: Option<String>,
    edge_colors: EdgeColors,
    line_widths: LineWidths,
}

impl GenerateMapRequest {
    pub fn new(session_id: Option<SessionId>) -> Self {
        Self {
            session_id,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_radius(mut self, radius: Radius) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_circle(mut self, circle: bool) -> Self {
        self.circle = Some(circle);
        self
    }

    pub fn with_dilate(mut self, dilate: Dilate) -> Self {
        self.dilate = Some(dilate);
        self
    }

    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = Some(color_scheme);
        self
    }

    /// An empty preset clears the committed one.
    pub fn with_preset(mut self, preset: String) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn with_edge_colors(mut self, edge_colors: EdgeColors) -> Self {
        self.edge_colors = edge_colors;
        self
    }

    pub fn with_line_widths(mut self, line_widths: LineWidths) -> Self {
        self.line_widths = line_widths;
        self
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Layers the submission over the session's committed values.
    pub fn apply_to(&self, committed: &FormValues) -> FormValues {
        let mut form = committed.clone();

        if let Some(ref location) = self.location {
            form.location = location.as_str().to_string();
        }
        if let Some(radius) = self.radius {
            form.radius = radius.get();
        }
        if let Some(circle) = self.circle {
            form.circle = circle;
        }
        if let Some(dilate) = self.dilate {
            form.dilate = dilate.get();
        }
        if let Some(color_scheme) = self.color_scheme {
            form.color_scheme = color_scheme;
        }
        if let Some(ref preset) = self.preset {
            form.preset = Some(preset.clone()).filter(|preset| !preset.is_empty());
        }
        for (layer, color) in &self.edge_colors {
            form.overrides.edge_colors.insert(layer.clone(), color.clone());
        }
        for (layer, width) in &self.line_widths {
            form.overrides.line_widths.insert(layer.clone(), *width);
        }

        form
    }
}

/// The outcome of a successful "Generate Map".
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedMap {
    session_id: SessionId,
    form: FormValues,
}

impl GeneratedMap {
    pub fn new(session_id: SessionId, form: FormValues) -> Self {
        Self { session_id, form }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }
}

/// A session as the repository holds it. `version` increases on every store.
#[derive(Clone, Debug)]
pub struct StoredSession {
    state: SessionState,
    version: u64,
}

impl StoredSession {
    pub fn new(state: SessionState, version: u64) -> Self {
        Self { state, version }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreSessionError {
    #[error("session {0} was changed by another request")]
    Stale(SessionId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DownloadMapRequest {
    session_id: SessionId,
    options: ExportOptions,
}

impl DownloadMapRequest {
    pub fn new(session_id: SessionId, options: ExportOptions) -> Self {
        Self {
            session_id,
            options,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }
}

/// An encoded map, ready to be sent as a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDownload {
    file_type: FileType,
    data: Vec<u8>,
}

impl MapDownload {
    pub fn new(file_type: FileType, data: Vec<u8>) -> Self {
        Self { file_type, data }
    }

    pub fn file_name(&self) -> &'static str {
        self.file_type.file_name()
    }

    pub fn mime_type(&self) -> &'static str {
        self.file_type.mime_type()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Debug, Error)]
pub enum GenerateMapError {
    #[error("session {0} does not exist")]
    UnknownSession(SessionId),
    #[error("session {0} was changed by another request, submit again")]
    Conflict(SessionId),
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<StoreSessionError> for GenerateMapError {
    fn from(err: StoreSessionError) -> Self {
        match err {
            StoreSessionError::Stale(id) => GenerateMapError::Conflict(id),
        }
    }
}

impl From<MapError> for GenerateMapError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::Request(err) => GenerateMapError::InvalidRequest(err),
            MapError::Style(err) => GenerateMapError::Style(err),
            MapError::Render(err) => GenerateMapError::Render(err),
            other => GenerateMapError::Unknown(other.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadMapError {
    #[error("session {0} does not exist")]
    UnknownSession(SessionId),
    #[error("session {0} has not generated a map yet")]
    NoMap(SessionId),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
