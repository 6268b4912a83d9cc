use crate::{
    MapError, create_map,
    constants::{DEFAULT_CIRCLE, DEFAULT_DILATE, DEFAULT_LOCATION, DEFAULT_RADIUS},
    export::{ExportOptions, save_plot, save_preview},
    palette::ColorScheme,
    render::{Figure, MapRenderer},
    request::{MapRequest, RequestError},
    style::StyleOverrides,
};

use serde::Serialize;
use tracing::{Level, event};

/// Raw form values, as the user last submitted them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValues {
    pub location: String,
    pub radius: u32,
    pub circle: bool,
    pub dilate: u32,
    pub color_scheme: ColorScheme,
    pub overrides: StyleOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl FormValues {
    pub fn to_request(&self) -> Result<MapRequest, RequestError> {
        MapRequest::try_from_raw(
            &self.location,
            self.radius,
            self.circle,
            self.dilate,
            self.color_scheme,
        )
        .map(|request| request.with_preset(self.preset.clone()))
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            radius: DEFAULT_RADIUS,
            circle: DEFAULT_CIRCLE,
            dilate: DEFAULT_DILATE,
            color_scheme: ColorScheme::default(),
            overrides: StyleOverrides::default(),
            preset: None,
        }
    }
}

/// State that survives across interactions within one user session: the
/// committed form values and the last generated map.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    form: FormValues,
    figure: Option<Figure>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Commits `submitted` and renders it.
    ///
    /// Values that fail validation are not committed. Valid values are
    /// committed before rendering, and the previous map is only replaced when
    /// rendering succeeds.
    pub fn generate<R: MapRenderer>(
        &mut self,
        renderer: &R,
        submitted: FormValues,
    ) -> Result<&Figure, MapError> {
        let request = submitted.to_request()?;
        self.form = submitted;

        let figure = create_map(renderer, &request, &self.form.overrides)?;
        event!(Level::DEBUG, "Stored new map for {}", request.location());

        Ok(self.figure.insert(figure))
    }

    /// Encodes the last generated map.
    pub fn download(&self, options: &ExportOptions) -> Result<Vec<u8>, MapError> {
        let figure = self.figure.as_ref().ok_or(MapError::NoFigure)?;

        Ok(save_plot(figure, options)?)
    }

    /// Encodes the last generated map at its own size, for display.
    pub fn preview(&self) -> Result<Vec<u8>, MapError> {
        let figure = self.figure.as_ref().ok_or(MapError::NoFigure)?;

        Ok(save_preview(figure)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        export::FileType,
        layers::LayerCatalog,
        render::{PreviewRenderer, RenderError},
        style::{StyleError, StyleSheet},
    };

    struct FailingRenderer;

    #[derive(Default)]
    struct RecordingRenderer {
        presets: std::cell::RefCell<Vec<Option<String>>>,
    }

    impl MapRenderer for RecordingRenderer {
        fn plot(
            &self,
            request: &MapRequest,
            layers: &LayerCatalog,
            style: &StyleSheet,
        ) -> Result<Figure, RenderError> {
            self.presets
                .borrow_mut()
                .push(request.preset().map(str::to_string));
            PreviewRenderer.plot(request, layers, style)
        }
    }

    impl MapRenderer for FailingRenderer {
        fn plot(
            &self,
            request: &MapRequest,
            _: &LayerCatalog,
            _: &StyleSheet,
        ) -> Result<Figure, RenderError> {
            Err(anyhow::anyhow!("could not geocode {}", request.location()).into())
        }
    }

    #[test]
    fn test_defaults() {
        let session = SessionState::new();

        assert_eq!(session.form().location, "Bristol, UK");
        assert!(session.form().circle);
        assert_eq!(session.form().radius, 1000);
        assert_eq!(session.form().dilate, 200);
        assert_eq!(session.form().color_scheme, ColorScheme::Greyscale);
        assert_eq!(session.form().overrides, StyleOverrides::default());
        assert!(session.figure().is_none());
    }

    #[test]
    fn test_generate_commits_and_stores_figure() {
        let mut session = SessionState::new();
        let submitted = FormValues {
            location: "Cardiff, UK".to_string(),
            radius: 600,
            ..FormValues::default()
        };

        session.generate(&PreviewRenderer, submitted.clone()).unwrap();

        assert_eq!(session.form(), &submitted);
        assert!(session.figure().is_some());

        let svg = session.download(&ExportOptions::new(FileType::Svg)).unwrap();
        assert!(String::from_utf8(svg).unwrap().contains(r#"width="420mm""#));
    }

    #[test]
    fn test_invalid_values_are_not_committed() {
        let mut session = SessionState::new();
        let submitted = FormValues {
            radius: 50,
            ..FormValues::default()
        };

        let result = session.generate(&PreviewRenderer, submitted);

        assert!(matches!(
            result,
            Err(MapError::Request(RequestError::RadiusOutOfRange(50)))
        ));
        assert_eq!(session.form(), &FormValues::default());
    }

    #[test]
    fn test_failed_render_keeps_previous_figure() {
        let mut session = SessionState::new();
        session
            .generate(&PreviewRenderer, FormValues::default())
            .unwrap();

        let submitted = FormValues {
            location: "Nowhere".to_string(),
            ..FormValues::default()
        };
        let result = session.generate(&FailingRenderer, submitted);

        match result {
            Err(MapError::Render(RenderError::Backend(err))) => {
                assert_eq!(err.to_string(), "could not geocode Nowhere");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(session.form().location, "Nowhere");
        assert!(session.figure().is_some());
    }

    #[test]
    fn test_colour_scheme_fails_explicitly() {
        let mut session = SessionState::new();
        let submitted = FormValues {
            color_scheme: ColorScheme::Colour,
            ..FormValues::default()
        };

        let result = session.generate(&PreviewRenderer, submitted);

        assert!(matches!(
            result,
            Err(MapError::Style(StyleError::MissingPaletteEntry { .. }))
        ));
    }

    #[test]
    fn test_download_before_generate() {
        let session = SessionState::new();

        assert!(matches!(
            session.download(&ExportOptions::default()),
            Err(MapError::NoFigure)
        ));
        assert!(matches!(session.preview(), Err(MapError::NoFigure)));
    }

    #[test]
    fn test_preset_reaches_the_renderer() {
        let renderer = RecordingRenderer::default();
        let mut session = SessionState::new();

        session.generate(&renderer, FormValues::default()).unwrap();
        session
            .generate(
                &renderer,
                FormValues {
                    preset: Some("minimal".to_string()),
                    ..FormValues::default()
                },
            )
            .unwrap();

        assert_eq!(
            *renderer.presets.borrow(),
            vec![None, Some("minimal".to_string())]
        );
        assert_eq!(session.form().preset.as_deref(), Some("minimal"));
    }

    #[test]
    fn test_preview_is_png() {
        let mut session = SessionState::new();
        session
            .generate(&PreviewRenderer, FormValues::default())
            .unwrap();

        let png = session.preview().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
