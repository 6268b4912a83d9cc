use super::AppState;
use super::api::{ApiError, ApiSuccess};
use crate::domain::models::{DownloadMapRequest, GenerateMapRequest, GeneratedMap, SessionId};
use crate::domain::ports::MapService;

use citymap_core::{
    ColorScheme, DEFAULT_DPI, Dilate, EdgeColors, ExportError, ExportOptions, FileType,
    FormValues, LayerCatalog, LineWidths, Location, Radius, RequestError, StyleOverrides,
    StyleSheet, get_layers, resolve_styles,
};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The response body data field for a successful map generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateMapResponseData {
    session_id: String,
    form: FormValues,
}

impl From<&GeneratedMap> for GenerateMapResponseData {
    fn from(map: &GeneratedMap) -> Self {
        Self {
            session_id: map.session_id().to_string(),
            form: map.form().clone(),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("file type {0:?} is not known, expected \"svg\" or \"png\"")]
pub struct FileTypeNotKnownError(String);

#[derive(Debug, Error)]
pub(super) enum ParseMapHttpRequestError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    FileType(#[from] FileTypeNotKnownError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// The body of a map generation request. Omitted fields keep the session's
/// committed values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateMapHttpRequestBody {
    session_id: Option<Uuid>,
    location: Option<String>,
    radius: Option<u32>,
    circle: Option<bool>,
    dilate: Option<u32>,
    color_scheme: Option<String>,
    preset: Option<String>,
    #[serde(default)]
    edge_colors: EdgeColors,
    #[serde(default)]
    line_widths: LineWidths,
}

impl GenerateMapHttpRequestBody {
    /// Converts the HTTP request body into a domain request.
    fn try_into_domain(self) -> Result<GenerateMapRequest, ParseMapHttpRequestError> {
        let mut req = GenerateMapRequest::new(self.session_id.map(SessionId::from))
            .with_edge_colors(self.edge_colors)
            .with_line_widths(self.line_widths);

        if let Some(ref location) = self.location {
            req = req.with_location(Location::new(location)?);
        }
        if let Some(radius) = self.radius {
            req = req.with_radius(Radius::new(radius)?);
        }
        if let Some(circle) = self.circle {
            req = req.with_circle(circle);
        }
        if let Some(dilate) = self.dilate {
            req = req.with_dilate(Dilate::new(dilate)?);
        }
        if let Some(ref scheme) = self.color_scheme {
            req = req.with_color_scheme(ColorScheme::from_name(scheme));
        }
        if let Some(preset) = self.preset {
            req = req.with_preset(preset);
        }

        Ok(req)
    }
}

/// Query parameters of a download request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadMapQuery {
    format: Option<String>,
    dpi: Option<u32>,
}

impl DownloadMapQuery {
    fn try_into_options(self) -> Result<ExportOptions, ParseMapHttpRequestError> {
        let file_type = match self.format.as_deref() {
            None => FileType::default(),
            Some("png") => FileType::Png,
            Some("svg") => FileType::Svg,
            Some(other) => return Err(FileTypeNotKnownError(other.to_string()).into()),
        };

        let options = ExportOptions::new(file_type).with_dpi(self.dpi.unwrap_or(DEFAULT_DPI));
        options.validate()?;

        Ok(options)
    }
}

/// Commit form values to a session and generate its map.
///
/// # Responses
///
/// - 201 Created: the map was generated and stored in the returned session.
/// - 404 Not Found: the named session does not exist.
/// - 409 Conflict: another request changed the session meanwhile.
/// - 422 Unprocessable entity: the request had invalid parameters.
pub(super) async fn generate_map_handler<MS: MapService>(
    State(state): State<AppState<MS>>,
    Json(body): Json<GenerateMapHttpRequestBody>,
) -> Result<ApiSuccess<GenerateMapResponseData>, ApiError> {
    let domain_req = body.try_into_domain()?;
    state
        .map_service
        .generate_map(&domain_req)
        .await
        .map_err(ApiError::from)
        .map(|ref map| ApiSuccess::new(StatusCode::CREATED, map.into()))
}

/// Download the last map a session generated, as an attachment.
///
/// # Responses
///
/// - 200 OK: the encoded map.
/// - 404 Not Found: the session does not exist or has not generated a map.
/// - 422 Unprocessable entity: the format is not known or the DPI is out of range.
pub(super) async fn download_map_handler<MS: MapService>(
    State(state): State<AppState<MS>>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<DownloadMapQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = query.try_into_options()?;
    let download = state
        .map_service
        .download_map(&DownloadMapRequest::new(session_id.into(), options))
        .await?;

    let headers = [
        (header::CONTENT_TYPE, download.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.file_name()),
        ),
    ];

    Ok((StatusCode::OK, headers, download.into_data()))
}

/// Show the last map a session generated, at the size it was drawn.
///
/// # Responses
///
/// - 200 OK: the map as an inline PNG.
/// - 404 Not Found: the session does not exist or has not generated a map.
pub(super) async fn preview_map_handler<MS: MapService>(
    State(state): State<AppState<MS>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let preview = state.map_service.preview_map(session_id.into()).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, preview.mime_type())],
        preview.into_data(),
    ))
}

/// The resolved style sheet for a color scheme, without user overrides.
pub(super) async fn styles_handler(
    Path(scheme): Path<String>,
) -> Result<ApiSuccess<StyleSheet>, ApiError> {
    let scheme = ColorScheme::from_name(&scheme);

    resolve_styles(scheme, get_layers(), &StyleOverrides::default())
        .map_err(|err| ApiError::InternalServerError(err.to_string()))
        .map(|style| ApiSuccess::new(StatusCode::OK, style))
}

/// The layer catalog.
pub(super) async fn layers_handler() -> ApiSuccess<LayerCatalog> {
    ApiSuccess::new(StatusCode::OK, get_layers().clone())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::domain::service::Service;
    use crate::inbound::router;
    use crate::outbound::repositories::InMemorySessionRepository;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request,
        response::Response,
    };
    use citymap_core::PreviewRenderer;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Service::new(
            InMemorySessionRepository::default(),
            PreviewRenderer,
        ))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn generate(app: &Router, body: Value) -> String {
        let response = app.clone().oneshot(post_json("/maps", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        body["data"]["session_id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_body_into_domain() {
        let body: GenerateMapHttpRequestBody = serde_json::from_value(json!({
            "location": "  Oxford, UK ",
            "radius": 1500,
            "color_scheme": "Greyscale",
            "line_widths": { "buildings": 0.5 },
        }))
        .unwrap();

        let form = body.try_into_domain().unwrap().apply_to(&FormValues::default());

        assert_eq!(form.location, "Oxford, UK");
        assert_eq!(form.radius, 1500);
        assert_eq!(form.dilate, 200);
        assert_eq!(form.color_scheme, ColorScheme::Greyscale);
        assert_eq!(form.overrides.line_widths.get("buildings"), Some(&0.5));
    }

    #[test]
    fn test_body_rejects_invalid_values() {
        let body = GenerateMapHttpRequestBody {
            dilate: Some(550),
            ..GenerateMapHttpRequestBody::default()
        };

        assert!(matches!(
            body.try_into_domain(),
            Err(ParseMapHttpRequestError::Request(
                RequestError::DilateOutOfRange(550)
            ))
        ));
    }

    #[test]
    fn test_query_into_options() {
        let options = DownloadMapQuery::default().try_into_options().unwrap();
        assert_eq!(options, ExportOptions::default());

        let options = DownloadMapQuery {
            format: Some("svg".to_string()),
            dpi: Some(72),
        }
        .try_into_options()
        .unwrap();
        assert_eq!(options.file_type, FileType::Svg);
        assert_eq!(options.dpi, 72);

        let result = DownloadMapQuery {
            format: Some("gif".to_string()),
            dpi: None,
        }
        .try_into_options();
        assert!(matches!(
            result,
            Err(ParseMapHttpRequestError::FileType(_))
        ));

        for dpi in [0, 20_000] {
            let result = DownloadMapQuery {
                format: None,
                dpi: Some(dpi),
            }
            .try_into_options();
            assert!(matches!(
                result,
                Err(ParseMapHttpRequestError::Export(ExportError::DpiOutOfRange(rejected)))
                    if rejected == dpi
            ));
        }
    }

    #[tokio::test]
    async fn test_generate_then_download_svg() {
        let app = app();
        let session_id = generate(&app, json!({ "radius": 500, "circle": false })).await;

        let response = app
            .clone()
            .oneshot(get(&format!("/maps/{session_id}/download?format=svg")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/svg+xml"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"map_output.svg\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec()).unwrap().contains("420mm"));
    }

    #[tokio::test]
    async fn test_generate_keeps_session_values() {
        let app = app();
        let session_id = generate(&app, json!({ "location": "Bath, UK" })).await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/maps",
                json!({ "session_id": session_id, "dilate": 0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["data"]["session_id"], session_id.as_str());
        assert_eq!(body["data"]["form"]["location"], "Bath, UK");
        assert_eq!(body["data"]["form"]["dilate"], 0);
    }

    #[tokio::test]
    async fn test_generate_invalid_radius() {
        let response = app()
            .oneshot(post_json("/maps", json!({ "radius": 50 })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["status_code"], 422);
        assert!(body["data"]["message"].as_str().unwrap().contains("50"));
    }

    #[tokio::test]
    async fn test_generate_with_colour_scheme_fails() {
        let response = app()
            .oneshot(post_json("/maps", json!({ "color_scheme": "Colour" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert!(
            body["data"]["message"]
                .as_str()
                .unwrap()
                .contains("missing palette entry")
        );
    }

    #[tokio::test]
    async fn test_download_unknown_session() {
        let response = app()
            .oneshot(get(&format!("/maps/{}/download", Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_unknown_format() {
        let app = app();
        let session_id = generate(&app, json!({})).await;

        let response = app
            .oneshot(get(&format!("/maps/{session_id}/download?format=gif")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_download_rejects_huge_dpi() {
        let app = app();
        let session_id = generate(&app, json!({})).await;

        let response = app
            .oneshot(get(&format!("/maps/{session_id}/download?format=png&dpi=20000")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert!(body["data"]["message"].as_str().unwrap().contains("20000"));
    }

    #[tokio::test]
    async fn test_preview() {
        let app = app();

        let response = app
            .clone()
            .oneshot(get(&format!("/maps/{}/preview", Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let session_id = generate(&app, json!({ "preset": "minimal" })).await;
        let response = app
            .oneshot(get(&format!("/maps/{session_id}/preview")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    }

    #[tokio::test]
    async fn test_greyscale_styles() {
        let response = app().oneshot(get("/styles/Greyscale")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["data"]["buildings"]["lw"], 0.3);
        assert!(body["data"]["buildings"]["fill"].is_null());
        assert!(body["data"]["background"].is_object());
    }

    #[tokio::test]
    async fn test_layers() {
        let response = app().oneshot(get("/layers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let names: Vec<&str> = body["data"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert!(names.contains(&"perimeter"));
        assert!(names.contains(&"green_spaces"));
    }
}
