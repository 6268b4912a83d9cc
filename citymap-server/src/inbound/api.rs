use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{Level, event};

use super::handlers::ParseMapHttpRequestError;
use crate::domain::models::{DownloadMapError, GenerateMapError};

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1.0 == other.1.0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Generic response structure shared by all API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err.to_string())
    }
}

impl From<ParseMapHttpRequestError> for ApiError {
    fn from(err: ParseMapHttpRequestError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl From<GenerateMapError> for ApiError {
    fn from(err: GenerateMapError) -> Self {
        match err {
            GenerateMapError::UnknownSession(_) => Self::NotFound(err.to_string()),
            GenerateMapError::Conflict(_) => Self::Conflict(err.to_string()),
            GenerateMapError::InvalidRequest(err) => Self::UnprocessableEntity(err.to_string()),
            GenerateMapError::Style(err) => Self::InternalServerError(err.to_string()),
            GenerateMapError::Render(err) => Self::InternalServerError(err.to_string()),
            GenerateMapError::Unknown(cause) => {
                event!(Level::ERROR, "{:?}", cause);
                Self::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<DownloadMapError> for ApiError {
    fn from(err: DownloadMapError) -> Self {
        match err {
            DownloadMapError::UnknownSession(_) | DownloadMapError::NoMap(_) => {
                Self::NotFound(err.to_string())
            }
            DownloadMapError::Export(err) => Self::InternalServerError(err.to_string()),
            DownloadMapError::Unknown(cause) => {
                event!(Level::ERROR, "{:?}", cause);
                Self::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        let (status, message) = match self {
            InternalServerError(message) => {
                event!(Level::ERROR, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            UnprocessableEntity(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            NotFound(message) => (StatusCode::NOT_FOUND, message),
            Conflict(message) => (StatusCode::CONFLICT, message),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}
