//! Maps query errors to `meteo_core::AppError`, and `AppError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meteo_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use meteo_weather::{FetchCause, FetchError, QueryError};
use serde_json::json;

pub fn query_error_to_app(err: QueryError) -> AppError {
    match err {
        QueryError::NotYetAvailable(e) => {
            AppError::Weather(WeatherError::NotYetAvailable(e.to_string()))
        }
        QueryError::Fetch(e) => fetch_error_to_app(&e),
    }
}

fn fetch_error_to_app(err: &FetchError) -> AppError {
    match err.cause() {
        FetchCause::Transport(e) => AppError::Network(e.into_network_error()),
        FetchCause::UpstreamStatus { status, body } => AppError::Network(NetworkError::ServerError {
            status: *status,
            message: body.clone(),
        }),
        FetchCause::Decode(_) | FetchCause::Inconsistent(_) => {
            AppError::Network(NetworkError::InvalidResponse(err.to_string()))
        }
        FetchCause::Aborted => AppError::Weather(WeatherError::RefreshFailed(err.to_string())),
    }
}

/// An `AppError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Weather(WeatherError::NotYetAvailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Weather(WeatherError::RefreshFailed(_)) | AppError::Network(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError(query_error_to_app(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self.0, "Weather request failed");
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}
