use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use meteo_weather::{CurrentView, Fetcher, HourlySeries};
use tower_http::trace::TraceLayer;

use crate::error_mapping::ApiError;
use crate::state::AppState;

pub fn router<F: Fetcher>(state: AppState<F>) -> Router {
    Router::new()
        .route("/all", get(all::<F>))
        .route("/hourly", get(hourly::<F>))
        .route("/current", get(current::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The whole cached forecast document.
async fn all<F: Fetcher>(State(state): State<AppState<F>>) -> Result<Response, ApiError> {
    let snapshot = state.query.full(state.now()).await?;
    Ok(Json(&*snapshot).into_response())
}

async fn hourly<F: Fetcher>(
    State(state): State<AppState<F>>,
) -> Result<Json<HourlySeries>, ApiError> {
    let hourly = state.query.hourly(state.now()).await?;
    Ok(Json(hourly))
}

/// Current observation with its unit labels.
async fn current<F: Fetcher>(
    State(state): State<AppState<F>>,
) -> Result<Json<CurrentView>, ApiError> {
    let current = state.query.current(state.now()).await?;
    Ok(Json(current))
}
