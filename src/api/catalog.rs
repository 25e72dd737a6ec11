use crate::api::json_error;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, instrument};

/// HTTP Router for the fixed-shape catalog lookups.
pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/catalog", get(catalog))
		.route("/datasets", get(datasets))
		.route("/dataset/{id}", get(dataset))
}

#[instrument(skip_all)]
async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
	match state.catalog.catalog() {
		Ok(Some(catalog)) => Json(catalog).into_response(),
		Ok(None) => json_error(StatusCode::NOT_FOUND, "No catalog found"),
		Err(err) => {
			error!("Failed to read catalog: {err}");
			json_error(StatusCode::INTERNAL_SERVER_ERROR, err)
		}
	}
}

#[instrument(skip_all)]
async fn datasets(State(state): State<AppState>) -> impl IntoResponse {
	match state.catalog.datasets() {
		Ok(datasets) => Json(datasets).into_response(),
		Err(err) => {
			error!("Failed to list datasets: {err}");
			json_error(StatusCode::INTERNAL_SERVER_ERROR, err)
		}
	}
}

#[instrument(skip(state))]
async fn dataset(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
	match state.catalog.dataset(&id) {
		Ok(Some(dataset)) => Json(dataset).into_response(),
		Ok(None) => json_error(StatusCode::NOT_FOUND, "Dataset not found"),
		Err(err) => {
			error!("Failed to read dataset {id}: {err}");
			json_error(StatusCode::INTERNAL_SERVER_ERROR, err)
		}
	}
}
