use crate::api::html::{escape, page, BasePath};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use tracing::{error, instrument};

pub fn routes() -> Router<AppState> {
	Router::new().route("/", get(index))
}

/// HTML overview of all datasets in the catalog.
#[instrument(skip_all)]
async fn index(
	State(state): State<AppState>,
	Extension(base): Extension<BasePath>,
) -> impl IntoResponse {
	let datasets = match state.catalog.datasets() {
		Ok(datasets) => datasets,
		Err(err) => {
			error!("Failed to list datasets: {err}");
			return (
				StatusCode::INTERNAL_SERVER_ERROR,
				page(
					&base,
					"DICOM Catalog",
					"<p class=\"error\">Failed to list datasets</p>",
				),
			)
				.into_response();
		}
	};

	let mut body = format!(
		"<p>This server is running DICOM-FDP (v{}).</p>\n",
		env!("CARGO_PKG_VERSION")
	);
	if datasets.is_empty() {
		body.push_str("<p>The catalog contains no datasets.</p>");
	} else {
		body.push_str(
			"<table>\n<tr><th>Title</th><th>Identifier</th><th>Modality</th><th>Date</th></tr>\n",
		);
		for dataset in datasets {
			body.push_str(&format!(
				"<tr><td><a href=\"{href}\">{title}</a></td><td>{identifier}</td><td>{modality}</td><td>{date}</td></tr>\n",
				href = escape(&base.link(&format!("/dataset/{}", dataset.id))),
				title = escape(dataset.title.as_deref().unwrap_or(&dataset.id)),
				identifier = escape(dataset.identifier.as_deref().unwrap_or_default()),
				modality = escape(dataset.modality.as_deref().unwrap_or_default()),
				date = escape(dataset.date.as_deref().unwrap_or_default()),
			));
		}
		body.push_str("</table>");
	}

	page(&base, "DICOM Catalog", &body).into_response()
}
