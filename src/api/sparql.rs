use crate::api::html::{escape, page, table, BasePath};
use crate::api::json_error;
use crate::store::{OutputFormat, QueryOutput, Row};
use crate::AppState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{instrument, warn};

const EXAMPLE_QUERY: &str = "PREFIX dcat: <http://www.w3.org/ns/dcat#>
PREFIX dct: <http://purl.org/dc/terms/>

SELECT ?dataset ?title WHERE {
  ?dataset a dcat:Dataset ;
           dct:title ?title .
}";

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/sparql", post(sparql))
		.route("/sparql-ui", get(sparql_form).post(sparql_form_submit))
}

#[derive(Debug, Deserialize)]
pub struct SparqlRequest {
	pub query: String,
	#[serde(default)]
	pub output: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct SparqlFormRequest {
	pub query: String,
}

#[instrument(skip_all)]
async fn sparql(State(state): State<AppState>, Form(request): Form<SparqlRequest>) -> Response {
	match state.catalog.query(&request.query, request.output) {
		Ok(QueryOutput::Rows(rows)) => Json(rows).into_response(),
		Ok(QueryOutput::Serialized(text)) => {
			([(CONTENT_TYPE, request.output.content_type())], text).into_response()
		}
		Err(err) => {
			warn!("Rejected SPARQL query: {err}");
			json_error(StatusCode::BAD_REQUEST, err)
		}
	}
}

#[instrument(skip_all)]
async fn sparql_form(Extension(base): Extension<BasePath>) -> Html<String> {
	render_form(&base, EXAMPLE_QUERY, "")
}

#[instrument(skip_all)]
async fn sparql_form_submit(
	State(state): State<AppState>,
	Extension(base): Extension<BasePath>,
	Form(request): Form<SparqlFormRequest>,
) -> Html<String> {
	let results = match state.catalog.query(&request.query, OutputFormat::Json) {
		Ok(QueryOutput::Rows(rows)) => render_rows(&rows),
		Ok(QueryOutput::Serialized(text)) => format!("<pre>{}</pre>", escape(&text)),
		Err(err) => {
			warn!("Rejected SPARQL query: {err}");
			format!("<p class=\"error\">{}</p>", escape(&err.to_string()))
		}
	};
	render_form(&base, &request.query, &results)
}

fn render_form(base: &BasePath, query: &str, results: &str) -> Html<String> {
	let body = format!(
		r#"<form method="post" action="{action}">
<textarea name="query" rows="12">{query}</textarea>
<p><button type="submit">Run query</button></p>
</form>
{results}"#,
		action = escape(&base.link("/sparql-ui")),
		query = escape(query),
	);
	page(base, "SPARQL Query", &body)
}

/// Renders result rows as a table. Columns are the union of all bound variables.
fn render_rows(rows: &[Row]) -> String {
	if rows.is_empty() {
		return String::from("<p>No results.</p>");
	}

	let columns: BTreeSet<&str> = rows
		.iter()
		.flat_map(|row| row.keys().map(String::as_str))
		.collect();
	let headers: Vec<&str> = columns.into_iter().collect();

	let cells = rows.iter().map(|row| {
		headers
			.iter()
			.map(|column| row.get(*column).cloned().unwrap_or_default())
			.collect::<Vec<_>>()
	});
	format!("<p>{} result(s)</p>\n{}", rows.len(), table(&headers, cells))
}
