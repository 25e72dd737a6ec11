use crate::api::html::BasePath;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use serde_json::json;
use std::fmt::Display;

mod catalog;
mod home;
mod html;
mod sparql;

pub fn routes(base_path: &str) -> Router<AppState> {
	let router = Router::new()
		.merge(home::routes())
		.merge(catalog::routes())
		.merge(sparql::routes())
		.layer(Extension(BasePath::new(base_path)));

	// axum no longer supports nesting at the root
	match base_path {
		"/" | "" => router,
		base_path => Router::new().nest(base_path, router),
	}
}

/// JSON error body of the form `{"error": "..."}`.
pub(crate) fn json_error(status: StatusCode, message: impl Display) -> Response {
	(status, Json(json!({ "error": message.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::tests::demo_store;
	use axum::body::{to_bytes, Body};
	use axum::http::header::CONTENT_TYPE;
	use axum::http::{Method, Request};
	use serde_json::Value;
	use tower::ServiceExt;

	fn app(base_path: &str) -> Router {
		routes(base_path).with_state(AppState {
			catalog: demo_store(),
		})
	}

	fn get(uri: &str) -> Request<Body> {
		Request::builder().uri(uri).body(Body::empty()).unwrap()
	}

	fn form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(fields)
			.finish();
		Request::builder()
			.method(Method::POST)
			.uri(uri)
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(body))
			.unwrap()
	}

	async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, String) {
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_owned();
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, content_type, String::from_utf8(body.to_vec()).unwrap())
	}

	fn parse(body: &str) -> Value {
		serde_json::from_str(body).unwrap()
	}

	#[tokio::test]
	async fn catalog_record() {
		let (status, _, body) = send(app("/"), get("/catalog")).await;
		assert_eq!(status, StatusCode::OK);
		let catalog = parse(&body);
		assert_eq!(catalog["title"], "Demo");
		assert_eq!(catalog["uri"], "https://example.org/fdp/catalogs/demo");
	}

	#[tokio::test]
	async fn lists_datasets() {
		let (status, _, body) = send(app("/"), get("/datasets")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(parse(&body).as_array().map(Vec::len), Some(3));
	}

	#[tokio::test]
	async fn unknown_dataset_is_not_found() {
		let (status, _, body) = send(app("/"), get("/dataset/missing")).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(parse(&body)["error"], "Dataset not found");
	}

	#[tokio::test]
	async fn dataset_detail() {
		let (status, _, body) = send(app("/"), get("/dataset/modality-mr")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(
			parse(&body)["uri"],
			"https://example.org/fdp/datasets/modality-mr"
		);
	}

	#[tokio::test]
	async fn sparql_rows_as_json() {
		let query = "PREFIX dcat: <http://www.w3.org/ns/dcat#> \
			SELECT ?d WHERE { ?d a dcat:Catalog }";
		let (status, content_type, body) =
			send(app("/"), form("/sparql", &[("query", query)])).await;
		assert_eq!(status, StatusCode::OK);
		assert!(content_type.starts_with("application/json"));
		assert_eq!(
			parse(&body),
			serde_json::json!([{ "d": "https://example.org/fdp/catalogs/demo" }])
		);
	}

	#[tokio::test]
	async fn sparql_csv_output() {
		let query = "PREFIX dct: <http://purl.org/dc/terms/> \
			SELECT ?title WHERE { <https://example.org/fdp/catalogs/demo> dct:title ?title }";
		let (status, content_type, body) = send(
			app("/"),
			form("/sparql", &[("query", query), ("output", "csv")]),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(content_type.starts_with("text/csv"));
		assert!(body.lines().any(|line| line == "Demo"));
	}

	#[tokio::test]
	async fn sparql_text_output() {
		let query = "PREFIX dct: <http://purl.org/dc/terms/> \
			SELECT ?title WHERE { <https://example.org/fdp/catalogs/demo> dct:title ?title }";
		let (status, content_type, body) = send(
			app("/"),
			form("/sparql", &[("query", query), ("output", "text")]),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(content_type.starts_with("text/tab-separated-values"));
		assert_eq!(body.lines().collect::<Vec<_>>(), ["?title", "\"Demo\""]);
	}

	#[tokio::test]
	async fn sparql_xml_output() {
		let query = "SELECT ?s WHERE { ?s ?p \"Demo\" }";
		let (status, content_type, body) = send(
			app("/"),
			form("/sparql", &[("query", query), ("output", "xml")]),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type, "application/sparql-results+xml");
		assert!(body.contains("<sparql"));
		assert!(body.contains("<uri>https://example.org/fdp/catalogs/demo</uri>"));
	}

	#[tokio::test]
	async fn invalid_sparql_is_bad_request() {
		let (status, _, body) =
			send(app("/"), form("/sparql", &[("query", "SELECT WHERE {")])).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(parse(&body)["error"].is_string());
	}

	#[tokio::test]
	async fn home_page_lists_datasets() {
		let (status, content_type, body) = send(app("/"), get("/")).await;
		assert_eq!(status, StatusCode::OK);
		assert!(content_type.starts_with("text/html"));
		assert!(body.contains("/dataset/modality-ct"));
	}

	#[tokio::test]
	async fn sparql_ui_renders_results() {
		let (status, _, body) = send(app("/"), get("/sparql-ui")).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("<textarea"));

		let query = "SELECT ?s WHERE { ?s ?p \"Demo\" }";
		let (status, _, body) = send(app("/"), form("/sparql-ui", &[("query", query)])).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("1 result(s)"));
		assert!(body.contains("https://example.org/fdp/catalogs/demo"));
	}

	#[tokio::test]
	async fn nested_under_base_path() {
		let (status, _, _) = send(app("/fdp"), get("/fdp/datasets")).await;
		assert_eq!(status, StatusCode::OK);
		let (status, _, _) = send(app("/fdp"), get("/datasets")).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn pages_link_inside_base_path() {
		let (status, _, page) = send(app("/fdp"), get("/fdp/sparql-ui")).await;
		assert_eq!(status, StatusCode::OK);
		let action = page
			.split(r#"action=""#)
			.nth(1)
			.and_then(|rest| rest.split('"').next())
			.unwrap();
		assert_eq!(action, "/fdp/sparql-ui");

		let query = "SELECT ?s WHERE { ?s ?p \"Demo\" }";
		let (status, _, body) = send(app("/fdp"), form(action, &[("query", query)])).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("1 result(s)"));

		let (status, _, home) = send(app("/fdp"), get("/fdp")).await;
		assert_eq!(status, StatusCode::OK);
		assert!(home.contains(r#"href="/fdp/dataset/modality-ct""#));
		let (status, _, _) = send(app("/fdp"), get("/fdp/dataset/modality-ct")).await;
		assert_eq!(status, StatusCode::OK);
	}
}
