//! Client for the FAIR Data Point API and the ordered upload of a generated batch.

use crate::aggregate::{CatalogDocument, DatasetDocument, DistributionDocument};
use crate::config::FdpConfig;
use crate::types::InvalidBaseIri;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FdpError {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("response from {0} did not contain a uri")]
	MissingUri(Url),
	#[error(transparent)]
	InvalidBaseUrl(#[from] InvalidBaseIri),
}

/// The write operations of a FAIR Data Point. Each call creates one resource and returns its IRI.
#[async_trait]
pub trait CatalogApi: Send + Sync {
	async fn create_catalog(&self, catalog: &CatalogDocument) -> Result<String, FdpError>;

	async fn create_dataset(
		&self,
		catalog_uri: &str,
		dataset: &DatasetDocument,
	) -> Result<String, FdpError>;

	async fn create_distribution(
		&self,
		dataset_uri: &str,
		distribution: &DistributionDocument,
	) -> Result<String, FdpError>;
}

pub struct FdpClient {
	client: reqwest::Client,
	base_url: Url,
	api_key: Option<String>,
}

#[derive(Deserialize)]
struct CreatedResource {
	uri: Option<String>,
}

impl FdpClient {
	pub fn new(config: &FdpConfig) -> Result<Self, FdpError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_millis(config.timeout))
			.build()?;
		Ok(Self {
			client,
			base_url: config.base_url.clone(),
			api_key: config.api_key.clone(),
		})
	}

	async fn post<T>(&self, collection: &str, document: &T) -> Result<String, FdpError>
	where
		T: Serialize + Sync,
	{
		let mut endpoint = self.base_url.clone();
		endpoint
			.path_segments_mut()
			.map_err(|()| InvalidBaseIri(self.base_url.clone()))?
			.pop_if_empty()
			.push(collection);

		let mut request = self
			.client
			.post(endpoint.clone())
			.header(ACCEPT, mime::APPLICATION_JSON.as_ref())
			.json(document);
		if let Some(api_key) = &self.api_key {
			request = request.bearer_auth(api_key);
		}

		let created: CreatedResource = request
			.send()
			.await?
			.error_for_status()?
			.json()
			.await?;
		created.uri.ok_or(FdpError::MissingUri(endpoint))
	}
}

#[async_trait]
impl CatalogApi for FdpClient {
	#[instrument(skip_all)]
	async fn create_catalog(&self, catalog: &CatalogDocument) -> Result<String, FdpError> {
		self.post("catalogs", catalog).await
	}

	#[instrument(skip(self, dataset))]
	async fn create_dataset(
		&self,
		catalog_uri: &str,
		dataset: &DatasetDocument,
	) -> Result<String, FdpError> {
		let dataset = DatasetDocument {
			is_part_of: Some(catalog_uri.to_owned()),
			..dataset.clone()
		};
		self.post("datasets", &dataset).await
	}

	#[instrument(skip(self, distribution))]
	async fn create_distribution(
		&self,
		dataset_uri: &str,
		distribution: &DistributionDocument,
	) -> Result<String, FdpError> {
		let distribution = DistributionDocument {
			is_part_of: Some(dataset_uri.to_owned()),
			..distribution.clone()
		};
		self.post("distributions", &distribution).await
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
	Created { uri: String },
	Failed { reason: String },
	/// Not attempted because the parent resource could not be created.
	Skipped,
}

impl StepOutcome {
	pub fn uri(&self) -> Option<&str> {
		match self {
			Self::Created { uri } => Some(uri.as_str()),
			_ => None,
		}
	}

	fn from_result(step: &str, result: Result<String, FdpError>) -> Self {
		match result {
			Ok(uri) => {
				info!("Created {step} {uri}");
				Self::Created { uri }
			}
			Err(err) => {
				warn!("Failed to create {step}: {err}");
				Self::Failed {
					reason: err.to_string(),
				}
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
	pub catalog: StepOutcome,
	pub dataset: StepOutcome,
	pub distributions: Vec<StepOutcome>,
}

impl UploadReport {
	pub fn is_complete(&self) -> bool {
		std::iter::once(&self.catalog)
			.chain(std::iter::once(&self.dataset))
			.chain(&self.distributions)
			.all(|step| matches!(step, StepOutcome::Created { .. }))
	}
}

/// Creates the catalog, then the dataset inside it, then every distribution inside the dataset.
///
/// Requests are sent one after another. A step that fails skips everything that depends on it,
/// distributions are attempted independently of each other.
#[instrument(skip_all)]
pub async fn upload<A>(
	api: &A,
	catalog: &CatalogDocument,
	dataset: &DatasetDocument,
	distributions: &[DistributionDocument],
) -> UploadReport
where
	A: CatalogApi + ?Sized,
{
	let catalog = StepOutcome::from_result("catalog", api.create_catalog(catalog).await);

	let dataset = match catalog.uri() {
		Some(catalog_uri) => StepOutcome::from_result(
			"dataset",
			api.create_dataset(catalog_uri, dataset).await,
		),
		None => StepOutcome::Skipped,
	};

	let mut outcomes = Vec::with_capacity(distributions.len());
	for distribution in distributions {
		let outcome = match dataset.uri() {
			Some(dataset_uri) => StepOutcome::from_result(
				"distribution",
				api.create_distribution(dataset_uri, distribution).await,
			),
			None => StepOutcome::Skipped,
		};
		outcomes.push(outcome);
	}

	UploadReport {
		catalog,
		dataset,
		distributions: outcomes,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::aggregate::tests::{params, record};
	use crate::aggregate::{catalog_document, dataset_document, distribution_documents};
	use axum::http::{HeaderMap, StatusCode};
	use axum::routing::post;
	use axum::{Json, Router};
	use serde_json::{json, Value};
	use std::sync::{Arc, Mutex};

	struct Batch {
		catalog: CatalogDocument,
		dataset: DatasetDocument,
		distributions: Vec<DistributionDocument>,
	}

	fn batch() -> Batch {
		let records = [record("P1", "CT"), record("P2", "MR")];
		let params = params();
		Batch {
			catalog: catalog_document(&params).unwrap(),
			dataset: dataset_document(&records, &params).unwrap(),
			distributions: distribution_documents(&records, &params).unwrap(),
		}
	}

	/// Records every call and fails the configured steps.
	#[derive(Default)]
	struct MockApi {
		fail_catalog: bool,
		fail_dataset: bool,
		fail_distribution: Option<usize>,
		calls: Mutex<Vec<String>>,
	}

	impl MockApi {
		fn log(&self, call: String) -> usize {
			let mut calls = self.calls.lock().unwrap();
			calls.push(call);
			calls.len()
		}

		fn failure() -> FdpError {
			FdpError::MissingUri(Url::parse("https://fdp.example.org/test").unwrap())
		}
	}

	#[async_trait]
	impl CatalogApi for MockApi {
		async fn create_catalog(&self, _: &CatalogDocument) -> Result<String, FdpError> {
			self.log(String::from("catalog"));
			if self.fail_catalog {
				return Err(Self::failure());
			}
			Ok(String::from("https://fdp.example.org/catalog/1"))
		}

		async fn create_dataset(
			&self,
			catalog_uri: &str,
			_: &DatasetDocument,
		) -> Result<String, FdpError> {
			self.log(format!("dataset in {catalog_uri}"));
			if self.fail_dataset {
				return Err(Self::failure());
			}
			Ok(String::from("https://fdp.example.org/dataset/1"))
		}

		async fn create_distribution(
			&self,
			dataset_uri: &str,
			_: &DistributionDocument,
		) -> Result<String, FdpError> {
			let index = self
				.calls
				.lock()
				.unwrap()
				.iter()
				.filter(|call| call.starts_with("distribution"))
				.count();
			let call = self.log(format!("distribution in {dataset_uri}"));
			if self.fail_distribution == Some(index) {
				return Err(Self::failure());
			}
			Ok(format!("https://fdp.example.org/distribution/{call}"))
		}
	}

	#[tokio::test]
	async fn uploads_in_order() {
		let batch = batch();
		let api = MockApi::default();

		let report = upload(&api, &batch.catalog, &batch.dataset, &batch.distributions).await;

		assert!(report.is_complete());
		assert_eq!(report.catalog.uri(), Some("https://fdp.example.org/catalog/1"));
		assert_eq!(report.dataset.uri(), Some("https://fdp.example.org/dataset/1"));
		assert_eq!(report.distributions.len(), 2);
		assert_eq!(
			*api.calls.lock().unwrap(),
			[
				"catalog",
				"dataset in https://fdp.example.org/catalog/1",
				"distribution in https://fdp.example.org/dataset/1",
				"distribution in https://fdp.example.org/dataset/1",
			]
		);
	}

	#[tokio::test]
	async fn failed_catalog_skips_everything() {
		let batch = batch();
		let api = MockApi {
			fail_catalog: true,
			..MockApi::default()
		};

		let report = upload(&api, &batch.catalog, &batch.dataset, &batch.distributions).await;

		assert!(matches!(report.catalog, StepOutcome::Failed { .. }));
		assert_eq!(report.dataset, StepOutcome::Skipped);
		assert_eq!(report.distributions, [StepOutcome::Skipped, StepOutcome::Skipped]);
		assert_eq!(api.calls.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn failed_dataset_skips_distributions() {
		let batch = batch();
		let api = MockApi {
			fail_dataset: true,
			..MockApi::default()
		};

		let report = upload(&api, &batch.catalog, &batch.dataset, &batch.distributions).await;

		assert!(report.catalog.uri().is_some());
		assert!(matches!(report.dataset, StepOutcome::Failed { .. }));
		assert_eq!(report.distributions, [StepOutcome::Skipped, StepOutcome::Skipped]);
		assert!(!report.is_complete());
	}

	#[tokio::test]
	async fn distributions_fail_independently() {
		let batch = batch();
		let api = MockApi {
			fail_distribution: Some(0),
			..MockApi::default()
		};

		let report = upload(&api, &batch.catalog, &batch.dataset, &batch.distributions).await;

		assert!(matches!(report.distributions[0], StepOutcome::Failed { .. }));
		assert!(report.distributions[1].uri().is_some());
	}

	#[test]
	fn report_serializes_with_status_tag() {
		let report = UploadReport {
			catalog: StepOutcome::Created {
				uri: String::from("https://fdp.example.org/catalog/1"),
			},
			dataset: StepOutcome::Failed {
				reason: String::from("timeout"),
			},
			distributions: vec![StepOutcome::Skipped],
		};

		assert_eq!(
			serde_json::to_value(&report).unwrap(),
			json!({
				"catalog": { "status": "created", "uri": "https://fdp.example.org/catalog/1" },
				"dataset": { "status": "failed", "reason": "timeout" },
				"distributions": [{ "status": "skipped" }],
			})
		);
	}

	type Received = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

	/// Serves a stand-in FAIR Data Point on a random local port and returns its base URL.
	async fn serve_fdp(received: Received) -> Url {
		fn remember(received: &Received, collection: &str, headers: &HeaderMap, body: Value) {
			let authorization = headers
				.get("authorization")
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			received
				.lock()
				.unwrap()
				.push((collection.to_owned(), authorization, body));
		}

		let catalogs = received.clone();
		let datasets = received.clone();
		let distributions = received;
		let router = Router::new()
			.route(
				"/api/catalogs",
				post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
					remember(&catalogs, "catalogs", &headers, body);
					Json(json!({ "uri": "https://fdp.example.org/catalog/42" }))
				}),
			)
			.route(
				"/api/datasets",
				post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
					remember(&datasets, "datasets", &headers, body);
					Json(json!({ "uri": "https://fdp.example.org/dataset/7" }))
				}),
			)
			.route(
				"/api/distributions",
				post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
					let title = body["dct:title"].as_str().unwrap_or_default().to_owned();
					remember(&distributions, "distributions", &headers, body);
					if title == "DICOM Files" {
						(StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})))
					} else {
						(StatusCode::CREATED, Json(json!({ "id": "no-uri" })))
					}
				}),
			);

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, router).await.unwrap();
		});
		Url::parse(&format!("http://{addr}/api")).unwrap()
	}

	#[tokio::test]
	async fn client_posts_linked_documents() {
		let received = Received::default();
		let base_url = serve_fdp(received.clone()).await;
		let client = FdpClient::new(&FdpConfig {
			base_url,
			api_key: Some(String::from("secret")),
			upload: true,
			timeout: 5000,
		})
		.unwrap();
		let batch = batch();

		let report = upload(&client, &batch.catalog, &batch.dataset, &batch.distributions).await;

		assert_eq!(report.catalog.uri(), Some("https://fdp.example.org/catalog/42"));
		assert_eq!(report.dataset.uri(), Some("https://fdp.example.org/dataset/7"));
		let StepOutcome::Failed { reason } = &report.distributions[0] else {
			panic!("expected the DICOM distribution to fail");
		};
		assert!(reason.contains("500"));
		let StepOutcome::Failed { reason } = &report.distributions[1] else {
			panic!("expected a missing uri");
		};
		assert!(reason.contains("did not contain a uri"));

		let received = received.lock().unwrap();
		assert_eq!(received.len(), 4);
		let (collection, authorization, catalog) = &received[0];
		assert_eq!(collection, "catalogs");
		assert_eq!(authorization.as_deref(), Some("Bearer secret"));
		assert_eq!(catalog["dct:title"], "Test Catalog");
		assert_eq!(received[1].2["dct:isPartOf"], "https://fdp.example.org/catalog/42");
		assert_eq!(received[2].2["dct:isPartOf"], "https://fdp.example.org/dataset/7");
		assert_eq!(received[3].0, "distributions");
	}

	#[tokio::test]
	async fn client_without_api_key_sends_no_authorization() {
		let received = Received::default();
		let base_url = serve_fdp(received.clone()).await;
		let client = FdpClient::new(&FdpConfig {
			base_url,
			api_key: None,
			upload: true,
			timeout: 5000,
		})
		.unwrap();

		let uri = client.create_catalog(&batch().catalog).await.unwrap();

		assert_eq!(uri, "https://fdp.example.org/catalog/42");
		assert_eq!(received.lock().unwrap()[0].1, None);
	}
}
