//! Aggregation of DICOM records into DCAT-AP catalog, dataset and distribution documents.
//!
//! The documents are JSON-LD objects as accepted by a FAIR Data Point.

use crate::config::ExtractionConfig;
use crate::extract::DicomRecord;
use crate::types::{resource_iri, InvalidBaseIri};
use crate::vocab::{DCAT, DCT, FOAF, ROO};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

const LANGUAGE: &str = "en";
const CATALOG_LICENSE: &str = "https://creativecommons.org/licenses/by/4.0/";
const DATASET_LICENSE: &str = "https://creativecommons.org/licenses/by-nc/4.0/";
const ROO_ONTOLOGY: &str = "http://purl.org/roo/ontology";
const ROO_THEMES: &str = "http://purl.org/roo/themes";
const RADIATION_ONCOLOGY_THEME: &str = "http://purl.org/roo/themes/radiation-oncology";
/// COAR access right "restricted access".
const RESTRICTED_ACCESS: &str = "http://purl.org/coar/access_right/c_16ec";
const FIXED_KEYWORDS: &[&str] = &["DICOM", "Medical Imaging", "Radiation Oncology"];

#[derive(Debug, Error)]
pub enum AggregateError {
	#[error("no files found")]
	NoFiles,
	#[error(transparent)]
	InvalidBaseIri(#[from] InvalidBaseIri),
}

/// Run-level values interpolated into the generated documents.
#[derive(Debug, Clone)]
pub struct RunParameters {
	pub catalog_title: String,
	pub dataset_title: String,
	pub publisher: String,
	pub base_uri: Url,
	pub access_url: String,
}

impl From<&ExtractionConfig> for RunParameters {
	fn from(config: &ExtractionConfig) -> Self {
		Self {
			catalog_title: config.catalog_title.clone(),
			dataset_title: config.dataset_title.clone(),
			publisher: config.publisher.clone(),
			base_uri: config.base_uri.clone(),
			access_url: config.access_url.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
	pub total_files: usize,
	pub unique_patients: usize,
	pub modalities: BTreeSet<String>,
	pub total_size: u64,
}

impl Summary {
	#[allow(clippy::cast_precision_loss)]
	pub fn total_size_mb(&self) -> f64 {
		self.total_size as f64 / (1024.0 * 1024.0)
	}
}

/// Computes the summary statistics of a batch.
pub fn summarize(records: &[DicomRecord]) -> Result<Summary, AggregateError> {
	if records.is_empty() {
		return Err(AggregateError::NoFiles);
	}

	Ok(Summary {
		total_files: records.len(),
		unique_patients: distinct(records, |record| &record.patient_id).len(),
		modalities: distinct(records, |record| &record.modality)
			.into_iter()
			.map(str::to_owned)
			.collect(),
		total_size: records.iter().map(|record| record.file_size).sum(),
	})
}

fn distinct<'a, F>(records: &'a [DicomRecord], field: F) -> BTreeSet<&'a str>
where
	F: Fn(&'a DicomRecord) -> &'a String,
{
	records
		.iter()
		.map(field)
		.filter(|value| !value.is_empty())
		.map(String::as_str)
		.collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonLdContext {
	pub dcat: &'static str,
	pub dct: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub foaf: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub roo: Option<&'static str>,
}

impl JsonLdContext {
	const fn full() -> Self {
		Self {
			dcat: DCAT,
			dct: DCT,
			foaf: Some(FOAF),
			roo: Some(ROO),
		}
	}

	const fn dcat_only() -> Self {
		Self {
			dcat: DCAT,
			dct: DCT,
			foaf: None,
			roo: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
	#[serde(rename = "@type")]
	pub kind: &'static str,
	#[serde(rename = "foaf:name")]
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogDocument {
	#[serde(rename = "@context")]
	pub context: JsonLdContext,
	#[serde(rename = "@id")]
	pub id: String,
	#[serde(rename = "@type")]
	pub kind: &'static str,
	#[serde(rename = "dct:title")]
	pub title: String,
	#[serde(rename = "dct:description")]
	pub description: String,
	#[serde(rename = "dct:publisher")]
	pub publisher: Organization,
	#[serde(rename = "dct:language")]
	pub language: &'static str,
	#[serde(rename = "dct:license")]
	pub license: &'static str,
	#[serde(rename = "dcat:themeTaxonomy")]
	pub theme_taxonomy: &'static str,
	#[serde(rename = "dct:conformsTo")]
	pub conforms_to: &'static str,
	#[serde(rename = "dct:issued")]
	pub issued: DateTime<Utc>,
	#[serde(rename = "dct:modified")]
	pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetDocument {
	#[serde(rename = "@context")]
	pub context: JsonLdContext,
	#[serde(rename = "@id")]
	pub id: String,
	#[serde(rename = "@type")]
	pub kind: &'static str,
	#[serde(rename = "dct:title")]
	pub title: String,
	#[serde(rename = "dct:description")]
	pub description: String,
	#[serde(rename = "dcat:keyword")]
	pub keywords: Vec<String>,
	#[serde(rename = "dct:subject")]
	pub subject: &'static str,
	#[serde(rename = "dcat:theme")]
	pub theme: &'static str,
	#[serde(rename = "dct:conformsTo")]
	pub conforms_to: &'static str,
	#[serde(rename = "dct:language")]
	pub language: &'static str,
	#[serde(rename = "dct:license")]
	pub license: &'static str,
	#[serde(rename = "dct:accessRights")]
	pub access_rights: &'static str,
	#[serde(rename = "dct:issued")]
	pub issued: DateTime<Utc>,
	#[serde(rename = "dct:modified")]
	pub modified: DateTime<Utc>,
	#[serde(rename = "roo:hasModality")]
	pub modalities: BTreeSet<String>,
	#[serde(rename = "roo:hasModalityCount")]
	pub modality_count: usize,
	#[serde(rename = "roo:hasPatientCount")]
	pub patient_count: usize,
	#[serde(rename = "roo:hasFileCount")]
	pub file_count: usize,
	/// The catalog this dataset belongs to, set once the catalog has been created remotely.
	#[serde(rename = "dct:isPartOf", skip_serializing_if = "Option::is_none")]
	pub is_part_of: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionDocument {
	#[serde(rename = "@context")]
	pub context: JsonLdContext,
	#[serde(rename = "@id")]
	pub id: String,
	#[serde(rename = "@type")]
	pub kind: &'static str,
	#[serde(rename = "dct:title")]
	pub title: &'static str,
	#[serde(rename = "dct:description")]
	pub description: &'static str,
	#[serde(rename = "dcat:accessURL")]
	pub access_url: String,
	#[serde(rename = "dcat:mediaType")]
	pub media_type: &'static str,
	#[serde(rename = "dct:format")]
	pub format: &'static str,
	#[serde(rename = "dcat:byteSize", skip_serializing_if = "Option::is_none")]
	pub byte_size: Option<u64>,
	#[serde(rename = "dct:license", skip_serializing_if = "Option::is_none")]
	pub license: Option<&'static str>,
	#[serde(rename = "dct:conformsTo", skip_serializing_if = "Option::is_none")]
	pub conforms_to: Option<&'static str>,
	/// The dataset this distribution belongs to, set once the dataset has been created remotely.
	#[serde(rename = "dct:isPartOf", skip_serializing_if = "Option::is_none")]
	pub is_part_of: Option<String>,
}

fn new_resource_id(base_uri: &Url, collection: &str) -> Result<String, InvalidBaseIri> {
	let id = Uuid::new_v4().to_string();
	resource_iri(base_uri, &[collection, id.as_str()])
}

pub fn catalog_document(params: &RunParameters) -> Result<CatalogDocument, AggregateError> {
	let now = Utc::now();
	Ok(CatalogDocument {
		context: JsonLdContext::full(),
		id: new_resource_id(&params.base_uri, "catalogs")?,
		kind: "dcat:Catalog",
		title: params.catalog_title.clone(),
		description: format!("FAIR Data Point catalog for {}", params.catalog_title),
		publisher: Organization {
			kind: "foaf:Organization",
			name: params.publisher.clone(),
		},
		language: LANGUAGE,
		license: CATALOG_LICENSE,
		theme_taxonomy: ROO_THEMES,
		conforms_to: ROO_ONTOLOGY,
		issued: now,
		modified: now,
	})
}

pub fn dataset_document(
	records: &[DicomRecord],
	params: &RunParameters,
) -> Result<DatasetDocument, AggregateError> {
	let summary = summarize(records)?;
	let study_descriptions = distinct(records, |record| &record.study_description);

	let keywords = summary
		.modalities
		.iter()
		.map(String::as_str)
		.chain(study_descriptions)
		.chain(FIXED_KEYWORDS.iter().copied())
		.map(str::to_owned)
		.collect();

	let now = Utc::now();
	Ok(DatasetDocument {
		context: JsonLdContext::full(),
		id: new_resource_id(&params.base_uri, "datasets")?,
		kind: "dcat:Dataset",
		title: params.dataset_title.clone(),
		description: format!(
			"DICOM dataset containing medical imaging data. Contains {} DICOM files from {} patients.",
			summary.total_files, summary.unique_patients
		),
		keywords,
		subject: "Medical Imaging",
		theme: RADIATION_ONCOLOGY_THEME,
		conforms_to: ROO_ONTOLOGY,
		language: LANGUAGE,
		license: DATASET_LICENSE,
		access_rights: RESTRICTED_ACCESS,
		issued: now,
		modified: now,
		modality_count: summary.modalities.len(),
		modalities: summary.modalities,
		patient_count: summary.unique_patients,
		file_count: summary.total_files,
		is_part_of: None,
	})
}

/// Builds the distributions of a batch: the original DICOM files and the Turtle export.
pub fn distribution_documents(
	records: &[DicomRecord],
	params: &RunParameters,
) -> Result<Vec<DistributionDocument>, AggregateError> {
	let summary = summarize(records)?;

	let dicom = DistributionDocument {
		context: JsonLdContext::dcat_only(),
		id: new_resource_id(&params.base_uri, "distributions")?,
		kind: "dcat:Distribution",
		title: "DICOM Files",
		description: "Original DICOM files with medical imaging data",
		access_url: params.access_url.clone(),
		media_type: "application/dicom",
		format: "DICOM",
		byte_size: Some(summary.total_size),
		license: Some(DATASET_LICENSE),
		conforms_to: None,
		is_part_of: None,
	};

	let turtle = DistributionDocument {
		context: JsonLdContext::dcat_only(),
		id: new_resource_id(&params.base_uri, "distributions")?,
		kind: "dcat:Distribution",
		title: "ROO Semantic Metadata",
		description: "DICOM metadata mapped to ROO ontology in RDF format",
		access_url: format!("{}/metadata.ttl", params.access_url.trim_end_matches('/')),
		media_type: "text/turtle",
		format: "RDF/Turtle",
		byte_size: None,
		license: None,
		conforms_to: Some(ROO_ONTOLOGY),
		is_part_of: None,
	};

	Ok(vec![dicom, turtle])
}
