//! Turns a directory of DICOM files into the documents and graphs of one metadata batch.

use crate::aggregate::{
	catalog_document, dataset_document, distribution_documents, summarize, AggregateError,
	CatalogDocument, DatasetDocument, DistributionDocument, RunParameters, Summary,
};
use crate::extract::{collect_directory, DicomRecord};
use crate::rdf::{catalog_graph, roo_graph, to_turtle, RdfError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

pub const CATALOG_FILE: &str = "catalog.json";
pub const DATASET_FILE: &str = "dataset.json";
pub const DISTRIBUTIONS_FILE: &str = "distributions.json";
pub const METADATA_FILE: &str = "metadata.ttl";
pub const CATALOG_TURTLE_FILE: &str = "catalog.ttl";

#[derive(Debug, Error)]
pub enum PipelineError {
	#[error(transparent)]
	Aggregate(#[from] AggregateError),
	#[error(transparent)]
	Rdf(#[from] RdfError),
	#[error("failed to serialize {file}: {source}")]
	Serialize {
		file: &'static str,
		source: serde_json::Error,
	},
	#[error("failed to write {path}: {source}")]
	Write {
		path: PathBuf,
		source: std::io::Error,
	},
}

impl PipelineError {
	/// Whether the batch contained no readable DICOM files.
	pub const fn is_empty_batch(&self) -> bool {
		matches!(self, Self::Aggregate(AggregateError::NoFiles))
	}
}

/// Everything generated for one batch, ready to be written to disk or uploaded.
#[derive(Debug, Clone)]
pub struct FdpPackage {
	pub catalog: CatalogDocument,
	pub dataset: DatasetDocument,
	pub distributions: Vec<DistributionDocument>,
	/// ROO graph of patients, studies and series as Turtle.
	pub roo_metadata: String,
	/// DCAT catalog graph as Turtle, loaded by the query service.
	pub catalog_turtle: String,
	pub summary: Summary,
}

#[instrument(skip(params))]
pub fn process_directory(
	directory: &Path,
	params: &RunParameters,
) -> Result<FdpPackage, PipelineError> {
	let records = collect_directory(directory);
	info!("Extracted metadata from {} DICOM files", records.len());
	build_package(&records, params)
}

pub fn build_package(
	records: &[DicomRecord],
	params: &RunParameters,
) -> Result<FdpPackage, PipelineError> {
	let summary = summarize(records)?;
	let catalog = catalog_document(params)?;
	let dataset = dataset_document(records, params)?;
	let distributions = distribution_documents(records, params)?;

	let roo_metadata = to_turtle(&roo_graph(records, &params.base_uri)?)?;
	let catalog_turtle = to_turtle(&catalog_graph(records, &catalog, params)?)?;

	Ok(FdpPackage {
		catalog,
		dataset,
		distributions,
		roo_metadata,
		catalog_turtle,
		summary,
	})
}

impl FdpPackage {
	/// Writes all generated files into `directory`, creating it if needed.
	pub fn write_outputs(&self, directory: &Path) -> Result<Vec<PathBuf>, PipelineError> {
		fs::create_dir_all(directory).map_err(|source| PipelineError::Write {
			path: directory.to_path_buf(),
			source,
		})?;

		let files = [
			(CATALOG_FILE, json(CATALOG_FILE, &self.catalog)?),
			(DATASET_FILE, json(DATASET_FILE, &self.dataset)?),
			(DISTRIBUTIONS_FILE, json(DISTRIBUTIONS_FILE, &self.distributions)?),
			(METADATA_FILE, self.roo_metadata.clone()),
			(CATALOG_TURTLE_FILE, self.catalog_turtle.clone()),
		];

		let mut written = Vec::with_capacity(files.len());
		for (name, contents) in files {
			let path = directory.join(name);
			fs::write(&path, contents).map_err(|source| PipelineError::Write {
				path: path.clone(),
				source,
			})?;
			info!("Wrote {}", path.display());
			written.push(path);
		}
		Ok(written)
	}
}

fn json<T: Serialize + ?Sized>(file: &'static str, value: &T) -> Result<String, PipelineError> {
	serde_json::to_string_pretty(value).map_err(|source| PipelineError::Serialize { file, source })
}
