//! Read-only access to the catalog graph served by the HTTP API.

use crate::vocab::{dcat, dct, foaf};
use oxigraph::io::RdfFormat;
use oxigraph::model::vocab::rdf;
use oxigraph::model::{NamedNodeRef, Subject, SubjectRef, Term};
use oxigraph::sparql::results::QueryResultsFormat;
use oxigraph::sparql::{EvaluationError, QueryResults};
use oxigraph::store::{LoaderError, StorageError, Store};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("failed to open {path}: {source}")]
	Open {
		path: String,
		source: std::io::Error,
	},
	#[error(transparent)]
	Load(#[from] LoaderError),
	#[error(transparent)]
	Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum QueryError {
	#[error(transparent)]
	Evaluation(#[from] EvaluationError),
	#[error("query results are not valid UTF-8")]
	Utf8(#[from] std::string::FromUtf8Error),
}

/// Result formats offered by the SPARQL endpoint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	#[default]
	Json,
	Csv,
	Xml,
	#[serde(other)]
	Text,
}

impl OutputFormat {
	pub const fn content_type(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Csv => "text/csv; charset=utf-8",
			Self::Xml => "application/sparql-results+xml",
			Self::Text => "text/tab-separated-values; charset=utf-8",
		}
	}

	const fn results_format(self) -> QueryResultsFormat {
		match self {
			Self::Json => QueryResultsFormat::Json,
			Self::Csv => QueryResultsFormat::Csv,
			Self::Xml => QueryResultsFormat::Xml,
			Self::Text => QueryResultsFormat::Tsv,
		}
	}
}

/// One result row: variable name to stringified value. Unbound variables are omitted.
pub type Row = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput {
	Rows(Vec<Row>),
	Serialized(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
	pub id: String,
	pub title: Option<String>,
	pub identifier: Option<String>,
	pub modality: Option<String>,
	pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDetail {
	pub uri: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub date: Option<String>,
	pub identifier: Option<String>,
	pub creator: Option<String>,
	pub patient_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRecord {
	pub uri: String,
	pub title: Option<String>,
	pub description: Option<String>,
	pub issued: Option<String>,
	pub creator: Option<String>,
}

/// An immutable in-memory RDF graph.
///
/// The graph is loaded once and there is no way to modify it afterwards.
#[derive(Clone)]
pub struct CatalogStore {
	store: Store,
}

impl CatalogStore {
	#[instrument(skip_all, fields(path = %path.display()))]
	pub fn load(path: &Path) -> Result<Self, StoreError> {
		let file = File::open(path).map_err(|source| StoreError::Open {
			path: path.display().to_string(),
			source,
		})?;
		let store = Self::from_reader(BufReader::new(file))?;
		info!(triples = store.store.len()?, "Loaded catalog graph");
		Ok(store)
	}

	pub fn from_turtle(turtle: &str) -> Result<Self, StoreError> {
		Self::from_reader(turtle.as_bytes())
	}

	fn from_reader(reader: impl std::io::Read) -> Result<Self, StoreError> {
		let store = Store::new()?;
		store.load_from_reader(RdfFormat::Turtle, reader)?;
		Ok(Self { store })
	}

	/// All subjects of the given class keyed by their string form, ordered by it.
	///
	/// Blank nodes are keyed by their `_:id` form.
	fn subjects_of_type(
		&self,
		class: NamedNodeRef<'_>,
	) -> Result<Vec<(String, Subject)>, StorageError> {
		let mut subjects = BTreeMap::new();
		for quad in self
			.store
			.quads_for_pattern(None, Some(rdf::TYPE), Some(class.into()), None)
		{
			let subject = quad?.subject;
			subjects.insert(subject_to_string(subject.clone()), subject);
		}
		Ok(subjects.into_iter().collect())
	}

	/// The first value of `predicate` for `subject`.
	fn value(
		&self,
		subject: SubjectRef<'_>,
		predicate: NamedNodeRef<'_>,
	) -> Result<Option<String>, StorageError> {
		self.store
			.quads_for_pattern(Some(subject), Some(predicate), None, None)
			.next()
			.transpose()
			.map(|quad| quad.map(|quad| term_to_string(quad.object)))
	}

	pub fn datasets(&self) -> Result<Vec<DatasetSummary>, StorageError> {
		self.subjects_of_type(dcat::DATASET)?
			.into_iter()
			.map(|(uri, dataset)| -> Result<DatasetSummary, StorageError> {
				let node = dataset.as_ref();
				Ok(DatasetSummary {
					id: last_segment(&uri).to_owned(),
					title: self.value(node, dct::TITLE)?,
					identifier: self.value(node, dct::IDENTIFIER)?,
					modality: self.value(node, dct::DESCRIPTION)?,
					date: self.value(node, dct::DATE)?,
				})
			})
			.collect()
	}

	/// Looks up the dataset whose IRI ends with the path segment `id`.
	///
	/// If several datasets match, the one with the smallest IRI wins.
	pub fn dataset(&self, id: &str) -> Result<Option<DatasetDetail>, StorageError> {
		let Some((uri, dataset)) = self
			.subjects_of_type(dcat::DATASET)?
			.into_iter()
			.find(|(uri, _)| last_segment(uri) == id)
		else {
			return Ok(None);
		};

		let node = dataset.as_ref();
		Ok(Some(DatasetDetail {
			title: self.value(node, dct::TITLE)?,
			description: self.value(node, dct::DESCRIPTION)?,
			date: self.value(node, dct::DATE)?,
			identifier: self.value(node, dct::IDENTIFIER)?,
			creator: self.value(node, dct::CREATOR)?,
			patient_name: self.value(node, foaf::NAME)?,
			uri,
		}))
	}

	/// The catalog with the smallest IRI, if any.
	pub fn catalog(&self) -> Result<Option<CatalogRecord>, StorageError> {
		let Some((uri, catalog)) = self.subjects_of_type(dcat::CATALOG)?.into_iter().next() else {
			return Ok(None);
		};

		let node = catalog.as_ref();
		Ok(Some(CatalogRecord {
			title: self.value(node, dct::TITLE)?,
			description: self.value(node, dct::DESCRIPTION)?,
			issued: self.value(node, dct::ISSUED)?,
			creator: self.value(node, dct::CREATOR)?,
			uri,
		}))
	}

	/// Evaluates a SPARQL query. Update operations are rejected by the parser.
	#[instrument(skip(self, query))]
	pub fn query(&self, query: &str, format: OutputFormat) -> Result<QueryOutput, QueryError> {
		let results = self.store.query(query)?;

		if format == OutputFormat::Json {
			return Ok(QueryOutput::Rows(rows(results)?));
		}

		let serialized = match results {
			QueryResults::Graph(_) => results.write_graph(Vec::new(), RdfFormat::NTriples)?,
			results => results.write(Vec::new(), format.results_format())?,
		};
		Ok(QueryOutput::Serialized(String::from_utf8(serialized)?))
	}
}

fn rows(results: QueryResults) -> Result<Vec<Row>, EvaluationError> {
	match results {
		QueryResults::Solutions(solutions) => {
			let variables = solutions.variables().to_vec();
			solutions
				.map(|solution| -> Result<Row, EvaluationError> {
					let solution = solution?;
					Ok(variables
						.iter()
						.filter_map(|variable| {
							solution.get(variable).map(|value| {
								(variable.as_str().to_owned(), term_to_string(value.clone()))
							})
						})
						.collect())
				})
				.collect()
		}
		QueryResults::Boolean(value) => Ok(vec![Row::from([(
			String::from("boolean"),
			value.to_string(),
		)])]),
		QueryResults::Graph(triples) => triples
			.map(|triple| -> Result<Row, EvaluationError> {
				let triple = triple?;
				Ok(Row::from([
					(String::from("subject"), subject_to_string(triple.subject)),
					(String::from("predicate"), triple.predicate.into_string()),
					(String::from("object"), term_to_string(triple.object)),
				]))
			})
			.collect(),
	}
}

/// The lexical form of a literal or the IRI of a named node.
fn term_to_string(term: Term) -> String {
	match term {
		Term::NamedNode(node) => node.into_string(),
		Term::Literal(literal) => literal.value().to_owned(),
		other => other.to_string(),
	}
}

fn subject_to_string(subject: Subject) -> String {
	match subject {
		Subject::NamedNode(node) => node.into_string(),
		other => other.to_string(),
	}
}

fn last_segment(iri: &str) -> &str {
	iri.rsplit('/').next().unwrap_or(iri)
}
