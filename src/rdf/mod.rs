//! RDF views of a batch of DICOM records.
//!
//! [`roo_graph`] maps the patient → study → series hierarchy onto the Radiation Oncology Ontology,
//! [`catalog_graph`] describes the batch as a DCAT catalog with one dataset per modality.

use crate::aggregate::{CatalogDocument, RunParameters};
use crate::extract::DicomRecord;
use crate::types::{resource_iri, InvalidBaseIri};
use crate::vocab::{dcat, dct, roo, PREFIXES};
use chrono::NaiveDate;
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::{rdf, xsd};
use oxigraph::model::{
	Graph, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef, TripleRef,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Group name for records without a modality.
pub const UNKNOWN_MODALITY: &str = "UNKNOWN";

#[derive(Debug, Error)]
pub enum RdfError {
	#[error(transparent)]
	InvalidBaseIri(#[from] InvalidBaseIri),
	#[error(transparent)]
	Iri(#[from] IriParseError),
	#[error("failed to serialize graph: {0}")]
	Serialize(#[from] std::io::Error),
	#[error("serialized graph is not valid UTF-8")]
	Utf8(#[from] std::string::FromUtf8Error),
}

fn node(base_uri: &Url, segments: &[&str]) -> Result<NamedNode, RdfError> {
	let iri = resource_iri(base_uri, segments)?;
	Ok(NamedNode::new(iri)?)
}

fn add_literal(
	graph: &mut Graph,
	subject: NamedNodeRef<'_>,
	predicate: NamedNodeRef<'_>,
	value: &str,
) {
	if !value.is_empty() {
		graph.insert(TripleRef::new(
			subject,
			predicate,
			LiteralRef::new_simple_literal(value),
		));
	}
}

fn add_date(
	graph: &mut Graph,
	subject: NamedNodeRef<'_>,
	predicate: NamedNodeRef<'_>,
	date: Option<NaiveDate>,
) {
	if let Some(date) = date {
		let literal = Literal::new_typed_literal(date.to_string(), xsd::DATE);
		graph.insert(TripleRef::new(subject, predicate, literal.as_ref()));
	}
}

/// Builds the ROO patient → study → series graph.
///
/// Node IRIs are derived from the DICOM identifiers, so records sharing a patient, study or
/// series collapse onto the same node.
#[instrument(skip_all, fields(records = records.len()))]
pub fn roo_graph(records: &[DicomRecord], base_uri: &Url) -> Result<Graph, RdfError> {
	let mut graph = Graph::new();

	for record in records {
		let patient = node(base_uri, &["patients", record.patient_id.as_str()])?;
		let patient = patient.as_ref();
		graph.insert(TripleRef::new(patient, rdf::TYPE, roo::PATIENT));
		add_literal(&mut graph, patient, roo::HAS_PATIENT_NAME, &record.patient_name);
		add_literal(&mut graph, patient, roo::HAS_PATIENT_ID, &record.patient_id);
		add_literal(&mut graph, patient, roo::HAS_GENDER, &record.patient_sex);
		add_date(&mut graph, patient, roo::HAS_BIRTH_DATE, record.patient_birth_date);

		let study = node(base_uri, &["studies", record.study_instance_uid.as_str()])?;
		let study = study.as_ref();
		graph.insert(TripleRef::new(study, rdf::TYPE, roo::IMAGING_STUDY));
		graph.insert(TripleRef::new(patient, roo::HAS_STUDY, study));
		add_literal(&mut graph, study, roo::HAS_STUDY_DESCRIPTION, &record.study_description);
		add_date(&mut graph, study, roo::HAS_STUDY_DATE, record.study_date);

		let series = node(base_uri, &["series", record.series_instance_uid.as_str()])?;
		let series = series.as_ref();
		graph.insert(TripleRef::new(series, rdf::TYPE, roo::IMAGING_SERIES));
		graph.insert(TripleRef::new(study, roo::HAS_SERIES, series));
		add_literal(
			&mut graph,
			series,
			roo::HAS_SERIES_DESCRIPTION,
			&record.series_description,
		);
		add_literal(&mut graph, series, roo::HAS_MODALITY, &record.modality);
		add_date(&mut graph, series, roo::HAS_SERIES_DATE, record.series_date);
	}

	debug!(triples = graph.len(), "Generated ROO graph");
	Ok(graph)
}

/// Builds the DCAT view of a batch that is served by the catalog API.
///
/// The catalog gets the IRI of `catalog`; every distinct modality becomes a `dcat:Dataset`
/// whose description and identifier hold the modality.
#[instrument(skip_all, fields(records = records.len()))]
pub fn catalog_graph(
	records: &[DicomRecord],
	catalog: &CatalogDocument,
	params: &RunParameters,
) -> Result<Graph, RdfError> {
	let mut graph = Graph::new();

	let catalog_node = NamedNode::new(catalog.id.as_str())?;
	let catalog_node = catalog_node.as_ref();
	graph.insert(TripleRef::new(catalog_node, rdf::TYPE, dcat::CATALOG));
	add_literal(&mut graph, catalog_node, dct::TITLE, &catalog.title);
	add_literal(&mut graph, catalog_node, dct::DESCRIPTION, &catalog.description);
	add_literal(&mut graph, catalog_node, dct::CREATOR, &params.publisher);
	let issued = Literal::new_typed_literal(catalog.issued.to_rfc3339(), xsd::DATE_TIME);
	graph.insert(TripleRef::new(catalog_node, dct::ISSUED, issued.as_ref()));

	let mut groups: BTreeMap<&str, Vec<&DicomRecord>> = BTreeMap::new();
	for record in records {
		let modality = if record.modality.is_empty() {
			UNKNOWN_MODALITY
		} else {
			record.modality.as_str()
		};
		groups.entry(modality).or_default().push(record);
	}

	for (modality, group) in groups {
		let segment = format!("modality-{}", modality.to_lowercase());
		let dataset = node(&params.base_uri, &["datasets", segment.as_str()])?;
		let dataset = dataset.as_ref();

		graph.insert(TripleRef::new(dataset, rdf::TYPE, dcat::DATASET));
		graph.insert(TripleRef::new(catalog_node, dcat::DATASET_PROPERTY, dataset));
		add_literal(
			&mut graph,
			dataset,
			dct::TITLE,
			&format!("{} ({modality})", params.dataset_title),
		);
		add_literal(&mut graph, dataset, dct::IDENTIFIER, modality);
		add_literal(&mut graph, dataset, dct::DESCRIPTION, modality);
		add_literal(&mut graph, dataset, dct::CREATOR, &params.publisher);
		add_date(
			&mut graph,
			dataset,
			dct::DATE,
			group.iter().filter_map(|record| record.study_date).min(),
		);

		let keywords: BTreeSet<&str> = group
			.iter()
			.map(|record| record.study_description.as_str())
			.chain([modality])
			.collect();
		for keyword in keywords {
			add_literal(&mut graph, dataset, dcat::KEYWORD, keyword);
		}
	}

	debug!(triples = graph.len(), "Generated DCAT catalog graph");
	Ok(graph)
}

/// Serializes a graph as Turtle with the common metadata prefixes bound.
pub fn to_turtle(graph: &Graph) -> Result<String, RdfError> {
	let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
	for (prefix, iri) in PREFIXES {
		serializer = serializer.with_prefix(*prefix, *iri)?;
	}

	let mut writer = serializer.for_writer(Vec::new());
	for triple in graph {
		writer.serialize_triple(triple)?;
	}
	Ok(String::from_utf8(writer.finish()?)?)
}
