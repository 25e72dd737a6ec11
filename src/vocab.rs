//! IRIs of the vocabularies used in the generated metadata.

use oxigraph::model::NamedNodeRef;

pub const DCAT: &str = "http://www.w3.org/ns/dcat#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const VCARD: &str = "http://www.w3.org/2006/vcard/ns#";
pub const ROO: &str = "http://purl.org/roo/ontology#";
pub const FDP: &str = "https://w3id.org/fdp/fdp-o#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Prefixes bound in serialized Turtle documents.
pub const PREFIXES: &[(&str, &str)] = &[
	("dcat", DCAT),
	("dct", DCT),
	("foaf", FOAF),
	("vcard", VCARD),
	("roo", ROO),
	("fdp", FDP),
	("xsd", XSD),
];

pub mod dcat {
	use super::NamedNodeRef;

	pub const CATALOG: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://www.w3.org/ns/dcat#Catalog");
	pub const DATASET: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://www.w3.org/ns/dcat#Dataset");
	pub const DATASET_PROPERTY: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://www.w3.org/ns/dcat#dataset");
	pub const KEYWORD: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://www.w3.org/ns/dcat#keyword");
}

pub mod dct {
	use super::NamedNodeRef;

	pub const TITLE: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/title");
	pub const DESCRIPTION: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
	pub const IDENTIFIER: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/identifier");
	pub const DATE: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/date");
	pub const ISSUED: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/issued");
	pub const CREATOR: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/dc/terms/creator");
}

pub mod foaf {
	use super::NamedNodeRef;

	pub const NAME: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://xmlns.com/foaf/0.1/name");
}

/// Radiation Oncology Ontology terms.
pub mod roo {
	use super::NamedNodeRef;

	pub const PATIENT: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#Patient");
	pub const IMAGING_STUDY: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#ImagingStudy");
	pub const IMAGING_SERIES: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#ImagingSeries");
	pub const HAS_STUDY: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasStudy");
	pub const HAS_SERIES: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasSeries");
	pub const HAS_PATIENT_NAME: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasPatientName");
	pub const HAS_PATIENT_ID: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasPatientID");
	pub const HAS_GENDER: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasGender");
	pub const HAS_BIRTH_DATE: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasBirthDate");
	pub const HAS_STUDY_DESCRIPTION: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasStudyDescription");
	pub const HAS_STUDY_DATE: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasStudyDate");
	pub const HAS_SERIES_DESCRIPTION: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasSeriesDescription");
	pub const HAS_SERIES_DATE: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasSeriesDate");
	pub const HAS_MODALITY: NamedNodeRef<'static> =
		NamedNodeRef::new_unchecked("http://purl.org/roo/ontology#hasModality");
}
