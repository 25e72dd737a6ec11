//! Extraction of catalog-relevant attributes from DICOM files.

use crate::types::{CS, LO, PN, UI};
use chrono::NaiveDate;
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{DefaultDicomObject, OpenFileOptions, ReadError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// File extensions (compared case-insensitively) that are considered DICOM files.
pub const DICOM_EXTENSIONS: &[&str] = &["dcm", "dicom"];

/// The attributes of a single DICOM file.
///
/// String attributes that are not present in the file are stored as empty strings, dates that
/// are missing or malformed are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicomRecord {
	pub file_path: PathBuf,
	pub file_size: u64,
	pub sop_instance_uid: UI,
	pub study_instance_uid: UI,
	pub series_instance_uid: UI,
	pub patient_name: PN,
	pub patient_id: LO,
	pub patient_birth_date: Option<NaiveDate>,
	pub patient_sex: CS,
	pub study_description: String,
	pub series_description: String,
	pub study_date: Option<NaiveDate>,
	pub series_date: Option<NaiveDate>,
	pub modality: CS,
	pub institution_name: String,
	pub manufacturer: String,
	pub manufacturer_model: String,
}

#[derive(Debug, Error)]
pub enum ExtractError {
	#[error("failed to read DICOM file {}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: ReadError,
	},
	#[error("failed to read metadata of {}", path.display())]
	Metadata {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Reads a single DICOM file and extracts its attributes.
///
/// Pixel data is not loaded.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_file(path: &Path) -> Result<DicomRecord, ExtractError> {
	let object = OpenFileOptions::new()
		.read_until(tags::PIXEL_DATA)
		.open_file(path)
		.map_err(|source| ExtractError::Read {
			path: path.to_owned(),
			source,
		})?;

	let file_size = std::fs::metadata(path)
		.map_err(|source| ExtractError::Metadata {
			path: path.to_owned(),
			source,
		})?
		.len();

	Ok(DicomRecord {
		file_path: path.to_owned(),
		file_size,
		sop_instance_uid: string_value(&object, tags::SOP_INSTANCE_UID),
		study_instance_uid: string_value(&object, tags::STUDY_INSTANCE_UID),
		series_instance_uid: string_value(&object, tags::SERIES_INSTANCE_UID),
		patient_name: string_value(&object, tags::PATIENT_NAME),
		patient_id: string_value(&object, tags::PATIENT_ID),
		patient_birth_date: format_date(&string_value(&object, tags::PATIENT_BIRTH_DATE)),
		patient_sex: string_value(&object, tags::PATIENT_SEX),
		study_description: string_value(&object, tags::STUDY_DESCRIPTION),
		series_description: string_value(&object, tags::SERIES_DESCRIPTION),
		study_date: format_date(&string_value(&object, tags::STUDY_DATE)),
		series_date: format_date(&string_value(&object, tags::SERIES_DATE)),
		modality: string_value(&object, tags::MODALITY),
		institution_name: string_value(&object, tags::INSTITUTION_NAME),
		manufacturer: string_value(&object, tags::MANUFACTURER),
		manufacturer_model: string_value(&object, tags::MANUFACTURER_MODEL_NAME),
	})
}

fn string_value(object: &DefaultDicomObject, tag: Tag) -> String {
	object
		.element(tag)
		.ok()
		.and_then(|element| element.to_str().ok())
		.map(|value| value.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_owned())
		.unwrap_or_default()
}

/// Converts a DICOM date (`YYYYMMDD`) into a calendar date.
///
/// Only the first 8 characters are considered. Shorter or malformed values yield `None`.
pub fn format_date(dicom_date: &str) -> Option<NaiveDate> {
	let compact = dicom_date.get(..8)?;
	if !compact.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	NaiveDate::parse_from_str(compact, "%Y%m%d").ok()
}

fn is_dicom_file(path: &Path) -> bool {
	path.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| {
			DICOM_EXTENSIONS
				.iter()
				.any(|candidate| extension.eq_ignore_ascii_case(candidate))
		})
}

/// Recursively collects the records of all DICOM files below `directory`.
///
/// Files are processed one after another in path order. Symbolic links are not followed. Entries
/// and files that cannot be read are logged and skipped.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn collect_directory(directory: &Path) -> Vec<DicomRecord> {
	let mut records = Vec::new();

	for entry in WalkDir::new(directory).sort_by_file_name() {
		let entry = match entry {
			Ok(entry) => entry,
			Err(err) => {
				warn!("Skipping unreadable entry: {err}");
				continue;
			}
		};

		let path = entry.path();
		if entry.file_type().is_dir() || !is_dicom_file(path) {
			continue;
		}
		match extract_file(path) {
			Ok(record) => {
				debug!("Extracted {}", path.display());
				records.push(record);
			}
			Err(err) => warn!("Skipping {}: {err}", path.display()),
		}
	}

	records
}

#[cfg(test)]
pub(crate) mod fixtures {
	use dicom::core::{DataElement, VR};
	use dicom::dictionary_std::{tags, uids};
	use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
	use std::path::Path;

	pub struct Instance<'a> {
		pub sop_instance_uid: &'a str,
		pub study_instance_uid: &'a str,
		pub series_instance_uid: &'a str,
		pub patient_id: &'a str,
		pub modality: &'a str,
		pub study_date: &'a str,
	}

	/// Writes a minimal CT instance to `path`.
	pub fn write_instance(path: &Path, instance: &Instance) {
		let object = InMemDicomObject::from_element_iter([
			DataElement::new(tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE),
			DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, instance.sop_instance_uid),
			DataElement::new(tags::STUDY_DATE, VR::DA, instance.study_date),
			DataElement::new(tags::MODALITY, VR::CS, instance.modality),
			DataElement::new(tags::MANUFACTURER, VR::LO, "ACME"),
			DataElement::new(tags::STUDY_DESCRIPTION, VR::LO, "Thorax"),
			DataElement::new(tags::PATIENT_NAME, VR::PN, "Doe^Jane"),
			DataElement::new(tags::PATIENT_ID, VR::LO, instance.patient_id),
			DataElement::new(tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"),
			DataElement::new(tags::PATIENT_SEX, VR::CS, "F"),
			DataElement::new(tags::STUDY_INSTANCE_UID, VR::UI, instance.study_instance_uid),
			DataElement::new(tags::SERIES_INSTANCE_UID, VR::UI, instance.series_instance_uid),
		]);

		let file = object
			.with_meta(
				FileMetaTableBuilder::new()
					.transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
					.media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
					.media_storage_sop_instance_uid(instance.sop_instance_uid),
			)
			.unwrap();
		file.write_to_file(path).unwrap();
	}
}
