use thiserror::Error;
use url::Url;

/// UI (Unique Identifier) value representation.
pub type UI = String;

/// LO (Long String) value representation, used for identifiers such as the Patient ID.
pub type LO = String;

/// PN (Person Name) value representation.
pub type PN = String;

/// CS (Code String) value representation, used for the modality and patient sex.
pub type CS = String;

/// Builds `{base}/{segments...}`, percent-encoding every segment as a single path segment.
///
/// `.` and `..` are kept as literal segments (`%2E`, `%2E%2E`) instead of being resolved. The
/// result is an RFC 3987 IRI and is not normalized again.
pub fn resource_iri(base: &Url, segments: &[&str]) -> Result<String, InvalidBaseIri> {
	if base.cannot_be_a_base() {
		return Err(InvalidBaseIri(base.clone()));
	}

	let mut iri = base.as_str().trim_end_matches('/').to_owned();
	let mut scratch = base.clone();
	for segment in segments {
		iri.push('/');
		if is_dot_segment(segment) {
			iri.push_str(&"%2E".repeat(segment.len()));
		} else {
			scratch
				.path_segments_mut()
				.map_err(|()| InvalidBaseIri(base.clone()))?
				.clear()
				.push(segment);
			iri.push_str(&scratch.path()[1..]);
		}
	}
	Ok(iri)
}

fn is_dot_segment(segment: &str) -> bool {
	matches!(segment, "." | "..")
}

#[derive(Debug, Error)]
#[error("{0} cannot be used as a base IRI")]
pub struct InvalidBaseIri(pub Url);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resource_iri_appends_segments() {
		let base = Url::parse("https://example.org/fdp").unwrap();
		let iri = resource_iri(&base, &["patients", "P1"]).unwrap();
		assert_eq!(iri, "https://example.org/fdp/patients/P1");
	}

	#[test]
	fn resource_iri_ignores_trailing_slash() {
		let base = Url::parse("https://example.org/fdp/").unwrap();
		let iri = resource_iri(&base, &["studies", "1.2.3"]).unwrap();
		assert_eq!(iri, "https://example.org/fdp/studies/1.2.3");
	}

	#[test]
	fn resource_iri_encodes_identifiers() {
		let base = Url::parse("https://example.org/fdp").unwrap();
		let iri = resource_iri(&base, &["patients", "Doe John/1"]).unwrap();
		assert_eq!(iri, "https://example.org/fdp/patients/Doe%20John%2F1");
	}

	#[test]
	fn resource_iri_keeps_dot_segments() {
		let base = Url::parse("https://example.org/fdp").unwrap();
		let single = resource_iri(&base, &["patients", "."]).unwrap();
		let double = resource_iri(&base, &["patients", ".."]).unwrap();
		assert_eq!(single, "https://example.org/fdp/patients/%2E");
		assert_eq!(double, "https://example.org/fdp/patients/%2E%2E");
		assert_eq!(
			resource_iri(&base, &["patients", "..."]).unwrap(),
			"https://example.org/fdp/patients/..."
		);
	}

	#[test]
	fn resource_iri_at_host_root() {
		let base = Url::parse("https://example.org").unwrap();
		let iri = resource_iri(&base, &["catalogs", "c1"]).unwrap();
		assert_eq!(iri, "https://example.org/catalogs/c1");
	}

	#[test]
	fn resource_iri_rejects_opaque_base() {
		let base = Url::parse("mailto:catalog@example.org").unwrap();
		assert!(resource_iri(&base, &["patients"]).is_err());
	}
}
