use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	pub telemetry: TelemetryConfig,
	pub server: ServerConfig,
	pub catalog: CatalogConfig,
	pub extraction: ExtractionConfig,
	pub fdp: FdpConfig,
}

impl AppConfig {
	/// Loads the configuration from the compiled-in defaults, an optional `config.toml` in the
	/// working directory and `DICOM_FDP_` prefixed environment variables (in that order).
	pub fn new() -> Result<Self, config::ConfigError> {
		use config::Config;
		let s = Config::builder()
			.add_source(config::File::from_str(
				include_str!("defaults.toml"),
				config::FileFormat::Toml,
			))
			.add_source(config::File::with_name("config.toml").required(false))
			.add_source(
				config::Environment::with_prefix("DICOM_FDP")
					.prefix_separator("_")
					.separator("__"),
			)
			.build()?;

		s.try_deserialize()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
	// Configurable logging level. Also configurable via env vars RUST_LOG and DICOM_FDP_TELEMETRY__LEVEL
	pub level: String,
	/// Sentry DSN. Sentry is disabled if not set.
	pub sentry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	pub http: HttpServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
	// The interface the catalog server will be listening on
	pub interface: IpAddr,
	// The port for the catalog server
	pub port: u16,
	/// Path prefix all routes are nested under.
	pub base_path: String,
	/// Request timeout in milliseconds.
	pub request_timeout: u64,
	pub graceful_shutdown: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
	/// The Turtle file that is loaded into memory on startup.
	pub rdf_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
	/// Directory that is searched recursively for `.dcm` and `.dicom` files.
	pub dicom_directory: PathBuf,
	/// Directory the generated documents and Turtle files are written to.
	pub output_directory: PathBuf,
	pub catalog_title: String,
	pub dataset_title: String,
	pub publisher: String,
	/// Public location of the DICOM files, used for the distributions.
	pub access_url: String,
	/// Base of every generated resource IRI.
	pub base_uri: Url,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdpConfig {
	/// Base URL of the FAIR Data Point API.
	pub base_url: Url,
	pub api_key: Option<String>,
	/// Push the generated documents to the FAIR Data Point after extraction.
	pub upload: bool,
	/// Request timeout in milliseconds.
	pub timeout: u64,
}
