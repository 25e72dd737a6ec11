pub mod aggregate;
pub mod api;
pub mod config;
pub mod extract;
pub mod fdp;
pub mod pipeline;
pub mod rdf;
pub mod store;
pub mod types;
pub mod vocab;

use crate::config::TelemetryConfig;
use crate::store::CatalogStore;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Server name sent with every HTTP response.
pub const SERVER_NAME: &str = concat!("DICOM-FDP/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct AppState {
	pub catalog: CatalogStore,
}

/// Installs the global tracing subscriber. `level` is the default directive, `RUST_LOG` takes
/// precedence.
pub fn init_logger(level: &str) {
	let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.compact()
				.with_ansi(true)
				.with_file(false)
				.with_line_number(false)
				.with_target(false),
		)
		.with(
			EnvFilter::builder()
				.with_default_directive(level.into())
				.from_env_lossy(),
		)
		.with(sentry::integrations::tracing::layer())
		.init();
}

pub fn init_sentry(config: &TelemetryConfig) -> sentry::ClientInitGuard {
	let guard = sentry::init((
		// An empty string will disable Sentry
		config.sentry.as_deref().unwrap_or_default(),
		sentry::ClientOptions {
			release: sentry::release_name!(),
			traces_sample_rate: 1.0,
			..Default::default()
		},
	));

	if let Some(dsn) = &config.sentry {
		info!(dsn, "Enabled Sentry for tracing and error tracking");
	}

	guard
}
