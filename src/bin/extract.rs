use anyhow::{bail, Context};
use dicom_fdp::aggregate::RunParameters;
use dicom_fdp::config::{AppConfig, FdpConfig};
use dicom_fdp::fdp::{upload, FdpClient};
use dicom_fdp::pipeline::{process_directory, FdpPackage};
use dicom_fdp::{init_logger, init_sentry};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
	let config = AppConfig::new()?;
	init_logger(&config.telemetry.level);
	let _sentry = init_sentry(&config.telemetry);

	let extraction = &config.extraction;
	info!(
		"Processing DICOM files from {}",
		extraction.dicom_directory.display()
	);
	let package = match process_directory(
		&extraction.dicom_directory,
		&RunParameters::from(extraction),
	) {
		Ok(package) => package,
		Err(err) if err.is_empty_batch() => {
			error!("No valid DICOM files found");
			bail!(
				"no valid DICOM files found in {}",
				extraction.dicom_directory.display()
			);
		}
		Err(err) => return Err(err.into()),
	};

	let summary = &package.summary;
	info!("Total files: {}", summary.total_files);
	info!("Unique patients: {}", summary.unique_patients);
	info!(
		"Modalities: {}",
		summary
			.modalities
			.iter()
			.map(String::as_str)
			.collect::<Vec<_>>()
			.join(", ")
	);
	info!("Total size: {:.2} MB", summary.total_size_mb());

	package
		.write_outputs(&extraction.output_directory)
		.context("failed to write output files")?;
	info!(
		"Metadata written to {}",
		extraction.output_directory.display()
	);

	if config.fdp.upload {
		tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()?
			.block_on(upload_package(&config.fdp, &package))?;
	}

	Ok(())
}

async fn upload_package(config: &FdpConfig, package: &FdpPackage) -> anyhow::Result<()> {
	info!("Uploading metadata to {}", config.base_url);
	let client = FdpClient::new(config)?;
	let report = upload(
		&client,
		&package.catalog,
		&package.dataset,
		&package.distributions,
	)
	.await;

	let report_json = serde_json::to_string(&report)?;
	if report.is_complete() {
		info!(report = %report_json, "Upload finished");
	} else {
		warn!(report = %report_json, "Upload finished with failed steps");
	}
	Ok(())
}
