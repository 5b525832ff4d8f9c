use crate::cli::args::{Cli, Commands};
use crate::client::UploadClient;
use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use crate::utils::constants::JSON_DATA_TYPES;
use crate::utils::{generate_filename, ProgressReporter};
use crate::validators::{ObservationChecker, SizeLimiter, StructuralValidator};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Upload {
            data_type,
            file,
            manifest,
        } => {
            let manifest = Manifest::load(&manifest)?;
            info!("Loaded manifest version {}", manifest.version());

            validate_file(&manifest, &file, &data_type)?;
            println!("✅ All validation checks passed");

            let client = UploadClient::from_env(&manifest)?;

            // Advisory probe: a flaky health endpoint must not block an
            // upload that may still succeed.
            if !client.health_check().await {
                warn!("API health check failed, but proceeding with upload...");
            }

            let progress = ProgressReporter::new_spinner("Uploading...", false);
            let outcome = client.upload(&file, &data_type).await;
            progress.finish_and_clear();

            let body = outcome?.into_result(client.policy().max_attempts)?;
            println!("✅ Upload successful: {body}");
        }

        Commands::Validate {
            data_type,
            file,
            manifest,
        } => {
            let manifest = Manifest::load(&manifest)?;
            info!("Loaded manifest version {}", manifest.version());

            validate_file(&manifest, &file, &data_type)?;
            println!("✅ All validation checks passed (no upload performed)");
        }

        Commands::HealthCheck { manifest } => {
            let manifest = Manifest::load(&manifest)?;
            let client = UploadClient::from_env(&manifest)?;

            if client.health_check().await {
                println!("✅ API is reachable");
            } else {
                return Err(UploaderError::HealthUnreachable);
            }
        }

        Commands::ListTypes { manifest } => {
            let manifest = Manifest::load(&manifest)?;
            println!("Manifest version {}", manifest.version());

            let now = Utc::now();
            for name in manifest.known_data_types() {
                // known_data_types only yields names present in the manifest
                let Some(spec) = manifest.spec_for(name) else {
                    continue;
                };
                let example = generate_filename(&manifest, name, now)?;
                let example = if example.is_empty() { "-" } else { &example };
                println!("  {name:<14} {:<28} {example}", spec.endpoint);
            }
        }
    }

    Ok(())
}

/// Run the full validation pipeline for one file: size limit, then for
/// JSON-bearing data types decode + structural check, then the domain
/// check for observations.
fn validate_file(manifest: &Manifest, file: &Path, data_type: &str) -> Result<()> {
    let limiter = SizeLimiter::new(manifest);
    limiter.check_file(file, data_type)?;

    if JSON_DATA_TYPES.contains(&data_type) {
        let content = fs::read_to_string(file)?;
        let document: Value = serde_json::from_str(&content)?;

        StructuralValidator::new(manifest).check(&document, data_type)?;

        if data_type == "observations" {
            if let Some(spec) = manifest.spec_for(data_type) {
                let report = ObservationChecker::new().check(&document, &spec.validation)?;
                println!("{}", report.summary());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    match log_file {
        Some(path) => {
            let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_max_level(level).init();
        }
    }

    Ok(())
}
