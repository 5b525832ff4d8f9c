use crate::utils::constants::DEFAULT_MANIFEST_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "basinwx-uploader")]
#[command(about = "Manifest-driven weather data validator and uploader for BasinWx")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a data file and upload it to the BasinWx API
    Upload {
        #[arg(short, long, help = "Data type declared in the manifest")]
        data_type: String,

        #[arg(short, long, help = "Path to the file to upload")]
        file: PathBuf,

        #[arg(short, long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,
    },

    /// Run all validation checks without uploading
    Validate {
        #[arg(short, long, help = "Data type declared in the manifest")]
        data_type: String,

        #[arg(short, long, help = "Path to the file to validate")]
        file: PathBuf,

        #[arg(short, long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,
    },

    /// Probe the API health endpoint
    HealthCheck {
        #[arg(short, long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,
    },

    /// List the data types declared in the manifest
    ListTypes {
        #[arg(short, long, default_value = DEFAULT_MANIFEST_PATH)]
        manifest: PathBuf,
    },
}
