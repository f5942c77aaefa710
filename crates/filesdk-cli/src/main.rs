//! filesdk command-line client.
//!
//! Reads `FILE_API_URL`, `FILE_API_AUTHORIZATION` and the other settings from
//! the environment (or `.env`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use filesdk::{BackendKind, FileSdk, SdkConfig, UploadOptions};
use filesdk_cli::{init_tracing, print_json, DeleteSummary};

#[derive(Parser)]
#[command(name = "filesdk", about = "Upload and delete files through the file API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Extra renditions: a scale factor in (0, 1] or a width in pixels
        #[arg(long = "quality", value_name = "Q")]
        qualities: Vec<f64>,
        /// Overwrite an existing object instead of picking a free name
        #[arg(long)]
        update: bool,
        /// Object path (container, bucket or directory)
        #[arg(long)]
        path: Option<String>,
        /// Backend to ask a credential for: azure, aws, local
        #[arg(long)]
        backend: Option<String>,
    },
    /// Show a file record
    Get {
        id: String,
    },
    /// Delete one or more files
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Archive the records instead of removing objects
        #[arg(long)]
        soft: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!("Starting filesdk CLI");

    let config = SdkConfig::from_env().context("Failed to load configuration")?;
    let sdk = FileSdk::from_config(config)
        .await
        .context("Failed to initialize file SDK")?;

    match cli.command {
        Commands::Upload {
            file,
            name,
            qualities,
            update,
            path,
            backend,
        } => {
            let mut options = UploadOptions::default().with_qualities(qualities);
            options.name = name;
            options.is_update = update;
            options.path = path;
            options.backend_kind = backend
                .map(|b| b.parse::<BackendKind>())
                .transpose()
                .context("Invalid --backend")?;

            let record = sdk
                .upload_from_local_path(&file, options)
                .await
                .with_context(|| format!("Upload of {} failed", file.display()))?;
            tracing::info!(
                id = ?record.id,
                name = %record.name,
                variants = record.variants.len(),
                "File uploaded"
            );
            print_json(&record)?;
        }
        Commands::Get { id } => {
            let record = sdk.get_file(&id, None).await?;
            print_json(&record)?;
        }
        Commands::Delete { ids, soft } => {
            let report = sdk.delete_many(&ids, soft, None).await?;
            let complete = report.is_complete();
            tracing::info!(
                deleted = report.deleted.len(),
                archived = report.archived.len(),
                failed = report.failed.len(),
                "Delete finished"
            );
            for failure in &report.failed {
                tracing::warn!(id = %failure.id, error = %failure.error, "File not deleted");
            }
            print_json(&DeleteSummary::from(report))?;
            if !complete {
                anyhow::bail!("Some files could not be deleted");
            }
        }
    }

    Ok(())
}
