///
/// This module implements the CLI interface for drive-upload: argument parsing,
/// input merging and the async entrypoint used by `main` and integration tests.
///
/// All upload decisions (create vs. overwrite, archive expansion) live in the
/// [`drive-upload-core`] crate. This module wires real credentials and the Drive
/// client into that pipeline.
///
/// ## Inputs
/// Every option mirrors a GitHub Action input and can also be set through its
/// `INPUT_<NAME>` environment variable, so the binary runs unchanged as an action
/// step. An optional YAML file (`--config`) supplies non-secret defaults.
///
/// [`drive-upload-core`]: ../../drive_upload_core/
use crate::auth::{fetch_access_token, ServiceAccountKey, DRIVE_FILE_SCOPE};
use crate::drive::DriveClient;
use crate::inputs::RawInputs;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::Parser;
use drive_upload_core::publish::{publish, PublishReport};
use std::path::PathBuf;

/// Upload a file to a Google Drive folder, overwriting same-named files, and optionally expand it as a ZIP archive.
#[derive(Parser, Default)]
#[clap(name = "drive-upload", version)]
pub struct Cli {
    /// Local file to upload
    #[clap(long, env = "INPUT_FILENAME")]
    pub filename: Option<String>,

    /// Name of the file in Drive (defaults to the local file's base name)
    #[clap(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Id of the Drive folder to upload into
    #[clap(long = "folder-id", env = "INPUT_FOLDERID")]
    pub folder_id: Option<String>,

    /// Service-account JSON key, base64 encoded unless --encoded false
    #[clap(long, env = "INPUT_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Whether the credentials are base64 encoded: empty, `true` or `false`
    #[clap(long, env = "INPUT_ENCODED")]
    pub encoded: Option<String>,

    /// Overwrite every file with the same name in the folder: empty, `true` or `false`
    #[clap(long, env = "INPUT_OVERWRITE")]
    pub overwrite: Option<String>,

    /// Expand the uploaded file as a ZIP archive into `<folder>/archive`: empty, `true` or `false`
    #[clap(long = "to-unzip", env = "INPUT_TOUNZIP")]
    pub to_unzip: Option<String>,

    /// Path to a YAML file with non-secret inputs
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn inputs(&self) -> RawInputs {
        RawInputs {
            filename: self.filename.clone(),
            name: self.name.clone(),
            folder_id: self.folder_id.clone(),
            credentials: self.credentials.clone(),
            encoded: self.encoded.clone(),
            overwrite: self.overwrite.clone(),
            to_unzip: self.to_unzip.clone(),
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<PublishReport> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let file_inputs = match &cli.config {
        Some(path) => RawInputs::from(load_config(path)?),
        None => RawInputs::default(),
    };
    let invocation = cli.inputs().or(file_inputs).validate()?;

    let key = ServiceAccountKey::from_json(invocation.credentials.expose())?;
    let http = reqwest::Client::builder()
        .user_agent(concat!("drive-upload/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client failed")?;
    let token = fetch_access_token(&http, &key, DRIVE_FILE_SCOPE).await?;
    let client = DriveClient::new(http, token);

    let report = publish(&client, &invocation.publish)
        .await
        .context("File upload or update failed")?;
    tracing::info!(
        name = %report.name,
        id = %report.object_id,
        outcome = ?report.outcome,
        expanded = report.expansion.as_ref().map(|e| e.entries.len()).unwrap_or(0),
        "Upload complete"
    );
    Ok(report)
}
