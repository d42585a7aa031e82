//! High-level pipeline: name resolution → upload reconciliation → optional archive expansion.
//!
//! [`publish`] runs the stages strictly in sequence against one shared store handle.
//! The first failing stage ends the run with its [`UploadError`]; no stage is retried
//! and nothing already written to the store is undone.
//!
//! # Navigation
//! - Main entrypoint: [`publish`]
//! - Supporting types: [`PublishConfig`], [`PublishReport`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

use crate::archive::{self, ExpansionReport};
use crate::contract::ObjectStore;
use crate::error::UploadError;
use crate::name::resolve_name;
use crate::reconcile::{self, Outcome, UploadRequest};

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub source_path: PathBuf,
    /// Overrides the source file's base name when non-empty.
    pub explicit_name: Option<String>,
    pub folder_id: String,
    pub overwrite: bool,
    /// Expand the uploaded object as a ZIP archive into `<folder_id>/archive`.
    pub expand: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub name: String,
    pub object_id: String,
    pub outcome: Outcome,
    pub expansion: Option<ExpansionReport>,
}

pub async fn publish<S>(store: &S, config: &PublishConfig) -> Result<PublishReport, UploadError>
where
    S: ObjectStore + ?Sized,
{
    let name = resolve_name(config.explicit_name.as_deref(), &config.source_path);
    info!(
        source = %config.source_path.display(),
        name = %name,
        folder_id = %config.folder_id,
        overwrite = config.overwrite,
        expand = config.expand,
        "Publishing file"
    );

    let source_bytes = tokio::fs::read(&config.source_path).await.map_err(|e| {
        error!(source = %config.source_path.display(), error = %e, "Reading source file failed");
        UploadError::SourceRead {
            path: config.source_path.clone(),
            source: e,
        }
    })?;

    let request = UploadRequest {
        source_bytes,
        target_name: name.clone(),
        target_folder_id: config.folder_id.clone(),
        overwrite: config.overwrite,
    };
    let reconciled = reconcile::reconcile(store, request).await?;

    let expansion = if config.expand {
        let destination = archive::archive_destination(&config.folder_id);
        Some(archive::expand(store, &reconciled.id, &destination).await?)
    } else {
        None
    };

    let report = PublishReport {
        name,
        object_id: reconciled.id,
        outcome: reconciled.outcome,
        expansion,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => tracing::debug!(json = %json, "Publish report"),
        Err(e) => error!(error = ?e, "Failed to serialize publish report"),
    }
    Ok(report)
}
