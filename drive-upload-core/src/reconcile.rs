//! Create-or-overwrite decision for a single upload.
//!
//! The policy is split in two halves:
//! - [`plan`] is a pure function from the `overwrite` flag and the existing
//!   matches to a [`Reconciliation`].
//! - [`reconcile`] performs the store calls that the plan requires.
//!
//! With `overwrite` set, *every* object in the folder carrying the target name is
//! overwritten with the same content, and the id of the last one processed is
//! returned. Duplicate names are a fact of the store rather than an error. A failed
//! update stops the run; updates that already went through are not rolled back.

use tracing::{debug, error, info};

use crate::contract::{NewObject, ObjectQuery, ObjectStore, RemoteObject};
use crate::error::{UploadError, WriteOperation};

/// Everything needed to place one file in the store. Consumed by [`reconcile`].
#[derive(Clone)]
pub struct UploadRequest {
    pub source_bytes: Vec<u8>,
    pub target_name: String,
    pub target_folder_id: String,
    pub overwrite: bool,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("source_len", &self.source_bytes.len())
            .field("target_name", &self.target_name)
            .field("target_folder_id", &self.target_folder_id)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

/// What [`reconcile`] is going to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Create,
    UpdateAll(Vec<RemoteObject>),
}

/// What [`reconcile`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Outcome {
    Created,
    Updated { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reconciled {
    /// Id of the created object, or of the last updated match.
    pub id: String,
    pub outcome: Outcome,
}

/// Decides between creating a new object and overwriting all `matches`.
///
/// `matches` is ignored when `overwrite` is false.
pub fn plan(overwrite: bool, matches: Vec<RemoteObject>) -> Reconciliation {
    if overwrite && !matches.is_empty() {
        Reconciliation::UpdateAll(matches)
    } else {
        Reconciliation::Create
    }
}

/// Places `request` in the store and returns the resulting object id.
///
/// The existence query only runs when `overwrite` is set; otherwise a new object is
/// always created, even if that duplicates an existing name.
pub async fn reconcile<S>(store: &S, request: UploadRequest) -> Result<Reconciled, UploadError>
where
    S: ObjectStore + ?Sized,
{
    let UploadRequest {
        source_bytes,
        target_name,
        target_folder_id,
        overwrite,
    } = request;

    let matches = if overwrite {
        let query = ObjectQuery::new(target_name.as_str(), target_folder_id.as_str());
        let found = store.list(&query).await.map_err(|e| {
            error!(query = %query, error = %e, "Querying existing files failed");
            UploadError::StoreQuery {
                query: query.to_query_string(),
                source: e,
            }
        })?;
        debug!(
            matches = found.len(),
            name = %target_name,
            folder_id = %target_folder_id,
            "Found files matching file name and folder"
        );
        found
    } else {
        Vec::new()
    };

    match plan(overwrite, matches) {
        Reconciliation::UpdateAll(matches) => {
            let count = matches.len();
            let mut last_id = String::new();
            for existing in matches {
                debug!(
                    name = %existing.name,
                    folder_id = %target_folder_id,
                    id = %existing.id,
                    "Updating file"
                );
                store
                    .update(&existing.id, &target_name, &source_bytes)
                    .await
                    .map_err(|e| {
                        error!(id = %existing.id, error = %e, "Updating file failed");
                        UploadError::StoreWrite {
                            operation: WriteOperation::Update,
                            object: format!("{{id: {:?}, name: {:?}}}", existing.id, existing.name),
                            source: e,
                        }
                    })?;
                last_id = existing.id;
            }
            info!(id = %last_id, updated = count, "Overwrote existing file content");
            Ok(Reconciled {
                id: last_id,
                outcome: Outcome::Updated { count },
            })
        }
        Reconciliation::Create => {
            let object = NewObject::new(target_name, target_folder_id, source_bytes);
            let description = object.describe();
            debug!(object = %description, "Creating file");
            let created = store.create(object).await.map_err(|e| {
                error!(object = %description, error = %e, "Creating file failed");
                UploadError::StoreWrite {
                    operation: WriteOperation::Create,
                    object: description.clone(),
                    source: e,
                }
            })?;
            info!(id = %created.id, name = %created.name, "Created file");
            Ok(Reconciled {
                id: created.id,
                outcome: Outcome::Created,
            })
        }
    }
}
