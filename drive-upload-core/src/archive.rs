//! # archive: expand an uploaded ZIP into individual remote objects
//!
//! The archive is downloaded back from the store, decoded completely in memory and
//! then every file entry is created under the destination folder, in archive order,
//! named by its relative path.
//!
//! There is no overwrite reconciliation here: entries are always created fresh.
//! The first failed create stops the expansion; entries created before it remain.

use std::io::{Cursor, Read};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::contract::{NewObject, ObjectStore};
use crate::error::{UploadError, WriteOperation};

/// Sub-location appended to the base folder to hold expanded entries.
pub const ARCHIVE_SUBFOLDER: &str = "archive";

/// One file inside an archive. Lives only for the duration of an expansion.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub relative_path: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("relative_path", &self.relative_path)
            .field("content_len", &self.content.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedEntry {
    pub id: String,
    pub relative_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub destination: String,
    pub entries: Vec<ExpandedEntry>,
}

/// Folder that receives the expanded content of an archive uploaded to `base_folder_id`.
pub fn archive_destination(base_folder_id: &str) -> String {
    format!("{base_folder_id}/{ARCHIVE_SUBFOLDER}")
}

/// Decodes every file entry of a ZIP archive, in archive order.
///
/// Directory entries are skipped. Any malformed entry fails the whole decode, so a
/// caller never sees a partial listing.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, zip::result::ZipError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.push(ArchiveEntry {
            relative_path: file.name().to_string(),
            content,
        });
    }
    Ok(entries)
}

/// Downloads `archive_id`, decodes it and creates each entry under `dest_folder_id`.
pub async fn expand<S>(
    store: &S,
    archive_id: &str,
    dest_folder_id: &str,
) -> Result<ExpansionReport, UploadError>
where
    S: ObjectStore + ?Sized,
{
    info!(id = %archive_id, destination = %dest_folder_id, "Expanding archive");

    let bytes = store.download(archive_id).await.map_err(|e| {
        error!(id = %archive_id, error = %e, "Downloading archive failed");
        UploadError::StoreDownload {
            id: archive_id.to_string(),
            source: e,
        }
    })?;
    debug!(id = %archive_id, size = bytes.len(), "Downloaded archive");

    let entries = read_entries(&bytes).map_err(|e| {
        error!(id = %archive_id, error = %e, "Decoding archive failed");
        UploadError::ArchiveDecode {
            id: archive_id.to_string(),
            source: e,
        }
    })?;
    debug!(id = %archive_id, entries = entries.len(), "Decoded archive");

    let mut report = ExpansionReport {
        destination: dest_folder_id.to_string(),
        entries: Vec::with_capacity(entries.len()),
    };

    for entry in entries {
        let ArchiveEntry {
            relative_path,
            content,
        } = entry;
        let object = NewObject::new(relative_path.as_str(), dest_folder_id, content);
        let description = object.describe();
        let created = store.create(object).await.map_err(|e| {
            error!(path = %relative_path, error = %e, "Creating archive entry failed");
            UploadError::StoreWrite {
                operation: WriteOperation::Create,
                object: description,
                source: e,
            }
        })?;
        debug!(path = %relative_path, id = %created.id, "Created archive entry");
        report.entries.push(ExpandedEntry {
            id: created.id,
            relative_path,
        });
    }

    info!(
        id = %archive_id,
        destination = %dest_folder_id,
        created = report.entries.len(),
        "Archive expanded"
    );
    Ok(report)
}
