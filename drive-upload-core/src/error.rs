//! Error taxonomy for a single upload run.
//!
//! Every variant is terminal: nothing is retried internally, and work already
//! done on the remote side (updated duplicates, created archive entries) is
//! left in place. The `Display` text names the operation and the object it was
//! attempted on; the underlying cause is available through `source()`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::contract::StoreError;

/// Classification of [`UploadError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingInput,
    InvalidInput,
    AuthFailure,
    SourceRead,
    StoreQueryFailure,
    StoreWriteFailure,
    StoreDownloadFailure,
    ArchiveDecodeFailure,
}

/// Which write was being attempted when a store write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Create => f.write_str("creating"),
            WriteOperation::Update => f.write_str("updating"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("missing input '{0}'")]
    MissingInput(String),

    #[error("incorrect input '{input}' reason: {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("authentication failed while {stage}")]
    AuthFailure {
        stage: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("reading source file {} failed", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("querying files with {query} failed")]
    StoreQuery {
        query: String,
        #[source]
        source: StoreError,
    },

    #[error("{operation} file {object} failed")]
    StoreWrite {
        operation: WriteOperation,
        object: String,
        #[source]
        source: StoreError,
    },

    #[error("downloading file with id {id} failed")]
    StoreDownload {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("file with id {id} is not a readable archive")]
    ArchiveDecode {
        id: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::MissingInput(_) => ErrorKind::MissingInput,
            UploadError::InvalidInput { .. } => ErrorKind::InvalidInput,
            UploadError::AuthFailure { .. } => ErrorKind::AuthFailure,
            UploadError::SourceRead { .. } => ErrorKind::SourceRead,
            UploadError::StoreQuery { .. } => ErrorKind::StoreQueryFailure,
            UploadError::StoreWrite { .. } => ErrorKind::StoreWriteFailure,
            UploadError::StoreDownload { .. } => ErrorKind::StoreDownloadFailure,
            UploadError::ArchiveDecode { .. } => ErrorKind::ArchiveDecodeFailure,
        }
    }

    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        UploadError::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn auth(stage: impl Into<String>, source: impl Into<StoreError>) -> Self {
        UploadError::AuthFailure {
            stage: stage.into(),
            source: Some(source.into()),
        }
    }
}
