#![doc = "drive-upload-core: upload reconciliation and archive expansion for drive-upload."]

//! This crate holds the decision logic for pushing one local file into a remote
//! object-store folder: whether the upload becomes a create or an overwrite of
//! every same-named object, and how an uploaded archive is expanded in place.
//!
//! Nothing here talks to the network. The store is reached through the
//! [`contract::ObjectStore`] trait, implemented by the CLI crate for Google Drive
//! and by mocks/fakes in tests.

pub mod archive;
pub mod contract;
pub mod error;
pub mod name;
pub mod publish;
pub mod reconcile;
