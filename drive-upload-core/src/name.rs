//! Effective remote name for an upload.

use std::path::Path;

/// Returns `explicit` verbatim when it is non-empty, otherwise the base name of `source`.
///
/// No normalisation is applied; callers are responsible for names the store accepts.
/// A path without a base name (e.g. `..`) falls back to the path text.
pub fn resolve_name(explicit: Option<&str>, source: &Path) -> String {
    match explicit {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => source
            .file_name()
            .map(|base| base.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned()),
    }
}
