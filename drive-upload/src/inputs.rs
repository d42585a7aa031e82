//! Validation of the raw action inputs into a [`Invocation`].
//!
//! Inputs arrive as optional strings (command line, `INPUT_*` environment variables
//! or the YAML config file). Required values are checked in a fixed order so the
//! first missing one is the one reported. Credentials are registered for masking
//! before anything else is done with them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use drive_upload_core::error::UploadError;
use drive_upload_core::publish::PublishConfig;
use tracing::{debug, info};

use crate::logging::add_mask;

pub const FILENAME_INPUT: &str = "filename";
pub const NAME_INPUT: &str = "name";
pub const FOLDER_ID_INPUT: &str = "folderId";
pub const CREDENTIALS_INPUT: &str = "credentials";
pub const ENCODED_INPUT: &str = "encoded";
pub const OVERWRITE_INPUT: &str = "overwrite";
pub const TO_UNZIP_INPUT: &str = "toUnzip";

/// Inputs as supplied, before any validation.
#[derive(Default, Clone)]
pub struct RawInputs {
    pub filename: Option<String>,
    pub name: Option<String>,
    pub folder_id: Option<String>,
    pub credentials: Option<String>,
    pub encoded: Option<String>,
    pub overwrite: Option<String>,
    pub to_unzip: Option<String>,
}

impl std::fmt::Debug for RawInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawInputs")
            .field("filename", &self.filename)
            .field("name", &self.name)
            .field("folder_id", &self.folder_id)
            .field("credentials_set", &self.credentials.is_some())
            .field("encoded", &self.encoded)
            .field("overwrite", &self.overwrite)
            .field("to_unzip", &self.to_unzip)
            .finish()
    }
}

/// Service-account key material, already decoded. Never printed.
#[derive(Clone)]
pub struct Credentials(String);

impl Credentials {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials(***)")
    }
}

/// Everything a run needs once inputs are validated.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub publish: PublishConfig,
    pub credentials: Credentials,
}

fn required(value: Option<String>, input: &str) -> Result<String, UploadError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(UploadError::MissingInput(input.to_string())),
    }
}

/// Empty inputs count as not given; Actions exports declared but unset inputs as "".
fn set(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parses a boolean input: empty or absent means `true`.
pub fn parse_flag(value: Option<&str>, input: &str) -> Result<bool, UploadError> {
    match value.unwrap_or("") {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(UploadError::invalid_input(
            input,
            format!("{input} needs to be either empty, `false` or `true`."),
        )),
    }
}

/// Decodes credentials when `encoded` is set and trims a single trailing newline.
pub fn decode_credentials(raw: &str, encoded: bool) -> Result<Credentials, UploadError> {
    let text = if encoded {
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|e| UploadError::auth("base64 decoding of 'credentials'", e))?;
        String::from_utf8(bytes)
            .map_err(|e| UploadError::auth("reading decoded 'credentials' as UTF-8", e))?
    } else {
        raw.to_string()
    };
    let trimmed = text.strip_suffix('\n').unwrap_or(&text).to_string();
    add_mask(&trimmed);
    Ok(Credentials(trimmed))
}

impl RawInputs {
    /// Fills every unset or empty field from `fallback`.
    pub fn or(self, fallback: RawInputs) -> RawInputs {
        RawInputs {
            filename: set(self.filename).or(fallback.filename),
            name: set(self.name).or(fallback.name),
            folder_id: set(self.folder_id).or(fallback.folder_id),
            credentials: set(self.credentials).or(fallback.credentials),
            encoded: set(self.encoded).or(fallback.encoded),
            overwrite: set(self.overwrite).or(fallback.overwrite),
            to_unzip: set(self.to_unzip).or(fallback.to_unzip),
        }
    }

    pub fn validate(self) -> Result<Invocation, UploadError> {
        let filename = required(self.filename, FILENAME_INPUT)?;
        let folder_id = required(self.folder_id, FOLDER_ID_INPUT)?;
        let raw_credentials = required(self.credentials, CREDENTIALS_INPUT)?;
        add_mask(&raw_credentials);

        let encoded = parse_flag(self.encoded.as_deref(), ENCODED_INPUT)?;
        let credentials = decode_credentials(&raw_credentials, encoded)?;
        let overwrite = parse_flag(self.overwrite.as_deref(), OVERWRITE_INPUT)?;
        let expand = parse_flag(self.to_unzip.as_deref(), TO_UNZIP_INPUT)?;

        let explicit_name = self.name.filter(|n| !n.is_empty());
        debug!(?explicit_name, "Explicit name input");
        info!(
            filename = %filename,
            folder_id = %folder_id,
            encoded,
            overwrite,
            to_unzip = expand,
            "Inputs validated"
        );

        Ok(Invocation {
            publish: PublishConfig {
                source_path: filename.into(),
                explicit_name,
                folder_id,
                overwrite,
                expand,
            },
            credentials,
        })
    }
}
