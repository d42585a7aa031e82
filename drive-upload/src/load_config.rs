/// `load_config` module: loads the optional static YAML config file into [`RawInputs`].
///
/// The file may carry any non-secret input under its action name:
///
/// ```yaml
/// filename: dist/site.zip
/// name: site.zip
/// folderId: 1AbCdEf
/// overwrite: true
/// toUnzip: false
/// ```
///
/// Credentials are never read from the file; they come from `--credentials` or
/// `INPUT_CREDENTIALS`. Values given on the command line or in the environment
/// take precedence over the file.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::inputs::RawInputs;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub filename: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "folderId", alias = "folder_id")]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "flag_as_string")]
    pub encoded: Option<String>,
    #[serde(default, deserialize_with = "flag_as_string")]
    pub overwrite: Option<String>,
    #[serde(
        default,
        rename = "toUnzip",
        alias = "to_unzip",
        deserialize_with = "flag_as_string"
    )]
    pub to_unzip: Option<String>,
}

/// Accepts both YAML booleans and strings, so `overwrite: false` and
/// `overwrite: "false"` mean the same; validation happens later.
fn flag_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(b) => b.to_string(),
        Flag::Text(s) => s,
    }))
}

impl From<FileConfig> for RawInputs {
    fn from(file: FileConfig) -> Self {
        RawInputs {
            filename: file.filename,
            name: file.name,
            folder_id: file.folder_id,
            credentials: None,
            encoded: file.encoded,
            overwrite: file.overwrite,
            to_unzip: file.to_unzip,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        e
    }).with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let config: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        e
    }).context("Failed to parse config YAML")?;

    info!(
        config_path = ?path_ref,
        filename = config.filename.as_deref().unwrap_or(""),
        folder_id = config.folder_id.as_deref().unwrap_or(""),
        "Config loaded successfully"
    );
    Ok(config)
}
