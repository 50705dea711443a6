use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Result, WrapErr, eyre};

use crate::config::models::ControlPlaneConfig;

/// Load a control plane configuration file.
///
/// The format follows the extension: `.toml`, `.yaml`/`.yml` or `.json`.
pub async fn load_config(path: impl AsRef<Path>) -> Result<ControlPlaneConfig> {
    load_config_sync(path)
}

pub fn load_config_sync(path: impl AsRef<Path>) -> Result<ControlPlaneConfig> {
    let path = path.as_ref();
    let format = format_for(path)?;
    let name = path
        .to_str()
        .ok_or_else(|| eyre!("Config path {} is not valid UTF-8", path.display()))?;

    Config::builder()
        .add_source(File::new(name, format))
        .build()
        .wrap_err_with(|| format!("Failed to read {} as {format:?}", path.display()))?
        .try_deserialize::<ControlPlaneConfig>()
        .wrap_err_with(|| format!("{} is not a valid xds-forge config", path.display()))
}

fn format_for(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => Ok(FileFormat::Toml),
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        other => Err(eyre!(
            "Unsupported config extension {:?} for {} (use .toml, .yaml, .yml or .json)",
            other.unwrap_or(""),
            path.display()
        )),
    }
}
