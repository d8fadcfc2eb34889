pub mod types;

pub use types::Settings;

use crate::analyzer::doclint::OutputFormat;
use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".manifest-lint.toml";

/// Get the global settings file path (~/.manifest-lint.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local settings file path (<dir>/.manifest-lint.toml)
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Parse settings text. `origin` is only used in error messages.
pub fn parse_settings(text: &str, origin: &Path) -> Result<Settings> {
    let invalid = |message: String| ConfigError::Settings {
        path: origin.to_path_buf(),
        message,
    };

    let settings: Settings = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
    if let Some(format) = &settings.format {
        if OutputFormat::parse(format).is_none() {
            return Err(invalid(format!(
                "unknown format {:?} (allowed: plain, json, github)",
                format
            )));
        }
    }
    Ok(settings)
}

/// Read and parse one settings file.
pub fn read_settings(path: &Path) -> Result<Settings> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_settings(&text, path)
}

/// Load settings.
///
/// An explicit file must exist and parse. Otherwise the working directory's
/// file is tried, then the home directory's; a discovered file that fails to
/// parse is skipped with a warning.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return read_settings(path);
    }

    let candidates = std::env::current_dir()
        .ok()
        .map(|cwd| local_config_path(&cwd))
        .into_iter()
        .chain(global_config_path());

    for candidate in candidates {
        if !candidate.is_file() {
            continue;
        }
        match read_settings(&candidate) {
            Ok(settings) => {
                debug!("loaded settings from {}", candidate.display());
                return Ok(settings);
            }
            Err(e) => warn!("ignoring settings file: {}", e),
        }
    }

    Ok(Settings::default())
}
