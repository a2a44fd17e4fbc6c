//! Engine settings persistence.
//!
//! Settings live in a JSON file chosen by the embedding application.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::Result;

/// Persisted engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Maximum number of completed, failed or cancelled operations to retain.
    ///
    /// `None`, the default, keeps every operation for the lifetime of the
    /// process.
    pub keep_last_operations: Option<usize>,
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings<P: AsRef<Path>>(path: P) -> EngineSettings {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings file {}: {e}", path.display());
            EngineSettings::default()
        }),
        Err(_) => EngineSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`crate::BulkError::Io`] if the directory or file cannot be written.
pub fn save_settings<P: AsRef<Path>>(path: P, settings: &EngineSettings) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(dir.path().join("nope.json"));
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.keep_last_operations, None);
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), EngineSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = EngineSettings {
            keep_last_operations: Some(25),
        };

        save_settings(&path, &settings).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("keepLastOperations"));
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(load_settings(&path).keep_last_operations, None);

        std::fs::write(&path, r#"{"keepLastOperations": 3}"#).unwrap();
        assert_eq!(load_settings(&path).keep_last_operations, Some(3));
    }
}
