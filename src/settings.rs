use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::capture::{CaptureConfig, Orientation};
use crate::Result;

/// Persisted user configuration.
///
/// Loading merges the stored document over these defaults: present keys win,
/// missing keys fall back, unknown keys are ignored. Every field except the
/// credential reference is usable as-is on a cable-connected tablet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    /// Path to the external capture executable.
    pub capture_path: String,
    /// SSH key used to reach the tablet.
    pub credential_ref: String,
    pub device_address: String,
    /// Destination folder for staged drawings, relative to the vault root.
    pub output_path: String,
    /// Executable run over each staged drawing; empty disables it.
    pub postprocessor: String,
    /// Persisted for capture tools that support inversion; the pipeline
    /// itself never touches image content.
    pub invert_images: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            capture_path: crate::DEFAULT_CAPTURE_TOOL.to_string(),
            credential_ref: crate::DEFAULT_CREDENTIAL_REF.to_string(),
            device_address: crate::DEFAULT_DEVICE_ADDRESS.to_string(),
            output_path: String::new(),
            postprocessor: String::new(),
            invert_images: false,
        }
    }
}

impl PluginSettings {
    /// Builds the immutable per-invocation capture parameters.
    pub fn capture_config(&self, orientation: Orientation) -> CaptureConfig {
        CaptureConfig {
            capture_path: self.capture_path.clone(),
            credential_ref: self.credential_ref.clone(),
            device_address: self.device_address.clone(),
            orientation,
        }
    }

    pub fn postprocessor(&self) -> Option<&str> {
        let trimmed = self.postprocessor.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Explicit load/save pair around the settings file; no ambient global state.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the home directory: `~/.tablet-snap/settings.json`.
    pub fn default_location() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::SETTINGS_DIR_NAME)
            .join("settings.json");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge-with-defaults load; a missing file yields pure defaults. No
    /// validation happens here — the destination folder is checked reactively
    /// by the settings surface via `vault::validate_destination`.
    pub fn load(&self) -> Result<PluginSettings> {
        if !self.path.exists() {
            debug!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Ok(PluginSettings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persists immediately; called after every field edit.
    pub fn save(&self, settings: &PluginSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }
}
