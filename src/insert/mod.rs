pub mod editor;

use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

pub use editor::{Cursor, EditorTarget, NoteFileEditor};

use crate::capture::{self, CaptureError, Orientation};
use crate::settings::PluginSettings;
use crate::transfer::{self, TransferError};
use crate::vault::{validate_destination, ContentStore, DestinationStatus, InvalidDestination};

/// Pipeline stage, for logs and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Capturing,
    Transferring,
    PostProcessing,
    Inserting,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Capturing => "capturing",
            Stage::Transferring => "transferring",
            Stage::PostProcessing => "post-processing",
            Stage::Inserting => "inserting",
        };
        f.write_str(name)
    }
}

/// A completed run: the drawing is staged in the vault and its reference has
/// been handed to the editor.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub file_name: String,
    pub final_path: PathBuf,
    /// Embed reference inserted at the cursor, e.g. `![[drawing-….png]]`.
    pub reference: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("destination folder check failed: {0}")]
    Destination(InvalidDestination),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// The drawing was captured and staged, but no editor cursor was
    /// available to insert the reference into. The staged file is kept —
    /// re-running a capture is expensive, losing the file is worse.
    #[error("no active editor target; drawing kept as {file_name}")]
    NoActiveTarget { file_name: String },

    /// Same preservation rule as `NoActiveTarget`: the staged file stays.
    #[error("failed to insert reference into the editor: {0}")]
    EditorWrite(#[source] std::io::Error),
}

impl InsertError {
    /// The stage the run failed in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Capture(_) => Stage::Capturing,
            Self::Destination(_) | Self::Transfer(_) => Stage::Transferring,
            Self::NoActiveTarget { .. } | Self::EditorWrite(_) => Stage::Inserting,
        }
    }
}

/// Orchestrates one capture-and-insert run.
///
/// Stages run strictly in sequence — Capturing, Transferring,
/// PostProcessing, then the editor insertion — and any failure
/// short-circuits the rest. Settings are taken by value at construction so a
/// run never observes a half-edited configuration.
pub struct Coordinator {
    settings: PluginSettings,
}

impl Coordinator {
    pub fn new(settings: PluginSettings) -> Self {
        Self { settings }
    }

    pub async fn run(
        &self,
        store: &dyn ContentStore,
        editor: &mut dyn EditorTarget,
        orientation: Orientation,
    ) -> Result<Insertion, InsertError> {
        let file_name = unique_file_name();
        let temp_path = std::env::temp_dir().join(&file_name);

        info!(stage = %Stage::Capturing, file = %file_name, "Inserting tablet drawing");
        let config = self.settings.capture_config(orientation);
        let captured = capture::capture(&config, &temp_path).await?;

        // Re-check the destination right before the copy, in case the
        // settings changed since the last proactive validation.
        info!(stage = %Stage::Transferring, "Capture complete, staging into vault");
        let destination = match validate_destination(store, &self.settings.output_path) {
            DestinationStatus::Valid(path) => path,
            DestinationStatus::Invalid(reason) => return Err(InsertError::Destination(reason)),
            DestinationStatus::Pending => {
                unreachable!("validate_destination never returns Pending")
            }
        };

        let outcome = transfer::stage(&captured.output_file, &destination, &file_name).await?;

        // Detached by contract: the reference below names the staged file
        // immediately and the post-processor overwrites it in place.
        if let Some(postprocessor) = self.settings.postprocessor() {
            info!(stage = %Stage::PostProcessing, tool = %postprocessor, "Spawning postprocessor");
            spawn_postprocessor(postprocessor, &outcome.final_path);
        }

        let reference = format!("![[{}]]", outcome.file_name);
        let cursor = editor
            .active_cursor()
            .ok_or_else(|| InsertError::NoActiveTarget {
                file_name: outcome.file_name.clone(),
            })?;
        editor
            .insert_at_cursor(cursor, &reference)
            .map_err(InsertError::EditorWrite)?;

        info!("Inserted drawing reference {}", reference);
        Ok(Insertion {
            file_name: outcome.file_name,
            final_path: outcome.final_path,
            reference,
        })
    }
}

/// Fire-and-forget: the post-processor's exit status is deliberately not
/// observed. It receives the staged file's absolute path as its sole
/// argument and is expected to overwrite the file in place.
fn spawn_postprocessor(program: &str, staged_file: &Path) {
    match Command::new(program).arg(staged_file).spawn() {
        Ok(_child) => info!(
            "Spawned postprocessor {} on {}",
            program,
            staged_file.display()
        ),
        Err(e) => warn!("Could not spawn postprocessor {}: {}", program, e),
    }
}

/// Timestamped name plus a random suffix so concurrent runs never collide in
/// the temp dir or the destination folder.
fn unique_file_name() -> String {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.png",
        crate::TEMP_FILE_PREFIX,
        timestamp,
        &suffix[..8]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_file_names_do_not_collide() {
        let a = unique_file_name();
        let b = unique_file_name();

        assert_ne!(a, b);
        assert!(a.starts_with(crate::TEMP_FILE_PREFIX));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_failure_stage_mapping() {
        let err = InsertError::Destination(InvalidDestination::NotFound);
        assert_eq!(err.stage(), Stage::Transferring);

        let err = InsertError::NoActiveTarget {
            file_name: "drawing.png".to_string(),
        };
        assert_eq!(err.stage(), Stage::Inserting);
        assert_eq!(Stage::Inserting.to_string(), "inserting");
    }
}
