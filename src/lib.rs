pub mod capture;
pub mod insert;
pub mod settings;
pub mod transfer;
pub mod vault;

use thiserror::Error;

/// Errors from the crate's own persistence surface. Pipeline stages carry
/// their own typed errors (`CaptureError`, `TransferError`, `InsertError`).
#[derive(Error, Debug)]
pub enum SnapError {
    #[error("File operation error: {0}")]
    FileOperation(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SnapError>;

pub const DEFAULT_DEVICE_ADDRESS: &str = "10.11.99.1";
pub const DEFAULT_CAPTURE_TOOL: &str = "reSnap.sh";
pub const DEFAULT_CREDENTIAL_REF: &str = "~/.ssh/remarkable";
pub const SETTINGS_DIR_NAME: &str = ".tablet-snap";
pub const TEMP_FILE_PREFIX: &str = "drawing";

#[cfg(test)]
mod main_test;
