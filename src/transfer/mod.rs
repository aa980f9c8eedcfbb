use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::vault::InvalidDestination;

#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub final_path: PathBuf,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The temp file vanished between capture and transfer.
    #[error("captured file disappeared before it could be staged")]
    SourceMissing,

    /// The destination check failed at transfer time, e.g. the folder was
    /// reconfigured or removed after the last proactive validation.
    #[error("destination folder is not usable: {0}")]
    DestinationInvalid(InvalidDestination),

    #[error("failed to copy drawing into the vault: {0}")]
    CopyFailed(#[source] std::io::Error),
}

/// Copies the captured temp file into the destination folder, then removes
/// the temp file.
///
/// The copy is all-or-nothing from the caller's point of view: a failed copy
/// removes any partial destination file before returning. Temp-file deletion
/// after a successful copy is best effort only — at that point the
/// user-visible operation has already succeeded, so a stuck temp file is
/// worth a warning and nothing more.
pub async fn stage(
    temp_file: &Path,
    destination_dir: &Path,
    file_name: &str,
) -> Result<TransferOutcome, TransferError> {
    match fs::metadata(temp_file).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(TransferError::SourceMissing),
    }

    match fs::metadata(destination_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(TransferError::DestinationInvalid(
                InvalidDestination::NotADirectory,
            ))
        }
        Err(_) => {
            return Err(TransferError::DestinationInvalid(
                InvalidDestination::NotFound,
            ))
        }
    }

    let final_path = destination_dir.join(file_name);
    if let Err(e) = fs::copy(temp_file, &final_path).await {
        // Never leave a half-written drawing behind.
        let _ = fs::remove_file(&final_path).await;
        return Err(TransferError::CopyFailed(e));
    }

    info!("Staged drawing: {}", final_path.display());

    match fs::remove_file(temp_file).await {
        Ok(_) => info!("Deleted temporary file: {}", temp_file.display()),
        Err(e) => warn!(
            "Could not delete temporary file {}: {}",
            temp_file.display(),
            e
        ),
    }

    Ok(TransferOutcome {
        final_path,
        file_name: file_name.to_string(),
    })
}
