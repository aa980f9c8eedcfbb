use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Page orientation of the drawing on the tablet.
///
/// Carried in the configuration so callers can decide on an
/// orientation-specific post-rotation step; the invoker itself passes no
/// orientation argument to the capture tool, which keeps the external
/// contract stable across tool versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Immutable per-invocation capture parameters, built fresh from persisted
/// settings at call time.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Path to the external capture executable (e.g. reSnap.sh).
    pub capture_path: String,
    /// SSH key path or other credential used to reach the device.
    pub credential_ref: String,
    pub device_address: String,
    pub orientation: Orientation,
}

/// Successful capture: the tool exited 0 and wrote the requested file.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub output_file: PathBuf,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The capture executable itself could not be found. Kept separate from
    /// `ToolFailed` so callers can tell a broken install from a broken
    /// connection.
    #[error("capture tool not found at {path}")]
    ToolNotFound { path: String },

    #[error("capture tool exited with code {exit_code}: {stderr}")]
    ToolFailed {
        exit_code: i32,
        /// Exact command line, for diagnostics.
        command: String,
        stdout: String,
        stderr: String,
    },

    #[error("failed to run capture tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the external capture tool once and waits for it to exit.
///
/// Both output streams are accumulated fully before the call resolves;
/// nothing downstream consumes them incrementally. A single attempt per call
/// with no timeout — retry policy, if any, belongs to the caller.
pub async fn capture(
    config: &CaptureConfig,
    output_path: &Path,
) -> Result<CaptureResult, CaptureError> {
    let args = [
        "-k".to_string(),
        config.credential_ref.clone(),
        "-n".to_string(),
        "-o".to_string(),
        output_path.display().to_string(),
    ];

    info!(
        tool = %config.capture_path,
        device = %config.device_address,
        output = %output_path.display(),
        "Taking snapshot from tablet"
    );

    let output = match Command::new(&config.capture_path).args(&args).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CaptureError::ToolNotFound {
                path: config.capture_path.clone(),
            });
        }
        Err(e) => return Err(CaptureError::Io(e)),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        debug!("Capture tool output: {}", stdout);
        Ok(CaptureResult {
            output_file: output_path.to_path_buf(),
            stdout,
            stderr,
        })
    } else {
        // Killed-by-signal leaves no exit code; report -1 in that case.
        let exit_code = output.status.code().unwrap_or(-1);
        let command = format!("{} {}", config.capture_path, args.join(" "));
        Err(CaptureError::ToolFailed {
            exit_code,
            command,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_default_and_serde() {
        assert_eq!(Orientation::default(), Orientation::Portrait);

        let json = serde_json::to_string(&Orientation::Landscape).unwrap();
        assert_eq!(json, "\"landscape\"");

        let parsed: Orientation = serde_json::from_str("\"portrait\"").unwrap();
        assert_eq!(parsed, Orientation::Portrait);
    }

    #[test]
    fn test_tool_failed_display_carries_stderr() {
        let err = CaptureError::ToolFailed {
            exit_code: 1,
            command: "reSnap.sh -k key -n -o /tmp/out.png".to_string(),
            stdout: String::new(),
            stderr: "device unreachable".to_string(),
        };

        let rendered = err.to_string();
        assert!(rendered.contains("code 1"));
        assert!(rendered.contains("device unreachable"));
    }
}
