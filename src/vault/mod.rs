use std::path::{Component, Path, PathBuf};

/// Seam to the content store that owns the note tree.
///
/// The real store is a directory on disk (`FsVault`), but the pipeline only
/// ever talks to this trait, so tests can substitute a store with no
/// filesystem backing at all.
pub trait ContentStore {
    /// Absolute root of the store, or `None` when the store is not backed by
    /// a regular filesystem.
    fn root_path(&self) -> Option<PathBuf>;

    /// Resolves a store-relative folder path to an absolute path, without
    /// checking existence. `None` when the input would escape the root.
    fn resolve_folder(&self, relative: &str) -> Option<PathBuf>;
}

/// Filesystem-backed content store rooted at a vault directory.
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentStore for FsVault {
    fn root_path(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }

    fn resolve_folder(&self, relative: &str) -> Option<PathBuf> {
        sanitize_relative(relative).map(|rel| self.root.join(rel))
    }
}

/// Rejects absolute paths and any component that climbs above the root.
fn sanitize_relative(raw: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(raw.trim()).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(clean)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDestination {
    #[error("the output folder does not exist inside the vault")]
    NotFound,

    #[error("the chosen output folder is not a folder")]
    NotADirectory,

    #[error("the vault is not backed by a regular filesystem")]
    AdapterUnavailable,
}

/// Tri-state outcome surfaced to the settings UI: the check may still be in
/// flight (`Pending`), or have resolved one way or the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationStatus {
    Pending,
    Valid(PathBuf),
    Invalid(InvalidDestination),
}

impl DestinationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Checks that the configured destination folder exists and is a directory
/// inside the store.
///
/// Pure check with no side effects, resolved against the store root and
/// never the process working directory. Meant to run on every edit of the
/// destination-folder setting so misconfiguration surfaces before a capture
/// is ever attempted.
pub fn validate_destination(store: &dyn ContentStore, raw_path: &str) -> DestinationStatus {
    if store.root_path().is_none() {
        return DestinationStatus::Invalid(InvalidDestination::AdapterUnavailable);
    }

    let resolved = match store.resolve_folder(raw_path) {
        Some(path) => path,
        None => return DestinationStatus::Invalid(InvalidDestination::NotFound),
    };

    match std::fs::metadata(&resolved) {
        Ok(meta) if meta.is_dir() => DestinationStatus::Valid(resolved),
        Ok(_) => DestinationStatus::Invalid(InvalidDestination::NotADirectory),
        Err(_) => DestinationStatus::Invalid(InvalidDestination::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct UnbackedStore;

    impl ContentStore for UnbackedStore {
        fn root_path(&self) -> Option<PathBuf> {
            None
        }

        fn resolve_folder(&self, _relative: &str) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_valid_destination() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("attachments")).unwrap();

        let vault = FsVault::new(dir.path());
        let status = validate_destination(&vault, "attachments");

        assert_eq!(
            status,
            DestinationStatus::Valid(dir.path().join("attachments"))
        );
        assert!(status.is_valid());
    }

    #[test]
    fn test_missing_destination() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let vault = FsVault::new(dir.path());

        let status = validate_destination(&vault, "NotARealFolder");
        assert_eq!(
            status,
            DestinationStatus::Invalid(InvalidDestination::NotFound)
        );

        // Idempotent: repeated checks agree and leave nothing behind.
        assert_eq!(validate_destination(&vault, "NotARealFolder"), status);
        assert!(!dir.path().join("NotARealFolder").exists());
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("note.md"), "hello").unwrap();

        let vault = FsVault::new(dir.path());
        assert_eq!(
            validate_destination(&vault, "note.md"),
            DestinationStatus::Invalid(InvalidDestination::NotADirectory)
        );
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let vault = FsVault::new(dir.path());

        assert!(vault.resolve_folder("../outside").is_none());
        assert!(vault.resolve_folder("/etc").is_none());
        assert_eq!(
            validate_destination(&vault, "../outside"),
            DestinationStatus::Invalid(InvalidDestination::NotFound)
        );
    }

    #[test]
    fn test_root_itself_is_valid() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let vault = FsVault::new(dir.path());

        let status = validate_destination(&vault, "");
        assert_eq!(status, DestinationStatus::Valid(dir.path().to_path_buf()));
    }

    #[test]
    fn test_unbacked_store() {
        assert_eq!(
            validate_destination(&UnbackedStore, "anything"),
            DestinationStatus::Invalid(InvalidDestination::AdapterUnavailable)
        );
    }
}
