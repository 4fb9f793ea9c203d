use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeplanError {
    // Filesystem state
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    // Construction
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Runtime
    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Interactive input
    #[error("prompt channel failed")]
    Prompt(#[source] io::Error),
}

impl TreeplanError {
    /// Classify an `io::Error` raised while touching `path`.
    ///
    /// `NotFound` and `PermissionDenied` get their own variants so callers can
    /// report them without digging into the source error.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source: err },
        }
    }

    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::InvalidArgument(_) | Self::Prompt(_) => None,
        }
    }

    /// Whether a run can continue after this error.
    ///
    /// Per-entry failures, such as a file vanishing after the snapshot, are
    /// recorded and the run keeps going.
    /// Contract violations (`InvalidArgument`, `NotADirectory`) and a closed
    /// prompt are fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::PermissionDenied(_) | Self::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_classified_by_kind() {
        let err = TreeplanError::from_io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, TreeplanError::NotFound(ref p) if p == Path::new("/x")));

        let err = TreeplanError::from_io("/y", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, TreeplanError::PermissionDenied(_)));

        let err = TreeplanError::from_io("/z", io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(err, TreeplanError::Io { .. }));
        assert_eq!(err.path().map(PathBuf::as_path), Some(Path::new("/z")));
    }

    #[test]
    fn contract_violations_are_not_recoverable() {
        assert!(!TreeplanError::InvalidArgument("bad".into()).is_recoverable());
        assert!(!TreeplanError::NotADirectory("/f".into()).is_recoverable());
        assert!(TreeplanError::NotFound("/gone".into()).is_recoverable());
        assert!(TreeplanError::InvalidArgument("bad".into()).path().is_none());
    }
}
