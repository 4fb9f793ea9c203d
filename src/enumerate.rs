use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ignore::{DirEntry, WalkBuilder};

use crate::descriptor::ExistenceClass;
use crate::error::TreeplanError;

// ---------------------------------------------------------------------------
// TargetKind
// ---------------------------------------------------------------------------

/// Which kind of entry an enumeration yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    File,
    Dir,
}

impl TargetKind {
    pub(crate) fn accepts(self, class: ExistenceClass) -> bool {
        matches!(
            (self, class),
            (Self::File, ExistenceClass::File) | (Self::Dir, ExistenceClass::Dir)
        )
    }
}

impl FromStr for TargetKind {
    type Err = TreeplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "file" => Ok(Self::File),
            "dir" | "directory" => Ok(Self::Dir),
            other => Err(TreeplanError::InvalidArgument(format!(
                "target must be \"file\" or \"dir\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Dir => "dir",
        })
    }
}

// ---------------------------------------------------------------------------
// Enumerator
// ---------------------------------------------------------------------------

/// A validated, re-walkable listing of the files or directories under a root.
///
/// The root is checked once in [`Enumerator::new`]. Each call to
/// [`walk()`](Enumerator::walk) starts a fresh, lazy traversal, so the same
/// enumerator can be iterated any number of times.
///
/// Yielded paths are `root.join(relative)`: absolute exactly when the root was
/// given absolute. The process working directory is never consulted.
///
/// Order follows the directory listing and is not sorted. Symlinks are
/// classified by their target and never descended into. A dangling symlink has
/// no target to classify, so it is yielded in neither mode; a Python
/// `os.walk` would list it among the files.
///
/// Unreadable entries met mid-walk are yielded as `Err` items and the walk
/// carries on with the next entry.
#[derive(Debug, Clone)]
pub struct Enumerator {
    root:      PathBuf,
    kind:      TargetKind,
    recursive: bool,
}

impl Enumerator {
    /// # Errors
    ///
    /// [`TreeplanError::NotFound`] if `root` does not exist,
    /// [`TreeplanError::NotADirectory`] if it exists but is not a directory.
    pub fn new(
        root: impl Into<PathBuf>,
        kind: TargetKind,
        recursive: bool,
    ) -> Result<Self, TreeplanError> {
        let root = root.into();
        let meta = fs::metadata(&root).map_err(|e| TreeplanError::from_io(&root, e))?;
        if !meta.is_dir() {
            return Err(TreeplanError::NotADirectory(root));
        }
        Ok(Self { root, kind, recursive })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Start a new traversal.
    pub fn walk(&self) -> Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .same_file_system(false);

        // Shallow mode: the root's immediate children only
        if !self.recursive {
            builder.max_depth(Some(1));
        }

        tracing::debug!(
            root = %self.root.display(),
            kind = %self.kind,
            recursive = self.recursive,
            "walking"
        );

        Walk {
            inner: builder.build(),
            kind:  self.kind,
        }
    }
}

impl<'a> IntoIterator for &'a Enumerator {
    type Item = Result<PathBuf, TreeplanError>;
    type IntoIter = Walk;

    fn into_iter(self) -> Walk {
        self.walk()
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Lazy iterator over one traversal. Created by [`Enumerator::walk`].
pub struct Walk {
    inner: ignore::Walk,
    kind:  TargetKind,
}

impl Iterator for Walk {
    type Item = Result<PathBuf, TreeplanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(map_ignore_error(e))),
            };

            // The root itself is never yielded
            if entry.depth() == 0 {
                continue;
            }

            if self.kind.accepts(classify(&entry)) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

fn classify(entry: &DirEntry) -> ExistenceClass {
    match entry.file_type() {
        Some(ft) if ft.is_dir() => ExistenceClass::Dir,
        Some(ft) if ft.is_file() => ExistenceClass::File,
        // Links are not followed by the walker; ask what they point at
        Some(ft) if ft.is_symlink() => ExistenceClass::of(entry.path()),
        _ => ExistenceClass::Absent,
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to TreeplanError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> TreeplanError {
    match e {
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => TreeplanError::from_io(path, io_err),
            other => TreeplanError::Io {
                path,
                source: io::Error::other(other.to_string()),
            },
        },
        ignore::Error::Loop { child, .. } => TreeplanError::Io {
            path:   child,
            source: io::Error::other("symlink loop"),
        },
        ignore::Error::Io(io_err) => TreeplanError::from_io(PathBuf::new(), io_err),
        other => TreeplanError::Io {
            path:   PathBuf::new(),
            source: io::Error::other(other.to_string()),
        },
    }
}
