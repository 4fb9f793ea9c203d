use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TreeplanError;

/// What a path currently is on disk.
///
/// Symlinks are classified by their target, so a link to a directory reports
/// [`ExistenceClass::Dir`] and a dangling link reports [`ExistenceClass::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExistenceClass {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// Nothing there, or something that is neither a file nor a directory.
    Absent,
}

impl ExistenceClass {
    /// Query the filesystem for the class of `path`.
    pub fn of(path: impl AsRef<Path>) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Self::Dir,
            Ok(meta) if meta.is_file() => Self::File,
            _ => Self::Absent,
        }
    }
}

impl fmt::Display for ExistenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Absent => "absent",
        })
    }
}

/// A single filesystem path with on-demand metadata.
///
/// Construction never touches the disk and never fails: absence is a state
/// you can ask about, not an error. Every metadata query goes back to the
/// filesystem, so answers reflect the tree at the time of the call and not
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathDescriptor {
    path: PathBuf,
}

impl PathDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File, directory or absent, as of now.
    pub fn existence_class(&self) -> ExistenceClass {
        ExistenceClass::of(&self.path)
    }

    /// Modification time in seconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// [`TreeplanError::NotFound`] if the path does not currently exist,
    /// or the classified IO error if its metadata cannot be read.
    pub fn mod_time(&self) -> Result<f64, TreeplanError> {
        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| TreeplanError::from_io(&self.path, e))?;
        Ok(epoch_seconds(modified))
    }

    /// Final path segment, or an empty string when there is none (e.g. `/`).
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The path with its final segment removed; empty for a bare name or root.
    pub fn parent_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Upper-cased extension including the leading dot, e.g. `report.tsv` gives `.TSV`.
    ///
    /// Empty when the name has no extension. A leading dot alone does not count
    /// as one, so `.bashrc` also gives an empty string. Only meaningful for files.
    pub fn extension_upper(&self) -> String {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_uppercase()))
            .unwrap_or_default()
    }
}

impl From<&Path> for PathDescriptor {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<PathBuf> for PathDescriptor {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

pub(crate) fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

/// Order `paths` by modification time, oldest first. Ties are broken by path.
///
/// Enumeration order is whatever the directory listing gives; use this when
/// something has to be processed in age order.
///
/// # Errors
///
/// Fails on the first path whose modification time cannot be read.
pub fn sort_by_modified<I, P>(paths: I) -> Result<Vec<PathBuf>, TreeplanError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut stamped = paths
        .into_iter()
        .map(|p| {
            let desc = PathDescriptor::new(p);
            desc.mod_time().map(|t| (t, desc.path))
        })
        .collect::<Result<Vec<_>, _>>()?;

    stamped.sort_by(|(ta, pa), (tb, pb)| ta.total_cmp(tb).then_with(|| pa.cmp(pb)));
    Ok(stamped.into_iter().map(|(_, p)| p).collect())
}
