use std::path::{Path, PathBuf};

use crate::descriptor::{ExistenceClass, PathDescriptor};
use crate::enumerate::{Enumerator, TargetKind};
use crate::error::TreeplanError;

/// One source entry and where it lands in the destination tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    /// The entry as enumerated under the source root.
    pub source_absolute: PathBuf,

    /// `source_absolute` with the source root stripped. Never starts or ends
    /// with a separator.
    pub source_relative: PathBuf,

    /// `dest_root.join(source_relative)`.
    pub dest_absolute: PathBuf,

    /// Parent of `dest_absolute`; the folder that must exist before the
    /// entry can be written there.
    pub dest_parent: PathBuf,
}

impl MappingEntry {
    fn new(source_root: &Path, dest_root: &Path, source_absolute: PathBuf) -> Self {
        // The walker only yields paths joined onto the root, so the prefix
        // is always present
        let source_relative = source_absolute
            .strip_prefix(source_root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let dest_absolute = dest_root.join(&source_relative);
        let dest_parent = dest_absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dest_root.to_path_buf());

        Self {
            source_absolute,
            source_relative,
            dest_absolute,
            dest_parent,
        }
    }

    /// A fresh descriptor of the source path, for filtering.
    pub fn describe_source(&self) -> PathDescriptor {
        PathDescriptor::new(&self.source_absolute)
    }
}

/// An immutable snapshot of every entry under a source root, paired with its
/// destination under another root.
///
/// The whole enumeration runs inside [`RelativeMapper::new`]. Copying or
/// archiving into the source tree afterwards cannot change what is iterated.
/// Changes made by other processes between the snapshot and its use are not
/// detected.
#[derive(Debug, Clone)]
pub struct RelativeMapper {
    source_root: PathBuf,
    dest_root:   PathBuf,
    kind:        TargetKind,
    recursive:   bool,
    entries:     Vec<MappingEntry>,
}

impl RelativeMapper {
    /// Validate both roots and snapshot the source tree.
    ///
    /// # Errors
    ///
    /// [`TreeplanError::InvalidArgument`] unless both roots currently exist as
    /// directories; nothing is enumerated in that case. If the walk hits an
    /// unreadable entry, that error is returned and no mapper is built.
    pub fn new(
        source_root: impl Into<PathBuf>,
        dest_root: impl Into<PathBuf>,
        kind: TargetKind,
        recursive: bool,
    ) -> Result<Self, TreeplanError> {
        let source_root = source_root.into();
        let dest_root = dest_root.into();

        for (label, root) in [("source", &source_root), ("destination", &dest_root)] {
            let class = ExistenceClass::of(root);
            if class != ExistenceClass::Dir {
                return Err(TreeplanError::InvalidArgument(format!(
                    "{label} root {} must be an existing directory (found {class})",
                    root.display()
                )));
            }
        }

        let enumerator = Enumerator::new(&source_root, kind, recursive)?;
        let entries = enumerator
            .walk()
            .map(|res| res.map(|src| MappingEntry::new(&source_root, &dest_root, src)))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            source = %source_root.display(),
            dest = %dest_root.display(),
            entries = entries.len(),
            "mapping snapshot taken"
        );

        Ok(Self {
            source_root,
            dest_root,
            kind,
            recursive,
            entries,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// The snapshot, in enumeration order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<MappingEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a RelativeMapper {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for RelativeMapper {
    type Item = MappingEntry;
    type IntoIter = std::vec::IntoIter<MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
