//! # treeplan
//!
//! Relative-path traversal planner and composable entry filters.
//!
//! treeplan walks a source tree and pairs every file or folder it finds with
//! the place it would land under a destination root. A filter assembled from a
//! small catalog of tests decides which of those entries an operation (copy,
//! archive, search) actually touches. The pieces are plain library types; the
//! `treeplan` binary is one interactive copy command built on top of them.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use treeplan::{Combinator, Matcher, TargetKind};
//!
//! let src = tempfile::tempdir().unwrap();
//! let dst = tempfile::tempdir().unwrap();
//! fs::create_dir(src.path().join("2024")).unwrap();
//! fs::write(src.path().join("2024").join("invoice_jan.xml"), "<x/>").unwrap();
//! fs::write(src.path().join("2024").join("notes.md"), "n").unwrap();
//!
//! let mapping = treeplan::build_mapping(src.path(), dst.path(), TargetKind::File, true).unwrap();
//! let keep = treeplan::build_predicate(
//!     [treeplan::Selection::BaseNameRegex("invoice".into())],
//!     Combinator::All,
//! )
//! .unwrap();
//!
//! let picked: Vec<_> = mapping
//!     .iter()
//!     .filter(|e| keep.is_match(&e.describe_source()))
//!     .collect();
//!
//! assert_eq!(picked.len(), 1);
//! assert_eq!(picked[0].dest_absolute, dst.path().join("2024").join("invoice_jan.xml"));
//! ```
//!
//! # Custom Filters
//!
//! Any closure over a [`PathDescriptor`] is a [`Matcher`], so a built
//! [`Predicate`] can be combined with caller logic:
//!
//! ```rust
//! use treeplan::{Matcher, PathDescriptor, Predicate};
//!
//! let regex = Predicate::builder().full_path_regex("/data/").build().unwrap();
//! let xml_under_data = |d: &PathDescriptor| regex.is_match(d) && d.extension_upper() == ".XML";
//!
//! assert!(xml_under_data.is_match(&PathDescriptor::new("/data/feed.xml")));
//! assert!(!xml_under_data.is_match(&PathDescriptor::new("/tmp/feed.xml")));
//! ```

#![forbid(unsafe_code)]

pub mod copy;
pub mod datetime;
pub mod prompt;

mod descriptor;
mod enumerate;
mod error;
mod mapper;
mod predicate;
mod results;
mod traits;

use std::path::PathBuf;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use descriptor::{sort_by_modified, ExistenceClass, PathDescriptor};
pub use enumerate::{Enumerator, TargetKind, Walk};
pub use error::TreeplanError;
pub use mapper::{MappingEntry, RelativeMapper};
pub use predicate::{Combinator, Predicate, PredicateBuilder, Selection, Test};
pub use prompt::Prompt;
pub use results::CopyReport;
pub use traits::Matcher;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Describe a path. Never touches the disk and never fails.
pub fn describe(path: impl Into<PathBuf>) -> PathDescriptor {
    PathDescriptor::new(path)
}

/// List the files or folders under `root`, all the way down or one level deep.
///
/// The returned [`Enumerator`] is lazy and can be walked any number of times.
///
/// # Errors
///
/// [`TreeplanError::NotFound`] or [`TreeplanError::NotADirectory`] when `root`
/// is not an existing directory.
///
/// # Example
///
/// ```rust
/// use treeplan::TargetKind;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("a.txt"), "a").unwrap();
///
/// let files = treeplan::enumerate(dir.path(), TargetKind::File, false).unwrap();
/// let paths: Vec<_> = files.walk().collect::<Result<_, _>>().unwrap();
/// assert_eq!(paths, vec![dir.path().join("a.txt")]);
/// ```
pub fn enumerate(
    root: impl Into<PathBuf>,
    kind: TargetKind,
    recursive: bool,
) -> Result<Enumerator, TreeplanError> {
    Enumerator::new(root, kind, recursive)
}

/// Snapshot `source_root` and pair each entry with its place under `dest_root`.
///
/// # Errors
///
/// [`TreeplanError::InvalidArgument`] unless both roots are existing
/// directories. See [`RelativeMapper::new`].
pub fn build_mapping(
    source_root: impl Into<PathBuf>,
    dest_root: impl Into<PathBuf>,
    kind: TargetKind,
    recursive: bool,
) -> Result<RelativeMapper, TreeplanError> {
    RelativeMapper::new(source_root, dest_root, kind, recursive)
}

/// Compile catalog selections into one predicate.
///
/// An empty selection list gives a predicate that accepts everything.
///
/// # Errors
///
/// [`TreeplanError::InvalidArgument`] on a malformed regex or date; no
/// predicate is produced in that case.
pub fn build_predicate(
    selections: impl IntoIterator<Item = Selection>,
    combinator: Combinator,
) -> Result<Predicate, TreeplanError> {
    selections
        .into_iter()
        .fold(Predicate::builder(), PredicateBuilder::select)
        .combinator(combinator)
        .build()
}
