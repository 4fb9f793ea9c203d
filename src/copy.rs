//! Mirroring filtered entries of a mapping snapshot into the destination tree.

use std::fs;
use std::path::Path;
use std::time::Instant;

use filetime::FileTime;

use crate::descriptor::ExistenceClass;
use crate::enumerate::TargetKind;
use crate::error::TreeplanError;
use crate::mapper::{MappingEntry, RelativeMapper};
use crate::results::CopyReport;
use crate::traits::Matcher;

/// Copy every entry of `mapper` that `filter` accepts to its destination.
///
/// Intermediate destination folders are created as needed. Failures are
/// collected per entry in the returned report.
pub fn copy_matching<M>(mapper: &RelativeMapper, filter: &M) -> CopyReport
where
    M: Matcher + ?Sized,
{
    let start = Instant::now();
    let mut report = CopyReport {
        scanned: mapper.len(),
        ..CopyReport::default()
    };

    for entry in mapper {
        if !filter.is_match(&entry.describe_source()) {
            tracing::trace!(path = %entry.source_absolute.display(), "filtered out");
            report.skipped += 1;
            continue;
        }

        match copy_entry(entry) {
            Ok(()) => report.copied += 1,
            Err(e) => {
                tracing::warn!(path = %entry.source_absolute.display(), error = %e, "copy failed");
                report.errors.push(e);
            }
        }
    }

    report.duration = start.elapsed();
    report
}

/// Copy one entry, creating its destination parent first.
///
/// A file is copied to `dest_absolute` keeping its modification time. A
/// directory is copied with all its contents, merging into whatever already
/// exists at `dest_absolute`; files already there are overwritten.
///
/// Symlinks inside a copied directory are not followed: a link to a folder
/// arrives as an empty folder, and a dangling link is left out.
///
/// # Errors
///
/// [`TreeplanError::NotFound`] if the source is gone,
/// [`TreeplanError::InvalidArgument`] if the destination is the source itself,
/// otherwise the classified IO error of the first failing operation.
pub fn copy_entry(entry: &MappingEntry) -> Result<(), TreeplanError> {
    match entry.describe_source().existence_class() {
        ExistenceClass::File => {
            ensure_dir(&entry.dest_parent)?;
            copy_file(&entry.source_absolute, &entry.dest_absolute)?;
            tracing::info!(
                from = %entry.source_absolute.display(),
                to = %entry.dest_absolute.display(),
                "copied file"
            );
        }
        ExistenceClass::Dir => {
            reject_same_path(&entry.source_absolute, &entry.dest_absolute)?;
            ensure_dir(&entry.dest_parent)?;
            copy_dir(&entry.source_absolute, &entry.dest_absolute)?;
            tracing::info!(
                from = %entry.source_absolute.display(),
                to = %entry.dest_absolute.display(),
                "copied dir"
            );
        }
        ExistenceClass::Absent => {
            return Err(TreeplanError::NotFound(entry.source_absolute.clone()));
        }
    }
    Ok(())
}

/// Create `dir` and any missing ancestors. An existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<(), TreeplanError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| TreeplanError::from_io(dir, e))?;
    tracing::debug!(dir = %dir.display(), "created");
    Ok(())
}

/// Fails when `dst` already resolves to `src`; copying would truncate it.
fn reject_same_path(src: &Path, dst: &Path) -> Result<(), TreeplanError> {
    let (Ok(src_real), Ok(dst_real)) = (fs::canonicalize(src), fs::canonicalize(dst)) else {
        return Ok(());
    };
    if src_real == dst_real {
        return Err(TreeplanError::InvalidArgument(format!(
            "source and destination are the same: {}",
            src.display()
        )));
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), TreeplanError> {
    reject_same_path(src, dst)?;
    fs::copy(src, dst).map_err(|e| TreeplanError::from_io(src, e))?;

    let meta = fs::metadata(src).map_err(|e| TreeplanError::from_io(src, e))?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
    .map_err(|e| TreeplanError::from_io(dst, e))
}

fn copy_dir(src: &Path, dst: &Path) -> Result<(), TreeplanError> {
    ensure_dir(dst)?;

    // Folders first so empty ones survive, then every file beneath
    for entry in RelativeMapper::new(src, dst, TargetKind::Dir, true)?.iter() {
        ensure_dir(&entry.dest_absolute)?;
    }
    for entry in RelativeMapper::new(src, dst, TargetKind::File, true)?.iter() {
        copy_file(&entry.source_absolute, &entry.dest_absolute)?;
    }
    Ok(())
}
