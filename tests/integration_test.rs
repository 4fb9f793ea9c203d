use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use proptest::prelude::*;
use treeplan::{
    build_mapping, build_predicate, describe, enumerate, sort_by_modified, Combinator, Matcher,
    PathDescriptor, Predicate, Selection, TargetKind, Test, TreeplanError,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a temporary directory tree for testing.
///
/// Structure:
/// ```
/// tmp/
///   invoice_jan.txt
///   invoice_feb.txt
///   report.txt
///   notes.md
///   subdir/
///     invoice_mar.txt
///     other.rs
///     deeper/
///       data.xml
/// ```
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("invoice_jan.txt"), "january invoice").unwrap();
    fs::write(root.join("invoice_feb.txt"), "february invoice").unwrap();
    fs::write(root.join("report.txt"), "quarterly report").unwrap();
    fs::write(root.join("notes.md"), "some notes").unwrap();

    let sub = root.join("subdir");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("invoice_mar.txt"), "march invoice").unwrap();
    fs::write(sub.join("other.rs"), "fn main() {}").unwrap();

    let deeper = sub.join("deeper");
    fs::create_dir(&deeper).unwrap();
    fs::write(deeper.join("data.xml"), "<data/>").unwrap();

    dir
}

fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0)).unwrap();
}

fn walk_set(root: &Path, kind: TargetKind, recursive: bool) -> BTreeSet<PathBuf> {
    enumerate(root, kind, recursive)
        .unwrap()
        .walk()
        .map(Result::unwrap)
        .collect()
}

const MODES: [(TargetKind, bool); 4] = [
    (TargetKind::File, true),
    (TargetKind::File, false),
    (TargetKind::Dir, true),
    (TargetKind::Dir, false),
];

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

#[test]
fn recursive_and_shallow_enumeration() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    fs::create_dir_all(a.join("b")).unwrap();
    fs::write(a.join("x.txt"), "x").unwrap();
    fs::write(a.join("b").join("y.txt"), "y").unwrap();

    let recursive = walk_set(dir.path(), TargetKind::File, true);
    let expected: BTreeSet<_> = [a.join("x.txt"), a.join("b").join("y.txt")].into();
    assert_eq!(recursive, expected);

    let shallow = walk_set(&a, TargetKind::File, false);
    assert_eq!(shallow, [a.join("x.txt")].into());
}

#[test]
fn recursive_enumeration_agrees_with_walkdir() {
    let dir = setup_test_dir();

    let oracle = |want_dir: bool| -> BTreeSet<PathBuf> {
        walkdir::WalkDir::new(dir.path())
            .min_depth(1)
            .into_iter()
            .map(Result::unwrap)
            .filter(|e| e.file_type().is_dir() == want_dir)
            .map(walkdir::DirEntry::into_path)
            .collect()
    };

    assert_eq!(walk_set(dir.path(), TargetKind::File, true), oracle(false));
    assert_eq!(walk_set(dir.path(), TargetKind::Dir, true), oracle(true));
    assert_eq!(walk_set(dir.path(), TargetKind::File, true).len(), 7);
}

#[test]
fn enumerate_rejects_bad_roots() {
    let dir = setup_test_dir();
    assert!(matches!(
        enumerate(dir.path().join("missing"), TargetKind::File, true),
        Err(TreeplanError::NotFound(_))
    ));
    assert!(matches!(
        enumerate(dir.path().join("notes.md"), TargetKind::File, true),
        Err(TreeplanError::NotADirectory(_))
    ));
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[test]
fn mapping_stays_inside_both_roots() {
    let src = setup_test_dir();
    let dst = tempfile::tempdir().unwrap();

    for (kind, recursive) in MODES {
        let mapping = build_mapping(src.path(), dst.path(), kind, recursive).unwrap();
        assert!(!mapping.is_empty(), "{kind} recursive={recursive}");

        for e in &mapping {
            assert!(e.source_absolute.starts_with(src.path()));
            assert!(e.dest_absolute.starts_with(dst.path()));
            assert_eq!(e.dest_absolute, dst.path().join(&e.source_relative));
            assert_eq!(e.dest_parent, e.dest_absolute.parent().unwrap());
            assert!(e.source_relative.is_relative());
            assert!(!e.source_relative.as_os_str().is_empty());
        }
    }
}

#[test]
fn relative_path_round_trips() {
    let src = setup_test_dir();
    let dst = tempfile::tempdir().unwrap();
    let sep = std::path::MAIN_SEPARATOR;

    let mapping = build_mapping(src.path(), dst.path(), TargetKind::File, true).unwrap();
    for e in &mapping {
        let abs = e.source_absolute.to_string_lossy();
        let root = src.path().to_string_lossy();
        let stripped = abs.strip_prefix(root.as_ref()).unwrap().trim_matches(sep);
        assert_eq!(Path::new(stripped), e.source_relative);
    }
}

#[test]
fn mapping_is_idempotent() {
    let src = setup_test_dir();
    let dst = tempfile::tempdir().unwrap();

    for (kind, recursive) in MODES {
        let first: BTreeSet<_> = build_mapping(src.path(), dst.path(), kind, recursive)
            .unwrap()
            .into_entries()
            .into_iter()
            .map(|e| e.source_relative)
            .collect();
        let second: BTreeSet<_> = build_mapping(src.path(), dst.path(), kind, recursive)
            .unwrap()
            .into_iter()
            .map(|e| e.source_relative)
            .collect();
        assert_eq!(first, second);
    }
}

#[test]
fn shallow_dir_mapping() {
    let src = setup_test_dir();
    let dst = tempfile::tempdir().unwrap();

    let mapping = build_mapping(src.path(), dst.path(), TargetKind::Dir, false).unwrap();
    assert_eq!(mapping.len(), 1);
    let e = &mapping.entries()[0];
    assert_eq!(e.source_relative, PathBuf::from("subdir"));
    assert_eq!(e.dest_parent, dst.path());
}

#[test]
fn mapping_rejects_missing_source_before_walking() {
    let dst = tempfile::tempdir().unwrap();
    let missing = dst.path().join("never-created");

    let err = build_mapping(&missing, dst.path(), TargetKind::File, true).unwrap_err();
    assert!(matches!(err, TreeplanError::InvalidArgument(_)));
    assert!(err.to_string().contains("source root"));
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

#[test]
fn empty_catalog_accepts_everything() {
    for c in [Combinator::All, Combinator::Any] {
        let p = build_predicate([], c).unwrap();
        assert!(p.is_match(&describe("/no/such/path")));
        assert!(p.is_match(&describe("")));
    }
}

#[test]
fn min_mtime_filters_by_exclusive_bound() {
    let dir = tempfile::tempdir().unwrap();
    for secs in [100, 200, 300] {
        let f = dir.path().join(format!("{secs}.dat"));
        fs::write(&f, "").unwrap();
        set_mtime(&f, secs);
    }

    let p = build_predicate([Selection::MinModTime(150.0)], Combinator::All).unwrap();
    let accepted: BTreeSet<_> = walk_set(dir.path(), TargetKind::File, false)
        .into_iter()
        .filter(|path| p.is_match(&describe(path.as_path())))
        .map(|path| describe(path).base_name())
        .collect();

    assert_eq!(accepted, ["200.dat".to_string(), "300.dat".to_string()].into());
}

#[test]
fn date_selection_window() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("old.txt");
    let new = dir.path().join("new.txt");
    fs::write(&old, "").unwrap();
    fs::write(&new, "").unwrap();
    set_mtime(&old, treeplan::datetime::parse_timestamp("2001/01/01").unwrap() as i64);
    set_mtime(&new, treeplan::datetime::parse_timestamp("2020/06/15").unwrap() as i64);

    let window = Predicate::builder()
        .modified_after("2010/01/01")
        .modified_before("2030/01/01 00:00:00")
        .build()
        .unwrap();

    assert!(window.is_match(&describe(&new)));
    assert!(!window.is_match(&describe(&old)));
}

#[test]
fn invalid_selections_never_build() {
    for bad in [
        Selection::BaseNameRegex("[".into()),
        Selection::FullPathRegex("a{2,1}".into()),
        Selection::ModifiedAfter("31/31/2020".into()),
        Selection::ModifiedBefore("".into()),
    ] {
        let err = build_predicate([bad.clone()], Combinator::Any).unwrap_err();
        assert!(matches!(err, TreeplanError::InvalidArgument(_)), "{bad:?}");
    }
}

#[test]
fn filter_over_mapping() {
    let src = setup_test_dir();
    let dst = tempfile::tempdir().unwrap();

    let invoices_or_xml = build_predicate(
        [
            Selection::BaseNameRegex("invoice_".into()),
            Selection::FullPathRegex(r".*\.xml$".into()),
        ],
        Combinator::Any,
    )
    .unwrap();

    let mapping = build_mapping(src.path(), dst.path(), TargetKind::File, true).unwrap();
    let picked: BTreeSet<_> = mapping
        .iter()
        .filter(|e| invoices_or_xml.is_match(&e.describe_source()))
        .map(|e| e.source_relative.clone())
        .collect();

    let expected: BTreeSet<PathBuf> = [
        PathBuf::from("invoice_jan.txt"),
        PathBuf::from("invoice_feb.txt"),
        Path::new("subdir").join("invoice_mar.txt"),
        Path::new("subdir").join("deeper").join("data.xml"),
    ]
    .into();
    assert_eq!(picked, expected);
}

#[test]
fn closures_are_matchers() {
    let is_xml = |d: &PathDescriptor| d.extension_upper() == ".XML";
    let p = Predicate::new(vec![Test::base_name_regex("data").unwrap()], Combinator::All);
    let both = |d: &PathDescriptor| is_xml.is_match(d) && p.is_match(d);

    assert!(both.is_match(&describe("/x/data.xml")));
    assert!(!both.is_match(&describe("/x/data.json")));
}

proptest! {
    #[test]
    fn all_and_any_follow_their_truth_tables(outcomes in prop::collection::vec(any::<bool>(), 1..6)) {
        // "^" always matches at the start; "$^" never does on a non-empty name
        let tests: Vec<Test> = outcomes
            .iter()
            .map(|pass| Test::base_name_regex(if *pass { "^" } else { "$^" }).unwrap())
            .collect();
        let d = describe("/some/file.txt");

        let all = Predicate::new(tests.clone(), Combinator::All);
        let any = Predicate::new(tests, Combinator::Any);
        prop_assert_eq!(all.is_match(&d), outcomes.iter().all(|b| *b));
        prop_assert_eq!(any.is_match(&d), outcomes.iter().any(|b| *b));
    }
}

// ---------------------------------------------------------------------------
// Ordering helper
// ---------------------------------------------------------------------------

#[test]
fn sort_by_modified_is_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let names = [("c", 300), ("a", 100), ("b", 200)];
    for (name, secs) in names {
        let f = dir.path().join(name);
        fs::write(&f, "").unwrap();
        set_mtime(&f, secs);
    }

    let sorted = sort_by_modified(walk_set(dir.path(), TargetKind::File, false)).unwrap();
    let order: Vec<_> = sorted.iter().map(|p| describe(p.as_path()).base_name()).collect();
    assert_eq!(order, ["a", "b", "c"]);

    let missing = sort_by_modified([dir.path().join("gone")]);
    assert!(matches!(missing, Err(TreeplanError::NotFound(_))));
}
