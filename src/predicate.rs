use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::datetime::parse_timestamp;
use crate::descriptor::PathDescriptor;
use crate::error::TreeplanError;
use crate::traits::Matcher;

// ---------------------------------------------------------------------------
// Elementary tests
// ---------------------------------------------------------------------------

/// One self-contained check over a [`PathDescriptor`].
///
/// Regex tests are case-insensitive and must match at the start of the tested
/// string, not merely somewhere inside it. Timestamp bounds are exclusive and
/// in seconds since the Unix epoch.
#[derive(Debug, Clone)]
pub enum Test {
    /// Regex against the final path segment only.
    BaseNameRegex(Regex),

    /// Regex against the whole path string as enumerated.
    FullPathRegex(Regex),

    /// Passes when the path was modified strictly after the bound.
    MinModTime(f64),

    /// Passes when the path was modified strictly before the bound.
    MaxModTime(f64),
}

impl Test {
    /// # Errors
    ///
    /// [`TreeplanError::InvalidArgument`] if `pattern` is not a valid regex.
    pub fn base_name_regex(pattern: &str) -> Result<Self, TreeplanError> {
        compile(pattern).map(Self::BaseNameRegex)
    }

    /// # Errors
    ///
    /// [`TreeplanError::InvalidArgument`] if `pattern` is not a valid regex.
    pub fn full_path_regex(pattern: &str) -> Result<Self, TreeplanError> {
        compile(pattern).map(Self::FullPathRegex)
    }
}

impl Matcher for Test {
    fn is_match(&self, desc: &PathDescriptor) -> bool {
        match self {
            Self::BaseNameRegex(re) => matches_at_start(re, &desc.base_name()),
            Self::FullPathRegex(re) => matches_at_start(re, &desc.path().to_string_lossy()),
            Self::MinModTime(bound) => mod_time_passes(desc, |t| t > *bound),
            Self::MaxModTime(bound) => mod_time_passes(desc, |t| t < *bound),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, TreeplanError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| TreeplanError::InvalidArgument(format!("invalid regex {pattern:?}: {e}")))
}

// The leftmost match starts at 0 exactly when some match starts at 0
fn matches_at_start(re: &Regex, haystack: &str) -> bool {
    re.find(haystack).is_some_and(|m| m.start() == 0)
}

fn mod_time_passes(desc: &PathDescriptor, check: impl Fn(f64) -> bool) -> bool {
    match desc.mod_time() {
        Ok(t) => check(t),
        Err(e) => {
            tracing::trace!(error = %e, "timestamp test rejected unreadable path");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Combinator
// ---------------------------------------------------------------------------

/// How the results of several tests reduce to one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every test must pass.
    #[default]
    All,

    /// At least one test must pass.
    Any,
}

impl FromStr for Combinator {
    type Err = TreeplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "all" => Ok(Self::All),
            "0" | "any" => Ok(Self::Any),
            other => Err(TreeplanError::InvalidArgument(format!(
                "combinator must be 1/all or 0/any, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Any => "any",
        })
    }
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// A catalog of [`Test`]s reduced with one [`Combinator`].
///
/// An empty catalog accepts everything, including paths that do not exist.
/// Tests are evaluated in catalog order and evaluation short-circuits.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    tests:      Vec<Test>,
    combinator: Combinator,
}

impl Predicate {
    pub fn new(tests: Vec<Test>, combinator: Combinator) -> Self {
        Self { tests, combinator }
    }

    /// The empty catalog.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn builder() -> PredicateBuilder {
        PredicateBuilder::default()
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl Matcher for Predicate {
    fn is_match(&self, desc: &PathDescriptor) -> bool {
        if self.tests.is_empty() {
            return true;
        }
        match self.combinator {
            Combinator::All => self.tests.iter().all(|t| t.is_match(desc)),
            Combinator::Any => self.tests.iter().any(|t| t.is_match(desc)),
        }
    }
}

// ---------------------------------------------------------------------------
// Selections and builder
// ---------------------------------------------------------------------------

/// Raw, not yet validated input for one catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    BaseNameRegex(String),
    FullPathRegex(String),
    /// Date string in one of the [`supported_formats`](crate::datetime::supported_formats).
    ModifiedAfter(String),
    /// Date string in one of the [`supported_formats`](crate::datetime::supported_formats).
    ModifiedBefore(String),
    /// Epoch seconds.
    MinModTime(f64),
    /// Epoch seconds.
    MaxModTime(f64),
}

impl Selection {
    /// Validate and compile into a [`Test`].
    ///
    /// # Errors
    ///
    /// [`TreeplanError::InvalidArgument`] for a malformed regex, an
    /// unparsable date, or a non-finite timestamp bound.
    pub fn compile(&self) -> Result<Test, TreeplanError> {
        match self {
            Self::BaseNameRegex(p) => Test::base_name_regex(p),
            Self::FullPathRegex(p) => Test::full_path_regex(p),
            Self::ModifiedAfter(s) => parse_timestamp(s).map(Test::MinModTime),
            Self::ModifiedBefore(s) => parse_timestamp(s).map(Test::MaxModTime),
            Self::MinModTime(t) => finite(*t).map(Test::MinModTime),
            Self::MaxModTime(t) => finite(*t).map(Test::MaxModTime),
        }
    }
}

fn finite(t: f64) -> Result<f64, TreeplanError> {
    if t.is_finite() {
        Ok(t)
    } else {
        Err(TreeplanError::InvalidArgument(format!(
            "timestamp bound must be finite, got {t}"
        )))
    }
}

/// Collects catalog selections; nothing is validated until
/// [`build()`](PredicateBuilder::build).
///
/// # Example
///
/// ```rust
/// use treeplan::{Combinator, Matcher, PathDescriptor, Predicate};
///
/// let keep = Predicate::builder()
///     .base_name_regex(r"report_\d+")
///     .base_name_regex(r"summary")
///     .combinator(Combinator::Any)
///     .build()
///     .unwrap();
///
/// assert!(keep.is_match(&PathDescriptor::new("/out/REPORT_7.csv")));
/// assert!(!keep.is_match(&PathDescriptor::new("/out/notes.txt")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    selections: Vec<Selection>,
    combinator: Combinator,
}

impl PredicateBuilder {
    pub fn select(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    pub fn base_name_regex(self, pattern: impl Into<String>) -> Self {
        self.select(Selection::BaseNameRegex(pattern.into()))
    }

    pub fn full_path_regex(self, pattern: impl Into<String>) -> Self {
        self.select(Selection::FullPathRegex(pattern.into()))
    }

    pub fn modified_after(self, date: impl Into<String>) -> Self {
        self.select(Selection::ModifiedAfter(date.into()))
    }

    pub fn modified_before(self, date: impl Into<String>) -> Self {
        self.select(Selection::ModifiedBefore(date.into()))
    }

    pub fn min_mod_time(self, epoch_secs: f64) -> Self {
        self.select(Selection::MinModTime(epoch_secs))
    }

    pub fn max_mod_time(self, epoch_secs: f64) -> Self {
        self.select(Selection::MaxModTime(epoch_secs))
    }

    pub fn combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    /// Compile every selection, failing on the first bad one.
    ///
    /// # Errors
    ///
    /// [`TreeplanError::InvalidArgument`] from [`Selection::compile`].
    pub fn build(self) -> Result<Predicate, TreeplanError> {
        let tests = self
            .selections
            .iter()
            .map(Selection::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate::new(tests, self.combinator))
    }
}
