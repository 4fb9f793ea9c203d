//! Line-based interactive input.
//!
//! Every question loops until it gets a valid answer, printing what was wrong
//! with the last one. Nothing is ever defaulted silently. When the input
//! stream ends mid-question the prompt fails with [`TreeplanError::Prompt`]
//! instead of spinning.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::datetime::parse_timestamp;
use crate::descriptor::ExistenceClass;
use crate::enumerate::TargetKind;
use crate::error::TreeplanError;
use crate::predicate::{Combinator, Predicate, Test};

pub struct Prompt<R, W> {
    input:  R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// A prompt over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Print `msg` and read one line, without its line ending.
    pub fn ask(&mut self, msg: &str) -> Result<String, TreeplanError> {
        write!(self.output, "{msg}").map_err(TreeplanError::Prompt)?;
        self.output.flush().map_err(TreeplanError::Prompt)?;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(TreeplanError::Prompt)?;
        if n == 0 {
            return Err(TreeplanError::Prompt(io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Print a line of feedback.
    pub fn say(&mut self, msg: impl std::fmt::Display) -> Result<(), TreeplanError> {
        writeln!(self.output, "{msg}").map_err(TreeplanError::Prompt)
    }

    /// Ask until the answer parses with `parse`; report each rejection.
    fn ask_until<T>(
        &mut self,
        msg: &str,
        mut parse: impl FnMut(&str) -> Result<T, String>,
    ) -> Result<T, TreeplanError> {
        loop {
            let answer = self.ask(msg)?;
            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(why) => self.say(why)?,
            }
        }
    }

    // ── Answers ───────────────────────────────────────────────────────────

    pub fn yes_no(&mut self, question: &str) -> Result<bool, TreeplanError> {
        self.ask_until(&format!("\"{question}\" 1=Yes 0=No: "), |s| match s.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err("Invalid input: answer 1 or 0.".to_string()),
        })
    }

    pub fn combinator(&mut self) -> Result<Combinator, TreeplanError> {
        self.ask_until("Logic? 1=all or 0=any: ", |s| match s.trim() {
            "1" => Ok(Combinator::All),
            "0" => Ok(Combinator::Any),
            _ => Err("Invalid input: answer 1 (all) or 0 (any).".to_string()),
        })
    }

    pub fn target(&mut self) -> Result<TargetKind, TreeplanError> {
        self.ask_until("Target \"file\" or \"dir\": ", |s| {
            s.parse::<TargetKind>().map_err(|e| e.to_string())
        })
    }

    /// An existing directory. Surrounding double quotes are dropped, since
    /// "copy as path" in a file manager adds them.
    pub fn existing_dir(&mut self, msg: &str) -> Result<PathBuf, TreeplanError> {
        self.ask_until(msg, |s| {
            let path = PathBuf::from(s.trim().replace('"', ""));
            match ExistenceClass::of(&path) {
                ExistenceClass::Dir => Ok(path),
                class => Err(format!(
                    "Invalid input: {} is not an existing folder ({class}).",
                    path.display()
                )),
            }
        })
    }

    pub fn timestamp(&mut self, msg: &str) -> Result<f64, TreeplanError> {
        self.ask_until(msg, |s| parse_timestamp(s).map_err(|e| e.to_string()))
    }

    fn regex_test(
        &mut self,
        msg: &str,
        compile: fn(&str) -> Result<Test, TreeplanError>,
    ) -> Result<Test, TreeplanError> {
        self.ask_until(msg, |s| compile(s).map_err(|e| e.to_string()))
    }

    // ── Catalog ───────────────────────────────────────────────────────────

    /// Walk the user through the filter catalog and the combinator.
    ///
    /// Questions come in a fixed order: base-name regex, full-path regex,
    /// minimum modified date, maximum modified date, then all/any.
    pub fn predicate(&mut self) -> Result<Predicate, TreeplanError> {
        let mut tests = Vec::new();

        if self.yes_no("Filter by Regex on Base Name?")? {
            tests.push(self.regex_test("Base Name Rgx: ", Test::base_name_regex)?);
        }
        if self.yes_no("Filter by Regex on Absolute Path?")? {
            tests.push(self.regex_test("Absolute Path Rgx: ", Test::full_path_regex)?);
        }
        if self.yes_no("Add Minimum Modified Date?")? {
            tests.push(Test::MinModTime(self.timestamp("Minimum Modified Date: ")?));
        }
        if self.yes_no("Add Maximum Modified Date?")? {
            tests.push(Test::MaxModTime(self.timestamp("Maximum Modified Date: ")?));
        }

        let combinator = self.combinator()?;
        tracing::debug!(tests = tests.len(), %combinator, "filter built");
        Ok(Predicate::new(tests, combinator))
    }
}
