use std::io::Write;

use snafu::prelude::*;
use tracing::{debug, warn};

use crate::application::report::Report;
use crate::checker::InvariantViolation;
use crate::script::{Operation, Script, Step};
use crate::tree::{FileTree, Status, TreeError};

/// What a single step ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub detail: Option<String>,
}

impl Outcome {
    fn bare(status: Status) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    fn from_result<T>(result: Result<T, TreeError>, detail: impl FnOnce(T) -> String) -> Self {
        match result {
            Ok(value) => Self {
                status: Status::Success,
                detail: Some(detail(value)),
            },
            Err(error) => Self::bare(error.status()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub unmet: usize,
}

/// Drives a tree through the steps of a script.
///
/// The tree borrows file contents from the script, so both must outlive
/// the run.
pub struct Runner<'t, 's> {
    tree: &'t mut FileTree<'s>,
    check_each_step: bool,
}

impl<'t, 's> Runner<'t, 's> {
    pub fn new(tree: &'t mut FileTree<'s>, check_each_step: bool) -> Self {
        Self {
            tree,
            check_each_step,
        }
    }

    /// Runs every step in order, reporting each one.
    ///
    /// Stops at the first invariant violation. Steps whose status differs
    /// from their expectation are counted, not fatal.
    pub fn run<W: Write>(
        &mut self,
        script: &'s Script,
        report: &mut Report<W>,
    ) -> Result<Summary, RunError> {
        let mut summary = Summary::default();

        for (index, step) in script.steps().iter().enumerate() {
            let outcome = self.execute(index, step)?;
            if self.check_each_step {
                self.audit(index, &step.operation)?;
            }

            if let Some(expected) = step.expect.filter(|expected| *expected != outcome.status) {
                warn!(
                    "Step {} ({}) ended in {} but {} was expected",
                    index, step.operation, outcome.status, expected
                );
                summary.unmet += 1;
            }
            summary.steps += 1;

            report
                .step(index, &step.operation, &outcome, step.expect)
                .context(WriteReportSnafu)?;
        }

        report.summary(&summary).context(WriteReportSnafu)?;
        Ok(summary)
    }

    fn execute(&mut self, index: usize, step: &'s Step) -> Result<Outcome, RunError> {
        debug!("Step {}: {}", index, step.operation);
        let outcome = match &step.operation {
            Operation::Init => Outcome::bare(Status::of(&self.tree.init())),
            Operation::Destroy => Outcome::bare(Status::of(&self.tree.destroy())),
            Operation::InsertDir { path } => {
                Outcome::from_result(self.tree.insert_dir(path), |created| {
                    format!("created {created} directories")
                })
            }
            Operation::InsertFile { path, contents } => {
                let result = self.tree.insert_file(path, contents.as_bytes());
                Outcome::from_result(result, |created| format!("created {created} directories"))
            }
            Operation::ContainsDir { path } => self.presence(self.tree.contains_dir(path), path),
            Operation::ContainsFile { path } => self.presence(self.tree.contains_file(path), path),
            Operation::RemoveDir { path } => {
                Outcome::from_result(self.tree.remove_dir(path), |destroyed| {
                    format!("removed {destroyed} directories")
                })
            }
            Operation::RemoveFile { path } => {
                Outcome::from_result(self.tree.remove_file(path), |contents| {
                    format!("released {} bytes", contents.len())
                })
            }
            Operation::GetContents { path } => match self.tree.file_contents(path) {
                Some(contents) => Outcome {
                    status: Status::Success,
                    detail: Some(format!("{:?}", String::from_utf8_lossy(contents))),
                },
                None => Outcome::bare(self.missing_file(path)),
            },
            Operation::ReplaceContents { path, contents } => {
                match self.tree.replace_file_contents(path, contents.as_bytes()) {
                    Some(previous) => Outcome {
                        status: Status::Success,
                        detail: Some(format!("replaced {} bytes", previous.len())),
                    },
                    None => Outcome::bare(self.missing_file(path)),
                }
            }
            Operation::Stat { path } => {
                Outcome::from_result(self.tree.stat(path), |stat| stat.to_string())
            }
            Operation::Serialize => match self.tree.serialize() {
                Some(listing) => Outcome {
                    status: Status::Success,
                    detail: Some(listing),
                },
                None => Outcome::bare(Status::NotInitialized),
            },
            Operation::Check => {
                self.audit(index, &step.operation)?;
                Outcome::bare(Status::Success)
            }
        };

        Ok(outcome)
    }

    fn audit(&self, index: usize, operation: &Operation) -> Result<(), RunError> {
        self.tree.check().context(InvariantViolatedSnafu {
            index,
            operation: operation.to_string(),
        })
    }

    fn presence(&self, found: bool, path: &str) -> Outcome {
        if found {
            Outcome::bare(Status::Success)
        } else if !self.tree.is_initialized() {
            Outcome::bare(Status::NotInitialized)
        } else {
            debug!("'{}' is not in the tree", path);
            Outcome::bare(Status::NoSuchPath)
        }
    }

    /// Why a file lookup for `path` came back empty.
    fn missing_file(&self, path: &str) -> Status {
        if !self.tree.is_initialized() {
            Status::NotInitialized
        } else if self.tree.contains_dir(path) {
            Status::NotAFile
        } else {
            Status::NoSuchPath
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunError {
    #[snafu(display("Invariant violated after step {} ({})", index, operation))]
    InvariantViolated {
        index: usize,
        operation: String,
        source: InvariantViolation,
    },
    #[snafu(display("Failed to write the run report"))]
    WriteReport { source: std::io::Error },
}
