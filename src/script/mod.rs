//! YAML scripts of tree operations.

mod operation;
mod script;

pub use operation::{Operation, Step};
pub use script::Script;

use snafu::Snafu;

use crate::tree::UnknownStatusError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScriptError {
    #[snafu(display("Failed to read the script file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Script file is not valid UTF-8: {}", file_path))]
    NotUtf8 {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the script"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted script"))]
    MalformedScript,
    #[snafu(display("Top level of a script should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Operations section should be a list"))]
    OperationsNotList,
    #[snafu(display("Step {} is neither an operation name nor a single-key map", index))]
    InvalidStep { index: usize },
    #[snafu(display("Step {} names an unknown operation '{}'", index, name))]
    UnknownOperation { index: usize, name: String },
    #[snafu(display("Step {} ({}) needs a path", index, operation))]
    MissingPath { index: usize, operation: String },
    #[snafu(display("Step {} ({}) needs contents", index, operation))]
    MissingContents { index: usize, operation: String },
    #[snafu(display("Step {} ({}) does not take a {}", index, operation, argument))]
    UnexpectedArgument {
        index: usize,
        operation: String,
        argument: String,
    },
    #[snafu(display("Step {} expects an unknown status", index))]
    UnknownStatus {
        index: usize,
        source: UnknownStatusError,
    },
}
