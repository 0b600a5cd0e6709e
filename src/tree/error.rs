use std::str::FromStr;

use derive_more::Display;
use snafu::Snafu;

/// Closed set of outcomes a tree operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Status {
    #[display("success")]
    Success,
    #[display("not_initialized")]
    NotInitialized,
    #[display("already_initialized")]
    AlreadyInitialized,
    #[display("already_in_tree")]
    AlreadyInTree,
    #[display("conflicting_path")]
    ConflictingPath,
    #[display("parent_child_error")]
    ParentChildError,
    #[display("not_a_directory")]
    NotADirectory,
    #[display("not_a_file")]
    NotAFile,
    #[display("no_such_path")]
    NoSuchPath,
    #[display("resource_error")]
    ResourceError,
}

impl Status {
    pub fn of<T>(result: &Result<T, TreeError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(error) => error.status(),
        }
    }
}

impl FromStr for Status {
    type Err = UnknownStatusError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let status = match name {
            "success" | "ok" => Status::Success,
            "not_initialized" => Status::NotInitialized,
            "already_initialized" => Status::AlreadyInitialized,
            "already_in_tree" => Status::AlreadyInTree,
            "conflicting_path" => Status::ConflictingPath,
            "parent_child_error" => Status::ParentChildError,
            "not_a_directory" => Status::NotADirectory,
            "not_a_file" => Status::NotAFile,
            "no_such_path" => Status::NoSuchPath,
            "resource_error" => Status::ResourceError,
            _ => {
                return Err(UnknownStatusError {
                    name: name.to_string(),
                });
            }
        };
        Ok(status)
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Unknown status '{}'", name))]
pub struct UnknownStatusError {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("The tree is not initialized"))]
    NotInitialized,
    #[snafu(display("The tree is already initialized"))]
    AlreadyInitialized,
    #[snafu(display("'{}' is already in the tree", path))]
    AlreadyInTree { path: String },
    #[snafu(display("'{}' conflicts with the root of the tree", path))]
    ConflictingPath { path: String },
    #[snafu(display("'{}' cannot be placed below its parent", path))]
    ParentChildError { path: String },
    #[snafu(display("'{}' is not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("'{}' is not a file", path))]
    NotAFile { path: String },
    #[snafu(display("'{}' does not exist in the tree", path))]
    NoSuchPath { path: String },
    #[snafu(display("Out of room while creating '{}'", path))]
    ResourceError { path: String },
}

impl TreeError {
    pub fn status(&self) -> Status {
        match self {
            TreeError::NotInitialized => Status::NotInitialized,
            TreeError::AlreadyInitialized => Status::AlreadyInitialized,
            TreeError::AlreadyInTree { .. } => Status::AlreadyInTree,
            TreeError::ConflictingPath { .. } => Status::ConflictingPath,
            TreeError::ParentChildError { .. } => Status::ParentChildError,
            TreeError::NotADirectory { .. } => Status::NotADirectory,
            TreeError::NotAFile { .. } => Status::NotAFile,
            TreeError::NoSuchPath { .. } => Status::NoSuchPath,
            TreeError::ResourceError { .. } => Status::ResourceError,
        }
    }
}
