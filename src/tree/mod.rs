//! In-memory hierarchical namespace of directories and files.
//!
//! A [`FileTree`] owns a single tree addressed by slash-delimited paths. The
//! root is either absent, one directory subtree, or one standalone file.
//! Insertion creates missing intermediate directories, removal tears down
//! whole subtrees, and every mutation either completes or leaves the tree
//! exactly as it was.

mod arena;
mod error;
mod insert;
mod navigate;
mod node;
pub mod path;
mod query;
mod remove;
mod serialize;

use std::num::NonZeroUsize;

use snafu::ensure;
use tracing::info;

pub use arena::Arena;
pub use error::{Status, TreeError, UnknownStatusError};
pub use node::{DirEntry, DirId, EntryKind, EntryRef, FileEntry, FileId};

use crate::checker::{self, InvariantViolation};
use error::{AlreadyInitializedSnafu, NotInitializedSnafu};

/// What the tree is rooted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootRef {
    #[default]
    Empty,
    Directory(DirId),
    File(FileId),
}

/// The tree engine: initialization flag, root and directory count, plus the
/// arena owning every node.
///
/// `'c` is the lifetime of the file contents supplied by callers.
#[derive(Debug, Clone, Default)]
pub struct FileTree<'c> {
    pub(crate) initialized: bool,
    pub(crate) root: RootRef,
    pub(crate) dir_count: usize,
    pub(crate) nodes: Arena<'c>,
}

impl<'c> FileTree<'c> {
    /// Creates an uninitialized tree without a node limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uninitialized tree that holds at most `limit` nodes.
    pub fn with_node_limit(limit: NonZeroUsize) -> Self {
        Self {
            nodes: Arena::new(Some(limit)),
            ..Self::default()
        }
    }

    pub fn init(&mut self) -> Result<(), TreeError> {
        ensure!(!self.initialized, AlreadyInitializedSnafu);

        self.initialized = true;
        self.root = RootRef::Empty;
        self.dir_count = 0;
        info!("Initialized tree");
        Ok(())
    }

    /// Discards every node and returns to the uninitialized state.
    pub fn destroy(&mut self) -> Result<(), TreeError> {
        self.ensure_initialized()?;

        match self.root {
            RootRef::Empty => {}
            RootRef::File(id) => {
                self.nodes.release_file(id);
            }
            RootRef::Directory(id) => {
                let destroyed = self.destroy_subtree(id);
                self.dir_count -= destroyed;
            }
        }
        self.nodes.clear();
        self.root = RootRef::Empty;
        self.dir_count = 0;
        self.initialized = false;
        info!("Destroyed tree");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn root(&self) -> RootRef {
        self.root
    }

    /// Number of directories reachable from the root, as tracked by the engine.
    pub fn dir_count(&self) -> usize {
        self.dir_count
    }

    pub fn nodes(&self) -> &Arena<'c> {
        &self.nodes
    }

    /// Audits the tree against the engine's own bookkeeping.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        checker::check_tree(self.initialized, &self.nodes, self.root, self.dir_count)
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), TreeError> {
        ensure!(self.initialized, NotInitializedSnafu);
        Ok(())
    }

    /// The root directory, if the root is a directory.
    pub(crate) fn root_dir(&self) -> Option<DirId> {
        match self.root {
            RootRef::Directory(id) => Some(id),
            _ => None,
        }
    }
}
