use snafu::prelude::*;
use tracing::{debug, warn};

use super::error::{
    AlreadyInTreeSnafu, ConflictingPathSnafu, NotADirectorySnafu, ParentChildSnafu,
    ResourceSnafu, TreeError,
};
use super::path::{
    SEPARATOR, build_path, is_direct_child, next_component, remainder, validate,
};
use super::{DirEntry, DirId, FileEntry, FileId, FileTree, RootRef};

/// First node of a freshly built chain, not yet reachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainHead {
    Dir(DirId),
    File(FileId),
}

impl<'c> FileTree<'c> {
    /// Inserts `path` as a directory, creating every missing ancestor.
    ///
    /// Returns the number of directories created.
    pub fn insert_dir(&mut self, path: &str) -> Result<usize, TreeError> {
        self.ensure_initialized()?;
        let anchor = self.attach_point(path)?;
        let created = self.attach_chain(path, anchor, None)?;
        debug!("Inserted directory '{}' ({} new directories)", path, created);
        Ok(created)
    }

    /// Inserts a file at `path` holding `contents`, creating every missing
    /// ancestor directory.
    ///
    /// Returns the number of directories created.
    pub fn insert_file(&mut self, path: &str, contents: &'c [u8]) -> Result<usize, TreeError> {
        self.ensure_initialized()?;
        let anchor = self.attach_point(path)?;
        let created = self.attach_chain(path, anchor, Some(contents))?;
        debug!(
            "Inserted file '{}' of {} bytes ({} new directories)",
            path,
            contents.len(),
            created
        );
        Ok(created)
    }

    /// Finds the existing directory the new chain for `path` hangs from, or
    /// `None` when the chain becomes the root.
    ///
    /// The same conflict rules apply to directory and file insertion.
    fn attach_point(&self, path: &str) -> Result<Option<DirId>, TreeError> {
        validate(path)?;

        match self.root {
            RootRef::Empty => Ok(None),
            RootRef::File(id) => {
                ensure!(self.nodes[id].path() != path, AlreadyInTreeSnafu { path });
                ConflictingPathSnafu { path }.fail()
            }
            RootRef::Directory(_) => {
                let deepest = self
                    .find_directory(path)
                    .context(ConflictingPathSnafu { path })?;
                let dir = &self.nodes[deepest];
                ensure!(dir.path() != path, AlreadyInTreeSnafu { path });

                let next = next_component(dir.path(), path);
                if self.child_file(deepest, next).is_some() {
                    ensure!(next != path, AlreadyInTreeSnafu { path });
                    return NotADirectorySnafu { path: next }.fail();
                }
                Ok(Some(deepest))
            }
        }
    }

    /// Materializes the missing part of `path` below `anchor` and links it in.
    ///
    /// With `leaf` set, the last segment becomes a file holding it. The chain
    /// is built detached and only linked once complete; on any failure every
    /// node created here is released and the tree is left untouched.
    fn attach_chain(
        &mut self,
        path: &str,
        anchor: Option<DirId>,
        leaf: Option<&'c [u8]>,
    ) -> Result<usize, TreeError> {
        let rest = match anchor {
            Some(anchor) => remainder(self.nodes[anchor].path(), path),
            None => path,
        };

        let mut head: Option<ChainHead> = None;
        let mut tail = anchor;
        let mut created_dirs = 0;
        let mut segments = rest.split(SEPARATOR).peekable();

        while let Some(segment) = segments.next() {
            let is_last = segments.peek().is_none();
            let step = match (is_last, leaf) {
                (true, Some(contents)) => self
                    .create_file(tail, segment, contents)
                    .map(ChainHead::File),
                _ => self.create_dir(tail, segment).map(ChainHead::Dir),
            };
            let node = match step {
                Ok(node) => node,
                Err(error) => {
                    self.rollback(head);
                    return Err(error);
                }
            };

            // Predecessors created in this call get linked right away; the
            // pre-existing anchor is only touched once the chain is complete.
            if let (Some(_), Some(parent)) = (head, tail) {
                if let Err(error) = self.link(parent, node) {
                    self.rollback(Some(node));
                    self.rollback(head);
                    return Err(error);
                }
            }

            if head.is_none() {
                head = Some(node);
            }
            if let ChainHead::Dir(dir) = node {
                created_dirs += 1;
                tail = Some(dir);
            }
        }

        let Some(head) = head else {
            return ParentChildSnafu { path }.fail();
        };

        match anchor {
            None => {
                self.root = match head {
                    ChainHead::Dir(id) => RootRef::Directory(id),
                    ChainHead::File(id) => RootRef::File(id),
                };
            }
            Some(anchor) => {
                if let Err(error) = self.link(anchor, head) {
                    self.rollback(Some(head));
                    return Err(error);
                }
            }
        }

        self.dir_count += created_dirs;
        Ok(created_dirs)
    }

    fn create_dir(&mut self, parent: Option<DirId>, segment: &str) -> Result<DirId, TreeError> {
        let path = build_path(parent.map(|id| self.nodes[id].path()), segment)?;
        self.nodes.alloc_dir(DirEntry::new(path, parent))
    }

    fn create_file(
        &mut self,
        parent: Option<DirId>,
        segment: &str,
        contents: &'c [u8],
    ) -> Result<FileId, TreeError> {
        let path = build_path(parent.map(|id| self.nodes[id].path()), segment)?;
        self.nodes.alloc_file(FileEntry::new(path, parent, contents))
    }

    /// Adds `child` to the sorted child list of `parent` of its kind.
    fn link(&mut self, parent: DirId, child: ChainHead) -> Result<(), TreeError> {
        match child {
            ChainHead::Dir(child) => self.link_dir(parent, child),
            ChainHead::File(child) => self.link_file(parent, child),
        }
    }

    fn link_dir(&mut self, parent: DirId, child: DirId) -> Result<(), TreeError> {
        let slot = {
            let child_path = self.nodes[child].path();
            self.check_link(parent, child_path)?;
            let siblings = self.nodes[parent].child_dirs();
            match self.nodes.search_dirs(siblings, child_path) {
                Ok(_) => return AlreadyInTreeSnafu { path: child_path }.fail(),
                Err(slot) => slot,
            }
        };

        let reserved = self.nodes[parent].child_dirs.try_reserve(1);
        if reserved.is_err() {
            return ResourceSnafu {
                path: self.nodes[child].path(),
            }
            .fail();
        }
        self.nodes[parent].child_dirs.insert(slot, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    fn link_file(&mut self, parent: DirId, child: FileId) -> Result<(), TreeError> {
        let slot = {
            let child_path = self.nodes[child].path();
            self.check_link(parent, child_path)?;
            let siblings = self.nodes[parent].child_files();
            match self.nodes.search_files(siblings, child_path) {
                Ok(_) => return AlreadyInTreeSnafu { path: child_path }.fail(),
                Err(slot) => slot,
            }
        };

        let reserved = self.nodes[parent].child_files.try_reserve(1);
        if reserved.is_err() {
            return ResourceSnafu {
                path: self.nodes[child].path(),
            }
            .fail();
        }
        self.nodes[parent].child_files.insert(slot, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Shared link preconditions: one level down, and no sibling of the
    /// other kind already using the path.
    fn check_link(&self, parent: DirId, child_path: &str) -> Result<(), TreeError> {
        let parent_path = self.nodes[parent].path();
        ensure!(
            is_direct_child(parent_path, child_path),
            ParentChildSnafu { path: child_path }
        );
        ensure!(
            self.child_dir(parent, child_path).is_none()
                && self.child_file(parent, child_path).is_none(),
            AlreadyInTreeSnafu { path: child_path }
        );
        Ok(())
    }

    fn rollback(&mut self, head: Option<ChainHead>) {
        let Some(head) = head else {
            return;
        };
        match head {
            ChainHead::Dir(id) => {
                let released = self.destroy_subtree(id);
                warn!("Rolled back {} directories of a partial insertion", released);
            }
            ChainHead::File(id) => {
                self.nodes.release_file(id);
                warn!("Rolled back a partially inserted file");
            }
        }
    }
}
