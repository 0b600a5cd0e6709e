use snafu::prelude::*;
use tracing::debug;

use super::error::{
    NoSuchPathSnafu, NotADirectorySnafu, NotAFileSnafu, ParentChildSnafu, TreeError,
};
use super::{DirId, FileId, FileTree, RootRef};

impl<'c> FileTree<'c> {
    /// Removes the directory at `path` together with everything below it.
    ///
    /// Returns the number of directories destroyed.
    pub fn remove_dir(&mut self, path: &str) -> Result<usize, TreeError> {
        self.ensure_initialized()?;

        if let RootRef::File(id) = self.root {
            ensure!(self.nodes[id].path() != path, NotADirectorySnafu { path });
            return NoSuchPathSnafu { path }.fail();
        }

        let found = self.find_directory(path).context(NoSuchPathSnafu { path })?;
        if self.nodes[found].path() != path {
            ensure!(
                self.child_file(found, path).is_none(),
                NotADirectorySnafu { path }
            );
            return NoSuchPathSnafu { path }.fail();
        }

        match self.nodes[found].parent() {
            Some(parent) => self.unlink_dir(parent, found)?,
            None => self.root = RootRef::Empty,
        }
        let destroyed = self.destroy_subtree(found);
        self.dir_count -= destroyed;

        debug!("Removed directory '{}' ({} directories destroyed)", path, destroyed);
        Ok(destroyed)
    }

    /// Removes the file at `path` and hands its contents back to the caller.
    pub fn remove_file(&mut self, path: &str) -> Result<&'c [u8], TreeError> {
        self.ensure_initialized()?;

        if let RootRef::File(id) = self.root {
            ensure!(self.nodes[id].path() == path, NoSuchPathSnafu { path });
            let file = self.nodes.release_file(id).context(NoSuchPathSnafu { path })?;
            self.root = RootRef::Empty;
            debug!("Removed root file '{}'", path);
            return Ok(file.contents());
        }

        let Some(owner) = self.find_owner(path) else {
            let is_root_dir = self
                .root_dir()
                .is_some_and(|root| self.nodes[root].path() == path);
            ensure!(!is_root_dir, NotAFileSnafu { path });
            return NoSuchPathSnafu { path }.fail();
        };

        let Some(id) = self.child_file(owner, path) else {
            ensure!(self.child_dir(owner, path).is_none(), NotAFileSnafu { path });
            return NoSuchPathSnafu { path }.fail();
        };

        self.unlink_file(owner, id)?;
        let file = self.nodes.release_file(id).context(NoSuchPathSnafu { path })?;
        debug!("Removed file '{}'", path);
        Ok(file.contents())
    }

    fn unlink_dir(&mut self, parent: DirId, child: DirId) -> Result<(), TreeError> {
        let child_path = self.nodes[child].path();
        let siblings = self.nodes[parent].child_dirs();
        let index = match self.nodes.search_dirs(siblings, child_path) {
            Ok(index) if siblings[index] == child => index,
            _ => return ParentChildSnafu { path: child_path }.fail(),
        };
        self.nodes[parent].child_dirs.remove(index);
        Ok(())
    }

    fn unlink_file(&mut self, parent: DirId, child: FileId) -> Result<(), TreeError> {
        let child_path = self.nodes[child].path();
        let siblings = self.nodes[parent].child_files();
        let index = match self.nodes.search_files(siblings, child_path) {
            Ok(index) if siblings[index] == child => index,
            _ => return ParentChildSnafu { path: child_path }.fail(),
        };
        self.nodes[parent].child_files.remove(index);
        Ok(())
    }

    /// Releases `top` and every node below it, files before the directories
    /// that hold them, walking with an explicit stack.
    ///
    /// Returns the number of directories released. Does not touch the parent
    /// of `top` or the directory count.
    pub(crate) fn destroy_subtree(&mut self, top: DirId) -> usize {
        let mut pending = vec![top];
        let mut destroyed = 0;

        while let Some(id) = pending.pop() {
            let Some(dir) = self.nodes.release_dir(id) else {
                continue;
            };
            for file in dir.child_files {
                self.nodes.release_file(file);
            }
            pending.extend(dir.child_dirs.into_iter().rev());
            destroyed += 1;
        }

        destroyed
    }
}
