use tracing::debug;

use super::path::{is_within, next_component};
use super::{DirId, FileId, FileTree, RootRef};

impl<'c> FileTree<'c> {
    /// Directory navigation: the deepest directory whose path equals `path`
    /// or is an ancestor of it.
    ///
    /// Returns `None` when the root is not a directory or does not lie on
    /// the way to `path`.
    pub(crate) fn find_directory(&self, path: &str) -> Option<DirId> {
        let mut current = self.root_dir()?;
        if !is_within(self.nodes[current].path(), path) {
            return None;
        }

        loop {
            let dir = &self.nodes[current];
            if dir.path() == path {
                return Some(current);
            }
            match self.child_dir(current, next_component(dir.path(), path)) {
                Some(child) => current = child,
                None => {
                    debug!("Deepest directory towards '{}' is '{}'", path, dir.path());
                    return Some(current);
                }
            }
        }
    }

    /// Attach navigation: the directory that holds, or would hold, `path` as
    /// a direct child.
    ///
    /// Stops at the first directory that already has a child (of either kind)
    /// named `path`, or that has no child directory continuing towards it.
    /// The root directory has no owner, so asking for it yields `None`.
    pub(crate) fn find_owner(&self, path: &str) -> Option<DirId> {
        let mut current = self.root_dir()?;
        let root_path = self.nodes[current].path();
        if path == root_path || !is_within(root_path, path) {
            return None;
        }

        loop {
            let next = next_component(self.nodes[current].path(), path);
            if next == path {
                return Some(current);
            }
            match self.child_dir(current, next) {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Locates the file at `path`, including a standalone root file.
    pub(crate) fn find_file(&self, path: &str) -> Option<FileId> {
        if let RootRef::File(id) = self.root {
            return (self.nodes[id].path() == path).then_some(id);
        }
        let owner = self.find_owner(path)?;
        self.child_file(owner, path)
    }

    pub(crate) fn child_dir(&self, parent: DirId, path: &str) -> Option<DirId> {
        let children = self.nodes[parent].child_dirs();
        let index = self.nodes.search_dirs(children, path).ok()?;
        Some(children[index])
    }

    pub(crate) fn child_file(&self, parent: DirId, path: &str) -> Option<FileId> {
        let children = self.nodes[parent].child_files();
        let index = self.nodes.search_files(children, path).ok()?;
        Some(children[index])
    }
}
