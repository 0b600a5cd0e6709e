use super::{DirId, FileTree, RootRef};

impl<'c> FileTree<'c> {
    /// Flat listing of the tree, one path per line.
    ///
    /// Directories come in pre-order, each followed by its own files, all in
    /// path order. An uninitialized tree has no listing at all, while an
    /// empty one lists nothing.
    pub fn serialize(&self) -> Option<String> {
        if !self.initialized {
            return None;
        }

        let root = match self.root {
            RootRef::Empty => return Some(String::new()),
            RootRef::File(id) => return Some(format!("{}\n", self.nodes[id].path())),
            RootRef::Directory(id) => id,
        };

        let dirs = self.dirs_in_preorder(root);
        let listed_len = dirs
            .iter()
            .map(|id| {
                let dir = &self.nodes[*id];
                let files_len = dir
                    .child_files()
                    .iter()
                    .map(|file| self.nodes[*file].path().len() + 1)
                    .sum::<usize>();
                dir.path().len() + 1 + files_len
            })
            .sum();

        let mut listing = String::with_capacity(listed_len);
        for id in dirs {
            let dir = &self.nodes[id];
            listing.push_str(dir.path());
            listing.push('\n');
            for file in dir.child_files() {
                listing.push_str(self.nodes[*file].path());
                listing.push('\n');
            }
        }
        Some(listing)
    }

    /// Every directory below and including `top`, parents before children
    /// and siblings in path order.
    pub(crate) fn dirs_in_preorder(&self, top: DirId) -> Vec<DirId> {
        let mut ordered = Vec::with_capacity(self.dir_count);
        let mut pending = vec![top];

        while let Some(id) = pending.pop() {
            ordered.push(id);
            pending.extend(self.nodes[id].child_dirs().iter().rev().copied());
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_tree_has_no_listing() {
        let tree = FileTree::new();
        assert_eq!(tree.serialize(), None);
    }

    #[test]
    fn empty_tree_lists_nothing() {
        let mut tree = FileTree::new();
        tree.init().unwrap();
        assert_eq!(tree.serialize().as_deref(), Some(""));
    }

    #[test]
    fn root_file_lists_itself() {
        let mut tree = FileTree::new();
        tree.init().unwrap();
        tree.insert_file("x.txt", b"").unwrap();
        assert_eq!(tree.serialize().as_deref(), Some("x.txt\n"));
    }

    #[test]
    fn listing_is_preorder_with_files_after_their_directory() {
        let mut tree = FileTree::new();
        tree.init().unwrap();
        tree.insert_dir("r/b/y").unwrap();
        tree.insert_dir("r/a").unwrap();
        tree.insert_file("r/b/2.txt", b"").unwrap();
        tree.insert_file("r/b/1.txt", b"").unwrap();
        tree.insert_file("r/top.txt", b"").unwrap();
        tree.insert_file("r/a/x/deep.txt", b"").unwrap();

        let listing = tree.serialize().unwrap();

        assert_eq!(
            listing,
            "r\nr/top.txt\nr/a\nr/a/x\nr/a/x/deep.txt\nr/b\nr/b/1.txt\nr/b/2.txt\nr/b/y\n"
        );
        assert_eq!(listing.len(), listing.capacity());
    }
}
