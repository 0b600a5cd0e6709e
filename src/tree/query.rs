use derive_more::Display;
use snafu::prelude::*;

use super::error::{NoSuchPathSnafu, TreeError};
use super::FileTree;

/// Kind of entry found at a path, with the length of a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stat {
    #[display("directory")]
    Directory,
    #[display("file of {length} bytes")]
    File { length: usize },
}

impl<'c> FileTree<'c> {
    pub fn contains_dir(&self, path: &str) -> bool {
        self.initialized
            && self
                .find_directory(path)
                .is_some_and(|id| self.nodes[id].path() == path)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.initialized && self.find_file(path).is_some()
    }

    /// The contents slice stored for the file at `path`.
    pub fn file_contents(&self, path: &str) -> Option<&'c [u8]> {
        if !self.initialized {
            return None;
        }
        let id = self.find_file(path)?;
        Some(self.nodes[id].contents())
    }

    /// Stores `contents` for the file at `path` and returns the previous
    /// slice. Nothing is stored when there is no such file.
    pub fn replace_file_contents(&mut self, path: &str, contents: &'c [u8]) -> Option<&'c [u8]> {
        if !self.initialized {
            return None;
        }
        let id = self.find_file(path)?;
        Some(self.nodes[id].replace_contents(contents))
    }

    pub fn stat(&self, path: &str) -> Result<Stat, TreeError> {
        self.ensure_initialized()?;

        if let Some(id) = self.find_file(path) {
            return Ok(Stat::File {
                length: self.nodes[id].len(),
            });
        }
        ensure!(self.contains_dir(path), NoSuchPathSnafu { path });
        Ok(Stat::Directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    fn tree() -> FileTree<'static> {
        let mut tree = FileTree::new();
        tree.init().unwrap();
        tree.insert_dir("a/b/c").unwrap();
        tree.insert_file("a/b/d.txt", b"0123456789").unwrap();
        tree
    }

    #[test]
    fn queries_on_uninitialized_tree_find_nothing() {
        let mut tree = FileTree::new();
        assert!(!tree.contains_dir("a"));
        assert!(!tree.contains_file("a"));
        assert_eq!(tree.file_contents("a"), None);
        assert_eq!(tree.replace_file_contents("a", b"x"), None);
        assert_eq!(tree.stat("a"), Err(TreeError::NotInitialized));
    }

    #[rstest]
    #[case("a", true, false)]
    #[case("a/b", true, false)]
    #[case("a/b/c", true, false)]
    #[case("a/b/d.txt", false, true)]
    #[case("a/b/c/d", false, false)]
    #[case("a/bc", false, false)]
    #[case("b", false, false)]
    fn contains_distinguishes_kinds(
        tree: FileTree<'static>,
        #[case] path: &str,
        #[case] is_dir: bool,
        #[case] is_file: bool,
    ) {
        assert_eq!(tree.contains_dir(path), is_dir);
        assert_eq!(tree.contains_file(path), is_file);
    }

    #[rstest]
    #[case("a", Ok(Stat::Directory))]
    #[case("a/b/c", Ok(Stat::Directory))]
    #[case("a/b/d.txt", Ok(Stat::File { length: 10 }))]
    #[case("a/b/e.txt", Err(TreeError::NoSuchPath { path: "a/b/e.txt".into() }))]
    fn stat_reports_kind_and_length(
        tree: FileTree<'static>,
        #[case] path: &str,
        #[case] expected: Result<Stat, TreeError>,
    ) {
        assert_eq!(tree.stat(path), expected);
    }

    #[rstest]
    fn replace_returns_previous_contents(mut tree: FileTree<'static>) {
        let replacement = b"new".as_slice();

        let previous = tree.replace_file_contents("a/b/d.txt", replacement);

        assert_eq!(previous, Some(b"0123456789".as_slice()));
        assert!(std::ptr::eq(tree.file_contents("a/b/d.txt").unwrap(), replacement));
        assert_eq!(tree.stat("a/b/d.txt"), Ok(Stat::File { length: 3 }));
        assert_eq!(tree.replace_file_contents("a/b/c", replacement), None);
        assert_eq!(tree.replace_file_contents("a/b/zz.txt", replacement), None);
    }

    #[test]
    fn caller_owned_buffers_outlive_the_lookup() {
        let buffer = vec![7_u8; 32];
        let mut tree = FileTree::new();
        tree.init().unwrap();
        tree.insert_file("blob", &buffer).unwrap();

        let found = tree.file_contents("blob").unwrap();

        assert!(std::ptr::eq(found, buffer.as_slice()));
        assert_eq!(tree.stat("blob"), Ok(Stat::File { length: 32 }));
    }

    #[test]
    fn root_file_queries() {
        let mut tree = FileTree::new();
        tree.init().unwrap();
        tree.insert_file("x.txt", b"12345").unwrap();

        assert!(tree.contains_file("x.txt"));
        assert!(!tree.contains_dir("x.txt"));
        assert_eq!(tree.stat("x.txt"), Ok(Stat::File { length: 5 }));
        assert_eq!(
            tree.stat("y"),
            Err(TreeError::NoSuchPath { path: "y".into() })
        );
        assert_eq!(
            tree.replace_file_contents("x.txt", b"abc"),
            Some(b"12345".as_slice())
        );
        assert_eq!(tree.file_contents("x.txt"), Some(b"abc".as_slice()));
    }
}
