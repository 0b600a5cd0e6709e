use std::cmp::Ordering;

use derive_more::Display;

/// Handle of a directory slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("dir#{_0}")]
pub struct DirId(usize);

/// Handle of a file slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("file#{_0}")]
pub struct FileId(usize);

impl DirId {
    pub(crate) fn new(slot: usize) -> Self {
        Self(slot)
    }

    pub(crate) fn slot(self) -> usize {
        self.0
    }
}

impl FileId {
    pub(crate) fn new(slot: usize) -> Self {
        Self(slot)
    }

    pub(crate) fn slot(self) -> usize {
        self.0
    }
}

/// Interior node. Children are kept sorted by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub(crate) path: String,
    pub(crate) parent: Option<DirId>,
    pub(crate) child_dirs: Vec<DirId>,
    pub(crate) child_files: Vec<FileId>,
}

impl DirEntry {
    pub fn new(path: String, parent: Option<DirId>) -> Self {
        Self {
            path,
            parent,
            child_dirs: Vec::new(),
            child_files: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    pub fn child_dirs(&self) -> &[DirId] {
        &self.child_dirs
    }

    pub fn child_files(&self) -> &[FileId] {
        &self.child_files
    }
}

/// Leaf node.
///
/// The contents are borrowed from whoever inserted the file. The tree hands
/// the same slice back from lookups, replacements and removal and never
/// copies or releases the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<'c> {
    pub(crate) path: String,
    pub(crate) parent: Option<DirId>,
    pub(crate) contents: &'c [u8],
}

impl<'c> FileEntry<'c> {
    pub fn new(path: String, parent: Option<DirId>, contents: &'c [u8]) -> Self {
        Self {
            path,
            parent,
            contents,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    pub fn contents(&self) -> &'c [u8] {
        self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Swaps in new contents and returns the previous slice.
    pub fn replace_contents(&mut self, contents: &'c [u8]) -> &'c [u8] {
        std::mem::replace(&mut self.contents, contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntryKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// Borrowed view of either node kind.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'t, 'c> {
    Dir(&'t DirEntry),
    File(&'t FileEntry<'c>),
}

impl EntryRef<'_, '_> {
    pub fn path(&self) -> &str {
        match self {
            EntryRef::Dir(dir) => dir.path(),
            EntryRef::File(file) => file.path(),
        }
    }

    pub fn parent(&self) -> Option<DirId> {
        match self {
            EntryRef::Dir(dir) => dir.parent(),
            EntryRef::File(file) => file.parent(),
        }
    }

    /// Byte-wise ordering of the two paths, regardless of node kind.
    pub fn compare(&self, other: &EntryRef<'_, '_>) -> Ordering {
        self.path().cmp(other.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_contents_returns_previous_slice() {
        let first = b"first".as_slice();
        let second = b"second, longer".as_slice();
        let mut file = FileEntry::new("a.txt".into(), None, first);

        let previous = file.replace_contents(second);

        assert!(std::ptr::eq(previous, first));
        assert_eq!(file.contents(), second);
        assert_eq!(file.len(), second.len());
    }

    #[test]
    fn compare_orders_by_path_across_kinds() {
        let dir = DirEntry::new("a/b".into(), None);
        let file = FileEntry::new("a/a.txt".into(), None, b"");
        let dir_ref = EntryRef::Dir(&dir);
        let file_ref = EntryRef::File(&file);

        assert_eq!(file_ref.compare(&dir_ref), Ordering::Less);
        assert_eq!(dir_ref.compare(&file_ref), Ordering::Greater);
        assert_eq!(dir_ref.compare(&dir_ref), Ordering::Equal);
        assert_eq!(EntryKind::File.to_string(), "file");
    }

    #[test]
    fn ids_display_their_kind() {
        assert_eq!(DirId::new(3).to_string(), "dir#3");
        assert_eq!(FileId::new(0).to_string(), "file#0");
    }
}
